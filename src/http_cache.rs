use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ETAG, HeaderMap, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "scout_dash";
const CACHE_FILE: &str = "http_cache.json";

static SHARED: Mutex<Option<HttpCache>> = Mutex::new(None);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub body: String,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub fetched_at: String,
}

impl CachedResponse {
    fn validators(&self, mut req: RequestBuilder) -> RequestBuilder {
        if let Some(etag) = &self.etag {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(stamp) = &self.last_modified {
            req = req.header(IF_MODIFIED_SINCE, stamp);
        }
        req
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OnDisk {
    version: u32,
    entries: HashMap<String, CachedResponse>,
}

/// Response bodies keyed by URL, persisted as one JSON file. A missing,
/// unreadable or old-version file starts an empty cache.
#[derive(Debug, Default)]
pub struct HttpCache {
    path: Option<PathBuf>,
    entries: HashMap<String, CachedResponse>,
}

impl HttpCache {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path).unwrap_or_default();
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Cache under [`app_cache_dir`]; memory-only when no cache dir resolves.
    pub fn open_default() -> Self {
        match app_cache_dir() {
            Some(dir) => Self::open(dir.join(CACHE_FILE)),
            None => Self::default(),
        }
    }

    pub fn get(&self, url: &str) -> Option<&CachedResponse> {
        self.entries.get(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, url: &str, response: CachedResponse) {
        self.entries.insert(url.to_string(), response);
    }

    /// Atomic rewrite through a sibling temp file.
    pub fn save(&self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
        }
        let snapshot = OnDisk {
            version: CACHE_VERSION,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string(&snapshot).context("serialize http cache")?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).context("write http cache")?;
        fs::rename(&tmp, path).context("swap http cache")?;
        Ok(())
    }
}

fn read_entries(path: &Path) -> Option<HashMap<String, CachedResponse>> {
    let raw = fs::read_to_string(path).ok()?;
    let disk: OnDisk = serde_json::from_str(&raw).ok()?;
    (disk.version == CACHE_VERSION).then_some(disk.entries)
}

fn header_text(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn with_shared<T>(f: impl FnOnce(&mut HttpCache) -> T) -> T {
    let mut guard = SHARED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(guard.get_or_insert_with(HttpCache::open_default))
}

/// GET `url` as text, revalidating a cached copy with `If-None-Match` /
/// `If-Modified-Since`.
pub fn fetch_text_cached(client: &Client, url: &str) -> Result<String> {
    let cached = with_shared(|cache| cache.get(url).cloned());

    let mut req = client.get(url);
    if let Some(entry) = &cached {
        req = entry.validators(req);
    }
    let resp = req.send().with_context(|| format!("request to {url} failed"))?;
    let status = resp.status();
    if status == StatusCode::NOT_MODIFIED {
        let entry = cached.ok_or_else(|| anyhow!("{url}: 304 without a cached body"))?;
        log::debug!("{url}: not modified, serving cached copy");
        return Ok(entry.body);
    }

    let etag = header_text(resp.headers(), ETAG);
    let last_modified = header_text(resp.headers(), LAST_MODIFIED);
    let body = resp.text().with_context(|| format!("reading body of {url}"))?;
    if !status.is_success() {
        return Err(anyhow!("http {status} for {url}"));
    }

    let response = CachedResponse {
        body: body.clone(),
        etag,
        last_modified,
        fetched_at: chrono::Utc::now().to_rfc3339(),
    };
    with_shared(|cache| {
        cache.insert(url, response);
        if let Err(err) = cache.save() {
            log::warn!("http cache not saved: {err:#}");
        }
    });
    Ok(body)
}

pub fn app_cache_dir() -> Option<PathBuf> {
    let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
    match non_empty("XDG_CACHE_HOME") {
        Some(base) => Some(PathBuf::from(base).join(CACHE_DIR)),
        None => non_empty("HOME").map(|home| PathBuf::from(home).join(".cache").join(CACHE_DIR)),
    }
}
