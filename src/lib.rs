pub mod cards;
pub mod charts;
pub mod compare;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod filters;
pub mod http_cache;
pub mod http_client;
pub mod page;
pub mod prep;
pub mod rankings;
pub mod similarity;
pub mod state;
pub mod suggest;
