pub mod catalog;
pub mod config;
pub mod fetch;
pub mod ingest;
pub mod observability;
pub mod server;
pub mod storage;
