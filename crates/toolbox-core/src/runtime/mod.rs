pub mod backend;
pub mod config;
pub mod ingest;
pub mod queue;
pub mod sink;
pub mod storage;
pub mod types;
