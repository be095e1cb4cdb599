pub mod config;
pub mod error;
pub mod ingest;
pub mod output;
pub mod ranking;
pub mod subject;
pub mod utility;
