// VinSight - vehicle maintenance records in a local JSONL store

pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod jsonl;
pub mod present;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use commands::{Command, Context};
pub use config::Config;
pub use error::{Error, Result};
pub use export::{ExportFormat, export};
pub use filter::{Filter, SearchCriteria};
pub use present::{OutputStyle, Presenter};
pub use record::{MaintenanceRecord, NewRecord, RecordPatch};
pub use store::Store;
