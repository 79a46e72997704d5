//! Fetch Enigma public datasets into Arrow tables.
//!
//! ```no_run
//! use enigma_fetch::{EnigmaClient, EnigmaConfig, ParseOptions};
//!
//! # fn main() -> enigma_fetch::Result<()> {
//! let client = EnigmaClient::new(&EnigmaConfig::load()?)?;
//! let table = client.export("fa7ab996-fb43-4e86-80e7-f8e82ccba15f", &ParseOptions::default())?;
//! println!("{}", table.head(5));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod parse;

pub use crate::config::EnigmaConfig;
pub use error::{FetchError, Result};
pub use fetch::{
    DatasetId, DatasetMetadata, EnigmaClient, SnapshotId, SnapshotRef, DEFAULT_ROW_LIMIT,
};
pub use parse::{parse_csv, ParseOptions, Table};
