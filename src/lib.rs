pub mod analyzer;
pub mod boundary;
pub mod changelog;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod metadata;
pub mod notes;
pub mod store;
pub mod ui;

pub use error::{ReleaseToolError, Result};
