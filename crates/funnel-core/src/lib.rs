//! Data model, stage registry and statistics for the sales-pipeline board.

pub mod config;
pub mod stages;
pub mod stats;
pub mod types;
