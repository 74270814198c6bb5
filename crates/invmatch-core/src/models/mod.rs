//! Data models shared across the extraction and matching pipeline.

pub mod config;
pub mod document;
pub mod invoice;
pub mod ledger;
pub mod result;
