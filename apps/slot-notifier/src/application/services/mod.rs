//! Application Services
//!
//! - `ConnectionHub`: Registry of live subscribers plus broadcast statistics
//! - `IngestionGateway`: Authenticate, classify and fan out inbound alerts

mod hub;
mod ingestion;

pub use hub::{ConnectionHub, Recipient};
pub use ingestion::{IngestError, IngestOutcome, IngestionGateway, SharedSecret};
