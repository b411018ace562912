//! Application Layer - Use cases and port definitions.
//!
//! This layer owns the connection registry and the ingestion use case, and
//! defines the ports infrastructure adapters plug into.

/// Port interfaces for subscriber transports and fan-out.
pub mod ports;

/// Connection hub and ingestion gateway.
pub mod services;
