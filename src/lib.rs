// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod telemetry;

// Push delivery
pub mod device;
pub mod push;
pub mod queue;

// Application layer
pub mod api;
pub mod server;
