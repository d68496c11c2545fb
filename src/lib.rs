pub mod config;
pub mod error;
pub mod logging;
pub mod reference;
pub mod variants;

// Pipeline stages: ingestion, processing, export
pub mod pipeline;

// Layered boundaries for application and infrastructure
pub mod app;
pub mod infra;

// Domain data shapes shared across layers
pub mod domain;
