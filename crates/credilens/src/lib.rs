pub mod config;
pub mod error;
pub mod filing;
pub mod pipeline;
pub mod provenance;
pub mod qa;
pub mod ratios;
pub mod scoring;
pub mod telemetry;
