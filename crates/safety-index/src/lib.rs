//! Weighted KPI scoring and risk-zone classification for organizational units.
//!
//! The [`scoring`] module holds the evaluation pipeline. [`config`], [`telemetry`] and
//! [`error`] carry the startup concerns shared by every binary that embeds the engine.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;
