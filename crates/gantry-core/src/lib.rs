//! gantry-core - Core library for the gantry release publisher
//!
//! This crate provides the foundational types, error handling, configuration,
//! and Release Event model for the gantry release publisher.

pub mod config;
pub mod error;
pub mod trigger;
pub mod types;

pub use error::{GantryError, Result};
pub use trigger::{version_from_ref, ReleaseEvent, TriggerKind};
pub use types::{PackageInfo, PublishReport, PublishStage, StageOutcome};
