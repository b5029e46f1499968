//! gantry-adapters - Package adapters and publish pipeline
//!
//! This crate provides the package adapter seam, the Python adapter backed
//! by the opaque build/upload tools, declared tool-set provisioning,
//! credential lookup, and the five-stage publish pipeline.

pub mod credentials;
pub mod pipeline;
pub mod publish;
pub mod python;
pub mod registry;
pub mod stamp;
pub mod toolset;
mod traits;

pub use credentials::{Credential, CredentialProvider, TOKEN_USERNAME};
pub use pipeline::{PipelineOptions, PublishPipeline};
pub use publish::{PublishOptions, ValidationResult};
pub use python::PythonAdapter;
pub use registry::{detect_packages, AdapterRegistry};
pub use stamp::{extract_version, stamp_version, write_stamped};
pub use toolset::Toolset;
pub use traits::PackageAdapter;
