#![forbid(unsafe_code)]

pub mod error;
pub mod parser;
pub mod types;
pub mod validate;

pub use crate::error::{ModelError, ParseError, ValidationError, Violation};
pub use crate::parser::{parse_manifest_str, DocumentFormat, ParsedManifest};
pub use crate::types::{Cluster, Platform, PlatformManifest, Region};
pub use crate::validate::{validate_cluster, validate_platform, Validate};
