mod cluster;
mod platform;

pub use cluster::Cluster;
pub use platform::{Platform, PlatformManifest, Region};
