/// Top-level document shape: a config file declares one or more platforms.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlatformManifest {
    pub platforms: Vec<Platform>,
}

/// A complete multi-region, multi-cloud platform description.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Platform {
    pub name: String,

    #[serde(default)]
    pub domain: String,

    /// Global load balancer identifier.
    #[serde(default)]
    pub gslb: String,

    /// Key/value backend identifier (e.g. "consul", "etcd").
    pub kv: String,

    #[serde(default)]
    pub regions: Vec<Region>,
}

/// One provider/location pairing within a platform.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Region {
    pub provider: String,
    pub region: String,

    // Classification lists reserved for future filtering; carried through
    // the model but not consumed by the compiler.
    #[serde(default)]
    pub control: Vec<String>,
    #[serde(default)]
    pub resource: Vec<String>,
    #[serde(default)]
    pub network: Vec<String>,
}
