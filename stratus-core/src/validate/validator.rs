use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ValidationError, Violation};
use crate::types::{Cluster, Platform, Region};

// Every identifier ends up embedded in module names and working-directory
// paths, so restrict them to filesystem-safe characters.
pub(crate) static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("valid"));

pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(self.violations))
        }
    }

    pub fn validate_platform(&mut self, platform: &Platform) {
        self.require_identifier("platform.name", &platform.name);
        self.require_identifier("platform.kv", &platform.kv);
        for (i, region) in platform.regions.iter().enumerate() {
            self.validate_region(&format!("platform.regions[{i}]"), region);
        }
    }

    pub fn validate_cluster(&mut self, cluster: &Cluster) {
        self.require_identifier("cluster.name", &cluster.name);
        self.require_identifier("cluster.region", &cluster.region);
        self.require_identifier("cluster.provider", &cluster.provider);
    }

    fn validate_region(&mut self, path: &str, region: &Region) {
        self.require_identifier(&format!("{path}.provider"), &region.provider);
        self.require_identifier(&format!("{path}.region"), &region.region);
    }

    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    fn require_identifier(&mut self, path: &str, value: &str) {
        if value.is_empty() {
            self.push(path, "must not be empty");
        } else if !ID_RE.is_match(value) {
            self.push(
                path,
                "must contain only alphanumeric characters, hyphens, and underscores",
            );
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
