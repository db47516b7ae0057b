mod validator;

use crate::error::ValidationError;
use crate::types::{Cluster, Platform};
use validator::Validator;

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for Platform {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_platform(self)
    }
}

impl Validate for Cluster {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_cluster(self)
    }
}

pub fn validate_platform(platform: &Platform) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_platform(platform);
    v.finish()
}

pub fn validate_cluster(cluster: &Cluster) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    v.validate_cluster(cluster);
    v.finish()
}
