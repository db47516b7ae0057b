/// A standalone Kubernetes cluster description, used for ad hoc cluster
/// provisioning outside the full-platform flow.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Cluster {
    pub name: String,
    pub region: String,
    pub provider: String,
}
