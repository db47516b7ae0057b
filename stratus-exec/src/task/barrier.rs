use async_trait::async_trait;

use super::{Task, TaskError};

/// A structural placeholder marking an ordering checkpoint (e.g. "remote
/// state is available"). Carries no provisioning action of its own.
pub struct BarrierTask {
    id: String,
    name: String,
}

impl BarrierTask {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = id.clone();
        Self { id, name }
    }
}

#[async_trait]
impl Task for BarrierTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn validate(&self) -> Result<(), TaskError> {
        Ok(())
    }

    async fn plan(&self) -> Result<(), TaskError> {
        Ok(())
    }

    async fn apply(&self) -> Result<(), TaskError> {
        Ok(())
    }

    async fn destroy(&self) -> Result<(), TaskError> {
        Ok(())
    }

    async fn finalize(&self) -> Result<(), TaskError> {
        Ok(())
    }
}
