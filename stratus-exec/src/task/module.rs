use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::runner::{Invocation, RunnerError, ToolRunner};

use super::{Task, TaskAction, TaskError};

/// Tool variable naming the provider a credential module reads from.
const PROVIDER_VAR: &str = "kubernetes";
/// Neutral provider value used when destroying a detached credential module.
const DETACHED_PROVIDER: &str = "none";

/// One invocation unit of the external provisioning tool: a sourced module
/// materialised in its own working directory.
pub struct ModuleTask {
    id: String,
    name: String,
    source: String,
    path: PathBuf,
    env: BTreeMap<String, String>,
    variables: BTreeMap<String, String>,
    credential_source: bool,
    runner: Arc<dyn ToolRunner>,
}

impl ModuleTask {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        source: impl Into<String>,
        path: impl Into<PathBuf>,
        runner: Arc<dyn ToolRunner>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            source: source.into(),
            path: path.into(),
            env: BTreeMap::new(),
            variables: BTreeMap::new(),
            credential_source: false,
            runner,
        }
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn with_variables(mut self, variables: BTreeMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    /// Mark this module as the one producing cluster access credentials;
    /// the engine treats such tasks specially during destroy.
    pub fn credential_source(mut self, credential_source: bool) -> Self {
        self.credential_source = credential_source;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn invocation(&self, args: &[&str]) -> Invocation {
        Invocation {
            display_name: self.name.clone(),
            args: args.iter().map(|a| a.to_string()).collect(),
            dir: self.path.clone(),
            env: self.env.clone(),
            variables: self.variables.clone(),
        }
    }

    async fn exec(&self, args: &[&str]) -> Result<(), RunnerError> {
        self.runner.run(&self.invocation(args)).await
    }

    /// Create the working directory and write the root config referencing
    /// this module's source, so the tool has something to init against.
    async fn materialize(&self) -> Result<(), TaskError> {
        let workspace = |source| TaskError::Workspace {
            task: self.name.clone(),
            source,
        };

        tokio::fs::create_dir_all(&self.path).await.map_err(workspace)?;

        let mut module = serde_json::Map::new();
        module.insert(
            self.id.clone(),
            serde_json::json!({ "source": self.source }),
        );
        let root = serde_json::json!({ "module": module });

        tokio::fs::write(self.path.join("main.tf.json"), root.to_string())
            .await
            .map_err(workspace)?;
        Ok(())
    }
}

#[async_trait]
impl Task for ModuleTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn supplies_teardown_credentials(&self) -> bool {
        self.credential_source
    }

    fn detach_provider(&mut self) {
        if self.credential_source {
            self.variables
                .insert(PROVIDER_VAR.to_string(), DETACHED_PROVIDER.to_string());
        }
    }

    /// Runs the tool's init followed by its plan check.
    async fn validate(&self) -> Result<(), TaskError> {
        self.materialize().await?;
        for args in [&["init"][..], &["plan"][..]] {
            self.exec(args).await.map_err(|source| TaskError::Validation {
                task: self.name.clone(),
                source,
            })?;
        }
        Ok(())
    }

    async fn plan(&self) -> Result<(), TaskError> {
        self.exec(&["plan"]).await.map_err(|source| TaskError::Execution {
            task: self.name.clone(),
            action: TaskAction::Plan,
            source,
        })
    }

    async fn apply(&self) -> Result<(), TaskError> {
        self.exec(&["apply", "-auto-approve"])
            .await
            .map_err(|source| TaskError::Execution {
                task: self.name.clone(),
                action: TaskAction::Apply,
                source,
            })
    }

    async fn destroy(&self) -> Result<(), TaskError> {
        self.exec(&["destroy", "-auto-approve"])
            .await
            .map_err(|source| TaskError::Execution {
                task: self.name.clone(),
                action: TaskAction::Destroy,
                source,
            })
    }

    async fn finalize(&self) -> Result<(), TaskError> {
        match tokio::fs::remove_dir_all(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TaskError::Cleanup {
                task: self.name.clone(),
                source: e,
            }),
        }
    }
}
