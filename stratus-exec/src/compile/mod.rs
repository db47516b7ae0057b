use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use stratus_core::error::ValidationError;
use stratus_core::types::{Cluster, Platform};
use stratus_core::validate::{validate_cluster, validate_platform};

use crate::runner::ToolRunner;
use crate::task::{BarrierTask, ModuleTask, Task};

const AWS_PROVIDER: &str = "aws";
const KUBECONFIG_ENV: &str = "KUBECONFIG";
const KUBECONFIG_FILE: &str = "kubeconfig";

/// Random suffix appended to every working-directory path so repeated or
/// concurrent compilations of the same platform do not collide. Minted once
/// per compilation and discarded once the steps are handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunId(u32);

impl RunId {
    pub fn random() -> Self {
        Self(fastrand::u32(..))
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered stage of the execution plan. Tasks within a step carry no
/// ordering constraint relative to each other; steps execute strictly in
/// sequence.
pub struct Step {
    tasks: Vec<Box<dyn Task>>,
}

impl Step {
    pub fn new(tasks: Vec<Box<dyn Task>>) -> Self {
        Self { tasks }
    }

    pub fn single(task: impl Task + 'static) -> Self {
        Self {
            tasks: vec![Box::new(task)],
        }
    }

    pub fn tasks(&self) -> &[Box<dyn Task>] {
        &self.tasks
    }

    pub fn tasks_mut(&mut self) -> &mut [Box<dyn Task>] {
        &mut self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Expands platform and cluster descriptions into ordered step plans.
/// Dependency ordering is encoded by step position: a task that needs
/// another's output is placed in a later step.
pub struct Compiler {
    runner: Arc<dyn ToolRunner>,
    run_id: RunId,
    tmp_root: PathBuf,
    module_root: String,
}

impl Compiler {
    pub fn new(runner: Arc<dyn ToolRunner>, run_id: RunId) -> Self {
        Self {
            runner,
            run_id,
            tmp_root: std::env::temp_dir(),
            module_root: "./infrastructure".to_string(),
        }
    }

    pub fn with_tmp_root(mut self, tmp_root: impl Into<PathBuf>) -> Self {
        self.tmp_root = tmp_root.into();
        self
    }

    pub fn with_module_root(mut self, module_root: impl Into<String>) -> Self {
        self.module_root = module_root.into();
        self
    }

    /// Expand a platform description into the fixed provisioning order:
    /// barrier, kv namespace, then (cluster, kubeconfig, resources) for
    /// each region in declaration order.
    pub fn platform_steps(&self, platform: &Platform) -> Result<Vec<Step>, CompileError> {
        validate_platform(platform)?;

        let mut steps = Vec::with_capacity(2 + 3 * platform.regions.len());

        // Remote state must exist before any module can store state there.
        steps.push(Step::single(BarrierTask::new(format!(
            "{}-check-remote-state",
            platform.name
        ))));

        let kv_name = format!("{}-kv", platform.name);
        steps.push(Step::single(ModuleTask::new(
            kv_name.clone(),
            kv_name.clone(),
            format!("{}/kv/{}", self.module_root, platform.kv),
            self.workdir(&kv_name),
            self.runner.clone(),
        )));

        for region in &platform.regions {
            let (cluster, kubeconfig) =
                self.cluster_pair(&platform.name, &region.provider, &region.region);
            let resources = self.resource_step(&platform.name, &region.provider, &region.region);
            steps.push(cluster);
            steps.push(kubeconfig);
            steps.push(resources);
        }

        Ok(steps)
    }

    /// Expand a standalone cluster description into the two-step
    /// cluster + kubeconfig plan used for ad hoc provisioning.
    pub fn cluster_steps(&self, cluster: &Cluster) -> Result<Vec<Step>, CompileError> {
        validate_cluster(cluster)?;
        let (cluster_step, kubeconfig_step) =
            self.cluster_pair(&cluster.name, &cluster.provider, &cluster.region);
        Ok(vec![cluster_step, kubeconfig_step])
    }

    /// The Kubernetes cluster and the kubeconfig retrieval that depends on
    /// it. The kubeconfig step must come after the cluster step.
    fn cluster_pair(&self, name: &str, provider: &str, region: &str) -> (Step, Step) {
        let k8s_name = qualified(name, region, provider, "k8s");
        let cluster_step = Step::single(ModuleTask::new(
            k8s_name.clone(),
            k8s_name.clone(),
            format!("{}/kubernetes/{}", self.module_root, provider),
            self.workdir(&k8s_name),
            self.runner.clone(),
        ));

        let kubeconfig_name = qualified(name, region, provider, KUBECONFIG_FILE);
        let variables = BTreeMap::from([
            ("kubernetes".to_string(), provider.to_string()),
            (
                "args".to_string(),
                serde_json::json!([k8s_name, region]).to_string(),
            ),
        ]);
        let kubeconfig_step = Step::single(
            ModuleTask::new(
                kubeconfig_name.clone(),
                kubeconfig_name.clone(),
                format!("{}/kubernetes/{}", self.module_root, KUBECONFIG_FILE),
                self.workdir(&kubeconfig_name),
                self.runner.clone(),
            )
            .with_variables(variables)
            .credential_source(true),
        );

        (cluster_step, kubeconfig_step)
    }

    /// Region-scoped shared resources, deployed onto the cluster through
    /// the kubeconfig the previous step wrote.
    fn resource_step(&self, name: &str, provider: &str, region: &str) -> Step {
        let resource_name = qualified(name, region, provider, "resource");
        let kubeconfig_dir = self.workdir(&qualified(name, region, provider, KUBECONFIG_FILE));

        let variables = BTreeMap::from([(
            "in_aws".to_string(),
            (provider == AWS_PROVIDER).to_string(),
        )]);
        let env = BTreeMap::from([(
            KUBECONFIG_ENV.to_string(),
            kubeconfig_dir
                .join(KUBECONFIG_FILE)
                .to_string_lossy()
                .into_owned(),
        )]);

        Step::single(
            ModuleTask::new(
                resource_name.clone(),
                resource_name.clone(),
                format!("{}/resource", self.module_root),
                self.workdir(&resource_name),
                self.runner.clone(),
            )
            .with_variables(variables)
            .with_env(env),
        )
    }

    fn workdir(&self, qualifier: &str) -> PathBuf {
        self.tmp_root.join(format!("{qualifier}-{}", self.run_id))
    }
}

fn qualified(name: &str, region: &str, provider: &str, module: &str) -> String {
    format!("{name}-{region}-{provider}-{module}")
}
