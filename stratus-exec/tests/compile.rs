use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use stratus_core::{Cluster, Platform, Region};
use stratus_exec::compile::{Compiler, RunId};
use stratus_exec::runner::{Invocation, RunnerError, ToolRunner};
use stratus_exec::task::Task;

// Records every invocation instead of running anything.
#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<Invocation>>,
}

impl RecordingRunner {
    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToolRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> Result<(), RunnerError> {
        self.calls.lock().unwrap().push(invocation.clone());
        Ok(())
    }
}

fn region(provider: &str, region: &str) -> Region {
    Region {
        provider: provider.to_string(),
        region: region.to_string(),
        control: vec![],
        resource: vec![],
        network: vec![],
    }
}

fn platform(name: &str, kv: &str, regions: Vec<Region>) -> Platform {
    Platform {
        name: name.to_string(),
        domain: String::new(),
        gslb: String::new(),
        kv: kv.to_string(),
        regions,
    }
}

fn compiler(runner: Arc<RecordingRunner>) -> Compiler {
    Compiler::new(runner, RunId::from_raw(42)).with_tmp_root("/tmp")
}

#[test]
fn platform_with_no_regions_compiles_to_bootstrap_steps_only() {
    let steps = compiler(Arc::new(RecordingRunner::default()))
        .platform_steps(&platform("demo", "consul", vec![]))
        .unwrap();

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].tasks()[0].id(), "demo-check-remote-state");
    assert_eq!(steps[1].tasks()[0].id(), "demo-kv");
}

#[test]
fn platform_compiles_to_two_plus_three_steps_per_region() {
    let regions = vec![
        region("aws", "us-east-1"),
        region("azure", "uksouth"),
        region("gcp", "europe-west2"),
    ];
    let steps = compiler(Arc::new(RecordingRunner::default()))
        .platform_steps(&platform("demo", "consul", regions))
        .unwrap();

    assert_eq!(steps.len(), 2 + 3 * 3);

    // Region groups in declaration order: cluster, kubeconfig, resources.
    assert_eq!(steps[2].tasks()[0].id(), "demo-us-east-1-aws-k8s");
    assert_eq!(steps[3].tasks()[0].id(), "demo-us-east-1-aws-kubeconfig");
    assert_eq!(steps[4].tasks()[0].id(), "demo-us-east-1-aws-resource");
    assert_eq!(steps[5].tasks()[0].id(), "demo-uksouth-azure-k8s");
    assert_eq!(steps[8].tasks()[0].id(), "demo-europe-west2-gcp-k8s");
}

#[tokio::test]
async fn working_directories_are_unique_and_suffixed_with_the_run_id() {
    let runner = Arc::new(RecordingRunner::default());
    let steps = compiler(runner.clone())
        .platform_steps(&platform(
            "demo",
            "consul",
            vec![region("aws", "us-east-1"), region("azure", "uksouth")],
        ))
        .unwrap();

    // Drive every module task through one subcommand to observe its
    // working directory. The barrier contributes no invocation.
    for step in &steps {
        for task in step.tasks() {
            task.plan().await.unwrap();
        }
    }

    let dirs: Vec<PathBuf> = runner.calls().iter().map(|c| c.dir.clone()).collect();
    assert_eq!(dirs.len(), steps.len() - 1);

    let unique: BTreeSet<&PathBuf> = dirs.iter().collect();
    assert_eq!(unique.len(), dirs.len());
    for dir in &dirs {
        assert!(dir.to_string_lossy().ends_with("-42"), "{dirs:?}");
    }
}

#[tokio::test]
async fn demo_platform_compiles_to_the_expected_five_steps() {
    let runner = Arc::new(RecordingRunner::default());
    let steps = compiler(runner.clone())
        .platform_steps(&platform("demo", "consul", vec![region("aws", "us-east-1")]))
        .unwrap();

    assert_eq!(steps.len(), 5);
    assert_eq!(steps[0].tasks()[0].id(), "demo-check-remote-state");
    assert_eq!(steps[1].tasks()[0].id(), "demo-kv");
    assert_eq!(steps[2].tasks()[0].id(), "demo-us-east-1-aws-k8s");
    assert_eq!(steps[3].tasks()[0].id(), "demo-us-east-1-aws-kubeconfig");
    assert_eq!(steps[4].tasks()[0].id(), "demo-us-east-1-aws-resource");

    // Inspect the assembled invocations for the kv, kubeconfig, and
    // resource modules.
    steps[1].tasks()[0].apply().await.unwrap();
    steps[3].tasks()[0].apply().await.unwrap();
    steps[4].tasks()[0].apply().await.unwrap();
    let calls = runner.calls();

    let kv = &calls[0];
    assert_eq!(kv.dir, PathBuf::from("/tmp/demo-kv-42"));

    let kubeconfig = &calls[1];
    assert_eq!(kubeconfig.variables["kubernetes"], "aws");
    assert_eq!(
        kubeconfig.variables["args"],
        r#"["demo-us-east-1-aws-k8s","us-east-1"]"#
    );
    assert_eq!(
        kubeconfig.dir,
        PathBuf::from("/tmp/demo-us-east-1-aws-kubeconfig-42")
    );

    let resource = &calls[2];
    assert_eq!(resource.variables["in_aws"], "true");
    assert_eq!(
        resource.env["KUBECONFIG"],
        "/tmp/demo-us-east-1-aws-kubeconfig-42/kubeconfig"
    );
}

#[tokio::test]
async fn non_aws_regions_get_in_aws_false() {
    let runner = Arc::new(RecordingRunner::default());
    let steps = compiler(runner.clone())
        .platform_steps(&platform("demo", "consul", vec![region("azure", "uksouth")]))
        .unwrap();

    steps[4].tasks()[0].apply().await.unwrap();
    assert_eq!(runner.calls()[0].variables["in_aws"], "false");
}

#[test]
fn kubeconfig_tasks_are_the_only_credential_sources() {
    let steps = compiler(Arc::new(RecordingRunner::default()))
        .platform_steps(&platform("demo", "consul", vec![region("aws", "us-east-1")]))
        .unwrap();

    let credential_ids: Vec<&str> = steps
        .iter()
        .flat_map(|s| s.tasks())
        .filter(|t| t.supplies_teardown_credentials())
        .map(|t| t.id())
        .collect();
    assert_eq!(credential_ids, vec!["demo-us-east-1-aws-kubeconfig"]);
}

#[test]
fn cluster_compiles_to_cluster_then_kubeconfig() {
    let cluster = Cluster {
        name: "edge".to_string(),
        region: "uksouth".to_string(),
        provider: "azure".to_string(),
    };
    let steps = compiler(Arc::new(RecordingRunner::default()))
        .cluster_steps(&cluster)
        .unwrap();

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].tasks()[0].id(), "edge-uksouth-azure-k8s");
    assert_eq!(steps[1].tasks()[0].id(), "edge-uksouth-azure-kubeconfig");
    assert!(steps[1].tasks()[0].supplies_teardown_credentials());
}

#[test]
fn invalid_platform_fails_compilation() {
    let result = compiler(Arc::new(RecordingRunner::default()))
        .platform_steps(&platform("", "consul", vec![]));
    assert!(result.is_err());
}
