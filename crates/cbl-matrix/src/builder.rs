//! Expansion of one (tree, toolchain) pair into a workflow.

use crate::job::{ConfigClass, job_id, job_name};
use crate::triggers::Triggers;
use crate::workflow::{Container, Job, Jobs, Step, Workflow};
use cbl_core::{Build, GeneratorConfig, LlvmVersion, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const CHECKOUT: &str = "actions/checkout@v3";
const RUST_TOOLCHAIN: &str = "dtolnay/rust-toolchain@stable";

/// Settings shared by every generated workflow.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Checkout root; patch directories are looked up relative to it.
    pub root: PathBuf,
    /// Top-of-tree LLVM major version, published as `nightly`.
    pub tot_version: Option<u32>,
    pub workflow_dir: String,
    pub tuxsuite_dir: String,
    pub patches_dir: String,
    /// Command run by cache-check jobs; exits 0 to run, 2 to skip.
    pub gate_command: String,
    /// Crate in the checkout that cache-check jobs install the gate from.
    /// `None` when `gate_command` is already available in the container.
    pub gate_source: Option<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            tot_version: None,
            workflow_dir: ".github/workflows".to_string(),
            tuxsuite_dir: "tuxsuite".to_string(),
            patches_dir: "patches".to_string(),
            gate_command: "cbl-ci should-run".to_string(),
            gate_source: Some("crates/cbl-cli".to_string()),
        }
    }
}

/// A rendered workflow and where it belongs in the checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedWorkflow {
    /// Path relative to the checkout root.
    pub path: PathBuf,
    pub workflow: Workflow,
    pub contents: String,
}

impl GeneratedWorkflow {
    /// Write the workflow below `root`, creating directories as needed.
    pub fn write(&self, root: &Path) -> Result<PathBuf> {
        let target = root.join(&self.path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, &self.contents)?;
        info!(path = %target.display(), jobs = self.workflow.jobs.len(), "Wrote workflow");
        Ok(target)
    }
}

/// Builds workflows from a generator config.
pub struct WorkflowBuilder<'a> {
    config: &'a GeneratorConfig,
    settings: &'a GeneratorSettings,
}

impl<'a> WorkflowBuilder<'a> {
    pub fn new(config: &'a GeneratorConfig, settings: &'a GeneratorSettings) -> Self {
        Self { config, settings }
    }

    /// Expand the builds of `tree_name` using `llvm_version` into a workflow.
    pub fn build(&self, tree_name: &str, llvm_version: LlvmVersion) -> Result<GeneratedWorkflow> {
        let (repo, git_ref) = self.config.get_repo_ref(tree_name)?;
        let toolchain = format!("clang-{}", llvm_version);
        let tuxsuite_yml = format!(
            "{}/{}-{}.tux.yml",
            self.settings.tuxsuite_dir, tree_name, toolchain
        );
        let workflow_yml = format!(
            "{}/{}-{}.yml",
            self.settings.workflow_dir, tree_name, toolchain
        );

        let mut check_logs: [Jobs; 3] = Default::default();
        for build in self.config.builds_for(repo, git_ref, llvm_version) {
            let class = ConfigClass::classify(build);
            let name = job_name(build);
            debug!(job = %name, class = class.as_str(), "Bucketed build");
            check_logs[class.index()].insert(job_id(&name), self.check_logs_job(build, name, class));
        }

        let cron = self.config.get_cron_schedule(tree_name, llvm_version)?;
        let mut workflow = Workflow::new(
            format!("{} ({})", tree_name, toolchain),
            Triggers::new(cron, &tuxsuite_yml, &workflow_yml),
        );

        let patch_series = self.patch_series_flag(tree_name);
        for class in ConfigClass::ALL {
            let checks = std::mem::take(&mut check_logs[class.index()]);
            // The defconfig kick-off always runs, even for trees without defconfigs
            if class != ConfigClass::Defconfigs && checks.is_empty() {
                continue;
            }
            workflow.jobs.extend(self.kick_off_jobs(
                class,
                llvm_version,
                repo,
                git_ref,
                &patch_series,
                &tuxsuite_yml,
            ));
            workflow.jobs.extend(checks);
        }

        let contents = workflow.render(&format!("cbl-ci generate {}", tree_name))?;
        Ok(GeneratedWorkflow {
            path: PathBuf::from(workflow_yml),
            workflow,
            contents,
        })
    }

    /// `--patch-series` argument for trees carrying local patches.
    fn patch_series_flag(&self, tree_name: &str) -> String {
        let relative = format!("{}/{}", self.settings.patches_dir, tree_name);
        let has_patches = std::fs::read_dir(self.settings.root.join(&relative))
            .map(|entries| {
                entries
                    .filter_map(|entry| entry.ok())
                    .any(|entry| entry.path().extension().is_some_and(|ext| ext == "patch"))
            })
            .unwrap_or(false);
        if has_patches {
            format!("--patch-series {} ", relative)
        } else {
            String::new()
        }
    }

    fn kick_off_jobs(
        &self,
        class: ConfigClass,
        llvm_version: LlvmVersion,
        repo: &str,
        git_ref: &str,
        patch_series: &str,
        tuxsuite_yml: &str,
    ) -> Jobs {
        let set = class.as_str();
        let cache_check_id = format!("cache_check_{}", set);
        let mut jobs = Jobs::new();

        let mut cache_check = Job::ubuntu(format!("cache check ({})", set));
        cache_check.container = Some(Container::Image(format!(
            "tuxmake/clang-{}",
            llvm_version.container_tag(self.settings.tot_version)
        )));
        cache_check.outputs.insert(
            "should_run".into(),
            "${{ steps.should_run.outputs.should_run }}".into(),
        );
        cache_check.permissions = Some("write-all".to_string());
        cache_check.steps.push(Step::uses(CHECKOUT));
        if let Some(source) = &self.settings.gate_source {
            cache_check.steps.extend(gate_install_steps(source));
        }
        cache_check.steps.push(
            Step::run("Should build run?", gate_script(&self.settings.gate_command))
                .with_id("should_run")
                .with_env("GITHUB_TOKEN", "${{ secrets.GITHUB_TOKEN }}"),
        );

        let mut kick = Job::ubuntu(format!("TuxSuite ({})", set));
        kick.needs = Some(cache_check_id.clone());
        kick.condition = Some(format!(
            "${{{{ needs.{}.outputs.should_run == 'true' }}}}",
            cache_check_id
        ));
        kick.container = Some(Container::Image("tuxsuite/tuxsuite".to_string()));
        kick.timeout_minutes = Some(480);
        kick.steps.push(Step::uses(CHECKOUT));
        kick.steps.push(Step::run(
            "tuxsuite",
            format!(
                "tuxsuite plan --git-repo {} --git-ref {} --job-name {} --json-out builds.json {}{}",
                repo, git_ref, set, patch_series, tuxsuite_yml
            ),
        ));
        kick.steps.push(Step {
            name: Some("save output".to_string()),
            ..Step::uses("actions/upload-artifact@v3")
        }
        .with_input("path", "builds.json")
        .with_input("name", format!("output_artifact_{}", set)));

        jobs.insert(cache_check_id, cache_check);
        jobs.insert(format!("kick_tuxsuite_{}", set), kick);
        jobs
    }

    fn check_logs_job(&self, build: &Build, name: String, class: ConfigClass) -> Job {
        let mut job = Job::ubuntu(name);
        job.needs = Some(format!("kick_tuxsuite_{}", class.as_str()));
        job.env.insert("ARCH".into(), build.arch.clone().into());
        let llvm_version: serde_yaml::Value = match build.llvm_version {
            LlvmVersion::Release(n) => n.into(),
            LlvmVersion::Nightly => "nightly".into(),
        };
        job.env.insert("LLVM_VERSION".into(), llvm_version);
        job.env.insert("BOOT".into(), u8::from(build.boot).into());
        job.env.insert("CONFIG".into(), build.config.to_string().into());
        job.container = Some(Container::WithOptions {
            image: "ghcr.io/clangbuiltlinux/qemu".to_string(),
            options: "--ipc=host".to_string(),
        });
        job.steps.push(Step::uses(CHECKOUT).with_input("submodules", true));
        job.steps.push(Step::run("Check Build and Boot Logs", "./check_logs.py"));
        job
    }
}

/// Steps building the gate from the checkout and putting it on `PATH`.
///
/// The tuxmake images carry no Rust toolchain. A failed install leaves the
/// gate command missing, which the gate step treats like any other error.
fn gate_install_steps(source: &str) -> [Step; 2] {
    [
        Step {
            name: Some("Install Rust".to_string()),
            ..Step::uses(RUST_TOOLCHAIN)
        }
        .allow_failure(),
        Step::run(
            "Install cbl-ci",
            format!(
                "cargo install --path {source} --root \"$RUNNER_TEMP/cbl-ci\"\n\
                 echo \"$RUNNER_TEMP/cbl-ci/bin\" >>$GITHUB_PATH\n"
            ),
        )
        .allow_failure(),
    ]
}

/// Shell snippet mapping the gate's exit status onto the `should_run`
/// output. Only a clean skip (status 2) disables the build.
fn gate_script(command: &str) -> String {
    format!(
        "if {command}; then\n\
         \x20 ret=0\n\
         else\n\
         \x20 ret=$?\n\
         fi\n\
         case $ret in\n\
         \x20 2) echo \"should_run=false\" >>$GITHUB_OUTPUT ;;\n\
         \x20 0) echo \"should_run=true\" >>$GITHUB_OUTPUT ;;\n\
         \x20 *) echo \"::warning::run gate failed with status $ret, building anyway\"\n\
         \x20    echo \"should_run=true\" >>$GITHUB_OUTPUT ;;\n\
         esac\n"
    )
}
