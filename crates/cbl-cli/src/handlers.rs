//! Command handlers.

use crate::config::CliConfig;
use cbl_core::{Error, GeneratorConfig, LlvmVersion};
use cbl_matrix::{GeneratorSettings, WorkflowBuilder};
use cbl_runner::env::tree_from_key;
use cbl_runner::{
    ActionsContext, BootTest, CommandProbe, GateOutcome, GitIdentity, GitStateChannel,
    GitStateSettings, RunGate,
};
use console::style;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Generate the workflows of a tree.
pub fn generate(
    config: &CliConfig,
    root: &Path,
    tree: &str,
    llvm_version: Option<LlvmVersion>,
    stdout: bool,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let generator = GeneratorConfig::from_file(&root.join(&config.generator_file))?;

    let tot_file = root.join(&config.tot_version_file);
    let tot_version = if tot_file.exists() {
        Some(LlvmVersion::read_tot(&tot_file)?)
    } else {
        debug!(path = %tot_file.display(), "No top-of-tree version file");
        None
    };

    let settings = GeneratorSettings {
        root: root.to_path_buf(),
        tot_version,
        workflow_dir: config.workflow_dir.clone(),
        tuxsuite_dir: config.tuxsuite_dir.clone(),
        patches_dir: config.patches_dir.clone(),
        gate_command: config.gate_command.clone(),
        gate_source: config.gate_source.clone(),
    };

    let versions = match llvm_version {
        Some(version) => vec![version],
        None => generator.llvm_versions(tree)?,
    };
    if versions.is_empty() {
        warn!(tree, "No builds configured for tree");
    }

    // Build everything first so a bad toolchain leaves no partial output
    let builder = WorkflowBuilder::new(&generator, &settings);
    let workflows = versions
        .into_iter()
        .map(|version| builder.build(tree, version))
        .collect::<Result<Vec<_>, _>>()?;

    let mut written = Vec::new();
    for generated in workflows {
        if stdout {
            print!("{}", generated.contents);
            continue;
        }
        let path = generated.write(root)?;
        println!(
            "{} Wrote {} ({} jobs)",
            style("✓").green(),
            generated.path.display(),
            generated.workflow.jobs.len()
        );
        written.push(path);
    }
    Ok(written)
}

/// Evaluate the run gate for the calling workflow.
///
/// Setup failures are reported as [`GateOutcome::Errored`] like any other
/// failure so they never skip a build.
pub fn should_run(config: &CliConfig) -> GateOutcome {
    let outcome = match prepare_gate(config) {
        Ok((gate, mut channel)) => gate.evaluate(&mut channel, &CommandProbe::new(&config.compiler)),
        Err(e) => GateOutcome::Errored(e),
    };
    match &outcome {
        GateOutcome::Run => println!("{} Inputs changed, build should run", style("▶").cyan()),
        GateOutcome::Skip => println!("{} No changes since last run", style("i").blue()),
        GateOutcome::Errored(e) => {
            eprintln!("{} Run gate failed: {}", style("✗").red(), e)
        }
    }
    outcome
}

fn prepare_gate(config: &CliConfig) -> Result<(RunGate, GitStateChannel), Error> {
    let ctx = ActionsContext::from_env()?;
    ctx.ensure_owner(config.allowed_owner.as_deref())?;

    let key = ctx.workflow_key()?;
    let tree = tree_from_key(&key)?;
    let generator = GeneratorConfig::from_file(&ctx.workspace.join(&config.generator_file))?;
    let (repo, git_ref) = generator.get_repo_ref(&tree)?;
    info!(key = %key, tree = %tree, repo, git_ref, "Evaluating run gate");

    let channel = GitStateChannel::open(GitStateSettings {
        clone_url: ctx.clone_url(),
        push_url: Some(ctx.push_url()),
        workdir: ctx.state_checkout(),
        identity: GitIdentity::github_user(&ctx.actor),
    })?;
    Ok((RunGate::new(key, repo, git_ref), channel))
}

/// Boot a kernel image.
pub fn boot_test(kernel_url: &str, workdir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&workdir)?;
    let workdir = workdir.canonicalize()?;
    BootTest::new(kernel_url, workdir).run()?;
    println!("{} Kernel booted", style("✓").green());
    Ok(())
}

/// Print the calling workflow's reference.
pub fn workflow_ref() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var_os("GITHUB_ACTIONS").is_none() {
        return Err(Error::WrongContext("Not running on GitHub Actions?".to_string()).into());
    }
    let workflow_ref =
        std::env::var("GITHUB_WORKFLOW_REF").map_err(|_| Error::MissingEnv("GITHUB_WORKFLOW_REF"))?;
    println!("GITHUB_WORKFLOW_REF: {}", workflow_ref);
    Ok(())
}

/// Show configuration.
pub fn show_config(
    config: &CliConfig,
    path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Current configuration:");
    print!("{}", serde_yaml::to_string(config)?);

    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => CliConfig::config_path().ok(),
    };
    if let Some(path) = path {
        println!("\nConfig file: {}", path.display());
    }
    Ok(())
}

/// Set configuration.
pub fn set_config(
    mut config: CliConfig,
    path: Option<&Path>,
    key: &str,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    config.set(key, value)?;
    let saved = config.save(path)?;

    println!(
        "{} Set {} = {} ({})",
        style("✓").green(),
        key,
        value,
        saved.display()
    );
    Ok(())
}
