//! State branches against a local bare repository.

use cbl_core::{Result, RunInfo, StateChannel, StateProbe};
use cbl_runner::{GateOutcome, GitIdentity, GitStateChannel, GitStateSettings, Invocation, RunGate};
use std::path::{Path, PathBuf};

const KEY: &str = "mainline-clang-17";

fn git_available() -> bool {
    Invocation::new("git").arg("--version").run().is_ok()
}

fn git(dir: &Path, args: &[&str]) -> String {
    Invocation::new("git")
        .args(["-c", "user.name=seed", "-c", "user.email=seed@example.com"])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git")
}

/// Bare repository with one commit on its default branch.
fn seed_remote(root: &Path) -> PathBuf {
    let seed = root.join("seed");
    std::fs::create_dir_all(&seed).unwrap();
    git(&seed, &["init", "-q"]);
    std::fs::write(seed.join("generator.yml"), "trees: []\n").unwrap();
    git(&seed, &["add", "generator.yml"]);
    git(&seed, &["commit", "-q", "-m", "Initial commit"]);

    let remote = root.join("remote.git");
    git(
        root,
        &["clone", "-q", "--bare", seed.to_str().unwrap(), remote.to_str().unwrap()],
    );
    remote
}

fn open(remote: &Path, workdir: PathBuf) -> GitStateChannel {
    GitStateChannel::open(GitStateSettings {
        clone_url: remote.to_string_lossy().into_owned(),
        push_url: None,
        workdir,
        identity: GitIdentity::github_user("ci-bot"),
    })
    .expect("open state channel")
}

fn commit_count(remote: &Path) -> String {
    git(remote, &["rev-list", "--count", KEY]).trim().to_string()
}

#[test]
fn test_orphan_branch_round_trip() {
    if !git_available() {
        return;
    }
    let root = tempfile::tempdir().unwrap();
    let remote = seed_remote(root.path());

    let mut first = open(&remote, root.path().join("w1"));
    assert_eq!(first.load(KEY).unwrap(), None);
    first
        .store(KEY, &RunInfo::new("clang version 17.0.6", "aaa"))
        .unwrap();

    // The state branch holds only the record
    assert_eq!(
        git(&remote, &["ls-tree", "--name-only", KEY]).trim(),
        "last_run_info.json"
    );
    assert_eq!(commit_count(&remote), "1");

    let mut second = open(&remote, root.path().join("w2"));
    assert_eq!(
        second.load(KEY).unwrap(),
        Some(RunInfo::new("clang version 17.0.6", "aaa"))
    );

    // Storing an identical record creates no commit
    second
        .store(KEY, &RunInfo::new("clang version 17.0.6", "aaa"))
        .unwrap();
    assert_eq!(commit_count(&remote), "1");

    second
        .store(KEY, &RunInfo::new("clang version 17.0.6", "bbb"))
        .unwrap();
    assert_eq!(commit_count(&remote), "2");
    let stored = git(&remote, &["show", &format!("{}:last_run_info.json", KEY)]);
    assert_eq!(
        serde_json::from_str::<RunInfo>(&stored).unwrap(),
        RunInfo::new("clang version 17.0.6", "bbb")
    );
}

#[test]
fn test_unreadable_record_is_replaced() {
    if !git_available() {
        return;
    }
    let root = tempfile::tempdir().unwrap();
    let remote = seed_remote(root.path());

    let mut first = open(&remote, root.path().join("w1"));
    first
        .store(KEY, &RunInfo::new("clang version 17.0.6", "aaa"))
        .unwrap();

    // Two records written over each other
    let clone = root.path().join("w1");
    std::fs::write(
        clone.join("last_run_info.json"),
        r#"{"compiler": "clang version 17.0.6", "sha": "bbb"}{"compiler": "clang version 17.0.6", "sha": "aaa"}"#,
    )
    .unwrap();
    git(&clone, &["commit", "-q", "-a", "-m", "Corrupt record"]);
    git(&clone, &["push", "-q", "origin", &format!("HEAD:{}", KEY)]);
    assert_eq!(commit_count(&remote), "2");

    let mut second = open(&remote, root.path().join("w2"));
    assert_eq!(second.load(KEY).unwrap(), None);
    second
        .store(KEY, &RunInfo::new("clang version 17.0.6", "ccc"))
        .unwrap();
    assert_eq!(commit_count(&remote), "3");

    let mut third = open(&remote, root.path().join("w3"));
    assert_eq!(
        third.load(KEY).unwrap(),
        Some(RunInfo::new("clang version 17.0.6", "ccc"))
    );
}

struct FixedProbe(&'static str);

impl StateProbe for FixedProbe {
    fn compiler_version(&self) -> Result<String> {
        Ok("clang version 17.0.6".to_string())
    }

    fn remote_sha(&self, _repo: &str, _git_ref: &str) -> Result<String> {
        Ok(self.0.to_string())
    }
}

#[test]
fn test_gate_over_git_state() {
    if !git_available() {
        return;
    }
    let root = tempfile::tempdir().unwrap();
    let remote = seed_remote(root.path());
    let gate = RunGate::new(KEY, "https://example.com/linux.git", "master");

    let mut channel = open(&remote, root.path().join("run1"));
    assert!(matches!(gate.evaluate(&mut channel, &FixedProbe("aaa")), GateOutcome::Run));

    let mut channel = open(&remote, root.path().join("run2"));
    assert!(matches!(gate.evaluate(&mut channel, &FixedProbe("aaa")), GateOutcome::Skip));
    assert_eq!(commit_count(&remote), "1");

    let mut channel = open(&remote, root.path().join("run3"));
    assert!(matches!(gate.evaluate(&mut channel, &FixedProbe("bbb")), GateOutcome::Run));
    assert_eq!(commit_count(&remote), "2");
}

#[test]
fn test_clone_failure_is_error() {
    if !git_available() {
        return;
    }
    let root = tempfile::tempdir().unwrap();
    let result = GitStateChannel::open(GitStateSettings {
        clone_url: root.path().join("missing.git").to_string_lossy().into_owned(),
        push_url: None,
        workdir: root.path().join("w"),
        identity: GitIdentity::github_user("ci-bot"),
    });
    assert!(result.is_err());
}
