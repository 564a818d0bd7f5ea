use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// qsub and qstat stand-ins that leave a marker file behind when they are run
fn scheduler_stubs(dir: &Path) -> (PathBuf, PathBuf) {
    let stub = |name: &str| {
        let path = dir.join(name);
        let marker = dir.join(format!("{name}.called"));
        fs::write(&path, format!("#!/bin/sh\ntouch '{}'\necho 1\n", marker.display())).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    };
    (stub("qsub"), stub("qstat"))
}

fn qdask(dir: &Path, args: &[&str]) -> Output {
    let (qsub, qstat) = scheduler_stubs(dir);
    Command::new(env!("CARGO_BIN_EXE_qdask"))
        .arg("--qsub")
        .arg(&qsub)
        .arg("--qstat")
        .arg(&qstat)
        .arg("--work-dir")
        .arg(dir)
        .args(args)
        .current_dir(dir)
        .env("USER", "alice")
        .output()
        .expect("run qdask")
}

fn assert_usage_failure(args: &[&str]) {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = qdask(dir.path(), args);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1), "{args:?}: {stderr}");
    assert!(stderr.contains("Usage"), "{args:?}: {stderr}");
    assert!(!dir.path().join("qsub.called").exists(), "{args:?} ran qsub");
    assert!(!dir.path().join("qstat.called").exists(), "{args:?} ran qstat");
}

#[test]
fn submit_max_jobs_without_max_jobs() {
    assert_usage_failure(&["submit-max-jobs", "run.sh", "exp"]);
}

#[test]
fn launch_cluster_without_arguments() {
    assert_usage_failure(&["launch-cluster"]);
}

#[test]
fn submit_max_jobs_with_zero_max_jobs() {
    assert_usage_failure(&["submit-max-jobs", "run.sh", "exp", "0", "a"]);
}

#[test]
fn zero_max_jobs_shows_the_subcommand_usage() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = qdask(dir.path(), &["submit-max-jobs", "run.sh", "exp", "0", "a"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("<MAX_JOBS>"), "{stderr}");
}

#[test]
fn help_succeeds() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = qdask(dir.path(), &["--help"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("submit-max-jobs"));
}
