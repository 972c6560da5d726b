//! Analyze every trajectory in a directory.
//!
//! Each file is independent and writes its own results directory, so files
//! run in parallel on the blocking pool, at most `jobs` at a time. Results
//! are reported in file-name order.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

use pawtrace_common::config::AppConfig;

use super::{process_file, resolve_params, FileReport};
use crate::InputArgs;

pub async fn run(
    config: &AppConfig,
    dir: PathBuf,
    args: InputArgs,
    output: Option<PathBuf>,
    jobs: Option<usize>,
) -> anyhow::Result<()> {
    let params = Arc::new(resolve_params(config, &args)?);
    let inputs = csv_files(&dir)?;
    let jobs = jobs.unwrap_or(config.batch.max_parallel).max(1);

    println!(
        "Analyzing {} trajectories in {} ({} at a time)",
        inputs.len(),
        dir.display(),
        jobs
    );
    if inputs.is_empty() {
        println!("  No CSV files found.");
        return Ok(());
    }

    let semaphore = Arc::new(Semaphore::new(jobs));
    let mut handles = Vec::with_capacity(inputs.len());

    for input in inputs {
        let params = Arc::clone(&params);
        let bodypart = args.bodypart.clone();
        let output = output.clone();
        let suffix = config.batch.results_suffix.clone();
        let sem = Arc::clone(&semaphore);

        let task_input = input.clone();
        let handle: JoinHandle<FileOutcome> = tokio::spawn(async move {
            let _permit = match sem.acquire_owned().await {
                Ok(p) => p,
                Err(e) => {
                    return (task_input, Err(anyhow::anyhow!("Batch scheduler closed: {e}")))
                }
            };
            let job_input = task_input.clone();
            let result = tokio::task::spawn_blocking(move || {
                process_file(
                    &job_input,
                    &params,
                    bodypart.as_deref(),
                    output.as_deref(),
                    &suffix,
                    true,
                )
            })
            .await
            .unwrap_or_else(|e| Err(anyhow::anyhow!("Internal computation error: {e}")));
            (task_input, result)
        });
        handles.push((input, handle));
    }

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (input, handle) in handles {
        collect(joined(input, handle.await), &mut reports, &mut failures);
    }

    for report in &reports {
        println!("  {}: {}", report.input.display(), report.summary());
    }

    if failures.is_empty() {
        println!("\nBatch complete: {} file(s) analyzed.", reports.len());
        Ok(())
    } else {
        println!("\nFailures:");
        for (input, error) in &failures {
            println!("  - {}: {error}", input.display());
        }
        anyhow::bail!(
            "{} of {} file(s) failed",
            failures.len(),
            failures.len() + reports.len()
        )
    }
}

type FileOutcome = (PathBuf, anyhow::Result<FileReport>);

/// A task that died before reporting counts as a failure of its file.
fn joined(input: PathBuf, join: Result<FileOutcome, JoinError>) -> FileOutcome {
    join.unwrap_or_else(|e| (input, Err(anyhow::anyhow!("Internal computation error: {e}"))))
}

fn collect(
    (input, result): FileOutcome,
    reports: &mut Vec<FileReport>,
    failures: &mut Vec<(PathBuf, anyhow::Error)>,
) {
    match result {
        Ok(report) => {
            tracing::info!(input = %input.display(), outcome = %report.summary(), "file analyzed");
            reports.push(report);
        }
        Err(e) => {
            tracing::warn!(input = %input.display(), error = %e, "file failed");
            failures.push((input, e));
        }
    }
}

/// CSV files directly inside `dir`, sorted by name.
fn csv_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {e}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_task_is_collected_as_failure() {
        let handle = tokio::spawn(std::future::pending::<FileOutcome>());
        handle.abort();
        let input = PathBuf::from("mouse2.csv");

        let mut reports = Vec::new();
        let mut failures = Vec::new();
        collect(joined(input.clone(), handle.await), &mut reports, &mut failures);

        assert!(reports.is_empty());
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, input);
        assert!(failures[0].1.to_string().contains("Internal computation error"));
    }

    #[test]
    fn test_csv_files_filters_and_sorts() {
        let dir = std::env::temp_dir().join("pawtrace_test_batch_listing");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("nested.csv")).unwrap();
        for name in ["b.csv", "a.CSV", "notes.txt"] {
            std::fs::write(dir.join(name), "x,y,likelihood\n").unwrap();
        }

        let files = csv_files(&dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.CSV", "b.csv"]);

        std::fs::remove_dir_all(&dir).ok();
    }
}
