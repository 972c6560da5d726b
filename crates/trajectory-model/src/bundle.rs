//! On-disk layout of analysis results.
//!
//! ```text
//! <stem>_results/
//!   catch_analysis_results.csv     metrics table (header even when empty)
//!   context.json                   full AnalysisContext
//!   manifest.json                  run parameters and timestamp
//!   trajectories/trajectory_N.csv  one smoothed slice per event
//!   figures/chart_data.json        data for charting collaborators
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::context::AnalysisContext;
use crate::metrics::metrics_table;
use crate::params::AnalysisParams;

/// File name of the metrics table.
pub const METRICS_FILE: &str = "catch_analysis_results.csv";

/// Metadata describing a persisted run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleManifest {
    /// Schema version.
    pub version: String,
    /// Input the results were computed from.
    pub source: String,
    /// Wall-clock time of the run (ISO 8601).
    pub created_at: String,
    /// Parameters used.
    pub params: AnalysisParams,
    /// Number of detected events.
    pub event_count: usize,
}

/// A results directory for one trajectory.
#[derive(Debug, Clone)]
pub struct ResultsBundle {
    root: PathBuf,
}

impl ResultsBundle {
    /// Create the results directory structure.
    pub fn create(root: impl AsRef<Path>) -> Result<Self, BundleError> {
        let root = root.as_ref().to_path_buf();
        for dir in [root.clone(), root.join("trajectories"), root.join("figures")] {
            std::fs::create_dir_all(&dir).map_err(|e| BundleError::Io {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(Self { root })
    }

    /// Results directory for an input file: `<dir>/<stem><suffix>`.
    pub fn path_for_input(input: &Path, output_dir: Option<&Path>, suffix: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "trajectory".to_string());
        let parent = output_dir
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        parent.join(format!("{stem}{suffix}"))
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.root.join(METRICS_FILE)
    }

    pub fn trajectories_dir(&self) -> PathBuf {
        self.root.join("trajectories")
    }

    pub fn figures_dir(&self) -> PathBuf {
        self.root.join("figures")
    }

    /// Write the metrics table. Zero events still writes the full header.
    pub fn write_metrics(&self, context: &AnalysisContext) -> Result<PathBuf, BundleError> {
        let path = self.metrics_path();
        write_text(&path, &metrics_table(&context.results))?;
        Ok(path)
    }

    /// Write one `frame,time,x,y` file per event, removing stale files first.
    ///
    /// Returns the number of files written.
    pub fn write_event_trajectories(&self, context: &AnalysisContext) -> Result<usize, BundleError> {
        let dir = self.trajectories_dir();
        self.clear_stale_trajectories(&dir)?;

        let mut written = 0;
        for index in 0..context.grab_events.len() {
            let Some(rows) = context.event_trajectory(index) else {
                continue;
            };
            let mut out = String::from("frame,time,x,y\n");
            for row in rows {
                out.push_str(&format!(
                    "{},{:.6},{},{}\n",
                    row.frame,
                    row.time,
                    fmt_opt(row.x),
                    fmt_opt(row.y)
                ));
            }
            write_text(&dir.join(format!("trajectory_{}.csv", index + 1)), &out)?;
            written += 1;
        }
        Ok(written)
    }

    /// Write the full context as JSON.
    pub fn write_context(&self, context: &AnalysisContext) -> Result<PathBuf, BundleError> {
        let path = self.root.join("context.json");
        write_json(&path, context)?;
        Ok(path)
    }

    /// Write the run manifest.
    pub fn write_manifest(&self, manifest: &BundleManifest) -> Result<PathBuf, BundleError> {
        let path = self.root.join("manifest.json");
        write_json(&path, manifest)?;
        Ok(path)
    }

    /// Write any serializable chart payload under `figures/`.
    pub fn write_figure_data<T: Serialize>(
        &self,
        name: &str,
        data: &T,
    ) -> Result<PathBuf, BundleError> {
        let path = self.figures_dir().join(name);
        write_json(&path, data)?;
        Ok(path)
    }

    fn clear_stale_trajectories(&self, dir: &Path) -> Result<(), BundleError> {
        for path in trajectory_files(dir)? {
            std::fs::remove_file(&path).map_err(|e| BundleError::Io { path, source: e })?;
        }
        Ok(())
    }
}

fn trajectory_files(dir: &Path) -> Result<Vec<PathBuf>, BundleError> {
    let entries = std::fs::read_dir(dir).map_err(|e| BundleError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files = vec![];
    for entry in entries {
        let entry = entry.map_err(|e| BundleError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with("trajectory_") && name.ends_with(".csv") {
            files.push(entry.path());
        }
    }
    Ok(files)
}

fn write_text(path: &Path, content: &str) -> Result<(), BundleError> {
    std::fs::write(path, content).map_err(|e| BundleError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), BundleError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| BundleError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;
    write_text(path, &json)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

/// Errors that can occur when persisting results.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error for {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },
}
