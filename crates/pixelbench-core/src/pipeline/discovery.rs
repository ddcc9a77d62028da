//! Input discovery and output-directory preparation for a directory batch.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::{Config, ProcessingConfig};
use crate::error::ConfigError;
use crate::types::{ExecutionModel, ImageJob};

/// Entry kept when the output directory is cleared.
pub const PLACEHOLDER_FILE: &str = ".gitkeep";

/// Finds image files directly inside a directory.
pub struct FileDiscovery {
    config: ProcessingConfig,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: ProcessingConfig) -> Self {
        Self { config }
    }

    /// List supported files in `dir` (not recursive), sorted by path.
    pub fn discover(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| self.is_supported(p))
            .collect();

        // Sort by path for deterministic ordering
        files.sort();
        files
    }

    /// Check if a file has a supported extension (case-insensitive).
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    /// Validate the input directory and build one job per image, each
    /// writing a file of the same name into `output_dir`.
    pub fn plan_jobs(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<Vec<ImageJob>, ConfigError> {
        if !input_dir.is_dir() {
            return Err(ConfigError::InputDirNotFound(input_dir.to_path_buf()));
        }

        let jobs: Vec<ImageJob> = self
            .discover(input_dir)
            .into_iter()
            .filter_map(|source| {
                let name = source.file_name()?.to_owned();
                Some(ImageJob::new(source, output_dir.join(name)))
            })
            .collect();

        if jobs.is_empty() {
            return Err(ConfigError::NoImages(input_dir.to_path_buf()));
        }
        Ok(jobs)
    }
}

/// Empty `dir` except for the placeholder entry, creating it if missing.
pub fn clear_output_dir(dir: &Path) -> std::io::Result<()> {
    if !dir.exists() {
        return std::fs::create_dir_all(dir);
    }

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name() == PLACEHOLDER_FILE {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            std::fs::remove_dir_all(&path)?;
        } else {
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Build the job list for a directory run of `model`.
///
/// The input directory is validated before the output directory is
/// touched, so a configuration error leaves the filesystem as it was.
pub fn prepare_batch(
    config: &Config,
    model: ExecutionModel,
) -> Result<Vec<ImageJob>, ConfigError> {
    let input_dir = config.input_dir();
    let output_dir = config.output_dir(model);

    let jobs =
        FileDiscovery::new(config.processing.clone()).plan_jobs(&input_dir, &output_dir)?;
    clear_output_dir(&output_dir).map_err(|e| ConfigError::OutputDir {
        path: output_dir.clone(),
        message: e.to_string(),
    })?;

    tracing::debug!(
        "Prepared {} jobs from {:?} into {:?}",
        jobs.len(),
        input_dir,
        output_dir
    );
    Ok(jobs)
}
