//! Writing exported images to disk.

use super::{ExportError, ExportFormat};
use crate::config::ExportConfig;
use crate::util::expand_tilde;
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// Where and how exported images are named.
#[derive(Debug, Clone)]
pub struct ExportFileConfig {
    /// Directory to save exports to.
    pub directory: PathBuf,
    /// Filename template (supports chrono format specifiers).
    pub filename_template: String,
}

impl Default for ExportFileConfig {
    fn default() -> Self {
        Self::from(&ExportConfig::default())
    }
}

impl From<&ExportConfig> for ExportFileConfig {
    fn from(config: &ExportConfig) -> Self {
        Self {
            directory: expand_tilde(&config.directory),
            filename_template: config.filename_template.clone(),
        }
    }
}

/// Generate a filename from the template and the current local time.
pub fn generate_filename(template: &str, format: ExportFormat) -> String {
    let now = Local::now();
    let stem = now.format(template).to_string();
    format!("{}.{}", stem, format.extension())
}

fn ensure_directory_exists(directory: &Path) -> Result<(), ExportError> {
    if !directory.exists() {
        log::info!("Creating export directory: {}", directory.display());
        fs::create_dir_all(directory)?;
    }
    Ok(())
}

/// Saves encoded image bytes under the export directory.
///
/// Returns the path of the written file. An existing file with the same
/// generated name gets a numeric suffix instead of being overwritten.
pub fn save_export(
    image_data: &[u8],
    format: ExportFormat,
    config: &ExportFileConfig,
) -> Result<PathBuf, ExportError> {
    ensure_directory_exists(&config.directory)?;

    let filename = generate_filename(&config.filename_template, format);
    let mut file_path = config.directory.join(&filename);
    let mut counter = 1u32;
    while file_path.exists() {
        let stem = filename
            .strip_suffix(&format!(".{}", format.extension()))
            .unwrap_or(&filename);
        file_path = config
            .directory
            .join(format!("{}-{}.{}", stem, counter, format.extension()));
        counter += 1;
    }

    log::info!(
        "Saving export to: {} ({} bytes)",
        file_path.display(),
        image_data.len()
    );
    fs::write(&file_path, image_data)?;

    Ok(file_path)
}
