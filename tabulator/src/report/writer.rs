use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes report files into one output directory, creating it on first use.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn write(&self, file_name: &str, contents: &str) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("creating output directory {}", self.output_dir.display()))?;
        let path = self.output_dir.join(file_name);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        log::info!(target: "tabulator::report", "wrote {}", path.display());
        Ok(path)
    }
}
