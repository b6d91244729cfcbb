use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::core::StatisticError;
use crate::sink::{SampleDataset, SampleSink};

/// Writes each dataset to `<dir>/iteration_<i>_<statistic>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirectorySink {
    directory: PathBuf,
    written: Vec<PathBuf>,
}

impl JsonDirectorySink {
    /// Creates `directory` if needed.
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self, StatisticError> {
        fs::create_dir_all(directory.as_ref())?;
        Ok(Self {
            directory: directory.as_ref().to_path_buf(),
            written: Vec::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Files written so far, oldest first.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn path_for(&self, dataset: &SampleDataset) -> PathBuf {
        let statistic: String = dataset
            .statistic
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.directory
            .join(format!("iteration_{:04}_{statistic}.json", dataset.iteration))
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<SampleDataset, StatisticError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl SampleSink for JsonDirectorySink {
    fn save(&mut self, dataset: &SampleDataset) -> Result<(), StatisticError> {
        let path = self.path_for(dataset);
        let mut w = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut w, dataset)?;
        w.flush()?;
        debug!("wrote {} samples to {}", dataset.len(), path.display());
        self.written.push(path);
        Ok(())
    }
}
