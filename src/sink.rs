use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use vsearch_core::TrialRecord;
use vsearch_experiment::{DataSink, ExperimentConfig};

/// Writes one JSON object per trial. Appends are buffered and only reach the
/// disk on `flush`, which the session calls at the end of each block.
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
    pending: usize,
    written: usize,
}

impl JsonLinesSink {
    /// Opens `<dir>/<experiment>_<subject>.jsonl` for appending, so a rerun
    /// for the same subject never clobbers earlier data.
    pub fn create(dir: &Path, experiment_name: &str, subject: &str) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create data directory {}", dir.display()))?;
        let path = dir.join(format!("{experiment_name}_{subject}.jsonl"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        info!(path = %path.display(), "writing trial data");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            pending: 0,
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records made durable so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl DataSink for JsonLinesSink {
    fn append(&mut self, record: &TrialRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.pending += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        self.writer.get_ref().sync_data()?;
        self.written += self.pending;
        debug!(records = self.pending, total = self.written, "flushed trial data");
        self.pending = 0;
        Ok(())
    }
}

/// Session metadata stored next to the trial data.
#[derive(Debug, Serialize)]
pub struct SessionInfo<'a> {
    pub subject: &'a str,
    pub started_at: f64,
    pub seed: u64,
    pub mode: &'a str,
    pub config: &'a ExperimentConfig,
}

pub fn write_session_info(dir: &Path, info: &SessionInfo<'_>) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create data directory {}", dir.display()))?;
    let path = dir.join(format!(
        "{}_{}_info.json",
        info.config.experiment_name, info.subject
    ));
    let serialized = serde_json::to_string_pretty(info)?;
    fs::write(&path, serialized)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vsearch-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    fn record(trial: usize) -> TrialRecord {
        TrialRecord {
            subject: "7".into(),
            block: 0,
            trial,
            timestamp: 1_700_000_000.5,
            set_size: 2,
            rt_ms: 420.0,
            cresp: "up".into(),
            resp: "up".into(),
            acc: 1,
            location_tested: 1,
            locations: "[[1.0,2.0],[-3.0,0.5]]".into(),
            rotations: "[90,0]".into(),
            stimuli: "['L1', 'T']".into(),
        }
    }

    #[test]
    fn lines_land_on_flush_with_data_column_names() {
        let dir = scratch_dir("sink");
        let mut sink = JsonLinesSink::create(&dir, "VisualSearch", "7").unwrap();
        sink.append(&record(0)).unwrap();
        sink.append(&record(1)).unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.written(), 2);

        let text = fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["Trial"], 1);
        assert_eq!(lines[0]["RT"], 420.0);
        assert_eq!(lines[0]["Stimuli"], "['L1', 'T']");
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn reopening_appends() {
        let dir = scratch_dir("sink-append");
        for trial in 0..2 {
            let mut sink = JsonLinesSink::create(&dir, "VisualSearch", "3").unwrap();
            sink.append(&record(trial)).unwrap();
            sink.flush().unwrap();
        }
        let text = fs::read_to_string(dir.join("VisualSearch_3.jsonl")).unwrap();
        assert_eq!(text.lines().count(), 2);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn session_info_names_subject() {
        let dir = scratch_dir("info");
        let config = ExperimentConfig::default();
        let path = write_session_info(
            &dir,
            &SessionInfo {
                subject: "12",
                started_at: 1.0,
                seed: 99,
                mode: "simulate",
                config: &config,
            },
        )
        .unwrap();
        assert!(path.ends_with("VisualSearch_12_info.json"));
        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["seed"], 99);
        assert_eq!(value["config"]["trials_per_block"], 10);
        fs::remove_dir_all(dir).unwrap();
    }
}
