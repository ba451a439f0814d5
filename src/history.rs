// ABOUTME: Append-only deployment history log in JSON lines format.
// ABOUTME: One record per dispatch; read back for the history command and charts.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::dispatch::DeploymentOutcome;
use crate::error::{Error, Result};
use crate::plan::{DeploymentKind, DeploymentPlan, Platform};

/// One dispatched deployment, as recorded in the log.
///
/// Platform and kind are absent when routing itself failed, since no plan
/// was ever produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<DeploymentKind>,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Success,
    Failure,
}

impl DeploymentRecord {
    pub fn from_outcome(plan: Option<&DeploymentPlan>, outcome: &DeploymentOutcome) -> Self {
        let platform = plan.map(DeploymentPlan::platform);
        let kind = plan.map(DeploymentPlan::kind);

        match outcome {
            DeploymentOutcome::Success { resource } => Self {
                timestamp: Utc::now(),
                platform,
                kind,
                status: RecordStatus::Success,
                resource_id: Some(resource.id().to_string()),
                error: None,
            },
            DeploymentOutcome::Failure { error } => Self {
                timestamp: Utc::now(),
                platform,
                kind,
                status: RecordStatus::Failure,
                resource_id: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// Append-only log store for deployment records.
pub struct HistoryLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl HistoryLog {
    /// Open (creating if needed) the log at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a JSON line.
    pub fn append(&self, record: &DeploymentRecord) -> Result<()> {
        let line = serde_json::to_string(record).map_err(|e| Error::History(e.to_string()))?;
        let mut file = self.file.lock();
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Load all records, oldest first. Unparseable lines are skipped with
    /// a warning rather than failing the whole read.
    pub fn load(path: &Path) -> Result<Vec<DeploymentRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => tracing::warn!("Skipping unparseable history line: {e}"),
            }
        }

        Ok(records)
    }
}
