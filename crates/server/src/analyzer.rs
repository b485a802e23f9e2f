use std::sync::Arc;

use energia_core::analysis::{
    Preview, PreviewHandles, ProgressSink, ProgressUpdate, UploadSelection,
};
use energia_core::domain::analysis::{AnalysisResult, SelectedFile};
use energia_core::{AnalysisEngine, RunRejection};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnalysisStatus {
    Idle,
    Running { percent: u8, fact: String },
    Complete { result: AnalysisResult },
}

/// One visitor's bill analyzer: the picked files and the latest run status.
#[derive(Debug)]
pub struct AnalyzerSession {
    pub selection: UploadSelection,
    pub previews: PreviewHandles,
    status: watch::Receiver<AnalysisStatus>,
}

impl Default for AnalyzerSession {
    fn default() -> Self {
        let (_, status) = watch::channel(AnalysisStatus::Idle);
        Self { selection: UploadSelection::new(), previews: PreviewHandles::new(), status }
    }
}

impl AnalyzerSession {
    pub fn status(&self) -> AnalysisStatus {
        self.status.borrow().clone()
    }

    pub fn in_progress(&self) -> bool {
        matches!(*self.status.borrow(), AnalysisStatus::Running { .. })
    }

    /// Checks the run preconditions and, when they hold, switches the session to running.
    pub fn begin_run(&mut self, accepted_terms: bool) -> Result<PendingRun, RunRejection> {
        self.selection.ready_to_run(accepted_terms, self.in_progress())?;

        let (sender, receiver) = watch::channel(AnalysisStatus::Running {
            percent: 0,
            fact: String::new(),
        });
        self.status = receiver;
        Ok(PendingRun { files: self.selection.files().to_vec(), sender })
    }

    pub fn snapshot(&self, session_id: Uuid) -> AnalyzerSnapshot {
        let files = self
            .selection
            .files()
            .iter()
            .zip(self.selection.previews())
            .map(|(file, preview)| FileEntry {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
                size_bytes: file.size_bytes,
                oversized: file.exceeds_size_advisory(),
                preview: preview.clone(),
            })
            .collect();
        let status = self.status();
        let max_saving = match &status {
            AnalysisStatus::Complete { result } => Some(result.max_saving()),
            _ => None,
        };

        AnalyzerSnapshot { session_id, files, status, max_saving }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub oversized: bool,
    pub preview: Preview,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalyzerSnapshot {
    pub session_id: Uuid,
    pub files: Vec<FileEntry>,
    pub status: AnalysisStatus,
    pub max_saving: Option<u32>,
}

/// A run that passed its preconditions and still has to be driven.
pub struct PendingRun {
    files: Vec<SelectedFile>,
    sender: watch::Sender<AnalysisStatus>,
}

struct WatchProgress<'a>(&'a watch::Sender<AnalysisStatus>);

impl ProgressSink for WatchProgress<'_> {
    fn publish(&self, update: ProgressUpdate) {
        self.0.send_replace(AnalysisStatus::Running { percent: update.percent, fact: update.fact });
    }
}

impl PendingRun {
    /// Drives the engine in the background. A started run cannot be cancelled.
    pub fn spawn(self, engine: Arc<dyn AnalysisEngine>, session_id: Uuid) {
        tokio::spawn(async move {
            info!(
                event_name = "analysis.run.started",
                session_id = %session_id,
                files = self.files.len(),
                "bill analysis started"
            );
            let result = engine.run(&self.files, &WatchProgress(&self.sender)).await;
            let max_saving = result.max_saving();
            self.sender.send_replace(AnalysisStatus::Complete { result });
            info!(
                event_name = "analysis.run.completed",
                session_id = %session_id,
                max_saving,
                "bill analysis completed"
            );
        });
    }
}
