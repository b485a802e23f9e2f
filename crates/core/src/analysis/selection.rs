use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

use crate::domain::analysis::SelectedFile;

pub const PDF_ICON: &str = "/static/icons/pdf-icon.svg";
pub const FILE_ICON: &str = "/static/icons/file-icon.svg";

/// Issues and releases preview handles for selected images.
pub trait PreviewRegistry: Send + Sync {
    fn create(&self, file: &SelectedFile) -> String;

    fn revoke(&self, handle: &str);
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "src", rename_all = "snake_case")]
pub enum Preview {
    /// Handle owned by the selection and released on removal.
    Owned(String),
    /// Shared static icon.
    Icon(&'static str),
}

impl Preview {
    pub fn src(&self) -> &str {
        match self {
            Self::Owned(handle) => handle,
            Self::Icon(path) => path,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AddReport {
    pub accepted: usize,
    pub rejected: Vec<String>,
    pub oversized: Vec<String>,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum RunRejection {
    #[error("Seleziona almeno un file da analizzare")]
    NoFiles,
    #[error("Accetta i termini e le condizioni per procedere")]
    TermsNotAccepted,
    #[error("Analisi già in corso")]
    AlreadyRunning,
}

/// Files picked for analysis with one preview per file, index-aligned.
#[derive(Debug, Default)]
pub struct UploadSelection {
    files: Vec<SelectedFile>,
    previews: Vec<Preview>,
}

impl UploadSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn previews(&self) -> &[Preview] {
        &self.previews
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Appends accepted files in order. Anything that is not an image or a PDF is skipped.
    pub fn add<I>(&mut self, files: I, registry: &dyn PreviewRegistry) -> AddReport
    where
        I: IntoIterator<Item = SelectedFile>,
    {
        let mut report = AddReport::default();
        for file in files {
            if !file.is_accepted() {
                report.rejected.push(file.name);
                continue;
            }
            if file.exceeds_size_advisory() {
                report.oversized.push(file.name.clone());
            }
            let preview = if file.is_image() {
                Preview::Owned(registry.create(&file))
            } else if file.is_pdf() {
                Preview::Icon(PDF_ICON)
            } else {
                Preview::Icon(FILE_ICON)
            };
            self.files.push(file);
            self.previews.push(preview);
            report.accepted += 1;
        }
        report
    }

    /// Removes one file and its preview, releasing the preview handle when owned.
    pub fn remove(&mut self, index: usize, registry: &dyn PreviewRegistry) -> Option<SelectedFile> {
        if index >= self.files.len() {
            return None;
        }
        let file = self.files.remove(index);
        if let Preview::Owned(handle) = self.previews.remove(index) {
            registry.revoke(&handle);
        }
        Some(file)
    }

    /// Releases every owned preview.
    pub fn clear(&mut self, registry: &dyn PreviewRegistry) {
        for preview in self.previews.drain(..) {
            if let Preview::Owned(handle) = preview {
                registry.revoke(&handle);
            }
        }
        self.files.clear();
    }

    pub fn ready_to_run(&self, accepted_terms: bool, in_progress: bool) -> Result<(), RunRejection> {
        if in_progress {
            return Err(RunRejection::AlreadyRunning);
        }
        if self.files.is_empty() {
            return Err(RunRejection::NoFiles);
        }
        if !accepted_terms {
            return Err(RunRejection::TermsNotAccepted);
        }
        Ok(())
    }
}

/// In-process registry handing out opaque `preview:` handles.
#[derive(Debug, Default)]
pub struct PreviewHandles {
    next: AtomicU64,
    live: Mutex<HashSet<String>>,
}

impl PreviewHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_live(&self, handle: &str) -> bool {
        self.live.lock().map(|live| live.contains(handle)).unwrap_or(false)
    }

    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }
}

impl PreviewRegistry for PreviewHandles {
    fn create(&self, file: &SelectedFile) -> String {
        let sequence = self.next.fetch_add(1, Ordering::Relaxed);
        let handle = format!("preview:{sequence}:{}", file.name);
        if let Ok(mut live) = self.live.lock() {
            live.insert(handle.clone());
        }
        handle
    }

    fn revoke(&self, handle: &str) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(handle);
        }
    }
}
