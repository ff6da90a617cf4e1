//! File attachment pipeline
//!
//! Files picked by the user are validated against an [`AttachmentPolicy`]
//! as soon as they are selected, held in an [`AttachmentSet`] until the
//! next generation, and then read into [`Attachment`]s whose text is
//! spliced into the prompt.
//!
//! Reading never fails: anything that is not text, or cannot be read,
//! becomes [`AttachmentContent::Unavailable`].

use std::path::{Path, PathBuf};

use futures_util::future::join_all;

use crate::constants::{defaults, prompt};
use crate::error::{Result, StudioError};

/// Limits applied to a selection of files.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentPolicy {
    pub max_files: usize,
    pub max_size_mb: u64,
    /// Advisory extension list shown to the user; not enforced
    pub accepted_types: String,
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self {
            max_files: defaults::MAX_FILES,
            max_size_mb: defaults::MAX_SIZE_MB,
            accepted_types: defaults::ACCEPTED_TYPES.to_string(),
        }
    }
}

impl AttachmentPolicy {
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb * 1024 * 1024
    }
}

/// Where a selected file's bytes come from
#[derive(Debug, Clone, PartialEq)]
pub enum FileData {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// A file the user picked, not yet read.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub data: FileData,
}

impl SelectedFile {
    /// In-memory file; the size is the length of `bytes`
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            data: FileData::Bytes(bytes),
        }
    }

    /// File on disk. Only its metadata is read here.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(StudioError::validation(
                "file",
                format!("{} is not a file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            mime_type: guess_mime_type(&name).to_string(),
            name,
            size: metadata.len(),
            data: FileData::Path(path.to_path_buf()),
        })
    }
}

/// Text of an attachment as it will appear in the prompt
#[derive(Debug, Clone, PartialEq)]
pub enum AttachmentContent {
    Text(String),
    Unavailable,
}

impl AttachmentContent {
    pub fn as_prompt_text(&self) -> &str {
        match self {
            Self::Text(text) if !text.is_empty() => text,
            _ => prompt::CONTENT_UNAVAILABLE,
        }
    }
}

/// A read attachment, ready to be spliced into a prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub content: AttachmentContent,
}

/// Result of adding a selection to the pending set.
#[derive(Debug)]
pub struct SelectionOutcome {
    /// Files added to the pending set
    pub accepted: usize,
    /// Combined size error for the files left out, if any
    pub rejected: Option<StudioError>,
}

/// Pending attachments for the next generation.
#[derive(Debug, Clone, Default)]
pub struct AttachmentSet {
    policy: AttachmentPolicy,
    pending: Vec<SelectedFile>,
}

impl AttachmentSet {
    pub fn new(policy: AttachmentPolicy) -> Self {
        Self {
            policy,
            pending: Vec::new(),
        }
    }

    pub fn policy(&self) -> &AttachmentPolicy {
        &self.policy
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Check one file against the size limit.
    pub fn validate(&self, file: &SelectedFile) -> Result<()> {
        if file.size > self.policy.max_size_bytes() {
            return Err(StudioError::AttachmentTooLarge(format!(
                "File {} is too large. Maximum size is {}MB.",
                file.name, self.policy.max_size_mb
            )));
        }
        Ok(())
    }

    /// Add a batch of files.
    ///
    /// If the batch would push the set over `max_files`, nothing is added.
    /// Otherwise every file within the size limit is added and the size
    /// errors of the rest are combined into `rejected`.
    pub fn handle_selection(&mut self, files: Vec<SelectedFile>) -> Result<SelectionOutcome> {
        if files.len() + self.pending.len() > self.policy.max_files {
            log::debug!(
                "Rejected selection of {} files ({} already pending)",
                files.len(),
                self.pending.len()
            );
            return Err(StudioError::TooManyAttachments {
                max: self.policy.max_files,
            });
        }

        let mut errors = Vec::new();
        let mut accepted = 0;
        for file in files {
            match self.validate(&file) {
                Ok(()) => {
                    self.pending.push(file);
                    accepted += 1;
                }
                Err(e) => errors.push(e.to_string()),
            }
        }

        let rejected = if errors.is_empty() {
            None
        } else {
            Some(StudioError::AttachmentTooLarge(errors.join(" ")))
        };
        Ok(SelectionOutcome { accepted, rejected })
    }

    /// Remove the pending file at `index`
    pub fn remove(&mut self, index: usize) -> Option<SelectedFile> {
        (index < self.pending.len()).then(|| self.pending.remove(index))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Read every pending file concurrently, preserving order.
    pub async fn read_all(&self) -> Vec<Attachment> {
        join_all(self.pending.iter().map(read)).await
    }
}

/// Read `file` into an attachment.
pub async fn read(file: &SelectedFile) -> Attachment {
    let content = if is_text_like(&file.name, &file.mime_type) {
        let bytes = match &file.data {
            FileData::Bytes(bytes) => Ok(bytes.clone()),
            FileData::Path(path) => tokio::fs::read(path).await,
        };
        match bytes {
            Ok(bytes) => AttachmentContent::Text(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) => {
                log::warn!("Could not read attachment {}: {}", file.name, e);
                AttachmentContent::Unavailable
            }
        }
    } else {
        AttachmentContent::Unavailable
    };

    Attachment {
        name: file.name.clone(),
        size: file.size,
        mime_type: file.mime_type.clone(),
        content,
    }
}

/// Whether a file is read as text, by MIME type or extension.
pub fn is_text_like(name: &str, mime_type: &str) -> bool {
    let mime = mime_type.to_ascii_lowercase();
    if mime.starts_with("text/") || mime == "application/json" || mime == "application/xml" {
        return true;
    }
    extension(name).map_or(false, |ext| prompt::TEXT_EXTENSIONS.contains(&ext.as_str()))
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// MIME type for a file name, from its extension
pub fn guess_mime_type(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("txt") => "text/plain",
        Some("md" | "markdown") => "text/markdown",
        Some("csv") => "text/csv",
        Some("html" | "htm") => "text/html",
        Some("css") => "text/css",
        Some("js" | "jsx") => "text/javascript",
        Some("ts" | "tsx") => "text/typescript",
        Some("py") => "text/x-python",
        Some("java") => "text/x-java",
        Some("c" | "cpp" | "h" | "hpp") => "text/x-c",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}
