//! Audit trail of remote edits.
//!
//! Separate from `tracing` diagnostics: this is the plain-text record of what was written
//! to which item, one line per edit (`Q123 ADDED CLAIM P18`).

use crate::{Result, UploadError};
use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub trait AuditLog {
    fn logit(&mut self, message: &str) -> io::Result<()>;
}

impl AuditLog for Vec<String> {
    fn logit(&mut self, message: &str) -> io::Result<()> {
        self.push(message.to_string());
        Ok(())
    }
}

/// Appends one line per entry to a text file.
#[derive(Debug)]
pub struct FileAuditLog {
    path: PathBuf,
    file: File,
}

impl FileAuditLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditLog for FileAuditLog {
    fn logit(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.file, "{message}")?;
        self.file.flush()
    }
}

/// In-memory log whose entries stay readable after it has been handed to an uploader.
#[derive(Debug, Clone, Default)]
pub struct SharedAuditLog {
    entries: Rc<RefCell<Vec<String>>>,
}

impl SharedAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}

impl AuditLog for SharedAuditLog {
    fn logit(&mut self, message: &str) -> io::Result<()> {
        self.entries.borrow_mut().push(message.to_string());
        Ok(())
    }
}

/// Optional audit log handed down the pipeline; `None` disables auditing.
pub type AuditSink<'a> = Option<&'a mut (dyn AuditLog + 'static)>;

/// Write `message` if auditing is enabled.
pub(crate) fn note(log: &mut AuditSink<'_>, message: impl FnOnce() -> String) -> Result<()> {
    if let Some(log) = log.as_mut() {
        log.logit(&message())
            .map_err(|source| UploadError::Audit { source })?;
    }
    Ok(())
}
