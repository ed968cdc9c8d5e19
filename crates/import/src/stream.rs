use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use thiserror::Error;
use tracing::debug;
use zip::ZipArchive;

use kassa_camt::{DecodeError, StatementEntry};
use kassa_core::{CurrencyMismatch, RuleSet, Transaction};

use crate::record::build_transaction;
use crate::source::InputKind;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("don't know how to handle input '{}'", .0.display())]
    UnsupportedInput(PathBuf),
    #[error(transparent)]
    Currency(#[from] CurrencyMismatch),
    #[error("failed to decode '{file}': {source}")]
    Decode { file: String, source: DecodeError },
    #[error("failed to read archive '{}': {source}", .file.display())]
    Archive {
        file: PathBuf,
        source: zip::result::ZipError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Lazily yields classified transactions across the whole input list: in
/// top-level input order, lexicographic member order within an archive, and
/// document order within a statement. Memory stays bounded by one file's
/// worth of entries.
///
/// The stream is single-pass and fail-fast: the first error is yielded and
/// ends it. Later inputs are never touched, nothing is retried or skipped.
pub struct TransactionStream<'r> {
    rules: &'r RuleSet,
    inputs: VecDeque<PathBuf>,
    container: Option<OpenContainer>,
    entries: std::vec::IntoIter<StatementEntry>,
    done: bool,
}

/// An opened archive plus the scoped temp dir its members are materialized
/// into. Dropping it releases the temp storage, error paths included.
struct OpenContainer {
    path: PathBuf,
    archive: ZipArchive<File>,
    members: VecDeque<String>,
    tempdir: TempDir,
}

impl<'r> TransactionStream<'r> {
    pub fn new<I, P>(inputs: I, rules: &'r RuleSet) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        TransactionStream {
            rules,
            inputs: inputs.into_iter().map(Into::into).collect(),
            container: None,
            entries: Vec::new().into_iter(),
            done: false,
        }
    }

    fn open_container(&mut self, path: PathBuf) -> Result<(), ImportError> {
        let file = File::open(&path)?;
        let archive = ZipArchive::new(file).map_err(|source| ImportError::Archive {
            file: path.clone(),
            source,
        })?;
        // Members run in lexicographic filename order regardless of
        // archive layout; report order is meaningful to a reviewer.
        let mut members: Vec<String> = archive
            .file_names()
            .filter(|n| !n.ends_with('/'))
            .map(str::to_owned)
            .collect();
        members.sort();
        let tempdir = tempfile::Builder::new().prefix("kassa").tempdir()?;
        debug!(archive = %path.display(), members = members.len(), "opened statement archive");
        self.container = Some(OpenContainer {
            path,
            archive,
            members: members.into(),
            tempdir,
        });
        Ok(())
    }

    /// Materializes the next archive member to the temp dir, decodes it,
    /// and removes the temp file again before returning. Returns `false`
    /// once the container is exhausted (and releases its temp dir).
    fn next_member(&mut self) -> Result<bool, ImportError> {
        let Some(container) = self.container.as_mut() else {
            return Ok(false);
        };
        let Some(name) = container.members.pop_front() else {
            self.container = None;
            return Ok(false);
        };

        let file_name = Path::new(&name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("member.xml"));
        let target = container.tempdir.path().join(file_name);
        {
            let mut member =
                container
                    .archive
                    .by_name(&name)
                    .map_err(|source| ImportError::Archive {
                        file: container.path.clone(),
                        source,
                    })?;
            let mut out = File::create(&target)?;
            io::copy(&mut member, &mut out)?;
        }

        let decoded = decode_file(&target, &name);
        std::fs::remove_file(&target)?;
        self.entries = decoded?.into_iter();
        Ok(true)
    }

    fn advance_input(&mut self) -> Result<bool, ImportError> {
        let Some(path) = self.inputs.pop_front() else {
            return Ok(false);
        };
        match InputKind::of(&path) {
            Some(InputKind::Container) => self.open_container(path)?,
            Some(InputKind::Statement) => {
                let label = path.display().to_string();
                self.entries = decode_file(&path, &label)?.into_iter();
            }
            None => return Err(ImportError::UnsupportedInput(path)),
        }
        Ok(true)
    }
}

impl Iterator for TransactionStream<'_> {
    type Item = Result<Transaction, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(entry) = self.entries.next() {
                match build_transaction(&entry, self.rules) {
                    Ok(tx) => return Some(Ok(tx)),
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e.into()));
                    }
                }
            }

            let advanced = if self.container.is_some() {
                self.next_member()
            } else {
                self.advance_input()
            };
            match advanced {
                // Something new to drain — either fresh entries or, when a
                // container just closed, the next top-level input.
                Ok(true) => {}
                Ok(false) => {
                    if self.container.is_none() && self.inputs.is_empty() {
                        self.done = true;
                        return None;
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

fn decode_file(path: &Path, label: &str) -> Result<Vec<StatementEntry>, ImportError> {
    let file = File::open(path)?;
    let entries =
        kassa_camt::read_document(BufReader::new(file)).map_err(|source| ImportError::Decode {
            file: label.to_string(),
            source,
        })?;
    debug!(file = label, entries = entries.len(), "decoded statement document");
    Ok(entries)
}
