//! Classifies a node's data directory by the role markers it contains.

use std::fmt;
use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

/// Entry name marking a directory previously used by a cluster member.
pub const MEMBER_MARKER: &str = "member";

/// Entry name marking a directory previously used by a proxy.
pub const PROXY_MARKER: &str = "proxy";

/// Role a node resumes into, as evidenced by its data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryState {
    /// No role marker; the node is fresh.
    Empty,
    /// The node previously ran as a cluster member.
    Member,
    /// The node previously ran as a proxy.
    Proxy,
    /// The markers contradict each other.
    Invalid(InvalidReason),
}

impl fmt::Display for DirectoryState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("empty"),
            Self::Member => formatter.write_str(MEMBER_MARKER),
            Self::Proxy => formatter.write_str(PROXY_MARKER),
            Self::Invalid(reason) => write!(formatter, "invalid ({reason})"),
        }
    }
}

/// Why a directory could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Both the member and the proxy marker exist.
    BothMarkersPresent,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BothMarkersPresent => {
                formatter.write_str("both member and proxy directories exist")
            }
        }
    }
}

/// Result of inspecting a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    /// Classified state.
    pub state: DirectoryState,
    /// Entries that are neither marker, sorted by name.
    pub unexpected_entries: Vec<String>,
}

/// Listing the data directory failed for a reason other than absence.
#[derive(Debug, Error)]
#[error("failed to list data directory '{path}': {source}")]
pub struct DataDirError {
    /// Directory that could not be listed.
    pub path: Utf8PathBuf,
    /// Underlying IO error.
    #[source]
    pub source: io::Error,
}

/// Reads the immediate entries of `path` and classifies them.
///
/// A missing directory is a fresh node and classifies as
/// [`DirectoryState::Empty`]. Nothing on disk is created or modified.
pub fn inspect(path: &Utf8Path) -> Result<Inspection, DataDirError> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(Inspection {
                state: DirectoryState::Empty,
                unexpected_entries: Vec::new(),
            });
        }
        Err(source) => {
            return Err(DataDirError {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| DataDirError {
            path: path.to_path_buf(),
            source,
        })?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(classify_names(names))
}

/// Classifies `path`, discarding the list of unexpected entries.
pub fn classify(path: &Utf8Path) -> Result<DirectoryState, DataDirError> {
    inspect(path).map(|inspection| inspection.state)
}

fn classify_names(names: Vec<String>) -> Inspection {
    let mut member = false;
    let mut proxy = false;
    let mut unexpected_entries = Vec::new();
    for name in names {
        match name.as_str() {
            MEMBER_MARKER => member = true,
            PROXY_MARKER => proxy = true,
            _ => unexpected_entries.push(name),
        }
    }

    let state = match (member, proxy) {
        (true, true) => DirectoryState::Invalid(InvalidReason::BothMarkersPresent),
        (true, false) => DirectoryState::Member,
        (false, true) => DirectoryState::Proxy,
        (false, false) => DirectoryState::Empty,
    };
    Inspection {
        state,
        unexpected_entries,
    }
}
