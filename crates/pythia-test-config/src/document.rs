// crates/pythia-test-config/src/document.rs
// ============================================================================
// Module: Secrets Document
// Description: Parsing and environment selection for the `env.json` secrets file.
// Purpose: Turn an optional, possibly partitioned JSON file into flat settings.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The secrets document is either a flat object of settings or an object of
//! environment partitions. Parsing returns an explicit [`DocumentError`]; the
//! [`EnvironmentDocument::load`] boundary collapses every error to an empty
//! document so a missing or broken file only ever causes tests to skip.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::audit::ConfigAuditEvent;
use crate::audit::ConfigAuditSink;
use crate::settings::SettingKey;
use crate::settings::is_blank;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum secrets document size in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 1024 * 1024;

/// Default secrets document locations, checked in order.
pub const DEFAULT_DOCUMENT_PATHS: [&str; 2] = ["env.json", "testProperties/env.json"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reasons a secrets document could not be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// I/O failure while reading the document.
    #[error("secrets document io error: {0}")]
    Io(String),
    /// Document exceeds [`MAX_DOCUMENT_BYTES`].
    #[error("secrets document exceeds size limit ({size} > {limit} bytes)")]
    TooLarge {
        /// Actual size in bytes.
        size: usize,
        /// Allowed size in bytes.
        limit: usize,
    },
    /// Document bytes are not UTF-8.
    #[error("secrets document must be utf-8")]
    NotUtf8,
    /// Document is not valid JSON.
    #[error("secrets document is not valid json: {0}")]
    Json(String),
    /// Document root is not a JSON object.
    #[error("secrets document root must be a json object")]
    NotObject,
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Which part of the document the settings were taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The partition named by the requested environment.
    Named(String),
    /// The only partition of a single-entry document.
    SingleEntry(String),
    /// The top-level object.
    TopLevel,
}

impl Selection {
    /// Returns a stable label for audit output.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Named(name) => format!("named:{name}"),
            Self::SingleEntry(name) => format!("single_entry:{name}"),
            Self::TopLevel => "top_level".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Document
// ============================================================================

/// Flat settings taken from the secrets document.
///
/// # Invariants
/// - Only string, number, and boolean values are present.
/// - `selection` is `None` only for the empty document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvironmentDocument {
    /// Selected primitive settings.
    settings: BTreeMap<String, String>,
    /// Partition the settings came from.
    selection: Option<Selection>,
}

impl EnvironmentDocument {
    /// Returns a document with no settings.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the document at `path`, collapsing every failure to empty.
    ///
    /// A missing file is not an error and records nothing. A file that
    /// exists but cannot be used records a `secrets_document_ignored` event.
    #[must_use]
    pub fn load(path: &Path, environment: Option<&str>, audit: &dyn ConfigAuditSink) -> Self {
        if !path.is_file() {
            return Self::empty();
        }
        match Self::read(path, environment) {
            Ok(document) => {
                let selection = document.selection.as_ref().map_or_else(String::new, Selection::label);
                audit.record(&ConfigAuditEvent::document_loaded(
                    path,
                    environment,
                    &selection,
                    document.len(),
                ));
                document
            }
            Err(err) => {
                audit.record(&ConfigAuditEvent::document_ignored(path, &err.to_string()));
                Self::empty()
            }
        }
    }

    /// Reads and parses the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the file cannot be read or parsed.
    pub fn read(path: &Path, environment: Option<&str>) -> Result<Self, DocumentError> {
        let bytes = fs::read(path).map_err(|err| DocumentError::Io(err.to_string()))?;
        Self::from_bytes(&bytes, environment)
    }

    /// Parses raw document bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] for oversized, non-UTF-8, or malformed input.
    pub fn from_bytes(bytes: &[u8], environment: Option<&str>) -> Result<Self, DocumentError> {
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(DocumentError::TooLarge {
                size: bytes.len(),
                limit: MAX_DOCUMENT_BYTES,
            });
        }
        let content = std::str::from_utf8(bytes).map_err(|_| DocumentError::NotUtf8)?;
        Self::parse(content, environment)
    }

    /// Parses document text and selects the environment partition.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Json`] for invalid JSON and
    /// [`DocumentError::NotObject`] when the root is not an object.
    pub fn parse(content: &str, environment: Option<&str>) -> Result<Self, DocumentError> {
        let root: Value =
            serde_json::from_str(content).map_err(|err| DocumentError::Json(err.to_string()))?;
        let Value::Object(top) = root else {
            return Err(DocumentError::NotObject);
        };
        let environment = environment.filter(|name| !is_blank(name));
        let (object, selection) = select_partition(&top, environment);
        let settings = object
            .iter()
            .filter_map(|(key, value)| primitive_text(value).map(|text| (key.clone(), text)))
            .collect();
        Ok(Self {
            settings,
            selection: Some(selection),
        })
    }

    /// Returns the raw value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Returns all selected settings.
    #[must_use]
    pub const fn settings(&self) -> &BTreeMap<String, String> {
        &self.settings
    }

    /// Returns the partition selection, `None` for the empty document.
    #[must_use]
    pub const fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Returns the number of settings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// Returns true when no settings were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

// ============================================================================
// SECTION: Location
// ============================================================================

/// Picks the secrets document path.
///
/// An explicit path wins even when the file does not exist, so that a
/// mistyped override skips tests instead of silently reading a different
/// file. Otherwise the first existing default location under `root` is
/// used; an empty `root` means the working directory.
#[must_use]
pub fn locate_document(explicit: Option<&Path>, root: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    DEFAULT_DOCUMENT_PATHS
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Chooses the object whose entries become settings.
fn select_partition<'a>(
    top: &'a Map<String, Value>,
    environment: Option<&str>,
) -> (&'a Map<String, Value>, Selection) {
    if let Some(name) = environment {
        if let Some(Value::Object(nested)) = top.get(name) {
            return (nested, Selection::Named(name.to_string()));
        }
        return (top, Selection::TopLevel);
    }
    if !top.contains_key(SettingKey::AppId.as_str())
        && top.len() == 1
        && let Some((name, Value::Object(nested))) = top.iter().next()
    {
        return (nested, Selection::SingleEntry(name.clone()));
    }
    (top, Selection::TopLevel)
}

/// Renders primitive JSON values as setting text.
fn primitive_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        // Source text is preserved by the `arbitrary_precision` feature.
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
