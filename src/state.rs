//! Form state controller
//!
//! Holds the current field values, derived `<name>Url` keys for completed
//! uploads, and per-field upload-in-flight flags. State lives only for the
//! lifetime of the form; it is never persisted.
//!
//! Invariant: a file field's derived URL key is present if and only if an
//! upload for that field's current file completed successfully. Selecting a
//! new file always clears the previous URL before the new upload resolves.

use crate::error::{OnboardingError, Result};
use crate::fields::{url_key, FieldDescriptor, SessionField};
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A file selected by the user, not yet (or no longer) tied to a remote URL
#[derive(Clone, Debug, PartialEq)]
pub struct FileHandle {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl FileHandle {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Current value of one form field
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Text(String),
    File(FileHandle),
}

/// The authenticated user the form pre-fills from.
///
/// Passed in at construction rather than read from ambient state so tests
/// can supply fake sessions.
#[derive(Clone, Debug, Default)]
pub struct UserSession {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UserSession {
    fn value(&self, field: SessionField) -> String {
        let source = match field {
            SessionField::Name => &self.name,
            SessionField::Email => &self.email,
            SessionField::Phone => &self.phone,
        };
        source.clone().unwrap_or_default()
    }
}

/// Token for one upload attempt. A completion only lands if its ticket is
/// still the current one for the field: later selections win, and `reset`
/// invalidates everything outstanding.
#[derive(Clone, Debug)]
pub struct UploadTicket {
    field: String,
    serial: u64,
}

impl UploadTicket {
    pub fn field(&self) -> &str {
        &self.field
    }
}

/// Mutable form state for one mounted form
pub struct FormController {
    fields: Vec<FieldDescriptor>,
    session: UserSession,
    values: RwLock<HashMap<String, FieldValue>>,
    uploading: DashSet<String>,
    tickets: DashMap<String, u64>,
    next_serial: AtomicU64,
}

impl FormController {
    pub fn new(fields: Vec<FieldDescriptor>, session: UserSession) -> Self {
        let values = Self::defaults(&fields, &session);
        Self {
            fields,
            session,
            values: RwLock::new(values),
            uploading: DashSet::new(),
            tickets: DashMap::new(),
            next_serial: AtomicU64::new(0),
        }
    }

    fn defaults(fields: &[FieldDescriptor], session: &UserSession) -> HashMap<String, FieldValue> {
        fields
            .iter()
            .filter(|f| !f.kind.is_file())
            .map(|f| {
                let initial = f.prefill.map(|p| session.value(p)).unwrap_or_default();
                (f.name.to_string(), FieldValue::Text(initial))
            })
            .collect()
    }

    /// The registry this form was mounted with
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Set a text-like field value
    pub fn set_text(&self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = self
            .descriptor(name)
            .ok_or_else(|| OnboardingError::Validation(format!("unknown field {name:?}")))?;
        if field.kind.is_file() {
            return Err(OnboardingError::Validation(format!(
                "{name:?} is a file field"
            )));
        }
        self.values
            .write()
            .insert(name.to_string(), FieldValue::Text(value.into()));
        Ok(())
    }

    /// Record a newly selected file and hand out an upload ticket.
    ///
    /// Clears any URL stored for a previously uploaded file under the same
    /// name and marks the field as uploading.
    pub fn begin_file(&self, name: &str, file: FileHandle) -> Result<UploadTicket> {
        let field = self
            .descriptor(name)
            .ok_or_else(|| OnboardingError::Validation(format!("unknown field {name:?}")))?;
        if !field.kind.is_file() {
            return Err(OnboardingError::Validation(format!(
                "{name:?} is not a file field"
            )));
        }

        {
            let mut values = self.values.write();
            values.insert(name.to_string(), FieldValue::File(file));
            values.remove(&url_key(name));
        }

        let serial = self.next_serial.fetch_add(1, Ordering::Relaxed) + 1;
        self.tickets.insert(name.to_string(), serial);
        self.uploading.insert(name.to_string());

        Ok(UploadTicket {
            field: name.to_string(),
            serial,
        })
    }

    /// Record the outcome of an upload attempt.
    ///
    /// Stale tickets (superseded by a later selection, or invalidated by
    /// `reset`) are discarded without touching state. Returns whether a URL
    /// was stored.
    pub fn complete_upload(&self, ticket: &UploadTicket, url: Option<String>) -> bool {
        let current = self
            .tickets
            .get(&ticket.field)
            .is_some_and(|serial| *serial == ticket.serial);
        if !current {
            return false;
        }

        self.uploading.remove(&ticket.field);

        match url {
            Some(url) => {
                self.values
                    .write()
                    .insert(url_key(&ticket.field), FieldValue::Text(url));
                true
            }
            None => false,
        }
    }

    /// Is an upload for this field in flight
    pub fn uploading(&self, name: &str) -> bool {
        self.uploading.contains(name)
    }

    /// Is any upload in flight
    pub fn any_uploading(&self) -> bool {
        !self.uploading.is_empty()
    }

    /// Current text value, if the field holds one
    pub fn text(&self, name: &str) -> Option<String> {
        match self.values.read().get(name) {
            Some(FieldValue::Text(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Stored upload URL for a file field, if its upload completed
    pub fn url(&self, name: &str) -> Option<String> {
        self.text(&url_key(name))
    }

    /// Currently selected file for a file field
    pub fn file(&self, name: &str) -> Option<FileHandle> {
        match self.values.read().get(name) {
            Some(FieldValue::File(file)) => Some(file.clone()),
            _ => None,
        }
    }

    /// Replace all state with the initial defaults.
    ///
    /// Re-reads the session pre-fills, clears every in-flight flag, and
    /// invalidates outstanding upload tickets so late completions are
    /// discarded silently.
    pub fn reset(&self) {
        *self.values.write() = Self::defaults(&self.fields, &self.session);
        self.uploading.clear();
        self.tickets.clear();
    }
}
