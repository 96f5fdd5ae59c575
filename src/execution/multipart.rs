//! Multipart upload bodies.
//!
//! The execution core only decides *that* a call is multipart and collects
//! its parts; each transport turns [`MultipartBody`] into its own
//! `reqwest` form when the request is sent.

use serde_json::{Map, Value};

use crate::defaults;
use crate::error::TransportError;
use crate::types::UploadFile;

/// Text fields followed by one `files` part per upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    pub fields: Vec<(String, String)>,
    pub files: Vec<UploadFile>,
}

impl MultipartBody {
    /// Flatten JSON scalar `fields` into text parts.
    ///
    /// Strings are sent verbatim, other values in their JSON form; nulls are
    /// skipped and arrays repeat the field once per element.
    pub fn new(fields: &Map<String, Value>, files: Vec<UploadFile>) -> Self {
        let mut body = Self {
            fields: Vec::new(),
            files,
        };
        for (name, value) in fields {
            body.push_field(name, value);
        }
        body
    }

    fn push_field(&mut self, name: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::String(s) => self.fields.push((name.to_string(), s.clone())),
            Value::Array(items) => items.iter().for_each(|item| self.push_field(name, item)),
            other => self.fields.push((name.to_string(), other.to_string())),
        }
    }

    /// Total size of the uploaded file bytes.
    pub fn len(&self) -> usize {
        self.files.iter().map(UploadFile::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }

    /// Form for `reqwest::Client`.
    ///
    /// File names are relative paths (`my-skill/SKILL.md`) and go out
    /// unencoded.
    pub fn into_form(self) -> Result<reqwest::multipart::Form, TransportError> {
        let mut form = reqwest::multipart::Form::new().percent_encode_noop();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let part = reqwest::multipart::Part::bytes(file.bytes().to_vec())
                .file_name(file.filename().to_string())
                .mime_str(&file.content_type())
                .map_err(|e| TransportError::new(format!("Invalid MIME type: {e}")))?;
            form = form.part(defaults::upload::FILES_FIELD, part);
        }
        Ok(form)
    }

    /// Form for `reqwest::blocking::Client`.
    pub fn into_blocking_form(self) -> Result<reqwest::blocking::multipart::Form, TransportError> {
        let mut form = reqwest::blocking::multipart::Form::new().percent_encode_noop();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let part = reqwest::blocking::multipart::Part::bytes(file.bytes().to_vec())
                .file_name(file.filename().to_string())
                .mime_str(&file.content_type())
                .map_err(|e| TransportError::new(format!("Invalid MIME type: {e}")))?;
            form = form.part(defaults::upload::FILES_FIELD, part);
        }
        Ok(form)
    }
}
