//! HTML form binding and validation
//!
//! Submitted `application/x-www-form-urlencoded` bodies arrive as raw
//! key/value pairs. A [`FieldSet`] names the fields a view accepts; binding
//! drops every other key before the typed form is built and validated with
//! `validator`.

pub mod author;
pub mod book;
pub mod renew;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

pub use author::AuthorForm;
pub use book::BookForm;
pub use renew::RenewBookForm;

/// Date formats accepted in form input
const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_DATE: &str = "Enter a valid date.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";

/// Fields a create/update view is allowed to bind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSet {
    pub model: &'static str,
    pub fields: &'static [&'static str],
}

impl FieldSet {
    pub fn permits(&self, field: &str) -> bool {
        self.fields.contains(&field)
    }

    /// Keep only the permitted pairs of a submission
    pub fn bind(&self, raw: Vec<(String, String)>) -> FormData {
        let pairs = raw
            .into_iter()
            .filter(|(key, _)| self.permits(key))
            .collect();
        FormData { pairs }
    }
}

/// Submitted pairs restricted to a [`FieldSet`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// First value submitted for `field`, trimmed; empty when absent
    pub fn text(&self, field: &str) -> String {
        self.pairs
            .iter()
            .find(|(key, _)| key == field)
            .map(|(_, value)| value.trim().to_string())
            .unwrap_or_default()
    }

    /// Every non-blank value submitted for a repeatable field
    pub fn all(&self, field: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(key, value)| key == field && !value.trim().is_empty())
            .map(|(_, value)| value.trim().to_string())
            .collect()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.pairs.iter().any(|(key, _)| key == field)
    }
}

/// Field-level error messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Ok when no error was recorded
    pub fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                form_errors.add(&field.to_string(), message);
            }
        }
        form_errors
    }
}

/// Parse a date typed into a form, trying every accepted format
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Blank is accepted here; required-ness is checked separately
pub(crate) fn validate_date_format(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || parse_date(value).is_some() {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_date");
        error.message = Some(INVALID_DATE.into());
        Err(error)
    }
}

pub(crate) fn validate_choice_id(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().parse::<i32>().is_ok() {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_choice");
        error.message = Some(INVALID_CHOICE.into());
        Err(error)
    }
}
