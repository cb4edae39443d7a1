//! Author create/update form

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Author, AuthorInput};

use super::{parse_date, validate_date_format, FieldSet, FormData, FormErrors, INVALID_DATE, REQUIRED};

/// Create exposes every author field
pub const AUTHOR_CREATE_FIELDS: FieldSet = FieldSet {
    model: "author",
    fields: &["first_name", "last_name", "date_of_birth", "date_of_death"],
};

pub const AUTHOR_UPDATE_FIELDS: FieldSet = FieldSet {
    model: "author",
    fields: &["first_name", "last_name", "date_of_birth", "date_of_death"],
};

/// Placeholder shown in the death date of a blank create form
pub fn default_date_of_death() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 5, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct AuthorForm {
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub first_name: String,
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub last_name: String,
    #[validate(custom(function = "validate_date_format"))]
    pub date_of_birth: String,
    #[validate(custom(function = "validate_date_format"))]
    pub date_of_death: String,
}

impl AuthorForm {
    /// Blank create form
    pub fn initial() -> Self {
        Self {
            date_of_death: default_date_of_death().format("%m/%d/%Y").to_string(),
            ..Self::default()
        }
    }

    pub fn from_data(data: &FormData) -> Self {
        Self {
            first_name: data.text("first_name"),
            last_name: data.text("last_name"),
            date_of_birth: data.text("date_of_birth"),
            date_of_death: data.text("date_of_death"),
        }
    }

    pub fn from_author(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: author.date_of_birth.to_string(),
            date_of_death: author.date_of_death.map(|d| d.to_string()).unwrap_or_default(),
        }
    }

    /// Validate and convert to persistable values
    pub fn clean(&self) -> Result<AuthorInput, FormErrors> {
        let mut errors = self.validate().err().map(FormErrors::from).unwrap_or_default();

        for (field, value) in [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("date_of_birth", &self.date_of_birth),
        ] {
            if value.trim().is_empty() {
                errors.add(field, REQUIRED);
            }
        }
        errors.into_result()?;

        let date_of_birth = parse_date(&self.date_of_birth).ok_or_else(|| {
            let mut errors = FormErrors::new();
            errors.add("date_of_birth", INVALID_DATE);
            errors
        })?;

        Ok(AuthorInput {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            date_of_birth,
            date_of_death: parse_date(&self.date_of_death),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(first: &str, last: &str, born: &str, died: &str) -> AuthorForm {
        AuthorForm {
            first_name: first.to_string(),
            last_name: last.to_string(),
            date_of_birth: born.to_string(),
            date_of_death: died.to_string(),
        }
    }

    #[test]
    fn test_initial_defaults_death_date() {
        let initial = AuthorForm::initial();
        assert_eq!(initial.date_of_death, "05/01/2018");
        assert!(initial.first_name.is_empty());
    }

    #[test]
    fn test_clean_valid() {
        let input = form("Isaac", "Asimov", "1920-01-02", "04/06/1992").clean().unwrap();
        assert_eq!(input.first_name, "Isaac");
        assert_eq!(input.date_of_birth, NaiveDate::from_ymd_opt(1920, 1, 2).unwrap());
        assert_eq!(input.date_of_death, NaiveDate::from_ymd_opt(1992, 4, 6));

        let alive = form("Ann", "Leckie", "1966-03-02", "").clean().unwrap();
        assert_eq!(alive.date_of_death, None);
    }

    #[test]
    fn test_clean_reports_each_field() {
        let errors = form("", "Asimov", "", "not a date").clean().unwrap_err();
        assert_eq!(errors.get("first_name"), &[REQUIRED.to_string()]);
        assert_eq!(errors.get("date_of_birth"), &[REQUIRED.to_string()]);
        assert_eq!(errors.get("date_of_death"), &[INVALID_DATE.to_string()]);
        assert!(!errors.has("last_name"));
    }

    #[test]
    fn test_from_data_ignores_unlisted_fields() {
        let data = AUTHOR_UPDATE_FIELDS.bind(vec![
            ("first_name".to_string(), "Ursula".to_string()),
            ("id".to_string(), "7".to_string()),
        ]);
        let bound = AuthorForm::from_data(&data);
        assert_eq!(bound.first_name, "Ursula");
        assert_eq!(bound.last_name, "");
    }
}
