//! Librarian renewal form for a single copy

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{parse_date, validate_date_format, FormErrors, REQUIRED};

/// Default renewal period offered on a fresh form
pub const DEFAULT_RENEWAL_WEEKS: i64 = 3;

/// Furthest a renewal may push the due date
pub const MAX_RENEWAL_WEEKS: i64 = 4;

pub const RENEWAL_IN_PAST: &str = "Invalid date - renewal in past";
pub const RENEWAL_TOO_FAR: &str = "Invalid date - renewal more than 4 weeks ahead";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct RenewBookForm {
    /// New due date (YYYY-MM-DD or MM/DD/YYYY)
    #[serde(default)]
    #[validate(
        length(min = 1, message = "This field is required."),
        custom(function = "validate_date_format")
    )]
    pub renewal_date: String,
}

impl RenewBookForm {
    /// Fresh form proposing today + 3 weeks
    pub fn initial(today: NaiveDate) -> Self {
        Self {
            renewal_date: (today + Duration::weeks(DEFAULT_RENEWAL_WEEKS)).to_string(),
        }
    }

    /// Validate against `today` and return the accepted date
    pub fn clean(&self, today: NaiveDate) -> Result<NaiveDate, FormErrors> {
        if let Err(e) = self.validate() {
            return Err(FormErrors::from(e));
        }

        let mut errors = FormErrors::new();
        let Some(date) = parse_date(&self.renewal_date) else {
            errors.add("renewal_date", REQUIRED);
            return Err(errors);
        };

        if date < today {
            errors.add("renewal_date", RENEWAL_IN_PAST);
        } else if date > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
            errors.add("renewal_date", RENEWAL_TOO_FAR);
        }

        errors.into_result().map(|()| date)
    }
}
