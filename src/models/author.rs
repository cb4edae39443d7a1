//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Full author model from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// "Last, First" as shown in listings
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Validated author fields ready to be persisted
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthorInput {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorInput {
    pub fn into_author(self, id: i32) -> Author {
        Author {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
        }
    }
}
