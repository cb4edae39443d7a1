//! Book instance (loanable copy) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{
    postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
    Decode, Encode, FromRow, Postgres,
};
use utoipa::ToSchema;
use uuid::Uuid;

/// Loan status of a copy, stored as a one-letter code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum LoanStatus {
    #[serde(rename = "m")]
    Maintenance,
    #[serde(rename = "o")]
    OnLoan,
    #[serde(rename = "a")]
    Available,
    #[serde(rename = "r")]
    Reserved,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }
}

impl Default for LoanStatus {
    fn default() -> Self {
        LoanStatus::Maintenance
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m" => Ok(LoanStatus::Maintenance),
            "o" => Ok(LoanStatus::OnLoan),
            "a" => Ok(LoanStatus::Available),
            "r" => Ok(LoanStatus::Reserved),
            other => Err(format!("Invalid loan status code: {}", other)),
        }
    }
}

// SQLx conversion for LoanStatus
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<'r, Postgres>>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> sqlx::encode::IsNull {
        <&str as Encode<Postgres>>::encode(self.as_str(), buf)
    }
}

/// Copy of a book, joined with the book title and the borrower's username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookInstance {
    pub id: Uuid,
    pub book_id: i32,
    pub book_title: String,
    pub status: LoanStatus,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub borrower_username: Option<String>,
}

impl BookInstance {
    /// A due date only counts while the copy is out on loan
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == LoanStatus::OnLoan && self.due_back.map(|d| d < today).unwrap_or(false)
    }
}

/// Filter over copies; `None` fields match everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceFilter {
    pub status: Option<LoanStatus>,
    pub borrower_id: Option<i32>,
}

impl InstanceFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_status(status: LoanStatus) -> Self {
        Self {
            status: Some(status),
            borrower_id: None,
        }
    }

    /// Copies currently on loan, optionally restricted to one borrower
    pub fn on_loan(borrower_id: Option<i32>) -> Self {
        Self {
            status: Some(LoanStatus::OnLoan),
            borrower_id,
        }
    }

    pub fn matches(&self, instance: &BookInstance) -> bool {
        self.status.map(|s| s == instance.status).unwrap_or(true)
            && self
                .borrower_id
                .map(|b| instance.borrower_id == Some(b))
                .unwrap_or(true)
    }
}
