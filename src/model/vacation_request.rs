use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;
use utoipa::ToSchema;

/// A persisted vacation request, as returned by create and status-update.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct VacationRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = "2025-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "ski trip", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "Pending")]
    pub status: String,
    #[schema(example = json!(null), nullable = true)]
    pub comments: Option<String>,
    #[schema(example = "2025-01-02T09:30:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Listing row for one user's requests. `days` is computed by the query,
/// inclusive of both endpoints.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct UserRequestRow {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = "2025-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "ski trip", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "Pending")]
    pub status: String,
    #[schema(example = json!(null), nullable = true)]
    pub comments: Option<String>,
    #[schema(example = "2025-01-02T09:30:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(example = 3)]
    pub days: i64,
}

/// Listing row for the validator view, joined with the requesting user.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct JoinedRequestRow {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = "2025-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2025-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "ski trip", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "Pending")]
    pub status: String,
    #[schema(example = json!(null), nullable = true)]
    pub comments: Option<String>,
    #[schema(example = "2025-01-02T09:30:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(example = "Alice Martin")]
    pub user_name: String,
    #[schema(example = "requester")]
    pub user_role: String,
    #[schema(example = 3)]
    pub days: i64,
}

/// A create payload that passed validation.
#[derive(Debug)]
pub struct NewVacationRequest {
    pub user_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumString)]
pub enum VacationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VacationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VacationStatus::Pending => "Pending",
            VacationStatus::Approved => "Approved",
            VacationStatus::Rejected => "Rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_exact_db_values_only() {
        assert_eq!("Approved".parse(), Ok(VacationStatus::Approved));
        assert_eq!("Rejected".parse(), Ok(VacationStatus::Rejected));
        assert_eq!("Pending".parse(), Ok(VacationStatus::Pending));
        // lowercase is not a valid wire value
        assert!("approved".parse::<VacationStatus>().is_err());
    }

    #[test]
    fn status_round_trips_through_as_str() {
        for status in [
            VacationStatus::Pending,
            VacationStatus::Approved,
            VacationStatus::Rejected,
        ] {
            assert_eq!(status.as_str().parse(), Ok(status));
        }
    }
}
