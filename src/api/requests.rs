use crate::error::{ApiError, FieldError};
use crate::model::vacation_request::{
    JoinedRequestRow, NewVacationRequest, UserRequestRow, VacationRequest, VacationStatus,
};
use crate::store::{self, ListParams};
use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRequestPayload {
    #[schema(example = 1)]
    pub user_id: Option<u64>,
    #[schema(example = "2025-01-10", format = "date", value_type = String)]
    pub start_date: Option<String>,
    #[schema(example = "2025-01-12", format = "date", value_type = String)]
    pub end_date: Option<String>,
    #[schema(example = "ski trip", nullable = true)]
    pub reason: Option<String>,
}

impl CreateRequestPayload {
    /// Collects every field problem before failing, so the caller sees the
    /// full details list in one round trip.
    pub fn validate(&self) -> Result<NewVacationRequest, ApiError> {
        let mut details = Vec::new();

        let user_id = self.user_id;
        if user_id.is_none() {
            details.push(FieldError::new("user_id", "user_id is required"));
        }
        let start_date = parse_date("start_date", self.start_date.as_deref(), &mut details);
        let end_date = parse_date("end_date", self.end_date.as_deref(), &mut details);

        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                details.push(FieldError::new(
                    "end_date",
                    "end_date must be on or after start_date",
                ));
            }
        }

        match (user_id, start_date, end_date) {
            (Some(user_id), Some(start_date), Some(end_date)) if details.is_empty() => {
                Ok(NewVacationRequest {
                    user_id,
                    start_date,
                    end_date,
                    // an empty reason is stored as NULL
                    reason: self.reason.clone().filter(|r| !r.is_empty()),
                })
            }
            _ => Err(ApiError::Validation(details)),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusPayload {
    #[schema(example = "Approved")]
    pub status: Option<String>,
    #[schema(example = "overlaps the release freeze", nullable = true)]
    pub comments: Option<String>,
}

/// A status-update payload that passed validation.
#[derive(Debug)]
pub struct StatusChange {
    pub status: VacationStatus,
    pub comments: Option<String>,
}

impl UpdateStatusPayload {
    pub fn validate(&self) -> Result<StatusChange, ApiError> {
        let status = match self.status.as_deref().map(VacationStatus::from_str) {
            Some(Ok(VacationStatus::Approved)) => VacationStatus::Approved,
            Some(Ok(VacationStatus::Rejected)) => VacationStatus::Rejected,
            // "Pending" is a valid stored status but never a valid target
            _ => {
                return Err(ApiError::Validation(vec![FieldError::new(
                    "status",
                    "status must be one of Approved, Rejected",
                )]));
            }
        };

        Ok(StatusChange {
            status,
            comments: self.comments.clone(),
        })
    }
}

fn parse_date(
    field: &'static str,
    value: Option<&str>,
    details: &mut Vec<FieldError>,
) -> Option<NaiveDate> {
    match value {
        None => {
            details.push(FieldError::new(field, format!("{field} is required")));
            None
        }
        Some(raw) => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(_) => {
                details.push(FieldError::new(
                    field,
                    format!("{field} must be a valid date (YYYY-MM-DD)"),
                ));
                None
            }
        },
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Filter by request status (exact match)
    pub status: Option<String>,
    /// Pagination page number (1-based)
    pub page: Option<u64>,
    /// Page size, capped at 100
    pub limit: Option<u64>,
    /// Sort column: start_date, end_date or created_at
    pub sort: Option<String>,
    /// Sort direction: asc or desc
    pub dir: Option<String>,
}

impl ListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page, self.limit, self.sort.as_deref(), self.dir.as_deref())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// Pagination page number (1-based)
    pub page: Option<u64>,
    /// Page size, capped at 100
    pub limit: Option<u64>,
    /// Sort column: start_date, end_date or created_at
    pub sort: Option<String>,
    /// Sort direction: asc or desc
    pub dir: Option<String>,
}

impl UserListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page, self.limit, self.sort.as_deref(), self.dir.as_deref())
    }
}

#[derive(Serialize, ToSchema)]
pub struct Pagination {
    #[schema(example = 3)]
    pub total: i64,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub limit: u64,
    #[schema(example = 1)]
    pub pages: u64,
}

impl Pagination {
    /// An empty result set still reports one page.
    pub fn new(total: i64, params: &ListParams) -> Self {
        Self {
            total,
            page: params.page,
            limit: params.limit,
            pages: (total.max(0) as u64).div_ceil(params.limit).max(1),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct Sorting {
    #[schema(example = "created_at")]
    pub sort: &'static str,
    #[schema(example = "desc")]
    pub dir: &'static str,
}

impl Sorting {
    fn new(params: &ListParams) -> Self {
        Self {
            sort: params.sort.column(),
            dir: params.dir.as_str(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StatusFilter {
    #[schema(example = "Pending", nullable = true)]
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RequestListResponse {
    pub data: Vec<JoinedRequestRow>,
    pub pagination: Pagination,
    pub sorting: Sorting,
    pub filter: StatusFilter,
}

#[derive(Serialize, ToSchema)]
pub struct UserRequestListResponse {
    pub data: Vec<UserRequestRow>,
    pub pagination: Pagination,
    pub sorting: Sorting,
}

/* =========================
Create vacation request
========================= */
#[utoipa::path(
    post,
    path = "/api/requests",
    request_body(
        content = CreateRequestPayload,
        description = "Vacation request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Request created", body = VacationRequest),
        (status = 400, description = "Validation or reference failure", body = Object, example = json!({
            "error": "Invalid requester user_id"
        }))
    ),
    tag = "Requests"
)]
pub async fn create_request(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateRequestPayload>,
) -> Result<HttpResponse, ApiError> {
    let new = payload.validate()?;
    let created = store::create_request(pool.get_ref(), &new).await?;
    Ok(HttpResponse::Created().json(created))
}

/* =========================
List all requests (validator view)
========================= */
#[utoipa::path(
    get,
    path = "/api/requests",
    params(ListQuery),
    responses(
        (status = 200, description = "Paginated request list", body = RequestListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Requests"
)]
pub async fn list_requests(
    pool: web::Data<MySqlPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let params = query.params();
    let (rows, total) = store::list_all(pool.get_ref(), query.status.as_deref(), &params).await?;

    Ok(HttpResponse::Ok().json(RequestListResponse {
        data: rows,
        pagination: Pagination::new(total, &params),
        sorting: Sorting::new(&params),
        filter: StatusFilter {
            status: query.status.clone(),
        },
    }))
}

/* =========================
List requests of one user
========================= */
#[utoipa::path(
    get,
    path = "/api/requests/{user_id}",
    params(
        ("user_id" = u64, Path, description = "ID of the requesting user"),
        UserListQuery
    ),
    responses(
        (status = 200, description = "Paginated request list for the user", body = UserRequestListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Requests"
)]
pub async fn list_user_requests(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<UserListQuery>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let params = query.params();
    let (rows, total) = store::list_by_user(pool.get_ref(), user_id, &params).await?;

    Ok(HttpResponse::Ok().json(UserRequestListResponse {
        data: rows,
        pagination: Pagination::new(total, &params),
        sorting: Sorting::new(&params),
    }))
}

/* =========================
Approve or reject a request
========================= */
#[utoipa::path(
    patch,
    path = "/api/requests/{id}",
    params(
        ("id" = u64, Path, description = "ID of the vacation request")
    ),
    request_body(
        content = UpdateStatusPayload,
        description = "Status update payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Request updated", body = VacationRequest),
        (status = 400, description = "Validation failure"),
        (status = 404, description = "Request not found", body = Object, example = json!({
            "error": "Request not found"
        }))
    ),
    tag = "Requests"
)]
pub async fn update_request_status(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateStatusPayload>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let change = payload.validate()?;
    let updated = store::update_status(pool.get_ref(), id, change.status, change.comments).await?;
    Ok(HttpResponse::Ok().json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_payload(
        user_id: Option<u64>,
        start: Option<&str>,
        end: Option<&str>,
        reason: Option<&str>,
    ) -> CreateRequestPayload {
        CreateRequestPayload {
            user_id,
            start_date: start.map(str::to_owned),
            end_date: end.map(str::to_owned),
            reason: reason.map(str::to_owned),
        }
    }

    fn validation_details(err: ApiError) -> Vec<FieldError> {
        match err {
            ApiError::Validation(details) => details,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn valid_create_payload_passes() {
        let payload = create_payload(Some(1), Some("2025-01-10"), Some("2025-01-12"), Some("ski"));
        let new = payload.validate().unwrap();

        assert_eq!(new.user_id, 1);
        assert_eq!(new.start_date.to_string(), "2025-01-10");
        assert_eq!(new.end_date.to_string(), "2025-01-12");
        assert_eq!(new.reason.as_deref(), Some("ski"));
    }

    #[test]
    fn single_day_range_is_valid() {
        let payload = create_payload(Some(1), Some("2025-03-01"), Some("2025-03-01"), None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn empty_reason_becomes_null() {
        let payload = create_payload(Some(1), Some("2025-01-10"), Some("2025-01-12"), Some(""));
        let new = payload.validate().unwrap();
        assert_eq!(new.reason, None);
    }

    #[test]
    fn inverted_date_range_is_rejected() {
        let payload = create_payload(Some(1), Some("2025-01-12"), Some("2025-01-10"), None);
        let details = validation_details(payload.validate().unwrap_err());

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field, "end_date");
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let payload = create_payload(None, None, None, None);
        let details = validation_details(payload.validate().unwrap_err());

        let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
        assert_eq!(fields, ["user_id", "start_date", "end_date"]);
    }

    #[test]
    fn malformed_date_is_rejected_with_field_detail() {
        let payload = create_payload(Some(1), Some("10/01/2025"), Some("2025-01-12"), None);
        let details = validation_details(payload.validate().unwrap_err());

        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field, "start_date");
        assert!(details[0].message.contains("valid date"));
    }

    #[test]
    fn update_accepts_approved_and_rejected() {
        let payload = UpdateStatusPayload {
            status: Some("Approved".into()),
            comments: None,
        };
        assert_eq!(payload.validate().unwrap().status, VacationStatus::Approved);

        let payload = UpdateStatusPayload {
            status: Some("Rejected".into()),
            comments: Some("overlaps freeze".into()),
        };
        let change = payload.validate().unwrap();
        assert_eq!(change.status, VacationStatus::Rejected);
        assert_eq!(change.comments.as_deref(), Some("overlaps freeze"));
    }

    #[test]
    fn update_never_accepts_pending() {
        let payload = UpdateStatusPayload {
            status: Some("Pending".into()),
            comments: None,
        };
        let details = validation_details(payload.validate().unwrap_err());
        assert_eq!(details[0].field, "status");
    }

    #[test]
    fn update_rejects_unknown_and_missing_status() {
        for status in [Some("Cancelled".to_owned()), None] {
            let payload = UpdateStatusPayload {
                status,
                comments: None,
            };
            assert!(payload.validate().is_err());
        }
    }

    #[test]
    fn pages_round_up_and_floor_at_one() {
        let params = ListParams::new(Some(2), Some(1), None, None);
        assert_eq!(Pagination::new(3, &params).pages, 3);

        let params = ListParams::new(None, None, None, None);
        assert_eq!(Pagination::new(0, &params).pages, 1);
        assert_eq!(Pagination::new(10, &params).pages, 1);
        assert_eq!(Pagination::new(11, &params).pages, 2);
    }
}
