use crate::error::ApiError;
use crate::model::user::User;
use crate::model::vacation_request::{
    JoinedRequestRow, NewVacationRequest, UserRequestRow, VacationRequest, VacationStatus,
};
use sqlx::MySqlPool;
use std::str::FromStr;
use strum_macros::EnumString;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SortField {
    StartDate,
    EndDate,
    CreatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::StartDate => "start_date",
            SortField::EndDate => "end_date",
            SortField::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        }
    }
}

/// Normalized paging and ordering for the list queries. Out-of-range and
/// unrecognized inputs fall back to the defaults instead of failing.
#[derive(Debug, Copy, Clone)]
pub struct ListParams {
    pub page: u64,
    pub limit: u64,
    pub sort: SortField,
    pub dir: SortDir,
}

impl ListParams {
    pub fn new(page: Option<u64>, limit: Option<u64>, sort: Option<&str>, dir: Option<&str>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            sort: sort
                .and_then(|s| SortField::from_str(s).ok())
                .unwrap_or(SortField::CreatedAt),
            dir: dir
                .and_then(|d| SortDir::from_str(d).ok())
                .unwrap_or(SortDir::Desc),
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

const REQUEST_COLUMNS: &str =
    "id, user_id, start_date, end_date, reason, status, comments, created_at";

/* =========================
Create vacation request
========================= */

/// Verifies the referenced user is an existing requester, then inserts with
/// status forced to Pending. Both steps share one transaction so a
/// concurrent role change cannot slip between the check and the insert.
pub async fn create_request(
    pool: &MySqlPool,
    new: &NewVacationRequest,
) -> Result<VacationRequest, ApiError> {
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>("SELECT id, name, role FROM users WHERE id = ?")
        .bind(new.user_id)
        .fetch_optional(&mut *tx)
        .await?;

    if !user.map(|u| u.is_requester()).unwrap_or(false) {
        return Err(ApiError::InvalidReference("Invalid requester user_id".into()));
    }

    let insert_sql = "INSERT INTO vacation_requests \
         (user_id, start_date, end_date, reason, status) \
         VALUES (?, ?, ?, ?, 'Pending')";
    let result = sqlx::query(insert_sql)
        .bind(new.user_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(new.reason.as_deref())
        .execute(&mut *tx)
        .await?;
    let id = result.last_insert_id();

    let select_sql = format!("SELECT {REQUEST_COLUMNS} FROM vacation_requests WHERE id = ?");
    let created = sqlx::query_as::<_, VacationRequest>(&select_sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(created)
}

/* =========================
List requests of one user
========================= */

pub async fn list_by_user(
    pool: &MySqlPool,
    user_id: u64,
    params: &ListParams,
) -> Result<(Vec<UserRequestRow>, i64), ApiError> {
    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vacation_requests WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    let data_sql = format!(
        "SELECT {REQUEST_COLUMNS}, DATEDIFF(end_date, start_date) + 1 AS days \
         FROM vacation_requests \
         WHERE user_id = ? \
         ORDER BY {} {} \
         LIMIT ? OFFSET ?",
        params.sort.column(),
        params.dir.as_str(),
    );

    let rows = sqlx::query_as::<_, UserRequestRow>(&data_sql)
        .bind(user_id)
        .bind(params.limit as i64)
        .bind(params.offset() as i64)
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

/* =========================
List all requests (validator view)
========================= */

pub async fn list_all(
    pool: &MySqlPool,
    status: Option<&str>,
    params: &ListParams,
) -> Result<(Vec<JoinedRequestRow>, i64), ApiError> {
    let mut where_sql = String::from(" WHERE 1=1");
    if status.is_some() {
        where_sql.push_str(" AND vacation_requests.status = ?");
    }

    // count against the same filtered base as the page data
    let count_sql = format!(
        "SELECT COUNT(*) FROM vacation_requests \
         JOIN users ON users.id = vacation_requests.user_id{where_sql}"
    );
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(status) = status {
        count_q = count_q.bind(status);
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT vacation_requests.id, vacation_requests.user_id, \
         vacation_requests.start_date, vacation_requests.end_date, \
         vacation_requests.reason, vacation_requests.status, \
         vacation_requests.comments, vacation_requests.created_at, \
         users.name AS user_name, users.role AS user_role, \
         DATEDIFF(vacation_requests.end_date, vacation_requests.start_date) + 1 AS days \
         FROM vacation_requests \
         JOIN users ON users.id = vacation_requests.user_id{where_sql} \
         ORDER BY vacation_requests.{} {} \
         LIMIT ? OFFSET ?",
        params.sort.column(),
        params.dir.as_str(),
    );

    let mut data_q = sqlx::query_as::<_, JoinedRequestRow>(&data_sql);
    if let Some(status) = status {
        data_q = data_q.bind(status);
    }
    let rows = data_q
        .bind(params.limit as i64)
        .bind(params.offset() as i64)
        .fetch_all(pool)
        .await?;

    Ok((rows, total))
}

/* =========================
Update request status
========================= */

pub async fn update_status(
    pool: &MySqlPool,
    id: u64,
    status: VacationStatus,
    comments: Option<String>,
) -> Result<VacationRequest, ApiError> {
    let existing = sqlx::query_scalar::<_, u64>("SELECT id FROM vacation_requests WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    if existing.is_none() {
        return Err(ApiError::NotFound("Request not found".into()));
    }

    sqlx::query("UPDATE vacation_requests SET status = ?, comments = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(reviewer_comments(status, comments))
        .bind(id)
        .execute(pool)
        .await?;

    let select_sql = format!("SELECT {REQUEST_COLUMNS} FROM vacation_requests WHERE id = ?");
    let updated = sqlx::query_as::<_, VacationRequest>(&select_sql)
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(updated)
}

/// Comments persist only on rejection (absent defaults to ""); any other
/// status clears them.
fn reviewer_comments(status: VacationStatus, comments: Option<String>) -> Option<String> {
    match status {
        VacationStatus::Rejected => Some(comments.unwrap_or_default()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_default_when_absent() {
        let params = ListParams::new(None, None, None, None);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.sort, SortField::CreatedAt);
        assert_eq!(params.dir, SortDir::Desc);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn page_is_floored_and_limit_clamped() {
        let params = ListParams::new(Some(0), Some(0), None, None);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);

        let params = ListParams::new(Some(5), Some(1000), None, None);
        assert_eq!(params.page, 5);
        assert_eq!(params.limit, MAX_LIMIT);
        assert_eq!(params.offset(), 400);
    }

    #[test]
    fn unknown_sort_falls_back_to_created_at() {
        let params = ListParams::new(None, None, Some("id"), None);
        assert_eq!(params.sort, SortField::CreatedAt);

        let params = ListParams::new(None, None, Some("start_date"), Some("asc"));
        assert_eq!(params.sort, SortField::StartDate);
        assert_eq!(params.dir, SortDir::Asc);
    }

    #[test]
    fn dir_is_case_insensitive_with_desc_fallback() {
        let params = ListParams::new(None, None, None, Some("ASC"));
        assert_eq!(params.dir, SortDir::Asc);

        let params = ListParams::new(None, None, None, Some("sideways"));
        assert_eq!(params.dir, SortDir::Desc);
    }

    #[test]
    fn rejection_keeps_comments_and_defaults_to_empty() {
        assert_eq!(
            reviewer_comments(VacationStatus::Rejected, Some("overlaps freeze".into())),
            Some("overlaps freeze".into())
        );
        assert_eq!(
            reviewer_comments(VacationStatus::Rejected, None),
            Some(String::new())
        );
    }

    #[test]
    fn approval_clears_comments() {
        assert_eq!(
            reviewer_comments(VacationStatus::Approved, Some("stale note".into())),
            None
        );
    }
}
