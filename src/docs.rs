use crate::api::requests::{
    CreateRequestPayload, Pagination, RequestListResponse, Sorting, StatusFilter,
    UpdateStatusPayload, UserRequestListResponse,
};
use crate::error::FieldError;
use crate::model::vacation_request::{JoinedRequestRow, UserRequestRow, VacationRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Vacation Request API",
        version = "1.0.0",
        description = r#"
## Vacation Request Management

This API manages **vacation requests**: requesters submit leave requests,
validators approve or reject them.

### 🔹 Key Features
- **Request Submission**
  - Submit a date range with an optional reason; new requests start as Pending
- **Review**
  - Approve or reject pending requests, with a rejection note
- **Listing**
  - Per-user and global views with status filter, pagination and sorting

### 📦 Response Format
- JSON-based RESTful responses
- Pagination, sorting and filter echoes on list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::requests::create_request,
        crate::api::requests::list_requests,
        crate::api::requests::list_user_requests,
        crate::api::requests::update_request_status,
    ),
    components(
        schemas(
            CreateRequestPayload,
            UpdateStatusPayload,
            VacationRequest,
            UserRequestRow,
            JoinedRequestRow,
            RequestListResponse,
            UserRequestListResponse,
            Pagination,
            Sorting,
            StatusFilter,
            FieldError
        )
    ),
    tags(
        (name = "Requests", description = "Vacation request APIs"),
    )
)]
pub struct ApiDoc;
