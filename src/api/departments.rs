//! Department roster endpoint.

use axum::Json;

use crate::models::{club_departments, DepartmentsResponse};

/// GET /api/departments - The club's departments and their leads.
pub async fn list_departments() -> Json<DepartmentsResponse> {
    Json(DepartmentsResponse {
        departments_data: club_departments(),
    })
}
