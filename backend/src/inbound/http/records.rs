//! Record versioning API handlers.
//!
//! ```text
//! GET  /api/records?view=latest
//! POST /api/records {"type":"UPDATED","recordId":"65f0a1b2c3d4e5f60718293a","description":"v2"}
//! GET  /api/records/65f0a1b2c3d4e5f60718293a
//! GET  /api/records/65f0a1b2c3d4e5f60718293a/all
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, Record, RecordDraft, RecordValidationError, RecordView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_record_id;

/// Query parameters for listing records.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRecordsQuery {
    /// `all` (default) returns every version; `latest` one per record.
    #[serde(default)]
    #[param(inline)]
    pub view: RecordView,
}

/// Append request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRecordRequest {
    /// `NEW` or `UPDATED`.
    #[serde(rename = "type")]
    #[schema(example = "NEW")]
    pub record_type: Option<String>,
    /// Required for `UPDATED`.
    pub record_id: Option<String>,
    /// Free-text content of this version.
    pub description: Option<String>,
}

fn map_draft_error(err: RecordValidationError) -> Error {
    let field = match err {
        RecordValidationError::InvalidId | RecordValidationError::MissingRecordId => "recordId",
        RecordValidationError::MissingType | RecordValidationError::UnknownType => "type",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

/// List record versions.
#[utoipa::path(
    get,
    path = "/api/records",
    params(ListRecordsQuery),
    responses(
        (status = 200, description = "Record versions, newest first", body = [Record]),
        (status = 400, description = "Invalid view", body = Error),
        (status = 503, description = "Document store unavailable", body = Error)
    ),
    tags = ["records"],
    operation_id = "listRecords",
    security([])
)]
#[get("/records")]
pub async fn list_records(
    state: web::Data<HttpState>,
    query: web::Query<ListRecordsQuery>,
) -> ApiResult<web::Json<Vec<Record>>> {
    let records = state.records_query.list(query.view).await?;
    Ok(web::Json(records))
}

/// Append a record version.
#[utoipa::path(
    post,
    path = "/api/records",
    request_body = CreateRecordRequest,
    responses(
        (status = 201, description = "Stored version", body = Record),
        (status = 400, description = "Invalid payload", body = Error),
        (status = 404, description = "Record not found", body = Error),
        (status = 503, description = "Document store unavailable", body = Error)
    ),
    tags = ["records"],
    operation_id = "createRecord",
    security([])
)]
#[post("/records")]
pub async fn create_record(
    state: web::Data<HttpState>,
    payload: web::Json<CreateRecordRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let draft = RecordDraft::try_from_parts(
        body.record_type.as_deref(),
        body.record_id.as_deref(),
        body.description.as_deref(),
    )
    .map_err(map_draft_error)?;
    let record = state.records.append(draft).await?;
    Ok(HttpResponse::Created().json(record))
}

/// Latest version of a record.
#[utoipa::path(
    get,
    path = "/api/records/{record_id}",
    params(("record_id" = String, Path, description = "24 character hex record id")),
    responses(
        (status = 200, description = "Latest version", body = Record),
        (status = 400, description = "Invalid record ID", body = Error),
        (status = 404, description = "Record not found", body = Error)
    ),
    tags = ["records"],
    operation_id = "getLatestRecord",
    security([])
)]
#[get("/records/{record_id}")]
pub async fn latest_record(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Record>> {
    let record_id = parse_record_id(&path)?;
    Ok(web::Json(state.records_query.latest(&record_id).await?))
}

/// Every version of a record, newest first.
#[utoipa::path(
    get,
    path = "/api/records/{record_id}/all",
    params(("record_id" = String, Path, description = "24 character hex record id")),
    responses(
        (status = 200, description = "Version history", body = [Record]),
        (status = 400, description = "Invalid record ID", body = Error),
        (status = 404, description = "Records not found by id", body = Error)
    ),
    tags = ["records"],
    operation_id = "getRecordHistory",
    security([])
)]
#[get("/records/{record_id}/all")]
pub async fn record_history(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<Record>>> {
    let record_id = parse_record_id(&path)?;
    Ok(web::Json(state.records_query.history(&record_id).await?))
}
