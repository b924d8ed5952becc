//! Handlers for the admin database passthrough under `/admin/db`.
//!
//! Input problems (missing parameters, bad identifiers) are 400s. Anything
//! the database rejects is a 500 carrying the database's message.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use instabids_core::admin::{
    require_columns_object, require_table, ColumnDefinition, TableDefinition, TableQuery,
};
use instabids_core::persistence::StoreError;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::query::TableParams;
use crate::response::{DataResponse, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RecordRequest {
    pub table: Option<String>,
    pub data: Option<Value>,
    pub filters: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTableRequest {
    pub table_name: Option<String>,
    pub columns: Vec<ColumnDefinition>,
}

fn operation_failed(action: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |e| {
        tracing::warn!(action, error = %e, "Admin passthrough failed");
        AppError::OperationFailed(e.to_string())
    }
}

/// POST /api/admin/db/records
pub async fn insert_record(
    State(state): State<AppState>,
    AppJson(input): AppJson<RecordRequest>,
) -> AppResult<Json<DataResponse<Value>>> {
    let table = require_table(input.table.as_deref())?;
    let data = require_columns_object("data", input.data.as_ref())?;

    let row = state
        .admin
        .insert(&table, &data)
        .await
        .map_err(operation_failed("insert"))?;
    tracing::info!(table = %table, "Admin record inserted");
    Ok(Json(DataResponse { data: row }))
}

/// PUT /api/admin/db/records
pub async fn update_records(
    State(state): State<AppState>,
    AppJson(input): AppJson<RecordRequest>,
) -> AppResult<Json<DataResponse<Vec<Value>>>> {
    let table = require_table(input.table.as_deref())?;
    let data = require_columns_object("data", input.data.as_ref())?;
    let filters = require_columns_object("filters", input.filters.as_ref())?;

    let rows = state
        .admin
        .update(&table, &data, &filters)
        .await
        .map_err(operation_failed("update"))?;
    tracing::info!(table = %table, count = rows.len(), "Admin records updated");
    Ok(Json(DataResponse { data: rows }))
}

/// DELETE /api/admin/db/records
pub async fn delete_records(
    State(state): State<AppState>,
    AppJson(input): AppJson<RecordRequest>,
) -> AppResult<Json<DataResponse<Vec<Value>>>> {
    let table = require_table(input.table.as_deref())?;
    let filters = require_columns_object("filters", input.filters.as_ref())?;

    let rows = state
        .admin
        .delete(&table, &filters)
        .await
        .map_err(operation_failed("delete"))?;
    tracing::info!(table = %table, count = rows.len(), "Admin records deleted");
    Ok(Json(DataResponse { data: rows }))
}

/// POST /api/admin/db/table
pub async fn create_table(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateTableRequest>,
) -> AppResult<(StatusCode, Json<SuccessResponse>)> {
    let definition = TableDefinition::parse(input.table_name.as_deref(), &input.columns)?;
    state
        .admin
        .create_table(&definition)
        .await
        .map_err(operation_failed("create_table"))?;
    tracing::info!(
        table = %definition.name,
        columns = definition.columns.len(),
        "Admin table created",
    );
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::ok(format!(
            "Table '{}' created",
            definition.name
        ))),
    ))
}

/// GET /api/admin/db/table
pub async fn select_rows(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<TableParams>,
) -> AppResult<Json<DataResponse<Vec<Value>>>> {
    let query = TableQuery::parse(
        params.name.as_deref(),
        params.columns.as_deref(),
        params.limit,
        params.offset,
        params.order_by.as_deref(),
    )?;
    let rows = state
        .admin
        .select(&query)
        .await
        .map_err(operation_failed("select"))?;
    Ok(Json(DataResponse { data: rows }))
}
