use std::io::{Cursor, Write};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::instrument;
use zip::{write::FileOptions, ZipWriter};

use crate::{
    auth::jwt::AuthUser,
    dates::ISO_DATE,
    error::{ApiError, ApiResult},
    fuel::repo::FuelRecord,
    reminders::repo::Reminder,
    service_records::repo::ServiceRecord,
    state::AppState,
    todos::repo::Todo,
    vehicles::handlers::require_owned,
};

use super::services;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/export/:data_type", get(export_data))
        .route("/vehicles/:vehicle_id/export-all", get(export_all))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub vehicle_id: i64,
}

fn attachment_headers(filename: &str, content_type: &'static str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
    );
    headers
}

#[instrument(skip(state))]
pub async fn export_data(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(data_type): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<(HeaderMap, Vec<u8>)> {
    require_owned(&state, query.vehicle_id, user_id).await?;

    let csv = match data_type.as_str() {
        "service_records" => {
            let records = ServiceRecord::list_by_vehicle(&state.db, query.vehicle_id).await?;
            services::service_records_csv(&records)?
        }
        "fuel_records" => {
            let records = FuelRecord::list_by_vehicle(&state.db, query.vehicle_id).await?;
            services::fuel_records_csv(&records)?
        }
        _ => return Err(ApiError::Validation("Invalid data type".into())),
    };

    let filename = format!("{}_{}.csv", data_type, query.vehicle_id);
    Ok((attachment_headers(&filename, "text/csv"), csv))
}

/// One zip with a CSV per category, replacing per-type exports when the whole
/// vehicle history is wanted at once.
#[instrument(skip(state))]
pub async fn export_all(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(vehicle_id): Path<i64>,
) -> ApiResult<(HeaderMap, Vec<u8>)> {
    let vehicle = require_owned(&state, vehicle_id, user_id).await?;

    let service_records = ServiceRecord::list_by_vehicle(&state.db, vehicle_id).await?;
    let fuel_records = FuelRecord::list_by_vehicle(&state.db, vehicle_id).await?;
    let reminders = Reminder::list_all(&state.db, vehicle_id).await?;
    let todos = Todo::list_by_vehicle(&state.db, vehicle_id).await?;

    let entries: Vec<(&str, Vec<u8>)> = vec![
        ("vehicle_info.csv", services::vehicle_info_csv(&vehicle)?),
        (
            "service_records.csv",
            services::service_records_csv(&service_records)?,
        ),
        ("fuel_records.csv", services::fuel_records_csv(&fuel_records)?),
        ("reminders.csv", services::reminders_csv(&reminders)?),
        ("todos.csv", services::todos_csv(&todos)?),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in entries {
        writer
            .start_file(name, options)
            .map_err(|e| ApiError::Storage(e.into()))?;
        writer
            .write_all(&data)
            .map_err(|e| ApiError::Storage(e.into()))?;
    }
    let archive = writer
        .finish()
        .map_err(|e| ApiError::Storage(e.into()))?
        .into_inner();

    let today = time::OffsetDateTime::now_utc()
        .date()
        .format(ISO_DATE)
        .map_err(|e| ApiError::Storage(e.into()))?
        .replace('-', "");
    let filename = format!(
        "{}_{}_{}_Complete_Data_{}.zip",
        vehicle.year, vehicle.make, vehicle.model, today
    );
    Ok((attachment_headers(&filename, "application/zip"), archive))
}
