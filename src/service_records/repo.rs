use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::{Date, OffsetDateTime};

use super::dto::{CreateServiceRecordRequest, ServiceRecordPatch};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceRecord {
    pub id: i64,
    #[serde(skip_serializing)]
    pub vehicle_id: i64,
    #[serde(with = "crate::dates::iso")]
    pub date: Date,
    pub odometer: i64,
    pub description: String,
    pub cost: f64,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub document_path: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub fn apply_patch(record: &mut ServiceRecord, patch: ServiceRecordPatch) {
    if let Some(v) = patch.date {
        record.date = v;
    }
    if let Some(v) = patch.odometer {
        record.odometer = v;
    }
    if let Some(v) = patch.description {
        record.description = v;
    }
    if let Some(v) = patch.cost {
        record.cost = v;
    }
    if let Some(v) = patch.notes {
        record.notes = Some(v);
    }
    if let Some(v) = patch.category {
        record.category = Some(v);
    }
    if let Some(v) = patch.document_path {
        record.document_path = Some(v);
    }
}

impl ServiceRecord {
    pub async fn list_by_vehicle(
        db: &SqlitePool,
        vehicle_id: i64,
    ) -> anyhow::Result<Vec<ServiceRecord>> {
        let rows = sqlx::query_as::<_, ServiceRecord>(
            "SELECT * FROM service_records WHERE vehicle_id = ? ORDER BY date DESC",
        )
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_in_vehicle(
        db: &SqlitePool,
        id: i64,
        vehicle_id: i64,
    ) -> anyhow::Result<Option<ServiceRecord>> {
        let row = sqlx::query_as::<_, ServiceRecord>(
            "SELECT * FROM service_records WHERE id = ? AND vehicle_id = ?",
        )
        .bind(id)
        .bind(vehicle_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn create(
        db: &SqlitePool,
        vehicle_id: i64,
        req: &CreateServiceRecordRequest,
    ) -> anyhow::Result<i64> {
        let res = sqlx::query(
            r#"
            INSERT INTO service_records
                (vehicle_id, date, odometer, description, cost, notes, category, document_path, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(vehicle_id)
        .bind(req.date)
        .bind(req.odometer)
        .bind(&req.description)
        .bind(req.cost.unwrap_or(0.0))
        .bind(&req.notes)
        .bind(&req.category)
        .bind(&req.document_path)
        .bind(OffsetDateTime::now_utc())
        .execute(db)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn update(&self, db: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE service_records
            SET date = ?, odometer = ?, description = ?, cost = ?,
                notes = ?, category = ?, document_path = ?
            WHERE id = ?
            "#,
        )
        .bind(self.date)
        .bind(self.odometer)
        .bind(&self.description)
        .bind(self.cost)
        .bind(&self.notes)
        .bind(&self.category)
        .bind(&self.document_path)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM service_records WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
