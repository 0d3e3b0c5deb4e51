use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::{Date, OffsetDateTime};

use super::dto::{CreateFuelRecordRequest, FuelRecordPatch};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FuelRecord {
    pub id: i64,
    #[serde(skip_serializing)]
    pub vehicle_id: i64,
    #[serde(with = "crate::dates::iso")]
    pub date: Date,
    pub odometer: i64,
    pub fuel_amount: f64,
    pub cost: f64,
    pub unit_cost: Option<f64>,
    pub distance: Option<i64>,
    pub fuel_economy: Option<f64>,
    pub unit: String,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub fn apply_patch(record: &mut FuelRecord, patch: FuelRecordPatch) {
    if let Some(v) = patch.date {
        record.date = v;
    }
    if let Some(v) = patch.odometer {
        record.odometer = v;
    }
    if let Some(v) = patch.fuel_amount {
        record.fuel_amount = v;
    }
    if let Some(v) = patch.cost {
        record.cost = v;
    }
    if let Some(v) = patch.unit_cost {
        record.unit_cost = Some(v);
    }
    if let Some(v) = patch.notes {
        record.notes = Some(v);
    }
}

impl FuelRecord {
    pub async fn list_by_vehicle(
        db: &SqlitePool,
        vehicle_id: i64,
    ) -> anyhow::Result<Vec<FuelRecord>> {
        let rows = sqlx::query_as::<_, FuelRecord>(
            "SELECT * FROM fuel_records WHERE vehicle_id = ? ORDER BY date DESC",
        )
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Odometer of the immediately preceding fill-up, i.e. the highest one
    /// recorded for this vehicle.
    pub async fn last_odometer(db: &SqlitePool, vehicle_id: i64) -> anyhow::Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT odometer FROM fuel_records WHERE vehicle_id = ? ORDER BY odometer DESC LIMIT 1",
        )
        .bind(vehicle_id)
        .fetch_optional(db)
        .await?;
        Ok(row.map(|r| r.0))
    }

    pub async fn find_in_vehicle(
        db: &SqlitePool,
        id: i64,
        vehicle_id: i64,
    ) -> anyhow::Result<Option<FuelRecord>> {
        let row = sqlx::query_as::<_, FuelRecord>(
            "SELECT * FROM fuel_records WHERE id = ? AND vehicle_id = ?",
        )
        .bind(id)
        .bind(vehicle_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &SqlitePool,
        vehicle_id: i64,
        req: &CreateFuelRecordRequest,
        distance: i64,
        fuel_economy: Option<f64>,
        unit: &str,
    ) -> anyhow::Result<i64> {
        let res = sqlx::query(
            r#"
            INSERT INTO fuel_records
                (vehicle_id, date, odometer, fuel_amount, cost, unit_cost,
                 distance, fuel_economy, unit, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(vehicle_id)
        .bind(req.date)
        .bind(req.odometer)
        .bind(req.fuel_amount)
        .bind(req.cost.unwrap_or(0.0))
        .bind(req.unit_cost)
        .bind(distance)
        .bind(fuel_economy)
        .bind(unit)
        .bind(&req.notes)
        .bind(OffsetDateTime::now_utc())
        .execute(db)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn update(&self, db: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE fuel_records
            SET date = ?, odometer = ?, fuel_amount = ?, cost = ?, unit_cost = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(self.date)
        .bind(self.odometer)
        .bind(self.fuel_amount)
        .bind(self.cost)
        .bind(self.unit_cost)
        .bind(&self.notes)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM fuel_records WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
