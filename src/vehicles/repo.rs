use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use super::dto::{CreateVehicleRequest, VehiclePatch};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Vehicle {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub year: i64,
    pub make: String,
    pub model: String,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub odometer: i64,
    pub photo: Option<String>,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Apply a partial update; supplied values win, absent fields are unchanged.
pub fn apply_patch(vehicle: &mut Vehicle, patch: VehiclePatch) {
    if let Some(v) = patch.year {
        vehicle.year = v;
    }
    if let Some(v) = patch.make {
        vehicle.make = v;
    }
    if let Some(v) = patch.model {
        vehicle.model = v;
    }
    if let Some(v) = patch.vin {
        vehicle.vin = Some(v);
    }
    if let Some(v) = patch.license_plate {
        vehicle.license_plate = Some(v);
    }
    if let Some(v) = patch.odometer {
        vehicle.odometer = v;
    }
    if let Some(v) = patch.photo {
        vehicle.photo = Some(v);
    }
    if let Some(v) = patch.status {
        vehicle.status = v;
    }
}

impl Vehicle {
    pub async fn list_by_user(db: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Fetch a vehicle only if it belongs to `user_id`; foreign rows look
    /// like they do not exist.
    pub async fn find_owned(
        db: &SqlitePool,
        id: i64,
        user_id: i64,
    ) -> anyhow::Result<Option<Vehicle>> {
        let row = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn create(
        db: &SqlitePool,
        user_id: i64,
        req: &CreateVehicleRequest,
    ) -> anyhow::Result<i64> {
        let res = sqlx::query(
            r#"
            INSERT INTO vehicles (user_id, year, make, model, vin, license_plate, odometer, photo, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(req.year)
        .bind(&req.make)
        .bind(&req.model)
        .bind(&req.vin)
        .bind(&req.license_plate)
        .bind(req.odometer.unwrap_or(0))
        .bind(&req.photo)
        .bind(OffsetDateTime::now_utc())
        .execute(db)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn update(&self, db: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE vehicles
            SET year = ?, make = ?, model = ?, vin = ?, license_plate = ?,
                odometer = ?, photo = ?, status = ?
            WHERE id = ?
            "#,
        )
        .bind(self.year)
        .bind(&self.make)
        .bind(&self.model)
        .bind(&self.vin)
        .bind(&self.license_plate)
        .bind(self.odometer)
        .bind(&self.photo)
        .bind(&self.status)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Dependent records go with it via the schema's cascading foreign keys.
    pub async fn delete(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM vehicles WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
