use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::{Date, OffsetDateTime};

use super::dto::{CreateReminderRequest, ReminderPatch};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reminder {
    pub id: i64,
    #[serde(skip_serializing)]
    pub vehicle_id: i64,
    pub description: String,
    pub urgency: String,
    #[serde(with = "crate::dates::iso::option")]
    pub due_date: Option<Date>,
    pub due_odometer: Option<i64>,
    pub metric: Option<String>,
    pub recurring: bool,
    pub interval_type: Option<String>,
    pub interval_value: Option<i64>,
    pub completed: bool,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub fn apply_patch(reminder: &mut Reminder, patch: ReminderPatch) {
    if let Some(v) = patch.description {
        reminder.description = v;
    }
    if let Some(v) = patch.urgency {
        reminder.urgency = v;
    }
    if let Some(v) = patch.due_date {
        reminder.due_date = Some(v);
    }
    if let Some(v) = patch.due_odometer {
        reminder.due_odometer = Some(v);
    }
    if let Some(v) = patch.metric {
        reminder.metric = Some(v);
    }
    if let Some(v) = patch.recurring {
        reminder.recurring = v;
    }
    if let Some(v) = patch.interval_type {
        reminder.interval_type = Some(v);
    }
    if let Some(v) = patch.interval_value {
        reminder.interval_value = Some(v);
    }
    if let Some(v) = patch.completed {
        reminder.completed = v;
    }
    if let Some(v) = patch.notes {
        reminder.notes = Some(v);
    }
}

impl Reminder {
    /// Open reminders only; completed ones stay in the table for history but
    /// drop out of the list.
    pub async fn list_open(db: &SqlitePool, vehicle_id: i64) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE vehicle_id = ? AND completed = 0 ORDER BY created_at DESC",
        )
        .bind(vehicle_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Everything including completed reminders, for exports.
    pub async fn list_all(db: &SqlitePool, vehicle_id: i64) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, Reminder>(
            "SELECT * FROM reminders WHERE vehicle_id = ? ORDER BY created_at DESC",
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
    ) -> anyhow::Result<Option<Reminder>> {
        let row =
            sqlx::query_as::<_, Reminder>("SELECT * FROM reminders WHERE id = ? AND vehicle_id = ?")
                .bind(id)
                .bind(vehicle_id)
                .fetch_optional(db)
                .await?;
        Ok(row)
    }

    pub async fn create(
        db: &SqlitePool,
        vehicle_id: i64,
        req: &CreateReminderRequest,
    ) -> anyhow::Result<i64> {
        let res = sqlx::query(
            r#"
            INSERT INTO reminders
                (vehicle_id, description, urgency, due_date, due_odometer, metric,
                 recurring, interval_type, interval_value, completed, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(vehicle_id)
        .bind(&req.description)
        .bind(req.urgency.as_deref().unwrap_or("not_urgent"))
        .bind(req.due_date)
        .bind(req.due_odometer)
        .bind(&req.metric)
        .bind(req.recurring)
        .bind(&req.interval_type)
        .bind(req.interval_value)
        .bind(&req.notes)
        .bind(OffsetDateTime::now_utc())
        .execute(db)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn update(&self, db: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE reminders
            SET description = ?, urgency = ?, due_date = ?, due_odometer = ?, metric = ?,
                recurring = ?, interval_type = ?, interval_value = ?, completed = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&self.description)
        .bind(&self.urgency)
        .bind(self.due_date)
        .bind(self.due_odometer)
        .bind(&self.metric)
        .bind(self.recurring)
        .bind(&self.interval_type)
        .bind(self.interval_value)
        .bind(self.completed)
        .bind(&self.notes)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM reminders WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
