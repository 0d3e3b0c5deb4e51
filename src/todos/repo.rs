use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;

use super::dto::{CreateTodoRequest, TodoPatch};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Todo {
    pub id: i64,
    #[serde(skip_serializing)]
    pub vehicle_id: i64,
    pub description: String,
    pub cost: f64,
    pub priority: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub fn apply_patch(todo: &mut Todo, patch: TodoPatch) {
    if let Some(v) = patch.description {
        todo.description = v;
    }
    if let Some(v) = patch.cost {
        todo.cost = v;
    }
    if let Some(v) = patch.priority {
        todo.priority = v;
    }
    if let Some(v) = patch.status {
        todo.status = v;
    }
    if let Some(v) = patch.kind {
        todo.kind = Some(v);
    }
    if let Some(v) = patch.notes {
        todo.notes = Some(v);
    }
}

impl Todo {
    pub async fn list_by_vehicle(db: &SqlitePool, vehicle_id: i64) -> anyhow::Result<Vec<Todo>> {
        let rows = sqlx::query_as::<_, Todo>(
            "SELECT * FROM todos WHERE vehicle_id = ? ORDER BY created_at DESC",
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
    ) -> anyhow::Result<Option<Todo>> {
        let row = sqlx::query_as::<_, Todo>("SELECT * FROM todos WHERE id = ? AND vehicle_id = ?")
            .bind(id)
            .bind(vehicle_id)
            .fetch_optional(db)
            .await?;
        Ok(row)
    }

    pub async fn create(
        db: &SqlitePool,
        vehicle_id: i64,
        req: &CreateTodoRequest,
    ) -> anyhow::Result<i64> {
        let res = sqlx::query(
            r#"
            INSERT INTO todos (vehicle_id, description, cost, priority, status, kind, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(vehicle_id)
        .bind(&req.description)
        .bind(req.cost.unwrap_or(0.0))
        .bind(req.priority.as_deref().unwrap_or("medium"))
        .bind(req.status.as_deref().unwrap_or("planned"))
        .bind(&req.kind)
        .bind(&req.notes)
        .bind(OffsetDateTime::now_utc())
        .execute(db)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn update(&self, db: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE todos
            SET description = ?, cost = ?, priority = ?, status = ?, kind = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&self.description)
        .bind(self.cost)
        .bind(&self.priority)
        .bind(&self.status)
        .bind(&self.kind)
        .bind(&self.notes)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
