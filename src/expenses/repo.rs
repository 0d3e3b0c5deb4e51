use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use time::{Date, OffsetDateTime};

use super::dto::{CreateExpenseRequest, ExpensePatch};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecurringExpense {
    pub id: i64,
    #[serde(skip_serializing)]
    pub vehicle_id: i64,
    pub expense_type: String,
    pub description: String,
    pub amount: f64,
    pub frequency: String,
    #[serde(with = "crate::dates::iso")]
    pub start_date: Date,
    #[serde(with = "crate::dates::iso")]
    pub next_due_date: Date,
    pub is_active: bool,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub fn apply_patch(expense: &mut RecurringExpense, patch: ExpensePatch) {
    if let Some(v) = patch.expense_type {
        expense.expense_type = v;
    }
    if let Some(v) = patch.description {
        expense.description = v;
    }
    if let Some(v) = patch.amount {
        expense.amount = v;
    }
    if let Some(v) = patch.notes {
        expense.notes = Some(v);
    }
}

impl RecurringExpense {
    pub async fn list_active(
        db: &SqlitePool,
        vehicle_id: i64,
    ) -> anyhow::Result<Vec<RecurringExpense>> {
        let rows = sqlx::query_as::<_, RecurringExpense>(
            "SELECT * FROM recurring_expenses WHERE vehicle_id = ? AND is_active = 1 ORDER BY next_due_date",
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
    ) -> anyhow::Result<Option<RecurringExpense>> {
        let row = sqlx::query_as::<_, RecurringExpense>(
            "SELECT * FROM recurring_expenses WHERE id = ? AND vehicle_id = ?",
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
        req: &CreateExpenseRequest,
        next_due_date: Date,
    ) -> anyhow::Result<i64> {
        let res = sqlx::query(
            r#"
            INSERT INTO recurring_expenses
                (vehicle_id, expense_type, description, amount, frequency,
                 start_date, next_due_date, is_active, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(vehicle_id)
        .bind(&req.expense_type)
        .bind(&req.description)
        .bind(req.amount)
        .bind(&req.frequency)
        .bind(req.start_date)
        .bind(next_due_date)
        .bind(&req.notes)
        .bind(OffsetDateTime::now_utc())
        .execute(db)
        .await?;
        Ok(res.last_insert_rowid())
    }

    pub async fn update(&self, db: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE recurring_expenses
            SET expense_type = ?, description = ?, amount = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&self.expense_type)
        .bind(&self.description)
        .bind(self.amount)
        .bind(&self.notes)
        .bind(self.id)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Cancellation deactivates the schedule but keeps the row for history.
    pub async fn deactivate(db: &SqlitePool, id: i64) -> anyhow::Result<()> {
        sqlx::query("UPDATE recurring_expenses SET is_active = 0 WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
