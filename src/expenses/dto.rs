use serde::Deserialize;
use time::Date;

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub expense_type: String,
    pub description: String,
    pub amount: f64,
    pub frequency: String,
    #[serde(with = "crate::dates::iso")]
    pub start_date: Date,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpensePatch {
    pub expense_type: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub notes: Option<String>,
}
