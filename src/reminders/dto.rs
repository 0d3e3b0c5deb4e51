use serde::Deserialize;
use time::Date;

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    pub description: String,
    pub urgency: Option<String>,
    #[serde(default, with = "crate::dates::iso::option")]
    pub due_date: Option<Date>,
    pub due_odometer: Option<i64>,
    pub metric: Option<String>,
    #[serde(default)]
    pub recurring: bool,
    pub interval_type: Option<String>,
    pub interval_value: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReminderPatch {
    pub description: Option<String>,
    pub urgency: Option<String>,
    #[serde(default, with = "crate::dates::iso::option")]
    pub due_date: Option<Date>,
    pub due_odometer: Option<i64>,
    pub metric: Option<String>,
    pub recurring: Option<bool>,
    pub interval_type: Option<String>,
    pub interval_value: Option<i64>,
    pub completed: Option<bool>,
    pub notes: Option<String>,
}
