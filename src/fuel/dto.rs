use serde::{Deserialize, Serialize};
use time::Date;

#[derive(Debug, Deserialize)]
pub struct CreateFuelRecordRequest {
    #[serde(with = "crate::dates::iso")]
    pub date: Date,
    pub odometer: i64,
    pub fuel_amount: f64,
    #[serde(default)]
    pub cost: Option<f64>,
    pub unit_cost: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FuelRecordPatch {
    #[serde(default, with = "crate::dates::iso::option")]
    pub date: Option<Date>,
    pub odometer: Option<i64>,
    pub fuel_amount: Option<f64>,
    pub cost: Option<f64>,
    pub unit_cost: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FuelCreatedResponse {
    pub id: i64,
    pub message: String,
    pub fuel_economy: Option<f64>,
}
