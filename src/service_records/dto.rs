use serde::Deserialize;
use time::Date;

#[derive(Debug, Deserialize)]
pub struct CreateServiceRecordRequest {
    #[serde(with = "crate::dates::iso")]
    pub date: Date,
    pub odometer: i64,
    pub description: String,
    #[serde(default)]
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub document_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceRecordPatch {
    #[serde(default, with = "crate::dates::iso::option")]
    pub date: Option<Date>,
    pub odometer: Option<i64>,
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub document_path: Option<String>,
}
