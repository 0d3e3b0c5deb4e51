use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateVehicleRequest {
    pub year: i64,
    pub make: String,
    pub model: String,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    #[serde(default)]
    pub odometer: Option<i64>,
    pub photo: Option<String>,
}

/// Partial update: a supplied field wins, an absent field leaves the stored
/// value unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct VehiclePatch {
    pub year: Option<i64>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub odometer: Option<i64>,
    pub photo: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}
