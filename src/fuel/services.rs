//! Fuel-economy derivation.
//!
//! `distance` and `fuel_economy` are computed once at insert time from the
//! highest-odometer prior fill-up of the same vehicle; they are the only
//! derived, order-dependent fields in the schema.

/// Distance covered since the previous fill-up; 0 when the vehicle has no
/// prior fuel record.
pub fn distance_since(previous_odometer: Option<i64>, odometer: i64) -> i64 {
    match previous_odometer {
        Some(prev) => odometer - prev,
        None => 0,
    }
}

/// Economy in the account's chosen unit. Undefined (None) when there is no
/// usable distance or fuel amount, or the unit is unknown.
pub fn compute_economy(distance: i64, fuel_amount: f64, unit: &str) -> Option<f64> {
    if distance <= 0 || fuel_amount <= 0.0 {
        return None;
    }
    match unit {
        "MPG" | "KM/L" => Some(distance as f64 / fuel_amount),
        "L/100KM" => Some((fuel_amount / distance as f64) * 100.0),
        _ => None,
    }
}
