use anyhow::Context;

use crate::{
    dates::ISO_DATE, fuel::repo::FuelRecord, reminders::repo::Reminder,
    service_records::repo::ServiceRecord, todos::repo::Todo, vehicles::repo::Vehicle,
};

fn date_str(date: time::Date) -> anyhow::Result<String> {
    date.format(ISO_DATE).context("formatting date")
}

fn finish(writer: csv::Writer<Vec<u8>>) -> anyhow::Result<Vec<u8>> {
    writer.into_inner().context("flushing csv writer")
}

pub fn vehicle_info_csv(vehicle: &Vehicle) -> anyhow::Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([
        "Year",
        "Make",
        "Model",
        "VIN",
        "License Plate",
        "Current Odometer",
        "Status",
        "Photo URL",
    ])?;
    w.write_record([
        vehicle.year.to_string(),
        vehicle.make.clone(),
        vehicle.model.clone(),
        vehicle.vin.clone().unwrap_or_default(),
        vehicle.license_plate.clone().unwrap_or_default(),
        vehicle.odometer.to_string(),
        vehicle.status.clone(),
        vehicle.photo.clone().unwrap_or_default(),
    ])?;
    finish(w)
}

pub fn service_records_csv(records: &[ServiceRecord]) -> anyhow::Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([
        "Date",
        "Odometer",
        "Description",
        "Category",
        "Cost",
        "Notes",
        "Document",
    ])?;
    for r in records {
        w.write_record([
            date_str(r.date)?,
            r.odometer.to_string(),
            r.description.clone(),
            r.category.clone().unwrap_or_default(),
            r.cost.to_string(),
            r.notes.clone().unwrap_or_default(),
            r.document_path.clone().unwrap_or_default(),
        ])?;
    }
    finish(w)
}

pub fn fuel_records_csv(records: &[FuelRecord]) -> anyhow::Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([
        "Date",
        "Odometer",
        "Fuel Amount",
        "Unit",
        "Cost",
        "Unit Cost",
        "Distance",
        "Fuel Economy",
        "Notes",
    ])?;
    for r in records {
        w.write_record([
            date_str(r.date)?,
            r.odometer.to_string(),
            r.fuel_amount.to_string(),
            r.unit.clone(),
            r.cost.to_string(),
            r.unit_cost.unwrap_or(0.0).to_string(),
            r.distance.unwrap_or(0).to_string(),
            r.fuel_economy.unwrap_or(0.0).to_string(),
            r.notes.clone().unwrap_or_default(),
        ])?;
    }
    finish(w)
}

pub fn reminders_csv(reminders: &[Reminder]) -> anyhow::Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record([
        "Description",
        "Urgency",
        "Due Date",
        "Due Odometer",
        "Recurring",
        "Interval Type",
        "Interval Value",
        "Notes",
        "Completed",
    ])?;
    for r in reminders {
        w.write_record([
            r.description.clone(),
            r.urgency.clone(),
            r.due_date.map(date_str).transpose()?.unwrap_or_default(),
            r.due_odometer.map(|v| v.to_string()).unwrap_or_default(),
            r.recurring.to_string(),
            r.interval_type.clone().unwrap_or_default(),
            r.interval_value.map(|v| v.to_string()).unwrap_or_default(),
            r.notes.clone().unwrap_or_default(),
            r.completed.to_string(),
        ])?;
    }
    finish(w)
}

pub fn todos_csv(todos: &[Todo]) -> anyhow::Result<Vec<u8>> {
    let mut w = csv::Writer::from_writer(Vec::new());
    w.write_record(["Description", "Type", "Priority", "Status", "Cost", "Notes"])?;
    for t in todos {
        w.write_record([
            t.description.clone(),
            t.kind.clone().unwrap_or_default(),
            t.priority.clone(),
            t.status.clone(),
            t.cost.to_string(),
            t.notes.clone().unwrap_or_default(),
        ])?;
    }
    finish(w)
}
