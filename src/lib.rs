pub mod app;
pub mod auth;
pub mod backup;
pub mod config;
pub mod dates;
pub mod error;
pub mod expenses;
pub mod export;
pub mod fuel;
pub mod mailer;
pub mod reminders;
pub mod service_records;
pub mod settings;
pub mod state;
pub mod todos;
pub mod uploads;
pub mod vehicles;
