pub mod handlers;
pub mod services;

pub use services::{STORE_FILE_NAME, UPLOADS_DIR_NAME};

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
