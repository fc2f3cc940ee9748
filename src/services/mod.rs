//! Services module - Coordinatore per tutti i service handler HTTP

pub mod drink;

// Re-exports per facilitare l'import
pub use drink::{create_drink, delete_drink, list_drinks, list_drinks_detail, update_drink};

use crate::core::AppError;

/// Fallback per le route inesistenti
pub async fn route_not_found() -> AppError {
    AppError::not_found()
}

/// Fallback per un metodo non gestito su una route esistente
pub async fn method_not_allowed() -> AppError {
    AppError::method_not_allowed()
}
