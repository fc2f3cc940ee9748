//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! - Autenticazione: validazione dei token, cache delle chiavi, permission gate
//! - Configurazione
//! - Gestione errori ed extractor
//! - Stato applicazione

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod jwks;
pub mod state;

// Re-exports per facilitare l'import
pub use auth::{
    AuthClaims, AuthError, PermissionGuard, TokenValidator, authorization_middleware,
    check_permissions, permissions,
};
pub use config::Config;
pub use error::AppError;
pub use extract::{AppJson, AppPath};
pub use jwks::JwksCache;
pub use state::AppState;
