//! Application State - Stato condiviso dell'applicazione
//!
//! Costruito una sola volta all'avvio e condiviso tramite `Arc` tra route e
//! middleware.

use crate::core::auth::TokenValidator;
use crate::repositories::DrinkRepository;
use sqlx::SqlitePool;

pub struct AppState {
    /// Repository per la gestione dei drink
    pub drinks: DrinkRepository,

    /// Validatore dei bearer token, con la cache delle chiavi dell'issuer
    pub auth: TokenValidator,
}

impl AppState {
    /// # Arguments
    /// * `pool` - Pool di connessioni SQLite condiviso
    /// * `auth` - Validatore configurato con issuer, audience e key set
    pub fn new(pool: SqlitePool, auth: TokenValidator) -> Self {
        Self {
            drinks: DrinkRepository::new(pool),
            auth,
        }
    }
}
