//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Ogni repository gestisce le operazioni di database per una specifica entità.
//! Le query sono scritte con `query_as::<_, T>` e `bind`: il controllo avviene
//! a run-time, così la build non richiede un database raggiungibile.

// Dichiarazione dei sotto-moduli
pub mod drink;
pub mod traits;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read, ReadAll, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use drink::DrinkRepository;
