//! Drink entity - Entità drink con la sua ricetta

use serde::{Deserialize, Serialize};
use serde_json::Number;
use sqlx::types::Json;
use validator::{Validate, ValidationError};

/// Singolo ingrediente di una ricetta
#[derive(Serialize, Deserialize, Validate, Debug, Clone, PartialEq)]
pub struct Ingredient {
    #[validate(length(min = 1, max = 80, message = "Ingredient name must be between 1 and 80 characters"))]
    pub name: String,
    /// Colore usato dal frontend per disegnare il bicchiere
    #[validate(length(min = 1, max = 40, message = "Ingredient color must be between 1 and 40 characters"))]
    pub color: String,
    /// Qualsiasi numero positivo, restituito così come è stato inviato (1 resta 1, 1.5 resta 1.5)
    #[validate(custom(function = "validate_parts"))]
    pub parts: Number,
}

fn validate_parts(parts: &Number) -> Result<(), ValidationError> {
    match parts.as_f64() {
        Some(value) if value.is_finite() && value > 0.0 => Ok(()),
        _ => {
            let mut error = ValidationError::new("parts");
            error.message = Some("Ingredient parts must be a positive number".into());
            Err(error)
        }
    }
}

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    /// Salvata come testo JSON, sempre una lista di ingredienti
    pub recipe: Json<Vec<Ingredient>>,
}

impl Drink {
    pub fn ingredients(&self) -> &[Ingredient] {
        &self.recipe.0
    }
}
