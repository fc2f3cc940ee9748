//! Drink DTOs - proiezioni esposte al client e body delle richieste

use crate::core::AppError;
use crate::entities::{Drink, Ingredient};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::warn;
use validator::{Validate, ValidationError};

/// Ingrediente senza nome, per chi non ha accesso alle ricette complete
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ShortIngredientDTO {
    pub color: String,
    pub parts: Number,
}

impl From<&Ingredient> for ShortIngredientDTO {
    fn from(value: &Ingredient) -> Self {
        Self {
            color: value.color.clone(),
            parts: value.parts.clone(),
        }
    }
}

/// Proiezione "short": nessun nome degli ingredienti
#[derive(Serialize, Deserialize, Debug)]
pub struct ShortDrinkDTO {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortIngredientDTO>,
}

impl From<Drink> for ShortDrinkDTO {
    fn from(value: Drink) -> Self {
        let recipe = value.ingredients().iter().map(ShortIngredientDTO::from).collect();
        Self {
            id: value.id,
            title: value.title,
            recipe,
        }
    }
}

/// Proiezione "long": ricetta completa
#[derive(Serialize, Deserialize, Debug)]
pub struct LongDrinkDTO {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl From<Drink> for LongDrinkDTO {
    fn from(value: Drink) -> Self {
        Self {
            id: value.id,
            title: value.title,
            recipe: value.recipe.0,
        }
    }
}

/// Una ricetta può arrivare come lista di ingredienti o come singolo
/// ingrediente; in entrambi i casi viene salvata come lista piatta.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl RecipeInput {
    pub fn into_ingredients(self) -> Vec<Ingredient> {
        match self {
            RecipeInput::Many(ingredients) => ingredients,
            RecipeInput::One(ingredient) => vec![ingredient],
        }
    }
}

fn validate_recipe(recipe: &[Ingredient]) -> Result<(), ValidationError> {
    if recipe.iter().all(|ingredient| ingredient.validate().is_ok()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_ingredient");
        error.message = Some("Every ingredient needs a name, a color and positive parts".into());
        Err(error)
    }
}

/// Body di POST /drinks, i campi mancanti sono controllati a mano per
/// rispondere 422
#[derive(Deserialize, Debug)]
pub struct CreateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

impl CreateDrinkRequest {
    pub fn into_dto(self) -> Result<CreateDrinkDTO, AppError> {
        let (Some(title), Some(recipe)) = (self.title, self.recipe) else {
            warn!("Drink creation attempted without title or recipe");
            return Err(AppError::unprocessable().with_details("title and recipe are required"));
        };
        let dto = CreateDrinkDTO {
            title,
            recipe: recipe.into_ingredients(),
        };
        dto.validate()?;
        Ok(dto)
    }
}

/// DTO per creare un nuovo drink (senza id)
#[derive(Validate, Debug, Clone)]
pub struct CreateDrinkDTO {
    #[validate(length(min = 1, max = 80, message = "Title must be between 1 and 80 characters"))]
    pub title: String,
    #[validate(custom(function = "validate_recipe"))]
    pub recipe: Vec<Ingredient>,
}

/// Body di PATCH /drinks/{id}
#[derive(Deserialize, Debug)]
pub struct UpdateDrinkRequest {
    pub title: Option<String>,
    pub recipe: Option<RecipeInput>,
}

impl UpdateDrinkRequest {
    pub fn into_dto(self) -> Result<UpdateDrinkDTO, AppError> {
        if self.title.is_none() && self.recipe.is_none() {
            warn!("Drink update attempted without any field");
            return Err(AppError::unprocessable().with_details("title or recipe is required"));
        }
        let dto = UpdateDrinkDTO {
            title: self.title,
            recipe: self.recipe.map(RecipeInput::into_ingredients),
        };
        dto.validate()?;
        Ok(dto)
    }
}

/// DTO per aggiornare un drink (solo i campi `Some(_)` vengono modificati)
#[derive(Validate, Debug, Clone)]
pub struct UpdateDrinkDTO {
    #[validate(length(min = 1, max = 80, message = "Title must be between 1 and 80 characters"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_recipe"))]
    pub recipe: Option<Vec<Ingredient>>,
}

/// Envelope di successo `{success, drinks}`
#[derive(Serialize, Debug)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

/// Envelope di DELETE `{success, delete}`
#[derive(Serialize, Debug)]
pub struct DeleteDrinkResponse {
    pub success: bool,
    pub delete: i64,
}
