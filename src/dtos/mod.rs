//! DTOs module - Data Transfer Objects
//!
//! I DTOs separano la rappresentazione esterna (API) dalla rappresentazione interna (entities).

pub mod drink;

// Re-exports per facilitare l'import
pub use drink::{
    CreateDrinkDTO, CreateDrinkRequest, DeleteDrinkResponse, DrinksResponse, LongDrinkDTO,
    RecipeInput, ShortDrinkDTO, ShortIngredientDTO, UpdateDrinkDTO, UpdateDrinkRequest,
};
