//! Drink services - handler HTTP del catalogo
//!
//! Gli handler controllano solo la presenza dei campi e delegano al
//! repository: gli errori del database salgono con `?` fino ad `AppError`.

use crate::core::{AppError, AppJson, AppPath, AppState, AuthClaims};
use crate::dtos::{
    CreateDrinkRequest, DeleteDrinkResponse, DrinksResponse, LongDrinkDTO, ShortDrinkDTO,
    UpdateDrinkRequest,
};
use crate::repositories::{Create, Delete, Read, ReadAll, Update};
use axum::{
    Extension,
    extract::{Json, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(state))]
pub async fn list_drinks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DrinksResponse<ShortDrinkDTO>>, AppError> {
    debug!("Listing drinks with short recipes");
    let drinks = state.drinks.read_all().await?;
    info!("Retrieved {} drinks", drinks.len());
    Ok(Json(DrinksResponse::new(
        drinks.into_iter().map(ShortDrinkDTO::from).collect(),
    )))
}

#[instrument(skip(state, claims), fields(sub = ?claims.sub))]
pub async fn list_drinks_detail(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<DrinksResponse<LongDrinkDTO>>, AppError> {
    debug!("Listing drinks with full recipes");
    let drinks = state.drinks.read_all().await?;
    info!("Retrieved {} detailed drinks", drinks.len());
    Ok(Json(DrinksResponse::new(
        drinks.into_iter().map(LongDrinkDTO::from).collect(),
    )))
}

#[instrument(skip(state, claims, body), fields(sub = ?claims.sub))]
pub async fn create_drink(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    AppJson(body): AppJson<CreateDrinkRequest>,
) -> Result<Json<DrinksResponse<LongDrinkDTO>>, AppError> {
    debug!("Creating new drink");
    let new_drink = body.into_dto()?;
    let drink = state.drinks.create(&new_drink).await?;
    info!("Drink {} created with title {:?}", drink.id, drink.title);
    Ok(Json(DrinksResponse::new(vec![LongDrinkDTO::from(drink)])))
}

#[instrument(skip(state, claims, body), fields(sub = ?claims.sub))]
pub async fn update_drink(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    AppPath(drink_id): AppPath<i64>,
    body: Result<AppJson<UpdateDrinkRequest>, AppError>,
) -> Result<Json<DrinksResponse<LongDrinkDTO>>, AppError> {
    debug!("Updating drink");
    // un id inesistente è 404 qualunque sia il body
    if state.drinks.read(&drink_id).await?.is_none() {
        warn!("Drink not found");
        return Err(AppError::not_found());
    }

    let AppJson(body) = body?;
    let changes = body.into_dto()?;
    let drink = state.drinks.update(&drink_id, &changes).await?;
    info!("Drink updated");
    Ok(Json(DrinksResponse::new(vec![LongDrinkDTO::from(drink)])))
}

#[instrument(skip(state, claims), fields(sub = ?claims.sub))]
pub async fn delete_drink(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<AuthClaims>,
    AppPath(drink_id): AppPath<i64>,
) -> Result<Json<DeleteDrinkResponse>, AppError> {
    debug!("Deleting drink");
    state.drinks.delete(&drink_id).await?;
    info!("Drink deleted");
    Ok(Json(DeleteDrinkResponse {
        success: true,
        delete: drink_id,
    }))
}
