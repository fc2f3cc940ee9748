//! Extractor che instradano i rifiuti di axum attraverso `AppError`, così
//! anche un body o un path invalidi ricevono l'envelope JSON.

use crate::core::AppError;
use axum_macros::{FromRequest, FromRequestParts};

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
