use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use crate::http::response::{body, created, ok, ApiResult};
use crate::http::AppState;
use crate::models::{RegistrationForm, User};

pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegistrationForm>, JsonRejection>,
) -> ApiResult<User> {
    let user = state.registration.register(body(payload)?).await?;
    created("User registered successfully", user)
}

pub async fn get_user(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<User> {
    let user = state.registration.get(&id).await?;
    ok("User found", user)
}
