//! HTTP layer: a declarative route table over the user store.
//!
//! Handlers consume parsed requests and forward the store's results
//! verbatim; all error bodies are `{"message": ...}` JSON.

use crate::core::{StoreError, User, UserPayload};
use crate::store::UserStore;
use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::error;

/// The store behind one mutex: mutation and persistence happen under the
/// same guard, so interleaved requests cannot lose updates.
pub type SharedStore = Arc<Mutex<UserStore>>;

#[derive(Clone)]
struct AppState {
    store: SharedStore,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                message: self.message,
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::not_found("User Not Found"),
            StoreError::Validation(message) => Self::bad_request(message),
            StoreError::Parse(message) | StoreError::Io(message) => {
                error!(error = %message, "user store write failed");
                Self::internal("Failed to persist users")
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn build_router(store: SharedStore) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/health", get(health))
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    let store = state.store.lock().await;
    Json(store.list_all().to_vec())
}

async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::not_found("User Not Found"))?;
    let store = state.store.lock().await;
    let user = store.get(id)?.clone();
    Ok(Json(user))
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::bad_request("Invalid JSON"))?;
    let created = mutate(state.store, move |store| store.create(payload)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::not_found("User Not Found"))?;
    let Json(payload) = payload.map_err(|_| ApiError::bad_request("Invalid JSON"))?;
    let updated = mutate(state.store, move |store| store.update(id, payload)).await?;
    Ok(Json(updated))
}

async fn delete_user(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id.map_err(|_| ApiError::not_found("User Not Found"))?;
    mutate(state.store, move |store| store.delete(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Runs a mutating store operation on the blocking pool so the snapshot
/// write does not stall the runtime thread. The guard is taken inside the
/// closure, keeping mutation and persistence one critical section.
async fn mutate<T, F>(store: SharedStore, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&mut UserStore) -> crate::core::Result<T> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        let mut store = store.blocking_lock();
        op(&mut store)
    })
    .await
    .map_err(|err| {
        error!(error = %err, "store task failed");
        ApiError::internal("Failed to persist users")
    })?;
    Ok(result?)
}

async fn route_not_found(method: Method, uri: Uri) -> ApiError {
    ApiError::not_found(format!("Route not found for {} {}", method, uri.path()))
}

#[cfg(test)]
mod tests {
    use super::ApiError;
    use crate::core::StoreError;
    use axum::http::StatusCode;

    #[test]
    fn missing_record_maps_to_contractual_404_body() {
        let mapped = ApiError::from(StoreError::NotFound);
        assert_eq!(mapped.status, StatusCode::NOT_FOUND);
        assert_eq!(mapped.message, "User Not Found");
    }

    #[test]
    fn validation_error_maps_to_400_with_its_message() {
        let mapped = ApiError::from(StoreError::Validation(
            "Name is a required field".to_string(),
        ));
        assert_eq!(mapped.status, StatusCode::BAD_REQUEST);
        assert_eq!(mapped.message, "Name is a required field");
    }

    #[test]
    fn write_failure_maps_to_500() {
        let mapped = ApiError::from(StoreError::Io("disk full".to_string()));
        assert_eq!(mapped.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(mapped.message, "Failed to persist users");
    }
}
