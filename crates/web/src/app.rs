use std::any::Any;
use std::time::Duration;

use axum::{
    Router,
    response::{IntoResponse, Response},
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{self, CorsLayer},
    trace::TraceLayer,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::WebError;
use crate::features::athletes;
use crate::openapi;
use crate::state::AppState;

/// Builds the whole HTTP surface. `api_prefix` must already be normalized
/// (see [`crate::config::normalize_prefix`]): empty means the root.
pub fn build_router(state: AppState, api_prefix: &str) -> Router {
    let api = Router::new()
        .nest("/athletes", athletes::routes())
        .with_state(state);

    // axum refuses to nest at "/", so the root mount is a merge
    let api = if api_prefix.is_empty() {
        api
    } else {
        Router::new().nest(api_prefix, api)
    };

    let docs = SwaggerUi::new(format!("{api_prefix}/docs")).url(
        format!("{api_prefix}/api-docs/openapi.json"),
        openapi::document(api_prefix),
    );

    let cors = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any)
        .max_age(Duration::from_secs(3600));

    api.merge(docs)
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn route_not_found() -> Response {
    WebError::NotFound("Route").into_response()
}

/// Last-resort boundary: a panicking handler becomes a generic 500 instead
/// of a dropped connection.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    WebError::InternalServerError(format!("handler panicked: {detail}")).into_response()
}
