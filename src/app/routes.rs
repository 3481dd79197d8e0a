//! HTTP routes.
//!
//! - `POST   /countries/refresh` - Run one refresh cycle
//! - `GET    /countries`         - List countries (`region`, `currency`, `sort`)
//! - `GET    /countries/image`   - Latest summary image
//! - `GET    /countries/{name}`  - One country
//! - `DELETE /countries/{name}`  - Remove one country
//! - `GET    /status`            - Row count and last refresh time
//! - `GET    /ping`, `GET /health`

use crate::app::handlers::{
    delete_country_handler, get_country_handler, health_handler, image_handler,
    list_countries_handler, ping_handler, refresh_handler, status_handler,
};
use crate::app::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/countries/refresh", post(refresh_handler))
        .route("/countries", get(list_countries_handler))
        .route("/countries/image", get(image_handler))
        .route(
            "/countries/{name}",
            get(get_country_handler).delete(delete_country_handler),
        )
        .route("/status", get(status_handler))
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
