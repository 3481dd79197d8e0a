// Application layer: the HTTP surface around the refresh pipeline and the store.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod query;
pub mod routes;
pub mod state;

pub use routes::app_router;
pub use state::AppState;
