pub mod auth;
pub mod projects;
pub mod reports;
pub mod vehicles;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        // Projects
        .route("/api/projects", get(projects::list))
        .route("/api/projects/{id}", get(projects::get))
        // Vehicles
        .route("/api/vehiculos", get(vehicles::list))
        .route("/api/vehiculos/{id}", get(vehicles::get))
        // Reports
        .route("/api/reports/access", get(reports::access))
        .route("/api/reports/coleccion", post(reports::collection))
}
