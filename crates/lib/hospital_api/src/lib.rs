//! # hospital_api
//!
//! HTTP API library for the hospital administration backend.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, patch, post};
use hospital_core::auth::{AuthService, TokenIssuer};
use hospital_core::models::auth::Role;
use hospital_core::store::{CredentialStore, Store};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{ApiConfig, RecordAccessPolicy};
use crate::handlers::{auth, doctors, medications, patients, route_not_found, specialties};
use crate::middleware::auth::{RoleGate, require_auth, require_role};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    /// Record storage, shared with the auth service.
    pub store: Arc<dyn Store>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new<S: Store + 'static>(store: Arc<S>, config: ApiConfig) -> Self {
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let auth = AuthService::new(credentials, TokenIssuer::new(&config.jwt_secret));
        Self {
            auth,
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/api/auth/register", post(auth::register_handler))
        .route("/api/auth/login", post(auth::login_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(
            "/api/auth/profile",
            get(auth::profile_handler).put(auth::update_profile_handler),
        )
        .route("/api/auth/change-password", post(auth::change_password_handler))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let admin = Router::new()
        .route(
            "/api/auth/users/{id}/status",
            patch(auth::account_status_handler),
        )
        .route_layer(from_fn_with_state(
            RoleGate::new(state.clone(), [Role::Admin]),
            require_role,
        ))
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let records = guard_records(record_routes(), &state);

    Router::new()
        .merge(public)
        .merge(protected)
        .merge(admin)
        .merge(records)
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn record_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/doctores",
            get(doctors::list_doctors).post(doctors::create_doctor),
        )
        .route(
            "/api/doctores/{id}",
            get(doctors::get_doctor)
                .put(doctors::update_doctor)
                .delete(doctors::delete_doctor),
        )
        .route(
            "/api/especialidades",
            get(specialties::list_specialties).post(specialties::create_specialty),
        )
        .route(
            "/api/especialidades/{id}",
            get(specialties::get_specialty)
                .put(specialties::update_specialty)
                .delete(specialties::delete_specialty),
        )
        .route(
            "/api/medicamentos",
            get(medications::list_medications).post(medications::create_medication),
        )
        .route(
            "/api/medicamentos/{id}",
            get(medications::get_medication)
                .put(medications::update_medication)
                .delete(medications::delete_medication),
        )
        .route(
            "/api/pacientes",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/api/pacientes/{id}",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
}

/// Wrap the record routes according to the configured access policy.
/// Layers added last run first, so `require_auth` goes on after the gate.
fn guard_records(routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    match &state.config.records_access {
        RecordAccessPolicy::Public => routes,
        RecordAccessPolicy::Authenticated => {
            routes.route_layer(from_fn_with_state(state.clone(), require_auth))
        }
        RecordAccessPolicy::Roles(roles) => routes
            .route_layer(from_fn_with_state(
                RoleGate::new(state.clone(), roles.clone()),
                require_role,
            ))
            .route_layer(from_fn_with_state(state.clone(), require_auth)),
    }
}
