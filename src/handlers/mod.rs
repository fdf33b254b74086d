//! HTTP handlers and the full route tree

pub mod admin;
pub mod auth;
pub mod public;
pub mod rejection;
pub mod resources;

use serde::Serialize;
use std::convert::Infallible;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Reply};

use crate::app::AppState;
use crate::constants::API_PREFIX;
use crate::resources::categories::Categories;
use crate::resources::orders::Orders;
use crate::resources::products::Products;
use crate::resources::projects::Projects;
use crate::resources::slides::Slides;
use crate::resources::transactions::Transactions;
use crate::resources::users::Users;
use crate::security::with_api_security_headers;

pub use rejection::handle_rejection;

/// Serialize `value` as a JSON response with `status`
pub fn json_response<T: Serialize>(value: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(value), status).into_response()
}

/// Browser origins allowed to call the API with credentials
pub fn cors(allowed_origins: &[String]) -> warp::cors::Builder {
    warp::cors()
        .allow_origins(allowed_origins.iter().map(String::as_str))
        .allow_methods(vec!["GET", "HEAD", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_headers(vec!["authorization", "content-type"])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Every route: health check plus `/api/...`, with CORS, rejection recovery
/// and security headers applied
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let api = admin::admin_routes(state.clone())
        .or(resources::site_config_routes(state.clone()))
        .unify()
        .or(resources::resource_routes::<Users>(state.clone()))
        .unify()
        .or(resources::resource_routes::<Projects>(state.clone()))
        .unify()
        .or(resources::resource_routes::<Products>(state.clone()))
        .unify()
        .or(resources::resource_routes::<Orders>(state.clone()))
        .unify()
        .or(resources::resource_routes::<Transactions>(state.clone()))
        .unify()
        .or(resources::resource_routes::<Categories>(state.clone()))
        .unify()
        .or(resources::resource_routes::<Slides>(state.clone()))
        .unify()
        .or(public::public_routes(state.clone()))
        .unify();

    let cors = cors(&state.config.allowed_origins);

    public::health_route(state.clone())
        .or(warp::path(API_PREFIX).and(api))
        .unify()
        .with(cors)
        .recover(handle_rejection)
        .with(with_api_security_headers())
        .with(warp::log("launchpad_admin::api"))
}
