//! Generic CRUD endpoints for the marketplace collections

use serde_json::json;
use std::collections::HashMap;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::auth::{json_body, with_admin, with_role, with_state};
use super::json_response;
use crate::app::AppState;
use crate::auth::admin::AdminRole;
use crate::auth::token::Claims;
use crate::resources::site_config::SiteConfigUpdate;
use crate::resources::{Resource, ResourceService};

fn with_service<R: Resource>(
    service: ResourceService<R>,
) -> impl Filter<Extract = (ResourceService<R>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || service.clone())
}

/// `/admin/<R::PATH>` and `/admin/<R::PATH>/<id>`.
/// Reads and writes need any admin, deletes need a super admin.
pub fn resource_routes<R: Resource>(state: AppState) -> BoxedFilter<(Response,)> {
    let service = ResourceService::<R>::new(state.store.clone());
    let collection = warp::path("admin").and(warp::path(R::PATH));

    let list = collection
        .clone()
        .and(warp::path::end())
        .and(warp::get())
        .and(with_admin(state.clone()))
        .and(warp::query::<HashMap<String, String>>())
        .and(with_service(service.clone()))
        .and_then(list_resource::<R>);

    let create = collection
        .clone()
        .and(warp::path::end())
        .and(warp::post())
        .and(with_admin(state.clone()))
        .and(with_service(service.clone()))
        .and(json_body::<R::Create>())
        .and_then(create_resource::<R>);

    let item = collection.and(warp::path::param::<String>()).and(warp::path::end());

    let get = item
        .clone()
        .and(warp::get())
        .and(with_admin(state.clone()))
        .and(with_service(service.clone()))
        .and_then(get_resource::<R>);

    let update = item
        .clone()
        .and(warp::put())
        .and(with_admin(state.clone()))
        .and(with_service(service.clone()))
        .and(json_body::<R::Update>())
        .and_then(update_resource::<R>);

    let delete = item
        .and(warp::delete())
        .and(with_role(state, AdminRole::SuperAdmin))
        .and(with_service(service))
        .and_then(delete_resource::<R>);

    list.or(create)
        .unify()
        .or(get)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

async fn list_resource<R: Resource>(
    _claims: Claims,
    query: HashMap<String, String>,
    service: ResourceService<R>,
) -> Result<Response, Rejection> {
    let page = service.list(&query).await.map_err(warp::reject::custom)?;
    Ok(json_response(&page, StatusCode::OK))
}

async fn create_resource<R: Resource>(
    _claims: Claims,
    service: ResourceService<R>,
    payload: R::Create,
) -> Result<Response, Rejection> {
    let document = service.create(payload).await.map_err(warp::reject::custom)?;
    Ok(json_response(&document, StatusCode::CREATED))
}

async fn get_resource<R: Resource>(
    id: String,
    _claims: Claims,
    service: ResourceService<R>,
) -> Result<Response, Rejection> {
    let document = service.get(&id).await.map_err(warp::reject::custom)?;
    Ok(json_response(&document, StatusCode::OK))
}

async fn update_resource<R: Resource>(
    id: String,
    _claims: Claims,
    service: ResourceService<R>,
    payload: R::Update,
) -> Result<Response, Rejection> {
    service.update(&id, payload).await.map_err(warp::reject::custom)?;
    Ok(json_response(&json!({ "status": "updated" }), StatusCode::OK))
}

async fn delete_resource<R: Resource>(
    id: String,
    claims: Claims,
    service: ResourceService<R>,
) -> Result<Response, Rejection> {
    service.delete(&id).await.map_err(warp::reject::custom)?;
    log::info!("{} {} deleted by admin {}", R::NAME, id, claims.sub);
    Ok(json_response(&json!({ "status": "deleted" }), StatusCode::OK))
}

/// `GET` for any admin, `PUT` for super admins
pub fn site_config_routes(state: AppState) -> BoxedFilter<(Response,)> {
    let get = warp::path!("admin" / "site-config")
        .and(warp::get())
        .and(with_admin(state.clone()))
        .and(with_state(state.clone()))
        .and_then(|_claims: Claims, state: AppState| async move {
            let config = state.site_config.get().await.map_err(warp::reject::custom)?;
            Ok::<_, Rejection>(json_response(&config, StatusCode::OK))
        });

    let put = warp::path!("admin" / "site-config")
        .and(warp::put())
        .and(with_role(state.clone(), AdminRole::SuperAdmin))
        .and(with_state(state))
        .and(json_body::<SiteConfigUpdate>())
        .and_then(|_claims: Claims, state: AppState, update: SiteConfigUpdate| async move {
            let config = state.site_config.put(update).await.map_err(warp::reject::custom)?;
            Ok::<_, Rejection>(json_response(&config, StatusCode::OK))
        });

    get.or(put).unify().boxed()
}
