//! Unauthenticated endpoints: health check, slideshow, site config, launchpad

use serde_json::{json, Value};
use std::collections::HashMap;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::auth::with_state;
use super::json_response;
use crate::app::AppState;
use crate::constants::MAX_PAGE_LIMIT;
use crate::error::LaunchpadError;
use crate::resources::projects::{ProjectStatus, Projects};
use crate::resources::slides::Slides;
use crate::resources::{ListParams, ResourceService};
use crate::storage::traits::Filter as DocumentFilter;

/// `GET|HEAD /`, 503 while the document store is unreachable
pub fn health_route(state: AppState) -> BoxedFilter<(Response,)> {
    warp::path::end()
        .and(warp::get().or(warp::head()).unify())
        .and(with_state(state))
        .then(|state: AppState| async move { health_reply(state.store.health_check().await) })
        .boxed()
}

fn health_reply(store_health: crate::error::Result<bool>) -> Response {
    match store_health {
        Ok(true) => json_response(&json!({ "status": "ok" }), StatusCode::OK),
        Ok(false) => json_response(
            &json!({ "status": "unavailable" }),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        Err(e) => {
            log::error!("Health check failed: {}", e);
            json_response(
                &json!({ "status": "unavailable" }),
                StatusCode::SERVICE_UNAVAILABLE,
            )
        }
    }
}

fn public_projects_filter() -> DocumentFilter {
    DocumentFilter::new().one_of("status", ProjectStatus::PUBLIC.iter().map(|s| s.as_str()))
}

pub fn public_routes(state: AppState) -> BoxedFilter<(Response,)> {
    let slideshow = warp::path!("slideshow")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(slideshow);

    let site_config = warp::path!("site-config")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(|state: AppState| async move {
            let config = state.site_config.get().await.map_err(warp::reject::custom)?;
            Ok::<_, Rejection>(json_response(&config, StatusCode::OK))
        });

    let projects = warp::path!("launchpad" / "projects")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state.clone()))
        .and_then(list_public_projects);

    let project = warp::path!("launchpad" / "projects" / String)
        .and(warp::get())
        .and(with_state(state))
        .and_then(get_public_project);

    slideshow
        .or(site_config)
        .unify()
        .or(projects)
        .unify()
        .or(project)
        .unify()
        .boxed()
}

/// Active slides in display order
async fn slideshow(state: AppState) -> Result<Response, Rejection> {
    let params = ListParams {
        page: 1,
        limit: MAX_PAGE_LIMIT,
    };
    let page = ResourceService::<Slides>::new(state.store.clone())
        .list_where(DocumentFilter::new().eq("active", true), &params)
        .await
        .map_err(warp::reject::custom)?;
    Ok(json_response(&page.items, StatusCode::OK))
}

async fn list_public_projects(
    query: HashMap<String, String>,
    state: AppState,
) -> Result<Response, Rejection> {
    let params = ListParams::from_query(&query).map_err(warp::reject::custom)?;
    let page = ResourceService::<Projects>::new(state.store.clone())
        .list_where(public_projects_filter(), &params)
        .await
        .map_err(warp::reject::custom)?;
    Ok(json_response(&page, StatusCode::OK))
}

/// Unlisted projects answer 404, the same as missing ones
async fn get_public_project(id: String, state: AppState) -> Result<Response, Rejection> {
    let not_found = || warp::reject::custom(LaunchpadError::NotFound("Project".to_string()));
    let project = ResourceService::<Projects>::new(state.store.clone())
        .get(&id)
        .await
        .map_err(warp::reject::custom)?;

    let public = project
        .get("status")
        .and_then(Value::as_str)
        .map_or(false, |status| {
            ProjectStatus::PUBLIC.iter().any(|s| s.as_str() == status)
        });
    if !public {
        return Err(not_found());
    }
    Ok(json_response(&project, StatusCode::OK))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_reply_follows_store() {
        assert_eq!(health_reply(Ok(true)).status(), StatusCode::OK);
        assert_eq!(health_reply(Ok(false)).status(), StatusCode::SERVICE_UNAVAILABLE);
        let failed = health_reply(Err(LaunchpadError::StorageError("timeout".to_string())));
        assert_eq!(failed.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
