//! Admin authentication and admin-management endpoints

use serde_json::json;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection};

use super::auth::{json_body, with_admin, with_role, with_state};
use super::json_response;
use crate::app::AppState;
use crate::auth::admin::{
    AdminLogin, AdminRole, AdminUserCreate, AdminUserUpdate, PasswordChange, SeedOutcome,
};
use crate::auth::token::Claims;
use crate::resources::stats::collect_stats;

pub fn admin_routes(state: AppState) -> BoxedFilter<(Response,)> {
    let login = warp::path!("admin" / "login")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and(json_body::<AdminLogin>())
        .and_then(login);

    let seed = warp::path!("admin" / "seed-super-admin")
        .and(warp::post())
        .and(with_state(state.clone()))
        .and_then(seed_super_admin);

    let me = warp::path!("admin" / "me")
        .and(warp::get())
        .and(with_admin(state.clone()))
        .and(with_state(state.clone()))
        .and_then(me);

    let logout = warp::path!("admin" / "logout")
        .and(warp::post())
        .and(with_admin(state.clone()))
        .and(with_state(state.clone()))
        .and_then(logout);

    let change_password = warp::path!("admin" / "change-password")
        .and(warp::post())
        .and(with_admin(state.clone()))
        .and(with_state(state.clone()))
        .and(json_body::<PasswordChange>())
        .and_then(change_password);

    let stats = warp::path!("admin" / "stats")
        .and(warp::get())
        .and(with_admin(state.clone()))
        .and(with_state(state.clone()))
        .and_then(stats);

    let list_admins = warp::path!("admin" / "admins")
        .and(warp::get())
        .and(with_role(state.clone(), AdminRole::SuperAdmin))
        .and(with_state(state.clone()))
        .and_then(list_admins);

    let create_admin = warp::path!("admin" / "admins")
        .and(warp::post())
        .and(with_role(state.clone(), AdminRole::SuperAdmin))
        .and(with_state(state.clone()))
        .and(json_body::<AdminUserCreate>())
        .and_then(create_admin);

    let update_admin = warp::path!("admin" / "admins" / String)
        .and(warp::put())
        .and(with_role(state.clone(), AdminRole::SuperAdmin))
        .and(with_state(state.clone()))
        .and(json_body::<AdminUserUpdate>())
        .and_then(update_admin);

    let delete_admin = warp::path!("admin" / "admins" / String)
        .and(warp::delete())
        .and(with_role(state.clone(), AdminRole::SuperAdmin))
        .and(with_state(state))
        .and_then(delete_admin);

    login
        .or(seed)
        .unify()
        .or(me)
        .unify()
        .or(logout)
        .unify()
        .or(change_password)
        .unify()
        .or(stats)
        .unify()
        .or(list_admins)
        .unify()
        .or(create_admin)
        .unify()
        .or(update_admin)
        .unify()
        .or(delete_admin)
        .unify()
        .boxed()
}

async fn login(state: AppState, credentials: AdminLogin) -> Result<Response, Rejection> {
    let response = state
        .auth
        .login(&credentials)
        .await
        .map_err(warp::reject::custom)?;
    Ok(json_response(&response, StatusCode::OK))
}

async fn seed_super_admin(state: AppState) -> Result<Response, Rejection> {
    let body = match state.auth.seed().await.map_err(warp::reject::custom)? {
        SeedOutcome::Created { email, password } => json!({
            "message": "Super admin created",
            "email": email,
            "password": password,
        }),
        SeedOutcome::AlreadyExists => json!({ "message": "Super admin already exists" }),
        SeedOutcome::EmailTaken => {
            json!({ "message": "Seed email already belongs to an existing admin" })
        }
    };
    Ok(json_response(&body, StatusCode::OK))
}

async fn me(claims: Claims, state: AppState) -> Result<Response, Rejection> {
    let admin = state.auth.me(&claims).await.map_err(warp::reject::custom)?;
    Ok(json_response(&admin, StatusCode::OK))
}

async fn logout(claims: Claims, state: AppState) -> Result<Response, Rejection> {
    state.auth.logout(&claims).await.map_err(warp::reject::custom)?;
    Ok(json_response(&json!({ "message": "Logged out" }), StatusCode::OK))
}

async fn change_password(
    claims: Claims,
    state: AppState,
    change: PasswordChange,
) -> Result<Response, Rejection> {
    state
        .auth
        .change_password(&claims, &change)
        .await
        .map_err(warp::reject::custom)?;
    Ok(json_response(&json!({ "message": "Password updated" }), StatusCode::OK))
}

async fn stats(_claims: Claims, state: AppState) -> Result<Response, Rejection> {
    let stats = collect_stats(&state.store).await.map_err(warp::reject::custom)?;
    Ok(json_response(&stats, StatusCode::OK))
}

async fn list_admins(_claims: Claims, state: AppState) -> Result<Response, Rejection> {
    let admins = state.auth.list_admins().await.map_err(warp::reject::custom)?;
    Ok(json_response(&admins, StatusCode::OK))
}

async fn create_admin(
    _claims: Claims,
    state: AppState,
    request: AdminUserCreate,
) -> Result<Response, Rejection> {
    let admin = state
        .auth
        .create_admin(request)
        .await
        .map_err(warp::reject::custom)?;
    Ok(json_response(&admin, StatusCode::CREATED))
}

async fn update_admin(
    id: String,
    claims: Claims,
    state: AppState,
    update: AdminUserUpdate,
) -> Result<Response, Rejection> {
    let admin = state
        .auth
        .update_admin(&claims, &id, update)
        .await
        .map_err(warp::reject::custom)?;
    Ok(json_response(&admin, StatusCode::OK))
}

async fn delete_admin(id: String, claims: Claims, state: AppState) -> Result<Response, Rejection> {
    state
        .auth
        .delete_admin(&claims, &id)
        .await
        .map_err(warp::reject::custom)?;
    Ok(json_response(&json!({ "status": "deleted" }), StatusCode::OK))
}
