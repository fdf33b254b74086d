//! HTTP-level tests against the full route tree on the in-memory store

use launchpad_admin::app::AppState;
use launchpad_admin::auth::admin::{AdminRole, AdminUserCreate};
use launchpad_admin::constants::{DEFAULT_SUPER_ADMIN_EMAIL, DEFAULT_SUPER_ADMIN_PASSWORD};
use launchpad_admin::handlers::routes;
use serde_json::{json, Value};
use warp::http::StatusCode;
use warp::test::request;
use warp::{Filter, Reply};

struct ApiReply {
    status: StatusCode,
    headers: warp::http::HeaderMap,
    body: Value,
}

async fn call<F>(
    routes: &F,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> ApiReply
where
    F: Filter + 'static,
    F::Extract: Reply + Send,
{
    let mut builder = request().method(method).path(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    if let Some(body) = body {
        builder = builder.json(&body);
    }
    let response = builder.reply(routes).await;
    ApiReply {
        status: response.status(),
        headers: response.headers().clone(),
        body: serde_json::from_slice(response.body()).unwrap_or(Value::Null),
    }
}

/// Seed, log in as the super admin, and return its token
async fn super_admin_token<F>(routes: &F) -> String
where
    F: Filter + 'static,
    F::Extract: Reply + Send,
{
    call(routes, "POST", "/api/admin/seed-super-admin", None, None).await;
    let login = call(
        routes,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({
            "email": DEFAULT_SUPER_ADMIN_EMAIL,
            "password": DEFAULT_SUPER_ADMIN_PASSWORD
        })),
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    login.body["token"].as_str().unwrap().to_string()
}

fn admin_token(state: &AppState) -> String {
    state
        .auth
        .tokens()
        .issue("plain-admin", "editor@example.com", AdminRole::Admin)
        .unwrap()
}

fn project_payload() -> Value {
    json!({
        "project_name": "Open Protein Atlas",
        "token_symbol": "OPA",
        "description": "Open data for protein folding",
        "project_type": "research",
        "soft_cap": 1000.0,
        "hard_cap": 5000.0,
        "min_contribution": 10.0,
        "max_contribution": 500.0,
        "price_per_token": 0.5,
        "team_name": "Atlas Lab",
        "contact_email": "team@atlas.example",
        "owner_user_id": "user-1"
    })
}

#[tokio::test]
async fn test_seed_login_me_end_to_end() {
    let routes = routes(AppState::for_testing().unwrap());

    let seed = call(&routes, "POST", "/api/admin/seed-super-admin", None, None).await;
    assert_eq!(seed.status, StatusCode::OK);
    assert_eq!(seed.body["email"], DEFAULT_SUPER_ADMIN_EMAIL);
    assert_eq!(seed.body["password"], DEFAULT_SUPER_ADMIN_PASSWORD);

    let again = call(&routes, "POST", "/api/admin/seed-super-admin", None, None).await;
    assert_eq!(again.status, StatusCode::OK);
    assert!(again.body.get("password").is_none());

    let token = super_admin_token(&routes).await;
    let me = call(&routes, "GET", "/api/admin/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["email"], DEFAULT_SUPER_ADMIN_EMAIL);
    assert_eq!(me.body["role"], "super_admin");
    assert_eq!(me.body["status"], "active");
    assert!(me.body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_seed_with_taken_email_answers_ok() {
    let state = AppState::for_testing().unwrap();
    state
        .auth
        .create_admin(AdminUserCreate {
            email: DEFAULT_SUPER_ADMIN_EMAIL.to_string(),
            name: None,
            password: "editor-pass-1".to_string(),
            role: AdminRole::Admin,
        })
        .await
        .unwrap();
    let routes = routes(state);

    let seed = call(&routes, "POST", "/api/admin/seed-super-admin", None, None).await;
    assert_eq!(seed.status, StatusCode::OK);
    assert!(seed.body["message"].is_string());
    assert!(seed.body.get("password").is_none());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let routes = routes(AppState::for_testing().unwrap());
    call(&routes, "POST", "/api/admin/seed-super-admin", None, None).await;

    let wrong_password = call(
        &routes,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({"email": DEFAULT_SUPER_ADMIN_EMAIL, "password": "wrong-password"})),
    )
    .await;
    let unknown_email = call(
        &routes,
        "POST",
        "/api/admin/login",
        None,
        Some(json!({"email": "ghost@example.com", "password": "wrong-password"})),
    )
    .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.body["detail"], "Invalid credentials");
}

#[tokio::test]
async fn test_authentication_required() {
    let routes = routes(AppState::for_testing().unwrap());

    let missing = call(&routes, "GET", "/api/admin/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);
    assert_eq!(missing.headers["www-authenticate"], "Bearer");

    let garbage = call(&routes, "GET", "/api/admin/projects", Some("garbage"), None).await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert!(garbage.body["detail"].is_string());
}

#[tokio::test]
async fn test_non_ascii_credential_is_unauthenticated() {
    let routes = routes(AppState::for_testing().unwrap());
    let value = warp::http::HeaderValue::from_bytes(b"Bearer \xffgarbage").unwrap();

    let response = request()
        .method("GET")
        .path("/api/admin/me")
        .header("authorization", value)
        .reply(&routes)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["www-authenticate"], "Bearer");
    let body: Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["detail"], "Invalid token");
}

#[tokio::test]
async fn test_super_admin_gate() {
    let state = AppState::for_testing().unwrap();
    let routes = routes(state.clone());
    let root = super_admin_token(&routes).await;
    let admin = admin_token(&state);

    let denied = call(&routes, "GET", "/api/admin/admins", Some(&admin), None).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.body["detail"], "Super admin access required");

    let allowed = call(&routes, "GET", "/api/admin/admins", Some(&root), None).await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.body.as_array().unwrap().len(), 1);

    let created = call(
        &routes,
        "POST",
        "/api/admin/admins",
        Some(&root),
        Some(json!({"email": "editor@example.com", "password": "editor-pass-1"})),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["role"], "admin");
    assert!(created.body.get("password_hash").is_none());

    let duplicate = call(
        &routes,
        "POST",
        "/api/admin/admins",
        Some(&root),
        Some(json!({"email": "editor@example.com", "password": "editor-pass-1"})),
    )
    .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let routes = routes(AppState::for_testing().unwrap());
    let token = super_admin_token(&routes).await;

    let logout = call(&routes, "POST", "/api/admin/logout", Some(&token), None).await;
    assert_eq!(logout.status, StatusCode::OK);

    let me = call(&routes, "GET", "/api/admin/me", Some(&token), None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_project_crud_and_public_listing() {
    let state = AppState::for_testing().unwrap();
    let routes = routes(state.clone());
    let root = super_admin_token(&routes).await;
    let admin = admin_token(&state);

    let created = call(
        &routes,
        "POST",
        "/api/admin/projects",
        Some(&admin),
        Some(project_payload()),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "pending");
    let id = created.body["id"].as_str().unwrap().to_string();

    let listed = call(&routes, "GET", "/api/admin/projects?status=pending", Some(&admin), None).await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["total"], 1);
    assert_eq!(listed.body["page"], 1);
    assert_eq!(listed.body["pages"], 1);

    // Pending projects are not public yet
    let public = call(&routes, "GET", "/api/launchpad/projects", None, None).await;
    assert_eq!(public.body["total"], 0);
    let hidden = call(&routes, "GET", &format!("/api/launchpad/projects/{}", id), None, None).await;
    assert_eq!(hidden.status, StatusCode::NOT_FOUND);

    let approved = call(
        &routes,
        "PUT",
        &format!("/api/admin/projects/{}", id),
        Some(&admin),
        Some(json!({"status": "approved", "featured": true})),
    )
    .await;
    assert_eq!(approved.status, StatusCode::OK);
    assert_eq!(approved.body["status"], "updated");

    let public = call(&routes, "GET", "/api/launchpad/projects", None, None).await;
    assert_eq!(public.body["total"], 1);
    let shown = call(&routes, "GET", &format!("/api/launchpad/projects/{}", id), None, None).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["featured"], true);

    let bad_caps = call(
        &routes,
        "PUT",
        &format!("/api/admin/projects/{}", id),
        Some(&admin),
        Some(json!({"soft_cap": 9000.0})),
    )
    .await;
    assert_eq!(bad_caps.status, StatusCode::UNPROCESSABLE_ENTITY);

    let forbidden = call(
        &routes,
        "DELETE",
        &format!("/api/admin/projects/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let deleted = call(
        &routes,
        "DELETE",
        &format!("/api/admin/projects/{}", id),
        Some(&root),
        None,
    )
    .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["status"], "deleted");

    let gone = call(&routes, "GET", &format!("/api/admin/projects/{}", id), Some(&admin), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.body["detail"], "Project not found");
}

#[tokio::test]
async fn test_validation_errors() {
    let state = AppState::for_testing().unwrap();
    let routes = routes(state.clone());
    let admin = admin_token(&state);

    let relative_image = call(
        &routes,
        "POST",
        "/api/admin/slides",
        Some(&admin),
        Some(json!({"title": "Hero", "image_url": "/hero.png"})),
    )
    .await;
    assert_eq!(relative_image.status, StatusCode::UNPROCESSABLE_ENTITY);

    let short_username = call(
        &routes,
        "POST",
        "/api/admin/users",
        Some(&admin),
        Some(json!({"email": "a@example.com", "username": "al"})),
    )
    .await;
    assert_eq!(short_username.status, StatusCode::UNPROCESSABLE_ENTITY);

    let unknown_role = call(
        &routes,
        "POST",
        "/api/admin/users",
        Some(&admin),
        Some(json!({"email": "a@example.com", "username": "alice", "role": "overlord"})),
    )
    .await;
    assert_eq!(unknown_role.status, StatusCode::UNPROCESSABLE_ENTITY);

    let bad_page = call(&routes, "GET", "/api/admin/users?page=0", Some(&admin), None).await;
    assert_eq!(bad_page.status, StatusCode::UNPROCESSABLE_ENTITY);

    let malformed = request()
        .method("POST")
        .path("/api/admin/login")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&routes)
        .await;
    assert_eq!(malformed.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_slideshow_shows_active_slides_in_order() {
    let state = AppState::for_testing().unwrap();
    let routes = routes(state.clone());
    let admin = admin_token(&state);

    for (title, order, active) in [("Second", 2, true), ("Hidden", 0, false), ("First", 1, true)] {
        let created = call(
            &routes,
            "POST",
            "/api/admin/slides",
            Some(&admin),
            Some(json!({
                "title": title,
                "image_url": "https://cdn.example.com/slide.png",
                "order": order,
                "active": active
            })),
        )
        .await;
        assert_eq!(created.status, StatusCode::CREATED);
    }

    let slides = call(&routes, "GET", "/api/slideshow", None, None).await;
    let titles: Vec<&str> = slides
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|slide| slide["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);
}

#[tokio::test]
async fn test_site_config() {
    let state = AppState::for_testing().unwrap();
    let routes = routes(state.clone());
    let root = super_admin_token(&routes).await;
    let admin = admin_token(&state);

    let defaults = call(&routes, "GET", "/api/site-config", None, None).await;
    assert_eq!(defaults.status, StatusCode::OK);
    assert_eq!(defaults.body["maintenance_mode"], false);

    let update = json!({"site_name": "DeSci Launch", "maintenance_mode": true});
    let denied = call(&routes, "PUT", "/api/admin/site-config", Some(&admin), Some(update.clone())).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    let saved = call(&routes, "PUT", "/api/admin/site-config", Some(&root), Some(update)).await;
    assert_eq!(saved.status, StatusCode::OK);

    let admin_view = call(&routes, "GET", "/api/admin/site-config", Some(&admin), None).await;
    assert_eq!(admin_view.body["site_name"], "DeSci Launch");
    let public = call(&routes, "GET", "/api/site-config", None, None).await;
    assert_eq!(public.body["maintenance_mode"], true);
}

#[tokio::test]
async fn test_stats() {
    let state = AppState::for_testing().unwrap();
    let routes = routes(state.clone());
    let admin = admin_token(&state);

    call(&routes, "POST", "/api/admin/projects", Some(&admin), Some(project_payload())).await;

    let stats = call(&routes, "GET", "/api/admin/stats", Some(&admin), None).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.body["total_projects"], 1);
    assert_eq!(stats.body["projects_by_status"]["pending"], 1);
    assert_eq!(stats.body["total_orders"], 0);
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let routes = routes(AppState::for_testing().unwrap());

    let health = call(&routes, "GET", "/", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body, json!({"status": "ok"}));
    assert_eq!(health.headers["x-content-type-options"], "nosniff");

    let head = request().method("HEAD").path("/").reply(&routes).await;
    assert_eq!(head.status(), StatusCode::OK);

    let missing = call(&routes, "GET", "/api/nothing-here", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["detail"], "Not found");
}
