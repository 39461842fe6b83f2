//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::jwt::JwtConfig;
use crate::auth::middleware::{auth_middleware, AuthState};
use crate::domain::RepositoryProvider;

use super::modules::request_id::request_id_middleware;
use super::modules::{auth, bands, health};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Bands
        bands::create_band,
        bands::get_band,
        bands::update_band,
        bands::list_members,
        bands::add_member,
    ),
    components(schemas(
        auth::RegisterRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        auth::UserProfile,
        bands::CreateBandRequest,
        bands::UpdateBandRequest,
        bands::AddMemberRequest,
        bands::BandDto,
        bands::BandDetail,
        bands::MemberDto,
        crate::domain::BandRole,
        health::HealthResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Authentication", description = "Register, login, current user"),
        (name = "Bands", description = "Bands and membership")
    )
)]
struct ApiDoc;

/// Build the complete API router.
pub fn create_api_router(
    repos: Arc<dyn RepositoryProvider>,
    db: DatabaseConnection,
    jwt_config: JwtConfig,
) -> Router {
    let auth_state = AuthState {
        repos: repos.clone(),
        jwt_config: jwt_config.clone(),
    };

    let auth_handler_state = auth::AuthHandlerState {
        repos: repos.clone(),
        jwt_config,
    };

    let band_state = bands::BandHandlerState {
        repos,
        auth: auth_state.clone(),
    };

    let health_state = health::HealthState {
        db,
        started_at: Arc::new(Instant::now()),
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .with_state(auth_handler_state);

    // Auth routes (protected)
    let auth_protected_routes = Router::new()
        .route("/me", get(auth::me))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ));

    // Band routes (protected; per-band routes also run the guards)
    let band_routes = Router::new()
        .route("/", post(bands::create_band))
        .route(
            "/{band_id}",
            get(bands::get_band).put(bands::update_band),
        )
        .route(
            "/{band_id}/members",
            get(bands::list_members).post(bands::add_member),
        )
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(band_state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // Build router
    Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api/auth", auth_routes)
        .nest("/api/auth", auth_protected_routes)
        .nest("/api/bands", band_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use sea_orm::{Database, DatabaseConnection, EntityTrait};
    use sea_orm_migration::MigratorTrait;
    use serde_json::{json, Value};
    use tower::Service;

    use crate::auth::jwt::{issue_token, JwtConfig};
    use crate::domain::RepositoryProvider;
    use crate::infrastructure::database::entities::user;
    use crate::infrastructure::database::migrator::Migrator;
    use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;

    use super::create_api_router;

    fn test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "router-test-secret".to_string(),
            expiration_hours: 1,
            issuer: "backstage".to_string(),
        }
    }

    async fn test_app() -> (Router, DatabaseConnection) {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let app = create_api_router(repos, db.clone(), test_jwt_config());
        (app, db)
    }

    async fn send(app: &Router, req: Request<Body>) -> Response {
        let mut svc = app.clone().into_service();
        svc.call(req).await.unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn body_bytes(resp: Response) -> Vec<u8> {
        axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn body_json(resp: Response) -> Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    fn register_body(email: &str) -> Value {
        json!({
            "email": email,
            "password": "pw123456",
            "first_name": "Jane",
            "last_name": "Doe",
            "phone": "+1-555-0100"
        })
    }

    /// Register a user and return (token, user id).
    async fn register_user(app: &Router, email: &str) -> (String, String) {
        let resp = send(
            app,
            json_request("POST", "/api/auth/register", None, Some(register_body(email))),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        let token = body["data"]["token"].as_str().unwrap().to_string();
        let user_id = body["data"]["user"]["id"].as_str().unwrap().to_string();
        (token, user_id)
    }

    async fn create_band(app: &Router, token: &str, name: &str) -> String {
        let resp = send(
            app,
            json_request(
                "POST",
                "/api/bands",
                Some(token),
                Some(json!({"name": name})),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = body_json(resp).await;
        body["data"]["id"].as_str().unwrap().to_string()
    }

    // ── Health ─────────────────────────────────────────────────

    #[tokio::test]
    async fn health_reports_ok() {
        let (app, _db) = test_app().await;
        let resp = send(&app, json_request("GET", "/health", None, None)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "ok");
    }

    // ── Registration ───────────────────────────────────────────

    #[tokio::test]
    async fn register_returns_token_and_stripped_user() {
        let (app, _db) = test_app().await;
        let resp = send(
            &app,
            json_request(
                "POST",
                "/api/auth/register",
                None,
                Some(register_body("jane@example.com")),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let raw = body_bytes(resp).await;
        let text = String::from_utf8(raw.clone()).unwrap();
        assert!(!text.contains("password"));

        let body: Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert!(!body["data"]["token"].as_str().unwrap().is_empty());
        assert_eq!(body["data"]["user"]["email"], "jane@example.com");
        assert_eq!(body["data"]["user"]["first_name"], "Jane");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_without_side_effect() {
        let (app, _db) = test_app().await;
        register_user(&app, "jane@example.com").await;

        let resp = send(
            &app,
            json_request(
                "POST",
                "/api/auth/register",
                None,
                Some(register_body("jane@example.com")),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Email already in use");
    }

    #[tokio::test]
    async fn register_rejects_malformed_payloads() {
        let (app, _db) = test_app().await;

        let resp = send(
            &app,
            json_request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "not-an-email",
                    "password": "pw123456",
                    "first_name": "Jane",
                    "last_name": "Doe"
                })),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = send(
            &app,
            json_request(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": "jane@example.com",
                    "password": "tiny",
                    "first_name": "Jane",
                    "last_name": "Doe"
                })),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    // ── Login ──────────────────────────────────────────────────

    #[tokio::test]
    async fn register_then_login_resolve_to_the_same_user() {
        let (app, _db) = test_app().await;
        let (register_token, user_id) = register_user(&app, "jane@example.com").await;

        let resp = send(
            &app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "jane@example.com", "password": "pw123456"})),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let login_token = body["data"]["token"].as_str().unwrap().to_string();

        // Two separate issuances, one identity
        assert_ne!(register_token, login_token);

        for token in [&register_token, &login_token] {
            let resp = send(&app, json_request("GET", "/api/auth/me", Some(token), None)).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body = body_json(resp).await;
            assert_eq!(body["data"]["id"], user_id.as_str());
        }
    }

    #[tokio::test]
    async fn login_failures_are_byte_identical() {
        let (app, _db) = test_app().await;
        register_user(&app, "jane@example.com").await;

        // Unknown email
        let missing = send(
            &app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "nobody@example.com", "password": "pw123456"})),
            ),
        )
        .await;
        // Known email, wrong password
        let wrong = send(
            &app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "jane@example.com", "password": "pw999999"})),
            ),
        )
        .await;

        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_bytes(missing).await, body_bytes(wrong).await);
    }

    // ── Session resolution ─────────────────────────────────────

    #[tokio::test]
    async fn me_without_token_is_missing_token() {
        let (app, _db) = test_app().await;
        let resp = send(&app, json_request("GET", "/api/auth/me", None, None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Missing authentication token");
    }

    #[tokio::test]
    async fn me_with_garbage_token_is_invalid() {
        let (app, _db) = test_app().await;
        let resp = send(
            &app,
            json_request("GET", "/api/auth/me", Some("garbage.token.here"), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Invalid authentication token");
    }

    #[tokio::test]
    async fn me_with_expired_token_is_expired() {
        let (app, _db) = test_app().await;
        let (_, user_id) = register_user(&app, "jane@example.com").await;

        let stale_config = JwtConfig {
            expiration_hours: -2,
            ..test_jwt_config()
        };
        let stale = issue_token(&user_id, &stale_config).unwrap();

        let resp = send(&app, json_request("GET", "/api/auth/me", Some(&stale), None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Token has expired");
    }

    #[tokio::test]
    async fn valid_token_for_deleted_user_is_unknown_subject() {
        let (app, db) = test_app().await;
        let (token, user_id) = register_user(&app, "jane@example.com").await;

        user::Entity::delete_by_id(user_id.as_str())
            .exec(&db)
            .await
            .unwrap();

        let resp = send(&app, json_request("GET", "/api/auth/me", Some(&token), None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Invalid token, user not found");
    }

    // ── Authorization guards ───────────────────────────────────

    #[tokio::test]
    async fn creator_is_admin_and_non_members_are_denied() {
        let (app, _db) = test_app().await;
        let (alice, _) = register_user(&app, "alice@example.com").await;
        let (bob, _) = register_user(&app, "bob@example.com").await;
        let band_id = create_band(&app, &alice, "The Crashing Bores").await;

        // Creator sees the band with the admin role from the guard edge
        let resp = send(
            &app,
            json_request("GET", &format!("/api/bands/{}", band_id), Some(&alice), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["data"]["role"], "admin");
        assert_eq!(body["data"]["name"], "The Crashing Bores");

        // A non-member is denied, without learning whether the band exists
        let resp = send(
            &app,
            json_request("GET", &format!("/api/bands/{}", band_id), Some(&bob), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "Access denied: Not a band member");

        // Same denial for a band id that does not exist
        let resp = send(
            &app,
            json_request("GET", "/api/bands/no-such-band", Some(&bob), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        // No token at all is unauthorized, not forbidden
        let resp = send(
            &app,
            json_request("GET", &format!("/api/bands/{}", band_id), None, None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn member_role_passes_member_guard_but_not_admin_guard() {
        let (app, _db) = test_app().await;
        let (alice, _) = register_user(&app, "alice@example.com").await;
        let (bob, _) = register_user(&app, "bob@example.com").await;
        let band_id = create_band(&app, &alice, "Static Cling").await;

        // Admin adds Bob as a plain member
        let resp = send(
            &app,
            json_request(
                "POST",
                &format!("/api/bands/{}/members", band_id),
                Some(&alice),
                Some(json!({"email": "bob@example.com", "role": "member"})),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        // Bob can read
        let resp = send(
            &app,
            json_request("GET", &format!("/api/bands/{}", band_id), Some(&bob), None),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["role"], "member");

        // Bob cannot administer
        let resp = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/bands/{}", band_id),
                Some(&bob),
                Some(json!({"name": "Renamed"})),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(resp).await["error"],
            "Access denied: Not a band admin"
        );

        // Neither can a complete outsider, with the same admin denial
        let (carol, _) = register_user(&app, "carol@example.com").await;
        let resp = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/bands/{}", band_id),
                Some(&carol),
                Some(json!({"name": "Renamed"})),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            body_json(resp).await["error"],
            "Access denied: Not a band admin"
        );

        // The admin can
        let resp = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/bands/{}", band_id),
                Some(&alice),
                Some(json!({"name": "Renamed"})),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["data"]["name"], "Renamed");
    }

    #[tokio::test]
    async fn roster_lists_both_roles() {
        let (app, _db) = test_app().await;
        let (alice, _) = register_user(&app, "alice@example.com").await;
        let (bob, _) = register_user(&app, "bob@example.com").await;
        let band_id = create_band(&app, &alice, "Polyrhythm Dealers").await;

        send(
            &app,
            json_request(
                "POST",
                &format!("/api/bands/{}/members", band_id),
                Some(&alice),
                Some(json!({"email": "bob@example.com"})),
            ),
        )
        .await;

        let resp = send(
            &app,
            json_request(
                "GET",
                &format!("/api/bands/{}/members", band_id),
                Some(&bob),
                None,
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        let members = body["data"].as_array().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0]["email"], "alice@example.com");
        assert_eq!(members[0]["role"], "admin");
        assert_eq!(members[1]["email"], "bob@example.com");
        assert_eq!(members[1]["role"], "member");
    }

    #[tokio::test]
    async fn duplicate_membership_conflicts_and_unknown_email_is_not_found() {
        let (app, _db) = test_app().await;
        let (alice, _) = register_user(&app, "alice@example.com").await;
        register_user(&app, "bob@example.com").await;
        let band_id = create_band(&app, &alice, "Encore Debt").await;

        let add_bob = json!({"email": "bob@example.com"});
        let resp = send(
            &app,
            json_request(
                "POST",
                &format!("/api/bands/{}/members", band_id),
                Some(&alice),
                Some(add_bob.clone()),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = send(
            &app,
            json_request(
                "POST",
                &format!("/api/bands/{}/members", band_id),
                Some(&alice),
                Some(add_bob),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = send(
            &app,
            json_request(
                "POST",
                &format!("/api/bands/{}/members", band_id),
                Some(&alice),
                Some(json!({"email": "ghost@example.com"})),
            ),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
