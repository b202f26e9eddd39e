use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{routes, AppState};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::auth::home))
        .route("/login", get(routes::auth::login_page).post(routes::auth::login))
        .route("/logout", get(routes::auth::logout))
        .route("/health", get(routes::health::health_check))
        // Administrator
        .route("/dashboard/admin/{id}", get(routes::accounts::admin_dashboard))
        .route(
            "/add_user/{id}",
            get(routes::accounts::add_user_page).post(routes::accounts::add_user),
        )
        // Responsible
        .route("/dashboard/responsible/{id}", get(routes::responsible::dashboard))
        .route("/send_reminder/{id}", post(routes::responsible::send_reminder))
        .route(
            "/add_menu/{id}",
            get(routes::menu::add_menu_page).post(routes::menu::add_menu),
        )
        .route("/add_meal/{id}", post(routes::menu::add_meal))
        // Employee
        .route(
            "/dashboard/employee/{id}",
            get(routes::preferences::dashboard).post(routes::preferences::submit),
        )
        // Public share link
        .route("/menu/{token}", get(routes::menu::menu_by_token))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{host}:{port}");
    tracing::info!("lunchbox API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> Router {
        build_app(AppState::fake())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn location(res: &axum::response::Response) -> String {
        res.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn landing_and_login_are_public() {
        let res = app().oneshot(get_req("/")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app().oneshot(get_req("/login")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn anonymous_dashboards_redirect_to_login() {
        for path in [
            format!("/dashboard/admin/{}", Uuid::new_v4()),
            format!("/dashboard/responsible/{}", Uuid::new_v4()),
            format!("/dashboard/employee/{}", Uuid::new_v4()),
            format!("/add_menu/{}", Uuid::new_v4()),
            format!("/add_user/{}", Uuid::new_v4()),
        ] {
            let res = app().oneshot(get_req(&path)).await.unwrap();
            assert_eq!(res.status(), StatusCode::FOUND, "{path}");
            assert_eq!(location(&res), "/login", "{path}");
        }
    }

    #[tokio::test]
    async fn anonymous_reminder_post_redirects_to_login() {
        let req = Request::builder()
            .method("POST")
            .uri(format!("/send_reminder/{}", Uuid::new_v4()))
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/login");
    }

    #[tokio::test]
    async fn tampered_session_cookie_redirects_to_login() {
        let req = Request::builder()
            .uri(format!("/dashboard/employee/{}", Uuid::new_v4()))
            .header(header::COOKIE, "session=not.a.token")
            .body(Body::empty())
            .unwrap();
        let res = app().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/login");
    }

    #[tokio::test]
    async fn malformed_menu_token_is_not_found() {
        let res = app().oneshot(get_req("/menu/not-a-token")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn logout_clears_cookie_and_redirects() {
        let res = app().oneshot(get_req("/logout")).await.unwrap();
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/login");
        let cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}
