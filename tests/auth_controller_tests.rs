mod common;

use axum::http::{StatusCode, header};
use common::{app, auth_cookie, get, post_form, response_body_string, test_app};
use mockinvest::models::View;
use tower::ServiceExt;

#[tokio::test]
async fn get_login_renders_form() {
    let t = test_app();
    let res = app(&t).oneshot(get("/login", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("<form"));
    assert!(body.contains("admin123"));
}

#[tokio::test]
async fn post_login_missing_fields_renders_errors() {
    let t = test_app();
    let res = app(&t)
        .oneshot(post_form("/login", "username=&password=", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Username is required."));
    assert!(body.contains("Password is required."));
}

#[tokio::test]
async fn post_login_wrong_password_renders_error() {
    let t = test_app();
    let res = app(&t)
        .oneshot(post_form("/login", "username=user1&password=nope", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get(header::SET_COOKIE).is_none());

    let body = response_body_string(res).await;
    assert!(body.contains("Invalid username or password."));
}

#[tokio::test]
async fn post_login_sets_cookie_and_opens_home() {
    let t = test_app();
    let res = app(&t)
        .oneshot(post_form("/login", "username=user1&password=test123", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/");

    let cookie = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("auth="));
    assert!(cookie.contains("HttpOnly"));

    assert_eq!(t.state.sessions.read().await.view_of("user1"), View::Home);
}

#[tokio::test]
async fn htmx_login_uses_hx_redirect() {
    let t = test_app();
    let mut req = post_form("/login", "username=admin&password=admin123", None);
    req.headers_mut().insert("HX-Request", "true".parse().unwrap());

    let res = app(&t).oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("HX-Redirect").unwrap(), "/");
}

#[tokio::test]
async fn register_then_login() {
    let t = test_app();

    let res = app(&t)
        .oneshot(post_form("/register", "username=carol&password=pa55word", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = response_body_string(res).await;
    assert!(body.contains("Account created"));

    // registering alone does not log in
    assert_eq!(t.state.sessions.read().await.view_of("carol"), View::LoggedOut);

    let res = app(&t)
        .oneshot(post_form("/login", "username=carol&password=pa55word", None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let saved = std::fs::read_to_string(t.dir.path().join("users_db.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(doc["carol"]["balance"], 10_000.0);
}

#[tokio::test]
async fn register_duplicate_keeps_original_account() {
    let t = test_app();
    let res = app(&t)
        .oneshot(post_form("/register", "username=user1&password=other", None))
        .await
        .unwrap();

    let body = response_body_string(res).await;
    assert!(body.contains("already exists"));

    let store = t.state.store.lock().await;
    assert!(store.users.authenticate("user1", "test123").is_ok());
    assert!(store.users.authenticate("user1", "other").is_err());
}

#[tokio::test]
async fn register_rejects_bad_username() {
    let t = test_app();
    let res = app(&t)
        .oneshot(post_form("/register", "username=a+b&password=pw", None))
        .await
        .unwrap();

    let body = response_body_string(res).await;
    assert!(body.contains("Username must be"));
}

#[tokio::test]
async fn anonymous_root_redirects_to_login() {
    let t = test_app();
    let res = app(&t).oneshot(get("/", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn anonymous_htmx_request_gets_hx_redirect() {
    let t = test_app();
    let mut req = get("/portfolio/holdings", None);
    req.headers_mut().insert("HX-Request", "true".parse().unwrap());

    let res = app(&t).oneshot(req).await.unwrap();
    assert_eq!(res.headers().get("HX-Redirect").unwrap(), "/login");
}

#[tokio::test]
async fn forged_cookie_is_ignored() {
    let t = test_app();
    let res = app(&t)
        .oneshot(get("/", Some("auth=not.a.jwt")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_clears_cookie_and_session() {
    let t = test_app();
    let cookie = auth_cookie(&t, "user1");

    let res = app(&t).oneshot(get("/trade", Some(&cookie))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(t.state.sessions.read().await.view_of("user1"), View::Trade);

    let res = app(&t).oneshot(get("/logout", Some(&cookie))).await.unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), "/login");

    let cleared = res.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.starts_with("auth="));
    assert!(cleared.contains("Max-Age=0"));

    assert_eq!(t.state.sessions.read().await.view_of("user1"), View::LoggedOut);
}
