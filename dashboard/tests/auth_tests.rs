mod common;

use axum::http::StatusCode;
use common::{body_text, location, session_cookie, set_cookie, TestSetup};
use dashboard::types::Environment;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_login_page_is_public() {
    let setup = TestSetup::new(&[]);

    let response = setup.get("/ui/login", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("name=\"username\""));
    assert!(html.contains("name=\"password\""));
    assert!(html.contains("action=\"/ui/login\""));
}

#[tokio::test]
async fn test_login_with_default_password() {
    let setup = TestSetup::new(&[]);

    let response = setup
        .post_form("/ui/login", "username=admin&password=123456")
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/ui"));
    assert!(session_cookie(&response).is_some());
    assert_eq!(setup.sessions.len().await, 1);
}

#[tokio::test]
async fn test_failed_logins_redirect_back_without_session() {
    let setup = TestSetup::new(&[]);

    let attempts = [
        "username=admin&password=wrong",
        "username=root&password=123456",
        "username=ADMIN&password=123456",
        "username=&password=",
        "username=admin&password=",
    ];

    for body in attempts {
        let response = setup.post_form("/ui/login", body).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{body}");
        assert_eq!(location(&response), Some("/ui/login"), "{body}");
        assert_eq!(set_cookie(&response), None, "{body}");
    }

    assert!(setup.sessions.is_empty().await);
}

#[tokio::test]
async fn test_malformed_login_body_counts_as_failure() {
    let setup = TestSetup::new(&[]);

    for body in ["", "username=admin", "password=123456", "garbage"] {
        let response = setup.post_form("/ui/login", body).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{body:?}");
        assert_eq!(location(&response), Some("/ui/login"), "{body:?}");
    }

    assert!(setup.sessions.is_empty().await);
}

#[tokio::test]
async fn test_session_cookie_attributes() {
    let setup = TestSetup::new(&[("SESSION_TTL_SECS", "3600")]);

    let response = setup
        .post_form("/ui/login", "username=admin&password=123456")
        .await;
    let cookie = set_cookie(&response).expect("session cookie");

    assert!(cookie.starts_with("queue_dashboard_session="));
    assert!(cookie.contains("; Path=/ui"));
    assert!(cookie.contains("; HttpOnly"));
    assert!(cookie.contains("; SameSite=Lax"));
    assert!(cookie.contains("; Max-Age=3600"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_session_cookie_is_secure_in_production() {
    let setup = TestSetup::with_environment(Environment::Production, &[]);

    let response = setup
        .post_form("/ui/login", "username=admin&password=123456")
        .await;
    let cookie = set_cookie(&response).expect("session cookie");
    assert!(cookie.ends_with("; Secure"));
}

#[tokio::test]
async fn test_protected_paths_redirect_when_anonymous() {
    let setup = TestSetup::new(&[]);

    let paths = [
        ("GET", "/ui"),
        ("GET", "/ui/"),
        ("GET", "/ui/api/queues"),
        ("GET", "/ui/api/queues/emails/jobs"),
        ("GET", "/ui/api/queues/emails/jobs/1"),
        ("DELETE", "/ui/api/queues/emails/jobs/1"),
        ("PUT", "/ui/api/queues/emails/pause"),
        ("PUT", "/ui/api/queues/emails/clean/completed"),
        ("GET", "/ui/whatever"),
        ("POST", "/ui/some/deep/path"),
    ];

    for (method, path) in paths {
        let response = setup.request(method, path, None).await;
        assert_eq!(response.status(), StatusCode::FOUND, "{method} {path}");
        assert_eq!(location(&response), Some("/ui/login"), "{method} {path}");

        let body = body_text(response).await;
        assert!(!body.contains("Queue Dashboard"), "{method} {path}");
    }
}

#[tokio::test]
async fn test_paths_outside_dashboard_are_not_gated() {
    let setup = TestSetup::new(&[]);

    for path in ["/nope", "/favicon.ico", "/api/queues", "/uix"] {
        let response = setup.get(path, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        assert_eq!(location(&response), None, "{path}");
    }
}

#[tokio::test]
async fn test_forged_cookie_is_rejected() {
    let setup = TestSetup::new(&[]);

    let response = setup
        .get("/ui", Some("queue_dashboard_session=not-a-session"))
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/ui/login"));
}

#[tokio::test]
async fn test_logged_in_user_sees_panel() {
    let setup = TestSetup::new(&[]);
    let cookie = setup.login("admin", "123456").await.expect("session cookie");

    for path in ["/ui", "/ui/"] {
        let response = setup.get(path, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK, "{path}");

        let html = body_text(response).await;
        assert!(html.contains("<title>Queue Dashboard</title>"), "{path}");
    }
}

#[tokio::test]
async fn test_unknown_path_is_not_found_once_logged_in() {
    let setup = TestSetup::new(&[]);
    let cookie = setup.login("admin", "123456").await.expect("session cookie");

    let response = setup.get("/ui/whatever", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_expired_session_redirects_to_login() {
    let setup = TestSetup::new(&[("SESSION_TTL_SECS", "0")]);
    let cookie = setup.login("admin", "123456").await.expect("session cookie");

    let response = setup.get("/ui", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(location(&response), Some("/ui/login"));
}

#[tokio::test]
async fn test_password_is_bound_to_its_configuration() {
    let first = TestSetup::new(&[("PASSWORD", "alpha")]);
    let second = TestSetup::new(&[("PASSWORD", "bravo")]);

    assert!(first.login("admin", "alpha").await.is_some());
    assert!(second.login("admin", "alpha").await.is_none());
    assert!(second.login("admin", "123456").await.is_none());
    assert!(second.login("admin", "bravo").await.is_some());
}

#[tokio::test]
async fn test_session_from_one_process_is_unknown_to_another() {
    let first = TestSetup::new(&[]);
    let second = TestSetup::new(&[]);
    let cookie = first.login("admin", "123456").await.expect("session cookie");

    let response = second.get("/ui", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
}

#[tokio::test]
async fn test_default_setup_end_to_end() {
    let setup = TestSetup::new(&[("QUEUES", "emails reports")]);
    assert_eq!(setup.registry.names(), vec!["emails", "reports"]);

    let response = setup.get("/ui", None).await;
    assert_eq!(location(&response), Some("/ui/login"));

    let response = setup
        .post_form("/ui/login", "username=admin&password=wrong")
        .await;
    assert_eq!(location(&response), Some("/ui/login"));

    let response = setup
        .post_form("/ui/login", "username=admin&password=123456")
        .await;
    assert_eq!(location(&response), Some("/ui"));
    let cookie = session_cookie(&response).expect("session cookie");

    let response = setup.get("/ui", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
