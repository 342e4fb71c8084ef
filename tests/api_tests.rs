mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn test_signup_and_token_exchange() {
    let app = spawn_app().await;

    let (status, body) = app
        .post(
            "/api/v1/auth/signup",
            None,
            json!({ "username": "alice", "email": "alice@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(app.outbox.count(), 1);

    let code = app.outbox.last_code_for("alice@example.com");

    let (status, _) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "alice", "confirmation_code": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "alice", "confirmation_code": code }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    // Codes are single use.
    let (status, _) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "alice", "confirmation_code": code }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/v1/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["role"], "user");
}

#[tokio::test]
async fn test_token_for_unknown_user_is_not_found() {
    let app = spawn_app().await;

    let (status, _) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "ghost", "confirmation_code": "abc" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "", "confirmation_code": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expired_code_is_rejected() {
    let app = spawn_app().await;

    app.post(
        "/api/v1/auth/signup",
        None,
        json!({ "username": "bob", "email": "bob@example.com" }),
    )
    .await;
    let code = app.outbox.last_code_for("bob@example.com");

    let store = &app.shared.store;
    let user = store.get_user_by_username("bob").await.unwrap().unwrap();
    let record = store.get_confirmation_code(user.id).await.unwrap().unwrap();
    let past = chrono::Utc::now() - chrono::Duration::minutes(5);
    store
        .replace_confirmation_code(
            user.id,
            record.code_hash,
            (past - chrono::Duration::minutes(60)).to_rfc3339(),
            past.to_rfc3339(),
        )
        .await
        .unwrap();

    let (status, _) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "bob", "confirmation_code": code }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_signup_rejects_reserved_and_mismatched_pairs() {
    let app = spawn_app().await;

    let (status, _) = app
        .post(
            "/api/v1/auth/signup",
            None,
            json!({ "username": "me", "email": "me@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/auth/signup",
            None,
            json!({ "username": "carol", "email": "carol@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let first_code = app.outbox.last_code_for("carol@example.com");

    // Different username, email already owned by carol.
    let (status, body) = app
        .post(
            "/api/v1/auth/signup",
            None,
            json!({ "username": "mallory", "email": "carol@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(
        app.shared
            .store
            .get_user_by_username("mallory")
            .await
            .unwrap()
            .is_none()
    );

    // Same username, different email.
    let (status, _) = app
        .post(
            "/api/v1/auth/signup",
            None,
            json!({ "username": "carol", "email": "other@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Repeating the exact pair mails a fresh code.
    let (status, _) = app
        .post(
            "/api/v1/auth/signup",
            None,
            json!({ "username": "carol", "email": "carol@example.com" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.outbox.count(), 2);

    let second_code = app.outbox.last_code_for("carol@example.com");
    assert_ne!(first_code, second_code);

    // The replaced code no longer redeems.
    let (status, _) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "carol", "confirmation_code": first_code }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .post(
            "/api/v1/auth/token",
            None,
            json!({ "username": "carol", "confirmation_code": second_code }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["token"].is_string());
}

#[tokio::test]
async fn test_malformed_bearer_token_is_unauthorized() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/v1/users/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let (status, _) = app.get("/api/v1/users/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/v1/titles", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_administration_requires_admin() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let user = app.token_for("dave", "dave@example.com").await;

    let (status, _) = app.get("/api/v1/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.get("/api/v1/users", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/api/v1/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 2);

    let (status, body) = app
        .patch(
            "/api/v1/users/dave",
            Some(&admin),
            json!({ "role": "moderator", "bio": "promoted" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "moderator");

    let (status, _) = app.get("/api/v1/users/nobody", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete("/api/v1/users/dave", Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/v1/users/dave", Some(&admin)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_me_cannot_change_role() {
    let app = spawn_app().await;
    let token = app.token_for("erin", "erin@example.com").await;

    let (status, body) = app
        .patch(
            "/api/v1/users/me",
            Some(&token),
            json!({ "role": "admin", "first_name": "Erin" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "user");
    assert_eq!(body["data"]["first_name"], "Erin");

    let (status, _) = app.get("/api/v1/users", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_moderator_cannot_promote_self() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let moderator = app.token_with_role(&admin, "warden", "moderator").await;

    let (status, body) = app
        .patch(
            "/api/v1/users/me",
            Some(&moderator),
            json!({ "role": "admin", "bio": "keeps order" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "moderator");
    assert_eq!(body["data"]["bio"], "keeps order");

    let (status, _) = app.get("/api/v1/users", Some(&moderator)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.get("/api/v1/users/warden", Some(&admin)).await;
    assert_eq!(body["data"]["role"], "moderator");
}

#[tokio::test]
async fn test_catalog_writes_are_admin_only() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let moderator = app.token_with_role(&admin, "mod", "moderator").await;

    let (status, _) = app
        .post(
            "/api/v1/categories",
            Some(&moderator),
            json!({ "name": "Books", "slug": "books" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            "/api/v1/categories",
            None,
            json!({ "name": "Books", "slug": "books" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post(
            "/api/v1/categories",
            Some(&admin),
            json!({ "name": "Books", "slug": "books" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["slug"], "books");

    let (status, _) = app
        .post(
            "/api/v1/categories",
            Some(&admin),
            json!({ "name": "More books", "slug": "books" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/genres",
            Some(&admin),
            json!({ "name": "Bad slug", "slug": "no spaces" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.get("/api/v1/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
}

#[tokio::test]
async fn test_title_filters_and_category_removal() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let title_id = app.seed_title(&admin).await;

    let (status, _) = app
        .post(
            "/api/v1/titles",
            Some(&admin),
            json!({ "name": "Future film", "year": 3000, "category": "films" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/titles",
            Some(&admin),
            json!({ "name": "Unknown genre", "year": 1999, "genre": ["missing"] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/v1/titles?genre=drama", None).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["genre"][0]["slug"], "drama");

    let (_, body) = app.get("/api/v1/titles?name=sol&year=1972", None).await;
    assert_eq!(body["data"]["count"], 1);

    let (_, body) = app.get("/api/v1/titles?category=books", None).await;
    assert_eq!(body["data"]["count"], 0);

    let (status, _) = app.delete("/api/v1/categories/films", Some(&admin)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .get(&format!("/api/v1/titles/{title_id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["category"].is_null());
    assert_eq!(body["data"]["name"], "Solaris");

    let (status, body) = app
        .patch(
            &format!("/api/v1/titles/{title_id}"),
            Some(&admin),
            json!({ "description": "Space station", "genre": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Space station");
    assert_eq!(body["data"]["genre"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_malformed_input_is_bad_request() {
    let app = spawn_app().await;

    let (status, _) = app.get("/api/v1/titles?year=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/v1/titles/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/api/v1/titles?limit=100000", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_huge_offset_is_rejected() {
    let app = spawn_app().await;

    let (status, body) = app
        .get("/api/v1/titles?offset=18446744073709551615", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = app
        .get("/api/v1/categories?offset=9223372036854775808", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Server is still serving after the rejected requests.
    let (status, body) = app.get("/api/v1/titles?offset=5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 0);
}

#[tokio::test]
async fn test_non_numeric_path_id_uses_error_envelope() {
    let app = spawn_app().await;

    let (status, body) = app.get("/api/v1/titles/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());

    let (status, body) = app.get("/api/v1/titles/1/reviews/xyz/comments", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
