mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn test_rating_follows_reviews() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let title_id = app.seed_title(&admin).await;
    let title_uri = format!("/api/v1/titles/{title_id}");
    let reviews_uri = format!("{title_uri}/reviews");

    let (_, body) = app.get(&title_uri, None).await;
    assert!(body["data"]["rating"].is_null());

    let first = app.token_for("u1", "u1@example.com").await;
    let second = app.token_for("u2", "u2@example.com").await;

    let (status, _) = app
        .post(&reviews_uri, Some(&first), json!({ "text": "meh", "score": 1 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post(&reviews_uri, Some(&second), json!({ "text": "ok", "score": 2 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // 1.5 rounds half up.
    let (_, body) = app.get(&title_uri, None).await;
    assert_eq!(body["data"]["rating"], 2);

    for (name, score) in [("u3", 10), ("u4", 9)] {
        let token = app.token_for(name, &format!("{name}@example.com")).await;
        app.post(&reviews_uri, Some(&token), json!({ "text": "great", "score": score }))
            .await;
    }
    // (1 + 2 + 10 + 9) / 4 = 5.5
    let (_, body) = app.get(&title_uri, None).await;
    assert_eq!(body["data"]["rating"], 6);

    let (_, body) = app.get(&reviews_uri, None).await;
    assert_eq!(body["data"]["count"], 4);
    assert_eq!(body["data"]["results"][0]["author"], "u1");
}

#[tokio::test]
async fn test_one_review_per_user_per_title() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let title_id = app.seed_title(&admin).await;
    let reviews_uri = format!("/api/v1/titles/{title_id}/reviews");
    let user = app.token_for("critic", "critic@example.com").await;

    let (status, _) = app
        .post(&reviews_uri, Some(&user), json!({ "text": "first", "score": 7 }))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .post(&reviews_uri, Some(&user), json!({ "text": "second", "score": 8 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post(&reviews_uri, Some(&admin), json!({ "text": "bad", "score": 11 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&reviews_uri, None, json!({ "text": "anon", "score": 5 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .post(
            "/api/v1/titles/999/reviews",
            Some(&admin),
            json!({ "text": "nowhere", "score": 5 }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_review_edit_permissions() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let title_id = app.seed_title(&admin).await;
    let reviews_uri = format!("/api/v1/titles/{title_id}/reviews");

    let author = app.token_for("author", "author@example.com").await;
    let stranger = app.token_for("stranger", "stranger@example.com").await;
    let moderator = app.token_with_role(&admin, "modder", "moderator").await;

    let (_, body) = app
        .post(&reviews_uri, Some(&author), json!({ "text": "draft", "score": 4 }))
        .await;
    let review_uri = format!("{reviews_uri}/{}", body["data"]["id"]);

    let (status, _) = app
        .patch(&review_uri, Some(&stranger), json!({ "score": 1 }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.patch(&review_uri, None, json!({ "score": 1 })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .patch(&review_uri, Some(&author), json!({ "score": 8 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["score"], 8);
    assert_eq!(body["data"]["text"], "draft");

    let (status, body) = app
        .patch(&review_uri, Some(&moderator), json!({ "text": "edited" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["author"], "author");

    let (status, _) = app.delete(&review_uri, Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&review_uri, Some(&moderator)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&review_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_review_removes_comments() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let title_id = app.seed_title(&admin).await;
    let reviews_uri = format!("/api/v1/titles/{title_id}/reviews");
    let user = app.token_for("talker", "talker@example.com").await;

    let (_, body) = app
        .post(&reviews_uri, Some(&user), json!({ "text": "thoughts", "score": 6 }))
        .await;
    let review_id = body["data"]["id"].as_i64().unwrap();
    let comments_uri = format!("{reviews_uri}/{review_id}/comments");

    let (status, body) = app
        .post(&comments_uri, Some(&admin), json!({ "text": "agreed" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["author"], "root");
    let comment_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app.post(&comments_uri, Some(&user), json!({ "text": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get(&comments_uri, None).await;
    assert_eq!(body["data"]["count"], 1);

    let (status, _) = app
        .delete(&format!("{reviews_uri}/{review_id}"), Some(&user))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&comments_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let comment = app.shared.store.get_comment(review_id as i32, comment_id as i32).await;
    assert!(comment.unwrap().is_none());
}

#[tokio::test]
async fn test_nested_paths_must_match() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let first_title = app.seed_title(&admin).await;

    let (_, body) = app
        .post(
            "/api/v1/titles",
            Some(&admin),
            json!({ "name": "Stalker", "year": 1979 }),
        )
        .await;
    let second_title = body["data"]["id"].as_i64().unwrap();

    let (_, body) = app
        .post(
            &format!("/api/v1/titles/{first_title}/reviews"),
            Some(&admin),
            json!({ "text": "classic", "score": 9 }),
        )
        .await;
    let review_id = body["data"]["id"].as_i64().unwrap();

    let (_, body) = app
        .post(
            &format!("/api/v1/titles/{first_title}/reviews/{review_id}/comments"),
            Some(&admin),
            json!({ "text": "indeed" }),
        )
        .await;
    let comment_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .get(
            &format!("/api/v1/titles/{second_title}/reviews/{review_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .post(
            &format!("/api/v1/titles/{second_title}/reviews/{review_id}/comments"),
            Some(&admin),
            json!({ "text": "wrong title" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .get(
            &format!("/api/v1/titles/{first_title}/reviews/{review_id}/comments"),
            None,
        )
        .await;
    assert_eq!(body["data"]["count"], 1);

    let (status, _) = app
        .get(
            &format!("/api/v1/titles/{second_title}/reviews/{review_id}/comments/{comment_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .get(
            &format!("/api/v1/titles/{first_title}/reviews/{review_id}/comments/{comment_id}"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "indeed");
}

#[tokio::test]
async fn test_deleting_title_removes_its_reviews() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let title_id = app.seed_title(&admin).await;

    let (_, body) = app
        .post(
            &format!("/api/v1/titles/{title_id}/reviews"),
            Some(&admin),
            json!({ "text": "gone soon", "score": 3 }),
        )
        .await;
    let review_id = body["data"]["id"].as_i64().unwrap() as i32;

    let (status, _) = app
        .delete(&format!("/api/v1/titles/{title_id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let review = app
        .shared
        .store
        .get_review(title_id as i32, review_id)
        .await
        .unwrap();
    assert!(review.is_none());
}

#[tokio::test]
async fn test_comment_edit_permissions() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;
    let title_id = app.seed_title(&admin).await;
    let reviews_uri = format!("/api/v1/titles/{title_id}/reviews");

    let author = app.token_for("writer", "writer@example.com").await;
    let stranger = app.token_for("passerby", "passerby@example.com").await;
    let moderator = app.token_with_role(&admin, "keeper", "moderator").await;

    let (_, body) = app
        .post(&reviews_uri, Some(&admin), json!({ "text": "review", "score": 7 }))
        .await;
    let comments_uri = format!("{reviews_uri}/{}/comments", body["data"]["id"]);

    let (status, body) = app
        .post(&comments_uri, Some(&author), json!({ "text": "first take" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let comment_uri = format!("{comments_uri}/{}", body["data"]["id"]);

    let (status, _) = app
        .patch(&comment_uri, None, json!({ "text": "anon edit" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .patch(&comment_uri, Some(&stranger), json!({ "text": "hijack" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .patch(&comment_uri, Some(&author), json!({ "text": "second take" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "second take");
    assert_eq!(body["data"]["author"], "writer");

    let (status, body) = app
        .patch(&comment_uri, Some(&moderator), json!({ "text": "moderated" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["text"], "moderated");
    assert_eq!(body["data"]["author"], "writer");

    let (status, _) = app.delete(&comment_uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.delete(&comment_uri, Some(&stranger)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&comment_uri, Some(&moderator)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&comment_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // An author may delete their own comment.
    let (_, body) = app
        .post(&comments_uri, Some(&author), json!({ "text": "again" }))
        .await;
    let own_uri = format!("{comments_uri}/{}", body["data"]["id"]);

    let (status, _) = app.delete(&own_uri, Some(&author)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.get(&comments_uri, None).await;
    assert_eq!(body["data"]["count"], 0);
}
