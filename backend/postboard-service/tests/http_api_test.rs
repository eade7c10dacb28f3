//! Integration Tests: HTTP surface
//!
//! Drives the actix app in-process against the in-memory store.

mod common;

use actix_web::{http::StatusCode, test, web, App};
use common::TestContext;
use postboard_service::domain::models::{Actor, Comment, LikeToggle, Page, PostSummary, PostView};
use postboard_service::handlers;
use postboard_service::middleware::{USER_ID_HEADER, USER_NAME_HEADER};
use serde_json::{json, Value};
use uuid::Uuid;

macro_rules! init_app {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.state.clone()))
                .configure(handlers::configure),
        )
        .await
    };
}

fn as_user(req: test::TestRequest, actor: &Actor) -> test::TestRequest {
    req.insert_header((USER_ID_HEADER, actor.id.to_string()))
        .insert_header((USER_NAME_HEADER, actor.name.clone()))
}

const BOUNDARY: &str = "postboard-test-boundary";

fn multipart_body(texts: &[(&str, &str)], files: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in texts {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, file_name, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, file_name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn multipart_request(req: test::TestRequest, body: Vec<u8>) -> test::TestRequest {
    req.insert_header((
        "content-type",
        format!("multipart/form-data; boundary={}", BOUNDARY),
    ))
    .set_payload(body)
}

#[actix_web::test]
async fn health_and_metrics_respond() {
    let ctx = TestContext::new();
    let app = init_app!(ctx);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/ready").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn comment_flow_maps_errors_to_statuses() {
    let ctx = TestContext::new();
    let (author, _) = ctx.user("Author").await;
    let (_, reader) = ctx.user("Reader").await;
    let (_, stranger) = ctx.user("Stranger").await;
    let post = ctx.post(&author, "Post").await;
    let app = init_app!(ctx);
    let comments_uri = format!("/api/v1/posts/{}/comments", post.id);

    // No identity
    let req = test::TestRequest::post()
        .uri(&comments_uri)
        .set_json(json!({ "content": "hi" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

    // Empty content
    let req = as_user(test::TestRequest::post().uri(&comments_uri), &reader)
        .set_json(json!({ "content": "  " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "The content field is required.");

    // Missing post
    let req = as_user(
        test::TestRequest::post().uri(&format!("/api/v1/posts/{}/comments", Uuid::new_v4())),
        &reader,
    )
    .set_json(json!({ "content": "hi" }))
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    // Created
    let req = as_user(test::TestRequest::post().uri(&comments_uri), &reader)
        .set_json(json!({ "content": "hello" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let comment: Comment = test::read_body_json(resp).await;
    assert_eq!(comment.content, "hello");

    // Someone else editing
    let req = as_user(
        test::TestRequest::put().uri(&format!("/api/v1/comments/{}", comment.id)),
        &stranger,
    )
    .set_json(json!({ "content": "mine now" }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "You can only edit your own comments.");

    // Author edits
    let req = as_user(
        test::TestRequest::put().uri(&format!("/api/v1/comments/{}", comment.id)),
        &reader,
    )
    .set_json(json!({ "content": "hello again" }))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let edited: Comment = test::read_body_json(resp).await;
    assert!(edited.edited_at.is_some());

    // Thread
    let req = test::TestRequest::get().uri(&comments_uri).to_request();
    let thread: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(thread["total_count"], 1);

    // Delete
    let req = as_user(
        test::TestRequest::delete().uri(&format!("/api/v1/comments/{}", comment.id)),
        &reader,
    )
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn like_toggle_and_post_view() {
    let ctx = TestContext::new();
    let (author, _) = ctx.user("Author").await;
    let (_, reader) = ctx.user("Reader").await;
    let post = ctx.post(&author, "Post").await;
    let app = init_app!(ctx);

    let req = as_user(
        test::TestRequest::post().uri(&format!("/api/v1/posts/{}/like", post.id)),
        &reader,
    )
    .to_request();
    let toggle: LikeToggle = test::call_and_read_body_json(&app, req).await;
    assert!(toggle.liked);

    let req = as_user(
        test::TestRequest::get().uri(&format!("/api/v1/posts/{}", post.id)),
        &reader,
    )
    .to_request();
    let view: PostView = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view.post.id, post.id);
    assert_eq!(view.like_count, 1);
    assert!(view.is_liked_by_viewer);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{}", Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn post_writes_accept_multipart() {
    let ctx = TestContext::new();
    let (_, author) = ctx.user("Author").await;
    let (_, other) = ctx.user("Other").await;
    let app = init_app!(ctx);

    let body = multipart_body(
        &[("title", "Multipart"), ("content", "With files")],
        &[
            ("image", "cover.png", "image/png", &b"cover"[..]),
            ("images[]", "one.jpg", "image/jpeg", &b"one"[..]),
            ("images[]", "two.gif", "image/gif", &b"two"[..]),
        ],
    );
    let req = multipart_request(
        as_user(test::TestRequest::post().uri("/api/v1/posts"), &author),
        body,
    )
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["title"], "Multipart");
    assert_eq!(created["images"].as_array().map(Vec::len), Some(2));
    let post_id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get().uri("/api/v1/posts?page=1").to_request();
    let page: Page<PostSummary> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.total, 1);

    let body = multipart_body(&[("title", "Edited"), ("content", "x")], &[]);
    let req = multipart_request(
        as_user(test::TestRequest::put().uri(&format!("/api/v1/posts/{}", post_id)), &other),
        body,
    )
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let body = multipart_body(
        &[("title", "Bad"), ("content", "x")],
        &[("image", "evil.svg", "image/svg+xml", &b"<svg/>"[..])],
    );
    let req = multipart_request(
        as_user(test::TestRequest::put().uri(&format!("/api/v1/posts/{}", post_id)), &author),
        body,
    )
    .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let req = as_user(
        test::TestRequest::delete().uri(&format!("/api/v1/posts/{}", post_id)),
        &author,
    )
    .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);
}

#[actix_web::test]
async fn profile_endpoints() {
    let ctx = TestContext::new();
    let (user, actor) = ctx.user("Ada").await;
    let app = init_app!(ctx);

    let req = as_user(
        test::TestRequest::get().uri(&format!("/api/v1/profile/{}", user.id)),
        &actor,
    )
    .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["is_own_profile"], true);
    assert_eq!(profile["posts_count"], 0);

    let body = multipart_body(&[("name", "Ada L"), ("email", "ada.l@example.com")], &[]);
    let req = multipart_request(
        as_user(test::TestRequest::put().uri("/api/v1/profile"), &actor),
        body,
    )
    .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["name"], "Ada L");
    assert_eq!(updated["email"], "ada.l@example.com");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/profile/{}", Uuid::new_v4()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
