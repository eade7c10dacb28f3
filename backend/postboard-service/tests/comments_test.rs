//! Integration Tests: Comments and threads
//!
//! Coverage:
//! - Creating comments and replies, parent checks
//! - Edit permissions and the edited marker
//! - Delete permissions (author or post owner) and reply cascade
//! - Thread ordering and counts

mod common;

use common::TestContext;
use postboard_service::ServiceError;
use uuid::Uuid;

#[tokio::test]
async fn create_comment_trims_and_validates() {
    let ctx = TestContext::new();
    let (author, _) = ctx.user("Author").await;
    let (_, reader) = ctx.user("Reader").await;
    let post = ctx.post(&author, "Post").await;

    let comment = ctx
        .state
        .comments
        .create_comment(&reader, post.id, "  nice post  ", None)
        .await
        .unwrap();
    assert_eq!(comment.content, "nice post");
    assert_eq!(comment.user_id, reader.id);
    assert!(comment.parent_id.is_none());
    assert!(comment.edited_at.is_none());

    let empty = ctx
        .state
        .comments
        .create_comment(&reader, post.id, "   ", None)
        .await;
    assert!(matches!(empty, Err(ServiceError::Validation(_))));

    let too_long = ctx
        .state
        .comments
        .create_comment(&reader, post.id, &"x".repeat(1001), None)
        .await;
    assert!(matches!(too_long, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
    let ctx = TestContext::new();
    let (_, reader) = ctx.user("Reader").await;

    let result = ctx
        .state
        .comments
        .create_comment(&reader, Uuid::new_v4(), "hello", None)
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn reply_parent_must_be_top_level_on_same_post() {
    let ctx = TestContext::new();
    let (author, actor) = ctx.user("Author").await;
    let post = ctx.post(&author, "First").await;
    let other_post = ctx.post(&author, "Second").await;

    let top = ctx
        .state
        .comments
        .create_comment(&actor, post.id, "top", None)
        .await
        .unwrap();
    let reply = ctx
        .state
        .comments
        .create_comment(&actor, post.id, "reply", Some(top.id))
        .await
        .unwrap();
    assert_eq!(reply.parent_id, Some(top.id));

    let nested = ctx
        .state
        .comments
        .create_comment(&actor, post.id, "nested", Some(reply.id))
        .await;
    assert!(matches!(nested, Err(ServiceError::Validation(_))));

    let cross_post = ctx
        .state
        .comments
        .create_comment(&actor, other_post.id, "elsewhere", Some(top.id))
        .await;
    assert!(matches!(cross_post, Err(ServiceError::Validation(_))));

    let missing = ctx
        .state
        .comments
        .create_comment(&actor, post.id, "ghost", Some(Uuid::new_v4()))
        .await;
    assert!(matches!(missing, Err(ServiceError::Validation(_))));
}

#[tokio::test]
async fn only_the_author_can_edit() {
    let ctx = TestContext::new();
    let (author, post_owner) = ctx.user("Owner").await;
    let (_, commenter) = ctx.user("Commenter").await;
    let post = ctx.post(&author, "Post").await;
    let comment = ctx
        .state
        .comments
        .create_comment(&commenter, post.id, "original", None)
        .await
        .unwrap();

    // Post owner cannot edit someone else's comment, even with invalid content
    let denied = ctx
        .state
        .comments
        .update_comment(&post_owner, comment.id, "")
        .await;
    assert!(matches!(denied, Err(ServiceError::PermissionDenied(_))));
    let unchanged = ctx.store.comments.get_comment(comment.id).await.unwrap();
    assert_eq!(unchanged.content, "original");
    assert!(unchanged.edited_at.is_none());

    let edited = ctx
        .state
        .comments
        .update_comment(&commenter, comment.id, " revised ")
        .await
        .unwrap();
    assert_eq!(edited.content, "revised");
    assert!(edited.is_edited());
}

#[tokio::test]
async fn author_or_post_owner_can_delete() {
    let ctx = TestContext::new();
    let (owner_user, owner) = ctx.user("Owner").await;
    let (_, commenter) = ctx.user("Commenter").await;
    let (_, stranger) = ctx.user("Stranger").await;
    let post = ctx.post(&owner_user, "Post").await;

    let first = ctx
        .state
        .comments
        .create_comment(&commenter, post.id, "first", None)
        .await
        .unwrap();
    let second = ctx
        .state
        .comments
        .create_comment(&commenter, post.id, "second", None)
        .await
        .unwrap();

    let denied = ctx.state.comments.delete_comment(&stranger, first.id).await;
    assert!(matches!(denied, Err(ServiceError::PermissionDenied(_))));

    ctx.state.comments.delete_comment(&commenter, first.id).await.unwrap();
    ctx.state.comments.delete_comment(&owner, second.id).await.unwrap();

    let thread = ctx.state.threads.build_thread(post.id).await.unwrap();
    assert_eq!(thread.total_count, 0);

    let gone = ctx.state.comments.delete_comment(&owner, first.id).await;
    assert!(matches!(gone, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn deleting_a_comment_removes_its_replies() {
    let ctx = TestContext::new();
    let (author, actor) = ctx.user("Author").await;
    let post = ctx.post(&author, "Post").await;

    let top = ctx
        .state
        .comments
        .create_comment(&actor, post.id, "top", None)
        .await
        .unwrap();
    let reply = ctx
        .state
        .comments
        .create_comment(&actor, post.id, "reply", Some(top.id))
        .await
        .unwrap();

    ctx.state.comments.delete_comment(&actor, top.id).await.unwrap();

    let result = ctx.store.comments.get_comment(reply.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn thread_orders_top_level_newest_first_and_replies_oldest_first() {
    let ctx = TestContext::new();
    let (author, a) = ctx.user("Alice").await;
    let (_, b) = ctx.user("Bob").await;
    let post = ctx.post(&author, "Post").await;
    let comments = &ctx.state.comments;

    let c1 = comments.create_comment(&a, post.id, "c1", None).await.unwrap();
    let r1 = comments.create_comment(&b, post.id, "r1", Some(c1.id)).await.unwrap();
    let c2 = comments.create_comment(&b, post.id, "c2", None).await.unwrap();
    let r2 = comments.create_comment(&a, post.id, "r2", Some(c1.id)).await.unwrap();

    let thread = ctx.state.threads.build_thread(post.id).await.unwrap();

    let top: Vec<Uuid> = thread.nodes.iter().map(|n| n.comment.id).collect();
    assert_eq!(top, vec![c2.id, c1.id]);

    let replies: Vec<Uuid> = thread.nodes[1].replies.iter().map(|n| n.comment.id).collect();
    assert_eq!(replies, vec![r1.id, r2.id]);
    assert_eq!(thread.nodes[1].replies[0].author.name, "Bob");
    assert!(thread.nodes[0].replies.is_empty());
    assert_eq!(thread.total_count, 4);
}

#[tokio::test]
async fn thread_of_missing_post_is_not_found() {
    let ctx = TestContext::new();
    let result = ctx.state.threads.build_thread(Uuid::new_v4()).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}
