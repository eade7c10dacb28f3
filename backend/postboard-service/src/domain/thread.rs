//! Two-level comment thread assembly
//!
//! Comments arrive as a flat list and are grouped by `parent_id` on read.
//! Top-level comments are ordered newest first; replies oldest first under
//! their parent. Replies whose parent is not a top-level comment of the same
//! post are not reachable from the tree and are not counted.

use crate::domain::models::{AuthorSummary, Comment, CommentNode, CommentThread, User};
use std::collections::HashMap;
use uuid::Uuid;

pub fn assemble_thread(comments: Vec<Comment>, authors: &HashMap<Uuid, User>) -> CommentThread {
    let (mut top_level, replies): (Vec<Comment>, Vec<Comment>) =
        comments.into_iter().partition(Comment::is_top_level);

    let mut replies_by_parent: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    for reply in replies {
        if let Some(parent_id) = reply.parent_id {
            replies_by_parent.entry(parent_id).or_default().push(reply);
        }
    }

    top_level.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    let mut total_count = 0i64;
    let nodes: Vec<CommentNode> = top_level
        .into_iter()
        .map(|comment| {
            let mut group = replies_by_parent.remove(&comment.id).unwrap_or_default();
            group.retain(|reply| reply.post_id == comment.post_id);
            group.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.id.cmp(&b.id))
            });

            let replies: Vec<CommentNode> = group
                .into_iter()
                .map(|reply| leaf_node(reply, authors))
                .collect();
            total_count += 1 + replies.len() as i64;

            let mut node = leaf_node(comment, authors);
            node.replies = replies;
            node
        })
        .collect();

    CommentThread { nodes, total_count }
}

fn leaf_node(comment: Comment, authors: &HashMap<Uuid, User>) -> CommentNode {
    let author = authors
        .get(&comment.user_id)
        .map(AuthorSummary::from)
        .unwrap_or_else(|| AuthorSummary::unknown(comment.user_id));

    CommentNode {
        is_edited: comment.is_edited(),
        author,
        comment,
        replies: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn user(name: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: name.into(),
            email: format!("{}@example.com", name),
            profile_image: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn comment(post_id: Uuid, author: &User, parent_id: Option<Uuid>, minute: i64) -> Comment {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + Duration::minutes(minute);
        Comment {
            id: Uuid::new_v4(),
            post_id,
            user_id: author.id,
            parent_id,
            content: format!("comment at {}", minute),
            edited_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn authors(users: &[&User]) -> HashMap<Uuid, User> {
        users.iter().map(|u| (u.id, (*u).clone())).collect()
    }

    #[test]
    fn test_latest_thread_first_with_replies_attached() {
        let alice = user("alice");
        let bob = user("bob");
        let post_id = Uuid::new_v4();

        let c1 = comment(post_id, &alice, None, 0);
        let r1 = comment(post_id, &bob, Some(c1.id), 1);
        let c2 = comment(post_id, &bob, None, 2);

        let thread = assemble_thread(
            vec![r1.clone(), c1.clone(), c2.clone()],
            &authors(&[&alice, &bob]),
        );

        assert_eq!(thread.nodes.len(), 2);
        assert_eq!(thread.nodes[0].comment.id, c2.id);
        assert!(thread.nodes[0].replies.is_empty());
        assert_eq!(thread.nodes[1].comment.id, c1.id);
        assert_eq!(thread.nodes[1].replies.len(), 1);
        assert_eq!(thread.nodes[1].replies[0].comment.id, r1.id);
        assert_eq!(thread.nodes[1].replies[0].author.name, "bob");
        assert_eq!(thread.total_count, 3);
    }

    #[test]
    fn test_replies_oldest_first() {
        let alice = user("alice");
        let post_id = Uuid::new_v4();

        let top = comment(post_id, &alice, None, 0);
        let late = comment(post_id, &alice, Some(top.id), 9);
        let early = comment(post_id, &alice, Some(top.id), 3);

        let thread = assemble_thread(vec![top, late.clone(), early.clone()], &authors(&[&alice]));

        let ids: Vec<Uuid> = thread.nodes[0]
            .replies
            .iter()
            .map(|n| n.comment.id)
            .collect();
        assert_eq!(ids, vec![early.id, late.id]);
    }

    #[test]
    fn test_nested_and_orphan_replies_are_excluded() {
        let alice = user("alice");
        let post_id = Uuid::new_v4();

        let top = comment(post_id, &alice, None, 0);
        let reply = comment(post_id, &alice, Some(top.id), 1);
        let reply_to_reply = comment(post_id, &alice, Some(reply.id), 2);
        let orphan = comment(post_id, &alice, Some(Uuid::new_v4()), 3);

        let thread = assemble_thread(
            vec![top, reply, reply_to_reply, orphan],
            &authors(&[&alice]),
        );

        assert_eq!(thread.nodes.len(), 1);
        assert_eq!(thread.nodes[0].replies.len(), 1);
        assert!(thread.nodes[0].replies[0].replies.is_empty());
        assert_eq!(thread.total_count, 2);
    }

    #[test]
    fn test_edited_flag_and_unknown_author() {
        let ghost = user("ghost");
        let post_id = Uuid::new_v4();

        let mut edited = comment(post_id, &ghost, None, 0);
        edited.edited_at = Some(edited.created_at + Duration::minutes(5));

        let thread = assemble_thread(vec![edited], &HashMap::new());

        assert!(thread.nodes[0].is_edited);
        assert_eq!(thread.nodes[0].author, AuthorSummary::unknown(ghost.id));
    }

    #[test]
    fn test_empty_thread() {
        let thread = assemble_thread(vec![], &HashMap::new());
        assert!(thread.nodes.is_empty());
        assert_eq!(thread.total_count, 0);
    }
}
