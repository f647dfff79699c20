//! Parent/child view of a post's flat comment list.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::models::Comment;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// This comment plus every nested reply
    pub fn size(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::size).sum::<usize>()
    }
}

/// Group comments under their parents, keeping server order at each level.
///
/// A reply whose parent is not in the list is promoted to the top level.
pub fn build_comment_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let present: HashSet<i64> = comments.iter().map(|c| c.id).collect();
    let mut children: HashMap<i64, Vec<&Comment>> = HashMap::new();
    let mut roots = Vec::new();

    for comment in comments {
        match comment.parent_id {
            Some(parent) if parent != comment.id && present.contains(&parent) => {
                children.entry(parent).or_default().push(comment)
            }
            _ => roots.push(comment),
        }
    }

    let mut placed = HashSet::new();
    let mut tree: Vec<CommentNode> = roots
        .into_iter()
        .map(|c| attach(c, &children, &mut placed))
        .collect();

    // Parent chains that loop back on themselves never reach a root
    for comment in comments {
        if !placed.contains(&comment.id) {
            tree.push(attach(comment, &children, &mut placed));
        }
    }

    tree
}

fn attach(
    comment: &Comment,
    children: &HashMap<i64, Vec<&Comment>>,
    placed: &mut HashSet<i64>,
) -> CommentNode {
    placed.insert(comment.id);
    let mut replies = Vec::new();
    for kid in children.get(&comment.id).into_iter().flatten() {
        if !placed.contains(&kid.id) {
            replies.push(attach(kid, children, placed));
        }
    }

    CommentNode {
        comment: comment.clone(),
        replies,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn comment(id: i64, parent_id: Option<i64>) -> Comment {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Comment {
            id,
            post_id: 1,
            author_id: 1,
            author_nickname: Some("Alice".into()),
            content: format!("comment {}", id),
            created_at: at,
            updated_at: at,
            parent_id,
        }
    }

    fn shape(nodes: &[CommentNode]) -> Vec<(i64, Vec<i64>)> {
        nodes
            .iter()
            .map(|n| (n.comment.id, n.replies.iter().map(|r| r.comment.id).collect()))
            .collect()
    }

    #[test]
    fn test_replies_nest_in_server_order() {
        let comments = vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, None),
            comment(4, Some(1)),
            comment(5, Some(3)),
        ];
        let tree = build_comment_tree(&comments);
        assert_eq!(shape(&tree), vec![(1, vec![2, 4]), (3, vec![5])]);
        assert_eq!(tree.iter().map(CommentNode::size).sum::<usize>(), 5);
    }

    #[test]
    fn test_orphan_is_promoted() {
        let comments = vec![comment(1, None), comment(2, Some(42)), comment(3, Some(1))];
        let tree = build_comment_tree(&comments);
        assert_eq!(shape(&tree), vec![(1, vec![3]), (2, vec![])]);
    }

    #[test]
    fn test_nested_replies() {
        let comments = vec![comment(1, None), comment(2, Some(1)), comment(3, Some(2))];
        let tree = build_comment_tree(&comments);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].replies[0].replies[0].comment.id, 3);
    }

    #[test]
    fn test_cycle_does_not_lose_comments() {
        let comments = vec![comment(1, Some(2)), comment(2, Some(1)), comment(3, Some(3))];
        let tree = build_comment_tree(&comments);
        let total: usize = tree.iter().map(CommentNode::size).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_empty() {
        assert!(build_comment_tree(&[]).is_empty());
    }
}
