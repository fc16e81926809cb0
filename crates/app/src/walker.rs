//! Cursor-aware tree walking.
//!
//! The walker locates the deepest node whose token range contains or
//! immediately abuts the cursor and can enumerate the significant nodes
//! preceding the cursor, which is how the classifier finds the nearest
//! clause-introducing keyword.

use crate::ast::{Node, NodeKind};
use crate::matcher::NodeMatcher;
use crate::token::Pos;

pub struct NodeWalker<'a> {
    path: Vec<&'a Node>,
    pos: Pos,
}

impl<'a> NodeWalker<'a> {
    pub fn new(root: &'a Node, pos: Pos) -> Self {
        let mut path = vec![root];
        let mut current = root;
        while let Some(child) = current.children().iter().filter(|c| c.contains(pos)).last() {
            path.push(child);
            current = child;
        }
        Self { path, pos }
    }

    pub fn cur_node(&self) -> &'a Node {
        self.path.last().copied().expect("path holds at least the root")
    }

    /// True if any node on the root-to-cursor path satisfies the matcher.
    pub fn cur_node_is(&self, matcher: &NodeMatcher) -> bool {
        self.path.iter().any(|node| matcher.test(node))
    }

    /// The matching node closest to the root, recovering e.g. the whole
    /// member identifier when the cursor sits inside its child.
    pub fn cur_node_top_matched(&self, matcher: &NodeMatcher) -> Option<&'a Node> {
        self.path.iter().copied().find(|node| matcher.test(node))
    }

    /// Nodes preceding the cursor branch inside the innermost enclosing
    /// sequence node, in source order.
    pub fn prev_nodes(&self, skip_trivia: bool) -> Vec<&'a Node> {
        for (depth, node) in self.path.iter().enumerate().rev() {
            if !is_sequence(node) {
                continue;
            }
            let preceding: Vec<&'a Node> = match self.path.get(depth + 1) {
                Some(branch) => node
                    .children()
                    .iter()
                    .take_while(|child| !std::ptr::eq(*child, *branch))
                    .collect(),
                // The sequence itself is the cursor node: everything that
                // ends at or before the cursor precedes it.
                None => node
                    .children()
                    .iter()
                    .filter(|child| child.range().is_some_and(|(_, end)| end <= self.pos))
                    .collect(),
            };
            return if skip_trivia {
                preceding.into_iter().filter(|n| !n.is_trivia()).collect()
            } else {
                preceding
            };
        }
        Vec::new()
    }

    /// Tests whether the matcher sequence matches a contiguous run of the
    /// preceding significant nodes, matched back-to-front.
    pub fn previous_nodes_is(&self, skip_trivia: bool, matchers: &[NodeMatcher]) -> bool {
        if matchers.is_empty() {
            return false;
        }
        let nodes = self.prev_nodes(skip_trivia);
        if nodes.len() < matchers.len() {
            return false;
        }
        nodes
            .windows(matchers.len())
            .any(|window| window.iter().zip(matchers).all(|(node, m)| m.test(node)))
    }
}

fn is_sequence(node: &Node) -> bool {
    matches!(
        node.kind(),
        NodeKind::TokenList | NodeKind::ParenList | NodeKind::SubQuery
    )
}
