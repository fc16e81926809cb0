//! Declarative predicates over node shape.
//!
//! Matchers are the sole way the classifier inspects the tree: a node
//! matches if it satisfies any configured dimension (variant kind, leaf
//! token tag, or keyword text).

use crate::ast::{Node, NodeKind};
use crate::token::TokenTag;

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeMatcher {
    pub node_kinds: &'static [NodeKind],
    pub token_tags: &'static [TokenTag],
    pub keywords: &'static [&'static str],
}

impl NodeMatcher {
    pub const fn with_node_kinds(node_kinds: &'static [NodeKind]) -> Self {
        Self {
            node_kinds,
            token_tags: &[],
            keywords: &[],
        }
    }

    pub const fn with_token_tags(token_tags: &'static [TokenTag]) -> Self {
        Self {
            node_kinds: &[],
            token_tags,
            keywords: &[],
        }
    }

    pub const fn with_keywords(keywords: &'static [&'static str]) -> Self {
        Self {
            node_kinds: &[],
            token_tags: &[],
            keywords,
        }
    }

    pub fn test(&self, node: &Node) -> bool {
        if !self.node_kinds.is_empty() && self.node_kinds.contains(&node.kind()) {
            return true;
        }
        if !self.token_tags.is_empty()
            && let Some(token) = node.leaf_token()
            && self.token_tags.contains(&token.tag())
        {
            return true;
        }
        if !self.keywords.is_empty()
            && let Some(text) = keyword_phrase_text(node)
        {
            return self
                .keywords
                .iter()
                .any(|kw| text.eq_ignore_ascii_case(kw));
        }
        false
    }
}

/// Logical keyword text of a node: a keyword leaf, or a grouped phrase
/// whose significant children are all keyword leaves. Identifier leaves
/// never match, even when their text spells a keyword.
pub(crate) fn keyword_phrase_text(node: &Node) -> Option<String> {
    match node {
        Node::Leaf(token) => token.keyword_text().map(str::to_string),
        Node::TokenList(children) => {
            let significant: Vec<&Node> = children.iter().filter(|c| !c.is_trivia()).collect();
            if significant.is_empty()
                || !significant
                    .iter()
                    .all(|c| c.leaf_token().is_some_and(|t| t.keyword_text().is_some()))
            {
                return None;
            }
            Some(node.render_normalized())
        }
        _ => None,
    }
}
