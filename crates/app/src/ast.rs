//! Syntax-node model for tolerant SQL trees.
//!
//! Composite variants hold an ordered children vector that covers every
//! source token, trivia included, so concatenating a tree's leaves always
//! reproduces the input. Semantic parts (member parent/child, alias name,
//! subquery statement) are exposed through accessors that skip trivia.

use crate::token::{Pos, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    TokenList,
    MemberIdentifier,
    Aliased,
    ParenList,
    SubQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Leaf(Token),
    /// Generic sequence: the root, one list per statement, and grouped
    /// multi-word keyword phrases.
    TokenList(Vec<Node>),
    /// Dotted reference: `[parent, period, child]`. A missing child is an
    /// empty-identifier leaf, never absent.
    MemberIdentifier(Vec<Node>),
    /// `target AS alias` with the surrounding trivia kept in place.
    Aliased(Vec<Node>),
    /// Parenthesized group, the `(` and any `)` included as leaves.
    ParenList(Vec<Node>),
    /// Parenthesized SELECT: `[lparen, statement, rparen?]`.
    SubQuery(Vec<Node>),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Leaf(_) => NodeKind::Leaf,
            Node::TokenList(_) => NodeKind::TokenList,
            Node::MemberIdentifier(_) => NodeKind::MemberIdentifier,
            Node::Aliased(_) => NodeKind::Aliased,
            Node::ParenList(_) => NodeKind::ParenList,
            Node::SubQuery(_) => NodeKind::SubQuery,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Leaf(_) => &[],
            Node::TokenList(children)
            | Node::MemberIdentifier(children)
            | Node::Aliased(children)
            | Node::ParenList(children)
            | Node::SubQuery(children) => children,
        }
    }

    pub fn leaf_token(&self) -> Option<&Token> {
        match self {
            Node::Leaf(token) => Some(token),
            _ => None,
        }
    }

    pub fn is_trivia(&self) -> bool {
        self.leaf_token().is_some_and(Token::is_trivia)
    }

    /// Flattened source text of this node.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.write_render(&mut out);
        out
    }

    fn write_render(&self, out: &mut String) {
        match self {
            Node::Leaf(token) => out.push_str(&token.text),
            _ => {
                for child in self.children() {
                    child.write_render(out);
                }
            }
        }
    }

    /// Rendered text with runs of whitespace collapsed, for keyword
    /// comparison of grouped phrases.
    pub fn render_normalized(&self) -> String {
        self.render().split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Covering token range, if the node holds any token at all.
    pub fn range(&self) -> Option<(Pos, Pos)> {
        match self {
            Node::Leaf(token) => Some((token.start, token.end)),
            _ => {
                let children = self.children();
                let start = children.iter().find_map(|c| c.range()).map(|(s, _)| s)?;
                let end = children.iter().rev().find_map(|c| c.range()).map(|(_, e)| e)?;
                Some((start, end))
            }
        }
    }

    /// True when the range contains or immediately abuts `pos`. A
    /// zero-width node (the empty member child) matches its own position.
    pub fn contains(&self, pos: Pos) -> bool {
        match self.range() {
            Some((start, end)) if start == end => pos == start,
            Some((start, end)) => start < pos && pos <= end,
            None => false,
        }
    }

    fn significant(&self) -> impl Iterator<Item = &Node> {
        self.children().iter().filter(|c| !c.is_trivia())
    }

    /// Qualifying side of a dotted reference (`city` in `city.ID`).
    pub fn member_parent(&self) -> Option<&Node> {
        match self {
            Node::MemberIdentifier(children) => children.first(),
            _ => None,
        }
    }

    /// Qualified side of a dotted reference; an empty-identifier leaf when
    /// only the dot has been typed.
    pub fn member_child(&self) -> Option<&Node> {
        match self {
            Node::MemberIdentifier(children) => children.get(2),
            _ => None,
        }
    }

    /// Target of an `AS` alias (the node being renamed).
    pub fn alias_target(&self) -> Option<&Node> {
        match self {
            Node::Aliased(_) => self.significant().next(),
            _ => None,
        }
    }

    /// Alias name of an `AS` alias.
    pub fn alias_name(&self) -> Option<&Node> {
        match self {
            Node::Aliased(_) => self.significant().last(),
            _ => None,
        }
    }

    /// Inner statement of a parenthesized SELECT.
    pub fn subquery_statement(&self) -> Option<&Node> {
        match self {
            Node::SubQuery(children) => children
                .iter()
                .find(|c| matches!(c, Node::TokenList(_))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{TokenKind, Tokenizer};

    fn leaf(text: &str) -> Node {
        let tokens = Tokenizer::new().tokenize(text);
        Node::Leaf(tokens.into_iter().next().expect("one token"))
    }

    #[test]
    fn render_concatenates_leaves_in_order() {
        let list = Node::TokenList(vec![leaf("SELECT"), leaf(" "), leaf("ID")]);

        assert_eq!(list.render(), "SELECT ID");
    }

    #[test]
    fn range_spans_first_to_last_leaf() {
        let tokens = Tokenizer::new().tokenize("SELECT ID");
        let list = Node::TokenList(tokens.into_iter().map(Node::Leaf).collect());

        let (start, end) = list.range().expect("range");

        assert_eq!(start, Pos::new(1, 0));
        assert_eq!(end, Pos::new(1, 9));
    }

    #[test]
    fn empty_member_child_contains_its_own_position() {
        let empty = Node::Leaf(Token::empty_identifier(Pos::new(1, 5)));

        assert!(empty.contains(Pos::new(1, 5)));
        assert!(!empty.contains(Pos::new(1, 6)));
    }

    #[test]
    fn alias_accessors_skip_trivia() {
        let aliased = Node::Aliased(vec![leaf("city"), leaf(" "), leaf("AS"), leaf(" "), leaf("c")]);

        assert_eq!(aliased.alias_target().map(Node::render), Some("city".to_string()));
        assert_eq!(aliased.alias_name().map(Node::render), Some("c".to_string()));
    }

    #[test]
    fn trivia_detection_covers_whitespace_and_comments() {
        let tokens = Tokenizer::new().tokenize("-- note\nx");

        let nodes: Vec<Node> = tokens.into_iter().map(Node::Leaf).collect();

        assert!(nodes[0].is_trivia());
        assert!(nodes[1].is_trivia());
        assert!(!nodes[2].is_trivia());
        assert_eq!(nodes[2].leaf_token().map(|t| t.kind.clone()), Some(TokenKind::Identifier("x".into())));
    }
}
