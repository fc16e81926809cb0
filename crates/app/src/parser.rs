//! Grouping parser for tolerant SQL trees.
//!
//! The token stream is folded into structure by greedy left-to-right
//! passes, one concern each, no backtracking: parenthesis groups (a group
//! opening with SELECT becomes a subquery), statement splits on top-level
//! semicolons, multi-word keyword phrases, dotted member chains, and `AS`
//! aliases. An incomplete trailing construct still yields a tree covering
//! everything parsed so far; no placeholder tokens are synthesized.

use std::collections::VecDeque;

use crate::ast::{Node, NodeKind};
use crate::error::ParseError;
use crate::token::{Token, TokenKind, TokenTag, Tokenizer};

/// Phrases grouped into a single logical keyword node.
const MULTI_KEYWORDS: &[&[&str]] = &[
    &["ALTER", "TABLE"],
    &["CHANGE", "MASTER", "TO"],
    &["CHARACTER", "SET"],
    &["DELETE", "FROM"],
    &["FOREIGN", "KEY"],
    &["GROUP", "BY"],
    &["INSERT", "INTO"],
    &["ORDER", "BY"],
    &["PRIMARY", "KEY"],
];

pub fn parse(text: &str) -> Result<Node, ParseError> {
    let tokens = Tokenizer::new().tokenize(text);
    let leaves: Vec<Node> = tokens.into_iter().map(Node::Leaf).collect();
    let nodes = group_parenthesis(leaves);
    let statements = group_statements(nodes);
    let root = group_lists(Node::TokenList(statements));

    let rendered = root.render();
    if rendered != text {
        return Err(ParseError::Coverage {
            source_len: text.chars().count(),
            rendered: rendered.chars().count(),
        });
    }
    Ok(root)
}

fn tag_of(node: &Node) -> Option<TokenTag> {
    node.leaf_token().map(Token::tag)
}

fn keyword_of(node: &Node) -> Option<&str> {
    node.leaf_token().and_then(Token::keyword_text)
}

fn group_parenthesis(nodes: Vec<Node>) -> Vec<Node> {
    let mut iter = nodes.into_iter();
    let mut out = Vec::new();
    while let Some(node) = iter.next() {
        if tag_of(&node) == Some(TokenTag::LParen) {
            out.push(collect_paren(node, &mut iter));
        } else {
            out.push(node);
        }
    }
    out
}

/// Collects up to the matching close paren, or to the end of the list for
/// a group still being typed.
fn collect_paren(open: Node, iter: &mut impl Iterator<Item = Node>) -> Node {
    let mut inner: Vec<Node> = Vec::new();
    let mut close = None;
    while let Some(node) = iter.next() {
        match tag_of(&node) {
            Some(TokenTag::LParen) => inner.push(collect_paren(node, iter)),
            Some(TokenTag::RParen) => {
                close = Some(node);
                break;
            }
            _ => inner.push(node),
        }
    }

    let leads_with_select = inner
        .iter()
        .find(|n| !n.is_trivia())
        .and_then(keyword_of)
        == Some("SELECT");
    if leads_with_select {
        let mut children = vec![open, Node::TokenList(inner)];
        children.extend(close);
        Node::SubQuery(children)
    } else {
        let mut children = vec![open];
        children.extend(inner);
        children.extend(close);
        Node::ParenList(children)
    }
}

fn group_statements(nodes: Vec<Node>) -> Vec<Node> {
    let mut statements = Vec::new();
    let mut current = Vec::new();
    for node in nodes {
        let terminator = tag_of(&node) == Some(TokenTag::Semicolon);
        current.push(node);
        if terminator {
            statements.push(Node::TokenList(std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        statements.push(Node::TokenList(current));
    }
    statements
}

/// Applies the intra-list grouping passes to every sequence context.
fn group_lists(node: Node) -> Node {
    match node {
        Node::Leaf(_) | Node::MemberIdentifier(_) | Node::Aliased(_) => node,
        Node::TokenList(children) => Node::TokenList(group_sequence(children)),
        Node::ParenList(children) => Node::ParenList(group_sequence(children)),
        Node::SubQuery(children) => {
            Node::SubQuery(children.into_iter().map(group_lists).collect())
        }
    }
}

fn group_sequence(children: Vec<Node>) -> Vec<Node> {
    let children: Vec<Node> = children.into_iter().map(group_lists).collect();
    let children = group_multi_keyword(children);
    let children = group_member_identifier(children);
    group_aliased(children)
}

fn group_multi_keyword(children: Vec<Node>) -> Vec<Node> {
    let mut rest = VecDeque::from(children);
    let mut out = Vec::new();
    while let Some(node) = rest.pop_front() {
        let Some(first) = keyword_of(&node).map(str::to_string) else {
            out.push(node);
            continue;
        };
        let Some(words) = MULTI_KEYWORDS
            .iter()
            .find(|words| words[0] == first && phrase_follows(&rest, &words[1..]))
        else {
            out.push(node);
            continue;
        };

        let mut phrase = vec![node];
        let mut matched = 1;
        while matched < words.len() {
            let next = rest.pop_front().expect("phrase_follows checked availability");
            if !next.is_trivia() {
                matched += 1;
            }
            phrase.push(next);
        }
        out.push(Node::TokenList(phrase));
    }
    out
}

fn phrase_follows(rest: &VecDeque<Node>, words: &[&str]) -> bool {
    let mut idx = 0;
    for word in words {
        loop {
            match rest.get(idx) {
                Some(node) if node.is_trivia() => idx += 1,
                Some(node) => {
                    if keyword_of(node) != Some(*word) {
                        return false;
                    }
                    idx += 1;
                    break;
                }
                None => return false,
            }
        }
    }
    true
}

fn group_member_identifier(children: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    let mut iter = children.into_iter().peekable();
    while let Some(node) = iter.next() {
        let dotted = tag_of(&node) == Some(TokenTag::Period)
            && out
                .last()
                .is_some_and(|prev| is_member_parent(prev) && adjacent(prev, &node));
        if !dotted {
            out.push(node);
            continue;
        }

        let parent = out.pop().expect("checked above");
        let child = if iter
            .peek()
            .is_some_and(|next| is_member_child(next) && adjacent(&node, next))
        {
            iter.next().expect("peeked")
        } else {
            let after_dot = node.range().map(|(_, end)| end).expect("period has a range");
            Node::Leaf(Token::empty_identifier(after_dot))
        };
        out.push(Node::MemberIdentifier(vec![parent, node, child]));
    }
    out
}

fn is_member_parent(node: &Node) -> bool {
    node.kind() == NodeKind::MemberIdentifier
        || node
            .leaf_token()
            .is_some_and(|t| matches!(t.kind, TokenKind::Identifier(_)))
}

fn is_member_child(node: &Node) -> bool {
    node.leaf_token().is_some_and(|t| {
        matches!(t.kind, TokenKind::Identifier(_))
            || matches!(&t.kind, TokenKind::Operator(op) if op == "*")
    })
}

fn adjacent(left: &Node, right: &Node) -> bool {
    match (left.range(), right.range()) {
        (Some((_, left_end)), Some((right_start, _))) => left_end == right_start,
        _ => false,
    }
}

fn group_aliased(children: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::new();
    let mut iter = children.into_iter().peekable();
    while let Some(node) = iter.next() {
        if keyword_of(&node) != Some("AS") {
            out.push(node);
            continue;
        }

        // Pull the alias target back out, keeping its trailing trivia.
        let mut trailing: Vec<Node> = Vec::new();
        while out.last().is_some_and(Node::is_trivia) {
            trailing.push(out.pop().expect("checked above"));
        }
        trailing.reverse();

        if out.last().is_some_and(is_alias_target) {
            let mut forward: Vec<Node> = Vec::new();
            while iter.peek().is_some_and(Node::is_trivia) {
                forward.push(iter.next().expect("peeked"));
            }
            if iter.peek().is_some_and(is_alias_name) {
                let target = out.pop().expect("checked above");
                let alias = iter.next().expect("peeked");
                let mut grouped = vec![target];
                grouped.extend(trailing);
                grouped.push(node);
                grouped.extend(forward);
                grouped.push(alias);
                out.push(Node::Aliased(grouped));
                continue;
            }
            // Alias not typed yet: leave everything ungrouped.
            out.extend(trailing);
            out.push(node);
            out.extend(forward);
            continue;
        }

        out.extend(trailing);
        out.push(node);
    }
    out
}

fn is_alias_target(node: &Node) -> bool {
    matches!(
        node.kind(),
        NodeKind::MemberIdentifier | NodeKind::ParenList | NodeKind::SubQuery
    ) || node.leaf_token().is_some_and(|t| {
        matches!(
            t.kind,
            TokenKind::Identifier(_) | TokenKind::Number | TokenKind::StringLiteral
        )
    })
}

fn is_alias_name(node: &Node) -> bool {
    node.leaf_token()
        .is_some_and(|t| matches!(t.kind, TokenKind::Identifier(_)))
}
