//! Statement-scoped extraction of table references and subquery views.
//!
//! Both passes cover the whole statement enclosing the cursor (not just
//! the text before it) and tolerate statements still being typed by
//! returning partial results. Sibling statements never leak in.

use crate::ast::{Node, NodeKind};
use crate::matcher::keyword_phrase_text;
use crate::token::{Pos, TokenKind};

/// Table reference visible in the cursor's statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub alias: Option<String>,
}

/// Derived table introduced by `(SELECT ...) AS name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubQueryInfo {
    pub name: String,
    pub columns: Vec<String>,
}

/// Keywords that introduce a table reference.
const TABLE_TRIGGERS: &[&str] = &["FROM", "JOIN", "UPDATE", "INSERT INTO", "DELETE FROM"];

/// Collects the table references visible in the statement scope enclosing
/// `pos`. When the cursor sits inside a subquery, that subquery's inner
/// statement is the scope.
pub fn extract_tables(root: &Node, pos: Pos) -> Vec<TableInfo> {
    let scope = statement_scope(root, pos);
    let mut out = Vec::new();
    collect_tables(scope, &mut out);
    out
}

/// Collects every `(SELECT ...) AS name` view reachable from the cursor's
/// statement, with the column names its projection list produces.
pub fn extract_subqueries(root: &Node, pos: Pos) -> Vec<SubQueryInfo> {
    let statement = statement_at(root, pos);
    let mut out = Vec::new();
    collect_subqueries(statement, &mut out);
    out
}

fn statement_at<'a>(root: &'a Node, pos: Pos) -> &'a Node {
    root.children()
        .iter()
        .find(|stmt| stmt.contains(pos))
        .or_else(|| root.children().last())
        .unwrap_or(root)
}

fn statement_scope<'a>(root: &'a Node, pos: Pos) -> &'a Node {
    let statement = statement_at(root, pos);
    let mut scope = statement;
    let mut current = statement;
    while let Some(child) = current.children().iter().filter(|c| c.contains(pos)).last() {
        if current.kind() == NodeKind::SubQuery && child.kind() == NodeKind::TokenList {
            scope = child;
        }
        current = child;
    }
    scope
}

fn collect_tables(scope: &Node, out: &mut Vec<TableInfo>) {
    let significant: Vec<&Node> = scope.children().iter().filter(|c| !c.is_trivia()).collect();
    let mut i = 0;
    while i < significant.len() {
        let Some(trigger) = keyword_phrase_text(significant[i]) else {
            i += 1;
            continue;
        };
        let trigger = trigger.to_uppercase();
        if !TABLE_TRIGGERS.contains(&trigger.as_str()) {
            i += 1;
            continue;
        }

        // Only FROM introduces a comma-separated reference list.
        let comma_list = trigger == "FROM";
        i += 1;
        loop {
            let Some(consumed) = read_reference(&significant, &mut i) else {
                break;
            };
            if let Some(info) = consumed {
                out.push(info);
            }
            if comma_list && significant.get(i).is_some_and(|n| is_comma(n)) {
                i += 1;
            } else {
                break;
            }
        }
    }
}

/// Reads one table reference at `i`. `None` means the list ended;
/// `Some(None)` means a non-table construct (a subquery) was consumed.
fn read_reference(nodes: &[&Node], i: &mut usize) -> Option<Option<TableInfo>> {
    let node = *nodes.get(*i)?;
    match node.kind() {
        NodeKind::Aliased => {
            *i += 1;
            let info = node
                .alias_target()
                .and_then(reference_name)
                .map(|name| TableInfo {
                    name,
                    alias: node.alias_name().map(Node::render),
                });
            Some(info)
        }
        NodeKind::SubQuery => {
            *i += 1;
            Some(None)
        }
        NodeKind::MemberIdentifier | NodeKind::Leaf => {
            let name = reference_name(node)?;
            *i += 1;
            let alias = match nodes.get(*i) {
                Some(next) if is_bare_alias(next) => {
                    *i += 1;
                    Some(next.render())
                }
                _ => None,
            };
            Some(Some(TableInfo { name, alias }))
        }
        _ => None,
    }
}

/// Table name of a reference node: a plain identifier, or the table part
/// of a `schema.table` member.
fn reference_name(node: &Node) -> Option<String> {
    match node.kind() {
        NodeKind::Leaf => {
            let token = node.leaf_token()?;
            match &token.kind {
                TokenKind::Identifier(_) if !token.text.is_empty() => Some(token.text.clone()),
                _ => None,
            }
        }
        NodeKind::MemberIdentifier => {
            let name = node.member_child()?.render();
            (!name.is_empty() && name != "*").then_some(name)
        }
        _ => None,
    }
}

fn is_bare_alias(node: &Node) -> bool {
    node.leaf_token()
        .is_some_and(|t| matches!(t.kind, TokenKind::Identifier(_)))
}

fn is_comma(node: &Node) -> bool {
    node.leaf_token()
        .is_some_and(|t| t.kind == TokenKind::Punctuation(','))
}

fn collect_subqueries(node: &Node, out: &mut Vec<SubQueryInfo>) {
    if node.kind() == NodeKind::Aliased
        && let Some(target) = node.alias_target()
        && target.kind() == NodeKind::SubQuery
        && let Some(name) = node.alias_name().map(Node::render)
        && let Some(inner) = target.subquery_statement()
    {
        out.push(SubQueryInfo {
            name,
            columns: projection_columns(inner),
        });
    }
    for child in node.children() {
        collect_subqueries(child, out);
    }
}

/// Output column names of a SELECT projection list. Expression aliases
/// take priority over raw column names; starred and unnamed expressions
/// contribute nothing.
fn projection_columns(statement: &Node) -> Vec<String> {
    let significant: Vec<&Node> = statement
        .children()
        .iter()
        .filter(|c| !c.is_trivia())
        .collect();
    let Some(select_idx) = significant
        .iter()
        .position(|n| keyword_phrase_text(n).is_some_and(|kw| kw.eq_ignore_ascii_case("SELECT")))
    else {
        return Vec::new();
    };
    let end = significant
        .iter()
        .position(|n| keyword_phrase_text(n).is_some_and(|kw| kw.eq_ignore_ascii_case("FROM")))
        .unwrap_or(significant.len());
    if end <= select_idx {
        return Vec::new();
    }

    let mut columns = Vec::new();
    for group in significant[select_idx + 1..end].split(|n| is_comma(n)) {
        // Drop modifiers like DISTINCT before looking at the expression.
        let group: Vec<&Node> = group
            .iter()
            .copied()
            .filter(|n| keyword_phrase_text(n).is_none())
            .collect();
        if let Some(aliased) = group.iter().find(|n| n.kind() == NodeKind::Aliased) {
            if let Some(alias) = aliased.alias_name() {
                columns.push(alias.render());
            }
            continue;
        }
        let [single] = group.as_slice() else { continue };
        match single.kind() {
            NodeKind::MemberIdentifier => {
                if let Some(name) = reference_name(single) {
                    columns.push(name);
                }
            }
            NodeKind::Leaf => {
                if let Some(name) = reference_name(single) {
                    columns.push(name);
                }
            }
            _ => {}
        }
    }
    columns
}
