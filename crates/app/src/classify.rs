//! Context classification: maps the cursor's syntactic neighborhood to the
//! set of expected completion categories plus an optional qualifying scope.
//!
//! A fixed-priority cascade keyed off the clause-introducing keyword
//! nearest the cursor; first match wins. Rule order matters because several
//! keyword sets can be simultaneously nearby in nested constructs, and the
//! earlier rules are strictly more specific.

use naviql_domain::CompletionKind;

use crate::ast::{Node, NodeKind};
use crate::matcher::NodeMatcher;
use crate::token::TokenTag;
use crate::walker::NodeWalker;

/// Qualifying entity that narrows column completion after a dotted prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentScope {
    None,
    Schema(String),
    Table(String),
    SubQuery(String),
}

const MEMBER_IDENTIFIER: NodeMatcher = NodeMatcher::with_node_kinds(&[NodeKind::MemberIdentifier]);
const LPAREN: NodeMatcher = NodeMatcher::with_token_tags(&[TokenTag::LParen]);

const GROUPING_KEYWORDS: NodeMatcher =
    NodeMatcher::with_keywords(&["SET", "ORDER BY", "GROUP BY", "DISTINCT"]);
const PREDICATE_KEYWORDS: NodeMatcher =
    NodeMatcher::with_keywords(&["SELECT", "WHERE", "HAVING", "ON"]);
const TABLE_KEYWORDS: NodeMatcher = NodeMatcher::with_keywords(&[
    "JOIN",
    "COPY",
    "FROM",
    "DELETE FROM",
    "UPDATE",
    "INSERT INTO",
    "DESCRIBE",
    "TRUNCATE",
    "DESC",
    "EXPLAIN",
    "AND",
    "OR",
    "XOR",
]);

pub fn classify(walker: &NodeWalker) -> (Vec<CompletionKind>, ParentScope) {
    use CompletionKind::*;

    if walker.previous_nodes_is(true, &[GROUPING_KEYWORDS]) {
        if let Some(scope) = member_scope(walker) {
            return (vec![Column, SubQueryColumn, View, Function], scope);
        }
        return (
            vec![
                Column,
                Table,
                SubQueryColumn,
                SubQueryView,
                Alias,
                View,
                Function,
                Keyword,
            ],
            ParentScope::None,
        );
    }

    if walker.previous_nodes_is(true, &[PREDICATE_KEYWORDS]) {
        if let Some(scope) = member_scope(walker) {
            return (vec![Column, View, SubQueryColumn, Function], scope);
        }
        return (
            vec![
                Column,
                Table,
                Alias,
                View,
                SubQueryColumn,
                SubQueryView,
                Function,
                Keyword,
            ],
            ParentScope::None,
        );
    }

    if walker.previous_nodes_is(true, &[TABLE_KEYWORDS]) {
        return (
            vec![
                Column,
                Table,
                View,
                SubQueryColumn,
                SubQueryView,
                Function,
                Keyword,
            ],
            ParentScope::None,
        );
    }

    // Inside an insert/column list.
    if walker.cur_node_is(&LPAREN) || walker.previous_nodes_is(true, &[LPAREN]) {
        return (vec![Column, Table, View], ParentScope::None);
    }

    (vec![Keyword], ParentScope::None)
}

/// Scope from the member identifier under the cursor, when there is one.
fn member_scope(walker: &NodeWalker) -> Option<ParentScope> {
    if !walker.cur_node_is(&MEMBER_IDENTIFIER) {
        return None;
    }
    let member = walker.cur_node_top_matched(&MEMBER_IDENTIFIER)?;
    let parent = member.member_parent().map(Node::render)?;
    Some(ParentScope::Table(parent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::token::Pos;

    fn classify_at(text: &str, col: usize) -> (Vec<CompletionKind>, ParentScope) {
        let root = parse(text).expect("parse");
        let walker = NodeWalker::new(&root, Pos::new(1, col));
        classify(&walker)
    }

    #[test]
    fn blank_select_offers_the_full_projection_set() {
        let (kinds, scope) = classify_at("SELECT  FROM city", 7);

        use CompletionKind::*;
        for kind in [Column, Table, Alias, View, SubQueryColumn, SubQueryView, Function, Keyword] {
            assert!(kinds.contains(&kind), "missing {kind:?}");
        }
        assert_eq!(scope, ParentScope::None);
    }

    #[test]
    fn dotted_prefix_scopes_to_the_parent_table() {
        let (kinds, scope) = classify_at("SELECT city. FROM city", 12);

        use CompletionKind::*;
        assert_eq!(kinds, vec![Column, View, SubQueryColumn, Function]);
        assert_eq!(scope, ParentScope::Table("city".to_string()));
    }

    #[test]
    fn order_by_wins_over_the_select_rule() {
        let (kinds, scope) = classify_at("SELECT * FROM t ORDER BY ", 25);

        use CompletionKind::*;
        assert_eq!(
            kinds,
            vec![Column, Table, SubQueryColumn, SubQueryView, Alias, View, Function, Keyword]
        );
        assert_eq!(scope, ParentScope::None);
    }

    #[test]
    fn update_set_scopes_members_to_their_table() {
        let (kinds, scope) = classify_at("UPDATE city SET city.", 21);

        use CompletionKind::*;
        assert_eq!(kinds, vec![Column, SubQueryColumn, View, Function]);
        assert_eq!(scope, ParentScope::Table("city".to_string()));
    }

    #[test]
    fn bare_delete_from_uses_the_table_rule() {
        let (kinds, scope) = classify_at("DELETE FROM ", 12);

        use CompletionKind::*;
        assert_eq!(
            kinds,
            vec![Column, Table, View, SubQueryColumn, SubQueryView, Function, Keyword]
        );
        assert_eq!(scope, ParentScope::None);
    }

    #[test]
    fn insert_column_list_offers_columns_and_tables() {
        let (kinds, scope) = classify_at("INSERT INTO city (ID, Na", 24);

        use CompletionKind::*;
        assert_eq!(kinds, vec![Column, Table, View]);
        assert_eq!(scope, ParentScope::None);
    }

    #[test]
    fn empty_context_falls_back_to_keywords() {
        let (kinds, scope) = classify_at("se", 2);

        assert_eq!(kinds, vec![CompletionKind::Keyword]);
        assert_eq!(scope, ParentScope::None);
    }

    #[test]
    fn identical_input_classifies_identically() {
        let first = classify_at("SELECT * FROM city WHERE ", 25);
        let second = classify_at("SELECT * FROM city WHERE ", 25);

        assert_eq!(first, second);
    }
}
