//! Completion entry point: combines classification, extraction, and the
//! schema catalog into a prefix-filtered candidate list.

use tokio_util::sync::CancellationToken;

use naviql_domain::{CatalogSnapshot, CompletionItem, CompletionKind};

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::classify::{ParentScope, classify};
use crate::error::CompleteError;
use crate::extract::{SubQueryInfo, TableInfo, extract_subqueries, extract_tables};
use crate::parser::parse;
use crate::ports::{CatalogError, CatalogProvider};
use crate::token::Pos;
use crate::walker::NodeWalker;

/// Keyword candidate labels, alphabetized, multi-word phrases included.
pub static KEYWORDS: &[&str] = &[
    "ACCESS", "ADD", "ALL", "ALTER TABLE", "AND", "ANY", "AS",
    "ASC", "AUTO_INCREMENT", "BEFORE", "BEGIN", "BETWEEN",
    "BIGINT", "BINARY", "BY", "CASE", "CHANGE MASTER TO", "CHAR",
    "CHARACTER SET", "CHECK", "COLLATE", "COLUMN", "COMMENT",
    "COMMIT", "CONSTRAINT", "CREATE", "CURRENT",
    "CURRENT_TIMESTAMP", "DATABASE", "DATE", "DECIMAL", "DEFAULT",
    "DELETE FROM", "DESC", "DESCRIBE", "DROP",
    "ELSE", "END", "ENGINE", "ESCAPE", "EXISTS", "FILE", "FLOAT",
    "FOR", "FOREIGN KEY", "FORMAT", "FROM", "FULL", "FUNCTION",
    "GRANT", "GROUP BY", "HAVING", "HOST", "IDENTIFIED", "IN",
    "INCREMENT", "INDEX", "INSERT INTO", "INT", "INTEGER",
    "INTERVAL", "INTO", "IS", "JOIN", "KEY", "LEFT", "LEVEL",
    "LIKE", "LIMIT", "LOCK", "LOGS", "LONG", "MASTER",
    "MEDIUMINT", "MODE", "MODIFY", "NOT", "NULL", "NUMBER",
    "OFFSET", "ON", "OPTION", "OR", "ORDER BY", "OUTER", "OWNER",
    "PASSWORD", "PORT", "PRIMARY", "PRIVILEGES", "PROCESSLIST",
    "PURGE", "REFERENCES", "REGEXP", "RENAME", "REPAIR", "RESET",
    "REVOKE", "RIGHT", "ROLLBACK", "ROW", "ROWS", "ROW_FORMAT",
    "SAVEPOINT", "SELECT", "SESSION", "SET", "SHARE", "SHOW",
    "SLAVE", "SMALLINT", "START", "STOP", "TABLE",
    "THEN", "TINYINT", "TO", "TRANSACTION", "TRIGGER", "TRUNCATE",
    "UNION", "UNIQUE", "UNSIGNED", "UPDATE", "USE", "USER",
    "USING", "VALUES", "VARCHAR", "VIEW", "WHEN", "WHERE", "WITH",
];

const COLUMN_DETAIL: &str = "Column";
const TABLE_DETAIL: &str = "Table";
const ALIAS_DETAIL: &str = "Alias";
const SUBQUERY_DETAIL: &str = "Sub Query";
const KEYWORD_DETAIL: &str = "Keyword";

/// Cursor position as supplied by the protocol layer: 0-based line,
/// 0-based character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionPosition {
    pub line: usize,
    pub character: usize,
}

impl CompletionPosition {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }

    /// The tree's coordinate convention uses 1-based lines.
    fn to_pos(self) -> Pos {
        Pos::new(self.line + 1, self.character)
    }
}

pub struct Completer {
    catalog: CatalogSnapshot,
}

impl Completer {
    pub fn new() -> Self {
        Self {
            catalog: CatalogSnapshot::new(),
        }
    }

    pub fn with_catalog(catalog: CatalogSnapshot) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    /// Replaces the catalog snapshot from the provider. All-or-nothing:
    /// results are staged locally and committed only on full success, and
    /// the provider is closed even when a fetch step fails.
    pub async fn refresh(&mut self, provider: &dyn CatalogProvider) -> Result<(), CatalogError> {
        provider.open().await?;
        let staged = Self::fetch_snapshot(provider).await;
        let closed = provider.close().await;
        let staged = staged?;
        closed?;

        #[cfg(feature = "tracing")]
        debug!(tables = staged.sorted_tables().len(), "catalog refreshed");

        self.catalog = staged;
        Ok(())
    }

    async fn fetch_snapshot(provider: &dyn CatalogProvider) -> Result<CatalogSnapshot, CatalogError> {
        let databases = provider.databases().await?;
        let tables = provider.tables().await?;
        let mut columns = Vec::with_capacity(tables.len());
        for table in &tables {
            let descs = provider.describe_table(table).await?;
            columns.push((table.clone(), descs));
        }
        Ok(CatalogSnapshot::from_parts(databases, tables, columns))
    }

    /// Candidates valid at the given cursor position, prefix-filtered
    /// against the word being typed.
    pub fn complete(
        &self,
        text: &str,
        position: CompletionPosition,
    ) -> Result<Vec<CompletionItem>, CompleteError> {
        self.complete_at(text, position, None)
    }

    /// Like [`complete`](Self::complete), honoring a cancellation token
    /// before and after the parse.
    pub fn complete_with_cancel(
        &self,
        text: &str,
        position: CompletionPosition,
        cancel: &CancellationToken,
    ) -> Result<Vec<CompletionItem>, CompleteError> {
        self.complete_at(text, position, Some(cancel))
    }

    fn complete_at(
        &self,
        text: &str,
        position: CompletionPosition,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<CompletionItem>, CompleteError> {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(CompleteError::Cancelled);
        }
        let parsed = parse(text)?;
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return Err(CompleteError::Cancelled);
        }

        let pos = position.to_pos();
        let walker = NodeWalker::new(&parsed, pos);
        let (kinds, scope) = classify(&walker);

        #[cfg(feature = "tracing")]
        debug!(?kinds, ?scope, "classified completion context");

        let tables = extract_tables(&parsed, pos);
        let subqueries = extract_subqueries(&parsed, pos);

        let mut items = Vec::new();
        if kinds.contains(&CompletionKind::Column) {
            items.extend(self.column_candidates(&tables, &scope));
        }
        if kinds.contains(&CompletionKind::Alias) {
            items.extend(alias_candidates(&tables));
        }
        if kinds.contains(&CompletionKind::Table) {
            items.extend(self.table_candidates());
        }
        if kinds.contains(&CompletionKind::SubQueryColumn) {
            items.extend(subquery_column_candidates(&subqueries));
        }
        if kinds.contains(&CompletionKind::Keyword) {
            items.extend(keyword_candidates());
        }

        let last_word = last_word_at(text, position.line, position.character);
        Ok(filter_candidates(items, &last_word))
    }

    fn column_candidates(&self, tables: &[TableInfo], scope: &ParentScope) -> Vec<CompletionItem> {
        let mut candidates = Vec::new();
        let mut push_columns = |table_name: &str| {
            let Some(columns) = self.catalog.column_descs(table_name) else {
                return;
            };
            for column in columns {
                candidates.push(CompletionItem::new(
                    column.name.clone(),
                    CompletionKind::Column,
                    COLUMN_DETAIL,
                ));
            }
        };

        match scope {
            ParentScope::None => {
                for info in tables {
                    if info.name.is_empty() {
                        continue;
                    }
                    push_columns(&info.name);
                }
            }
            ParentScope::Table(parent) => {
                for info in tables {
                    let name_matches = info.name.eq_ignore_ascii_case(parent);
                    let alias_matches = info
                        .alias
                        .as_deref()
                        .is_some_and(|alias| alias.eq_ignore_ascii_case(parent));
                    if name_matches || alias_matches {
                        push_columns(&info.name);
                    }
                }
            }
            ParentScope::Schema(_) | ParentScope::SubQuery(_) => {}
        }
        candidates
    }

    fn table_candidates(&self) -> Vec<CompletionItem> {
        self.catalog
            .sorted_tables()
            .into_iter()
            .map(|table| CompletionItem::new(table, CompletionKind::Table, TABLE_DETAIL))
            .collect()
    }
}

impl Default for Completer {
    fn default() -> Self {
        Self::new()
    }
}

fn alias_candidates(tables: &[TableInfo]) -> Vec<CompletionItem> {
    tables
        .iter()
        .filter_map(|info| info.alias.as_deref())
        .filter(|alias| !alias.is_empty())
        .map(|alias| CompletionItem::new(alias, CompletionKind::Alias, ALIAS_DETAIL))
        .collect()
}

fn subquery_column_candidates(views: &[SubQueryInfo]) -> Vec<CompletionItem> {
    views
        .iter()
        .flat_map(|view| view.columns.iter())
        .map(|column| {
            CompletionItem::new(column.clone(), CompletionKind::SubQueryColumn, SUBQUERY_DETAIL)
        })
        .collect()
}

fn keyword_candidates() -> Vec<CompletionItem> {
    KEYWORDS
        .iter()
        .map(|kw| CompletionItem::new(*kw, CompletionKind::Keyword, KEYWORD_DETAIL))
        .collect()
}

/// The word being typed: the maximal run of word characters ending at the
/// cursor column on its line.
fn last_word_at(text: &str, line: usize, character: usize) -> String {
    let Some(line_text) = text.split('\n').nth(line) else {
        return String::new();
    };
    let before_cursor: Vec<char> = line_text.chars().take(character).collect();
    let word: String = before_cursor
        .iter()
        .rev()
        .take_while(|c| c.is_alphanumeric() || **c == '_')
        .collect::<String>()
        .chars()
        .rev()
        .collect();
    word
}

/// Case-insensitive prefix filter against the in-progress word.
fn filter_candidates(candidates: Vec<CompletionItem>, last_word: &str) -> Vec<CompletionItem> {
    let prefix = last_word.to_uppercase();
    candidates
        .into_iter()
        .filter(|item| item.label.to_uppercase().starts_with(&prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use naviql_domain::ColumnDesc;

    fn column(name: &str) -> ColumnDesc {
        ColumnDesc {
            name: name.to_string(),
            data_type: "int(11)".to_string(),
            nullable: false,
            key: None,
            default: None,
            extra: None,
        }
    }

    fn world_completer() -> Completer {
        let catalog = CatalogSnapshot::from_parts(
            vec!["world".to_string()],
            vec!["city".to_string(), "country".to_string()],
            vec![
                (
                    "city".to_string(),
                    vec![column("ID"), column("Name"), column("CountryCode")],
                ),
                ("country".to_string(), vec![column("Code"), column("Name")]),
            ],
        );
        Completer::with_catalog(catalog)
    }

    fn labels_of(items: &[CompletionItem], kind: CompletionKind) -> Vec<&str> {
        items
            .iter()
            .filter(|item| item.kind == kind)
            .map(|item| item.label.as_str())
            .collect()
    }

    mod filtering {
        use super::*;
        use rstest::rstest;

        #[rstest]
        #[case("se", true)]
        #[case("SE", true)]
        #[case("fr", false)]
        fn prefix_filter_is_case_insensitive(#[case] word: &str, #[case] select_kept: bool) {
            let items = vec![
                CompletionItem::new("SELECT", CompletionKind::Keyword, "Keyword"),
                CompletionItem::new("FROM", CompletionKind::Keyword, "Keyword"),
            ];

            let filtered = filter_candidates(items, word);

            assert_eq!(
                filtered.iter().any(|i| i.label == "SELECT"),
                select_kept
            );
        }

        #[test]
        fn empty_word_keeps_everything() {
            let items = keyword_candidates();

            let filtered = filter_candidates(items.clone(), "");

            assert_eq!(filtered.len(), items.len());
        }

        #[rstest]
        #[case("SELECT Na", 0, 9, "Na")]
        #[case("SELECT  FROM city", 0, 7, "")]
        #[case("SELECT *\nFROM ci", 1, 7, "ci")]
        #[case("SELECT city.", 0, 12, "")]
        fn last_word_scans_back_on_the_cursor_line(
            #[case] text: &str,
            #[case] line: usize,
            #[case] character: usize,
            #[case] expected: &str,
        ) {
            assert_eq!(last_word_at(text, line, character), expected);
        }
    }

    mod candidates {
        use super::*;

        #[test]
        fn blank_select_unions_extracted_table_columns() {
            let completer = world_completer();

            let items = completer
                .complete("SELECT  FROM city", CompletionPosition::new(0, 7))
                .expect("complete");

            let columns = labels_of(&items, CompletionKind::Column);
            assert_eq!(columns, vec!["ID", "Name", "CountryCode"]);
            assert!(labels_of(&items, CompletionKind::Keyword).contains(&"SELECT"));
        }

        #[test]
        fn dotted_prefix_restricts_to_the_scoped_table() {
            let completer = world_completer();

            let items = completer
                .complete("SELECT city. FROM city, country", CompletionPosition::new(0, 12))
                .expect("complete");

            let columns = labels_of(&items, CompletionKind::Column);
            assert_eq!(columns, vec!["ID", "Name", "CountryCode"]);
            assert!(labels_of(&items, CompletionKind::Keyword).is_empty());
        }

        #[test]
        fn alias_scope_resolves_through_the_alias() {
            let completer = world_completer();

            let items = completer
                .complete("SELECT c. FROM city c", CompletionPosition::new(0, 9))
                .expect("complete");

            let columns = labels_of(&items, CompletionKind::Column);
            assert_eq!(columns, vec!["ID", "Name", "CountryCode"]);
        }

        #[test]
        fn from_offers_all_tables_alphabetically() {
            let completer = world_completer();

            let items = completer
                .complete("SELECT * FROM ", CompletionPosition::new(0, 14))
                .expect("complete");

            let tables = labels_of(&items, CompletionKind::Table);
            assert_eq!(tables, vec!["city", "country"]);
        }

        #[test]
        fn insert_column_list_filters_by_prefix() {
            let completer = world_completer();

            let items = completer
                .complete("INSERT INTO city (ID, Na", CompletionPosition::new(0, 24))
                .expect("complete");

            let columns = labels_of(&items, CompletionKind::Column);
            assert_eq!(columns, vec!["Name"]);
            assert!(labels_of(&items, CompletionKind::Keyword).is_empty());
        }

        #[test]
        fn subquery_columns_come_from_the_derived_view() {
            let completer = world_completer();
            let text = "SELECT t.* FROM (SELECT id, name FROM foo) AS t WHERE t.";

            let items = completer
                .complete(text, CompletionPosition::new(0, text.chars().count()))
                .expect("complete");

            let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
            assert_eq!(labels, vec!["id", "name"]);
            assert!(items.iter().all(|i| i.detail == "Sub Query"));
        }

        #[test]
        fn missing_catalog_entry_is_silently_skipped() {
            let completer = world_completer();

            let items = completer
                .complete("SELECT  FROM missing", CompletionPosition::new(0, 7))
                .expect("complete");

            assert!(labels_of(&items, CompletionKind::Column).is_empty());
            assert!(!labels_of(&items, CompletionKind::Keyword).is_empty());
        }

        #[test]
        fn scope_resolution_miss_yields_no_columns() {
            let completer = world_completer();

            let items = completer
                .complete("SELECT missing. FROM city", CompletionPosition::new(0, 15))
                .expect("complete");

            assert!(items.is_empty());
        }

        #[test]
        fn aliases_are_offered_for_aliased_tables() {
            let completer = world_completer();

            let items = completer
                .complete("SELECT  FROM city c", CompletionPosition::new(0, 7))
                .expect("complete");

            assert_eq!(labels_of(&items, CompletionKind::Alias), vec!["c"]);
        }
    }

    mod cancellation {
        use super::*;

        #[test]
        fn cancelled_token_short_circuits() {
            let completer = world_completer();
            let cancel = CancellationToken::new();
            cancel.cancel();

            let result = completer.complete_with_cancel(
                "SELECT * FROM city",
                CompletionPosition::new(0, 18),
                &cancel,
            );

            assert_eq!(result, Err(CompleteError::Cancelled));
        }

        #[test]
        fn live_token_lets_the_request_through() {
            let completer = world_completer();
            let cancel = CancellationToken::new();

            let result = completer.complete_with_cancel(
                "SELECT * FROM ",
                CompletionPosition::new(0, 14),
                &cancel,
            );

            assert!(result.is_ok());
        }
    }

    mod refresh {
        use super::*;
        use crate::ports::{CatalogError, CatalogProvider};
        use async_trait::async_trait;
        use mockall::mock;

        mock! {
            pub Catalog {}

            #[async_trait]
            impl CatalogProvider for Catalog {
                async fn open(&self) -> Result<(), CatalogError>;
                async fn close(&self) -> Result<(), CatalogError>;
                async fn databases(&self) -> Result<Vec<String>, CatalogError>;
                async fn tables(&self) -> Result<Vec<String>, CatalogError>;
                async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDesc>, CatalogError>;
            }
        }

        #[tokio::test]
        async fn refresh_commits_a_full_snapshot() {
            let mut provider = MockCatalog::new();
            provider.expect_open().times(1).returning(|| Ok(()));
            provider.expect_close().times(1).returning(|| Ok(()));
            provider
                .expect_databases()
                .returning(|| Ok(vec!["world".to_string()]));
            provider
                .expect_tables()
                .returning(|| Ok(vec!["city".to_string()]));
            provider
                .expect_describe_table()
                .withf(|table: &str| table == "city")
                .returning(|_| Ok(vec![column("ID")]));

            let mut completer = Completer::new();
            completer.refresh(&provider).await.expect("refresh");

            assert_eq!(completer.catalog().table("CITY"), Some("city"));
            assert_eq!(
                completer.catalog().column_descs("city").map(<[ColumnDesc]>::len),
                Some(1)
            );
        }

        #[tokio::test]
        async fn failed_fetch_keeps_the_previous_snapshot_and_closes() {
            let mut provider = MockCatalog::new();
            provider.expect_open().times(1).returning(|| Ok(()));
            provider.expect_close().times(1).returning(|| Ok(()));
            provider
                .expect_databases()
                .returning(|| Ok(vec!["world".to_string()]));
            provider
                .expect_tables()
                .returning(|| Err(CatalogError::QueryFailed("boom".to_string())));

            let mut completer = world_completer();
            let result = completer.refresh(&provider).await;

            assert_eq!(result, Err(CatalogError::QueryFailed("boom".to_string())));
            assert_eq!(completer.catalog().table("city"), Some("city"));
        }

        #[tokio::test]
        async fn failed_open_never_fetches() {
            let mut provider = MockCatalog::new();
            provider
                .expect_open()
                .times(1)
                .returning(|| Err(CatalogError::ConnectionFailed("refused".to_string())));
            provider.expect_close().times(0);
            provider.expect_databases().times(0);

            let mut completer = Completer::new();
            let result = completer.refresh(&provider).await;

            assert!(matches!(result, Err(CatalogError::ConnectionFailed(_))));
        }
    }
}
