//! Composable query over one record type.

use sea_orm::sea_query::IntoCondition;
use sea_orm::{Condition, DbBackend, EntityTrait, Order, QueryFilter, QueryOrder, Select};
use std::collections::HashSet;
use std::fmt;

use super::record::{unknown_navigation, Record};
use crate::config::INCLUDE_SEPARATOR;
use crate::errors::{AppError, AppResult};

/// Filter, ordering and eager-loaded navigations for `Repository::get`.
///
/// An empty query matches every row in storage order.
///
/// ```ignore
/// let query = Query::<Article>::new()
///     .filter(article::Column::Price.gte(500_000))
///     .order_by_desc(article::Column::Price)
///     .includes("category");
/// ```
pub struct Query<T: Record> {
    filter: Option<Condition>,
    order: Vec<(T::Column, Order)>,
    includes: Vec<String>,
}

impl<T: Record> Query<T> {
    pub fn new() -> Self {
        Self {
            filter: None,
            order: Vec::new(),
            includes: Vec::new(),
        }
    }

    /// Add a predicate; repeated calls are combined with AND.
    pub fn filter(mut self, condition: impl IntoCondition) -> Self {
        let condition = condition.into_condition();
        let combined = match self.filter.take() {
            Some(existing) => existing.add(condition),
            None => Condition::all().add(condition),
        };
        self.filter = Some(combined);
        self
    }

    pub fn order_by(mut self, column: T::Column, order: Order) -> Self {
        self.order.push((column, order));
        self
    }

    pub fn order_by_asc(self, column: T::Column) -> Self {
        self.order_by(column, Order::Asc)
    }

    pub fn order_by_desc(self, column: T::Column) -> Self {
        self.order_by(column, Order::Desc)
    }

    /// Eagerly load one navigation property.
    pub fn include(mut self, navigation: impl Into<String>) -> Self {
        self.includes.push(navigation.into());
        self
    }

    /// Eagerly load a comma-separated list of navigation properties.
    ///
    /// Blank segments are ignored, so `""` includes nothing.
    pub fn includes(mut self, navigations: &str) -> Self {
        self.includes.extend(
            navigations
                .split(INCLUDE_SEPARATOR)
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        );
        self
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn ordering(&self) -> &[(T::Column, Order)] {
        &self.order
    }

    pub fn included(&self) -> &[String] {
        &self.includes
    }

    /// Fail on include names the record does not declare.
    pub(crate) fn check_includes(&self) -> AppResult<()> {
        match self
            .includes
            .iter()
            .find(|name| !T::NAVIGATIONS.contains(&name.as_str()))
        {
            Some(unknown) => Err(unknown_navigation::<T>(unknown)),
            None => Ok(()),
        }
    }

    /// Entity select with filter and ordering applied.
    pub(crate) fn select(&self) -> Select<T::Entity> {
        let mut select = T::Entity::find();
        if let Some(condition) = &self.filter {
            select = select.filter(condition.clone());
        }
        for (column, order) in &self.order {
            select = select.order_by(*column, order.clone());
        }
        select
    }
}

impl<T: Record> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            order: self.order.clone(),
            includes: self.includes.clone(),
        }
    }
}

impl<T: Record> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("entity", &T::NAME)
            .field("filter", &self.filter)
            .field("order", &self.order)
            .field("includes", &self.includes)
            .finish()
    }
}

/// Check that `sql` has exactly one placeholder per bound value.
pub(crate) fn check_placeholders(sql: &str, backend: DbBackend, values: usize) -> AppResult<()> {
    let expected = count_placeholders(sql, backend);
    if expected != values {
        return Err(AppError::invalid_query(format!(
            "statement expects {} parameter(s) but {} were supplied",
            expected, values
        )));
    }
    Ok(())
}

/// Number of parameters `sql` binds on `backend`.
///
/// Quoted literals and identifiers, `--` and `/* */` comments, and Postgres
/// dollar-quoted bodies are skipped. Recognised markers:
/// - Postgres: numbered `$n`; the highest number counts
/// - SQLite: `?`, `?NNN`, and named `:name`, `@name`, `$name`, each new name
///   taking the next index
/// - MySQL: positional `?`
fn count_placeholders(sql: &str, backend: DbBackend) -> usize {
    let chars: Vec<char> = sql.chars().collect();
    let mut names: HashSet<String> = HashSet::new();
    let mut highest = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            '\'' | '"' | '`' => {
                i = skip_past(&chars, i + 1, &[c]);
                continue;
            }
            '-' if next == Some('-') => {
                i = skip_past(&chars, i + 2, &['\n']);
                continue;
            }
            '/' if next == Some('*') => {
                i = skip_past(&chars, i + 2, &['*', '/']);
                continue;
            }
            '$' if backend == DbBackend::Postgres => {
                let (digits, after) = take_while(&chars, i + 1, |d| d.is_ascii_digit());
                if let Ok(n) = digits.parse::<usize>() {
                    highest = highest.max(n);
                    i = after;
                    continue;
                }
                if let Some(tag) = dollar_tag(&chars, i) {
                    i = skip_past(&chars, i + tag.len(), &tag);
                    continue;
                }
            }
            '?' if backend != DbBackend::Postgres => {
                let (digits, after) = take_while(&chars, i + 1, |d| d.is_ascii_digit());
                highest = match digits.parse::<usize>() {
                    Ok(n) if backend == DbBackend::Sqlite => highest.max(n),
                    _ => highest + 1,
                };
                i = after;
                continue;
            }
            ':' | '@' | '$' if backend == DbBackend::Sqlite => {
                let (name, after) = take_while(&chars, i + 1, |d| d.is_alphanumeric() || d == '_');
                if !name.is_empty() && !name.starts_with(|d: char| d.is_ascii_digit()) {
                    if names.insert(name) {
                        highest += 1;
                    }
                    i = after;
                    continue;
                }
            }
            _ => {}
        }
        i += 1;
    }

    highest
}

/// Index just past the first occurrence of `end` at or after `from`.
fn skip_past(chars: &[char], from: usize, end: &[char]) -> usize {
    (from..chars.len())
        .find(|&i| chars[i..].starts_with(end))
        .map_or(chars.len(), |i| i + end.len())
}

fn take_while(chars: &[char], from: usize, keep: impl Fn(char) -> bool) -> (String, usize) {
    let taken: String = chars[from.min(chars.len())..]
        .iter()
        .copied()
        .take_while(|&c| keep(c))
        .collect();
    let after = from + taken.chars().count();
    (taken, after)
}

/// Opening `$tag$` of a Postgres dollar-quoted string starting at `start`.
fn dollar_tag(chars: &[char], start: usize) -> Option<Vec<char>> {
    let (tag, after) = take_while(chars, start + 1, |c| c.is_alphanumeric() || c == '_');
    if chars.get(after) != Some(&'$') || tag.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(chars[start..=after].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Article;
    use crate::infra::repositories::entities::article;
    use sea_orm::{ColumnTrait, QueryTrait};

    #[test]
    fn test_includes_splits_and_trims() {
        let query = Query::<Article>::new().includes(" category , ,");
        assert_eq!(query.included(), ["category".to_string()]);
        assert!(query.check_includes().is_ok());
    }

    #[test]
    fn test_unknown_include_is_invalid_query() {
        let query = Query::<Article>::new().include("supplier");
        assert!(matches!(query.check_includes(), Err(AppError::InvalidQuery(_))));
    }

    #[test]
    fn test_filters_are_combined_with_and() {
        let sql = Query::<Article>::new()
            .filter(article::Column::Price.gte(10))
            .filter(article::Column::CategoryId.eq(2))
            .order_by_desc(article::Column::Price)
            .select()
            .build(DbBackend::Postgres)
            .to_string();

        assert_eq!(
            sql,
            r#"SELECT "articles"."id", "articles"."category_id", "articles"."title", "articles"."description", "articles"."images_path", "articles"."price", "articles"."row_version" FROM "articles" WHERE "articles"."price" >= 10 AND "articles"."category_id" = 2 ORDER BY "articles"."price" DESC"#
        );
    }

    #[test]
    fn test_empty_query_has_no_clauses() {
        let sql = Query::<Article>::new()
            .select()
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn test_count_positional_placeholders() {
        let sql = "SELECT * FROM articles WHERE title = '?' AND price > ? AND id < ?";
        assert_eq!(count_placeholders(sql, DbBackend::Sqlite), 2);
        assert!(check_placeholders(sql, DbBackend::Sqlite, 2).is_ok());
        assert!(check_placeholders(sql, DbBackend::Sqlite, 1).is_err());
    }

    #[test]
    fn test_count_numbered_placeholders() {
        let sql = "SELECT * FROM articles WHERE price > $1 OR price < $2 OR id = $1";
        assert_eq!(count_placeholders(sql, DbBackend::Postgres), 2);
        assert_eq!(count_placeholders("SELECT '$1'", DbBackend::Postgres), 0);
    }

    #[test]
    fn test_comments_are_skipped() {
        let sql = "SELECT * FROM articles -- why not ?\nWHERE price > ? /* or id = ? */";
        assert_eq!(count_placeholders(sql, DbBackend::Sqlite), 1);
        assert_eq!(count_placeholders(sql, DbBackend::MySql), 1);

        let sql = "SELECT * FROM articles /* $2 */ WHERE price > $1 -- $3";
        assert_eq!(count_placeholders(sql, DbBackend::Postgres), 1);
    }

    #[test]
    fn test_dollar_quoted_bodies_are_skipped() {
        let sql = "SELECT $$ $4 $$, $body$ costs $9 $body$ WHERE id = $1";
        assert_eq!(count_placeholders(sql, DbBackend::Postgres), 1);
    }

    #[test]
    fn test_sqlite_numbered_and_named_markers() {
        assert_eq!(count_placeholders("SELECT ?2, ?1", DbBackend::Sqlite), 2);
        assert_eq!(count_placeholders("SELECT ?3, ?", DbBackend::Sqlite), 4);

        let sql = "SELECT * FROM articles WHERE price > :min AND price < :max OR price = :min";
        assert_eq!(count_placeholders(sql, DbBackend::Sqlite), 2);
        assert_eq!(count_placeholders("SELECT '12:30'", DbBackend::Sqlite), 0);
    }

    #[test]
    fn test_postgres_casts_and_operators_are_not_markers() {
        let sql = "SELECT data ? 'key', price::text FROM articles WHERE id = $1";
        assert_eq!(count_placeholders(sql, DbBackend::Postgres), 1);
    }
}
