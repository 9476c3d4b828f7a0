//! Typed builders for dynamic `UPDATE ... SET` and `WHERE` clauses.
//!
//! Column names are `&'static str` chosen by repository code; user input only
//! ever travels as bound `?` parameters.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{
    mysql::MySqlArguments,
    query::{Query, QueryAs, QueryScalar},
    Executor, MySql,
};

use crate::error::AppResult;

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(DateTime<Utc>),
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Time(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(v)
    }
}

/// Query types that accept positional binds
pub trait BindValue<'q>: Sized {
    fn bind_value(self, value: &'q SqlValue) -> Self;

    fn bind_values(self, values: &'q [SqlValue]) -> Self {
        values.iter().fold(self, |q, v| q.bind_value(v))
    }
}

macro_rules! impl_bind_value {
    ($ty:ty $(, $generic:ident)?) => {
        impl<'q $(, $generic)?> BindValue<'q> for $ty {
            fn bind_value(self, value: &'q SqlValue) -> Self {
                match value {
                    SqlValue::Text(v) => self.bind(v.as_str()),
                    SqlValue::Int(v) => self.bind(*v),
                    SqlValue::Float(v) => self.bind(*v),
                    SqlValue::Bool(v) => self.bind(*v),
                    SqlValue::Date(v) => self.bind(*v),
                    SqlValue::Time(v) => self.bind(*v),
                    SqlValue::Timestamp(v) => self.bind(*v),
                }
            }
        }
    };
}

impl_bind_value!(Query<'q, MySql, MySqlArguments>);
impl_bind_value!(QueryAs<'q, MySql, O, MySqlArguments>, O);
impl_bind_value!(QueryScalar<'q, MySql, O, MySqlArguments>, O);

/// Escape `%`, `_` and `\` so a search term matches literally inside LIKE
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds `UPDATE <table> SET a = ?, b = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?`
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: &'static str,
    assignments: Vec<String>,
    values: Vec<SqlValue>,
}

impl UpdateBuilder {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            assignments: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn set(&mut self, column: &'static str, value: impl Into<SqlValue>) -> &mut Self {
        self.assignments.push(format!("{} = ?", column));
        self.values.push(value.into());
        self
    }

    /// Assignment without a bound value, e.g. `completed_at = NULL`
    pub fn set_raw(&mut self, assignment: &'static str) -> &mut Self {
        self.assignments.push(assignment.to_string());
        self
    }

    /// Assign only when a value was supplied
    pub fn set_opt<V: Into<SqlValue>>(&mut self, column: &'static str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.set(column, v);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn sql(&self) -> String {
        let mut sets = self.assignments.clone();
        sets.push("updated_at = CURRENT_TIMESTAMP".to_string());
        format!("UPDATE {} SET {} WHERE id = ?", self.table, sets.join(", "))
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Run the update for row `id`, returning the number of matched rows
    pub async fn execute<'e, E>(&self, id: i32, executor: E) -> AppResult<u64>
    where
        E: Executor<'e, Database = MySql>,
    {
        let sql = self.sql();
        let result = sqlx::query(&sql)
            .bind_values(&self.values)
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Accumulates `AND`-joined conditions with their bound values
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    conditions: Vec<String>,
    values: Vec<SqlValue>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw condition; `values` must match its `?` placeholders
    pub fn push(&mut self, condition: impl Into<String>, values: Vec<SqlValue>) -> &mut Self {
        self.conditions.push(condition.into());
        self.values.extend(values);
        self
    }

    /// `column = ?` when a value was supplied
    pub fn eq<V: Into<SqlValue>>(&mut self, column: &'static str, value: Option<V>) -> &mut Self {
        if let Some(v) = value {
            self.push(format!("{} = ?", column), vec![v.into()]);
        }
        self
    }

    /// `(a LIKE ? OR b LIKE ?)` for a non-blank search term
    pub fn search(&mut self, columns: &[&'static str], term: Option<&str>) -> &mut Self {
        let term = match term.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return self,
        };
        let pattern = format!("%{}%", escape_like(term));
        let condition = columns
            .iter()
            .map(|c| format!("{} LIKE ?", c))
            .collect::<Vec<_>>()
            .join(" OR ");
        let values = columns.iter().map(|_| SqlValue::Text(pattern.clone())).collect();
        self.push(format!("({})", condition), values)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// `WHERE ...` or an empty string
    pub fn clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_lists_only_supplied_columns() {
        let mut update = UpdateBuilder::new("equipment");
        update
            .set_opt("name", Some("Lathe"))
            .set_opt::<String>("location", None)
            .set_opt("team_id", Some(4));

        assert_eq!(
            update.sql(),
            "UPDATE equipment SET name = ?, team_id = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        );
        assert_eq!(
            update.values(),
            &[SqlValue::Text("Lathe".into()), SqlValue::Int(4)]
        );
    }

    #[test]
    fn raw_assignments_bind_nothing() {
        let mut update = UpdateBuilder::new("maintenance_requests");
        update
            .set("stage", "in_progress")
            .set_raw("started_at = COALESCE(started_at, CURRENT_TIMESTAMP)");

        assert_eq!(
            update.sql(),
            "UPDATE maintenance_requests SET stage = ?, \
             started_at = COALESCE(started_at, CURRENT_TIMESTAMP), \
             updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        );
        assert_eq!(update.values().len(), 1);
    }

    #[test]
    fn empty_update_still_touches_timestamp() {
        let update = UpdateBuilder::new("work_centers");
        assert!(update.is_empty());
        assert_eq!(
            update.sql(),
            "UPDATE work_centers SET updated_at = CURRENT_TIMESTAMP WHERE id = ?"
        );
    }

    #[test]
    fn filter_joins_conditions_and_binds_search_per_column() {
        let mut filter = FilterBuilder::new();
        filter
            .search(&["e.name", "e.equipment_code"], Some(" pump "))
            .eq("e.category_id", Some(3))
            .eq::<&str>("e.status", None);

        assert_eq!(
            filter.clause(),
            "WHERE (e.name LIKE ? OR e.equipment_code LIKE ?) AND e.category_id = ?"
        );
        assert_eq!(filter.values().len(), 3);
        assert_eq!(filter.values()[0], SqlValue::Text("%pump%".into()));
    }

    #[test]
    fn blank_search_adds_nothing() {
        let mut filter = FilterBuilder::new();
        filter.search(&["name"], Some("   "));
        assert!(filter.is_empty());
        assert_eq!(filter.clause(), "");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
