//! PostgreSQL statement text for the query model.

use super::ident::{push_ident, push_qualified};
use crate::builder::{BuiltQuery, CountOptions, DeleteOptions, GetOptions, MutatorQuery, ReaderQuery};
use crate::entity::InsertedValues;
use crate::error::{RepoError, RepoResult};
use crate::query::{Join, Order, Page, Predicate, Projection, Selector, Update};
use crate::value::Value;
use std::fmt::Write as _;

/// Builds PostgreSQL statements with `$n` placeholders.
///
/// Identifiers are validated (see [`ident`](super::ident)); values are always
/// bound as parameters.
///
/// - `IN`/`NOT IN` with a [`Value::List`] bind one parameter per element; an
///   empty list renders `1=0` / `1=1`.
/// - `=`/`!=` against [`Value::Null`] render `IS NULL` / `IS NOT NULL`.
/// - UPDATE and DELETE without selectors render `WHERE 1=0` and touch nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgQueryBuilder;

impl PgQueryBuilder {
    pub fn new() -> Self {
        Self
    }
}

/// SQL text plus the parameters bound so far.
struct SqlWriter {
    sql: String,
    params: Vec<Value>,
}

impl SqlWriter {
    fn new() -> Self {
        Self {
            sql: String::with_capacity(128),
            params: Vec::new(),
        }
    }

    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn ident(&mut self, name: &str) -> RepoResult<()> {
        push_ident(&mut self.sql, name)
    }

    fn column(&mut self, table: &str, column: &str) -> RepoResult<()> {
        push_qualified(&mut self.sql, table, column)
    }

    fn bind(&mut self, value: Value) {
        self.params.push(value);
        let _ = write!(self.sql, "${}", self.params.len());
    }

    fn finish(self) -> BuiltQuery {
        BuiltQuery::new(self.sql, self.params)
    }

    fn projections(&mut self, projections: &[Projection]) -> RepoResult<()> {
        if projections.is_empty() {
            self.push("*");
            return Ok(());
        }
        for (i, p) in projections.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.column(&p.table, &p.column)?;
            if !p.alias.is_empty() {
                self.push(" AS ");
                self.ident(&p.alias)?;
            }
        }
        Ok(())
    }

    fn joins(&mut self, joins: &[Join]) -> RepoResult<()> {
        for join in joins {
            self.push(" ");
            self.push(join.join_type.as_sql());
            self.push(" JOIN ");
            self.ident(&join.table)?;
            self.push(" ON ");
            self.column(&join.on_left.table, &join.on_left.column)?;
            self.push(" = ");
            self.column(&join.on_right.table, &join.on_right.column)?;
        }
        Ok(())
    }

    fn where_clause(&mut self, selectors: &[Selector]) -> RepoResult<()> {
        if selectors.is_empty() {
            return Ok(());
        }
        self.push(" WHERE ");
        for (i, selector) in selectors.iter().enumerate() {
            if i > 0 {
                self.push(" AND ");
            }
            self.condition(selector)?;
        }
        Ok(())
    }

    /// Like [`where_clause`](Self::where_clause), but nothing matches when
    /// `selectors` is empty.
    fn guarded_where_clause(&mut self, selectors: &[Selector]) -> RepoResult<()> {
        if selectors.is_empty() {
            self.push(" WHERE 1=0");
            return Ok(());
        }
        self.where_clause(selectors)
    }

    fn condition(&mut self, selector: &Selector) -> RepoResult<()> {
        let predicate = selector.predicate;

        if predicate.is_list() {
            let items = match &selector.value {
                Value::List(items) => items.clone(),
                single => vec![single.clone()],
            };
            if items.is_empty() {
                self.push(if predicate == Predicate::In { "1=0" } else { "1=1" });
                return Ok(());
            }
            self.column(&selector.table, &selector.column)?;
            self.push(" ");
            self.push(predicate.as_sql());
            self.push(" (");
            for (i, item) in items.into_iter().enumerate() {
                if i > 0 {
                    self.push(", ");
                }
                self.bind(item);
            }
            self.push(")");
            return Ok(());
        }

        if matches!(selector.value, Value::List(_)) {
            return Err(RepoError::build(format!(
                "predicate {predicate} on {} takes a single value, got a list",
                selector.column
            )));
        }

        self.column(&selector.table, &selector.column)?;
        match (predicate, &selector.value) {
            (Predicate::Equal, Value::Null) => self.push(" IS NULL"),
            (Predicate::NotEqual, Value::Null) => self.push(" IS NOT NULL"),
            (_, value) => {
                self.push(" ");
                self.push(predicate.as_sql());
                self.push(" ");
                self.bind(value.clone());
            }
        }
        Ok(())
    }

    fn order_by(&mut self, orders: &[Order]) -> RepoResult<()> {
        if orders.is_empty() {
            return Ok(());
        }
        self.push(" ORDER BY ");
        for (i, order) in orders.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.column(&order.table, &order.field)?;
            self.push(" ");
            self.push(order.direction.as_sql());
        }
        Ok(())
    }

    fn page(&mut self, page: Option<&Page>) {
        let Some(page) = page else {
            return;
        };
        if page.limit > 0 {
            let _ = write!(self.sql, " LIMIT {}", page.limit);
        }
        if page.offset > 0 {
            let _ = write!(self.sql, " OFFSET {}", page.offset);
        }
    }

    fn insert_head(&mut self, table: &str, columns: &[String]) -> RepoResult<()> {
        self.push("INSERT INTO ");
        self.ident(table)?;
        self.push(" (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.ident(column)?;
        }
        self.push(") VALUES ");
        Ok(())
    }

    fn values_row(&mut self, values: &[Value]) {
        self.push("(");
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.bind(value.clone());
        }
        self.push(")");
    }

    /// Multi-row INSERT; every row must list the same columns as the first.
    fn insert_rows(&mut self, table: &str, rows: &[InsertedValues]) -> RepoResult<()> {
        let Some((columns, _)) = rows.first() else {
            return Err(RepoError::build(format!("insert into {table}: no rows")));
        };
        if columns.is_empty() {
            return Err(RepoError::build(format!("insert into {table}: no columns")));
        }
        for (i, (row_columns, values)) in rows.iter().enumerate() {
            if row_columns != columns {
                return Err(RepoError::build(format!(
                    "insert into {table}: row {i} lists different columns"
                )));
            }
            if values.len() != columns.len() {
                return Err(RepoError::build(format!(
                    "insert into {table}: row {i} has {} values for {} columns",
                    values.len(),
                    columns.len()
                )));
            }
        }

        self.insert_head(table, columns)?;
        for (i, (_, values)) in rows.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.values_row(values);
        }
        Ok(())
    }
}

impl ReaderQuery for PgQueryBuilder {
    fn get(&self, table: &str, opts: &GetOptions) -> RepoResult<BuiltQuery> {
        let mut w = SqlWriter::new();
        w.push("SELECT ");
        w.projections(&opts.projections)?;
        w.push(" FROM ");
        w.ident(table)?;
        w.joins(&opts.joins)?;
        w.where_clause(&opts.selectors)?;
        w.order_by(&opts.orders)?;
        w.page(opts.page.as_ref());
        if opts.lock {
            w.push(" FOR UPDATE");
        }
        Ok(w.finish())
    }

    /// `SELECT COUNT(*)`; with a page, counts within the window.
    fn count(&self, table: &str, opts: &CountOptions) -> RepoResult<BuiltQuery> {
        let mut w = SqlWriter::new();
        let windowed = opts.page.is_some_and(|p| p.limit > 0 || p.offset > 0);
        if windowed {
            w.push("SELECT COUNT(*) FROM (SELECT 1 FROM ");
        } else {
            w.push("SELECT COUNT(*) FROM ");
        }
        w.ident(table)?;
        w.joins(&opts.joins)?;
        w.where_clause(&opts.selectors)?;
        if windowed {
            w.page(opts.page.as_ref());
            w.push(") AS counted");
        }
        Ok(w.finish())
    }
}

impl MutatorQuery for PgQueryBuilder {
    fn insert(&self, table: &str, values: &InsertedValues) -> RepoResult<BuiltQuery> {
        let (columns, row) = values;
        if columns.is_empty() && row.is_empty() {
            let mut w = SqlWriter::new();
            w.push("INSERT INTO ");
            w.ident(table)?;
            w.push(" DEFAULT VALUES");
            return Ok(w.finish());
        }
        let mut w = SqlWriter::new();
        w.insert_rows(table, std::slice::from_ref(values))?;
        Ok(w.finish())
    }

    fn insert_many(&self, table: &str, rows: &[InsertedValues]) -> RepoResult<BuiltQuery> {
        let mut w = SqlWriter::new();
        w.insert_rows(table, rows)?;
        Ok(w.finish())
    }

    fn upsert_many(
        &self,
        table: &str,
        rows: &[InsertedValues],
        update_projections: &[Projection],
        conflict_columns: &[&str],
    ) -> RepoResult<BuiltQuery> {
        if conflict_columns.is_empty() {
            return Err(RepoError::build(format!(
                "upsert into {table}: no conflict columns"
            )));
        }
        let mut w = SqlWriter::new();
        w.insert_rows(table, rows)?;
        w.push(" ON CONFLICT (");
        for (i, column) in conflict_columns.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.ident(column)?;
        }
        w.push(")");

        if update_projections.is_empty() {
            w.push(" DO NOTHING");
            return Ok(w.finish());
        }
        w.push(" DO UPDATE SET ");
        for (i, p) in update_projections.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.ident(&p.column)?;
            w.push(" = EXCLUDED.");
            w.ident(&p.column)?;
        }
        Ok(w.finish())
    }

    fn update(
        &self,
        table: &str,
        updates: &[Update],
        selectors: &[Selector],
    ) -> RepoResult<BuiltQuery> {
        if updates.is_empty() {
            return Err(RepoError::build(format!("update {table}: nothing to set")));
        }
        let mut w = SqlWriter::new();
        w.push("UPDATE ");
        w.ident(table)?;
        w.push(" SET ");
        for (i, update) in updates.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.ident(&update.field)?;
            w.push(" = ");
            w.bind(update.value.clone());
        }
        w.guarded_where_clause(selectors)?;
        Ok(w.finish())
    }

    /// DELETE; a non-zero limit selects victims by `ctid` in a subquery.
    fn delete(
        &self,
        table: &str,
        selectors: &[Selector],
        opts: &DeleteOptions,
    ) -> RepoResult<BuiltQuery> {
        let mut w = SqlWriter::new();
        w.push("DELETE FROM ");
        w.ident(table)?;

        let Some(limit) = opts.limit.filter(|&l| l > 0 && !selectors.is_empty()) else {
            w.guarded_where_clause(selectors)?;
            return Ok(w.finish());
        };

        w.push(" WHERE ctid IN (SELECT ctid FROM ");
        w.ident(table)?;
        w.where_clause(selectors)?;
        w.order_by(&opts.orders)?;
        let _ = write!(w.sql, " LIMIT {limit})");
        Ok(w.finish())
    }
}
