//! In-memory driver for integration tests.
//!
//! Statements use a tiny command language instead of SQL:
//!
//! ```text
//! INSERT <table> <col,col,...>          params: values, row after row
//! SELECT <table> [WHERE <col,col,...>]  params: equality values
//! COUNT  <table> [WHERE <col,col,...>]
//! UPDATE <table> SET <col,...> [WHERE <col,...>]
//! DELETE <table> [WHERE <col,...>]
//! ```
//!
//! [`FakeBuilder`] emits it from the query model. [`FakeDb`] counts open
//! statements and cursors, stages transactional writes on a snapshot and can
//! inject failures at every driver step.

#![allow(dead_code)]

use repokit::{
    BuiltQuery, Close, Connection, CountOptions, DeleteOptions, ExecResult, GetOptions, Getter,
    InsertedValues, Mutator, MutatorQuery, Predicate, PreparedStatement, Preparer, Projection,
    ReaderQuery, RepoError, RepoResult, Row, RowCursor, RowExt, Selector, TableNamer, Transaction,
    TxOptions, Update, Value, ValueRow,
};
use std::collections::{BTreeMap, VecDeque};
use std::future::{Future, ready};
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard};

pub type Tables = BTreeMap<String, Vec<ValueRow>>;

/// Failure switches; each one stays on until cleared.
#[derive(Debug, Default, Clone)]
pub struct Faults {
    pub prepare: bool,
    pub execute: bool,
    /// Fail the fetch of the row at this position.
    pub row_error_at: Option<usize>,
    pub close_statement: bool,
    pub begin: bool,
    pub commit: bool,
    pub rollback: bool,
    pub no_rows_affected: bool,
    pub insert_id_error: bool,
}

#[derive(Debug, Default)]
pub struct Stats {
    pub prepared: usize,
    pub executed: Vec<String>,
    pub open_statements: isize,
    pub open_cursors: isize,
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

#[derive(Default)]
struct Inner {
    faults: Faults,
    stats: Stats,
}

#[derive(Clone, Default)]
pub struct FakeDb {
    tables: Arc<Mutex<Tables>>,
    inner: Arc<Mutex<Inner>>,
}

impl FakeDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self) -> FakeConn {
        FakeConn {
            db: self.clone(),
            closed: false,
        }
    }

    pub fn seed(&self, table: &str, rows: Vec<ValueRow>) {
        lock(&self.tables)
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn rows(&self, table: &str) -> Vec<ValueRow> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }

    pub fn faults(&self, set: impl FnOnce(&mut Faults)) {
        set(&mut lock(&self.inner).faults);
    }

    pub fn stats<T>(&self, read: impl FnOnce(&Stats) -> T) -> T {
        read(&lock(&self.inner).stats)
    }

    pub fn open_statements(&self) -> isize {
        self.stats(|s| s.open_statements)
    }

    pub fn open_cursors(&self) -> isize {
        self.stats(|s| s.open_cursors)
    }

    pub fn executed(&self) -> usize {
        self.stats(|s| s.executed.len())
    }

    fn faults_now(&self) -> Faults {
        lock(&self.inner).faults.clone()
    }

    fn with_stats(&self, update: impl FnOnce(&mut Stats)) {
        update(&mut lock(&self.inner).stats);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

enum Outcome {
    Rows(Vec<ValueRow>),
    Affected(u64),
}

fn split_cols(s: &str) -> Vec<String> {
    s.split(',').map(str::to_string).collect()
}

fn matches_all(row: &ValueRow, cols: &[String], values: &[Value]) -> bool {
    cols.iter()
        .zip(values)
        .all(|(c, v)| row.get(c).is_some_and(|have| have == v))
}

fn run(tables: &mut Tables, sql: &str, params: &[Value]) -> Result<Outcome, String> {
    let words: Vec<&str> = sql.split_whitespace().collect();
    let where_cols = |at: usize| -> Vec<String> {
        match (words.get(at), words.get(at + 1)) {
            (Some(&"WHERE"), Some(cols)) => split_cols(cols),
            _ => Vec::new(),
        }
    };

    match words.as_slice() {
        ["INSERT", table, cols] => {
            let cols = split_cols(cols);
            if params.len() % cols.len() != 0 {
                return Err(format!("{} params for {} columns", params.len(), cols.len()));
            }
            let rows = tables.entry(table.to_string()).or_default();
            let mut n = 0;
            for chunk in params.chunks(cols.len()) {
                rows.push(cols.iter().cloned().zip(chunk.iter().cloned()).collect());
                n += 1;
            }
            Ok(Outcome::Affected(n))
        }
        ["SELECT", table, ..] => {
            let cols = where_cols(2);
            let rows = tables.get(*table).cloned().unwrap_or_default();
            Ok(Outcome::Rows(
                rows.into_iter()
                    .filter(|r| matches_all(r, &cols, params))
                    .collect(),
            ))
        }
        ["COUNT", table, ..] => {
            let cols = where_cols(2);
            let n = tables
                .get(*table)
                .map(|rows| rows.iter().filter(|r| matches_all(r, &cols, params)).count())
                .unwrap_or(0);
            Ok(Outcome::Rows(vec![ValueRow::new().with("count", n as i64)]))
        }
        ["UPDATE", table, "SET", set, ..] => {
            let set = split_cols(set);
            let cols = where_cols(4);
            let (set_values, where_values) = params.split_at(set.len().min(params.len()));
            let mut n = 0;
            for row in tables.entry(table.to_string()).or_default() {
                if matches_all(row, &cols, where_values) {
                    for (c, v) in set.iter().zip(set_values) {
                        row.set(c, v.clone());
                    }
                    n += 1;
                }
            }
            Ok(Outcome::Affected(n))
        }
        ["DELETE", table, ..] => {
            let cols = where_cols(2);
            let rows = tables.entry(table.to_string()).or_default();
            let before = rows.len();
            rows.retain(|r| !matches_all(r, &cols, params));
            Ok(Outcome::Affected((before - rows.len()) as u64))
        }
        _ => Err(format!("syntax error: {sql}")),
    }
}

/// Executes `sql` against `tables`, honouring execution faults.
fn execute_on(db: &FakeDb, tables: &Mutex<Tables>, sql: &str, params: &[Value]) -> RepoResult<ExecResult> {
    let faults = db.faults_now();
    db.with_stats(|s| s.executed.push(sql.to_string()));
    if faults.execute {
        return Err(RepoError::execute("execute failed"));
    }
    let outcome = run(&mut lock(tables), sql, params).map_err(RepoError::execute)?;
    let n = match outcome {
        Outcome::Affected(n) => n,
        Outcome::Rows(rows) => rows.len() as u64,
    };
    let mut result = if faults.no_rows_affected {
        ExecResult::without_rows_affected()
    } else {
        ExecResult::new(n)
    };
    if sql.starts_with("INSERT") {
        result = if faults.insert_id_error {
            result.with_insert_id_error("last insert id unavailable")
        } else {
            result.with_insert_id(n as i64)
        };
    }
    Ok(result)
}

fn query_on(db: &FakeDb, tables: &Mutex<Tables>, sql: &str, params: &[Value]) -> RepoResult<FakeRows> {
    let faults = db.faults_now();
    db.with_stats(|s| s.executed.push(sql.to_string()));
    if faults.execute {
        return Err(RepoError::execute("query failed"));
    }
    let rows = match run(&mut lock(tables), sql, params).map_err(RepoError::execute)? {
        Outcome::Rows(rows) => rows,
        Outcome::Affected(_) => Vec::new(),
    };
    db.with_stats(|s| s.open_cursors += 1);
    Ok(FakeRows {
        db: db.clone(),
        rows: rows.into(),
        fetched: 0,
        error_at: faults.row_error_at,
        closed: false,
    })
}

fn prepare_on(db: &FakeDb, tables: &Arc<Mutex<Tables>>) -> RepoResult<FakeStatement> {
    if db.faults_now().prepare {
        return Err(RepoError::prepare("prepare failed"));
    }
    db.with_stats(|s| {
        s.prepared += 1;
        s.open_statements += 1;
    });
    Ok(FakeStatement {
        db: db.clone(),
        tables: tables.clone(),
        closed: false,
    })
}

pub struct FakeStatement {
    db: FakeDb,
    tables: Arc<Mutex<Tables>>,
    closed: bool,
}

impl Close for FakeStatement {
    fn close(&mut self) -> RepoResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.db.with_stats(|s| s.open_statements -= 1);
        if self.db.faults_now().close_statement {
            return Err(RepoError::Other("close statement failed".into()));
        }
        Ok(())
    }
}

/// The command text is interpreted on every execute/query.
pub struct PreparedFake {
    statement: FakeStatement,
    sql: String,
}

impl Close for PreparedFake {
    fn close(&mut self) -> RepoResult<()> {
        self.statement.close()
    }
}

impl PreparedStatement for PreparedFake {
    type Rows = FakeRows;

    fn execute(&mut self, params: &[Value]) -> impl Future<Output = RepoResult<ExecResult>> + Send {
        let s = &self.statement;
        ready(execute_on(&s.db, &s.tables, &self.sql, params))
    }

    fn query(&mut self, params: &[Value]) -> impl Future<Output = RepoResult<FakeRows>> + Send {
        let s = &self.statement;
        ready(query_on(&s.db, &s.tables, &self.sql, params))
    }
}

pub struct FakeRows {
    db: FakeDb,
    rows: VecDeque<ValueRow>,
    fetched: usize,
    error_at: Option<usize>,
    closed: bool,
}

impl FakeRows {
    fn next_now(&mut self) -> RepoResult<Option<ValueRow>> {
        if self.closed {
            return Err(RepoError::NoHandle { op: "next" });
        }
        if self.error_at == Some(self.fetched) {
            return Err(RepoError::execute("row fetch failed"));
        }
        self.fetched += 1;
        Ok(self.rows.pop_front())
    }
}

impl Close for FakeRows {
    fn close(&mut self) -> RepoResult<()> {
        if !self.closed {
            self.closed = true;
            self.db.with_stats(|s| s.open_cursors -= 1);
        }
        Ok(())
    }
}

impl RowCursor for FakeRows {
    type Row = ValueRow;

    fn next(&mut self) -> impl Future<Output = RepoResult<Option<ValueRow>>> + Send {
        ready(self.next_now())
    }
}

pub struct FakeConn {
    db: FakeDb,
    closed: bool,
}

impl FakeConn {
    /// Simulate a connection that has gone away.
    pub fn close_handle(&mut self) {
        self.closed = true;
    }
}

impl Preparer for FakeConn {
    type Statement<'a>
        = PreparedFake
    where
        Self: 'a;

    fn prepare(&self, sql: &str) -> impl Future<Output = RepoResult<PreparedFake>> + Send {
        ready(prepare_on(&self.db, &self.db.tables).map(|statement| PreparedFake {
            statement,
            sql: sql.to_string(),
        }))
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Connection for FakeConn {
    type Tx<'a>
        = FakeTx<'a>
    where
        Self: 'a;

    type RawRows = FakeRows;

    fn exec_raw(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = RepoResult<ExecResult>> + Send {
        ready(execute_on(&self.db, &self.db.tables, sql, params))
    }

    fn query_raw(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = RepoResult<FakeRows>> + Send {
        ready(query_on(&self.db, &self.db.tables, sql, params))
    }

    fn begin_with(&mut self, _opts: TxOptions) -> impl Future<Output = RepoResult<FakeTx<'_>>> + Send {
        let result = if self.db.faults_now().begin {
            Err(RepoError::execute("begin failed"))
        } else {
            self.db.with_stats(|s| s.begins += 1);
            let snapshot = lock(&self.db.tables).clone();
            Ok(FakeTx {
                db: self.db.clone(),
                staged: Arc::new(Mutex::new(snapshot)),
                _conn: PhantomData,
            })
        };
        ready(result)
    }
}

/// Reads and writes go to a snapshot copied back on commit.
pub struct FakeTx<'a> {
    db: FakeDb,
    staged: Arc<Mutex<Tables>>,
    _conn: PhantomData<&'a mut FakeConn>,
}

impl Preparer for FakeTx<'_> {
    type Statement<'s>
        = PreparedFake
    where
        Self: 's;

    fn prepare(&self, sql: &str) -> impl Future<Output = RepoResult<PreparedFake>> + Send {
        ready(prepare_on(&self.db, &self.staged).map(|statement| PreparedFake {
            statement,
            sql: sql.to_string(),
        }))
    }
}

impl Transaction for FakeTx<'_> {
    fn commit(self) -> impl Future<Output = RepoResult<()>> + Send {
        let result = if self.db.faults_now().commit {
            Err(RepoError::commit("commit failed"))
        } else {
            let staged = lock(&self.staged).clone();
            *lock(&self.db.tables) = staged;
            self.db.with_stats(|s| s.commits += 1);
            Ok(())
        };
        ready(result)
    }

    fn rollback(self) -> impl Future<Output = RepoResult<()>> + Send {
        self.db.with_stats(|s| s.rollbacks += 1);
        let result = if self.db.faults_now().rollback {
            Err(RepoError::rollback("rollback failed"))
        } else {
            Ok(())
        };
        ready(result)
    }
}

/// Emits the command language above. Only equality selectors are supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeBuilder;

fn where_part(selectors: &[Selector]) -> RepoResult<(String, Vec<Value>)> {
    if selectors.is_empty() {
        return Ok((String::new(), Vec::new()));
    }
    if let Some(s) = selectors.iter().find(|s| s.predicate != Predicate::Equal) {
        return Err(RepoError::build(format!("unsupported predicate {}", s.predicate)));
    }
    let cols: Vec<&str> = selectors.iter().map(|s| s.column.as_str()).collect();
    let values = selectors.iter().map(|s| s.value.clone()).collect();
    Ok((format!(" WHERE {}", cols.join(",")), values))
}

impl ReaderQuery for FakeBuilder {
    fn get(&self, table: &str, opts: &GetOptions) -> RepoResult<BuiltQuery> {
        let (clause, params) = where_part(&opts.selectors)?;
        Ok(BuiltQuery::new(format!("SELECT {table}{clause}"), params))
    }

    fn count(&self, table: &str, opts: &CountOptions) -> RepoResult<BuiltQuery> {
        let (clause, params) = where_part(&opts.selectors)?;
        Ok(BuiltQuery::new(format!("COUNT {table}{clause}"), params))
    }
}

impl MutatorQuery for FakeBuilder {
    fn insert(&self, table: &str, values: &InsertedValues) -> RepoResult<BuiltQuery> {
        self.insert_many(table, std::slice::from_ref(values))
    }

    fn insert_many(&self, table: &str, rows: &[InsertedValues]) -> RepoResult<BuiltQuery> {
        let Some((cols, _)) = rows.first() else {
            return Err(RepoError::build("no rows"));
        };
        let params = rows.iter().flat_map(|(_, v)| v.iter().cloned()).collect();
        Ok(BuiltQuery::new(format!("INSERT {table} {}", cols.join(",")), params))
    }

    fn upsert_many(
        &self,
        table: &str,
        rows: &[InsertedValues],
        _update_projections: &[Projection],
        _conflict_columns: &[&str],
    ) -> RepoResult<BuiltQuery> {
        self.insert_many(table, rows)
    }

    fn update(&self, table: &str, updates: &[Update], selectors: &[Selector]) -> RepoResult<BuiltQuery> {
        let set: Vec<&str> = updates.iter().map(|u| u.field.as_str()).collect();
        let (clause, where_params) = where_part(selectors)?;
        let mut params: Vec<Value> = updates.iter().map(|u| u.value.clone()).collect();
        params.extend(where_params);
        Ok(BuiltQuery::new(
            format!("UPDATE {table} SET {}{clause}", set.join(",")),
            params,
        ))
    }

    fn delete(&self, table: &str, selectors: &[Selector], _opts: &DeleteOptions) -> RepoResult<BuiltQuery> {
        let (clause, params) = where_part(selectors)?;
        Ok(BuiltQuery::new(format!("DELETE {table}{clause}"), params))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: i64,
}

impl User {
    pub fn new(id: i64, name: &str, age: i64) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
        }
    }

    pub fn row(&self) -> ValueRow {
        ValueRow::new()
            .with("id", self.id)
            .with("name", self.name.clone())
            .with("age", self.age)
    }
}

impl TableNamer for User {
    fn table_name(&self) -> &str {
        "users"
    }
}

impl Getter for User {
    fn scan_row(&mut self, row: &dyn Row) -> RepoResult<()> {
        self.id = row.try_get_column("id")?;
        self.name = row.try_get_column("name")?;
        self.age = row.try_get_column("age")?;
        Ok(())
    }
}

impl Mutator for User {
    fn inserted_values(&self) -> InsertedValues {
        (
            vec!["id".into(), "name".into(), "age".into()],
            vec![self.id.into(), self.name.clone().into(), self.age.into()],
        )
    }
}

pub fn seeded_db() -> FakeDb {
    let db = FakeDb::new();
    db.seed(
        "users",
        vec![
            User::new(1, "alice", 30).row(),
            User::new(2, "bob", 17).row(),
            User::new(3, "carol", 30).row(),
        ],
    );
    db
}
