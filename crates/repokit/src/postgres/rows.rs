//! Result rows from tokio-postgres.

use crate::client::{Close, RowCursor};
use crate::error::{RepoError, RepoResult};
use crate::row::Row;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures_util::StreamExt;
use std::pin::Pin;
use tokio_postgres::RowStream;
use tokio_postgres::types::{FromSql, Type};

/// Streaming cursor over a query result.
///
/// Closing drops the underlying stream; further `next` calls fail with
/// [`RepoError::NoHandle`].
pub struct PgRows {
    stream: Option<Pin<Box<RowStream>>>,
}

impl PgRows {
    pub(crate) fn new(stream: RowStream) -> Self {
        Self {
            stream: Some(Box::pin(stream)),
        }
    }
}

impl Close for PgRows {
    fn close(&mut self) -> RepoResult<()> {
        self.stream = None;
        Ok(())
    }
}

impl RowCursor for PgRows {
    type Row = PgRow;

    async fn next(&mut self) -> RepoResult<Option<PgRow>> {
        let stream = self
            .stream
            .as_mut()
            .ok_or(RepoError::NoHandle { op: "next" })?;
        match stream.next().await {
            Some(Ok(row)) => Ok(Some(PgRow(row))),
            Some(Err(e)) => Err(RepoError::execute(e)),
            None => Ok(None),
        }
    }
}

/// A single row, decoded column by column into [`Value`]s.
pub struct PgRow(tokio_postgres::Row);

impl PgRow {
    pub fn into_inner(self) -> tokio_postgres::Row {
        self.0
    }
}

impl From<tokio_postgres::Row> for PgRow {
    fn from(row: tokio_postgres::Row) -> Self {
        Self(row)
    }
}

impl Row for PgRow {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn column_name(&self, idx: usize) -> Option<&str> {
        self.0.columns().get(idx).map(|c| c.name())
    }

    fn value_at(&self, idx: usize) -> RepoResult<Value> {
        let column = self
            .0
            .columns()
            .get(idx)
            .ok_or_else(|| RepoError::decode(idx.to_string(), "column index out of range"))?;
        decode(&self.0, idx, column.name(), column.type_())
    }
}

fn get<'a, T: FromSql<'a>>(row: &'a tokio_postgres::Row, idx: usize, name: &str) -> RepoResult<Option<T>> {
    row.try_get::<_, Option<T>>(idx)
        .map_err(|e| RepoError::decode(name, e.to_string()))
}

fn get_list<'a, T>(row: &'a tokio_postgres::Row, idx: usize, name: &str) -> RepoResult<Option<Value>>
where
    T: FromSql<'a> + Into<Value>,
{
    Ok(get::<Vec<Option<T>>>(row, idx, name)?.map(Value::list))
}

fn decode(row: &tokio_postgres::Row, idx: usize, name: &str, ty: &Type) -> RepoResult<Value> {
    let value = match *ty {
        Type::BOOL => get::<bool>(row, idx, name)?.map(Value::Bool),
        Type::INT2 => get::<i16>(row, idx, name)?.map(Value::from),
        Type::INT4 => get::<i32>(row, idx, name)?.map(Value::from),
        Type::INT8 => get::<i64>(row, idx, name)?.map(Value::Int),
        Type::OID => get::<u32>(row, idx, name)?.map(Value::from),
        Type::FLOAT4 => get::<f32>(row, idx, name)?.map(Value::from),
        Type::FLOAT8 => get::<f64>(row, idx, name)?.map(Value::Float),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            get::<String>(row, idx, name)?.map(Value::Text)
        }
        Type::BYTEA => get::<Vec<u8>>(row, idx, name)?.map(Value::Bytes),
        Type::JSON | Type::JSONB => get::<serde_json::Value>(row, idx, name)?.map(Value::Json),
        Type::UUID => get::<uuid::Uuid>(row, idx, name)?.map(Value::Uuid),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, idx, name)?.map(Value::Timestamp),
        Type::TIMESTAMP => get::<NaiveDateTime>(row, idx, name)?.map(|ts| Value::Timestamp(ts.and_utc())),
        Type::DATE => get::<NaiveDate>(row, idx, name)?
            .map(|d| Value::Timestamp(d.and_time(chrono::NaiveTime::MIN).and_utc())),
        Type::BOOL_ARRAY => get_list::<bool>(row, idx, name)?,
        Type::INT2_ARRAY => get_list::<i16>(row, idx, name)?,
        Type::INT4_ARRAY => get_list::<i32>(row, idx, name)?,
        Type::INT8_ARRAY => get_list::<i64>(row, idx, name)?,
        Type::FLOAT8_ARRAY => get_list::<f64>(row, idx, name)?,
        Type::TEXT_ARRAY | Type::VARCHAR_ARRAY => get_list::<String>(row, idx, name)?,
        Type::UUID_ARRAY => get_list::<uuid::Uuid>(row, idx, name)?,
        _ => {
            return Err(RepoError::decode(
                name,
                format!("unsupported column type {ty}"),
            ));
        }
    };
    Ok(value.unwrap_or(Value::Null))
}
