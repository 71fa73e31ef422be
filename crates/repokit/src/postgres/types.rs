//! Binding [`Value`] parameters.
//!
//! A `Value` is encoded according to the parameter type PostgreSQL inferred for
//! its placeholder, so an `Int` can fill an `int2`, `int4` or `int8` slot and a
//! `Text` holding a UUID or RFC 3339 timestamp can fill `uuid`/`timestamptz`.

use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, Utc};
use std::error::Error;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type};

type EncodeResult = Result<IsNull, Box<dyn Error + Sync + Send>>;

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> EncodeResult {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => b.to_sql_checked(ty, out),
            Value::Int(i) => encode_int(*i, ty, out),
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => f.to_sql_checked(ty, out),
            },
            Value::Text(s) => encode_text(s, ty, out),
            Value::Bytes(b) => b.to_sql_checked(ty, out),
            Value::Json(j) => j.to_sql_checked(ty, out),
            Value::Uuid(u) => u.to_sql_checked(ty, out),
            Value::Timestamp(ts) => match *ty {
                Type::TIMESTAMP => ts.naive_utc().to_sql(ty, out),
                Type::DATE => ts.date_naive().to_sql(ty, out),
                _ => ts.to_sql_checked(ty, out),
            },
            Value::List(items) => {
                if !matches!(ty.kind(), Kind::Array(_)) {
                    return Err(format!("list value bound to non-array parameter of type {ty}").into());
                }
                items.to_sql(ty, out)
            }
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn encode_int(i: i64, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::INT2 => i16::try_from(i)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(i)?.to_sql(ty, out),
        Type::OID => u32::try_from(i)?.to_sql(ty, out),
        Type::FLOAT4 => (i as f32).to_sql(ty, out),
        Type::FLOAT8 => (i as f64).to_sql(ty, out),
        _ => i.to_sql_checked(ty, out),
    }
}

fn encode_text(s: &str, ty: &Type, out: &mut BytesMut) -> EncodeResult {
    match *ty {
        Type::UUID => s.parse::<uuid::Uuid>()?.to_sql(ty, out),
        Type::TIMESTAMPTZ => s.parse::<DateTime<Utc>>()?.to_sql(ty, out),
        _ => s.to_sql_checked(ty, out),
    }
}
