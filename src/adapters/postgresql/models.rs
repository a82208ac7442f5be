//! Conversions between PostgreSQL wire types and Mercator values
//!
//! Bind values are converted to the parameter types the server inferred for a
//! prepared statement; result columns are decoded into JSON values keyed by
//! column name.

use crate::adapters::database::StoreRow;
use crate::domain::{SqlValue, StoreError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Number, Value};
use std::error::Error;
use std::str::FromStr;
use tokio_postgres::types::{FromSql, ToSql, Type};
use tokio_postgres::Row;

/// A bind value ready to hand to the driver
pub type BoundParameter = Box<dyn ToSql + Sync + Send>;

/// Convert `values` to the Rust types matching `types`, position by position
///
/// # Errors
///
/// Returns [`StoreError::BindFailed`] (1-based index) when the counts differ
/// or a value cannot represent its parameter type.
pub fn bind_parameters(
    values: &[SqlValue],
    types: &[Type],
) -> Result<Vec<BoundParameter>, StoreError> {
    if values.len() != types.len() {
        return Err(StoreError::BindFailed {
            index: values.len().min(types.len()) + 1,
            message: format!(
                "statement expects {} parameters, got {}",
                types.len(),
                values.len()
            ),
        });
    }

    values
        .iter()
        .zip(types)
        .enumerate()
        .map(|(i, (value, ty))| {
            bind_one(value, ty).map_err(|message| StoreError::BindFailed {
                index: i + 1,
                message,
            })
        })
        .collect()
}

fn bind_one(value: &SqlValue, ty: &Type) -> Result<BoundParameter, String> {
    let mismatch = || format!("cannot convert {value:?} to {}", ty.name());

    if let SqlValue::Null = value {
        let null: BoundParameter = match *ty {
            Type::BOOL => Box::new(None::<bool>),
            Type::INT2 => Box::new(None::<i16>),
            Type::INT4 => Box::new(None::<i32>),
            Type::INT8 => Box::new(None::<i64>),
            Type::FLOAT4 => Box::new(None::<f32>),
            Type::FLOAT8 => Box::new(None::<f64>),
            Type::NUMERIC => Box::new(None::<Decimal>),
            Type::DATE => Box::new(None::<NaiveDate>),
            Type::TIMESTAMP => Box::new(None::<NaiveDateTime>),
            Type::TIMESTAMPTZ => Box::new(None::<DateTime<Utc>>),
            _ => Box::new(None::<String>),
        };
        return Ok(null);
    }

    match *ty {
        Type::BOOL => match value {
            SqlValue::Bool(b) => Ok(Box::new(*b) as BoundParameter),
            SqlValue::Text(s) => s
                .parse::<bool>()
                .map(|b| Box::new(b) as BoundParameter)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        Type::INT2 => integer(value)
            .and_then(|i| i16::try_from(i).ok())
            .map(|i| Box::new(i) as BoundParameter)
            .ok_or_else(mismatch),
        Type::INT4 => integer(value)
            .and_then(|i| i32::try_from(i).ok())
            .map(|i| Box::new(i) as BoundParameter)
            .ok_or_else(mismatch),
        Type::INT8 => integer(value)
            .map(|i| Box::new(i) as BoundParameter)
            .ok_or_else(mismatch),
        Type::FLOAT4 => float(value)
            .map(|f| Box::new(f as f32) as BoundParameter)
            .ok_or_else(mismatch),
        Type::FLOAT8 => float(value)
            .map(|f| Box::new(f) as BoundParameter)
            .ok_or_else(mismatch),
        Type::NUMERIC => decimal(value)
            .map(|d| Box::new(d) as BoundParameter)
            .ok_or_else(mismatch),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            Ok(Box::new(text(value)) as BoundParameter)
        }
        Type::DATE => match value {
            SqlValue::Text(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map(|d| Box::new(d) as BoundParameter)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        Type::TIMESTAMPTZ => match value {
            SqlValue::Text(s) => DateTime::parse_from_rfc3339(s)
                .map(|d| Box::new(d.with_timezone(&Utc)) as BoundParameter)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        Type::TIMESTAMP => match value {
            SqlValue::Text(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
                .map(|d| Box::new(d) as BoundParameter)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        },
        _ => Err(format!("unsupported parameter type {}", ty.name())),
    }
}

fn integer(value: &SqlValue) -> Option<i64> {
    match value {
        SqlValue::Integer(i) => Some(*i),
        SqlValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
        SqlValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float(value: &SqlValue) -> Option<f64> {
    match value {
        SqlValue::Integer(i) => Some(*i as f64),
        SqlValue::Float(f) => Some(*f),
        SqlValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Exact decimal for a `numeric` parameter; floats go through their shortest display form
fn decimal(value: &SqlValue) -> Option<Decimal> {
    match value {
        SqlValue::Integer(i) => Some(Decimal::from(*i)),
        SqlValue::Float(f) if f.is_finite() => Decimal::from_str(&f.to_string()).ok(),
        SqlValue::Text(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

fn text(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Bool(b) => b.to_string(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Text(s) => s.clone(),
    }
}

/// PostgreSQL `numeric` decoded lossily into an `f64`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericF64(pub f64);

impl<'a> FromSql<'a> for NumericF64 {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        // Binary layout: ndigits, weight, sign, dscale (i16 each), then base-10000 digits
        if raw.len() < 8 {
            return Err("numeric value too short".into());
        }
        let read = |at: usize| i16::from_be_bytes([raw[at], raw[at + 1]]);
        let ndigits = read(0).max(0) as usize;
        let weight = read(2) as i32;
        let sign = read(4) as u16;

        if sign == 0xC000 {
            return Ok(NumericF64(f64::NAN));
        }
        if raw.len() < 8 + ndigits * 2 {
            return Err("numeric digits truncated".into());
        }

        let magnitude = (0..ndigits).fold(0.0_f64, |acc, i| {
            let digit = read(8 + i * 2) as f64;
            acc + digit * 10_000_f64.powi(weight - i as i32)
        });

        Ok(NumericF64(if sign == 0x4000 { -magnitude } else { magnitude }))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, index: usize) -> Result<Option<T>, StoreError> {
    row.try_get::<_, Option<T>>(index)
        .map_err(|e| StoreError::MalformedRow(format!("column {index}: {e}")))
}

fn number(value: Option<f64>) -> Value {
    value
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Decode a result row into column name → JSON value
///
/// Temporal columns become ISO-8601 strings; `numeric` becomes a float.
///
/// # Errors
///
/// Returns [`StoreError::UnsupportedColumnType`] for a column type without a
/// decoder.
pub fn decode_row(row: &Row) -> Result<StoreRow, StoreError> {
    let mut out = StoreRow::new();

    for (index, column) in row.columns().iter().enumerate() {
        let value = match *column.type_() {
            Type::BOOL => get::<bool>(row, index)?.map(Value::Bool).unwrap_or(Value::Null),
            Type::INT2 => get::<i16>(row, index)?.map(Value::from).unwrap_or(Value::Null),
            Type::INT4 => get::<i32>(row, index)?.map(Value::from).unwrap_or(Value::Null),
            Type::INT8 => get::<i64>(row, index)?.map(Value::from).unwrap_or(Value::Null),
            Type::FLOAT4 => number(get::<f32>(row, index)?.map(f64::from)),
            Type::FLOAT8 => number(get::<f64>(row, index)?),
            Type::NUMERIC => number(get::<NumericF64>(row, index)?.map(|n| n.0)),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => get::<String>(row, index)?
                .map(Value::String)
                .unwrap_or(Value::Null),
            Type::DATE => get::<NaiveDate>(row, index)?
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            Type::TIMESTAMP => get::<NaiveDateTime>(row, index)?
                .map(|d| Value::String(d.and_utc().to_rfc3339()))
                .unwrap_or(Value::Null),
            Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, index)?
                .map(|d| Value::String(d.to_rfc3339()))
                .unwrap_or(Value::Null),
            Type::JSON | Type::JSONB => get::<Value>(row, index)?.unwrap_or(Value::Null),
            ref other => {
                return Err(StoreError::UnsupportedColumnType {
                    column: column.name().to_string(),
                    type_name: other.name().to_string(),
                })
            }
        };
        out.insert(column.name().to_string(), value);
    }

    Ok(out)
}
