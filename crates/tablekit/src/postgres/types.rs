//! Conversions between [`Value`] and PostgreSQL wire types.

use crate::error::{TableError, TableResult};
use crate::row::Row;
use crate::value::Value;
use bytes::BytesMut;
use std::error::Error;
use tokio_postgres::types::{IsNull, Kind, ToSql, Type};

/// Values are encoded as whatever type the server inferred for the
/// placeholder, so `%d`/`%s` coercion never has to match column types exactly.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        if self.is_null() {
            return Ok(IsNull::Yes);
        }

        match *ty {
            Type::BOOL => self.is_truthy().to_sql(ty, out),
            Type::INT2 => i16::try_from(self.int()?)?.to_sql(ty, out),
            Type::INT4 => i32::try_from(self.int()?)?.to_sql(ty, out),
            Type::INT8 => self.int()?.to_sql(ty, out),
            Type::FLOAT4 => (self.float()? as f32).to_sql(ty, out),
            Type::FLOAT8 => self.float()?.to_sql(ty, out),
            Type::JSON | Type::JSONB => self.to_json().to_sql(ty, out),
            _ if <&str as ToSql>::accepts(ty) => {
                let text = self.as_text().unwrap_or_default();
                text.as_str().to_sql(ty, out)
            }
            _ => match ty.kind() {
                Kind::Domain(base) => self.to_sql(base, out),
                _ => Err(format!("cannot bind {self:?} as {ty}").into()),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

impl Value {
    fn int(&self) -> Result<i64, Box<dyn Error + Sync + Send>> {
        self.as_i64()
            .ok_or_else(|| format!("{self:?} is not an integer").into())
    }

    fn float(&self) -> Result<f64, Box<dyn Error + Sync + Send>> {
        self.as_f64()
            .ok_or_else(|| format!("{self:?} is not a number").into())
    }
}

/// Borrow bound values in the shape `tokio_postgres` expects.
pub(crate) fn param_refs(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

/// Decode a driver row into a [`Row`] by column type.
pub(crate) fn decode_row(row: &tokio_postgres::Row) -> TableResult<Row> {
    let mut names = Vec::with_capacity(row.len());
    let mut values = Vec::with_capacity(row.len());

    for (i, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let err = |e: tokio_postgres::Error| TableError::decode(name, e.to_string());

        let value = match *column.type_() {
            Type::BOOL => row.try_get::<_, Option<bool>>(i).map_err(err)?.into(),
            Type::INT2 => row.try_get::<_, Option<i16>>(i).map_err(err)?.into(),
            Type::INT4 => row.try_get::<_, Option<i32>>(i).map_err(err)?.into(),
            Type::INT8 => row.try_get::<_, Option<i64>>(i).map_err(err)?.into(),
            Type::OID => row
                .try_get::<_, Option<u32>>(i)
                .map_err(err)?
                .map_or(Value::Null, |v| Value::Int(i64::from(v))),
            Type::FLOAT4 => row.try_get::<_, Option<f32>>(i).map_err(err)?.into(),
            Type::FLOAT8 => row.try_get::<_, Option<f64>>(i).map_err(err)?.into(),
            Type::JSON | Type::JSONB => row
                .try_get::<_, Option<serde_json::Value>>(i)
                .map_err(err)?
                .map_or(Value::Null, |v| Value::from_json(&v)),
            ref ty if <String as tokio_postgres::types::FromSql>::accepts(ty) => {
                row.try_get::<_, Option<String>>(i).map_err(err)?.into()
            }
            ref ty => {
                return Err(TableError::decode(
                    name,
                    format!("unsupported column type {ty}; cast it to text in the query"),
                ));
            }
        };

        names.push(name.to_string());
        values.push(value);
    }

    Ok(Row::new(names, values))
}
