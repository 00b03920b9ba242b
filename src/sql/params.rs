//! Convert record scalars into sqlx bind arguments.
//!
//! Every placeholder carries an explicit cast (`$1::bigint`), so values travel
//! as text and PostgreSQL converts them to the column type.

use crate::record::Scalar;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

/// Text form of a scalar for a casted placeholder. `None` binds SQL NULL.
pub fn bind_text(v: &Scalar) -> Option<String> {
    match v {
        Scalar::Null => None,
        Scalar::Bool(b) => Some(b.to_string()),
        Scalar::Int(n) => Some(n.to_string()),
        Scalar::Decimal(s) => Some(s.clone()),
        Scalar::Text(s) => Some(s.clone()),
        Scalar::Timestamp(t) => Some(t.to_rfc3339()),
    }
}

pub fn bind_all<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[Scalar],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        query = query.bind(bind_text(p));
    }
    query
}
