use sqlx::postgres::{PgArguments, PgRow};
use sqlx::FromRow;

use crate::filter::SqlParam;

/// Bind a typed parameter onto a plain query.
pub fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::TextArray(a) => q.bind(a.clone()),
        SqlParam::UuidArray(a) => q.bind(a.clone()),
        SqlParam::Numeric(d) => q.bind(*d),
    }
}

/// Bind a typed parameter onto a `query_as` query.
pub fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &SqlParam,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlParam::Text(s) => q.bind(s.clone()),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::TextArray(a) => q.bind(a.clone()),
        SqlParam::UuidArray(a) => q.bind(a.clone()),
        SqlParam::Numeric(d) => q.bind(*d),
    }
}
