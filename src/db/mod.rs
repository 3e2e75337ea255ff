//! Database connection pool and repositories.

pub mod admin;
pub mod attendance;
pub mod connection;
pub mod employee;
pub mod schema;
pub mod seed;
pub mod stats;

pub use connection::{TableCounts, connect, get_table_counts, test_connection};
pub use schema::ensure_schema;

use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};

/// Case-insensitive substring match: `LOWER(col) LIKE '%term%'`.
///
/// `%`, `_` and `\` in the term are matched literally.
pub(crate) fn contains_ci<T: IntoColumnRef>(col: T, term: &str) -> SimpleExpr {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(format!("%{escaped}%")).escape('\\'))
}

#[cfg(test)]
pub(crate) mod test_support {
    use sea_orm::DatabaseConnection;

    /// Fresh in-memory SQLite database with the schema applied.
    ///
    /// A single pooled connection keeps every query on the same in-memory database.
    pub async fn memory_db() -> DatabaseConnection {
        let db = super::connect("sqlite::memory:", 1).await.expect("open sqlite memory db");
        super::ensure_schema(&db).await.expect("create schema");
        db
    }
}
