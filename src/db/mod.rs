use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Encode, QueryBuilder, Sqlite, SqlitePool, Type,
};

pub mod clients;
pub mod companies;
pub mod financial;
pub mod orders;
pub mod products;
pub mod services;
pub mod terms;
pub mod users;

pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .read_only(false)
        .busy_timeout(Duration::from_secs(5));

    SqlitePool::connect_with(opts).await
}

/// A single-connection in-memory database; the connection is never recycled
/// so the schema lives as long as the pool.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Builds `UPDATE <table> SET ...` from the fields that are present.
pub struct PartialUpdate {
    builder: QueryBuilder<'static, Sqlite>,
    fields: usize,
}

impl PartialUpdate {
    pub fn new(table: &str) -> Self {
        PartialUpdate {
            builder: QueryBuilder::new(format!("UPDATE {} SET ", table)),
            fields: 0,
        }
    }

    pub fn set<T>(&mut self, column: &str, value: Option<T>) -> &mut Self
    where
        T: 'static + Encode<'static, Sqlite> + Type<Sqlite> + Send,
    {
        if let Some(value) = value {
            if self.fields > 0 {
                self.builder.push(", ");
            }
            self.builder.push(column).push(" = ").push_bind(value);
            self.fields += 1;
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields == 0
    }

    /// Runs the update restricted to one row of one company; returns rows affected.
    pub async fn execute_scoped(
        mut self,
        pool: &SqlitePool,
        id: i64,
        company_id: i64,
    ) -> Result<u64, sqlx::Error> {
        self.builder
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND company_id = ")
            .push_bind(company_id);
        let result = self.builder.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    pub async fn execute_by_id(mut self, pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        self.builder.push(" WHERE id = ").push_bind(id);
        let result = self.builder.build().execute(pool).await?;
        Ok(result.rows_affected())
    }
}

/// Deletes one row of one company; returns rows affected.
pub async fn delete_scoped(
    pool: &SqlitePool,
    table: &str,
    id: i64,
    company_id: i64,
) -> Result<u64, sqlx::Error> {
    let query = format!("DELETE FROM {} WHERE id = $1 AND company_id = $2", table);
    let result = sqlx::query(&query)
        .bind(id)
        .bind(company_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
