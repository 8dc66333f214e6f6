pub mod assert;

use actix_web::web;
use anyhow::{anyhow, Context};
use diesel::{
    connection::SimpleConnection,
    r2d2::{ConnectionManager, CustomizeConnection},
    SqliteConnection,
};
use r2d2::PooledConnection;

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

const SCHEMA: &str = include_str!("../../migrations/schema.sql");

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn init_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .context("Failed to create pool")?;

    let mut conn = pool.get().context("DB connection")?;
    conn.batch_execute(SCHEMA).context("Failed to create schema")?;

    Ok(pool)
}

pub fn get_db_conn(pool: &DbPool) -> anyhow::Result<DbConn> {
    pool.get().context("DB connection")
}

/// Runs `f` with a pooled connection on the blocking thread pool.
pub async fn run<F, R>(pool: &DbPool, f: F) -> anyhow::Result<R>
where
    F: FnOnce(&mut SqliteConnection) -> anyhow::Result<R> + Send + 'static,
    R: Send + 'static,
{
    let mut conn = get_db_conn(pool)?;
    web::block(move || f(&mut *conn))
        .await
        .map_err(|err| anyhow!("{}", err))?
}

/// Single-connection in-memory database with the schema applied.
#[cfg(test)]
pub fn test_pool() -> DbPool {
    init_pool(":memory:", 1).expect("in-memory pool")
}
