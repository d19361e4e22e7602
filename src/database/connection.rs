use anyhow::{Context, Result};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

pub type DbPool = r2d2::Pool<SqliteConnectionManager>;
pub type DbConn = r2d2::PooledConnection<SqliteConnectionManager>;

pub fn create_pool<P: AsRef<Path>>(database_path: P) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(database_path.as_ref());
    build_pool(manager)
}

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    // A single writer; the file is rebuilt from scratch each run
    r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .context("Failed to create database connection pool")
}

pub fn get_connection(pool: &DbPool) -> Result<DbConn> {
    pool.get()
        .context("Failed to get database connection from pool")
}
