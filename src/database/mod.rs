pub mod connection;
pub mod setup;
pub mod tournaments;

pub use connection::{create_pool, get_connection, DbConn, DbPool};
