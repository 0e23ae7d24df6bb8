//! # Registrar DB
//!
//! Database pool initialization for the Registrar service layer, using
//! SQLx with PostgreSQL.
//!
//! # Example
//!
//! ```ignore
//! use registrar_db::init_db_pool;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = init_db_pool().await;
//!     // Pass &pool into every service operation
//! }
//! ```

use sqlx::postgres::PgPoolOptions;
use std::env;

/// Initializes a PostgreSQL connection pool.
///
/// Reads the database URL from the `DATABASE_URL` environment variable
/// and creates a connection pool. The returned pool is cheaply
/// cloneable; call this once at startup and pass a reference into each
/// service operation.
///
/// # Panics
///
/// Panics if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
pub async fn init_db_pool() -> sqlx::PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
