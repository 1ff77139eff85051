#[macro_use]
extern crate diesel;

mod enums;
mod error;
mod schema;

pub mod memory;
pub mod object_id;
pub mod pg;
pub mod pr_reviewers;
pub mod pull_requests;
pub mod stats;
pub mod store;
pub mod teams;
pub mod users;


pub use enums::*;
pub use error::*;
pub use memory::MemoryStore;
pub use pg::PgStore;
pub use store::*;

use async_trait::async_trait;
use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness};

pub type Pool = deadpool_diesel::postgres::Pool;

pub const MIGRATIONS: EmbeddedMigrations = diesel_migrations::embed_migrations!();

pub fn connect(conn_str: &str, max_connections: usize) -> Result<Pool, impl std::error::Error> {
    let manager =
        deadpool_diesel::postgres::Manager::new(conn_str, deadpool_diesel::Runtime::Tokio1);
    deadpool_diesel::Pool::builder(manager)
        .max_size(max_connections)
        .build()
}

/// Apply any migrations that have not run yet on this database.
pub async fn run_migrations(pool: &Pool) -> Result<usize, Error> {
    pool.interact(|conn| {
        conn.run_pending_migrations(MIGRATIONS)
            .map(|applied| applied.len())
            .map_err(|e| Error::Migration(e.to_string()))
    })
    .await
}

#[async_trait]
pub trait PoolExt<F, RETVAL, ERR>
where
    F: (FnOnce(&mut PgConnection) -> Result<RETVAL, ERR>) + Send + 'static,
    RETVAL: Send + 'static,
    ERR: Send + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, ERR>;
    async fn transaction(&self, f: F) -> Result<RETVAL, ERR>;
}

#[async_trait]
impl<F, RETVAL, ERR> PoolExt<F, RETVAL, ERR> for Pool
where
    F: (FnOnce(&mut PgConnection) -> Result<RETVAL, ERR>) + Send + 'static,
    RETVAL: Send + 'static,
    ERR: From<diesel::result::Error> + From<Error> + Send + 'static,
{
    async fn interact(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await.map_err(Error::from)?;
        let result = conn
            .interact(move |conn| f(conn))
            .await
            .map_err(Error::from)??;
        Ok(result)
    }

    async fn transaction(&self, f: F) -> Result<RETVAL, ERR> {
        let conn = self.get().await.map_err(Error::from)?;
        let result = conn
            .interact(move |conn| conn.transaction(move |conn| f(conn)))
            .await
            .map_err(Error::from)??;
        Ok(result)
    }
}

sql_function! {
    /// Postgres `random()`, used to draw reviewers in no particular order.
    fn random() -> diesel::sql_types::Double;
}
