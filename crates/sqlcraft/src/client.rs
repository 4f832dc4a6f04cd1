//! Driver seam between [`Database`](crate::Database) and a database client.

use crate::config::Credentials;
use crate::dialect::Dialect;
use crate::value::SqlValue;
use tokio::task::JoinHandle;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};

/// A single open session with a database server.
///
/// Implementations only move SQL text and bound parameters to the server and
/// rows back; all statement construction happens before this trait is reached.
pub trait Connection: Send + Sync + Sized {
    /// Row type produced by the driver.
    type Row: Send;
    /// Error type produced by the driver.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Placeholder and DDL dialect the server expects.
    fn dialect(&self) -> Dialect;

    /// Open a session.
    fn connect(
        credentials: &Credentials,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> + Send;

    /// Run one statement and return its rows in server order.
    ///
    /// Statements that produce no rows return an empty vector.
    fn execute(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl std::future::Future<Output = Result<Vec<Self::Row>, Self::Error>> + Send;

    /// End the session.
    fn close(self) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send;
}

/// PostgreSQL session over `tokio-postgres`.
///
/// The driver's connection future runs on a spawned tokio task for the
/// lifetime of the session, so a tokio runtime must be active.
pub struct PgConnection {
    client: Client,
    task: JoinHandle<()>,
}

impl PgConnection {
    /// Connect with an explicit driver configuration.
    pub async fn connect_with(config: &tokio_postgres::Config) -> Result<Self, tokio_postgres::Error> {
        let (client, connection) = config.connect(NoTls).await?;
        let task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(target: "sqlcraft.sql", error = %e, "postgres connection task ended");
            }
        });
        Ok(Self { client, task })
    }

    /// Access the underlying `tokio_postgres::Client`.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl std::fmt::Debug for PgConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnection")
            .field("closed", &self.client.is_closed())
            .finish_non_exhaustive()
    }
}

impl Connection for PgConnection {
    type Row = Row;
    type Error = tokio_postgres::Error;

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn connect(credentials: &Credentials) -> Result<Self, Self::Error> {
        Self::connect_with(&credentials.to_pg_config()).await
    }

    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, Self::Error> {
        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        self.client.query(sql, &params).await
    }

    async fn close(self) -> Result<(), Self::Error> {
        // Dropping the client lets the connection future resolve.
        drop(self.client);
        if let Err(e) = self.task.await {
            tracing::warn!(target: "sqlcraft.sql", error = %e, "postgres connection task did not finish cleanly");
        }
        Ok(())
    }
}
