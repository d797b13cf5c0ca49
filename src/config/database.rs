//! Session database configuration.
//!
//! The session slot is the only persisted state. This module opens the `SQLite`
//! connection through `SeaORM` and creates the `session_state` table from its
//! entity definition, so the schema always matches the Rust struct.

use crate::entities::SessionState;
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, instrument};

/// Default location of the session database when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/attendance.sqlite?mode=rwc";

/// Connects to the given database URL and makes sure the session table exists.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to session database");
    let db = Database::connect(database_url).await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Creates the `session_state` table if it is not there yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut session_table = schema.create_table_from_entity(SessionState);
    session_table.if_not_exists();

    db.execute(builder.build(&session_table)).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::SessionStateModel;
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_connection_in_memory() -> Result<()> {
        let db = create_connection("sqlite::memory:").await?;

        let _: Vec<SessionStateModel> = SessionState::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let rows: Vec<SessionStateModel> = SessionState::find().all(&db).await?;
        assert!(rows.is_empty());
        Ok(())
    }
}
