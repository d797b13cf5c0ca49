//! Session state entity - Key-value slots for client-side session data.
//!
//! The only persisted state in the system: the signed-in user's serialized
//! record lives here under a fixed key and is read back once at startup.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Session slot database model - one row per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "session_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Slot key (e.g. `"laikipiaUser"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Serialized slot contents
    pub value: String,
    /// When the slot was last written
    pub updated_at: DateTime,
}

/// `SessionState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
