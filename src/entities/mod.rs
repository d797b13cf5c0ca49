//! Entity module - `SeaORM` entity definitions for the session database.
//! Campus data is held in memory; only the session slot table is persisted.

pub mod session_state;

pub use session_state::{
    Column as SessionStateColumn, Entity as SessionState, Model as SessionStateModel,
};
