//! Sign-in stub and the persisted session slot.
//!
//! Authentication is an exact, case-sensitive email lookup; the password is
//! accepted but never checked. The signed-in user is serialized to JSON and
//! kept in the `session_state` table under [`SESSION_KEY`], which is read
//! once at startup and rewritten on login and logout.

use crate::{
    core::store::EntityStore,
    entities::{SessionState, session_state},
    errors::Result,
    models::User,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Fixed key of the slot holding the signed-in user.
pub const SESSION_KEY: &str = "laikipiaUser";

/// Looks up the user registered under `email`.
///
/// The password is ignored: any value signs in a registered email.
#[must_use]
pub fn authenticate<'a>(store: &'a EntityStore, email: &str, _password: &str) -> Option<&'a User> {
    store.users().iter().find(|u| u.email == email)
}

/// Signs in and stores the user in the session slot.
///
/// Returns `Ok(None)` without touching the slot when the email is unknown.
#[instrument(skip(db, store, password))]
pub async fn login<C>(
    db: &C,
    store: &EntityStore,
    email: &str,
    password: &str,
) -> Result<Option<User>>
where
    C: ConnectionTrait,
{
    let Some(user) = authenticate(store, email, password) else {
        warn!("Login failed: no user registered with that email");
        return Ok(None);
    };

    write_slot(db, SESSION_KEY, &serde_json::to_string(user)?).await?;
    info!(user = %user.id, "Login successful");
    Ok(Some(user.clone()))
}

/// Reads the signed-in user back from the session slot.
///
/// A slot that does not hold a valid user record is logged, cleared, and
/// treated as signed out.
#[instrument(skip(db))]
pub async fn restore_session<C>(db: &C) -> Result<Option<User>>
where
    C: ConnectionTrait,
{
    let Some(raw) = read_slot(db, SESSION_KEY).await? else {
        debug!("No saved session");
        return Ok(None);
    };

    match serde_json::from_str::<User>(&raw) {
        Ok(user) => {
            debug!(user = %user.id, "Restored saved session");
            Ok(Some(user))
        }
        Err(e) => {
            warn!("Failed to parse saved user, discarding session: {e}");
            clear_slot(db, SESSION_KEY).await?;
            Ok(None)
        }
    }
}

/// Signs out by clearing the session slot.
#[instrument(skip(db))]
pub async fn logout<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    clear_slot(db, SESSION_KEY).await?;
    info!("Logged out");
    Ok(())
}

/// Reads a raw slot value.
pub async fn read_slot<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let state = SessionState::find()
        .filter(session_state::Column::Key.eq(key))
        .one(db)
        .await?;
    Ok(state.map(|s| s.value))
}

/// Inserts or replaces a raw slot value.
pub async fn write_slot<C>(db: &C, key: &str, value: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    let existing = SessionState::find()
        .filter(session_state::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: session_state::ActiveModel = state.into();
        active_model.value = Set(value.to_string());
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = session_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    Ok(())
}

/// Removes a slot; clearing an empty slot is not an error.
pub async fn clear_slot<C>(db: &C, key: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    SessionState::delete_many()
        .filter(session_state::Column::Key.eq(key))
        .exec(db)
        .await?;
    Ok(())
}
