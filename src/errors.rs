//! Unified error type for the attendance core.
//!
//! Lookups never fail: absence is reported as `None`. Errors are reserved for
//! configuration problems, fixture sets that break the store invariants,
//! write-back against unknown entities, and session slot I/O.

use thiserror::Error;

/// Every failure the attendance core can report.
#[derive(Debug, Error)]
pub enum Error {
    /// An environment setting is malformed or out of range
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the setting
        message: String,
    },

    /// Fixture data is unreadable or breaks a store invariant
    #[error("Invalid fixture data: {message}")]
    InvalidFixture {
        /// The broken rule and the offending value
        message: String,
    },

    /// No generated schedule has this id
    #[error("Class schedule not found: {id}")]
    ScheduleNotFound {
        /// Requested schedule id
        id: String,
    },

    /// No registered user has this id
    #[error("User not found: {id}")]
    UserNotFound {
        /// Requested user id
        id: String,
    },

    /// Attendance can only be recorded for students
    #[error("User {id} is not a student")]
    NotAStudent {
        /// Id of the non-student user
        id: String,
    },

    /// No schedule carries this check-in token
    #[error("Unknown QR token: {token}")]
    InvalidQrToken {
        /// Token as presented
        token: String,
    },

    /// The highest `attNNN` id in use is already `u32::MAX`
    #[error("No attendance ids left above att{highest}")]
    AttendanceIdsExhausted {
        /// Highest numeric id in use
        highest: u32,
    },

    /// Session database failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Stored session record could not be encoded or decoded
    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
