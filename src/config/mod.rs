/// Session database configuration and connection management
pub mod database;

/// Seed data loading from fixtures.toml
pub mod fixtures;

/// Runtime settings from environment variables
pub mod settings;
