//! Configuration management for batchren.
//!
//! User preferences and the last used rule ([`settings::Settings`]) are
//! stored as a TOML file, loaded at startup and saved on request.

pub mod settings;
