// src/application/commands/mod.rs
//
// Command Handlers
//
// ARCHITECTURE:
// - Commands are thin adapters between callers and services
// - Commands accept raw identifiers, return DTOs
// - Commands convert errors into serialized ErrorResponse values
// - Commands NEVER contain business logic

pub mod catalog_commands;
pub mod search_commands;
pub mod statistics_commands;
pub mod update_commands;

pub use catalog_commands::*;
pub use search_commands::*;
pub use statistics_commands::*;
pub use update_commands::*;
