//! CLI subcommand implementations for the `brandaudit` binary.

pub mod audit_cmd;
pub mod compare_cmd;
pub mod doctor;
pub mod history_cmd;
pub mod list_cmd;
pub mod output;
pub mod show_cmd;
