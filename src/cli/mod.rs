//! Command-line support for the `tiny-snmpd` daemon.

pub mod args;

pub use args::AgentArgs;
