//! Shared test infrastructure for tiny-snmp.
//!
//! Provides TestAgent (in-process SNMP agent), fixtures, and utilities.

// Allow dead code and unused imports since not all test files use all utilities
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod agent;
pub mod fixtures;

pub use agent::{TestAgent, TestAgentBuilder};
pub use fixtures::{
    COMMUNITY, SCENARIO_GET, nonexistent_oid, sys_contact, sys_descr, sys_location, sys_name,
    sys_services, sys_uptime, system_mib, system_subtree,
};
