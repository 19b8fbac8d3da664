//! Command-line arguments for `tiny-snmpd`.

use clap::{ArgAction, Parser};
use std::sync::Arc;
use std::time::Duration;

use crate::agent::{AgentBuilder, DEFAULT_KEEP_ALIVE, DEFAULT_RETRIES};
use crate::handler::OidTable;
use crate::oid::Oid;
use crate::value::Value;

fn sys_descr() -> Oid {
    crate::oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)
}

fn sys_contact() -> Oid {
    crate::oid!(1, 3, 6, 1, 2, 1, 1, 4, 0)
}

fn sys_name() -> Oid {
    crate::oid!(1, 3, 6, 1, 2, 1, 1, 5, 0)
}

fn sys_location() -> Oid {
    crate::oid!(1, 3, 6, 1, 2, 1, 1, 6, 0)
}

/// Serve the MIB-II system group over SNMP v1/v2c.
#[derive(Debug, Parser)]
#[command(name = "tiny-snmpd", version, about)]
pub struct AgentArgs {
    /// UDP address to listen on.
    #[arg(short = 'b', long = "bind", default_value = "0.0.0.0:161")]
    pub bind: String,

    /// Accepted community string (repeatable).
    #[arg(short = 'c', long = "community", default_value = "public")]
    pub communities: Vec<String>,

    /// Value of sysDescr.0.
    #[arg(long = "sys-descr", default_value = "tiny-snmp agent")]
    pub sys_descr: String,

    /// Initial value of sysName.0 (writable).
    #[arg(long = "sys-name", default_value = "tiny-snmp")]
    pub sys_name: String,

    /// Initial value of sysContact.0 (writable).
    #[arg(long = "sys-contact", default_value = "")]
    pub sys_contact: String,

    /// Initial value of sysLocation.0 (writable).
    #[arg(long = "sys-location", default_value = "")]
    pub sys_location: String,

    /// Seconds between retransmissions of pending requests.
    #[arg(long = "keep-alive", default_value_t = DEFAULT_KEEP_ALIVE.as_secs())]
    pub keep_alive: u64,

    /// Retransmissions before a pending request is dropped.
    #[arg(short = 'r', long = "retries", default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Log filter directive, overrides -v (e.g. "tiny_snmp::agent=debug").
    #[arg(long = "log-level", value_name = "FILTER")]
    pub log_level: Option<String>,
}

impl AgentArgs {
    /// Initialize tracing from `--log-level` or the verbosity count.
    pub fn init_tracing(&self) {
        use tracing_subscriber::EnvFilter;

        let filter = self.log_filter();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// The filter directive `init_tracing` installs.
    pub fn log_filter(&self) -> String {
        if let Some(filter) = &self.log_level {
            return filter.clone();
        }
        match self.verbose {
            0 => "tiny_snmp=info",
            1 => "tiny_snmp=debug",
            _ => "tiny_snmp=trace",
        }
        .to_string()
    }

    /// Keep-alive interval as a Duration.
    pub fn keep_alive_duration(&self) -> Duration {
        Duration::from_secs(self.keep_alive)
    }

    /// The system group table served by the daemon.
    pub fn system_table(&self) -> OidTable {
        OidTable::new()
            .with(sys_descr(), Value::from(self.sys_descr.clone()))
            .with_writable(sys_contact(), Value::from(self.sys_contact.clone()))
            .with_writable(sys_name(), Value::from(self.sys_name.clone()))
            .with_writable(sys_location(), Value::from(self.sys_location.clone()))
    }

    /// Agent configuration from these arguments.
    pub fn agent_builder(&self) -> AgentBuilder {
        AgentBuilder::new()
            .bind(self.bind.clone())
            .communities(&self.communities)
            .keep_alive(self.keep_alive_duration())
            .retries(self.retries)
            .handler(
                crate::oid!(1, 3, 6, 1, 2, 1, 1),
                Arc::new(self.system_table()),
            )
    }
}
