//! tiny-snmpd: serve the MIB-II system group over SNMP v1/v2c.

use clap::Parser;
use std::process::ExitCode;
use tiny_snmp::cli::AgentArgs;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = AgentArgs::parse();
    args.init_tracing();

    let agent = match args.agent_builder().build().await {
        Ok(agent) => agent,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let cancel = agent.cancel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match agent.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
