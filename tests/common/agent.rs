//! In-process SNMP agent for testing.
//!
//! Wraps the library's Agent with automatic lifecycle management.
//! Agents bind to ephemeral localhost ports and shut down cleanly on drop.

use crate::common::fixtures;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tiny_snmp::message::MAX_UDP_SNMP;
use tiny_snmp::{Agent, Message, OidTable};
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// How long a test waits for a reply before deciding none is coming.
pub const REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// An in-process SNMP agent for testing.
///
/// Automatically starts on creation and stops on drop. A client socket
/// bound to localhost talks to it.
pub struct TestAgent {
    agent: Agent,
    table: Arc<OidTable>,
    client: UdpSocket,
    cancel: CancellationToken,
    _task: JoinHandle<()>,
}

impl TestAgent {
    /// Create an agent serving the standard system MIB.
    pub async fn new() -> Self {
        TestAgentBuilder::new().build().await
    }

    /// Get the agent's listening address.
    pub fn addr(&self) -> SocketAddr {
        self.agent.local_addr()
    }

    /// The running agent.
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// The MIB table behind the agent.
    pub fn table(&self) -> &OidTable {
        &self.table
    }

    /// The client socket used by `send` and `recv`.
    pub fn client(&self) -> &UdpSocket {
        &self.client
    }

    /// Send raw bytes to the agent.
    pub async fn send(&self, data: &[u8]) {
        self.client
            .send_to(data, self.addr())
            .await
            .expect("send to test agent");
    }

    /// Wait for the next datagram, or `None` after [`REPLY_TIMEOUT`].
    pub async fn recv(&self) -> Option<Vec<u8>> {
        let mut buf = [0u8; MAX_UDP_SNMP + 1];
        match tokio::time::timeout(REPLY_TIMEOUT, self.client.recv_from(&mut buf)).await {
            Ok(Ok((len, _))) => Some(buf[..len].to_vec()),
            Ok(Err(e)) => panic!("recv from test agent: {}", e),
            Err(_) => None,
        }
    }

    /// Send raw bytes and return the raw reply, if any.
    pub async fn exchange_raw(&self, data: &[u8]) -> Option<Vec<u8>> {
        self.send(data).await;
        self.recv().await
    }

    /// Send a message and decode the reply.
    pub async fn exchange(&self, request: &Message) -> tiny_snmp::Result<Message> {
        let reply = self
            .exchange_raw(&request.encode()?)
            .await
            .expect("test agent did not reply");
        Message::decode_slice(&reply)
    }

    /// Explicitly stop the agent.
    ///
    /// Called automatically on drop, but can be called early if needed.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for TestAgent {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Builder for TestAgent.
pub struct TestAgentBuilder {
    table: OidTable,
    communities: Vec<Vec<u8>>,
    max_message_size: Option<usize>,
    keep_alive: Option<Duration>,
    retries: Option<u32>,
}

impl TestAgentBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            table: fixtures::system_mib(),
            communities: vec![fixtures::COMMUNITY.to_vec()],
            max_message_size: None,
            keep_alive: None,
            retries: None,
        }
    }

    /// Set the MIB table.
    pub fn table(mut self, table: OidTable) -> Self {
        self.table = table;
        self
    }

    /// Replace the accepted communities.
    pub fn communities(mut self, communities: &[&[u8]]) -> Self {
        self.communities = communities.iter().map(|c| c.to_vec()).collect();
        self
    }

    /// Set the maximum response size.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = Some(size);
        self
    }

    /// Set the retransmission interval.
    pub fn keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = Some(interval);
        self
    }

    /// Set the retry budget.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Build and start the agent.
    pub async fn build(self) -> TestAgent {
        let cancel = CancellationToken::new();
        let table = Arc::new(self.table);

        let mut builder = Agent::builder()
            .bind("127.0.0.1:0")
            .communities(&self.communities)
            .cancel(cancel.clone())
            .handler(tiny_snmp::oid!(1, 3), table.clone());
        if let Some(size) = self.max_message_size {
            builder = builder.max_message_size(size);
        }
        if let Some(interval) = self.keep_alive {
            builder = builder.keep_alive(interval);
        }
        if let Some(retries) = self.retries {
            builder = builder.retries(retries);
        }
        let agent = builder.build().await.expect("failed to build test agent");

        let task = tokio::spawn({
            let agent = agent.clone();
            async move {
                if let Err(e) = agent.run().await {
                    eprintln!("TestAgent error: {}", e);
                }
            }
        });

        let client = UdpSocket::bind("127.0.0.1:0")
            .await
            .expect("bind test client");

        TestAgent {
            agent,
            table,
            client,
            cancel,
            _task: task,
        }
    }
}

impl Default for TestAgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
