//! SNMP agent host.
//!
//! The agent answers GET, GETNEXT and SET requests from registered
//! [`MibHandler`]s, and tracks the requests it sends itself until the
//! matching GetResponse comes back.
//!
//! Everything runs in one task: [`Agent::run`] alternates between received
//! datagrams and the keep-alive tick, handling each datagram to completion
//! before taking the next.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tiny_snmp::agent::Agent;
//! use tiny_snmp::handler::OidTable;
//! use tiny_snmp::{Value, oid};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tiny_snmp::Error> {
//!     let system = OidTable::new()
//!         .with(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("tiny-snmp"))
//!         .with_writable(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("router1"));
//!
//!     let agent = Agent::builder()
//!         .bind("0.0.0.0:161")
//!         .community(b"public")
//!         .handler(oid!(1, 3, 6, 1, 2, 1, 1), Arc::new(system))
//!         .build()
//!         .await?;
//!
//!     agent.run().await
//! }
//! ```

mod request;
mod response;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::error::{Error, Result};
use crate::handler::MibHandler;
use crate::message::{MAX_COMMUNITY_STRING, MAX_UDP_SNMP, Message};
use crate::oid::Oid;
use crate::tracker::{PendingRequest, PendingRequests};
use crate::util::bind_udp_socket;

/// Default interval between retransmissions of pending requests.
pub const DEFAULT_KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Default number of retransmissions before a pending request is dropped.
pub const DEFAULT_RETRIES: u32 = 3;

/// Registered handler with its OID prefix.
pub(crate) struct RegisteredHandler {
    pub(crate) prefix: Oid,
    pub(crate) handler: Arc<dyn MibHandler>,
}

/// Builder for [`Agent`].
pub struct AgentBuilder {
    bind_addr: String,
    communities: Vec<Vec<u8>>,
    handlers: Vec<RegisteredHandler>,
    max_message_size: usize,
    keep_alive: Duration,
    retries: u32,
    cancel: Option<CancellationToken>,
}

impl AgentBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - Bind address: `0.0.0.0:161` (UDP)
    /// - Max message size: 300 bytes
    /// - Keep-alive: 5 seconds, 3 retries
    /// - No communities (all requests rejected)
    /// - No handlers registered
    pub fn new() -> Self {
        Self {
            bind_addr: "0.0.0.0:161".to_string(),
            communities: Vec::new(),
            handlers: Vec::new(),
            max_message_size: MAX_UDP_SNMP,
            keep_alive: DEFAULT_KEEP_ALIVE,
            retries: DEFAULT_RETRIES,
            cancel: None,
        }
    }

    /// Set the UDP bind address.
    ///
    /// Binding to port 161 typically requires privileges.
    ///
    /// ```rust,no_run
    /// use tiny_snmp::agent::Agent;
    ///
    /// # async fn example() -> Result<(), tiny_snmp::Error> {
    /// let agent = Agent::builder().bind("127.0.0.1:1161").community(b"public").build().await?;
    /// let agent = Agent::builder().bind("[::1]:1161").community(b"public").build().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Add an accepted community string.
    ///
    /// Requests with any other community are dropped. Communities longer
    /// than [`MAX_COMMUNITY_STRING`] make [`build`](Self::build) fail.
    pub fn community(mut self, community: &[u8]) -> Self {
        self.communities.push(community.to_vec());
        self
    }

    /// Add multiple community strings.
    pub fn communities<I, C>(mut self, communities: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        for c in communities {
            self.communities.push(c.as_ref().to_vec());
        }
        self
    }

    /// Register a MIB handler for an OID subtree.
    ///
    /// GET and SET go to the handler with the longest matching prefix.
    /// GETNEXT asks every handler and answers with the smallest successor.
    pub fn handler(mut self, prefix: Oid, handler: Arc<dyn MibHandler>) -> Self {
        self.handlers.push(RegisteredHandler { prefix, handler });
        self
    }

    /// Set the largest response the agent sends.
    ///
    /// Capped at [`MAX_UDP_SNMP`].
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size.min(MAX_UDP_SNMP);
        self
    }

    /// Set the interval at which pending requests are retransmitted.
    pub fn keep_alive(mut self, interval: Duration) -> Self {
        self.keep_alive = interval;
        self
    }

    /// Set how many times a pending request is retransmitted before it is
    /// dropped.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set a cancellation token for graceful shutdown.
    ///
    /// If not set, the agent creates its own token accessible via
    /// [`Agent::cancel`].
    pub fn cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Validate the configuration and bind the socket.
    pub async fn build(mut self) -> Result<Agent> {
        if let Some(community) = self
            .communities
            .iter()
            .find(|c| c.len() > MAX_COMMUNITY_STRING)
        {
            return Err(Error::Config(
                format!(
                    "community of {} bytes exceeds {} bytes",
                    community.len(),
                    MAX_COMMUNITY_STRING
                )
                .into(),
            ));
        }
        if self.keep_alive.is_zero() {
            return Err(Error::Config("keep-alive interval must be non-zero".into()));
        }

        let bind_addr: SocketAddr = self.bind_addr.parse().map_err(|_| {
            Error::Config(format!("invalid bind address: {}", self.bind_addr).into())
        })?;

        let socket = bind_udp_socket(bind_addr).await.map_err(|e| Error::Io {
            target: Some(bind_addr),
            source: e,
        })?;
        let local_addr = socket.local_addr().map_err(|e| Error::Io {
            target: Some(bind_addr),
            source: e,
        })?;

        // Longest prefix first, so the first match is the most specific.
        self.handlers
            .sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        tracing::info!(target: "tiny_snmp::agent", { snmp.local_addr = %local_addr, communities = self.communities.len(), handlers = self.handlers.len() }, "agent bound");

        Ok(Agent {
            inner: Arc::new(AgentInner {
                socket,
                local_addr,
                communities: self.communities,
                handlers: self.handlers,
                max_message_size: self.max_message_size,
                keep_alive: self.keep_alive,
                retries: self.retries,
                pending: Mutex::new(PendingRequests::new()),
                cancel: self.cancel.unwrap_or_default(),
            }),
        })
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Inner state shared across agent clones.
pub(crate) struct AgentInner {
    pub(crate) socket: UdpSocket,
    pub(crate) local_addr: SocketAddr,
    pub(crate) communities: Vec<Vec<u8>>,
    pub(crate) handlers: Vec<RegisteredHandler>,
    pub(crate) max_message_size: usize,
    pub(crate) keep_alive: Duration,
    pub(crate) retries: u32,
    pub(crate) pending: Mutex<PendingRequests>,
    pub(crate) cancel: CancellationToken,
}

/// SNMP agent.
///
/// Cloning is cheap; clones share the socket and the pending requests.
#[derive(Clone)]
pub struct Agent {
    pub(crate) inner: Arc<AgentInner>,
}

impl Agent {
    /// Create a builder for configuring the agent.
    pub fn builder() -> AgentBuilder {
        AgentBuilder::new()
    }

    /// Get the local address the agent is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    /// Get the cancellation token for this agent.
    ///
    /// Call `token.cancel()` to stop [`run`](Self::run).
    pub fn cancel(&self) -> CancellationToken {
        self.inner.cancel.clone()
    }

    /// Number of requests still waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.pending().len()
    }

    pub(crate) fn pending(&self) -> MutexGuard<'_, PendingRequests> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Send `message` to `target`.
    ///
    /// Request PDUs are tracked until a GetResponse with the same
    /// request-id arrives or the retry budget runs out. Responses are sent
    /// untracked.
    pub async fn send_request(&self, target: SocketAddr, message: Message) -> Result<()> {
        let payload = message.encode()?;
        let request_id = message.request_id();
        let tracked = message.pdu_type().is_request();

        // Track before sending so a fast response always finds its record.
        let handle = tracked.then(|| {
            self.pending()
                .append(PendingRequest::new(message, payload.clone(), target))
        });

        if let Err(e) = self.inner.socket.send_to(&payload, target).await {
            if let Some(handle) = handle {
                self.pending().remove_handle(handle);
            }
            tracing::warn!(target: "tiny_snmp::agent", { snmp.target = %target, snmp.request_id = request_id.value(), error = %e }, "failed to send request");
            return Err(Error::Io {
                target: Some(target),
                source: e,
            });
        }

        tracing::debug!(target: "tiny_snmp::agent", { snmp.target = %target, snmp.request_id = request_id.value(), tracked }, "request sent");
        Ok(())
    }

    /// Resend every pending request.
    ///
    /// Records that have already been retransmitted `retries` times are
    /// dropped instead. Returns the number of datagrams resent.
    pub async fn retransmit_pending(&self) -> usize {
        let retries = self.inner.retries;
        let resend: Vec<(Bytes, SocketAddr)> = {
            let mut pending = self.pending();
            let mut resend = Vec::with_capacity(pending.len());
            pending.retain(|record| {
                if record.attempts > retries {
                    tracing::debug!(target: "tiny_snmp::agent", { snmp.target = %record.target, snmp.request_id = record.request_id().value(), attempts = record.attempts }, "retry budget exhausted");
                    return false;
                }
                record.attempts += 1;
                resend.push((record.payload.clone(), record.target));
                true
            });
            resend
        };

        for (payload, target) in &resend {
            if let Err(e) = self.inner.socket.send_to(payload, *target).await {
                tracing::warn!(target: "tiny_snmp::agent", { snmp.target = %target, error = %e }, "failed to retransmit request");
            }
        }
        resend.len()
    }

    /// Run the agent until the cancellation token is triggered.
    ///
    /// Datagrams are handled one at a time in this task; the keep-alive
    /// tick retransmits pending requests between them.
    #[instrument(skip(self), err, fields(snmp.local_addr = %self.local_addr()))]
    pub async fn run(&self) -> Result<()> {
        // One spare byte so oversized datagrams are seen as such.
        let mut buf = [0u8; MAX_UDP_SNMP + 1];

        let mut keep_alive = tokio::time::interval(self.inner.keep_alive);
        keep_alive.set_missed_tick_behavior(MissedTickBehavior::Delay);
        keep_alive.tick().await;

        tracing::info!(target: "tiny_snmp::agent", "agent running");

        loop {
            tokio::select! {
                result = self.inner.socket.recv_from(&mut buf) => {
                    let (len, source) = result.map_err(|e| Error::Io {
                        target: None,
                        source: e,
                    })?;
                    if let Some(response) = self.handle_datagram(&buf[..len], source)
                        && let Err(e) = self.inner.socket.send_to(&response, source).await
                    {
                        tracing::warn!(target: "tiny_snmp::agent", { snmp.source = %source, error = %e }, "failed to send response");
                    }
                }
                _ = keep_alive.tick() => {
                    self.retransmit_pending().await;
                }
                _ = self.inner.cancel.cancelled() => {
                    tracing::info!(target: "tiny_snmp::agent", "agent shutdown requested");
                    return Ok(());
                }
            }
        }
    }
}
