//! # tiny-snmp
//!
//! Small-footprint SNMP v1/v2c agent with a bounded BER codec.
//!
//! ## Features
//!
//! - BER encoding and decoding of INTEGER, OCTET STRING, NULL and OBJECT
//!   IDENTIFIER, with every length checked against fixed capacities
//! - One varbind per PDU, messages of at most 300 bytes
//! - Allocation-free encoding into caller-owned buffers
//! - Async agent on Tokio answering GET, GETNEXT and SET from pluggable
//!   MIB handlers, with retransmission of the requests it sends
//!
//! ## Decoding and encoding
//!
//! ```rust
//! use tiny_snmp::{Message, PduType, Value, VarBind, oid};
//!
//! let request = [
//!     0x30, 0x19, 0x02, 0x01, 0x00, 0x04, 0x06, b'p', b'u', b'b', b'l', b'i', b'c', 0xA0, 0x0C,
//!     0x02, 0x01, 0x01, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x01, 0x2B, 0x05,
//!     0x00,
//! ];
//! let msg = Message::decode_slice(&request)?;
//! assert_eq!(msg.pdu_type(), PduType::GetRequest);
//! assert_eq!(msg.oid(), &oid!(1, 3));
//!
//! let reply = msg.reply(msg.pdu.to_response_with(VarBind::new(oid!(1, 3), Value::Integer(42))));
//! let bytes = reply.encode()?;
//! assert_eq!(Message::decode(bytes)?, reply);
//! # Ok::<(), tiny_snmp::Error>(())
//! ```
//!
//! ## Agent
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tiny_snmp::{Agent, OidTable, Value, oid};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tiny_snmp::Error> {
//!     let system = OidTable::new()
//!         .with(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("tiny-snmp"));
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

pub mod agent;
pub mod ber;
pub mod error;
pub mod handler;
pub mod message;
pub mod oid;
pub mod pdu;
pub mod tracker;
pub mod value;
pub mod varbind;
pub mod version;

pub(crate) mod util;

#[cfg(feature = "cli")]
pub mod cli;

// Re-exports for convenience
pub use agent::{Agent, AgentBuilder};
pub use error::{
    DecodeErrorKind, EncodeErrorKind, Error, ErrorStatus, OidErrorKind, Result,
    check_error_status,
};
pub use handler::{GetNextResult, GetResult, MibHandler, OidTable, RequestContext, SetResult};
pub use message::Message;
pub use oid::Oid;
pub use pdu::{Pdu, PduType, RequestId};
pub use tracker::{PendingRequest, PendingRequests};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;
