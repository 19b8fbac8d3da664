//! Request context for MIB handlers.
//!
//! This module provides [`RequestContext`], which describes the incoming
//! request a handler is answering.

use std::net::SocketAddr;

use bytes::Bytes;

use crate::pdu::{PduType, RequestId};
use crate::version::Version;

/// Request context passed to MIB handlers.
///
/// # Example
///
/// ```rust
/// use tiny_snmp::handler::{GetNextResult, GetResult, MibHandler, RequestContext};
/// use tiny_snmp::{Oid, Value, oid};
///
/// struct LoggingHandler;
///
/// impl MibHandler for LoggingHandler {
///     fn get(&self, ctx: &RequestContext, oid: &Oid) -> GetResult {
///         println!("GET {} from {} ({})", oid, ctx.source, ctx.version);
///
///         if oid == &oid!(1, 3, 6, 1, 4, 1, 200, 1, 0) {
///             GetResult::Value(Value::Integer(42))
///         } else {
///             GetResult::NoSuchObject
///         }
///     }
///
///     fn get_next(&self, _ctx: &RequestContext, _oid: &Oid) -> GetNextResult {
///         GetNextResult::EndOfMibView
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Source address of the request.
    pub source: SocketAddr,

    /// SNMP version (V1 or V2c).
    pub version: Version,

    /// Community string the request was authenticated with.
    pub community: Bytes,

    /// Request ID from the PDU.
    pub request_id: RequestId,

    /// PDU type (GetRequest, GetNextRequest or SetRequest).
    pub pdu_type: PduType,
}

impl RequestContext {
    /// Create a minimal context for unit testing.
    pub fn test_context() -> Self {
        Self {
            source: SocketAddr::from(([127, 0, 0, 1], 0)),
            version: Version::V2c,
            community: Bytes::from_static(b"public"),
            request_id: RequestId::new(1),
            pdu_type: PduType::GetRequest,
        }
    }
}
