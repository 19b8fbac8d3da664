//! Response encoding within the agent's message size limit.

use bytes::Bytes;
use std::net::SocketAddr;

use crate::error::{EncodeErrorKind, Error, ErrorStatus};
use crate::message::{MAX_UDP_SNMP, Message};

use super::Agent;

impl Agent {
    /// Encode `response` into at most `max_message_size` bytes.
    ///
    /// A response that does not fit is replaced by a tooBig response to
    /// `request`; a handler value that cannot be encoded at all becomes
    /// genErr. If the fallback does not fit either, nothing is sent.
    pub(super) fn encode_response(
        &self,
        request: &Message,
        response: Message,
        source: SocketAddr,
    ) -> Option<Bytes> {
        let mut out = [0u8; MAX_UDP_SNMP];
        let limit = self.inner.max_message_size;

        let fallback = match response.encode_into(&mut out[..limit]) {
            Ok(len) => return Some(Bytes::copy_from_slice(&out[..len])),
            Err(e) => match e {
                Error::Encode {
                    kind: EncodeErrorKind::BufferTooSmall { .. },
                } => {
                    tracing::debug!(target: "tiny_snmp::agent", { snmp.source = %source, max = limit }, "response too big");
                    request.pdu.to_error_response(ErrorStatus::TooBig, 0)
                }
                e => {
                    tracing::debug!(target: "tiny_snmp::agent", { snmp.source = %source, error = %e }, "response not encodable");
                    request.pdu.to_error_response(ErrorStatus::GenErr, 1)
                }
            },
        };

        match request.reply(fallback).encode_into(&mut out[..limit]) {
            Ok(len) => Some(Bytes::copy_from_slice(&out[..len])),
            Err(e) => {
                tracing::debug!(target: "tiny_snmp::agent", { snmp.source = %source, error = %e }, "dropping response that cannot fit");
                None
            }
        }
    }
}
