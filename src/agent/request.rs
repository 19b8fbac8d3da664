//! Inbound datagram handling.

use bytes::Bytes;
use std::net::SocketAddr;
use subtle::ConstantTimeEq;

use crate::error::ErrorStatus;
use crate::handler::{GetNextResult, GetResult, RequestContext, SetResult};
use crate::message::Message;
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType};
use crate::varbind::VarBind;

use super::{Agent, RegisteredHandler};

impl Agent {
    /// Process one received datagram.
    ///
    /// Returns the encoded reply, or `None` when nothing should be sent:
    /// the datagram did not decode, carried an unknown community, was a
    /// GetResponse to one of our own requests, carried a nonzero
    /// error-status, or the reply could not be made to fit the maximum
    /// message size.
    ///
    /// A GetResponse clears the matching pending request whatever its
    /// error-status.
    pub fn handle_datagram(&self, data: &[u8], source: SocketAddr) -> Option<Bytes> {
        let message = match Message::decode_slice_unchecked(data) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!(target: "tiny_snmp::agent", { snmp.source = %source, error = %e }, "dropping undecodable datagram");
                return None;
            }
        };

        if !self.validate_community(&message.community) {
            tracing::debug!(target: "tiny_snmp::agent", { snmp.source = %source }, "invalid community string");
            return None;
        }

        let pdu = &message.pdu;
        if pdu.pdu_type == PduType::GetResponse {
            self.correlate_response(&message, source);
            return None;
        }
        if let Err(e) = pdu.check_status() {
            tracing::debug!(target: "tiny_snmp::agent", { snmp.source = %source, snmp.request_id = pdu.request_id.value(), error = %e }, "dropping request with error status");
            return None;
        }

        let ctx = RequestContext {
            source,
            version: message.version,
            community: message.community.clone(),
            request_id: pdu.request_id,
            pdu_type: pdu.pdu_type,
        };

        tracing::trace!(target: "tiny_snmp::agent", { snmp.source = %source, snmp.pdu_type = %pdu.pdu_type, snmp.request_id = pdu.request_id.value(), snmp.oid = %pdu.varbind.oid }, "request");

        let response = match pdu.pdu_type {
            PduType::GetRequest => self.handle_get(&ctx, pdu),
            PduType::GetNextRequest => self.handle_get_next(&ctx, pdu),
            PduType::SetRequest => self.handle_set(&ctx, pdu),
            PduType::GetResponse => return None,
        };

        self.encode_response(&message, message.reply(response), source)
    }

    /// Check a community string against the configured ones.
    ///
    /// Every configured community is compared in constant time, whether or
    /// not an earlier one matched.
    pub(crate) fn validate_community(&self, community: &[u8]) -> bool {
        let mut valid = false;
        for configured in &self.inner.communities {
            if configured.len() == community.len()
                && bool::from(configured.as_slice().ct_eq(community))
            {
                valid = true;
            }
        }
        valid
    }

    /// Handler registered under the longest prefix that answers for `oid`.
    pub(crate) fn find_handler(&self, oid: &Oid) -> Option<&RegisteredHandler> {
        self.inner
            .handlers
            .iter()
            .find(|registered| registered.handler.handles(&registered.prefix, oid))
    }

    fn handle_get(&self, ctx: &RequestContext, pdu: &Pdu) -> Pdu {
        let oid = &pdu.varbind.oid;
        let result = match self.find_handler(oid) {
            Some(registered) => registered.handler.get(ctx, oid),
            None => GetResult::NoSuchObject,
        };

        match result {
            GetResult::Value(value) => pdu.to_response_with(VarBind::new(oid.clone(), value)),
            GetResult::NoSuchObject => pdu.to_error_response(ErrorStatus::NoSuchName, 1),
        }
    }

    fn handle_get_next(&self, ctx: &RequestContext, pdu: &Pdu) -> Pdu {
        match self.get_next_varbind(ctx, &pdu.varbind.oid) {
            Some(next) => pdu.to_response_with(next),
            None => pdu.to_error_response(ErrorStatus::NoSuchName, 1),
        }
    }

    /// Smallest successor of `oid` offered by any handler.
    fn get_next_varbind(&self, ctx: &RequestContext, oid: &Oid) -> Option<VarBind> {
        let mut best: Option<VarBind> = None;

        for registered in &self.inner.handlers {
            if let GetNextResult::Value(next) = registered.handler.get_next(ctx, oid)
                && next.oid > *oid
            {
                match &best {
                    Some(current) if next.oid >= current.oid => {}
                    _ => best = Some(next),
                }
            }
        }

        best
    }

    fn handle_set(&self, ctx: &RequestContext, pdu: &Pdu) -> Pdu {
        let oid = &pdu.varbind.oid;
        let result = match self.find_handler(oid) {
            Some(registered) => registered.handler.set(ctx, oid, &pdu.varbind.value),
            None => SetResult::NoSuchObject,
        };

        let status = match result {
            SetResult::Ok => return pdu.to_response(),
            SetResult::NoSuchObject => ErrorStatus::NoSuchName,
            SetResult::NotWritable => ErrorStatus::ReadOnly,
            SetResult::WrongType | SetResult::WrongValue => ErrorStatus::BadValue,
            SetResult::GenErr => ErrorStatus::GenErr,
        };
        tracing::debug!(target: "tiny_snmp::agent", { snmp.source = %ctx.source, snmp.oid = %oid, status = %status }, "SET rejected");
        pdu.to_error_response(status, 1)
    }

    /// Match a GetResponse against the pending requests.
    ///
    /// Only a response from the host the request was sent to clears it.
    /// An error response satisfies the request like any other.
    fn correlate_response(&self, message: &Message, source: SocketAddr) {
        let request_id = message.request_id();
        match self.pending().remove_request_id(request_id, source) {
            Some(record) => {
                tracing::debug!(target: "tiny_snmp::agent", { snmp.source = %source, snmp.request_id = request_id.value(), attempts = record.attempts, snmp.error_status = %message.pdu.error_status_enum() }, "response matched pending request");
            }
            None => {
                tracing::debug!(target: "tiny_snmp::agent", { snmp.source = %source, snmp.request_id = request_id.value() }, "response matches no pending request");
            }
        }
    }
}
