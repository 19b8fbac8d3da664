//! MIB handler seam.
//!
//! The agent resolves every request through a [`MibHandler`] registered for
//! an OID prefix. Handlers run inline on the agent task and must not block.
//!
//! [`OidTable`] is a ready-made in-memory handler.

mod context;

pub use context::RequestContext;

use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::VarBind;
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Outcome of a GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetResult {
    /// The object's current value.
    Value(Value),
    /// No object at this OID. Answered with noSuchName.
    NoSuchObject,
}

/// Outcome of a GETNEXT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GetNextResult {
    /// The first object after the requested OID.
    Value(VarBind),
    /// Nothing follows the requested OID in this handler.
    EndOfMibView,
}

/// Outcome of a SET.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetResult {
    /// The value was stored.
    Ok,
    /// No object at this OID (noSuchName).
    NoSuchObject,
    /// The object is read-only (readOnly).
    NotWritable,
    /// The value has the wrong type for the object (badValue).
    WrongType,
    /// The value is out of range for the object (badValue).
    WrongValue,
    /// The store failed (genErr).
    GenErr,
}

/// Resolves OIDs to values for one registered subtree.
///
/// Only `get` and `get_next` are required; a handler that does not override
/// `set` is read-only.
pub trait MibHandler: Send + Sync {
    /// Value of exactly `oid`.
    fn get(&self, ctx: &RequestContext, oid: &Oid) -> GetResult;

    /// First object strictly after `oid`.
    fn get_next(&self, ctx: &RequestContext, oid: &Oid) -> GetNextResult;

    /// Store `value` at `oid`.
    fn set(&self, ctx: &RequestContext, oid: &Oid, value: &Value) -> SetResult {
        let _ = (ctx, oid, value);
        SetResult::NotWritable
    }

    /// Whether this handler answers for `oid`, given the prefix it was
    /// registered under.
    ///
    /// The default accepts every OID inside the prefix's subtree. GETNEXT
    /// also asks handlers whose prefix sorts after the requested OID.
    fn handles(&self, registered_prefix: &Oid, oid: &Oid) -> bool {
        oid.starts_with(registered_prefix)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    writable: bool,
}

/// In-memory OID table.
///
/// Entries are kept in OID order, so GETNEXT walks them lexicographically.
/// SET replaces the value of a writable entry if the new value has the same
/// type.
///
/// ```
/// use tiny_snmp::handler::{GetResult, MibHandler, OidTable, RequestContext};
/// use tiny_snmp::{Value, oid};
///
/// let table = OidTable::new()
///     .with(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0), Value::from("tiny-snmp"))
///     .with_writable(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("router1"));
///
/// let ctx = RequestContext::test_context();
/// assert_eq!(
///     table.get(&ctx, &oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)),
///     GetResult::Value(Value::from("tiny-snmp"))
/// );
/// ```
#[derive(Debug, Default)]
pub struct OidTable {
    entries: RwLock<BTreeMap<Oid, Entry>>,
}

impl OidTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a read-only entry.
    pub fn with(self, oid: Oid, value: Value) -> Self {
        self.insert(oid, value, false);
        self
    }

    /// Add a writable entry.
    pub fn with_writable(self, oid: Oid, value: Value) -> Self {
        self.insert(oid, value, true);
        self
    }

    /// Insert or replace an entry.
    pub fn insert(&self, oid: Oid, value: Value, writable: bool) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(oid, Entry { value, writable });
    }

    /// Current value at `oid`.
    pub fn value(&self, oid: &Oid) -> Option<Value> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(oid)
            .map(|entry| entry.value.clone())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MibHandler for OidTable {
    fn get(&self, _ctx: &RequestContext, oid: &Oid) -> GetResult {
        self.value(oid)
            .map(GetResult::Value)
            .unwrap_or(GetResult::NoSuchObject)
    }

    fn get_next(&self, _ctx: &RequestContext, oid: &Oid) -> GetNextResult {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .range(oid..)
            .find(|(k, _)| *k > oid)
            .map(|(k, entry)| GetNextResult::Value(VarBind::new(k.clone(), entry.value.clone())))
            .unwrap_or(GetNextResult::EndOfMibView)
    }

    fn set(&self, _ctx: &RequestContext, oid: &Oid, value: &Value) -> SetResult {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = entries.get_mut(oid) else {
            return SetResult::NoSuchObject;
        };
        if !entry.writable {
            return SetResult::NotWritable;
        }
        if entry.value.tag() != value.tag() {
            return SetResult::WrongType;
        }
        entry.value = value.clone();
        SetResult::Ok
    }
}
