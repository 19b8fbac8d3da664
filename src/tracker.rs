//! Pending-request tracker.
//!
//! Outstanding requests sent by the agent, kept in send order until the
//! matching GetResponse arrives or the retry budget runs out.
//!
//! Records live in an arena of slots. Each occupied slot links to the next
//! record by index, so the list is singly linked without owning pointers;
//! `head` and `tail` give O(1) access to both ends. Freed slots go on a free
//! list and are reused by later appends.

use crate::message::Message;
use crate::pdu::RequestId;
use bytes::Bytes;
use std::net::SocketAddr;

/// An outstanding request.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// The request as sent.
    pub message: Message,
    /// Encoded form, resent unchanged on retransmission.
    pub payload: Bytes,
    /// Where the request was sent.
    pub target: SocketAddr,
    /// Number of times the request has been sent.
    pub attempts: u32,
}

impl PendingRequest {
    /// Create a record for a request sent once.
    pub fn new(message: Message, payload: Bytes, target: SocketAddr) -> Self {
        Self {
            message,
            payload,
            target,
            attempts: 1,
        }
    }

    /// Request ID of the tracked message.
    pub fn request_id(&self) -> RequestId {
        self.message.request_id()
    }
}

/// Stable reference to a tracked record.
///
/// A handle goes stale once its record is removed, even if the slot is
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestHandle {
    index: usize,
    generation: u32,
}

#[derive(Debug)]
enum Slot {
    Occupied {
        record: PendingRequest,
        next: Option<usize>,
        generation: u32,
    },
    Vacant {
        next_free: Option<usize>,
        generation: u32,
    },
}

/// Singly-linked list of pending requests over an index arena.
#[derive(Debug, Default)]
pub struct PendingRequests {
    slots: Vec<Slot>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Option<usize>,
    len: usize,
}

impl PendingRequests {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a record at the tail.
    pub fn append(&mut self, record: PendingRequest) -> RequestHandle {
        let (index, generation) = match self.free {
            Some(index) => {
                let (next_free, generation) = match self.slots[index] {
                    Slot::Vacant {
                        next_free,
                        generation,
                    } => (next_free, generation),
                    Slot::Occupied { .. } => unreachable!("free list points at an occupied slot"),
                };
                self.free = next_free;
                self.slots[index] = Slot::Occupied {
                    record,
                    next: None,
                    generation,
                };
                (index, generation)
            }
            None => {
                self.slots.push(Slot::Occupied {
                    record,
                    next: None,
                    generation: 0,
                });
                (self.slots.len() - 1, 0)
            }
        };

        match self.tail {
            Some(tail) => self.set_next(tail, Some(index)),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;

        tracing::trace!(target: "tiny_snmp::tracker", { slot = index, pending = self.len }, "request appended");
        RequestHandle { index, generation }
    }

    /// Iterate over pending records from oldest to newest.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tracker: self,
            cursor: self.head,
        }
    }

    /// Get a record by handle.
    pub fn get(&self, handle: RequestHandle) -> Option<&PendingRequest> {
        match self.slots.get(handle.index)? {
            Slot::Occupied {
                record, generation, ..
            } if *generation == handle.generation => Some(record),
            _ => None,
        }
    }

    /// Get a mutable record by handle.
    pub fn get_mut(&mut self, handle: RequestHandle) -> Option<&mut PendingRequest> {
        match self.slots.get_mut(handle.index)? {
            Slot::Occupied {
                record, generation, ..
            } if *generation == handle.generation => Some(record),
            _ => None,
        }
    }

    /// Unlink and return the first record matching `predicate`.
    pub fn remove<F>(&mut self, mut predicate: F) -> Option<PendingRequest>
    where
        F: FnMut(&PendingRequest) -> bool,
    {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let (record, next) = self.occupied(index)?;
            if predicate(record) {
                return Some(self.unlink(prev, index, next));
            }
            prev = Some(index);
            cursor = next;
        }
        None
    }

    /// Unlink and return the record behind `handle`.
    pub fn remove_handle(&mut self, handle: RequestHandle) -> Option<PendingRequest> {
        self.get(handle)?;
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let (_, next) = self.occupied(index)?;
            if index == handle.index {
                return Some(self.unlink(prev, index, next));
            }
            prev = Some(index);
            cursor = next;
        }
        None
    }

    /// Unlink and return the record for `request_id` sent to `target`.
    pub fn remove_request_id(
        &mut self,
        request_id: RequestId,
        target: SocketAddr,
    ) -> Option<PendingRequest> {
        self.remove(|record| record.request_id() == request_id && record.target == target)
    }

    /// Keep only the records for which `f` returns `true`.
    ///
    /// `f` sees every record once, oldest first, and may modify it.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut PendingRequest) -> bool,
    {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let (keep, next) = match &mut self.slots[index] {
                Slot::Occupied { record, next, .. } => (f(record), *next),
                Slot::Vacant { .. } => break,
            };
            if keep {
                prev = Some(index);
            } else {
                self.unlink(prev, index, next);
            }
            cursor = next;
        }
    }

    /// Drop every record.
    pub fn clear(&mut self) {
        self.retain(|_| false);
    }

    fn occupied(&self, index: usize) -> Option<(&PendingRequest, Option<usize>)> {
        match &self.slots[index] {
            Slot::Occupied { record, next, .. } => Some((record, *next)),
            Slot::Vacant { .. } => None,
        }
    }

    fn set_next(&mut self, index: usize, link: Option<usize>) {
        if let Slot::Occupied { next, .. } = &mut self.slots[index] {
            *next = link;
        }
    }

    fn unlink(&mut self, prev: Option<usize>, index: usize, next: Option<usize>) -> PendingRequest {
        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        if self.tail == Some(index) {
            self.tail = prev;
        }

        let generation = match &self.slots[index] {
            Slot::Occupied { generation, .. } | Slot::Vacant { generation, .. } => *generation,
        };
        let vacant = Slot::Vacant {
            next_free: self.free,
            generation: generation.wrapping_add(1),
        };
        self.free = Some(index);
        self.len -= 1;

        tracing::trace!(target: "tiny_snmp::tracker", { slot = index, pending = self.len }, "request removed");
        match std::mem::replace(&mut self.slots[index], vacant) {
            Slot::Occupied { record, .. } => record,
            Slot::Vacant { .. } => unreachable!("unlinked a vacant slot"),
        }
    }
}

/// Forward iterator over [`PendingRequests`], oldest first.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    tracker: &'a PendingRequests,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a PendingRequest;

    fn next(&mut self) -> Option<Self::Item> {
        let (record, next) = self.tracker.occupied(self.cursor?)?;
        self.cursor = next;
        Some(record)
    }
}

impl<'a> IntoIterator for &'a PendingRequests {
    type Item = &'a PendingRequest;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
