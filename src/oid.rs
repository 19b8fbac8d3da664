//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u8; MAX_OID_LEN]>`: at most [`MAX_OID_LEN`]
//! arcs, each at most 255, with an explicit length. The inline capacity
//! equals the arc limit, so an `Oid` never touches the heap.
//!
//! Legacy byte arrays terminated by [`OID_TERMINATOR`] are accepted and
//! produced at the edges only ([`Oid::from_terminated`],
//! [`Oid::to_terminated`]). Arc 255 is a valid arc in an `Oid`, but it
//! cannot be written in terminated form.

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs (subidentifiers) in an OID.
///
/// Enforced during BER decoding and by every constructor.
pub const MAX_OID_LEN: usize = 20;

/// End-of-OID marker used by terminated arc arrays.
pub const OID_TERMINATOR: u8 = 0xFF;

/// Largest first subidentifier: `40 * 2 + 255`.
const MAX_FIRST_SUBIDENTIFIER: u32 = 80 + u8::MAX as u32;

/// Object Identifier.
///
/// Ordering is lexicographic over the arcs, which is the order GetNext
/// walks a MIB in.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Oid {
    arcs: SmallVec<[u8; MAX_OID_LEN]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    ///
    /// Fails if there are more than [`MAX_OID_LEN`] arcs.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiny_snmp::oid::Oid;
    ///
    /// let oid = Oid::new([1, 3, 6, 1]).unwrap();
    /// assert_eq!(oid.len(), 4);
    ///
    /// assert!(Oid::new(0..21).is_err());
    /// ```
    pub fn new(arcs: impl IntoIterator<Item = u8>) -> Result<Self> {
        let mut out = SmallVec::new();
        for (count, arc) in arcs.into_iter().enumerate() {
            if count == MAX_OID_LEN {
                return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                    count: count + 1,
                    max: MAX_OID_LEN,
                }));
            }
            out.push(arc);
        }
        Ok(Self { arcs: out })
    }

    /// Create an OID from a slice of arcs.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiny_snmp::oid::Oid;
    ///
    /// let oid = Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]).unwrap();
    /// assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
    /// ```
    pub fn from_slice(arcs: &[u8]) -> Result<Self> {
        if arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: arcs.len(),
                max: MAX_OID_LEN,
            }));
        }
        Ok(Self {
            arcs: SmallVec::from_slice(arcs),
        })
    }

    /// Create an OID from an arc array ended by [`OID_TERMINATOR`].
    ///
    /// Arcs after the first terminator are ignored. A slice without a
    /// terminator is taken whole.
    ///
    /// ```
    /// use tiny_snmp::oid::{Oid, OID_TERMINATOR};
    ///
    /// let oid = Oid::from_terminated(&[1, 3, OID_TERMINATOR, 0, 0]).unwrap();
    /// assert_eq!(oid.arcs(), &[1, 3]);
    /// ```
    pub fn from_terminated(arcs: &[u8]) -> Result<Self> {
        let end = arcs
            .iter()
            .position(|&arc| arc == OID_TERMINATOR)
            .unwrap_or(arcs.len());
        Self::from_slice(&arcs[..end])
    }

    /// Arcs followed by [`OID_TERMINATOR`].
    ///
    /// Fails with [`OidErrorKind::InvalidArc`] if any arc is 255, which the
    /// terminated form cannot tell apart from the end marker.
    pub fn to_terminated(&self) -> Result<SmallVec<[u8; MAX_OID_LEN + 1]>> {
        if self.arcs.contains(&OID_TERMINATOR) {
            return Err(Error::invalid_oid_with_input(
                OidErrorKind::InvalidArc,
                self.to_string(),
            ));
        }
        let mut out = SmallVec::from_slice(&self.arcs);
        out.push(OID_TERMINATOR);
        Ok(out)
    }

    /// Parse an OID from dotted string notation (e.g., "1.3.6.1.2.1.1.1.0").
    ///
    /// Every arc must fit in a `u8`. Arc constraints (X.690 Section 8.19.4)
    /// are not checked here; call [`validate()`](Self::validate) for that.
    ///
    /// # Examples
    ///
    /// ```
    /// use tiny_snmp::oid::Oid;
    ///
    /// let oid = Oid::parse("1.3.6.1.2.1.1.5.0").unwrap();
    /// assert!(oid.validate().is_ok());
    ///
    /// assert!(Oid::parse("1.3.6.1.256").is_err());
    /// assert!(Oid::parse("3.0").unwrap().validate().is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Ok(Self::empty());
        }

        let mut arcs = SmallVec::new();
        for part in s.split('.') {
            if part.is_empty() {
                continue;
            }

            let arc: u8 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;

            if arcs.len() == MAX_OID_LEN {
                return Err(Error::invalid_oid_with_input(
                    OidErrorKind::TooManyArcs {
                        count: s.split('.').filter(|p| !p.is_empty()).count(),
                        max: MAX_OID_LEN,
                    },
                    s,
                ));
            }
            arcs.push(arc);
        }

        Ok(Self { arcs })
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u8] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    ///
    /// An OID always starts with itself, and any OID starts with an empty OID.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.starts_with(&other.arcs)
    }

    /// Get the parent OID (all arcs except the last).
    ///
    /// Returns `None` if the OID is empty.
    pub fn parent(&self) -> Option<Oid> {
        let (_, rest) = self.arcs.split_last()?;
        Some(Oid {
            arcs: SmallVec::from_slice(rest),
        })
    }

    /// Create a child OID by appending an arc.
    ///
    /// Fails if the OID is already [`MAX_OID_LEN`] arcs long.
    ///
    /// ```
    /// use tiny_snmp::oid;
    ///
    /// let sys_name = oid!(1, 3, 6, 1, 2, 1, 1, 5);
    /// assert_eq!(sys_name.child(0).unwrap(), oid!(1, 3, 6, 1, 2, 1, 1, 5, 0));
    /// ```
    pub fn child(&self, arc: u8) -> Result<Oid> {
        if self.arcs.len() == MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: MAX_OID_LEN + 1,
                max: MAX_OID_LEN,
            }));
        }
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Ok(Oid { arcs })
    }

    /// Validate the OID for BER encoding (X.690 Section 8.19.4).
    ///
    /// - at least two arcs
    /// - arc1 is 0, 1, or 2
    /// - arc2 is at most 39 when arc1 is 0 or 1
    pub fn validate(&self) -> std::result::Result<(), OidErrorKind> {
        let [first, second, ..] = self.arcs[..] else {
            return Err(OidErrorKind::TooShort);
        };
        if first > 2 {
            return Err(OidErrorKind::InvalidFirstArc(first));
        }
        if first < 2 && second >= 40 {
            return Err(OidErrorKind::InvalidSecondArc { first, second });
        }
        Ok(())
    }

    /// Decode OBJECT IDENTIFIER content bytes (no tag or length).
    ///
    /// `base_offset` is the position of `data[0]` in the message and is only
    /// used for error offsets.
    pub(crate) fn decode_content(data: &[u8], base_offset: usize) -> Result<Oid> {
        if data.is_empty() {
            return Err(Error::decode(base_offset, DecodeErrorKind::EmptyOid));
        }

        let mut arcs: SmallVec<[u8; MAX_OID_LEN]> = SmallVec::new();
        let mut push = |arc: u8, at: usize| {
            if arcs.len() == MAX_OID_LEN {
                return Err(Error::decode(
                    at,
                    DecodeErrorKind::TooManyArcs { max: MAX_OID_LEN },
                ));
            }
            arcs.push(arc);
            Ok(())
        };

        let mut subid: u32 = 0;
        let mut first = true;
        for (i, &byte) in data.iter().enumerate() {
            let at = base_offset + i;
            subid = (subid << 7) | (byte & 0x7F) as u32;

            let limit = if first {
                MAX_FIRST_SUBIDENTIFIER
            } else {
                u8::MAX as u32
            };
            if subid > limit {
                return Err(Error::decode(at, DecodeErrorKind::SubidentifierOverflow));
            }

            if byte & 0x80 != 0 {
                continue;
            }

            if first {
                let x = (subid / 40).min(2);
                push(x as u8, at)?;
                push((subid - 40 * x) as u8, at)?;
                first = false;
            } else {
                push(subid as u8, at)?;
            }
            subid = 0;
        }

        if data[data.len() - 1] & 0x80 != 0 {
            return Err(Error::decode(
                base_offset + data.len() - 1,
                DecodeErrorKind::InvalidOidEncoding,
            ));
        }

        Ok(Oid { arcs })
    }

    /// Decode from BER content bytes (without tag and length).
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        Self::decode_content(data, 0)
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for arc in &self.arcs {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
            first = false;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Create an OID from literal arcs.
///
/// Arc constraints are not checked; [`Oid::validate`] runs at encode time.
/// Panics if more than [`MAX_OID_LEN`](crate::oid::MAX_OID_LEN) arcs are
/// given.
///
/// # Examples
///
/// ```
/// use tiny_snmp::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// assert!(sys_descr.starts_with(&oid!(1, 3, 6, 1, 2, 1, 1)));
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*]).expect("oid! takes at most MAX_OID_LEN arcs")
    };
}
