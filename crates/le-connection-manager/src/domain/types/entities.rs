//! Core Domain Entities for Connection Admission

use std::fmt;
use std::str::FromStr;

use super::errors::AddressParseError;

/// 48-bit Bluetooth device address.
///
/// Bytes are stored in display order, so `[0xAA, .., 0xFF]` renders as
/// `AA:BB:CC:DD:EE:FF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceAddress(pub [u8; 6]);

impl DeviceAddress {
    /// Create an address from raw bytes (display order).
    pub fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// The all-zero address, never a valid peer.
    pub fn empty() -> Self {
        Self([0u8; 6])
    }

    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 6]
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl FromStr for DeviceAddress {
    type Err = AddressParseError;

    /// Parse `AA:BB:CC:DD:EE:FF` (case-insensitive, `-` also accepted).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(AddressParseError::WrongLength {
                input: s.to_string(),
                octets: parts.len(),
            });
        }

        let mut bytes = [0u8; 6];
        for (slot, part) in bytes.iter_mut().zip(parts) {
            if part.len() != 2 {
                return Err(AddressParseError::InvalidOctet {
                    input: s.to_string(),
                    octet: part.to_string(),
                });
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| AddressParseError::InvalidOctet {
                input: s.to_string(),
                octet: part.to_string(),
            })?;
        }
        Ok(Self(bytes))
    }
}

/// LE address type as carried in HCI connection and acceptlist commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum AddressType {
    /// Public device address
    #[default]
    Public,
    /// Random device address (static or private)
    Random,
    /// Public identity address resolved from an RPA
    PublicIdentity,
    /// Random (static) identity address resolved from an RPA
    RandomIdentity,
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => write!(f, "public"),
            Self::Random => write!(f, "random"),
            Self::PublicIdentity => write!(f, "public-identity"),
            Self::RandomIdentity => write!(f, "random-identity"),
        }
    }
}

/// Device address together with its LE address type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressWithType {
    pub address: DeviceAddress,
    pub address_type: AddressType,
}

impl AddressWithType {
    pub fn new(address: DeviceAddress, address_type: AddressType) -> Self {
        Self {
            address,
            address_type,
        }
    }

    /// Public address, the default when callers only know the raw address.
    pub fn public(address: DeviceAddress) -> Self {
        Self::new(address, AddressType::Public)
    }
}

impl From<DeviceAddress> for AddressWithType {
    fn from(address: DeviceAddress) -> Self {
        Self::public(address)
    }
}

impl fmt::Display for AddressWithType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.address, self.address_type)
    }
}

/// Stable identifier of a calling subsystem.
///
/// GATT clients use their client interface number; fixed protocol layers use
/// reserved values such as [`ClientId::L2CAP`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u8);

impl ClientId {
    /// Fixed id used by the L2CAP fixed-channel layer.
    pub const L2CAP: ClientId = ClientId(u8::MAX);

    pub fn new(id: u8) -> Self {
        Self(id)
    }

    pub fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::L2CAP {
            write!(f, "l2cap")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Monotonic time in milliseconds, as reported by the `TimeSource` port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a new timestamp from milliseconds.
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    /// Get the timestamp value in milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Add milliseconds to this timestamp (saturating).
    pub fn add_millis(&self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Milliseconds elapsed since `earlier` (zero if `earlier` is in the future).
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Global insertion order of background intents.
///
/// Timestamps can collide; the sequence number cannot, so admission ordering
/// ("oldest intent wins") is defined on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntentSeq(pub u64);
