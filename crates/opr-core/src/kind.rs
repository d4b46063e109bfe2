//! Address type prefixes.

/// Address type, identified by the two leading bytes of the raw address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Factoid public address ("FA...").
    #[default]
    FactoidPublic,
    /// Entry-credit public address ("EC...").
    EntryCreditPublic,
    /// Factoid private key ("Fs...").
    FactoidSecret,
    /// Entry-credit private key ("Es...").
    EntryCreditSecret,
}

impl AddressKind {
    /// All known kinds.
    pub const ALL: [AddressKind; 4] = [
        AddressKind::FactoidPublic,
        AddressKind::EntryCreditPublic,
        AddressKind::FactoidSecret,
        AddressKind::EntryCreditSecret,
    ];

    /// Get the 2-byte type prefix for this kind.
    pub fn prefix(&self) -> [u8; 2] {
        match self {
            AddressKind::FactoidPublic => [0x5f, 0xb1],
            AddressKind::EntryCreditPublic => [0x59, 0x2a],
            AddressKind::FactoidSecret => [0x64, 0x78],
            AddressKind::EntryCreditSecret => [0x5d, 0xb6],
        }
    }

    /// Look up the kind owning a raw prefix.
    pub fn from_prefix(prefix: [u8; 2]) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }

    /// The leading characters every encoded address of this kind starts with.
    pub fn human_prefix(&self) -> &'static str {
        match self {
            AddressKind::FactoidPublic => "FA",
            AddressKind::EntryCreditPublic => "EC",
            AddressKind::FactoidSecret => "Fs",
            AddressKind::EntryCreditSecret => "Es",
        }
    }
}

/// Size of a raw address: prefix, payload and checksum.
pub const RAW_ADDRESS_SIZE: usize = 38;

/// Size of the random payload inside a raw address.
pub const ADDRESS_PAYLOAD_SIZE: usize = 32;

/// Size of the trailing checksum.
pub const CHECKSUM_SIZE: usize = 4;

/// Length of the base-58 text form of a raw address.
pub const ADDRESS_TEXT_LEN: usize = 52;
