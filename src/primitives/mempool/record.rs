/// Bytes reserved at the start of every slot for its header.
///
/// Only the first byte is used (the [`RecordKind`] tag); the rest keeps
/// payloads 4-byte aligned.
pub const SLOT_HEADER_SIZE: usize = 4;

/// Tag stored in the header byte of each slot.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RecordKind {
    /// Deleted or never initialized. Must stay `0x00` so a zeroed slot reads as free.
    Free = 0x00,
    /// Record without graph semantics.
    Plain = 0x01,
    /// Vertex record.
    Vertex = 0x02,
    /// Edge record.
    Edge = 0x03,
}

impl RecordKind {
    /// Decodes a header byte, returning `None` for unknown tags.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Free),
            0x01 => Some(Self::Plain),
            0x02 => Some(Self::Vertex),
            0x03 => Some(Self::Edge),
            _ => None,
        }
    }

    /// Encodes the tag as its header byte.
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}
