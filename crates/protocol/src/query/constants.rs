/// Number of bytes in an encoded security query header.
///
/// Three big-endian words: the packed type/id word, the sequence number and
/// the payload size.
pub const HEADER_LEN: usize = 12;

/// Mask selecting the 24-bit query identifier from the packed header word.
pub const QUERY_ID_MASK: u32 = 0x00FF_FFFF;

/// Bit offset of the query type byte inside the packed header word.
pub(crate) const QUERY_TYPE_SHIFT: u32 = 24;
