//! Fixed-width dictionary records and the hashing that places them.
//!
//! The dictionary file is a flat table of `ENTRY_SIZE`-byte slots. Slot `s`
//! lives at byte `s * ENTRY_SIZE` and holds, big-endian:
//!
//! ```text
//! data_offset: i64 | byte_length: i32 | checker: i32
//! ```
//!
//! A slot whose `byte_length` is zero is empty; every committed postings
//! block is at least one line long, so occupied slots never look empty.

use crate::error::{Error, Result};

pub const ENTRY_SIZE: u64 = 16;

pub const DEFAULT_TABLE_SIZE: u64 = 611_953;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DictionaryEntry {
    pub data_offset: u64,
    pub byte_length: u32,
    pub checker: i32,
}

impl DictionaryEntry {
    pub const fn new(data_offset: u64, byte_length: u32, checker: i32) -> Self {
        Self {
            data_offset,
            byte_length,
            checker,
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.byte_length == 0
    }

    pub fn encode(&self) -> [u8; ENTRY_SIZE as usize] {
        let mut bytes = [0; ENTRY_SIZE as usize];
        bytes[0..8].copy_from_slice(&self.data_offset.to_be_bytes());
        bytes[8..12].copy_from_slice(&self.byte_length.to_be_bytes());
        bytes[12..16].copy_from_slice(&self.checker.to_be_bytes());
        bytes
    }

    pub fn decode(bytes: &[u8; ENTRY_SIZE as usize]) -> Result<Self> {
        let data_offset = i64::from_be_bytes(field(bytes, 0)?);
        let byte_length = i32::from_be_bytes(field(bytes, 8)?);
        let checker = i32::from_be_bytes(field(bytes, 12)?);

        let data_offset = u64::try_from(data_offset).map_err(|_| {
            Error::CorruptDictionary(format!("negative data offset {data_offset}"))
        })?;
        let byte_length = u32::try_from(byte_length).map_err(|_| {
            Error::CorruptDictionary(format!("negative byte length {byte_length}"))
        })?;

        Ok(Self::new(data_offset, byte_length, checker))
    }
}

fn field<const N: usize>(bytes: &[u8], start: usize) -> Result<[u8; N]> {
    bytes[start..start + N]
        .try_into()
        .map_err(|_| Error::CorruptDictionary("short entry".to_string()))
}

/// Polynomial rolling hash (seed 7, multiplier 31) over UTF-16 code units,
/// floored modulo `table_size`.
pub fn slot_hash(term: &str, table_size: u64) -> u64 {
    let hash = term.encode_utf16().fold(7_i64, |hash, unit| {
        hash.wrapping_mul(31).wrapping_add(i64::from(unit))
    });

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    let slot = hash.rem_euclid(table_size as i64) as u64;
    slot
}

/// 32-bit FNV-1a hash of the term's UTF-8 bytes, stored beside each slot to
/// tell terms apart on read.
///
/// Independent of [`slot_hash`]: terms sharing a home slot do not share a
/// checker just because their polynomial hashes agree.
pub fn checker(term: &str) -> i32 {
    let hash = term.bytes().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
    });

    i32::from_be_bytes(hash.to_be_bytes())
}

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Table capacity for `term_count` terms: `configured` while the load stays
/// at or under 3/4, otherwise the next prime at or above twice the term count.
pub fn table_capacity(configured: u64, term_count: u64) -> u64 {
    let configured = configured.max(1);

    if term_count.saturating_mul(4) <= configured.saturating_mul(3) {
        configured
    } else {
        next_prime(term_count.saturating_mul(2))
    }
}

pub fn next_prime(from: u64) -> u64 {
    (from.max(2)..).find(|&n| is_prime(n)).unwrap_or(from)
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }

    let mut divisor = 3;
    while divisor * divisor <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}
