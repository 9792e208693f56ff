//! Bit sequences for codes and encoded payloads
//!
//! A `BitString` is an abstract, unpacked sequence of bits. Its textual form is
//! a string of `0`/`1` characters. Packing 8 bits per byte is available through
//! [`BitString::to_packed`] when real space savings are wanted.

use std::fmt;
use std::str::FromStr;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};

use crate::error::CompressError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BitString {
    bits: Vec<bool>,
}

/// Output of encoding: each input symbol's code concatenated in input order.
pub type EncodedPayload = BitString;

impl BitString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bit: bool) {
        self.bits.push(bit);
    }

    pub fn pop(&mut self) -> Option<bool> {
        self.bits.pop()
    }

    pub fn extend_from(&mut self, other: &BitString) {
        self.bits.extend_from_slice(&other.bits);
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// True if `self` is a proper prefix of `other`.
    pub fn is_proper_prefix_of(&self, other: &BitString) -> bool {
        self.len() < other.len() && other.bits.starts_with(&self.bits)
    }

    /// Pack MSB-first, zero-padding the final byte.
    pub fn to_packed(&self) -> Result<Vec<u8>, CompressError> {
        let mut writer = BitWriter::endian(Vec::with_capacity(self.len().div_ceil(8)), BigEndian);
        for &bit in &self.bits {
            writer.write_bit(bit)?;
        }
        writer.byte_align()?;
        Ok(writer.into_writer())
    }

    /// Unpack the first `bit_len` bits of `bytes`.
    pub fn from_packed(bytes: &[u8], bit_len: usize) -> Result<Self, CompressError> {
        let available = bytes.len() * 8;
        if bit_len > available {
            return Err(CompressError::MalformedPayload {
                consumed: available,
            });
        }
        let mut reader = BitReader::endian(bytes, BigEndian);
        let mut bits = Vec::with_capacity(bit_len);
        for _ in 0..bit_len {
            bits.push(reader.read_bit()?);
        }
        Ok(Self { bits })
    }
}

impl From<Vec<bool>> for BitString {
    fn from(bits: Vec<bool>) -> Self {
        Self { bits }
    }
}

impl FromIterator<bool> for BitString {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.bits {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for BitString {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(CompressError::InvalidBit(other)),
            })
            .collect()
    }
}
