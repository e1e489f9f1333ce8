//! Fixed width 256-bit values with big-endian bit addressing.
//!
//! Bit `0` is the most significant bit of byte `0` and bit `255` is the least
//! significant bit of byte `31`. Keys, value pointers, node identifiers and
//! the marker bitmask of a [`crate::Vector`] are all [`FixedHash`] values.

use std::fmt::{self, Debug, Display, LowerHex};
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::str::FromStr;

use bitvec::prelude::*;
use ipld_core::cid::Cid;
use sha3::{Digest, Keccak256};

use crate::{IndexError, Result};

/// Size of a [`FixedHash`] in bytes.
pub const HASH_SIZE: usize = 32;
/// Number of addressable bits in a [`FixedHash`].
pub const BITS: usize = HASH_SIZE * 8;

/// Multihash code of keccak-256.
pub const KECCAK_256: u8 = 0x1b;
/// Multicodec code of dag-cbor.
pub const DAG_CBOR: u8 = 0x71;
/// CID version byte.
pub const CID_V1: u8 = 0x01;

/// Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> FixedHash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    FixedHash(hasher.finalize().into())
}

/// A 32 byte value with bit level algebra.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FixedHash([u8; HASH_SIZE]);

impl FixedHash {
    /// The all-zero value. Used as the null root and null pointer.
    pub const ZERO: Self = Self([0; HASH_SIZE]);

    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Builds a value from the last 32 bytes of `bytes`, left padding with
    /// zeros when fewer are given.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut out = [0u8; HASH_SIZE];
        let take = bytes.len().min(HASH_SIZE);
        out[HASH_SIZE - take..].copy_from_slice(&bytes[bytes.len() - take..]);
        Self(out)
    }

    /// Parses a hex string, with or without a `0x`/`0X` prefix. Odd length
    /// input gets a leading zero nibble and the result is left padded.
    pub fn from_hex(input: &str) -> Result<Self> {
        let trimmed = input.trim_start_matches(' ');
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return Err(IndexError::InvalidHex(input.to_string()));
        }
        let bytes = if digits.len() % 2 == 1 {
            hex::decode(format!("0{digits}"))
        } else {
            hex::decode(digits)
        }
        .map_err(|_| IndexError::InvalidHex(input.to_string()))?;
        Ok(Self::from_slice(&bytes))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; HASH_SIZE] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }

    /// Renders as `0x` followed by 64 hex digits. With `compact`, leading
    /// zero bytes are dropped.
    pub fn to_hex(&self, compact: bool) -> String {
        let mut digits = hex::encode(self.0);
        if compact {
            let zeros = digits
                .as_bytes()
                .chunks(2)
                .take_while(|pair| *pair == b"00")
                .count();
            digits.drain(..zeros * 2);
        }
        format!("0x{digits}")
    }

    /// Renders as `0b` followed by 256 binary digits. With `compact`,
    /// leading zero bytes are dropped.
    pub fn to_bin(&self, compact: bool) -> String {
        self.render_bin(compact, None)
    }

    /// Like [`FixedHash::to_bin`] with a `|` placed before bit `index`.
    /// Compacting never drops the byte holding the mark.
    pub fn to_bin_split(&self, compact: bool, index: usize) -> Result<String> {
        let index = Self::locate(index, false)?;
        Ok(self.render_bin(compact, Some(index)))
    }

    fn render_bin(&self, compact: bool, split: Option<usize>) -> String {
        let keep = split.map_or(HASH_SIZE, |index| index / 8);
        let skip = if compact {
            self.0.iter().take(keep).take_while(|byte| **byte == 0).count()
        } else {
            0
        };
        let mut digits: String = self.0[skip..]
            .iter()
            .map(|byte| format!("{byte:08b}"))
            .collect();
        if let Some(index) = split {
            digits.insert(index - skip * 8, '|');
        }
        format!("0b{digits}")
    }

    fn bits(&self) -> &BitSlice<u8, Msb0> {
        self.0.view_bits::<Msb0>()
    }

    fn bits_mut(&mut self) -> &mut BitSlice<u8, Msb0> {
        self.0.view_bits_mut::<Msb0>()
    }

    fn locate(index: usize, le: bool) -> Result<usize> {
        if index >= BITS {
            return Err(IndexError::IndexOutOfRange(index));
        }
        Ok(if le { BITS - 1 - index } else { index })
    }

    /// Reads the bit at `index`.
    pub fn bit(&self, index: usize) -> Result<u8> {
        let index = Self::locate(index, false)?;
        Ok(u8::from(self.bits()[index]))
    }

    /// Reads the bit at `255 - index`.
    pub fn bit_le(&self, index: usize) -> Result<u8> {
        let index = Self::locate(index, true)?;
        Ok(u8::from(self.bits()[index]))
    }

    /// Reads the bit at a branch depth. Every `u8` is a valid position.
    pub fn depth_bit(&self, depth: u8) -> u8 {
        (self.0[usize::from(depth >> 3)] >> (7 - (depth & 7))) & 1
    }

    pub fn on(&mut self, index: usize) -> Result<&mut Self> {
        let index = Self::locate(index, false)?;
        self.bits_mut().set(index, true);
        Ok(self)
    }

    pub fn on_le(&mut self, index: usize) -> Result<&mut Self> {
        let index = Self::locate(index, true)?;
        self.bits_mut().set(index, true);
        Ok(self)
    }

    pub fn off(&mut self, index: usize) -> Result<&mut Self> {
        let index = Self::locate(index, false)?;
        self.bits_mut().set(index, false);
        Ok(self)
    }

    pub fn off_le(&mut self, index: usize) -> Result<&mut Self> {
        let index = Self::locate(index, true)?;
        self.bits_mut().set(index, false);
        Ok(self)
    }

    pub fn flip(&mut self, index: usize) -> Result<&mut Self> {
        let index = Self::locate(index, false)?;
        let current = self.bits()[index];
        self.bits_mut().set(index, !current);
        Ok(self)
    }

    pub fn flip_le(&mut self, index: usize) -> Result<&mut Self> {
        let index = Self::locate(index, true)?;
        let current = self.bits()[index];
        self.bits_mut().set(index, !current);
        Ok(self)
    }

    /// Population count.
    pub fn ones(&self) -> usize {
        self.bits().count_ones()
    }

    pub fn zeros(&self) -> usize {
        BITS - self.ones()
    }

    /// Smallest set bit index, `None` when the value is zero.
    pub fn msb(&self) -> Option<usize> {
        self.bits().first_one()
    }

    /// Largest set bit index, `None` when the value is zero.
    pub fn lsb(&self) -> Option<usize> {
        let index = self.0.iter().rposition(|byte| *byte != 0)?;
        Some(index * 8 + 7 - self.0[index].trailing_zeros() as usize)
    }

    /// Ascending list of set bit indices.
    pub fn set_bits(&self) -> Vec<usize> {
        self.bits().iter_ones().collect()
    }

    /// Position of the first differing bit, i.e. the length of the shared
    /// prefix. `None` when both values are equal.
    pub fn compare(&self, other: &Self) -> Option<usize> {
        (*self ^ *other).msb()
    }

    /// Multihash form: hash code, digest length, digest.
    pub fn multihash(&self) -> [u8; HASH_SIZE + 2] {
        let mut out = [0u8; HASH_SIZE + 2];
        out[0] = KECCAK_256;
        out[1] = HASH_SIZE as u8;
        out[2..].copy_from_slice(&self.0);
        out
    }

    /// CID form: version, codec, multihash.
    pub fn cid(&self) -> [u8; HASH_SIZE + 4] {
        let mut out = [0u8; HASH_SIZE + 4];
        out[0] = CID_V1;
        out[1] = DAG_CBOR;
        out[2..].copy_from_slice(&self.multihash());
        out
    }

    pub fn to_cid(&self) -> Result<Cid> {
        Cid::try_from(&self.cid()[..]).map_err(IndexError::codec)
    }
}

impl From<[u8; HASH_SIZE]> for FixedHash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }
}

impl From<&Cid> for FixedHash {
    fn from(cid: &Cid) -> Self {
        Self::from_slice(cid.hash().digest())
    }
}

impl AsRef<[u8]> for FixedHash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for FixedHash {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl Display for FixedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex(false))
    }
}

impl Debug for FixedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedHash({})", self.to_hex(false))
    }
}

impl LowerHex for FixedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        f.write_str(&hex::encode(self.0))
    }
}

impl Not for FixedHash {
    type Output = Self;

    fn not(mut self) -> Self {
        self.0.iter_mut().for_each(|byte| *byte = !*byte);
        self
    }
}

macro_rules! bitwise {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident) => {
        impl $assign for FixedHash {
            fn $assign_method(&mut self, rhs: Self) {
                self.0
                    .iter_mut()
                    .zip(rhs.0.iter())
                    .for_each(|(byte, other)| $assign::$assign_method(byte, *other));
            }
        }

        impl $op for FixedHash {
            type Output = Self;

            fn $method(mut self, rhs: Self) -> Self {
                $assign::$assign_method(&mut self, rhs);
                self
            }
        }
    };
}

bitwise!(BitAnd, bitand, BitAndAssign, bitand_assign);
bitwise!(BitOr, bitor, BitOrAssign, bitor_assign);
bitwise!(BitXor, bitxor, BitXorAssign, bitxor_assign);
