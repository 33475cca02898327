use crate::error::TypesError;
use std::fmt;
use std::ops::{Add, Div, Mul, Rem, Sub};
use std::str::FromStr;

/// 256-bit unsigned integer for balances, vote weights and pool amounts.
///
/// Stored as 4 x u64 in little-endian limb order.
/// Arithmetic used on ledger paths goes through the checked_* methods,
/// which return None instead of wrapping.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct U256([u64; 4]); // [low, mid_low, mid_high, high] little-endian limbs

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        for i in (0..4).rev() {
            match self.0[i].cmp(&other.0[i]) {
                std::cmp::Ordering::Equal => continue,
                ord => return ord,
            }
        }
        std::cmp::Ordering::Equal
    }
}

impl U256 {
    pub const ZERO: Self = Self([0, 0, 0, 0]);
    pub const ONE: Self = Self([1, 0, 0, 0]);
    pub const MAX: Self = Self([u64::MAX, u64::MAX, u64::MAX, u64::MAX]);

    /// One whole currency unit in base units (10^18, 18-decimal fixed point)
    pub const UNIT: Self = Self([1_000_000_000_000_000_000, 0, 0, 0]);

    pub const fn from_limbs(limbs: [u64; 4]) -> Self {
        Self(limbs)
    }

    pub const fn as_limbs(&self) -> &[u64; 4] {
        &self.0
    }

    /// Create from a u64 value
    pub const fn from_u64(val: u64) -> Self {
        Self([val, 0, 0, 0])
    }

    /// Create from a u128 value
    pub const fn from_u128(val: u128) -> Self {
        let low = val as u64;
        let high = (val >> 64) as u64;
        Self([low, high, 0, 0])
    }

    /// Checked addition
    pub fn checked_add(&self, rhs: &Self) -> Option<Self> {
        let mut result = [0u64; 4];
        let mut carry = 0u64;

        for i in 0..4 {
            let (sum1, overflow1) = self.0[i].overflowing_add(rhs.0[i]);
            let (sum2, overflow2) = sum1.overflowing_add(carry);
            result[i] = sum2;
            carry = (overflow1 as u64) + (overflow2 as u64);
        }

        if carry != 0 {
            None
        } else {
            Some(Self(result))
        }
    }

    /// Checked subtraction
    pub fn checked_sub(&self, rhs: &Self) -> Option<Self> {
        if self < rhs {
            return None;
        }
        Some(self.wrapping_sub(rhs))
    }

    /// Checked multiplication (schoolbook over 8 limbs)
    pub fn checked_mul(&self, rhs: &Self) -> Option<Self> {
        if self.is_zero() || rhs.is_zero() {
            return Some(Self::ZERO);
        }

        let mut wide = [0u64; 8];

        for i in 0..4 {
            let mut carry = 0u128;
            for j in 0..4 {
                let tmp = (self.0[i] as u128) * (rhs.0[j] as u128)
                    + (wide[i + j] as u128)
                    + carry;
                wide[i + j] = tmp as u64;
                carry = tmp >> 64;
            }
            wide[i + 4] = carry as u64;
        }

        if wide[4..].iter().any(|&l| l != 0) {
            return None;
        }

        Some(Self([wide[0], wide[1], wide[2], wide[3]]))
    }

    /// Checked division (long division, bit by bit)
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        if self < rhs {
            return Some(Self::ZERO);
        }

        let mut quotient = Self::ZERO;
        let mut remainder = Self::ZERO;

        for i in (0..256).rev() {
            // The shifted-out bit matters when the divisor exceeds 2^255
            let carry = remainder.bit(255);
            remainder = remainder.shl1();
            if self.bit(i) {
                remainder.0[0] |= 1;
            }

            if carry || remainder >= *rhs {
                remainder = remainder.wrapping_sub(rhs);
                quotient.set_bit(i);
            }
        }

        Some(quotient)
    }

    /// Checked remainder
    pub fn checked_rem(&self, rhs: &Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }

        let div = self.checked_div(rhs)?;
        let mul = div.checked_mul(rhs)?;
        self.checked_sub(&mul)
    }

    /// Saturating addition
    pub fn saturating_add(&self, rhs: &Self) -> Self {
        self.checked_add(rhs).unwrap_or(Self::MAX)
    }

    /// Saturating subtraction
    pub fn saturating_sub(&self, rhs: &Self) -> Self {
        self.checked_sub(rhs).unwrap_or(Self::ZERO)
    }

    /// Saturating multiplication
    pub fn saturating_mul(&self, rhs: &Self) -> Self {
        self.checked_mul(rhs).unwrap_or(Self::MAX)
    }

    /// 256-bit modular subtraction
    fn wrapping_sub(&self, rhs: &Self) -> Self {
        let mut result = [0u64; 4];
        let mut borrow = 0u64;

        for i in 0..4 {
            let (diff1, underflow1) = self.0[i].overflowing_sub(rhs.0[i]);
            let (diff2, underflow2) = diff1.overflowing_sub(borrow);
            result[i] = diff2;
            borrow = (underflow1 as u64) | (underflow2 as u64);
        }

        Self(result)
    }

    /// Shift left by one bit, dropping the top bit
    fn shl1(&self) -> Self {
        let mut result = [0u64; 4];
        let mut carry = 0u64;
        for i in 0..4 {
            result[i] = (self.0[i] << 1) | carry;
            carry = self.0[i] >> 63;
        }
        Self(result)
    }

    /// Get bit at position
    fn bit(&self, pos: u32) -> bool {
        let limb = (pos / 64) as usize;
        let bit = pos % 64;
        (self.0[limb] >> bit) & 1 != 0
    }

    /// Set bit at position
    fn set_bit(&mut self, pos: u32) {
        let limb = (pos / 64) as usize;
        let bit = pos % 64;
        self.0[limb] |= 1 << bit;
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&l| l == 0)
    }

    /// Convert to big-endian bytes
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for i in 0..4 {
            let limb_bytes = self.0[3 - i].to_be_bytes();
            bytes[i * 8..(i + 1) * 8].copy_from_slice(&limb_bytes);
        }
        bytes
    }

    /// Convert from big-endian bytes
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let mut limb_bytes = [0u8; 8];
            limb_bytes.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            limbs[3 - i] = u64::from_be_bytes(limb_bytes);
        }
        Self(limbs)
    }

    /// Parse from decimal string
    pub fn from_decimal_str(s: &str) -> Result<Self, TypesError> {
        if s.is_empty() {
            return Err(TypesError::InvalidU256String(s.to_string()));
        }

        let mut result = Self::ZERO;

        for c in s.chars() {
            if !c.is_ascii_digit() {
                return Err(TypesError::InvalidU256String(s.to_string()));
            }

            let digit = c as u64 - '0' as u64;
            result = result
                .checked_mul(&Self::from_u64(10))
                .ok_or(TypesError::U256Overflow)?;
            result = result
                .checked_add(&Self::from_u64(digit))
                .ok_or(TypesError::U256Overflow)?;
        }

        Ok(result)
    }
}

impl From<u64> for U256 {
    fn from(val: u64) -> Self {
        Self::from_u64(val)
    }
}

impl From<u128> for U256 {
    fn from(val: u128) -> Self {
        Self::from_u128(val)
    }
}

impl TryFrom<U256> for u64 {
    type Error = TypesError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        if value.0[1] != 0 || value.0[2] != 0 || value.0[3] != 0 {
            Err(TypesError::U256Overflow)
        } else {
            Ok(value.0[0])
        }
    }
}

impl TryFrom<U256> for u128 {
    type Error = TypesError;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        if value.0[2] != 0 || value.0[3] != 0 {
            Err(TypesError::U256Overflow)
        } else {
            Ok((value.0[1] as u128) << 64 | value.0[0] as u128)
        }
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let mut n = *self;
        let mut s = String::new();

        while !n.is_zero() {
            let rem = n.checked_rem(&Self::from_u64(10)).map(|v| v.0[0]).unwrap_or(0);
            s.push((rem as u8 + b'0') as char);
            n = n.checked_div(&Self::from_u64(10)).unwrap_or(Self::ZERO);
        }

        write!(f, "{}", s.chars().rev().collect::<String>())
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({})", self)
    }
}

impl fmt::LowerHex for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.to_be_bytes()))
    }
}

impl FromStr for U256 {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") || s.starts_with("0X") {
            let bytes = hex::decode(&s[2..])?;
            if bytes.len() > 32 {
                return Err(TypesError::U256Overflow);
            }
            let mut padded = [0u8; 32];
            padded[32 - bytes.len()..].copy_from_slice(&bytes);
            Ok(Self::from_be_bytes(padded))
        } else {
            Self::from_decimal_str(s)
        }
    }
}

impl Add for U256 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        self.saturating_add(&rhs)
    }
}

impl Sub for U256 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        // Saturating subtraction - returns 0 if underflow
        self.checked_sub(&rhs).unwrap_or(Self::ZERO)
    }
}

impl Mul for U256 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.saturating_mul(&rhs)
    }
}

impl Div for U256 {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        self.checked_div(&rhs).unwrap_or(Self::ZERO)
    }
}

impl Rem for U256 {
    type Output = Self;

    fn rem(self, rhs: Self) -> Self::Output {
        self.checked_rem(&rhs).unwrap_or(Self::ZERO)
    }
}

impl std::ops::AddAssign for U256 {
    fn add_assign(&mut self, rhs: Self) {
        *self = self.saturating_add(&rhs);
    }
}

impl std::ops::SubAssign for U256 {
    fn sub_assign(&mut self, rhs: Self) {
        // Saturating subtraction - clamps to zero
        *self = self.checked_sub(&rhs).unwrap_or(Self::ZERO);
    }
}
