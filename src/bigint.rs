use core::cmp::Ordering;
use core::fmt::{self, Write as _};
use core::iter::{Product, Sum};
use core::ops::{
    Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Rem, RemAssign, Sub, SubAssign,
};
use core::str::FromStr;

use num_traits::{One, ToPrimitive, Zero};
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use tracing::trace;

use crate::{NumError, fft};

type Limb = u32;

/// Arbitrary-precision signed integer.
///
/// The magnitude is stored as base-10,000 limbs, least significant first, next
/// to an independent sign flag. The representation is canonical: no
/// most-significant zero limbs (zero is the single limb `0`) and zero is never
/// negative. Derived equality and hashing rely on that.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigInt {
    negative: bool,
    limbs: Vec<Limb>,
}

// ============================================================================
// Constants
// ============================================================================

impl BigInt {
    /// The limb radix: every limb is in `0..RADIX`.
    ///
    /// Four decimal digits per limb, and any limb product (plus carry) fits
    /// in a `u64` accumulator.
    pub const RADIX: u32 = 10_000;

    /// Decimal digits per limb.
    pub const LIMB_DIGITS: usize = 4;

    /// Below this many limbs in the shorter operand, multiplication uses the
    /// schoolbook algorithm; at or above it, FFT convolution.
    ///
    /// This bounds the floating-point error of the FFT path as much as it
    /// tunes speed.
    pub const FFT_THRESHOLD: usize = 10;
}

// ============================================================================
// Constructors and Raw Access
// ============================================================================

impl Default for BigInt {
    fn default() -> Self {
        Self::new()
    }
}

impl BigInt {
    /// Creates a zero.
    #[inline]
    pub fn new() -> Self {
        Self {
            negative: false,
            limbs: vec![0],
        }
    }

    fn from_magnitude(negative: bool, mut magnitude: u128) -> Self {
        let radix = u128::from(Self::RADIX);
        let mut limbs = Vec::with_capacity(4);
        loop {
            limbs.push((magnitude % radix) as Limb);
            magnitude /= radix;
            if magnitude == 0 {
                break;
            }
        }
        let mut value = Self { negative, limbs };
        value.normalize();
        value
    }

    /// Creates a BigInt from an i64.
    #[inline]
    pub fn from_i64(value: i64) -> Self {
        Self::from_magnitude(value < 0, u128::from(value.unsigned_abs()))
    }

    /// Creates a BigInt from a u64.
    #[inline]
    pub fn from_u64(value: u64) -> Self {
        Self::from_magnitude(false, u128::from(value))
    }

    /// Builds a BigInt from a sign and little-endian base-10,000 limbs.
    ///
    /// Most-significant zero limbs are stripped and a negative zero becomes
    /// zero. An empty limb vector is zero.
    ///
    /// # Errors
    /// Returns `NumError::InvalidFormat` if any limb is `>= RADIX`.
    pub fn from_limbs(negative: bool, mut limbs: Vec<u32>) -> crate::Result<Self> {
        if limbs.iter().any(|&limb| limb >= Self::RADIX) {
            return Err(NumError::InvalidFormat);
        }
        if limbs.is_empty() {
            limbs.push(0);
        }
        let mut value = Self { negative, limbs };
        value.normalize();
        Ok(value)
    }

    /// Little-endian base-10,000 limbs of the magnitude.
    #[inline]
    pub fn limbs(&self) -> &[u32] {
        &self.limbs
    }

    /// Number of limbs in the magnitude (at least 1).
    #[inline]
    pub fn limb_len(&self) -> usize {
        self.limbs.len()
    }

    /// Restores the canonical form after a mutation.
    fn normalize(&mut self) {
        trim(&mut self.limbs);
        if self.limbs.len() == 1 && self.limbs[0] == 0 {
            self.negative = false;
        }
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {$(
        impl From<$t> for BigInt {
            #[inline]
            fn from(value: $t) -> Self {
                Self::from_magnitude(value < 0, value.unsigned_abs() as u128)
            }
        }
    )*};
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for BigInt {
            #[inline]
            fn from(value: $t) -> Self {
                Self::from_magnitude(false, value as u128)
            }
        }
    )*};
}

impl_from_signed!(i8, i16, i32, i64, i128, isize);
impl_from_unsigned!(u8, u16, u32, u64, u128, usize);

// ============================================================================
// Sign Operations
// ============================================================================

impl BigInt {
    /// Returns true if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs.len() == 1 && self.limbs[0] == 0
    }

    /// Truthiness: true for every value except zero.
    #[inline]
    pub fn is_nonzero(&self) -> bool {
        !self.is_zero()
    }

    /// Returns true if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Returns true if the value is strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        !self.negative && !self.is_zero()
    }

    /// Returns -1, 0 or 1.
    #[inline]
    pub fn signum(&self) -> i8 {
        if self.negative {
            -1
        } else if self.is_zero() {
            0
        } else {
            1
        }
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Self {
            negative: false,
            limbs: self.limbs.clone(),
        }
    }
}

// ============================================================================
// Limb Arithmetic
// ============================================================================

/// Strips most-significant zero limbs, keeping at least one limb.
fn trim(limbs: &mut Vec<Limb>) {
    while limbs.len() > 1 && limbs.last() == Some(&0) {
        limbs.pop();
    }
    if limbs.is_empty() {
        limbs.push(0);
    }
}

/// Unsigned ordering of two trimmed limb sequences.
fn cmp_magnitude(a: &[Limb], b: &[Limb]) -> Ordering {
    a.len()
        .cmp(&b.len())
        .then_with(|| a.iter().rev().cmp(b.iter().rev()))
}

/// `lhs += rhs` on magnitudes.
fn add_assign_magnitude(lhs: &mut Vec<Limb>, rhs: &[Limb]) {
    if lhs.len() < rhs.len() {
        lhs.resize(rhs.len(), 0);
    }
    let mut carry = 0;
    for (i, limb) in lhs.iter_mut().enumerate() {
        if i >= rhs.len() && carry == 0 {
            break;
        }
        let sum = *limb + rhs.get(i).copied().unwrap_or(0) + carry;
        *limb = sum % BigInt::RADIX;
        carry = sum / BigInt::RADIX;
    }
    if carry > 0 {
        lhs.push(carry);
    }
}

/// `lhs -= rhs` on magnitudes. Requires `lhs >= rhs`.
fn sub_assign_magnitude(lhs: &mut [Limb], rhs: &[Limb]) {
    debug_assert!(cmp_magnitude(lhs, rhs) != Ordering::Less);
    let mut borrow = 0;
    for (i, limb) in lhs.iter_mut().enumerate() {
        if i >= rhs.len() && borrow == 0 {
            break;
        }
        let subtrahend = rhs.get(i).copied().unwrap_or(0) + borrow;
        if *limb >= subtrahend {
            *limb -= subtrahend;
            borrow = 0;
        } else {
            *limb = *limb + BigInt::RADIX - subtrahend;
            borrow = 1;
        }
    }
    debug_assert_eq!(borrow, 0);
}

/// Single-limb product `a * factor`, trimmed.
///
/// `factor` may be `RADIX` itself; the product then gains one limb.
fn scale_magnitude(a: &[Limb], factor: u32) -> Vec<Limb> {
    let radix = u64::from(BigInt::RADIX);
    let mut out = Vec::with_capacity(a.len() + 1);
    let mut carry = 0u64;
    for &limb in a {
        carry += u64::from(limb) * u64::from(factor);
        out.push((carry % radix) as Limb);
        carry /= radix;
    }
    while carry > 0 {
        out.push((carry % radix) as Limb);
        carry /= radix;
    }
    trim(&mut out);
    out
}

// ============================================================================
// Addition and Subtraction
// ============================================================================

impl BigInt {
    /// Adds `rhs`'s magnitude to the receiver's, keeping the receiver's sign.
    fn unsigned_add(&mut self, rhs: &Self) {
        add_assign_magnitude(&mut self.limbs, &rhs.limbs);
        self.normalize();
    }

    /// Subtracts `rhs`'s magnitude from the receiver's.
    ///
    /// Always subtracts the smaller magnitude from the larger one. When the
    /// receiver is the smaller, the operands trade places and the receiver's
    /// sign flips.
    fn unsigned_subtract(&mut self, rhs: &Self) {
        if cmp_magnitude(&self.limbs, &rhs.limbs) == Ordering::Less {
            let mut limbs = rhs.limbs.clone();
            sub_assign_magnitude(&mut limbs, &self.limbs);
            self.limbs = limbs;
            self.negative = !self.negative;
        } else {
            sub_assign_magnitude(&mut self.limbs, &rhs.limbs);
        }
        self.normalize();
    }

    /// Adds one in place and returns the receiver (prefix increment).
    pub fn increment(&mut self) -> &mut Self {
        *self += &Self::one();
        self
    }

    /// Subtracts one in place and returns the receiver (prefix decrement).
    pub fn decrement(&mut self) -> &mut Self {
        *self -= &Self::one();
        self
    }

    /// Adds one in place and returns the previous value (postfix increment).
    pub fn post_increment(&mut self) -> Self {
        let previous = self.clone();
        self.increment();
        previous
    }

    /// Subtracts one in place and returns the previous value (postfix decrement).
    pub fn post_decrement(&mut self) -> Self {
        let previous = self.clone();
        self.decrement();
        previous
    }
}

// ============================================================================
// Multiplication
// ============================================================================

impl BigInt {
    /// Multiplies, choosing schoolbook or FFT against a caller-supplied threshold.
    ///
    /// Schoolbook runs when the shorter operand has fewer than `threshold`
    /// limbs. `threshold == 0` forces FFT and `usize::MAX` forces schoolbook.
    pub fn mul_with_threshold(&self, rhs: &Self, threshold: usize) -> Self {
        let shorter = self.limbs.len().min(rhs.limbs.len());
        if shorter < threshold {
            trace!(
                lhs_limbs = self.limbs.len(),
                rhs_limbs = rhs.limbs.len(),
                "schoolbook multiply"
            );
            self.schoolbook_mul(rhs)
        } else {
            trace!(
                lhs_limbs = self.limbs.len(),
                rhs_limbs = rhs.limbs.len(),
                padded = fft::padded_len(self.limbs.len(), rhs.limbs.len()),
                "fft multiply"
            );
            self.fft_mul(rhs)
        }
    }

    /// O(n·m) multiplication.
    ///
    /// Every non-zero limb of the shorter operand produces a shifted partial
    /// product against the longer one, and the partials are summed into a
    /// separate accumulator.
    pub fn schoolbook_mul(&self, rhs: &Self) -> Self {
        if self.is_zero() || rhs.is_zero() {
            return Self::new();
        }
        let (long, short) = if self.limbs.len() >= rhs.limbs.len() {
            (self, rhs)
        } else {
            (rhs, self)
        };

        let mut product = Self::new();
        for (shift, &limb) in short.limbs.iter().enumerate() {
            if limb == 0 {
                continue;
            }
            let mut partial = vec![0; shift];
            partial.extend_from_slice(&scale_magnitude(&long.limbs, limb));
            product.unsigned_add(&Self {
                negative: false,
                limbs: partial,
            });
        }

        product.negative = self.negative ^ rhs.negative;
        product.normalize();
        product
    }

    /// Multiplication by complex FFT convolution of the limb sequences.
    pub fn fft_mul(&self, rhs: &Self) -> Self {
        let limbs = fft::multiply(&self.limbs, &rhs.limbs, Self::RADIX);
        let mut product = Self {
            negative: self.negative ^ rhs.negative,
            limbs,
        };
        product.normalize();
        product
    }

    /// `10^exp`, built directly from limbs.
    pub(crate) fn pow10(exp: usize) -> Self {
        let mut limbs = vec![0; exp / Self::LIMB_DIGITS];
        limbs.push(10u32.pow((exp % Self::LIMB_DIGITS) as u32));
        Self {
            negative: false,
            limbs,
        }
    }

    /// Raises to a non-negative power by repeated squaring.
    pub fn pow(&self, mut exp: u32) -> Self {
        let mut base = self.clone();
        let mut result = Self::one();
        while exp > 0 {
            if exp & 1 == 1 {
                result *= &base;
            }
            exp >>= 1;
            if exp > 0 {
                base = &base * &base;
            }
        }
        result
    }
}

// ============================================================================
// Division
// ============================================================================

impl BigInt {
    /// Long division truncated toward zero. `divisor` must be non-zero.
    ///
    /// Walks the dividend from its most significant limb down, keeping a
    /// non-negative running remainder. Each quotient limb is the largest
    /// `q` in `[0, RADIX]` with `q * |divisor| <= remainder`, found by binary
    /// search.
    fn long_div(&self, divisor: &Self) -> Self {
        debug_assert!(!divisor.is_zero());

        let mut remainder = Self::new();
        let mut digits = Vec::with_capacity(self.limbs.len());
        for &limb in self.limbs.iter().rev() {
            remainder.shift_in_limb(limb);

            let (mut low, mut high) = (0, Self::RADIX + 1);
            while high - low > 1 {
                let middle = (low + high) / 2;
                let trial = scale_magnitude(&divisor.limbs, middle);
                if cmp_magnitude(&trial, &remainder.limbs) == Ordering::Greater {
                    high = middle;
                } else {
                    low = middle;
                }
            }
            debug_assert!(low < Self::RADIX);

            if low > 0 {
                sub_assign_magnitude(
                    &mut remainder.limbs,
                    &scale_magnitude(&divisor.limbs, low),
                );
                remainder.normalize();
            }
            digits.push(low);
        }

        digits.reverse();
        let mut quotient = Self {
            negative: self.negative ^ divisor.negative,
            limbs: digits,
        };
        quotient.normalize();
        quotient
    }

    /// `self = self * RADIX + limb` for a non-negative receiver.
    fn shift_in_limb(&mut self, limb: Limb) {
        if self.is_zero() {
            self.limbs[0] = limb;
        } else {
            self.limbs.insert(0, limb);
        }
    }

    /// Checked division. Returns `None` if `rhs` is zero.
    ///
    /// The quotient is truncated toward zero.
    #[inline]
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        Some(self.long_div(rhs))
    }

    /// Checked remainder. Returns `None` if `rhs` is zero.
    ///
    /// Defined as `self - (self / rhs) * rhs`, so the result takes the sign
    /// of `self` and `(a / b) * b + a % b == a` always holds.
    #[inline]
    pub fn checked_rem(&self, rhs: &Self) -> Option<Self> {
        self.checked_div_rem(rhs).map(|(_, rem)| rem)
    }

    /// Quotient and remainder together. Returns `None` if `rhs` is zero.
    pub fn checked_div_rem(&self, rhs: &Self) -> Option<(Self, Self)> {
        let quotient = self.checked_div(rhs)?;
        let remainder = self - &(&quotient * rhs);
        Some((quotient, remainder))
    }

    /// Division returning an error on a zero divisor.
    ///
    /// # Errors
    /// Returns `NumError::DivisionByZero` if `rhs` is zero.
    #[inline]
    pub fn try_div(&self, rhs: &Self) -> crate::Result<Self> {
        self.checked_div(rhs).ok_or(NumError::DivisionByZero)
    }

    /// Remainder returning an error on a zero divisor.
    ///
    /// # Errors
    /// Returns `NumError::DivisionByZero` if `rhs` is zero.
    #[inline]
    pub fn try_rem(&self, rhs: &Self) -> crate::Result<Self> {
        self.checked_rem(rhs).ok_or(NumError::DivisionByZero)
    }

    /// Quotient and remainder, returning an error on a zero divisor.
    ///
    /// # Errors
    /// Returns `NumError::DivisionByZero` if `rhs` is zero.
    #[inline]
    pub fn try_div_rem(&self, rhs: &Self) -> crate::Result<(Self, Self)> {
        self.checked_div_rem(rhs).ok_or(NumError::DivisionByZero)
    }

    /// Greatest common divisor by the Euclidean algorithm. Always non-negative.
    ///
    /// `gcd(0, 0)` is zero.
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.abs();
        let mut b = other.abs();
        while !b.is_zero() {
            let r = &a % &b;
            a = core::mem::replace(&mut b, r);
        }
        a
    }
}

// ============================================================================
// Comparison
// ============================================================================

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => cmp_magnitude(&self.limbs, &other.limbs),
            (true, true) => cmp_magnitude(&other.limbs, &self.limbs),
        }
    }
}

impl PartialOrd for BigInt {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// String Parsing and Formatting
// ============================================================================

impl BigInt {
    /// Parses a decimal integer.
    ///
    /// Accepts an optional leading `-` followed by one or more ASCII digits
    /// and nothing else: no `+`, no whitespace. Leading zeros are allowed and
    /// dropped, and `"-0"` parses as zero.
    ///
    /// # Errors
    /// Returns `NumError::InvalidFormat` if the string is not a valid integer.
    pub fn from_str_exact(s: &str) -> crate::Result<Self> {
        let bytes = s.as_bytes();
        let (negative, digits) = match bytes.split_first() {
            Some((b'-', rest)) => (true, rest),
            Some(_) => (false, bytes),
            None => return Err(NumError::InvalidFormat),
        };

        if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
            return Err(NumError::InvalidFormat);
        }

        let limbs = digits
            .rchunks(Self::LIMB_DIGITS)
            .map(|chunk| {
                chunk
                    .iter()
                    .fold(0, |acc, &byte| acc * 10 + Limb::from(byte - b'0'))
            })
            .collect();

        let mut value = Self { negative, limbs };
        value.normalize();
        Ok(value)
    }

    /// Parses from a UTF-8 byte slice.
    ///
    /// # Errors
    /// Returns `NumError::InvalidFormat` on invalid UTF-8 or an invalid integer.
    pub fn from_utf8_bytes(bytes: &[u8]) -> crate::Result<Self> {
        let s = core::str::from_utf8(bytes).map_err(|_| NumError::InvalidFormat)?;
        Self::from_str_exact(s)
    }

    /// Magnitude as a `u128`, or `None` if it does not fit.
    fn magnitude_u128(&self) -> Option<u128> {
        self.limbs.iter().rev().try_fold(0u128, |acc, &limb| {
            acc.checked_mul(u128::from(Self::RADIX))?
                .checked_add(u128::from(limb))
        })
    }
}

impl FromStr for BigInt {
    type Err = NumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl fmt::Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut digits = String::with_capacity(self.limbs.len() * Self::LIMB_DIGITS);
        let mut limbs = self.limbs.iter().rev();

        // Only the leading limb goes unpadded
        if let Some(leading) = limbs.next() {
            write!(digits, "{leading}")?;
        }
        for limb in limbs {
            write!(digits, "{:0width$}", limb, width = Self::LIMB_DIGITS)?;
        }

        f.pad_integral(!self.negative, "", &digits)
    }
}

impl fmt::Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            // {:#?} shows raw internals
            f.debug_struct("BigInt")
                .field("negative", &self.negative)
                .field("limbs", &self.limbs)
                .finish()
        } else {
            write!(f, "BigInt({self})")
        }
    }
}

// ============================================================================
// Operator Overloading
// ============================================================================

impl Neg for BigInt {
    type Output = Self;

    #[inline]
    fn neg(mut self) -> Self::Output {
        self.negative = !self.negative;
        self.normalize();
        self
    }
}

impl Neg for &BigInt {
    type Output = BigInt;

    #[inline]
    fn neg(self) -> Self::Output {
        -self.clone()
    }
}

impl AddAssign<&BigInt> for BigInt {
    fn add_assign(&mut self, rhs: &BigInt) {
        if self.negative == rhs.negative {
            self.unsigned_add(rhs);
        } else {
            self.unsigned_subtract(rhs);
        }
    }
}

impl SubAssign<&BigInt> for BigInt {
    fn sub_assign(&mut self, rhs: &BigInt) {
        if self.negative == rhs.negative {
            self.unsigned_subtract(rhs);
        } else {
            self.unsigned_add(rhs);
        }
    }
}

impl MulAssign<&BigInt> for BigInt {
    #[inline]
    fn mul_assign(&mut self, rhs: &BigInt) {
        *self = &*self * rhs;
    }
}

impl DivAssign<&BigInt> for BigInt {
    #[inline]
    fn div_assign(&mut self, rhs: &BigInt) {
        *self = &*self / rhs;
    }
}

impl RemAssign<&BigInt> for BigInt {
    #[inline]
    fn rem_assign(&mut self, rhs: &BigInt) {
        *self = &*self % rhs;
    }
}

impl Add<&BigInt> for &BigInt {
    type Output = BigInt;

    #[inline]
    fn add(self, rhs: &BigInt) -> BigInt {
        let mut result = self.clone();
        result += rhs;
        result
    }
}

impl Sub<&BigInt> for &BigInt {
    type Output = BigInt;

    #[inline]
    fn sub(self, rhs: &BigInt) -> BigInt {
        let mut result = self.clone();
        result -= rhs;
        result
    }
}

impl Mul<&BigInt> for &BigInt {
    type Output = BigInt;

    #[inline]
    fn mul(self, rhs: &BigInt) -> BigInt {
        self.mul_with_threshold(rhs, BigInt::FFT_THRESHOLD)
    }
}

impl Div<&BigInt> for &BigInt {
    type Output = BigInt;

    #[inline]
    fn div(self, rhs: &BigInt) -> BigInt {
        self.checked_div(rhs).expect("attempt to divide by zero")
    }
}

impl Rem<&BigInt> for &BigInt {
    type Output = BigInt;

    #[inline]
    fn rem(self, rhs: &BigInt) -> BigInt {
        self.checked_rem(rhs)
            .expect("attempt to calculate the remainder with a divisor of zero")
    }
}

forward_binop!(impl Add, add for BigInt);
forward_binop!(impl Sub, sub for BigInt);
forward_binop!(impl Mul, mul for BigInt);
forward_binop!(impl Div, div for BigInt);
forward_binop!(impl Rem, rem for BigInt);

forward_assign!(impl AddAssign, add_assign for BigInt);
forward_assign!(impl SubAssign, sub_assign for BigInt);
forward_assign!(impl MulAssign, mul_assign for BigInt);
forward_assign!(impl DivAssign, div_assign for BigInt);
forward_assign!(impl RemAssign, rem_assign for BigInt);

// ============================================================================
// Numeric Trait Implementations
// ============================================================================

impl Zero for BigInt {
    #[inline]
    fn zero() -> Self {
        Self::new()
    }

    #[inline]
    fn is_zero(&self) -> bool {
        BigInt::is_zero(self)
    }
}

impl One for BigInt {
    #[inline]
    fn one() -> Self {
        Self {
            negative: false,
            limbs: vec![1],
        }
    }
}

impl ToPrimitive for BigInt {
    fn to_i64(&self) -> Option<i64> {
        self.to_i128().and_then(|v| i64::try_from(v).ok())
    }

    fn to_u64(&self) -> Option<u64> {
        self.to_u128().and_then(|v| u64::try_from(v).ok())
    }

    fn to_i128(&self) -> Option<i128> {
        let magnitude = self.magnitude_u128()?;
        if self.negative {
            // i128::MIN has no positive counterpart
            if magnitude == i128::MIN.unsigned_abs() {
                Some(i128::MIN)
            } else {
                i128::try_from(magnitude).ok().map(|v| -v)
            }
        } else {
            i128::try_from(magnitude).ok()
        }
    }

    fn to_u128(&self) -> Option<u128> {
        if self.negative {
            return None;
        }
        self.magnitude_u128()
    }
}

// ============================================================================
// Iterator Trait Implementations
// ============================================================================

impl Sum for BigInt {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::new(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a BigInt> for BigInt {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::new(), |acc, x| acc + x)
    }
}

impl Product for BigInt {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::one(), |acc, x| acc * x)
    }
}

impl<'a> Product<&'a BigInt> for BigInt {
    fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::one(), |acc, x| acc * x)
    }
}

// ============================================================================
// Serde Support
// ============================================================================

#[cfg(feature = "serde")]
impl Serialize for BigInt {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            // Bincode, MessagePack, etc. - sign and raw limbs
            (self.negative, &self.limbs).serialize(serializer)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for BigInt {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_str_exact(&s).map_err(de::Error::custom)
        } else {
            let (negative, limbs) = <(bool, Vec<u32>)>::deserialize(deserializer)?;
            Self::from_limbs(negative, limbs).map_err(de::Error::custom)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
fn int(s: &str) -> BigInt {
    BigInt::from_str_exact(s).unwrap()
}







#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn decimal() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("0".to_string()),
            "-?[1-9][0-9]{0,12}",
            "-?[1-9][0-9]{0,120}",
        ]
    }

    fn oracle(s: &str) -> num_bigint::BigInt {
        s.parse().unwrap()
    }

    proptest! {
        #[test]
        fn prop_string_round_trip(s in decimal()) {
            let value = int(&s);
            prop_assert_eq!(value.to_string(), s.clone());
            prop_assert_eq!(int(&value.to_string()), value);
        }

        #[test]
        fn prop_leading_zeros_dropped(s in decimal(), zeros in 0usize..10) {
            let padded = match s.strip_prefix('-') {
                Some(rest) => format!("-{}{}", "0".repeat(zeros), rest),
                None => format!("{}{}", "0".repeat(zeros), s),
            };
            prop_assert_eq!(int(&padded), int(&s));
        }

        #[test]
        fn prop_add_commutative(a in decimal(), b in decimal()) {
            let (a, b) = (int(&a), int(&b));
            prop_assert_eq!(&a + &b, &b + &a);
        }

        #[test]
        fn prop_add_associative(a in decimal(), b in decimal(), c in decimal()) {
            let (a, b, c) = (int(&a), int(&b), int(&c));
            prop_assert_eq!(&(&a + &b) + &c, &a + &(&b + &c));
        }

        #[test]
        fn prop_sub_inverts_add(a in decimal(), b in decimal()) {
            let (a, b) = (int(&a), int(&b));
            prop_assert_eq!(&(&a + &b) - &b, a);
        }

        #[test]
        fn prop_mul_commutative(a in decimal(), b in decimal()) {
            let (a, b) = (int(&a), int(&b));
            prop_assert_eq!(&a * &b, &b * &a);
        }

        #[test]
        fn prop_mul_matches_oracle(a in decimal(), b in decimal()) {
            let product = &int(&a) * &int(&b);
            prop_assert_eq!(product.to_string(), (oracle(&a) * oracle(&b)).to_string());
        }

        #[test]
        fn prop_strategies_agree(a in decimal(), b in decimal()) {
            let (a, b) = (int(&a), int(&b));
            prop_assert_eq!(a.fft_mul(&b), a.schoolbook_mul(&b));
        }

        #[test]
        fn prop_div_rem_identity(a in decimal(), b in decimal()) {
            let (a, b) = (int(&a), int(&b));
            prop_assume!(!b.is_zero());
            let q = &a / &b;
            let r = &a % &b;
            prop_assert_eq!(&(&q * &b) + &r, a.clone());
            prop_assert!(r.abs() < b.abs());
            prop_assert!(r.is_zero() || r.is_negative() == a.is_negative());
        }

        #[test]
        fn prop_div_matches_oracle(a in decimal(), b in decimal()) {
            prop_assume!(b != "0");
            let (q, r) = int(&a).checked_div_rem(&int(&b)).unwrap();
            prop_assert_eq!(q.to_string(), (oracle(&a) / oracle(&b)).to_string());
            prop_assert_eq!(r.to_string(), (oracle(&a) % oracle(&b)).to_string());
        }

        #[test]
        fn prop_ordering_matches_oracle(a in decimal(), b in decimal()) {
            prop_assert_eq!(int(&a).cmp(&int(&b)), oracle(&a).cmp(&oracle(&b)));
        }

        #[test]
        fn prop_i64_round_trip(v in any::<i64>()) {
            prop_assert_eq!(BigInt::from(v).to_i64(), Some(v));
            prop_assert_eq!(BigInt::from(v).to_string(), v.to_string());
        }
    }
}
