use core::cmp::Ordering;
use core::fmt;
use core::iter::{Product, Sum};
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use core::str::FromStr;

use num_traits::{One, Zero};
#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use tracing::trace;

use crate::{BigInt, NumError};

/// Exact fraction of two arbitrary-precision integers.
///
/// Always in lowest terms with a strictly positive denominator; zero is `0/1`.
/// Equal values therefore have equal fields.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    numerator: BigInt,
    denominator: BigInt,
}

// ============================================================================
// Constants
// ============================================================================

impl Rational {
    /// Fractional digits of the decimal expansion behind `to_f64`.
    pub const FLOAT_DIGITS: usize = 300;
}

// ============================================================================
// Constructors and Accessors
// ============================================================================

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl Rational {
    /// Creates `numerator / denominator` in lowest terms.
    ///
    /// # Errors
    /// Returns `NumError::DivisionByZero` if the denominator is zero.
    pub fn try_new(numerator: BigInt, denominator: BigInt) -> crate::Result<Self> {
        if denominator.is_zero() {
            return Err(NumError::DivisionByZero);
        }
        let mut value = Self {
            numerator,
            denominator,
        };
        value.normalize();
        Ok(value)
    }

    /// Creates `numerator / denominator` in lowest terms.
    ///
    /// # Panics
    /// Panics if the denominator is zero.
    pub fn new(numerator: BigInt, denominator: BigInt) -> Self {
        Self::try_new(numerator, denominator).expect("denominator cannot be zero")
    }

    /// Creates a rational from i64 numerator and denominator.
    ///
    /// # Panics
    /// Panics if the denominator is zero.
    pub fn from_i64(numerator: i64, denominator: i64) -> Self {
        Self::new(BigInt::from(numerator), BigInt::from(denominator))
    }

    /// Creates a rational with denominator 1.
    #[inline]
    pub fn from_integer(n: BigInt) -> Self {
        Self {
            numerator: n,
            denominator: BigInt::one(),
        }
    }

    /// The numerator. Carries the sign.
    #[inline]
    pub fn numer(&self) -> &BigInt {
        &self.numerator
    }

    /// The denominator. Always positive.
    #[inline]
    pub fn denom(&self) -> &BigInt {
        &self.denominator
    }

    /// Returns true if the denominator is 1.
    #[inline]
    pub fn is_integer(&self) -> bool {
        self.denominator.is_one()
    }

    /// The value as an integer, if it is one.
    pub fn to_integer(&self) -> Option<BigInt> {
        self.is_integer().then(|| self.numerator.clone())
    }

    /// Reduces by the gcd and moves the sign onto the numerator.
    ///
    /// Requires a non-zero denominator.
    fn normalize(&mut self) {
        let mut divisor = self.numerator.gcd(&self.denominator);
        if self.denominator.is_negative() {
            divisor = -divisor;
        }
        self.numerator /= &divisor;
        self.denominator /= &divisor;
    }
}

// ============================================================================
// Sign Operations
// ============================================================================

impl Rational {
    /// Returns true if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.numerator.is_zero()
    }

    /// Returns true if the value is strictly negative.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.numerator.is_negative()
    }

    /// Returns true if the value is strictly positive.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.numerator.is_positive()
    }

    /// Returns -1, 0 or 1.
    #[inline]
    pub fn signum(&self) -> i8 {
        self.numerator.signum()
    }

    /// Returns the absolute value.
    pub fn abs(&self) -> Self {
        Self {
            numerator: self.numerator.abs(),
            denominator: self.denominator.clone(),
        }
    }

    /// Checked reciprocal. Returns `None` for zero.
    pub fn checked_recip(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        let mut value = Self {
            numerator: self.denominator.clone(),
            denominator: self.numerator.clone(),
        };
        value.normalize();
        Some(value)
    }

    /// Reciprocal, returning an error for zero.
    ///
    /// # Errors
    /// Returns `NumError::DivisionByZero` if the value is zero.
    #[inline]
    pub fn try_recip(&self) -> crate::Result<Self> {
        self.checked_recip().ok_or(NumError::DivisionByZero)
    }

    /// Reciprocal.
    ///
    /// # Panics
    /// Panics if the value is zero.
    #[inline]
    pub fn recip(&self) -> Self {
        self.checked_recip().expect("cannot take reciprocal of zero")
    }
}

// ============================================================================
// Division
// ============================================================================

impl Rational {
    /// Checked division. Returns `None` if `rhs` is zero.
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        let mut value = Self {
            numerator: &self.numerator * &rhs.denominator,
            denominator: &self.denominator * &rhs.numerator,
        };
        value.normalize();
        Some(value)
    }

    /// Division returning an error on a zero divisor.
    ///
    /// # Errors
    /// Returns `NumError::DivisionByZero` if `rhs` is zero.
    #[inline]
    pub fn try_div(&self, rhs: &Self) -> crate::Result<Self> {
        self.checked_div(rhs).ok_or(NumError::DivisionByZero)
    }
}

// ============================================================================
// Decimal and Float Conversion
// ============================================================================

impl Rational {
    /// Renders the value with exactly `precision` fractional digits, truncated.
    ///
    /// The output matches `-?[0-9]+\.[0-9]{precision}`, or `-?[0-9]+` when
    /// `precision == 0`. The `-` follows the sign of the value, not of the
    /// rendered digits, so `-1/1000` at precision 2 is `"-0.00"`.
    pub fn as_decimal(&self, precision: usize) -> String {
        let scaled = self.numerator.abs() * BigInt::pow10(precision);
        let mut digits = (&scaled / &self.denominator).to_string();

        let mut out = String::with_capacity(digits.len().max(precision + 1) + 2);
        if self.is_negative() {
            out.push('-');
        }
        if precision == 0 {
            out.push_str(&digits);
            return out;
        }

        // At least one integer digit before the point
        if digits.len() <= precision {
            let zeros = "0".repeat(precision + 1 - digits.len());
            digits.insert_str(0, &zeros);
        }
        let (int_part, frac_part) = digits.split_at(digits.len() - precision);
        out.push_str(int_part);
        out.push('.');
        out.push_str(frac_part);
        out
    }

    /// Approximate `f64` value.
    ///
    /// Sums the digits of a `FLOAT_DIGITS`-digit decimal expansion. Not
    /// correctly rounded; good to roughly the 15-17 significant digits an
    /// `f64` holds. Integer parts beyond `f64::MAX` become infinite.
    pub fn to_f64(&self) -> f64 {
        trace!(digits = Self::FLOAT_DIGITS, "rational to f64 via decimal expansion");

        let text = self.as_decimal(Self::FLOAT_DIGITS);
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.as_str()),
        };
        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let mut value = int_part
            .bytes()
            .fold(0.0, |acc, digit| acc * 10.0 + f64::from(digit - b'0'));
        let mut place = 1.0;
        for digit in frac_part.bytes() {
            place /= 10.0;
            value += place * f64::from(digit - b'0');
        }

        if negative { -value } else { value }
    }
}

impl From<&Rational> for f64 {
    #[inline]
    fn from(value: &Rational) -> Self {
        value.to_f64()
    }
}

impl From<Rational> for f64 {
    #[inline]
    fn from(value: Rational) -> Self {
        value.to_f64()
    }
}

// ============================================================================
// Comparison
// ============================================================================

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // Denominators are positive, so cross-multiplying keeps the order
        (&self.numerator * &other.denominator).cmp(&(&other.numerator * &self.denominator))
    }
}

impl PartialOrd for Rational {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ============================================================================
// String Parsing and Formatting
// ============================================================================

impl Rational {
    /// Parses `"<integer>"` or `"<integer>/<integer>"`.
    ///
    /// Both parts follow the `BigInt` grammar. The result is reduced, so
    /// `"2/-4"` parses as `-1/2`.
    ///
    /// # Errors
    /// Returns `NumError::InvalidFormat` if either part is malformed and
    /// `NumError::DivisionByZero` if the denominator is zero.
    pub fn from_str_exact(s: &str) -> crate::Result<Self> {
        match s.split_once('/') {
            Some((numerator, denominator)) => Self::try_new(
                BigInt::from_str_exact(numerator)?,
                BigInt::from_str_exact(denominator)?,
            ),
            None => BigInt::from_str_exact(s).map(Self::from_integer),
        }
    }
}

impl FromStr for Rational {
    type Err = NumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_exact(s)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.debug_struct("Rational")
                .field("numerator", &self.numerator)
                .field("denominator", &self.denominator)
                .finish()
        } else {
            write!(f, "Rational({self})")
        }
    }
}

// ============================================================================
// Operator Overloading
// ============================================================================

impl Neg for Rational {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

impl Neg for &Rational {
    type Output = Rational;

    #[inline]
    fn neg(self) -> Self::Output {
        -self.clone()
    }
}

impl AddAssign<&Rational> for Rational {
    fn add_assign(&mut self, rhs: &Rational) {
        self.numerator =
            &self.numerator * &rhs.denominator + &rhs.numerator * &self.denominator;
        self.denominator *= &rhs.denominator;
        self.normalize();
    }
}

impl SubAssign<&Rational> for Rational {
    fn sub_assign(&mut self, rhs: &Rational) {
        self.numerator =
            &self.numerator * &rhs.denominator - &rhs.numerator * &self.denominator;
        self.denominator *= &rhs.denominator;
        self.normalize();
    }
}

impl MulAssign<&Rational> for Rational {
    fn mul_assign(&mut self, rhs: &Rational) {
        self.numerator *= &rhs.numerator;
        self.denominator *= &rhs.denominator;
        self.normalize();
    }
}

impl DivAssign<&Rational> for Rational {
    #[inline]
    fn div_assign(&mut self, rhs: &Rational) {
        *self = &*self / rhs;
    }
}

impl Add<&Rational> for &Rational {
    type Output = Rational;

    #[inline]
    fn add(self, rhs: &Rational) -> Rational {
        let mut result = self.clone();
        result += rhs;
        result
    }
}

impl Sub<&Rational> for &Rational {
    type Output = Rational;

    #[inline]
    fn sub(self, rhs: &Rational) -> Rational {
        let mut result = self.clone();
        result -= rhs;
        result
    }
}

impl Mul<&Rational> for &Rational {
    type Output = Rational;

    #[inline]
    fn mul(self, rhs: &Rational) -> Rational {
        let mut result = self.clone();
        result *= rhs;
        result
    }
}

impl Div<&Rational> for &Rational {
    type Output = Rational;

    #[inline]
    fn div(self, rhs: &Rational) -> Rational {
        self.checked_div(rhs).expect("attempt to divide by zero")
    }
}

forward_binop!(impl Add, add for Rational);
forward_binop!(impl Sub, sub for Rational);
forward_binop!(impl Mul, mul for Rational);
forward_binop!(impl Div, div for Rational);

forward_assign!(impl AddAssign, add_assign for Rational);
forward_assign!(impl SubAssign, sub_assign for Rational);
forward_assign!(impl MulAssign, mul_assign for Rational);
forward_assign!(impl DivAssign, div_assign for Rational);

// ============================================================================
// Standard Library Trait Implementations
// ============================================================================

impl From<BigInt> for Rational {
    #[inline]
    fn from(n: BigInt) -> Self {
        Self::from_integer(n)
    }
}

impl From<&BigInt> for Rational {
    #[inline]
    fn from(n: &BigInt) -> Self {
        Self::from_integer(n.clone())
    }
}

impl From<i64> for Rational {
    #[inline]
    fn from(n: i64) -> Self {
        Self::from_integer(BigInt::from(n))
    }
}

impl From<i32> for Rational {
    #[inline]
    fn from(n: i32) -> Self {
        Self::from_integer(BigInt::from(n))
    }
}

impl Zero for Rational {
    #[inline]
    fn zero() -> Self {
        Self::from_integer(BigInt::zero())
    }

    #[inline]
    fn is_zero(&self) -> bool {
        Rational::is_zero(self)
    }
}

impl One for Rational {
    #[inline]
    fn one() -> Self {
        Self::from_integer(BigInt::one())
    }
}

impl Sum for Rational {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Rational> for Rational {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| acc + x)
    }
}

impl Product for Rational {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::one(), |acc, x| acc * x)
    }
}

impl<'a> Product<&'a Rational> for Rational {
    fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::one(), |acc, x| acc * x)
    }
}

// ============================================================================
// Serde Support
// ============================================================================

#[cfg(feature = "serde")]
impl Serialize for Rational {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            (&self.numerator, &self.denominator).serialize(serializer)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_str_exact(&s).map_err(de::Error::custom)
        } else {
            let (numerator, denominator) = <(BigInt, BigInt)>::deserialize(deserializer)?;
            Self::try_new(numerator, denominator).map_err(de::Error::custom)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
fn ratio(n: i64, d: i64) -> Rational {
    Rational::from_i64(n, d)
}


#[cfg(test)]
mod operator_tests {
    use super::*;

    #[test]
    fn test_addition() {
        assert_eq!(ratio(1, 3) + ratio(1, 6), ratio(1, 2));
        assert_eq!(ratio(1, 2) + ratio(-1, 2), Rational::zero());
        assert_eq!(ratio(1, 2) + ratio(1, 3), ratio(5, 6));
    }

    #[test]
    fn test_subtraction() {
        assert_eq!(ratio(1, 2) - ratio(1, 3), ratio(1, 6));
        assert_eq!(ratio(1, 3) - ratio(1, 2), ratio(-1, 6));
    }

    #[test]
    fn test_multiplication() {
        assert_eq!(ratio(1, 2) * ratio(1, 3), ratio(1, 6));
        assert_eq!(ratio(-2, 3) * ratio(3, 4), ratio(-1, 2));
        assert_eq!(ratio(-2, 3) * Rational::zero(), Rational::zero());
    }

    #[test]
    fn test_division() {
        assert_eq!(ratio(1, 2) / ratio(1, 4), ratio(2, 1));
        assert_eq!(ratio(1, 2) / ratio(-3, 4), ratio(-2, 3));
        assert_eq!(ratio(1, 2).checked_div(&Rational::zero()), None);
        assert_eq!(
            ratio(1, 2).try_div(&Rational::zero()),
            Err(NumError::DivisionByZero)
        );
    }

    #[test]
    #[should_panic(expected = "attempt to divide by zero")]
    fn test_div_operator_panics_on_zero() {
        let _ = ratio(1, 2) / Rational::zero();
    }

    #[test]
    fn test_compound_assignment() {
        let mut x = ratio(1, 2);
        x += ratio(1, 4);
        assert_eq!(x, ratio(3, 4));
        x -= &ratio(1, 4);
        assert_eq!(x, ratio(1, 2));
        x *= ratio(4, 3);
        assert_eq!(x, ratio(2, 3));
        x /= ratio(-2, 9);
        assert_eq!(x, ratio(-3, 1));
    }

    #[test]
    fn test_negation() {
        assert_eq!(-ratio(1, 2), ratio(-1, 2));
        assert_eq!(-&ratio(-1, 2), ratio(1, 2));
        assert_eq!(-Rational::zero(), Rational::zero());
    }

    #[test]
    fn test_harmonic_sum() {
        let h: Rational = (1..=10).map(|k| ratio(1, k)).sum();
        assert_eq!(h.to_string(), "7381/2520");
        let p: Rational = (1..=5).map(|k| ratio(k, k + 1)).product();
        assert_eq!(p, ratio(1, 6));
    }
}


#[cfg(test)]
mod decimal_tests {
    use super::*;

    #[test]
    fn test_as_decimal() {
        assert_eq!(ratio(1, 3).as_decimal(5), "0.33333");
        assert_eq!(ratio(-1, 3).as_decimal(5), "-0.33333");
        assert_eq!(ratio(1, 8).as_decimal(3), "0.125");
        assert_eq!(ratio(1, 8).as_decimal(2), "0.12");
        assert_eq!(ratio(-7, 2).as_decimal(1), "-3.5");
        assert_eq!(ratio(123, 1).as_decimal(2), "123.00");
        assert_eq!(ratio(1, 100).as_decimal(1), "0.0");
        assert_eq!(ratio(1, 100).as_decimal(4), "0.0100");
    }

    #[test]
    fn test_as_decimal_zero_precision() {
        assert_eq!(ratio(22, 7).as_decimal(0), "3");
        assert_eq!(ratio(-22, 7).as_decimal(0), "-3");
        assert_eq!(Rational::zero().as_decimal(0), "0");
    }

    #[test]
    fn test_as_decimal_keeps_sign_of_tiny_negatives() {
        assert_eq!(ratio(-1, 1000).as_decimal(2), "-0.00");
        assert_eq!(ratio(-1, 3).as_decimal(0), "-0");
    }

    #[test]
    fn test_to_f64() {
        assert!((ratio(1, 3).to_f64() - 1.0 / 3.0).abs() < 1e-15);
        assert!((ratio(-22, 7).to_f64() + 22.0 / 7.0).abs() < 1e-14);
        assert_eq!(ratio(7, 2).to_f64(), 3.5);
        assert_eq!(Rational::zero().to_f64(), 0.0);
        assert_eq!(f64::from(&ratio(-1, 4)), -0.25);
    }

    #[test]
    fn test_to_f64_large_and_small() {
        let big = Rational::from(BigInt::from(10).pow(30));
        assert!((big.to_f64() / 1e30 - 1.0).abs() < 1e-12);

        let small = Rational::new(BigInt::one(), BigInt::from(10).pow(20));
        assert!((small.to_f64() / 1e-20 - 1.0).abs() < 1e-12);
    }
}

#[cfg(test)]
mod string_tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ratio(3, 1).to_string(), "3");
        assert_eq!(ratio(2, 3).to_string(), "2/3");
        assert_eq!(ratio(-2, 4).to_string(), "-1/2");
        assert_eq!(format!("{:?}", ratio(-2, 4)), "Rational(-1/2)");
    }

    #[test]
    fn test_parse() {
        assert_eq!("3".parse::<Rational>().unwrap(), ratio(3, 1));
        assert_eq!("6/8".parse::<Rational>().unwrap(), ratio(3, 4));
        assert_eq!("2/-4".parse::<Rational>().unwrap(), ratio(-1, 2));
        assert_eq!("-0/7".parse::<Rational>().unwrap(), Rational::zero());
    }

    #[test]
    fn test_parse_errors() {
        for bad in ["", "/", "1/", "/2", "1/2/3", "1.5", "a/b", " 1/2"] {
            assert_eq!(
                Rational::from_str_exact(bad),
                Err(NumError::InvalidFormat),
                "input {bad:?}"
            );
        }
        assert_eq!(
            Rational::from_str_exact("1/0"),
            Err(NumError::DivisionByZero)
        );
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_serialize() {
        assert_eq!(serde_json::to_string(&ratio(-2, 4)).unwrap(), r#""-1/2""#);
        assert_eq!(serde_json::to_string(&ratio(4, 2)).unwrap(), r#""2""#);
    }

    #[test]
    fn test_deserialize() {
        let r: Rational = serde_json::from_str(r#""6/-8""#).unwrap();
        assert_eq!(r, ratio(-3, 4));
        assert!(serde_json::from_str::<Rational>(r#""1/0""#).is_err());
    }

    #[test]
    fn test_round_trip() {
        let original = ratio(355, 113);
        let json = serde_json::to_string(&original).unwrap();
        assert_eq!(serde_json::from_str::<Rational>(&json).unwrap(), original);
    }
}
