//! Arbitrary-precision integers and exact rationals
//!
//! This library provides two number types that never overflow:
//!
//! - **`BigInt`**: signed integer of unbounded size
//!   - Base-10,000 limbs, so decimal text converts four digits at a time
//!   - Multiplication switches from schoolbook to FFT convolution for large operands
//!   - Division and remainder truncate toward zero
//!
//! - **`Rational`**: exact fraction of two `BigInt`s
//!   - Always in lowest terms with a positive denominator
//!   - Fixed-precision decimal rendering and approximate `f64` conversion
//!
//! ## Features
//!
//! - **Exact arithmetic**: `+ - * / %` on integers, `+ - * /` on rationals
//! - **Canonical text**: `Display` and `FromStr` round-trip
//! - **Serde support**: string form for JSON, raw limbs for binary formats
//! - **Fallible variants**: `checked_*` returning `Option`, `try_*` returning `Result`
//!
//! ## Example
//!
//! ```rust
//! use bigrat::{BigInt, Rational};
//!
//! let a: BigInt = "123456789".parse().unwrap();
//! let b: BigInt = "987654321".parse().unwrap();
//! assert_eq!((a * b).to_string(), "121932631112635269");
//!
//! let third = Rational::from_i64(1, 3);
//! let sixth = Rational::from_i64(1, 6);
//! assert_eq!(third + sixth, Rational::from_i64(1, 2));
//! assert_eq!(Rational::from_i64(2, 3).as_decimal(4), "0.6666");
//! ```

#![cfg_attr(test, allow(unused_imports))]

use thiserror::Error;

/// Implements the owned/borrowed operand combinations of a binary operator
/// in terms of the `&T op &T` impl.
macro_rules! forward_binop {
    (impl $imp:ident, $method:ident for $t:ty) => {
        impl $imp<$t> for $t {
            type Output = $t;

            #[inline]
            fn $method(self, rhs: $t) -> $t {
                <&$t as $imp<&$t>>::$method(&self, &rhs)
            }
        }

        impl $imp<&$t> for $t {
            type Output = $t;

            #[inline]
            fn $method(self, rhs: &$t) -> $t {
                <&$t as $imp<&$t>>::$method(&self, rhs)
            }
        }

        impl $imp<$t> for &$t {
            type Output = $t;

            #[inline]
            fn $method(self, rhs: $t) -> $t {
                <&$t as $imp<&$t>>::$method(self, &rhs)
            }
        }
    };
}

/// Implements `T op= T` in terms of `T op= &T`.
macro_rules! forward_assign {
    (impl $imp:ident, $method:ident for $t:ty) => {
        impl $imp<$t> for $t {
            #[inline]
            fn $method(&mut self, rhs: $t) {
                <$t as $imp<&$t>>::$method(self, &rhs)
            }
        }
    };
}

mod bigint;
mod fft;
mod rational;

pub use bigint::BigInt;
pub use rational::Rational;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid string format")]
    InvalidFormat,
}

pub type Result<T> = core::result::Result<T, NumError>;
