//! Checked integer arithmetic.
//!
//! Every Gwei-denominated quantity in the engine is an unsigned integer and every
//! division truncates toward zero. Overflow or a zero divisor must surface as an
//! error rather than a panic or a silently wrapped value, so the engine routes its
//! integer math through [`SafeArith`].

use thiserror::Error;

/// Failure of a checked arithmetic operation.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ArithError {
    #[error("integer overflow")]
    Overflow,
    #[error("division by zero")]
    DivisionByZero,
}

pub type Result<T> = std::result::Result<T, ArithError>;

/// Checked arithmetic for the unsigned integer types used by the engine.
pub trait SafeArith<Rhs = Self>: Sized + Copy {
    /// Safe variant of `+` that guards against overflow.
    fn safe_add(&self, other: Rhs) -> Result<Self>;

    /// Safe variant of `-` that guards against underflow.
    fn safe_sub(&self, other: Rhs) -> Result<Self>;

    /// Safe variant of `*` that guards against overflow.
    fn safe_mul(&self, other: Rhs) -> Result<Self>;

    /// Safe variant of `/` that guards against division by 0.
    fn safe_div(&self, other: Rhs) -> Result<Self>;

    /// Safe variant of `+=`.
    fn safe_add_assign(&mut self, other: Rhs) -> Result<()> {
        *self = self.safe_add(other)?;
        Ok(())
    }
}

macro_rules! impl_safe_arith {
    ($typ:ty) => {
        impl SafeArith for $typ {
            #[inline]
            fn safe_add(&self, other: Self) -> Result<Self> {
                self.checked_add(other).ok_or(ArithError::Overflow)
            }

            #[inline]
            fn safe_sub(&self, other: Self) -> Result<Self> {
                self.checked_sub(other).ok_or(ArithError::Overflow)
            }

            #[inline]
            fn safe_mul(&self, other: Self) -> Result<Self> {
                self.checked_mul(other).ok_or(ArithError::Overflow)
            }

            #[inline]
            fn safe_div(&self, other: Self) -> Result<Self> {
                self.checked_div(other).ok_or(ArithError::DivisionByZero)
            }
        }
    };
}

impl_safe_arith!(u64);
impl_safe_arith!(u128);

/// Narrow a `u128` intermediate back to `u64`.
pub fn narrow(value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| ArithError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_ops() {
        assert_eq!(7u64.safe_div(2), Ok(3));
        assert_eq!(7u64.safe_div(0), Err(ArithError::DivisionByZero));
        assert_eq!(u64::MAX.safe_add(1), Err(ArithError::Overflow));
        assert_eq!(0u64.safe_sub(1), Err(ArithError::Overflow));
        assert_eq!(u64::MAX.safe_mul(2), Err(ArithError::Overflow));
    }

    #[test]
    fn test_add_assign() {
        let mut x = 40u64;
        x.safe_add_assign(2).unwrap();
        assert_eq!(x, 42);
        assert!(x.safe_add_assign(u64::MAX).is_err());
        assert_eq!(x, 42);
    }

    #[test]
    fn test_narrow() {
        assert_eq!(narrow(u64::MAX as u128), Ok(u64::MAX));
        assert_eq!(narrow(u64::MAX as u128 + 1), Err(ArithError::Overflow));
    }
}
