//! Arithmetic over numeric signals.
//!
//! A bare numeric signal defaults to `0`. Binary operators follow two
//! signals and recompute whenever either side changes. Every operator is
//! checked: overflow, division by zero and out-of-range powers fail the
//! recomputation with an [`ArithmeticError`] instead of panicking.

use thiserror::Error;

use crate::error::Result;
use crate::reactive::{Signal, Update};

/// Why an arithmetic helper could not produce a value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("power is out of range for the value type")]
    PowerOutOfRange,
}

/// Checked arithmetic, implemented for the primitive numeric types.
///
/// Each operation returns `None` when the result does not fit the type.
/// Floating-point operations never fail; they follow IEEE 754.
pub trait Checked: Sized {
    fn checked_plus(&self, rhs: &Self) -> Option<Self>;

    fn checked_minus(&self, rhs: &Self) -> Option<Self>;

    fn checked_times(&self, rhs: &Self) -> Option<Self>;

    /// Quotient; `None` also for a zero divisor.
    fn checked_quotient(&self, rhs: &Self) -> Option<Self>;

    /// Remainder; `None` also for a zero divisor.
    fn checked_remainder(&self, rhs: &Self) -> Option<Self>;

    /// `self` raised to `exponent`. `None` also when the exponent is not
    /// valid for the type, such as a negative integer exponent.
    fn checked_power(&self, exponent: &Self) -> Option<Self>;
}

macro_rules! impl_checked_integer {
    ($($ty:ty),*) => {
        $(
            impl Checked for $ty {
                fn checked_plus(&self, rhs: &Self) -> Option<Self> {
                    <$ty>::checked_add(*self, *rhs)
                }

                fn checked_minus(&self, rhs: &Self) -> Option<Self> {
                    <$ty>::checked_sub(*self, *rhs)
                }

                fn checked_times(&self, rhs: &Self) -> Option<Self> {
                    <$ty>::checked_mul(*self, *rhs)
                }

                fn checked_quotient(&self, rhs: &Self) -> Option<Self> {
                    <$ty>::checked_div(*self, *rhs)
                }

                fn checked_remainder(&self, rhs: &Self) -> Option<Self> {
                    <$ty>::checked_rem(*self, *rhs)
                }

                fn checked_power(&self, exponent: &Self) -> Option<Self> {
                    u32::try_from(*exponent)
                        .ok()
                        .and_then(|e| <$ty>::checked_pow(*self, e))
                }
            }
        )*
    };
}

impl_checked_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_checked_float {
    ($($ty:ty),*) => {
        $(
            impl Checked for $ty {
                fn checked_plus(&self, rhs: &Self) -> Option<Self> {
                    Some(self + rhs)
                }

                fn checked_minus(&self, rhs: &Self) -> Option<Self> {
                    Some(self - rhs)
                }

                fn checked_times(&self, rhs: &Self) -> Option<Self> {
                    Some(self * rhs)
                }

                fn checked_quotient(&self, rhs: &Self) -> Option<Self> {
                    (*rhs != 0.0).then(|| self / rhs)
                }

                fn checked_remainder(&self, rhs: &Self) -> Option<Self> {
                    (*rhs != 0.0).then(|| self % rhs)
                }

                fn checked_power(&self, exponent: &Self) -> Option<Self> {
                    Some(self.powf(*exponent))
                }
            }
        )*
    };
}

impl_checked_float!(f32, f64);

type CheckedOp<T> = fn(&T, &T) -> Option<T>;

impl<T> Signal<T>
where
    T: Checked + Clone + Default + PartialEq + 'static,
{
    /// The sum of this signal and `other`.
    pub fn plus(&self, other: &Signal<T>) -> Result<Signal<T>> {
        self.checked_binary(other, T::checked_plus, ArithmeticError::Overflow)
    }

    /// The difference of this signal and `other`.
    pub fn minus(&self, other: &Signal<T>) -> Result<Signal<T>> {
        self.checked_binary(other, T::checked_minus, ArithmeticError::Overflow)
    }

    /// The product of this signal and `other`.
    pub fn times(&self, other: &Signal<T>) -> Result<Signal<T>> {
        self.checked_binary(other, T::checked_times, ArithmeticError::Overflow)
    }

    /// This signal divided by `other`. Fails while `other` is zero.
    pub fn div(&self, other: &Signal<T>) -> Result<Signal<T>> {
        self.checked_division(other, T::checked_quotient)
    }

    /// The remainder of this signal divided by `other`. Fails while `other`
    /// is zero.
    pub fn rem(&self, other: &Signal<T>) -> Result<Signal<T>> {
        self.checked_division(other, T::checked_remainder)
    }

    /// This signal raised to the power of `other`.
    pub fn pow(&self, other: &Signal<T>) -> Result<Signal<T>> {
        self.checked_binary(other, T::checked_power, ArithmeticError::PowerOutOfRange)
    }

    /// Running total of every value seen, starting with the current one.
    pub fn sum(&self) -> Result<Signal<T>> {
        self.accumulate(T::checked_plus)
    }

    /// Running product of every value seen, starting with the current one.
    pub fn product(&self) -> Result<Signal<T>> {
        self.accumulate(T::checked_times)
    }

    /// Difference between each value and the one before it.
    pub fn delta(&self) -> Result<Signal<T>> {
        let mut previous = self.value();
        Signal::try_derive(&[self], move |values: &[T], _| {
            let step = values[0]
                .checked_minus(&previous)
                .ok_or(ArithmeticError::Overflow)?;
            previous = values[0].clone();
            Ok::<_, ArithmeticError>(Update::Value(step))
        })
    }

    fn checked_binary(
        &self,
        other: &Signal<T>,
        op: CheckedOp<T>,
        error: ArithmeticError,
    ) -> Result<Signal<T>> {
        Signal::try_derive(&[self, other], move |values: &[T], _| {
            op(&values[0], &values[1]).map(Update::Value).ok_or(error)
        })
    }

    fn checked_division(&self, other: &Signal<T>, op: CheckedOp<T>) -> Result<Signal<T>> {
        Signal::try_derive(&[self, other], move |values: &[T], _| {
            if values[1] == T::default() {
                return Err(ArithmeticError::DivisionByZero);
            }
            op(&values[0], &values[1])
                .map(Update::Value)
                .ok_or(ArithmeticError::Overflow)
        })
    }

    /// Fold every value into the running result, seeded with the first.
    fn accumulate(&self, op: CheckedOp<T>) -> Result<Signal<T>> {
        let mut seeded = false;
        Signal::try_derive(&[self], move |values: &[T], ctx| {
            if !seeded {
                seeded = true;
                return Ok(Update::Value(values[0].clone()));
            }
            op(ctx.value(), &values[0])
                .map(Update::Value)
                .ok_or(ArithmeticError::Overflow)
        })
    }
}
