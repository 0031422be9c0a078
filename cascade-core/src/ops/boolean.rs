//! Boolean logic over `Signal<bool>`.
//!
//! A bare boolean signal defaults to `false`.

use crate::error::Result;
use crate::reactive::{Signal, Update};

impl Signal<bool> {
    /// The negation of this signal.
    pub fn not(&self) -> Result<Signal<bool>> {
        Signal::derive(&[self], |values: &[bool], _| Update::Value(!values[0]))
    }

    /// True when this signal and every one of `others` are true.
    pub fn and(&self, others: &[&Signal<bool>]) -> Result<Signal<bool>> {
        Signal::derive(&self.with_others(others), |values: &[bool], _| {
            Update::Value(values.iter().all(|v| *v))
        })
    }

    /// The negation of [`and`](Self::and).
    pub fn nand(&self, others: &[&Signal<bool>]) -> Result<Signal<bool>> {
        self.and(others)?.not()
    }

    /// True when this signal or any of `others` is true.
    pub fn or(&self, others: &[&Signal<bool>]) -> Result<Signal<bool>> {
        Signal::derive(&self.with_others(others), |values: &[bool], _| {
            Update::Value(values.iter().any(|v| *v))
        })
    }

    /// The negation of [`or`](Self::or).
    pub fn nor(&self, others: &[&Signal<bool>]) -> Result<Signal<bool>> {
        self.or(others)?.not()
    }

    /// True when exactly one of the two signals is true.
    pub fn xor(&self, other: &Signal<bool>) -> Result<Signal<bool>> {
        Signal::derive(&[self, other], |values: &[bool], _| {
            Update::Value(values[0] ^ values[1])
        })
    }

    /// The negation of [`xor`](Self::xor).
    pub fn xnor(&self, other: &Signal<bool>) -> Result<Signal<bool>> {
        self.xor(other)?.not()
    }

    fn with_others<'a>(&'a self, others: &[&'a Signal<bool>]) -> Vec<&'a Signal<bool>> {
        std::iter::once(self).chain(others.iter().copied()).collect()
    }
}
