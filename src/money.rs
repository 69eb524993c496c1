use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

/// Money type backed by a signed integer; premiums, balances, and payouts
/// accumulate in whole currency units and divisions floor toward zero
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);
    pub const ONE: Money = Money(1);

    /// create from a whole-unit amount
    pub fn new(amount: i64) -> Self {
        Money(amount)
    }

    /// get the underlying integer amount
    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// check if strictly positive
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// check if strictly negative
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// absolute value
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// minimum of two values
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// maximum of two values
    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// the given percentage of this amount, floored (e.g. 2% of 4500 is 90)
    pub fn percent(&self, pct: i64) -> Self {
        Money(self.0 * pct / 100)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Money(amount)
    }
}

impl From<i32> for Money {
    fn from(amount: i32) -> Self {
        Money(amount as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Money;

    fn mul(self, factor: i64) -> Money {
        Money(self.0 * factor)
    }
}

impl Div<i64> for Money {
    type Output = Money;

    fn div(self, divisor: i64) -> Money {
        Money(self.0 / divisor)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}
