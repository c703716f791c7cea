//! Money in minor currency units
//!
//! All amounts are whole grosz/cents held in an `i64`. Conversion to the
//! display currency happens only at the presentation boundary.

use crate::ledger::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Signed amount of minor units (1/100 of the display currency).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(units: i64) -> Self {
        Money(units)
    }

    pub const fn minor_units(self) -> i64 {
        self.0
    }

    pub const fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Parse a major-unit string such as `"50.25"`, `"50,25"` or `"-7.5"`.
    ///
    /// At most two fractional digits are accepted; no float is involved.
    pub fn parse_major(input: &str) -> Result<Self, LedgerError> {
        let invalid = || LedgerError::InvalidArgument(format!("invalid amount: {input:?}"));

        let trimmed = input.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let normalized = digits.replace(',', ".");
        let (whole, frac) = match normalized.split_once('.') {
            Some((w, f)) => (w, f),
            None => (normalized.as_str(), ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > 2
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole_units: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_units: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => frac.parse().map_err(|_| invalid())?,
        };

        let units = whole_units
            .checked_mul(100)
            .and_then(|u| u.checked_add(frac_units))
            .ok_or_else(invalid)?;

        Ok(Money(if negative { -units } else { units }))
    }
}

/// Split `total` into `n` shares that sum to exactly `total`.
///
/// The first `total mod n` shares carry one extra minor unit, so callers
/// control who absorbs the remainder through the order of their list.
pub fn split_evenly(total: Money, n: usize) -> Result<Vec<Money>, LedgerError> {
    if n == 0 {
        return Err(LedgerError::InvalidArgument(
            "cannot split between zero players".to_string(),
        ));
    }
    let count = i64::try_from(n)
        .map_err(|_| LedgerError::InvalidArgument(format!("split count {n} too large")))?;

    let base = total.0.div_euclid(count);
    let remainder = total.0.rem_euclid(count) as usize;

    Ok((0..n)
        .map(|i| Money(if i < remainder { base + 1 } else { base }))
        .collect())
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let units = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, units / 100, units % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(units: i64) -> Money {
        Money::from_minor(units)
    }

    #[test]
    fn test_split_even_total() {
        let shares = split_evenly(m(6000), 4).unwrap();
        assert_eq!(shares, vec![m(1500), m(1500), m(1500), m(1500)]);
    }

    #[test]
    fn test_split_remainder_goes_to_first_recipients() {
        assert_eq!(
            split_evenly(m(6001), 4).unwrap(),
            vec![m(1501), m(1500), m(1500), m(1500)]
        );
        assert_eq!(
            split_evenly(m(10000), 3).unwrap(),
            vec![m(3334), m(3333), m(3333)]
        );
    }

    #[test]
    fn test_split_sum_is_exact() {
        for total in [0, 1, 7, 99, 100, 35000, 10001, 123_457] {
            for n in 1..=17usize {
                let shares = split_evenly(m(total), n).unwrap();
                assert_eq!(shares.len(), n);
                assert_eq!(shares.iter().sum::<Money>(), m(total), "total={total} n={n}");

                let base = total / n as i64;
                let bumped = shares.iter().filter(|s| s.minor_units() == base + 1).count();
                assert!(shares
                    .iter()
                    .all(|s| s.minor_units() == base || s.minor_units() == base + 1));
                assert_eq!(bumped as i64, total % n as i64);
            }
        }
    }

    #[test]
    fn test_split_fewer_units_than_players() {
        assert_eq!(split_evenly(m(2), 5).unwrap(), vec![m(1), m(1), m(0), m(0), m(0)]);
    }

    #[test]
    fn test_split_zero_players_rejected() {
        let err = split_evenly(m(100), 0).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidArgument(_)));
    }

    #[test]
    fn test_parse_major() {
        assert_eq!(Money::parse_major("50.25").unwrap(), m(5025));
        assert_eq!(Money::parse_major("50,25").unwrap(), m(5025));
        assert_eq!(Money::parse_major("7.5").unwrap(), m(750));
        assert_eq!(Money::parse_major("350").unwrap(), m(35000));
        assert_eq!(Money::parse_major("-12.01").unwrap(), m(-1201));
        assert_eq!(Money::parse_major(" .99 ").unwrap(), m(99));

        assert!(Money::parse_major("").is_err());
        assert!(Money::parse_major("1.234").is_err());
        assert!(Money::parse_major("abc").is_err());
        assert!(Money::parse_major("1.2.3").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(m(5025).to_string(), "50.25");
        assert_eq!(m(-1666).to_string(), "-16.66");
        assert_eq!(m(5).to_string(), "0.05");
        assert_eq!(m(0).to_string(), "0.00");
    }

    #[test]
    fn test_serializes_as_integer() {
        assert_eq!(serde_json::to_string(&m(-3334)).unwrap(), "-3334");
        let parsed: Money = serde_json::from_str("10000").unwrap();
        assert_eq!(parsed, m(10000));
    }
}
