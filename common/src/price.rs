//! [`Price`]-related definitions.

use std::{
    fmt::{self, Write as _},
    str::FromStr,
};

use derive_more::{Display, Error, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;

/// Non-negative amount of yen.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Into, Ord, PartialEq, PartialOrd,
)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Price(Decimal);

impl Price {
    /// [`Price`] of nothing.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Price`] if the provided `amount` is not negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount.is_zero() || amount.is_sign_positive()).then_some(Self(amount))
    }

    /// Returns the amount of this [`Price`].
    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    /// Returns the [`Price`] of `count` units costing this [`Price`] each.
    ///
    /// [`None`] is returned if the result is not representable.
    #[must_use]
    pub fn times(self, count: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(count)).map(Self)
    }

    /// Adds up two [`Price`]s.
    ///
    /// [`None`] is returned if the result is not representable.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Adds up all the provided [`Price`]s.
    ///
    /// [`None`] is returned if the result is not representable.
    pub fn checked_sum(prices: impl IntoIterator<Item = Self>) -> Option<Self> {
        prices.into_iter().try_fold(Self::ZERO, Self::checked_add)
    }
}

/// Formats the amount with grouped thousands followed by the `円` sign, like
/// `1,500円`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.0.normalize().to_string();
        let (int, frac) = amount
            .split_once('.')
            .map_or((amount.as_str(), None), |(i, f)| (i, Some(f)));

        for (i, digit) in int.chars().enumerate() {
            if i > 0 && (int.len() - i) % 3 == 0 {
                f.write_char(',')?;
            }
            f.write_char(digit)?;
        }
        if let Some(frac) = frac {
            write!(f, ".{frac}")?;
        }
        f.write_char('円')
    }
}

/// Coerces textual amounts like `1500`, `1,500`, `¥1500` or `1500円`.
impl FromStr for Price {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_suffix('円').unwrap_or(s);
        let s = s
            .strip_prefix('¥')
            .or_else(|| s.strip_prefix('￥'))
            .unwrap_or(s)
            .trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }

        let amount = Decimal::from_str(&s.replace(',', ""))
            .map_err(|_| ParseError::NotNumber)?;
        Self::new(amount).ok_or(ParseError::Negative)
    }
}

/// Error of parsing a [`Price`] from text.
#[derive(Clone, Copy, Debug, Display, Eq, Error, PartialEq)]
pub enum ParseError {
    /// No amount provided.
    #[display("empty price")]
    Empty,

    /// Amount is not a number.
    #[display("price is not a number")]
    NotNumber,

    /// Amount is negative.
    #[display("price cannot be negative")]
    Negative,
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};
    use rust_decimal::Decimal;

    /// Price in yen.
    ///
    /// Accepted as an integer or as a text like `"1,500"` or `"1500円"`.
    /// Returned as a text like `"1,500円"`.
    #[graphql_scalar(with = Self, parse_token(String, i32))]
    type Price = super::Price;

    impl Price {
        fn to_output<S: ScalarValue>(p: &Price) -> Value<S> {
            Value::scalar(p.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            if let Some(i) = input.as_int_value() {
                return Self::new(Decimal::from(i)).ok_or_else(|| {
                    format!("Cannot parse `Price` input scalar: {i} < 0")
                });
            }
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Price` input scalar from \
                         non-string and non-integer value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Price` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{ParseError, Price};

    fn price(n: i64) -> Price {
        Price::new(Decimal::from(n)).unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(Price::from_str("1500").unwrap(), price(1500));
        assert_eq!(Price::from_str(" 1,500 ").unwrap(), price(1500));
        assert_eq!(Price::from_str("1500円").unwrap(), price(1500));
        assert_eq!(Price::from_str("¥1500").unwrap(), price(1500));
        assert_eq!(Price::from_str("0").unwrap(), Price::ZERO);
        assert_eq!(
            Price::from_str("12.5").unwrap().amount(),
            Decimal::new(125, 1),
        );

        assert_eq!(Price::from_str(""), Err(ParseError::Empty));
        assert_eq!(Price::from_str("円"), Err(ParseError::Empty));
        assert_eq!(Price::from_str("abc"), Err(ParseError::NotNumber));
        assert_eq!(Price::from_str("-100"), Err(ParseError::Negative));
    }

    #[test]
    fn to_string() {
        assert_eq!(price(0).to_string(), "0円");
        assert_eq!(price(500).to_string(), "500円");
        assert_eq!(price(1000).to_string(), "1,000円");
        assert_eq!(price(1_234_567).to_string(), "1,234,567円");
        assert_eq!(
            Price::from_str("1500.50").unwrap().to_string(),
            "1,500.5円",
        );
    }

    #[test]
    fn arithmetics() {
        assert_eq!(price(500).times(3), Some(price(1500)));
        assert_eq!(price(500).times(0), Some(Price::ZERO));
        assert_eq!(
            Price::checked_sum([price(500), price(1000), price(1)]),
            Some(price(1501)),
        );
        assert_eq!(Price::checked_sum([]), Some(Price::ZERO));
    }

    #[test]
    fn detects_overflow() {
        let max = Price::new(Decimal::MAX).unwrap();

        assert_eq!(max.times(1), Some(max));
        assert_eq!(max.times(2), None);
        assert_eq!(max.checked_add(price(1)), None);
        assert_eq!(Price::checked_sum([max, max]), None);
    }
}
