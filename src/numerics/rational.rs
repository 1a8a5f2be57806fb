use std::fmt;
use std::ops::{
    Add,
    Div,
    Mul,
    Neg,
    Sub
};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{
    One,
    Signed,
    ToPrimitive,
    Zero
};
use rust_decimal::Decimal;
use serde::de::{
    self,
    MapAccess,
    Visitor
};
use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer
};

use super::rationalerror::RationalError;

// ─────────────────────────────────────────────────────────────────────────────
// Rational
// ─────────────────────────────────────────────────────────────────────────────

/// Exact rational number extended with the two signed infinities.
///
/// The variant order gives the total order `-∞ < finite < +∞`.
///
/// The arithmetic operators panic on undefined forms (`∞ - ∞`, `0 · ∞`,
/// division by zero), the same contract `BigInt` has for division by zero.
/// Code that can meet infinities uses the `checked_*` methods instead.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rational {
    MinusInfinity,
    Finite(BigRational),
    PlusInfinity
}

impl Rational {
    /// `numerator / denominator`; a zero denominator gives the infinity with
    /// the numerator's sign.
    pub fn new(numerator: i64, denominator: i64) -> Rational {
        if denominator == 0 {
            match numerator.signum() {
                1 => Rational::PlusInfinity,
                -1 => Rational::MinusInfinity,
                _ => panic!("0/0 is not a rational number")
            }
        } else {
            Rational::Finite(BigRational::new(BigInt::from(numerator), BigInt::from(denominator)))
        }
    }

    pub fn from_big(numerator: BigInt, denominator: BigInt) -> Result<Rational, RationalError> {
        if denominator.is_zero() {
            if numerator.is_positive() {
                Ok(Rational::PlusInfinity)
            } else if numerator.is_negative() {
                Ok(Rational::MinusInfinity)
            } else {
                Err(RationalError::UndefinedOperation("0/0".to_owned()))
            }
        } else {
            Ok(Rational::Finite(BigRational::new(numerator, denominator)))
        }
    }

    pub fn from_integer(value: i64) -> Rational {
        Rational::Finite(BigRational::from_integer(BigInt::from(value)))
    }

    pub fn zero() -> Rational {
        Rational::Finite(BigRational::zero())
    }

    pub fn one() -> Rational {
        Rational::Finite(BigRational::one())
    }

    pub fn plus_infinity() -> Rational {
        Rational::PlusInfinity
    }

    pub fn minus_infinity() -> Rational {
        Rational::MinusInfinity
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Rational::Finite(_))
    }

    pub fn is_infinite(&self) -> bool {
        !self.is_finite()
    }

    pub fn is_plus_infinite(&self) -> bool {
        matches!(self, Rational::PlusInfinity)
    }

    pub fn is_minus_infinite(&self) -> bool {
        matches!(self, Rational::MinusInfinity)
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Rational::Finite(value) => value.is_zero(),
            _ => false
        }
    }

    pub fn is_positive(&self) -> bool {
        self.sign() > 0
    }

    pub fn is_negative(&self) -> bool {
        self.sign() < 0
    }

    pub fn is_integer(&self) -> bool {
        match self {
            Rational::Finite(value) => value.is_integer(),
            _ => false
        }
    }

    pub fn as_finite(&self) -> Option<&BigRational> {
        match self {
            Rational::Finite(value) => Some(value),
            _ => None
        }
    }

    pub fn sign(&self) -> i8 {
        match self {
            Rational::MinusInfinity => -1,
            Rational::PlusInfinity => 1,
            Rational::Finite(value) => {
                if value.is_positive() {
                    1
                } else if value.is_negative() {
                    -1
                } else {
                    0
                }
            }
        }
    }

    pub fn abs(&self) -> Rational {
        match self {
            Rational::Finite(value) => Rational::Finite(value.abs()),
            _ => Rational::PlusInfinity
        }
    }

    pub fn floor(&self) -> Rational {
        match self {
            Rational::Finite(value) => Rational::Finite(value.floor()),
            other => other.clone()
        }
    }

    pub fn ceil(&self) -> Rational {
        match self {
            Rational::Finite(value) => Rational::Finite(value.ceil()),
            other => other.clone()
        }
    }

    /// Integer part of a finite value, as an index usable for loops.
    pub fn to_usize(&self) -> Option<usize> {
        self.as_finite().and_then(|value| value.to_integer().to_usize())
    }

    pub fn checked_add(&self, other: &Rational) -> Result<Rational, RationalError> {
        match (self, other) {
            (Rational::Finite(lhs), Rational::Finite(rhs)) => Ok(Rational::Finite(lhs + rhs)),
            (Rational::PlusInfinity, Rational::MinusInfinity) |
            (Rational::MinusInfinity, Rational::PlusInfinity) => {
                Err(RationalError::UndefinedOperation(format!("{} + {}", self, other)))
            },
            (Rational::PlusInfinity, _) | (_, Rational::PlusInfinity) => Ok(Rational::PlusInfinity),
            _ => Ok(Rational::MinusInfinity)
        }
    }

    pub fn checked_sub(&self, other: &Rational) -> Result<Rational, RationalError> {
        match (self, other) {
            (Rational::PlusInfinity, Rational::PlusInfinity) |
            (Rational::MinusInfinity, Rational::MinusInfinity) => {
                Err(RationalError::UndefinedOperation(format!("{} - {}", self, other)))
            },
            _ => self.checked_add(&-other)
        }
    }

    pub fn checked_mul(&self, other: &Rational) -> Result<Rational, RationalError> {
        match (self, other) {
            (Rational::Finite(lhs), Rational::Finite(rhs)) => Ok(Rational::Finite(lhs * rhs)),
            _ => {
                let sign = self.sign() * other.sign();
                match sign {
                    1 => Ok(Rational::PlusInfinity),
                    -1 => Ok(Rational::MinusInfinity),
                    _ => Err(RationalError::UndefinedOperation(format!("{} * {}", self, other)))
                }
            }
        }
    }

    pub fn checked_div(&self, other: &Rational) -> Result<Rational, RationalError> {
        match (self, other) {
            (_, Rational::Finite(rhs)) if rhs.is_zero() => Err(RationalError::DivisionByZero),
            (Rational::Finite(lhs), Rational::Finite(rhs)) => Ok(Rational::Finite(lhs / rhs)),
            (Rational::Finite(_), _) => Ok(Rational::zero()),
            (_, Rational::Finite(_)) => {
                match self.sign() * other.sign() {
                    1 => Ok(Rational::PlusInfinity),
                    _ => Ok(Rational::MinusInfinity)
                }
            },
            _ => Err(RationalError::UndefinedOperation(format!("{} / {}", self, other)))
        }
    }

    /// Least common multiple of two positive finite rationals: the smallest
    /// positive rational that is an integer multiple of both.
    pub fn lcm(&self, other: &Rational) -> Result<Rational, RationalError> {
        let (lhs, rhs) = Self::positive_pair(self, other, "lcm")?;
        let numerator = lhs.numer().lcm(rhs.numer());
        let denominator = lhs.denom().gcd(rhs.denom());
        Ok(Rational::Finite(BigRational::new(numerator, denominator)))
    }

    /// Greatest common divisor of two positive finite rationals.
    pub fn gcd(&self, other: &Rational) -> Result<Rational, RationalError> {
        let (lhs, rhs) = Self::positive_pair(self, other, "gcd")?;
        let numerator = lhs.numer().gcd(rhs.numer());
        let denominator = lhs.denom().lcm(rhs.denom());
        Ok(Rational::Finite(BigRational::new(numerator, denominator)))
    }

    fn positive_pair<'a>(lhs: &'a Rational,
                         rhs: &'a Rational,
                         operation: &str) -> Result<(&'a BigRational, &'a BigRational), RationalError> {
        match (lhs, rhs) {
            (Rational::Finite(l), Rational::Finite(r)) if l.is_positive() && r.is_positive() => Ok((l, r)),
            _ => Err(RationalError::UndefinedOperation(format!("{}({}, {})", operation, lhs, rhs)))
        }
    }

    fn from_decimal(decimal: Decimal) -> Rational {
        let denominator = num_traits::pow(BigInt::from(10u32), decimal.scale() as usize);
        Rational::Finite(BigRational::new(BigInt::from(decimal.mantissa()), denominator))
    }

    fn from_f64(value: f64) -> Result<Rational, RationalError> {
        if value.is_nan() {
            return Err(RationalError::Parse(value.to_string()));
        }
        if value.is_infinite() {
            return Ok(if value > 0.0 { Rational::PlusInfinity } else { Rational::MinusInfinity });
        }
        // shortest round-trip text first, so that 0.1 stays 1/10
        let text = value.to_string();
        match Decimal::from_str_exact(&text) {
            Ok(decimal) => Ok(Rational::from_decimal(decimal)),
            Err(_) => BigRational::from_float(value)
                .map(Rational::Finite)
                .ok_or(RationalError::Parse(text))
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Rational::zero()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

impl From<i32> for Rational {
    fn from(value: i32) -> Self {
        Rational::from_integer(value as i64)
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Rational::from_integer(value)
    }
}

impl From<u32> for Rational {
    fn from(value: u32) -> Self {
        Rational::from_integer(value as i64)
    }
}

impl From<usize> for Rational {
    fn from(value: usize) -> Self {
        Rational::Finite(BigRational::from_integer(BigInt::from(value)))
    }
}

impl From<BigInt> for Rational {
    fn from(value: BigInt) -> Self {
        Rational::Finite(BigRational::from_integer(value))
    }
}

impl From<BigRational> for Rational {
    fn from(value: BigRational) -> Self {
        Rational::Finite(value)
    }
}

impl From<Decimal> for Rational {
    fn from(value: Decimal) -> Self {
        Rational::from_decimal(value)
    }
}

impl From<&Rational> for Rational {
    fn from(value: &Rational) -> Self {
        value.clone()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rational::MinusInfinity => write!(f, "-inf"),
            Rational::PlusInfinity => write!(f, "+inf"),
            Rational::Finite(value) => write!(f, "{}", value)
        }
    }
}

impl FromStr for Rational {
    type Err = RationalError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "inf" | "+inf" | "infinity" | "+infinity" => return Ok(Rational::PlusInfinity),
            "-inf" | "-infinity" => return Ok(Rational::MinusInfinity),
            _ => {}
        }
        let parse_error = || RationalError::Parse(trimmed.to_owned());
        if let Some((numerator, denominator)) = trimmed.split_once('/') {
            let numerator = BigInt::from_str(numerator.trim()).map_err(|_| parse_error())?;
            let denominator = BigInt::from_str(denominator.trim()).map_err(|_| parse_error())?;
            Rational::from_big(numerator, denominator)
        } else if trimmed.contains(['e', 'E']) {
            Decimal::from_scientific(trimmed)
                .map(Rational::from_decimal)
                .map_err(|_| parse_error())
        } else if trimmed.contains('.') {
            Decimal::from_str_exact(trimmed)
                .map(Rational::from_decimal)
                .map_err(|_| parse_error())
        } else {
            BigInt::from_str(trimmed)
                .map(Rational::from)
                .map_err(|_| parse_error())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operators
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! forward_binop {
    ($imp:ident, $method:ident, $checked:ident) => {
        impl<'a, 'b> $imp<&'b Rational> for &'a Rational {
            type Output = Rational;

            fn $method(self, other: &'b Rational) -> Rational {
                match self.$checked(other) {
                    Ok(result) => result,
                    Err(error) => panic!("{}", error)
                }
            }
        }

        impl<'a> $imp<&'a Rational> for Rational {
            type Output = Rational;

            fn $method(self, other: &'a Rational) -> Rational {
                (&self).$method(other)
            }
        }

        impl<'a> $imp<Rational> for &'a Rational {
            type Output = Rational;

            fn $method(self, other: Rational) -> Rational {
                self.$method(&other)
            }
        }

        impl $imp<Rational> for Rational {
            type Output = Rational;

            fn $method(self, other: Rational) -> Rational {
                (&self).$method(&other)
            }
        }
    };
}

forward_binop!(Add, add, checked_add);
forward_binop!(Sub, sub, checked_sub);
forward_binop!(Mul, mul, checked_mul);
forward_binop!(Div, div, checked_div);

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        match self {
            Rational::MinusInfinity => Rational::PlusInfinity,
            Rational::PlusInfinity => Rational::MinusInfinity,
            Rational::Finite(value) => Rational::Finite(-value)
        }
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        -&self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Serde
// ─────────────────────────────────────────────────────────────────────────────

/// Integers that fit in `i64` are written as JSON numbers, everything else as
/// text (`"3/4"`, `"+inf"`), which `FromStr` reads back.
impl Serialize for Rational {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where S: Serializer {
        if let Rational::Finite(value) = self {
            if value.is_integer() {
                if let Some(integer) = value.to_integer().to_i64() {
                    return serializer.serialize_i64(integer);
                }
            }
        }
        serializer.serialize_str(&self.to_string())
    }
}

struct RationalVisitor;

impl<'de> Visitor<'de> for RationalVisitor {
    type Value = Rational;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number, a rational string or a {num, den} object")
    }

    fn visit_i64<E>(self, value: i64) -> Result<Rational, E>
        where E: de::Error {
        Ok(Rational::from_integer(value))
    }

    fn visit_u64<E>(self, value: u64) -> Result<Rational, E>
        where E: de::Error {
        Ok(Rational::from(BigInt::from(value)))
    }

    fn visit_f64<E>(self, value: f64) -> Result<Rational, E>
        where E: de::Error {
        Rational::from_f64(value).map_err(E::custom)
    }

    fn visit_str<E>(self, value: &str) -> Result<Rational, E>
        where E: de::Error {
        Rational::from_str(value).map_err(E::custom)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Rational, A::Error>
        where A: MapAccess<'de> {
        let mut numerator: Option<BigInt> = None;
        let mut denominator: Option<BigInt> = None;
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "num" => numerator = Some(map.next_value::<IntegerRepr>()?.0),
                "den" => denominator = Some(map.next_value::<IntegerRepr>()?.0),
                _ => {
                    let _ = map.next_value::<de::IgnoredAny>()?;
                }
            }
        }
        let numerator = numerator.ok_or_else(|| de::Error::missing_field("num"))?;
        let denominator = denominator.ok_or_else(|| de::Error::missing_field("den"))?;
        Rational::from_big(numerator, denominator).map_err(de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
        deserializer.deserialize_any(RationalVisitor)
    }
}

/// Big integer written either as a JSON number or as a decimal string.
struct IntegerRepr(BigInt);

struct IntegerReprVisitor;

impl<'de> Visitor<'de> for IntegerReprVisitor {
    type Value = IntegerRepr;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an integer")
    }

    fn visit_i64<E>(self, value: i64) -> Result<IntegerRepr, E>
        where E: de::Error {
        Ok(IntegerRepr(BigInt::from(value)))
    }

    fn visit_u64<E>(self, value: u64) -> Result<IntegerRepr, E>
        where E: de::Error {
        Ok(IntegerRepr(BigInt::from(value)))
    }

    fn visit_str<E>(self, value: &str) -> Result<IntegerRepr, E>
        where E: de::Error {
        BigInt::from_str(value.trim())
            .map(IntegerRepr)
            .map_err(|_| E::custom(RationalError::Parse(value.to_owned())))
    }
}

impl<'de> Deserialize<'de> for IntegerRepr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: Deserializer<'de> {
        deserializer.deserialize_any(IntegerReprVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_infinities_around_finite_values() {
        let values = vec![
            Rational::PlusInfinity,
            Rational::new(1, 2),
            Rational::MinusInfinity,
            Rational::new(-3, 1)
        ];
        let mut sorted = values.clone();
        sorted.sort();
        assert_eq!(sorted, vec![
            Rational::MinusInfinity,
            Rational::new(-3, 1),
            Rational::new(1, 2),
            Rational::PlusInfinity
        ]);
    }

    #[test]
    fn undefined_forms_fail_explicitly() {
        let plus = Rational::plus_infinity();
        let minus = Rational::minus_infinity();
        assert!(plus.checked_add(&minus).is_err());
        assert!(plus.checked_sub(&plus).is_err());
        assert!(Rational::zero().checked_mul(&plus).is_err());
        assert_eq!(Rational::one().checked_div(&Rational::zero()), Err(RationalError::DivisionByZero));
        assert_eq!(plus.checked_add(&Rational::new(5, 3)), Ok(Rational::PlusInfinity));
        assert_eq!(Rational::new(-2, 1).checked_mul(&plus), Ok(Rational::MinusInfinity));
    }

    #[test]
    fn lcm_of_rationals_is_smallest_common_multiple() {
        let lhs = Rational::new(5, 11);
        let rhs = Rational::from(2);
        assert_eq!(lhs.lcm(&rhs).unwrap(), Rational::from(10));
        assert_eq!(Rational::new(2, 3).lcm(&Rational::new(1, 2)).unwrap(), Rational::from(2));
        assert_eq!(Rational::new(2, 3).gcd(&Rational::new(1, 2)).unwrap(), Rational::new(1, 6));
        assert!(Rational::zero().lcm(&rhs).is_err());
    }

    #[test]
    fn parses_every_textual_form() {
        assert_eq!("3/4".parse::<Rational>().unwrap(), Rational::new(3, 4));
        assert_eq!("0.1".parse::<Rational>().unwrap(), Rational::new(1, 10));
        assert_eq!("2.5e-1".parse::<Rational>().unwrap(), Rational::new(1, 4));
        assert_eq!("-inf".parse::<Rational>().unwrap(), Rational::MinusInfinity);
        assert_eq!("1/0".parse::<Rational>().unwrap(), Rational::PlusInfinity);
        assert!("abc".parse::<Rational>().is_err());
    }

    #[test]
    fn serde_reads_numbers_strings_and_fractions() {
        let values: Vec<Rational> = serde_json::from_str(
            r#"[3, 0.5, "7/2", {"num": -1, "den": 0}, {"num": "4", "den": 6}]"#
        ).unwrap();
        assert_eq!(values, vec![
            Rational::from(3),
            Rational::new(1, 2),
            Rational::new(7, 2),
            Rational::MinusInfinity,
            Rational::new(2, 3)
        ]);
        let text = serde_json::to_string(&values).unwrap();
        let back: Vec<Rational> = serde_json::from_str(&text).unwrap();
        assert_eq!(back, values);
    }
}
