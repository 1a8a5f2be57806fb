use std::fmt;

use crate::minplusalgebra::curveerror::CurveError;
use crate::numerics::rational::Rational;

/// Value of a curve at a single instant.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    time: Rational,
    value: Rational
}

impl Point {
    pub fn new(time: Rational, value: Rational) -> Point {
        Point { time, value }
    }

    pub fn origin() -> Point {
        Point::new(Rational::zero(), Rational::zero())
    }

    pub fn zero(time: Rational) -> Point {
        Point::new(time, Rational::zero())
    }

    pub fn plus_infinite(time: Rational) -> Point {
        Point::new(time, Rational::PlusInfinity)
    }

    pub fn minus_infinite(time: Rational) -> Point {
        Point::new(time, Rational::MinusInfinity)
    }

    pub fn time(&self) -> &Rational {
        &self.time
    }

    pub fn value(&self) -> &Rational {
        &self.value
    }

    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }

    pub fn is_plus_infinite(&self) -> bool {
        self.value.is_plus_infinite()
    }

    pub fn is_minus_infinite(&self) -> bool {
        self.value.is_minus_infinite()
    }

    /// Moves the point by `delta_time` on the time axis and `delta_value` on
    /// the value axis.
    pub fn translate(&self, delta_time: &Rational, delta_value: &Rational) -> Result<Point, CurveError> {
        Ok(Point::new(&self.time + delta_time, self.value.checked_add(delta_value)?))
    }

    pub fn negate(&self) -> Point {
        Point::new(self.time.clone(), -&self.value)
    }

    pub fn scale(&self, factor: &Rational) -> Result<Point, CurveError> {
        Ok(Point::new(self.time.clone(), self.value.checked_mul(factor)?))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P({}, {})", self.time, self.value)
    }
}
