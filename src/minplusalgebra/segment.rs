use std::fmt;

use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::point::Point;
use crate::numerics::rational::Rational;

/// Open linear piece over `(start_time, end_time)`.
///
/// A segment with an infinite right limit is infinite on its whole interval;
/// its slope is stored as zero.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    start_time: Rational,
    end_time: Rational,
    right_limit_at_start_time: Rational,
    slope: Rational
}

impl Segment {
    pub fn new(start_time: Rational,
               end_time: Rational,
               right_limit_at_start_time: Rational,
               slope: Rational) -> Result<Segment, CurveError> {
        if !start_time.is_finite() || !end_time.is_finite() {
            return Err(CurveError::InvalidSegment(format!("non-finite bounds ({}, {})", start_time, end_time)));
        }
        if start_time >= end_time {
            return Err(CurveError::InvalidSegment(format!("start {} is not before end {}", start_time, end_time)));
        }
        if !slope.is_finite() {
            return Err(CurveError::InvalidSegment(format!("non-finite slope {}", slope)));
        }
        let slope = if right_limit_at_start_time.is_finite() { slope } else { Rational::zero() };
        Ok(Segment { start_time, end_time, right_limit_at_start_time, slope })
    }

    /// Caller guarantees `start_time < end_time`, both finite, and a finite slope.
    pub(crate) fn new_unchecked(start_time: Rational,
                                end_time: Rational,
                                right_limit_at_start_time: Rational,
                                slope: Rational) -> Segment {
        let slope = if right_limit_at_start_time.is_finite() { slope } else { Rational::zero() };
        Segment { start_time, end_time, right_limit_at_start_time, slope }
    }

    pub fn constant(start_time: Rational, end_time: Rational, value: Rational) -> Result<Segment, CurveError> {
        Segment::new(start_time, end_time, value, Rational::zero())
    }

    pub fn zero(start_time: Rational, end_time: Rational) -> Result<Segment, CurveError> {
        Segment::constant(start_time, end_time, Rational::zero())
    }

    pub fn plus_infinite(start_time: Rational, end_time: Rational) -> Result<Segment, CurveError> {
        Segment::constant(start_time, end_time, Rational::PlusInfinity)
    }

    pub fn minus_infinite(start_time: Rational, end_time: Rational) -> Result<Segment, CurveError> {
        Segment::constant(start_time, end_time, Rational::MinusInfinity)
    }

    pub fn start_time(&self) -> &Rational {
        &self.start_time
    }

    pub fn end_time(&self) -> &Rational {
        &self.end_time
    }

    pub fn right_limit_at_start_time(&self) -> &Rational {
        &self.right_limit_at_start_time
    }

    pub fn slope(&self) -> &Rational {
        &self.slope
    }

    pub fn length(&self) -> Rational {
        &self.end_time - &self.start_time
    }

    pub fn left_limit_at_end_time(&self) -> Rational {
        self.value_at(&self.end_time)
    }

    /// Value of the supporting line at `time`; only meaningful for times in
    /// `[start_time, end_time]`.
    pub fn value_at(&self, time: &Rational) -> Rational {
        if !self.right_limit_at_start_time.is_finite() {
            return self.right_limit_at_start_time.clone();
        }
        &self.right_limit_at_start_time + &self.slope * (time - &self.start_time)
    }

    pub fn contains(&self, time: &Rational) -> bool {
        &self.start_time < time && time < &self.end_time
    }

    pub fn is_finite(&self) -> bool {
        self.right_limit_at_start_time.is_finite()
    }

    pub fn is_plus_infinite(&self) -> bool {
        self.right_limit_at_start_time.is_plus_infinite()
    }

    pub fn is_minus_infinite(&self) -> bool {
        self.right_limit_at_start_time.is_minus_infinite()
    }

    pub fn translate(&self, delta_time: &Rational, delta_value: &Rational) -> Result<Segment, CurveError> {
        Segment::new(
            &self.start_time + delta_time,
            &self.end_time + delta_time,
            self.right_limit_at_start_time.checked_add(delta_value)?,
            self.slope.clone()
        )
    }

    pub fn negate(&self) -> Segment {
        Segment {
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            right_limit_at_start_time: -&self.right_limit_at_start_time,
            slope: -&self.slope
        }
    }

    pub fn scale(&self, factor: &Rational) -> Result<Segment, CurveError> {
        Segment::new(
            self.start_time.clone(),
            self.end_time.clone(),
            self.right_limit_at_start_time.checked_mul(factor)?,
            self.slope.checked_mul(factor)?
        )
    }

    /// Same line over the narrower interval `(start_time, end_time)`, which
    /// must lie within this segment.
    pub fn restrict(&self, start_time: &Rational, end_time: &Rational) -> Result<Segment, CurveError> {
        if start_time < &self.start_time || end_time > &self.end_time {
            return Err(CurveError::OutOfDomain(format!("({}, {}) within {}", start_time, end_time, self)));
        }
        Segment::new(start_time.clone(), end_time.clone(), self.value_at(start_time), self.slope.clone())
    }

    /// Splits at an interior time into the left piece, the point and the right piece.
    pub fn split(&self, time: &Rational) -> Result<(Segment, Point, Segment), CurveError> {
        if !self.contains(time) {
            return Err(CurveError::OutOfDomain(format!("{} inside {}", time, self)));
        }
        let value = self.value_at(time);
        Ok((
            Segment::new(self.start_time.clone(), time.clone(), self.right_limit_at_start_time.clone(), self.slope.clone())?,
            Point::new(time.clone(), value.clone()),
            Segment::new(time.clone(), self.end_time.clone(), value, self.slope.clone())?
        ))
    }

    pub fn sample(&self, time: &Rational) -> Result<Point, CurveError> {
        if !self.contains(time) {
            return Err(CurveError::OutOfDomain(format!("{} inside {}", time, self)));
        }
        Ok(Point::new(time.clone(), self.value_at(time)))
    }

    /// True when `self`, `point` and `next` describe one line without a jump.
    pub fn is_mergeable(&self, point: &Point, next: &Segment) -> bool {
        if &self.end_time != point.time() || point.time() != &next.start_time {
            return false;
        }
        if self.slope != next.slope {
            return false;
        }
        let left = self.left_limit_at_end_time();
        &left == point.value() && point.value() == &next.right_limit_at_start_time
    }

    pub fn merge(&self, next: &Segment) -> Result<Segment, CurveError> {
        Segment::new(
            self.start_time.clone(),
            next.end_time.clone(),
            self.right_limit_at_start_time.clone(),
            self.slope.clone()
        )
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S({}, {}, {}, {})", self.start_time, self.end_time, self.right_limit_at_start_time, self.slope)
    }
}
