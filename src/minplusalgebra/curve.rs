use std::fmt;

use rayon::prelude::*;

use crate::minplusalgebra::computationsettings::ComputationSettings;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::segment::Segment;
use crate::minplusalgebra::sequence::Sequence;
use crate::numerics::rational::Rational;

// ─────────────────────────────────────────────────────────────────────────────
// Curve
// ─────────────────────────────────────────────────────────────────────────────

/// Ultimately pseudo-periodic piecewise-linear function over `[0, +∞)`.
///
/// The base sequence describes the function over `[0, T + d)`; afterwards
/// `f(t) = f(t - d) + c`, with `T` the pseudo-periodic start, `d` the
/// pseudo-period length and `c` the pseudo-period height.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Curve {
    base_sequence: Sequence,
    pseudo_periodic_start_time: Rational,
    pseudo_period_length: Rational,
    pseudo_period_height: Rational
}

impl Curve {
    pub fn new(base_sequence: Sequence,
               pseudo_periodic_start_time: Rational,
               pseudo_period_length: Rational,
               pseudo_period_height: Rational) -> Result<Curve, CurveError> {
        if !pseudo_periodic_start_time.is_finite() || pseudo_periodic_start_time.is_negative() {
            return Err(CurveError::InvalidCurve(format!("pseudo-periodic start {}", pseudo_periodic_start_time)));
        }
        if !pseudo_period_length.is_finite() || !pseudo_period_length.is_positive() {
            return Err(CurveError::InvalidCurve(format!("pseudo-period length {}", pseudo_period_length)));
        }
        if !pseudo_period_height.is_finite() {
            return Err(CurveError::InvalidCurve(format!("pseudo-period height {}", pseudo_period_height)));
        }
        if !base_sequence.is_left_closed() || !base_sequence.start_time().is_zero() {
            return Err(CurveError::InvalidCurve("base sequence must start with a point at 0".to_owned()));
        }
        let period_end = &pseudo_periodic_start_time + &pseudo_period_length;
        if base_sequence.is_right_closed() || base_sequence.end_time() != &period_end {
            return Err(CurveError::InvalidCurve(format!(
                "base sequence must end with a segment ending at {}", period_end
            )));
        }
        Ok(Curve { base_sequence, pseudo_periodic_start_time, pseudo_period_length, pseudo_period_height })
    }

    fn flat(value: Rational) -> Curve {
        Curve {
            base_sequence: Sequence::new_unchecked(vec![
                Element::Point(Point::new(Rational::zero(), value.clone())),
                Element::Segment(Segment::new_unchecked(Rational::zero(), Rational::one(), value, Rational::zero()))
            ]),
            pseudo_periodic_start_time: Rational::zero(),
            pseudo_period_length: Rational::one(),
            pseudo_period_height: Rational::zero()
        }
    }

    pub fn zero() -> Curve {
        Curve::flat(Rational::zero())
    }

    pub fn plus_infinite() -> Curve {
        Curve::flat(Rational::PlusInfinity)
    }

    pub fn minus_infinite() -> Curve {
        Curve::flat(Rational::MinusInfinity)
    }

    pub fn constant(value: Rational) -> Curve {
        Curve::flat(value)
    }

    /// Neutral element of min-plus convolution: 0 at the origin, +∞ afterwards.
    pub fn identity_element() -> Curve {
        Curve {
            base_sequence: Sequence::new_unchecked(vec![
                Element::Point(Point::origin()),
                Element::Segment(Segment::new_unchecked(Rational::zero(), Rational::from(2), Rational::PlusInfinity, Rational::zero()))
            ]),
            pseudo_periodic_start_time: Rational::one(),
            pseudo_period_length: Rational::one(),
            pseudo_period_height: Rational::zero()
        }
    }

    pub fn base_sequence(&self) -> &Sequence {
        &self.base_sequence
    }

    pub fn pseudo_periodic_start_time(&self) -> &Rational {
        &self.pseudo_periodic_start_time
    }

    pub fn pseudo_period_length(&self) -> &Rational {
        &self.pseudo_period_length
    }

    pub fn pseudo_period_height(&self) -> &Rational {
        &self.pseudo_period_height
    }

    pub fn first_pseudo_period_end(&self) -> Rational {
        &self.pseudo_periodic_start_time + &self.pseudo_period_length
    }

    /// Long-run rate `c / d`, or the matching infinity for curves that are
    /// ultimately infinite.
    pub fn pseudo_period_slope(&self) -> Rational {
        if self.is_ultimately_plus_infinite() {
            Rational::PlusInfinity
        } else if self.is_ultimately_minus_infinite() {
            Rational::MinusInfinity
        } else {
            &self.pseudo_period_height / &self.pseudo_period_length
        }
    }

    /// Base sequence restricted to `[T, T + d)`.
    pub fn periodic_sequence(&self) -> Result<Sequence, CurveError> {
        self.base_sequence.cut(&self.pseudo_periodic_start_time, &self.first_pseudo_period_end(), true, false)
    }

    // ── queries ─────────────────────────────────────────────────────────────

    fn periods_before(&self, time: &Rational) -> Rational {
        ((time - &self.pseudo_periodic_start_time) / &self.pseudo_period_length).floor()
    }

    pub fn value_at(&self, time: &Rational) -> Result<Rational, CurveError> {
        if time.is_negative() || !time.is_finite() {
            return Err(CurveError::OutOfDomain(time.to_string()));
        }
        if time < &self.first_pseudo_period_end() {
            return self.base_sequence.value_at(time);
        }
        let periods = self.periods_before(time);
        let reduced = time - &periods * &self.pseudo_period_length;
        Ok(self.base_sequence.value_at(&reduced)?.checked_add(&(&periods * &self.pseudo_period_height))?)
    }

    pub fn right_limit_at(&self, time: &Rational) -> Result<Rational, CurveError> {
        if time.is_negative() || !time.is_finite() {
            return Err(CurveError::OutOfDomain(time.to_string()));
        }
        if time < &self.first_pseudo_period_end() {
            return self.base_sequence.right_limit_at(time);
        }
        let periods = self.periods_before(time);
        let reduced = time - &periods * &self.pseudo_period_length;
        Ok(self.base_sequence.right_limit_at(&reduced)?.checked_add(&(&periods * &self.pseudo_period_height))?)
    }

    pub fn left_limit_at(&self, time: &Rational) -> Result<Rational, CurveError> {
        if !time.is_positive() || !time.is_finite() {
            return Err(CurveError::OutOfDomain(format!("left of {}", time)));
        }
        let period_end = self.first_pseudo_period_end();
        let (reduced, periods) = if time <= &self.pseudo_periodic_start_time {
            (time.clone(), Rational::zero())
        } else {
            let periods = ((time - &self.pseudo_periodic_start_time) / &self.pseudo_period_length).ceil() - Rational::one();
            (time - &periods * &self.pseudo_period_length, periods)
        };
        let value = if reduced == period_end {
            self.base_sequence.elements()[self.base_sequence.len() - 1].last_value()
        } else {
            self.base_sequence.left_limit_at(&reduced)?
        };
        Ok(value.checked_add(&(&periods * &self.pseudo_period_height))?)
    }

    // ── materialization ─────────────────────────────────────────────────────

    /// Materializes the curve between `start` and `end` as a sequence.
    pub fn cut(&self,
               start: &Rational,
               end: &Rational,
               start_included: bool,
               end_included: bool) -> Result<Sequence, CurveError> {
        self.cut_with_settings(start, end, start_included, end_included, ComputationSettings::default_settings())
    }

    pub fn cut_closed(&self, start: &Rational, end: &Rational) -> Result<Sequence, CurveError> {
        self.cut(start, end, true, true)
    }

    pub fn cut_with_settings(&self,
                             start: &Rational,
                             end: &Rational,
                             start_included: bool,
                             end_included: bool,
                             settings: &ComputationSettings) -> Result<Sequence, CurveError> {
        if start.is_negative() || !end.is_finite() {
            return Err(CurveError::OutOfDomain(format!("cut [{}, {}]", start, end)));
        }
        let period_end = self.first_pseudo_period_end();
        if end < &period_end || (end == &period_end && !end_included) {
            return self.base_sequence.cut(start, end, start_included, end_included);
        }

        let last_period = self.periods_before(end).to_usize()
            .ok_or_else(|| CurveError::OutOfDomain(end.to_string()))?;
        let first_period = if start >= &period_end {
            self.periods_before(start).to_usize()
                .ok_or_else(|| CurveError::OutOfDomain(start.to_string()))?
        } else {
            0
        };

        let periodic = self.periodic_sequence()?;
        let copy = |k: usize| -> Result<Sequence, CurveError> {
            let k = Rational::from(k);
            periodic.translate(&(&k * &self.pseudo_period_length), &(&k * &self.pseudo_period_height))
        };
        let first_copy = first_period.max(1);
        let copies: Vec<Sequence> = if settings.use_parallel_extend &&
            last_period + 1 - first_copy > settings.parallel_list_threshold {
            (first_copy..=last_period).into_par_iter().map(copy).collect::<Result<Vec<_>, _>>()?
        } else {
            (first_copy..=last_period).map(copy).collect::<Result<Vec<_>, _>>()?
        };

        let mut elements: Vec<Element> = Vec::new();
        if first_period == 0 {
            elements.extend(self.base_sequence.elements().iter().cloned());
        }
        for sequence in copies.into_iter() {
            elements.extend(sequence.into_elements());
        }
        Sequence::new(elements)?.cut(start, end, start_included, end_included)
    }

    /// Same function described with a later start and a longer period.
    pub fn extend(&self, pseudo_periodic_start_time: &Rational, pseudo_period_length: &Rational) -> Result<Curve, CurveError> {
        if pseudo_periodic_start_time < &self.pseudo_periodic_start_time {
            return Err(CurveError::InvalidCurve(format!(
                "cannot move the pseudo-periodic start back from {} to {}",
                self.pseudo_periodic_start_time, pseudo_periodic_start_time
            )));
        }
        let factor = pseudo_period_length.checked_div(&self.pseudo_period_length)?;
        if !factor.is_integer() || !factor.is_positive() {
            return Err(CurveError::InvalidCurve(format!(
                "{} is not a multiple of {}", pseudo_period_length, self.pseudo_period_length
            )));
        }
        let end = pseudo_periodic_start_time + pseudo_period_length;
        Curve::new(
            self.cut(&Rational::zero(), &end, true, false)?,
            pseudo_periodic_start_time.clone(),
            pseudo_period_length.clone(),
            &factor * &self.pseudo_period_height
        )
    }

    // ── transforms ──────────────────────────────────────────────────────────

    pub fn vertical_shift(&self, shift: &Rational) -> Result<Curve, CurveError> {
        Curve::new(
            self.base_sequence.translate(&Rational::zero(), shift)?,
            self.pseudo_periodic_start_time.clone(),
            self.pseudo_period_length.clone(),
            self.pseudo_period_height.clone()
        )
    }

    pub fn scale(&self, factor: &Rational) -> Result<Curve, CurveError> {
        Curve::new(
            self.base_sequence.scale(factor)?,
            self.pseudo_periodic_start_time.clone(),
            self.pseudo_period_length.clone(),
            self.pseudo_period_height.checked_mul(factor)?
        )
    }

    pub fn negate(&self) -> Curve {
        Curve {
            base_sequence: self.base_sequence.negate(),
            pseudo_periodic_start_time: self.pseudo_periodic_start_time.clone(),
            pseudo_period_length: self.pseudo_period_length.clone(),
            pseudo_period_height: -&self.pseudo_period_height
        }
    }

    /// Shifts the curve right by `delay`, padding `[0, delay)` with zero.
    pub fn delay_by(&self, delay: &Rational) -> Result<Curve, CurveError> {
        if delay.is_negative() || !delay.is_finite() {
            return Err(CurveError::OutOfDomain(format!("delay {}", delay)));
        }
        if delay.is_zero() {
            return Ok(self.clone());
        }
        let mut elements = vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::zero(Rational::zero(), delay.clone())?)
        ];
        elements.extend(self.base_sequence.translate(delay, &Rational::zero())?.into_elements());
        Curve::new(
            Sequence::new(elements)?,
            &self.pseudo_periodic_start_time + delay,
            self.pseudo_period_length.clone(),
            self.pseudo_period_height.clone()
        )
    }

    // ── shape predicates ────────────────────────────────────────────────────

    /// `[0, T + d]`, which holds one copy of every breakpoint and the first
    /// periodic repetition of the point at `T`.
    fn closed_first_period(&self) -> Result<Sequence, CurveError> {
        self.cut(&Rational::zero(), &self.first_pseudo_period_end(), true, true)
    }

    pub fn is_finite(&self) -> bool {
        self.base_sequence.is_finite()
    }

    pub fn is_ultimately_plus_infinite(&self) -> bool {
        self.periodic_sequence()
            .map(|sequence| sequence.elements().iter().all(Element::is_plus_infinite))
            .unwrap_or(false)
    }

    pub fn is_ultimately_minus_infinite(&self) -> bool {
        self.periodic_sequence()
            .map(|sequence| sequence.elements().iter().all(Element::is_minus_infinite))
            .unwrap_or(false)
    }

    pub fn is_ultimately_infinite(&self) -> bool {
        self.is_ultimately_plus_infinite() || self.is_ultimately_minus_infinite()
    }

    /// True when the curve is a single finite line from `T` on, `T` included.
    pub fn is_ultimately_affine(&self) -> bool {
        self.is_affine_tail(true)
    }

    fn is_affine_tail(&self, start_included: bool) -> bool {
        let start = &self.pseudo_periodic_start_time;
        let end = self.first_pseudo_period_end();
        let period = match self.cut(start, &end, start_included, true).and_then(|sequence| sequence.optimize()) {
            Ok(period) => period,
            Err(_) => return false
        };
        if !period.is_finite() {
            return false;
        }
        let (segment, last) = match period.elements().as_slice() {
            [Element::Point(first), Element::Segment(segment), Element::Point(last)]
                if first.value() == segment.right_limit_at_start_time() => (segment, last),
            [Element::Segment(segment), Element::Point(last)] if !start_included => (segment, last),
            _ => return false
        };
        last.value() == &segment.left_limit_at_end_time() &&
            segment.slope() == &(&self.pseudo_period_height / &self.pseudo_period_length)
    }

    fn check_continuity(&self, skip_origin_right: bool) -> (bool, bool) {
        let sequence = match self.closed_first_period() {
            Ok(sequence) => sequence,
            Err(_) => return (false, false)
        };
        let elements = sequence.elements();
        let mut left = true;
        let mut right = true;
        for (i, element) in elements.iter().enumerate() {
            if let Element::Point(point) = element {
                if i > 0 && &elements[i - 1].last_value() != point.value() {
                    left = false;
                }
                if i + 1 < elements.len() && !(skip_origin_right && i == 0) &&
                   &elements[i + 1].first_value() != point.value() {
                    right = false;
                }
            }
        }
        (left, right)
    }

    pub fn is_left_continuous(&self) -> bool {
        self.check_continuity(false).0
    }

    pub fn is_right_continuous(&self) -> bool {
        self.check_continuity(false).1
    }

    pub fn is_continuous(&self) -> bool {
        let (left, right) = self.check_continuity(false);
        left && right
    }

    /// Continuous on `(0, +∞)`; the origin may jump.
    pub fn is_continuous_except_origin(&self) -> bool {
        let (left, right) = self.check_continuity(true);
        left && right
    }

    pub fn is_non_decreasing(&self) -> bool {
        if self.pseudo_period_height.is_negative() {
            return false;
        }
        let sequence = match self.closed_first_period() {
            Ok(sequence) => sequence,
            Err(_) => return false
        };
        let elements = sequence.elements();
        for (i, element) in elements.iter().enumerate() {
            if let Element::Segment(segment) = element {
                if segment.slope().is_negative() {
                    return false;
                }
            }
            if i + 1 < elements.len() && element.last_value() > elements[i + 1].first_value() {
                return false;
            }
        }
        true
    }

    fn slopes(&self) -> Result<Vec<Rational>, CurveError> {
        let sequence = self.cut(&Rational::zero(), &self.first_pseudo_period_end(), true, false)?.optimize()?;
        Ok(sequence.segments().map(|segment| segment.slope().clone()).collect())
    }

    /// Finite, continuous, ultimately affine and with non-decreasing slopes.
    pub fn is_convex(&self) -> bool {
        if !self.is_finite() || !self.is_continuous() || !self.is_ultimately_affine() {
            return false;
        }
        match self.slopes() {
            Ok(slopes) => slopes.windows(2).all(|pair| pair[0] <= pair[1]),
            Err(_) => false
        }
    }

    /// Finite, continuous apart from an upward jump at the origin, ultimately
    /// affine and with non-increasing slopes.
    pub fn is_concave(&self) -> bool {
        if !self.is_finite() || !self.is_continuous_except_origin() || !self.is_affine_tail(false) {
            return false;
        }
        let jump_is_upward = match (self.value_at(&Rational::zero()), self.right_limit_at(&Rational::zero())) {
            (Ok(value), Ok(right_limit)) => value <= right_limit,
            _ => false
        };
        if !jump_is_upward {
            return false;
        }
        match self.slopes() {
            Ok(slopes) => slopes.windows(2).all(|pair| pair[0] >= pair[1]),
            Err(_) => false
        }
    }

    /// Structural check: concave through the origin implies sub-additive.
    /// A `false` result means "not proven".
    pub fn is_sub_additive(&self) -> bool {
        self.is_zero_at_origin() && self.is_concave()
    }

    pub fn is_zero_at_origin(&self) -> bool {
        matches!(self.base_sequence.elements().first(), Some(Element::Point(point)) if point.value().is_zero())
    }

    /// True for the neutral element of min-plus convolution.
    pub fn is_identity_element(&self) -> bool {
        self.is_zero_at_origin() &&
            self.base_sequence.elements().iter().skip(1).all(Element::is_plus_infinite) &&
            self.is_ultimately_plus_infinite()
    }
}

impl fmt::Display for Curve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ T = {}, d = {}, c = {}, base = {} }}",
               self.pseudo_periodic_start_time, self.pseudo_period_length, self.pseudo_period_height, self.base_sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(value: i64) -> Rational {
        Rational::from(value)
    }

    /// 0 on [0, 2], then slope 1; period starts at 2 with d = 1, c = 1.
    fn rate_latency() -> Curve {
        Curve::new(
            Sequence::new(vec![
                Element::Point(Point::origin()),
                Element::Segment(Segment::zero(r(0), r(2)).unwrap()),
                Element::Point(Point::zero(r(2))),
                Element::Segment(Segment::new(r(2), r(3), r(0), r(1)).unwrap())
            ]).unwrap(),
            r(2), r(1), r(1)
        ).unwrap()
    }

    /// Step of height 1 every 2 time units, right-continuous steps at 0, 2, 4...
    fn stair() -> Curve {
        Curve::new(
            Sequence::new(vec![
                Element::Point(Point::new(r(0), r(1))),
                Element::Segment(Segment::constant(r(0), r(2), r(1)).unwrap())
            ]).unwrap(),
            r(0), r(2), r(1)
        ).unwrap()
    }

    #[test]
    fn rejects_malformed_descriptions() {
        let sequence = rate_latency().base_sequence().clone();
        assert!(Curve::new(sequence.clone(), r(2), r(0), r(1)).is_err());
        assert!(Curve::new(sequence.clone(), r(1), r(1), r(1)).is_err());
        assert!(Curve::new(sequence, r(2), r(1), Rational::PlusInfinity).is_err());
    }

    #[test]
    fn values_follow_the_periodic_tail() {
        let curve = rate_latency();
        assert_eq!(curve.value_at(&r(10)).unwrap(), r(8));
        assert_eq!(curve.value_at(&Rational::new(7, 2)).unwrap(), Rational::new(3, 2));
        let stair = stair();
        assert_eq!(stair.value_at(&r(4)).unwrap(), r(3));
        assert_eq!(stair.left_limit_at(&r(4)).unwrap(), r(2));
        assert_eq!(stair.right_limit_at(&r(4)).unwrap(), r(3));
        assert_eq!(stair.left_limit_at(&r(2)).unwrap(), r(1));
    }

    #[test]
    fn cut_materializes_periodic_copies() {
        let cut = stair().cut(&r(1), &r(5), true, true).unwrap();
        assert_eq!(cut.value_at(&r(1)).unwrap(), r(1));
        assert_eq!(cut.value_at(&r(5)).unwrap(), r(3));
        assert_eq!(cut.value_at(&r(2)).unwrap(), r(2));
        let far = stair().cut(&r(6), &r(8), true, false).unwrap();
        assert_eq!(far.value_at(&r(7)).unwrap(), r(4));
    }

    #[test]
    fn extend_describes_the_same_function() {
        let curve = stair();
        let extended = curve.extend(&r(3), &r(4)).unwrap();
        assert_eq!(extended.pseudo_period_height(), &r(2));
        for t in 0..12 {
            assert_eq!(extended.value_at(&r(t)).unwrap(), curve.value_at(&r(t)).unwrap());
        }
        assert!(curve.extend(&r(0), &r(3)).is_err());
    }

    #[test]
    fn shape_predicates() {
        let curve = rate_latency();
        assert!(curve.is_continuous());
        assert!(curve.is_convex());
        assert!(!curve.is_concave());
        assert!(curve.is_non_decreasing());
        assert!(curve.is_ultimately_affine());
        let stair = stair();
        assert!(stair.is_right_continuous());
        assert!(!stair.is_left_continuous());
        assert!(!stair.is_ultimately_affine());
        assert!(Curve::identity_element().is_identity_element());
        assert!(Curve::identity_element().is_ultimately_plus_infinite());
        assert!(!Curve::zero().is_ultimately_plus_infinite());
        assert_eq!(Curve::identity_element().value_at(&r(5)).unwrap(), Rational::PlusInfinity);
    }

    #[test]
    fn delay_pads_with_zero() {
        let delayed = stair().delay_by(&r(3)).unwrap();
        assert_eq!(delayed.value_at(&r(2)).unwrap(), r(0));
        assert_eq!(delayed.value_at(&r(3)).unwrap(), r(1));
        assert_eq!(delayed.value_at(&r(5)).unwrap(), r(2));
    }
}
