use tracing::debug;

use crate::minplusalgebra::computationsettings::ComputationSettings;
use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::optimization::optimize_if_enabled;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::segment::Segment;
use crate::minplusalgebra::sequence::Sequence;
use crate::numerics::rational::Rational;

/// Which generalized inverse of a non-decreasing function is meant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Inverse {
    /// `inf{t : f(t) >= y}`
    Lower,
    /// `inf{t : f(t) > y}`
    Upper
}

impl Inverse {
    fn accepts(self, value: &Rational, level: &Rational) -> bool {
        match self {
            Inverse::Lower => value >= level,
            Inverse::Upper => value > level
        }
    }

    fn reached_within(self, element: &Element, level: &Rational) -> bool {
        match element {
            Element::Point(point) => self.accepts(point.value(), level),
            Element::Segment(segment) => {
                self.accepts(segment.right_limit_at_start_time(), level) ||
                    &segment.left_limit_at_end_time() > level
            }
        }
    }

    /// First time at which the non-decreasing `window` reaches `level`, or
    /// `+∞` when it never does.
    pub(crate) fn first_time(self, window: &Sequence, level: &Rational) -> Rational {
        let elements = window.elements();
        let index = elements.partition_point(|element| !self.reached_within(element, level));
        match elements.get(index) {
            None => Rational::PlusInfinity,
            Some(Element::Point(point)) => point.time().clone(),
            Some(Element::Segment(segment)) => {
                let right_limit = segment.right_limit_at_start_time();
                if self.accepts(right_limit, level) {
                    segment.start_time().clone()
                } else {
                    segment.start_time() + &((level - right_limit) / segment.slope())
                }
            }
        }
    }
}

fn require_non_decreasing(curve: &Curve) -> Result<(), CurveError> {
    if curve.is_non_decreasing() {
        Ok(())
    } else {
        Err(CurveError::NotNonDecreasing)
    }
}

/// Closed prefix `[0, x]` of `curve` long enough to hold the first time the
/// curve exceeds `level`, whenever it does.
fn search_window(curve: &Curve, level: &Rational) -> Result<Sequence, CurveError> {
    let zero = Rational::zero();
    let period_end = curve.first_pseudo_period_end();
    let height = curve.pseudo_period_height();
    if curve.is_ultimately_infinite() || !height.is_positive() {
        return curve.cut_closed(&zero, &period_end);
    }
    let at_start = curve.value_at(curve.pseudo_periodic_start_time())?;
    let missing = level.checked_sub(&at_start)?;
    let periods = if missing.is_positive() { (missing / height).ceil() } else { zero.clone() };
    curve.cut_closed(&zero, &(&period_end + &(&periods * curve.pseudo_period_length())))
}

fn inverse_at(curve: &Curve, level: &Rational, kind: Inverse) -> Result<Rational, CurveError> {
    require_non_decreasing(curve)?;
    if !level.is_finite() {
        return Err(CurveError::OutOfDomain(format!("pseudo-inverse at {}", level)));
    }
    Ok(kind.first_time(&search_window(curve, level)?, level))
}

/// `inf{t >= 0 : f(t) >= y}`.
pub fn lower_pseudo_inverse_at(curve: &Curve, level: &Rational) -> Result<Rational, CurveError> {
    inverse_at(curve, level, Inverse::Lower)
}

/// `inf{t >= 0 : f(t) > y}`.
pub fn upper_pseudo_inverse_at(curve: &Curve, level: &Rational) -> Result<Rational, CurveError> {
    inverse_at(curve, level, Inverse::Upper)
}

/// `(T', d', c')` of the inverse of a non-decreasing curve.
fn inverse_period(curve: &Curve) -> Result<(Rational, Rational, Rational), CurveError> {
    let zero = Rational::zero();
    let height = curve.pseudo_period_height();
    if curve.is_ultimately_infinite() || height.is_zero() {
        // bounded range: past its supremum the inverse is constant
        let highest = curve.cut_closed(&zero, &curve.first_pseudo_period_end())?
            .elements()
            .iter()
            .flat_map(|element| [element.first_value(), element.last_value()])
            .filter(|value| value.is_finite())
            .max()
            .unwrap_or_else(Rational::zero);
        let highest = if highest.is_positive() { highest } else { zero };
        return Ok((highest + Rational::one(), Rational::one(), Rational::zero()));
    }
    // above every value reached before T, and above the values of the
    // first period that do not repeat
    let start = curve.pseudo_periodic_start_time();
    let mut threshold = curve.left_limit_at(&curve.first_pseudo_period_end())?.checked_sub(height)?;
    if start.is_positive() {
        let before_start = curve.left_limit_at(start)?;
        if before_start > threshold {
            threshold = before_start;
        }
    }
    let shifted = threshold.checked_add(height)?;
    let inverse_start = if shifted.is_positive() { shifted } else { zero };
    Ok((inverse_start, height.clone(), curve.pseudo_period_length().clone()))
}

fn pseudo_inverse(curve: &Curve, kind: Inverse, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    require_non_decreasing(curve)?;
    let (start, length, height) = inverse_period(curve)?;
    let end = &start + &length;
    debug!(?kind, %start, %length, %height, "pseudo-inverse");

    let window = search_window(curve, &end)?;
    let zero = Rational::zero();
    let mut levels: Vec<Rational> = vec![zero.clone(), end.clone()];
    for element in window.elements() {
        levels.push(element.first_value());
        levels.push(element.last_value());
    }
    levels.retain(|level| level.is_finite() && level >= &zero && level <= &end);
    levels.sort();
    levels.dedup();

    // between two consecutive levels the inverse is affine
    let third_of = Rational::from(3);
    let mut elements = Vec::with_capacity(2 * levels.len());
    for pair in levels.windows(2) {
        let (low, high) = (&pair[0], &pair[1]);
        elements.push(Element::Point(Point::new(low.clone(), kind.first_time(&window, low))));
        let third = (high - low) / &third_of;
        let near = low + &third;
        let far = &near + &third;
        let near_time = kind.first_time(&window, &near);
        let far_time = kind.first_time(&window, &far);
        let segment = if near_time.is_finite() && far_time.is_finite() {
            let slope = (&far_time - &near_time) / &third;
            Segment::new(low.clone(), high.clone(), &near_time - &(&slope * &third), slope)?
        } else {
            Segment::constant(low.clone(), high.clone(), near_time)?
        };
        elements.push(Element::Segment(segment));
    }
    let result = Curve::new(Sequence::new(elements)?, start, length, height)?;
    optimize_if_enabled(result, settings)
}

/// Lower pseudo-inverse `y ↦ inf{t >= 0 : f(t) >= y}` of a non-decreasing curve.
///
/// `lower(upper(f)) = f` holds only for a left-continuous `f` with `f(0) = 0`.
pub fn lower_pseudo_inverse(curve: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    pseudo_inverse(curve, Inverse::Lower, settings)
}

/// Upper pseudo-inverse `y ↦ inf{t >= 0 : f(t) > y}` of a non-decreasing curve.
///
/// `upper(lower(f)) = f` needs a right-continuous `f` with `f(0) = 0`.
pub fn upper_pseudo_inverse(curve: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    pseudo_inverse(curve, Inverse::Upper, settings)
}
