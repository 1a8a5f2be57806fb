use tracing::trace;

use crate::minplusalgebra::computationsettings::ComputationSettings;
use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::numerics::rational::Rational;

/// True when `f(t + length) = f(t) + height` for every `t >= start`, given
/// that `length` divides the curve's own pseudo-period `periods` times.
fn repeats_with(curve: &Curve,
                start: &Rational,
                length: &Rational,
                height: &Rational,
                periods: usize) -> Result<bool, CurveError> {
    let reference = curve.cut(start, &(start + length), true, false)?.optimize()?;
    for j in 1..periods {
        let j = Rational::from(j);
        let shift_time = &j * length;
        let shift_value = &j * height;
        let shifted = reference.translate(&shift_time, &shift_value)?;
        let from = start + &shift_time;
        let actual = curve.cut(&from, &(&from + length), true, false)?.optimize()?;
        if shifted != actual {
            return Ok(false);
        }
    }
    Ok(true)
}

/// True when `[from, to + length)` is a single piece that the tail
/// `(length, height)` already describes.
fn lies_on_the_tail(curve: &Curve,
                    from: &Rational,
                    to: &Rational,
                    length: &Rational,
                    height: &Rational) -> Result<bool, CurveError> {
    let run = curve.cut(from, &(to + length), true, false)?.optimize()?;
    if run.len() != 2 {
        return Ok(false);
    }
    match (&run.elements()[0], &run.elements()[1]) {
        (Element::Point(point), Element::Segment(segment)) => {
            if segment.is_plus_infinite() || segment.is_minus_infinite() {
                Ok(point.value() == segment.right_limit_at_start_time())
            } else {
                Ok(point.value() == segment.right_limit_at_start_time() &&
                   segment.slope() == &(height / length))
            }
        },
        _ => Ok(false)
    }
}

/// Smallest representation of the same function: collinear pieces merged,
/// the pseudo-period divided as far as it repeats, and the pseudo-periodic
/// start moved back while the tail already holds.
pub fn optimize(curve: &Curve) -> Result<Curve, CurveError> {
    let mut length = curve.pseudo_period_length().clone();
    let mut height = curve.pseudo_period_height().clone();
    let mut start = curve.pseudo_periodic_start_time().clone();

    let period = curve.periodic_sequence()?.optimize()?;
    let points = period.points().count();
    for k in (2..=points).rev() {
        if points % k != 0 {
            continue;
        }
        let divisor = Rational::from(k);
        let candidate_length = &length / &divisor;
        let candidate_height = &height / &divisor;
        if repeats_with(curve, &start, &candidate_length, &candidate_height, k)? {
            trace!(divisor = k, "reduced pseudo-period");
            length = candidate_length;
            height = candidate_height;
            break;
        }
    }

    let base = curve.base_sequence().optimize()?;
    while start.is_positive() {
        let previous = base.points()
            .map(|point| point.time())
            .filter(|time| *time < &start)
            .max()
            .cloned()
            .unwrap_or_else(Rational::zero);
        if lies_on_the_tail(curve, &previous, &start, &length, &height)? {
            start = previous;
            continue;
        }
        let step_back = &start - &length;
        let candidate = if previous >= step_back { previous } else { step_back };
        let moved = curve.cut(&candidate, &start, true, false)?.translate(&length, &height)?.optimize()?;
        let target = curve.cut(&(&candidate + &length), &(&start + &length), true, false)?.optimize()?;
        if moved != target {
            break;
        }
        start = candidate;
    }

    let end = &start + &length;
    Curve::new(curve.cut(&Rational::zero(), &end, true, false)?.optimize()?, start, length, height)
}

pub(crate) fn optimize_if_enabled(curve: Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    if settings.auto_optimize {
        optimize(&curve)
    } else {
        Ok(curve)
    }
}

/// True when `f` and `g` take the same value at every `t >= 0`.
pub fn equivalent(f: &Curve, g: &Curve) -> Result<bool, CurveError> {
    let start = if f.pseudo_periodic_start_time() >= g.pseudo_periodic_start_time() {
        f.pseudo_periodic_start_time().clone()
    } else {
        g.pseudo_periodic_start_time().clone()
    };
    let length = f.pseudo_period_length().lcm(g.pseudo_period_length())?;
    let end = &start + &(&length * Rational::from(2));
    let zero = Rational::zero();
    f.cut(&zero, &end, true, false)?.equivalent(&g.cut(&zero, &end, true, false)?)
}
