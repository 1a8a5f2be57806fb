use rayon::prelude::*;
use tracing::debug;

use crate::minplusalgebra::computationsettings::ComputationSettings;
use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::optimization::optimize_if_enabled;
use crate::minplusalgebra::sequence::Sequence;
use crate::numerics::rational::Rational;

/// Common description `(T, d, c)` of the result of a pointwise operation.
struct Alignment {
    start: Rational,
    length: Rational,
    height: Rational
}

fn max_of(lhs: &Rational, rhs: &Rational) -> Rational {
    if lhs >= rhs { lhs.clone() } else { rhs.clone() }
}

fn windows(f: &Curve, g: &Curve, end: &Rational, settings: &ComputationSettings) -> Result<[Sequence; 2], CurveError> {
    let zero = Rational::zero();
    Ok([
        f.cut_with_settings(&zero, end, true, false, settings)?,
        g.cut_with_settings(&zero, end, true, false, settings)?
    ])
}

/// Bounds of `f(t) - rate * t` over one pseudo-period.
fn deviation_bounds(curve: &Curve, rate: &Rational) -> Result<(Rational, Rational), CurveError> {
    let period = curve.periodic_sequence()?;
    let mut samples: Vec<Rational> = Vec::with_capacity(2 * period.len());
    for element in period.elements() {
        match element {
            Element::Point(point) => {
                samples.push(point.value().checked_sub(&(rate * point.time()))?);
            },
            Element::Segment(segment) => {
                samples.push(segment.right_limit_at_start_time().checked_sub(&(rate * segment.start_time()))?);
                samples.push(segment.left_limit_at_end_time().checked_sub(&(rate * segment.end_time()))?);
            }
        }
    }
    let lowest = samples.iter().min().cloned().unwrap_or(Rational::PlusInfinity);
    let highest = samples.iter().max().cloned().unwrap_or(Rational::MinusInfinity);
    Ok((lowest, highest))
}

fn minimum_alignment(f: &Curve, g: &Curve) -> Result<Alignment, CurveError> {
    let latest = max_of(f.pseudo_periodic_start_time(), g.pseudo_periodic_start_time());
    let tail_of = |curve: &Curve, start: Rational| Alignment {
        start,
        length: curve.pseudo_period_length().clone(),
        height: curve.pseudo_period_height().clone()
    };

    if f.is_ultimately_plus_infinite() && g.is_ultimately_plus_infinite() {
        return Ok(Alignment {
            start: latest,
            length: f.pseudo_period_length().lcm(g.pseudo_period_length())?,
            height: Rational::zero()
        });
    }
    if f.is_ultimately_plus_infinite() {
        return Ok(tail_of(g, latest));
    }
    if g.is_ultimately_plus_infinite() {
        return Ok(tail_of(f, latest));
    }
    if f.is_ultimately_minus_infinite() {
        return Ok(tail_of(f, f.pseudo_periodic_start_time().clone()));
    }
    if g.is_ultimately_minus_infinite() {
        return Ok(tail_of(g, g.pseudo_periodic_start_time().clone()));
    }

    let f_rate = f.pseudo_period_slope();
    let g_rate = g.pseudo_period_slope();
    if f_rate == g_rate {
        let length = f.pseudo_period_length().lcm(g.pseudo_period_length())?;
        let height = &f_rate * &length;
        return Ok(Alignment { start: latest, length, height });
    }

    // the slower curve stays below once the two tails can no longer cross
    let (lower, upper, lower_rate, upper_rate) = if f_rate < g_rate {
        (f, g, f_rate, g_rate)
    } else {
        (g, f, g_rate, f_rate)
    };
    let (_, lower_highest) = deviation_bounds(lower, &lower_rate)?;
    let (upper_lowest, _) = deviation_bounds(upper, &upper_rate)?;
    if !lower_highest.is_finite() || !upper_lowest.is_finite() {
        return Err(CurveError::IncompatiblePeriods(format!(
            "tails with rates {} and {} contain infinite values", lower_rate, upper_rate
        )));
    }
    let crossing = (&lower_highest - &upper_lowest) / (&upper_rate - &lower_rate);
    let start = max_of(&latest, &crossing);
    debug!(%lower_rate, %upper_rate, %start, "minimum of curves with different rates");
    Ok(tail_of(lower, start))
}

/// Pointwise minimum `min(f, g)`.
pub fn minimum(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    let alignment = minimum_alignment(f, g)?;
    let end = &alignment.start + &alignment.length;
    let sequence = Sequence::minimum(&windows(f, g, &end, settings)?, settings)?;
    let result = Curve::new(sequence, alignment.start, alignment.length, alignment.height)?;
    optimize_if_enabled(result, settings)
}

/// Pointwise maximum `max(f, g) = -min(-f, -g)`.
pub fn maximum(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    Ok(minimum(&f.negate(), &g.negate(), settings)?.negate())
}

/// Pointwise sum `f + g`.
pub fn addition(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    let start = max_of(f.pseudo_periodic_start_time(), g.pseudo_periodic_start_time());
    let length = f.pseudo_period_length().lcm(g.pseudo_period_length())?;
    let f_height = (&length / f.pseudo_period_length()).checked_mul(f.pseudo_period_height())?;
    let g_height = (&length / g.pseudo_period_length()).checked_mul(g.pseudo_period_height())?;
    let height = f_height.checked_add(&g_height)?;
    let end = &start + &length;
    let sequence = Sequence::addition(&windows(f, g, &end, settings)?, settings)?;
    let result = Curve::new(sequence, start, length, height)?;
    optimize_if_enabled(result, settings)
}

/// Pointwise difference `f - g`.
pub fn subtraction(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    addition(f, &g.negate(), settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// n-ary forms
// ─────────────────────────────────────────────────────────────────────────────

/// Folds `curves` with `operation`; above the list threshold the fold runs as
/// a parallel tree reduction, which gives the same result since every
/// operation here is associative and commutative.
pub(crate) fn fold_curves<F>(curves: &[Curve],
                             parallel: bool,
                             settings: &ComputationSettings,
                             operation: F) -> Result<Curve, CurveError>
    where F: Fn(&Curve, &Curve) -> Result<Curve, CurveError> + Sync {
    if curves.is_empty() {
        return Err(CurveError::InvalidCurve("empty list of curves".to_owned()));
    }
    if parallel && curves.len() > settings.parallel_list_threshold {
        curves.par_iter()
            .map(|curve| Ok(curve.clone()))
            .reduce_with(|lhs: Result<Curve, CurveError>, rhs: Result<Curve, CurveError>| operation(&lhs?, &rhs?))
            .unwrap_or_else(|| Err(CurveError::InvalidCurve("empty list of curves".to_owned())))
    } else {
        let mut result = curves[0].clone();
        for curve in curves[1..].iter() {
            result = operation(&result, curve)?;
        }
        Ok(result)
    }
}

pub fn minimum_of(curves: &[Curve], settings: &ComputationSettings) -> Result<Curve, CurveError> {
    fold_curves(curves, settings.use_parallel_list_minimum, settings, |f, g| minimum(f, g, settings))
}

pub fn maximum_of(curves: &[Curve], settings: &ComputationSettings) -> Result<Curve, CurveError> {
    fold_curves(curves, settings.use_parallel_list_maximum, settings, |f, g| maximum(f, g, settings))
}

pub fn addition_of(curves: &[Curve], settings: &ComputationSettings) -> Result<Curve, CurveError> {
    fold_curves(curves, settings.use_parallel_list_addition, settings, |f, g| addition(f, g, settings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minplusalgebra::point::Point;
    use crate::minplusalgebra::segment::Segment;

    fn r(value: i64) -> Rational {
        Rational::from(value)
    }

    /// `rate * t` through the origin.
    fn line(rate: i64) -> Curve {
        Curve::new(
            Sequence::new(vec![
                Element::Point(Point::origin()),
                Element::Segment(Segment::new(r(0), r(1), r(0), r(rate)).unwrap())
            ]).unwrap(),
            r(0), r(1), r(rate)
        ).unwrap()
    }

    fn constant(value: i64) -> Curve {
        Curve::constant(r(value))
    }

    #[test]
    fn minimum_of_crossing_rates_switches_to_the_slower_tail() {
        let settings = ComputationSettings::default_settings();
        let result = minimum(&line(2), &constant(6), settings).unwrap();
        for t in 0..10 {
            let expected = std::cmp::min(r(2 * t), r(6));
            assert_eq!(result.value_at(&r(t)).unwrap(), expected);
        }
        assert_eq!(result.value_at(&Rational::new(5, 2)).unwrap(), r(5));
    }

    #[test]
    fn maximum_is_the_dual_of_minimum() {
        let settings = ComputationSettings::default_settings();
        let result = maximum(&line(1), &constant(3), settings).unwrap();
        for t in 0..8 {
            assert_eq!(result.value_at(&r(t)).unwrap(), std::cmp::max(r(t), r(3)));
        }
    }

    #[test]
    fn addition_and_subtraction_cancel() {
        let settings = ComputationSettings::default_settings();
        let sum = addition(&line(2), &constant(3), settings).unwrap();
        assert_eq!(sum.value_at(&r(4)).unwrap(), r(11));
        let back = subtraction(&sum, &constant(3), settings).unwrap();
        for t in 0..6 {
            assert_eq!(back.value_at(&r(t)).unwrap(), r(2 * t));
        }
    }

    #[test]
    fn plus_infinite_operand_is_neutral_for_minimum() {
        let settings = ComputationSettings::default_settings();
        let result = minimum(&Curve::plus_infinite(), &line(3), settings).unwrap();
        assert_eq!(result.value_at(&r(7)).unwrap(), r(21));
    }

    #[test]
    fn n_ary_minimum_matches_the_fold() {
        let settings = ComputationSettings { parallel_list_threshold: 1, ..ComputationSettings::default() };
        let curves = vec![line(1), constant(4), line(3), constant(2)];
        let result = minimum_of(&curves, &settings).unwrap();
        for t in 0..6 {
            assert_eq!(result.value_at(&r(t)).unwrap(), std::cmp::min(r(t), r(2)));
        }
    }

    fn list_settings() -> Vec<ComputationSettings> {
        let eager = ComputationSettings { parallel_list_threshold: 1, ..ComputationSettings::default() };
        vec![eager.clone(), eager.with_use_parallelism(false)]
    }

    #[test]
    fn n_ary_maximum_matches_the_fold() {
        let curves = vec![line(1), constant(4), line(2), constant(1)];
        for settings in list_settings() {
            let listed = maximum_of(&curves, &settings).unwrap();
            let mut folded = curves[0].clone();
            for curve in curves[1..].iter() {
                folded = maximum(&folded, curve, &settings).unwrap();
            }
            for t in 0..8 {
                let expected = std::cmp::max(r(2 * t), r(4));
                assert_eq!(listed.value_at(&r(t)).unwrap(), expected);
                assert_eq!(folded.value_at(&r(t)).unwrap(), expected);
            }
        }
    }

    #[test]
    fn n_ary_addition_matches_the_fold() {
        let curves = vec![line(1), constant(4), line(3), constant(-2)];
        for settings in list_settings() {
            let listed = addition_of(&curves, &settings).unwrap();
            let mut folded = curves[0].clone();
            for curve in curves[1..].iter() {
                folded = addition(&folded, curve, &settings).unwrap();
            }
            for t in 0..8 {
                assert_eq!(listed.value_at(&r(t)).unwrap(), r(4 * t + 2));
                assert_eq!(folded.value_at(&r(t)).unwrap(), r(4 * t + 2));
            }
            assert_eq!(listed.value_at(&Rational::new(1, 2)).unwrap(), r(4));
        }
    }
}
