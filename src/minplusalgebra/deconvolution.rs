use rayon::prelude::*;
use tracing::{
    debug,
    trace
};

use crate::minplusalgebra::computationsettings::ComputationSettings;
use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::interval::{
    compute_intervals,
    upper_envelope
};
use crate::minplusalgebra::optimization::optimize_if_enabled;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::segment::Segment;
use crate::minplusalgebra::sequence::Sequence;
use crate::numerics::rational::Rational;

/// `minuend - subtrahend` under the sup convention: -∞ wins over +∞.
fn sup_difference(minuend: &Rational, subtrahend: &Rational) -> Rational {
    if minuend.is_minus_infinite() || subtrahend.is_plus_infinite() {
        Rational::MinusInfinity
    } else if minuend.is_plus_infinite() || subtrahend.is_minus_infinite() {
        Rational::PlusInfinity
    } else {
        minuend - subtrahend
    }
}

/// Pieces of `t ↦ sup { f(a) - g(b) : a - b = t }` for `a` in element `f`
/// and `b` in element `g`.
pub fn element_deconvolution(f: &Element, g: &Element) -> Result<Vec<Element>, CurveError> {
    match (f, g) {
        (Element::Point(a), Element::Point(b)) => {
            Ok(vec![Element::Point(Point::new(a.time() - b.time(), sup_difference(a.value(), b.value())))])
        },
        (Element::Point(point), Element::Segment(segment)) => {
            Ok(vec![Element::Segment(Segment::new(
                point.time() - segment.end_time(),
                point.time() - segment.start_time(),
                sup_difference(point.value(), &segment.left_limit_at_end_time()),
                segment.slope().clone()
            )?)])
        },
        (Element::Segment(segment), Element::Point(point)) => {
            Ok(vec![Element::Segment(Segment::new(
                segment.start_time() - point.time(),
                segment.end_time() - point.time(),
                sup_difference(segment.right_limit_at_start_time(), point.value()),
                segment.slope().clone()
            )?)])
        },
        (Element::Segment(a), Element::Segment(b)) => {
            let start = a.start_time() - b.end_time();
            let end = a.end_time() - b.start_time();
            if !a.is_finite() || !b.is_finite() {
                let value = sup_difference(a.right_limit_at_start_time(), b.right_limit_at_start_time());
                return Ok(vec![Element::Segment(Segment::constant(start, end, value)?)]);
            }
            let a_end = a.left_limit_at_end_time();
            let b_end = b.left_limit_at_end_time();
            if a.slope() >= b.slope() {
                // b stays at its right end while a runs, then a stays at its right end
                let middle = a.end_time() - b.end_time();
                let middle_value = &a_end - &b_end;
                Ok(vec![
                    Element::Segment(Segment::new(start, middle.clone(), a.right_limit_at_start_time() - &b_end, a.slope().clone())?),
                    Element::Point(Point::new(middle.clone(), middle_value.clone())),
                    Element::Segment(Segment::new(middle, end, middle_value, b.slope().clone())?)
                ])
            } else {
                let middle = a.start_time() - b.start_time();
                let middle_value = a.right_limit_at_start_time() - b.right_limit_at_start_time();
                Ok(vec![
                    Element::Segment(Segment::new(start, middle.clone(), a.right_limit_at_start_time() - &b_end, b.slope().clone())?),
                    Element::Point(Point::new(middle.clone(), middle_value.clone())),
                    Element::Segment(Segment::new(middle, end, middle_value, a.slope().clone())?)
                ])
            }
        }
    }
}

fn deconvolve_pairs(f: &Sequence, g: &Sequence, settings: &ComputationSettings) -> Result<Vec<Element>, CurveError> {
    let against_all = |a: &Element| -> Result<Vec<Element>, CurveError> {
        let mut pieces = Vec::with_capacity(3 * g.len());
        for b in g.elements().iter() {
            pieces.extend(element_deconvolution(a, b)?);
        }
        Ok(pieces)
    };
    let pairs = f.len() * g.len();
    trace!(f = f.len(), g = g.len(), pairs, "sequence deconvolution");
    let pieces: Vec<Vec<Element>> = if settings.use_parallel_convolution && pairs > settings.convolution_parallelization_threshold {
        f.elements().par_iter().map(against_all).collect::<Result<Vec<_>, _>>()?
    } else {
        f.elements().iter().map(against_all).collect::<Result<Vec<_>, _>>()?
    };
    Ok(pieces.into_iter().flatten().collect())
}

/// Min-plus deconvolution `(f ⊘ g)(t) = sup_{s >= 0} f(t + s) - g(s)`.
pub fn deconvolution(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    let f_start = f.pseudo_periodic_start_time();
    let g_start = g.pseudo_periodic_start_time();

    // only s < horizon can reach the supremum
    let horizon = if g.is_ultimately_plus_infinite() {
        if g_start.is_zero() {
            return Ok(Curve::minus_infinite());
        }
        g_start.clone()
    } else if f.pseudo_period_slope() > g.pseudo_period_slope() {
        debug!("dividend grows faster than divisor, deconvolution is +inf");
        return Ok(Curve::plus_infinite());
    } else if f.is_ultimately_minus_infinite() {
        if f_start.is_zero() {
            return Ok(Curve::minus_infinite());
        }
        f_start.clone()
    } else {
        let latest = if f_start >= g_start { f_start } else { g_start };
        latest + &f.pseudo_period_length().lcm(g.pseudo_period_length())?
    };

    let zero = Rational::zero();
    let end = f.first_pseudo_period_end();
    let f_window = f.cut_with_settings(&zero, &(&end + &horizon), true, false, settings)?;
    let g_window = g.cut_with_settings(&zero, &horizon, true, false, settings)?;
    let pieces = deconvolve_pairs(&f_window, &g_window, settings)?;
    let intervals = compute_intervals(&pieces, settings)?;
    let values = Sequence::new(upper_envelope(&intervals, settings)?)?.cut(&zero, &end, true, false)?;
    let result = Curve::new(values, f_start.clone(), f.pseudo_period_length().clone(), f.pseudo_period_height().clone())?;
    optimize_if_enabled(result, settings)
}

/// Max-plus deconvolution `inf_{s >= 0} f(t + s) - g(s) = -((-f) ⊘ (-g))(t)`.
pub fn max_plus_deconvolution(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    Ok(deconvolution(&f.negate(), &g.negate(), settings)?.negate())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(value: i64) -> Rational {
        Rational::from(value)
    }

    fn seg(start: i64, end: i64, right_limit: i64, slope: i64) -> Element {
        Element::Segment(Segment::new(r(start), r(end), r(right_limit), r(slope)).unwrap())
    }

    #[test]
    fn steeper_dividend_runs_first() {
        // f = 2a on (0, 2), g = b on (0, 1)
        let pieces = element_deconvolution(&seg(0, 2, 0, 2), &seg(0, 1, 0, 1)).unwrap();
        assert_eq!(pieces, vec![
            seg(-1, 1, -1, 2),
            Element::Point(Point::new(r(1), r(3))),
            seg(1, 2, 3, 1)
        ]);
    }

    #[test]
    fn flatter_dividend_waits_for_the_divisor() {
        // f = a on (0, 2), g = 3b on (0, 1)
        let pieces = element_deconvolution(&seg(0, 2, 0, 1), &seg(0, 1, 0, 3)).unwrap();
        assert_eq!(pieces, vec![
            seg(-1, 0, -3, 3),
            Element::Point(Point::new(r(0), r(0))),
            seg(0, 2, 0, 1)
        ]);
    }

    #[test]
    fn faster_dividend_gives_plus_infinity() {
        let settings = ComputationSettings::default();
        let fast = Curve::new(
            Sequence::new(vec![Element::Point(Point::origin()), seg(0, 1, 0, 3)]).unwrap(),
            r(0), r(1), r(3)
        ).unwrap();
        let slow = Curve::new(
            Sequence::new(vec![Element::Point(Point::origin()), seg(0, 1, 0, 1)]).unwrap(),
            r(0), r(1), r(1)
        ).unwrap();
        assert_eq!(deconvolution(&fast, &slow, &settings).unwrap(), Curve::plus_infinite());
        let result = deconvolution(&slow, &fast, &settings).unwrap();
        for t in 0..5 {
            assert_eq!(result.value_at(&r(t)).unwrap(), r(t));
        }
    }
}
