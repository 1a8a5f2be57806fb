use std::cmp::Ordering;

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
    lower_envelope
};
use crate::minplusalgebra::optimization::optimize_if_enabled;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::pointwiseoperations::{
    fold_curves,
    minimum,
    minimum_of
};
use crate::minplusalgebra::segment::Segment;
use crate::minplusalgebra::sequence::Sequence;
use crate::numerics::rational::Rational;

// ─────────────────────────────────────────────────────────────────────────────
// Elements
// ─────────────────────────────────────────────────────────────────────────────

/// Min-plus sum: +∞ absorbs everything, including -∞.
fn min_plus_sum(lhs: &Rational, rhs: &Rational) -> Rational {
    if lhs.is_plus_infinite() || rhs.is_plus_infinite() {
        Rational::PlusInfinity
    } else {
        lhs + rhs
    }
}

/// Min-plus convolution of two elements, as the pieces of its graph.
pub fn element_convolution(lhs: &Element, rhs: &Element) -> Result<Vec<Element>, CurveError> {
    match (lhs, rhs) {
        (Element::Point(a), Element::Point(b)) => {
            Ok(vec![Element::Point(Point::new(a.time() + b.time(), min_plus_sum(a.value(), b.value())))])
        },
        (Element::Point(point), Element::Segment(segment)) |
        (Element::Segment(segment), Element::Point(point)) => {
            Ok(vec![Element::Segment(Segment::new(
                segment.start_time() + point.time(),
                segment.end_time() + point.time(),
                min_plus_sum(segment.right_limit_at_start_time(), point.value()),
                segment.slope().clone()
            )?)])
        },
        (Element::Segment(a), Element::Segment(b)) => {
            let start = a.start_time() + b.start_time();
            let end = a.end_time() + b.end_time();
            let right_limit = min_plus_sum(a.right_limit_at_start_time(), b.right_limit_at_start_time());
            if !right_limit.is_finite() || a.slope() == b.slope() {
                return Ok(vec![Element::Segment(Segment::new(start, end, right_limit, a.slope().clone())?)]);
            }
            // the flatter piece is traversed first
            let (first, second) = if a.slope() < b.slope() { (a, b) } else { (b, a) };
            let middle = &start + &first.length();
            let middle_value = &right_limit + &(first.slope() * &first.length());
            Ok(vec![
                Element::Segment(Segment::new(start, middle.clone(), right_limit, first.slope().clone())?),
                Element::Point(Point::new(middle.clone(), middle_value.clone())),
                Element::Segment(Segment::new(middle, end, middle_value, second.slope().clone())?)
            ])
        }
    }
}

fn convolve_pairs(lhs: &[Element], rhs: &[Element], settings: &ComputationSettings) -> Result<Vec<Element>, CurveError> {
    let convolve_with_all = |a: &Element| -> Result<Vec<Element>, CurveError> {
        let mut pieces = Vec::with_capacity(3 * rhs.len());
        for b in rhs.iter() {
            pieces.extend(element_convolution(a, b)?);
        }
        Ok(pieces)
    };
    let pairs = lhs.len() * rhs.len();
    let pieces: Vec<Vec<Element>> = if settings.use_parallel_convolution && pairs > settings.convolution_parallelization_threshold {
        lhs.par_iter().map(convolve_with_all).collect::<Result<Vec<_>, _>>()?
    } else {
        lhs.iter().map(convolve_with_all).collect::<Result<Vec<_>, _>>()?
    };
    Ok(pieces.into_iter().flatten().collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Sequences
// ─────────────────────────────────────────────────────────────────────────────

/// Min-plus convolution of two sequences over the sum of their domains.
pub fn sequence_convolution(lhs: &Sequence, rhs: &Sequence, settings: &ComputationSettings) -> Result<Sequence, CurveError> {
    let pairs = lhs.len() * rhs.len();
    trace!(lhs = lhs.len(), rhs = rhs.len(), pairs, "sequence convolution");

    let partitioned = settings.use_convolution_partitioning && pairs > settings.convolution_partitioning_threshold;
    let elements = if partitioned {
        let chunk_size = std::cmp::max(1, settings.convolution_partitioning_threshold / rhs.len());
        debug!(chunk_size, "partitioning convolution");
        let mut partial: Vec<Element> = Vec::new();
        for chunk in lhs.elements().chunks(chunk_size) {
            let pieces = convolve_pairs(chunk, rhs.elements(), settings)?;
            let intervals = compute_intervals(&pieces, settings)?;
            partial.extend(lower_envelope(&intervals, settings)?);
        }
        partial
    } else {
        convolve_pairs(lhs.elements(), rhs.elements(), settings)?
    };
    let intervals = compute_intervals(&elements, settings)?;
    Sequence::new(lower_envelope(&intervals, settings)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Curves
// ─────────────────────────────────────────────────────────────────────────────

fn window(curve: &Curve,
          start: &Rational,
          end: &Rational,
          settings: &ComputationSettings) -> Result<Sequence, CurveError> {
    let sequence = curve.cut_with_settings(start, end, true, false, settings)?;
    if settings.use_by_sequence_convolution_isospeed_optimization {
        sequence.optimize()
    } else {
        Ok(sequence)
    }
}

/// `+∞` over `[0, until)`, empty when `until` is zero.
fn infinite_prefix(until: &Rational) -> Result<Vec<Element>, CurveError> {
    if until.is_zero() {
        return Ok(Vec::new());
    }
    Ok(vec![
        Element::Point(Point::plus_infinite(Rational::zero())),
        Element::Segment(Segment::plus_infinite(Rational::zero(), until.clone())?)
    ])
}

fn term_curve(start: &Rational,
              values: Sequence,
              pseudo_periodic_start_time: Rational,
              pseudo_period_length: Rational,
              pseudo_period_height: Rational) -> Result<Curve, CurveError> {
    let mut elements = infinite_prefix(start)?;
    elements.extend(values.into_elements());
    Curve::new(Sequence::new(elements)?, pseudo_periodic_start_time, pseudo_period_length, pseudo_period_height)
}

/// Transient parts convolved: finite support `[0, T1 + T2)`, +∞ afterwards.
fn transient_term(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Option<Curve>, CurveError> {
    let zero = Rational::zero();
    let (f_start, g_start) = (f.pseudo_periodic_start_time(), g.pseudo_periodic_start_time());
    if f_start.is_zero() || g_start.is_zero() {
        return Ok(None);
    }
    let values = sequence_convolution(&window(f, &zero, f_start, settings)?, &window(g, &zero, g_start, settings)?, settings)?;
    let end = f_start + g_start;
    let mut elements = values.into_elements();
    elements.push(Element::Point(Point::plus_infinite(end.clone())));
    elements.push(Element::Segment(Segment::plus_infinite(end.clone(), &end + &Rational::one())?));
    Ok(Some(Curve::new(Sequence::new(elements)?, end, Rational::one(), Rational::zero())?))
}

/// Transient part of `f` against the periodic part of `g`.
fn mixed_term(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Option<Curve>, CurveError> {
    let zero = Rational::zero();
    let f_start = f.pseudo_periodic_start_time();
    let g_start = g.pseudo_periodic_start_time();
    if f_start.is_zero() || g.is_ultimately_plus_infinite() {
        return Ok(None);
    }
    let period_start = f_start + g_start;
    let end = &period_start + g.pseudo_period_length();
    let values = sequence_convolution(&window(f, &zero, f_start, settings)?, &window(g, g_start, &end, settings)?, settings)?
        .cut(g_start, &end, true, false)?;
    Ok(Some(term_curve(
        g_start, values, period_start, g.pseudo_period_length().clone(), g.pseudo_period_height().clone()
    )?))
}

/// Periodic parts convolved, when at least one of them is -∞.
fn minus_infinite_periodic_term(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    let (f_start, g_start) = (f.pseudo_periodic_start_time(), g.pseudo_periodic_start_time());
    let longest = if f.pseudo_period_length() >= g.pseudo_period_length() {
        f.pseudo_period_length().clone()
    } else {
        g.pseudo_period_length().clone()
    };
    let width = &longest + &Rational::one();
    let start = f_start + g_start;
    let end = &start + &width;
    let values = sequence_convolution(
        &window(f, f_start, &(f_start + &width), settings)?,
        &window(g, g_start, &(g_start + &width), settings)?,
        settings
    )?.cut(&start, &end, true, false)?;
    term_curve(&start, values, &start + &longest, Rational::one(), Rational::zero())
}

/// Periodic parts convolved. Only one pseudo-period `L = lcm(d1, d2)` of the
/// faster operand matters; the result takes the slower operand's period.
fn periodic_term(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Option<Curve>, CurveError> {
    if f.is_ultimately_plus_infinite() || g.is_ultimately_plus_infinite() {
        return Ok(None);
    }
    if f.is_ultimately_minus_infinite() || g.is_ultimately_minus_infinite() {
        return Ok(Some(minus_infinite_periodic_term(f, g, settings)?));
    }

    let common = f.pseudo_period_length().lcm(g.pseudo_period_length())?;
    let restrict_f = match f.pseudo_period_slope().cmp(&g.pseudo_period_slope()) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => {
            // the wider window belongs to the operand whose period is added to it,
            // so restrict the one with the shorter period
            if settings.use_convolution_isospeed_optimization {
                debug!("isospeed periodic parts");
                f.pseudo_period_length() <= g.pseudo_period_length()
            } else {
                true
            }
        }
    };
    let (restricted, other) = if restrict_f { (f, g) } else { (g, f) };

    let restricted_start = restricted.pseudo_periodic_start_time();
    let other_start = other.pseudo_periodic_start_time();
    let start = restricted_start + other_start;
    let width = &common + other.pseudo_period_length();
    let end = &start + &width;
    let values = sequence_convolution(
        &window(restricted, restricted_start, &(restricted_start + &common), settings)?,
        &window(other, other_start, &(other_start + &width), settings)?,
        settings
    )?.cut(&start, &end, true, false)?;
    Ok(Some(term_curve(
        &start, values, &start + &common, other.pseudo_period_length().clone(), other.pseudo_period_height().clone()
    )?))
}

/// Slopes of the transient pieces of a convex curve, as `(length, slope)`.
fn convex_pieces(curve: &Curve) -> Result<Vec<(Rational, Rational)>, CurveError> {
    let start = curve.pseudo_periodic_start_time();
    if start.is_zero() {
        return Ok(Vec::new());
    }
    let transient = curve.cut(&Rational::zero(), start, true, false)?.optimize()?;
    Ok(transient.segments().map(|segment| (segment.length(), segment.slope().clone())).collect())
}

/// Convex continuous operands: the pieces of both are merged by slope.
fn single_pass_convolution(f: &Curve, g: &Curve) -> Result<Curve, CurveError> {
    let f_rate = f.pseudo_period_slope();
    let g_rate = g.pseudo_period_slope();
    let tail_rate = if f_rate <= g_rate { f_rate } else { g_rate };

    let mut pieces: Vec<(Rational, Rational)> = convex_pieces(f)?;
    pieces.extend(convex_pieces(g)?);
    pieces.retain(|(_, slope)| slope < &tail_rate);
    pieces.sort_by(|lhs, rhs| lhs.1.cmp(&rhs.1));

    let zero = Rational::zero();
    let mut value = f.value_at(&zero)?.checked_add(&g.value_at(&zero)?)?;
    let mut time = zero;
    let mut elements = vec![Element::Point(Point::new(time.clone(), value.clone()))];
    for (length, slope) in pieces.into_iter() {
        let next_time = &time + &length;
        let next_value = &value + &(&slope * &length);
        elements.push(Element::Segment(Segment::new(time, next_time.clone(), value, slope)?));
        elements.push(Element::Point(Point::new(next_time.clone(), next_value.clone())));
        time = next_time;
        value = next_value;
    }
    elements.push(Element::Segment(Segment::new(time.clone(), &time + &Rational::one(), value, tail_rate.clone())?));
    Curve::new(Sequence::new(elements)?, time, Rational::one(), tail_rate)
}

/// Min-plus convolution `(f ⊗ g)(t) = inf_{0 <= s <= t} f(s) + g(t - s)`.
pub fn convolution(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    if settings.use_sub_additive_convolution_optimizations && f.is_sub_additive() && g.is_sub_additive() {
        debug!("sub-additive operands, convolution is the minimum");
        return minimum(f, g, settings);
    }
    if settings.use_minimum_self_convolution_for_curves_with_infinities {
        if f.is_identity_element() {
            debug!("left operand is the identity element");
            return Ok(g.clone());
        }
        if g.is_identity_element() {
            debug!("right operand is the identity element");
            return Ok(f.clone());
        }
    }
    if settings.single_pass_convolution && f.is_convex() && g.is_convex() {
        debug!("convex operands, single pass convolution");
        return optimize_if_enabled(single_pass_convolution(f, g)?, settings);
    }

    // slowest tails first, periodic term leading: a tail with +∞ gaps only
    // merges with terms of its own rate
    let mut terms: Vec<Curve> = [
        periodic_term(f, g, settings)?,
        mixed_term(f, g, settings)?,
        mixed_term(g, f, settings)?,
        transient_term(f, g, settings)?
    ].into_iter().flatten().collect();
    terms.sort_by_cached_key(Curve::pseudo_period_slope);
    trace!(terms = terms.len(), "convolution terms");

    if terms.is_empty() {
        return Ok(Curve::plus_infinite());
    }
    let unoptimized = ComputationSettings { auto_optimize: false, ..settings.clone() };
    let mut result = terms[0].clone();
    for term in terms[1..].iter() {
        result = minimum(&result, term, &unoptimized)?;
    }
    optimize_if_enabled(result, settings)
}

/// n-ary min-plus convolution, equal to the left fold of [`convolution`].
pub fn convolution_of(curves: &[Curve], settings: &ComputationSettings) -> Result<Curve, CurveError> {
    if curves.is_empty() {
        return Err(CurveError::InvalidCurve("empty list of curves".to_owned()));
    }
    let mut operands: Vec<Curve> = curves.to_vec();

    if settings.use_sub_additive_convolution_optimizations {
        let (sub_additive, others): (Vec<Curve>, Vec<Curve>) = operands.into_iter().partition(Curve::is_sub_additive);
        operands = others;
        if !sub_additive.is_empty() {
            debug!(count = sub_additive.len(), "sub-additive operands folded by minimum");
            operands.push(minimum_of(&sub_additive, settings)?);
        }
    }
    if settings.use_convolution_super_isospeed_optimization {
        operands.sort_by(|lhs, rhs| {
            lhs.pseudo_period_slope().cmp(&rhs.pseudo_period_slope())
                .then_with(|| lhs.pseudo_period_length().cmp(rhs.pseudo_period_length()))
        });
    }
    fold_curves(&operands, settings.use_parallel_list_convolution, settings, |f, g| convolution(f, g, settings))
}

/// Max-plus convolution `(f ⊗̄ g)(t) = sup_{0 <= s <= t} f(s) + g(t - s) = -((-f) ⊗ (-g))(t)`.
pub fn max_plus_convolution(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    Ok(convolution(&f.negate(), &g.negate(), settings)?.negate())
}

pub fn max_plus_convolution_of(curves: &[Curve], settings: &ComputationSettings) -> Result<Curve, CurveError> {
    let negated: Vec<Curve> = curves.iter().map(Curve::negate).collect();
    Ok(convolution_of(&negated, settings)?.negate())
}
