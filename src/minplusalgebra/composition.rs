use tracing::debug;

use crate::minplusalgebra::computationsettings::ComputationSettings;
use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::optimization::optimize_if_enabled;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::pseudoinverse::Inverse;
use crate::minplusalgebra::segment::Segment;
use crate::minplusalgebra::sequence::Sequence;
use crate::numerics::rational::Rational;

/// `(T, d, c)` of `f ∘ g`.
fn composition_period(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<(Rational, Rational, Rational), CurveError> {
    let g_start = g.pseudo_periodic_start_time();
    let g_length = g.pseudo_period_length();
    let g_height = g.pseudo_period_height();
    if g_height.is_zero() {
        return Ok((g_start.clone(), g_length.clone(), Rational::zero()));
    }

    // g(T_g) + j·c_g >= T_f puts every later g(t) on f's tail
    let f_start = f.pseudo_periodic_start_time();
    let g_at_start = g.value_at(g_start)?;
    let missing = f_start.checked_sub(&g_at_start)?;

    if settings.use_composition_optimizations {
        if f.is_ultimately_affine() {
            let periods = if missing.is_positive() { (&missing / g_height).ceil() } else { Rational::zero() };
            debug!("composition with ultimately affine outer curve");
            return Ok((
                g_start + &(&periods * g_length),
                g_length.clone(),
                f.pseudo_period_slope().checked_mul(g_height)?
            ));
        }
        if g.is_ultimately_affine() {
            let rate = g.pseudo_period_slope();
            let delay = if missing.is_positive() { &missing / &rate } else { Rational::zero() };
            debug!("composition with ultimately affine inner curve");
            return Ok((
                g_start + &delay,
                f.pseudo_period_length() / &rate,
                f.pseudo_period_height().clone()
            ));
        }
    }

    let common = g_height.lcm(f.pseudo_period_length())?;
    let inner_periods = &common / g_height;
    let outer_periods = &common / f.pseudo_period_length();
    let periods = if missing.is_positive() { (&missing / g_height).ceil() } else { Rational::zero() };
    Ok((
        g_start + &(&periods * g_length),
        &inner_periods * g_length,
        outer_periods.checked_mul(f.pseudo_period_height())?
    ))
}

/// Composition `(f ∘ g)(t) = f(g(t))` for a non-decreasing, finite inner
/// curve `g` with `g(0) >= 0`.
pub fn composition(f: &Curve, g: &Curve, settings: &ComputationSettings) -> Result<Curve, CurveError> {
    if !g.is_finite() {
        return Err(CurveError::InvalidComposition("inner curve must be finite".to_owned()));
    }
    if !g.is_non_decreasing() {
        return Err(CurveError::NotNonDecreasing);
    }
    let zero = Rational::zero();
    if g.value_at(&zero)?.is_negative() {
        return Err(CurveError::InvalidComposition("inner curve must be non-negative".to_owned()));
    }

    let (start, length, height) = composition_period(f, g, settings)?;
    let end = &start + &length;
    let inner = g.cut_closed(&zero, &end)?;
    let reach = g.value_at(&end)?;
    let outer = f.cut_closed(&zero, &reach)?;

    // f ∘ g is affine between breakpoints of g and the times g crosses a
    // breakpoint of f
    let mut times: Vec<Rational> = vec![zero.clone(), end.clone()];
    times.extend(inner.points().map(|point| point.time().clone()));
    for level in outer.points().map(|point| point.time()) {
        times.push(Inverse::Lower.first_time(&inner, level));
        times.push(Inverse::Upper.first_time(&inner, level));
    }
    times.retain(|time| time.is_finite() && time >= &zero && time <= &end);
    times.sort();
    times.dedup();

    let composed = |time: &Rational| -> Result<Rational, CurveError> { f.value_at(&g.value_at(time)?) };
    let third_of = Rational::from(3);
    let mut elements = Vec::with_capacity(2 * times.len());
    for pair in times.windows(2) {
        let (low, high) = (&pair[0], &pair[1]);
        elements.push(Element::Point(Point::new(low.clone(), composed(low)?)));
        let third = (high - low) / &third_of;
        let near = low + &third;
        let near_value = composed(&near)?;
        let far_value = composed(&(&near + &third))?;
        let segment = if near_value.is_finite() && far_value.is_finite() {
            let slope = (&far_value - &near_value) / &third;
            Segment::new(low.clone(), high.clone(), &near_value - &(&slope * &third), slope)?
        } else {
            Segment::constant(low.clone(), high.clone(), near_value)?
        };
        elements.push(Element::Segment(segment));
    }
    let result = Curve::new(Sequence::new(elements)?, start, length, height)?;
    optimize_if_enabled(result, settings)
}
