use tracing::trace;

use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::segment::Segment;
use crate::minplusalgebra::sequence::Sequence;
use crate::networkcalculus::curvefamily::{
    CurveFamily,
    require_positive
};
use crate::numerics::rational::Rational;

/// Service of a window flow controller with round-trip `latency`, link
/// `rate` and window `height`: `β ⊗ (β + W) ⊗ (β + 2W) ⊗ ...` for the
/// rate-latency `β`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowControlCurve {
    latency: Rational,
    rate: Rational,
    height: Rational
}

impl FlowControlCurve {
    pub fn new(latency: Rational, rate: Rational, height: Rational) -> Result<FlowControlCurve, CurveError> {
        require_positive("latency", &latency)?;
        require_positive("rate", &rate)?;
        require_positive("height", &height)?;
        Ok(FlowControlCurve { latency, rate, height })
    }

    pub fn latency(&self) -> &Rational {
        &self.latency
    }

    pub fn rate(&self) -> &Rational {
        &self.rate
    }

    pub fn height(&self) -> &Rational {
        &self.height
    }
}

impl CurveFamily for FlowControlCurve {
    fn to_curve(&self) -> Result<Curve, CurveError> {
        let zero = Rational::zero();
        let window = &self.height;
        let latency = &self.latency;
        let mut elements = vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::constant(zero, latency.clone(), window.clone())?),
            Element::Point(Point::new(latency.clone(), window.clone()))
        ];
        if window < &(&self.rate * latency) {
            // window-bound: W every latency, drained at rate R in between
            trace!("window-limited flow control curve");
            let drained = latency + &(window / &self.rate);
            let doubled = window * Rational::from(2);
            let end = latency * Rational::from(2);
            elements.push(Element::Segment(Segment::new(latency.clone(), drained.clone(), window.clone(), self.rate.clone())?));
            elements.push(Element::Point(Point::new(drained.clone(), doubled.clone())));
            elements.push(Element::Segment(Segment::constant(drained, end, doubled)?));
            Curve::new(Sequence::new(elements)?, latency.clone(), latency.clone(), window.clone())
        } else {
            elements.push(Element::Segment(Segment::new(
                latency.clone(),
                latency + Rational::one(),
                window.clone(),
                self.rate.clone()
            )?));
            Curve::new(Sequence::new(elements)?, latency.clone(), Rational::one(), self.rate.clone())
        }
    }

    fn type_name(&self) -> &'static str {
        "flowControlCurve"
    }
}

pub fn flow_control_curve(latency: Rational, rate: Rational, height: Rational) -> Result<Curve, CurveError> {
    FlowControlCurve::new(latency, rate, height)?.to_curve()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(value: i64) -> Rational {
        Rational::from(value)
    }

    #[test]
    fn large_window_grows_at_the_link_rate() {
        let curve = flow_control_curve(r(2), r(1), r(5)).unwrap();
        assert_eq!(curve.value_at(&r(1)).unwrap(), r(5));
        assert_eq!(curve.value_at(&r(2)).unwrap(), r(5));
        assert_eq!(curve.value_at(&r(6)).unwrap(), r(9));
    }

    #[test]
    fn small_window_climbs_in_bursts() {
        // W = 2 < R·θ = 8: rises by 2 over [4, 5], then waits until 8
        let curve = flow_control_curve(r(4), r(2), r(2)).unwrap();
        assert_eq!(curve.value_at(&r(3)).unwrap(), r(2));
        assert_eq!(curve.value_at(&r(5)).unwrap(), r(4));
        assert_eq!(curve.value_at(&r(7)).unwrap(), r(4));
        assert_eq!(curve.value_at(&r(9)).unwrap(), r(6));
        assert_eq!(curve.value_at(&r(12)).unwrap(), r(6));
        assert_eq!(curve.value_at(&r(13)).unwrap(), r(8));
    }
}
