use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::segment::Segment;
use crate::minplusalgebra::sequence::Sequence;
use crate::networkcalculus::curvefamily::{
    CurveFamily,
    require_non_negative
};
use crate::numerics::rational::Rational;

/// `β(t) = rate · max(0, t - latency)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLatencyServiceCurve {
    latency: Rational,
    rate: Rational
}

impl RateLatencyServiceCurve {
    pub fn new(latency: Rational, rate: Rational) -> Result<RateLatencyServiceCurve, CurveError> {
        require_non_negative("latency", &latency)?;
        require_non_negative("rate", &rate)?;
        Ok(RateLatencyServiceCurve { latency, rate })
    }

    pub fn latency(&self) -> &Rational {
        &self.latency
    }

    pub fn rate(&self) -> &Rational {
        &self.rate
    }
}

impl CurveFamily for RateLatencyServiceCurve {
    fn to_curve(&self) -> Result<Curve, CurveError> {
        let zero = Rational::zero();
        let mut elements = vec![Element::Point(Point::origin())];
        if self.latency.is_positive() {
            elements.push(Element::Segment(Segment::zero(zero.clone(), self.latency.clone())?));
            elements.push(Element::Point(Point::zero(self.latency.clone())));
        }
        elements.push(Element::Segment(Segment::new(
            self.latency.clone(),
            &self.latency + Rational::one(),
            zero,
            self.rate.clone()
        )?));
        Curve::new(Sequence::new(elements)?, self.latency.clone(), Rational::one(), self.rate.clone())
    }

    fn type_name(&self) -> &'static str {
        "rateLatencyServiceCurve"
    }
}

pub fn rate_latency_service_curve(latency: Rational, rate: Rational) -> Result<Curve, CurveError> {
    RateLatencyServiceCurve::new(latency, rate)?.to_curve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_until_latency_then_linear() {
        let curve = rate_latency_service_curve(Rational::from(2), Rational::from(3)).unwrap();
        assert_eq!(curve.value_at(&Rational::from(1)).unwrap(), Rational::zero());
        assert_eq!(curve.value_at(&Rational::from(2)).unwrap(), Rational::zero());
        assert_eq!(curve.value_at(&Rational::from(5)).unwrap(), Rational::from(9));
        assert!(curve.is_convex());
    }

    #[test]
    fn negative_latency_is_rejected() {
        assert!(RateLatencyServiceCurve::new(Rational::from(-1), Rational::one()).is_err());
    }
}
