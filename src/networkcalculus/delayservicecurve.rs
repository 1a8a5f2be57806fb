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

/// Pure delay `δ_D`: 0 on `[0, D]`, `+∞` afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DelayServiceCurve {
    delay: Rational
}

impl DelayServiceCurve {
    pub fn new(delay: Rational) -> Result<DelayServiceCurve, CurveError> {
        require_non_negative("delay", &delay)?;
        Ok(DelayServiceCurve { delay })
    }

    pub fn delay(&self) -> &Rational {
        &self.delay
    }
}

impl CurveFamily for DelayServiceCurve {
    fn to_curve(&self) -> Result<Curve, CurveError> {
        if self.delay.is_zero() {
            return Ok(Curve::identity_element());
        }
        let zero = Rational::zero();
        let elements = vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::zero(zero, self.delay.clone())?),
            Element::Point(Point::zero(self.delay.clone())),
            Element::Segment(Segment::plus_infinite(self.delay.clone(), &self.delay + Rational::from(2))?)
        ];
        Curve::new(Sequence::new(elements)?, &self.delay + Rational::one(), Rational::one(), Rational::zero())
    }

    fn type_name(&self) -> &'static str {
        "delayServiceCurve"
    }
}

pub fn delay_service_curve(delay: Rational) -> Result<Curve, CurveError> {
    DelayServiceCurve::new(delay)?.to_curve()
}
