use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::segment::Segment;
use crate::minplusalgebra::sequence::Sequence;
use crate::networkcalculus::curvefamily::{
    CurveFamily,
    require_non_negative,
    require_positive
};
use crate::numerics::rational::Rational;

/// `v(t) = a · ⌈t / b⌉`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StairCurve {
    a: Rational,
    b: Rational
}

impl StairCurve {
    pub fn new(a: Rational, b: Rational) -> Result<StairCurve, CurveError> {
        require_non_negative("a", &a)?;
        require_positive("b", &b)?;
        Ok(StairCurve { a, b })
    }

    pub fn a(&self) -> &Rational {
        &self.a
    }

    pub fn b(&self) -> &Rational {
        &self.b
    }
}

impl CurveFamily for StairCurve {
    fn to_curve(&self) -> Result<Curve, CurveError> {
        let elements = vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::constant(Rational::zero(), self.b.clone(), self.a.clone())?)
        ];
        Curve::new(Sequence::new(elements)?, Rational::zero(), self.b.clone(), self.a.clone())
    }

    fn type_name(&self) -> &'static str {
        "stairCurve"
    }
}

pub fn stair_curve(a: Rational, b: Rational) -> Result<Curve, CurveError> {
    StairCurve::new(a, b)?.to_curve()
}
