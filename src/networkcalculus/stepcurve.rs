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

/// 0 on `[0, step_time]`, `value` afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepCurve {
    value: Rational,
    step_time: Rational
}

impl StepCurve {
    pub fn new(value: Rational, step_time: Rational) -> Result<StepCurve, CurveError> {
        if !value.is_finite() {
            return Err(CurveError::InvalidCurve(format!("step value must be finite, got {}", value)));
        }
        require_non_negative("step time", &step_time)?;
        Ok(StepCurve { value, step_time })
    }

    pub fn value(&self) -> &Rational {
        &self.value
    }

    pub fn step_time(&self) -> &Rational {
        &self.step_time
    }
}

impl CurveFamily for StepCurve {
    fn to_curve(&self) -> Result<Curve, CurveError> {
        let mut elements = vec![Element::Point(Point::origin())];
        if self.step_time.is_positive() {
            elements.push(Element::Segment(Segment::zero(Rational::zero(), self.step_time.clone())?));
            elements.push(Element::Point(Point::zero(self.step_time.clone())));
        }
        elements.push(Element::Segment(Segment::constant(
            self.step_time.clone(),
            &self.step_time + Rational::one(),
            self.value.clone()
        )?));
        Curve::new(Sequence::new(elements)?, self.step_time.clone(), Rational::one(), Rational::zero())
    }

    fn type_name(&self) -> &'static str {
        "stepCurve"
    }
}

pub fn step_curve(value: Rational, step_time: Rational) -> Result<Curve, CurveError> {
    StepCurve::new(value, step_time)?.to_curve()
}
