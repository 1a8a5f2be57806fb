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

/// 0 on `[0, latency]`, then steps of `height` every `height / rate`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StaircaseCurve {
    latency: Rational,
    rate: Rational,
    height: Rational
}

impl StaircaseCurve {
    pub fn new(latency: Rational, rate: Rational, height: Rational) -> Result<StaircaseCurve, CurveError> {
        require_non_negative("latency", &latency)?;
        require_positive("rate", &rate)?;
        require_positive("height", &height)?;
        Ok(StaircaseCurve { latency, rate, height })
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

    pub fn step_length(&self) -> Rational {
        &self.height / &self.rate
    }
}

impl CurveFamily for StaircaseCurve {
    fn to_curve(&self) -> Result<Curve, CurveError> {
        let step_length = self.step_length();
        let mut elements = vec![Element::Point(Point::origin())];
        if self.latency.is_positive() {
            elements.push(Element::Segment(Segment::zero(Rational::zero(), self.latency.clone())?));
            elements.push(Element::Point(Point::zero(self.latency.clone())));
        }
        elements.push(Element::Segment(Segment::constant(
            self.latency.clone(),
            &self.latency + &step_length,
            self.height.clone()
        )?));
        Curve::new(Sequence::new(elements)?, self.latency.clone(), step_length, self.height.clone())
    }

    fn type_name(&self) -> &'static str {
        "staircaseCurve"
    }
}

pub fn staircase_curve(latency: Rational, rate: Rational, height: Rational) -> Result<Curve, CurveError> {
    StaircaseCurve::new(latency, rate, height)?.to_curve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_after_the_latency() {
        // steps of 4 every 2 after t = 1
        let curve = staircase_curve(Rational::from(1), Rational::from(2), Rational::from(4)).unwrap();
        for (t, expected) in [(0, 0), (1, 0), (2, 4), (3, 4), (4, 8), (5, 8)] {
            assert_eq!(curve.value_at(&Rational::from(t)).unwrap(), Rational::from(expected));
        }
    }
}
