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

/// Token bucket `α(t) = sigma + rho · t` for `t > 0`, `α(0) = 0`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigmaRhoArrivalCurve {
    sigma: Rational,
    rho: Rational
}

impl SigmaRhoArrivalCurve {
    pub fn new(sigma: Rational, rho: Rational) -> Result<SigmaRhoArrivalCurve, CurveError> {
        require_non_negative("sigma", &sigma)?;
        require_non_negative("rho", &rho)?;
        Ok(SigmaRhoArrivalCurve { sigma, rho })
    }

    pub fn sigma(&self) -> &Rational {
        &self.sigma
    }

    pub fn rho(&self) -> &Rational {
        &self.rho
    }
}

impl CurveFamily for SigmaRhoArrivalCurve {
    fn to_curve(&self) -> Result<Curve, CurveError> {
        let elements = vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::new(Rational::zero(), Rational::one(), self.sigma.clone(), self.rho.clone())?)
        ];
        Curve::new(Sequence::new(elements)?, Rational::zero(), Rational::one(), self.rho.clone())
    }

    fn type_name(&self) -> &'static str {
        "sigmaRhoArrivalCurve"
    }
}

pub fn sigma_rho_arrival_curve(sigma: Rational, rho: Rational) -> Result<Curve, CurveError> {
    SigmaRhoArrivalCurve::new(sigma, rho)?.to_curve()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_right_after_the_origin() {
        let curve = sigma_rho_arrival_curve(Rational::from(4), Rational::from(2)).unwrap();
        assert_eq!(curve.value_at(&Rational::zero()).unwrap(), Rational::zero());
        assert_eq!(curve.right_limit_at(&Rational::zero()).unwrap(), Rational::from(4));
        assert_eq!(curve.value_at(&Rational::from(3)).unwrap(), Rational::from(10));
        assert!(curve.is_concave());
        assert!(curve.is_sub_additive());
    }
}
