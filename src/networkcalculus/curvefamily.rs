use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::curveerror::CurveError;
use crate::numerics::rational::Rational;

/// A textbook shape described by a few parameters, materialized on demand.
pub trait CurveFamily {

    fn to_curve(&self) -> Result<Curve, CurveError>;

    /// Tag used by the JSON codec.
    fn type_name(&self) -> &'static str;
}

pub(crate) fn require_non_negative(name: &str, value: &Rational) -> Result<(), CurveError> {
    if value.is_finite() && !value.is_negative() {
        Ok(())
    } else {
        Err(CurveError::InvalidCurve(format!("{} must be finite and >= 0, got {}", name, value)))
    }
}

pub(crate) fn require_positive(name: &str, value: &Rational) -> Result<(), CurveError> {
    if value.is_finite() && value.is_positive() {
        Ok(())
    } else {
        Err(CurveError::InvalidCurve(format!("{} must be finite and > 0, got {}", name, value)))
    }
}
