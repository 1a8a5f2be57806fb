use thiserror::Error;

use crate::numerics::rationalerror::RationalError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CurveError {
    #[error("invalid segment: {0}")]
    InvalidSegment(String),
    #[error("invalid sequence: {0}")]
    InvalidSequence(String),
    #[error("invalid curve: {0}")]
    InvalidCurve(String),
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] RationalError),
    #[error("operation requires a non-decreasing curve")]
    NotNonDecreasing,
    #[error("{0} is outside the domain")]
    OutOfDomain(String),
    #[error("incompatible periods: {0}")]
    IncompatiblePeriods(String),
    #[error("invalid composition: {0}")]
    InvalidComposition(String),
}
