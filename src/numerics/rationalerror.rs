use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RationalError {
    #[error("undefined operation {0}")]
    UndefinedOperation(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("cannot parse '{0}' as a rational number")]
    Parse(String),
}
