use serde::{
    de::{
        self,
        Error
    },
    Deserialize
};
use thiserror::Error as ThisError;

use crate::minplusalgebra::curveerror::CurveError;

#[derive(Debug, ThisError)]
pub enum ManagerError {
    #[error("io error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("json parse error: {0}")]
    JsonParseError(#[from] serde_json::Error),
    #[error("unknown type '{0}'")]
    UnknownType(String),
    #[error("key '{0}' not found")]
    NameNotFoundError(String),
    #[error(transparent)]
    Curve(#[from] CurveError)
}

impl ManagerError {
    pub fn from_json_or_json_parse_error <T> (json_value: serde_json::Value) -> Result<T, Self>
        where T : for<'a> Deserialize<'a> {
        serde_json::from_value(json_value).map_err(ManagerError::JsonParseError)
    }

    pub fn json_missing_field(field: &'static str) -> ManagerError {
        ManagerError::JsonParseError(serde_json::Error::missing_field(field))
    }

    pub fn json_invalid_type(unexp: de::Unexpected, exp: &dyn de::Expected) -> ManagerError {
        ManagerError::JsonParseError(serde_json::Error::invalid_type(unexp, exp))
    }

    pub fn map_elem_not_found(name: &str) -> ManagerError {
        ManagerError::NameNotFoundError(name.to_owned())
    }
}

pub fn parse_json_value<T>(json_value: serde_json::Value) -> Result<T, ManagerError>
    where T: for<'a> Deserialize<'a> {
    ManagerError::from_json_or_json_parse_error(json_value)
}
