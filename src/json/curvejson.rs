use serde::{
    de,
    Deserialize,
    Serialize
};

use crate::manager::managererror::{
    ManagerError,
    parse_json_value
};
use crate::minplusalgebra::curve::Curve;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::segment::Segment;
use crate::minplusalgebra::sequence::Sequence;
use crate::networkcalculus::curvefamily::CurveFamily;
use crate::networkcalculus::delayservicecurve::DelayServiceCurve;
use crate::networkcalculus::flowcontrolcurve::FlowControlCurve;
use crate::networkcalculus::namedcurve::NamedCurve;
use crate::networkcalculus::ratelatencyservicecurve::RateLatencyServiceCurve;
use crate::networkcalculus::sigmarhoarrivalcurve::SigmaRhoArrivalCurve;
use crate::networkcalculus::staircasecurve::StaircaseCurve;
use crate::networkcalculus::staircurve::StairCurve;
use crate::networkcalculus::stepcurve::StepCurve;
use crate::numerics::rational::Rational;

// ─────────────────────────────────────────────────────────────────────────────
// Wire shapes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ElementJsonProp {
    Point {
        time: Rational,
        value: Rational
    },
    #[serde(rename_all = "camelCase")]
    Segment {
        start_time: Rational,
        end_time: Rational,
        right_limit: Rational,
        slope: Rational
    }
}

#[derive(Serialize, Deserialize)]
struct SequenceJsonProp {
    elements: Vec<ElementJsonProp>
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum CurveJsonProp {
    #[serde(rename_all = "camelCase")]
    Curve {
        sequence: SequenceJsonProp,
        period_start: Rational,
        period_length: Rational,
        period_height: Rational
    },
    RateLatencyServiceCurve {
        latency: Rational,
        rate: Rational
    },
    SigmaRhoArrivalCurve {
        sigma: Rational,
        rho: Rational
    },
    DelayServiceCurve {
        delay: Rational
    },
    #[serde(rename_all = "camelCase")]
    StepCurve {
        value: Rational,
        step_time: Rational
    },
    StairCurve {
        a: Rational,
        b: Rational
    },
    StaircaseCurve {
        delay: Rational,
        rate: Rational,
        height: Rational
    },
    FlowControlCurve {
        latency: Rational,
        rate: Rational,
        height: Rational
    }
}

/// Only reads the tag, so that unknown tags get their own error.
#[derive(Deserialize)]
struct CurveTypedObject {
    #[serde(rename = "type")]
    curve_type: String
}

const KNOWN_TYPES: [&str; 8] = [
    "curve",
    "rateLatencyServiceCurve",
    "sigmaRhoArrivalCurve",
    "delayServiceCurve",
    "stepCurve",
    "stairCurve",
    "staircaseCurve",
    "flowControlCurve"
];

// ─────────────────────────────────────────────────────────────────────────────
// Conversions
// ─────────────────────────────────────────────────────────────────────────────

fn element_to_prop(element: &Element) -> ElementJsonProp {
    match element {
        Element::Point(point) => ElementJsonProp::Point {
            time: point.time().clone(),
            value: point.value().clone()
        },
        Element::Segment(segment) => ElementJsonProp::Segment {
            start_time: segment.start_time().clone(),
            end_time: segment.end_time().clone(),
            right_limit: segment.right_limit_at_start_time().clone(),
            slope: segment.slope().clone()
        }
    }
}

fn element_from_prop(prop: ElementJsonProp) -> Result<Element, ManagerError> {
    match prop {
        ElementJsonProp::Point { time, value } => Ok(Element::Point(Point::new(time, value))),
        ElementJsonProp::Segment { start_time, end_time, right_limit, slope } => {
            Ok(Element::Segment(Segment::new(start_time, end_time, right_limit, slope)?))
        }
    }
}

fn named_curve_to_prop(named_curve: &NamedCurve) -> CurveJsonProp {
    match named_curve {
        NamedCurve::RateLatency(curve) => CurveJsonProp::RateLatencyServiceCurve {
            latency: curve.latency().clone(),
            rate: curve.rate().clone()
        },
        NamedCurve::SigmaRho(curve) => CurveJsonProp::SigmaRhoArrivalCurve {
            sigma: curve.sigma().clone(),
            rho: curve.rho().clone()
        },
        NamedCurve::Delay(curve) => CurveJsonProp::DelayServiceCurve {
            delay: curve.delay().clone()
        },
        NamedCurve::Step(curve) => CurveJsonProp::StepCurve {
            value: curve.value().clone(),
            step_time: curve.step_time().clone()
        },
        NamedCurve::Stair(curve) => CurveJsonProp::StairCurve {
            a: curve.a().clone(),
            b: curve.b().clone()
        },
        NamedCurve::Staircase(curve) => CurveJsonProp::StaircaseCurve {
            delay: curve.latency().clone(),
            rate: curve.rate().clone(),
            height: curve.height().clone()
        },
        NamedCurve::FlowControl(curve) => CurveJsonProp::FlowControlCurve {
            latency: curve.latency().clone(),
            rate: curve.rate().clone(),
            height: curve.height().clone()
        }
    }
}

/// Decoded value: either a raw curve or a family in parametric form.
enum Decoded {
    Curve(Curve),
    Named(NamedCurve)
}

fn decode(json_value: serde_json::Value) -> Result<Decoded, ManagerError> {
    if !json_value.is_object() {
        return Err(ManagerError::json_invalid_type(de::Unexpected::Other("non-object value"), &"a tagged curve object"));
    }
    let typed_object: CurveTypedObject = match json_value.get("type") {
        Some(_) => parse_json_value(json_value.clone())?,
        None => return Err(ManagerError::json_missing_field("type"))
    };
    if !KNOWN_TYPES.contains(&typed_object.curve_type.as_str()) {
        return Err(ManagerError::UnknownType(typed_object.curve_type));
    }

    let decoded = match parse_json_value::<CurveJsonProp>(json_value)? {
        CurveJsonProp::Curve { sequence, period_start, period_length, period_height } => {
            let elements = sequence.elements
                .into_iter()
                .map(element_from_prop)
                .collect::<Result<Vec<Element>, ManagerError>>()?;
            Decoded::Curve(Curve::new(Sequence::new(elements)?, period_start, period_length, period_height)?)
        },
        CurveJsonProp::RateLatencyServiceCurve { latency, rate } => {
            Decoded::Named(RateLatencyServiceCurve::new(latency, rate)?.into())
        },
        CurveJsonProp::SigmaRhoArrivalCurve { sigma, rho } => {
            Decoded::Named(SigmaRhoArrivalCurve::new(sigma, rho)?.into())
        },
        CurveJsonProp::DelayServiceCurve { delay } => {
            Decoded::Named(DelayServiceCurve::new(delay)?.into())
        },
        CurveJsonProp::StepCurve { value, step_time } => {
            Decoded::Named(StepCurve::new(value, step_time)?.into())
        },
        CurveJsonProp::StairCurve { a, b } => {
            Decoded::Named(StairCurve::new(a, b)?.into())
        },
        CurveJsonProp::StaircaseCurve { delay, rate, height } => {
            Decoded::Named(StaircaseCurve::new(delay, rate, height)?.into())
        },
        CurveJsonProp::FlowControlCurve { latency, rate, height } => {
            Decoded::Named(FlowControlCurve::new(latency, rate, height)?.into())
        }
    };
    Ok(decoded)
}

// ─────────────────────────────────────────────────────────────────────────────
// Public codec
// ─────────────────────────────────────────────────────────────────────────────

/// `{"type":"curve", ...}` with the full base sequence.
pub fn curve_to_json(curve: &Curve) -> Result<serde_json::Value, ManagerError> {
    let prop = CurveJsonProp::Curve {
        sequence: SequenceJsonProp {
            elements: curve.base_sequence().elements().iter().map(element_to_prop).collect()
        },
        period_start: curve.pseudo_periodic_start_time().clone(),
        period_length: curve.pseudo_period_length().clone(),
        period_height: curve.pseudo_period_height().clone()
    };
    Ok(serde_json::to_value(prop)?)
}

/// Family tag with its parameters only.
pub fn named_curve_to_json(named_curve: &NamedCurve) -> Result<serde_json::Value, ManagerError> {
    Ok(serde_json::to_value(named_curve_to_prop(named_curve))?)
}

/// Any tagged curve; named families are materialized.
pub fn curve_from_json(json_value: serde_json::Value) -> Result<Curve, ManagerError> {
    match decode(json_value)? {
        Decoded::Curve(curve) => Ok(curve),
        Decoded::Named(named_curve) => Ok(named_curve.to_curve()?)
    }
}

/// A named family; a raw `curve` tag is rejected.
pub fn named_curve_from_json(json_value: serde_json::Value) -> Result<NamedCurve, ManagerError> {
    match decode(json_value)? {
        Decoded::Named(named_curve) => Ok(named_curve),
        Decoded::Curve(_) => Err(ManagerError::UnknownType("curve is not a named family".to_owned()))
    }
}

pub fn curve_to_string(curve: &Curve) -> Result<String, ManagerError> {
    Ok(serde_json::to_string(&curve_to_json(curve)?)?)
}

pub fn curve_from_str(text: &str) -> Result<Curve, ManagerError> {
    curve_from_json(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_a_raw_curve() {
        let text = r#"{
            "type": "curve",
            "sequence": { "elements": [
                { "type": "point", "time": 0, "value": 0 },
                { "type": "segment", "startTime": 0, "endTime": "3/2", "rightLimit": 1, "slope": "1/2" }
            ]},
            "periodStart": 0,
            "periodLength": "3/2",
            "periodHeight": "3/4"
        }"#;
        let curve = curve_from_str(text).unwrap();
        assert_eq!(curve.pseudo_period_length(), &Rational::new(3, 2));
        assert_eq!(curve.value_at(&Rational::from(1)).unwrap(), Rational::new(3, 2));
    }

    #[test]
    fn families_keep_their_parameters() {
        let named: NamedCurve = StaircaseCurve::new(Rational::from(1), Rational::from(2), Rational::from(4)).unwrap().into();
        let encoded = named_curve_to_json(&named).unwrap();
        assert_eq!(encoded, json!({"type": "staircaseCurve", "delay": 1, "rate": 2, "height": 4}));
        assert_eq!(named_curve_from_json(encoded).unwrap(), named);
    }

    #[test]
    fn infinite_values_are_written_as_text() {
        let encoded = curve_to_json(&Curve::identity_element()).unwrap();
        assert_eq!(encoded["sequence"]["elements"][1]["rightLimit"], json!("+inf"));
        assert_eq!(curve_from_json(encoded).unwrap(), Curve::identity_element());
    }

    #[test]
    fn unknown_or_missing_tags_are_rejected() {
        assert!(matches!(curve_from_json(json!({"type": "parabola"})), Err(ManagerError::UnknownType(_))));
        assert!(matches!(curve_from_json(json!({"delay": 1})), Err(ManagerError::JsonParseError(_))));
        assert!(matches!(curve_from_json(json!([1, 2])), Err(ManagerError::JsonParseError(_))));
        assert!(matches!(
            curve_from_json(json!({"type": "stairCurve", "a": 1, "b": 0})),
            Err(ManagerError::Curve(_))
        ));
    }
}
