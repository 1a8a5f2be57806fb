mod common;

use common::*;
use netcalc::configuration::Configuration;
use netcalc::json::curvejson::{
    curve_from_json,
    curve_from_str,
    curve_to_json,
    curve_to_string,
    named_curve_from_json,
    named_curve_to_json
};
use netcalc::manager::manager::IManager;
use netcalc::manager::managererror::ManagerError;
use netcalc::minplusalgebra::computationsettings::ComputationSettings;
use netcalc::minplusalgebra::convolution::convolution;
use netcalc::minplusalgebra::curve::Curve;
use netcalc::networkcalculus::curvefamily::CurveFamily;
use netcalc::networkcalculus::delayservicecurve::DelayServiceCurve;
use netcalc::networkcalculus::flowcontrolcurve::FlowControlCurve;
use netcalc::networkcalculus::namedcurve::NamedCurve;
use netcalc::networkcalculus::ratelatencyservicecurve::RateLatencyServiceCurve;
use netcalc::networkcalculus::sigmarhoarrivalcurve::SigmaRhoArrivalCurve;
use netcalc::networkcalculus::staircasecurve::StaircaseCurve;
use netcalc::networkcalculus::staircurve::StairCurve;
use netcalc::networkcalculus::stepcurve::StepCurve;
use serde_json::json;

fn families() -> Vec<NamedCurve> {
    vec![
        RateLatencyServiceCurve::new(r(2), q(3, 2)).unwrap().into(),
        SigmaRhoArrivalCurve::new(r(4), q(1, 3)).unwrap().into(),
        DelayServiceCurve::new(r(0)).unwrap().into(),
        DelayServiceCurve::new(q(5, 2)).unwrap().into(),
        StepCurve::new(r(7), r(3)).unwrap().into(),
        StairCurve::new(r(3), r(5)).unwrap().into(),
        StaircaseCurve::new(r(1), r(2), r(4)).unwrap().into(),
        FlowControlCurve::new(r(2), r(3), r(4)).unwrap().into(),
        FlowControlCurve::new(r(2), r(3), r(10)).unwrap().into()
    ]
}

#[test]
fn families_survive_the_parametric_form() {
    for named in families() {
        let encoded = named_curve_to_json(&named).unwrap();
        assert_eq!(encoded["type"], json!(named.type_name()));
        assert_eq!(named_curve_from_json(encoded).unwrap(), named);
    }
}

#[test]
fn materialized_families_survive_the_raw_form() {
    for named in families() {
        let curve = named.to_curve().unwrap();
        let decoded = curve_from_json(curve_to_json(&curve).unwrap()).unwrap();
        assert_eq!(decoded, curve);
        let from_parameters = curve_from_json(named_curve_to_json(&named).unwrap()).unwrap();
        assert_equivalent(&curve, &from_parameters);
    }
}

#[test]
fn computed_curves_survive_text() {
    let settings = ComputationSettings::default();
    let stair = StairCurve::new(r(3), r(5)).unwrap().to_curve().unwrap();
    let service = RateLatencyServiceCurve::new(r(2), r(1)).unwrap().to_curve().unwrap();
    let result = convolution(&stair, &service, &settings).unwrap();
    let text = curve_to_string(&result).unwrap();
    assert_eq!(curve_from_str(&text).unwrap(), result);
}

#[test]
fn extreme_curves_survive_text() {
    for curve in [Curve::zero(), Curve::plus_infinite(), Curve::minus_infinite(), Curve::identity_element()] {
        let text = curve_to_string(&curve).unwrap();
        assert_eq!(curve_from_str(&text).unwrap(), curve);
    }
}

#[test]
fn raw_curve_tag_is_not_a_family() {
    let encoded = curve_to_json(&Curve::zero()).unwrap();
    assert!(matches!(named_curve_from_json(encoded), Err(ManagerError::UnknownType(_))));
}

#[test]
fn configuration_mixes_raw_and_parametric_curves() {
    let configuration = Configuration::new();
    let mut raw = curve_to_json(&curve(vec![
        point(r(0), r(0)),
        segment(r(0), r(2), r(0), r(0))
    ], r(0), r(2), r(3))).unwrap();
    raw["name"] = json!("floor");
    let curves = json!([
        raw,
        { "name": "bucket", "type": "sigmaRhoArrivalCurve", "sigma": 4, "rho": "1/2" },
        { "name": "server", "type": "rateLatencyServiceCurve", "latency": 1, "rate": 2 }
    ]);
    configuration.from_json_str(&json!({ "curves": curves }).to_string()).unwrap();
    assert_eq!(configuration.curve_manager().names(), vec!["bucket", "floor", "server"]);
    assert_eq!(configuration.curve("floor").unwrap().value_at(&r(5)).unwrap(), r(6));
    assert_eq!(configuration.curve("bucket").unwrap().value_at(&r(2)).unwrap(), r(5));
    assert_eq!(*configuration.settings(), ComputationSettings::default());
}
