mod common;

use common::*;
use netcalc::minplusalgebra::computationsettings::ComputationSettings;
use netcalc::minplusalgebra::curve::Curve;
use netcalc::minplusalgebra::pseudoinverse::{
    lower_pseudo_inverse,
    lower_pseudo_inverse_at,
    upper_pseudo_inverse,
    upper_pseudo_inverse_at
};
use netcalc::networkcalculus::ratelatencyservicecurve::rate_latency_service_curve;
use netcalc::networkcalculus::sigmarhoarrivalcurve::sigma_rho_arrival_curve;
use netcalc::networkcalculus::staircasecurve::staircase_curve;
use netcalc::networkcalculus::staircurve::stair_curve;

fn left_continuous_curves() -> Vec<Curve> {
    vec![
        rate_latency_service_curve(r(2), r(3)).unwrap(),
        stair_curve(r(1), r(1)).unwrap(),
        stair_curve(r(3), r(2)).unwrap(),
        sigma_rho_arrival_curve(r(2), r(1)).unwrap(),
        staircase_curve(r(1), r(2), r(4)).unwrap()
    ]
}

/// `3·⌊t / 2⌋`.
fn floor_stair() -> Curve {
    curve(vec![
        point(r(0), r(0)),
        segment(r(0), r(2), r(0), r(0))
    ], r(0), r(2), r(3))
}

fn right_continuous_curves() -> Vec<Curve> {
    vec![
        rate_latency_service_curve(r(1), r(2)).unwrap(),
        rate_latency_service_curve(r(0), q(1, 2)).unwrap(),
        floor_stair()
    ]
}

#[test]
fn lower_of_upper_restores_left_continuous_curves() {
    for (name, settings) in [("default", ComputationSettings::default()), ("plain", ComputationSettings::default().without_optimizations())] {
        for f in left_continuous_curves() {
            assert!(f.is_left_continuous());
            let upper = upper_pseudo_inverse(&f, &settings).unwrap();
            let restored = lower_pseudo_inverse(&upper, &settings).unwrap();
            assert!(
                netcalc::minplusalgebra::optimization::equivalent(&f, &restored).unwrap(),
                "{}: {} came back as {}", name, f, restored
            );
        }
    }
}

#[test]
fn upper_of_lower_restores_right_continuous_curves() {
    let settings = ComputationSettings::default();
    for f in right_continuous_curves() {
        assert!(f.is_right_continuous());
        let lower = lower_pseudo_inverse(&f, &settings).unwrap();
        let restored = upper_pseudo_inverse(&lower, &settings).unwrap();
        assert_equivalent(&f, &restored);
    }
}

#[test]
fn inverse_curves_agree_with_point_queries() {
    let settings = ComputationSettings::default();
    for f in left_continuous_curves() {
        let lower = lower_pseudo_inverse(&f, &settings).unwrap();
        let upper = upper_pseudo_inverse(&f, &settings).unwrap();
        for y in 0..24 {
            let level = q(y, 2);
            assert_eq!(lower.value_at(&level).unwrap(), lower_pseudo_inverse_at(&f, &level).unwrap());
            assert_eq!(upper.value_at(&level).unwrap(), upper_pseudo_inverse_at(&f, &level).unwrap());
        }
    }
}

#[test]
fn stair_inverses_step_on_their_levels() {
    // 3·⌈t / 2⌉
    let f = stair_curve(r(3), r(2)).unwrap();
    assert_eq!(lower_pseudo_inverse_at(&f, &r(0)).unwrap(), r(0));
    assert_eq!(upper_pseudo_inverse_at(&f, &r(0)).unwrap(), r(0));
    assert_eq!(lower_pseudo_inverse_at(&f, &r(3)).unwrap(), r(0));
    assert_eq!(upper_pseudo_inverse_at(&f, &r(3)).unwrap(), r(2));
    assert_eq!(lower_pseudo_inverse_at(&f, &r(4)).unwrap(), r(2));
    assert_eq!(lower_pseudo_inverse_at(&f, &r(7)).unwrap(), r(4));
}
