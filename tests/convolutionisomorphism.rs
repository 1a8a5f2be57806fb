mod common;

use common::*;
use netcalc::minplusalgebra::computationsettings::ComputationSettings;
use netcalc::minplusalgebra::convolution::{
    convolution,
    convolution_of
};
use netcalc::minplusalgebra::curve::Curve;
use netcalc::numerics::rational::Rational;
use netcalc::networkcalculus::ratelatencyservicecurve::rate_latency_service_curve;
use netcalc::networkcalculus::sigmarhoarrivalcurve::sigma_rho_arrival_curve;
use netcalc::networkcalculus::staircurve::stair_curve;

fn stair(a: i64, b: i64) -> Curve {
    stair_curve(r(a), r(b)).unwrap()
}

/// `1 + t` on `[0, 1]`, then 2 at every integer and +∞ in between.
fn integer_ticks() -> Curve {
    curve(vec![
        point(r(0), r(1)),
        segment(r(0), r(1), r(1), r(1)),
        point(r(1), r(2)),
        segment(r(1), r(2), Rational::PlusInfinity, r(0))
    ], r(1), r(1), r(0))
}

/// `1 + t/2`, described with a transient of 1/3 and a period of 4/3.
fn slow_line() -> Curve {
    curve(vec![
        point(r(0), r(1)),
        segment(r(0), q(1, 3), r(1), q(1, 2)),
        point(q(1, 3), q(7, 6)),
        segment(q(1, 3), q(5, 3), q(7, 6), q(1, 2))
    ], q(1, 3), q(4, 3), q(2, 3))
}

/// `k` at every integer `k`, -∞ in between.
fn minus_infinite_gaps() -> Curve {
    curve(vec![
        point(r(0), r(0)),
        segment(r(0), r(1), Rational::MinusInfinity, r(0))
    ], r(0), r(1), r(1))
}

fn stair_pairs() -> Vec<(Curve, Curve)> {
    vec![
        (stair(3, 5), stair(7, 11)),
        (stair(5, 3), stair(11, 7)),
        (stair(5, 3), stair(7, 11)),
        (stair(1, 1), stair(2, 3))
    ]
}

#[test]
fn stair_convolution_does_not_depend_on_the_settings() {
    let variants = settings_variants();
    let (_, reference_settings) = &variants[1];
    for (f, g) in stair_pairs() {
        let reference = convolution(&f, &g, reference_settings).unwrap();
        for (name, settings) in variants.iter() {
            let result = convolution(&f, &g, settings)
                .unwrap_or_else(|error| panic!("{}: {}", name, error));
            assert!(
                netcalc::minplusalgebra::optimization::equivalent(&reference, &result).unwrap(),
                "{} differs for {} and {}", name, f, g
            );
        }
    }
}

#[test]
fn convolution_commutes() {
    let settings = ComputationSettings::default();
    for (f, g) in stair_pairs() {
        let forward = convolution(&f, &g, &settings).unwrap();
        let backward = convolution(&g, &f, &settings).unwrap();
        assert_equivalent(&forward, &backward);
    }
}

#[test]
fn stair_convolution_stays_below_both_operands() {
    let settings = ComputationSettings::default();
    for (f, g) in stair_pairs() {
        let result = convolution(&f, &g, &settings).unwrap();
        for t in 0..40 {
            let time = q(t, 2);
            let value = result.value_at(&time).unwrap();
            assert!(value <= f.value_at(&time).unwrap());
            assert!(value <= g.value_at(&time).unwrap());
        }
    }
}

#[test]
fn list_convolution_matches_the_fold() {
    let curves = vec![stair(3, 5), rate_latency_service_curve(r(2), r(3)).unwrap(), stair(7, 11)];
    for (name, settings) in settings_variants() {
        let pair = convolution(&curves[0], &curves[1], &settings).unwrap();
        let folded = convolution(&pair, &curves[2], &settings).unwrap();
        let listed = convolution_of(&curves, &settings).unwrap();
        assert!(
            netcalc::minplusalgebra::optimization::equivalent(&folded, &listed).unwrap(),
            "{}", name
        );
    }
}

#[test]
fn rate_latencies_add_their_latencies() {
    // RL(1, 2) ⊗ RL(3, 5) = RL(4, 2)
    let expected = rate_latency_service_curve(r(4), r(2)).unwrap();
    for (name, settings) in settings_variants() {
        let result = convolution(
            &rate_latency_service_curve(r(1), r(2)).unwrap(),
            &rate_latency_service_curve(r(3), r(5)).unwrap(),
            &settings
        ).unwrap();
        assert!(netcalc::minplusalgebra::optimization::equivalent(&expected, &result).unwrap(), "{}", name);
    }
}

#[test]
fn arrival_through_service_keeps_the_smaller_envelope() {
    // 3·(t - 2) until the burst path t + 2 takes over at t = 4
    let settings = ComputationSettings::default();
    let arrival = sigma_rho_arrival_curve(r(4), r(1)).unwrap();
    let service = rate_latency_service_curve(r(2), r(3)).unwrap();
    let result = convolution(&arrival, &service, &settings).unwrap();
    assert_eq!(result.value_at(&r(0)).unwrap(), r(0));
    assert_eq!(result.value_at(&r(2)).unwrap(), r(0));
    assert_eq!(result.value_at(&r(3)).unwrap(), r(3));
    assert_eq!(result.value_at(&r(4)).unwrap(), r(6));
    assert_eq!(result.value_at(&r(10)).unwrap(), r(12));
}

#[test]
fn infinite_gaps_are_filled_by_the_faster_operand() {
    // 2 + t/2 until 2, then 3 + (t - ⌊t⌋)/2
    let expected = curve(vec![
        point(r(0), r(2)),
        segment(r(0), r(2), r(2), q(1, 2)),
        point(r(2), r(3)),
        segment(r(2), r(3), r(3), q(1, 2))
    ], r(2), r(1), r(0));
    let (f, g) = (slow_line(), integer_ticks());
    for (name, settings) in settings_variants() {
        for (lhs, rhs) in [(&f, &g), (&g, &f)] {
            let result = convolution(lhs, rhs, &settings)
                .unwrap_or_else(|error| panic!("{}: {}", name, error));
            assert!(
                netcalc::minplusalgebra::optimization::equivalent(&expected, &result).unwrap(),
                "{} differs: {}", name, result
            );
        }
    }
}

#[test]
fn minus_infinite_gaps_reach_every_positive_time() {
    let line = rate_latency_service_curve(r(0), r(1)).unwrap();
    for (name, settings) in settings_variants() {
        let result = convolution(&minus_infinite_gaps(), &line, &settings)
            .unwrap_or_else(|error| panic!("{}: {}", name, error));
        assert_eq!(result.value_at(&r(0)).unwrap(), r(0), "{}", name);
        for time in [q(1, 2), r(1), q(7, 2), r(10)] {
            assert_eq!(result.value_at(&time).unwrap(), Rational::MinusInfinity, "{} at {}", name, time);
        }
    }
}
