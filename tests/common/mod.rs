#![allow(dead_code)]

use netcalc::minplusalgebra::computationsettings::ComputationSettings;
use netcalc::minplusalgebra::curve::Curve;
use netcalc::minplusalgebra::element::Element;
use netcalc::minplusalgebra::optimization::equivalent;
use netcalc::minplusalgebra::point::Point;
use netcalc::minplusalgebra::segment::Segment;
use netcalc::minplusalgebra::sequence::Sequence;
use netcalc::numerics::rational::Rational;

pub fn r(value: i64) -> Rational {
    Rational::from(value)
}

pub fn q(numerator: i64, denominator: i64) -> Rational {
    Rational::new(numerator, denominator)
}

pub fn point(time: Rational, value: Rational) -> Element {
    Element::Point(Point::new(time, value))
}

pub fn segment(start: Rational, end: Rational, right_limit: Rational, slope: Rational) -> Element {
    Element::Segment(Segment::new(start, end, right_limit, slope).unwrap())
}

pub fn curve(elements: Vec<Element>, start: Rational, length: Rational, height: Rational) -> Curve {
    Curve::new(Sequence::new(elements).unwrap(), start, length, height).unwrap()
}

pub fn assert_equivalent(expected: &Curve, actual: &Curve) {
    assert!(equivalent(expected, actual).unwrap(), "expected {}\n  actual {}", expected, actual);
}

/// Settings that only differ in which shortcuts and parallel paths run.
pub fn settings_variants() -> Vec<(&'static str, ComputationSettings)> {
    let default = ComputationSettings::default();
    vec![
        ("default", default.clone()),
        ("no optimizations", default.without_optimizations()),
        ("no isospeed", ComputationSettings {
            use_convolution_isospeed_optimization: false,
            use_sub_additive_convolution_optimizations: false,
            ..default.clone()
        }),
        ("isospeed", ComputationSettings {
            use_convolution_isospeed_optimization: true,
            use_by_sequence_convolution_isospeed_optimization: true,
            use_convolution_super_isospeed_optimization: false,
            use_sub_additive_convolution_optimizations: false,
            ..default.clone()
        }),
        ("super isospeed", ComputationSettings {
            use_convolution_isospeed_optimization: true,
            use_by_sequence_convolution_isospeed_optimization: true,
            use_convolution_super_isospeed_optimization: true,
            use_sub_additive_convolution_optimizations: false,
            ..default.clone()
        }),
        ("serial", default.with_use_parallelism(false)),
        ("eager parallelism", ComputationSettings {
            parallel_envelope_threshold: 1,
            parallel_list_threshold: 1,
            convolution_parallelization_threshold: 1,
            convolution_partitioning_threshold: 16,
            parallel_compute_intervals_threshold: 1,
            ..default
        })
    ]
}
