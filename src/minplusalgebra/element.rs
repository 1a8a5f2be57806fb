use std::fmt;

use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::segment::Segment;
use crate::numerics::rational::Rational;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Element {
    Point(Point),
    Segment(Segment)
}

impl Element {
    pub fn start_time(&self) -> &Rational {
        match self {
            Element::Point(point) => point.time(),
            Element::Segment(segment) => segment.start_time()
        }
    }

    pub fn end_time(&self) -> &Rational {
        match self {
            Element::Point(point) => point.time(),
            Element::Segment(segment) => segment.end_time()
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Element::Point(_))
    }

    pub fn is_segment(&self) -> bool {
        matches!(self, Element::Segment(_))
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Element::Point(point) => point.is_finite(),
            Element::Segment(segment) => segment.is_finite()
        }
    }

    pub fn is_plus_infinite(&self) -> bool {
        match self {
            Element::Point(point) => point.is_plus_infinite(),
            Element::Segment(segment) => segment.is_plus_infinite()
        }
    }

    pub fn is_minus_infinite(&self) -> bool {
        match self {
            Element::Point(point) => point.is_minus_infinite(),
            Element::Segment(segment) => segment.is_minus_infinite()
        }
    }

    /// Value right after the start of the element (the value itself for a point).
    pub fn first_value(&self) -> Rational {
        match self {
            Element::Point(point) => point.value().clone(),
            Element::Segment(segment) => segment.right_limit_at_start_time().clone()
        }
    }

    /// Value right before the end of the element (the value itself for a point).
    pub fn last_value(&self) -> Rational {
        match self {
            Element::Point(point) => point.value().clone(),
            Element::Segment(segment) => segment.left_limit_at_end_time()
        }
    }

    /// True when `time` lies in the element: the instant of a point, the open
    /// interval of a segment.
    pub fn covers(&self, time: &Rational) -> bool {
        match self {
            Element::Point(point) => point.time() == time,
            Element::Segment(segment) => segment.contains(time)
        }
    }

    pub fn translate(&self, delta_time: &Rational, delta_value: &Rational) -> Result<Element, CurveError> {
        match self {
            Element::Point(point) => Ok(Element::Point(point.translate(delta_time, delta_value)?)),
            Element::Segment(segment) => Ok(Element::Segment(segment.translate(delta_time, delta_value)?))
        }
    }

    pub fn negate(&self) -> Element {
        match self {
            Element::Point(point) => Element::Point(point.negate()),
            Element::Segment(segment) => Element::Segment(segment.negate())
        }
    }

    pub fn scale(&self, factor: &Rational) -> Result<Element, CurveError> {
        match self {
            Element::Point(point) => Ok(Element::Point(point.scale(factor)?)),
            Element::Segment(segment) => Ok(Element::Segment(segment.scale(factor)?))
        }
    }
}

impl From<Point> for Element {
    fn from(point: Point) -> Self {
        Element::Point(point)
    }
}

impl From<Segment> for Element {
    fn from(segment: Segment) -> Self {
        Element::Segment(segment)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Point(point) => point.fmt(f),
            Element::Segment(segment) => segment.fmt(f)
        }
    }
}
