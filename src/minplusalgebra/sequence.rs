use std::fmt;

use crate::minplusalgebra::computationsettings::ComputationSettings;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::interval::{
    compute_intervals,
    lower_envelope,
    sum,
    upper_envelope
};
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::segment::Segment;
use crate::numerics::rational::Rational;

/// Gap-free, time-ordered run of alternating points and segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Sequence {
    elements: Vec<Element>
}

impl Sequence {
    pub fn new(elements: Vec<Element>) -> Result<Sequence, CurveError> {
        if elements.is_empty() {
            return Err(CurveError::InvalidSequence("no elements".to_owned()));
        }
        for element in elements.iter() {
            if let Element::Point(point) = element {
                if !point.time().is_finite() {
                    return Err(CurveError::InvalidSequence(format!("point at {}", point.time())));
                }
            }
        }
        for pair in elements.windows(2) {
            let contiguous = match (&pair[0], &pair[1]) {
                (Element::Point(point), Element::Segment(segment)) => point.time() == segment.start_time(),
                (Element::Segment(segment), Element::Point(point)) => segment.end_time() == point.time(),
                _ => false
            };
            if !contiguous {
                return Err(CurveError::InvalidSequence(format!("{} is not followed by {}", pair[0], pair[1])));
            }
        }
        Ok(Sequence { elements })
    }

    /// Caller guarantees the elements already alternate without gaps.
    pub(crate) fn new_unchecked(elements: Vec<Element>) -> Sequence {
        Sequence { elements }
    }

    pub fn elements(&self) -> &Vec<Element> {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<Element> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn start_time(&self) -> &Rational {
        self.elements[0].start_time()
    }

    pub fn end_time(&self) -> &Rational {
        self.elements[self.elements.len() - 1].end_time()
    }

    pub fn is_left_closed(&self) -> bool {
        self.elements[0].is_point()
    }

    pub fn is_right_closed(&self) -> bool {
        self.elements[self.elements.len() - 1].is_point()
    }

    pub fn is_finite(&self) -> bool {
        self.elements.iter().all(Element::is_finite)
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.elements.iter().filter_map(|element| match element {
            Element::Point(point) => Some(point),
            Element::Segment(_) => None
        })
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.elements.iter().filter_map(|element| match element {
            Element::Segment(segment) => Some(segment),
            Element::Point(_) => None
        })
    }

    /// Index of the element covering `time`.
    pub fn element_index_at(&self, time: &Rational) -> Option<usize> {
        let index = self.elements.partition_point(|element| match element {
            Element::Point(point) => point.time() < time,
            Element::Segment(segment) => segment.end_time() <= time
        });
        match self.elements.get(index) {
            Some(element) if element.covers(time) => Some(index),
            _ => None
        }
    }

    pub fn element_at(&self, time: &Rational) -> Result<&Element, CurveError> {
        self.element_index_at(time)
            .map(|index| &self.elements[index])
            .ok_or_else(|| CurveError::OutOfDomain(time.to_string()))
    }

    pub fn value_at(&self, time: &Rational) -> Result<Rational, CurveError> {
        match self.element_at(time)? {
            Element::Point(point) => Ok(point.value().clone()),
            Element::Segment(segment) => Ok(segment.value_at(time))
        }
    }

    pub fn right_limit_at(&self, time: &Rational) -> Result<Rational, CurveError> {
        let index = self.element_index_at(time).ok_or_else(|| CurveError::OutOfDomain(time.to_string()))?;
        match (&self.elements[index], self.elements.get(index + 1)) {
            (Element::Segment(segment), _) => Ok(segment.value_at(time)),
            (Element::Point(_), Some(Element::Segment(next))) => Ok(next.right_limit_at_start_time().clone()),
            _ => Err(CurveError::OutOfDomain(format!("right of {}", time)))
        }
    }

    pub fn left_limit_at(&self, time: &Rational) -> Result<Rational, CurveError> {
        let index = self.element_index_at(time).ok_or_else(|| CurveError::OutOfDomain(time.to_string()))?;
        match &self.elements[index] {
            Element::Segment(segment) => Ok(segment.value_at(time)),
            Element::Point(_) if index > 0 => Ok(self.elements[index - 1].last_value()),
            Element::Point(_) => Err(CurveError::OutOfDomain(format!("left of {}", time)))
        }
    }

    /// Restriction to the interval between `start` and `end`, each bound
    /// included on request. Segments crossing an included bound are sampled
    /// there.
    pub fn cut(&self,
               start: &Rational,
               end: &Rational,
               start_included: bool,
               end_included: bool) -> Result<Sequence, CurveError> {
        let degenerate = start == end && start_included && end_included;
        if start > end || (start == end && !degenerate) {
            return Err(CurveError::OutOfDomain(format!("empty cut [{}, {}]", start, end)));
        }
        let starts_inside = start > self.start_time() || (start == self.start_time() && (self.is_left_closed() || !start_included));
        let ends_inside = end < self.end_time() || (end == self.end_time() && (self.is_right_closed() || !end_included));
        if !starts_inside || !ends_inside {
            return Err(CurveError::OutOfDomain(format!(
                "cut [{}, {}] of a sequence over [{}, {}]", start, end, self.start_time(), self.end_time()
            )));
        }

        let first = self.elements.partition_point(|element| element.end_time() < start);
        let mut result: Vec<Element> = Vec::new();
        for element in self.elements[first..].iter() {
            if element.start_time() > end {
                break;
            }
            match element {
                Element::Point(point) => {
                    let time = point.time();
                    let inside = (start < time && time < end) ||
                        (time == start && start_included) ||
                        (time == end && end_included);
                    if inside {
                        result.push(element.clone());
                    }
                },
                Element::Segment(segment) => {
                    if degenerate {
                        if segment.contains(start) {
                            result.push(Element::Point(segment.sample(start)?));
                        }
                        continue;
                    }
                    if start_included && segment.contains(start) {
                        result.push(Element::Point(segment.sample(start)?));
                    }
                    let low = if segment.start_time() > start { segment.start_time() } else { start };
                    let high = if segment.end_time() < end { segment.end_time() } else { end };
                    if low < high {
                        if low == segment.start_time() && high == segment.end_time() {
                            result.push(element.clone());
                        } else {
                            result.push(Element::Segment(segment.restrict(low, high)?));
                        }
                    }
                    if end_included && segment.contains(end) {
                        result.push(Element::Point(segment.sample(end)?));
                    }
                }
            }
        }
        Sequence::new(result)
    }

    pub fn translate(&self, delta_time: &Rational, delta_value: &Rational) -> Result<Sequence, CurveError> {
        let elements = self.elements.iter()
            .map(|element| element.translate(delta_time, delta_value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Sequence { elements })
    }

    pub fn negate(&self) -> Sequence {
        Sequence { elements: self.elements.iter().map(Element::negate).collect() }
    }

    pub fn scale(&self, factor: &Rational) -> Result<Sequence, CurveError> {
        let elements = self.elements.iter()
            .map(|element| element.scale(factor))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Sequence { elements })
    }

    /// Merges every segment-point-segment run that lies on one line without a
    /// jump. The result is the canonical form of the function.
    pub fn optimize(&self) -> Result<Sequence, CurveError> {
        let mut merged: Vec<Element> = Vec::with_capacity(self.elements.len());
        for element in self.elements.iter() {
            if let Element::Segment(next) = element {
                let length = merged.len();
                if length >= 2 {
                    let joined = match (&merged[length - 2], &merged[length - 1]) {
                        (Element::Segment(previous), Element::Point(point)) if previous.is_mergeable(point, next) => {
                            Some(previous.merge(next)?)
                        },
                        _ => None
                    };
                    if let Some(segment) = joined {
                        merged.truncate(length - 2);
                        merged.push(Element::Segment(segment));
                        continue;
                    }
                }
            }
            merged.push(element.clone());
        }
        Ok(Sequence { elements: merged })
    }

    /// Same function over the same domain.
    pub fn equivalent(&self, other: &Sequence) -> Result<bool, CurveError> {
        Ok(self.optimize()? == other.optimize()?)
    }

    fn envelope_domain(sequences: &[Sequence]) -> Result<(Rational, Rational, bool, bool), CurveError> {
        let first = sequences.first()
            .ok_or_else(|| CurveError::InvalidSequence("no operands".to_owned()))?;
        let start = first.start_time().clone();
        let end = first.end_time().clone();
        let left_closed = first.is_left_closed();
        let right_closed = first.is_right_closed();
        for sequence in sequences.iter() {
            if sequence.start_time() != &start || sequence.end_time() != &end ||
               sequence.is_left_closed() != left_closed || sequence.is_right_closed() != right_closed {
                return Err(CurveError::InvalidSequence("operands cover different domains".to_owned()));
            }
        }
        Ok((start, end, left_closed, right_closed))
    }

    fn all_elements(sequences: &[Sequence]) -> Vec<Element> {
        sequences.iter().flat_map(|sequence| sequence.elements.iter().cloned()).collect()
    }

    /// Pointwise minimum of sequences over a common domain.
    pub fn minimum(sequences: &[Sequence], settings: &ComputationSettings) -> Result<Sequence, CurveError> {
        Self::envelope_domain(sequences)?;
        let intervals = compute_intervals(&Self::all_elements(sequences), settings)?;
        Sequence::new(lower_envelope(&intervals, settings)?)
    }

    /// Pointwise maximum of sequences over a common domain.
    pub fn maximum(sequences: &[Sequence], settings: &ComputationSettings) -> Result<Sequence, CurveError> {
        Self::envelope_domain(sequences)?;
        let intervals = compute_intervals(&Self::all_elements(sequences), settings)?;
        Sequence::new(upper_envelope(&intervals, settings)?)
    }

    /// Pointwise sum of sequences over a common domain.
    pub fn addition(sequences: &[Sequence], settings: &ComputationSettings) -> Result<Sequence, CurveError> {
        Self::envelope_domain(sequences)?;
        let intervals = compute_intervals(&Self::all_elements(sequences), settings)?;
        Sequence::new(sum(&intervals, sequences.len(), settings)?)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: Vec<String> = self.elements.iter().map(|element| element.to_string()).collect();
        write!(f, "[{}]", text.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(value: i64) -> Rational {
        Rational::from(value)
    }

    fn ramp() -> Sequence {
        Sequence::new(vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::new(r(0), r(2), r(0), r(1)).unwrap()),
            Element::Point(Point::new(r(2), r(3))),
            Element::Segment(Segment::new(r(2), r(4), r(3), r(0)).unwrap())
        ]).unwrap()
    }

    #[test]
    fn rejects_gaps_and_repeated_kinds() {
        let gap = Sequence::new(vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::zero(r(1), r(2)).unwrap())
        ]);
        assert!(gap.is_err());
        let two_points = Sequence::new(vec![
            Element::Point(Point::origin()),
            Element::Point(Point::zero(r(1)))
        ]);
        assert!(two_points.is_err());
    }

    #[test]
    fn limits_around_a_jump() {
        let sequence = ramp();
        assert_eq!(sequence.value_at(&r(2)).unwrap(), r(3));
        assert_eq!(sequence.left_limit_at(&r(2)).unwrap(), r(2));
        assert_eq!(sequence.right_limit_at(&r(2)).unwrap(), r(3));
        assert_eq!(sequence.value_at(&Rational::new(1, 2)).unwrap(), Rational::new(1, 2));
        assert!(sequence.value_at(&r(4)).is_err());
    }

    #[test]
    fn cut_samples_interior_bounds() {
        let cut = ramp().cut(&r(1), &r(3), true, true).unwrap();
        assert_eq!(cut.len(), 5);
        assert_eq!(cut.start_time(), &r(1));
        assert_eq!(cut.value_at(&r(1)).unwrap(), r(1));
        assert_eq!(cut.value_at(&r(3)).unwrap(), r(3));
        assert!(ramp().cut(&r(1), &r(4), false, true).is_err());
    }

    #[test]
    fn optimize_merges_collinear_pieces() {
        let split = Sequence::new(vec![
            Element::Point(Point::origin()),
            Element::Segment(Segment::new(r(0), r(1), r(0), r(2)).unwrap()),
            Element::Point(Point::new(r(1), r(2))),
            Element::Segment(Segment::new(r(1), r(3), r(2), r(2)).unwrap())
        ]).unwrap();
        let optimized = split.optimize().unwrap();
        assert_eq!(optimized.len(), 2);
        assert!(split.equivalent(&optimized).unwrap());
    }
}
