use rayon::prelude::*;
use tracing::trace;

use crate::minplusalgebra::computationsettings::ComputationSettings;
use crate::minplusalgebra::curveerror::CurveError;
use crate::minplusalgebra::element::Element;
use crate::minplusalgebra::point::Point;
use crate::minplusalgebra::segment::Segment;
use crate::numerics::rational::Rational;

// ─────────────────────────────────────────────────────────────────────────────
// Interval
// ─────────────────────────────────────────────────────────────────────────────

/// One cell of an interval partition: either the instant `[start]` or the
/// open interval `(start, end)`, with every element restricted to it.
#[derive(Clone, Debug)]
pub struct Interval {
    start: Rational,
    end: Rational,
    elements: Vec<Element>
}

impl Interval {
    fn point(time: Rational) -> Interval {
        Interval { start: time.clone(), end: time, elements: Vec::new() }
    }

    fn open(start: Rational, end: Rational) -> Interval {
        Interval { start, end, elements: Vec::new() }
    }

    pub fn start(&self) -> &Rational {
        &self.start
    }

    pub fn end(&self) -> &Rational {
        &self.end
    }

    pub fn elements(&self) -> &Vec<Element> {
        &self.elements
    }

    pub fn is_point_interval(&self) -> bool {
        self.start == self.end
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Partition
// ─────────────────────────────────────────────────────────────────────────────

fn restrict_element(element: &Element, times: &[Rational]) -> Result<Vec<(usize, Element)>, CurveError> {
    let position = |time: &Rational| -> Result<usize, CurveError> {
        times.binary_search(time)
            .map_err(|_| CurveError::OutOfDomain(format!("breakpoint {}", time)))
    };
    match element {
        Element::Point(point) => Ok(vec![(2 * position(point.time())?, element.clone())]),
        Element::Segment(segment) => {
            let first = position(segment.start_time())?;
            let last = position(segment.end_time())?;
            let mut pieces = Vec::with_capacity(2 * (last - first));
            for k in first..last {
                if k > first {
                    pieces.push((2 * k, Element::Point(segment.sample(&times[k])?)));
                }
                let piece = segment.restrict(&times[k], &times[k + 1])?;
                pieces.push((2 * k + 1, Element::Segment(piece)));
            }
            Ok(pieces)
        }
    }
}

/// Partitions the union of the domains of `elements` at every boundary time
/// and restricts each element to the cells it covers.
pub fn compute_intervals(elements: &[Element], settings: &ComputationSettings) -> Result<Vec<Interval>, CurveError> {
    let parallel = settings.use_parallel_compute_intervals &&
        elements.len() > settings.parallel_compute_intervals_threshold;

    let mut times: Vec<Rational> = elements.iter()
        .flat_map(|element| {
            match element {
                Element::Point(point) => vec![point.time().clone()],
                Element::Segment(segment) => vec![segment.start_time().clone(), segment.end_time().clone()]
            }
        })
        .collect();
    if parallel && settings.use_parallel_sort_elements {
        times.par_sort_unstable();
    } else {
        times.sort_unstable();
    }
    times.dedup();

    if times.is_empty() {
        return Ok(Vec::new());
    }

    let mut intervals: Vec<Interval> = Vec::with_capacity(2 * times.len() - 1);
    for (i, time) in times.iter().enumerate() {
        intervals.push(Interval::point(time.clone()));
        if i + 1 < times.len() {
            intervals.push(Interval::open(time.clone(), times[i + 1].clone()));
        }
    }

    let pieces: Vec<Vec<(usize, Element)>> = if parallel && settings.use_parallel_insertion_compute_intervals {
        elements.par_iter()
            .map(|element| restrict_element(element, &times))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        elements.iter()
            .map(|element| restrict_element(element, &times))
            .collect::<Result<Vec<_>, _>>()?
    };
    for (index, piece) in pieces.into_iter().flatten() {
        intervals[index].elements.push(piece);
    }

    trace!(elements = elements.len(), intervals = intervals.len(), "computed interval partition");
    Ok(intervals)
}

// ─────────────────────────────────────────────────────────────────────────────
// Envelopes
// ─────────────────────────────────────────────────────────────────────────────

fn lower_envelope_of_lines(start: &Rational,
                           end: &Rational,
                           segments: &[&Segment]) -> Result<Vec<Element>, CurveError> {
    if segments.iter().any(|segment| segment.is_minus_infinite()) {
        return Ok(vec![Element::Segment(Segment::minus_infinite(start.clone(), end.clone())?)]);
    }
    let lines: Vec<&Segment> = segments.iter()
        .copied()
        .filter(|segment| segment.is_finite())
        .collect();
    let first = lines.iter()
        .copied()
        .min_by(|lhs, rhs| {
            lhs.right_limit_at_start_time().cmp(rhs.right_limit_at_start_time())
                .then_with(|| lhs.slope().cmp(rhs.slope()))
        });
    let mut current = match first {
        Some(line) => line,
        None => return Ok(vec![Element::Segment(Segment::plus_infinite(start.clone(), end.clone())?)])
    };

    let mut result: Vec<Element> = Vec::new();
    let mut time = start.clone();
    loop {
        let mut next: Option<(Rational, &Segment)> = None;
        for line in lines.iter().copied() {
            if line.slope() >= current.slope() {
                continue;
            }
            let crossing = start + (line.right_limit_at_start_time() - current.right_limit_at_start_time()) /
                (current.slope() - line.slope());
            if crossing <= time || &crossing >= end {
                continue;
            }
            let better = match &next {
                None => true,
                Some((best_time, best_line)) => {
                    crossing < *best_time || (&crossing == best_time && line.slope() < best_line.slope())
                }
            };
            if better {
                next = Some((crossing, line));
            }
        }
        match next {
            None => {
                result.push(Element::Segment(Segment::new(
                    time.clone(), end.clone(), current.value_at(&time), current.slope().clone()
                )?));
                break;
            },
            Some((crossing, line)) => {
                result.push(Element::Segment(Segment::new(
                    time.clone(), crossing.clone(), current.value_at(&time), current.slope().clone()
                )?));
                result.push(Element::Point(Point::new(crossing.clone(), current.value_at(&crossing))));
                current = line;
                time = crossing;
            }
        }
    }
    Ok(result)
}

fn lower_envelope_of(interval: &Interval) -> Result<Vec<Element>, CurveError> {
    if interval.is_empty() {
        return Ok(Vec::new());
    }
    if interval.is_point_interval() {
        let value = interval.elements.iter()
            .map(|element| element.first_value())
            .min()
            .unwrap_or(Rational::PlusInfinity);
        return Ok(vec![Element::Point(Point::new(interval.start.clone(), value))]);
    }
    let segments: Vec<&Segment> = interval.elements.iter()
        .filter_map(|element| match element {
            Element::Segment(segment) => Some(segment),
            Element::Point(_) => None
        })
        .collect();
    lower_envelope_of_lines(&interval.start, &interval.end, &segments)
}

fn upper_envelope_of(interval: &Interval) -> Result<Vec<Element>, CurveError> {
    let negated = Interval {
        start: interval.start.clone(),
        end: interval.end.clone(),
        elements: interval.elements.iter().map(Element::negate).collect()
    };
    Ok(lower_envelope_of(&negated)?.iter().map(Element::negate).collect())
}

fn sum_of(interval: &Interval, operands: usize) -> Result<Vec<Element>, CurveError> {
    if interval.elements.len() != operands || operands == 0 {
        return Ok(Vec::new());
    }
    if interval.is_point_interval() {
        let mut value = Rational::zero();
        for element in interval.elements.iter() {
            value = value.checked_add(&element.first_value())?;
        }
        return Ok(vec![Element::Point(Point::new(interval.start.clone(), value))]);
    }
    let mut right_limit = Rational::zero();
    let mut slope = Rational::zero();
    for element in interval.elements.iter() {
        if let Element::Segment(segment) = element {
            right_limit = right_limit.checked_add(segment.right_limit_at_start_time())?;
            slope = &slope + segment.slope();
        }
    }
    Ok(vec![Element::Segment(Segment::new(interval.start.clone(), interval.end.clone(), right_limit, slope)?)])
}

fn apply_per_interval<F>(intervals: &[Interval], parallel: bool, operation: F) -> Result<Vec<Element>, CurveError>
    where F: Fn(&Interval) -> Result<Vec<Element>, CurveError> + Sync {
    let per_interval: Vec<Vec<Element>> = if parallel {
        intervals.par_iter().map(&operation).collect::<Result<Vec<_>, _>>()?
    } else {
        intervals.iter().map(&operation).collect::<Result<Vec<_>, _>>()?
    };
    Ok(per_interval.into_iter().flatten().collect())
}

/// Pointwise minimum of the elements in each interval. Empty intervals are
/// skipped, so the result has gaps where no element was present.
pub fn lower_envelope(intervals: &[Interval], settings: &ComputationSettings) -> Result<Vec<Element>, CurveError> {
    let parallel = settings.use_parallel_lower_envelope && intervals.len() > settings.parallel_envelope_threshold;
    apply_per_interval(intervals, parallel, lower_envelope_of)
}

/// Pointwise maximum of the elements in each interval.
pub fn upper_envelope(intervals: &[Interval], settings: &ComputationSettings) -> Result<Vec<Element>, CurveError> {
    let parallel = settings.use_parallel_upper_envelope && intervals.len() > settings.parallel_envelope_threshold;
    apply_per_interval(intervals, parallel, upper_envelope_of)
}

/// Pointwise sum over the intervals covered by all `operands` inputs.
pub fn sum(intervals: &[Interval], operands: usize, settings: &ComputationSettings) -> Result<Vec<Element>, CurveError> {
    let parallel = settings.use_parallel_list_addition && intervals.len() > settings.parallel_envelope_threshold;
    apply_per_interval(intervals, parallel, |interval| sum_of(interval, operands))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: i64, end: i64, right_limit: i64, slope: i64) -> Element {
        Element::Segment(Segment::new(Rational::from(start), Rational::from(end), Rational::from(right_limit), Rational::from(slope)).unwrap())
    }

    #[test]
    fn envelope_of_crossing_lines_inserts_the_crossing() {
        let elements = vec![seg(0, 4, 0, 1), seg(0, 4, 2, 0)];
        let intervals = compute_intervals(&elements, ComputationSettings::default_settings()).unwrap();
        assert_eq!(intervals.len(), 3);
        let lower = lower_envelope(&intervals, ComputationSettings::default_settings()).unwrap();
        assert_eq!(lower, vec![
            seg(0, 2, 0, 1),
            Element::Point(Point::new(Rational::from(2), Rational::from(2))),
            seg(2, 4, 2, 0)
        ]);
    }

    #[test]
    fn upper_envelope_keeps_the_larger_line() {
        let elements = vec![seg(0, 4, 0, 1), seg(0, 4, 2, 0)];
        let intervals = compute_intervals(&elements, ComputationSettings::default_settings()).unwrap();
        let upper = upper_envelope(&intervals, ComputationSettings::default_settings()).unwrap();
        assert_eq!(upper, vec![
            seg(0, 2, 2, 0),
            Element::Point(Point::new(Rational::from(2), Rational::from(2))),
            seg(2, 4, 2, 1)
        ]);
    }

    #[test]
    fn sum_only_covers_the_common_domain() {
        let elements = vec![seg(0, 4, 1, 1), seg(2, 6, 0, 2)];
        let intervals = compute_intervals(&elements, ComputationSettings::default_settings()).unwrap();
        let total = sum(&intervals, 2, ComputationSettings::default_settings()).unwrap();
        assert_eq!(total, vec![seg(2, 4, 3, 3)]);
    }
}
