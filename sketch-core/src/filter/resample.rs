//! Resampling by arclength and by time.

use serde::{Deserialize, Serialize};

use super::StrokeFilter;
use crate::error::{SketchError, SketchResult};
use crate::geometry::{distance, EPSILON};
use crate::stroke::{Stroke, TimedPoint};

/// Resamples a stroke to exactly `num_points` samples at equal arclength spacing.
///
/// Each emitted sample carries the timestamp of the original sample that
/// ends the segment it lies on. When floating-point drift leaves the walk one
/// sample short or long, the last sample is forced onto the true endpoint.
/// When the walk falls two or more samples short (for example a stroke with
/// zero arclength), the remainder is extrapolated along the final direction.
#[derive(Debug, Clone, Copy)]
pub struct PointCountFilter {
    num_points: usize,
}

impl PointCountFilter {
    /// Create a filter producing `num_points` samples.
    #[must_use]
    pub const fn new(num_points: usize) -> Self {
        Self { num_points }
    }

    /// Requested number of samples.
    #[must_use]
    pub const fn num_points(&self) -> usize {
        self.num_points
    }

    /// Resample the stroke.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidParameter`] if fewer than 2 points are requested.
    pub fn resample(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        let n = self.num_points;
        if n < 2 {
            return Err(SketchError::InvalidParameter(format!(
                "num_points must be at least 2, got {n}"
            )));
        }
        let pts = stroke.points();
        match pts {
            [] => return Ok(Stroke::new()),
            [only] => return Ok(Stroke::from_points(vec![*only; n])),
            _ => {}
        }

        #[allow(clippy::cast_precision_loss)]
        let interval = stroke.path_length() / (n - 1) as f64;
        let mut out = vec![pts[0]];
        let mut acc = 0.0;

        if interval > EPSILON {
            for w in pts.windows(2) {
                let (mut from, to) = (w[0], w[1]);
                let mut d = distance(from.point(), to.point());
                while d > EPSILON && acc + d >= interval {
                    let ratio = (interval - acc) / d;
                    let q = TimedPoint::new(
                        from.x + ratio * (to.x - from.x),
                        from.y + ratio * (to.y - from.y),
                        to.t,
                    );
                    out.push(q);
                    from = q;
                    d = distance(from.point(), to.point());
                    acc = 0.0;
                }
                acc += d;
            }
        }

        let last = pts[pts.len() - 1];
        if out.len() > n {
            out.truncate(n);
            out[n - 1] = last;
        } else if out.len() + 1 == n {
            out.push(last);
        } else if out.len() < n {
            tracing::debug!(
                produced = out.len(),
                wanted = n,
                "resample walk fell short, extrapolating"
            );
            pad_by_extrapolation(&mut out, n, interval);
        }
        Ok(Stroke::from_points(out))
    }
}

/// Extend `out` to `target` samples along its final direction, `spacing` apart.
///
/// With no usable direction the last sample is repeated.
fn pad_by_extrapolation(out: &mut Vec<TimedPoint>, target: usize, spacing: f64) {
    let Some(&last) = out.last() else {
        return;
    };
    let step = match out.len() {
        0 | 1 => None,
        len => last.point().sub(out[len - 2].point()).normalize(),
    }
    .map(|dir| dir.scale(spacing));

    let mut cur = last;
    while out.len() < target {
        if let Some(step) = step {
            cur = TimedPoint::new(cur.x + step.x, cur.y + step.y, cur.t);
        }
        out.push(cur);
    }
}

impl StrokeFilter for PointCountFilter {
    fn apply(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        self.resample(stroke)
    }
}

/// Configuration for [`TimeStepFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeStepConfig {
    /// Time between output samples in milliseconds.
    pub step_ms: u64,
}

impl Default for TimeStepConfig {
    fn default() -> Self {
        Self { step_ms: 10 }
    }
}

/// Resamples a stroke at fixed time increments by linear interpolation
/// between the two samples bracketing each target time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeStepFilter {
    config: TimeStepConfig,
}

impl TimeStepFilter {
    /// Create with custom configuration.
    #[must_use]
    pub const fn with_config(config: TimeStepConfig) -> Self {
        Self { config }
    }

    /// Resample the stroke.
    ///
    /// Targets run from the first timestamp in steps of `step_ms` up to the
    /// last timestamp, and stop early if the next target would overflow.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::NotEnoughPoints`] when the stroke has fewer
    /// than two samples, and [`SketchError::InvalidParameter`] for a zero
    /// step or timestamps that go backwards.
    pub fn resample(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        let step = self.config.step_ms;
        if step == 0 {
            return Err(SketchError::InvalidParameter(
                "step_ms must be positive".to_string(),
            ));
        }
        let pts = stroke.points();
        if pts.len() < 2 {
            return Err(SketchError::NotEnoughPoints {
                needed: 2,
                found: pts.len(),
            });
        }
        if let Some(i) = pts.windows(2).position(|w| w[1].t < w[0].t) {
            return Err(SketchError::InvalidParameter(format!(
                "timestamps decrease at sample {}",
                i + 1
            )));
        }

        let last = pts.len() - 1;
        let t_end = pts[last].t;
        let mut out = Vec::new();
        let mut j = 1;
        let mut target = Some(pts[0].t);
        while let Some(t) = target.filter(|&t| t <= t_end) {
            // The last sample is at or past every target.
            while j < last && pts[j].t < t {
                j += 1;
            }
            out.push(interpolate_at(pts[j - 1], pts[j], t));
            target = t.checked_add(step);
        }
        Ok(Stroke::from_points(out))
    }
}

/// Sample on segment `a`-`b` at time `t`, clamped to the segment.
#[allow(clippy::cast_precision_loss)]
fn interpolate_at(a: TimedPoint, b: TimedPoint, t: u64) -> TimedPoint {
    let span = b.t.saturating_sub(a.t);
    if span == 0 {
        return TimedPoint::new(b.x, b.y, t);
    }
    let ratio = (t.saturating_sub(a.t) as f64 / span as f64).clamp(0.0, 1.0);
    TimedPoint::new(a.x + ratio * (b.x - a.x), a.y + ratio * (b.y - a.y), t)
}

impl StrokeFilter for TimeStepFilter {
    fn apply(&self, stroke: &Stroke) -> SketchResult<Stroke> {
        self.resample(stroke)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use proptest::prelude::*;

    fn close(a: Point, b: Point) -> bool {
        distance(a, b) < 1e-6
    }

    #[test]
    fn test_resample_straight_line() {
        let stroke = Stroke::from_triples(&[(0.0, 0.0, 0), (10.0, 0.0, 10), (30.0, 0.0, 20)]);
        let out = PointCountFilter::new(4).resample(&stroke).unwrap();
        assert_eq!(out.vertex_count(), 4);
        let xs: Vec<f64> = out.points().iter().map(|p| p.x).collect();
        for (x, want) in xs.iter().zip([0.0, 10.0, 20.0, 30.0]) {
            assert!((x - want).abs() < 1e-9);
        }
        assert_eq!(out.points()[2].t, 20);
    }

    #[test]
    fn test_resample_zero_length_pads() {
        let stroke = Stroke::from_triples(&[(5.0, 5.0, 0), (5.0, 5.0, 10), (5.0, 5.0, 20)]);
        let out = PointCountFilter::new(6).resample(&stroke).unwrap();
        assert_eq!(out.vertex_count(), 6);
        assert!(out.points().iter().all(|p| close(p.point(), Point::new(5.0, 5.0))));
    }

    #[test]
    fn test_padding_extrapolates_along_final_direction() {
        let mut out = vec![TimedPoint::new(0.0, 0.0, 0), TimedPoint::new(1.0, 0.0, 7)];
        pad_by_extrapolation(&mut out, 4, 2.0);
        assert_eq!(out.len(), 4);
        assert!(close(out[2].point(), Point::new(3.0, 0.0)));
        assert!(close(out[3].point(), Point::new(5.0, 0.0)));
        assert_eq!(out[3].t, 7);
    }

    #[test]
    fn test_resample_degenerate_inputs() {
        assert!(PointCountFilter::new(1).resample(&Stroke::new()).is_err());
        assert!(PointCountFilter::new(3).resample(&Stroke::new()).unwrap().is_empty());
        let single = Stroke::from_triples(&[(1.0, 2.0, 3)]);
        assert_eq!(PointCountFilter::new(3).resample(&single).unwrap().vertex_count(), 3);
    }

    #[test]
    fn test_time_step_resample() {
        let stroke = Stroke::from_triples(&[(0.0, 0.0, 0), (10.0, 0.0, 20), (10.0, 30.0, 50)]);
        let out = TimeStepFilter::default().resample(&stroke).unwrap();
        let times: Vec<u64> = out.points().iter().map(|p| p.t).collect();
        assert_eq!(times, vec![0, 10, 20, 30, 40, 50]);
        assert!(close(out.points()[1].point(), Point::new(5.0, 0.0)));
        assert!(close(out.points()[3].point(), Point::new(10.0, 10.0)));
        assert!(close(out.points()[5].point(), Point::new(10.0, 30.0)));
    }

    #[test]
    fn test_time_step_needs_two_points() {
        let single = Stroke::from_triples(&[(0.0, 0.0, 0)]);
        let err = TimeStepFilter::default().resample(&single).unwrap_err();
        assert!(matches!(err, SketchError::NotEnoughPoints { needed: 2, found: 1 }));

        let zero = TimeStepFilter::with_config(TimeStepConfig { step_ms: 0 });
        assert!(matches!(
            zero.resample(&single),
            Err(SketchError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_time_step_rejects_decreasing_timestamps() {
        let stroke = Stroke::from_triples(&[(0.0, 0.0, 0), (5.0, 0.0, 50), (10.0, 0.0, 20)]);
        let err = TimeStepFilter::default().resample(&stroke).unwrap_err();
        assert!(matches!(err, SketchError::InvalidParameter(_)));
    }

    #[test]
    fn test_time_step_stops_before_overflow() {
        let end = u64::MAX;
        let stroke = Stroke::from_triples(&[(0.0, 0.0, end - 15), (30.0, 0.0, end)]);
        let out = TimeStepFilter::default().resample(&stroke).unwrap();
        let times: Vec<u64> = out.points().iter().map(|p| p.t).collect();
        assert_eq!(times, vec![end - 15, end - 5]);
        assert!(close(out.points()[1].point(), Point::new(20.0, 0.0)));
    }

    fn arb_stroke() -> impl Strategy<Value = Stroke> {
        prop::collection::vec((-200.0f64..200.0, -200.0f64..200.0), 2..50).prop_map(|pts| {
            pts.into_iter()
                .enumerate()
                .map(|(i, (x, y))| TimedPoint::new(x, y, i as u64 * 10))
                .collect::<Stroke>()
        })
    }

    proptest! {
        #[test]
        fn prop_exact_count_and_endpoints(stroke in arb_stroke(), n in 2usize..64) {
            let out = PointCountFilter::new(n).resample(&stroke).unwrap();
            prop_assert_eq!(out.vertex_count(), n);
            let first = stroke.first().unwrap().point();
            prop_assert!(close(out.first().unwrap().point(), first));
            // Padding only happens for zero-length strokes, which this
            // strategy practically never produces.
            if stroke.path_length() > 1e-3 {
                let last = stroke.last().unwrap().point();
                prop_assert!(distance(out.last().unwrap().point(), last) < 1e-6 * stroke.path_length().max(1.0));
            }
        }
    }
}
