//! Half-open time ranges.
//!
//! A [`TimeRange`] is `[start, end)` over two timecodes sharing a frame rate.
//! Construction puts the ends in order and rejects empty ranges, so every
//! range has a positive duration. The duration is computed once, up front;
//! ranges whose length does not fit a [`Rational`] are refused.

use crate::error::{Result, TimecodeError};
use crate::frame_rate::FrameRate;
use crate::timecode::{Timecode, TimecodeOptions, TimecodeValue};
use framecode_core::Rational;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// A half-open interval `[start, end)` of timecodes at one frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange", into = "RawTimeRange")]
pub struct TimeRange {
    start: Timecode,
    end: Timecode,
    length: Rational,
}

#[derive(Serialize, Deserialize)]
struct RawTimeRange {
    start: Timecode,
    end: Timecode,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = TimecodeError;

    fn try_from(raw: RawTimeRange) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl From<TimeRange> for RawTimeRange {
    fn from(range: TimeRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

impl TimeRange {
    /// Create a range from two timecodes, swapping them if `start > end`.
    pub fn new(start: Timecode, end: Timecode) -> Result<Self> {
        if start.fps() != end.fps() {
            return Err(TimecodeError::range_fps(start.fps(), end.fps()));
        }
        let (start, end) = if start.precise_timestamp() > end.precise_timestamp() {
            (end, start)
        } else {
            (start, end)
        };
        let range = Self::from_bounds(start, end)?;
        debug!(start = %start, end = %end, fps = %start.fps(), "Created time range");
        Ok(range)
    }

    /// Create a range from raw values resolved with `options`.
    pub fn parse(
        start: impl Into<TimecodeValue>,
        end: impl Into<TimecodeValue>,
        options: &TimecodeOptions,
    ) -> Result<Self> {
        let start = resolve_endpoint(start.into(), options)?;
        let end = resolve_endpoint(end.into(), options)?;
        Self::new(start, end)
    }

    fn from_bounds(start: Timecode, end: Timecode) -> Result<Self> {
        if end.precise_timestamp() <= start.precise_timestamp() {
            return Err(TimecodeError::range_value(format!(
                "[{start}, {end}) has no positive duration"
            )));
        }
        let length = end
            .precise_timestamp()
            .checked_sub(start.precise_timestamp())
            .filter(|length| start.try_with_seconds(*length).is_some())
            .ok_or_else(|| {
                TimecodeError::range_value(format!(
                    "[{start}, {end}) has a duration too precise to represent"
                ))
            })?;
        Ok(Self { start, end, length })
    }

    /// First instant inside the range.
    #[must_use]
    pub fn start(&self) -> Timecode {
        self.start
    }

    /// First instant after the range.
    #[must_use]
    pub fn end(&self) -> Timecode {
        self.end
    }

    /// Shared frame rate.
    #[must_use]
    pub fn fps(&self) -> FrameRate {
        self.start.fps()
    }

    /// `end - start`, as a timecode of the start's kind.
    #[must_use]
    pub fn duration(&self) -> Timecode {
        self.start.with_seconds(self.length)
    }

    /// Duration in frames.
    #[must_use]
    pub fn framecount(&self) -> i64 {
        self.duration().framecount()
    }

    /// Whether `start <= tc < end`.
    pub fn contains(&self, tc: &Timecode) -> Result<bool> {
        self.require_fps(tc.fps())?;
        let t = tc.precise_timestamp();
        Ok(self.start.precise_timestamp() <= t && t < self.end.precise_timestamp())
    }

    /// Whether `other` lies entirely inside this range.
    pub fn contains_range(&self, other: &Self) -> Result<bool> {
        self.require_fps(other.fps())?;
        Ok(self.start.precise_timestamp() <= other.start.precise_timestamp()
            && other.end.precise_timestamp() <= self.end.precise_timestamp())
    }

    /// Whether the two ranges share any instant.
    pub fn overlaps(&self, other: &Self) -> Result<bool> {
        self.require_fps(other.fps())?;
        Ok(self.start.precise_timestamp() < other.end.precise_timestamp()
            && other.start.precise_timestamp() < self.end.precise_timestamp())
    }

    /// The common part of two ranges, or `None` if they only touch or are
    /// disjoint.
    pub fn intersect(&self, other: &Self) -> Result<Option<Self>> {
        if !self.overlaps(other)? {
            return Ok(None);
        }
        let start = later(self.start, other.start);
        let end = earlier(self.end, other.end);
        debug!(start = %start, end = %end, "Intersected time ranges");
        Self::from_bounds(start, end).map(Some)
    }

    /// The hull of two overlapping or adjacent ranges.
    pub fn union(&self, other: &Self) -> Result<Self> {
        let adjacent = self.end == other.start || other.end == self.start;
        if !self.overlaps(other)? && !adjacent {
            return Err(TimecodeError::range_value(format!(
                "{self} and {other} neither overlap nor touch"
            )));
        }
        Self::from_bounds(earlier(self.start, other.start), later(self.end, other.end))
    }

    /// Move both ends by `delta` (frames for an integer, seconds for a
    /// float, or any timecode literal).
    ///
    /// On a strict range, a move across midnight is a range error.
    pub fn offset(&self, delta: impl Into<TimecodeValue>) -> Result<Self> {
        let delta = self.delta_seconds(delta.into())?;
        Self::from_bounds(
            self.moved(self.start, sum(self.start.precise_timestamp(), delta)?)?,
            self.moved(self.end, sum(self.end.precise_timestamp(), delta)?)?,
        )
    }

    /// Move the end later by `delta`.
    pub fn extend(&self, delta: impl Into<TimecodeValue>) -> Result<Self> {
        let delta = self.delta_seconds(delta.into())?;
        self.with_end(sum(self.end.precise_timestamp(), delta)?)
    }

    /// Move the end earlier by `delta`.
    pub fn shorten(&self, delta: impl Into<TimecodeValue>) -> Result<Self> {
        let delta = self.delta_seconds(delta.into())?;
        self.with_end(sum(self.end.precise_timestamp(), -delta)?)
    }

    /// Scale the duration by `factor`, keeping the start.
    pub fn retime(&self, factor: f64) -> Result<Self> {
        let factor = Rational::from_f64(factor)?;
        if !factor.is_positive() {
            return Err(TimecodeError::range_value(format!(
                "cannot retime {self} by {factor}"
            )));
        }
        let length = self.length.checked_mul(factor).ok_or_else(|| {
            TimecodeError::range_value(format!("retiming {self} by {factor} overflows"))
        })?;
        self.with_end(sum(self.start.precise_timestamp(), length)?)
    }

    /// Split into `parts` ranges of equal duration.
    pub fn separate(&self, parts: usize) -> Result<Vec<Self>> {
        if parts < 2 {
            return Err(TimecodeError::range_value(format!(
                "cannot separate {self} into {parts} parts"
            )));
        }
        let too_fine = || {
            TimecodeError::range_value(format!(
                "{self} cannot be split into {parts} representable parts"
            ))
        };
        let step = self
            .length
            .checked_div(Rational::from_int(parts as i64))
            .ok_or_else(too_fine)?;
        let start = self.start.precise_timestamp();
        let bound = |i: usize| -> Result<Timecode> {
            if i == parts {
                return Ok(self.end);
            }
            let offset = step
                .checked_mul(Rational::from_int(i as i64))
                .ok_or_else(too_fine)?;
            self.moved(self.start, sum(start, offset)?)
        };
        (0..parts)
            .map(|i| Self::from_bounds(bound(i)?, bound(i + 1)?))
            .collect()
    }

    /// Every frame that starts inside the range.
    pub fn frames(&self) -> impl Iterator<Item = Timecode> {
        let fps = self.fps().as_rational();
        let origin = self.start;
        let first = self.start.precise_timestamp().mul_ceil(fps);
        let last = self.end.precise_timestamp().mul_ceil(fps);
        (first..last).map_while(move |frame| {
            Rational::from_int(frame)
                .checked_div(fps)
                .and_then(|seconds| origin.try_with_seconds(seconds))
        })
    }

    fn with_end(&self, end: Rational) -> Result<Self> {
        Self::from_bounds(self.start, self.moved(self.end, end)?)
    }

    /// `tc` moved to `seconds`, or a range error if it no longer fits.
    fn moved(&self, tc: Timecode, seconds: Rational) -> Result<Timecode> {
        tc.try_with_seconds(seconds).ok_or_else(|| {
            TimecodeError::range_value(format!("{self} cannot reach {seconds}s"))
        })
    }

    fn require_fps(&self, fps: FrameRate) -> Result<()> {
        if self.fps() != fps {
            return Err(TimecodeError::range_fps(self.fps(), fps));
        }
        Ok(())
    }

    fn delta_seconds(&self, delta: TimecodeValue) -> Result<Rational> {
        let options = self.start.options().with_kind(None).with_strict(false);
        resolve_endpoint(delta, &options).map(|tc| tc.precise_timestamp())
    }
}

fn resolve_endpoint(value: TimecodeValue, options: &TimecodeOptions) -> Result<Timecode> {
    let literal = value.to_string();
    Timecode::with_options(value, options)
        .map_err(|err| TimecodeError::range_type(literal, err.to_string()))
}

fn sum(seconds: Rational, delta: Rational) -> Result<Rational> {
    seconds
        .checked_add(delta)
        .ok_or_else(|| TimecodeError::range_value(format!("{seconds} + {delta} overflows")))
}

fn earlier(a: Timecode, b: Timecode) -> Timecode {
    if b.precise_timestamp() < a.precise_timestamp() {
        b
    } else {
        a
    }
}

fn later(a: Timecode, b: Timecode) -> Timecode {
    if b.precise_timestamp() > a.precise_timestamp() {
        b
    } else {
        a
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn range(start: &str, end: &str) -> TimeRange {
        TimeRange::parse(start, end, &TimecodeOptions::default()).unwrap()
    }

    fn tc(text: &str) -> Timecode {
        Timecode::new(text, FrameRate::FPS_24).unwrap()
    }

    #[test]
    fn test_overlap_and_intersection() {
        let a = range("01:00:00:00", "02:00:00:00");
        let b = range("01:30:00:00", "02:30:00:00");
        assert!(a.overlaps(&b).unwrap());
        assert!(b.overlaps(&a).unwrap());

        let common = a.intersect(&b).unwrap().unwrap();
        assert_eq!(common, range("01:30:00:00", "02:00:00:00"));
        assert_eq!(common.to_string(), "[01:30:00:00, 02:00:00:00)");
    }

    #[test]
    fn test_contains_is_half_open() {
        let a = range("01:00:00:00", "02:00:00:00");
        assert!(a.contains(&tc("01:30:00:00")).unwrap());
        assert!(a.contains(&tc("01:00:00:00")).unwrap());
        assert!(!a.contains(&tc("02:00:00:00")).unwrap());
        assert!(!a.contains(&tc("00:59:59:23")).unwrap());

        let other_rate = Timecode::new("01:30:00:00", FrameRate::FPS_25).unwrap();
        assert_eq!(a.contains(&other_rate).unwrap_err().kind(), ErrorKind::RangeFps);
    }

    #[test]
    fn test_order_normalized() {
        let a = range("02:00:00:00", "01:00:00:00");
        assert_eq!(a.start(), tc("01:00:00:00"));
        assert_eq!(a.end(), tc("02:00:00:00"));
    }

    #[test]
    fn test_construction_errors() {
        let err = TimeRange::new(tc("01:00:00:00"), tc("01:00:00:00")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RangeValue);

        let other_rate = Timecode::new("02:00:00:00", FrameRate::FPS_25).unwrap();
        let err = TimeRange::new(tc("01:00:00:00"), other_rate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RangeFps);

        let err = TimeRange::parse("01:00:00:00", "two o'clock", &TimecodeOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RangeType);
        assert!(err.to_string().contains("two o'clock"));
    }

    #[test]
    fn test_duration() {
        let a = range("01:00:00:00", "02:00:00:00");
        assert_eq!(a.duration().to_string(), "01:00:00:00");
        assert_eq!(a.framecount(), 86_400);
        assert_eq!(a.fps(), FrameRate::FPS_24);
    }

    #[test]
    fn test_disjoint_and_touching() {
        let a = range("01:00:00:00", "02:00:00:00");
        let touching = range("02:00:00:00", "03:00:00:00");
        let disjoint = range("04:00:00:00", "05:00:00:00");

        assert!(!a.overlaps(&touching).unwrap());
        assert_eq!(a.intersect(&touching).unwrap(), None);
        assert_eq!(a.intersect(&disjoint).unwrap(), None);

        assert_eq!(a.union(&touching).unwrap(), range("01:00:00:00", "03:00:00:00"));
        assert_eq!(
            a.union(&disjoint).unwrap_err().kind(),
            ErrorKind::RangeValue
        );
    }

    #[test]
    fn test_contains_range() {
        let a = range("01:00:00:00", "02:00:00:00");
        assert!(a.contains_range(&range("01:10:00:00", "02:00:00:00")).unwrap());
        assert!(!a.contains_range(&range("00:50:00:00", "01:10:00:00")).unwrap());
    }

    #[test]
    fn test_offset() {
        let a = range("01:00:00:00", "02:00:00:00");
        assert_eq!(a.offset(24_i64).unwrap(), range("01:00:01:00", "02:00:01:00"));
        assert_eq!(a.offset(-1.5_f64).unwrap(), range("00:59:58:12", "01:59:58:12"));
        assert_eq!(
            a.offset("00:10:00:00").unwrap(),
            range("01:10:00:00", "02:10:00:00")
        );

        // the end would wrap past midnight
        let late = range("23:00:00:00", "23:45:00:00");
        assert_eq!(late.offset("00:30:00:00").unwrap_err().kind(), ErrorKind::RangeValue);
    }

    #[test]
    fn test_extend_and_shorten() {
        let a = range("01:00:00:00", "02:00:00:00");
        assert_eq!(a.extend(24_i64).unwrap().end(), tc("02:00:01:00"));
        assert_eq!(a.shorten("00:30:00:00").unwrap().end(), tc("01:30:00:00"));
        assert_eq!(
            a.shorten("01:00:00:00").unwrap_err().kind(),
            ErrorKind::RangeValue
        );
    }

    #[test]
    fn test_retime() {
        let a = range("01:00:00:00", "02:00:00:00");
        assert_eq!(a.retime(1.5).unwrap().end(), tc("02:30:00:00"));
        assert_eq!(a.retime(0.0).unwrap_err().kind(), ErrorKind::RangeValue);
        assert_eq!(a.retime(-2.0).unwrap_err().kind(), ErrorKind::RangeValue);
    }

    #[test]
    fn test_separate() {
        let a = range("01:00:00:00", "02:00:00:00");
        let parts = a.separate(4).unwrap();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], range("01:00:00:00", "01:15:00:00"));
        assert_eq!(parts[3], range("01:45:00:00", "02:00:00:00"));
        assert_eq!(a.separate(1).unwrap_err().kind(), ErrorKind::RangeValue);
    }

    #[test]
    fn test_frames() {
        let a = range("00:00:00:00", "00:00:00:05");
        let frames: Vec<i64> = a.frames().map(|tc| tc.framecount()).collect();
        assert_eq!(frames, vec![0, 1, 2, 3, 4]);

        let options = TimecodeOptions::default();
        let partial = TimeRange::parse(0.01_f64, 0.1_f64, &options).unwrap();
        let frames: Vec<i64> = partial.frames().map(|tc| tc.framecount()).collect();
        assert_eq!(frames, vec![1, 2]);
    }

    #[test]
    fn test_duration_too_precise() {
        let err = TimeRange::parse(
            "1/9223372036854775807s",
            "1/9223372036854775806s",
            &TimecodeOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RangeValue);
        assert!(err.to_string().contains("too precise"));
    }

    #[test]
    fn test_frames_from_fine_start() {
        // the start times the rate does not fit in an i64 fraction
        let options = TimecodeOptions::default().with_fps(FrameRate::FPS_29_97);
        let a = TimeRange::parse("1/9223372036854775807s", 1.0_f64, &options).unwrap();
        let frames: Vec<i64> = a.frames().map(|tc| tc.framecount()).collect();
        assert_eq!(frames.len(), 29);
        assert_eq!(frames.first(), Some(&1));
        assert_eq!(frames.last(), Some(&29));
    }

    #[test]
    fn test_separate_fine_range() {
        let options = TimecodeOptions::default().with_fps(FrameRate::FPS_29_97);
        let a = TimeRange::parse("1/9223372036854775807s", 1.0_f64, &options).unwrap();

        let halves = a.separate(2).unwrap();
        assert_eq!(halves[0].start(), a.start());
        assert_eq!(halves[0].end(), halves[1].start());
        assert_eq!(halves[1].end(), a.end());

        // a seventh of the length needs a denominator past i64::MAX
        assert_eq!(a.separate(7).unwrap_err().kind(), ErrorKind::RangeValue);
    }

    #[test]
    fn test_range_serialization() {
        let a = range("01:00:00:00", "02:00:00:00");
        let json = serde_json::to_string(&a).unwrap();
        let decoded: TimeRange = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, a);
    }
}
