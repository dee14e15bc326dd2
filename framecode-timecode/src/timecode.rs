//! The timecode value engine.
//!
//! A [`Timecode`] keeps one canonical value, the exact rational number of
//! seconds from zero. Frame counts, drop-frame fields and every textual
//! notation are derived from it on demand, so converting between kinds and
//! rates never accumulates error.

use crate::error::{Result, TimecodeError};
use crate::format::{self, Rendered, TimecodeKind};
use crate::frame_rate::FrameRate;
use framecode_core::Rational;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;
use tracing::{debug, warn};

/// Largest magnitude a timecode holds: one hour past the top of the hours
/// field.
const MAX_SECONDS: i64 = (format::MAX_HOURS as i64 + 1) * 3600;

/// Raw input a [`Timecode`] is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum TimecodeValue {
    /// A literal in one of the [`TimecodeKind`] notations.
    Text(String),
    /// A frame count, or whole seconds when kind `time` is declared.
    Frames(i64),
    /// Seconds as a float, read through its shortest decimal form.
    Seconds(f64),
    /// Exact seconds.
    Exact(Rational),
    /// Seconds as a numerator/denominator pair.
    Ratio(i64, i64),
}

impl From<&str> for TimecodeValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for TimecodeValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<i64> for TimecodeValue {
    fn from(frames: i64) -> Self {
        Self::Frames(frames)
    }
}

impl From<i32> for TimecodeValue {
    fn from(frames: i32) -> Self {
        Self::Frames(frames as i64)
    }
}

impl From<f64> for TimecodeValue {
    fn from(seconds: f64) -> Self {
        Self::Seconds(seconds)
    }
}

impl From<Rational> for TimecodeValue {
    fn from(seconds: Rational) -> Self {
        Self::Exact(seconds)
    }
}

impl From<(i64, i64)> for TimecodeValue {
    fn from((num, den): (i64, i64)) -> Self {
        Self::Ratio(num, den)
    }
}

impl fmt::Display for TimecodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Frames(frames) => write!(f, "{frames}"),
            Self::Seconds(seconds) => write!(f, "{seconds}"),
            Self::Exact(seconds) => write!(f, "{seconds}"),
            Self::Ratio(num, den) => write!(f, "{num}/{den}"),
        }
    }
}

/// Construction parameters for a [`Timecode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimecodeOptions {
    /// Declared kind, or `None` to detect it from the value.
    pub kind: Option<TimecodeKind>,
    /// Frame rate.
    pub fps: FrameRate,
    /// Requested drop-frame counting; ignored for rates that lack it.
    pub drop_frame: bool,
    /// Wrap the value into one displayed 24-hour day.
    pub strict: bool,
}

impl Default for TimecodeOptions {
    fn default() -> Self {
        Self {
            kind: None,
            fps: FrameRate::default(),
            drop_frame: false,
            strict: true,
        }
    }
}

impl TimecodeOptions {
    /// Set the declared kind (`None` for auto-detection).
    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<Option<TimecodeKind>>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Set the frame rate.
    #[must_use]
    pub fn with_fps(mut self, fps: FrameRate) -> Self {
        self.fps = fps;
        self
    }

    /// Set drop-frame counting.
    #[must_use]
    pub fn with_drop_frame(mut self, drop_frame: bool) -> Self {
        self.drop_frame = drop_frame;
        self
    }

    /// Set strict (24-hour) wrapping.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// A frame-accurate timecode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(try_from = "RawTimecode", into = "RawTimecode")]
pub struct Timecode {
    kind: TimecodeKind,
    fps: FrameRate,
    drop_frame: bool,
    strict: bool,
    precise: Rational,
}

#[derive(Serialize, Deserialize)]
struct RawTimecode {
    kind: TimecodeKind,
    fps: FrameRate,
    drop_frame: bool,
    strict: bool,
    seconds: Rational,
}

impl TryFrom<RawTimecode> for Timecode {
    type Error = TimecodeError;

    fn try_from(raw: RawTimecode) -> Result<Self> {
        if raw.drop_frame && !raw.fps.is_drop_eligible() {
            return Err(TimecodeError::initialization(
                raw.seconds.to_string(),
                format!("drop-frame is not defined at {} fps", raw.fps),
            ));
        }
        if !representable(raw.seconds, raw.fps, raw.drop_frame) {
            return Err(TimecodeError::invalid_value(
                raw.kind,
                raw.seconds.to_string(),
                format!("exceeds {} hours", format::MAX_HOURS),
            ));
        }
        let mut tc = Self {
            kind: raw.kind,
            fps: raw.fps,
            drop_frame: raw.drop_frame,
            strict: raw.strict,
            precise: raw.seconds,
        };
        tc.wrap();
        Ok(tc)
    }
}

impl From<Timecode> for RawTimecode {
    fn from(tc: Timecode) -> Self {
        Self {
            kind: tc.kind,
            fps: tc.fps,
            drop_frame: tc.drop_frame,
            strict: tc.strict,
            seconds: tc.precise,
        }
    }
}

impl Timecode {
    /// Create a timecode with auto-detected kind, non-drop-frame and strict.
    pub fn new(value: impl Into<TimecodeValue>, fps: FrameRate) -> Result<Self> {
        Self::with_options(value, &TimecodeOptions::default().with_fps(fps))
    }

    /// Create a timecode from explicit options.
    pub fn with_options(value: impl Into<TimecodeValue>, options: &TimecodeOptions) -> Result<Self> {
        let value = value.into();
        let fps = options.fps;
        let drop_frame = effective_drop_frame(fps, options.drop_frame);
        let (kind, precise) = resolve(&value, options.kind, fps, drop_frame)?;
        if !representable(precise, fps, drop_frame) {
            return Err(TimecodeError::invalid_value(
                kind,
                value.to_string(),
                format!("exceeds {} hours", format::MAX_HOURS),
            ));
        }

        let mut tc = Self {
            kind,
            fps,
            drop_frame,
            strict: options.strict,
            precise,
        };
        tc.wrap();

        debug!(
            value = %value,
            kind = %kind,
            fps = %fps,
            drop_frame,
            strict = options.strict,
            "Created timecode"
        );
        Ok(tc)
    }

    /// The kind this timecode formats as by default.
    #[must_use]
    pub fn kind(&self) -> TimecodeKind {
        self.kind
    }

    /// The frame rate.
    #[must_use]
    pub fn fps(&self) -> FrameRate {
        self.fps
    }

    /// Whether drop-frame counting is in effect.
    #[must_use]
    pub fn is_drop_frame(&self) -> bool {
        self.drop_frame
    }

    /// Whether the value is wrapped into one 24-hour day.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Real elapsed frames from zero, rounded half-to-even.
    #[must_use]
    pub fn framecount(&self) -> i64 {
        let frames = self.precise.mul_round_half_even(self.fps.as_rational());
        if self.strict {
            // a value within half a frame of midnight rounds onto the next day
            frames.rem_euclid(self.fps.day_frame_capacity(self.drop_frame))
        } else {
            frames
        }
    }

    /// Seconds from zero as a float.
    #[must_use]
    pub fn timestamp(&self) -> f64 {
        self.precise.to_f64()
    }

    /// Exact seconds from zero.
    #[must_use]
    pub fn precise_timestamp(&self) -> Rational {
        self.precise
    }

    /// The options that rebuild a timecode of this kind, rate and mode.
    #[must_use]
    pub fn options(&self) -> TimecodeOptions {
        TimecodeOptions {
            kind: Some(self.kind),
            fps: self.fps,
            drop_frame: self.drop_frame,
            strict: self.strict,
        }
    }

    /// Format as `kind` (default: this timecode's kind).
    ///
    /// `part` 0 is the whole string, 1 to 4 select a field left to right.
    /// A part above 4 returns the last field; the single-field kinds return
    /// the whole string for any part. Both fallbacks log a warning.
    #[must_use]
    pub fn timecode_output(&self, kind: Option<TimecodeKind>, part: usize) -> String {
        let kind = kind.unwrap_or(self.kind);
        let rendered = self.render(kind);
        if part == 0 {
            return rendered.into_text();
        }
        if kind.field_count() == 1 {
            warn!(kind = %kind, part, "Timecode kind has a single field, returning whole timecode");
            return rendered.into_text();
        }

        let fields = rendered.fields();
        match fields.get(part - 1) {
            Some(field) => field.clone(),
            None => {
                warn!(kind = %kind, part, "Output part out of range, returning last field");
                fields.last().cloned().unwrap_or_default()
            }
        }
    }

    /// Move to another frame rate.
    ///
    /// With `rounding` the timestamp snaps to the nearest frame of the new
    /// rate; otherwise it is kept exactly. Drop-frame is switched off if the
    /// new rate lacks it.
    pub fn set_fps(&mut self, fps: FrameRate, rounding: bool) -> &mut Self {
        let from = self.fps;
        self.fps = fps;
        self.drop_frame = effective_drop_frame(fps, self.drop_frame);
        if rounding {
            let frames = self.precise.mul_round_half_even(fps.as_rational());
            self.precise = Rational::from_int(frames) / fps.as_rational();
        }
        self.wrap();
        debug!(from = %from, to = %fps, rounding, "Changed timecode frame rate");
        self
    }

    /// Change the default kind.
    ///
    /// With `rounding` the value is replaced by what the new kind's notation
    /// can express (a frame for SMPTE, a millisecond for SRT, ...).
    pub fn set_type(&mut self, kind: TimecodeKind, rounding: bool) -> Result<&mut Self> {
        let from = self.kind;
        if rounding {
            let text = self.render(kind).into_text();
            self.precise = format::parse(kind, &text, self.fps, self.drop_frame)?;
            self.wrap();
        }
        self.kind = kind;
        debug!(from = %from, to = %kind, rounding, "Changed timecode kind");
        Ok(self)
    }

    /// Turn strict wrapping on or off.
    ///
    /// Turning it on wraps immediately; turning it off keeps the current
    /// value.
    pub fn set_strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self.wrap();
        debug!(strict, "Changed timecode strict mode");
        self
    }

    /// Number of audio samples at `sample_rate` Hz, rounded half-to-even.
    #[must_use]
    pub fn get_audio_sample_count(&self, sample_rate: u32) -> i64 {
        self.precise
            .mul_round_half_even(Rational::from_int(i64::from(sample_rate)))
    }

    /// Compare with another timecode, failing when the rates differ.
    pub fn try_cmp(&self, other: &Self) -> Result<Ordering> {
        self.require_same_fps(other, "compare")?;
        Ok(self.precise.cmp(&other.precise))
    }

    /// Same kind, rate and mode at another exact value.
    pub(crate) fn with_seconds(&self, seconds: Rational) -> Self {
        self.derive(seconds, self.strict)
    }

    /// [`Timecode::with_seconds`], or `None` when the value is out of range
    /// for this rate and mode.
    pub(crate) fn try_with_seconds(&self, seconds: Rational) -> Option<Self> {
        representable(seconds, self.fps, self.drop_frame).then(|| self.with_seconds(seconds))
    }

    fn derive(&self, precise: Rational, strict: bool) -> Self {
        let mut tc = Self {
            precise,
            strict,
            ..*self
        };
        tc.wrap();
        tc
    }

    fn wrap(&mut self) {
        if self.strict {
            self.precise = self.precise.rem_euclid(self.fps.day_length(self.drop_frame));
        }
    }

    fn render(&self, kind: TimecodeKind) -> Rendered {
        format::format(
            kind,
            self.precise,
            self.framecount(),
            self.fps,
            self.drop_frame,
        )
    }

    fn require_same_fps(&self, other: &Self, operation: &str) -> Result<()> {
        if self.fps != other.fps {
            return Err(TimecodeError::operator(format!(
                "cannot {operation} {self} at {} fps and {other} at {} fps",
                self.fps, other.fps
            )));
        }
        Ok(())
    }

    fn combine(&self, other: &Self, subtract: bool) -> Result<Self> {
        let operation = if subtract { "subtract" } else { "add" };
        self.require_same_fps(other, operation)?;
        let symbol = if subtract { '-' } else { '+' };
        let precise = if subtract {
            self.precise.checked_sub(other.precise)
        } else {
            self.precise.checked_add(other.precise)
        }
        .filter(|precise| representable(*precise, self.fps, self.drop_frame))
        .ok_or_else(|| overflow(format!("{self} {symbol} {other}")))?;
        Ok(self.derive(precise, self.strict || other.strict))
    }

    fn shift(&self, operand: Scalar, subtract: bool) -> Result<Self> {
        let delta = operand.as_seconds(self.fps)?;
        let symbol = if subtract { '-' } else { '+' };
        let precise = if subtract {
            self.precise.checked_sub(delta)
        } else {
            self.precise.checked_add(delta)
        }
        .filter(|precise| representable(*precise, self.fps, self.drop_frame))
        .ok_or_else(|| overflow(format!("{self} {symbol} {operand}")))?;
        Ok(self.derive(precise, self.strict))
    }

    fn scale(&self, operand: Scalar, divide: bool) -> Result<Self> {
        let factor = operand.as_factor()?;
        let symbol = if divide { '/' } else { '*' };
        let precise = if divide {
            if factor.is_zero() {
                return Err(TimecodeError::operator(format!("cannot divide {self} by zero")));
            }
            self.precise.checked_div(factor)
        } else {
            self.precise.checked_mul(factor)
        }
        .filter(|precise| representable(*precise, self.fps, self.drop_frame))
        .ok_or_else(|| overflow(format!("{self} {symbol} {operand}")))?;
        Ok(self.derive(precise, self.strict))
    }

    fn compare_scalar(&self, other: Scalar) -> Option<Ordering> {
        match other {
            Scalar::Int(frames) => Some(self.framecount().cmp(&frames)),
            Scalar::Float(seconds) => Rational::from_f64(seconds)
                .ok()
                .map(|seconds| self.precise.cmp(&seconds)),
            Scalar::Exact(seconds) => Some(self.precise.cmp(&seconds)),
        }
    }
}

fn effective_drop_frame(fps: FrameRate, requested: bool) -> bool {
    if requested && !fps.is_drop_eligible() {
        warn!(fps = %fps, "Drop-frame is not defined at this rate, using non-drop-frame");
        return false;
    }
    requested
}

fn resolve(
    value: &TimecodeValue,
    kind: Option<TimecodeKind>,
    fps: FrameRate,
    drop_frame: bool,
) -> Result<(TimecodeKind, Rational)> {
    match value {
        TimecodeValue::Text(text) => {
            let kind = match kind {
                Some(kind) => kind,
                None => format::detect(text, fps).ok_or_else(|| {
                    TimecodeError::invalid_value("auto", text.trim(), "matches no timecode format")
                })?,
            };
            Ok((kind, format::parse(kind, text, fps, drop_frame)?))
        }
        TimecodeValue::Frames(frames) => match kind {
            None | Some(TimecodeKind::Frame) => {
                Ok((TimecodeKind::Frame, format::frames_to_seconds(*frames, fps)?))
            }
            Some(TimecodeKind::Time) => Ok((TimecodeKind::Time, Rational::from_int(*frames))),
            Some(other) => Err(TimecodeError::type_mismatch(other, frames)),
        },
        TimecodeValue::Seconds(seconds) => match kind {
            None | Some(TimecodeKind::Time) => {
                Ok((TimecodeKind::Time, Rational::from_f64(*seconds)?))
            }
            Some(other) => Err(TimecodeError::type_mismatch(other, seconds)),
        },
        TimecodeValue::Exact(seconds) => exact_kind(*seconds, kind),
        TimecodeValue::Ratio(num, den) => {
            let seconds = Rational::try_new(*num, *den).map_err(|err| {
                TimecodeError::invalid_value("time", value.to_string(), err.to_string())
            })?;
            exact_kind(seconds, kind)
        }
    }
}

fn exact_kind(seconds: Rational, kind: Option<TimecodeKind>) -> Result<(TimecodeKind, Rational)> {
    match kind {
        None | Some(TimecodeKind::Time) => Ok((TimecodeKind::Time, seconds)),
        Some(TimecodeKind::Fcpx) => Ok((TimecodeKind::Fcpx, seconds)),
        Some(other) => Err(TimecodeError::type_mismatch(other, seconds)),
    }
}

/// Whether a value fits under the hours field and survives the day wrap.
fn representable(precise: Rational, fps: FrameRate, drop_frame: bool) -> bool {
    precise.abs() <= Rational::from_int(MAX_SECONDS)
        && precise.checked_rem_euclid(fps.day_length(drop_frame)).is_some()
}

/// Overflow error naming the expression that produced it.
fn overflow(expression: String) -> TimecodeError {
    framecode_core::Error::overflow(expression).into()
}

/// A plain number on one side of an operator.
#[derive(Debug, Clone, Copy)]
enum Scalar {
    Int(i64),
    Float(f64),
    Exact(Rational),
}

impl Scalar {
    /// Integers count frames; everything else counts seconds.
    fn as_seconds(self, fps: FrameRate) -> Result<Rational> {
        match self {
            Self::Int(frames) => format::frames_to_seconds(frames, fps),
            Self::Float(seconds) => Ok(Rational::from_f64(seconds)?),
            Self::Exact(seconds) => Ok(seconds),
        }
    }

    fn as_factor(self) -> Result<Rational> {
        match self {
            Self::Int(n) => Ok(Rational::from_int(n)),
            Self::Float(factor) => Ok(Rational::from_f64(factor)?),
            Self::Exact(factor) => Ok(factor),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Exact(r) => write!(f, "{r}"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<Rational> for Scalar {
    fn from(r: Rational) -> Self {
        Self::Exact(r)
    }
}

impl Default for Timecode {
    fn default() -> Self {
        Self {
            kind: TimecodeKind::Smpte,
            fps: FrameRate::default(),
            drop_frame: false,
            strict: true,
            precise: Rational::zero(),
        }
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.timecode_output(None, 0))
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    /// Parse with auto-detected kind and default options (24 fps, strict).
    fn from_str(s: &str) -> Result<Self> {
        Self::with_options(s, &TimecodeOptions::default())
    }
}

impl PartialEq for Timecode {
    /// Equal rates and equal exact timestamps; kind and drop-frame are
    /// presentation only.
    fn eq(&self, other: &Self) -> bool {
        self.fps == other.fps && self.precise == other.precise
    }
}

impl Eq for Timecode {}

impl PartialOrd for Timecode {
    /// `None` when the rates differ; see [`Timecode::try_cmp`].
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.try_cmp(other).ok()
    }
}

impl Neg for Timecode {
    type Output = Self;

    fn neg(self) -> Self {
        self.derive(-self.precise, self.strict)
    }
}

impl Add for Timecode {
    type Output = Result<Self>;

    fn add(self, other: Self) -> Result<Self> {
        self.combine(&other, false)
    }
}

impl Sub for Timecode {
    type Output = Result<Self>;

    fn sub(self, other: Self) -> Result<Self> {
        self.combine(&other, true)
    }
}

impl Mul for Timecode {
    type Output = Result<Self>;

    fn mul(self, other: Self) -> Result<Self> {
        Err(TimecodeError::operator(format!(
            "cannot multiply timecode {self} by timecode {other}"
        )))
    }
}

impl Div for Timecode {
    type Output = Result<Self>;

    fn div(self, other: Self) -> Result<Self> {
        Err(TimecodeError::operator(format!(
            "cannot divide timecode {self} by timecode {other}"
        )))
    }
}

macro_rules! scalar_operators {
    ($($scalar:ty),*) => {$(
        impl Add<$scalar> for Timecode {
            type Output = Result<Timecode>;

            fn add(self, rhs: $scalar) -> Result<Timecode> {
                self.shift(Scalar::from(rhs), false)
            }
        }

        impl Sub<$scalar> for Timecode {
            type Output = Result<Timecode>;

            fn sub(self, rhs: $scalar) -> Result<Timecode> {
                self.shift(Scalar::from(rhs), true)
            }
        }

        impl Mul<$scalar> for Timecode {
            type Output = Result<Timecode>;

            fn mul(self, rhs: $scalar) -> Result<Timecode> {
                self.scale(Scalar::from(rhs), false)
            }
        }

        impl Div<$scalar> for Timecode {
            type Output = Result<Timecode>;

            fn div(self, rhs: $scalar) -> Result<Timecode> {
                self.scale(Scalar::from(rhs), true)
            }
        }

        impl Add<Timecode> for $scalar {
            type Output = Result<Timecode>;

            fn add(self, rhs: Timecode) -> Result<Timecode> {
                rhs.shift(Scalar::from(self), false)
            }
        }

        impl Sub<Timecode> for $scalar {
            type Output = Result<Timecode>;

            fn sub(self, rhs: Timecode) -> Result<Timecode> {
                (-rhs).shift(Scalar::from(self), false)
            }
        }

        impl Mul<Timecode> for $scalar {
            type Output = Result<Timecode>;

            fn mul(self, rhs: Timecode) -> Result<Timecode> {
                rhs.scale(Scalar::from(self), false)
            }
        }

        impl Div<Timecode> for $scalar {
            type Output = Result<Timecode>;

            fn div(self, rhs: Timecode) -> Result<Timecode> {
                Err(TimecodeError::operator(format!(
                    "cannot divide {self} by timecode {rhs}"
                )))
            }
        }

        impl PartialEq<$scalar> for Timecode {
            fn eq(&self, other: &$scalar) -> bool {
                self.compare_scalar(Scalar::from(*other)) == Some(Ordering::Equal)
            }
        }

        impl PartialOrd<$scalar> for Timecode {
            fn partial_cmp(&self, other: &$scalar) -> Option<Ordering> {
                self.compare_scalar(Scalar::from(*other))
            }
        }

        impl PartialEq<Timecode> for $scalar {
            fn eq(&self, other: &Timecode) -> bool {
                other == self
            }
        }

        impl PartialOrd<Timecode> for $scalar {
            fn partial_cmp(&self, other: &Timecode) -> Option<Ordering> {
                other.partial_cmp(self).map(Ordering::reverse)
            }
        }
    )*};
}

scalar_operators!(i64, f64, Rational);
