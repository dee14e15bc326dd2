//! Format registry.
//!
//! Every notation a timecode can be read from or written to is a
//! [`TimecodeKind`]. This module owns the recognising pattern of each kind,
//! its field grammar and the pure parse/format functions, so anything the
//! formatter produces the parser accepts back.

use crate::dropframe::{self, SmpteFields};
use crate::error::{Result, TimecodeError};
use crate::frame_rate::FrameRate;
use framecode_core::Rational;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Largest hours field accepted on input.
pub const MAX_HOURS: u64 = 999_999;

/// DLP sub-second ticks per second (4 ms each).
pub const DLP_TICKS_PER_SECOND: i64 = 250;

/// Supported timecode notations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimecodeKind {
    /// `HH:MM:SS:FF`, or `HH:MM:SS;FF` for drop-frame.
    Smpte,
    /// `HH:MM:SS,mmm` (SubRip).
    Srt,
    /// `HH:MM:SS.ff`, fractional seconds.
    Ffmpeg,
    /// `N/Ds` rational seconds (Final Cut Pro XML).
    Fcpx,
    /// `HH:MM:SS:TTT`, 250 ticks per second (DLP Cinema / CineCanvas).
    Dlp,
    /// Frame count, optional trailing `f`.
    Frame,
    /// Decimal seconds, optional trailing `s`.
    Time,
}

impl TimecodeKind {
    /// Every kind, in auto-detection order: [`detect`] returns the first
    /// kind whose shape matches.
    pub const ALL: [Self; 7] = [
        Self::Smpte,
        Self::Dlp,
        Self::Srt,
        Self::Ffmpeg,
        Self::Frame,
        Self::Time,
        Self::Fcpx,
    ];

    /// Lower-case name used on input and output.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Smpte => "smpte",
            Self::Srt => "srt",
            Self::Ffmpeg => "ffmpeg",
            Self::Fcpx => "fcpx",
            Self::Dlp => "dlp",
            Self::Frame => "frame",
            Self::Time => "time",
        }
    }

    /// Number of addressable output fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        match self {
            Self::Smpte | Self::Srt | Self::Ffmpeg | Self::Dlp => 4,
            Self::Fcpx | Self::Frame | Self::Time => 1,
        }
    }
}

impl fmt::Display for TimecodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimecodeKind {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| TimecodeError::UnknownKind {
                name: s.to_string(),
            })
    }
}

/// Parse a kind name, where `"auto"` means "detect from the value".
pub fn parse_kind(name: &str) -> Result<Option<TimecodeKind>> {
    if name.trim().eq_ignore_ascii_case("auto") {
        return Ok(None);
    }
    name.parse().map(Some)
}

struct Patterns {
    smpte: Regex,
    dlp: Regex,
    srt: Regex,
    ffmpeg: Regex,
    fcpx: Regex,
    frame: Regex,
    time: Regex,
}

impl Patterns {
    fn for_kind(&self, kind: TimecodeKind) -> &Regex {
        match kind {
            TimecodeKind::Smpte => &self.smpte,
            TimecodeKind::Dlp => &self.dlp,
            TimecodeKind::Srt => &self.srt,
            TimecodeKind::Ffmpeg => &self.ffmpeg,
            TimecodeKind::Fcpx => &self.fcpx,
            TimecodeKind::Frame => &self.frame,
            TimecodeKind::Time => &self.time,
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("timecode pattern is valid");
        Patterns {
            smpte: compile(r"^(-)?(\d{2,}):([0-5]?\d):([0-5]?\d)([:;])(\d{2,3})$"),
            dlp: compile(r"^(-)?(\d{2,}):([0-5]?\d):([0-5]?\d):(\d{3})$"),
            srt: compile(r"^(-)?(\d{2,}):([0-5]?\d):([0-5]?\d),(\d{3})$"),
            ffmpeg: compile(r"^(-)?(\d{2,}):([0-5]?\d):([0-5]?\d)\.(\d+)$"),
            fcpx: compile(r"^(-)?(\d+)(?:/(\d+))?s$"),
            frame: compile(r"^(-?\d+)f?$"),
            time: compile(r"^(-?\d+(?:\.\d+)?)s?$"),
        }
    })
}

/// Classify a literal.
///
/// A colon-separated literal with a three-digit final field is DLP when the
/// rounded rate is below 100 (no SMPTE frame number has three digits there)
/// and SMPTE otherwise. FCPX is only recognised with an explicit `/D` part.
#[must_use]
pub fn detect(text: &str, frame_rate: FrameRate) -> Option<TimecodeKind> {
    let text = text.trim();
    let patterns = patterns();

    // DLP shares the SMPTE shape; three ticks below 100 fps tell them apart
    let clock = patterns.smpte.captures(text).map(|caps| {
        &caps[5] == ":" && caps[6].len() == 3 && frame_rate.nominal() < 100
    });

    TimecodeKind::ALL.into_iter().find(|kind| match kind {
        TimecodeKind::Smpte => clock == Some(false),
        TimecodeKind::Dlp => clock == Some(true),
        TimecodeKind::Fcpx => text.contains('/') && patterns.fcpx.is_match(text),
        other => patterns.for_kind(*other).is_match(text),
    })
}

/// Parse a literal of a known kind into exact seconds.
///
/// `drop_frame` is the effective drop-frame setting; for SMPTE the separator
/// must agree with it.
pub fn parse(
    kind: TimecodeKind,
    text: &str,
    frame_rate: FrameRate,
    drop_frame: bool,
) -> Result<Rational> {
    let literal = text.trim();
    let caps = patterns()
        .for_kind(kind)
        .captures(literal)
        .ok_or_else(|| {
            TimecodeError::invalid_value(kind, literal, format!("does not match the {kind} grammar"))
        })?;

    match kind {
        TimecodeKind::Smpte => parse_smpte(&caps, literal, frame_rate, drop_frame),
        TimecodeKind::Srt => parse_clock(&caps, literal, kind, 1000),
        TimecodeKind::Dlp => parse_clock(&caps, literal, kind, DLP_TICKS_PER_SECOND),
        TimecodeKind::Ffmpeg => {
            let (negative, whole) = clock_prefix(&caps, literal, kind)?;
            let seconds: Rational = format!("{whole}.{}", &caps[5]).parse()?;
            Ok(signed(seconds, negative))
        }
        TimecodeKind::Fcpx => {
            let num = int_field(&caps[2], literal, kind)?;
            let den = match caps.get(3) {
                Some(den) => int_field(den.as_str(), literal, kind)?,
                None => 1,
            };
            if den == 0 {
                return Err(TimecodeError::invalid_value(kind, literal, "zero denominator"));
            }
            Ok(signed(Rational::new(num, den), caps.get(1).is_some()))
        }
        TimecodeKind::Frame => {
            let frames = int_field(&caps[1], literal, kind)?;
            frames_to_seconds(frames, frame_rate)
        }
        TimecodeKind::Time => Ok(caps[1].parse::<Rational>()?),
    }
}

fn parse_smpte(
    caps: &Captures<'_>,
    literal: &str,
    frame_rate: FrameRate,
    drop_frame: bool,
) -> Result<Rational> {
    let separator_drop_frame = &caps[5] == ";";
    if separator_drop_frame != drop_frame {
        let message = if separator_drop_frame {
            format!("';' marks drop-frame but drop-frame is off at {frame_rate} fps")
        } else {
            format!("':' marks non-drop-frame but drop-frame is on at {frame_rate} fps")
        };
        return Err(TimecodeError::initialization(literal, message));
    }

    let fields = SmpteFields {
        hours: hours_field(&caps[2], literal, TimecodeKind::Smpte)?,
        minutes: uint_field(&caps[3], literal, TimecodeKind::Smpte)?,
        seconds: uint_field(&caps[4], literal, TimecodeKind::Smpte)?,
        frames: uint_field(&caps[6], literal, TimecodeKind::Smpte)?,
    };
    dropframe::validate_fields(&fields, frame_rate, drop_frame, literal)?;

    let frames = dropframe::fields_to_frame(&fields, frame_rate, drop_frame) as i64;
    let frames = if caps.get(1).is_some() { -frames } else { frames };
    frames_to_seconds(frames, frame_rate)
}

fn parse_clock(caps: &Captures<'_>, literal: &str, kind: TimecodeKind, units: i64) -> Result<Rational> {
    let (negative, whole) = clock_prefix(caps, literal, kind)?;
    let sub = int_field(&caps[5], literal, kind)?;
    if sub >= units {
        return Err(TimecodeError::invalid_value(
            kind,
            literal,
            format!("sub-second field {sub} exceeds {}", units - 1),
        ));
    }
    let seconds = Rational::from_int(whole) + Rational::new(sub, units);
    Ok(signed(seconds, negative))
}

/// Sign and whole seconds of a four-field literal.
fn clock_prefix(caps: &Captures<'_>, literal: &str, kind: TimecodeKind) -> Result<(bool, i64)> {
    let hours = hours_field(&caps[2], literal, kind)? as i64;
    let minutes = int_field(&caps[3], literal, kind)?;
    let seconds = int_field(&caps[4], literal, kind)?;
    Ok((caps.get(1).is_some(), hours * 3600 + minutes * 60 + seconds))
}

fn hours_field(text: &str, literal: &str, kind: TimecodeKind) -> Result<u64> {
    let hours = uint_field(text, literal, kind)?;
    if hours > MAX_HOURS {
        return Err(TimecodeError::invalid_value(
            kind,
            literal,
            format!("hours field exceeds {MAX_HOURS}"),
        ));
    }
    Ok(hours)
}

fn uint_field(text: &str, literal: &str, kind: TimecodeKind) -> Result<u64> {
    text.parse()
        .map_err(|_| TimecodeError::invalid_value(kind, literal, format!("field {text} is out of range")))
}

fn int_field(text: &str, literal: &str, kind: TimecodeKind) -> Result<i64> {
    text.parse()
        .map_err(|_| TimecodeError::invalid_value(kind, literal, format!("field {text} is out of range")))
}

fn signed(value: Rational, negative: bool) -> Rational {
    if negative {
        -value
    } else {
        value
    }
}

/// Exact seconds of a frame index at the given rate.
pub fn frames_to_seconds(frames: i64, frame_rate: FrameRate) -> Result<Rational> {
    Rational::from_int(frames)
        .checked_div(frame_rate.as_rational())
        .ok_or_else(|| framecode_core::Error::overflow(format!("{frames} frames at {frame_rate} fps")).into())
}

/// A formatted timecode together with its individually addressable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    text: String,
    fields: Vec<String>,
}

impl Rendered {
    fn single(text: String) -> Self {
        Self {
            fields: vec![text.clone()],
            text,
        }
    }

    fn clock(fields: [String; 4], last_separator: char) -> Self {
        let text = format!(
            "{}:{}:{}{}{}",
            fields[0], fields[1], fields[2], last_separator, fields[3]
        );
        Self {
            text,
            fields: fields.to_vec(),
        }
    }

    /// The whole formatted string.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Fields left to right; the first carries the sign.
    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Consume into the whole formatted string.
    #[must_use]
    pub fn into_text(self) -> String {
        self.text
    }
}

/// Format a value in the given kind.
///
/// `seconds` is the exact value; `frames` its frame index, already quantized
/// (and wrapped) by the caller, used by the frame-addressable kinds.
#[must_use]
pub fn format(
    kind: TimecodeKind,
    seconds: Rational,
    frames: i64,
    frame_rate: FrameRate,
    drop_frame: bool,
) -> Rendered {
    match kind {
        TimecodeKind::Smpte => format_smpte(frames, frame_rate, drop_frame),
        TimecodeKind::Srt => format_clock(seconds, 1000, 3, ','),
        TimecodeKind::Dlp => format_clock(seconds, DLP_TICKS_PER_SECOND, 3, ':'),
        TimecodeKind::Ffmpeg => format_clock(seconds, 100, 2, '.'),
        TimecodeKind::Fcpx => Rendered::single(format!("{seconds}s")),
        TimecodeKind::Frame => Rendered::single(frames.to_string()),
        TimecodeKind::Time => Rendered::single(seconds.to_decimal_string(5)),
    }
}

fn format_smpte(frames: i64, frame_rate: FrameRate, drop_frame: bool) -> Rendered {
    let nominal = frame_rate.nominal();
    let drop_frame = drop_frame && frame_rate.is_drop_eligible();
    let fields = dropframe::frame_to_fields(frames.unsigned_abs(), frame_rate, drop_frame);
    let sign = if frames < 0 { "-" } else { "" };
    let width = if nominal >= 100 { 3 } else { 2 };

    Rendered::clock(
        [
            format!("{sign}{:02}", fields.hours),
            format!("{:02}", fields.minutes),
            format!("{:02}", fields.seconds),
            format!("{:0width$}", fields.frames),
        ],
        if drop_frame { ';' } else { ':' },
    )
}

fn format_clock(seconds: Rational, units: i64, width: usize, separator: char) -> Rendered {
    let magnitude = seconds.abs();
    let mut whole = magnitude.floor();
    let mut sub =
        (magnitude - Rational::from_int(whole)).mul_round_half_even(Rational::from_int(units));
    if sub == units {
        whole += 1;
        sub = 0;
    }
    let sign = if seconds.is_negative() && (whole, sub) != (0, 0) {
        "-"
    } else {
        ""
    };

    Rendered::clock(
        [
            format!("{sign}{:02}", whole / 3600),
            format!("{:02}", whole / 60 % 60),
            format!("{:02}", whole % 60),
            format!("{sub:0width$}"),
        ],
        separator,
    )
}
