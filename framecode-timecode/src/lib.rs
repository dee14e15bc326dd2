//! Frame-accurate timecode library.
//!
//! This crate represents an instant or duration on a timeline in the
//! notations used by editing, subtitling and mastering tools, and converts
//! between them without loss:
//!
//! - **SMPTE**: `HH:MM:SS:FF`, or `HH:MM:SS;FF` for drop-frame
//! - **SRT**: `HH:MM:SS,mmm`
//! - **FFMPEG**: `HH:MM:SS.ff`
//! - **FCPX**: rational seconds, `N/Ds`
//! - **DLP**: `HH:MM:SS:TTT`, 250 ticks per second
//! - **Frame** counts and plain **time** in seconds
//!
//! Every value is stored as exact rational seconds, so repeated conversions
//! between kinds and frame rates never drift.
//!
//! # Quick Start
//!
//! ```rust
//! use framecode_timecode::{FrameRate, Timecode, TimecodeKind};
//!
//! // Kind is detected from the literal
//! let tc = Timecode::new("01:00:00:12", FrameRate::FPS_24).unwrap();
//! assert_eq!(tc.framecount(), 86_412);
//! assert_eq!(tc.timecode_output(Some(TimecodeKind::Srt), 0), "01:00:00,500");
//!
//! // Integers add frames, floats add seconds
//! let later = (tc + 12_i64).unwrap();
//! assert_eq!(later.to_string(), "01:00:01:00");
//! let later = (tc + 1.5_f64).unwrap();
//! assert_eq!(later.to_string(), "01:00:02:00");
//! ```
//!
//! # Drop-Frame Timecode
//!
//! At 29.97, 59.94 and 119.88 fps drop-frame counting skips frame numbers so
//! the displayed time tracks wall-clock time:
//!
//! ```rust
//! use framecode_timecode::{FrameRate, Timecode, TimecodeOptions};
//!
//! let options = TimecodeOptions::default()
//!     .with_fps(FrameRate::FPS_29_97)
//!     .with_drop_frame(true);
//!
//! let tc = Timecode::with_options("00:01:00;02", &options).unwrap();
//! assert_eq!(tc.framecount(), 1800);
//!
//! // 00 and 01 do not exist at minute one
//! assert!(Timecode::with_options("00:01:00;00", &options).is_err());
//! ```
//!
//! # Time Ranges
//!
//! ```rust
//! use framecode_timecode::{TimeRange, TimecodeOptions};
//!
//! let options = TimecodeOptions::default();
//! let a = TimeRange::parse("01:00:00:00", "02:00:00:00", &options).unwrap();
//! let b = TimeRange::parse("01:30:00:00", "02:30:00:00", &options).unwrap();
//!
//! let common = a.intersect(&b).unwrap().unwrap();
//! assert_eq!(common.to_string(), "[01:30:00:00, 02:00:00:00)");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod dropframe;
pub mod error;
pub mod format;
pub mod frame_rate;
pub mod range;
pub mod timecode;

// Re-export main types
pub use error::{ErrorKind, Result, TimecodeError};
pub use format::{parse_kind, TimecodeKind};
pub use frame_rate::FrameRate;
pub use range::TimeRange;
pub use timecode::{Timecode, TimecodeOptions, TimecodeValue};

pub use framecode_core::Rational;

// Re-export drop-frame utilities
pub use dropframe::{
    fields_to_frame, frame_to_fields, frames_dropped_until, is_dropped_frame, DropFrameConfig,
    SmpteFields,
};

/// Create a non-drop-frame timecode from a literal of any kind.
///
/// # Example
/// ```rust
/// use framecode_timecode::{timecode, FrameRate};
///
/// let tc = timecode("01:30:45:12", FrameRate::FPS_24).unwrap();
/// assert_eq!(tc.to_string(), "01:30:45:12");
/// ```
pub fn timecode(value: impl Into<TimecodeValue>, fps: FrameRate) -> Result<Timecode> {
    Timecode::new(value, fps)
}

/// Create a drop-frame timecode.
///
/// The rate must support drop-frame counting for a `;` literal to parse.
///
/// # Example
/// ```rust
/// use framecode_timecode::{timecode_df, FrameRate};
///
/// let tc = timecode_df("01:00:00;02", FrameRate::FPS_29_97).unwrap();
/// assert_eq!(tc.to_string(), "01:00:00;02");
/// assert!(tc.is_drop_frame());
/// ```
pub fn timecode_df(value: impl Into<TimecodeValue>, fps: FrameRate) -> Result<Timecode> {
    let options = TimecodeOptions::default()
        .with_fps(fps)
        .with_drop_frame(true);
    Timecode::with_options(value, &options)
}

/// Duration between two timecodes in seconds.
///
/// Negative if `end` is before `start`.
#[must_use]
pub fn duration_seconds(start: &Timecode, end: &Timecode) -> f64 {
    (end.precise_timestamp() - start.precise_timestamp()).to_f64()
}

/// Duration between two timecodes in frames, rounded half-to-even.
///
/// Fails if the frame rates differ. Negative if `end` is before `start`.
pub fn duration_frames(start: &Timecode, end: &Timecode) -> Result<i64> {
    if start.fps() != end.fps() {
        return Err(TimecodeError::operator(format!(
            "cannot measure from {start} at {} fps to {end} at {} fps",
            start.fps(),
            end.fps()
        )));
    }
    let seconds = end.precise_timestamp() - start.precise_timestamp();
    Ok(seconds.mul_round_half_even(start.fps().as_rational()))
}
