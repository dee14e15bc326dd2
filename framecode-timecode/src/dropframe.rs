//! Drop-frame frame numbering.
//!
//! Drop-frame timecode compensates for the difference between a nominal
//! integer rate and its NTSC rate (`R * 1000/1001`) by skipping frame
//! *numbers*, never real frames.
//!
//! The rules are:
//! - Skip the first `2R/30` frame numbers of each minute (0-1 at 29.97,
//!   0-3 at 59.94, 0-7 at 119.88)
//! - Except for minutes 0, 10, 20, 30, 40, 50
//!
//! Functions here work on the unsigned magnitude of a frame index; callers
//! carry the sign.

use crate::error::{Result, TimecodeError};
use crate::frame_rate::FrameRate;

/// Drop-frame configuration for a frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropFrameConfig {
    /// Number of frames dropped per minute (except every 10th minute)
    pub frames_dropped_per_minute: u64,
    /// Frames per 10 minutes (accounting for drops)
    pub frames_per_10_minutes: u64,
    /// Frames per minute (accounting for drops, for non-10th minutes)
    pub frames_per_minute: u64,
}

impl DropFrameConfig {
    /// Get the configuration for a frame rate, if it supports drop-frame.
    #[must_use]
    pub fn for_frame_rate(frame_rate: FrameRate) -> Option<Self> {
        if !frame_rate.is_drop_eligible() {
            return None;
        }
        let nominal = frame_rate.nominal() as u64;
        let drop = frame_rate.drops_per_minute() as u64;
        Some(Self {
            frames_dropped_per_minute: drop,
            frames_per_10_minutes: nominal * 600 - 9 * drop,
            frames_per_minute: nominal * 60 - drop,
        })
    }
}

/// Displayed SMPTE fields of a non-negative frame index.
///
/// Hours are not wrapped into a day; a non-strict timecode may show 24 or
/// more hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmpteFields {
    /// Hours.
    pub hours: u64,
    /// Minutes (0-59).
    pub minutes: u64,
    /// Seconds (0-59).
    pub seconds: u64,
    /// Frame number within the second.
    pub frames: u64,
}

impl SmpteFields {
    /// Total displayed minutes.
    #[must_use]
    pub fn total_minutes(&self) -> u64 {
        self.hours * 60 + self.minutes
    }

    /// Frame number the fields would show on an exact integer-rate clock.
    #[must_use]
    pub fn nominal_index(&self, nominal_fps: u64) -> u64 {
        (self.total_minutes() * 60 + self.seconds) * nominal_fps + self.frames
    }

    fn from_nominal_index(index: u64, nominal_fps: u64) -> Self {
        let total_seconds = index / nominal_fps;
        Self {
            hours: total_seconds / 3600,
            minutes: (total_seconds / 60) % 60,
            seconds: total_seconds % 60,
            frames: index % nominal_fps,
        }
    }
}

/// Convert a real frame index to displayed fields.
///
/// With `drop_frame` unset, or for a rate without drop-frame counting, the
/// fields simply count at the nominal rate.
#[must_use]
pub fn frame_to_fields(frame_number: u64, frame_rate: FrameRate, drop_frame: bool) -> SmpteFields {
    let nominal = frame_rate.nominal() as u64;
    let config = match DropFrameConfig::for_frame_rate(frame_rate) {
        Some(c) if drop_frame => c,
        _ => return SmpteFields::from_nominal_index(frame_number, nominal),
    };

    let drop = config.frames_dropped_per_minute;
    let ten_minute_blocks = frame_number / config.frames_per_10_minutes;
    let remaining = frame_number % config.frames_per_10_minutes;

    // The first minute of each block keeps all its numbers
    let skipped_in_block = if remaining > drop {
        drop * ((remaining - drop) / config.frames_per_minute)
    } else {
        0
    };

    let display_index = frame_number + 9 * drop * ten_minute_blocks + skipped_in_block;
    SmpteFields::from_nominal_index(display_index, nominal)
}

/// Convert displayed fields to the real frame index.
///
/// The fields are not validated; see [`validate_fields`].
#[must_use]
pub fn fields_to_frame(fields: &SmpteFields, frame_rate: FrameRate, drop_frame: bool) -> u64 {
    let nominal_index = fields.nominal_index(frame_rate.nominal() as u64);
    if !drop_frame {
        return nominal_index;
    }
    nominal_index - frames_dropped_until(fields.hours, fields.minutes, frame_rate)
}

/// Check if the fields name a frame number that drop-frame counting skips.
#[must_use]
pub fn is_dropped_frame(minutes: u64, seconds: u64, frames: u64, frame_rate: FrameRate) -> bool {
    let config = match DropFrameConfig::for_frame_rate(frame_rate) {
        Some(c) => c,
        None => return false,
    };

    seconds == 0 && minutes % 10 != 0 && frames < config.frames_dropped_per_minute
}

/// Calculate the number of frame numbers dropped before the given minute.
#[must_use]
pub fn frames_dropped_until(hours: u64, minutes: u64, frame_rate: FrameRate) -> u64 {
    let config = match DropFrameConfig::for_frame_rate(frame_rate) {
        Some(c) => c,
        None => return 0,
    };

    let total_minutes = hours * 60 + minutes;
    config.frames_dropped_per_minute * (total_minutes - total_minutes / 10)
}

/// Validate displayed fields against the nominal rate and drop-frame rules.
///
/// `literal` is echoed in the error.
pub fn validate_fields(
    fields: &SmpteFields,
    frame_rate: FrameRate,
    drop_frame: bool,
    literal: &str,
) -> Result<()> {
    let nominal = frame_rate.nominal() as u64;
    if fields.frames >= nominal {
        return Err(TimecodeError::invalid_value(
            "smpte",
            literal,
            format!("frame field {} exceeds {} fps", fields.frames, nominal - 1),
        ));
    }
    if fields.minutes >= 60 || fields.seconds >= 60 {
        return Err(TimecodeError::invalid_value(
            "smpte",
            literal,
            "minutes and seconds must be below 60",
        ));
    }
    if drop_frame && is_dropped_frame(fields.minutes, fields.seconds, fields.frames, frame_rate) {
        return Err(TimecodeError::drop_frame(
            literal,
            format!(
                "frame {:02} is dropped at minute {:02}",
                fields.frames, fields.minutes
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(hours: u64, minutes: u64, seconds: u64, frames: u64) -> SmpteFields {
        SmpteFields {
            hours,
            minutes,
            seconds,
            frames,
        }
    }

    #[test]
    fn test_drop_frame_config() {
        let config_29_97 = DropFrameConfig::for_frame_rate(FrameRate::FPS_29_97).unwrap();
        assert_eq!(config_29_97.frames_dropped_per_minute, 2);
        assert_eq!(config_29_97.frames_per_10_minutes, 17982);
        assert_eq!(config_29_97.frames_per_minute, 1798);

        let config_59_94 = DropFrameConfig::for_frame_rate(FrameRate::FPS_59_94).unwrap();
        assert_eq!(config_59_94.frames_dropped_per_minute, 4);
        assert_eq!(config_59_94.frames_per_10_minutes, 35964);

        let config_119_88 = DropFrameConfig::for_frame_rate(FrameRate::FPS_119_88).unwrap();
        assert_eq!(config_119_88.frames_dropped_per_minute, 8);

        assert!(DropFrameConfig::for_frame_rate(FrameRate::FPS_23_976).is_none());
        assert!(DropFrameConfig::for_frame_rate(FrameRate::FPS_30).is_none());
    }

    #[test]
    fn test_is_dropped_frame() {
        assert!(is_dropped_frame(1, 0, 0, FrameRate::FPS_29_97));
        assert!(is_dropped_frame(1, 0, 1, FrameRate::FPS_29_97));
        assert!(!is_dropped_frame(1, 0, 2, FrameRate::FPS_29_97));

        assert!(!is_dropped_frame(10, 0, 0, FrameRate::FPS_29_97));
        assert!(!is_dropped_frame(10, 0, 1, FrameRate::FPS_29_97));
        assert!(!is_dropped_frame(0, 0, 0, FrameRate::FPS_29_97));
        assert!(!is_dropped_frame(5, 1, 0, FrameRate::FPS_29_97));

        assert!(is_dropped_frame(1, 0, 3, FrameRate::FPS_59_94));
        assert!(!is_dropped_frame(1, 0, 4, FrameRate::FPS_59_94));
        assert!(!is_dropped_frame(1, 0, 0, FrameRate::FPS_30));
    }

    #[test]
    fn test_frame_to_fields_basic() {
        assert_eq!(frame_to_fields(0, FrameRate::FPS_29_97, true), fields(0, 0, 0, 0));
        assert_eq!(frame_to_fields(29, FrameRate::FPS_29_97, true), fields(0, 0, 0, 29));
        assert_eq!(frame_to_fields(30, FrameRate::FPS_29_97, true), fields(0, 0, 1, 0));
    }

    #[test]
    fn test_drop_frame_at_minute_boundary() {
        assert_eq!(
            frame_to_fields(1799, FrameRate::FPS_29_97, true),
            fields(0, 0, 59, 29)
        );
        // frame numbers 0 and 1 of minute one are skipped
        assert_eq!(
            frame_to_fields(1800, FrameRate::FPS_29_97, true),
            fields(0, 1, 0, 2)
        );
    }

    #[test]
    fn test_drop_frame_10_minute_boundary() {
        assert_eq!(
            frame_to_fields(17982, FrameRate::FPS_29_97, true),
            fields(0, 10, 0, 0)
        );
        assert_eq!(
            frame_to_fields(17982 + 1800, FrameRate::FPS_29_97, true),
            fields(0, 11, 0, 2)
        );
    }

    #[test]
    fn test_drop_frame_59_94() {
        assert_eq!(
            frame_to_fields(3600, FrameRate::FPS_59_94, true),
            fields(0, 1, 0, 4)
        );
    }

    #[test]
    fn test_drop_frame_one_hour() {
        // 6 blocks of 17982 frames
        assert_eq!(
            frame_to_fields(107_892, FrameRate::FPS_29_97, true),
            fields(1, 0, 0, 0)
        );
        assert_eq!(fields_to_frame(&fields(1, 0, 0, 0), FrameRate::FPS_29_97, true), 107_892);
    }

    #[test]
    fn test_drop_frame_roundtrip() {
        for rate in [FrameRate::FPS_29_97, FrameRate::FPS_59_94, FrameRate::FPS_119_88] {
            for frame in [0, 29, 30, 1799, 1800, 1801, 17981, 17982, 17983, 2_589_407] {
                let tc = frame_to_fields(frame, rate, true);
                let back = fields_to_frame(&tc, rate, true);
                assert_eq!(frame, back, "Frame {} at {} roundtrip failed via {:?}", frame, rate, tc);
            }
        }
    }

    #[test]
    fn test_non_drop_ignores_rate() {
        assert_eq!(
            frame_to_fields(1800, FrameRate::FPS_29_97, false),
            fields(0, 1, 0, 0)
        );
        assert_eq!(
            frame_to_fields(90_000, FrameRate::FPS_24, true),
            fields(1, 2, 30, 0)
        );
    }

    #[test]
    fn test_frames_dropped_until() {
        assert_eq!(frames_dropped_until(0, 0, FrameRate::FPS_29_97), 0);
        assert_eq!(frames_dropped_until(0, 1, FrameRate::FPS_29_97), 2);
        assert_eq!(frames_dropped_until(0, 10, FrameRate::FPS_29_97), 18);
        assert_eq!(frames_dropped_until(0, 11, FrameRate::FPS_29_97), 20);
        assert_eq!(frames_dropped_until(24, 0, FrameRate::FPS_29_97), 2592);
        assert_eq!(frames_dropped_until(1, 0, FrameRate::FPS_24), 0);
    }

    #[test]
    fn test_validate_fields() {
        let rate = FrameRate::FPS_29_97;
        assert!(validate_fields(&fields(0, 1, 0, 2), rate, true, "00:01:00;02").is_ok());
        assert!(validate_fields(&fields(0, 10, 0, 0), rate, true, "00:10:00;00").is_ok());
        assert!(validate_fields(&fields(0, 1, 0, 0), rate, false, "00:01:00:00").is_ok());

        let err = validate_fields(&fields(0, 1, 0, 1), rate, true, "00:01:00;01").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::DropFrame);
        assert!(err.to_string().contains("00:01:00;01"));

        let err = validate_fields(&fields(0, 0, 0, 30), rate, false, "00:00:00:30").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Value);
    }

    #[test]
    fn test_config_matches_day_capacity() {
        for fps in [FrameRate::FPS_29_97, FrameRate::FPS_59_94, FrameRate::FPS_119_88] {
            let config = DropFrameConfig::for_frame_rate(fps).unwrap();
            // 144 ten-minute blocks per day
            assert_eq!(
                config.frames_per_10_minutes * 144,
                fps.day_frame_capacity(true) as u64
            );
        }
    }
}
