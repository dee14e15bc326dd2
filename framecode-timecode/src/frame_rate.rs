//! Frame rate policy.
//!
//! A [`FrameRate`] is an exact rational rate in `[0.01, 999.99]` fps. From it
//! derive the rounded integer rate that SMPTE display math counts in, the
//! drop-frame eligibility of the rate, the number of frame numbers dropped
//! per minute and the number of frames in one displayed 24-hour day.

use crate::error::{Result, TimecodeError};
use framecode_core::Rational;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seconds in one displayed day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Minutes in one day.
const MINUTES_PER_DAY: i64 = 1_440;

/// Minutes per day that drop frame numbers (all but every tenth).
const DROP_MINUTES_PER_DAY: i64 = MINUTES_PER_DAY - MINUTES_PER_DAY / 10;

/// Largest distance from `R * 1000/1001` still read as that NTSC rate.
const NTSC_TOLERANCE: f64 = 0.005;

/// Video frame rate as an exact rational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Rational", into = "Rational")]
pub struct FrameRate(Rational);

impl FrameRate {
    /// 23.976 fps (24000/1001, NTSC film).
    pub const FPS_23_976: Self = Self::ntsc(24);
    /// 24 fps (film).
    pub const FPS_24: Self = Self::integer(24);
    /// 25 fps (PAL).
    pub const FPS_25: Self = Self::integer(25);
    /// 29.97 fps (30000/1001, NTSC).
    pub const FPS_29_97: Self = Self::ntsc(30);
    /// 30 fps.
    pub const FPS_30: Self = Self::integer(30);
    /// 48 fps (HFR film).
    pub const FPS_48: Self = Self::integer(48);
    /// 50 fps (PAL).
    pub const FPS_50: Self = Self::integer(50);
    /// 59.94 fps (60000/1001, NTSC).
    pub const FPS_59_94: Self = Self::ntsc(60);
    /// 60 fps.
    pub const FPS_60: Self = Self::integer(60);
    /// 119.88 fps (120000/1001).
    pub const FPS_119_88: Self = Self::ntsc(120);
    /// 120 fps.
    pub const FPS_120: Self = Self::integer(120);

    const MIN: Rational = Rational::const_new(1, 100);
    const MAX: Rational = Rational::const_new(99_999, 100);

    const fn integer(fps: i64) -> Self {
        Self(Rational::from_int(fps))
    }

    const fn ntsc(nominal: i64) -> Self {
        Self(Rational::const_new(nominal * 1000, 1001))
    }

    /// Create a frame rate from an exact rational.
    pub fn new(rate: Rational) -> Result<Self> {
        if rate < Self::MIN || rate > Self::MAX {
            return Err(TimecodeError::InvalidFrameRate {
                value: rate.to_string(),
            });
        }
        Ok(Self(rate))
    }

    /// Create an integer frame rate.
    pub fn from_int(fps: u32) -> Result<Self> {
        Self::new(Rational::from_int(fps as i64))
    }

    /// Create a frame rate from a decimal value such as `29.97`.
    ///
    /// Values within 0.005 of `R * 1000/1001` snap to that exact NTSC rate;
    /// anything else is kept to two decimal places.
    pub fn from_f64(fps: f64) -> Result<Self> {
        if !fps.is_finite() {
            return Err(TimecodeError::InvalidFrameRate {
                value: fps.to_string(),
            });
        }
        let nominal = fps.round();
        if nominal >= 1.0 && (fps - nominal * 1000.0 / 1001.0).abs() < NTSC_TOLERANCE {
            return Self::new(Rational::new(nominal as i64 * 1000, 1001));
        }
        let hundredths = (fps * 100.0).round();
        if hundredths < 1.0 || hundredths > 99_999.0 {
            return Err(TimecodeError::InvalidFrameRate {
                value: fps.to_string(),
            });
        }
        Self::new(Rational::new(hundredths as i64, 100))
    }

    /// The exact rate.
    #[must_use]
    pub fn as_rational(&self) -> Rational {
        self.0
    }

    /// The rate as a floating point value.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.0.to_f64()
    }

    /// Nearest integer rate, used for SMPTE display math. Never below 1.
    #[must_use]
    pub fn nominal(&self) -> i64 {
        self.0.round().max(1)
    }

    /// Whether this is an NTSC-derived rate (`R * 1000/1001`).
    #[must_use]
    pub fn is_ntsc(&self) -> bool {
        self.0 == Rational::new(self.nominal() * 1000, 1001)
    }

    /// Whether drop-frame counting is defined for this rate.
    ///
    /// True for the NTSC rates whose nominal rate is a multiple of 30:
    /// 29.97, 59.94, 119.88 and so on.
    #[must_use]
    pub fn is_drop_eligible(&self) -> bool {
        self.is_ntsc() && self.nominal() % 30 == 0
    }

    /// Frame numbers skipped at each minute not divisible by ten, or 0 for a
    /// rate without drop-frame counting.
    #[must_use]
    pub fn drops_per_minute(&self) -> i64 {
        if self.is_drop_eligible() {
            2 * self.nominal() / 30
        } else {
            0
        }
    }

    /// Number of frames in one displayed 24-hour day.
    #[must_use]
    pub fn day_frame_capacity(&self, drop_frame: bool) -> i64 {
        let nominal_day = self.nominal() * SECONDS_PER_DAY;
        if drop_frame && self.is_drop_eligible() {
            nominal_day - self.drops_per_minute() * DROP_MINUTES_PER_DAY
        } else {
            nominal_day
        }
    }

    /// Real duration of one displayed day, in seconds.
    #[must_use]
    pub fn day_length(&self, drop_frame: bool) -> Rational {
        Rational::from_int(self.day_frame_capacity(drop_frame)) / self.0
    }

    /// Duration of a single frame, in seconds.
    #[must_use]
    pub fn frame_duration(&self) -> Rational {
        self.0.recip()
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_24
    }
}

impl TryFrom<Rational> for FrameRate {
    type Error = TimecodeError;

    fn try_from(rate: Rational) -> Result<Self> {
        Self::new(rate)
    }
}

impl From<FrameRate> for Rational {
    fn from(rate: FrameRate) -> Self {
        rate.0
    }
}

impl FromStr for FrameRate {
    type Err = TimecodeError;

    /// Parse `"24"`, `"29.97"` or `"30000/1001"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.contains('/') {
            return Self::new(s.parse::<Rational>()?);
        }
        let value: f64 = s.parse().map_err(|_| TimecodeError::InvalidFrameRate {
            value: s.to_string(),
        })?;
        Self::from_f64(value)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            return write!(f, "{}", self.0);
        }
        let text = format!("{:.3}", self.as_f64());
        write!(f, "{}", text.trim_end_matches('0').trim_end_matches('.'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nominal() {
        assert_eq!(FrameRate::FPS_23_976.nominal(), 24);
        assert_eq!(FrameRate::FPS_29_97.nominal(), 30);
        assert_eq!(FrameRate::FPS_119_88.nominal(), 120);
        assert_eq!(FrameRate::from_f64(0.01).unwrap().nominal(), 1);
    }

    #[test]
    fn test_drop_eligibility() {
        assert!(FrameRate::FPS_29_97.is_drop_eligible());
        assert!(FrameRate::FPS_59_94.is_drop_eligible());
        assert!(FrameRate::FPS_119_88.is_drop_eligible());
        assert!(!FrameRate::FPS_23_976.is_drop_eligible());
        assert!(!FrameRate::FPS_30.is_drop_eligible());
        assert!(!FrameRate::FPS_25.is_drop_eligible());
    }

    #[test]
    fn test_drops_per_minute() {
        assert_eq!(FrameRate::FPS_29_97.drops_per_minute(), 2);
        assert_eq!(FrameRate::FPS_59_94.drops_per_minute(), 4);
        assert_eq!(FrameRate::FPS_119_88.drops_per_minute(), 8);
        assert_eq!(FrameRate::FPS_24.drops_per_minute(), 0);
    }

    #[test]
    fn test_day_frame_capacity() {
        assert_eq!(FrameRate::FPS_24.day_frame_capacity(false), 2_073_600);
        assert_eq!(FrameRate::FPS_29_97.day_frame_capacity(false), 2_592_000);
        assert_eq!(FrameRate::FPS_29_97.day_frame_capacity(true), 2_589_408);
        assert_eq!(FrameRate::FPS_59_94.day_frame_capacity(true), 5_178_816);
        // drop-frame request on an ineligible rate is ignored
        assert_eq!(FrameRate::FPS_24.day_frame_capacity(true), 2_073_600);
    }

    #[test]
    fn test_from_f64_snaps_ntsc() {
        assert_eq!(FrameRate::from_f64(29.97).unwrap(), FrameRate::FPS_29_97);
        assert_eq!(FrameRate::from_f64(23.976).unwrap(), FrameRate::FPS_23_976);
        assert_eq!(FrameRate::from_f64(23.98).unwrap(), FrameRate::FPS_23_976);
        assert_eq!(FrameRate::from_f64(119.88).unwrap(), FrameRate::FPS_119_88);
        assert_eq!(FrameRate::from_f64(24.0).unwrap(), FrameRate::FPS_24);
        assert_eq!(
            FrameRate::from_f64(12.5).unwrap().as_rational(),
            Rational::new(25, 2)
        );
    }

    #[test]
    fn test_range_checked() {
        assert!(FrameRate::from_f64(0.0).is_err());
        assert!(FrameRate::from_f64(1000.0).is_err());
        assert!(FrameRate::new(Rational::new(1, 1000)).is_err());
        assert!(FrameRate::new(Rational::new(99_999, 100)).is_ok());
    }

    #[test]
    fn test_parse() {
        assert_eq!("29.97".parse::<FrameRate>().unwrap(), FrameRate::FPS_29_97);
        assert_eq!(
            "60000/1001".parse::<FrameRate>().unwrap(),
            FrameRate::FPS_59_94
        );
        assert!("fast".parse::<FrameRate>().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(FrameRate::FPS_24.to_string(), "24");
        assert_eq!(FrameRate::FPS_29_97.to_string(), "29.97");
        assert_eq!(FrameRate::FPS_23_976.to_string(), "23.976");
        assert_eq!(FrameRate::FPS_119_88.to_string(), "119.88");
    }

    #[test]
    fn test_frame_rate_serialization() {
        let json = serde_json::to_string(&FrameRate::FPS_29_97).unwrap();
        let decoded: FrameRate = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, FrameRate::FPS_29_97);
    }
}
