//! Property-based tests for timecode parsing and formatting.
//!
//! These check that every notation reads back what it writes, that
//! drop-frame numbering is a bijection, and that strict wrapping always
//! lands inside one displayed day.

use framecode_timecode::{
    fields_to_frame, frame_to_fields, is_dropped_frame, FrameRate, Rational, TimeRange, Timecode,
    TimecodeKind, TimecodeOptions,
};
use proptest::prelude::*;

/// Representative rates with their drop-frame setting.
const RATES: [(FrameRate, bool); 10] = [
    (FrameRate::FPS_23_976, false),
    (FrameRate::FPS_24, false),
    (FrameRate::FPS_25, false),
    (FrameRate::FPS_29_97, true),
    (FrameRate::FPS_29_97, false),
    (FrameRate::FPS_30, false),
    (FrameRate::FPS_59_94, true),
    (FrameRate::FPS_60, false),
    (FrameRate::FPS_119_88, true),
    (FrameRate::FPS_119_88, false),
];

const DROP_FRAME_RATES: [FrameRate; 3] = [
    FrameRate::FPS_29_97,
    FrameRate::FPS_59_94,
    FrameRate::FPS_119_88,
];

fn options(rate: usize) -> TimecodeOptions {
    let (fps, drop_frame) = RATES[rate];
    TimecodeOptions::default()
        .with_fps(fps)
        .with_drop_frame(drop_frame)
}

fn capacity(rate: usize) -> i64 {
    let (fps, drop_frame) = RATES[rate];
    fps.day_frame_capacity(drop_frame)
}

/// Kinds whose output resolves every frame at this rate.
fn frame_accurate_kinds(fps: FrameRate) -> Vec<TimecodeKind> {
    TimecodeKind::ALL
        .into_iter()
        // hundredths of a second cannot tell frames apart above 60 fps
        .filter(|kind| *kind != TimecodeKind::Ffmpeg || fps.nominal() <= 60)
        .collect()
}

// ============================================================================
// Format Round-Trips
// ============================================================================

proptest! {
    /// Formatting a frame in any kind and parsing it back as that kind
    /// recovers the frame.
    #[test]
    fn prop_every_kind_roundtrips(rate in 0..RATES.len(), frame in 0i64..20_000_000) {
        let options = options(rate);
        let frame = frame % capacity(rate);
        let tc = Timecode::with_options(frame, &options).unwrap();
        prop_assert_eq!(tc.framecount(), frame);

        for kind in frame_accurate_kinds(options.fps) {
            let text = tc.timecode_output(Some(kind), 0);
            let parsed = Timecode::with_options(text.as_str(), &options.with_kind(kind)).unwrap();
            prop_assert_eq!(parsed.framecount(), frame, "{} as {} at {}", text, kind, options.fps);
        }
    }

    /// Auto-detection reads each clock notation back as the kind that
    /// wrote it.
    #[test]
    fn prop_detection_matches_writer(rate in 0..8usize, frame in 0i64..5_000_000) {
        let options = options(rate);
        let frame = frame % capacity(rate);
        let tc = Timecode::with_options(frame, &options).unwrap();

        for kind in [
            TimecodeKind::Smpte,
            TimecodeKind::Srt,
            TimecodeKind::Ffmpeg,
            TimecodeKind::Dlp,
            TimecodeKind::Frame,
            TimecodeKind::Time,
        ] {
            let text = tc.timecode_output(Some(kind), 0);
            let parsed = Timecode::with_options(text.as_str(), &options).unwrap();
            prop_assert_eq!(parsed.kind(), kind, "{}", text);
        }
    }

    /// Negative values survive SMPTE formatting when not wrapped.
    #[test]
    fn prop_negative_smpte_roundtrips(rate in 0..RATES.len(), frame in -5_000_000i64..5_000_000) {
        let options = options(rate).with_strict(false);
        let tc = Timecode::with_options(frame, &options).unwrap();
        let text = tc.timecode_output(Some(TimecodeKind::Smpte), 0);
        prop_assert_eq!(text.starts_with('-'), frame < 0);

        let parsed = Timecode::with_options(text.as_str(), &options).unwrap();
        prop_assert_eq!(parsed.framecount(), frame);
    }

    /// FCPX output keeps the exact value, frame-aligned or not.
    #[test]
    fn prop_fcpx_is_exact(num in -1_000_000i64..1_000_000, den in 1i64..100_000) {
        let options = TimecodeOptions::default().with_strict(false);
        let tc = Timecode::with_options(Rational::new(num, den), &options).unwrap();
        let text = tc.timecode_output(Some(TimecodeKind::Fcpx), 0);

        let parsed = Timecode::with_options(
            text.as_str(),
            &options.with_kind(TimecodeKind::Fcpx),
        )
        .unwrap();
        prop_assert_eq!(parsed.precise_timestamp(), tc.precise_timestamp());
    }
}

// ============================================================================
// Drop-Frame Numbering
// ============================================================================

proptest! {
    /// Encoding then decoding a frame index is the identity.
    #[test]
    fn prop_drop_frame_decode_inverts_encode(rate in 0..DROP_FRAME_RATES.len(), frame in 0u64..25_000_000) {
        let fps = DROP_FRAME_RATES[rate];
        let fields = frame_to_fields(frame, fps, true);
        prop_assert_eq!(fields_to_frame(&fields, fps, true), frame);
    }

    /// Encoding never shows a dropped frame number.
    #[test]
    fn prop_drop_frame_never_emits_dropped_numbers(rate in 0..DROP_FRAME_RATES.len(), frame in 0u64..25_000_000) {
        let fps = DROP_FRAME_RATES[rate];
        let fields = frame_to_fields(frame, fps, true);
        prop_assert!(!is_dropped_frame(fields.minutes, fields.seconds, fields.frames, fps));
        prop_assert!(fields.frames < fps.nominal() as u64);
        prop_assert!(fields.minutes < 60 && fields.seconds < 60);
    }

    /// Consecutive frames show consecutive or drop-skipped numbers, never
    /// going backwards.
    #[test]
    fn prop_drop_frame_display_is_monotonic(rate in 0..DROP_FRAME_RATES.len(), frame in 0u64..25_000_000) {
        let fps = DROP_FRAME_RATES[rate];
        let nominal = fps.nominal() as u64;
        let here = frame_to_fields(frame, fps, true).nominal_index(nominal);
        let next = frame_to_fields(frame + 1, fps, true).nominal_index(nominal);
        let step = next - here;
        prop_assert!(step == 1 || step == 1 + fps.drops_per_minute() as u64);
    }
}

// ============================================================================
// Strict Wrapping
// ============================================================================

proptest! {
    /// Any number of whole days either side of a frame wraps back to it.
    #[test]
    fn prop_strict_wraps_whole_days(rate in 0..RATES.len(), frame in 0i64..10_000_000, days in -3i64..4) {
        let options = options(rate);
        let frame = frame % capacity(rate);
        let shifted = frame + days * capacity(rate);

        let tc = Timecode::with_options(shifted, &options).unwrap();
        prop_assert_eq!(tc.framecount(), frame);
    }

    /// Strict values always lie in one displayed day.
    #[test]
    fn prop_strict_stays_in_one_day(
        rate in 0..RATES.len(),
        num in -3_000_000_000i64..3_000_000_000,
        den in 1i64..10_000,
    ) {
        let options = options(rate);
        let (fps, drop_frame) = RATES[rate];
        let tc = Timecode::with_options(Rational::new(num, den), &options).unwrap();

        prop_assert!(!tc.precise_timestamp().is_negative());
        prop_assert!(tc.precise_timestamp() < fps.day_length(drop_frame));
        prop_assert!(tc.framecount() < capacity(rate));
    }

    /// Turning strict on twice changes nothing the second time.
    #[test]
    fn prop_set_strict_idempotent(rate in 0..RATES.len(), frame in -50_000_000i64..50_000_000) {
        let mut tc = Timecode::with_options(frame, &options(rate).with_strict(false)).unwrap();
        tc.set_strict(true);
        let once = tc.precise_timestamp();
        tc.set_strict(true);
        prop_assert_eq!(tc.precise_timestamp(), once);
    }
}

// ============================================================================
// Rate Changes and Ranges
// ============================================================================

proptest! {
    /// Changing rate without rounding keeps the exact timestamp.
    #[test]
    fn prop_set_fps_without_rounding_is_lossless(from in 0..RATES.len(), to in 0..RATES.len(), frame in 0i64..1_000_000) {
        let options = options(from).with_strict(false);
        let mut tc = Timecode::with_options(frame, &options).unwrap();
        let before = tc.precise_timestamp();

        tc.set_fps(RATES[to].0, false);
        tc.set_fps(RATES[from].0, false);
        prop_assert_eq!(tc.precise_timestamp(), before);
        prop_assert_eq!(tc.framecount(), frame);
    }

    /// Separated parts tile the range without gaps.
    #[test]
    fn prop_separate_tiles_range(start in 0i64..1_000_000, length in 10i64..100_000, parts in 2usize..10) {
        let options = TimecodeOptions::default();
        let range = TimeRange::parse(start, start + length, &options).unwrap();
        let pieces = range.separate(parts).unwrap();

        prop_assert_eq!(pieces.len(), parts);
        prop_assert_eq!(pieces[0].start(), range.start());
        prop_assert_eq!(pieces[parts - 1].end(), range.end());
        for pair in pieces.windows(2) {
            prop_assert_eq!(pair[0].end(), pair[1].start());
        }
    }
}
