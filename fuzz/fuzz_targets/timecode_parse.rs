#![no_main]

//! Fuzz target for timecode literal parsing.
//!
//! Feeds arbitrary literals through detection and parsing at arbitrary
//! rates, then formats whatever parses in every kind.

use arbitrary::Arbitrary;
use framecode_timecode::{FrameRate, Timecode, TimecodeKind, TimecodeOptions};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct TimecodeInput {
    /// Literal to parse
    literal: String,
    /// Frame rate in hundredths
    fps_hundredths: u32,
    /// Declared kind, or auto-detection
    kind: KindChoice,
    drop_frame: bool,
    strict: bool,
}

#[derive(Arbitrary, Debug)]
enum KindChoice {
    Auto,
    Declared(u8),
}

fuzz_target!(|input: TimecodeInput| {
    // Limit input size to keep iterations fast
    if input.literal.len() > 256 {
        return;
    }

    let Ok(fps) = FrameRate::from_f64(f64::from(input.fps_hundredths % 100_000) / 100.0) else {
        return;
    };

    let kind = match input.kind {
        KindChoice::Auto => None,
        KindChoice::Declared(index) => {
            Some(TimecodeKind::ALL[index as usize % TimecodeKind::ALL.len()])
        }
    };

    let options = TimecodeOptions::default()
        .with_kind(kind)
        .with_fps(fps)
        .with_drop_frame(input.drop_frame)
        .with_strict(input.strict);

    // Parsing must never panic, only fail
    let Ok(tc) = Timecode::with_options(input.literal.as_str(), &options) else {
        return;
    };

    // Anything that parsed must format in every kind
    for kind in TimecodeKind::ALL {
        for part in 0..=5 {
            let _ = tc.timecode_output(Some(kind), part);
        }
    }
    let _ = tc.framecount();
    let _ = -tc;
});
