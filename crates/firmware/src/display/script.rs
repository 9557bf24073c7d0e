//! Initialization command scripts.
//!
//! A script is an ordered sequence of [`Step`]s the driver replays during
//! `init()`: write the opcode, write its argument bytes, then sleep the
//! step's delay if it has one. The tables here are typed and built at
//! compile time.
//!
//! The classic packed byte encoding for these scripts (count prefix, then
//! per command an opcode, an argument-count byte whose top bit flags a
//! trailing delay byte, and the delay value with `255` meaning "use the long
//! default of 500 ms") survives only in [`parse_packed`], so tests can prove
//! the typed tables are wire-identical to the classic packed tables and that
//! the sentinel is honored exactly.

use super::commands::{Command, COLMOD_16BPP};

/// Argument-count byte flag marking a trailing delay byte.
pub const DELAY_FLAG: u8 = 0x80;

/// Packed delay byte meaning "long default delay", not a literal 255 ms.
pub const DELAY_SENTINEL: u8 = 255;

/// The delay the sentinel stands for.
pub const LONG_DELAY_MS: u16 = 500;

/// One scripted command: opcode, argument bytes, optional post-delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<'a> {
    /// Controller opcode.
    pub opcode: u8,
    /// Argument bytes (may be empty).
    pub args: &'a [u8],
    /// Milliseconds to sleep after the command, if any. Sentinel values are
    /// already resolved; this is always a literal duration.
    pub delay_ms: Option<u16>,
}

/// Boot-up phase: software reset, leave sleep, scan direction, 16bpp.
///
/// Frame-rate, power and VCOM settings stay at controller defaults. MADCTL
/// is 0 (no rotation) for the green-tab module this firmware ships on.
pub const BOOT: &[Step<'static>] = &[
    Step {
        opcode: Command::SwReset as u8,
        args: &[],
        delay_ms: Some(150),
    },
    Step {
        opcode: Command::SleepOut as u8,
        args: &[],
        delay_ms: Some(LONG_DELAY_MS),
    },
    Step {
        opcode: Command::MadCtl as u8,
        args: &[0x00],
        delay_ms: None,
    },
    Step {
        opcode: Command::ColMod as u8,
        args: &[COLMOD_16BPP],
        delay_ms: None,
    },
];

/// Gamma correction and display-on phase.
pub const DISPLAY_ON: &[Step<'static>] = &[
    Step {
        opcode: Command::GammaPositive as u8,
        args: &[
            0x02, 0x1C, 0x07, 0x12, 0x37, 0x32, 0x29, 0x2D, //
            0x29, 0x25, 0x2B, 0x39, 0x00, 0x01, 0x03, 0x10,
        ],
        delay_ms: None,
    },
    Step {
        opcode: Command::GammaNegative as u8,
        args: &[
            0x03, 0x1D, 0x07, 0x06, 0x2E, 0x2C, 0x29, 0x2D, //
            0x2E, 0x2E, 0x37, 0x3F, 0x00, 0x00, 0x02, 0x10,
        ],
        delay_ms: None,
    },
    Step {
        opcode: Command::NormalOn as u8,
        args: &[],
        delay_ms: Some(10),
    },
    Step {
        opcode: Command::DisplayOn as u8,
        args: &[],
        delay_ms: Some(100),
    },
];

/// Errors decoding a packed script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptError {
    /// The buffer ended inside a command record.
    Truncated,
    /// More commands than [`MAX_STEPS`].
    TooManySteps,
}

/// Upper bound on commands per packed script.
pub const MAX_STEPS: usize = 8;

/// Decode a packed script into typed steps.
///
/// Layout: `[count]` then per command `[opcode][argc | DELAY_FLAG?]`,
/// `argc` argument bytes, and one delay byte if the flag was set. A delay
/// byte of [`DELAY_SENTINEL`] resolves to [`LONG_DELAY_MS`].
///
/// # Errors
///
/// [`ScriptError::Truncated`] if the buffer ends early,
/// [`ScriptError::TooManySteps`] past [`MAX_STEPS`].
pub fn parse_packed(bytes: &[u8]) -> Result<heapless::Vec<Step<'_>, MAX_STEPS>, ScriptError> {
    let mut steps = heapless::Vec::new();
    let (&count, mut rest) = bytes.split_first().ok_or(ScriptError::Truncated)?;

    for _ in 0..count {
        let (&opcode, r) = rest.split_first().ok_or(ScriptError::Truncated)?;
        let (&argc_byte, r) = r.split_first().ok_or(ScriptError::Truncated)?;
        let has_delay = argc_byte & DELAY_FLAG != 0;
        let argc = usize::from(argc_byte & !DELAY_FLAG);

        if r.len() < argc {
            return Err(ScriptError::Truncated);
        }
        let (args, r) = r.split_at(argc);

        let (delay_ms, r) = if has_delay {
            let (&raw, r) = r.split_first().ok_or(ScriptError::Truncated)?;
            let ms = if raw == DELAY_SENTINEL {
                LONG_DELAY_MS
            } else {
                u16::from(raw)
            };
            (Some(ms), r)
        } else {
            (None, r)
        };

        steps
            .push(Step {
                opcode,
                args,
                delay_ms,
            })
            .map_err(|_| ScriptError::TooManySteps)?;
        rest = r;
    }

    Ok(steps)
}
