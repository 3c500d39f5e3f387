//! Namespace colors, level colors and terminal color support

use crate::config::LogLevel;
use crossterm::tty::IsTty;

/// Palette for terminals with at least 256 colors
pub const ANSI_256_PALETTE: [u8; 76] = [
    20, 21, 26, 27, 32, 33, 38, 39, 40, 41, 42, 43, 44, 45, 56, 57, 62, 63, 68, 69, 74, 75, 76,
    77, 78, 79, 80, 81, 92, 93, 98, 99, 112, 113, 128, 129, 134, 135, 148, 149, 160, 161, 162,
    163, 164, 165, 166, 167, 168, 169, 170, 171, 172, 173, 178, 179, 184, 185, 196, 197, 198,
    199, 200, 201, 202, 203, 204, 205, 206, 207, 208, 209, 214, 215, 220, 221,
];

/// Palette for basic terminals
pub const BASIC_PALETTE: [u8; 6] = [6, 2, 3, 4, 5, 1];

/// ANSI-256 color of a level label
pub fn level_color(level: LogLevel) -> u8 {
    match level {
        LogLevel::Error => 160,
        LogLevel::Warn => 11,
        LogLevel::Info => 29,
        LogLevel::Debug | LogLevel::All => 24,
    }
}

/// 32-bit signed string hash, `hash * 31 + c` with wraparound at every step.
pub fn namespace_hash(namespace: &str) -> i32 {
    namespace.encode_utf16().fold(0i32, |hash, unit| {
        (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    })
}

/// Pick a stable palette entry for `namespace`.
pub fn select_color(namespace: &str, palette: &[u8]) -> u8 {
    if palette.is_empty() {
        return 0;
    }
    let index = namespace_hash(namespace).unsigned_abs() as usize % palette.len();
    palette[index]
}

/// Color depth of the output terminal: 0 none, 1 basic, 2 ANSI-256, 3 truecolor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ColorSupport {
    level: u8,
}

impl ColorSupport {
    pub const NONE: ColorSupport = ColorSupport { level: 0 };
    pub const BASIC: ColorSupport = ColorSupport { level: 1 };
    pub const ANSI_256: ColorSupport = ColorSupport { level: 2 };
    pub const TRUECOLOR: ColorSupport = ColorSupport { level: 3 };

    /// Probe stderr and the environment.
    pub fn detect() -> Self {
        Self::from_env(
            |key| std::env::var(key).ok(),
            std::io::stderr().is_tty(),
        )
    }

    /// Probe using an arbitrary variable lookup and TTY status.
    pub fn from_env<F>(var: F, is_tty: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if var("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            return Self::NONE;
        }

        if let Some(force) = var("FORCE_COLOR") {
            return match force.as_str() {
                "0" | "false" => Self::NONE,
                "2" => Self::ANSI_256,
                "3" => Self::TRUECOLOR,
                _ => Self::BASIC,
            };
        }

        if !is_tty || var("TERM").as_deref() == Some("dumb") {
            return Self::NONE;
        }

        if matches!(var("COLORTERM").as_deref(), Some("truecolor") | Some("24bit")) {
            return Self::TRUECOLOR;
        }

        match var("TERM") {
            Some(term) if term.ends_with("256color") || term.ends_with("256") => Self::ANSI_256,
            _ => Self::BASIC,
        }
    }

    pub fn level(self) -> u8 {
        self.level
    }

    /// Palette namespaces draw their colors from
    pub fn palette(self) -> &'static [u8] {
        if self.level >= 2 {
            &ANSI_256_PALETTE
        } else {
            &BASIC_PALETTE
        }
    }
}
