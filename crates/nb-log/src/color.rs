//! ANSI color helpers.
//!
//! Styles apply only while color is enabled on the owning logger; with
//! color off every function passes text through unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Named style functions honoring a color-enablement flag.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    enabled: bool,
}

impl ColorPalette {
    pub fn new(enabled: bool) -> Self {
        ColorPalette { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    fn wrap(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    pub fn red(&self, text: &str) -> String {
        self.wrap(RED, text)
    }

    pub fn green(&self, text: &str) -> String {
        self.wrap(GREEN, text)
    }

    pub fn yellow(&self, text: &str) -> String {
        self.wrap(YELLOW, text)
    }

    pub fn blue(&self, text: &str) -> String {
        self.wrap(BLUE, text)
    }

    pub fn magenta(&self, text: &str) -> String {
        self.wrap(MAGENTA, text)
    }

    pub fn cyan(&self, text: &str) -> String {
        self.wrap(CYAN, text)
    }

    pub fn bold(&self, text: &str) -> String {
        self.wrap(BOLD, text)
    }

    pub fn dim(&self, text: &str) -> String {
        self.wrap(DIM, text)
    }
}

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Remove ANSI style sequences from text.
pub fn strip_color(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}
