//! Screenshot filename grammar
//!
//! Recognizes names of the form
//! `<Prefix> <YYYY-MM-DD> at <H>.<MM>.<SS>[ <AM|PM>][ <seq>|(<seq>)].<ext>`
//! and rebuilds them in canonical form: lower-case prefix, 24-hour clock with
//! a zero-padded hour, and a bare sequence number.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::fmt;
use tracing::trace;

/// AM/PM designator of a 12-hour timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("am") {
            Some(Self::Am)
        } else if value.eq_ignore_ascii_case("pm") {
            Some(Self::Pm)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Components captured from a matching filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMatch {
    /// Capture date, `YYYY-MM-DD`
    pub date: String,
    /// Hour as written (12-hour when `meridiem` is set, 24-hour otherwise)
    pub hour: u32,
    /// Two-digit minute
    pub minute: String,
    /// Two-digit second
    pub second: String,
    /// `None` for names already using a 24-hour clock
    pub meridiem: Option<Meridiem>,
    /// Disambiguation number, without any parentheses it was written with
    pub sequence: Option<String>,
    /// Extension without the leading dot, case preserved
    pub extension: String,
}

impl ParsedMatch {
    /// Hour on a 24-hour clock
    pub fn to_24_hour(&self) -> u32 {
        match self.meridiem {
            None => self.hour,
            Some(Meridiem::Pm) if self.hour != 12 => self.hour + 12,
            Some(Meridiem::Am) if self.hour == 12 => 0,
            Some(_) => self.hour,
        }
    }

    /// Canonical filename for this match
    pub fn build_name(&self, prefix: &str) -> String {
        let mut name = format!(
            "{} {} at {:02}.{}.{}",
            prefix.to_lowercase(),
            self.date,
            self.to_24_hour(),
            self.minute,
            self.second
        );
        if let Some(seq) = &self.sequence {
            name.push(' ');
            name.push_str(seq);
        }
        name.push('.');
        name.push_str(&self.extension);
        name
    }
}

/// Matcher bound to a single screenshot prefix
#[derive(Debug, Clone)]
pub struct FilenameGrammar {
    prefix: String,
    regex: Regex,
}

impl FilenameGrammar {
    /// Build a matcher for `prefix`
    ///
    /// The prefix is matched literally and case-insensitively. The rest of the
    /// pattern is fixed, so an error here means the grammar itself is broken.
    pub fn compile(prefix: &str) -> Result<Self> {
        let pattern = format!(
            r"^{} ([0-9]{{4}}-[0-9]{{2}}-[0-9]{{2}}) at ([0-9]{{1,2}})\.([0-9]{{2}})\.([0-9]{{2}})(?:\s+(AM|PM))?(?:\s+(?:([0-9]+)|\(([0-9]+)\)))?\.([A-Za-z0-9]+)$",
            regex::escape(prefix)
        );

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::config(format!("Invalid filename grammar for {prefix:?}: {e}")))?;

        Ok(Self {
            prefix: prefix.to_string(),
            regex,
        })
    }

    /// The prefix this matcher was compiled for
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse `filename`, returning `None` unless the whole name conforms
    pub fn parse(&self, filename: &str) -> Option<ParsedMatch> {
        let caps = self.regex.captures(filename)?;

        let hour = caps.get(2)?.as_str().parse::<u32>().ok()?;
        let meridiem = match caps.get(5) {
            Some(m) => Some(Meridiem::parse(m.as_str())?),
            None => None,
        };
        let sequence = caps
            .get(6)
            .or_else(|| caps.get(7))
            .map(|m| m.as_str().to_string());

        let parsed = ParsedMatch {
            date: caps.get(1)?.as_str().to_string(),
            hour,
            minute: caps.get(3)?.as_str().to_string(),
            second: caps.get(4)?.as_str().to_string(),
            meridiem,
            sequence,
            extension: caps.get(8)?.as_str().to_string(),
        };

        trace!(
            filename,
            hour = parsed.hour,
            meridiem = ?parsed.meridiem,
            sequence = ?parsed.sequence,
            "Matched screenshot filename"
        );
        Some(parsed)
    }

    /// Canonical name for `filename`, if it matches
    pub fn canonical_name(&self, filename: &str) -> Option<String> {
        self.parse(filename).map(|m| m.build_name(&self.prefix))
    }

    /// Whether `filename` matches and is not yet in canonical form
    pub fn needs_rename(&self, filename: &str) -> bool {
        self.canonical_name(filename)
            .is_some_and(|canonical| canonical != filename)
    }
}
