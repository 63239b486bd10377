//! # List
//!
//! This module exposes the parsers for the directory listings returned by `MLSD`, `MLST` and `LIST`.
//!
//! `MLSD` and `MLST` have a grammar (RFC 3659): each line is a set of `fact=value;` pairs followed by a
//! space and the entry name. `LIST` has none: its output depends on the remote server, so it's parsed with
//! heuristics recognizing the Windows/IIS layout and the Unix `ls -l` layout.
//! Lines which can't be recognized are skipped: a partial listing is still a listing.
//!
//! ## Get started
//!
//! The [`FtpClient`](crate::FtpClient) parses listings for you, choosing the grammar once per session,
//! after login. Raw lines can be parsed as well:
//!
//! ```rust
//! use tinyftp::list::{parse_listing, ListingFormat};
//!
//! let lines = [
//!     "type=dir;modify=20240315143000; backups",
//!     "type=file;size=1024;modify=20230105000000; report.pdf",
//! ];
//! let entries = parse_listing(&lines, ListingFormat::Machine, 2024);
//! assert_eq!(entries.len(), 2);
//! assert!(entries[0].is_directory());
//! ```

mod legacy;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::command::Command;
use crate::command::feat::supports_machine_listing;
use crate::regex::MLSX_MODIFY_RE;
use crate::types::Features;

// -- Directory entry

/// Describes an entry of a remote directory.
/// This data type is returned in a collection after parsing a listing
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash)]
pub struct DirEntry {
    name: String,
    is_directory: bool,
    size: u64,
    modified: Option<NaiveDateTime>,
}

/// The grammar used to parse directory listings.
///
/// Listings carry no marker of their format, so the grammar is chosen from the features advertised by
/// the server (`FEAT`) and kept for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingFormat {
    /// `MLSD`: machine-readable `fact=value;... name` lines
    Machine,
    /// `LIST`: human-readable lines, parsed with heuristics
    #[default]
    Legacy,
}

// -- Error

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("Syntax error: invalid line")]
    SyntaxError,
    #[error("Bad file size")]
    BadSize,
    #[error("Entry describes the listed directory or its parent")]
    SelfReference,
}

impl DirEntry {
    /// Instantiates a new `DirEntry`
    pub fn new(
        name: impl ToString,
        is_directory: bool,
        size: u64,
        modified: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            name: name.to_string(),
            is_directory,
            size,
            modified,
        }
    }

    // -- getters

    /// Get entry name
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Get whether entry is a directory
    pub fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// Get whether entry is a file
    pub fn is_file(&self) -> bool {
        !self.is_directory
    }

    /// Entry size in bytes as reported by the server. Usually meaningless for directories
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Last modification time, if the server reported a valid one
    pub fn modified(&self) -> Option<NaiveDateTime> {
        self.modified
    }

    // -- parsers

    /// Parse a line from a MLSD listing or from a MLST reply.
    ///
    /// Fact names are case insensitive. Facts used are `type`, `size` and `modify`.
    /// The name is whatever follows the last `"; "`.
    pub fn from_mlsx_line(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_start();
        let (facts, name) = line.rsplit_once("; ").ok_or(ParseError::SyntaxError)?;
        if name.is_empty() {
            return Err(ParseError::SyntaxError);
        }
        if name == "." || name == ".." {
            return Err(ParseError::SelfReference);
        }
        let mut entry = DirEntry::new(name, false, 0, None);
        let mut facts_found = 0;
        for (key, value) in facts.split(';').filter_map(|fact| fact.split_once('=')) {
            facts_found += 1;
            match key.to_ascii_lowercase().as_str() {
                "type" => match value.to_ascii_lowercase().as_str() {
                    "dir" => entry.is_directory = true,
                    "cdir" | "pdir" => return Err(ParseError::SelfReference),
                    _ => entry.is_directory = false,
                },
                "size" => {
                    entry.size = value.parse::<u64>().unwrap_or_else(|_| {
                        trace!("bad size fact {value:?} for {name}");
                        0
                    });
                }
                "modify" => entry.modified = Self::parse_mlsx_time(value),
                _ => continue,
            }
        }
        if facts_found == 0 {
            return Err(ParseError::SyntaxError);
        }

        Ok(entry)
    }

    /// Parse a `LIST` output line, either in DOS or in POSIX format.
    ///
    /// `this_year` is the year given to POSIX entries showing a time of day instead of the year.
    pub fn from_legacy_line(line: &str, this_year: i32) -> Result<Self, ParseError> {
        let fields = if legacy::looks_like_dos(line) {
            legacy::parse_dos(line)?
        } else {
            legacy::parse_posix(line, this_year)?
        };
        trace!(
            "Found entry with name {}, directory: {}, size: {}",
            fields.name,
            fields.is_directory,
            fields.size
        );
        Ok(DirEntry::new(
            fields.name,
            fields.is_directory,
            fields.size,
            fields.modified,
        ))
    }

    /// Convert MLSx `modify` fact to a date time. Fractional seconds are ignored
    fn parse_mlsx_time(tm: &str) -> Option<NaiveDateTime> {
        let caps = MLSX_MODIFY_RE.captures(tm)?;
        let number = |i: usize| caps[i].parse::<u32>().ok();
        NaiveDate::from_ymd_opt(caps[1].parse::<i32>().ok()?, number(2)?, number(3)?)?.and_hms_opt(
            number(4)?,
            number(5)?,
            number(6)?,
        )
    }
}

impl ListingFormat {
    /// Choose the listing format from the features advertised by the server
    pub fn from_features(features: &Features) -> Self {
        if supports_machine_listing(features) {
            Self::Machine
        } else {
            Self::Legacy
        }
    }

    /// The command which produces a listing in this format
    pub(crate) fn command(&self, pathname: Option<&str>) -> Command {
        let pathname = pathname.map(|p| p.to_string());
        match self {
            Self::Machine => Command::Mlsd(pathname),
            Self::Legacy => Command::List(pathname),
        }
    }

    /// Parse a single listing line in this format
    pub fn parse_line(&self, line: &str, this_year: i32) -> Result<DirEntry, ParseError> {
        match self {
            Self::Machine => DirEntry::from_mlsx_line(line),
            Self::Legacy => DirEntry::from_legacy_line(line, this_year),
        }
    }
}

/// Parse the lines of a listing, keeping the order of the server.
/// Lines which can't be parsed are skipped.
pub fn parse_listing<S: AsRef<str>>(
    lines: &[S],
    format: ListingFormat,
    this_year: i32,
) -> Vec<DirEntry> {
    lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match format.parse_line(line, this_year) {
            Ok(entry) => Some(entry),
            Err(err) => {
                trace!("skipping listing line {line:?}: {err}");
                None
            }
        })
        .collect()
}
