//! # FTP Regex
//!
//! Regular expressions to parse FTP responses and listings

use lazy_regex::{Lazy, Regex};

/// This regex extracts the date and time from a MLSx `modify` fact (`YYYYMMDDHHMMSS[.sss]`).
/// Fractional seconds are left out of the captures.
pub static MLSX_MODIFY_RE: Lazy<Regex> =
    lazy_regex!(r"^(\d{4})(\d{2})(\d{2})(\d{2})(\d{2})(\d{2})(?:\.\d+)?$");

/// This regex extracts hours, minutes and the meridiem from a DOS listing time (`03:09PM`).
pub static DOS_TIME_RE: Lazy<Regex> = lazy_regex!(r"^(\d{1,2}):(\d{2})\s*([AaPp][Mm])?$");

/// This regex matches a `ls -l` time of day (`13:46`).
pub static LS_TIME_RE: Lazy<Regex> = lazy_regex!(r"^(\d{1,2}):(\d{2})$");

/// This regex splits a server address: `[ftp[s]://]host[:port][/path]`. IPv6 hosts are enclosed in brackets.
pub static URL_RE: Lazy<Regex> = lazy_regex!(
    r"^(?:(?i:(ftps?))://)?(?:\[([0-9A-Fa-f:.]+)\]|([^\s:/\[\]]+))(?::(\d{1,5}))?(?:/.*)?$"
);
