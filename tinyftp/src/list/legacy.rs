//! # Legacy listing heuristics
//!
//! `LIST` output has no grammar: these helpers recognize the two layouts met in the wild,
//! the Windows/IIS one and the Unix `ls -l` one, and extract names from the raw line so that
//! embedded spaces survive.

use chrono::{NaiveDate, NaiveDateTime};

use super::ParseError;
use crate::regex::{DOS_TIME_RE, LS_TIME_RE};

/// IIS pads date, time and size to fixed widths: the name always starts at this column
const DOS_NAME_COLUMN: usize = 39;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Fields of a recognized listing line
#[derive(Debug, PartialEq, Eq)]
pub(super) struct LegacyFields<'a> {
    pub name: &'a str,
    pub is_directory: bool,
    pub size: u64,
    pub modified: Option<NaiveDateTime>,
}

/// Byte ranges of the whitespace separated tokens of `line`
pub(super) fn token_spans(line: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in line.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, line.len()));
    }
    spans
}

/// Whether the line looks like a DOS listing: `MM-DD-YY  HH:MMPM ...`
pub(super) fn looks_like_dos(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next(), tokens.next()) {
        (Some(date), Some(time), Some(_), Some(_)) => date.contains('-') && time.contains(':'),
        _ => false,
    }
}

/// Look up a three letters month abbreviation (case sensitive)
pub(super) fn month_number(token: &str) -> Option<u32> {
    MONTHS
        .iter()
        .position(|m| *m == token)
        .map(|i| i as u32 + 1)
}

/// Parse a DOS line.
///
/// ```text
/// {DATE} {TIME} {<DIR> | SIZE} {FILENAME}
/// 10-19-20  03:19PM       <DIR>          pub
/// 04-08-14  03:09PM                  403 readme.txt
/// ```
pub(super) fn parse_dos(line: &str) -> Result<LegacyFields<'_>, ParseError> {
    let spans = token_spans(line);
    if spans.len() < 4 {
        return Err(ParseError::SyntaxError);
    }
    let token = |i: usize| &line[spans[i].0..spans[i].1];

    let date: Vec<&str> = token(0).split('-').collect();
    let [month, day, year] = date.as_slice() else {
        return Err(ParseError::SyntaxError);
    };
    let (month, day, year) = (
        month.parse::<u32>().map_err(|_| ParseError::SyntaxError)?,
        day.parse::<u32>().map_err(|_| ParseError::SyntaxError)?,
        year.parse::<i32>().map_err(|_| ParseError::SyntaxError)?,
    );
    let year = if year < 100 { year + 2000 } else { year };

    let time = DOS_TIME_RE
        .captures(token(1))
        .ok_or(ParseError::SyntaxError)?;
    let mut hour = time[1].parse::<u32>().map_err(|_| ParseError::SyntaxError)?;
    let minute = time[2].parse::<u32>().map_err(|_| ParseError::SyntaxError)?;
    match time.get(3).map(|m| m.as_str().to_ascii_uppercase()).as_deref() {
        Some("PM") if hour != 12 => hour += 12,
        Some("AM") if hour == 12 => hour = 0,
        _ => {}
    }

    let (is_directory, size) = match token(2) {
        "<DIR>" => (true, 0),
        size => (
            false,
            size.replace(',', "")
                .parse::<u64>()
                .map_err(|_| ParseError::BadSize)?,
        ),
    };

    let name = dos_name(line, spans[2].1);
    if name.is_empty() {
        return Err(ParseError::SyntaxError);
    }

    Ok(LegacyFields {
        name,
        is_directory,
        size,
        modified: NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(hour, minute, 0)),
    })
}

/// Name of a DOS entry, given the byte offset where the size field ends.
///
/// With the IIS fixed-width layout the name starts at column 39, and may begin with spaces.
/// Otherwise the name is what follows the size field.
pub(super) fn dos_name(line: &str, size_end: usize) -> &str {
    if line.len() > DOS_NAME_COLUMN
        && size_end <= DOS_NAME_COLUMN
        && line.is_char_boundary(DOS_NAME_COLUMN)
        && line[size_end..DOS_NAME_COLUMN].chars().all(char::is_whitespace)
    {
        &line[DOS_NAME_COLUMN..]
    } else {
        line[size_end..].trim_start()
    }
}

/// Parse a `ls -l` line.
///
/// Two layouts are tried in order:
///
/// 1. the full one, `perms links owner group size month day time|year name...`, where the name is the
///    raw remainder of the line, one delimiter after the time/year field;
/// 2. the one anchored on the first month token preceded by a size, for lines missing the owner or group
///    column: `perms ... size month day time|year name...`, with the name taken as in the full layout;
/// 3. the compact one, where fields are counted from the end of the line:
///    `... size month day time|year name`.
pub(super) fn parse_posix(line: &str, this_year: i32) -> Result<LegacyFields<'_>, ParseError> {
    let spans = token_spans(line);
    if spans.len() >= 9 {
        match parse_posix_full(line, &spans, this_year) {
            Ok(fields) => return Ok(fields),
            Err(err) => trace!("full ls layout doesn't match ({err}); trying month anchored layout"),
        }
    }
    if let Some(fields) = parse_posix_month_anchored(line, &spans, this_year) {
        return Ok(fields);
    }
    if spans.len() >= 6 {
        return parse_posix_compact(line, &spans, this_year);
    }
    Err(ParseError::SyntaxError)
}

fn parse_posix_full<'a>(
    line: &'a str,
    spans: &[(usize, usize)],
    this_year: i32,
) -> Result<LegacyFields<'a>, ParseError> {
    let token = move |i: usize| &line[spans[i].0..spans[i].1];
    let size = token(4).parse::<u64>().map_err(|_| ParseError::BadSize)?;
    let modified = parse_ls_date(token(5), token(6), token(7), this_year)?;
    let name = posix_name_after(line, spans[7].1);
    if name.is_empty() {
        return Err(ParseError::SyntaxError);
    }
    Ok(posix_fields(token(0), name, size, modified))
}

fn parse_posix_month_anchored<'a>(
    line: &'a str,
    spans: &[(usize, usize)],
    this_year: i32,
) -> Option<LegacyFields<'a>> {
    let token = move |i: usize| &line[spans[i].0..spans[i].1];
    // month, day and time|year must be followed by a name
    (2..spans.len().saturating_sub(3)).find_map(|month| {
        month_number(token(month))?;
        let size = token(month - 1).parse::<u64>().ok()?;
        let modified =
            parse_ls_date(token(month), token(month + 1), token(month + 2), this_year).ok()?;
        let name = posix_name_after(line, spans[month + 2].1);
        (!name.is_empty()).then(|| posix_fields(token(0), name, size, modified))
    })
}

fn parse_posix_compact<'a>(
    line: &'a str,
    spans: &[(usize, usize)],
    this_year: i32,
) -> Result<LegacyFields<'a>, ParseError> {
    let n = spans.len();
    let token = move |i: usize| &line[spans[i].0..spans[i].1];
    let size = token(n - 5)
        .parse::<u64>()
        .map_err(|_| ParseError::BadSize)?;
    let modified = parse_ls_date(token(n - 4), token(n - 3), token(n - 2), this_year)?;
    Ok(posix_fields(token(0), token(n - 1), size, modified))
}

fn posix_fields<'a>(
    permissions: &str,
    name: &'a str,
    size: u64,
    modified: Option<NaiveDateTime>,
) -> LegacyFields<'a> {
    // symlinks are listed as `name -> target`
    let name = match permissions.starts_with('l') {
        true => name.split(" -> ").next().unwrap_or(name),
        false => name,
    };
    LegacyFields {
        name,
        is_directory: permissions.starts_with('d'),
        size,
        modified,
    }
}

/// Raw remainder of `line` after the field ending at `field_end` and its delimiter
pub(super) fn posix_name_after(line: &str, field_end: usize) -> &str {
    let rest = &line[field_end..];
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => rest,
    }
}

/// Parse `month day time|year`.
///
/// A `HH:MM` field means the current year at that time of day; otherwise the field is the year,
/// and no time of day is known. Impossible calendar values give no date, unknown months or
/// malformed numbers mean the layout doesn't match.
fn parse_ls_date(
    month: &str,
    day: &str,
    time_or_year: &str,
    this_year: i32,
) -> Result<Option<NaiveDateTime>, ParseError> {
    let month = month_number(month).ok_or(ParseError::SyntaxError)?;
    let day = day.parse::<u32>().map_err(|_| ParseError::SyntaxError)?;
    let (year, hour, minute) = match LS_TIME_RE.captures(time_or_year) {
        Some(caps) => (
            this_year,
            caps[1].parse::<u32>().map_err(|_| ParseError::SyntaxError)?,
            caps[2].parse::<u32>().map_err(|_| ParseError::SyntaxError)?,
        ),
        None if time_or_year.len() == 4 => (
            time_or_year
                .parse::<i32>()
                .map_err(|_| ParseError::SyntaxError)?,
            0,
            0,
        ),
        None => return Err(ParseError::SyntaxError),
    };
    Ok(NaiveDate::from_ymd_opt(year, month, day).and_then(|d| d.and_hms_opt(hour, minute, 0)))
}

#[cfg(test)]
mod test {

    use pretty_assertions::assert_eq;

    use super::*;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|d| d.and_hms_opt(h, min, 0))
    }

    #[test]
    fn should_split_token_spans() {
        assert_eq!(token_spans("  ab c  def "), vec![(2, 4), (5, 6), (8, 11)]);
        assert_eq!(token_spans(""), vec![]);
        assert_eq!(token_spans("x"), vec![(0, 1)]);
    }

    #[test]
    fn should_lookup_months_case_sensitive() {
        assert_eq!(month_number("Jan"), Some(1));
        assert_eq!(month_number("Aug"), Some(8));
        assert_eq!(month_number("Dec"), Some(12));
        assert_eq!(month_number("jan"), None);
        assert_eq!(month_number("JAN"), None);
        assert_eq!(month_number("Ago"), None);
    }

    #[test]
    fn should_tell_dos_lines() {
        assert!(looks_like_dos("03-15-24  02:30PM  <DIR>  backups"));
        assert!(!looks_like_dos("03-15-24  02:30PM  <DIR>"));
        assert!(!looks_like_dos(
            "-rw-r--r--  1 user group  1024 Jan  5 2023 report.pdf"
        ));
    }

    #[test]
    fn should_parse_iis_fixed_width_lines() {
        let line = "10-19-20  03:19PM       <DIR>          pub";
        assert_eq!(line.find("pub"), Some(39));
        let fields = parse_dos(line).unwrap();
        assert_eq!(fields.name, "pub");
        assert!(fields.is_directory);
        assert_eq!(fields.size, 0);
        assert_eq!(fields.modified, datetime(2020, 10, 19, 15, 19));

        let fields = parse_dos("04-08-14  03:09AM                  403 my readme.txt").unwrap();
        assert_eq!(fields.name, "my readme.txt");
        assert!(!fields.is_directory);
        assert_eq!(fields.size, 403);
        assert_eq!(fields.modified, datetime(2014, 4, 8, 3, 9));
    }

    #[test]
    fn should_keep_leading_spaces_at_fixed_column() {
        let line = "04-08-14  03:09PM                  403   spaced.txt";
        assert_eq!(parse_dos(line).unwrap().name, "  spaced.txt");
    }

    #[test]
    fn should_parse_compact_dos_lines() {
        let fields = parse_dos("03-15-24  02:30PM  <DIR>  backups").unwrap();
        assert_eq!(fields.name, "backups");
        assert!(fields.is_directory);
        assert_eq!(fields.size, 0);
        assert_eq!(fields.modified, datetime(2024, 3, 15, 14, 30));
        let fields = parse_dos("03-15-24  02:30PM  1,024  a b.txt").unwrap();
        assert_eq!(fields.name, "a b.txt");
        assert_eq!(fields.size, 1024);
    }

    #[test]
    fn should_convert_meridiem() {
        assert_eq!(
            parse_dos("01-01-24  12:05AM  1  a").unwrap().modified,
            datetime(2024, 1, 1, 0, 5)
        );
        assert_eq!(
            parse_dos("01-01-24  12:05PM  1  a").unwrap().modified,
            datetime(2024, 1, 1, 12, 5)
        );
        assert_eq!(
            parse_dos("01-01-24  11:59PM  1  a").unwrap().modified,
            datetime(2024, 1, 1, 23, 59)
        );
        assert_eq!(
            parse_dos("01-01-2024  17:20  1  a").unwrap().modified,
            datetime(2024, 1, 1, 17, 20)
        );
    }

    #[test]
    fn should_reject_bad_dos_lines() {
        assert_eq!(
            parse_dos("-08-14  03:09PM  <DIR> docs").unwrap_err(),
            ParseError::SyntaxError
        );
        assert_eq!(
            parse_dos("04-08-14  03:09PM  OMAR docs").unwrap_err(),
            ParseError::BadSize
        );
        // impossible date, but the line shape is fine
        assert_eq!(parse_dos("34-08-14  03:09PM  <DIR> docs").unwrap().modified, None);
    }

    #[test]
    fn should_parse_full_posix_layout() {
        let fields =
            parse_posix("-rw-r--r--  1 user group  1024 Jan  5 2023 report.pdf", 2026).unwrap();
        assert_eq!(fields.name, "report.pdf");
        assert!(!fields.is_directory);
        assert_eq!(fields.size, 1024);
        assert_eq!(fields.modified, datetime(2023, 1, 5, 0, 0));

        let fields = parse_posix(
            "-r--r--r--    1 23        23         1234567 Jan 1  2000 01 1234 foo.mp3",
            2026,
        )
        .unwrap();
        assert_eq!(fields.name, "01 1234 foo.mp3");
        assert_eq!(fields.size, 1234567);
    }

    #[test]
    fn should_use_current_year_with_time_of_day() {
        let fields =
            parse_posix("drwxr-xr-x  2 ftp ftp  4096 Nov  5 16:32 incoming", 2026).unwrap();
        assert_eq!(fields.name, "incoming");
        assert!(fields.is_directory);
        assert_eq!(fields.modified, datetime(2026, 11, 5, 16, 32));
    }

    #[test]
    fn should_parse_compact_posix_layout() {
        let fields = parse_posix("-rw-r--r-- 1024 Jan 5 2023 report.pdf", 2026).unwrap();
        assert_eq!(fields.name, "report.pdf");
        assert_eq!(fields.size, 1024);
        assert_eq!(fields.modified, datetime(2023, 1, 5, 0, 0));
        // no group column: too short for the full layout
        let fields = parse_posix("drwxr-xr-x 3 owner 4096 Mar 18 2018 docs", 2026).unwrap();
        assert_eq!(fields.name, "docs");
        assert!(fields.is_directory);
        assert_eq!(fields.size, 4096);
        assert_eq!(fields.modified, datetime(2018, 3, 18, 0, 0));
    }

    #[test]
    fn should_anchor_on_month_without_group_column() {
        let fields = parse_posix("drwxr-xr-x 3 owner 4096 Mar 18 2018 my docs", 2026).unwrap();
        assert_eq!(fields.name, "my docs");
        assert!(fields.is_directory);
        assert_eq!(fields.size, 4096);
        assert_eq!(fields.modified, datetime(2018, 3, 18, 0, 0));

        let fields = parse_posix("-rw-r--r-- 1 ftp 512 Nov  5 16:32 read me.txt", 2026).unwrap();
        assert_eq!(fields.name, "read me.txt");
        assert_eq!(fields.size, 512);
        assert_eq!(fields.modified, datetime(2026, 11, 5, 16, 32));
    }

    #[test]
    fn should_strip_symlink_target() {
        let fields =
            parse_posix("lrwxrwxrwx 1 root root 7 Jan 5 2023 latest -> v1.2.3", 2026).unwrap();
        assert_eq!(fields.name, "latest");
        assert!(!fields.is_directory);
    }

    #[test]
    fn should_reject_bad_posix_lines() {
        assert_eq!(parse_posix("total 24", 2026).unwrap_err(), ParseError::SyntaxError);
        assert!(parse_posix("drwxrwxr-x 1 0  9  Nov 5 2018", 2026).is_err());
        assert!(parse_posix("-rw-r--r-- 1 u g 10 Foo 5 2018 a.txt", 2026).is_err());
        // impossible date: kept without a date
        assert_eq!(
            parse_posix("-rw-r--r-- 1 u g 10 Feb 31 2018 a.txt", 2026)
                .unwrap()
                .modified,
            None
        );
    }

    #[test]
    fn should_take_name_after_one_delimiter() {
        assert_eq!(posix_name_after("2023 report.pdf", 4), "report.pdf");
        assert_eq!(posix_name_after("2023  lead.txt", 4), " lead.txt");
        assert_eq!(posix_name_after("2023", 4), "");
    }
}
