//! # Reply reader
//!
//! Reads one logical reply, possibly spanning many lines, from the control connection.
//!
//! ```text
//! 150-Opening      ->  code 150
//! 150 done         ->  message "Opening\ndone"
//! ```

use std::io::BufRead;

use crate::types::Reply;

/// Outcome of reading a reply
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Received {
    /// A complete reply; the unusable one if the first line had no valid code
    Reply(Reply),
    /// The transport hit EOF or failed. Carries what was read of a multi-line reply, the unusable reply otherwise
    Hangup(Reply),
}

/// Read one reply from `reader`
pub(crate) fn read_reply<R: BufRead>(reader: &mut R) -> Received {
    let Some(first) = read_line(reader) else {
        return Received::Hangup(Reply::unusable());
    };
    trace!("CC IN: {first:?}");
    let Some(code) = parse_code(&first) else {
        debug!("unusable reply line {first:?}");
        return Received::Reply(Reply::unusable());
    };
    let mut message = text_after_marker(&first).to_string();
    if first.as_bytes()[3] != b'-' {
        return Received::Reply(Reply::new(code, message));
    }

    let continuation = format!("{code}-");
    loop {
        let Some(line) = read_line(reader) else {
            debug!("connection lost while reading multi-line reply {code}");
            return Received::Hangup(Reply::new(code, message));
        };
        trace!("CC IN: {line:?}");
        message.push('\n');
        if parse_code(&line) == Some(code) && line.as_bytes()[3] != b'-' {
            message.push_str(text_after_marker(&line));
            return Received::Reply(Reply::new(code, message));
        }
        match line.strip_prefix(continuation.as_str()) {
            Some(text) => message.push_str(text),
            None => message.push_str(&line),
        }
    }
}

/// Read bytes until `\n` or EOF, then strip the terminator. `None` on EOF or transport failure
fn read_line<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut buffer = Vec::new();
    match reader.read_until(b'\n', &mut buffer) {
        Ok(0) => {
            debug!("control connection closed by peer");
            None
        }
        Ok(_) => {
            let mut line = String::from_utf8_lossy(&buffer).to_string();
            if line.ends_with('\n') {
                line.pop();
            }
            if line.ends_with('\r') {
                line.pop();
            }
            Some(line)
        }
        Err(err) => {
            error!("failed to read from control connection: {err}");
            None
        }
    }
}

/// Three leading digits of a line which is at least 4 bytes long
fn parse_code(line: &str) -> Option<u32> {
    if line.len() < 4 {
        return None;
    }
    line.get(..3)
        .filter(|code| code.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|code| code.parse::<u32>().ok())
}

fn text_after_marker(line: &str) -> &str {
    line.get(4..).unwrap_or_default()
}
