//! # Command
//!
//! The set of FTP commands

pub mod feat;

use std::fmt;

use crate::types::FileType;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ftp commands with their arguments
pub enum Command {
    /// Change working directory
    Cwd(String),
    /// Remove file at specified path
    Dele(String),
    /// Ask the server for the list of supported features
    Feat,
    /// List entries at specified path. If path is not provided list entries at current working directory
    List(Option<String>),
    /// Machine-readable listing of a directory
    Mlsd(Option<String>),
    /// Machine-readable information about a single path
    Mlst(Option<String>),
    /// Provide login password
    Pass(String),
    /// Passive mode
    Pasv,
    /// Protection buffer size
    #[cfg(feature = "secure")]
    Pbsz(usize),
    /// Set protection level of the data channel to private
    #[cfg(feature = "secure")]
    ProtPrivate,
    /// Print working directory
    Pwd,
    /// Quit
    Quit,
    /// Retrieve file
    Retr(String),
    /// Put file at specified path
    Store(String),
    /// Set transfer type
    Type(FileType),
    /// Provide user to login as
    User(String),
    /// Raw command line, sent as is
    Custom(String),
}

impl Command {
    /// Command line as it may appear in logs: the password is never printed
    pub fn redacted(&self) -> String {
        match self {
            Self::Pass(_) => "PASS ******".to_string(),
            Self::Custom(line)
                if line
                    .get(..5)
                    .is_some_and(|verb| verb.eq_ignore_ascii_case("PASS ")) =>
            {
                "PASS ******".to_string()
            }
            cmd => cmd.to_string(),
        }
    }
}

// -- stringify

/// Write `verb`, followed by `path` when provided
fn fmt_with_path(f: &mut fmt::Formatter<'_>, verb: &str, path: &Option<String>) -> fmt::Result {
    match path {
        Some(p) => write!(f, "{verb} {p}"),
        None => write!(f, "{verb}"),
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cwd(d) => write!(f, "CWD {d}"),
            Self::Dele(p) => write!(f, "DELE {p}"),
            Self::Feat => write!(f, "FEAT"),
            Self::List(p) => fmt_with_path(f, "LIST", p),
            Self::Mlsd(p) => fmt_with_path(f, "MLSD", p),
            Self::Mlst(p) => fmt_with_path(f, "MLST", p),
            Self::Pass(p) => write!(f, "PASS {p}"),
            Self::Pasv => write!(f, "PASV"),
            #[cfg(feature = "secure")]
            Self::Pbsz(sz) => write!(f, "PBSZ {sz}"),
            #[cfg(feature = "secure")]
            Self::ProtPrivate => write!(f, "PROT P"),
            Self::Pwd => write!(f, "PWD"),
            Self::Quit => write!(f, "QUIT"),
            Self::Retr(p) => write!(f, "RETR {p}"),
            Self::Store(p) => write!(f, "STOR {p}"),
            Self::Type(t) => write!(f, "TYPE {t}"),
            Self::User(u) => write!(f, "USER {u}"),
            Self::Custom(line) => write!(f, "{line}"),
        }
    }
}
