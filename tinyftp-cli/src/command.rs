use std::path::PathBuf;
use std::str::FromStr;

use tinyftp::FileType;

pub enum Command {
    Cat(String),
    Connect(String, Option<u16>),
    Cwd(String),
    Disconnect,
    Feat,
    Get(String, PathBuf),
    Help,
    Info(String),
    List(Option<String>),
    Login(Option<String>),
    Put(PathBuf),
    Pwd,
    Quit,
    Quote(String),
    Rm(String),
    Type(FileType),
}

impl FromStr for Command {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Split string by space
        let mut args = s.split_ascii_whitespace();
        // Match args
        match args.next() {
            Some(cmd) => match cmd.to_ascii_uppercase().as_str() {
                "CAT" => match args.next() {
                    Some(file) => Ok(Self::Cat(file.to_string())),
                    None => Err("Missing `file` field"),
                },
                "CONNECT" => {
                    let addr = match args.next() {
                        Some(addr) => addr.to_string(),
                        None => return Err("Missing `addr` field"),
                    };
                    match args.next().map(u16::from_str) {
                        Some(Ok(port)) => Ok(Self::Connect(addr, Some(port))),
                        Some(Err(_)) => Err("Invalid `port` field"),
                        None => Ok(Self::Connect(addr, None)),
                    }
                }
                "CWD" | "CD" => match args.next() {
                    Some(p) => Ok(Self::Cwd(p.to_string())),
                    None => Err("Missing `dir` field"),
                },
                "DISCONNECT" => Ok(Self::Disconnect),
                "FEAT" => Ok(Self::Feat),
                "GET" => {
                    let file: String = match args.next() {
                        Some(f) => f.to_string(),
                        None => return Err("Missing `file` field"),
                    };
                    match args.next() {
                        Some(d) => Ok(Self::Get(file, PathBuf::from(d))),
                        None => Ok(Self::Get(file, PathBuf::from("."))),
                    }
                }
                "HELP" => Ok(Self::Help),
                "INFO" => match args.next() {
                    Some(p) => Ok(Self::Info(p.to_string())),
                    None => Err("Missing `path` field"),
                },
                "LIST" | "LS" => Ok(Self::List(args.next().map(str::to_string))),
                "LOGIN" => Ok(Self::Login(args.next().map(str::to_string))),
                "PUT" => match args.next() {
                    Some(l) => Ok(Self::Put(PathBuf::from(l))),
                    None => Err("Missing `file` field"),
                },
                "PWD" => Ok(Self::Pwd),
                "QUIT" | "EXIT" => Ok(Self::Quit),
                "QUOTE" => match args.collect::<Vec<&str>>().join(" ") {
                    line if line.is_empty() => Err("Missing `command` field"),
                    line => Ok(Self::Quote(line)),
                },
                "RM" => match args.next() {
                    Some(file) => Ok(Self::Rm(file.to_string())),
                    None => Err("Missing `file` field"),
                },
                "TYPE" => match args.next().map(|t| t.to_ascii_uppercase()).as_deref() {
                    Some("A") | Some("ASCII") => Ok(Self::Type(FileType::Ascii)),
                    Some("I") | Some("BINARY") => Ok(Self::Type(FileType::Binary)),
                    Some(_) => Err("Invalid type"),
                    None => Err("Missing `type` field"),
                },
                _ => Err("Unknown command"),
            },
            None => Err("Unknown command"),
        }
    }
}
