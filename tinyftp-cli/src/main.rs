//! # tinyftp
//!
//! Interactive FTP client, based on the tinyftp library.
//!

// -- mods
mod actions;
mod args;
mod command;

use std::io;
use std::io::Write;
use std::str::FromStr;

use actions::*;
use args::Args;
use command::Command;
use env_logger::Builder as LogBuilder;
use log::LevelFilter;
use tinyftp::NativeTlsFtpClient as FtpClient;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

fn usage() {
    println!("Available commands:");
    println!("CAT <file>                          Print remote `file`");
    println!("CONNECT <addr> [port]               Connect to remote host; use ftps://host for FTPS");
    println!("CWD <dir>                           Change working directory");
    println!("DISCONNECT                          Close the connection");
    println!("FEAT                                Get supported features on the server");
    println!("GET <file> [dest]                   Download `file` to `dest` (current directory by default)");
    println!("HELP                                Print this help");
    println!("INFO <path>                         Get information about `path`");
    println!("LIST [dir]                          List files. If directory is not provided, current directory is used");
    println!("LOGIN [user]                        Login to remote; leave user empty for anonymous login");
    println!("PUT <file>                          Upload local `file`");
    println!("PWD                                 Print working directory");
    println!("QUIT                                Quit tinyftp");
    println!("QUOTE <command>                     Send a raw command and print the reply");
    println!("RM <file>                           Remove file");
    println!("TYPE <A|I>                          Set transfer type");
}

/// Read the next command; `None` once stdin is closed
fn input() -> Option<Command> {
    loop {
        print!(">> ");
        let _ = io::stdout().flush();
        let mut input: String = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => return None,
            Ok(_) => {}
            Err(err) => {
                eprintln!("Failed to read stdin: {err}");
                return None;
            }
        }
        if input.trim().is_empty() {
            continue;
        }
        match Command::from_str(input.as_str()) {
            Ok(cmd) => return Some(cmd),
            Err(err) => println!("{err}"),
        }
    }
}

fn main() {
    let args: Args = argh::from_env();
    // print version
    if args.version {
        println!("tinyftp {APP_VERSION} - developed by {APP_AUTHORS}");
        return;
    }
    // init logger
    LogBuilder::new()
        .filter_level(if args.debug {
            LevelFilter::Trace
        } else if args.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Off
        })
        .init();
    let mut ftp = client();

    // connect if host is specified
    if let Some(host) = args.host {
        connect(&mut ftp, host.as_str(), args.port);
    }

    // Main loop
    while let Some(command) = input() {
        match command {
            Command::Quit => break,
            Command::Help => usage(),
            cmd => perform(&mut ftp, cmd),
        }
    }
    quit(&mut ftp);
}

fn perform(ftp: &mut FtpClient, command: Command) {
    match command {
        Command::Cat(file) => cat(ftp, file.as_str()),
        Command::Connect(remote, port) => connect(ftp, remote.as_str(), port),
        Command::Cwd(dir) => cwd(ftp, dir.as_str()),
        Command::Disconnect => disconnect(ftp),
        Command::Feat => feat(ftp),
        Command::Get(file, dest) => get(ftp, file.as_str(), dest.as_path()),
        Command::Info(path) => info(ftp, path.as_str()),
        Command::List(p) => list(ftp, p.as_deref()),
        Command::Login(user) => login(ftp, user.as_deref()),
        Command::Put(src) => put(ftp, src.as_path()),
        Command::Pwd => pwd(ftp),
        Command::Quote(line) => quote(ftp, line.as_str()),
        Command::Rm(file) => rm(ftp, file.as_str()),
        Command::Type(file_type) => transfer_type(ftp, file_type),
        Command::Help | Command::Quit => {
            unreachable!("handled by the main loop")
        }
    }
}
