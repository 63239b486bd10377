use std::io::{self, Write};
use std::path::Path;

use tinyftp::native_tls::TlsConnector;
use tinyftp::{DirEntry, FileType, NativeTlsConnector};

use super::FtpClient;

/// A client able to reach `ftps://` servers. Certificates aren't verified: this is a debugging tool
pub fn client() -> FtpClient {
    match TlsConnector::builder()
        .danger_accept_invalid_certs(true)
        .danger_accept_invalid_hostnames(true)
        .build()
    {
        Ok(ctx) => FtpClient::new().with_tls(NativeTlsConnector::from(ctx)),
        Err(err) => {
            eprintln!("Failed to setup TLS: FTPS won't be available: {err}");
            FtpClient::new()
        }
    }
}

pub fn quit(ftp: &mut FtpClient) {
    if ftp.is_connected() {
        match ftp.quit() {
            Ok(_) => println!("OK"),
            Err(err) => eprintln!("Failed to disconnect from remote: {err}"),
        }
    }
}

pub fn disconnect(ftp: &mut FtpClient) {
    ftp.disconnect();
    println!("OK");
}

pub fn connect(ftp: &mut FtpClient, remote: &str, port: Option<u16>) {
    if let Err(err) = ftp.connect(remote, port) {
        eprintln!("Failed to connect to remote: {err}");
        return;
    }
    if let Some(welcome) = ftp.welcome_msg() {
        println!("{welcome}");
    }
    // Set transfer type to binary
    if let Err(err) = ftp.transfer_type(FileType::Binary) {
        eprintln!("Failed to set transfer type to binary: {err}");
    }
    println!("OK{}", if ftp.is_secure() { " (secure)" } else { "" });
}

pub fn cat(ftp: &mut FtpClient, file: &str) {
    match ftp.get(file) {
        Ok(content) => {
            let mut stdout = io::stdout();
            if let Err(err) = stdout.write_all(&content).and_then(|_| stdout.flush()) {
                eprintln!("Failed to print file: {err}");
            }
            println!();
        }
        Err(err) => eprintln!("CAT error: {err}"),
    }
}

pub fn cwd(ftp: &mut FtpClient, dir: &str) {
    match ftp.cd(dir) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("CWD error: {err}"),
    }
}

pub fn feat(ftp: &mut FtpClient) {
    match ftp.feat() {
        Ok(features) => {
            let mut features: Vec<_> = features.into_iter().collect();
            features.sort();
            for (name, value) in features {
                match value {
                    Some(value) => println!("{name}: {value}"),
                    None => println!("{name}"),
                }
            }
            println!("OK: listing through {:?}", ftp.listing_format());
        }
        Err(err) => eprintln!("FEAT error: {err}"),
    }
}

pub fn get(ftp: &mut FtpClient, file: &str, dest: &Path) {
    match ftp.download(file, dest) {
        Ok(path) => println!("OK: {}", path.display()),
        Err(err) => eprintln!("GET error: {err}"),
    }
}

pub fn info(ftp: &mut FtpClient, path: &str) {
    match ftp.info(path) {
        Ok(entry) => println!("{}", fmt_entry(&entry)),
        Err(err) => eprintln!("INFO error: {err}"),
    }
}

pub fn list(ftp: &mut FtpClient, p: Option<&str>) {
    match ftp.list(p) {
        Ok(entries) => entries.iter().for_each(|e| println!("{}", fmt_entry(e))),
        Err(err) => eprintln!("LIST error: {err}"),
    }
}

pub fn login(ftp: &mut FtpClient, user: Option<&str>) {
    let (username, password) = match user {
        Some(user) => {
            // Read password
            match rpassword::prompt_password("Password: ") {
                Ok(p) => (user.to_string(), p),
                Err(err) => {
                    eprintln!("Could not read password: {err}");
                    return;
                }
            }
        }
        None => (String::new(), String::new()),
    };
    match ftp.login(username.as_str(), password.as_str()) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("LOGIN error: {err}"),
    }
}

pub fn put(ftp: &mut FtpClient, local: &Path) {
    match ftp.upload(local) {
        Ok(bytes) => println!("OK: {bytes} bytes"),
        Err(err) => eprintln!("PUT error: {err}"),
    }
}

pub fn pwd(ftp: &mut FtpClient) {
    match ftp.pwd() {
        Ok(p) => println!("OK: {p}"),
        Err(err) => eprintln!("PWD error: {err}"),
    }
}

pub fn quote(ftp: &mut FtpClient, line: &str) {
    if !ftp.is_connected() {
        eprintln!("QUOTE error: not connected");
        return;
    }
    let reply = ftp.send_command(line);
    match reply.is_unusable() {
        true => eprintln!("QUOTE error: no reply"),
        false => println!("{} {}", reply.code, reply.message),
    }
}

pub fn rm(ftp: &mut FtpClient, file: &str) {
    match ftp.del(file) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("RM error: {err}"),
    }
}

pub fn transfer_type(ftp: &mut FtpClient, file_type: FileType) {
    match ftp.transfer_type(file_type) {
        Ok(_) => println!("OK"),
        Err(err) => eprintln!("TYPE error: {err}"),
    }
}

fn fmt_entry(entry: &DirEntry) -> String {
    let modified = entry
        .modified()
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".repeat(16));
    let kind = if entry.is_directory() { 'd' } else { '-' };
    format!("{kind} {:>12} {modified} {}", entry.size(), entry.name())
}
