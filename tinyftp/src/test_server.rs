//! A scripted FTP server, playing one conversation with a single client.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const ACCEPT_TIMEOUT: Duration = Duration::from_secs(10);

/// One step of the conversation
pub enum Step {
    /// Send a reply; the text may hold many `\r\n` separated lines
    Reply(String),
    /// Read a command line and check it
    Expect(String),
    /// Expect `PASV`, open a data listener and advertise it
    Pasv,
    /// Accept the data connection, send these bytes and close it
    Serve(Vec<u8>),
    /// Accept the data connection and read it until the client closes it
    Collect,
}

pub fn reply(text: impl ToString) -> Step {
    Step::Reply(text.to_string())
}

pub fn expect(command: impl ToString) -> Step {
    Step::Expect(command.to_string())
}

pub struct ScriptedServer {
    port: u16,
    handle: JoinHandle<Vec<Vec<u8>>>,
}

impl ScriptedServer {
    pub fn start(script: Vec<Step>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind control listener");
        let port = listener.local_addr().expect("no local address").port();
        let handle = thread::spawn(move || {
            let control = accept(&listener);
            control
                .set_read_timeout(Some(ACCEPT_TIMEOUT))
                .expect("failed to set read timeout");
            play(control, script)
        });
        Self { port, handle }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Wait for the conversation to end; returns the bytes collected from uploads
    pub fn finish(self) -> Vec<Vec<u8>> {
        self.handle.join().expect("scripted server failed")
    }
}

fn play(control: TcpStream, script: Vec<Step>) -> Vec<Vec<u8>> {
    let mut reader = BufReader::new(control.try_clone().expect("failed to clone control stream"));
    let mut writer = control;
    let mut data_listener: Option<TcpListener> = None;
    let mut uploads = Vec::new();
    for step in script {
        match step {
            Step::Reply(text) => send(&mut writer, &text),
            Step::Expect(command) => assert_eq!(read_command(&mut reader), command),
            Step::Pasv => {
                assert_eq!(read_command(&mut reader), "PASV");
                let listener =
                    TcpListener::bind("127.0.0.1:0").expect("failed to bind data listener");
                let port = listener.local_addr().expect("no local address").port();
                send(
                    &mut writer,
                    &format!(
                        "227 Entering Passive Mode (127,0,0,1,{},{}).",
                        port >> 8,
                        port & 0xff
                    ),
                );
                data_listener = Some(listener);
            }
            Step::Serve(bytes) => {
                let listener = data_listener.take().expect("no passive listener");
                let mut data = accept(&listener);
                data.write_all(&bytes).expect("failed to send data");
            }
            Step::Collect => {
                let listener = data_listener.take().expect("no passive listener");
                let mut data = accept(&listener);
                data.set_read_timeout(Some(ACCEPT_TIMEOUT))
                    .expect("failed to set read timeout");
                let mut bytes = Vec::new();
                data.read_to_end(&mut bytes).expect("failed to collect data");
                uploads.push(bytes);
            }
        }
    }
    uploads
}

fn send(writer: &mut TcpStream, text: &str) {
    writer
        .write_all(format!("{text}\r\n").as_bytes())
        .expect("failed to send reply");
}

fn read_command(reader: &mut BufReader<TcpStream>) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).expect("failed to read command");
    assert!(line.ends_with("\r\n"), "command not terminated by CRLF: {line:?}");
    line.trim_end_matches("\r\n").to_string()
}

/// Accept a connection, giving up after a while so a broken test can't hang
fn accept(listener: &TcpListener) -> TcpStream {
    listener
        .set_nonblocking(true)
        .expect("failed to set listener non blocking");
    let start = Instant::now();
    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream
                    .set_nonblocking(false)
                    .expect("failed to set stream blocking");
                break stream;
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                assert!(start.elapsed() < ACCEPT_TIMEOUT, "no client connected");
                thread::sleep(Duration::from_millis(10));
            }
            Err(e) => panic!("accept failed: {e}"),
        }
    }
}
