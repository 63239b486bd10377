//! # Session
//!
//! This module contains the FTP client: the command/reply exchange over the control connection,
//! the passive data channel and the session operations built on them.

mod data_channel;
mod data_stream;
mod reply;
mod target;
mod tls;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
#[cfg(not(feature = "secure"))]
use std::marker::PhantomData;
use std::net::{SocketAddr, TcpStream};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use data_channel::DataChannel;
// export
pub use data_stream::DataStream;
use reply::Received;
use target::Target;
#[cfg(feature = "secure")]
pub use tls::TlsConnector;
pub use tls::{NoTlsStream, TlsStream};
#[cfg(feature = "native-tls")]
pub use tls::{NativeTlsConnector, NativeTlsStream};
#[cfg(feature = "rustls")]
pub use tls::{RustlsConnector, RustlsStream};

use crate::command::Command;
use crate::command::feat::parse_features;
use crate::list::{DirEntry, ListingFormat, parse_listing};
use crate::status::{ReplyClass, Status};
use crate::types::{Features, FileType, FtpError, FtpResult, Reply};

/// A function that creates a new stream for the data connection in passive mode.
///
/// It takes a [`SocketAddr`] and returns a [`TcpStream`].
pub type PassiveStreamBuilder = dyn Fn(SocketAddr) -> FtpResult<TcpStream> + Send + Sync;

const ANONYMOUS_USER: &str = "anonymous";
const ANONYMOUS_PASSWORD: &str = "anonymous@here.net";

/// An FTP session.
///
/// The session owns one control connection at a time, and negotiates a new passive data connection for every
/// transfer. Operations are blocking and strictly sequential.
pub struct ImplFtpClient<T>
where
    T: TlsStream,
{
    host: String,
    control: Option<BufReader<DataStream<T>>>,
    data: DataChannel<T>,
    listing: ListingFormat,
    features: Features,
    welcome_msg: Option<String>,
    passive_stream_builder: Box<PassiveStreamBuilder>,
    #[cfg(not(feature = "secure"))]
    marker: PhantomData<T>,
    #[cfg(feature = "secure")]
    tls_ctx: Option<Box<dyn TlsConnector<Stream = T> + Send + Sync + 'static>>,
    #[cfg(feature = "secure")]
    data_protected: bool,
}

impl<T> Default for ImplFtpClient<T>
where
    T: TlsStream,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ImplFtpClient<T>
where
    T: TlsStream,
{
    /// Create a disconnected session
    pub fn new() -> Self {
        Self {
            host: String::new(),
            control: None,
            data: DataChannel::default(),
            listing: ListingFormat::default(),
            features: Features::new(),
            welcome_msg: None,
            passive_stream_builder: Self::default_passive_stream_builder(),
            #[cfg(not(feature = "secure"))]
            marker: PhantomData,
            #[cfg(feature = "secure")]
            tls_ctx: None,
            #[cfg(feature = "secure")]
            data_protected: false,
        }
    }

    /// Set the TLS connector used for `ftps://` addresses.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use tinyftp::{NativeTlsConnector, NativeTlsFtpClient};
    /// use tinyftp::native_tls::TlsConnector;
    ///
    /// let connector = NativeTlsConnector::from(TlsConnector::new().unwrap());
    /// let mut client = NativeTlsFtpClient::new().with_tls(connector);
    /// client.connect("ftps://ftp.example.org", None).unwrap();
    /// ```
    #[cfg(feature = "secure")]
    #[cfg_attr(docsrs, doc(cfg(feature = "secure")))]
    pub fn with_tls(
        mut self,
        tls_connector: impl TlsConnector<Stream = T> + Send + Sync + 'static,
    ) -> Self {
        self.tls_ctx = Some(Box::new(tls_connector));
        self
    }

    /// Set a custom [`PassiveStreamBuilder`] for passive mode.
    ///
    /// The stream builder is a function that takes a `SocketAddr` and returns a `TcpStream` and it's used
    /// to create the [`TcpStream`] for the data connection in passive mode.
    pub fn passive_stream_builder<F>(mut self, stream_builder: F) -> Self
    where
        F: Fn(SocketAddr) -> FtpResult<TcpStream> + Send + Sync + 'static,
    {
        self.passive_stream_builder = Box::new(stream_builder);
        self
    }

    // -- getters

    /// Whether the control connection is up
    pub fn is_connected(&self) -> bool {
        self.control.is_some()
    }

    /// Whether the control connection goes through TLS
    pub fn is_secure(&self) -> bool {
        self.control
            .as_ref()
            .is_some_and(|control| control.get_ref().is_secure())
    }

    /// Returns welcome message retrieved from server (if available)
    pub fn welcome_msg(&self) -> Option<&str> {
        self.welcome_msg.as_deref()
    }

    /// Features advertised by the server on the last `FEAT`
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// The grammar used for directory listings. Only reliable after login
    pub fn listing_format(&self) -> ListingFormat {
        self.listing
    }

    /// Returns a reference to the underlying [`TcpStream`] of the control connection.
    ///
    /// Use it to set timeouts:
    ///
    /// ```rust,no_run
    /// use std::time::Duration;
    /// use tinyftp::FtpClient;
    ///
    /// let mut client = FtpClient::new();
    /// client.connect("ftp://ftp.example.org", None).unwrap();
    /// if let Some(stream) = client.get_ref() {
    ///     stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    /// }
    /// ```
    pub fn get_ref(&self) -> Option<&TcpStream> {
        self.control.as_ref().map(|control| control.get_ref().get_ref())
    }

    // -- session operations

    /// Connect to `address`, given as `[ftp://|ftps://]host[:port]`.
    ///
    /// `ftps://` secures the control connection from the start (implicit FTPS, default port 990) and asks the
    /// server to protect data connections too. An explicit `port` wins over the one in the address.
    /// A previous connection is dropped first.
    pub fn connect(&mut self, address: &str, port: Option<u16>) -> FtpResult<()> {
        self.disconnect();
        let target = Target::parse(address, port)?;
        if target.secure && !self.tls_available() {
            error!("{address} requires TLS, which is not available");
            return Err(FtpError::TlsUnavailable);
        }
        debug!("Connecting to {}:{}", target.host, target.port);
        let stream = TcpStream::connect((target.host.as_str(), target.port))
            .map_err(FtpError::ConnectionError)?;
        debug!("Established connection with server");
        let stream = match target.secure {
            true => self.secure_stream(&target.host, stream)?,
            false => DataStream::Tcp(stream),
        };
        self.control = Some(BufReader::new(stream));
        self.host = target.host;

        let greeting = self.read_reply();
        if !self.is_connected() {
            error!("connection lost before the greeting");
            return Err(FtpError::UnexpectedResponse(greeting));
        }
        debug!("Server greeting: {greeting}");
        self.welcome_msg = Some(greeting.message);

        #[cfg(feature = "secure")]
        if target.secure {
            self.protect_data_channel();
        }
        self.probe_features();
        Ok(())
    }

    /// Log in to the FTP server. Empty credentials stand for an anonymous login.
    ///
    /// Features are queried again once logged in, as servers may advertise more of them to authenticated users.
    pub fn login(&mut self, user: &str, password: &str) -> FtpResult<()> {
        self.ensure_connected()?;
        let user = if user.is_empty() { ANONYMOUS_USER } else { user };
        let password = if password.is_empty() {
            ANONYMOUS_PASSWORD
        } else {
            password
        };
        debug!("Signing in with user '{user}'");
        let reply = self.perform(Command::User(user.to_string()));
        match reply.status() {
            Status::NeedPassword => {
                debug!("Password is required");
                self.perform(Command::Pass(password.to_string()))
                    .expect_class(ReplyClass::Completion)?;
            }
            Status::LoggedIn => debug!("No password required"),
            _ => return Err(FtpError::UnexpectedResponse(reply)),
        }
        debug!("Login OK");
        self.probe_features();
        Ok(())
    }

    /// Drop both connections and forget everything learnt about the server
    pub fn disconnect(&mut self) {
        if self.is_connected() {
            debug!("Disconnecting from {}", self.host);
        }
        self.data = DataChannel::default();
        self.control = None;
        self.host.clear();
        self.listing = ListingFormat::default();
        self.features.clear();
        self.welcome_msg = None;
        #[cfg(feature = "secure")]
        {
            self.data_protected = false;
        }
    }

    /// Quits the current FTP session. The session is disconnected even if the server refuses.
    pub fn quit(&mut self) -> FtpResult<()> {
        self.ensure_connected()?;
        debug!("Quitting session");
        let reply = self.perform(Command::Quit);
        self.disconnect();
        reply.expect_class(ReplyClass::Completion).map(|_| ())
    }

    /// Change the current directory to the path specified.
    pub fn cd(&mut self, path: &str) -> FtpResult<()> {
        self.ensure_connected()?;
        debug!("Changing working directory to {path}");
        self.perform(Command::Cwd(path.to_string()))
            .expect_class(ReplyClass::Completion)
            .map(|_| ())
    }

    /// Gets the current directory
    pub fn pwd(&mut self) -> FtpResult<String> {
        self.ensure_connected()?;
        debug!("Getting working directory");
        let reply = self
            .perform(Command::Pwd)
            .expect_class(ReplyClass::Completion)?;
        match (reply.message.find('"'), reply.message.rfind('"')) {
            (Some(begin), Some(end)) if begin < end => Ok(reply.message[begin + 1..end].to_string()),
            _ => Err(FtpError::UnexpectedResponse(reply)),
        }
    }

    /// Sets the type of file to be transferred. That is the implementation
    /// of `TYPE` command.
    pub fn transfer_type(&mut self, file_type: FileType) -> FtpResult<()> {
        self.ensure_connected()?;
        debug!("Setting transfer type {file_type}");
        self.perform(Command::Type(file_type))
            .expect_class(ReplyClass::Completion)
            .map(|_| ())
    }

    /// Retrieves the features supported by the server, through the FEAT command.
    /// The listing format of the session follows the answer.
    pub fn feat(&mut self) -> FtpResult<Features> {
        self.ensure_connected()?;
        debug!("Getting server supported features");
        let reply = self
            .perform(Command::Feat)
            .expect_class(ReplyClass::Completion)?;
        self.features = parse_features(&reply.message);
        self.listing = ListingFormat::from_features(&self.features);
        debug!("Listing format: {:?}", self.listing);
        Ok(self.features.clone())
    }

    /// List the entries of `dir`, or of the working directory.
    ///
    /// `MLSD` is used when the server supports it, `LIST` otherwise. Entries which can't be parsed are left out.
    pub fn list(&mut self, dir: Option<&str>) -> FtpResult<Vec<DirEntry>> {
        debug!("Reading {} directory content", dir.unwrap_or("working"));
        let format = self.listing;
        let lines = self.transfer(format.command(dir), read_lines)?;
        Ok(parse_listing(&lines, format, Utc::now().year()))
    }

    /// Get information about a single path through `MLST`
    pub fn info(&mut self, path: &str) -> FtpResult<DirEntry> {
        self.ensure_connected()?;
        debug!("Reading {path} path information");
        let reply = self
            .perform(Command::Mlst(Some(path.to_string())))
            .expect_class(ReplyClass::Completion)?;
        reply
            .message
            .lines()
            .find_map(|line| DirEntry::from_mlsx_line(line).ok())
            .ok_or(FtpError::BadResponse)
    }

    /// Retrieve the file `name` in memory
    pub fn get(&mut self, name: &str) -> FtpResult<Vec<u8>> {
        debug!("Retrieving '{name}'");
        self.transfer(Command::Retr(name.to_string()), |stream| {
            let mut buffer = Vec::new();
            stream
                .read_to_end(&mut buffer)
                .map_err(FtpError::ConnectionError)?;
            Ok(buffer)
        })
    }

    /// Store `data` as the remote file `name`
    pub fn put(&mut self, name: &str, data: &[u8]) -> FtpResult<()> {
        debug!("Storing {} bytes as '{name}'", data.len());
        self.transfer(Command::Store(name.to_string()), |stream| {
            stream.write_all(data).map_err(FtpError::ConnectionError)?;
            stream.flush().map_err(FtpError::ConnectionError)
        })
    }

    /// Remove the remote file from the server.
    pub fn del(&mut self, name: &str) -> FtpResult<()> {
        self.ensure_connected()?;
        debug!("Removing file {name}");
        self.perform(Command::Dele(name.to_string()))
            .expect_class(ReplyClass::Completion)
            .map(|_| ())
    }

    /// Download the remote file `name` to `dest`, returning the local path written.
    ///
    /// If `dest` is `.` or an existing directory, the file is stored there under the base name of `name`;
    /// otherwise `dest` is the path of the file. The local file is removed if the transfer is refused or fails.
    pub fn download<P: AsRef<Path>>(&mut self, name: &str, dest: P) -> FtpResult<PathBuf> {
        self.ensure_connected()?;
        let target = local_destination(name, dest.as_ref());
        debug!("Downloading '{name}' to {}", target.display());
        let mut file = File::create(&target).map_err(FtpError::LocalIo)?;
        let result = self
            .open_transfer(Command::Retr(name.to_string()))
            .and_then(|()| {
                self.run_transfer(|stream| {
                    copy_bytes(stream, &mut file, FtpError::ConnectionError, FtpError::LocalIo)
                })
            });
        drop(file);
        match result {
            Ok(bytes) => {
                debug!("Downloaded {bytes} bytes to {}", target.display());
                Ok(target)
            }
            Err(err) => {
                if let Err(e) = fs::remove_file(&target) {
                    warn!("failed to remove {}: {e}", target.display());
                }
                Err(err)
            }
        }
    }

    /// Upload the local file at `path`, naming the remote file after its base name.
    /// Returns the amount of bytes sent.
    pub fn upload<P: AsRef<Path>>(&mut self, path: P) -> FtpResult<u64> {
        self.ensure_connected()?;
        let path = path.as_ref();
        let mut file = File::open(path).map_err(FtpError::LocalIo)?;
        let metadata = file.metadata().map_err(FtpError::LocalIo)?;
        if !metadata.is_file() {
            return Err(FtpError::LocalIo(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            )));
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .ok_or_else(|| {
                FtpError::LocalIo(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", path.display()),
                ))
            })?;
        debug!("Uploading {} as '{name}'", path.display());
        let sent = self.transfer(Command::Store(name), |stream| {
            copy_bytes(&mut file, stream, FtpError::LocalIo, FtpError::ConnectionError)
        })?;
        if sent != metadata.len() {
            return Err(FtpError::IncompleteTransfer {
                expected: metadata.len(),
                actual: sent,
            });
        }
        debug!("Uploaded {sent} bytes");
        Ok(sent)
    }

    /// Send a raw command line and return the reply, the unusable one if nothing could be read
    pub fn send_command(&mut self, command: &str) -> Reply {
        debug!("Sending custom command");
        self.perform(Command::Custom(command.to_string()))
    }

    // -- command/reply cycle

    /// Send `command` and read its reply.
    ///
    /// Transport failures aren't reported here: the connection is dropped and the unusable reply returned.
    fn perform(&mut self, command: Command) -> Reply {
        trace!("CC OUT: {}", command.redacted());
        self.write_command(&command);
        self.read_reply()
    }

    fn write_command(&mut self, command: &Command) {
        let Some(control) = self.control.as_mut() else {
            debug!("not connected: {} not sent", command.redacted());
            return;
        };
        let stream = control.get_mut();
        let line = format!("{command}\r\n");
        if let Err(err) = stream
            .write_all(line.as_bytes())
            .and_then(|_| stream.flush())
        {
            error!("failed to send command: {err}");
            self.control = None;
        }
    }

    fn read_reply(&mut self) -> Reply {
        let Some(control) = self.control.as_mut() else {
            return Reply::unusable();
        };
        match reply::read_reply(control) {
            Received::Reply(reply) => reply,
            Received::Hangup(reply) => {
                debug!("control connection lost");
                self.control = None;
                reply
            }
        }
    }

    fn ensure_connected(&self) -> FtpResult<()> {
        match self.is_connected() {
            true => Ok(()),
            false => Err(FtpError::NotConnected),
        }
    }

    /// Issue `FEAT`; a server without it gets legacy listings
    fn probe_features(&mut self) {
        if let Err(err) = self.feat() {
            debug!("FEAT not available ({err}); using LIST");
            self.features.clear();
            self.listing = ListingFormat::Legacy;
        }
    }

    // -- passive data channel

    /// Negotiate a new passive data connection
    fn start_passive(&mut self) -> FtpResult<()> {
        self.ensure_connected()?;
        if !self.data.is_idle() {
            debug!("discarding stale data channel");
            if let Err(err) = self.end_passive() {
                warn!("stale transfer ended with an error: {err}");
            }
        }
        let reply = self
            .perform(Command::Pasv)
            .expect_status(Status::PassiveMode)?;
        let port = parse_passive_port(&reply.message)?;
        // the advertised address is ignored: data goes to the host of the control connection
        let mut addr = self
            .get_ref()
            .ok_or(FtpError::NotConnected)?
            .peer_addr()
            .map_err(FtpError::ConnectionError)?;
        addr.set_port(port);
        trace!("Opening passive data connection to {addr}");
        let stream = (self.passive_stream_builder)(addr)?;
        let stream = self.data_stream(stream)?;
        trace!("Data connection open (secure: {})", stream.is_secure());
        self.data = DataChannel::PassiveOpen(stream);
        Ok(())
    }

    /// Negotiate a data connection and send the transfer verb
    fn open_transfer(&mut self, command: Command) -> FtpResult<()> {
        self.start_passive()?;
        let reply = self.perform(command);
        let (data, result) = std::mem::take(&mut self.data).begin(reply);
        self.data = data;
        result
    }

    /// Run the data phase of an open transfer, then end it.
    /// A data phase error wins over a final reply error.
    fn run_transfer<F, D>(&mut self, data_phase: F) -> FtpResult<D>
    where
        F: FnOnce(&mut DataStream<T>) -> FtpResult<D>,
    {
        let result = match self.data.stream_mut() {
            Some(stream) => data_phase(stream),
            None => Err(FtpError::NotConnected),
        };
        let end = self.end_passive();
        let data = result?;
        end.map(|_| data)
    }

    fn transfer<F, D>(&mut self, command: Command, data_phase: F) -> FtpResult<D>
    where
        F: FnOnce(&mut DataStream<T>) -> FtpResult<D>,
    {
        self.open_transfer(command)?;
        self.run_transfer(data_phase)
    }

    /// Close the data connection and consume the final reply of the transfer, if owed.
    /// Does nothing when no transfer is pending.
    fn end_passive(&mut self) -> FtpResult<()> {
        let DataChannel::AwaitingFinalReply(received) = std::mem::take(&mut self.data).close() else {
            return Ok(());
        };
        let reply = match received {
            Some(reply) => reply,
            None => self.read_reply(),
        };
        debug!("Transfer ended: {reply}");
        reply.expect_class(ReplyClass::Completion).map(|_| ())
    }

    // -- tls

    #[cfg(feature = "secure")]
    fn tls_available(&self) -> bool {
        self.tls_ctx.is_some()
    }

    #[cfg(not(feature = "secure"))]
    fn tls_available(&self) -> bool {
        false
    }

    #[cfg(feature = "secure")]
    fn secure_stream(&self, domain: &str, stream: TcpStream) -> FtpResult<DataStream<T>> {
        let tls_ctx = self.tls_ctx.as_ref().ok_or(FtpError::TlsUnavailable)?;
        debug!("Initializing TLS with {domain}");
        let stream = tls_ctx.connect(domain, stream)?;
        debug!("TLS Stream OK");
        Ok(DataStream::Ssl(Box::new(stream)))
    }

    #[cfg(not(feature = "secure"))]
    fn secure_stream(&self, _domain: &str, _stream: TcpStream) -> FtpResult<DataStream<T>> {
        Err(FtpError::TlsUnavailable)
    }

    /// Ask the server to protect data connections (`PBSZ 0`, `PROT P`). On refusal they stay in clear
    #[cfg(feature = "secure")]
    fn protect_data_channel(&mut self) {
        let reply = match self.perform(Command::Pbsz(0)) {
            pbsz if pbsz.is_completion() => self.perform(Command::ProtPrivate),
            pbsz => pbsz,
        };
        self.data_protected = reply.is_completion();
        if !self.data_protected {
            warn!("data connections won't be protected: {reply}");
        }
    }

    #[cfg(feature = "secure")]
    fn data_stream(&self, stream: TcpStream) -> FtpResult<DataStream<T>> {
        match self.data_protected {
            true => self.secure_stream(&self.host, stream),
            false => Ok(DataStream::Tcp(stream)),
        }
    }

    #[cfg(not(feature = "secure"))]
    fn data_stream(&self, stream: TcpStream) -> FtpResult<DataStream<T>> {
        Ok(DataStream::Tcp(stream))
    }

    /// Default stream builder
    fn default_passive_stream_builder() -> Box<PassiveStreamBuilder> {
        Box::new(|addr| TcpStream::connect(addr).map_err(FtpError::ConnectionError))
    }
}

/// Port of a `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)` reply message
pub(crate) fn parse_passive_port(message: &str) -> FtpResult<u16> {
    let open = message.find('(').ok_or(FtpError::BadResponse)?;
    let close = message[open..]
        .find(')')
        .map(|offset| open + offset)
        .ok_or(FtpError::BadResponse)?;
    let octets = message[open + 1..close]
        .split(',')
        .map(|token| token.trim().parse::<u8>())
        .collect::<Result<Vec<u8>, _>>()
        .map_err(|_| FtpError::BadResponse)?;
    match octets.as_slice() {
        [_, _, _, _, msb, lsb] => Ok((u16::from(*msb) << 8) | u16::from(*lsb)),
        _ => Err(FtpError::BadResponse),
    }
}

/// Where `download` stores the remote file `name`
pub(crate) fn local_destination(name: &str, dest: &Path) -> PathBuf {
    if dest == Path::new(".") || dest.is_dir() {
        dest.join(remote_base_name(name))
    } else {
        dest.to_path_buf()
    }
}

fn remote_base_name(name: &str) -> &str {
    name.rsplit('/')
        .find(|component| !component.is_empty())
        .unwrap_or(name)
}

/// Read a listing line by line, until the server closes the data connection
fn read_lines<R: Read>(stream: &mut R) -> FtpResult<Vec<String>> {
    let mut reader = BufReader::new(stream);
    let mut lines: Vec<String> = Vec::new();
    loop {
        let mut line_buf = vec![];
        match reader.read_until(b'\n', &mut line_buf) {
            Ok(0) => break,
            Ok(_) => {
                let mut line = String::from_utf8_lossy(&line_buf).to_string();
                trace!("STREAM IN: {:?}", line);
                if line.ends_with('\n') {
                    line.pop();
                }
                if line.ends_with('\r') {
                    line.pop();
                }
                if line.is_empty() {
                    continue;
                }
                lines.push(line);
            }
            Err(err) => {
                error!("failed to get lines from stream: {err}");
                return Err(FtpError::ConnectionError(err));
            }
        }
    }
    Ok(lines)
}

/// Copy `reader` into `writer`, telling read failures from write failures
fn copy_bytes<R, W>(
    reader: &mut R,
    writer: &mut W,
    on_read: fn(io::Error) -> FtpError,
    on_write: fn(io::Error) -> FtpError,
) -> FtpResult<u64>
where
    R: Read,
    W: Write,
{
    let mut buffer = [0u8; 8192];
    let mut total = 0;
    loop {
        let size = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(size) => size,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(on_read(err)),
        };
        writer.write_all(&buffer[..size]).map_err(on_write)?;
        total += size as u64;
    }
    writer.flush().map_err(on_write)?;
    Ok(total)
}
