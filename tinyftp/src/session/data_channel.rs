//! # Data channel
//!
//! Lifecycle of the passive data connection.
//!
//! ```text
//! Idle --PASV--> PassiveOpen --verb 1xx/2xx--> TransferInFlight --close--> AwaitingFinalReply --reply--> Idle
//!                     |                                                                               ^
//!                     +--------------------------verb refused--------------------------------------+
//! ```
//!
//! Every transfer negotiates a new connection: nothing leaves `Idle` twice with the same stream.

use super::data_stream::DataStream;
use super::tls::TlsStream;
use crate::status::ReplyClass;
use crate::types::{FtpError, FtpResult, Reply};

#[derive(Debug)]
pub(crate) enum DataChannel<T>
where
    T: TlsStream,
{
    /// No data connection, no reply owed
    Idle,
    /// Connected to the passive port; the transfer verb hasn't been sent yet
    PassiveOpen(DataStream<T>),
    /// The server accepted the transfer verb. `final_reply` is set when the server
    /// already sent its completion reply instead of a preliminary one.
    TransferInFlight {
        stream: DataStream<T>,
        final_reply: Option<Reply>,
    },
    /// Data connection closed; the final reply is read from the control connection unless already received
    AwaitingFinalReply(Option<Reply>),
}

impl<T> Default for DataChannel<T>
where
    T: TlsStream,
{
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> DataChannel<T>
where
    T: TlsStream,
{
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Move to `TransferInFlight` after the transfer verb got `reply`.
    ///
    /// A refused verb closes the connection: the channel goes back to `Idle`, as the server owes no further reply.
    pub fn begin(self, reply: Reply) -> (Self, FtpResult<()>) {
        let stream = match self {
            Self::PassiveOpen(stream) => stream,
            other => {
                error!("transfer verb sent without an open passive connection");
                return (other.close(), Err(FtpError::UnexpectedResponse(reply)));
            }
        };
        match reply.class() {
            ReplyClass::Preliminary => {
                trace!("transfer started: {reply}");
                (
                    Self::TransferInFlight {
                        stream,
                        final_reply: None,
                    },
                    Ok(()),
                )
            }
            ReplyClass::Completion => {
                trace!("transfer started, final reply already received: {reply}");
                (
                    Self::TransferInFlight {
                        stream,
                        final_reply: Some(reply),
                    },
                    Ok(()),
                )
            }
            _ => {
                debug!("transfer refused: {reply}");
                (Self::Idle, Err(FtpError::UnexpectedResponse(reply)))
            }
        }
    }

    /// The data connection of a transfer in flight
    pub fn stream_mut(&mut self) -> Option<&mut DataStream<T>> {
        match self {
            Self::TransferInFlight { stream, .. } => Some(stream),
            _ => None,
        }
    }

    /// Drop the data connection, if any.
    ///
    /// A transfer in flight moves to `AwaitingFinalReply`; a passive connection which never carried a transfer
    /// goes back to `Idle`.
    pub fn close(self) -> Self {
        match self {
            Self::Idle => Self::Idle,
            Self::PassiveOpen(stream) => {
                drop(stream);
                trace!("unused passive connection closed");
                Self::Idle
            }
            Self::TransferInFlight {
                stream,
                final_reply,
            } => {
                drop(stream);
                trace!("data connection closed");
                Self::AwaitingFinalReply(final_reply)
            }
            awaiting @ Self::AwaitingFinalReply(_) => awaiting,
        }
    }
}
