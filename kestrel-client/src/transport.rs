//! Blocking transport loop
//!
//! Writes whole frames through any number of partial writes and reassembles
//! response frames from any number of partial reads. One request is in
//! flight at a time; bytes read past the end of a frame are kept for the
//! next call.

use std::io::{self, ErrorKind, Read, Write};

use bytes::{Bytes, BytesMut};
use kestrel_protocol::frame::split_frame;
use kestrel_protocol::DecodeError;
use tracing::trace;

use crate::error::{Error, TransportError};

/// Where the transport is in the request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Sending,
    Receiving,
}

/// One connection plus the bytes read from it that no frame has claimed yet.
#[derive(Debug)]
pub struct Transport<S> {
    stream: S,
    residual: BytesMut,
    chunk: Vec<u8>,
    max_frame_size: usize,
    state: ConnectionState,
}

impl<S: Read + Write> Transport<S> {
    pub fn new(stream: S, read_chunk_size: usize, max_frame_size: usize) -> Self {
        Self {
            stream,
            residual: BytesMut::with_capacity(read_chunk_size),
            chunk: vec![0; read_chunk_size.max(1)],
            max_frame_size,
            state: ConnectionState::Connected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Bytes received but not yet handed out as part of a frame.
    pub fn residual(&self) -> &[u8] {
        &self.residual
    }

    /// Write `frame` completely.
    pub fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        self.ensure_usable()?;
        self.state = ConnectionState::Sending;

        let total = frame.len();
        let mut remaining = frame;
        while !remaining.is_empty() {
            match self.stream.write(remaining) {
                Ok(0) => {
                    return Err(self.fail(TransportError::WriteFailed {
                        remaining: remaining.len(),
                        total,
                    }))
                }
                Ok(written) => {
                    remaining = &remaining[written..];
                    if !remaining.is_empty() {
                        trace!(written, remaining = remaining.len(), "partial write");
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(self.fail(TransportError::Io {
                        operation: "write",
                        source: e,
                    }))
                }
            }
        }

        if let Err(e) = self.stream.flush() {
            return Err(self.fail(TransportError::Io {
                operation: "flush",
                source: e,
            }));
        }
        self.state = ConnectionState::Receiving;
        Ok(())
    }

    /// Read until one complete frame is buffered and decode its body.
    ///
    /// `decode` runs exactly once, on the body without its length prefix.
    /// The frame is consumed even if decoding fails, so the next call starts
    /// at the following frame.
    pub fn receive<T>(
        &mut self,
        decode: impl FnOnce(Bytes) -> Result<T, DecodeError>,
    ) -> Result<T, Error> {
        self.ensure_usable()?;
        self.state = ConnectionState::Receiving;

        loop {
            match split_frame(&mut self.residual, self.max_frame_size) {
                Ok(Some(body)) => {
                    self.state = ConnectionState::Connected;
                    return decode(body).map_err(Error::from);
                }
                Ok(None) => self.fill()?,
                // The stream has lost frame alignment.
                Err(e) => {
                    self.state = ConnectionState::Disconnected;
                    return Err(e.into());
                }
            }
        }
    }

    fn fill(&mut self) -> Result<(), TransportError> {
        loop {
            match self.stream.read(&mut self.chunk) {
                Ok(0) => return Err(self.fail(TransportError::ConnectionClosed)),
                Ok(read) => {
                    self.residual.extend_from_slice(&self.chunk[..read]);
                    trace!(read, buffered = self.residual.len(), "partial read");
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if is_timeout(&e) => return Err(self.fail(TransportError::TimedOut)),
                Err(e) => return Err(self.fail(TransportError::ReadFailed(e))),
            }
        }
    }

    fn ensure_usable(&self) -> Result<(), TransportError> {
        match self.state {
            ConnectionState::Disconnected => Err(TransportError::ConnectionClosed),
            _ => Ok(()),
        }
    }

    fn fail(&mut self, err: TransportError) -> TransportError {
        self.state = ConnectionState::Disconnected;
        err
    }
}

// Socket read timeouts surface as WouldBlock on Unix and TimedOut on Windows.
fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
