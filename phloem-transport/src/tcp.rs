//! TCP endpoints using non-blocking I/O with mio

use crate::{Error, Readiness, Result, Wire};
use mio::net::TcpStream;
use mio::{Events, Interest, Poll, Token};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, IoSlice, Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

const CONDUIT_TOKEN: Token = Token(0);

/// Listen backlog for the receiver side
const LISTEN_BACKLOG: i32 = 10;

/// One connected TCP endpoint and its readiness poll
pub struct TcpConduit {
    stream: Option<TcpStream>,
    poll: Poll,
}

impl TcpConduit {
    /// Connect to a remote endpoint
    ///
    /// Establishes a non-blocking connection and waits for it to complete
    /// before returning.
    pub fn connect(target: &SocketAddr) -> Result<Self> {
        let mut stream = TcpStream::connect(*target)?;
        let mut poll = Poll::new()?;
        let mut events = Events::with_capacity(1);

        poll.registry().register(
            &mut stream,
            CONDUIT_TOKEN,
            Interest::WRITABLE | Interest::READABLE,
        )?;

        // Poll for connection complete (writable means connected)
        for _ in 0..50 {
            // Try for up to 5 seconds
            poll.poll(&mut events, Some(Duration::from_millis(100)))?;

            let connected =
                events.iter().any(|event| event.token() == CONDUIT_TOKEN && event.is_writable());

            if !connected {
                continue;
            }

            // Connection established - check for errors
            if let Some(err) = stream.take_error()? {
                return Err(Error::Connection(format!("connect failed: {err}")));
            }

            // Only read readiness matters from here on
            poll.registry().reregister(&mut stream, CONDUIT_TOKEN, Interest::READABLE)?;
            tracing::debug!("connected to {target}");
            return Ok(Self { stream: Some(stream), poll });
        }

        Err(Error::Connection("connection timeout".to_string()))
    }

    /// Adopt an accepted stream into a conduit
    fn from_accepted(stream: std::net::TcpStream) -> Result<Self> {
        stream.set_nonblocking(true)?;
        let mut stream = TcpStream::from_std(stream);
        let poll = Poll::new()?;
        poll.registry().register(&mut stream, CONDUIT_TOKEN, Interest::READABLE)?;
        Ok(Self { stream: Some(stream), poll })
    }

    /// Address of the remote peer
    pub fn peer_addr(&self) -> Result<SocketAddr> {
        let stream = self.stream.as_ref().ok_or_else(not_connected)?;
        Ok(stream.peer_addr()?)
    }
}

impl Wire for TcpConduit {
    fn send(&mut self, data: &[u8]) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        write_full(stream, data)
    }

    fn send_vectored(&mut self, bufs: &[IoSlice<'_>]) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        let total: usize = bufs.iter().map(|b| b.len()).sum();
        if total == 0 {
            return Ok(0);
        }

        let mut written = loop {
            match stream.write_vectored(bufs) {
                Ok(0) => return Err(Error::Connection("peer closed during send".to_string())),
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    // Socket buffer full, spin until ready
                    std::hint::spin_loop();
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        };

        // A gather call may complete short; finish the tail slice by slice
        // without re-sending what the kernel already took.
        if written < total {
            for buf in bufs {
                if written >= buf.len() {
                    written -= buf.len();
                    continue;
                }
                let slice: &[u8] = buf;
                write_full(stream, &slice[written..])?;
                written = 0;
            }
        }

        Ok(total)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or_else(not_connected)?;
        loop {
            match stream.read(buf) {
                Ok(0) => return Err(Error::Connection("connection closed by peer".to_string())),
                Ok(n) => return Ok(n),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    block_until_readable(&mut self.poll)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            let _ = self.poll.registry().deregister(&mut stream);
        }
        Ok(())
    }
}

impl Readiness for TcpConduit {
    fn wait_readable(&mut self) -> Result<()> {
        if self.stream.is_none() {
            return Err(not_connected());
        }
        block_until_readable(&mut self.poll)
    }
}

fn not_connected() -> Error {
    Error::Connection("not connected".to_string())
}

/// Write the whole buffer, absorbing short writes and `WouldBlock`
fn write_full(stream: &mut TcpStream, data: &[u8]) -> Result<usize> {
    let mut total_written = 0;
    while total_written < data.len() {
        match stream.write(&data[total_written..]) {
            Ok(0) => return Err(Error::Connection("peer closed during send".to_string())),
            Ok(n) => total_written += n,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                // Socket buffer full, spin until ready
                std::hint::spin_loop();
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(total_written)
}

/// Block on the poll until the conduit's socket is readable
fn block_until_readable(poll: &mut Poll) -> Result<()> {
    let mut events = Events::with_capacity(1);
    loop {
        poll.poll(&mut events, None)?;
        for event in events.iter() {
            if event.token() == CONDUIT_TOKEN && (event.is_readable() || event.is_read_closed()) {
                return Ok(());
            }
        }
    }
}

/// Open a listening socket for the receiver side
///
/// `SO_REUSEADDR` is set before bind so a fresh receiver can rebind a port
/// whose previous session is still in TIME_WAIT.
pub fn listen(addr: SocketAddr) -> Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    Ok(socket.into())
}

/// Block until one connection arrives and adopt it
///
/// The listener stays open; the caller decides when to drop it.
pub fn accept_one(listener: &TcpListener) -> Result<TcpConduit> {
    let (stream, peer) = listener.accept()?;
    tracing::debug!("accepted connection from {peer}");
    TcpConduit::from_accepted(stream)
}
