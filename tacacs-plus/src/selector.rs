//! Trying a list of servers in order, and failing over between them.
//!
//! A single TACACS+ deployment is usually backed by more than one daemon for
//! redundancy. This module holds the policy for walking that list: which errors are
//! worth trying the next server for, and which are authoritative answers that should
//! stop the search immediately.

use std::net::TcpStream;
use std::time::Duration;

use crate::error::ClientError;
use crate::session::Session;
use crate::transport::Transport;

/// The maximum number of servers a single [`ServerList`] will hold.
///
/// This mirrors the fixed-size server arrays PAM configuration files have always used;
/// a deployment needing more than this is better served by a load balancer in front of
/// a pool of TACACS+ daemons.
pub const MAX_SERVERS: usize = 16;

/// One server in a [`ServerList`]: an address to dial, and the shared secret to
/// obfuscate its packets with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEntry {
    address: String,
    secret: Vec<u8>,
}

impl ServerEntry {
    /// Creates a new server entry for `address`, obfuscating with `secret`.
    ///
    /// An empty secret means packets to this server are sent unobfuscated, per
    /// [RFC8907 §4.5].
    ///
    /// [RFC8907 §4.5]: https://www.rfc-editor.org/rfc/rfc8907.html#section-4.5
    pub fn new(address: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self {
            address: address.into(),
            secret: secret.into(),
        }
    }

    /// The address (host, optionally `host:port`) this entry connects to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The shared secret used to obfuscate packets exchanged with this server.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    /// Replaces this entry's shared secret.
    ///
    /// Used while parsing a configuration where the secret for the most recently added
    /// server arrives as a separate directive from its address.
    pub fn set_secret(&mut self, secret: impl Into<Vec<u8>>) {
        self.secret = secret.into();
    }
}

/// An ordered list of candidate servers, tried first-to-last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerList {
    servers: Vec<ServerEntry>,
}

impl ServerList {
    /// Creates an empty server list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a server to the end of the list, up to [`MAX_SERVERS`].
    pub fn push(&mut self, server: ServerEntry) -> Result<(), ClientError> {
        if self.servers.len() >= MAX_SERVERS {
            return Err(ClientError::NoServersAvailable);
        }
        self.servers.push(server);
        Ok(())
    }

    /// The servers in this list, in try order.
    pub fn servers(&self) -> &[ServerEntry] {
        &self.servers
    }

    /// Whether this list holds no servers.
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// A mutable reference to the most recently pushed server, if any.
    ///
    /// Used by configuration parsing, where a `secret=` directive applies to whichever
    /// server address preceded it.
    pub fn last_mut(&mut self) -> Option<&mut ServerEntry> {
        self.servers.last_mut()
    }
}

/// Identifies the server that accepted a successful exchange, so a caller can continue
/// issuing requests (authorization, accounting) against that same server rather than
/// restarting the search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedServer {
    address: String,
}

impl AcceptedServer {
    pub(crate) fn new(entry: &ServerEntry) -> Self {
        Self {
            address: entry.address().to_owned(),
        }
    }

    /// The address of the server that accepted the request this came from.
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Whether `error` represents a failure worth retrying against the next server, as
/// opposed to an authoritative terminal answer from a server that did respond.
///
/// A server-side `ERROR` status (§4.6/§4.7) still means the server couldn't service the
/// request, so it's eligible for failover just like a transport failure; only a
/// definite `Ok(...)` outcome (e.g. `Fail`/`Restart`) is treated as the authoritative
/// last word and returned to the caller immediately.
pub fn is_failover_eligible(error: &ClientError) -> bool {
    matches!(
        error,
        ClientError::ConnectFailed
            | ClientError::ReadTimeout
            | ClientError::WriteError
            | ClientError::Io(_)
            | ClientError::InvalidPacketReceived(_)
            | ClientError::ServerError { .. }
    )
}

/// Connects a [`Session`] to `entry`, applying `timeout` to both the connect and the
/// subsequent read/write deadlines.
pub fn connect(entry: &ServerEntry, timeout: Duration) -> Result<Session<TcpStream>, ClientError> {
    let transport = Transport::connect(entry.address(), timeout)?;
    Ok(Session::new(transport, entry.secret().to_vec()))
}

/// Tries `servers` in order, running `attempt` against each new session until one
/// succeeds or the list is exhausted.
///
/// `attempt` is only retried against the next server when it fails with a
/// [`is_failover_eligible`] error; an authoritative response (success, or a definite
/// `Ok(...)` outcome like `Fail`/`Restart`) from any server is returned immediately.
pub fn try_first_responder<T>(
    servers: &ServerList,
    timeout: Duration,
    mut attempt: impl FnMut(&mut Session<TcpStream>) -> Result<T, ClientError>,
) -> Result<(T, AcceptedServer), ClientError> {
    if servers.is_empty() {
        return Err(ClientError::NoServersAvailable);
    }

    let mut last_error = ClientError::NoServersAvailable;

    for entry in servers.servers() {
        let mut session = match connect(entry, timeout) {
            Ok(session) => session,
            Err(error) if is_failover_eligible(&error) => {
                last_error = error;
                continue;
            }
            Err(error) => return Err(error),
        };

        match attempt(&mut session) {
            Ok(value) => return Ok((value, AcceptedServer::new(entry))),
            Err(error) if is_failover_eligible(&error) => {
                last_error = error;
                continue;
            }
            Err(error) => return Err(error),
        }
    }

    Err(last_error)
}

/// Runs `attempt` against every reachable server in `servers`, collecting the results
/// that succeeded.
///
/// Used for broadcast accounting, where the same record is logged to every configured
/// daemon rather than just the first to answer; a server that can't be reached is
/// skipped rather than failing the whole broadcast.
pub fn try_broadcast<T>(
    servers: &ServerList,
    timeout: Duration,
    mut attempt: impl FnMut(&mut Session<TcpStream>) -> Result<T, ClientError>,
) -> Result<Vec<T>, ClientError> {
    if servers.is_empty() {
        return Err(ClientError::NoServersAvailable);
    }

    let mut results = Vec::new();

    for entry in servers.servers() {
        let mut session = match connect(entry, timeout) {
            Ok(session) => session,
            Err(error) if is_failover_eligible(&error) => continue,
            Err(error) => return Err(error),
        };

        match attempt(&mut session) {
            Ok(value) => results.push(value),
            Err(error) if is_failover_eligible(&error) => continue,
            Err(error) => return Err(error),
        }
    }

    if results.is_empty() {
        Err(ClientError::NoServersAvailable)
    } else {
        Ok(results)
    }
}
