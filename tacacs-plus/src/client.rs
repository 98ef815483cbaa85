//! A synchronous, blocking RFC8907 TACACS+ client tying together a [`ServerList`], the
//! [`authentication`](crate::authentication), [`authorization`](crate::authorization), and
//! [`accounting`](crate::accounting) exchanges, and the [`selector`] failover policy.
//!
//! This is the one type most callers (including the `pam-tacplus` crate) need: it owns no
//! network state between calls, opening a fresh [`Session`] for every authenticate/authorize/
//! account call and handing it off to the selector.

use std::net::TcpStream;
use std::time::Duration;

use tacacs_plus_protocol::{Argument, PrivilegeLevel};

use crate::accounting::{self, AccountingOutcome, TaskId};
use crate::authentication::{self, AuthenticationOutcome, AuthenticationRequest, ConversationHost};
use crate::authorization::{self, AuthorizationOutcome};
use crate::context::SessionContext;
use crate::error::ClientError;
use crate::selector::{self, AcceptedServer, ServerList};

/// A TACACS+ client: an ordered [`ServerList`] plus the single timeout applied to every
/// connect and read (spec §5: "every network call uses a deadline measured in whole
/// seconds").
#[derive(Debug, Clone)]
pub struct Client {
    servers: ServerList,
    timeout: Duration,
}

impl Client {
    /// The default per-I/O timeout applied when none is configured, per §6.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    /// Builds a client from a configured server list and timeout.
    pub fn new(servers: ServerList, timeout: Duration) -> Self {
        Self { servers, timeout }
    }

    /// The configured server list.
    pub fn servers(&self) -> &ServerList {
        &self.servers
    }

    fn find_server(&self, accepted: &AcceptedServer) -> Result<&selector::ServerEntry, ClientError> {
        self.servers
            .servers()
            .iter()
            .find(|entry| entry.address() == accepted.address())
            .ok_or(ClientError::NoServersAvailable)
    }

    /// Drives an ASCII login (or password-change) exchange against the first server in
    /// the list that answers, per §4.7's first-responder policy.
    pub fn authenticate_ascii(
        &self,
        request: AuthenticationRequest<'_>,
        host: &mut impl ConversationHost,
    ) -> Result<(AuthenticationOutcome, AcceptedServer), ClientError> {
        selector::try_first_responder(&self.servers, self.timeout, |session| {
            authentication::run_ascii(session, request, &mut *host)
        })
    }

    /// Drives a single-round PAP login against the first server in the list that answers.
    pub fn authenticate_pap(
        &self,
        user: &str,
        port: &str,
        remote_address: &str,
        privilege_level: PrivilegeLevel,
        password: &str,
    ) -> Result<(AuthenticationOutcome, AcceptedServer), ClientError> {
        selector::try_first_responder(&self.servers, self.timeout, |session| {
            authentication::run_pap(session, user, port, remote_address, privilege_level, password)
        })
    }

    /// Drives a single-round CHAP login against the first server in the list that answers.
    pub fn authenticate_chap(
        &self,
        user: &str,
        port: &str,
        remote_address: &str,
        privilege_level: PrivilegeLevel,
        password: &str,
    ) -> Result<(AuthenticationOutcome, AcceptedServer), ClientError> {
        selector::try_first_responder(&self.servers, self.timeout, |session| {
            authentication::run_chap(session, user, port, remote_address, privilege_level, password)
        })
    }

    /// Sends an authorization request to the server that accepted a prior authenticate
    /// call, per §4.8: "requires a prior successful authenticate in the same process".
    pub fn authorize(
        &self,
        accepted: &AcceptedServer,
        context: &SessionContext,
        arguments: &[Argument<'_>],
    ) -> Result<AuthorizationOutcome, ClientError> {
        let entry = self.find_server(accepted)?;
        let mut session = selector::connect(entry, self.timeout)?;
        authorization::authorize(&mut session, context, arguments)
    }

    /// Sends an accounting `START` record, in first-responder or broadcast mode depending
    /// on `broadcast` (the `acct_all` configuration option, per §6).
    ///
    /// `unix_seconds` becomes the `start_time` attribute; the caller samples it once so
    /// a broadcast send carries the same timestamp to every configured server (§4.7: "the
    /// same task id and timestamps are used across all sends").
    pub fn account_start(
        &self,
        context: &SessionContext,
        task_id: TaskId,
        unix_seconds: u64,
        service: &str,
        protocol: &str,
        broadcast: bool,
    ) -> Result<Vec<AccountingOutcome>, ClientError> {
        self.run_accounting(broadcast, |session| {
            accounting::start(session, context, task_id, unix_seconds, service, protocol)
        })
    }

    /// Sends an accounting `STOP` record, in first-responder or broadcast mode.
    ///
    /// `unix_seconds` becomes the `stop_time` attribute; see [`Client::account_start`] for
    /// why it's sampled once by the caller rather than per server.
    pub fn account_stop(
        &self,
        context: &SessionContext,
        task_id: TaskId,
        unix_seconds: u64,
        service: &str,
        protocol: &str,
        cmd: Option<&str>,
        broadcast: bool,
    ) -> Result<Vec<AccountingOutcome>, ClientError> {
        self.run_accounting(broadcast, |session| {
            accounting::stop(session, context, task_id, unix_seconds, service, protocol, cmd)
        })
    }

    /// Probes whether any configured server can be reached, without running a full
    /// authenticate exchange against it.
    ///
    /// Grounded on `pam_sm_chauthtok`'s `PAM_PRELIM_CHECK` handling in the original: it
    /// connects down the server list until one answers, closes the connection, and
    /// reports success — it never sends an AUTHEN/START (§4.8).
    pub fn check_reachable(&self) -> Result<(), ClientError> {
        selector::try_first_responder(&self.servers, self.timeout, |_session| Ok(())).map(|_| ())
    }

    /// Sends an accounting `WATCHDOG` record, in first-responder or broadcast mode.
    pub fn account_watchdog(
        &self,
        context: &SessionContext,
        task_id: TaskId,
        broadcast: bool,
    ) -> Result<Vec<AccountingOutcome>, ClientError> {
        self.run_accounting(broadcast, |session| accounting::watchdog(session, context, task_id))
    }

    fn run_accounting(
        &self,
        broadcast: bool,
        mut attempt: impl FnMut(&mut crate::session::Session<TcpStream>) -> Result<AccountingOutcome, ClientError>,
    ) -> Result<Vec<AccountingOutcome>, ClientError> {
        if broadcast {
            selector::try_broadcast(&self.servers, self.timeout, &mut attempt)
        } else {
            selector::try_first_responder(&self.servers, self.timeout, &mut attempt)
                .map(|(outcome, _accepted)| vec![outcome])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::ServerEntry;

    #[test]
    fn check_reachable_fails_with_no_servers_configured() {
        let client = Client::new(ServerList::new(), Duration::from_secs(1));
        assert!(matches!(client.check_reachable(), Err(ClientError::NoServersAvailable)));
    }

    #[test]
    fn authorize_fails_when_accepted_server_not_in_list() {
        let mut servers = ServerList::new();
        servers.push(ServerEntry::new("127.0.0.1:49", b"secret".to_vec())).unwrap();
        let client = Client::new(servers, Duration::from_secs(1));

        let ghost = AcceptedServer::new(&ServerEntry::new("10.0.0.99:49", Vec::new()));
        let context = crate::context::SessionContextBuilder::new("alice").build();

        let result = client.authorize(&ghost, &context, &[]);
        assert!(matches!(result, Err(ClientError::NoServersAvailable)));
    }
}
