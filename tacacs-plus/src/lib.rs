//! A synchronous, blocking RFC8907 TACACS+ client.
//!
//! This crate owns the parts of the protocol engine that touch the network: a single
//! configurable-timeout [`transport`], the per-session sequence/obfuscation bookkeeping in
//! [`session`], the authentication state machine in [`authentication`], the authorization
//! and accounting exchanges, and the ordered-server failover policy in [`selector`].
//! Wire (de)serialization itself lives in [`tacacs_plus_protocol`].
//!
//! Callers that only need the protocol engine (no PAM binding) can use [`Client`] directly;
//! `pam-tacplus` builds its PAM hooks on top of it.

pub mod accounting;
pub mod authentication;
pub mod authorization;
mod client;
pub mod context;
mod error;
pub mod selector;
mod session;
mod transport;

pub use client::Client;
pub use context::{SessionContext, SessionContextBuilder};
pub use error::ClientError;
pub use selector::{AcceptedServer, ServerEntry, ServerList};
pub use session::Session;
pub use transport::Transport;

// re-exported so callers don't need a direct `tacacs-plus-protocol` dependency for the
// common field types used to build a `SessionContext` or an authentication request.
pub use tacacs_plus_protocol::{
    Argument, ArgumentOwned, AuthenticationMethod, AuthenticationType, PrivilegeLevel,
};
