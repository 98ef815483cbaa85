//! Information shared by every kind of TACACS+ exchange: who's asking, and from where.

use tacacs_plus_protocol::{AuthenticationMethod, PrivilegeLevel, UserInformation};

use crate::error::ClientError;

/// The client-identifying fields carried by every authentication, authorization, and
/// accounting request: user, port (TTY), and remote address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionContext {
    pub(crate) user: String,
    pub(crate) port: String,
    pub(crate) remote_address: String,
    pub(crate) privilege_level: PrivilegeLevel,
    pub(crate) authentication_method: AuthenticationMethod,
}

impl SessionContext {
    pub(crate) fn as_user_information(&self) -> Result<UserInformation<'_>, ClientError> {
        UserInformation::new(
            self.user.as_str().try_into().map_err(|_| ClientError::InvalidContext)?,
            self.port.as_str().try_into().map_err(|_| ClientError::InvalidContext)?,
            self.remote_address
                .as_str()
                .try_into()
                .map_err(|_| ClientError::InvalidContext)?,
        )
        .ok_or(ClientError::InvalidContext)
    }

    /// The username this context is bound to.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The port (terminal/TTY) this session is bound to.
    pub fn port(&self) -> &str {
        &self.port
    }

    /// The address the user connected from.
    pub fn remote_address(&self) -> &str {
        &self.remote_address
    }

    /// The privilege level of this session.
    pub fn privilege_level(&self) -> PrivilegeLevel {
        self.privilege_level
    }

    /// The authentication method reported in authorization/accounting requests.
    pub fn authentication_method(&self) -> AuthenticationMethod {
        self.authentication_method
    }
}

/// Builder for [`SessionContext`] objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionContextBuilder {
    user: String,
    port: String,
    remote_address: String,
    privilege_level: PrivilegeLevel,
    authentication_method: AuthenticationMethod,
}

impl SessionContextBuilder {
    /// Creates a new builder for `user`, with the remaining fields defaulted.
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            port: String::from("unknown"),
            remote_address: String::from("unknown"),
            privilege_level: PrivilegeLevel::default(),
            authentication_method: AuthenticationMethod::TacacsPlus,
        }
    }

    /// Sets the port (terminal) of the resulting context.
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    /// Sets the remote address of the resulting context.
    pub fn remote_address(mut self, remote_address: impl Into<String>) -> Self {
        self.remote_address = remote_address.into();
        self
    }

    /// Sets the privilege level of the resulting context.
    pub fn privilege_level(mut self, privilege_level: PrivilegeLevel) -> Self {
        self.privilege_level = privilege_level;
        self
    }

    /// Sets the authentication method reported in authorization/accounting requests.
    pub fn authentication_method(mut self, method: AuthenticationMethod) -> Self {
        self.authentication_method = method;
        self
    }

    /// Consumes this builder and turns it into a [`SessionContext`].
    pub fn build(self) -> SessionContext {
        SessionContext {
            user: self.user,
            port: self.port,
            remote_address: self.remote_address,
            privilege_level: self.privilege_level,
            authentication_method: self.authentication_method,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_method_to_tacacs_plus() {
        let context = SessionContextBuilder::new("gbrennan").build();
        assert_eq!(context.authentication_method(), AuthenticationMethod::TacacsPlus);
        assert_eq!(context.user(), "gbrennan");
    }

    #[test]
    fn as_user_information_rejects_non_ascii_user() {
        let context = SessionContextBuilder::new("gbr\u{00e9}nnan").build();
        assert!(matches!(context.as_user_information(), Err(ClientError::InvalidContext)));
    }
}
