//! Small shared fields used across authentication, authorization, and accounting bodies.

use crate::{FieldText, SerializeError};

#[cfg(test)]
mod tests;

/// The method by which a client claims to have already authenticated a user, as carried
/// in authorization/accounting requests.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationMethod {
    /// No authentication method is known.
    NotSet = 0x00,
    /// No authentication was performed.
    None = 0x01,
    /// Kerberos version 5.
    Kerberos5 = 0x02,
    /// Authenticated via a line password.
    Line = 0x03,
    /// Authenticated via an enable password.
    Enable = 0x04,
    /// Authenticated against a local user database.
    Local = 0x05,
    /// Authenticated via TACACS+ itself.
    TacacsPlus = 0x06,
    /// Guest authentication.
    Guest = 0x08,
    /// RADIUS.
    Radius = 0x10,
    /// Kerberos version 4.
    Kerberos4 = 0x11,
    /// An R-command (rlogin/rsh/rcp) style authentication.
    RCommand = 0x20,
}

impl AuthenticationMethod {
    /// The number of bytes an [`AuthenticationMethod`] occupies on the wire.
    pub const WIRE_SIZE: usize = 1;
}

/// A privilege level, restricted to the 0-15 range specified in RFC8907.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PrivilegeLevel(u8);

impl PrivilegeLevel {
    /// The minimum (least privileged) level.
    pub const MINIMUM: Self = Self(0);

    /// The maximum (most privileged) level.
    pub const MAXIMUM: Self = Self(15);

    /// Converts a raw level into a `PrivilegeLevel`, if it's in the valid 0-15 range.
    pub fn of(level: u8) -> Option<Self> {
        if level <= 15 {
            Some(Self(level))
        } else {
            None
        }
    }

    /// The raw numeric value of this privilege level.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for PrivilegeLevel {
    fn default() -> Self {
        Self::MINIMUM
    }
}

/// The authentication type used (or requested) for a TACACS+ exchange.
///
/// Note that TACACS+ itself provides no transport encryption beyond the body
/// obfuscation; the wire must be otherwise protected (e.g. a private management
/// network) regardless of which type is chosen. See [RFC8907 §10.1].
///
/// [RFC8907 §10.1]: https://www.rfc-editor.org/rfc/rfc8907.html#section-10.1
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationType {
    /// No authentication type set (only valid outside of a [`Start`](crate::authentication::Start) packet).
    NotSet = 0x00,
    /// Plain username/password exchange.
    Ascii = 0x01,
    /// The Password Authentication Protocol ([RFC1334]).
    ///
    /// [RFC1334]: https://www.rfc-editor.org/rfc/rfc1334.html
    Pap = 0x02,
    /// The Challenge-Handshake Authentication Protocol ([RFC1334]).
    ///
    /// [RFC1334]: https://www.rfc-editor.org/rfc/rfc1334.html
    Chap = 0x03,
    /// AppleTalk Remote Access Protocol. Not present in RFC8907, kept for completeness.
    Arap = 0x04,
    /// Microsoft's CHAP extension, version 1.
    MsChap = 0x05,
    /// Microsoft's CHAP extension, version 2.
    MsChapV2 = 0x06,
}

/// The service requesting authentication, authorization, or accounting.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationService {
    /// No service in particular.
    None = 0x00,
    /// Login service (the only one this client drives end-to-end).
    Login = 0x01,
    /// Enable (privilege escalation) service.
    Enable = 0x02,
    /// Point-to-point protocol.
    Ppp = 0x03,
    /// AppleTalk Remote Access Protocol.
    Arap = 0x04,
    /// PT daemon service.
    Pt = 0x05,
    /// An R-command service.
    Rcmd = 0x06,
    /// X.25 PAD connection.
    X25 = 0x07,
    /// NASI.
    Nasi = 0x08,
    /// Firewall proxy.
    FwProxy = 0x09,
}

/// The shared "authentication context" fields common to authentication, authorization,
/// and accounting request bodies: privilege level, authentication type, and service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticationContext {
    /// The privilege level associated with the request.
    pub privilege_level: PrivilegeLevel,

    /// The type of authentication in use (or previously used, for authorization/accounting).
    pub authentication_type: AuthenticationType,

    /// The service requesting the exchange.
    pub service: AuthenticationService,
}

impl AuthenticationContext {
    /// The number of bytes these fields occupy on the wire.
    pub(crate) const WIRE_SIZE: usize = 3;

    pub(crate) fn serialize_header_information(&self, buffer: &mut [u8]) {
        buffer[0] = self.privilege_level.0;
        buffer[1] = self.authentication_type as u8;
        buffer[2] = self.service as u8;
    }
}

/// Information identifying the client end of a TACACS+ exchange: the user, the port
/// they connected on, and the address they connected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserInformation<'info> {
    user: FieldText<'info>,
    port: FieldText<'info>,
    remote_address: FieldText<'info>,
}

impl<'info> UserInformation<'info> {
    /// Three length-prefix bytes (user, port, remote address) precede the fields themselves.
    pub(crate) const HEADER_INFORMATION_SIZE: usize = 3;

    /// Bundles together client information, checking that each field fits in the single
    /// length-prefix byte the wire format allows (at most 255 bytes each).
    pub fn new(
        user: FieldText<'info>,
        port: FieldText<'info>,
        remote_address: FieldText<'info>,
    ) -> Option<Self> {
        if user.len() <= u8::MAX as usize
            && port.len() <= u8::MAX as usize
            && remote_address.len() <= u8::MAX as usize
        {
            Some(Self {
                user,
                port,
                remote_address,
            })
        } else {
            None
        }
    }

    /// The user identifying this client.
    pub fn user(&self) -> &FieldText<'info> {
        &self.user
    }

    /// The port the user connected on.
    pub fn port(&self) -> &FieldText<'info> {
        &self.port
    }

    /// The address the user connected from.
    pub fn remote_address(&self) -> &FieldText<'info> {
        &self.remote_address
    }

    pub(crate) fn wire_size(&self) -> usize {
        Self::HEADER_INFORMATION_SIZE + self.user.len() + self.port.len() + self.remote_address.len()
    }

    pub(crate) fn serialize_header_information(&self, buffer: &mut [u8]) -> Result<usize, SerializeError> {
        buffer[0] = self.user.len().try_into()?;
        buffer[1] = self.port.len().try_into()?;
        buffer[2] = self.remote_address.len().try_into()?;

        Ok(Self::HEADER_INFORMATION_SIZE)
    }

    pub(crate) fn serialize_body_information(&self, buffer: &mut [u8]) -> usize {
        let user_len = self.user.len();
        let port_len = self.port.len();
        let remote_address_len = self.remote_address.len();
        let total_len = user_len + port_len + remote_address_len;

        buffer[0..user_len].copy_from_slice(self.user.as_bytes());
        buffer[user_len..user_len + port_len].copy_from_slice(self.port.as_bytes());
        buffer[user_len + port_len..total_len].copy_from_slice(self.remote_address.as_bytes());

        total_len
    }
}
