//! Maps the protocol engine's outcomes onto the PAM framework's status codes.

use pam::constants::PamResultCode;
use tacacs_plus::authentication::AuthenticationOutcome;
use tacacs_plus::authorization::AuthorizationOutcome;
use tacacs_plus::ClientError;

/// Maps a terminal [`AuthenticationOutcome`] to the PAM status `pam_sm_authenticate`/
/// `pam_sm_chauthtok` return, per §4.6/§4.8.
pub fn authentication_status(outcome: &AuthenticationOutcome) -> PamResultCode {
    match outcome {
        AuthenticationOutcome::Pass { .. } => PamResultCode::PAM_SUCCESS,
        AuthenticationOutcome::Fail { .. } => PamResultCode::PAM_AUTH_ERR,
        AuthenticationOutcome::Restart => PamResultCode::PAM_AUTH_ERR,
        AuthenticationOutcome::Follow => PamResultCode::PAM_AUTH_ERR,
        AuthenticationOutcome::NewTokenRequired => PamResultCode::PAM_NEW_AUTHTOK_REQD,
    }
}

/// Maps a terminal [`AuthorizationOutcome`] to the PAM status `pam_sm_acct_mgmt` returns.
pub fn authorization_status(outcome: &AuthorizationOutcome) -> PamResultCode {
    match outcome {
        AuthorizationOutcome::PassAdd { .. } => PamResultCode::PAM_SUCCESS,
        AuthorizationOutcome::PassReplace { .. } => PamResultCode::PAM_SUCCESS,
        AuthorizationOutcome::Denied { .. } => PamResultCode::PAM_PERM_DENIED,
    }
}

/// Maps an engine-level failure to the PAM status appropriate for it, per §6/§7: transport
/// and protocol failures that exhausted the server list become auth-info-unavailable, a
/// refused conversation becomes conv-err, everything else is a generic auth error.
pub fn error_status(error: &ClientError) -> PamResultCode {
    match error {
        ClientError::NoServersAvailable => PamResultCode::PAM_AUTHINFO_UNAVAIL,
        ClientError::ConversationError => PamResultCode::PAM_CONV_ERR,
        ClientError::ServerError { .. } => PamResultCode::PAM_AUTHINFO_UNAVAIL,
        ClientError::InvalidContext => PamResultCode::PAM_SERVICE_ERR,
        _ => PamResultCode::PAM_AUTH_ERR,
    }
}
