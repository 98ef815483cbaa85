//! A PAM module authenticating, authorizing, and accounting against TACACS+ servers.
//!
//! This crate is the host facade (`C8`): it owns nothing about the wire protocol itself
//! (that's [`tacacs_plus`]) and instead adapts PAM's six lifecycle calls onto the engine's
//! authenticate/authorize/account operations, using the `pam` crate's [`PamHooks`] entry
//! points.

use std::ffi::CStr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use pam::constants::{PamFlag, PamResultCode};
use pam::conv::Conv;
use pam::module::{PamHandle, PamHooks};
use pam::pam_hooks;

use tacacs_plus::accounting::TaskId;
use tacacs_plus::authentication::{AuthenticationOutcome, AuthenticationRequest, ConversationHost, NoConversation};
use tacacs_plus::authorization::AuthorizationOutcome;
use tacacs_plus::context::SessionContextBuilder;
use tacacs_plus::{AcceptedServer, Client, ClientError, PrivilegeLevel, ServerList};
use tacacs_plus_protocol::authentication::Action;

mod config;
mod env;
mod signal_guard;
mod status;

use config::{Config, LoginMethod, PasswordHint};
use signal_guard::HangupSignalGuard;

/// The task id tying this process's accounting `START` to its matching `STOP`.
///
/// Mirrors the original's process-wide `static short int task_id`, set from a fresh
/// random value (`TaskId::random()`, matching the original's `magic()` call) by
/// `open_session` and read back by `close_session`: PAM loads this module fresh per
/// authenticating process, and both calls run in that same process, so a single
/// process-local slot is enough (per §6: "task ids ... are process-local").
static TASK_ID: AtomicU16 = AtomicU16::new(0);

/// The accepting server from the most recent successful `authenticate`, consulted by
/// `acct_mgmt`. Per §9, this is deliberately process-wide global state carried over from
/// the original rather than re-architected, since PAM gives this module no other channel
/// to thread a handle from authenticate through to a later, separate `acct_mgmt` call.
static ACCEPTED_SERVER: std::sync::Mutex<Option<AcceptedServer>> = std::sync::Mutex::new(None);

/// Bridges a PAM conversation function to the engine's [`ConversationHost`] trait.
struct PamConversation<'a> {
    conv: &'a Conv,
}

impl ConversationHost for PamConversation<'_> {
    fn prompt(&mut self, message: &str) -> Result<String, ClientError> {
        self.conv
            .send(pam::constants::PAM_PROMPT_ECHO_OFF, message)
            .map_err(|_| ClientError::ConversationError)?
            .ok_or(ClientError::ConversationError)
    }
}

fn parse_args<'a>(args: &'a [&CStr]) -> Vec<&'a str> {
    args.iter().filter_map(|arg| arg.to_str().ok()).collect()
}

fn client_for(config: &Config) -> Result<Client, PamResultCode> {
    if config.servers.is_empty() {
        log::error!("no TACACS+ servers configured");
        return Err(PamResultCode::PAM_AUTHINFO_UNAVAIL);
    }

    let mut servers = ServerList::new();
    for entry in &config.servers {
        if servers.push(entry.clone()).is_err() {
            break;
        }
    }

    Ok(Client::new(servers, config.timeout()))
}

fn get_user(pamh: &PamHandle) -> Result<String, PamResultCode> {
    pamh.get_user(None).map_err(|code| code)
}

fn get_tty(pamh: &PamHandle) -> String {
    pamh.get_tty(None)
        .ok()
        .map(|tty| tty.trim_start_matches("/dev/").to_owned())
        .unwrap_or_else(|| "unknown".to_owned())
}

fn get_rhost(pamh: &PamHandle) -> String {
    pamh.get_rhost(None).unwrap_or_else(|_| "unknown".to_owned())
}

fn unix_seconds() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// `pam_modules.h`'s `PAM_PRELIM_CHECK`, passed to `pam_sm_chauthtok` on the first of its
/// two calls. Not re-exported by the `pam` crate's [`pam::constants`], so it's reproduced
/// here directly; `PamFlag` is a bare `c_int` bitmask, same as the C side.
const PAM_PRELIM_CHECK: PamFlag = 0x4000;

struct PamTacplus;
pam_hooks!(PamTacplus);

impl PamHooks for PamTacplus {
    fn sm_authenticate(pamh: &mut PamHandle, args: Vec<&CStr>, _flags: PamFlag) -> PamResultCode {
        let args = parse_args(&args);
        let config = Config::parse(args.iter().copied());
        config.apply_log_level();
        log::debug!("sm_authenticate: called");

        let (service, protocol) = (config.service.clone(), config.protocol.clone());
        let _ = (service, protocol); // authentication itself doesn't need service/protocol

        let client = match client_for(&config) {
            Ok(client) => client,
            Err(code) => return code,
        };

        let user = match get_user(pamh) {
            Ok(user) => user,
            Err(code) => return code,
        };
        let tty = get_tty(pamh);
        let rhost = get_rhost(pamh);

        let password = match config.password_hint {
            PasswordHint::UseFirstPass => match pamh.get_authtok(None) {
                Ok(Some(tok)) => tok,
                _ => return PamResultCode::PAM_AUTH_ERR,
            },
            PasswordHint::TryFirstPass => match pamh.get_authtok(None) {
                Ok(Some(tok)) => tok,
                _ => match pamh.get_authtok(Some("Password: ")) {
                    Ok(Some(tok)) => tok,
                    _ => return PamResultCode::PAM_AUTH_ERR,
                },
            },
            PasswordHint::Prompt => match pamh.get_authtok(Some("Password: ")) {
                Ok(Some(tok)) => tok,
                _ => return PamResultCode::PAM_AUTH_ERR,
            },
        };

        let conv = match pamh.get_item::<Conv>() {
            Ok(Some(conv)) => conv,
            _ => return PamResultCode::PAM_CONV_ERR,
        };
        let mut host = PamConversation { conv: &conv };

        let privilege_level = PrivilegeLevel::default();
        let result = match config.login {
            LoginMethod::Ascii => {
                let request = AuthenticationRequest {
                    action: Action::Login,
                    user: &user,
                    port: &tty,
                    remote_address: &rhost,
                    privilege_level,
                    password: Some(&password),
                };
                client.authenticate_ascii(request, &mut host)
            }
            LoginMethod::Pap => client.authenticate_pap(&user, &tty, &rhost, privilege_level, &password),
            LoginMethod::Chap => client.authenticate_chap(&user, &tty, &rhost, privilege_level, &password),
        };

        match result {
            Ok((outcome, accepted)) => {
                if matches!(outcome, AuthenticationOutcome::Pass { .. }) {
                    *ACCEPTED_SERVER.lock().expect("lock poisoned") = Some(accepted);
                }
                status::authentication_status(&outcome)
            }
            Err(error) => {
                log::error!("authentication failed: {error}");
                status::error_status(&error)
            }
        }
    }

    fn sm_setcred(_pamh: &mut PamHandle, _args: Vec<&CStr>, _flags: PamFlag) -> PamResultCode {
        // no network I/O: credential establishment is a no-op for this module, per §4.8.
        PamResultCode::PAM_SUCCESS
    }

    fn acct_mgmt(pamh: &mut PamHandle, args: Vec<&CStr>, _flags: PamFlag) -> PamResultCode {
        let args = parse_args(&args);
        let config = Config::parse(args.iter().copied());
        config.apply_log_level();
        log::debug!("acct_mgmt: called");

        let Some(service) = config.service.clone() else {
            log::error!("TACACS+ service type not configured");
            return PamResultCode::PAM_SERVICE_ERR;
        };
        let Some(protocol) = config.protocol.clone() else {
            log::error!("TACACS+ protocol type not configured");
            return PamResultCode::PAM_SERVICE_ERR;
        };

        let accepted = match ACCEPTED_SERVER.lock().expect("lock poisoned").clone() {
            Some(accepted) => accepted,
            None => {
                log::error!("user not authenticated by TACACS+ in this process");
                return PamResultCode::PAM_AUTH_ERR;
            }
        };

        let client = match client_for(&config) {
            Ok(client) => client,
            Err(code) => return code,
        };

        let user = match get_user(pamh) {
            Ok(user) => user,
            Err(code) => return code,
        };
        let tty = get_tty(pamh);
        let rhost = get_rhost(pamh);

        let context = SessionContextBuilder::new(user)
            .port(tty)
            .remote_address(rhost)
            .build();

        let service_arg = tacacs_plus::Argument::new(
            "service".try_into().expect("ascii literal"),
            service.as_str().try_into().unwrap_or_default(),
            true,
        );
        let protocol_arg = tacacs_plus::Argument::new(
            "protocol".try_into().expect("ascii literal"),
            protocol.as_str().try_into().unwrap_or_default(),
            true,
        );
        let arguments = match (service_arg, protocol_arg) {
            (Ok(s), Ok(p)) => vec![s, p],
            _ => {
                log::error!("service/protocol strings are not valid attribute values");
                return PamResultCode::PAM_SERVICE_ERR;
            }
        };

        match client.authorize(&accepted, &context, &arguments) {
            Ok(outcome) => {
                if let AuthorizationOutcome::PassAdd { arguments, malformed_argument_count }
                | AuthorizationOutcome::PassReplace { arguments, malformed_argument_count } = &outcome
                {
                    if *malformed_argument_count > 0 {
                        log::warn!(
                            "authorization reply carried {malformed_argument_count} malformed attribute(s), skipped"
                        );
                    }
                    env::export_attributes(pamh, arguments);
                }
                status::authorization_status(&outcome)
            }
            Err(error) => {
                log::error!("authorization failed: {error}");
                status::error_status(&error)
            }
        }
    }

    fn sm_open_session(pamh: &mut PamHandle, args: Vec<&CStr>, _flags: PamFlag) -> PamResultCode {
        let args = parse_args(&args);
        let config = Config::parse(args.iter().copied());
        config.apply_log_level();
        log::debug!("sm_open_session: called");

        let (Some(service), Some(protocol)) = (config.service.clone(), config.protocol.clone()) else {
            log::error!("TACACS+ service/protocol type not configured");
            return PamResultCode::PAM_SERVICE_ERR;
        };

        let client = match client_for(&config) {
            Ok(client) => client,
            Err(code) => return code,
        };

        let user = match get_user(pamh) {
            Ok(user) => user,
            Err(code) => return code,
        };
        let context = SessionContextBuilder::new(user)
            .port(get_tty(pamh))
            .remote_address(get_rhost(pamh))
            .build();

        let task_id = TaskId::random();
        TASK_ID.store(task_id.0, Ordering::SeqCst);
        let start_time = unix_seconds();

        match client.account_start(&context, task_id, start_time, &service, &protocol, config.acct_all) {
            Ok(_) => PamResultCode::PAM_SUCCESS,
            Err(error) => {
                log::warn!("accounting start failed (task {}): {error}", task_id.0);
                status::error_status(&error)
            }
        }
    }

    fn sm_close_session(pamh: &mut PamHandle, args: Vec<&CStr>, _flags: PamFlag) -> PamResultCode {
        let args = parse_args(&args);
        let config = Config::parse(args.iter().copied());
        config.apply_log_level();
        log::debug!("sm_close_session: called");

        let (Some(service), Some(protocol)) = (config.service.clone(), config.protocol.clone()) else {
            log::error!("TACACS+ service/protocol type not configured");
            return PamResultCode::PAM_SERVICE_ERR;
        };

        let client = match client_for(&config) {
            Ok(client) => client,
            Err(code) => return code,
        };

        let user = match get_user(pamh) {
            Ok(user) => user,
            Err(code) => return code,
        };
        let context = SessionContextBuilder::new(user)
            .port(get_tty(pamh))
            .remote_address(get_rhost(pamh))
            .build();

        let task_id = TaskId(TASK_ID.load(Ordering::SeqCst));
        let stop_time = unix_seconds();

        // suppress the signals a modem hang-up raises for the duration of this call.
        let _guard = HangupSignalGuard::block();

        match client.account_stop(&context, task_id, stop_time, &service, &protocol, None, config.acct_all) {
            Ok(_) => PamResultCode::PAM_SUCCESS,
            Err(error) => {
                log::warn!("accounting stop failed (task {}): {error}", task_id.0);
                status::error_status(&error)
            }
        }
    }

    fn sm_chauthtok(pamh: &mut PamHandle, args: Vec<&CStr>, flags: PamFlag) -> PamResultCode {
        let args = parse_args(&args);
        let config = Config::parse(args.iter().copied());
        config.apply_log_level();
        log::debug!("sm_chauthtok: called");

        let client = match client_for(&config) {
            Ok(client) => client,
            Err(code) => return code,
        };

        if flags & PAM_PRELIM_CHECK != 0 {
            return match client.check_reachable() {
                Ok(()) => PamResultCode::PAM_SUCCESS,
                Err(error) => {
                    log::error!("preliminary reachability check failed: {error}");
                    PamResultCode::PAM_TRY_AGAIN
                }
            };
        }

        let user = match get_user(pamh) {
            Ok(user) => user,
            Err(code) => return code,
        };
        let tty = get_tty(pamh);
        let rhost = get_rhost(pamh);

        let conv = match pamh.get_item::<Conv>() {
            Ok(Some(conv)) => conv,
            _ => return PamResultCode::PAM_CONV_ERR,
        };
        let mut host = PamConversation { conv: &conv };

        // the placeholder is replaced by whatever the server's GETDATA prompts elicit.
        let request = AuthenticationRequest {
            action: Action::ChangePassword,
            user: &user,
            port: &tty,
            remote_address: &rhost,
            privilege_level: PrivilegeLevel::default(),
            password: None,
        };

        match client.authenticate_ascii(request, &mut host) {
            Ok((outcome, _accepted)) => status::authentication_status(&outcome),
            Err(error) => {
                log::error!("change-token failed: {error}");
                status::error_status(&error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_for_rejects_empty_server_list() {
        let config = Config::default();
        assert!(matches!(client_for(&config), Err(PamResultCode::PAM_AUTHINFO_UNAVAIL)));
    }

    #[test]
    fn client_for_builds_from_configured_servers() {
        let config = Config::parse(["server=10.0.0.1:49", "secret=cisco"]);
        let client = client_for(&config).expect("one configured server");
        assert_eq!(client.servers().servers().len(), 1);
    }

    #[test]
    fn conversation_host_always_fails_without_a_conv_function() {
        // NoConversation stands in for a PAM host whose conv function can't be reached;
        // this just documents the fallback this crate uses if pamh.get_item::<Conv> fails.
        let mut host = NoConversation;
        assert!(matches!(host.prompt("irrelevant"), Err(ClientError::ConversationError)));
    }
}
