//! Exports an authorization reply's attributes into the PAM environment.
//!
//! Grounded on the original's `pam_putenv` loop in `pam_sm_acct_mgmt`: each attribute name
//! is uppercased and its `-` rewritten to `_` before being joined to its value with `=`.

use pam::module::PamHandle;
use tacacs_plus::ArgumentOwned;

fn env_name(attribute_name: &str) -> String {
    attribute_name
        .chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_uppercase() })
        .collect()
}

/// Exports every decoded attribute as `NAME=VALUE` into the PAM environment, logging (but
/// not failing on) any `pamh.putenv` failure for an individual attribute.
pub fn export_attributes(pamh: &mut PamHandle, arguments: &[ArgumentOwned]) {
    for argument in arguments {
        let entry = format!("{}={}", env_name(&argument.name), argument.value);

        if let Err(code) = pamh.putenv(&entry) {
            log::warn!("failed to export attribute {}: {code:?}", argument.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_name_uppercases_and_rewrites_hyphens() {
        assert_eq!(env_name("shell:roles"), "SHELL:ROLES");
        assert_eq!(env_name("priv-lvl"), "PRIV_LVL");
    }
}
