//! CLI command implementations

pub mod endpoints;
pub mod proxy;
pub mod session;
pub mod sign;
pub mod token;

use anyhow::Context;
use casper_lib::{CasperClient, CasperConfig, ParameterSet, SignatureScheme};
use casper_lib::signing::{ATTESTATION_FIELDS, CLIENT_AUTH_FIELDS};

use crate::ui;

/// Values from global flags that take precedence over the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub proxy: Option<String>,
    pub project: Option<String>,
}

/// Signature scheme selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemeArg {
    /// Every parameter, sorted by key
    Full,
    /// password, snapchat_version, timestamp, username
    ClientAuth,
    /// nonce, protobuf, snapchat_version
    Attestation,
}

impl From<SchemeArg> for SignatureScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Full => SignatureScheme::FullSorted,
            SchemeArg::ClientAuth => SignatureScheme::FixedSubset(CLIENT_AUTH_FIELDS),
            SchemeArg::Attestation => SignatureScheme::FixedSubset(ATTESTATION_FIELDS),
        }
    }
}

/// Parse a `key=value` argument. The value may itself contain `=`.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

/// Collect parsed pairs into a parameter set. Later duplicates win.
pub fn to_params(pairs: Vec<(String, String)>) -> ParameterSet {
    pairs.into_iter().collect()
}

/// Load the configuration from `CASPER_*` variables and apply overrides.
pub fn load_config(overrides: &Overrides) -> anyhow::Result<CasperConfig> {
    let mut config = CasperConfig::from_env()?.context(
        "CASPER_API_KEY and CASPER_API_SECRET must be set to talk to the signing service",
    )?;
    if let Some(proxy) = &overrides.proxy {
        config.set_proxy(proxy)?;
    }
    if let Some(project) = &overrides.project {
        config.project_name = Some(project.clone());
    }
    Ok(config)
}

/// Build a client and log in with the configured account.
pub async fn connect(overrides: &Overrides, verbose: bool) -> anyhow::Result<CasperClient> {
    let config = load_config(overrides)?;
    if verbose {
        ui::info(&format!("Signing service: {}", config.service_url));
        ui::info(&format!("User-Agent: {}", config.user_agent()));
    }

    let mut client = CasperClient::new(config)?;
    let login = client.login().await?;
    tracing::debug!(username = %login.username, "logged in");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("username=alice").unwrap(),
            ("username".to_string(), "alice".to_string())
        );
        assert_eq!(parse_pair("blob=a=b").unwrap().1, "a=b");
        assert_eq!(parse_pair("empty=").unwrap().1, "");
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=value").is_err());
    }

    #[test]
    fn test_scheme_mapping() {
        assert_eq!(SignatureScheme::from(SchemeArg::Full), SignatureScheme::FullSorted);
        assert_eq!(
            SignatureScheme::from(SchemeArg::ClientAuth),
            SignatureScheme::FixedSubset(CLIENT_AUTH_FIELDS)
        );
    }

    #[test]
    fn test_later_duplicate_wins() {
        let params = to_params(vec![
            ("k".to_string(), "1".to_string()),
            ("k".to_string(), "2".to_string()),
        ]);
        assert_eq!(params.get("k"), Some("2"));
    }

    proptest! {
        #[test]
        fn prop_parse_pair_splits_on_first_equals(key in "[a-z_]{1,12}", value in "[a-z0-9=]{0,12}") {
            let (k, v) = parse_pair(&format!("{}={}", key, value)).unwrap();
            prop_assert_eq!(k, key);
            prop_assert_eq!(v, value);
        }
    }
}
