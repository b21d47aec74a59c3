//! Token command - issue an HS256 claim token offline

use anyhow::Result;
use casper_lib::signing::{issue_token, issue_token_at, ClaimSet};

use super::{load_config, Overrides};

pub fn run(overrides: &Overrides, pairs: Vec<(String, String)>, iat: Option<i64>) -> Result<()> {
    let config = load_config(overrides)?;
    let claims: ClaimSet = pairs.into_iter().collect();

    let token = match iat {
        Some(iat) => issue_token_at(&claims, &config.api_secret, iat)?,
        None => issue_token(&claims, &config.api_secret)?,
    };

    println!("{}", token.as_str());
    Ok(())
}
