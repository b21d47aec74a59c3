//! Authenticated commands - login, updates, friend and generic calls

use std::time::Duration;

use anyhow::Result;
use casper_lib::{Endpoint, FriendAction};

use super::{connect, to_params, Overrides};
use crate::ui;

pub async fn login(overrides: &Overrides, verbose: bool) -> Result<()> {
    let client = connect(overrides, verbose).await?;

    ui::success("Logged in");
    if let Some(session) = client.session() {
        ui::key_value("Username", session.username());
    }
    Ok(())
}

pub async fn updates(overrides: &Overrides, verbose: bool) -> Result<()> {
    let client = connect(overrides, verbose).await?;
    let updates = client.updates().await?;
    ui::json(&updates);
    Ok(())
}

pub async fn friend(
    overrides: &Overrides,
    action: &str,
    friend: &str,
    display: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let action: FriendAction = action.parse()?;
    let client = connect(overrides, verbose).await?;

    let response = client.friend(action, friend, display).await?;
    ui::success(&format!("{} {}", action, friend));
    if verbose {
        ui::json(&response);
    }
    Ok(())
}

pub async fn call(
    overrides: &Overrides,
    endpoint: &str,
    pairs: Vec<(String, String)>,
    deadline: Option<u64>,
    verbose: bool,
) -> Result<()> {
    let endpoint: Endpoint = endpoint.parse()?;
    let params = to_params(pairs);
    let client = connect(overrides, verbose).await?;

    let response = match deadline {
        Some(secs) => {
            client
                .call_with_deadline(endpoint, params, Duration::from_secs(secs))
                .await?
        }
        None => client.call(endpoint, params).await?,
    };

    ui::status(response.status, endpoint.expected_status());
    if let Some(id) = &response.captcha_id {
        ui::key_value("Captcha", id);
    }
    match serde_json::from_slice::<serde_json::Value>(&response.body) {
        Ok(json) => ui::json(&json),
        Err(_) if response.body.is_empty() => {}
        Err(_) => ui::info(&format!("{} bytes of binary content", response.body.len())),
    }
    Ok(())
}
