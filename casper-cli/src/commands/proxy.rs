//! Check-proxy command

use anyhow::Result;
use casper_lib::ProxyUrl;

use crate::ui;

pub fn run(raw: &str) -> Result<()> {
    let proxy = ProxyUrl::parse(raw)?;
    ui::success(&format!("{} is a valid proxy", proxy));
    ui::warning("TLS certificate verification is relaxed while a proxy is set");
    Ok(())
}
