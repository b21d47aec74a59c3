//! Sign command - compute a `v1:` request signature offline

use anyhow::Result;

use super::{load_config, to_params, Overrides, SchemeArg};
use crate::ui;

pub fn run(overrides: &Overrides, pairs: Vec<(String, String)>, scheme: SchemeArg) -> Result<()> {
    let config = load_config(overrides)?;
    let params = to_params(pairs);
    let scheme = casper_lib::SignatureScheme::from(scheme);

    let signature = scheme.sign(&params, &config.api_secret)?;

    ui::header("Request Signature");
    ui::key_value("Signed string", &scheme.serialize(&params));
    ui::signature(&signature);
    Ok(())
}
