use std::env;

use anyhow::{bail, Context, Result};
use reqwest::Url;

const DEFAULT_HEALTH_URL: &str = "http://127.0.0.1:25566/health";

fn main() -> Result<()> {
    let target = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_HEALTH_URL.to_string());
    let url = Url::parse(&target).with_context(|| format!("Invalid URL {target}"))?;

    let response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        bail!("Health check failed with HTTP {}", response.status())
    }

    Ok(())
}
