//! `fern build`: run the configured build once.

use anyhow::{Result, bail};

use crate::builder::{Builder, ConfiguredBuilder};
use crate::config::FernConfig;
use crate::log;

pub fn build_once(config: &FernConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut builder = ConfiguredBuilder::from_config(config);
    let outcome = runtime.block_on(builder.build());

    if !outcome.is_success() {
        bail!("build failed: {}", outcome.error().unwrap_or_default());
    }

    log!("build"; "{}", config.root_relative(outcome.output_path()).display());
    Ok(())
}
