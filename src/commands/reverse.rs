use anyhow::Result;

use crate::application::{RestoreAction, RestoreReport};
use crate::runtime::Runtime;

use super::config::Config;

/// Remove every shim and move relocated packages back
#[tracing::instrument(skip(runtime, config))]
pub fn reverse<R: Runtime>(runtime: &R, config: &Config) -> Result<RestoreReport> {
    let action = RestoreAction::new(runtime, &config.primary_root, &config.secondary_root);
    let report = action.restore()?;

    for name in &report.restored {
        println!("Restored {}", name);
    }
    for name in &report.missing {
        println!("Removed shim for {} (relocated copy not found)", name);
    }
    if report.removed_shims.is_empty() {
        println!("Nothing to restore.");
    }

    Ok(report)
}
