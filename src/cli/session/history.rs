//! Activity history command.

use crate::cli::output;
use crate::core::api::{ActivityLog, ApiClient};
use crate::error::Result;

fn when(log: &ActivityLog) -> String {
    log.timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Show the most recent `limit` entries.
pub async fn list(api: &ApiClient, limit: u32) -> Result<()> {
    let logs = api.history(limit).await?;

    if logs.is_empty() {
        output::dimmed("no activity");
        return Ok(());
    }

    output::section("Recent activity");
    for log in &logs {
        let line = match &log.description {
            Some(description) => format!("{:<10} {}", log.action, description),
            None => log.action.clone(),
        };
        output::kv(&when(log), line);
    }
    Ok(())
}
