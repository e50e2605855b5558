//! Quick status overview command.

use crate::cli::{output, Context};
use crate::core::config::Config;
use crate::core::gate::{Gate, GateState};
use crate::error::{Error, Result};

/// Run the gate once and report where the vault stands.
///
/// A new process never holds the master password, so a stored token is
/// always stale here and the gate clears it.
pub async fn execute(ctx: &Context) -> Result<()> {
    let had_token = ctx.store.has_token();
    let gate = Gate::new(ctx.api.clone());
    let state = gate.refresh().await;

    output::section("Latchkey Status");
    output::kv("server", ctx.api.base_url());
    if let Ok(path) = Config::config_path() {
        output::kv("config", path.display());
    }

    match state {
        GateState::ConnectionError { message } => {
            output::kv("vault", "unreachable");
            return Err(Error::Connectivity(message));
        }
        GateState::NeedsSetup => {
            output::kv("vault", "no master password yet");
            output::blank();
            output::hint(&format!("set one up with {}", output::cmd("latchkey session")));
        }
        GateState::NeedsLogin { reason } => {
            output::kv("vault", "locked");
            if let Some(reason) = reason {
                output::kv("reason", reason);
            }
            if had_token && !ctx.store.has_token() {
                output::kv("session", "stale token cleared");
            }
            output::blank();
            output::hint(&format!("unlock with {}", output::cmd("latchkey session")));
        }
        GateState::Unlocked => output::kv("vault", "unlocked"),
        GateState::CheckingStatus => output::kv("vault", "checking"),
    }

    Ok(())
}
