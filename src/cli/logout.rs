//! Logout command.

use crate::cli::{output, Context};
use crate::core::gate::Gate;
use crate::error::Result;

/// Clear stored credentials. The server is not contacted.
pub fn execute(ctx: &Context) -> Result<()> {
    let had_token = ctx.store.has_token();
    Gate::new(ctx.api.clone()).logout()?;

    if had_token {
        output::success("logged out");
    } else {
        output::dimmed("no session stored");
    }
    Ok(())
}
