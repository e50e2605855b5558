//! Interactive session shell.
//!
//! Runs the gate until the vault is unlocked, then reads commands until
//! the user quits. After every command the gate is synced with forced
//! logouts raised by the request augmenter; a rejected session drops the
//! user back to the login prompt.

mod categories;
mod command;
mod history;
mod prompt;
mod records;

use std::sync::Arc;

use tracing::debug;

use crate::cli::{output, Context};
use crate::core::api::PasswordFilter;
use crate::core::clipboard::SystemClipboard;
use crate::core::gate::{Gate, GateState};
use crate::core::reveal::{RevealHandle, Revealer};
use crate::core::types::RecordId;
use crate::error::{Error, Result};

use command::{Action, HELP};
use prompt::blocking;

/// What the command loop should do next.
enum Flow {
    Continue,
    Lock,
    Quit,
}

struct Shell<'a> {
    ctx: &'a Context,
    gate: Gate,
    revealer: Option<Revealer>,
    reveals: Vec<RevealHandle>,
}

/// Open the interactive shell.
pub async fn execute(ctx: &Context) -> Result<()> {
    let mut shell = Shell {
        ctx,
        gate: Gate::new(ctx.api.clone()),
        revealer: None,
        reveals: Vec::new(),
    };

    let result = shell.run().await;
    shell.finish();
    result
}

impl Shell<'_> {
    async fn run(&mut self) -> Result<()> {
        loop {
            if !self.unlock().await? {
                return Ok(());
            }
            match self.commands().await? {
                Flow::Quit => return Ok(()),
                Flow::Lock | Flow::Continue => continue,
            }
        }
    }

    /// Drive the gate to `Unlocked`. Returns `false` if the user gave up.
    async fn unlock(&mut self) -> Result<bool> {
        let mut state = self.gate.refresh().await;

        loop {
            debug!(state = %state, "gate");
            state = match state {
                GateState::Unlocked => {
                    output::success("vault unlocked");
                    output::dimmed("type help for commands");
                    return Ok(true);
                }
                GateState::CheckingStatus => self.gate.refresh().await,
                GateState::ConnectionError { message } => {
                    output::error(&format!(
                        "cannot reach {}: {}",
                        self.ctx.api.base_url(),
                        message
                    ));
                    if !blocking(|| prompt::confirm("Retry?", true)).await? {
                        return Ok(false);
                    }
                    self.gate.refresh().await
                }
                GateState::NeedsSetup => {
                    output::header("No master password is set on this server");
                    let entered = blocking(|| {
                        let Some(password) = prompt::master_password("Choose a master password")?
                        else {
                            return Ok(None);
                        };
                        let confirmation = prompt::master_password("Confirm master password")?
                            .unwrap_or_else(|| "".into());
                        Ok(Some((password, confirmation)))
                    })
                    .await?;
                    let Some((password, confirmation)) = entered else {
                        return Ok(false);
                    };
                    let result = self.gate.setup(password, confirmation).await;
                    self.after_attempt(result, GateState::NeedsSetup)
                }
                GateState::NeedsLogin { reason } => {
                    if let Some(reason) = reason {
                        output::warn(&reason);
                    }
                    let entered =
                        blocking(|| prompt::master_password("Master password (empty to quit)"))
                            .await?;
                    let Some(password) = entered else {
                        return Ok(false);
                    };
                    let result = self.gate.login(password).await;
                    self.after_attempt(result, GateState::NeedsLogin { reason: None })
                }
            };
        }
    }

    /// Turn a failed setup or login into the next state to show.
    fn after_attempt(&self, result: Result<GateState>, retry: GateState) -> GateState {
        match result {
            Ok(state) => state,
            Err(Error::Connectivity(message)) => GateState::ConnectionError { message },
            Err(e) => {
                output::error(&e.to_string());
                retry
            }
        }
    }

    async fn commands(&mut self) -> Result<Flow> {
        loop {
            let Some(line) = blocking(|| prompt::text("latchkey")).await? else {
                return Ok(Flow::Quit);
            };
            let action = match command::parse(&line) {
                Ok(action) => action,
                Err(message) => {
                    output::error(&message);
                    continue;
                }
            };

            match self.dispatch_with_retry(&action).await? {
                Flow::Continue => {}
                other => return Ok(other),
            }

            let state = self.gate.sync();
            if !state.is_unlocked() {
                if let GateState::NeedsLogin {
                    reason: Some(reason),
                } = &state
                {
                    output::warn(reason);
                }
                return Ok(Flow::Lock);
            }
        }
    }

    /// Run one action, offering a retry while the server is unreachable.
    async fn dispatch_with_retry(&mut self, action: &Action) -> Result<Flow> {
        loop {
            match self.dispatch(action).await {
                Ok(flow) => return Ok(flow),
                Err(e @ Error::Connectivity(_)) => {
                    output::error(&e.to_string());
                    if !blocking(|| prompt::confirm("Retry?", true)).await? {
                        return Ok(Flow::Continue);
                    }
                }
                // The gate reports this on sync.
                Err(Error::AuthExpired) => return Ok(Flow::Continue),
                Err(e @ (Error::Prompt(_) | Error::Io(_))) => return Err(e),
                Err(e) => {
                    output::error(&e.to_string());
                    return Ok(Flow::Continue);
                }
            }
        }
    }

    async fn dispatch(&mut self, action: &Action) -> Result<Flow> {
        let ctx = self.ctx;
        let api = &ctx.api;

        match action {
            Action::Nothing => {}
            Action::List { search, category } => {
                let filter = PasswordFilter {
                    search: search.clone(),
                    category_id: *category,
                };
                records::list(api, &filter).await?;
            }
            Action::Show(id) => records::show(api, *id).await?,
            Action::Copy(id) => self.copy(*id).await?,
            Action::Add => records::add(api).await?,
            Action::Edit(id) => records::edit(api, *id).await?,
            Action::Rm(id) => records::rm(api, *id).await?,
            Action::Generate { length, symbols } => {
                records::generate(api, *length, *symbols).await?
            }
            Action::Categories => categories::list(api).await?,
            Action::CategoryAdd => categories::add(api).await?,
            Action::CategoryEdit(id) => categories::edit(api, *id).await?,
            Action::CategoryRm(id) => categories::rm(api, *id).await?,
            Action::History { limit } => history::list(api, *limit).await?,
            Action::Help => help(),
            Action::Logout => {
                self.gate.logout()?;
                output::success("logged out");
                return Ok(Flow::Lock);
            }
            Action::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn revealer(&mut self) -> Result<&Revealer> {
        if self.revealer.is_none() {
            let config = &self.ctx.config;
            let clipboard = SystemClipboard::from_config(config.clipboard.command.as_deref())?;
            debug!(program = clipboard.program(), "clipboard ready");
            self.revealer = Some(Revealer::new(
                Arc::new(self.ctx.api.clone()),
                Arc::new(clipboard),
                config.clear_after(),
            ));
        }
        self.revealer
            .as_ref()
            .ok_or_else(|| Error::Reveal("clipboard not initialized".to_string()))
    }

    async fn copy(&mut self, id: RecordId) -> Result<()> {
        self.reveals.retain(RevealHandle::is_pending);
        let handle = self.revealer()?.reveal(id).await?;
        output::success(&format!(
            "copied password for {} (clears in {}s)",
            output::id(id),
            handle.clears_in().as_secs()
        ));
        self.reveals.push(handle);
        Ok(())
    }

    /// Wipe anything still on the clipboard before the process exits.
    fn finish(&mut self) {
        let handles = std::mem::take(&mut self.reveals);
        if let Some(revealer) = &self.revealer {
            if let Err(e) = revealer.flush(handles) {
                output::warn(&format!("could not clear clipboard: {e}"));
            }
        }
    }
}

fn help() {
    output::section("Commands");
    for (usage, description) in HELP {
        output::kv(&format!("{usage:<30}"), description);
    }
}
