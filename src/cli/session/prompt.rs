//! Prompts that work on a terminal and from a pipe.
//!
//! On a terminal, input goes through `dialoguer` (hidden for passwords).
//! Piped input is read line by line without echoing any prompt, which
//! keeps the shell scriptable.

use std::io::{self, BufRead, IsTerminal};

use dialoguer::{Confirm, Input, Password};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

use crate::core::types::MasterPassword;
use crate::error::{Error, Result};

/// Run prompts off the runtime thread so clipboard timers keep firing
/// while the user types.
pub async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Prompt(e.to_string()))?
}

fn interactive() -> bool {
    io::stdin().is_terminal()
}

/// Next line from a pipe, without the trailing newline. `None` at EOF.
fn read_line() -> Result<Option<String>> {
    let mut buf = String::new();
    if io::stdin().lock().read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
}

/// Hidden entry. Empty input or EOF yields `None`.
pub fn secret(prompt: &str) -> Result<Option<SecretString>> {
    let value = if interactive() {
        Zeroizing::new(
            Password::new()
                .with_prompt(prompt)
                .allow_empty_password(true)
                .interact()?,
        )
    } else {
        match read_line()? {
            Some(line) => Zeroizing::new(line),
            None => return Ok(None),
        }
    };

    if value.is_empty() {
        return Ok(None);
    }
    Ok(Some(SecretString::from(value.as_str().to_owned())))
}

/// Master password entry. Empty input or EOF yields `None`.
pub fn master_password(prompt: &str) -> Result<Option<MasterPassword>> {
    Ok(secret(prompt)?.map(|s| MasterPassword::new(s.expose_secret())))
}

/// One line of text. EOF yields `None`; empty input is `Some("")`.
pub fn text(prompt: &str) -> Result<Option<String>> {
    if interactive() {
        let line: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(Some(line))
    } else {
        read_line()
    }
}

/// Optional field: empty input means "not set".
pub fn optional(prompt: &str) -> Result<Option<String>> {
    Ok(text(prompt)?
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Yes/no question. EOF answers `false`.
pub fn confirm(prompt: &str, default: bool) -> Result<bool> {
    if interactive() {
        return Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?);
    }
    Ok(match read_line()? {
        Some(answer) => parse_answer(&answer).unwrap_or(default),
        None => false,
    })
}

fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
