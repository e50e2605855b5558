//! Password record commands.
//!
//! Listing and showing never touch plaintext; only `copy` (in the shell)
//! and `generate` do.

use secrecy::{ExposeSecret, SecretString};

use crate::cli::output;
use crate::cli::session::prompt::{self, blocking};
use crate::core::api::{ApiClient, NewPassword, PasswordEntry, PasswordFilter, PasswordUpdate};
use crate::core::constants::DEFAULT_GENERATED_LEN;
use crate::core::types::{CategoryId, RecordId};
use crate::error::{Error, Result};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// List records matching `filter`.
pub async fn list(api: &ApiClient, filter: &PasswordFilter) -> Result<()> {
    let entries = api.list_passwords(filter).await?;

    if entries.is_empty() {
        output::dimmed("no records");
        return Ok(());
    }

    output::section(&output::plural(entries.len(), "record"));
    for entry in &entries {
        output::kv(&output::id(entry.id), summary(entry));
    }
    Ok(())
}

fn summary(entry: &PasswordEntry) -> String {
    let mut parts = vec![entry.title.clone()];
    if let Some(login) = entry.username.as_deref().or(entry.email.as_deref()) {
        parts.push(login.to_string());
    }
    if let Some(category) = &entry.category {
        parts.push(format!("[{}]", category.name));
    }
    parts.join("  ")
}

fn field(label: &str, value: &Option<String>) {
    if let Some(value) = value {
        output::kv(label, value);
    }
}

/// Show one record without its password.
pub async fn show(api: &ApiClient, id: RecordId) -> Result<()> {
    let entry = api.get_password(id).await?;

    output::section(&entry.title);
    output::kv("id", entry.id);
    field("username", &entry.username);
    field("email", &entry.email);
    field("website", &entry.website);
    match (&entry.category, entry.category_id) {
        (Some(category), _) => output::kv("category", &category.name),
        (None, Some(category_id)) => output::kv("category", output::id(category_id)),
        (None, None) => {}
    }
    field("notes", &entry.notes);
    if let Some(created) = entry.created_at {
        output::kv("created", created.format(TIME_FORMAT));
    }
    if let Some(updated) = entry.updated_at {
        output::kv("updated", updated.format(TIME_FORMAT));
    }
    output::kv("password", "••••••••");
    output::hint(&format!("copy it with {}", output::cmd(&format!("copy {}", entry.id))));
    Ok(())
}

struct Draft {
    title: String,
    username: Option<String>,
    email: Option<String>,
    password: Option<SecretString>,
    website: Option<String>,
    notes: Option<String>,
    category: Option<String>,
}

pub(super) fn parse_category(raw: &str) -> Result<CategoryId> {
    raw.trim_start_matches('#')
        .parse()
        .map_err(|_| Error::Validation(format!("invalid category id: {raw}")))
}

/// Prompt for a new record and create it.
///
/// An empty password asks the server to generate one.
pub async fn add(api: &ApiClient) -> Result<()> {
    let draft = blocking(|| {
        let Some(title) = prompt::optional("Title")? else {
            return Ok(None);
        };
        Ok(Some(Draft {
            title,
            username: prompt::optional("Username")?,
            email: prompt::optional("Email")?,
            password: prompt::secret("Password (empty to generate)")?,
            website: prompt::optional("Website")?,
            notes: prompt::optional("Notes")?,
            category: prompt::optional("Category id")?,
        }))
    })
    .await?
    .ok_or_else(|| Error::Validation("title is required".to_string()))?;

    let category_id = draft.category.as_deref().map(parse_category).transpose()?;
    let password = match draft.password {
        Some(password) => password,
        None => {
            let generated = api.generate_password(DEFAULT_GENERATED_LEN, true).await?;
            output::dimmed("generated a password");
            generated
        }
    };

    let created = api
        .create_password(&NewPassword {
            title: draft.title,
            username: draft.username,
            email: draft.email,
            password,
            website: draft.website,
            notes: draft.notes,
            category_id,
        })
        .await?;

    output::success(&format!("added {} {}", output::id(created.id), created.title));
    Ok(())
}

fn label(name: &str, current: Option<&str>) -> String {
    match current {
        Some(value) if !value.is_empty() => format!("{name} [{value}]"),
        _ => name.to_string(),
    }
}

/// Prompt for changes to a record. Empty answers keep the current value.
pub async fn edit(api: &ApiClient, id: RecordId) -> Result<()> {
    let current = api.get_password(id).await?;
    output::dimmed("leave a field empty to keep it");

    let labels = [
        label("Title", Some(&current.title)),
        label("Username", current.username.as_deref()),
        label("Email", current.email.as_deref()),
        label("Website", current.website.as_deref()),
        label("Notes", current.notes.as_deref()),
        label(
            "Category id",
            current.category_id.map(|c| c.to_string()).as_deref(),
        ),
    ];

    let (mut update, category) = blocking(move || {
        let [title, username, email, website, notes, category] = labels;
        let update = PasswordUpdate {
            title: prompt::optional(&title)?,
            username: prompt::optional(&username)?,
            email: prompt::optional(&email)?,
            password: prompt::secret("New password (empty to keep)")?,
            website: prompt::optional(&website)?,
            notes: prompt::optional(&notes)?,
            category_id: None,
        };
        Ok((update, prompt::optional(&category)?))
    })
    .await?;
    update.category_id = category.as_deref().map(parse_category).transpose()?;

    if update.is_empty() {
        output::dimmed("nothing changed");
        return Ok(());
    }

    let updated = api.update_password(id, &update).await?;
    output::success(&format!("updated {} {}", output::id(updated.id), updated.title));
    Ok(())
}

/// Delete a record after confirmation.
pub async fn rm(api: &ApiClient, id: RecordId) -> Result<()> {
    let entry = api.get_password(id).await?;
    let question = format!("Delete #{} {}?", entry.id, entry.title);

    if !blocking(move || prompt::confirm(&question, false)).await? {
        output::dimmed("kept");
        return Ok(());
    }

    let reply = api.delete_password(id).await?;
    output::success(&reply.message);
    Ok(())
}

/// Ask the server for a random password and print it.
pub async fn generate(api: &ApiClient, length: u32, symbols: bool) -> Result<()> {
    let generated = api.generate_password(length, symbols).await?;
    output::data(generated.expose_secret());
    Ok(())
}
