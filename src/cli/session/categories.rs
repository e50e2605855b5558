//! Category commands.

use crate::cli::output;
use crate::cli::session::prompt::{self, blocking};
use crate::core::api::{ApiClient, Category, CategoryUpdate, NewCategory};
use crate::core::constants::DEFAULT_CATEGORY_COLOR;
use crate::core::types::CategoryId;
use crate::error::{Error, Result};

fn describe(category: &Category) -> String {
    let mut line = format!("{}  {}", category.name, category.color);
    if category.is_default {
        line.push_str("  (default)");
    }
    line
}

pub async fn list(api: &ApiClient) -> Result<()> {
    let categories = api.list_categories().await?;

    if categories.is_empty() {
        output::dimmed("no categories");
        return Ok(());
    }

    output::section(&format!("{} categories", categories.len()));
    for category in &categories {
        output::kv(&output::id(category.id), describe(category));
    }
    Ok(())
}

pub async fn add(api: &ApiClient) -> Result<()> {
    let new = blocking(|| {
        let Some(name) = prompt::optional("Name")? else {
            return Ok(None);
        };
        let color = prompt::optional(&format!("Color [{DEFAULT_CATEGORY_COLOR}]"))?
            .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string());
        let icon = prompt::optional("Icon")?;
        Ok(Some(NewCategory { name, color, icon }))
    })
    .await?
    .ok_or_else(|| Error::Validation("name is required".to_string()))?;

    let created = api.create_category(&new).await?;
    output::success(&format!("added category {} {}", output::id(created.id), created.name));
    Ok(())
}

async fn find(api: &ApiClient, id: CategoryId) -> Result<Category> {
    api.list_categories()
        .await?
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| Error::NotFound(format!("category {id}")))
}

pub async fn edit(api: &ApiClient, id: CategoryId) -> Result<()> {
    let current = find(api, id).await?;
    output::dimmed("leave a field empty to keep it");

    let name_label = format!("Name [{}]", current.name);
    let color_label = format!("Color [{}]", current.color);
    let update = blocking(move || {
        Ok(CategoryUpdate {
            name: prompt::optional(&name_label)?,
            color: prompt::optional(&color_label)?,
            icon: prompt::optional("Icon")?,
        })
    })
    .await?;

    if update.is_empty() {
        output::dimmed("nothing changed");
        return Ok(());
    }

    let updated = api.update_category(id, &update).await?;
    output::success(&format!("updated category {} {}", output::id(updated.id), updated.name));
    Ok(())
}

pub async fn rm(api: &ApiClient, id: CategoryId) -> Result<()> {
    let category = find(api, id).await?;
    if category.is_default {
        return Err(Error::Validation("Cannot delete default categories".to_string()));
    }
    let question = format!("Delete category {}?", category.name);

    if !blocking(move || prompt::confirm(&question, false)).await? {
        output::dimmed("kept");
        return Ok(());
    }

    let reply = api.delete_category(id).await?;
    output::success(&reply.message);
    Ok(())
}
