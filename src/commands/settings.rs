//! Generation settings commands

use crate::config::{resolve_model, SettingsPatch, MODEL_CATALOG};
use crate::error::Result;
use crate::storage::Storage;
use crate::store::ChatStore;
use prettytable::{cell, row, Table};

/// Show the current generation settings
pub async fn show_settings() -> Result<()> {
    let store = ChatStore::new(Storage::new()?);
    store.initialize().await;
    let settings = store.settings();

    let mut table = Table::new();
    table.add_row(row!["Setting", "Value"]);
    table.add_row(row!["model", settings.model]);
    table.add_row(row!["temperature", settings.temperature]);
    table.add_row(row!["max_tokens", settings.max_tokens]);
    table.add_row(row!["top_p", settings.top_p]);
    table.printstd();
    Ok(())
}

/// Change one or more generation settings and persist the result
///
/// Numeric values outside their documented bounds are clamped rather
/// than rejected.
pub async fn set_settings(
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    top_p: Option<f32>,
) -> Result<()> {
    let patch = SettingsPatch {
        model: model.map(|m| resolve_model(&m)),
        temperature,
        max_tokens,
        top_p,
    };
    if patch.is_empty() {
        println!("Nothing to change; pass at least one of --model, --temperature, --max-tokens, --top-p");
        return Ok(());
    }

    let store = ChatStore::new(Storage::new()?);
    store.initialize().await;
    store.update_settings(patch);
    store.flush().await?;

    let settings = store.settings();
    println!(
        "Settings updated: model={}, temperature={}, max_tokens={}, top_p={}",
        settings.model, settings.temperature, settings.max_tokens, settings.top_p
    );
    Ok(())
}

/// List the models the client knows by a short label
pub async fn list_models() -> Result<()> {
    let store = ChatStore::new(Storage::new()?);
    store.initialize().await;
    let current = store.settings().model;

    let mut table = Table::new();
    table.add_row(row!["Label", "Model", "Active"]);
    for option in MODEL_CATALOG {
        let marker = if option.id == current { "*" } else { "" };
        table.add_row(row![option.label, option.id, marker]);
    }
    table.printstd();
    println!("\nAny other model id can be set verbatim with `settings set --model <id>`");
    Ok(())
}
