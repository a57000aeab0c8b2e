//! Credential management commands
//!
//! The credential lives in storage under its own document; removal is
//! its own operation rather than a side effect of clearing state.

use crate::config::looks_like_credential;
use crate::error::Result;
use crate::storage::Storage;
use colored::Colorize;

/// Store an API credential
pub async fn set_credential(key: String) -> Result<()> {
    if !looks_like_credential(&key) {
        println!(
            "{}",
            "Warning: this does not look like a HuggingFace token (hf_...); storing it anyway"
                .yellow()
        );
    }

    let storage = Storage::new()?;
    storage.save_credential(&key).await?;
    tracing::info!("Credential stored");
    println!("Credential stored");
    Ok(())
}

/// Remove the stored credential; succeeds when none exists
pub async fn remove_credential() -> Result<()> {
    let storage = Storage::new()?;
    storage.remove_credential().await?;
    println!("Credential removed");
    Ok(())
}

/// Report whether a credential is configured, without revealing it
pub async fn show_credential() -> Result<()> {
    let storage = Storage::new()?;
    match storage.load_credential().await {
        Some(key) => println!("Credential configured: {}", mask(&key)),
        None => println!("No credential configured"),
    }
    Ok(())
}

/// Show only a short prefix of the stored key
fn mask(key: &str) -> String {
    let prefix: String = key.chars().take(6).collect();
    format!("{prefix}****")
}
