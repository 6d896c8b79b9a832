// ABOUTME: Settings subcommands for the sysconf CLI
// ABOUTME: Table and JSON output, with warnings for values that will not decode

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use inquire::Confirm;
use serde::Serialize;
use sysconf_settings::{
    validate_key, validate_value, Setting, SettingCreateInput, SettingDefault, SettingUpdateInput,
    SettingsOverlay, SettingsStorage, TypedValue, ValueType,
};

use super::utils::{describe_typed, format_date, format_typed, truncate};

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// List all stored settings
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show one setting with its decoded value
    Get {
        key: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Create a new setting
    Create {
        key: String,
        /// Stored value (omit for no value)
        #[arg(long, allow_hyphen_values = true)]
        value: Option<String>,
        /// Value type: string, int, float or bool
        #[arg(long = "type", default_value = "string")]
        value_type: ValueType,
        /// Human-readable description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Change the stored value of a setting
    Set {
        key: String,
        /// New value
        #[arg(
            required_unless_present = "clear",
            conflicts_with = "clear",
            allow_negative_numbers = true
        )]
        value: Option<String>,
        /// Remove the stored value
        #[arg(long)]
        clear: bool,
    },
    /// Change how a setting's value is decoded
    Retype {
        key: String,
        value_type: ValueType,
    },
    /// Change the description of a setting
    Describe {
        key: String,
        #[arg(required_unless_present = "clear", conflicts_with = "clear")]
        text: Option<String>,
        /// Remove the description
        #[arg(long)]
        clear: bool,
    },
    /// Delete a setting
    Delete {
        key: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show the effective value of a key: stored setting, then environment, then default
    Resolve {
        key: String,
        /// Type used to decode the environment variable and default
        #[arg(long = "type", default_value = "string")]
        value_type: ValueType,
        /// Environment variable consulted when no value is stored
        #[arg(long)]
        env: Option<String>,
        /// Static default used when nothing else is set
        #[arg(long, allow_hyphen_values = true)]
        default: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

/// JSON view of a setting with its decoded value alongside
#[derive(Serialize)]
struct SettingView<'a> {
    #[serde(flatten)]
    setting: &'a Setting,
    typed_value: Option<TypedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decode_error: Option<String>,
}

impl<'a> SettingView<'a> {
    fn new(setting: &'a Setting) -> Self {
        match setting.typed_value() {
            Ok(typed_value) => Self {
                setting,
                typed_value,
                decode_error: None,
            },
            Err(e) => Self {
                setting,
                typed_value: None,
                decode_error: Some(e.to_string()),
            },
        }
    }
}

pub async fn handle_settings_command(
    storage: &SettingsStorage,
    command: SettingsCommands,
) -> Result<()> {
    match command {
        SettingsCommands::List { json } => list_settings(storage, json).await,
        SettingsCommands::Get { key, json } => show_setting(storage, &key, json).await,
        SettingsCommands::Create {
            key,
            value,
            value_type,
            description,
        } => create_setting(storage, key, value, value_type, description).await,
        SettingsCommands::Set { key, value, clear } => {
            let value = if clear { None } else { value };
            set_value(storage, &key, value).await
        }
        SettingsCommands::Retype { key, value_type } => {
            retype_setting(storage, &key, value_type).await
        }
        SettingsCommands::Describe { key, text, clear } => {
            let text = if clear { None } else { text };
            describe_setting(storage, &key, text).await
        }
        SettingsCommands::Delete { key, yes } => delete_setting(storage, &key, yes).await,
        SettingsCommands::Resolve {
            key,
            value_type,
            env,
            default,
            json,
        } => resolve_setting(storage, key, value_type, env, default, json).await,
    }
}

async fn list_settings(storage: &SettingsStorage, json: bool) -> Result<()> {
    let settings = storage.list().await?;

    if json {
        let views: Vec<SettingView> = settings.iter().map(SettingView::new).collect();
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if settings.is_empty() {
        println!("{}", "No settings found".yellow());
        println!(
            "{}",
            "Use 'sysconf create <key> --value <value>' to add one".dimmed()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["Key", "Value", "Type", "Decoded", "Description", "Updated"]);

    for setting in &settings {
        table.add_row(vec![
            setting.key.clone(),
            truncate(setting.value.as_deref().unwrap_or("-"), 30),
            setting.value_type.clone(),
            truncate(&format_typed(&setting.typed_value()), 30),
            truncate(setting.description.as_deref().unwrap_or("-"), 40),
            format_date(&setting.updated_at),
        ]);
    }

    println!("{}", table);
    println!("Total: {} settings", settings.len().to_string().cyan());

    Ok(())
}

async fn show_setting(storage: &SettingsStorage, key: &str, json: bool) -> Result<()> {
    let setting = require(storage, key).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&SettingView::new(&setting))?
        );
        return Ok(());
    }

    print_setting_details(&setting);
    Ok(())
}

async fn create_setting(
    storage: &SettingsStorage,
    key: String,
    value: Option<String>,
    value_type: ValueType,
    description: Option<String>,
) -> Result<()> {
    validate_key(&key)?;
    if let Some(value) = &value {
        warn_on_mismatch(value, &value_type);
    }

    let setting = storage
        .create(SettingCreateInput {
            key,
            value,
            value_type: Some(value_type),
            description,
        })
        .await?;

    println!(
        "{}",
        format!("Created setting '{}'", setting.key).green().bold()
    );
    print_setting_details(&setting);
    Ok(())
}

async fn set_value(storage: &SettingsStorage, key: &str, value: Option<String>) -> Result<()> {
    let existing = require(storage, key).await?;

    if let (Some(value), Some(value_type)) = (&value, existing.parsed_value_type()) {
        warn_on_mismatch(value, &value_type);
    }

    let setting = storage.set_value(key, value.as_deref()).await?;
    println!("{}", format!("Updated setting '{}'", key).green());
    print_setting_details(&setting);
    Ok(())
}

async fn retype_setting(
    storage: &SettingsStorage,
    key: &str,
    value_type: ValueType,
) -> Result<()> {
    let existing = require(storage, key).await?;

    if let Some(value) = &existing.value {
        warn_on_mismatch(value, &value_type);
    }

    let setting = storage
        .update(
            key,
            SettingUpdateInput {
                value_type: Some(value_type),
                ..Default::default()
            },
        )
        .await?;
    println!(
        "{}",
        format!("Setting '{}' is now decoded as {}", key, value_type).green()
    );
    print_setting_details(&setting);
    Ok(())
}

async fn describe_setting(
    storage: &SettingsStorage,
    key: &str,
    text: Option<String>,
) -> Result<()> {
    let setting = storage
        .update(
            key,
            SettingUpdateInput {
                description: Some(text),
                ..Default::default()
            },
        )
        .await?;
    println!("{}", format!("Updated description of '{}'", key).green());
    print_setting_details(&setting);
    Ok(())
}

async fn delete_setting(storage: &SettingsStorage, key: &str, yes: bool) -> Result<()> {
    let setting = require(storage, key).await?;

    if !yes {
        let confirmed = Confirm::new(&format!("Delete setting '{}'?", setting.key))
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("{}", "Deletion cancelled".yellow());
            return Ok(());
        }
    }

    storage.delete(key).await?;
    println!("{}", format!("Deleted setting '{}'", key).green());
    Ok(())
}

async fn resolve_setting(
    storage: &SettingsStorage,
    key: String,
    value_type: ValueType,
    env: Option<String>,
    default: Option<String>,
    json: bool,
) -> Result<()> {
    let mut defaults = Vec::new();
    if env.is_some() || default.is_some() {
        let mut fallback = SettingDefault::new(key.clone(), value_type);
        fallback.env_var = env;
        fallback.default = default;
        defaults.push(fallback);
    }

    let overlay = SettingsOverlay::new(storage.clone(), defaults);
    let resolved = overlay
        .resolve(&key)
        .await?
        .ok_or_else(|| anyhow!("Setting '{}' is not stored and has no fallback", key))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    println!(
        "{} = {} {}",
        resolved.key.bold(),
        describe_typed(&Ok(resolved.value.clone())),
        format!("[{}]", resolved.source).dimmed()
    );
    Ok(())
}

async fn require(storage: &SettingsStorage, key: &str) -> Result<Setting> {
    storage
        .get(key)
        .await
        .with_context(|| format!("Failed to load setting '{}'", key))?
        .ok_or_else(|| anyhow!("Setting '{}' not found", key))
}

/// Values are stored even when they do not match their type; say so up front
fn warn_on_mismatch(value: &str, value_type: &ValueType) {
    if let Err(e) = validate_value(value, value_type) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }
}

fn label(name: &str) -> ColoredString {
    format!("{:<14}", name).bold()
}

fn print_setting_details(setting: &Setting) {
    println!("{} {}", label("ID:"), setting.id);
    println!("{} {}", label("Key:"), setting.key);
    println!(
        "{} {}",
        label("Value:"),
        setting.value.as_deref().unwrap_or("-")
    );
    println!("{} {}", label("Type:"), setting.value_type);
    println!(
        "{} {}",
        label("Decoded:"),
        describe_typed(&setting.typed_value())
    );
    println!(
        "{} {}",
        label("Description:"),
        setting.description.as_deref().unwrap_or("-")
    );
    println!("{} {}", label("Updated:"), format_date(&setting.updated_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sysconf_storage::StorageConfig;
    use tempfile::TempDir;

    async fn create_test_storage(dir: &TempDir) -> SettingsStorage {
        let config = StorageConfig::default().with_path(dir.path().join("settings.db"));
        let pool = sysconf_storage::open(&config).await.unwrap();
        SettingsStorage::new(pool)
    }

    #[tokio::test]
    async fn test_create_get_set_delete_flow() {
        let dir = TempDir::new().unwrap();
        let storage = create_test_storage(&dir).await;

        handle_settings_command(
            &storage,
            SettingsCommands::Create {
                key: "offset".to_string(),
                value: Some("-5".to_string()),
                value_type: ValueType::Int,
                description: Some("Clock offset".to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(
            storage.get_typed("offset").await.unwrap(),
            Some(TypedValue::Int(-5))
        );

        handle_settings_command(
            &storage,
            SettingsCommands::Get {
                key: "offset".to_string(),
                json: true,
            },
        )
        .await
        .unwrap();

        handle_settings_command(
            &storage,
            SettingsCommands::Set {
                key: "offset".to_string(),
                value: Some("1_000".to_string()),
                clear: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            storage.get_typed("offset").await.unwrap(),
            Some(TypedValue::Int(1000))
        );

        handle_settings_command(&storage, SettingsCommands::List { json: false })
            .await
            .unwrap();

        handle_settings_command(
            &storage,
            SettingsCommands::Delete {
                key: "offset".to_string(),
                yes: true,
            },
        )
        .await
        .unwrap();
        assert!(storage.get("offset").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_key() {
        let dir = TempDir::new().unwrap();
        let storage = create_test_storage(&dir).await;

        let result = handle_settings_command(
            &storage,
            SettingsCommands::Create {
                key: "bad key".to_string(),
                value: None,
                value_type: ValueType::String,
                description: None,
            },
        )
        .await;
        assert!(result.is_err());
        assert!(storage.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_value_is_still_stored() {
        let dir = TempDir::new().unwrap();
        let storage = create_test_storage(&dir).await;

        handle_settings_command(
            &storage,
            SettingsCommands::Create {
                key: "retries".to_string(),
                value: Some("three".to_string()),
                value_type: ValueType::Int,
                description: None,
            },
        )
        .await
        .unwrap();

        let stored = storage.get("retries").await.unwrap().unwrap();
        assert_eq!(stored.value.as_deref(), Some("three"));
    }

    #[tokio::test]
    async fn test_missing_key_errors() {
        let dir = TempDir::new().unwrap();
        let storage = create_test_storage(&dir).await;

        let result = handle_settings_command(
            &storage,
            SettingsCommands::Get {
                key: "ghost".to_string(),
                json: false,
            },
        )
        .await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("ghost"));

        let result = handle_settings_command(
            &storage,
            SettingsCommands::Delete {
                key: "ghost".to_string(),
                yes: true,
            },
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_resolve_uses_default_when_not_stored() {
        let dir = TempDir::new().unwrap();
        let storage = create_test_storage(&dir).await;

        handle_settings_command(
            &storage,
            SettingsCommands::Resolve {
                key: "ratio".to_string(),
                value_type: ValueType::Float,
                env: None,
                default: Some("-0.5".to_string()),
                json: true,
            },
        )
        .await
        .unwrap();

        let result = handle_settings_command(
            &storage,
            SettingsCommands::Resolve {
                key: "ratio".to_string(),
                value_type: ValueType::Float,
                env: None,
                default: None,
                json: false,
            },
        )
        .await;
        assert!(result.is_err());
    }
}
