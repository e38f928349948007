use clap::Subcommand;
use sipwell_core::Settings;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Get a settings value
    Get {
        /// Settings key (e.g. "goal", "interval", "alert_type")
        key: String,
    },
    /// Set a settings value
    Set {
        /// Settings key
        key: String,
        /// New value
        value: String,
    },
    /// List all settings
    List,
    /// Reset settings to defaults
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (mut coordinator, _store) = super::open_coordinator()?;
    match action {
        SettingsAction::Get { key } => {
            let settings = coordinator.get_settings(None)?;
            match get_field(&settings, &key)? {
                Some(value) => println!("{value}"),
                None => {
                    eprintln!("unknown key: {key}");
                    std::process::exit(1);
                }
            }
        }
        SettingsAction::Set { key, value } => {
            let settings = coordinator.get_settings(None)?;
            let updated = set_field(&settings, &key, &value)?;
            coordinator.set_settings(updated)?;
            println!("ok");
        }
        SettingsAction::List => {
            let settings = coordinator.get_settings(None)?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Reset => {
            coordinator.set_settings(Settings::default())?;
            println!("settings reset to defaults");
        }
    }
    Ok(())
}

fn get_field(settings: &Settings, key: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let json = serde_json::to_value(settings)?;
    Ok(json.get(key).map(|value| match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }))
}

fn set_field(
    settings: &Settings,
    key: &str,
    value: &str,
) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut json = serde_json::to_value(settings)?;
    let obj = json.as_object_mut().ok_or("settings are not an object")?;
    let existing = obj
        .get(key)
        .ok_or_else(|| format!("unknown key: {key}"))?;

    let new_value = match existing {
        serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse::<bool>()?),
        serde_json::Value::Number(_) => serde_json::Value::Number(value.parse::<u64>()?.into()),
        _ => serde_json::Value::String(value.into()),
    };
    obj.insert(key.to_string(), new_value);

    let updated: Settings = serde_json::from_value(json)?;
    updated.validate()?;
    Ok(updated)
}
