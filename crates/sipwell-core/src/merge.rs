//! Shallow override merge.
//!
//! The merge strategy used when reconciling a day record with the current
//! settings: for every key present in `other` whose value is not null and
//! which already exists in `base`, overwrite `base`'s value. Keys absent
//! from `base` are never introduced, nested objects are not recursed into,
//! and array values are replaced wholesale, never unioned.

use serde_json::Value;

use crate::daylog::DailyLog;
use crate::error::Result;
use crate::settings::Settings;

/// Apply `other` onto `base` with shallow-override semantics.
///
/// No-op unless both values are JSON objects.
pub fn merge(base: &mut Value, other: &Value) {
    let (Some(base_map), Some(other_map)) = (base.as_object_mut(), other.as_object()) else {
        return;
    };
    for (key, value) in other_map {
        if value.is_null() {
            continue;
        }
        if let Some(slot) = base_map.get_mut(key) {
            *slot = value.clone();
        }
    }
}

/// The settings fields shared with a day record.
///
/// Only the display fields are carried over; the `intake` step deliberately
/// stays out so it can never clobber a day's running total.
pub fn settings_overlay(settings: &Settings) -> Value {
    serde_json::json!({
        "goal": settings.goal,
        "measurement": settings.measurement,
    })
}

/// Overlay the shared settings fields onto a raw day record.
pub fn apply_settings(day: &mut Value, settings: &Settings) {
    merge(day, &settings_overlay(settings));
}

/// Overlay the shared settings fields onto a typed day record.
///
/// # Errors
///
/// Returns an error if the merged value no longer deserializes as a
/// [`DailyLog`].
pub fn merge_day_with_settings(day: &DailyLog, settings: &Settings) -> Result<DailyLog> {
    let mut value = serde_json::to_value(day)?;
    apply_settings(&mut value, settings);
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn overwrites_only_existing_keys() {
        let mut base = json!({"goal": 1500, "intake": 400});
        merge(&mut base, &json!({"goal": 2000, "brand_new": true}));
        assert_eq!(base, json!({"goal": 2000, "intake": 400}));
    }

    #[test]
    fn null_values_are_treated_as_unset() {
        let mut base = json!({"goal": 1500});
        merge(&mut base, &json!({"goal": null}));
        assert_eq!(base["goal"], 1500);
    }

    #[test]
    fn arrays_are_replaced_wholesale() {
        let mut base = json!({"logs": [1, 2, 3]});
        merge(&mut base, &json!({"logs": [9]}));
        assert_eq!(base["logs"], json!([9]));
    }

    #[test]
    fn non_objects_are_left_alone() {
        let mut base = json!([1, 2]);
        merge(&mut base, &json!({"a": 1}));
        assert_eq!(base, json!([1, 2]));
    }

    #[test]
    fn overlay_excludes_intake_step() {
        let settings = Settings::default();
        let overlay = settings_overlay(&settings);
        assert!(overlay.get("intake").is_none());
        assert!(overlay.get("interval").is_none());
        assert_eq!(overlay["goal"], 1800);
    }

    #[test]
    fn merged_day_keeps_its_total() {
        let mut settings = Settings::default();
        settings.goal = 2000;
        let mut day = DailyLog::seeded("2024-03-04", &Settings::default());
        day.log_intake(500, chrono::Utc::now());

        let merged = merge_day_with_settings(&day, &settings).unwrap();
        assert_eq!(merged.goal, 2000);
        assert_eq!(merged.intake, 500);
        assert_eq!(merged.logs, day.logs);
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::from),
        ]
    }

    proptest! {
        #[test]
        fn merge_law(
            base_map in prop::collection::btree_map("[a-e]", scalar(), 0..6),
            other_map in prop::collection::btree_map("[a-h]", scalar(), 0..6),
        ) {
            let mut base = serde_json::to_value(&base_map).unwrap();
            let other = serde_json::to_value(&other_map).unwrap();
            merge(&mut base, &other);
            let merged = base.as_object().unwrap();

            // Never introduces a key absent from base.
            for key in merged.keys() {
                prop_assert!(base_map.contains_key(key.as_str()));
            }
            for (key, original) in &base_map {
                let result = &merged[key.as_str()];
                match other_map.get(key) {
                    // Present in both and non-null: other wins.
                    Some(v) if !v.is_null() => prop_assert_eq!(result, v),
                    // Null sentinel or absent: base value survives.
                    _ => prop_assert_eq!(result, original),
                }
            }
        }
    }
}
