/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use entity::variable_snapshot_history::HistoryReferenceType;
use sea_orm::ConnectionTrait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::instrument;

use super::database::template::{self, RunnerTemplate};
use super::database::{Audit, config_map, variable};
use super::error::CoreResult;
use super::variables::{
    ResolveRequest, Scope, Snapshot, TemplateParser, TemplateType, render, render_secret, resolve,
    resolve_secret,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub name: String,
    #[serde(rename = "type", default)]
    pub entry_type: String,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    #[serde(default)]
    pub maps: Vec<ConfigEntry>,
}

impl ConfigData {
    pub fn parse(blob: &str) -> CoreResult<Self> {
        if blob.trim().is_empty() {
            return Ok(ConfigData::default());
        }
        Ok(serde_json::from_str(blob)?)
    }
}

/// Effective config maps and secrets for one (app, env), keyed by entry name in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedConfig {
    pub config_maps: Map<String, Value>,
    pub secrets: Map<String, Value>,
    pub config_snapshot: Snapshot,
    pub secret_snapshot: Snapshot,
    /// The unresolved overlay the maps were rendered from.
    pub template: RunnerTemplate,
}

/// App-level entries with env-level entries replacing (in place) or appended by name.
pub fn overlay(app: Vec<ConfigEntry>, env: Vec<ConfigEntry>) -> Vec<ConfigEntry> {
    let mut merged = app;
    for entry in env {
        match merged.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => merged.push(entry),
        }
    }
    merged
}

async fn load<C: ConnectionTrait>(
    db: &C,
    app_id: i32,
    environment_id: i32,
) -> CoreResult<(Vec<ConfigEntry>, Vec<ConfigEntry>)> {
    let app = config_map::get_app_level(db, app_id).await?;
    let env = config_map::get_env_level(db, app_id, environment_id).await?;

    let (app_cm, app_secret) = match &app {
        Some(app) => (
            ConfigData::parse(&app.config_map_data)?.maps,
            ConfigData::parse(&app.secret_data)?.maps,
        ),
        None => (Vec::new(), Vec::new()),
    };

    let (env_cm, env_secret) = match &env {
        Some(env) => (
            ConfigData::parse(&env.config_map_data)?.maps,
            ConfigData::parse(&env.secret_data)?.maps,
        ),
        None => (Vec::new(), Vec::new()),
    };

    Ok((overlay(app_cm, env_cm), overlay(app_secret, env_secret)))
}

fn into_map(entries: Vec<ConfigEntry>) -> CoreResult<Map<String, Value>> {
    let mut map = Map::new();
    for entry in entries {
        map.insert(entry.name.clone(), serde_json::to_value(entry)?);
    }
    Ok(map)
}

#[instrument(skip(db, parser), fields(app_id = app_id, environment_id = environment_id))]
pub async fn merge<C: ConnectionTrait>(
    db: &C,
    parser: &dyn TemplateParser,
    app_id: i32,
    environment_id: i32,
    scope: Scope,
) -> CoreResult<MergedConfig> {
    let (mut config_maps, mut secrets) = load(db, app_id, environment_id).await?;
    let mut merged = MergedConfig {
        template: RunnerTemplate {
            config_map_data: serde_json::to_string(&ConfigData {
                maps: config_maps.clone(),
            })?,
            secret_data: serde_json::to_string(&ConfigData {
                maps: secrets.clone(),
            })?,
            stage_config: String::new(),
        },
        ..Default::default()
    };

    for entry in config_maps.iter_mut() {
        let template = serde_json::to_string(&entry.data)?;
        let resolved = resolve(
            db,
            parser,
            ResolveRequest {
                template: &template,
                template_type: TemplateType::Json,
                scope,
                ignore_unknown: false,
            },
        )
        .await?;
        entry.data = serde_json::from_str(&resolved.template)?;
        merged.config_snapshot.extend(resolved.snapshot);
    }

    for entry in secrets.iter_mut() {
        for value in entry.data.values_mut() {
            if let Value::String(encoded) = value {
                let resolved = resolve_secret(db, parser, encoded, scope, false).await?;
                *encoded = resolved.template;
                merged.secret_snapshot.extend(resolved.snapshot);
            }
        }
    }

    merged.config_maps = into_map(config_maps)?;
    merged.secrets = into_map(secrets)?;
    Ok(merged)
}

/// Stores the merge snapshots and the unresolved overlay against the runner that consumed them.
pub async fn persist_snapshots<C: ConnectionTrait>(
    db: &C,
    runner_id: i32,
    merged: &MergedConfig,
    audit: Audit,
) -> CoreResult<()> {
    variable::insert_history(
        db,
        HistoryReferenceType::ConfigMap,
        runner_id,
        &merged.config_snapshot,
        audit,
    )
    .await?;
    variable::insert_history(
        db,
        HistoryReferenceType::Secret,
        runner_id,
        &merged.secret_snapshot,
        audit,
    )
    .await?;
    template::insert_template(db, runner_id, &merged.template, audit).await?;
    Ok(())
}

/// Replays the merge for a past runner from its stored overlay and snapshots.
///
/// Config edits made after the runner was created do not affect the result.
pub async fn merge_from_history<C: ConnectionTrait>(
    db: &C,
    parser: &dyn TemplateParser,
    runner_id: i32,
) -> CoreResult<MergedConfig> {
    let stored = template::get_template(db, runner_id).await?;
    let mut config_maps = ConfigData::parse(&stored.config_map_data)?.maps;
    let mut secrets = ConfigData::parse(&stored.secret_data)?.maps;

    let config_snapshot = variable::get_history(db, HistoryReferenceType::ConfigMap, runner_id)
        .await?
        .unwrap_or_default();
    let secret_snapshot = variable::get_history(db, HistoryReferenceType::Secret, runner_id)
        .await?
        .unwrap_or_default();

    for entry in config_maps.iter_mut() {
        let template = serde_json::to_string(&entry.data)?;
        let rendered = render(parser, &template, TemplateType::Json, &config_snapshot);
        entry.data = serde_json::from_str(&rendered)?;
    }

    for entry in secrets.iter_mut() {
        for value in entry.data.values_mut() {
            if let Value::String(encoded) = value {
                *encoded = render_secret(parser, encoded, &secret_snapshot);
            }
        }
    }

    Ok(MergedConfig {
        config_maps: into_map(config_maps)?,
        secrets: into_map(secrets)?,
        config_snapshot,
        secret_snapshot,
        template: stored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, data: Value) -> ConfigEntry {
        ConfigEntry {
            name: name.to_string(),
            entry_type: "environment".to_string(),
            external: false,
            data: data.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn env_entry_replaces_by_name_in_place() {
        let merged = overlay(
            vec![entry("a", json!({"k": "1"})), entry("b", json!({"k": "2"}))],
            vec![entry("a", json!({"k": "override"})), entry("c", json!({}))],
        );
        let names: Vec<&str> = merged.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(merged[0].data["k"], json!("override"));
    }

    #[test]
    fn parses_empty_and_shaped_blobs() {
        assert_eq!(ConfigData::parse("").unwrap(), ConfigData::default());
        let data = ConfigData::parse(
            r#"{"maps":[{"name":"app-cm","type":"volume","external":true,"data":{"z":"1","a":"2"}}]}"#,
        )
        .unwrap();
        assert_eq!(data.maps.len(), 1);
        assert!(data.maps[0].external);
        let keys: Vec<&String> = data.maps[0].data.keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn rejects_malformed_blob() {
        assert!(ConfigData::parse("{not json").is_err());
    }
}
