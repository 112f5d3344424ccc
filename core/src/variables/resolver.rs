/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use entity::variable_entity_mapping::EntityType;
use entity::variable_snapshot_history::HistoryReferenceType;
use sea_orm::{ConnectionTrait, TransactionTrait};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

use super::{Audience, ResolveRequest, Resolved, Scope, Snapshot, TemplateParser, TemplateType};
use crate::consts::{HIDDEN_VALUE, UNKNOWN_VARIABLE};
use crate::database::{Audit, variable};
use crate::error::{CoreError, CoreResult};
use crate::types::*;

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn destringify(value: &str) -> Value {
    serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
}

fn json_escape(value: &str) -> String {
    let quoted = Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Substitutes the snapshot into the template. Names absent from the snapshot are left as written.
pub fn render(
    parser: &dyn TemplateParser,
    template: &str,
    template_type: TemplateType,
    snapshot: &Snapshot,
) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut cursor = 0;

    for reference in parser.find(template) {
        let Some(value) = snapshot.get(&reference.name) else {
            continue;
        };

        match template_type {
            TemplateType::String => {
                out.push_str(&template[cursor..reference.start]);
                out.push_str(value);
                cursor = reference.end;
            }
            TemplateType::Json => {
                let quoted = reference.start > cursor
                    && bytes[reference.start - 1] == b'"'
                    && bytes.get(reference.end) == Some(&b'"');

                match destringify(value) {
                    Value::String(_) => {
                        out.push_str(&template[cursor..reference.start]);
                        out.push_str(&json_escape(value));
                        cursor = reference.end;
                    }
                    parsed if quoted => {
                        out.push_str(&template[cursor..reference.start - 1]);
                        out.push_str(&parsed.to_string());
                        cursor = reference.end + 1;
                    }
                    _ => {
                        out.push_str(&template[cursor..reference.start]);
                        out.push_str(&json_escape(value));
                        cursor = reference.end;
                    }
                }
            }
        }
    }

    out.push_str(&template[cursor..]);
    out
}

/// Copy of the snapshot with private values hidden.
pub fn mask(snapshot: &Snapshot, private: &BTreeSet<String>) -> Snapshot {
    snapshot
        .iter()
        .map(|(name, value)| {
            if private.contains(name) {
                (name.clone(), HIDDEN_VALUE.to_string())
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}

impl Resolved {
    /// The render a given audience may see.
    pub fn render_for(
        &self,
        parser: &dyn TemplateParser,
        template: &str,
        template_type: TemplateType,
        audience: Audience,
    ) -> String {
        match audience {
            Audience::Privileged => self.template.clone(),
            Audience::Public if self.private.is_empty() => self.template.clone(),
            Audience::Public => render(
                parser,
                template,
                template_type,
                &mask(&self.snapshot, &self.private),
            ),
        }
    }
}

/// Current values for `names` under `scope`, and which of them are private.
pub async fn lookup<C: ConnectionTrait>(
    db: &C,
    names: &[String],
    scope: Scope,
) -> CoreResult<(BTreeMap<String, Value>, BTreeSet<String>)> {
    let definitions = variable::get_definitions_by_names(db, names).await?;
    let scoped = variable::get_scoped_values(
        db,
        &definitions.iter().map(|d| d.id).collect::<Vec<_>>(),
    )
    .await?;

    let mut best: BTreeMap<i32, (MVariableScope, MVariableData)> = BTreeMap::new();
    for (candidate, data) in scoped {
        if !candidate.matches(scope.app_id, scope.env_id, scope.cluster_id) {
            continue;
        }

        // newest scope rows come first, so ties keep the earlier one
        let replace = match best.get(&candidate.variable_definition_id) {
            Some((current, _)) => candidate.qualifier_id < current.qualifier_id,
            None => true,
        };

        if replace {
            best.insert(candidate.variable_definition_id, (candidate, data));
        }
    }

    let mut values = BTreeMap::new();
    let mut private = BTreeSet::new();
    for definition in definitions {
        if definition.is_sensitive() {
            private.insert(definition.name.clone());
        }

        if let Some((_, data)) = best.get(&definition.id) {
            values.insert(definition.name.clone(), serde_json::from_str(&data.data)?);
        }
    }

    Ok((values, private))
}

fn build_snapshot(
    parser: &dyn TemplateParser,
    names: &[String],
    values: &BTreeMap<String, Value>,
    ignore_unknown: bool,
) -> CoreResult<Snapshot> {
    let mut snapshot = Snapshot::new();
    for name in names {
        match values.get(name) {
            Some(value) => {
                snapshot.insert(name.clone(), stringify(value));
            }
            None if ignore_unknown => {
                snapshot.insert(name.clone(), parser.placeholder(name));
            }
            None => {
                debug!(variable = %name, "Unresolved variable");
                return Err(CoreError::PreconditionFailed(UNKNOWN_VARIABLE.to_string()));
            }
        }
    }
    Ok(snapshot)
}

#[instrument(skip(db, parser, request), fields(scope = ?request.scope))]
pub async fn resolve<C: ConnectionTrait>(
    db: &C,
    parser: &dyn TemplateParser,
    request: ResolveRequest<'_>,
) -> CoreResult<Resolved> {
    let names = parser.extract(request.template);
    if names.is_empty() {
        return Ok(Resolved {
            template: request.template.to_string(),
            snapshot: Snapshot::new(),
            private: BTreeSet::new(),
        });
    }

    let (values, private) = lookup(db, &names, request.scope).await?;
    let snapshot = build_snapshot(parser, &names, &values, request.ignore_unknown)?;

    Ok(Resolved {
        template: render(parser, request.template, request.template_type, &snapshot),
        snapshot,
        private,
    })
}

/// Snapshot of the named variables under `scope` without a template to render.
pub async fn snapshot_names<C: ConnectionTrait>(
    db: &C,
    parser: &dyn TemplateParser,
    names: &[String],
    scope: Scope,
    ignore_unknown: bool,
) -> CoreResult<Snapshot> {
    if names.is_empty() {
        return Ok(Snapshot::new());
    }

    let (values, _) = lookup(db, names, scope).await?;
    build_snapshot(parser, names, &values, ignore_unknown)
}

/// Re-renders `template` from the snapshot stored for the reference instead of current scope values.
pub async fn resolve_from_history<C: ConnectionTrait>(
    db: &C,
    parser: &dyn TemplateParser,
    template: &str,
    template_type: TemplateType,
    reference_type: HistoryReferenceType,
    reference_id: i32,
) -> CoreResult<Resolved> {
    let stored = variable::get_history(db, reference_type, reference_id)
        .await?
        .unwrap_or_default();

    let names = parser.extract(template);
    let mut snapshot = Snapshot::new();
    for name in &names {
        let value = stored
            .get(name)
            .cloned()
            .unwrap_or_else(|| parser.placeholder(name));
        snapshot.insert(name.clone(), value);
    }

    let private = variable::get_definitions_by_names(db, &names)
        .await?
        .into_iter()
        .filter(|d| d.is_sensitive())
        .map(|d| d.name)
        .collect();

    Ok(Resolved {
        template: render(parser, template, template_type, &snapshot),
        snapshot,
        private,
    })
}

/// Records the names referenced by an entity's template, soft-deleting names no longer used.
pub async fn map_entity_variables<C: TransactionTrait>(
    db: &C,
    parser: &dyn TemplateParser,
    entity_type: EntityType,
    entity_id: i32,
    template: &str,
    audit: Audit,
) -> CoreResult<Vec<String>> {
    let names = parser.extract(template);

    let txn = db.begin().await?;

    let existing: Vec<String> = variable::get_entity_mappings(&txn, entity_type, entity_id)
        .await?
        .into_iter()
        .map(|m| m.variable_name)
        .collect();

    let added: Vec<String> = names
        .iter()
        .filter(|n| !existing.contains(n))
        .cloned()
        .collect();
    let removed: Vec<String> = existing
        .iter()
        .filter(|n| !names.contains(n))
        .cloned()
        .collect();

    variable::create_entity_mappings(&txn, entity_type, entity_id, &added, audit).await?;
    variable::delete_entity_mappings(&txn, entity_type, entity_id, &removed, audit).await?;

    txn.commit().await?;
    Ok(names)
}

fn decode_secret(parser: &dyn TemplateParser, value: &str) -> Option<String> {
    let decoded = STANDARD.decode(value).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    if parser.find(&decoded).is_empty() {
        return None;
    }
    Some(decoded)
}

/// Resolves a base-64 secret value. Values without references or that are not base-64 pass through.
pub async fn resolve_secret<C: ConnectionTrait>(
    db: &C,
    parser: &dyn TemplateParser,
    value: &str,
    scope: Scope,
    ignore_unknown: bool,
) -> CoreResult<Resolved> {
    let Some(decoded) = decode_secret(parser, value) else {
        return Ok(Resolved {
            template: value.to_string(),
            snapshot: Snapshot::new(),
            private: BTreeSet::new(),
        });
    };

    let resolved = resolve(
        db,
        parser,
        ResolveRequest {
            template: &decoded,
            template_type: TemplateType::String,
            scope,
            ignore_unknown,
        },
    )
    .await?;

    Ok(Resolved {
        template: STANDARD.encode(resolved.template.as_bytes()),
        ..resolved
    })
}

/// Pure counterpart of [`resolve_secret`] over a known snapshot.
pub fn render_secret(parser: &dyn TemplateParser, value: &str, snapshot: &Snapshot) -> String {
    match decode_secret(parser, value) {
        Some(decoded) => {
            let rendered = render(parser, &decoded, TemplateType::String, snapshot);
            STANDARD.encode(rendered.as_bytes())
        }
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_VARIABLE_REGEX;
    use crate::variables::RegexParser;

    fn parser() -> RegexParser {
        RegexParser::new(DEFAULT_VARIABLE_REGEX).unwrap()
    }

    fn snapshot(entries: &[(&str, &str)]) -> Snapshot {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn string_template_substitutes_verbatim() {
        let out = render(
            &parser(),
            "replicas=@{{count}} image=@{{ image }}",
            TemplateType::String,
            &snapshot(&[("count", "3"), ("image", "nginx:1.25")]),
        );
        assert_eq!(out, "replicas=3 image=nginx:1.25");
    }

    #[test]
    fn json_whole_placeholder_is_unquoted_for_non_strings() {
        let out = render(
            &parser(),
            r#"{"replicas": "@{{count}}", "labels": "@{{labels}}"}"#,
            TemplateType::Json,
            &snapshot(&[("count", "3"), ("labels", r#"{"team":"core"}"#)]),
        );
        assert_eq!(out, r#"{"replicas": 3, "labels": {"team":"core"}}"#);
    }

    #[test]
    fn json_embedded_placeholder_is_escaped() {
        let out = render(
            &parser(),
            r#"{"cmd": "echo @{{msg}}"}"#,
            TemplateType::Json,
            &snapshot(&[("msg", r#"say "hi""#)]),
        );
        assert_eq!(out, r#"{"cmd": "echo say \"hi\""}"#);
    }

    #[test]
    fn json_string_value_keeps_quotes() {
        let out = render(
            &parser(),
            r#"{"env": "@{{env}}"}"#,
            TemplateType::Json,
            &snapshot(&[("env", "prod")]),
        );
        assert_eq!(out, r#"{"env": "prod"}"#);
    }

    #[test]
    fn unknown_placeholder_renders_unchanged() {
        let p = parser();
        let out = render(
            &p,
            "a=@{{missing}}",
            TemplateType::String,
            &snapshot(&[("missing", &p.placeholder("missing"))]),
        );
        assert_eq!(out, "a=@{{missing}}");
    }

    #[test]
    fn render_is_pure() {
        let p = parser();
        let snap = snapshot(&[("a", "1")]);
        let first = render(&p, r#"{"a": "@{{a}}"}"#, TemplateType::Json, &snap);
        let second = render(&p, r#"{"a": "@{{a}}"}"#, TemplateType::Json, &snap);
        assert_eq!(first, second);
    }

    #[test]
    fn mask_hides_private_values() {
        let private: BTreeSet<String> = ["token".to_string()].into_iter().collect();
        let masked = mask(&snapshot(&[("token", "s3cr3t"), ("env", "prod")]), &private);
        assert_eq!(masked["token"], HIDDEN_VALUE);
        assert_eq!(masked["env"], "prod");
    }

    #[test]
    fn secret_without_references_passes_through() {
        let p = parser();
        let encoded = STANDARD.encode("plain");
        assert_eq!(render_secret(&p, &encoded, &Snapshot::new()), encoded);
        assert_eq!(render_secret(&p, "not base64!", &Snapshot::new()), "not base64!");
    }

    #[test]
    fn secret_is_decoded_rendered_and_encoded() {
        let p = parser();
        let encoded = STANDARD.encode("password=@{{db_pass}}");
        let out = render_secret(&p, &encoded, &snapshot(&[("db_pass", "hunter2")]));
        assert_eq!(STANDARD.decode(out).unwrap(), b"password=hunter2");
    }

    #[test]
    fn stringify_round_trips_through_destringify() {
        for value in [
            Value::from(3),
            Value::from(true),
            serde_json::json!({"a": [1, 2]}),
            Value::from("text"),
        ] {
            let text = stringify(&value);
            assert_eq!(destringify(&text), value);
        }
    }
}
