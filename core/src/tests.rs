/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#[cfg(test)]
mod tests {
    use crate::config_map::{merge, merge_from_history, persist_snapshots};
    use crate::consts::UNKNOWN_VARIABLE;
    use crate::database::runner::{
        NewRunner, create_runner, get_latest_runner, get_runner, transition_runner,
    };
    use crate::database::{Audit, app, cd_pipeline, ci_pipeline, config_map, metrics, plugin};
    use crate::database::{variable, workflow};
    use crate::error::{CoreError, ErrorKind};
    use crate::testing::{
        PipelineSeed, Seeded, backdate_runner, seed_artifact, seed_pipeline, test_state,
    };
    use crate::timeline;
    use crate::types::*;
    use crate::variables::{
        Audience, RegexParser, ResolveRequest, Scope, TemplateParser, TemplateType,
        map_entity_variables, resolve, resolve_from_history,
    };
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use chrono::Duration;
    use entity::app_workflow_mapping::ComponentKind;
    use entity::cd_workflow_runner::{RunnerStatus, WorkflowType};
    use entity::ci_pipeline::CiPipelineType;
    use entity::pipeline::DeploymentAppType;
    use entity::pipeline_stage::StageType;
    use entity::pipeline_status_timeline::TimelineStatus;
    use entity::variable_definition::{VariableDataType, VariableType};
    use entity::variable_entity_mapping::EntityType;
    use entity::variable_scope::Qualifier;
    use entity::variable_snapshot_history::HistoryReferenceType;
    use sea_orm::DatabaseConnection;
    use serde_json::json;

    fn parser() -> RegexParser {
        RegexParser::new(crate::consts::DEFAULT_VARIABLE_REGEX).unwrap()
    }

    async fn runner_for(
        db: &DatabaseConnection,
        seeded: &Seeded,
        workflow_type: WorkflowType,
        status: RunnerStatus,
    ) -> MCdWorkflowRunner {
        let artifact = seed_artifact(db, seeded, "img:1").await.unwrap();
        let cd_workflow = crate::database::runner::find_or_create_cd_workflow(
            db,
            seeded.cd_pipeline.id,
            artifact.id,
            Audit::by(1),
        )
        .await
        .unwrap();

        create_runner(
            db,
            NewRunner {
                cd_workflow_id: cd_workflow.id,
                pipeline_id: seeded.cd_pipeline.id,
                app_id: seeded.app.id,
                environment_id: seeded.environment.id,
                workflow_type,
                status,
                triggered_by: 1,
                ref_runner_id: None,
                reference_id: None,
            },
            Audit::by(1),
        )
        .await
        .unwrap()
    }

    async fn define(
        db: &DatabaseConnection,
        name: &str,
        var_type: VariableType,
        values: &[(Qualifier, Option<i32>, Option<i32>, Option<i32>, serde_json::Value)],
    ) {
        let definition = variable::create_variable_definition(
            db,
            variable::NewVariable {
                name: name.to_string(),
                data_type: VariableDataType::Primitive,
                var_type,
                description: String::new(),
            },
            Audit::by(1),
        )
        .await
        .unwrap();

        for (qualifier, app_id, env_id, cluster_id, value) in values {
            variable::create_scoped_value(
                db,
                variable::NewScopedValue {
                    variable_definition_id: definition.id,
                    qualifier: *qualifier,
                    app_id: *app_id,
                    env_id: *env_id,
                    cluster_id: *cluster_id,
                    value: value.clone(),
                },
                Audit::by(1),
            )
            .await
            .unwrap();
        }
    }

    #[tokio::test]
    async fn test_workflow_delete_cascades_to_mappings() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();

        assert_eq!(
            workflow::get_mappings_by_workflow(db, seeded.workflow.id)
                .await
                .unwrap()
                .len(),
            2
        );

        workflow::delete_workflow(db, seeded.workflow.id, Audit::by(1))
            .await
            .unwrap();

        assert!(
            workflow::get_mappings_by_workflow(db, seeded.workflow.id)
                .await
                .unwrap()
                .is_empty()
        );
        let err = workflow::get_workflow(db, seeded.workflow.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_mapping_rejects_inactive_component() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();

        cd_pipeline::delete_cd_pipeline(db, seeded.cd_pipeline.id, Audit::by(1))
            .await
            .unwrap();

        let err = workflow::create_mapping(
            db,
            workflow::NewMapping {
                workflow_id: seeded.workflow.id,
                component_id: seeded.cd_pipeline.id,
                component_kind: ComponentKind::CdPipeline,
                parent_id: Some(seeded.ci_pipeline.id),
                parent_kind: Some(ComponentKind::CiPipeline),
            },
            Audit::by(1),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));

        // the deleted pipeline no longer appears under its CI parent
        assert!(
            workflow::get_cd_mappings_by_parent_ci(db, seeded.ci_pipeline.id)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_ci_pipeline_name_unique_per_app() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();

        let new = ci_pipeline::NewCiPipeline {
            app_id: seeded.app.id,
            name: seeded.ci_pipeline.name.clone(),
            manual: false,
            external: false,
            parent_ci_pipeline: None,
            ci_pipeline_type: CiPipelineType::CiBuild,
            scan_enabled: false,
            auto_abort_previous_builds: false,
        };

        let err = ci_pipeline::create_ci_pipeline(db, new.clone(), Audit::by(1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        ci_pipeline::delete_ci_pipeline(db, seeded.ci_pipeline.id, Audit::by(1))
            .await
            .unwrap();
        ci_pipeline::create_ci_pipeline(db, new, Audit::by(1))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_literal() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;

        for name in ["Payments-API", "payments_worker", "billing"] {
            app::create_app(
                db,
                app::NewApp {
                    app_name: name.to_string(),
                    team_id: 1,
                    app_store: false,
                },
                Audit::by(1),
            )
            .await
            .unwrap();
        }

        assert_eq!(app::search_apps(db, "PAYMENTS").await.unwrap().len(), 2);
        let underscored = app::search_apps(db, "s_w").await.unwrap();
        assert_eq!(underscored.len(), 1);
        assert_eq!(underscored[0].app_name, "payments_worker");
        assert!(app::search_apps(db, "%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_enabled_bulk_update() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();

        let updated =
            workflow::update_scan_enabled_by_workflows(db, &[seeded.workflow.id], true, Audit::by(1))
                .await
                .unwrap();
        assert_eq!(updated, 1);
        assert!(
            ci_pipeline::get_ci_pipeline(db, seeded.ci_pipeline.id)
                .await
                .unwrap()
                .scan_enabled
        );
        assert_eq!(
            workflow::update_scan_enabled_by_workflows(db, &[], true, Audit::by(1))
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_latest_cache_tracks_max_id() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();

        let first = runner_for(db, &seeded, WorkflowType::Deploy, RunnerStatus::Initiated).await;
        let second = runner_for(db, &seeded, WorkflowType::Deploy, RunnerStatus::Queued).await;
        runner_for(db, &seeded, WorkflowType::Pre, RunnerStatus::Initiated).await;

        assert!(second.id > first.id);
        let latest = get_latest_runner(db, seeded.cd_pipeline.id, WorkflowType::Deploy)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[tokio::test]
    async fn test_timeline_is_monotonic_and_terminal_stable() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();
        let runner = runner_for(db, &seeded, WorkflowType::Deploy, RunnerStatus::Initiated).await;

        timeline::append(db, runner.id, TimelineStatus::DeploymentInitiated, "", 1)
            .await
            .unwrap()
            .unwrap();
        timeline::append(db, runner.id, TimelineStatus::KubectlApplyStarted, "", 1)
            .await
            .unwrap()
            .unwrap();
        timeline::append(db, runner.id, TimelineStatus::Healthy, "ok", 1)
            .await
            .unwrap()
            .unwrap();

        assert!(
            timeline::append(db, runner.id, TimelineStatus::KubectlApplySynced, "", 1)
                .await
                .unwrap()
                .is_none()
        );
        assert!(
            timeline::append(db, runner.id, TimelineStatus::Healthy, "again", 1)
                .await
                .unwrap()
                .is_none()
        );

        // a different terminal kind is kept for audit but never becomes authoritative
        timeline::append(db, runner.id, TimelineStatus::Degraded, "late", 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            timeline::terminal_status(db, runner.id).await.unwrap(),
            Some(TimelineStatus::Healthy)
        );

        let entries = timeline::list(db, runner.id).await.unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries.windows(2).all(|w| w[0].status_time <= w[1].status_time));
        assert!(timeline::has_terminal(db, runner.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_timeline_append_unknown_runner() {
        let t = test_state().await.unwrap();
        let err = timeline::append(&t.state.db, 404, TimelineStatus::Failed, "", 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_resolve_uses_scope_precedence() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;

        define(
            db,
            "replicas",
            VariableType::Public,
            &[
                (Qualifier::Global, None, None, None, json!(1)),
                (Qualifier::Env, None, Some(7), None, json!(2)),
                (Qualifier::AppAndEnv, Some(3), Some(7), None, json!(5)),
            ],
        )
        .await;

        let p = parser();
        let scope = Scope {
            app_id: Some(3),
            env_id: Some(7),
            cluster_id: Some(1),
        };
        let resolved = resolve(
            db,
            &p,
            ResolveRequest {
                template: "n=@{{replicas}}",
                template_type: TemplateType::String,
                scope,
                ignore_unknown: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(resolved.template, "n=5");

        let other_app = resolve(
            db,
            &p,
            ResolveRequest {
                template: "n=@{{replicas}}",
                template_type: TemplateType::String,
                scope: Scope {
                    app_id: Some(4),
                    ..scope
                },
                ignore_unknown: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(other_app.template, "n=2");

        let global = resolve(
            db,
            &p,
            ResolveRequest {
                template: "n=@{{replicas}}",
                template_type: TemplateType::String,
                scope: Scope::default(),
                ignore_unknown: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(global.template, "n=1");
    }

    #[tokio::test]
    async fn test_resolve_unknown_variable() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let p = parser();

        let err = resolve(
            db,
            &p,
            ResolveRequest {
                template: "@{{nope}}",
                template_type: TemplateType::String,
                scope: Scope::default(),
                ignore_unknown: false,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.message(), UNKNOWN_VARIABLE);

        let ignored = resolve(
            db,
            &p,
            ResolveRequest {
                template: "@{{nope}}",
                template_type: TemplateType::String,
                scope: Scope::default(),
                ignore_unknown: true,
            },
        )
        .await
        .unwrap();
        assert_eq!(ignored.template, "@{{nope}}");
        assert_eq!(ignored.snapshot["nope"], "@{{nope}}");
    }

    #[tokio::test]
    async fn test_history_replays_identical_bytes() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let p = parser();

        define(
            db,
            "token",
            VariableType::Private,
            &[(Qualifier::Global, None, None, None, json!("s3cr3t"))],
        )
        .await;
        define(
            db,
            "limits",
            VariableType::Public,
            &[(Qualifier::Global, None, None, None, json!({"cpu": 2}))],
        )
        .await;

        let template = r#"{"auth": "Bearer @{{token}}", "limits": "@{{limits}}"}"#;
        let resolved = resolve(
            db,
            &p,
            ResolveRequest {
                template,
                template_type: TemplateType::Json,
                scope: Scope::default(),
                ignore_unknown: false,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            resolved.template,
            r#"{"auth": "Bearer s3cr3t", "limits": {"cpu":2}}"#
        );

        let public = resolved.render_for(&p, template, TemplateType::Json, Audience::Public);
        assert!(public.contains("********"));
        assert!(!public.contains("s3cr3t"));

        variable::insert_history(
            db,
            HistoryReferenceType::CdWorkflowRunner,
            77,
            &resolved.snapshot,
            Audit::by(1),
        )
        .await
        .unwrap();

        // current values change; the replay must not
        define(
            db,
            "extra",
            VariableType::Public,
            &[(Qualifier::Global, None, None, None, json!("x"))],
        )
        .await;
        let replayed = resolve_from_history(
            db,
            &p,
            template,
            TemplateType::Json,
            HistoryReferenceType::CdWorkflowRunner,
            77,
        )
        .await
        .unwrap();
        assert_eq!(replayed.template, resolved.template);
        assert_eq!(replayed.snapshot["token"], "s3cr3t");
    }

    #[tokio::test]
    async fn test_map_entity_variables_tracks_references() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let p = parser();

        map_entity_variables(
            db,
            &p,
            EntityType::CdPreStageConfig,
            5,
            "@{{a}} @{{b}}",
            Audit::by(1),
        )
        .await
        .unwrap();
        map_entity_variables(
            db,
            &p,
            EntityType::CdPreStageConfig,
            5,
            "@{{b}} @{{c}}",
            Audit::by(1),
        )
        .await
        .unwrap();

        let mut names: Vec<String> =
            variable::get_entity_mappings(db, EntityType::CdPreStageConfig, 5)
                .await
                .unwrap()
                .into_iter()
                .map(|m| m.variable_name)
                .collect();
        names.sort();
        assert_eq!(names, vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_config_merge_overrides_and_replays() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let p = parser();
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();

        define(
            db,
            "db_host",
            VariableType::Public,
            &[(Qualifier::Global, None, None, None, json!("db.internal"))],
        )
        .await;

        let secret = STANDARD.encode("pw-for-@{{db_host}}");
        let plain = STANDARD.encode("untouched");

        config_map::save_app_level(
            db,
            seeded.app.id,
            json!({"maps": [
                {"name": "app", "type": "environment", "external": false, "data": {"HOST": "@{{db_host}}", "MODE": "base"}},
                {"name": "shared", "type": "environment", "external": false, "data": {"A": "1"}}
            ]})
            .to_string(),
            json!({"maps": [
                {"name": "creds", "type": "environment", "external": false, "data": {"PASSWORD": secret, "PLAIN": plain}}
            ]})
            .to_string(),
            Audit::by(1),
        )
        .await
        .unwrap();

        config_map::save_env_level(
            db,
            seeded.app.id,
            seeded.environment.id,
            json!({"maps": [
                {"name": "app", "type": "environment", "external": false, "data": {"HOST": "@{{db_host}}", "MODE": "prod"}},
                {"name": "env-only", "type": "volume", "external": true, "data": {}}
            ]})
            .to_string(),
            String::new(),
            Audit::by(1),
        )
        .await
        .unwrap();

        let scope = Scope {
            app_id: Some(seeded.app.id),
            env_id: Some(seeded.environment.id),
            cluster_id: Some(seeded.environment.cluster_id),
        };
        let merged = merge(db, &p, seeded.app.id, seeded.environment.id, scope)
            .await
            .unwrap();

        let names: Vec<&String> = merged.config_maps.keys().collect();
        assert_eq!(names, vec!["app", "shared", "env-only"]);
        assert_eq!(merged.config_maps["app"]["data"]["HOST"], json!("db.internal"));
        assert_eq!(merged.config_maps["app"]["data"]["MODE"], json!("prod"));

        let password = merged.secrets["creds"]["data"]["PASSWORD"].as_str().unwrap();
        assert_eq!(STANDARD.decode(password).unwrap(), b"pw-for-db.internal");
        assert_eq!(merged.secrets["creds"]["data"]["PLAIN"], json!(plain));

        let consumer = runner_for(db, &seeded, WorkflowType::Deploy, RunnerStatus::Initiated).await;
        persist_snapshots(db, consumer.id, &merged, Audit::by(1)).await.unwrap();

        // later edits must not leak into the replay
        config_map::save_app_level(
            db,
            seeded.app.id,
            json!({"maps": [
                {"name": "app", "type": "environment", "external": false, "data": {"HOST": "@{{db_host}}", "MODE": "edited"}}
            ]})
            .to_string(),
            String::new(),
            Audit::by(1),
        )
        .await
        .unwrap();

        let replayed = merge_from_history(db, &p, consumer.id).await.unwrap();
        assert_eq!(replayed.config_maps, merged.config_maps);
        assert_eq!(replayed.secrets, merged.secrets);
        assert_eq!(replayed.template, merged.template);
    }

    #[tokio::test]
    async fn test_replay_without_stored_template_is_not_found() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();
        let runner = runner_for(db, &seeded, WorkflowType::Deploy, RunnerStatus::Queued).await;

        let err = merge_from_history(db, &parser(), runner.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_stale_runner_copy_cannot_transition() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();
        let running = runner_for(db, &seeded, WorkflowType::Deploy, RunnerStatus::Running).await;

        let succeeded = transition_runner(db, running.clone(), RunnerStatus::Succeeded, None, None)
            .await
            .unwrap();
        assert_eq!(succeeded.status, RunnerStatus::Succeeded);
        assert!(succeeded.finished_on.is_some());

        let err = transition_runner(db, running, RunnerStatus::Failed, Some("late".into()), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let current = get_runner(db, succeeded.id).await.unwrap();
        assert_eq!(current.status, RunnerStatus::Succeeded);
        assert_eq!(current.message, "");
    }

    #[tokio::test]
    async fn test_promotion_from_queue_restarts_clock() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();
        let queued = runner_for(db, &seeded, WorkflowType::Deploy, RunnerStatus::Queued).await;
        let queued = backdate_runner(db, queued, 30).await.unwrap();

        let promoted = transition_runner(db, queued.clone(), RunnerStatus::Initiated, None, None)
            .await
            .unwrap();
        assert!(promoted.started_on > queued.started_on);

        let starting = transition_runner(db, promoted.clone(), RunnerStatus::Starting, None, None)
            .await
            .unwrap();
        assert_eq!(starting.started_on, promoted.started_on);
    }

    #[tokio::test]
    async fn test_counts_between() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();
        runner_for(db, &seeded, WorkflowType::Deploy, RunnerStatus::Initiated).await;
        runner_for(db, &seeded, WorkflowType::Deploy, RunnerStatus::Queued).await;

        let from = crate::database::now() - Duration::hours(1);
        let to = crate::database::now() + Duration::hours(1);
        assert_eq!(
            metrics::count_cd_runners_between(db, from, to, None)
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            metrics::count_cd_runners_between(db, from, to, Some(RunnerStatus::Queued))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            metrics::count_ci_workflows_between(db, from, to, None)
                .await
                .unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_pipelines_declaring_plugin() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let seeded = seed_pipeline(db, PipelineSeed::default()).await.unwrap();
        let audit = Audit::by(1);

        let wanted = plugin::create_plugin(db, "Pull images from container repository".into(), audit)
            .await
            .unwrap();
        let other = plugin::create_plugin(db, "Other".into(), audit).await.unwrap();

        let stage = plugin::create_stage(db, seeded.ci_pipeline.id, StageType::PreCi, audit)
            .await
            .unwrap();
        plugin::create_stage_step(db, stage.id, "pull".into(), Some(wanted.id), audit)
            .await
            .unwrap();
        plugin::create_stage_step(db, stage.id, "other".into(), Some(other.id), audit)
            .await
            .unwrap();

        let found = plugin::get_ci_pipelines_with_pre_plugin(
            db,
            "Pull images from container repository",
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, seeded.ci_pipeline.id);
        assert!(
            plugin::get_ci_pipelines_with_pre_plugin(db, "Missing")
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_recent_deploys_filters_type_and_status() {
        let t = test_state().await.unwrap();
        let db = &t.state.db;
        let helm = seed_pipeline(db, PipelineSeed::default()).await.unwrap();
        let argo = seed_pipeline(
            db,
            PipelineSeed {
                name: "argo".into(),
                deployment_app_type: "argo_cd".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let running = runner_for(db, &helm, WorkflowType::Deploy, RunnerStatus::Running).await;
        runner_for(db, &helm, WorkflowType::Deploy, RunnerStatus::Queued).await;
        runner_for(db, &argo, WorkflowType::Deploy, RunnerStatus::Running).await;

        let deploys = cd_pipeline::get_recent_deploys(db, DeploymentAppType::Helm, 12)
            .await
            .unwrap();
        assert_eq!(deploys.len(), 1);
        assert_eq!(deploys[0].1.id, running.id);
        assert_eq!(deploys[0].0.id, helm.cd_pipeline.id);

        assert_eq!(
            cd_pipeline::get_recent_deploys(db, DeploymentAppType::Argo, 12)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_placeholder_round_trip() {
        let p = parser();
        assert_eq!(p.extract("@{{ x }}"), vec!["x".to_string()]);
    }
}
