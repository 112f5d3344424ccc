/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for entity enums

use entity::*;
use sea_orm::ActiveEnum;
use std::str::FromStr;

#[test]
fn test_deployment_app_type_from_str() {
    assert_eq!(
        pipeline::DeploymentAppType::from_str("helm").unwrap(),
        pipeline::DeploymentAppType::Helm
    );
    assert_eq!(
        pipeline::DeploymentAppType::from_str("argo").unwrap(),
        pipeline::DeploymentAppType::Argo
    );
    assert_eq!(
        pipeline::DeploymentAppType::from_str("argo_cd").unwrap(),
        pipeline::DeploymentAppType::Argo
    );

    assert!(pipeline::DeploymentAppType::from_str("manifest_push").is_err());
}

#[test]
fn test_status_string_values() {
    assert_eq!(
        cd_workflow_runner::RunnerStatus::Queued.to_value(),
        "Queued"
    );
    assert_eq!(
        cd_workflow_runner::WorkflowType::Deploy.to_value(),
        "DEPLOY"
    );
    assert_eq!(
        pipeline_status_timeline::TimelineStatus::DeploymentInitiated.to_value(),
        "DEPLOYMENT_INITIATED"
    );
    assert_eq!(
        ci_pipeline_material::SourceType::BranchFixed.to_value(),
        "SOURCE_TYPE_BRANCH_FIXED"
    );
    assert_eq!(ci_workflow::ArtifactUploadStatus::NotApplicable.to_value(), "NA");
    assert_eq!(variable_scope::Qualifier::Global.to_value(), 5);
}

#[test]
fn test_timeline_terminal_statuses() {
    use pipeline_status_timeline::TimelineStatus;

    for status in TimelineStatus::terminal() {
        assert!(status.is_terminal());
    }

    assert!(!TimelineStatus::DeploymentInitiated.is_terminal());
    assert!(!TimelineStatus::KubectlApplySynced.is_terminal());
    assert!(!TimelineStatus::DeploymentSuperseded.is_terminal());
}

#[test]
fn test_qualifier_precedence_order() {
    use variable_scope::Qualifier;

    let mut qualifiers = vec![
        Qualifier::Global,
        Qualifier::Env,
        Qualifier::AppAndEnv,
        Qualifier::Cluster,
        Qualifier::App,
    ];
    qualifiers.sort();

    assert_eq!(
        qualifiers,
        vec![
            Qualifier::AppAndEnv,
            Qualifier::App,
            Qualifier::Env,
            Qualifier::Cluster,
            Qualifier::Global,
        ]
    );
}
