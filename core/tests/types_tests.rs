/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Tests for command-line configuration and error kinds

use cadence_core::consts::*;
use cadence_core::error::{CoreError, ErrorKind};
use cadence_core::types::*;
use clap::Parser;
use sea_orm::DbErr;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    let mut argv = vec!["cadence-server"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv)
}

#[test]
fn test_cli_defaults() {
    let cli = parse(&[]).unwrap();

    assert_eq!(cli.auto_cd_trigger_ack_wait_in_secs, 150);
    assert_eq!(cli.cd_pipeline_status_cron_time, "*/2 * * * *");
    assert_eq!(cli.ci_pipeline_status_cron_time, "*/2 * * * *");
    assert_eq!(cli.pipeline_degraded_time, 10);
    assert_eq!(cli.pipeline_failed_time, 10);
    assert_eq!(cli.ci_trigger_cron_time, 2);
    assert_eq!(cli.deployed_within_hours, 12);
    assert_eq!(cli.plugin_name, "Pull images from container repository");
    assert_eq!(cli.variable_expression_regex, DEFAULT_VARIABLE_REGEX);
    assert!(!cli.report_errors);
    assert!(!cli.log_json);
}

#[test]
fn test_cli_rejects_invalid_values() {
    assert!(parse(&["--pipeline-degraded-time", "0"]).is_err());
    assert!(parse(&["--auto-cd-trigger-ack-wait-in-secs", "-5"]).is_err());
    assert!(parse(&["--cd-pipeline-status-cron-time", "often"]).is_err());

    let cli = parse(&["--ci-pipeline-status-cron-time", "0 */5 * * * *"]).unwrap();
    assert_eq!(cli.ci_pipeline_status_cron_time, "0 */5 * * * *");
}

#[test]
fn test_error_kinds() {
    assert_eq!(
        CoreError::not_found("runner", 7).message(),
        "runner 7 not found"
    );
    assert_eq!(
        CoreError::PreconditionFailed(STUCK.to_string()).kind(),
        ErrorKind::PreconditionFailed
    );
    assert!(CoreError::Database(DbErr::Conn(sea_orm::RuntimeErr::Internal("down".into())))
        .is_unavailable());
    assert_eq!(
        CoreError::Database(DbErr::RecordNotInserted).kind(),
        ErrorKind::Internal
    );

    let parse_error = serde_json::from_str::<i32>("nope").unwrap_err();
    assert_eq!(CoreError::from(parse_error).kind(), ErrorKind::Internal);
}
