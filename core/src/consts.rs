/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

/// Principal id used for system-initiated triggers.
pub const SYSTEM_USER: i32 = 1;

pub const ARTIFACT_UNAVAILABLE: &str = "artifact_unavailable";
pub const PRE_DEPLOYMENT_MISSING: &str = "pre_deployment_missing";
pub const POST_DEPLOYMENT_MISSING: &str = "post_deployment_missing";
pub const DEPLOYMENT_TYPE_UNSUPPORTED: &str = "deployment_type_unsupported";
pub const STUCK: &str = "stuck";
pub const TRIGGER_CANCELLED: &str = "trigger_cancelled";
pub const SUPERSEDED_BY_NEWER_TRIGGER: &str = "superseded_by_newer_trigger";
pub const PIPELINE_DELETED: &str = "pipeline_deleted";
pub const UNKNOWN_VARIABLE: &str = "unknown_variable";
pub const RUNNER_NOT_RETRYABLE: &str = "runner_not_retryable";

pub const HIDDEN_VALUE: &str = "********";

pub const TOPIC_CI_COMPLETE: &str = "auto-trigger-stages-after-ci-complete";
pub const TOPIC_CD_WORKFLOW_STATUS: &str = "cd-workflow-status-update";
pub const STREAM_NAME: &str = "CADENCE";

pub const DEFAULT_VARIABLE_REGEX: &str = r"@\{\{([^}]+)\}\}";

pub const CI_WORKFLOW_PREFIX: &str = "ci";
pub const CD_WORKFLOW_PREFIX: &str = "cd";
