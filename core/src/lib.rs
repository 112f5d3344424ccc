/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod adapters;
pub mod config_map;
pub mod consts;
pub mod database;
pub mod error;
pub mod input;
pub mod timeline;
pub mod types;
pub mod variables;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod tests;

use adapters::{ArgoAdapter, Authorizer, Executor, HelmAdapter, HttpAdapter, Unconfigured};
use anyhow::{Context, Result};
use clap::Parser;
use database::connect_db;
use std::sync::Arc;
use tracing::{info, warn};
use types::*;
use variables::RegexParser;

pub async fn init_state() -> Result<Arc<ServerState>> {
    let cli = Cli::parse();
    build_state(cli).await
}

pub async fn build_state(cli: Cli) -> Result<Arc<ServerState>> {
    info!("Starting Cadence");

    let db = connect_db(&cli).await?;

    let parser = RegexParser::new(&cli.variable_expression_regex)
        .context("Invalid VARIABLE_EXPRESSION_REGEX")?;

    let executor: Arc<dyn Executor> = match &cli.executor_url {
        Some(url) => Arc::new(HttpAdapter::new(url).context("Failed to build executor client")?),
        None => {
            warn!("No executor url configured, submissions will fail");
            Arc::new(Unconfigured("executor"))
        }
    };

    let helm: Arc<dyn HelmAdapter> = match &cli.helm_url {
        Some(url) => Arc::new(HttpAdapter::new(url).context("Failed to build helm client")?),
        None => Arc::new(Unconfigured("helm")),
    };

    let argo: Arc<dyn ArgoAdapter> = match &cli.argo_url {
        Some(url) => Arc::new(HttpAdapter::new(url).context("Failed to build argo client")?),
        None => Arc::new(Unconfigured("argo")),
    };

    let authz: Arc<dyn Authorizer> = match &cli.authz_url {
        Some(url) => Arc::new(HttpAdapter::new(url).context("Failed to build authz client")?),
        None => Arc::new(Unconfigured("authz")),
    };

    Ok(Arc::new(ServerState {
        db,
        cli,
        parser: Arc::new(parser),
        executor,
        helm,
        argo,
        authz,
    }))
}

/// Sentry client for the lifetime of a long-running task, when error reporting is enabled.
pub fn sentry_guard(cli: &Cli) -> Option<sentry::ClientInitGuard> {
    match (&cli.sentry_dsn, cli.report_errors) {
        (Some(dsn), true) => Some(sentry::init(dsn.as_str())),
        _ => None,
    }
}
