/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Context;
use cadence_core::types::Cli;
use cadence_core::{build_state, sentry_guard};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).context("Invalid CADENCE_LOG_LEVEL")?;
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let state = build_state(cli).await?;
    let _guard = sentry_guard(&state.cli);

    dispatcher::start_dispatcher(Arc::clone(&state)).await?;
    subscriber::start_subscriber(Arc::clone(&state)).await?;
    reconciler::start_reconcilers(Arc::clone(&state)).await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}
