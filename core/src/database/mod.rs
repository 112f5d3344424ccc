/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod app;
pub mod artifact;
pub mod cd_pipeline;
pub mod ci_pipeline;
pub mod ci_workflow;
pub mod config_map;
pub mod metrics;
pub mod plugin;
pub mod runner;
pub mod template;
pub mod variable;
pub mod workflow;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::prelude::*;
use std::time::Duration;
use tracing::log::LevelFilter;

use super::types::*;

pub async fn connect_db(cli: &Cli) -> Result<DatabaseConnection> {
    let db_url = if let Some(file) = &cli.database_url_file {
        std::fs::read_to_string(file)
            .context("Failed to read database url from file")?
            .trim()
            .to_string()
    } else if let Some(url) = &cli.database_url {
        url.clone()
    } else {
        anyhow::bail!("No database url provided")
    };

    let mut opt = ConnectOptions::new(db_url);

    // Only enable SQL logging at debug level
    if cli.log_level == "debug" {
        opt.sqlx_logging(true)
            .sqlx_logging_level(LevelFilter::Debug);
    } else {
        opt.sqlx_logging(false);
    }

    opt.max_connections(50)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8));

    let db = Database::connect(opt)
        .await
        .context("Failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;
    Ok(db)
}

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Principal and time stamped on every write.
#[derive(Debug, Clone, Copy)]
pub struct Audit {
    pub user: i32,
    pub at: NaiveDateTime,
}

impl Audit {
    pub fn by(user: i32) -> Self {
        Audit { user, at: now() }
    }
}

/// Lowercased `%term%` pattern for case-insensitive substring search.
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
