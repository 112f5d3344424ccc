/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod parser;
mod resolver;

pub use parser::{Reference, RegexParser, TemplateParser};
pub use resolver::*;

use std::collections::{BTreeMap, BTreeSet};

/// Variable name to stringified value.
pub type Snapshot = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateType {
    String,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Sees private values verbatim.
    Privileged,
    Public,
}

/// Where a template is evaluated. `None` components never match a scoped value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    pub app_id: Option<i32>,
    pub env_id: Option<i32>,
    pub cluster_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct ResolveRequest<'a> {
    pub template: &'a str,
    pub template_type: TemplateType,
    pub scope: Scope,
    pub ignore_unknown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub template: String,
    pub snapshot: Snapshot,
    /// Names whose values must be hidden from non-privileged audiences.
    pub private: BTreeSet<String>,
}
