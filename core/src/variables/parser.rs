/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use regex::Regex;

use crate::error::{CoreError, CoreResult};

/// A variable reference found in a template, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub start: usize,
    pub end: usize,
    pub name: String,
}

pub trait TemplateParser: Send + Sync {
    /// Every reference in order of appearance, duplicates included.
    fn find(&self, template: &str) -> Vec<Reference>;

    /// Text that stands in for an unresolved variable.
    fn placeholder(&self, name: &str) -> String {
        format!("@{{{{{}}}}}", name)
    }

    /// Referenced names, trimmed and deduplicated in order of first appearance.
    fn extract(&self, template: &str) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for reference in self.find(template) {
            if !names.contains(&reference.name) {
                names.push(reference.name);
            }
        }
        names
    }
}

#[derive(Debug, Clone)]
pub struct RegexParser {
    regex: Regex,
}

impl RegexParser {
    pub fn new(pattern: &str) -> CoreResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            CoreError::Internal(format!("Invalid variable expression {}: {}", pattern, e))
        })?;
        Ok(RegexParser { regex })
    }
}

impl TemplateParser for RegexParser {
    fn find(&self, template: &str) -> Vec<Reference> {
        self.regex
            .captures_iter(template)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let name = captures.get(1).unwrap_or(whole).as_str().trim();
                if name.is_empty() {
                    return None;
                }
                Some(Reference {
                    start: whole.start(),
                    end: whole.end(),
                    name: name.to_string(),
                })
            })
            .collect()
    }
}
