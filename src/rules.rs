// src/rules.rs

//! Ordered build-rule table.
//!
//! A rule maps a filename glob to an importer kind. Matching is against the
//! bare file name (not the path) and strictly first-match-in-list-order, so
//! callers put more specific patterns first. The built-in table resolves
//! `sky.panorama.png` to the panorama importer only because that rule sits
//! ahead of `*.png`.

use std::fmt;

use anyhow::Context;
use globset::{Glob, GlobMatcher};

use crate::config::RuleConfig;
use crate::errors::{PipelineError, Result};
use crate::importer::ImporterRegistry;

/// Image formats covered by the built-in rule table.
const IMAGE_FORMATS: &[&str] = &["png", "jpg", "jpeg", "tga"];

/// Mesh formats covered by the built-in rule table.
const MESH_FORMATS: &[&str] = &["fbx", "obj"];

/// The default rule table used when no configuration supplies rules.
///
/// Panorama rules precede the plain texture rules per format; ordering is
/// part of the table.
pub fn default_rules() -> Vec<RuleConfig> {
    let mut rules = Vec::new();

    for format in IMAGE_FORMATS {
        rules.push(RuleConfig {
            pattern: format!("*.panorama.{format}"),
            importer: "panorama".to_string(),
        });
        rules.push(RuleConfig {
            pattern: format!("*.{format}"),
            importer: "texture".to_string(),
        });
    }

    for format in MESH_FORMATS {
        rules.push(RuleConfig {
            pattern: format!("*.{format}"),
            importer: "mesh".to_string(),
        });
    }

    rules
}

/// One compiled rule.
struct BuildRule {
    pattern: String,
    matcher: GlobMatcher,
    kind: String,
}

/// Compiled, ordered rule table.
pub struct BuildRules {
    rules: Vec<BuildRule>,
}

impl BuildRules {
    /// Compile a rule table, checking every named importer kind against the
    /// registry.
    pub fn compile(rules: &[RuleConfig], registry: &ImporterRegistry) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            if !registry.contains(&rule.importer) {
                return Err(PipelineError::UnknownImporter(rule.importer.clone()));
            }

            let matcher = Glob::new(&rule.pattern)
                .with_context(|| format!("invalid glob pattern: {}", rule.pattern))?
                .compile_matcher();

            compiled.push(BuildRule {
                pattern: rule.pattern.clone(),
                matcher,
                kind: rule.importer.clone(),
            });
        }

        Ok(Self { rules: compiled })
    }

    /// Resolve the importer kind for a file name. First match wins; `None`
    /// means the file is not an asset.
    pub fn match_file(&self, file_name: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_match(file_name))
            .map(|rule| rule.kind.as_str())
    }

    /// `(pattern, importer kind)` pairs in match order, for diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.rules
            .iter()
            .map(|rule| (rule.pattern.as_str(), rule.kind.as_str()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for BuildRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| (&r.pattern, &r.kind)))
            .finish()
    }
}
