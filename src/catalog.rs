//! The collectors and module sets measured by default.

use std::path::Path;

use crate::Result;
use crate::collector::{
    ApiManagerCollector, AssertMessageCollector, BadModuleCollector, Collector, CollectorCore,
    DeprecatedUsageCollector, FileCountCollector, FileFilter, GrepCollector, ImportGateCollector,
    JUNIT_ASSERTIONS, JUnitClassifierCollector, MethodBlockCollector, Predicate, ScopeActivator,
};
use crate::config::Config;
use crate::module_set::{DirectoryTree, ModuleSet, PluginArchives};
use crate::state;

const API_MODULE: &str = "jira-api";
const COMPONENT_ACCESSOR_IMPORT: &str = "import com.atlassian.jira.component.ComponentAccessor;";
const TRANSFORMERLESS_HEADER: &str = "Atlassian-Plugin-Key";
const PLUGIN_DESCRIPTOR: &str = "atlassian-plugin.xml";
const TEST_VERIFICATIONS: &[&str] = &[r"\bassert\w*\s*\(", r"\bverify\w*\s*\(", r"\bfail\s*\(", r"expected\s*="];

fn java() -> FileFilter {
    FileFilter::suffixes([".java"])
}

/// Collectors over production sources.
///
/// # Errors
/// Returns an error if a built-in pattern fails to compile.
pub fn source_collectors(root: &Path, config: &Config) -> Result<Vec<Box<dyn Collector>>> {
    let mut collectors: Vec<Box<dyn Collector>> = vec![
        Box::new(GrepCollector::new(
            CollectorCore::falling("usageof.CacheBuilder", "Usages of CacheBuilder"),
            java(),
            Predicate::literal("CacheBuilder"),
        )),
        Box::new(GrepCollector::new(
            CollectorCore::falling("usageof.css.important", "Usages of !important in stylesheets"),
            FileFilter::suffixes([".css", ".less"]),
            Predicate::literal("!important"),
        )),
        Box::new(ImportGateCollector::new(
            CollectorCore::falling("usageof.ComponentAccessor", "Usages of ComponentAccessor").unchecked(),
            java(),
            Predicate::literal(COMPONENT_ACCESSOR_IMPORT),
            Predicate::literal("ComponentAccessor."),
        )),
        Box::new(
            GrepCollector::new(
                CollectorCore::falling(
                    "usageof.jsp.scriptlet.in.script",
                    "JSP scriptlets inside script blocks",
                )
                .unchecked(),
                FileFilter::suffixes([".jsp"]),
                Predicate::literal("<%"),
            )
            .within(ScopeActivator::new(
                Predicate::regex(r"<script\b")?,
                Predicate::literal("</script>"),
            )),
        ),
        Box::new(FileCountCollector::new("jsp", "JSP", FileFilter::suffixes([".jsp"]))),
        Box::new(FileCountCollector::new("velocity", "Velocity", FileFilter::suffixes([".vm"]))),
        Box::new(ApiManagerCollector::new("jiraapi.managers.count", API_MODULE)),
    ];
    if let Some(command) = &config.metrics.compile_command {
        collectors.push(Box::new(DeprecatedUsageCollector::new(
            "deprecation.methods",
            command.clone(),
            root,
        )?));
    }
    Ok(collectors)
}

/// Collectors over test sources.
///
/// # Errors
/// Returns an error if a built-in pattern fails to compile.
pub fn test_collectors() -> Result<Vec<Box<dyn Collector>>> {
    let collectors: Vec<Box<dyn Collector>> = vec![
        Box::new(AssertMessageCollector::new(
            CollectorCore::falling("tests.assertions.without.message", "Assertions without a message")
                .unchecked(),
            java(),
            JUNIT_ASSERTIONS,
        )),
        Box::new(JUnitClassifierCollector::new("tests.junit", java())),
        Box::new(MethodBlockCollector::new(
            CollectorCore::falling("tests.without.assertions", "Test methods without assertions").unchecked(),
            java(),
            Predicate::literal("@Test"),
            Predicate::any_regex(TEST_VERIFICATIONS)?,
        )),
    ];
    Ok(collectors)
}

/// Collectors over packaged plugin archives.
#[must_use]
pub fn plugin_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(BadModuleCollector::new(
            CollectorCore::falling("plugins.not.transformerless", "Plugins that still need transformation"),
            FileFilter::suffixes(["MANIFEST.MF"]),
            Predicate::literal(TRANSFORMERLESS_HEADER),
        )),
        Box::new(GrepCollector::new(
            CollectorCore::neutral("plugins.webresources", "Web resources declared by plugins"),
            FileFilter::suffixes([PLUGIN_DESCRIPTOR]),
            Predicate::literal("<web-resource "),
        )),
    ]
}

/// Every module set enabled by `config`, rooted at `root`.
///
/// `commit` fingerprints plugin packaging so it runs once per commit.
///
/// # Errors
/// Returns an error if a configured pattern is invalid.
pub fn default_module_sets(root: &Path, config: &Config, commit: Option<&str>) -> Result<Vec<ModuleSet>> {
    let exclude = &config.modules.exclude;
    let depth = config.modules.max_depth;

    let mut sets = vec![ModuleSet::new(
        "source",
        Box::new(DirectoryTree::sources(root, exclude, depth)?),
        source_collectors(root, config)?,
    )];

    if config.metrics.include_tests {
        sets.push(ModuleSet::new(
            "tests",
            Box::new(DirectoryTree::tests(root, exclude, depth)?),
            test_collectors()?,
        ));
    }

    if config.metrics.include_plugins {
        let mut archives = PluginArchives::new(root, &config.plugins.archives, exclude)?;
        if let Some(command) = &config.plugins.package_command {
            archives = archives.with_packaging(
                command.clone(),
                commit.map(str::to_string),
                state::packaged_marker_path(root),
            );
        }
        sets.push(ModuleSet::new("plugins", Box::new(archives), plugin_collectors()));
    }

    Ok(sets)
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
