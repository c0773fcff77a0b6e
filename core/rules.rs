use crate::config::{ExclusionsConfig, NestedPair};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

pub const ENV_FILE_PREFIX: &str = ".env";
pub const ENV_EXAMPLE_FILE: &str = ".env.example";

/// Why an entry was left out of the aggregate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    ExcludedDir,
    NestedDir,
    EnvFile,
    ExcludedFile,
    ExcludedExtension,
    SymlinkedDir,
    SpecialFile,
    OutputFile,
    Unreadable,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Exclusion::ExcludedDir => "excluded directory",
            Exclusion::NestedDir => "nested exclusion",
            Exclusion::EnvFile => "environment file",
            Exclusion::ExcludedFile => "excluded file name",
            Exclusion::ExcludedExtension => "excluded extension",
            Exclusion::SymlinkedDir => "symlinked directory",
            Exclusion::SpecialFile => "not a regular file",
            Exclusion::OutputFile => "output file",
            Exclusion::Unreadable => "unreadable",
        };
        f.write_str(text)
    }
}

/// Immutable exclusion rule set, built once per run.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    dirs: HashSet<String>,
    files: HashSet<String>,
    extensions: HashSet<String>,
    nested: Vec<NestedPair>,
}

impl ExclusionRules {
    pub fn new<D, F, E, S>(dirs: D, files: F, extensions: E, nested: Vec<NestedPair>) -> Self
    where
        D: IntoIterator<Item = S>,
        F: IntoIterator<Item = S>,
        E: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            files: files.into_iter().map(Into::into).collect(),
            extensions: extensions.into_iter().map(Into::into).collect(),
            nested,
        }
    }

    pub fn from_config(config: &ExclusionsConfig) -> Self {
        Self::new(
            config.dirs.iter().cloned(),
            config.files.iter().cloned(),
            config.extensions.iter().cloned(),
            config.nested.clone(),
        )
    }

    /// `parent_name` is the basename of the directory currently being listed.
    pub fn check_dir(&self, name: &str, parent_name: Option<&str>) -> Option<Exclusion> {
        if self.dirs.contains(name) {
            return Some(Exclusion::ExcludedDir);
        }
        let parent_name = parent_name?;
        self.nested
            .iter()
            .any(|pair| pair.child == name && pair.parent == parent_name)
            .then_some(Exclusion::NestedDir)
    }

    pub fn check_file(&self, basename: &str) -> Option<Exclusion> {
        if basename.starts_with(ENV_FILE_PREFIX) && basename != ENV_EXAMPLE_FILE {
            return Some(Exclusion::EnvFile);
        }
        if self.files.contains(basename) {
            return Some(Exclusion::ExcludedFile);
        }
        match extension_of(basename) {
            Some(ext) if self.extensions.contains(ext) => Some(Exclusion::ExcludedExtension),
            _ => None,
        }
    }
}

/// Extension including its leading dot. Leading dots belong to the name, so
/// `.gitignore` has none while `.env.example` has `.example`.
pub fn extension_of(basename: &str) -> Option<&str> {
    let stem_start = basename.len() - basename.trim_start_matches('.').len();
    basename[stem_start..]
        .rfind('.')
        .map(|idx| &basename[stem_start + idx..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_rules() -> ExclusionRules {
        ExclusionRules::from_config(&ExclusionsConfig::default())
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("main.rs"), Some(".rs"));
        assert_eq!(extension_of("archive.tar.gz"), Some(".gz"));
        assert_eq!(extension_of(".gitignore"), None);
        assert_eq!(extension_of(".env.example"), Some(".example"));
        assert_eq!(extension_of("Makefile"), None);
        assert_eq!(extension_of("trailing."), Some("."));
    }

    #[test]
    fn test_env_files() {
        let rules = default_rules();
        assert_eq!(rules.check_file(".env"), Some(Exclusion::EnvFile));
        assert_eq!(rules.check_file(".env.local"), Some(Exclusion::EnvFile));
        assert_eq!(rules.check_file(".envrc"), Some(Exclusion::EnvFile));
        assert_eq!(rules.check_file(".env.example"), None);
        assert_eq!(rules.check_file("env.js"), None);
    }

    #[test]
    fn test_file_names_and_extensions() {
        let rules = default_rules();
        assert_eq!(rules.check_file(".DS_Store"), Some(Exclusion::ExcludedFile));
        assert_eq!(rules.check_file("all_code.txt"), Some(Exclusion::ExcludedFile));
        assert_eq!(rules.check_file("server.log"), Some(Exclusion::ExcludedExtension));
        assert_eq!(rules.check_file("server.LOG"), None);
        assert_eq!(rules.check_file("index.ts"), None);
    }

    #[test]
    fn test_nested_rule_is_parent_scoped() {
        let rules = default_rules();
        assert_eq!(
            rules.check_dir("ui", Some("components")),
            Some(Exclusion::NestedDir)
        );
        assert_eq!(rules.check_dir("ui", Some("widgets")), None);
        assert_eq!(rules.check_dir("ui", None), None);
        assert_eq!(rules.check_dir("components", Some("ui")), None);
        assert_eq!(
            rules.check_dir("node_modules", Some("anything")),
            Some(Exclusion::ExcludedDir)
        );
    }

    #[test]
    fn test_custom_rule_set() {
        let rules = ExclusionRules::new(
            ["target"],
            ["Cargo.lock"],
            [".bak"],
            vec![NestedPair::new("src", "generated")],
        );
        assert_eq!(rules.check_dir("target", None), Some(Exclusion::ExcludedDir));
        assert_eq!(rules.check_dir("node_modules", None), None);
        assert_eq!(rules.check_file("Cargo.lock"), Some(Exclusion::ExcludedFile));
        assert_eq!(rules.check_file("notes.bak"), Some(Exclusion::ExcludedExtension));
        assert_eq!(
            rules.check_dir("generated", Some("src")),
            Some(Exclusion::NestedDir)
        );
    }
}
