//! Scenario definition types
//!
//! Defines the data structures for deserializing YAML scenarios, their
//! load-time validation, and discovery of scenario files on disk.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::browser::Credentials;
use crate::common::{Error, Result};
use crate::dom::Target;

use super::ids;

/// A complete scenario loaded from a YAML file
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Name of the scenario, unique within a run
    pub name: String,
    /// Optional description of what the scenario verifies
    #[serde(default)]
    pub description: Option<String>,
    /// Tags for filtering
    #[serde(default)]
    pub tags: Vec<String>,
    /// Session setup executed before the steps
    #[serde(default)]
    pub setup: Option<Setup>,
    /// The sequence of steps to execute
    pub steps: Vec<Step>,
    /// Best-effort steps executed after the run, even on failure
    #[serde(default)]
    pub teardown: Vec<Step>,
}

/// Session setup: authenticate, then land on a known start page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Setup {
    /// Register this account first
    #[serde(default)]
    pub register: Option<Credentials>,
    /// Log in with these credentials
    #[serde(default)]
    pub login: Option<Credentials>,
    /// Navigate here once authenticated
    #[serde(default)]
    pub goto: Option<String>,
}

/// A single step in the execution flow
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Navigate to a path relative to the base URL
    Goto {
        path: String,
    },
    /// Fill a form control; applied at the next submission
    Fill {
        target: Target,
        value: String,
    },
    /// Click a link or submit control
    Click {
        target: Target,
    },
    /// Assert document state
    Expect {
        #[serde(default)]
        target: Option<Target>,
        /// Exact text of the single matched element
        #[serde(default)]
        text: Option<String>,
        /// Substring of the single matched element's text
        #[serde(default)]
        text_contains: Option<String>,
        /// Number of matched elements
        #[serde(default)]
        count: Option<usize>,
        /// Whether a matched element must (or must not) be visible
        #[serde(default)]
        visible: Option<bool>,
        /// Expected current URL (path when it starts with `/`)
        #[serde(default)]
        url: Option<String>,
        /// Poll ceiling override for this expectation, in milliseconds
        #[serde(default)]
        within_ms: Option<u64>,
    },
}

impl Step {
    /// Return a copy with `{unique}` placeholders substituted
    pub fn substitute(&self, id: &str) -> Self {
        match self {
            Self::Goto { path } => Self::Goto {
                path: ids::substitute(path, id),
            },
            Self::Fill { target, value } => Self::Fill {
                target: target.substitute(id),
                value: ids::substitute(value, id),
            },
            Self::Click { target } => Self::Click {
                target: target.substitute(id),
            },
            Self::Expect {
                target,
                text,
                text_contains,
                count,
                visible,
                url,
                within_ms,
            } => Self::Expect {
                target: target.as_ref().map(|t| t.substitute(id)),
                text: text.as_deref().map(|t| ids::substitute(t, id)),
                text_contains: text_contains.as_deref().map(|t| ids::substitute(t, id)),
                count: *count,
                visible: *visible,
                url: url.as_deref().map(|u| ids::substitute(u, id)),
                within_ms: *within_ms,
            },
        }
    }
}

impl Scenario {
    /// Parse a scenario from YAML and validate it
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let scenario: Self =
            serde_yaml::from_str(yaml).map_err(|e| Error::ScenarioParse(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            Error::ScenarioParse(msg) => {
                Error::ScenarioParse(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Structural checks a scenario must pass before it can run
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::ScenarioParse("scenario name is empty".to_string()));
        }
        if self.steps.is_empty() {
            return Err(Error::ScenarioParse(format!(
                "scenario '{}' has no steps",
                self.name
            )));
        }
        for (index, step) in self.steps.iter().chain(self.teardown.iter()).enumerate() {
            if let Step::Expect {
                target,
                text,
                text_contains,
                count,
                visible,
                url,
                ..
            } = step
            {
                let element_checks = text.is_some()
                    || text_contains.is_some()
                    || count.is_some()
                    || visible.is_some();
                if !element_checks && url.is_none() {
                    return Err(Error::ScenarioParse(format!(
                        "scenario '{}' step {index}: expect has nothing to check",
                        self.name
                    )));
                }
                if element_checks && target.is_none() {
                    return Err(Error::ScenarioParse(format!(
                        "scenario '{}' step {index}: expect needs a target",
                        self.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Return a copy with `{unique}` placeholders resolved for one run
    pub fn resolved(&self, id: &str) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            setup: self.setup.as_ref().map(|s| Setup {
                register: s.register.as_ref().map(|c| Credentials {
                    email: ids::substitute(&c.email, id),
                    password: c.password.clone(),
                }),
                login: s.login.as_ref().map(|c| Credentials {
                    email: ids::substitute(&c.email, id),
                    password: c.password.clone(),
                }),
                goto: s.goto.clone(),
            }),
            steps: self.steps.iter().map(|s| s.substitute(id)).collect(),
            teardown: self.teardown.iter().map(|s| s.substitute(id)).collect(),
        }
    }

    /// Whether the scenario carries the given tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Load scenarios from files and directories
///
/// Directories are walked recursively for `.yaml`/`.yml` files in file-name
/// order; explicit file paths are parsed regardless of extension. Names
/// must be unique across the whole set.
pub fn load_paths(paths: &[PathBuf]) -> Result<Vec<Scenario>> {
    let mut scenarios = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.path()
                        .extension()
                        .map(|ext| ext == "yaml" || ext == "yml")
                        .unwrap_or(false)
                })
            {
                scenarios.push(Scenario::from_file(entry.path())?);
            }
        } else {
            scenarios.push(Scenario::from_file(path)?);
        }
    }

    let mut seen = HashSet::new();
    for scenario in &scenarios {
        if !seen.insert(scenario.name.as_str()) {
            return Err(Error::ScenarioParse(format!(
                "duplicate scenario name '{}'",
                scenario.name
            )));
        }
    }
    Ok(scenarios)
}
