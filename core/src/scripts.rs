use std::path::Path;

use crate::error::ConfigError;

/// Installs F12 (toggle developer tools) and F5 (reload) key handlers.
pub const DEVTOOLS_HOTKEYS: &str = include_str!("scripts/devtools_hotkeys.js");

/// One script to evaluate in every window, with a label for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionScript {
    pub name: String,
    pub source: String,
}

impl InjectionScript {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn devtools_hotkeys() -> Self {
        Self::new("devtools-hotkeys", DEVTOOLS_HOTKEYS)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path.display().to_string(), source))
    }
}

/// Ordered script list. Insertion order is execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptSet {
    scripts: Vec<InjectionScript>,
}

impl ScriptSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in hotkeys first (if enabled), then the user's file.
    pub fn from_options(
        devtools_hotkeys: bool,
        inject_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let mut set = Self::new();
        if devtools_hotkeys {
            set.push(InjectionScript::devtools_hotkeys());
        }
        if let Some(path) = inject_file {
            set.push(InjectionScript::from_file(path)?);
        }
        Ok(set)
    }

    pub fn push(&mut self, script: InjectionScript) {
        self.scripts.push(script);
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InjectionScript> {
        self.scripts.iter()
    }
}

impl FromIterator<InjectionScript> for ScriptSet {
    fn from_iter<I: IntoIterator<Item = InjectionScript>>(iter: I) -> Self {
        Self {
            scripts: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ScriptSet {
    type Item = &'a InjectionScript;
    type IntoIter = std::slice::Iter<'a, InjectionScript>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
