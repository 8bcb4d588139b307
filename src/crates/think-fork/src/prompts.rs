//! Per-style system prompts: an external-override registry with an
//! embedded-default fallback, surfaced for testability (spec.md §9 — "per
//! branch prompt files with filesystem fallback" redesigned as a registry
//! interface with three implementations: embedded, in-memory override, and
//! file-backed override).

use crate::error::Result;
use crate::style::BranchStyle;
use std::collections::HashMap;
use std::path::Path;

/// A source of style-specific system prompts. Implementations may look up
/// an externally managed override; `lookup` returning `None` means the
/// caller should fall back to the built-in template.
pub trait PromptRegistry: Send + Sync {
    fn lookup(&self, style: BranchStyle) -> Option<String>;
}

fn builtin_template(style: BranchStyle) -> &'static str {
    match style {
        BranchStyle::Conservative => {
            "You reason conservatively: favour well-established approaches, surface risks \
             prominently, and prefer the option with the smallest blast radius."
        }
        BranchStyle::Aggressive => {
            "You reason aggressively: favour high-upside options, weigh opportunities heavily, \
             and accept elevated risk for a materially better outcome."
        }
        BranchStyle::Balanced => {
            "You reason in a balanced way: weigh risks and opportunities evenly and prefer the \
             option with the best risk-adjusted expected value."
        }
        BranchStyle::Contrarian => {
            "You reason contrarily: actively look for the reasons the obvious answer is wrong \
             and argue for the option others would dismiss."
        }
    }
}

/// Registry with no overrides; always falls back to the embedded default.
pub struct EmbeddedPromptRegistry;

impl PromptRegistry for EmbeddedPromptRegistry {
    fn lookup(&self, _style: BranchStyle) -> Option<String> {
        None
    }
}

/// Registry backed by an in-process map of overrides, checked before the
/// embedded default.
pub struct OverridePromptRegistry {
    overrides: HashMap<BranchStyle, String>,
}

impl OverridePromptRegistry {
    pub fn new(overrides: HashMap<BranchStyle, String>) -> Self {
        Self { overrides }
    }
}

impl PromptRegistry for OverridePromptRegistry {
    fn lookup(&self, style: BranchStyle) -> Option<String> {
        self.overrides.get(&style).cloned()
    }
}

/// Registry backed by a YAML or JSON file mapping style name to prompt
/// text (format auto-detected from the extension), checked before the
/// embedded default. Loaded once at construction; styles absent from the
/// file fall back to the embedded default same as `EmbeddedPromptRegistry`.
pub struct FileOverridePromptRegistry {
    overrides: HashMap<BranchStyle, String>,
}

impl FileOverridePromptRegistry {
    /// Loads overrides from a file such as:
    /// ```yaml
    /// conservative: "custom conservative system prompt"
    /// contrarian: "custom contrarian system prompt"
    /// ```
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw: HashMap<String, String> = utils::config::load_config_file(path)?;
        let overrides = raw.into_iter().map(|(style, prompt)| (BranchStyle::parse_safe(&style), prompt)).collect();
        Ok(Self { overrides })
    }
}

impl PromptRegistry for FileOverridePromptRegistry {
    fn lookup(&self, style: BranchStyle) -> Option<String> {
        self.overrides.get(&style).cloned()
    }
}

/// Resolves the system prompt for `style`, recording in `used_fallback`
/// whether the embedded default had to be used.
pub fn resolve_prompt(registry: &dyn PromptRegistry, style: BranchStyle) -> (String, bool) {
    match registry.lookup(style) {
        Some(prompt) => (prompt, false),
        None => (builtin_template(style).to_string(), true),
    }
}
