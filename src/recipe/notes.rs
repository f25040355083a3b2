//! Machine-family note rules for the recipe synthesizer.
//!
//! Provides two loading methods:
//! - `default_rules()` - Loads embedded rules compiled into the binary
//! - `load_rules(path)` - Loads custom rules from a file path

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

/// Default rules embedded in the binary at compile time.
/// These are loaded from `config/machine_notes.toml`.
const DEFAULT_RULES: &str = include_str!("../../config/machine_notes.toml");

/// Root configuration loaded from machine_notes.toml.
#[derive(Debug, Clone, Deserialize)]
pub struct NotesConfig {
    pub rules: Vec<MachineNoteRule>,
}

/// A rule attaching guidance notes to a machine family.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineNoteRule {
    /// Machine-name substrings that activate this rule (case-insensitive)
    pub patterns: Vec<String>,
    /// Notes to emit; `{machine}` is replaced with the machine name
    pub notes: Vec<String>,
}

/// Get the default rules embedded in the binary.
///
/// # Panics
/// Panics if the embedded TOML is invalid (this would be a compile-time bug).
pub fn default_rules() -> NotesConfig {
    toml::from_str(DEFAULT_RULES).expect("embedded machine_notes.toml must be valid TOML")
}

/// Load rules from a TOML file at the given path.
pub fn load_rules(path: &Path) -> Result<NotesConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: NotesConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Collect the guidance notes whose patterns match the machine name.
pub fn notes_for_machine(config: &NotesConfig, machine_name: &str) -> Vec<String> {
    let lower = machine_name.to_lowercase();
    let mut notes = Vec::new();
    for rule in &config.rules {
        if rule.patterns.iter().any(|p| lower.contains(&p.to_lowercase())) {
            notes.extend(
                rule.notes
                    .iter()
                    .map(|n| n.replace("{machine}", machine_name)),
            );
        }
    }
    notes
}
