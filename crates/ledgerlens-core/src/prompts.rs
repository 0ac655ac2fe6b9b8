//! Prompt Library for advice generation
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/ledgerlens/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! A prompt file is YAML frontmatter followed by `# System` and `# User`
//! sections. `{{var}}` placeholders are substituted at render time and
//! `{{#if var}}...{{/if}}` blocks are dropped when `var` is empty.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const FINANCIAL_PLAN: &str = include_str!("../../../prompts/financial_plan.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Report + strategies into a written plan
    FinancialPlan,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FinancialPlan => "financial_plan",
        }
    }

    pub fn all() -> &'static [PromptId] {
        &[Self::FinancialPlan]
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::FinancialPlan => defaults::FINANCIAL_PLAN,
        }
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    pub task_type: String,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    /// The prompt body (system + user sections)
    pub content: String,
    /// Path to the override file, if one was used
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    pub fn is_override(&self) -> bool {
        self.override_path.is_some()
    }

    pub fn system_section(&self) -> Option<&str> {
        extract_section(&self.content, "# System")
    }

    pub fn user_section(&self) -> Option<&str> {
        extract_section(&self.content, "# User")
    }

    /// Render the system section (empty if the prompt has none)
    pub fn render_system(&self, vars: &HashMap<&str, String>) -> String {
        self.system_section()
            .map(|s| render_template(s, vars))
            .unwrap_or_default()
    }

    /// Render the user section, or the whole body when there is no `# User`
    pub fn render_user(&self, vars: &HashMap<&str, String>) -> String {
        render_template(self.user_section().unwrap_or(&self.content), vars)
    }
}

/// Prompt library with an optional override directory
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a prompt library with the default override directory
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        let prompt = match self.cache.remove(&id) {
            Some(prompt) => prompt,
            None => self.load(id)?,
        };
        let prompt: &Prompt = self.cache.entry(id).or_insert(prompt);
        Ok(prompt)
    }

    fn load(&self, id: PromptId) -> Result<Prompt> {
        if let Some(override_path) = self.override_path(id).filter(|p| p.exists()) {
            let content = fs::read_to_string(&override_path).map_err(|e| {
                Error::Prompt(format!(
                    "Failed to read prompt override {}: {}",
                    override_path.display(),
                    e
                ))
            })?;
            let (metadata, body) = parse_prompt(&content)?;
            debug!(prompt = id.as_str(), path = %override_path.display(), "Using prompt override");
            return Ok(Prompt {
                metadata,
                content: body,
                override_path: Some(override_path),
            });
        }

        let (metadata, body) = parse_prompt(id.default_content())?;
        Ok(Prompt {
            metadata,
            content: body,
            override_path: None,
        })
    }

    fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
    }

    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ledgerlens").join("prompts").join("overrides"))
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    let rest = content
        .strip_prefix("---")
        .ok_or_else(|| Error::Prompt("Prompt must start with YAML frontmatter (---)".into()))?;

    let end = rest.find("---").ok_or_else(|| {
        Error::Prompt("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::Prompt(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

/// Extract a section from the prompt content
fn extract_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    let start = content.find(header)?;
    let after_header = &content[start + header.len()..];

    // Sections end at the next top-level header
    let end = after_header.find("\n# ").unwrap_or(after_header.len());

    Some(after_header[..end].trim())
}

/// Resolve conditionals, then substitute `{{var}}` placeholders
///
/// Substitution is a single pass over the template: placeholder text inside
/// a substituted value is never expanded. Unknown placeholders are kept.
fn render_template(template: &str, vars: &HashMap<&str, String>) -> String {
    let resolved = resolve_conditionals(template, vars);
    let mut result = String::with_capacity(resolved.len());
    let mut rest = resolved.as_str();

    while let Some(start) = rest.find("{{") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            result.push_str(&rest[start..]);
            return result;
        };

        match vars.get(after[..end].trim()) {
            Some(value) => result.push_str(value),
            None => result.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    result.push_str(rest);
    result
}

/// Keep `{{#if var}}...{{/if}}` bodies whose variable is non-empty, drop the rest
fn resolve_conditionals(content: &str, vars: &HashMap<&str, String>) -> String {
    let mut result = content.to_string();

    while let Some(if_start) = result.find("{{#if ") {
        let var_start = if_start + 6;
        let Some(var_end) = result[var_start..].find("}}") else {
            break;
        };
        let var_name = result[var_start..var_start + var_end].trim().to_string();
        let block_start = var_start + var_end + 2;

        let Some(endif_pos) = result[block_start..].find("{{/if}}") else {
            break;
        };
        let block_content = result[block_start..block_start + endif_pos].to_string();
        let full_end = block_start + endif_pos + 7;

        let keep = vars.get(var_name.as_str()).is_some_and(|v| !v.is_empty());
        let replacement = if keep { block_content.as_str() } else { "" };
        result = format!("{}{}{}", &result[..if_start], replacement, &result[full_end..]);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_parse_prompt() {
        let content = r#"---
id: test_prompt
version: 1
task_type: narrative
---

# System
Test system prompt.

# User
Test user prompt with {{variable}}.
"#;

        let (metadata, body) = parse_prompt(content).unwrap();
        assert_eq!(metadata.id, "test_prompt");
        assert_eq!(metadata.version, 1);
        assert!(body.contains("# System"));
        assert!(body.contains("# User"));
    }

    #[test]
    fn test_parse_prompt_requires_frontmatter() {
        assert!(matches!(parse_prompt("# System\nhi"), Err(Error::Prompt(_))));
        assert!(matches!(parse_prompt("---\nid: x\n# System"), Err(Error::Prompt(_))));
    }

    #[test]
    fn test_extract_section() {
        let content = "# System\nSystem content here.\n\n# User\nUser content here.";
        assert_eq!(
            extract_section(content, "# System"),
            Some("System content here.")
        );
        assert_eq!(extract_section(content, "# User"), Some("User content here."));
    }

    #[test]
    fn test_subsections_stay_inside_user_section() {
        let content = "# System\ns\n\n# User\n### 1. OVERVIEW\nbody\n### 2. ALERTS\nmore";
        let user = extract_section(content, "# User").unwrap();
        assert!(user.contains("### 2. ALERTS"));
    }

    #[test]
    fn test_conditional_blocks() {
        let content = "Start{{#if category}}\nCategory: {{category}}{{/if}}\nEnd";

        let rendered = render_template(content, &vars(&[("category", "Groceries")]));
        assert!(rendered.contains("Category: Groceries"));

        let rendered = render_template(content, &vars(&[("category", "")]));
        assert!(!rendered.contains("Category:"));
        assert!(rendered.contains("Start"));
        assert!(rendered.contains("End"));
    }

    #[test]
    fn test_substituted_values_are_not_expanded() {
        let rendered = render_template(
            "Net: {{net_savings}}\n{{recurring}}\nKeep {{unknown}}",
            &vars(&[
                ("net_savings", "$10.00"),
                ("recurring", "- {{net_savings}}: $5.00 x3"),
            ]),
        );
        assert_eq!(
            rendered,
            "Net: $10.00\n- {{net_savings}}: $5.00 x3\nKeep {{unknown}}"
        );
    }

    #[test]
    fn test_embedded_financial_plan() {
        let mut lib = PromptLibrary::embedded_only();
        let prompt = lib.get(PromptId::FinancialPlan).unwrap();
        assert_eq!(prompt.metadata.id, "financial_plan");
        assert!(!prompt.is_override());
        assert!(prompt.system_section().is_some());

        let user = prompt.render_user(&vars(&[
            ("total_income", "$1,000.00"),
            ("strategies", "- Pay yourself first"),
        ]));
        assert!(user.contains("Total Income: $1,000.00"));
        assert!(user.contains("- Pay yourself first"));
        assert!(!user.contains("{{#if"));
    }

    #[test]
    fn test_default_prompts_parse() {
        for id in PromptId::all() {
            let (metadata, _) = parse_prompt(id.default_content()).unwrap();
            assert_eq!(metadata.id, id.as_str());
        }
    }

    #[test]
    fn test_override_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("financial_plan.md"),
            "---\nid: financial_plan\nversion: 2\ntask_type: narrative\n---\n# System\nBe brief.\n\n# User\nNet: {{net_savings}}",
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        let prompt = lib.get(PromptId::FinancialPlan).unwrap();
        assert!(prompt.is_override());
        assert_eq!(prompt.metadata.version, 2);
        assert_eq!(
            prompt.render_user(&vars(&[("net_savings", "-$200.00")])),
            "Net: -$200.00"
        );
        assert_eq!(prompt.render_system(&HashMap::new()), "Be brief.");
    }
}
