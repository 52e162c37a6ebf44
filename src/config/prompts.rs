//! Prompt templates for tubequery.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("placeholder regex is valid"))
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub answer: AnswerPrompts,
    pub summary: SummaryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for question answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPrompts {
    /// Role instruction placed first in the prompt.
    pub role: String,
    /// Output-format instruction placed last.
    pub instructions: String,
}

impl Default for AnswerPrompts {
    fn default() -> Self {
        Self {
            role: "You are a helpful assistant that answers questions about a YouTube video using only excerpts from its transcript. Each excerpt is numbered and tagged with the moment in the video where it begins."
                .to_string(),

            instructions: r#"Answer the question in no more than {{max_words}} words.
- Use only the information in the excerpts above.
- When you state a specific fact, cite the excerpt it comes from by its number, like [2].
- If the excerpts do not contain enough information to answer, say so explicitly instead of guessing."#
                .to_string(),
        }
    }
}

/// Prompts for whole-video summaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub role: String,
    pub instructions: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            role: "You are a helpful assistant that summarizes YouTube videos from excerpts of their transcripts. The excerpts are in chronological order and tagged with the moment in the video where each begins."
                .to_string(),

            instructions: r#"Write a summary of the video in no more than {{max_words}} words.
- Start with one sentence describing what the video is about.
- Then list the main topics in the order they are discussed, with the timestamp where each begins.
- Do not invent content that is not in the excerpts."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let answer_path = custom_path.join("answer.toml");
            if answer_path.exists() {
                let content = std::fs::read_to_string(&answer_path)?;
                prompts.answer = toml::from_str(&content)?;
            }

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in a single pass over the template, so
    /// placeholders inside substituted values are left as written. Unknown
    /// names are kept verbatim.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        placeholder_regex()
            .replace_all(template, |caps: &Captures<'_>| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.answer.role.is_empty());
        assert!(prompts.answer.instructions.contains("{{max_words}}"));
        assert!(prompts.summary.instructions.contains("{{max_words}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        assert_eq!(
            Prompts::render("{{name}} and {{other}}", &vars),
            "Alice and {{other}}"
        );
    }

    #[test]
    fn test_substituted_values_are_not_rendered_again() {
        let mut vars = HashMap::new();
        vars.insert("style".to_string(), "brief, under {{max_words}} words".to_string());
        vars.insert("max_words".to_string(), "50".to_string());
        assert_eq!(
            Prompts::render("Be {{style}}. Max {{max_words}}.", &vars),
            "Be brief, under {{max_words}} words. Max 50."
        );
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("tone".to_string(), "formal".to_string());
        prompts.variables.insert("max_words".to_string(), "999".to_string());

        let mut vars = HashMap::new();
        vars.insert("max_words".to_string(), "50".to_string());

        let result = prompts.render_with_custom("{{tone}} / {{max_words}}", &vars);
        assert_eq!(result, "formal / 50");
    }

    #[test]
    fn test_load_custom_answer_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("answer.toml"),
            "role = \"You are terse.\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.answer.role, "You are terse.");
        // Missing keys fall back to defaults.
        assert!(prompts.answer.instructions.contains("[2]"));
        assert_eq!(prompts.summary.role, SummaryPrompts::default().role);
    }
}
