//! Operator prompts for the interactive workflows.

use anyhow::{Context, Result};
use inquire::list_option::ListOption;
use inquire::validator::Validation;
use inquire::{CustomUserError, MultiSelect, Text};

/// Source of operator answers - enables scripting for tests.
pub trait Prompter {
    /// Asks for a line of text. An empty answer yields `default` when one is given.
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String>;

    /// Lets the operator pick any subset of `choices`. May return an empty list.
    fn multi_select(&mut self, message: &str, choices: &[String]) -> Result<Vec<String>>;
}

/// Interactive terminal prompts. Renders on stderr so stdout stays clean for reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    pub fn new() -> Self {
        Self
    }
}

impl Prompter for TerminalPrompter {
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        let mut prompt = Text::new(message);
        if let Some(default) = default.filter(|d| !d.is_empty()) {
            prompt = prompt.with_default(default);
        }

        let answer = prompt.prompt().context("Prompt aborted")?;
        Ok(answer.trim().to_string())
    }

    fn multi_select(&mut self, message: &str, choices: &[String]) -> Result<Vec<String>> {
        MultiSelect::new(message, choices.to_vec())
            .with_help_message("space to toggle, enter to confirm")
            .with_validator(require_selection)
            .prompt()
            .context("Prompt aborted")
    }
}

fn require_selection(selected: &[ListOption<&String>]) -> Result<Validation, CustomUserError> {
    if selected.is_empty() {
        Ok(Validation::Invalid("Select at least one option".into()))
    } else {
        Ok(Validation::Valid)
    }
}
