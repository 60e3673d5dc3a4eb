//! Syntax checking of generated runtime templates
//!
//! Kits declare `runtime = "minijinja"` and their handlers render UI templates
//! through minijinja, so a generated template is parsed here with a default
//! minijinja environment. Parse failures are mapped to a line in the template
//! and a short source window so the problem can be fixed without opening the
//! file first.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Lines shown above and below the offending line by default
pub const DEFAULT_CONTEXT_LINES: usize = 3;

static BLOCK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{%-?\+?\s*(\w+)").expect("Invalid regex"));

const OPENING_TAGS: &[&str] = &[
    "if", "for", "block", "macro", "call", "filter", "with", "autoescape", "raw",
];

/// A syntax error in a generated template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDiagnostic {
    /// Template path as shown to the user
    pub path: String,
    /// 1-based line of the problem
    pub line: usize,
    /// 1-based column, when the engine reports one
    pub column: Option<usize>,
    /// Engine message
    pub message: String,
    /// Source window with the offending line marked `>`
    pub snippet: String,
}

impl fmt::Display for TemplateDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => writeln!(f, "{}:{}:{}: {}", self.path, self.line, column, self.message)?,
            None => writeln!(f, "{}:{}: {}", self.path, self.line, self.message)?,
        }
        write!(f, "{}", self.snippet)
    }
}

impl std::error::Error for TemplateDiagnostic {}

/// Parses templates and builds diagnostics
#[derive(Debug, Clone, Copy)]
pub struct TemplateValidator {
    context_lines: usize,
}

impl Default for TemplateValidator {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_LINES)
    }
}

impl TemplateValidator {
    /// Validator showing `context_lines` lines around errors
    #[must_use]
    pub const fn new(context_lines: usize) -> Self {
        Self { context_lines }
    }

    /// Check that `content` parses
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateDiagnostic`] locating the syntax error.
    pub fn validate(&self, path: &str, content: &str) -> Result<(), TemplateDiagnostic> {
        let env = minijinja::Environment::new();
        let Err(err) = env.template_from_named_str(path, content) else {
            return Ok(());
        };

        let rendered = err.to_string();
        let (mut line, column) = locate(path, &rendered)
            .map_or((err.line(), None), |(line, column)| (Some(line), column));

        let message = err
            .detail()
            .map_or_else(|| err.kind().to_string(), ToString::to_string);
        if rendered.contains("end of input") {
            if let Some(open) = innermost_unclosed(content) {
                line = Some(open);
            }
        }

        let total = content.lines().count().max(1);
        let line = line.unwrap_or(total).clamp(1, total);
        tracing::debug!(%path, line, %message, "Generated template failed to parse");

        Err(TemplateDiagnostic {
            path: path.to_string(),
            line,
            column,
            snippet: self.snippet(content, line),
            message,
        })
    }

    /// Source window around `line`, offending line marked `>`
    #[must_use]
    pub fn snippet(&self, content: &str, line: usize) -> String {
        let lines: Vec<&str> = content.lines().collect();
        if lines.is_empty() {
            return format!("> {line:>4} | \n");
        }
        let first = line.saturating_sub(self.context_lines).max(1);
        let last = (line + self.context_lines).min(lines.len());
        let width = last.to_string().len();

        let mut out = String::new();
        for number in first..=last {
            let marker = if number == line { '>' } else { ' ' };
            let text = lines.get(number - 1).copied().unwrap_or_default();
            out.push_str(&format!("{marker} {number:>width$} | {text}\n"));
        }
        out
    }
}

/// Validate with the default context window
///
/// # Errors
///
/// Returns a [`TemplateDiagnostic`] locating the syntax error.
pub fn validate_template(path: &str, content: &str) -> Result<(), TemplateDiagnostic> {
    TemplateValidator::default().validate(path, content)
}

/// Find `path:line[:column]` in engine output
fn locate(path: &str, rendered: &str) -> Option<(usize, Option<usize>)> {
    let pattern = Regex::new(&format!(r"{}:(\d+)(?::(\d+))?", regex::escape(path))).ok()?;
    let captures = pattern.captures_iter(rendered).last()?;
    let line = captures.get(1)?.as_str().parse().ok()?;
    let column = captures.get(2).and_then(|m| m.as_str().parse().ok());
    // minijinja reports line 0 when it has no position
    (line > 0).then_some((line, column))
}

/// Line of the innermost block tag that is never closed
fn innermost_unclosed(content: &str) -> Option<usize> {
    let mut stack: Vec<(&str, usize)> = Vec::new();
    for (index, text) in content.lines().enumerate() {
        for captures in BLOCK_TAG.captures_iter(text) {
            let Some(tag) = captures.get(1).map(|m| m.as_str()) else {
                continue;
            };
            if let Some(closed) = tag.strip_prefix("end") {
                if let Some(pos) = stack.iter().rposition(|(open, _)| *open == closed) {
                    stack.truncate(pos);
                }
            } else if OPENING_TAGS.contains(&tag) {
                stack.push((tag, index + 1));
            }
        }
    }
    stack.last().map(|(_, line)| *line)
}
