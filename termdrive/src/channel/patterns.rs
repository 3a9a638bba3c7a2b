//! Pattern helpers for prompt detection.

use regex::Regex;

/// Compile a prompt pattern string into a regex.
///
/// Anchors to end of string by default if no anchor is specified.
pub fn compile_prompt_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let pattern = if pattern.ends_with('$') {
        pattern.to_string()
    } else {
        format!("{}\\s*$", pattern)
    };

    Regex::new(&pattern)
}

/// Build a bracket expression matching any one of `terminators`.
pub fn terminator_class(terminators: &str) -> String {
    let escaped: String = terminators
        .chars()
        .map(|c| regex::escape(&c.to_string()))
        .collect();
    format!("[{}]", escaped)
}

/// Pattern matching a prompt line that starts with `base_prompt`.
///
/// `base_prompt` is taken literally; anything may follow it on the prompt
/// line (e.g. a config context like `(Config)`) as long as the line ends in
/// one of the terminators.
pub fn base_prompt_pattern(base_prompt: &str, terminators: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"{}[^\n]*{}\s*$",
        regex::escape(base_prompt),
        terminator_class(terminators)
    ))
}
