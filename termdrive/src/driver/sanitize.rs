//! Output cleanup: command echo, trailing prompt, context annotations.

use memchr::memrchr;
use regex::Regex;

/// Remove a trailing context annotation line.
///
/// Devices like JUNOS print the config context (`[edit]`, `{master:0}`) on
/// its own line right before the prompt. If the last line of `output`
/// matches any of `patterns` it is dropped; a single trailing newline on the
/// input is not counted as a line and is preserved. Output without such a
/// line comes back unchanged.
pub fn sanitize(output: &str, patterns: &[Regex]) -> String {
    let (body, terminated) = match output.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (output, false),
    };

    let (head, last) = match memrchr(b'\n', body.as_bytes()) {
        Some(pos) => (Some(&body[..pos]), &body[pos + 1..]),
        None => (None, body),
    };

    if !patterns.iter().any(|p| p.is_match(last)) {
        return output.to_string();
    }

    match head {
        Some(head) if terminated => format!("{}\n", head),
        Some(head) => head.to_string(),
        None => String::new(),
    }
}

/// Remove the echoed command from the start of `output`.
pub fn strip_command_echo<'a>(output: &'a str, command: &str) -> &'a str {
    let trimmed = output.trim_start_matches(['\r', '\n']);
    match trimmed.strip_prefix(command) {
        Some(rest) => rest.trim_start_matches(['\r', '\n']),
        None => output,
    }
}

/// Remove the last line if it is a prompt.
pub fn strip_trailing_prompt<'a>(output: &'a str, prompt: &Regex) -> &'a str {
    match memrchr(b'\n', output.as_bytes()) {
        Some(pos) if prompt.is_match(&output[pos + 1..]) => &output[..pos],
        None if prompt.is_match(output) => "",
        _ => output,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::vendors::juniper;

    fn junos_patterns() -> Vec<Regex> {
        juniper::platform().context_patterns
    }

    #[test]
    fn test_edit_line_removed() {
        let patterns = junos_patterns();
        assert_eq!(
            sanitize("set cli complete-on-space off\n[edit]\n", &patterns),
            "set cli complete-on-space off\n"
        );
        assert_eq!(
            sanitize("interfaces {\n    ge-0/0/0;\n}\n[edit interfaces]", &patterns),
            "interfaces {\n    ge-0/0/0;\n}"
        );
    }

    #[test]
    fn test_routing_engine_markers() {
        let patterns = junos_patterns();
        for marker in ["{master:0}", "{backup:1}", "{primary:node0}", "{secondary:node1}", "{linecard:0}"] {
            let input = format!("Hostname: r1\n{}\n", marker);
            assert_eq!(sanitize(&input, &patterns), "Hostname: r1\n", "marker {}", marker);
        }
    }

    #[test]
    fn test_unchanged_without_context() {
        let patterns = junos_patterns();
        for input in ["", "\n", "plain output", "line one\nline two\n", "[edit]\nnot last\n"] {
            assert_eq!(sanitize(input, &patterns), input);
        }
        assert_eq!(sanitize("anything\n[edit]\n", &[]), "anything\n[edit]\n");
    }

    #[test]
    fn test_single_context_line() {
        let patterns = junos_patterns();
        assert_eq!(sanitize("[edit]", &patterns), "");
        assert_eq!(sanitize("[edit]\n", &patterns), "");
        assert_eq!(sanitize("\n[edit]\n", &patterns), "\n");
    }

    #[test]
    fn test_only_one_line_removed() {
        let patterns = junos_patterns();
        assert_eq!(sanitize("a\n{master:0}\n[edit]\n", &patterns), "a\n{master:0}\n");
    }

    #[test]
    fn test_strip_command_echo() {
        assert_eq!(
            strip_command_echo("show version\nJUNOS 21.4\n", "show version"),
            "JUNOS 21.4\n"
        );
        assert_eq!(
            strip_command_echo("\r\nshow version\r\nJUNOS", "show version"),
            "JUNOS"
        );
        assert_eq!(strip_command_echo("no echo here", "show version"), "no echo here");
    }

    #[test]
    fn test_strip_trailing_prompt() {
        let prompt = Regex::new(r"user@router[^\n]*[#>]\s*$").unwrap();
        assert_eq!(
            strip_trailing_prompt("output\n[edit]\nuser@router# ", &prompt),
            "output\n[edit]"
        );
        assert_eq!(strip_trailing_prompt("user@router> ", &prompt), "");
        assert_eq!(strip_trailing_prompt("output\nmore", &prompt), "output\nmore");
    }
}
