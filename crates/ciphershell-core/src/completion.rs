/// A command known to the shell, with the argument tokens offered for
/// completion. Arguments are suggestions only; the dispatcher accepts
/// anything.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub args: &'static [&'static str],
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "help",
        description: "Show available commands.",
        usage: "help",
        args: &[],
    },
    CommandSpec {
        name: "clear",
        description: "Clear the terminal screen.",
        usage: "clear",
        args: &[],
    },
    CommandSpec {
        name: "theme",
        description: "Change visual style.",
        usage: "theme [list | name]",
        args: &[
            "list", "retro", "catppuccin", "dracula", "nord", "gruvbox", "tokyo", "onedark",
            "solarized", "monokai", "cyberpunk", "matrix", "oled",
        ],
    },
    CommandSpec {
        name: "genpass",
        description: "Generate passwords.",
        usage: "genpass [-r|--random] [-m|--memorable]",
        args: &["-r", "--random", "-m", "--memorable"],
    },
    CommandSpec {
        name: "vault",
        description: "Symmetric (AES) encryption.",
        usage: "vault [encrypt | decrypt]",
        args: &["encrypt", "decrypt"],
    },
    CommandSpec {
        name: "identity",
        description: "RSA key management.",
        usage: "identity [gen | show | encrypt | decrypt]",
        args: &["gen", "show", "encrypt", "decrypt"],
    },
];

pub fn find_command(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|c| c.name == name)
}

/// The single best inline completion for the buffer ("ghost text").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    candidate: Option<String>,
    typed_len: usize,
}

impl Completion {
    /// Recompute from scratch for `buffer`.
    pub fn for_buffer(buffer: &str) -> Self {
        match inline_candidate(buffer) {
            Some(candidate) => Self {
                candidate: Some(candidate),
                typed_len: buffer.len(),
            },
            None => Self::default(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Full candidate line, if any.
    pub fn candidate(&self) -> Option<&str> {
        self.candidate.as_deref()
    }

    /// The part of the candidate beyond what was typed.
    pub fn suffix(&self) -> Option<&str> {
        self.candidate.as_deref().map(|c| &c[self.typed_len..])
    }

    pub fn is_some(&self) -> bool {
        self.candidate.is_some()
    }
}

/// Longest-prefix inline match against the command or argument vocabulary.
///
/// Only offered when the candidate extends the buffer; a buffer ending in a
/// space never gets a suggestion.
pub fn inline_candidate(buffer: &str) -> Option<String> {
    if buffer.is_empty() || buffer.ends_with(' ') {
        return None;
    }

    let tokens: Vec<&str> = buffer.split(' ').collect();
    let candidate = match tokens.as_slice() {
        [cmd] => COMMANDS
            .iter()
            .map(|c| c.name)
            .find(|name| name.starts_with(cmd))
            .filter(|name| name != cmd)
            .map(str::to_string),
        [cmd, .., last] => {
            if last.is_empty() {
                return None;
            }
            let spec = find_command(cmd)?;
            let found = spec
                .args
                .iter()
                .find(|a| a.starts_with(last))
                .filter(|a| *a != last)?;
            let base = tokens[..tokens.len() - 1].join(" ");
            Some(format!("{base} {found}"))
        }
        [] => None,
    }?;

    (candidate.starts_with(buffer) && candidate != buffer).then_some(candidate)
}

/// Every argument registered for the command being typed, unfiltered.
///
/// Empty when the command is unknown, has no arguments, or the buffer is
/// already past its first argument.
pub fn full_list(buffer: &str) -> Vec<&'static str> {
    let tokens: Vec<&str> = buffer.split_whitespace().collect();
    let Some(cmd) = tokens.first() else {
        return Vec::new();
    };
    if tokens.len() > 2 {
        return Vec::new();
    }
    find_command(cmd)
        .map(|spec| spec.args.to_vec())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::THEMES;

    #[test]
    fn test_command_prefix_completes() {
        assert_eq!(inline_candidate("the").as_deref(), Some("theme"));
        assert_eq!(inline_candidate("g").as_deref(), Some("genpass"));
        assert_eq!(inline_candidate("id").as_deref(), Some("identity"));
    }

    #[test]
    fn test_exact_command_offers_nothing() {
        assert_eq!(inline_candidate("theme"), None);
        assert_eq!(inline_candidate("help"), None);
    }

    #[test]
    fn test_unknown_prefix_offers_nothing() {
        assert_eq!(inline_candidate("xyz"), None);
        assert_eq!(inline_candidate(""), None);
    }

    #[test]
    fn test_argument_completion_rebuilds_line() {
        assert_eq!(inline_candidate("theme no").as_deref(), Some("theme nord"));
        assert_eq!(inline_candidate("vault d").as_deref(), Some("vault decrypt"));
        assert_eq!(inline_candidate("genpass --m").as_deref(), Some("genpass --memorable"));
        assert_eq!(
            inline_candidate("genpass -r --m").as_deref(),
            Some("genpass -r --memorable")
        );
    }

    #[test]
    fn test_first_vocabulary_match_wins() {
        // "-r" comes before "--random" in the vocabulary
        assert_eq!(inline_candidate("genpass -").as_deref(), Some("genpass -r"));
    }

    #[test]
    fn test_trailing_space_offers_nothing() {
        assert_eq!(inline_candidate("theme "), None);
        assert_eq!(inline_candidate("vault encrypt "), None);
    }

    #[test]
    fn test_double_space_keeps_typed_text() {
        assert_eq!(inline_candidate("theme  no").as_deref(), Some("theme  nord"));
    }

    #[test]
    fn test_suffix_is_only_the_untyped_part() {
        let completion = Completion::for_buffer("identity sh");
        assert_eq!(completion.candidate(), Some("identity show"));
        assert_eq!(completion.suffix(), Some("ow"));
        assert!(!Completion::for_buffer("identity show").is_some());
    }

    #[test]
    fn test_full_list_for_command() {
        assert_eq!(full_list("vault"), vec!["encrypt", "decrypt"]);
        assert_eq!(full_list("vault enc"), vec!["encrypt", "decrypt"]);
        assert!(full_list("vault encrypt extra").is_empty());
        assert!(full_list("help").is_empty());
        assert!(full_list("nope").is_empty());
        assert!(full_list("   ").is_empty());
    }

    #[test]
    fn test_theme_arguments_match_theme_table() {
        let spec = find_command("theme").unwrap();
        let mut expected = vec!["list"];
        expected.extend(THEMES.iter().map(|t| t.id));
        assert_eq!(spec.args.to_vec(), expected);
    }
}
