//! Slash commands typed into the chat input

use helix_core::Suggestion;

/// Available slash commands with descriptions
pub const COMMANDS: &[(&str, &str)] = &[
    ("/meeting", "Add meeting link to the sequence"),
    ("/docs", "Add documents"),
    ("/image", "Attach an image (no path clears it)"),
    ("/regenerate", "Regenerate a response"),
    ("/mode", "Toggle a search mode"),
    ("/new", "Create a new sequence"),
    ("/save", "Save the active sequence"),
    ("/copy", "Copy the active sequence"),
    ("/sequences", "Browse saved sequences"),
    ("/help", "Show available commands"),
    ("/exit", "Exit helix"),
];

/// Parsed slash command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    /// Quick-insert suggestion; carries the rest of the line
    Suggest(Suggestion, String),
    /// Attach an image, or clear the attachment when `None`
    Image(Option<String>),
    /// Regenerate the message with this display number, or the last reply
    Regenerate(Option<usize>),
    Mode(String),
    NewSequence,
    Save,
    Copy,
    Sequences,
    Help,
    Exit,
    Usage(&'static str),
    Unknown(String),
}

/// Parse a line starting with `/`
pub fn parse(input: &str) -> SlashCommand {
    let input = input.trim();
    let (cmd, rest) = match input.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (input, ""),
    };

    if let Some(suggestion) = Suggestion::from_command(cmd) {
        return SlashCommand::Suggest(suggestion, rest.to_string());
    }

    match cmd {
        "/image" => SlashCommand::Image((!rest.is_empty()).then(|| rest.to_string())),
        "/regenerate" | "/regen" => {
            if rest.is_empty() {
                SlashCommand::Regenerate(None)
            } else {
                match rest.parse::<usize>() {
                    Ok(n) if n > 0 => SlashCommand::Regenerate(Some(n)),
                    _ => SlashCommand::Usage("/regenerate [message number]"),
                }
            }
        }
        "/mode" => {
            if rest.is_empty() {
                SlashCommand::Usage("/mode <roles|skills|custom|open>")
            } else {
                SlashCommand::Mode(rest.to_string())
            }
        }
        "/new" => SlashCommand::NewSequence,
        "/save" => SlashCommand::Save,
        "/copy" => SlashCommand::Copy,
        "/sequences" => SlashCommand::Sequences,
        "/help" | "/?" => SlashCommand::Help,
        "/exit" | "/quit" => SlashCommand::Exit,
        _ => SlashCommand::Unknown(cmd.to_string()),
    }
}

/// Commands whose name starts with the typed prefix
pub fn matching(prefix: &str) -> Vec<(&'static str, &'static str)> {
    if !prefix.starts_with('/') {
        return vec![];
    }
    COMMANDS
        .iter()
        .filter(|(cmd, _)| cmd.starts_with(prefix))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suggestions_with_rest() {
        assert_eq!(
            parse("/docs the job description"),
            SlashCommand::Suggest(Suggestion::Docs, "the job description".into())
        );
        assert_eq!(
            parse("/meeting"),
            SlashCommand::Suggest(Suggestion::Meeting, String::new())
        );
    }

    #[test]
    fn parses_arguments() {
        assert_eq!(parse("/image ~/cv.png"), SlashCommand::Image(Some("~/cv.png".into())));
        assert_eq!(parse("/image"), SlashCommand::Image(None));
        assert_eq!(parse("/regenerate 4"), SlashCommand::Regenerate(Some(4)));
        assert_eq!(parse("/regenerate"), SlashCommand::Regenerate(None));
        assert!(matches!(parse("/regenerate zero"), SlashCommand::Usage(_)));
        assert!(matches!(parse("/regenerate 0"), SlashCommand::Usage(_)));
        assert_eq!(parse("/mode open"), SlashCommand::Mode("open".into()));
        assert!(matches!(parse("/mode"), SlashCommand::Usage(_)));
    }

    #[test]
    fn parses_simple_and_unknown() {
        assert_eq!(parse("/save"), SlashCommand::Save);
        assert_eq!(parse("  /exit  "), SlashCommand::Exit);
        assert_eq!(parse("/frobnicate now"), SlashCommand::Unknown("/frobnicate".into()));
    }

    #[test]
    fn autocomplete_matches_prefix() {
        let names: Vec<_> = matching("/s").into_iter().map(|(c, _)| c).collect();
        assert_eq!(names, vec!["/save", "/sequences"]);
        assert!(matching("hello").is_empty());
        assert_eq!(matching("/").len(), COMMANDS.len());
    }
}
