//! Canned prompts: welcome templates and input suggestions

/// Welcome-screen prompt template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub prompt: &'static str,
}

pub const WELCOME_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        title: "Senior Engineers",
        description: "Create sequence for experienced engineers",
        prompt: "Create an outreach sequence for senior software engineers with 5+ years of experience. Focus on technical growth and challenging projects.",
    },
    PromptTemplate {
        title: "Product Leaders",
        description: "Engage product management candidates",
        prompt: "Generate a sequence for senior product managers who have led B2B SaaS products. Emphasize product strategy and team leadership.",
    },
    PromptTemplate {
        title: "Sales Leaders",
        description: "Connect with sales professionals",
        prompt: "Write an outreach sequence for enterprise sales leaders with experience in technology sales. Focus on growth opportunities and commission structure.",
    },
];

/// "Start from scratch" entry shown below the templates
pub const CUSTOM_TEMPLATE: PromptTemplate = PromptTemplate {
    title: "Create Custom Sequence",
    description: "or start from scratch",
    prompt: "Create a personalized outreach sequence for recruiting candidates. Let me describe the role and requirements.",
};

/// Template at a welcome-view position; the custom entry comes last
pub fn welcome_choice(index: usize) -> Option<&'static PromptTemplate> {
    WELCOME_TEMPLATES.get(index).or(if index == WELCOME_TEMPLATES.len() {
        Some(&CUSTOM_TEMPLATE)
    } else {
        None
    })
}

/// Number of selectable welcome entries
pub fn welcome_choice_count() -> usize {
    WELCOME_TEMPLATES.len() + 1
}

/// Quick-insert suggestion under the chat input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suggestion {
    Meeting,
    Docs,
}

pub const MEETING_PROMPT: &str =
    "Please add this meeting link to the email sequence: https://calendly.com/your-org";

impl Suggestion {
    pub const ALL: [Suggestion; 2] = [Suggestion::Meeting, Suggestion::Docs];

    pub fn command(&self) -> &'static str {
        match self {
            Self::Meeting => "/meeting",
            Self::Docs => "/docs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Meeting => "Add Meeting Link",
            Self::Docs => "Add Documents",
        }
    }

    pub fn from_command(cmd: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.command() == cmd)
    }

    /// Text to send when the suggestion is used with the current input
    pub fn apply(&self, input: &str) -> String {
        match self {
            Self::Meeting => MEETING_PROMPT.to_string(),
            Self::Docs => format!("{} {}", input, self.command()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_choices_end_with_custom() {
        assert_eq!(welcome_choice_count(), 4);
        assert_eq!(welcome_choice(0).unwrap().title, "Senior Engineers");
        assert_eq!(welcome_choice(3), Some(&CUSTOM_TEMPLATE));
        assert!(welcome_choice(4).is_none());
    }

    #[test]
    fn suggestions_build_send_text() {
        assert_eq!(Suggestion::Meeting.apply("ignored"), MEETING_PROMPT);
        assert_eq!(Suggestion::Docs.apply("Attach the JD"), "Attach the JD /docs");
        assert_eq!(Suggestion::from_command("/docs"), Some(Suggestion::Docs));
        assert_eq!(Suggestion::from_command("/nope"), None);
    }
}
