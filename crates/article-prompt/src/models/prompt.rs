/// Instruction run against each chunk, plus the one used to merge chunk answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub prompt: String,
    pub combination_prompt: Option<String>,
}

impl PromptSpec {
    pub fn new(prompt: impl Into<String>, combination_prompt: Option<String>) -> Self {
        Self {
            prompt: prompt.into(),
            combination_prompt,
        }
    }

    /// Combination prompt, ignoring blank values
    pub fn combination(&self) -> Option<&str> {
        self.combination_prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Build from a free-text prompt, borrowing the combination prompt of a
    /// canned entry with the same text when none is given.
    pub fn from_prompt(prompt: impl Into<String>, combination_prompt: Option<String>) -> Self {
        let prompt = prompt.into();
        let combination_prompt = combination_prompt
            .filter(|p| !p.trim().is_empty())
            .or_else(|| CannedPrompt::find(&prompt).map(|c| c.combination_prompt.to_string()));

        Self::new(prompt, combination_prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CannedPrompt {
    pub prompt: &'static str,
    pub combination_prompt: &'static str,
}

pub const CANNED_PROMPTS: &[CannedPrompt] = &[
    CannedPrompt {
        prompt: "Summarize this",
        combination_prompt: "Combine these summaries into an overall summary",
    },
    CannedPrompt {
        prompt: "List 10 key takeaways",
        combination_prompt: "Combine these takeaways into an overall list of 10 key takeaways",
    },
    CannedPrompt {
        prompt: "List all entities, grouped by type or category",
        combination_prompt: "Combine these lists of entities, but preserve the grouping",
    },
    CannedPrompt {
        prompt: "Write an abstract for this",
        combination_prompt: "Write an abstract for this",
    },
];

impl CannedPrompt {
    pub fn find(prompt: &str) -> Option<&'static CannedPrompt> {
        let prompt = prompt.trim();
        CANNED_PROMPTS.iter().find(|c| c.prompt.eq_ignore_ascii_case(prompt))
    }

    /// 1-based lookup, matching the menu numbering
    pub fn by_choice(choice: usize) -> Option<&'static CannedPrompt> {
        choice.checked_sub(1).and_then(|i| CANNED_PROMPTS.get(i))
    }

    pub fn to_spec(&self) -> PromptSpec {
        PromptSpec::new(self.prompt, Some(self.combination_prompt.to_string()))
    }
}
