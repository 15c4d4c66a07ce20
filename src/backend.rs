#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Gpt,
    Gemini,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Gpt => "gpt",
            Backend::Gemini => "gemini",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gpt" => Some(Backend::Gpt),
            "gemini" => Some(Backend::Gemini),
            _ => None,
        }
    }

    pub fn all() -> Vec<Backend> {
        vec![Backend::Gpt, Backend::Gemini]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Gpt => "GPT (OpenAI)",
            Backend::Gemini => "Gemini (Google)",
        }
    }

    /// The other backend. There are exactly two, so selection in the UI
    /// is a toggle rather than a picker.
    pub fn toggled(&self) -> Backend {
        match self {
            Backend::Gpt => Backend::Gemini,
            Backend::Gemini => Backend::Gpt,
        }
    }
}
