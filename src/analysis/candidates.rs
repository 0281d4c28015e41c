use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CandidateError {
    #[error("Line {line}: expected `Class::method`, found `{text}`")]
    Malformed { line: usize, text: String },
}

/// A dead-code finding reported by the host analyzer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub class: String,
    pub method: String,
}

impl Candidate {
    pub fn new(class: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            method: method.into(),
        }
    }

    /// Parse `Class::method`; a trailing `()` is tolerated
    pub fn parse(text: &str) -> Option<Self> {
        let (class, method) = text.trim().rsplit_once("::")?;
        let method = method.trim_end_matches("()");
        let class = class.trim_start_matches('\\');

        if class.is_empty() || method.is_empty() || method.contains(char::is_whitespace) {
            return None;
        }

        Some(Self::new(class, method))
    }
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.class, self.method)
    }
}

/// One finding per line; blank lines and `#` comments are skipped
pub fn parse_candidates(contents: &str) -> Result<Vec<Candidate>, CandidateError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(i, line)| {
            Candidate::parse(line).ok_or_else(|| CandidateError::Malformed {
                line: i + 1,
                text: line.trim().to_string(),
            })
        })
        .collect()
}
