use rand::Rng;
use rand::distributions::Alphanumeric;

pub const DEFAULT_TITLE: &str = "MBC-20 inscription";
const SUFFIX_LEN: usize = 10;

/// Builds post titles of the form `base (agent) [suffix]`.
///
/// The random suffix keeps consecutive titles distinct.
#[derive(Debug, Clone)]
pub struct TitleBuilder {
    base: String,
    agent: Option<String>,
}

impl TitleBuilder {
    /// `title` is cut at the first `[` so a previously suffixed title can be
    /// reused as a base.
    pub fn new(title: &str, agent_label: &str) -> Self {
        let base = title.split('[').next().unwrap_or_default().trim();
        let base = if base.is_empty() { DEFAULT_TITLE } else { base };
        let agent = agent_label.trim();
        Self {
            base: base.to_string(),
            agent: (!agent.is_empty()).then(|| agent.to_string()),
        }
    }

    pub fn build(&self) -> String {
        format!("{} [{}]", self.stem(), random_suffix(SUFFIX_LEN))
    }

    fn stem(&self) -> String {
        match &self.agent {
            Some(agent) => format!("{} ({agent})", self.base),
            None => self.base.clone(),
        }
    }
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suffix_of(title: &str) -> &str {
        let start = title.rfind('[').unwrap();
        &title[start + 1..title.len() - 1]
    }

    #[test]
    fn test_title_with_agent() {
        let title = TitleBuilder::new("Claw drop", "reef-bot").build();
        assert!(title.starts_with("Claw drop (reef-bot) ["));
        let suffix = suffix_of(&title);
        assert_eq!(suffix.len(), 10);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_title_strips_previous_suffix() {
        let title = TitleBuilder::new("Claw drop [abc123]", "").build();
        assert!(title.starts_with("Claw drop ["));
        assert_eq!(title.matches('[').count(), 1);
    }

    #[test]
    fn test_title_default_base() {
        let title = TitleBuilder::new("   ", "").build();
        assert!(title.starts_with("MBC-20 inscription ["));
    }
}
