use serde::Serialize;
use unicode_segmentation::UnicodeSegmentation;

const MAX_GRAPHEMES: usize = 140;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanName(String);

impl PlanName {
    pub fn parse(s: String) -> Result<PlanName, String> {
        match s {
            _ if s.trim().is_empty() => Err(format!(
                "Plan name is empty or contains whitespace only: `{s}`"
            )),
            _ if s.graphemes(true).count() > MAX_GRAPHEMES => {
                Err(format!("`{s}` is longer than {MAX_GRAPHEMES} graphemes"))
            }
            _ => Ok(Self(s)),
        }
    }
}

impl AsRef<str> for PlanName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
