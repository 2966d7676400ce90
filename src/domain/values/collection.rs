use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The independently configured indexes served by the lookup service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Whole documents, answering "tell me about this title".
    Intro,
    /// Chunked documents whose metadata names the title they belong to.
    FindName,
}

impl Collection {
    pub const ALL: [Collection; 2] = [Collection::Intro, Collection::FindName];

    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Intro => "intro.gidx",
            Collection::FindName => "findname.gidx",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Intro => write!(f, "intro"),
            Collection::FindName => write!(f, "findname"),
        }
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "intro" => Ok(Collection::Intro),
            "findname" | "find_name" | "find-name" => Ok(Collection::FindName),
            _ => Err(format!("Unknown collection: {s}")),
        }
    }
}
