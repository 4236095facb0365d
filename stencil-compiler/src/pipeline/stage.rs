//! Pipeline stages.

use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigError;

/// A named phase of the pipeline owning its own ordered plugin list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Transforms run over the parsed template AST.
    Ast,
}

impl Stage {
    /// Every known stage, in execution order.
    pub const ALL: [Stage; 1] = [Stage::Ast];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Ast => "ast",
        }
    }

    fn known() -> String {
        Stage::ALL
            .iter()
            .map(Stage::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownStage {
                stage: s.to_string(),
                known: Stage::known(),
            })
    }
}
