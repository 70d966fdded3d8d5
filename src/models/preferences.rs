//! Per-registration preference payloads and their stored representation.
//!
//! Each policy understands one payload variant. The payload is stored as a
//! short type code plus a JSON body:
//!
//! | code   | variant          | body                          |
//! |--------|------------------|-------------------------------|
//! | `user` | `Empty`          | ignored (`{}` when written)   |
//! | `pref` | `Preferred`      | `{"preferred": ["ident", …]}` |
//! | `sbel` | `Questionnaire`  | `{"answers": [0, 3, …]}`      |

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Answer value: strongly disagree.
pub const STRONGLY_DISAGREE: u8 = 0;
/// Answer value: disagree.
pub const DISAGREE: u8 = 1;
/// Answer value: agree.
pub const AGREE: u8 = 2;
/// Answer value: strongly agree.
pub const STRONGLY_AGREE: u8 = 3;
/// Number of answers in a questionnaire.
pub const QUESTIONNAIRE_ANSWER_COUNT: usize = 8;

/// Preferred peers, named by their ident.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferredPreferences {
    /// Idents of the wanted peers, most wanted first.
    pub preferred: Vec<String>,
}

/// Questionnaire answers, each in `STRONGLY_DISAGREE..=STRONGLY_AGREE`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionnairePreferences {
    /// Answer values in question order.
    pub answers: Vec<u8>,
}

impl QuestionnairePreferences {
    /// Returns the answers if there are exactly
    /// [`QUESTIONNAIRE_ANSWER_COUNT`] of them, all in range.
    pub fn well_formed(&self) -> Option<[u8; QUESTIONNAIRE_ANSWER_COUNT]> {
        let answers: [u8; QUESTIONNAIRE_ANSWER_COUNT] = self.answers.as_slice().try_into().ok()?;
        answers
            .iter()
            .all(|&a| a <= STRONGLY_AGREE)
            .then_some(answers)
    }
}

/// Policy-specific preference payload of a registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserPreferences {
    /// No preferences (random and identity policies).
    #[default]
    Empty,
    /// Preferred peers.
    Preferred(PreferredPreferences),
    /// Questionnaire answers.
    Questionnaire(QuestionnairePreferences),
}

impl UserPreferences {
    /// Creates a preferred-peers payload.
    pub fn preferred<I, S>(idents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Preferred(PreferredPreferences {
            preferred: idents.into_iter().map(Into::into).collect(),
        })
    }

    /// Creates a questionnaire payload.
    pub fn questionnaire(answers: impl Into<Vec<u8>>) -> Self {
        Self::Questionnaire(QuestionnairePreferences {
            answers: answers.into(),
        })
    }

    /// Stored type code of this payload.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty => "user",
            Self::Preferred(_) => "pref",
            Self::Questionnaire(_) => "sbel",
        }
    }

    /// Encodes into `(code, body)`.
    pub fn encode(&self) -> Result<(&'static str, String)> {
        let body = match self {
            Self::Empty => "{}".to_string(),
            Self::Preferred(p) => serde_json::to_string(p)?,
            Self::Questionnaire(q) => serde_json::to_string(q)?,
        };
        Ok((self.code(), body))
    }

    /// Decodes a stored `(code, body)` pair.
    pub fn decode(code: &str, body: &str) -> Result<Self> {
        match code {
            "user" => Ok(Self::Empty),
            "pref" => Ok(Self::Preferred(serde_json::from_str(body)?)),
            "sbel" => Ok(Self::Questionnaire(serde_json::from_str(body)?)),
            _ => Err(Error::UnknownPreferenceCode(code.to_string())),
        }
    }
}
