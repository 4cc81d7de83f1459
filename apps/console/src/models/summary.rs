use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

const UNSPECIFIED: &str = "unspecified";

fn unspecified() -> String {
    UNSPECIFIED.to_string()
}

/// A skill from the job description found in the résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SkillMatchWire")]
pub struct SkillMatch {
    pub skill: String,
    pub match_type: String,
}

// The evaluation service emits either bare strings or objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum SkillMatchWire {
    Bare(String),
    Full {
        skill: String,
        #[serde(default = "unspecified", alias = "matchType")]
        match_type: String,
    },
}

impl From<SkillMatchWire> for SkillMatch {
    fn from(wire: SkillMatchWire) -> Self {
        match wire {
            SkillMatchWire::Bare(skill) => SkillMatch {
                skill,
                match_type: unspecified(),
            },
            SkillMatchWire::Full { skill, match_type } => SkillMatch { skill, match_type },
        }
    }
}

/// A skill from the job description absent from the résumé.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MissingSkillWire")]
pub struct MissingSkill {
    pub skill: String,
    pub priority: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MissingSkillWire {
    Bare(String),
    Full {
        skill: String,
        #[serde(default = "unspecified")]
        priority: String,
    },
}

impl From<MissingSkillWire> for MissingSkill {
    fn from(wire: MissingSkillWire) -> Self {
        match wire {
            MissingSkillWire::Bare(skill) => MissingSkill {
                skill,
                priority: unspecified(),
            },
            MissingSkillWire::Full { skill, priority } => MissingSkill { skill, priority },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
}

/// Coarse score set for one file of a batch. Detail fields stay `None`
/// until the record is expanded for the first time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummaryRecord {
    pub file_name: String,
    pub final_score: f64,
    pub embedding_similarity: f64,
    pub keyword_score: f64,
    #[serde(default)]
    pub llm_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_skills: Option<Vec<SkillMatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_skills: Option<Vec<MissingSkill>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Assessment>,
}

impl EvaluationSummaryRecord {
    /// Overwrites the detail fields only. Scores computed by the summary
    /// call are left as they are, and a detail without `llm_score` keeps the
    /// one the summary already carried.
    pub fn merge_detail(&mut self, detail: &SkillDetail) {
        if detail.llm_score.is_some() {
            self.llm_score = detail.llm_score;
        }
        self.matched_skills = Some(detail.matched_skills.clone());
        self.missing_skills = Some(detail.missing_skills.clone());
        if let Some(assessment) = &detail.assessment {
            self.assessment = Some(assessment.clone());
        }
    }
}

/// Body of the batch summary call.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryResponse {
    #[serde(default)]
    pub results: Vec<EvaluationSummaryRecord>,
    /// Everything else the service sent, rendered untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of the skill detail call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SkillDetail {
    #[serde(default)]
    pub llm_score: Option<f64>,
    #[serde(default)]
    pub matched_skills: Vec<SkillMatch>,
    #[serde(default)]
    pub missing_skills: Vec<MissingSkill>,
    #[serde(default)]
    pub assessment: Option<Assessment>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SkillDetail {
    /// Turns an in-payload error indicator into a `PartialData` error.
    pub fn into_result(self) -> Result<Self, AppError> {
        match self.error.as_deref().map(str::trim) {
            Some(message) if !message.is_empty() => Err(AppError::PartialData(message.to_string())),
            _ => Ok(self),
        }
    }
}
