//! Structured answers
//!
//! Types for what the model is instructed to emit, the parser that
//! recovers them from free-form output, the prompt templates, and the
//! advisor composing retrieval and generation into the two user flows.

pub mod advisor;
pub mod parser;
pub mod prompt;

pub use advisor::{Advisor, AskOutcome, Classification, GenerationMeta, UnmeteredGate, UsageGate};
pub use parser::{parse_answer, try_parse_answer};

use serde::{Serialize, Serializer};

/// Fixed account-category codes
///
/// The set is closed; any code the model invents outside it is
/// normalized to [`CategoryCode::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryCode {
    Entertainment,
    Welfare,
    Supplies,
    Vehicle,
    Communication,
    Rent,
    Advertising,
    Fees,
    Education,
    Equipment,
    Travel,
    Insurance,
    Taxes,
    Depreciation,
    Other,
    NonDeductible,
}

impl CategoryCode {
    pub const ALL: [CategoryCode; 16] = [
        CategoryCode::Entertainment,
        CategoryCode::Welfare,
        CategoryCode::Supplies,
        CategoryCode::Vehicle,
        CategoryCode::Communication,
        CategoryCode::Rent,
        CategoryCode::Advertising,
        CategoryCode::Fees,
        CategoryCode::Education,
        CategoryCode::Equipment,
        CategoryCode::Travel,
        CategoryCode::Insurance,
        CategoryCode::Taxes,
        CategoryCode::Depreciation,
        CategoryCode::Other,
        CategoryCode::NonDeductible,
    ];

    /// Wire code, as the model is instructed to emit it
    pub fn code(&self) -> &'static str {
        match self {
            CategoryCode::Entertainment => "ENT",
            CategoryCode::Welfare => "WEL",
            CategoryCode::Supplies => "SUP",
            CategoryCode::Vehicle => "VEH",
            CategoryCode::Communication => "COM",
            CategoryCode::Rent => "RNT",
            CategoryCode::Advertising => "ADV",
            CategoryCode::Fees => "FEE",
            CategoryCode::Education => "EDU",
            CategoryCode::Equipment => "EQP",
            CategoryCode::Travel => "TRV",
            CategoryCode::Insurance => "INS",
            CategoryCode::Taxes => "TAX",
            CategoryCode::Depreciation => "DEP",
            CategoryCode::Other => "OTH",
            CategoryCode::NonDeductible => "NON",
        }
    }

    /// Korean display name
    pub fn label(&self) -> &'static str {
        match self {
            CategoryCode::Entertainment => "접대비",
            CategoryCode::Welfare => "복리후생비",
            CategoryCode::Supplies => "소모품비",
            CategoryCode::Vehicle => "차량유지비",
            CategoryCode::Communication => "통신비",
            CategoryCode::Rent => "임차료",
            CategoryCode::Advertising => "광고선전비",
            CategoryCode::Fees => "지급수수료",
            CategoryCode::Education => "교육훈련비",
            CategoryCode::Equipment => "비품",
            CategoryCode::Travel => "여비교통비",
            CategoryCode::Insurance => "보험료",
            CategoryCode::Taxes => "세금과공과",
            CategoryCode::Depreciation => "감가상각비",
            CategoryCode::Other => "기타",
            CategoryCode::NonDeductible => "비용처리불가",
        }
    }

    /// Look up a code case-insensitively; `None` for anything unknown
    pub fn from_code(code: &str) -> Option<CategoryCode> {
        let upper = code.trim().to_uppercase();
        Self::ALL.iter().copied().find(|c| c.code() == upper)
    }
}

impl Serialize for CategoryCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl std::fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Structured answer recovered from model output
///
/// `answer` is always present (the raw text at worst); every other field
/// is best-effort.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedAnswer {
    pub answer: String,
    pub is_deductible: Option<bool>,
    pub category_code: Option<CategoryCode>,
    pub confidence: Option<f32>,
    pub legal_basis: Option<String>,
}

impl ParsedAnswer {
    /// Passthrough answer with no structured fields
    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            answer: text.into(),
            is_deductible: None,
            category_code: None,
            confidence: None,
            legal_basis: None,
        }
    }
}
