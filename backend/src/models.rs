use serde::{Deserialize, Serialize};

use crate::validation::FieldViolation;

/// Column names a pipeline artifact may reference, in the order the
/// applicant record is laid out.
pub const FEATURE_NAMES: [&str; 11] = [
    "no_of_dependents",
    "education",
    "self_employed",
    "income_annum",
    "loan_amount",
    "loan_term",
    "cibil_score",
    "residential_assets_value",
    "commercial_assets_value",
    "luxury_assets_value",
    "bank_asset_value",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Education {
    Graduate,
    #[serde(rename = "Not Graduate")]
    NotGraduate,
}

impl Education {
    pub const VARIANTS: [&'static str; 2] = ["Graduate", "Not Graduate"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Education::Graduate => "Graduate",
            Education::NotGraduate => "Not Graduate",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Graduate" => Some(Education::Graduate),
            "Not Graduate" => Some(Education::NotGraduate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfEmployed {
    Yes,
    No,
}

impl SelfEmployed {
    pub const VARIANTS: [&'static str; 2] = ["Yes", "No"];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelfEmployed::Yes => "Yes",
            SelfEmployed::No => "No",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Yes" => Some(SelfEmployed::Yes),
            "No" => Some(SelfEmployed::No),
            _ => None,
        }
    }
}

/// A validated applicant record. Only [`crate::validation::validate_application`]
/// builds one from untrusted input, so every value is inside its declared range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanApplication {
    pub no_of_dependents: i64,
    pub education: Education,
    #[serde(rename = "selfEmployed")]
    pub self_employed: SelfEmployed,
    #[serde(rename = "incomeAnnum")]
    pub income_annum: f64,
    #[serde(rename = "loanAmount")]
    pub loan_amount: f64,
    #[serde(rename = "loanTerm")]
    pub loan_term: f64,
    #[serde(rename = "cibilScore")]
    pub cibil_score: f64,
    #[serde(rename = "residentialAssetsValue")]
    pub residential_assets_value: f64,
    #[serde(rename = "commercialAssetsValue")]
    pub commercial_assets_value: f64,
    #[serde(rename = "luxuryAssetsValue")]
    pub luxury_assets_value: f64,
    #[serde(rename = "bankAssetValue")]
    pub bank_asset_value: f64,
}

/// Raw value of one applicant column as the pipeline encoders see it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Number(f64),
    Category(&'a str),
}

impl LoanApplication {
    pub fn feature(&self, name: &str) -> Option<FeatureValue<'_>> {
        let value = match name {
            "no_of_dependents" => FeatureValue::Number(self.no_of_dependents as f64),
            "education" => FeatureValue::Category(self.education.as_str()),
            "self_employed" => FeatureValue::Category(self.self_employed.as_str()),
            "income_annum" => FeatureValue::Number(self.income_annum),
            "loan_amount" => FeatureValue::Number(self.loan_amount),
            "loan_term" => FeatureValue::Number(self.loan_term),
            "cibil_score" => FeatureValue::Number(self.cibil_score),
            "residential_assets_value" => FeatureValue::Number(self.residential_assets_value),
            "commercial_assets_value" => FeatureValue::Number(self.commercial_assets_value),
            "luxury_assets_value" => FeatureValue::Number(self.luxury_assets_value),
            "bank_asset_value" => FeatureValue::Number(self.bank_asset_value),
            _ => return None,
        };
        Some(value)
    }
}

/// Body of a successful `POST /api/loan/v1/predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub approved: String,
    pub probability: f64,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detail: Vec<FieldViolation>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        ErrorResponse {
            success: false,
            error: message.to_string(),
            detail: Vec::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_detail(message: &str, detail: Vec<FieldViolation>) -> Self {
        ErrorResponse {
            detail,
            ..ErrorResponse::new(message)
        }
    }
}
