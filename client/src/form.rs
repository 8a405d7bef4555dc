//! The guided applicant form. Flag bounds mirror the service's field rules so
//! a form submission is always in range; raw JSON is the way to send anything
//! else.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Education {
    #[value(name = "graduate")]
    Graduate,
    #[value(name = "not-graduate")]
    #[serde(rename = "Not Graduate")]
    NotGraduate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum SelfEmployed {
    #[value(name = "yes")]
    Yes,
    #[value(name = "no")]
    No,
}

fn bounded(
    min: f64,
    max: f64,
) -> impl Fn(&str) -> Result<f64, String> + Clone + Send + Sync + 'static {
    move |raw: &str| {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("{raw:?} is not a number"))?;
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(format!("must be between {min} and {max}"))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Args, Serialize, Deserialize)]
pub struct ApplicantForm {
    /// Number of dependents.
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..=5))]
    pub no_of_dependents: i64,

    #[arg(long, value_enum, default_value_t = Education::Graduate)]
    pub education: Education,

    #[arg(long, value_enum, default_value_t = SelfEmployed::Yes)]
    #[serde(rename = "selfEmployed")]
    pub self_employed: SelfEmployed,

    /// Annual income.
    #[arg(long, default_value_t = 200_000.0, value_parser = bounded(200_000.0, 9_900_000.0))]
    #[serde(rename = "incomeAnnum")]
    pub income_annum: f64,

    #[arg(long, default_value_t = 300_000.0, value_parser = bounded(300_000.0, 39_500_000.0))]
    #[serde(rename = "loanAmount")]
    pub loan_amount: f64,

    /// Loan term in years.
    #[arg(long, default_value_t = 2.0, value_parser = bounded(2.0, 20.0))]
    #[serde(rename = "loanTerm")]
    pub loan_term: f64,

    /// CIBIL credit score.
    #[arg(long, default_value_t = 300.0, value_parser = bounded(300.0, 900.0))]
    #[serde(rename = "cibilScore")]
    pub cibil_score: f64,

    #[arg(
        long,
        default_value_t = -100_000.0,
        allow_negative_numbers = true,
        value_parser = bounded(-100_000.0, 29_100_000.0)
    )]
    #[serde(rename = "residentialAssetsValue")]
    pub residential_assets_value: f64,

    #[arg(long, default_value_t = 0.0, value_parser = bounded(0.0, 19_400_000.0))]
    #[serde(rename = "commercialAssetsValue")]
    pub commercial_assets_value: f64,

    #[arg(long, default_value_t = 300_000.0, value_parser = bounded(300_000.0, 39_200_000.0))]
    #[serde(rename = "luxuryAssetsValue")]
    pub luxury_assets_value: f64,

    #[arg(long, default_value_t = 0.0, value_parser = bounded(0.0, 14_700_000.0))]
    #[serde(rename = "bankAssetValue")]
    pub bank_asset_value: f64,
}

impl ApplicantForm {
    /// Request body in the service's wire names.
    pub fn to_payload(&self) -> Value {
        // A struct of scalars always serializes.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Parses the text of the raw JSON tab.
pub fn parse_payload(text: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(text)
}
