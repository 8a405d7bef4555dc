use std::time::Duration;

use clap::{Args, ValueEnum};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const PREDICT_PATH: &str = "/api/loan/v1/predict";
pub const MIN_TIMEOUT_SECS: u64 = 2;
pub const MAX_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProbabilityFormat {
    #[default]
    Percent,
    Decimal,
}

/// Connection and presentation settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ClientSettings {
    /// Base URL of the prediction service.
    #[arg(long, env = "LOAN_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Request timeout in seconds.
    #[arg(
        long = "timeout",
        env = "LOAN_API_TIMEOUT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS),
        global = true
    )]
    pub timeout_secs: u64,

    /// How to print the probability of the decision.
    #[arg(
        long = "show-prob-as",
        env = "LOAN_PROBABILITY_FORMAT",
        value_enum,
        default_value_t = ProbabilityFormat::Percent,
        global = true
    )]
    pub probability_format: ProbabilityFormat,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 10,
            probability_format: ProbabilityFormat::Percent,
        }
    }
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn predict_url(&self) -> String {
        format!("{}{}", self.base_url(), PREDICT_PATH)
    }

    pub fn preview_url(&self) -> String {
        format!("{}/", self.base_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        settings: ClientSettings,
    }

    #[test]
    fn urls_ignore_trailing_slash() {
        let settings = ClientSettings {
            api_url: "http://loans.internal:9000/".into(),
            ..ClientSettings::default()
        };
        assert_eq!(
            settings.predict_url(),
            "http://loans.internal:9000/api/loan/v1/predict"
        );
        assert_eq!(settings.preview_url(), "http://loans.internal:9000/");
    }

    #[test]
    fn timeout_is_bounded() {
        assert!(Harness::try_parse_from(["t", "--timeout", "1"]).is_err());
        assert!(Harness::try_parse_from(["t", "--timeout", "31"]).is_err());
        let ok = Harness::try_parse_from(["t", "--timeout", "30"]).unwrap();
        assert_eq!(ok.settings.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn parses_probability_format() {
        let parsed = Harness::try_parse_from(["t", "--show-prob-as", "decimal"]).unwrap();
        assert_eq!(parsed.settings.probability_format, ProbabilityFormat::Decimal);
    }
}
