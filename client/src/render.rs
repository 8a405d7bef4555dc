use crate::client::Decision;
use crate::settings::ProbabilityFormat;

pub fn as_percent(p: f64) -> String {
    if p.is_finite() {
        format!("{:.2} %", 100.0 * p)
    } else {
        "N/A".to_string()
    }
}

pub fn format_probability(p: f64, format: ProbabilityFormat) -> String {
    match format {
        ProbabilityFormat::Percent => as_percent(p),
        ProbabilityFormat::Decimal => format!("{p:.4}"),
    }
}

/// Labels that count as an approval across the artifacts we have shipped
/// ("Approved", 1, true, "yes").
pub fn is_approved(label: &str) -> bool {
    matches!(
        label.trim().to_lowercase().as_str(),
        "1" | "approved" | "true" | "yes"
    )
}

pub fn render_decision(decision: &Decision, format: ProbabilityFormat) -> String {
    let mut lines = vec!["Decision received".to_string()];
    if let Some(p) = decision.probability {
        lines.push(format!("Probability: {}", format_probability(p, format)));
    }
    if is_approved(&decision.label()) {
        lines.push("Loan Approved!".to_string());
    } else {
        lines.push("Loan Not Approved.".to_string());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn percent_has_two_decimals() {
        assert_eq!(as_percent(0.935), "93.50 %");
        assert_eq!(as_percent(1.0), "100.00 %");
        assert_eq!(as_percent(f64::NAN), "N/A");
    }

    #[test]
    fn decimal_has_four_decimals() {
        assert_eq!(format_probability(0.8925, ProbabilityFormat::Decimal), "0.8925");
        assert_eq!(format_probability(0.5, ProbabilityFormat::Decimal), "0.5000");
    }

    #[test]
    fn approval_labels_are_loose() {
        for label in ["Approved", " approved ", "1", "TRUE", "Yes"] {
            assert!(is_approved(label), "{label}");
        }
        for label in ["Rejected", "0", "no", ""] {
            assert!(!is_approved(label), "{label}");
        }
    }

    #[test]
    fn renders_approval() {
        let decision = Decision {
            approved: json!("Approved"),
            probability: Some(0.935),
        };
        assert_eq!(
            render_decision(&decision, ProbabilityFormat::Percent),
            "Decision received\nProbability: 93.50 %\nLoan Approved!"
        );
    }

    #[test]
    fn renders_rejection_without_probability() {
        let decision = Decision {
            approved: json!("Rejected"),
            probability: None,
        };
        assert_eq!(
            render_decision(&decision, ProbabilityFormat::Decimal),
            "Decision received\nLoan Not Approved."
        );
    }
}
