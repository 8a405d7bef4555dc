//! Turns an untyped JSON body into a [`LoanApplication`].
//!
//! Every field is checked even after the first failure so a caller gets the
//! complete list of problems in one round trip.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{Education, LoanApplication, SelfEmployed};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Missing,
    WrongType,
    BelowMinimum,
    AboveMaximum,
    NotInEnum,
    JsonInvalid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &str, kind: ViolationKind, message: impl Into<String>) -> Self {
        FieldViolation {
            field: field.to_string(),
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} field(s) failed validation", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    pub fn new(violations: Vec<FieldViolation>) -> Self {
        ValidationError { violations }
    }

    /// Wire names of the offending fields, in field order.
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

/// Inclusive bounds for one numeric wire field.
#[derive(Debug, Clone, Copy)]
pub struct NumericRule {
    pub field: &'static str,
    pub min: f64,
    pub max: f64,
    pub integer: bool,
}

pub const DEPENDENTS: NumericRule = NumericRule {
    field: "no_of_dependents",
    min: 0.0,
    max: 5.0,
    integer: true,
};
pub const INCOME_ANNUM: NumericRule = NumericRule {
    field: "incomeAnnum",
    min: 200_000.0,
    max: 9_900_000.0,
    integer: false,
};
pub const LOAN_AMOUNT: NumericRule = NumericRule {
    field: "loanAmount",
    min: 300_000.0,
    max: 39_500_000.0,
    integer: false,
};
pub const LOAN_TERM: NumericRule = NumericRule {
    field: "loanTerm",
    min: 2.0,
    max: 20.0,
    integer: false,
};
pub const CIBIL_SCORE: NumericRule = NumericRule {
    field: "cibilScore",
    min: 300.0,
    max: 900.0,
    integer: false,
};
pub const RESIDENTIAL_ASSETS: NumericRule = NumericRule {
    field: "residentialAssetsValue",
    min: -100_000.0,
    max: 29_100_000.0,
    integer: false,
};
pub const COMMERCIAL_ASSETS: NumericRule = NumericRule {
    field: "commercialAssetsValue",
    min: 0.0,
    max: 19_400_000.0,
    integer: false,
};
pub const LUXURY_ASSETS: NumericRule = NumericRule {
    field: "luxuryAssetsValue",
    min: 300_000.0,
    max: 39_200_000.0,
    integer: false,
};
pub const BANK_ASSETS: NumericRule = NumericRule {
    field: "bankAssetValue",
    min: 0.0,
    max: 14_700_000.0,
    integer: false,
};

pub const NUMERIC_RULES: [NumericRule; 9] = [
    DEPENDENTS,
    INCOME_ANNUM,
    LOAN_AMOUNT,
    LOAN_TERM,
    CIBIL_SCORE,
    RESIDENTIAL_ASSETS,
    COMMERCIAL_ASSETS,
    LUXURY_ASSETS,
    BANK_ASSETS,
];

pub fn validate_application(input: &Value) -> Result<LoanApplication, ValidationError> {
    let Some(body) = input.as_object() else {
        return Err(ValidationError::new(vec![FieldViolation::new(
            "body",
            ViolationKind::WrongType,
            "expected a JSON object",
        )]));
    };

    let mut violations = Vec::new();

    let dependents = integer_field(body, &DEPENDENTS, &mut violations);
    let education = enum_field(
        body,
        "education",
        &Education::VARIANTS,
        Education::parse,
        &mut violations,
    );
    let self_employed = enum_field(
        body,
        "selfEmployed",
        &SelfEmployed::VARIANTS,
        SelfEmployed::parse,
        &mut violations,
    );
    let income_annum = number_field(body, &INCOME_ANNUM, &mut violations);
    let loan_amount = number_field(body, &LOAN_AMOUNT, &mut violations);
    let loan_term = number_field(body, &LOAN_TERM, &mut violations);
    let cibil_score = number_field(body, &CIBIL_SCORE, &mut violations);
    let residential = number_field(body, &RESIDENTIAL_ASSETS, &mut violations);
    let commercial = number_field(body, &COMMERCIAL_ASSETS, &mut violations);
    let luxury = number_field(body, &LUXURY_ASSETS, &mut violations);
    let bank = number_field(body, &BANK_ASSETS, &mut violations);

    let application = (|| {
        Some(LoanApplication {
            no_of_dependents: dependents?,
            education: education?,
            self_employed: self_employed?,
            income_annum: income_annum?,
            loan_amount: loan_amount?,
            loan_term: loan_term?,
            cibil_score: cibil_score?,
            residential_assets_value: residential?,
            commercial_assets_value: commercial?,
            luxury_assets_value: luxury?,
            bank_asset_value: bank?,
        })
    })();

    match application {
        Some(application) if violations.is_empty() => Ok(application),
        _ => Err(ValidationError::new(violations)),
    }
}

fn required<'a>(
    body: &'a Map<String, Value>,
    field: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<&'a Value> {
    let value = body.get(field);
    if value.is_none() {
        violations.push(FieldViolation::new(
            field,
            ViolationKind::Missing,
            "field required",
        ));
    }
    value
}

fn check_range(rule: &NumericRule, value: f64, violations: &mut Vec<FieldViolation>) -> bool {
    if value < rule.min {
        violations.push(FieldViolation::new(
            rule.field,
            ViolationKind::BelowMinimum,
            format!("must be >= {}", rule.min),
        ));
        return false;
    }
    if value > rule.max {
        violations.push(FieldViolation::new(
            rule.field,
            ViolationKind::AboveMaximum,
            format!("must be <= {}", rule.max),
        ));
        return false;
    }
    true
}

/// Numbers may arrive as JSON numbers or as numeric strings ("9600000").
fn numeric_value(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    value.filter(|v| v.is_finite())
}

fn number_field(
    body: &Map<String, Value>,
    rule: &NumericRule,
    violations: &mut Vec<FieldViolation>,
) -> Option<f64> {
    let raw = required(body, rule.field, violations)?;
    let Some(value) = numeric_value(raw) else {
        violations.push(FieldViolation::new(
            rule.field,
            ViolationKind::WrongType,
            "expected a number",
        ));
        return None;
    };
    check_range(rule, value, violations).then_some(value)
}

fn integer_field(
    body: &Map<String, Value>,
    rule: &NumericRule,
    violations: &mut Vec<FieldViolation>,
) -> Option<i64> {
    let raw = required(body, rule.field, violations)?;
    // 2, 2.0 and "2" are whole numbers, 2.5 is not. Magnitude is left to the
    // range check so a huge count reads as out of range.
    let Some(value) = numeric_value(raw).filter(|v| v.fract() == 0.0) else {
        violations.push(FieldViolation::new(
            rule.field,
            ViolationKind::WrongType,
            "expected an integer",
        ));
        return None;
    };
    check_range(rule, value, violations).then_some(value as i64)
}

fn enum_field<T>(
    body: &Map<String, Value>,
    field: &str,
    variants: &[&str],
    parse: fn(&str) -> Option<T>,
    violations: &mut Vec<FieldViolation>,
) -> Option<T> {
    let raw = required(body, field, violations)?;
    let Some(text) = raw.as_str() else {
        violations.push(FieldViolation::new(
            field,
            ViolationKind::WrongType,
            "expected a string",
        ));
        return None;
    };
    let parsed = parse(text);
    if parsed.is_none() {
        let allowed = variants
            .iter()
            .map(|v| format!("{v:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        violations.push(FieldViolation::new(
            field,
            ViolationKind::NotInEnum,
            format!("expected one of: {allowed}"),
        ));
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "no_of_dependents": 2,
            "education": "Graduate",
            "selfEmployed": "No",
            "incomeAnnum": 9_600_000.0,
            "loanAmount": 29_900_000.0,
            "loanTerm": 12.0,
            "cibilScore": 778.0,
            "residentialAssetsValue": 2_400_000.0,
            "commercialAssetsValue": 17_600_000.0,
            "luxuryAssetsValue": 22_700_000.0,
            "bankAssetValue": 8_000_000.0
        })
    }

    fn with(field: &str, value: Value) -> Value {
        let mut body = valid_body();
        body[field] = value;
        body
    }

    #[test]
    fn accepts_reference_applicant() {
        let app = validate_application(&valid_body()).unwrap();
        assert_eq!(app.no_of_dependents, 2);
        assert_eq!(app.education, Education::Graduate);
        assert_eq!(app.self_employed, SelfEmployed::No);
        assert_eq!(app.cibil_score, 778.0);
        assert_eq!(app.bank_asset_value, 8_000_000.0);
    }

    #[test]
    fn bounds_are_inclusive() {
        for rule in NUMERIC_RULES {
            for bound in [rule.min, rule.max] {
                let body = if rule.integer {
                    with(rule.field, json!(bound as i64))
                } else {
                    with(rule.field, json!(bound))
                };
                assert!(
                    validate_application(&body).is_ok(),
                    "{} rejected its bound {}",
                    rule.field,
                    bound
                );
            }
        }
    }

    #[test]
    fn one_unit_outside_is_rejected() {
        for rule in NUMERIC_RULES {
            let cases = [
                (rule.min - 1.0, ViolationKind::BelowMinimum),
                (rule.max + 1.0, ViolationKind::AboveMaximum),
            ];
            for (value, kind) in cases {
                let body = if rule.integer {
                    with(rule.field, json!(value as i64))
                } else {
                    with(rule.field, json!(value))
                };
                let err = validate_application(&body).unwrap_err();
                assert_eq!(err.fields(), vec![rule.field]);
                assert_eq!(err.violations[0].kind, kind);
            }
        }
    }

    #[test]
    fn low_credit_score_names_the_field() {
        let err = validate_application(&with("cibilScore", json!(150))).unwrap_err();
        assert_eq!(err.fields(), vec!["cibilScore"]);
        assert_eq!(err.violations[0].message, "must be >= 300");
    }

    #[test]
    fn reports_every_violation() {
        let mut body = valid_body();
        body["no_of_dependents"] = json!(9);
        body["education"] = json!("PhD");
        body["loanTerm"] = json!("twelve");
        body.as_object_mut().unwrap().remove("bankAssetValue");

        let err = validate_application(&body).unwrap_err();
        assert_eq!(
            err.fields(),
            vec!["no_of_dependents", "education", "loanTerm", "bankAssetValue"]
        );
        let kinds: Vec<_> = err.violations.iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::AboveMaximum,
                ViolationKind::NotInEnum,
                ViolationKind::WrongType,
                ViolationKind::Missing,
            ]
        );
    }

    #[test]
    fn empty_object_lists_all_eleven_fields() {
        let err = validate_application(&json!({})).unwrap_err();
        assert_eq!(err.violations.len(), 11);
        assert!(err
            .violations
            .iter()
            .all(|v| v.kind == ViolationKind::Missing));
    }

    #[test]
    fn non_object_body_is_rejected_at_root() {
        let err = validate_application(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.fields(), vec!["body"]);
        assert_eq!(err.violations[0].kind, ViolationKind::WrongType);
    }

    #[test]
    fn dependents_must_be_whole() {
        assert_eq!(
            validate_application(&with("no_of_dependents", json!(3.0)))
                .unwrap()
                .no_of_dependents,
            3
        );
        let err = validate_application(&with("no_of_dependents", json!(2.5))).unwrap_err();
        assert_eq!(err.violations[0].kind, ViolationKind::WrongType);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let app = validate_application(&with("incomeAnnum", json!("9600000"))).unwrap();
        assert_eq!(app.income_annum, 9_600_000.0);
        let app = validate_application(&with("no_of_dependents", json!(" 3 "))).unwrap();
        assert_eq!(app.no_of_dependents, 3);

        let err = validate_application(&with("cibilScore", json!("150"))).unwrap_err();
        assert_eq!(err.fields(), vec!["cibilScore"]);
        assert_eq!(err.violations[0].kind, ViolationKind::BelowMinimum);
    }

    #[test]
    fn non_numeric_values_are_wrong_type() {
        for value in [json!("five hundred"), json!("NaN"), json!(true), Value::Null] {
            let err = validate_application(&with("loanAmount", value)).unwrap_err();
            assert_eq!(err.fields(), vec!["loanAmount"]);
            assert_eq!(err.violations[0].kind, ViolationKind::WrongType);
        }
        let err = validate_application(&with("no_of_dependents", json!("2.5"))).unwrap_err();
        assert_eq!(err.violations[0].kind, ViolationKind::WrongType);
    }

    #[test]
    fn oversized_dependents_are_out_of_range() {
        let body: Value = serde_json::from_str(
            &valid_body()
                .to_string()
                .replace(r#""no_of_dependents":2"#, r#""no_of_dependents":10000000000000000000"#),
        )
        .unwrap();
        assert!(body["no_of_dependents"].is_u64());
        let err = validate_application(&body).unwrap_err();
        assert_eq!(err.fields(), vec!["no_of_dependents"]);
        assert_eq!(err.violations[0].kind, ViolationKind::AboveMaximum);

        let err = validate_application(&with("no_of_dependents", json!(-1e300))).unwrap_err();
        assert_eq!(err.violations[0].kind, ViolationKind::BelowMinimum);
    }

    #[test]
    fn enums_are_case_sensitive() {
        let err = validate_application(&with("selfEmployed", json!("yes"))).unwrap_err();
        assert_eq!(err.fields(), vec!["selfEmployed"]);
        assert_eq!(
            err.violations[0].message,
            r#"expected one of: "Yes", "No""#
        );
    }

    #[test]
    fn only_aliases_are_accepted() {
        let mut body = valid_body();
        let object = body.as_object_mut().unwrap();
        let value = object.remove("selfEmployed").unwrap();
        object.insert("self_employed".into(), value);
        object.insert("loan_id".into(), json!(17));

        let err = validate_application(&body).unwrap_err();
        assert_eq!(err.fields(), vec!["selfEmployed"]);
        assert_eq!(err.violations[0].kind, ViolationKind::Missing);
    }
}
