use thiserror::Error;

/// Errors raised while building or evaluating a fuzzy inference system.
#[derive(Debug, Error)]
pub enum FuzzyError {
    #[error("invalid universe [{min}, {max}] with step {step}: {reason}")]
    InvalidUniverse {
        min: f64,
        max: f64,
        step: f64,
        reason: &'static str,
    },

    #[error("invalid membership function {shape}: {reason}")]
    InvalidMembership { shape: &'static str, reason: String },

    #[error("term `{term}` is already defined on variable `{variable}`")]
    DuplicateTerm { variable: String, term: String },

    #[error("variable `{0}` is already defined")]
    DuplicateVariable(String),

    #[error("unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("variable `{variable}` has no term `{term}`")]
    UnknownTerm { variable: String, term: String },

    #[error("variable `{0}` is a consequent and cannot appear in a rule premise or receive an input")]
    NotAnAntecedent(String),

    #[error("variable `{0}` is an antecedent and cannot be the target of a rule conclusion")]
    NotAConsequent(String),

    #[error("rule weight {0} is outside [0, 1]")]
    InvalidWeight(f64),

    #[error("`{0}` expression needs at least one operand")]
    EmptyExpression(&'static str),

    #[error("variable `{0}` has no terms")]
    NoTerms(String),

    #[error("no input bound for antecedent `{0}`")]
    MissingInput(String),

    #[error("input {value} for antecedent `{variable}` is not a finite number")]
    InvalidInput { variable: String, value: f64 },

    #[error("antecedent `{0}` was not fuzzified in this evaluation")]
    UnboundVariable(String),

    #[error("no rule contributed to consequent `{0}`; its aggregated fuzzy set is empty")]
    EmptyAggregate(String),

    #[error("malformed model definition: {0}")]
    Model(#[from] serde_json::Error),
}

impl FuzzyError {
    /// True for errors that describe a broken model rather than a failed evaluation.
    pub fn is_configuration(&self) -> bool {
        !matches!(
            self,
            Self::MissingInput(_) | Self::InvalidInput { .. } | Self::UnboundVariable(_) | Self::EmptyAggregate(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FuzzyError>;

#[test]
fn test_classification() {
    assert!(FuzzyError::DuplicateVariable("x".into()).is_configuration());
    assert!(FuzzyError::InvalidWeight(1.5).is_configuration());
    assert!(!FuzzyError::MissingInput("x".into()).is_configuration());
    assert!(!FuzzyError::InvalidInput {
        variable: "x".into(),
        value: f64::NAN
    }
    .is_configuration());
    assert!(!FuzzyError::EmptyAggregate("y".into()).is_configuration());
}
