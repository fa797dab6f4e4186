//! Declarative model definitions.
//!
//! A model is the whole configuration of an [`InferenceSystem`] as data:
//!
//! ```json
//! {
//!   "config": { "defuzz_op": "centroid" },
//!   "variables": [
//!     { "name": "service", "kind": "antecedent", "universe": { "min": 0, "max": 10, "step": 1 },
//!       "terms": [ { "name": "good", "membership": { "triangular": [5, 10, 10] } } ] },
//!     { "name": "tip", "kind": "consequent", "universe": { "min": 0, "max": 30, "step": 1 },
//!       "terms": [ { "name": "high", "membership": { "triangular": [20, 25, 30] } } ] }
//!   ],
//!   "rules": [
//!     { "if": { "is": { "variable": "service", "term": "good" } },
//!       "then": [ { "variable": "tip", "term": "high" } ] }
//!   ]
//! }
//! ```
//!
//! Loading goes through [`SystemBuilder`], so a model is checked exactly like one
//! assembled in code.

use serde::{Deserialize, Serialize};

use crate::dsl::Expr;
use crate::error::{FuzzyError, Result};
use crate::inference::{InferenceConfig, InferenceSystem, SystemBuilder};
use crate::membership::MembershipFunction;
use crate::rules::{Conclusion, Rule};
use crate::universe::Universe;
use crate::variable::{Consequent, Variable, VariableKey, VariableKind};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDefinition {
    #[serde(default)]
    pub config: InferenceConfig,
    pub variables: Vec<VariableDefinition>,
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableDefinition {
    pub name: String,
    pub kind: VariableKind,
    pub universe: Universe,
    pub terms: Vec<TermDefinition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TermDefinition {
    pub name: String,
    pub membership: MembershipFunction,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprDefinition {
    Is { variable: String, term: String },
    And(Vec<ExprDefinition>),
    Or(Vec<ExprDefinition>),
    Not(Box<ExprDefinition>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDefinition {
    #[serde(rename = "if")]
    pub premise: ExprDefinition,
    #[serde(rename = "then")]
    pub conclusions: Vec<ConclusionDefinition>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConclusionDefinition {
    pub variable: String,
    pub term: String,
    #[serde(default = "full_weight")]
    pub weight: f64,
}

fn full_weight() -> f64 {
    1.
}

impl ModelDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn build(&self) -> Result<InferenceSystem> {
        let mut builder = SystemBuilder::with_config(self.config);

        for var in &self.variables {
            let key = builder.insert(var.name.clone(), var.kind, var.universe.clone())?;

            for term in &var.terms {
                builder.term_by_key(key, term.name.clone(), term.membership.clone())?;
            }
        }

        for rule in &self.rules {
            let premise = rule.premise.to_expr(&builder)?;
            let mut conclusions = rule
                .conclusions
                .iter()
                .map(|c| c.to_conclusion(&builder))
                .collect::<Result<Vec<_>>>()?
                .into_iter();
            let first = conclusions.next().ok_or(FuzzyError::EmptyExpression("then"))?;

            builder.add_rule(conclusions.fold(Rule::new(premise, first), Rule::also));
        }

        builder.build()
    }
}

/// Parses and builds a model in one step.
pub fn from_json(json: &str) -> Result<InferenceSystem> {
    ModelDefinition::from_json(json)?.build()
}

fn resolve(builder: &SystemBuilder, name: &str, kind: VariableKind) -> Result<VariableKey> {
    match builder.lookup(name) {
        None => Err(FuzzyError::UnknownVariable(name.to_owned())),
        Some((key, found)) if found == kind => Ok(key),
        Some((_, VariableKind::Consequent)) => Err(FuzzyError::NotAnAntecedent(name.to_owned())),
        Some((_, VariableKind::Antecedent)) => Err(FuzzyError::NotAConsequent(name.to_owned())),
    }
}

impl ExprDefinition {
    fn to_expr(&self, builder: &SystemBuilder) -> Result<Expr> {
        match self {
            Self::Is { variable, term } => {
                let key = resolve(builder, variable, VariableKind::Antecedent)?;
                Ok(Expr::Is(key, term.clone()))
            },
            Self::And(exprs) => Expr::all(Self::to_exprs(exprs, builder)?),
            Self::Or(exprs) => Expr::any(Self::to_exprs(exprs, builder)?),
            Self::Not(expr) => Ok(expr.to_expr(builder)?.not()),
        }
    }

    fn to_exprs(exprs: &[ExprDefinition], builder: &SystemBuilder) -> Result<Vec<Expr>> {
        exprs.iter().map(|e| e.to_expr(builder)).collect()
    }
}

impl ConclusionDefinition {
    fn to_conclusion(&self, builder: &SystemBuilder) -> Result<Conclusion> {
        let key = resolve(builder, &self.variable, VariableKind::Consequent)?;

        Ok(Variable::<Consequent>::new(key).is(self.term.clone()).weighted(self.weight))
    }
}

#[cfg(test)]
const TIPPING: &str = r#"{
    "config": { "defuzz_op": "centroid", "on_empty": "midpoint" },
    "variables": [
        { "name": "service", "kind": "antecedent", "universe": { "min": 0, "max": 10, "step": 1 },
          "terms": [
            { "name": "poor", "membership": { "triangular": [0, 0, 5] } },
            { "name": "good", "membership": { "triangular": [5, 10, 10] } }
          ] },
        { "name": "tip", "kind": "consequent", "universe": { "min": 0, "max": 30, "step": 1 },
          "terms": [
            { "name": "low", "membership": { "triangular": [0, 5, 10] } },
            { "name": "high", "membership": { "triangular": [20, 25, 30] } }
          ] }
    ],
    "rules": [
        { "if": { "is": { "variable": "service", "term": "poor" } },
          "then": [ { "variable": "tip", "term": "low" } ] },
        { "if": { "not": { "or": [
                { "is": { "variable": "service", "term": "poor" } },
                { "is": { "variable": "service", "term": "good" } }
            ] } },
          "then": [ { "variable": "tip", "term": "high", "weight": 0.5 } ] }
    ]
}"#;

#[test]
fn test_load_model() {
    let system = from_json(TIPPING).unwrap();

    assert_eq!(system.config().on_empty, crate::inference::EmptyAggregate::Midpoint);
    assert_eq!(system.rules().len(), 2);
    assert_eq!(system.rules().iter().nth(1).unwrap().conclusions()[0].weight(), 0.5);

    let outputs = system.evaluate_named([("service", 0.)]).unwrap();
    assert_eq!(outputs.crisp_by_name("tip"), Some(5.));
}

#[test]
fn test_model_rejects_bad_references() {
    let mut model = ModelDefinition::from_json(TIPPING).unwrap();
    model.rules[0].premise = ExprDefinition::Is {
        variable: "tip".into(),
        term: "low".into(),
    };
    assert!(matches!(model.build(), Err(FuzzyError::NotAnAntecedent(_))));

    let mut model = ModelDefinition::from_json(TIPPING).unwrap();
    model.rules[0].conclusions[0].variable = "service".into();
    assert!(matches!(model.build(), Err(FuzzyError::NotAConsequent(_))));

    let mut model = ModelDefinition::from_json(TIPPING).unwrap();
    model.rules[0].conclusions[0].term = "generous".into();
    assert!(matches!(model.build(), Err(FuzzyError::UnknownTerm { .. })));

    let mut model = ModelDefinition::from_json(TIPPING).unwrap();
    model.rules[1].premise = ExprDefinition::And(Vec::new());
    assert!(matches!(model.build(), Err(FuzzyError::EmptyExpression("and"))));

    let mut model = ModelDefinition::from_json(TIPPING).unwrap();
    model.rules[1].conclusions.clear();
    assert!(matches!(model.build(), Err(FuzzyError::EmptyExpression("then"))));

    let mut model = ModelDefinition::from_json(TIPPING).unwrap();
    model.variables[1].terms[1].name = "low".into();
    assert!(matches!(model.build(), Err(FuzzyError::DuplicateTerm { .. })));

    let mut model = ModelDefinition::from_json(TIPPING).unwrap();
    model.variables[0].terms[0].membership = MembershipFunction::Triangular(5., 0., 0.);
    assert!(matches!(model.build(), Err(FuzzyError::InvalidMembership { .. })));

    assert!(matches!(
        ModelDefinition::from_json(r#"{"variables": [], "extra": 1}"#),
        Err(FuzzyError::Model(_))
    ));
}
