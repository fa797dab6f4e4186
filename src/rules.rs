use crate::context::EvaluationContext;
use crate::dsl::Expr;
use crate::error::{FuzzyError, Result};
use crate::ops::{AndOp, OrOp};
use crate::variable::{Consequent, Variable, VariableKey};

/// One consequent term a rule concludes, scaled by `weight`.
#[derive(Clone, Debug, PartialEq)]
pub struct Conclusion {
    pub(crate) variable: VariableKey,
    pub(crate) term: String,
    pub(crate) weight: f64,
}

impl Conclusion {
    /// Sets the implication weight, which must lie in `[0, 1]`.
    pub fn weighted(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn variable(&self) -> VariableKey {
        self.variable
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if (0. ..=1.).contains(&self.weight) {
            Ok(())
        } else {
            Err(FuzzyError::InvalidWeight(self.weight))
        }
    }

    /// Height the concluded term is implied to, before implication shapes it.
    pub fn implied_degree(&self, firing_strength: f64) -> f64 {
        (firing_strength.min(1.) * self.weight).clamp(0., 1.)
    }
}

impl Variable<Consequent> {
    /// Conclusion "this variable is `term`", with weight one.
    pub fn is(self, term: impl Into<String>) -> Conclusion {
        Conclusion {
            variable: self.0,
            term: term.into(),
            weight: 1.,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub(crate) premise: Expr,
    pub(crate) conclusions: Vec<Conclusion>,
}

impl Rule {
    pub fn new(premise: Expr, conclusion: Conclusion) -> Self {
        Rule {
            premise,
            conclusions: vec![conclusion],
        }
    }

    /// Adds another conclusion to the same premise.
    pub fn also(mut self, conclusion: Conclusion) -> Self {
        self.conclusions.push(conclusion);
        self
    }

    pub fn premise(&self) -> &Expr {
        &self.premise
    }

    pub fn conclusions(&self) -> &[Conclusion] {
        &self.conclusions
    }

    pub(crate) fn firing_strength(&self, ctx: &EvaluationContext<'_>, and_op: AndOp, or_op: OrOp) -> Result<f64> {
        self.premise.evaluate(ctx, and_op, or_op)
    }
}

/// Rules in registration order. Order never changes the inferred output.
#[derive(Clone, Debug, Default)]
pub struct Rules(pub(crate) Vec<Rule>);

impl Rules {
    pub fn new() -> Self {
        Rules(Vec::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Rules(Vec::with_capacity(capacity))
    }

    pub fn add(&mut self, premise: Expr, conclusion: Conclusion) {
        self.push(Rule::new(premise, conclusion));
    }

    pub fn push(&mut self, rule: Rule) {
        self.0.push(rule);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[test]
fn test_implied_degree() {
    use slotmap::SlotMap;

    let mut keys = SlotMap::<VariableKey, ()>::with_key();
    let condicao = Variable::<Consequent>::new(keys.insert(()));

    let full = condicao.is("moderada");
    assert_eq!(full.implied_degree(0.4), 0.4);
    assert_eq!(full.implied_degree(1.5), 1.);

    let half = condicao.is("moderada").weighted(0.5);
    assert_eq!(half.implied_degree(0.5), 0.25);
    assert!(half.validate().is_ok());
    assert!(matches!(
        condicao.is("moderada").weighted(1.5).validate(),
        Err(FuzzyError::InvalidWeight(_))
    ));
    assert!(condicao.is("moderada").weighted(f64::NAN).validate().is_err());
}
