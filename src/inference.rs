use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap};
use tracing::{debug, trace, warn};

use crate::context::EvaluationContext;
use crate::dsl::Expr;
use crate::error::{FuzzyError, Result};
use crate::inputs::Inputs;
use crate::membership::MembershipFunction;
use crate::ops::*;
use crate::outputs::{Output, Outputs};
use crate::rules::{Conclusion, Rule, Rules};
use crate::universe::Universe;
use crate::variable::{Antecedent, Consequent, LinguisticVariable, Variable, VariableKey, VariableKind};

/// What to do when no rule contributes anything to a consequent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum EmptyAggregate {
    /// Fail the evaluation with [`FuzzyError::EmptyAggregate`]
    #[default]
    Fail,
    /// Output the midpoint of the consequent's universe
    Midpoint,
}

/// System-wide choice of operators. One configuration applies to every rule
/// and expression of a system; operators are never mixed within an evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub and_op: AndOp,
    pub or_op: OrOp,
    pub imp_op: ImplicationOp,
    pub prod_link: ProductionLink,
    pub defuzz_op: DefuzzificationOp,
    pub on_empty: EmptyAggregate,
    /// Clamp every crisp input to its antecedent's universe before fuzzification
    pub clip_inputs: bool,
}

/// Registers variables, terms and rules, then validates them all at once in
/// [`SystemBuilder::build`].
#[derive(Default)]
pub struct SystemBuilder {
    config: InferenceConfig,
    variables: SlotMap<VariableKey, LinguisticVariable>,
    names: HashMap<String, VariableKey>,
    rules: Rules,
}

impl SystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: InferenceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&mut self, config: InferenceConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn antecedent(&mut self, name: impl Into<String>, universe: Universe) -> Result<Variable<Antecedent>> {
        self.insert(name.into(), VariableKind::Antecedent, universe)
            .map(Variable::new)
    }

    pub fn consequent(&mut self, name: impl Into<String>, universe: Universe) -> Result<Variable<Consequent>> {
        self.insert(name.into(), VariableKind::Consequent, universe)
            .map(Variable::new)
    }

    pub(crate) fn insert(&mut self, name: String, kind: VariableKind, universe: Universe) -> Result<VariableKey> {
        if self.names.contains_key(&name) {
            return Err(FuzzyError::DuplicateVariable(name));
        }

        let key = self.variables.insert(LinguisticVariable::new(name.clone(), kind, universe));
        self.names.insert(name, key);

        Ok(key)
    }

    /// Adds a term to a variable of either kind.
    pub fn term<K>(&mut self, var: Variable<K>, name: impl Into<String>, mf: MembershipFunction) -> Result<&mut Self> {
        self.term_by_key(var.0, name.into(), mf)?;
        Ok(self)
    }

    pub(crate) fn term_by_key(&mut self, key: VariableKey, name: String, mf: MembershipFunction) -> Result<()> {
        self.variables
            .get_mut(key)
            .ok_or_else(|| FuzzyError::UnknownVariable(format!("{key:?}")))?
            .add_term(name, mf)
    }

    pub fn rule(&mut self, premise: Expr, conclusion: Conclusion) -> &mut Self {
        self.rules.add(premise, conclusion);
        self
    }

    pub fn add_rule(&mut self, rule: Rule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<(VariableKey, VariableKind)> {
        let key = *self.names.get(name)?;
        Some((key, self.variables[key].kind()))
    }

    /// Checks every rule against the registered variables and terms.
    ///
    /// Nothing is usable until this succeeds; a model with a single bad
    /// reference is rejected whole.
    pub fn build(self) -> Result<InferenceSystem> {
        for rule in self.rules.iter() {
            for (key, term) in rule.premise.propositions() {
                self.check_reference(key, term, VariableKind::Antecedent)?;
            }

            for conclusion in &rule.conclusions {
                self.check_reference(conclusion.variable, &conclusion.term, VariableKind::Consequent)?;
                conclusion.validate()?;
            }
        }

        debug!(
            variables = self.variables.len(),
            rules = self.rules.len(),
            "built inference system"
        );

        Ok(InferenceSystem {
            config: self.config,
            variables: self.variables,
            names: self.names,
            rules: self.rules,
        })
    }

    fn check_reference(&self, key: VariableKey, term: &str, kind: VariableKind) -> Result<()> {
        let var = self
            .variables
            .get(key)
            .ok_or_else(|| FuzzyError::UnknownVariable(format!("{key:?}")))?;

        if var.kind() != kind {
            let name = var.name().to_owned();

            return Err(match kind {
                VariableKind::Antecedent => FuzzyError::NotAnAntecedent(name),
                VariableKind::Consequent => FuzzyError::NotAConsequent(name),
            });
        }
        if var.terms().is_empty() {
            return Err(FuzzyError::NoTerms(var.name().to_owned()));
        }
        if !var.terms().contains(term) {
            return Err(var.unknown_term(term));
        }

        Ok(())
    }
}

/// A validated set of variables and rules, evaluated any number of times.
///
/// Evaluation takes `&self` and keeps its intermediate state in a per-call
/// context, so one system can be shared across threads.
#[derive(Clone, Debug)]
pub struct InferenceSystem {
    config: InferenceConfig,
    variables: SlotMap<VariableKey, LinguisticVariable>,
    names: HashMap<String, VariableKey>,
    rules: Rules,
}

impl InferenceSystem {
    pub fn builder() -> SystemBuilder {
        SystemBuilder::new()
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Same variables and rules under different operators.
    pub fn with_config(mut self, config: InferenceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Variables in registration order.
    pub fn variables(&self) -> impl Iterator<Item = (VariableKey, &LinguisticVariable)> {
        self.variables.iter()
    }

    pub fn get(&self, key: VariableKey) -> Option<&LinguisticVariable> {
        self.variables.get(key)
    }

    pub fn variable(&self, name: &str) -> Option<&LinguisticVariable> {
        self.names.get(name).map(|key| &self.variables[*key])
    }

    fn key_of(&self, name: &str, kind: VariableKind) -> Result<VariableKey> {
        let key = *self
            .names
            .get(name)
            .ok_or_else(|| FuzzyError::UnknownVariable(name.to_owned()))?;

        match (kind, self.variables[key].kind()) {
            (VariableKind::Antecedent, VariableKind::Consequent) => Err(FuzzyError::NotAnAntecedent(name.to_owned())),
            (VariableKind::Consequent, VariableKind::Antecedent) => Err(FuzzyError::NotAConsequent(name.to_owned())),
            _ => Ok(key),
        }
    }

    pub fn antecedent(&self, name: &str) -> Result<Variable<Antecedent>> {
        self.key_of(name, VariableKind::Antecedent).map(Variable::new)
    }

    pub fn consequent(&self, name: &str) -> Result<Variable<Consequent>> {
        self.key_of(name, VariableKind::Consequent).map(Variable::new)
    }

    /// Binds crisp values to antecedents by name.
    pub fn inputs<S: AsRef<str>>(&self, values: impl IntoIterator<Item = (S, f64)>) -> Result<Inputs> {
        let mut inputs = Inputs::new();

        for (name, value) in values {
            inputs.add(self.antecedent(name.as_ref())?, value);
        }

        Ok(inputs)
    }

    pub fn evaluate_named<S: AsRef<str>>(&self, values: impl IntoIterator<Item = (S, f64)>) -> Result<Outputs<'_>> {
        let inputs = self.inputs(values)?;
        self.evaluate(&inputs)
    }

    /// Runs one inference cycle: fuzzification, rule firing, aggregation and
    /// defuzzification of every consequent.
    pub fn evaluate(&self, inputs: &Inputs) -> Result<Outputs<'_>> {
        let InferenceConfig {
            and_op,
            or_op,
            imp_op,
            prod_link,
            defuzz_op,
            on_empty,
            clip_inputs,
        } = self.config;

        // Fuzzificate inputs
        let ctx = EvaluationContext::fuzzify(&self.variables, inputs, clip_inputs)?;

        debug!(inputs = inputs.len(), rules = self.rules.len(), "fuzzified inputs");

        // Compute rule firing strengths
        let firing_strengths = self
            .rules
            .iter()
            .map(|rule| rule.firing_strength(&ctx, and_op, or_op))
            .collect::<Result<Vec<_>>>()?;

        // Aggregate implied consequent memberships
        let mut aggregated = SecondaryMap::new();

        for (key, var) in &self.variables {
            if var.kind() == VariableKind::Consequent {
                aggregated.insert(key, vec![0.; var.universe().len()]);
            }
        }

        for (i, (rule, firing)) in self.rules.iter().zip(firing_strengths.iter().copied()).enumerate() {
            trace!(rule = i, firing, "rule fired");

            for conclusion in &rule.conclusions {
                // Zero is the identity of every production link
                if conclusion.implied_degree(firing) == 0. {
                    continue;
                }

                let var = self
                    .variables
                    .get(conclusion.variable)
                    .ok_or_else(|| FuzzyError::UnknownVariable(format!("{:?}", conclusion.variable)))?;
                let samples = var.sampled(&conclusion.term)?;
                let firing = firing.min(1.);
                let implied = samples
                    .iter()
                    .map(|mu| (imp_op.call(firing, *mu) * conclusion.weight).clamp(0., 1.));

                if let Some(acc) = aggregated.get_mut(conclusion.variable) {
                    prod_link.accumulate(acc, implied);
                }
            }
        }

        // Defuzzificate
        let mut outputs = Vec::with_capacity(aggregated.len());

        for (key, membership) in aggregated {
            let var = &self.variables[key];
            let universe = var.universe();
            let defuzzified = defuzz_op.call(universe.points(), &membership);
            let empty = defuzzified.is_none();

            let crisp = match (defuzzified, on_empty) {
                (Some(crisp), _) => crisp,
                (None, EmptyAggregate::Fail) => return Err(FuzzyError::EmptyAggregate(var.name().to_owned())),
                (None, EmptyAggregate::Midpoint) => {
                    warn!(variable = var.name(), "no rule fired, falling back to universe midpoint");
                    universe.midpoint()
                },
            };

            trace!(variable = var.name(), crisp, "defuzzified");

            outputs.push(Output::new(key, var, crisp, membership, empty));
        }

        Ok(Outputs::new(outputs, firing_strengths))
    }
}

#[cfg(test)]
fn tipping() -> (InferenceSystem, Variable<Antecedent>, Variable<Antecedent>, Variable<Consequent>) {
    let mut builder = InferenceSystem::builder();
    let service = builder.antecedent("service", Universe::new(0., 10., 1.).unwrap()).unwrap();
    let food = builder.antecedent("food", Universe::new(0., 10., 1.).unwrap()).unwrap();
    let tip = builder.consequent("tip", Universe::new(0., 30., 1.).unwrap()).unwrap();

    builder
        .term(service, "poor", MembershipFunction::Triangular(0., 0., 5.))
        .unwrap()
        .term(service, "good", MembershipFunction::Triangular(5., 10., 10.))
        .unwrap()
        .term(food, "bad", MembershipFunction::Trapezoidal(0., 0., 3., 6.))
        .unwrap()
        .term(food, "tasty", MembershipFunction::Trapezoidal(4., 7., 10., 10.))
        .unwrap()
        .term(tip, "low", MembershipFunction::Triangular(0., 5., 10.))
        .unwrap()
        .term(tip, "high", MembershipFunction::Triangular(20., 25., 30.))
        .unwrap();

    builder
        .rule(service.is("poor").or(food.is("bad")), tip.is("low"))
        .rule(service.is("good").and(food.is("tasty")), tip.is("high"));

    (builder.build().unwrap(), service, food, tip)
}

#[test]
fn test_tipping() {
    let (system, service, food, tip) = tipping();

    // Only the generous rule fires: symmetric "high" around 25
    let inputs = Inputs::new().with(service, 10.).with(food, 10.);
    let outputs = system.evaluate(&inputs).unwrap();

    assert_eq!(outputs.firing_strengths(), &[0., 1.]);
    assert_eq!(outputs.crisp(tip), Some(25.));

    // Only the stingy rule fires: symmetric "low" around 5
    let outputs = system.evaluate_named([("service", 0.), ("food", 0.)]).unwrap();
    assert_eq!(outputs.crisp_by_name("tip"), Some(5.));

    // Evaluating leaves the system untouched
    let again = system.evaluate(&inputs).unwrap();
    assert_eq!(again.crisp(tip), Some(25.));
}

#[test]
fn test_missing_and_unknown_inputs() {
    let (system, service, _, _) = tipping();

    let inputs = Inputs::new().with(service, 3.);
    assert!(matches!(
        system.evaluate(&inputs),
        Err(FuzzyError::MissingInput(ref name)) if name == "food"
    ));
    assert!(matches!(
        system.inputs([("tip", 1.)]),
        Err(FuzzyError::NotAnAntecedent(_))
    ));
    assert!(matches!(
        system.inputs([("ambience", 1.)]),
        Err(FuzzyError::UnknownVariable(_))
    ));
}

#[test]
fn test_empty_aggregate_policy() {
    let (system, service, food, tip) = tipping();

    // service 5 sits between "poor" and "good" at degree zero in both
    let inputs = Inputs::new().with(service, 5.).with(food, 6.);
    let err = system.evaluate(&inputs).unwrap_err();
    assert!(matches!(err, FuzzyError::EmptyAggregate(ref name) if name == "tip"));

    let system = system.with_config(InferenceConfig {
        on_empty: EmptyAggregate::Midpoint,
        ..InferenceConfig::default()
    });
    let outputs = system.evaluate(&inputs).unwrap();
    assert_eq!(outputs.crisp(tip), Some(15.));
    assert!(outputs.output_of(tip).unwrap().is_fallback());
}

#[test]
fn test_clip_inputs() {
    let (system, service, food, tip) = tipping();
    let inputs = Inputs::new().with(service, 50.).with(food, 50.);

    // Far outside every term: nothing fires
    assert!(system.evaluate(&inputs).is_err());

    let clipped = system.with_config(InferenceConfig {
        clip_inputs: true,
        ..InferenceConfig::default()
    });
    assert_eq!(clipped.evaluate(&inputs).unwrap().crisp(tip), Some(25.));
}

#[test]
fn test_build_rejects_bad_references() {
    let mut builder = InferenceSystem::builder();
    let weight = builder.antecedent("weight", Universe::new(0., 10., 1.).unwrap()).unwrap();
    let score = builder.consequent("score", Universe::new(0., 10., 1.).unwrap()).unwrap();

    builder
        .term(weight, "light", MembershipFunction::Triangular(0., 0., 10.))
        .unwrap();
    builder
        .term(score, "good", MembershipFunction::Triangular(0., 10., 10.))
        .unwrap();

    assert!(matches!(
        builder.antecedent("score", Universe::new(0., 1., 1.).unwrap()),
        Err(FuzzyError::DuplicateVariable(_))
    ));

    builder.rule(weight.is("heavy"), score.is("good"));
    assert!(matches!(builder.build(), Err(FuzzyError::UnknownTerm { ref term, .. }) if term == "heavy"));

    let mut builder = InferenceSystem::builder();
    let weight = builder.antecedent("weight", Universe::new(0., 10., 1.).unwrap()).unwrap();
    let score = builder.consequent("score", Universe::new(0., 10., 1.).unwrap()).unwrap();
    builder
        .term(weight, "light", MembershipFunction::Triangular(0., 0., 10.))
        .unwrap();
    builder.rule(weight.is("light"), score.is("good"));
    assert!(matches!(builder.build(), Err(FuzzyError::NoTerms(ref name)) if name == "score"));

    let mut builder = InferenceSystem::builder();
    let weight = builder.antecedent("weight", Universe::new(0., 10., 1.).unwrap()).unwrap();
    let score = builder.consequent("score", Universe::new(0., 10., 1.).unwrap()).unwrap();
    builder
        .term(weight, "light", MembershipFunction::Triangular(0., 0., 10.))
        .unwrap()
        .term(score, "good", MembershipFunction::Triangular(0., 10., 10.))
        .unwrap();
    builder.rule(weight.is("light"), score.is("good").weighted(2.));
    assert!(matches!(builder.build(), Err(FuzzyError::InvalidWeight(_))));
}

#[test]
fn test_bank_loan() {
    let mut builder = InferenceSystem::builder();
    let score = builder.antecedent("score", Universe::new(150., 200., 0.1).unwrap()).unwrap();
    let ratio = builder.antecedent("ratio", Universe::new(0.1, 1., 0.1).unwrap()).unwrap();
    let credit = builder.antecedent("credit", Universe::new(0., 10., 0.1).unwrap()).unwrap();
    let decision = builder.consequent("decision", Universe::new(0., 10., 0.1).unwrap()).unwrap();

    let terms = [
        (score.key(), "high", vec![(175.0, 0.0), (180., 0.2), (185., 0.7), (190., 1.)]),
        (score.key(), "low", vec![(155.0, 1.0), (160., 0.8), (165., 0.5), (170., 0.2), (175., 0.)]),
        (ratio.key(), "good", vec![(0.3, 1.0), (0.4, 0.7), (0.41, 0.3), (0.42, 0.)]),
        (ratio.key(), "bad", vec![(0.44, 0.), (0.45, 0.3), (0.5, 0.7), (0.7, 1.)]),
        (credit.key(), "good", vec![(2.0, 1.0), (3., 0.7), (4., 0.3), (5., 0.)]),
        (credit.key(), "bad", vec![(5., 0.), (6., 0.3), (7., 0.7), (8., 1.)]),
        (decision.key(), "approve", vec![(5.0, 0.0), (6., 0.3), (7., 0.7), (8., 1.)]),
        (decision.key(), "reject", vec![(2., 1.), (3., 0.7), (4., 0.3), (5., 0.)]),
    ];

    for (key, name, points) in terms {
        builder
            .term_by_key(key, name.into(), MembershipFunction::piecewise(points).unwrap())
            .unwrap();
    }

    builder.rule(
        Expr::all([score.is("high"), ratio.is("good"), credit.is("good")]).unwrap(),
        decision.is("approve"),
    );
    builder.rule(
        score
            .is("low")
            .and(ratio.is("bad"))
            .or(credit.is("bad")),
        decision.is("reject"),
    );

    let system = builder.build().unwrap();
    let inputs = Inputs::new().with(score, 190.).with(ratio, 0.39).with(credit, 1.5);
    let outputs = system.evaluate(&inputs).unwrap();

    assert!((outputs.firing_strengths()[0] - 0.73).abs() < 1e-12);
    assert_eq!(outputs.firing_strengths()[1], 0.);

    let approve = outputs.crisp(decision).unwrap();
    assert!((approve - 8.036173913043474).abs() < 1e-9, "{approve}");
}
