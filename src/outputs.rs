use crate::variable::{Consequent, LinguisticVariable, Variable, VariableKey};

/// Result of inference for one consequent.
#[derive(Debug)]
pub struct Output<'s> {
    key: VariableKey,
    variable: &'s LinguisticVariable,
    crisp: f64,
    membership: Vec<f64>,
    fallback: bool,
}

impl<'s> Output<'s> {
    pub(crate) fn new(
        key: VariableKey,
        variable: &'s LinguisticVariable,
        crisp: f64,
        membership: Vec<f64>,
        fallback: bool,
    ) -> Self {
        Self {
            key,
            variable,
            crisp,
            membership,
            fallback,
        }
    }

    pub fn key(&self) -> VariableKey {
        self.key
    }

    pub fn name(&self) -> &'s str {
        self.variable.name()
    }

    /// The defuzzified value.
    pub fn crisp(&self) -> f64 {
        self.crisp
    }

    /// Sample points the aggregated set is defined over.
    pub fn universe(&self) -> &'s [f64] {
        self.variable.universe().points()
    }

    /// Aggregated membership at each point of [`Output::universe`].
    pub fn membership(&self) -> &[f64] {
        &self.membership
    }

    /// True when no rule fired and the crisp value is the configured fallback.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Results of one evaluation.
#[derive(Debug)]
pub struct Outputs<'s> {
    outputs: Vec<Output<'s>>,
    firing_strengths: Vec<f64>,
}

impl<'s> Outputs<'s> {
    pub(crate) fn new(outputs: Vec<Output<'s>>, firing_strengths: Vec<f64>) -> Self {
        Self {
            outputs,
            firing_strengths,
        }
    }

    pub fn crisp(&self, var: Variable<Consequent>) -> Option<f64> {
        self.output_of(var).map(Output::crisp)
    }

    pub fn crisp_by_name(&self, name: &str) -> Option<f64> {
        self.output(name).map(Output::crisp)
    }

    pub fn output_of(&self, var: Variable<Consequent>) -> Option<&Output<'s>> {
        self.outputs.iter().find(|o| o.key == var.0)
    }

    pub fn output(&self, name: &str) -> Option<&Output<'s>> {
        self.outputs.iter().find(|o| o.name() == name)
    }

    /// One output per consequent, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Output<'s>> {
        self.outputs.iter()
    }

    /// Firing strength of every rule, in registration order.
    pub fn firing_strengths(&self) -> &[f64] {
        &self.firing_strengths
    }
}
