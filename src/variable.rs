use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::error::{FuzzyError, Result};
use crate::membership::MembershipFunction;
use crate::terms::Terms;
use crate::universe::Universe;

new_key_type! {
    /// A variable key
    pub struct VariableKey;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableKind {
    /// Receives a crisp input on every evaluation.
    Antecedent,
    /// Produces an aggregated fuzzy set, and from it a crisp output.
    Consequent,
}

impl fmt::Display for VariableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Antecedent => f.write_str("antecedent"),
            Self::Consequent => f.write_str("consequent"),
        }
    }
}

/// Marker for input variables.
#[derive(Debug)]
pub enum Antecedent {}

/// Marker for output variables.
#[derive(Debug)]
pub enum Consequent {}

/// Handle to a variable registered in a [`SystemBuilder`](crate::SystemBuilder).
///
/// The kind parameter keeps consequents out of rule premises and antecedents
/// out of rule conclusions at compile time.
pub struct Variable<K>(pub(crate) VariableKey, PhantomData<K>);

impl<K> Variable<K> {
    pub(crate) fn new(key: VariableKey) -> Self {
        Variable(key, PhantomData)
    }

    pub fn key(self) -> VariableKey {
        self.0
    }
}

impl<K> Clone for Variable<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Variable<K> {}

impl<K> PartialEq for Variable<K> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<K> Eq for Variable<K> {}

impl<K> fmt::Debug for Variable<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Variable").field(&self.0).finish()
    }
}

/// A named numeric dimension partitioned into terms.
#[derive(Clone, Debug)]
pub struct LinguisticVariable {
    name: String,
    kind: VariableKind,
    universe: Universe,
    terms: Terms,
    // Membership of every term sampled over the universe, parallel to `terms`
    sampled: Vec<Vec<f64>>,
}

impl LinguisticVariable {
    pub fn new(name: impl Into<String>, kind: VariableKind, universe: Universe) -> Self {
        Self {
            name: name.into(),
            kind,
            universe,
            terms: Terms::new(),
            sampled: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn terms(&self) -> &Terms {
        &self.terms
    }

    pub fn add_term(&mut self, name: impl Into<String>, mf: MembershipFunction) -> Result<()> {
        mf.validate()?;

        let samples = self.universe.points().iter().map(|x| mf.degree(*x)).collect();

        self.terms
            .insert(name.into(), mf)
            .map_err(|(term, _)| FuzzyError::DuplicateTerm {
                variable: self.name.clone(),
                term,
            })?;
        self.sampled.push(samples);

        Ok(())
    }

    pub fn term_degree(&self, term: &str, x: f64) -> Result<f64> {
        self.terms
            .get(term)
            .map(|mf| mf.degree(x))
            .ok_or_else(|| self.unknown_term(term))
    }

    /// Degree of `x` in every term, in term order.
    pub fn fuzzify(&self, x: f64) -> Vec<f64> {
        self.terms.iter().map(|(_, mf)| mf.degree(x)).collect()
    }

    /// Membership of `term` at every point of the universe.
    pub fn sampled(&self, term: &str) -> Result<&[f64]> {
        self.terms
            .position(term)
            .map(|i| self.sampled[i].as_slice())
            .ok_or_else(|| self.unknown_term(term))
    }

    pub(crate) fn unknown_term(&self, term: &str) -> FuzzyError {
        FuzzyError::UnknownTerm {
            variable: self.name.clone(),
            term: term.to_owned(),
        }
    }
}

#[cfg(test)]
fn andar_chamado() -> LinguisticVariable {
    let mut var = LinguisticVariable::new(
        "andar_chamado",
        VariableKind::Antecedent,
        Universe::new(0., 10., 1.).unwrap(),
    );

    var.add_term("baixo", MembershipFunction::Triangular(0., 0., 50.)).unwrap();
    var.add_term("medio", MembershipFunction::Triangular(25., 50., 75.)).unwrap();
    var.add_term("alto", MembershipFunction::Triangular(50., 100., 100.)).unwrap();
    var
}

#[test]
fn test_add_term() {
    let mut var = andar_chamado();

    let err = var
        .add_term("medio", MembershipFunction::Triangular(0., 1., 2.))
        .unwrap_err();

    assert!(matches!(err, FuzzyError::DuplicateTerm { ref variable, ref term } if variable == "andar_chamado" && term == "medio"));
    assert!(var
        .add_term("torto", MembershipFunction::Triangular(2., 1., 0.))
        .is_err());
    assert_eq!(var.terms().len(), 3);
}

#[test]
fn test_term_degree() {
    let var = andar_chamado();

    assert_eq!(var.term_degree("baixo", 20.).unwrap(), 0.6);
    assert_eq!(var.term_degree("medio", 37.5).unwrap(), 0.5);
    assert!(matches!(
        var.term_degree("cobertura", 1.),
        Err(FuzzyError::UnknownTerm { .. })
    ));
    assert_eq!(var.fuzzify(10.), vec![0.8, 0., 0.]);
}

#[test]
fn test_sampled() {
    let var = andar_chamado();
    let baixo = var.sampled("baixo").unwrap();

    assert_eq!(baixo.len(), 11);
    assert_eq!(baixo[0], 1.);
    assert_eq!(baixo[10], 0.8);
    assert!(var.sampled("alto").unwrap().iter().all(|d| *d == 0.));
}
