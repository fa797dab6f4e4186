use slotmap::{SecondaryMap, SlotMap};

use crate::error::{FuzzyError, Result};
use crate::inputs::Inputs;
use crate::variable::{LinguisticVariable, VariableKey, VariableKind};

/// Fuzzification results for one evaluation.
///
/// Built from the crisp inputs at the start of a call and dropped at its end;
/// nothing in it outlives the evaluation or is shared between calls.
pub(crate) struct EvaluationContext<'s> {
    variables: &'s SlotMap<VariableKey, LinguisticVariable>,
    // Term degrees of each antecedent, parallel to its terms
    fuzzified: SecondaryMap<VariableKey, Vec<f64>>,
}

impl<'s> EvaluationContext<'s> {
    /// Fuzzifies every antecedent against its bound input.
    ///
    /// Every registered antecedent needs an input; `clip` clamps inputs to the
    /// antecedent's universe first.
    pub(crate) fn fuzzify(
        variables: &'s SlotMap<VariableKey, LinguisticVariable>,
        inputs: &Inputs,
        clip: bool,
    ) -> Result<Self> {
        let mut fuzzified = SecondaryMap::with_capacity(inputs.len());

        for (key, var) in variables {
            if var.kind() != VariableKind::Antecedent {
                continue;
            }

            let value = inputs
                .get_key(key)
                .ok_or_else(|| FuzzyError::MissingInput(var.name().to_owned()))?;
            if !value.is_finite() {
                return Err(FuzzyError::InvalidInput {
                    variable: var.name().to_owned(),
                    value,
                });
            }

            let crisp = if clip { var.universe().clamp(value) } else { value };

            fuzzified.insert(key, var.fuzzify(crisp));
        }

        Ok(Self { variables, fuzzified })
    }

    /// Precomputed degree of `term` for the antecedent `key`.
    pub(crate) fn degree(&self, key: VariableKey, term: &str) -> Result<f64> {
        let var = self
            .variables
            .get(key)
            .ok_or_else(|| FuzzyError::UnknownVariable(format!("{key:?}")))?;
        let degrees = self
            .fuzzified
            .get(key)
            .ok_or_else(|| FuzzyError::UnboundVariable(var.name().to_owned()))?;
        let i = var.terms().position(term).ok_or_else(|| var.unknown_term(term))?;

        degrees.get(i).copied().ok_or_else(|| var.unknown_term(term))
    }
}

#[test]
fn test_fuzzify() {
    use crate::membership::MembershipFunction;
    use crate::universe::Universe;
    use crate::variable::{Antecedent, Variable};

    let mut variables = SlotMap::with_key();
    let universe = Universe::new(0., 10., 3.).unwrap();
    let mut floor = LinguisticVariable::new("andar_chamado", VariableKind::Antecedent, universe);
    floor.add_term("baixo", MembershipFunction::Triangular(0., 0., 50.)).unwrap();
    floor.add_term("alto", MembershipFunction::Triangular(5., 10., 10.)).unwrap();
    let key = variables.insert(floor);
    let floor = Variable::<Antecedent>::new(key);

    let ctx = EvaluationContext::fuzzify(&variables, &Inputs::new().with(floor, 20.), false).unwrap();
    assert_eq!(ctx.degree(key, "baixo").unwrap(), 0.6);
    assert_eq!(ctx.degree(key, "alto").unwrap(), 0.);
    assert!(matches!(ctx.degree(key, "medio"), Err(FuzzyError::UnknownTerm { .. })));

    // Clipped to the last sample, 9, not the declared max
    let ctx = EvaluationContext::fuzzify(&variables, &Inputs::new().with(floor, 20.), true).unwrap();
    assert_eq!(ctx.degree(key, "alto").unwrap(), 0.8);

    assert!(matches!(
        EvaluationContext::fuzzify(&variables, &Inputs::new(), false),
        Err(FuzzyError::MissingInput(_))
    ));
    assert!(matches!(
        EvaluationContext::fuzzify(&variables, &Inputs::new().with(floor, f64::NAN), true),
        Err(FuzzyError::InvalidInput { .. })
    ));
}
