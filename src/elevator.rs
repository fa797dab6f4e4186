//! Operating condition of an elevator from its load, the floor it is called
//! to, and the height of the building.
//!
//! The condition score runs from 0 (efficient) to 100 (inefficient). Names
//! are Portuguese: `leve`/`medio`/`pesado` for the load, `baixo`/`medio`/`alto`
//! for the called floor, `pequeno`/`medio`/`alto` for the number of floors and
//! `eficiente`/`moderada`/`ineficiente` for the condition.

use crate::dsl::Expr;
use crate::error::{FuzzyError, Result};
use crate::inference::{InferenceConfig, InferenceSystem, SystemBuilder};
use crate::inputs::Inputs;
use crate::membership::MembershipFunction;
use crate::rules::Rule;
use crate::universe::Universe;
use crate::variable::{Antecedent, Consequent, Variable};

pub const WEIGHT: &str = "peso_elevador";
pub const FLOOR: &str = "andar_chamado";
pub const FLOORS: &str = "num_andares";
pub const CONDITION: &str = "condicao";

/// The elevator model and handles to its variables.
#[derive(Clone, Debug)]
pub struct Elevator {
    pub system: InferenceSystem,
    pub weight: Variable<Antecedent>,
    pub floor: Variable<Antecedent>,
    pub floors: Variable<Antecedent>,
    pub condition: Variable<Consequent>,
}

impl Elevator {
    pub fn new() -> Result<Self> {
        Self::with_config(InferenceConfig::default())
    }

    pub fn with_config(config: InferenceConfig) -> Result<Self> {
        Self::with_rules(config, Self::rules)
    }

    /// Same variables and terms with a different rule base.
    pub fn with_rules(
        config: InferenceConfig,
        rules: impl FnOnce(Variable<Antecedent>, Variable<Antecedent>, Variable<Antecedent>, Variable<Consequent>) -> Result<Vec<Rule>>,
    ) -> Result<Self> {
        let mut builder = SystemBuilder::with_config(config);

        let weight = builder.antecedent(WEIGHT, Universe::new(1000., 1500., 1.)?)?;
        let floor = builder.antecedent(FLOOR, Universe::new(0., 10., 1.)?)?;
        let floors = builder.antecedent(FLOORS, Universe::new(1., 10., 1.)?)?;
        let condition = builder.consequent(CONDITION, Universe::new(0., 100., 1.)?)?;

        builder
            .term(weight, "leve", MembershipFunction::trapezoidal(1000., 1000., 1250., 1500.)?)?
            .term(weight, "medio", MembershipFunction::triangular(1250., 1375., 1500.)?)?
            .term(weight, "pesado", MembershipFunction::trapezoidal(1000., 1250., 1250., 1500.)?)?;

        builder
            .term(floor, "baixo", MembershipFunction::triangular(0., 0., 50.)?)?
            .term(floor, "medio", MembershipFunction::triangular(25., 50., 75.)?)?
            .term(floor, "alto", MembershipFunction::triangular(50., 100., 100.)?)?;

        builder
            .term(floors, "pequeno", MembershipFunction::triangular(1., 1., 50.)?)?
            .term(floors, "medio", MembershipFunction::triangular(25., 50., 75.)?)?
            .term(floors, "alto", MembershipFunction::triangular(50., 100., 100.)?)?;

        builder
            .term(condition, "eficiente", MembershipFunction::trapezoidal(0., 0., 25., 50.)?)?
            .term(condition, "moderada", MembershipFunction::triangular(25., 50., 75.)?)?
            .term(condition, "ineficiente", MembershipFunction::trapezoidal(50., 75., 100., 100.)?)?;

        for rule in rules(weight, floor, floors, condition)? {
            builder.add_rule(rule);
        }

        Ok(Self {
            system: builder.build()?,
            weight,
            floor,
            floors,
            condition,
        })
    }

    /// The six rules of the model, in order.
    pub fn rules(
        weight: Variable<Antecedent>,
        floor: Variable<Antecedent>,
        floors: Variable<Antecedent>,
        condition: Variable<Consequent>,
    ) -> Result<Vec<Rule>> {
        let when = |w: &str, f: &str, n: &str| Expr::all([weight.is(w), floor.is(f), floors.is(n)]);

        // Catch-all for inputs that fall outside every term of some variable
        let uncovered = Expr::any([
            Expr::any(["leve", "medio", "pesado"].map(|t| weight.is(t)))?.not(),
            Expr::any(["baixo", "medio", "alto"].map(|t| floor.is(t)))?.not(),
            Expr::any(["pequeno", "medio", "alto"].map(|t| floors.is(t)))?.not(),
        ])?;

        Ok(vec![
            Rule::new(when("leve", "baixo", "pequeno")?, condition.is("eficiente")),
            Rule::new(when("pesado", "alto", "alto")?, condition.is("ineficiente")),
            Rule::new(when("medio", "medio", "medio")?, condition.is("moderada")),
            Rule::new(when("leve", "alto", "pequeno")?, condition.is("moderada")),
            Rule::new(when("pesado", "baixo", "alto")?, condition.is("ineficiente")),
            Rule::new(uncovered, condition.is("moderada")),
        ])
    }

    /// Condition score for one call of the elevator.
    pub fn condition(&self, weight: f64, floor: f64, floors: f64) -> Result<f64> {
        let inputs = Inputs::new()
            .with(self.weight, weight)
            .with(self.floor, floor)
            .with(self.floors, floors);

        self.system
            .evaluate(&inputs)?
            .crisp(self.condition)
            .ok_or_else(|| FuzzyError::UnknownVariable(CONDITION.to_owned()))
    }
}

#[test]
fn test_weight_vertex() {
    let elevator = Elevator::new().unwrap();
    let weight = elevator.system.variable(WEIGHT).unwrap();

    assert_eq!(weight.term_degree("pesado", 1250.).unwrap(), 1.);
    assert_eq!(weight.term_degree("leve", 1250.).unwrap(), 1.);
    assert_eq!(weight.term_degree("medio", 1250.).unwrap(), 0.);
}

#[test]
fn test_rule_count() {
    let elevator = Elevator::new().unwrap();

    assert_eq!(elevator.system.rules().len(), 6);
    assert_eq!(elevator.system.variables().count(), 4);
}
