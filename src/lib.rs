//! Mamdani fuzzy inference.
//!
//! A system is a set of linguistic variables, each partitioned into named terms,
//! and a rule base relating terms of the inputs (antecedents) to terms of the
//! outputs (consequents). One evaluation fuzzifies the crisp inputs, fires every
//! rule, aggregates the implied output sets and defuzzifies them back to crisp
//! numbers.
//!
//! ```
//! use fuzzy_control::{Inputs, InferenceSystem, MembershipFunction, Universe};
//!
//! # fn main() -> fuzzy_control::Result<()> {
//! let mut builder = InferenceSystem::builder();
//! let service = builder.antecedent("service", Universe::new(0., 10., 1.)?)?;
//! let tip = builder.consequent("tip", Universe::new(0., 30., 1.)?)?;
//!
//! builder
//!     .term(service, "poor", MembershipFunction::triangular(0., 0., 5.)?)?
//!     .term(service, "good", MembershipFunction::triangular(5., 10., 10.)?)?
//!     .term(tip, "low", MembershipFunction::triangular(0., 5., 10.)?)?
//!     .term(tip, "high", MembershipFunction::triangular(20., 25., 30.)?)?;
//!
//! builder
//!     .rule(service.is("poor"), tip.is("low"))
//!     .rule(service.is("good"), tip.is("high"));
//!
//! let system = builder.build()?;
//! let outputs = system.evaluate(&Inputs::new().with(service, 10.))?;
//!
//! assert_eq!(outputs.crisp(tip), Some(25.));
//! # Ok(())
//! # }
//! ```

mod context;
mod dsl;
mod error;
mod inference;
mod inputs;
mod linspace;
mod math;
mod membership;
mod ops;
mod outputs;
mod rules;
mod terms;
mod universe;
mod variable;

pub mod elevator;
pub mod model;
pub mod surface;

pub use dsl::Expr;
pub use error::{FuzzyError, Result};
pub use inference::{EmptyAggregate, InferenceConfig, InferenceSystem, SystemBuilder};
pub use inputs::Inputs;
pub use membership::MembershipFunction;
pub use ops::{AndOp, DefuzzificationOp, ImplicationOp, OrOp, ProductionLink};
pub use outputs::{Output, Outputs};
pub use rules::{Conclusion, Rule, Rules};
pub use terms::Terms;
pub use universe::{Universe, MAX_SAMPLES};
pub use variable::{Antecedent, Consequent, LinguisticVariable, Variable, VariableKey, VariableKind};
