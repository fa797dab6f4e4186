use crate::context::EvaluationContext;
use crate::error::{FuzzyError, Result};
use crate::ops::{AndOp, OrOp};
use crate::variable::{Antecedent, Variable, VariableKey};

/// A rule premise: propositions about antecedent terms joined by fuzzy connectives.
///
/// Build with [`Variable::is`] and the `and`/`or`/`not` combinators:
///
/// ```ignore
/// let premise = weight.is("leve").and(floor.is("baixo")).or(floors.is("alto").not());
/// ```
// TODO: Support hedges (very, somewhat) as unary modifiers on `Is`
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Is(VariableKey, String),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn and(self, rhs: Expr) -> Self {
        Expr::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Expr) -> Self {
        Expr::Or(Box::new(self), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Conjunction of every expression, left to right.
    pub fn all(exprs: impl IntoIterator<Item = Expr>) -> Result<Self> {
        exprs.into_iter().reduce(Expr::and).ok_or(FuzzyError::EmptyExpression("and"))
    }

    /// Disjunction of every expression, left to right.
    pub fn any(exprs: impl IntoIterator<Item = Expr>) -> Result<Self> {
        exprs.into_iter().reduce(Expr::or).ok_or(FuzzyError::EmptyExpression("or"))
    }

    /// Every `(variable, term)` the expression refers to, depth first.
    pub fn propositions(&self) -> Vec<(VariableKey, &str)> {
        let mut props = Vec::new();

        fn parse<'p>(expr: &'p Expr, out: &mut Vec<(VariableKey, &'p str)>) {
            match expr {
                Expr::Is(var_key, term) => out.push((*var_key, term)),
                Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                    parse(lhs, out);
                    parse(rhs, out);
                },
                Expr::Not(expr) => parse(expr, out),
            }
        }

        parse(self, &mut props);

        props
    }

    /// Truth of the expression in `[0, 1]` given the fuzzified inputs.
    pub(crate) fn evaluate(&self, ctx: &EvaluationContext<'_>, and_op: AndOp, or_op: OrOp) -> Result<f64> {
        match self {
            Expr::Is(var_key, term) => ctx.degree(*var_key, term),
            Expr::And(lhs, rhs) => {
                let left = lhs.evaluate(ctx, and_op, or_op)?;
                let right = rhs.evaluate(ctx, and_op, or_op)?;

                Ok(and_op.call(left, right))
            },
            Expr::Or(lhs, rhs) => {
                let left = lhs.evaluate(ctx, and_op, or_op)?;
                let right = rhs.evaluate(ctx, and_op, or_op)?;

                Ok(or_op.call(left, right))
            },
            Expr::Not(expr) => Ok(1. - expr.evaluate(ctx, and_op, or_op)?),
        }
    }
}

impl Variable<Antecedent> {
    /// Proposition "this variable is `term`".
    pub fn is(self, term: impl Into<String>) -> Expr {
        Expr::Is(self.0, term.into())
    }
}

#[test]
fn test_propositions() {
    use slotmap::SlotMap;

    let mut keys = SlotMap::<VariableKey, ()>::with_key();
    let weight = Variable::<Antecedent>::new(keys.insert(()));
    let floor = Variable::<Antecedent>::new(keys.insert(()));

    let expr = weight.is("leve").and(floor.is("baixo").not()).or(weight.is("pesado"));

    assert_eq!(
        expr.propositions(),
        vec![(weight.key(), "leve"), (floor.key(), "baixo"), (weight.key(), "pesado")]
    );
}

#[test]
fn test_all_any() {
    use slotmap::SlotMap;

    let mut keys = SlotMap::<VariableKey, ()>::with_key();
    let weight = Variable::<Antecedent>::new(keys.insert(()));

    let any = Expr::any(["leve", "medio", "pesado"].map(|t| weight.is(t))).unwrap();
    assert_eq!(
        any,
        weight.is("leve").or(weight.is("medio")).or(weight.is("pesado"))
    );
    assert_eq!(Expr::all(Some(weight.is("leve"))).unwrap(), weight.is("leve"));

    assert!(matches!(Expr::all(None::<Expr>), Err(FuzzyError::EmptyExpression("and"))));
    assert!(matches!(Expr::any(Vec::<Expr>::new()), Err(FuzzyError::EmptyExpression("or"))));
}
