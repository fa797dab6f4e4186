use fuzzy_control::elevator::{Elevator, CONDITION, FLOOR, FLOORS, WEIGHT};
use fuzzy_control::{EmptyAggregate, InferenceConfig, MembershipFunction, Rule};
use proptest::prelude::*;

fn sorted<const N: usize>(mut params: [f64; N]) -> [f64; N] {
    params.sort_by(f64::total_cmp);
    params
}

fn midpoint_config() -> InferenceConfig {
    InferenceConfig {
        on_empty: EmptyAggregate::Midpoint,
        ..InferenceConfig::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 200,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_triangular_bounds(
        params in prop::array::uniform3(-1000.0..1000.0f64),
        x in -2000.0..2000.0f64,
    ) {
        let [a, b, c] = sorted(params);
        let mf = MembershipFunction::triangular(a, b, c).unwrap();
        let degree = mf.degree(x);

        prop_assert!((0.0..=1.0).contains(&degree));
        prop_assert_eq!(mf.degree(b), 1.);
        if x < a || x > c {
            prop_assert_eq!(degree, 0.);
        }
    }

    #[test]
    fn prop_trapezoidal_bounds(
        params in prop::array::uniform4(-1000.0..1000.0f64),
        x in -2000.0..2000.0f64,
    ) {
        let [a, b, c, d] = sorted(params);
        let mf = MembershipFunction::trapezoidal(a, b, c, d).unwrap();
        let degree = mf.degree(x);

        prop_assert!((0.0..=1.0).contains(&degree));
        if x < a || x > d {
            prop_assert_eq!(degree, 0.);
        }
        if (b..=c).contains(&x) {
            prop_assert_eq!(degree, 1.);
        }
    }

    #[test]
    fn prop_condition_within_universe(
        weight in 900.0..1600.0f64,
        floor in -10.0..110.0f64,
        floors in -10.0..110.0f64,
    ) {
        let elevator = Elevator::new().unwrap();

        if let Ok(condition) = elevator.condition(weight, floor, floors) {
            prop_assert!((-1e-9..=100.0 + 1e-9).contains(&condition));
        }
    }

    #[test]
    fn prop_evaluation_is_deterministic(
        weight in 1000.0..1500.0f64,
        floor in 0.0..100.0f64,
        floors in 1.0..100.0f64,
    ) {
        let elevator = Elevator::new().unwrap();
        let first = elevator.condition(weight, floor, floors).ok();

        prop_assert_eq!(elevator.condition(weight, floor, floors).ok(), first);
    }

    #[test]
    fn prop_rule_order_is_irrelevant(
        weight in 1000.0..1500.0f64,
        floor in 0.0..100.0f64,
        floors in 1.0..100.0f64,
    ) {
        let forward = Elevator::new().unwrap();
        let reversed = Elevator::with_rules(InferenceConfig::default(), |w, f, n, c| {
            let mut rules = Elevator::rules(w, f, n, c)?;
            rules.reverse();
            Ok(rules)
        })
        .unwrap();

        let expected = forward.condition(weight, floor, floors).ok();
        prop_assert_eq!(reversed.condition(weight, floor, floors).ok(), expected);
    }

    #[test]
    fn prop_complement_laws(
        weight in 1000.0..1500.0f64,
        floor in 0.0..100.0f64,
    ) {
        // not (a and b) fires exactly as (not a) or (not b) under min/max
        let elevator = Elevator::with_rules(midpoint_config(), |w, f, _, c| {
            Ok(vec![
                Rule::new(w.is("leve").and(f.is("alto")).not(), c.is("moderada")),
                Rule::new(w.is("leve").not().or(f.is("alto").not()), c.is("moderada")),
                Rule::new(w.is("pesado").not(), c.is("moderada")),
                Rule::new(w.is("pesado"), c.is("moderada")),
            ])
        })
        .unwrap();

        let outputs = elevator
            .system
            .evaluate_named([(WEIGHT, weight), (FLOOR, floor), (FLOORS, 30.)])
            .unwrap();
        let firing = outputs.firing_strengths();

        prop_assert_eq!(firing[0], firing[1]);
        prop_assert_eq!(firing[2], 1. - firing[3]);
        prop_assert!(outputs.crisp_by_name(CONDITION).is_some());
    }
}
