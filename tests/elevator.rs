use std::thread;

use fuzzy_control::elevator::{Elevator, CONDITION, FLOOR, FLOORS, WEIGHT};
use fuzzy_control::surface::{Axis, Surface};
use fuzzy_control::{
    model, DefuzzificationOp, EmptyAggregate, FuzzyError, InferenceConfig, InferenceSystem, Rule, Universe,
};

const ELEVATOR_MODEL: &str = include_str!("../models/elevator.json");

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn clipped() -> InferenceConfig {
    InferenceConfig {
        clip_inputs: true,
        ..InferenceConfig::default()
    }
}

#[test]
fn test_typical_call() {
    let elevator = Elevator::new().unwrap();
    let condition = elevator.condition(1200., 20., 30.).unwrap();

    assert_close(condition, 36.85717785399315);
    assert!((0. ..=100.).contains(&condition));
}

#[test]
fn test_typical_call_firing_strengths() {
    let elevator = Elevator::new().unwrap();
    let outputs = elevator
        .system
        .evaluate_named([(WEIGHT, 1200.), (FLOOR, 20.), (FLOORS, 30.)])
        .unwrap();
    let firing = outputs.firing_strengths();

    assert_eq!(firing.len(), 6);
    assert_close(firing[0], 0.40816326530612246);
    assert_eq!(&firing[1..5], &[0., 0., 0., 0.]);
    assert_close(firing[5], 0.5918367346938775);

    let output = outputs.output(CONDITION).unwrap();
    assert_eq!(output.universe().len(), 101);
    assert!(!output.is_fallback());
    // "eficiente" clipped at rule 1's strength on its plateau
    assert_close(output.membership()[10], 0.40816326530612246);
    // "moderada" clipped at rule 6's strength around its peak
    assert_close(output.membership()[50], 0.5918367346938775);
}

#[test]
fn test_clipped_inputs() {
    let elevator = Elevator::with_config(clipped()).unwrap();
    assert_close(elevator.condition(1200., 20., 30.).unwrap(), 25.48663101604273);

    let elevator = Elevator::with_config(InferenceConfig {
        defuzz_op: DefuzzificationOp::Cog,
        ..clipped()
    })
    .unwrap();
    assert_close(elevator.condition(1200., 20., 30.).unwrap(), 25.765765765765707);

    let elevator = Elevator::with_config(InferenceConfig {
        defuzz_op: DefuzzificationOp::Cog,
        ..InferenceConfig::default()
    })
    .unwrap();
    assert_close(elevator.condition(1200., 20., 30.).unwrap(), 37.08635280584996);
}

#[test]
fn test_weight_below_universe() {
    // 999 is outside every weight term, so only the catch-all fires
    let elevator = Elevator::new().unwrap();
    let outputs = elevator
        .system
        .evaluate_named([(WEIGHT, 999.), (FLOOR, 20.), (FLOORS, 30.)])
        .unwrap();

    assert_eq!(outputs.firing_strengths()[5], 1.);
    assert_close(outputs.crisp(elevator.condition).unwrap(), 50.);
}

fn without_catch_all(config: InferenceConfig) -> Elevator {
    Elevator::with_rules(config, |weight, floor, floors, condition| {
        Ok(Elevator::rules(weight, floor, floors, condition)?
            .into_iter()
            .take(5)
            .collect())
    })
    .unwrap()
}

#[test]
fn test_no_rule_fires() {
    let elevator = without_catch_all(InferenceConfig::default());
    assert_eq!(elevator.system.rules().len(), 5);

    let err = elevator.condition(999., 20., 30.).unwrap_err();
    assert!(matches!(err, FuzzyError::EmptyAggregate(ref name) if name == CONDITION));
    assert!(!err.is_configuration());

    let elevator = without_catch_all(InferenceConfig {
        on_empty: EmptyAggregate::Midpoint,
        ..InferenceConfig::default()
    });
    let outputs = elevator
        .system
        .evaluate_named([(WEIGHT, 999.), (FLOOR, 20.), (FLOORS, 30.)])
        .unwrap();
    let output = outputs.output_of(elevator.condition).unwrap();

    assert_eq!(output.crisp(), 50.);
    assert!(output.is_fallback());
    assert!(output.membership().iter().all(|mu| *mu == 0.));
}

#[test]
fn test_weight_vertex() {
    let elevator = Elevator::new().unwrap();
    let weight = elevator.system.variable(WEIGHT).unwrap();

    assert_eq!(weight.fuzzify(1250.), vec![1., 0., 1.]);
    assert_eq!(weight.term_degree("pesado", 1250.).unwrap(), 1.);
    assert_eq!(weight.term_degree("pesado", 1000.).unwrap(), 0.);
    assert_eq!(weight.term_degree("leve", 1000.).unwrap(), 1.);
    assert_eq!(weight.term_degree("medio", 1375.).unwrap(), 1.);
}

#[test]
fn test_middle_building() {
    let elevator = Elevator::new().unwrap();
    let outputs = elevator
        .system
        .evaluate_named([(WEIGHT, 1300.), (FLOOR, 40.), (FLOORS, 50.)])
        .unwrap();
    let firing = outputs.firing_strengths();

    assert_close(firing[2], 0.4);
    assert_close(firing[5], 0.4);
    assert_close(outputs.crisp(elevator.condition).unwrap(), 50.);
}

#[test]
fn test_aggregation_takes_maximum() {
    // Two rules imply "moderada" at different strengths: floor 40 is 0.2 "baixo"
    // and 0.6 "medio"
    let elevator = Elevator::with_rules(InferenceConfig::default(), |_, floor, _, condition| {
        Ok(vec![
            Rule::new(floor.is("baixo"), condition.is("moderada")),
            Rule::new(floor.is("medio"), condition.is("moderada")),
        ])
    })
    .unwrap();

    let outputs = elevator
        .system
        .evaluate_named([(WEIGHT, 1200.), (FLOOR, 40.), (FLOORS, 30.)])
        .unwrap();
    let firing = outputs.firing_strengths();
    assert_close(firing[0], 0.2);
    assert_close(firing[1], 0.6);

    let output = outputs.output_of(elevator.condition).unwrap();
    assert_close(output.membership()[50], 0.6);
    assert!(output.membership().iter().all(|mu| *mu <= 0.6 + 1e-12));
    assert_close(output.crisp(), 50.);
}

#[test]
fn test_evaluation_is_repeatable() {
    let elevator = Elevator::new().unwrap();
    let first = elevator.condition(1200., 20., 30.).unwrap();

    for _ in 0..10 {
        assert_eq!(elevator.condition(1200., 20., 30.).unwrap(), first);
    }
    assert_close(elevator.condition(1300., 40., 50.).unwrap(), 50.);
    assert_eq!(elevator.condition(1200., 20., 30.).unwrap(), first);
}

#[test]
fn test_model_file_matches_preset() {
    let preset = Elevator::new().unwrap();
    let loaded = model::from_json(ELEVATOR_MODEL).unwrap();

    assert_eq!(loaded.rules().len(), 6);
    assert_eq!(loaded.variables().count(), 4);

    for (weight, floor, floors) in [(1200., 20., 30.), (999., 20., 30.), (1300., 40., 50.), (1450., 90., 80.)] {
        let expected = preset.condition(weight, floor, floors).unwrap();
        let outputs = loaded
            .evaluate_named([(WEIGHT, weight), (FLOOR, floor), (FLOORS, floors)])
            .unwrap();

        assert_eq!(outputs.crisp_by_name(CONDITION), Some(expected));
    }
}

#[test]
fn test_missing_input() {
    let elevator = Elevator::new().unwrap();
    let result = elevator.system.evaluate_named([(WEIGHT, 1200.), (FLOOR, 20.)]);

    assert!(matches!(result, Err(FuzzyError::MissingInput(ref name)) if name == FLOORS));
    assert!(matches!(
        elevator.system.evaluate_named([(CONDITION, 10.)]),
        Err(FuzzyError::NotAnAntecedent(_))
    ));
}

#[test]
fn test_non_finite_inputs_are_rejected() {
    let elevator = Elevator::new().unwrap();

    for (weight, floor, floors) in [
        (f64::NAN, 20., 30.),
        (1200., f64::NAN, 30.),
        (1200., f64::INFINITY, 30.),
        (1200., 20., f64::NEG_INFINITY),
    ] {
        let err = elevator.condition(weight, floor, floors).unwrap_err();

        assert!(matches!(err, FuzzyError::InvalidInput { .. }), "{err}");
        assert!(!err.is_configuration());
    }

    // Clipping does not turn a NaN into a value
    let clipped = Elevator::with_config(clipped()).unwrap();
    assert!(matches!(
        clipped.condition(f64::NAN, 20., 30.),
        Err(FuzzyError::InvalidInput { ref variable, .. }) if variable == WEIGHT
    ));
}

#[test]
fn test_shared_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InferenceSystem>();
    assert_send_sync::<Elevator>();

    let elevator = Elevator::new().unwrap();
    let calls: Vec<(f64, f64, f64)> = (0..8)
        .map(|i| (1000. + 60. * i as f64, 10. * i as f64, 5. + 10. * i as f64))
        .collect();
    let expected: Vec<_> = calls
        .iter()
        .map(|(w, f, n)| elevator.condition(*w, *f, *n).ok())
        .collect();

    let actual: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = calls
            .iter()
            .map(|(w, f, n)| {
                let elevator = &elevator;
                s.spawn(move || elevator.condition(*w, *f, *n).ok())
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(actual, expected);
}

#[test]
fn test_surface_has_holes() {
    let elevator = Elevator::new().unwrap();
    let surface = Surface::compute(
        &elevator.system,
        &Axis::new(WEIGHT, Universe::new(1000., 1500., 10.).unwrap()),
        &Axis::new(FLOOR, Universe::new(0., 100., 10.).unwrap()),
        [(FLOORS, 50.)],
        CONDITION,
    )
    .unwrap();

    assert_eq!(surface.x().len(), 51);
    assert_eq!(surface.y().len(), 11);
    assert_eq!(surface.rows().count(), 11);

    // Light load called to the top of a mid-size building: nothing fires
    assert_eq!(surface.value(0, 10), None);
    // Out of range
    assert_eq!(surface.value(51, 0), None);

    let expected = elevator.condition(1300., 40., 50.).unwrap();
    assert_eq!(surface.value(30, 4), Some(expected));
}
