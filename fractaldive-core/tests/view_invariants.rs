//! Invariants of `ViewState` under arbitrary input sequences.

use fractaldive_core::{
    ControlProfile, InputAction, InputController, InputSnapshot, Variant, ViewState,
    COMPUTE_PRESETS, DEFAULT_MAX_ITERATIONS, MAX_ITERATION_CEILING,
};
use proptest::prelude::*;

fn arb_action() -> impl Strategy<Value = InputAction> {
    prop_oneof![
        Just(InputAction::PanUp),
        Just(InputAction::PanDown),
        Just(InputAction::PanLeft),
        Just(InputAction::PanRight),
        Just(InputAction::ZoomIn),
        Just(InputAction::ZoomOut),
        (0usize..4).prop_map(|i| InputAction::SelectVariant(Variant::ALL[i])),
    ]
}

fn arb_snapshot() -> impl Strategy<Value = InputSnapshot> {
    prop::collection::vec(arb_action(), 0..5).prop_map(|actions| {
        actions
            .into_iter()
            .fold(InputSnapshot::default(), |snap, action| snap.with(action))
    })
}

fn arb_profile() -> impl Strategy<Value = ControlProfile> {
    prop_oneof![Just(ControlProfile::compute()), Just(ControlProfile::classic())]
}

fn start_view() -> ViewState {
    ViewState::from_preset(
        Variant::Mandelbrot,
        COMPUTE_PRESETS.get(Variant::Mandelbrot),
        DEFAULT_MAX_ITERATIONS,
    )
}

proptest! {
    #[test]
    fn zoom_stays_positive_and_variant_stays_valid(
        profile in arb_profile(),
        frames in prop::collection::vec(arb_snapshot(), 1..400),
    ) {
        let controller = InputController::new(profile);
        let mut view = start_view();
        for input in &frames {
            controller.apply(input, &mut view);
            prop_assert!(view.zoom() > 0.0);
            prop_assert!(view.zoom().is_finite());
            prop_assert!(Variant::from_index(view.variant().index()).is_some());
            prop_assert!(view.center().0.is_finite() && view.center().1.is_finite());
            prop_assert!(view.max_iterations() >= 1);
            prop_assert!(view.max_iterations() <= MAX_ITERATION_CEILING);
        }
    }

    #[test]
    fn long_zoom_in_never_reaches_zero(frames in 1usize..20_000) {
        let controller = InputController::new(ControlProfile::compute());
        let input = InputSnapshot::default().with(InputAction::ZoomIn);
        let mut view = start_view();
        for _ in 0..frames {
            controller.apply(&input, &mut view);
        }
        prop_assert!(view.zoom() > 0.0);
    }

    #[test]
    fn single_pan_moves_by_step_times_zoom(
        zoom in 1e-10f64..100.0,
        cx in -2.0f64..2.0,
        cy in -2.0f64..2.0,
    ) {
        let profile = ControlProfile::compute();
        let controller = InputController::new(profile);
        let preset = fractaldive_core::Preset::new((cx, cy), zoom);
        let mut view = ViewState::from_preset(Variant::Julia, preset, 100);

        controller.apply(&InputSnapshot::default().with(InputAction::PanDown), &mut view);

        prop_assert_eq!(view.center().1, cy + profile.step_base * zoom);
        prop_assert_eq!(view.center().0, cx);
    }

    #[test]
    fn selection_restores_exact_preset(
        variant_slot in 0usize..4,
        history in prop::collection::vec(arb_snapshot(), 0..50),
    ) {
        let profile = ControlProfile::compute();
        let controller = InputController::new(profile);
        let mut view = start_view();
        for input in &history {
            controller.apply(input, &mut view);
        }

        let variant = Variant::ALL[variant_slot];
        controller.apply(
            &InputSnapshot::default().with(InputAction::SelectVariant(variant)),
            &mut view,
        );

        let preset = profile.presets.get(variant);
        prop_assert_eq!(view.variant(), variant);
        prop_assert_eq!(view.center(), preset.center);
        prop_assert_eq!(view.zoom(), preset.zoom);
    }
}
