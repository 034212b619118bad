// tests/validation.rs
//
// Integration-style validation tests (model sanity checks).
// Run with: cargo test
// Or only these tests: cargo test --test validation

use pmm_sim::detector::Detector;
use pmm_sim::drive::Waveform;
use pmm_sim::grid::{SquareGrid, triangle_weighted_sum};
use pmm_sim::hysteresis::{Direction, HysteresisEngine};
use pmm_sim::params::{DetectorParams, HysteresisParams, MU_0, ResonatorParams};
use pmm_sim::resonator::Resonator;
use pmm_sim::SimError;

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

fn unit_engine() -> HysteresisEngine {
    HysteresisEngine::new(HysteresisParams::new(1.0, 1.0, 0.5, 10)).unwrap()
}

#[test]
fn construction_rejects_bad_plane_parameters() {
    let odd = HysteresisEngine::new(HysteresisParams::new(1.0, 1.0, 0.5, 7));
    let zero = HysteresisEngine::new(HysteresisParams::new(1.0, 1.0, 0.5, 0));
    let equal = HysteresisEngine::new(HysteresisParams::new(1.0, 0.5, 0.5, 10));
    let inverted = HysteresisEngine::new(HysteresisParams::new(1.0, 0.2, 0.5, 10));

    assert!(matches!(odd, Err(SimError::InvalidParameter(_))));
    assert!(matches!(zero, Err(SimError::InvalidParameter(_))));
    assert!(matches!(equal, Err(SimError::InvalidParameter(_))));
    assert!(matches!(inverted, Err(SimError::InvalidParameter(_))));
}

#[test]
fn invalid_direction_name_is_rejected() {
    let err = "left".parse::<Direction>().unwrap_err();
    assert!(matches!(err, SimError::InvalidDirection(ref s) if s == "left"));
}

#[test]
fn output_is_bounded_by_y_max_and_plateaus_past_saturation() {
    let mut e = unit_engine();
    let y_max = e.y_max();

    // Drive far past positive saturation, one unit at a time.
    for _ in 0..20 {
        e.increment(Direction::Up).unwrap();
        assert!(e.y().abs() <= y_max + 1e-12);
    }
    assert_eq!(e.x(), 20);
    let relays_high = e.relays().clone();
    let y_high = e.y();

    e.increment(Direction::Up).unwrap();
    assert_eq!(e.relays(), &relays_high);
    assert_eq!(e.y(), y_high);

    // Coming back down switches nothing until x re-enters [-N/2, N/2].
    for _ in 0..15 {
        e.increment(Direction::Down).unwrap();
    }
    assert_eq!(e.x(), 5);
    assert_eq!(e.y(), y_high);

    for _ in 0..40 {
        e.increment(Direction::Down).unwrap();
        assert!(e.y().abs() <= y_max + 1e-12);
    }
    assert_eq!(e.x(), -35);
    assert!(approx_eq(e.y(), -y_max, 1e-12));

    // Same plateau on the negative side: x keeps moving, relays do not.
    let relays_low = e.relays().clone();
    let y_low = e.y();
    e.increment(Direction::Down).unwrap();
    assert_eq!(e.x(), -36);
    assert_eq!(e.relays(), &relays_low);
    assert_eq!(e.y(), y_low);

    // Stepping up from deep negative saturation is also inert until x = -N/2.
    for _ in 0..30 {
        e.increment(Direction::Up).unwrap();
    }
    assert_eq!(e.x(), -6);
    assert_eq!(e.relays(), &relays_low);
    assert_eq!(e.y(), y_low);
}

#[test]
fn history_grows_by_unit_steps_not_calls() {
    let mut e = unit_engine();
    // coordinates: 0 -> 3 -> 3 -> -2 -> 5 (x_scale = 5)
    e.set_x(0.6).unwrap();
    e.set_x(0.6).unwrap();
    e.set_x(-0.4).unwrap();
    e.set_x(1.0).unwrap();

    let steps = 3 + 0 + 5 + 7;
    assert_eq!(e.history().len(), 1 + steps);
}

#[test]
fn returning_to_zero_field_remembers_the_excursion() {
    let mut e = unit_engine();
    let y_first = e.set_x(0.0).unwrap();
    e.set_x(1.0).unwrap();
    let y_second = e.set_x(0.0).unwrap();

    assert!(
        (y_second - y_first).abs() > 0.1,
        "zero-field output should differ after saturation: {} vs {}",
        y_first,
        y_second
    );
    assert!(approx_eq(y_second, 0.5, 1e-12));
}

#[test]
fn fresh_weights_are_symmetric_with_remanent_quadrant() {
    for (size, y_rem) in [(10, 0.5), (24, 0.3), (100, 949.36)] {
        let y_sat = if y_rem > 1.0 { 1401.4 } else { 1.0 };
        let e = HysteresisEngine::new(HysteresisParams::new(1.0, y_sat, y_rem, size)).unwrap();
        let w = e.weights();
        assert!(w.is_symmetric(1e-12));
        let q = w.block_sum(0, 0, size / 2);
        assert!(approx_eq(q, y_rem, 1e-9 * y_rem.max(1.0)), "quadrant sum {} vs {}", q, y_rem);
    }
}

#[test]
fn repeating_the_same_field_is_a_no_op() {
    let mut e = unit_engine();
    e.set_x(0.35).unwrap();
    let x = e.x();
    let y = e.y();
    let relays = e.relays().clone();
    let len = e.history().len();

    let y_again = e.set_x(0.35).unwrap();
    assert_eq!(e.x(), x);
    assert_eq!(y_again, y);
    assert_eq!(e.relays(), &relays);
    assert_eq!(e.history().len(), len);
}

#[test]
fn major_loop_then_zero_lands_on_negative_remanence() {
    let mut e = unit_engine();
    let y0 = e.y();

    let y_up = e.set_x(1.0).unwrap();
    let y_down = e.set_x(-1.0).unwrap();
    let y_end = e.set_x(0.0).unwrap();

    assert!(approx_eq(y_up, 1.0, 1e-12));
    assert!(approx_eq(y_down, -1.0, 1e-12));
    assert!(approx_eq(y_end, -0.5, 1e-12));
    assert!((y_end - y0).abs() > 0.1, "y_end={} y0={}", y_end, y0);
    assert_eq!(e.history().len(), 1 + 5 + 10 + 5);
}

#[test]
fn minor_loop_stays_inside_major_loop() {
    let mut e = unit_engine();
    e.set_x(1.0).unwrap();
    let y_rem = e.set_x(0.0).unwrap();

    // A partial reversal to -0.4 and back cannot push the output past the
    // saturated values, and the return to zero lands below the remanence.
    let y_partial = e.set_x(-0.4).unwrap();
    let y_back = e.set_x(0.0).unwrap();
    assert!(y_partial > -1.0 && y_partial < y_rem);
    assert!(y_back <= y_rem);
    assert!(y_back >= y_partial);
}

#[test]
fn triangle_sum_rejects_mismatched_grids() {
    let a = SquareGrid::ones(4);
    let b = SquareGrid::ones(2);
    assert!(matches!(
        triangle_weighted_sum(&a, &b),
        Err(SimError::ShapeMismatch { .. })
    ));
}

#[test]
fn decaying_sweep_demagnetises_the_resonator() {
    let mut r = Resonator::with_params(
        10.0,
        ResonatorParams {
            size: 40,
            ..ResonatorParams::default()
        },
    )
    .unwrap();

    r.set_current(0.020).unwrap();
    let remanent = {
        r.set_current(0.0).unwrap();
        r.state().mag
    };

    let sweep = Waveform::Decaying {
        amplitude: 0.020,
        decay: 0.7,
        cycles: 8,
        points_per_leg: 10,
    };
    for i in sweep.samples().unwrap() {
        r.set_current(i).unwrap();
    }

    let after = r.state().mag;
    assert!(after.abs() < remanent.abs(), "after={} remanent={}", after, remanent);
    assert!(r.freq() < 10.0 + (MU_0 * remanent).powi(2));
}

#[test]
fn crossbar_cells_see_row_plus_column_current() {
    let params = DetectorParams {
        rows: 2,
        cols: 2,
        fstart: 0.0,
        fstop: 20.0,
        resonator: ResonatorParams {
            size: 10,
            ..ResonatorParams::default()
        },
    };
    let mut d = Detector::new(params).unwrap();

    let i = 0.004;
    let j = 0.007;
    d.set_row_current(i, 0).unwrap();
    d.set_col_current(j, 0).unwrap();

    let current = |r: usize, c: usize| d.resonator(r, c).unwrap().state().current;
    assert_eq!(current(0, 0), i + j);
    assert_eq!(current(1, 0), j);
    assert_eq!(current(0, 1), i);
    assert_eq!(current(1, 1), 0.0);

    // The combined cell is driven further up its loop than either neighbour.
    let mag = |r: usize, c: usize| d.resonator(r, c).unwrap().state().mag;
    assert!(mag(0, 0) > mag(1, 0));
    assert!(mag(0, 0) > mag(0, 1));
}

#[test]
fn crossbar_update_order_does_not_matter_for_the_final_current() {
    let params = DetectorParams {
        rows: 3,
        cols: 3,
        resonator: ResonatorParams {
            size: 10,
            ..ResonatorParams::default()
        },
        ..DetectorParams::default()
    };
    let mut a = Detector::new(params.clone()).unwrap();
    let mut b = Detector::new(params).unwrap();

    a.set_row_current(0.01, 2).unwrap();
    a.set_col_current(-0.003, 1).unwrap();
    b.set_col_current(-0.003, 1).unwrap();
    b.set_row_current(0.01, 2).unwrap();

    let sa = a.resonator(2, 1).unwrap().state();
    let sb = b.resonator(2, 1).unwrap().state();
    assert_eq!(sa.current, sb.current);
    assert!(approx_eq(sa.current, 0.007, 1e-15));
}
