use asteria::constraints::{
    default_visibility_constraints, EarthLimbConstraint, MoonSeparationConstraint,
    OrbitNightConstraint, SunSeparationConstraint, VisibilityConstraint,
};
use asteria::ephem;
use asteria::survey::{SurveyConfig, SurveyModel};
use asteria::time::{Epoch, Unit};

use crate::circular_orbit;

fn small_config() -> SurveyConfig {
    SurveyConfig::builder()
        .exposure_time(8.0 * Unit::Minute)
        .time_steps_per_exposure(2)
        .nside(8)
        .build()
}

fn model_with(constraints: Vec<Box<dyn VisibilityConstraint>>) -> SurveyModel {
    SurveyModel::new(circular_orbit(), constraints, small_config()).unwrap()
}

#[test]
fn field_of_regard_is_idempotent() {
    let model = model_with(default_visibility_constraints());
    let times = model.times(model.orbit().epoch());
    let times = &times[..8];
    let first = model.field_of_regard(times, None).unwrap();
    let second = model.field_of_regard(times, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn worker_count_does_not_change_the_matrix() {
    let model = model_with(default_visibility_constraints());
    let times = model.times(model.orbit().epoch());
    let times = &times[..8];
    let pooled = model.field_of_regard(times, Some(2)).unwrap();
    let global = model.field_of_regard(times, None).unwrap();
    assert_eq!(pooled, global);
}

#[test]
fn rows_are_independent_of_evaluation_order() {
    let model = model_with(default_visibility_constraints());
    let times = model.times(model.orbit().epoch());
    let times = &times[..6];
    let forward = model.field_of_regard(times, None).unwrap();

    let reversed: Vec<Epoch> = times.iter().rev().copied().collect();
    let backward = model.field_of_regard(&reversed, None).unwrap();

    for step in 0..times.len() {
        assert_eq!(
            forward.row(step),
            backward.row(times.len() - 1 - step),
            "row for time step {step} depends on its neighbors"
        );
    }
}

#[test]
fn dropping_a_constraint_never_loses_visibility() {
    let full = model_with(default_visibility_constraints());
    // A subset of the full stack
    let reduced = model_with(vec![
        Box::new(EarthLimbConstraint::new(28.0)),
        Box::new(SunSeparationConstraint::new(46.0)),
    ]);

    let times = full.times(full.orbit().epoch());
    let times = &times[..10];
    let full_matrix = full.field_of_regard(times, None).unwrap();
    let reduced_matrix = reduced.field_of_regard(times, None).unwrap();

    for step in 0..times.len() {
        for cell in 0..full_matrix.n_directions() {
            if full_matrix.at(step, cell) {
                assert!(
                    reduced_matrix.at(step, cell),
                    "removing constraints lost visibility at ({step}, {cell})"
                );
            }
        }
    }
    assert!(reduced_matrix.observable_fraction() >= full_matrix.observable_fraction());
}

#[test]
fn antisolar_direction_passes_sun_constraint() {
    let orbit = circular_orbit();
    let epoch = orbit.epoch();
    let antisolar = -ephem::sun_position(epoch).normalize();
    let toward_sun = -antisolar;

    let config = SurveyConfig::builder()
        .exposure_time(8.0 * Unit::Minute)
        .centers(vec![antisolar, toward_sun])
        .build();
    let model = SurveyModel::new(
        orbit,
        vec![Box::new(SunSeparationConstraint::new(46.0))],
        config,
    )
    .unwrap();

    let matrix = model.field_of_regard(&[epoch], None).unwrap();
    assert!(matrix.at(0, 0), "antisolar direction must pass");
    assert!(!matrix.at(0, 1), "sunward direction must fail");
}

#[test]
fn night_gate_blanks_entire_rows() {
    let mut constraints = default_visibility_constraints();
    constraints.push(Box::new(OrbitNightConstraint::new()));
    let gated = model_with(constraints);

    // One full orbit: a 29 degree beta angle guarantees both day and night
    let times = gated.times(gated.orbit().epoch());
    let matrix = gated.field_of_regard(&times, None).unwrap();

    let mut day_rows = 0;
    let mut night_rows = 0;
    for (step, epoch) in times.iter().enumerate() {
        let night = gated.is_night(*epoch).unwrap();
        let any_visible = matrix.row(step).iter().any(|ok| *ok);
        if night {
            night_rows += 1;
        } else {
            day_rows += 1;
            assert!(!any_visible, "daylit step {step} must be fully blanked");
        }
    }
    assert!(day_rows > 0 && night_rows > 0, "{day_rows} day / {night_rows} night");
}

#[test]
fn moon_constraint_carves_a_disk() {
    let model = model_with(vec![Box::new(MoonSeparationConstraint::new(23.0))]);
    let epoch = model.orbit().epoch();
    let matrix = model.field_of_regard(&[epoch], None).unwrap();
    let fraction = matrix.observable_fraction();
    // A 23 degree exclusion radius removes about 4 percent of the sky
    assert!(
        (0.90..0.99).contains(&fraction),
        "moon carved {fraction} observable"
    );
}
