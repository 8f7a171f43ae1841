use asteria::constraints::default_visibility_constraints;
use asteria::survey::{SurveyConfig, SurveyError, SurveyModel};
use asteria::time::Unit;

use crate::{circular_orbit, iss_orbit};

#[test]
fn iss_cadence_truncates() {
    // 92.9 minute period over the default 10 minute exposures
    let model = SurveyModel::new(
        iss_orbit(),
        default_visibility_constraints(),
        SurveyConfig::builder().build(),
    )
    .unwrap();
    assert_eq!(model.exposures_per_orbit(), 9);
    assert_eq!(model.time_steps(), 92);
}

#[test]
fn exposures_per_orbit_divides_exactly() {
    // 96 minute period over 8 minute exposures: exactly 12 per orbit
    let config = SurveyConfig::builder()
        .exposure_time(8.0 * Unit::Minute)
        .time_steps_per_exposure(10)
        .number_of_orbits(2)
        .build();
    let model = SurveyModel::new(circular_orbit(), default_visibility_constraints(), config)
        .unwrap();

    assert_eq!(model.exposures_per_orbit(), 12);
    assert_eq!(model.time_steps(), 2 * 12 * 10);
    assert_eq!(
        model.time_step_duration().to_seconds(),
        (8.0 * Unit::Minute).to_seconds() / 10.0
    );
}

#[test]
fn time_grid_matches_step_count() {
    let model = SurveyModel::new(
        circular_orbit(),
        default_visibility_constraints(),
        SurveyConfig::builder()
            .exposure_time(8.0 * Unit::Minute)
            .build(),
    )
    .unwrap();
    let start = model.orbit().epoch();
    let times = model.times(start);
    assert_eq!(times.len(), model.time_steps());
    assert_eq!(times[0], start);
    let step = times[1] - times[0];
    assert_eq!(step, model.time_step_duration());
}

#[test]
fn rejects_exposure_longer_than_orbit() {
    let config = SurveyConfig::builder()
        .exposure_time(2.0 * Unit::Hour)
        .build();
    let r = SurveyModel::new(circular_orbit(), default_visibility_constraints(), config);
    assert!(matches!(
        r,
        Err(SurveyError::ExposureLongerThanOrbit { .. })
    ));
}

#[test]
fn rejects_zero_steps_per_exposure() {
    let config = SurveyConfig::builder()
        .exposure_time(8.0 * Unit::Minute)
        .time_steps_per_exposure(0)
        .build();
    let r = SurveyModel::new(circular_orbit(), default_visibility_constraints(), config);
    assert!(matches!(r, Err(SurveyError::DegenerateCadence { .. })));
}

#[test]
fn rejects_empty_candidate_list() {
    let config = SurveyConfig::builder()
        .exposure_time(8.0 * Unit::Minute)
        .centers(Vec::new())
        .build();
    let r = SurveyModel::new(circular_orbit(), default_visibility_constraints(), config);
    assert!(matches!(r, Err(SurveyError::NoCandidates)));
}

#[test]
fn rejects_invalid_grid_resolution() {
    let config = SurveyConfig::builder()
        .exposure_time(8.0 * Unit::Minute)
        .nside(0)
        .build();
    let r = SurveyModel::new(circular_orbit(), default_visibility_constraints(), config);
    assert!(matches!(r, Err(SurveyError::GridSetup { .. })));
}
