use asteria::constraints::{
    ConstraintEval, EarthPolygonConstraint, ParticleSpecies, SolarActivity,
    TrappedParticleFluxConstraint, VisibilityConstraint,
};
use asteria::ephem;
use asteria::grid::{SkyGrid, SphericalPolygon};
use asteria::linalg::Vector3;
use asteria::orbit::Geodetic;
use asteria::time::Epoch;
use rstest::rstest;

/// TEME position of a spacecraft whose sub-point is the provided geodetic
/// location at the provided epoch.
fn observer_over(epoch: Epoch, lat_deg: f64, lon_deg: f64) -> Vector3<f64> {
    let ecef = Geodetic {
        latitude_deg: lat_deg,
        longitude_deg: lon_deg,
        altitude_km: 550.0,
    }
    .to_ecef();
    ephem::ecef_to_teme(epoch, &ecef)
}

#[rstest]
#[case(8)]
#[case(32)]
fn cap_mask_contains_exactly_the_cap(#[case] nside: u64) {
    // Cap bounded by the latitude 30 ring, densely sampled
    let ring: Vec<(f64, f64)> = (0..72).map(|i| (30.0, 5.0 * i as f64)).collect();
    let boundary = SphericalPolygon::from_geodetic(&ring).unwrap();
    let zone = EarthPolygonConstraint::new(nside, &boundary, "polar cap").unwrap();

    let grid = SkyGrid::new(nside).unwrap();
    for cell in 0..grid.npix() {
        let dir = grid.direction_of(cell);
        let lat_deg = dir[2].asin().to_degrees();
        // Stay clear of the boundary ring where chord discretization decides
        if lat_deg > 35.0 {
            assert!(!zone.mask()[cell], "cell {cell} at {lat_deg} must be excluded");
        } else if lat_deg < 25.0 {
            assert!(zone.mask()[cell], "cell {cell} at {lat_deg} must be permitted");
        }
    }
}

#[test]
fn saa_gates_by_subpoint() {
    let saa = EarthPolygonConstraint::south_atlantic_anomaly(64).unwrap();
    let epoch = Epoch::from_gregorian_utc_at_midnight(2023, 3, 1);

    let inside = saa
        .evaluate(epoch, &observer_over(epoch, -15.0, -50.0), &[])
        .unwrap();
    assert_eq!(inside, ConstraintEval::WholeField(false));

    let outside = saa
        .evaluate(epoch, &observer_over(epoch, 20.0, 180.0), &[])
        .unwrap();
    assert_eq!(outside, ConstraintEval::WholeField(true));
}

#[test]
fn radiation_gates_by_subpoint() {
    let flux = TrappedParticleFluxConstraint::new(
        ParticleSpecies::Proton,
        20.0,
        1.0,
        SolarActivity::Maximum,
    );
    let epoch = Epoch::from_gregorian_utc_at_midnight(2023, 3, 1);

    let hot = flux
        .evaluate(epoch, &observer_over(epoch, -25.0, -45.0), &[])
        .unwrap();
    assert_eq!(hot, ConstraintEval::WholeField(false));

    let quiet = flux
        .evaluate(epoch, &observer_over(epoch, 20.0, 180.0), &[])
        .unwrap();
    assert_eq!(quiet, ConstraintEval::WholeField(true));
}

#[test]
fn radiation_and_saa_zones_overlap() {
    // The parametric flux model and the digitized Fermi polygon describe the
    // same phenomenon: sample a LEO shell and require substantial agreement
    // inside the anomaly
    let saa = EarthPolygonConstraint::south_atlantic_anomaly(32).unwrap();
    let flux = TrappedParticleFluxConstraint::new(
        ParticleSpecies::Proton,
        20.0,
        1.0,
        SolarActivity::Maximum,
    );

    let mut polygon_hot = 0_usize;
    let mut both_hot = 0_usize;
    for lat in -40..40 {
        for lon in -180..180 {
            let ecef = Geodetic {
                latitude_deg: lat as f64,
                longitude_deg: lon as f64,
                altitude_km: 550.0,
            }
            .to_ecef();
            if !saa.permits_ecef(&ecef) {
                polygon_hot += 1;
                if flux.flux_at(&ecef) > 1.0 {
                    both_hot += 1;
                }
            }
        }
    }
    assert!(polygon_hot > 100, "polygon covers {polygon_hot} samples");
    let agreement = both_hot as f64 / polygon_hot as f64;
    assert!(agreement > 0.6, "models agree on {agreement} of the anomaly");
}
