//! Source attribution and policy simulation behaviour
use airzen_core::policy::apply_reductions;
use airzen_core::{
    attribute_sources, compute_aqi, simulate_policy, EmissionSource, Pollutant, PolicyMultipliers,
    PollutantReading, SimulationRequest, SourceAttribution, SourceCategory,
};
use approx::{assert_abs_diff_eq, assert_relative_eq};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn urban_reading() -> PollutantReading {
    PollutantReading::new()
        .with(Pollutant::Pm25, 62.0)
        .with(Pollutant::Pm10, 80.0)
        .with(Pollutant::No2, 74.0)
        .with(Pollutant::So2, 21.0)
        .with(Pollutant::Co, 1.4)
        .with(Pollutant::O3, 48.0)
}

#[test]
fn test_attribution_always_sums_to_100() {
    // Coarse sweep over a lattice of plausible readings
    let mut checked = 0;
    for pm25 in (0..=300).step_by(37) {
        for pm10 in (0..=600).step_by(53) {
            for gas in (0..=200).step_by(29) {
                let reading = PollutantReading::new()
                    .with(Pollutant::Pm25, f64::from(pm25) * 0.7)
                    .with(Pollutant::Pm10, f64::from(pm10))
                    .with(Pollutant::No2, f64::from(gas))
                    .with(Pollutant::So2, f64::from(gas) / 3.0)
                    .with(Pollutant::Co, f64::from(gas) / 90.0)
                    .with(Pollutant::O3, f64::from(200 - gas));
                let attribution = attribute_sources(&reading);
                assert_eq!(attribution.total(), 100, "{reading:?}");
                checked += 1;
            }
        }
    }
    assert!(checked > 500);
}

#[test]
fn test_clean_air_fallback() {
    assert_eq!(
        attribute_sources(&PollutantReading::new()),
        SourceAttribution::CLEAN_AIR_DEFAULT
    );
    // Tiny concentrations stay below the score threshold
    let faint = PollutantReading::new().with(Pollutant::O3, 0.5);
    assert_eq!(attribute_sources(&faint), SourceAttribution::CLEAN_AIR_DEFAULT);
}

#[test]
fn test_zero_traffic_signature_stays_non_negative() {
    // Only dust and photochemical fingerprints: traffic score is exactly 0
    let reading = PollutantReading::new()
        .with(Pollutant::Pm10, 90.0)
        .with(Pollutant::O3, 45.0);
    let attribution = attribute_sources(&reading);
    assert_eq!(attribution.total(), 100);
    assert_eq!(attribution.traffic, 0);
    assert_eq!(attribution.biomass, 0);
    assert!(attribution.dust > 0 && attribution.photochemical > 0);
}

#[test]
fn test_urban_reading_attribution() {
    let attribution = attribute_sources(&urban_reading());
    assert_eq!(attribution.total(), 100);
    // High NO2 and CO point at traffic
    assert_eq!(attribution.dominant(), SourceCategory::Traffic);
}

#[test]
fn test_no_op_policy_preserves_aqi() {
    let baseline = urban_reading();
    let multipliers = EmissionSource::ALL
        .into_iter()
        .fold(PolicyMultipliers::new(), |m, s| m.with(s, 1.0));

    let outcome = simulate_policy(&baseline, &multipliers);
    assert_eq!(outcome.simulated_aqi, outcome.original_aqi);
    assert_eq!(outcome.improvement_pct, 0.0);
    assert_eq!(outcome.adjusted, baseline);
}

#[test]
fn test_full_elimination_reduces_by_impact() {
    let baseline = PollutantReading::new()
        .with(Pollutant::No2, 100.0)
        .with(Pollutant::Co, 2.0)
        .with(Pollutant::So2, 40.0);
    let adjusted = apply_reductions(
        &baseline,
        &PolicyMultipliers::new().with(EmissionSource::Traffic, 0.0),
    );

    assert_relative_eq!(adjusted.value_or_zero(Pollutant::No2), 40.0, epsilon = 1e-9);
    assert_relative_eq!(adjusted.value_or_zero(Pollutant::Co), 0.4, epsilon = 1e-9);
    // Traffic does not touch SO2
    assert_eq!(adjusted.get(Pollutant::So2), Some(40.0));
    // Absent pollutants stay absent
    assert_eq!(adjusted.get(Pollutant::O3), None);
}

#[test]
fn test_reductions_never_raise_aqi() {
    let baseline = urban_reading();
    let original = compute_aqi(&baseline).aqi;
    for source in EmissionSource::ALL {
        for step in 0..=10 {
            let multiplier = f64::from(step) / 10.0;
            let outcome = simulate_policy(&baseline, &PolicyMultipliers::new().with(source, multiplier));
            assert!(outcome.simulated_aqi <= original, "{source} at {multiplier}");
            assert!(outcome.improvement_pct >= 0.0);
        }
    }
}

#[test]
fn test_improvement_percentage() {
    let baseline = PollutantReading::new().with(Pollutant::Pm25, 55.4);
    let outcome = simulate_policy(
        &baseline,
        &PolicyMultipliers::new().with(EmissionSource::Biomass, 0.0),
    );
    // PM2.5 × 0.8 = 44.32
    let expected = compute_aqi(&PollutantReading::new().with(Pollutant::Pm25, 44.32)).aqi;
    assert_abs_diff_eq!(outcome.simulated_aqi, expected, epsilon = 1e-9);
    assert_abs_diff_eq!(
        outcome.improvement_pct,
        (150.0 - expected) / 150.0 * 100.0,
        epsilon = 1e-9
    );
}

#[test]
fn test_out_of_range_multipliers_are_clamped() {
    let baseline = urban_reading();
    let above = simulate_policy(&baseline, &PolicyMultipliers::new().with(EmissionSource::Dust, 3.0));
    assert_eq!(above.simulated_aqi, above.original_aqi);

    let below = simulate_policy(&baseline, &PolicyMultipliers::new().with(EmissionSource::Dust, -1.0));
    let zero = simulate_policy(&baseline, &PolicyMultipliers::new().with(EmissionSource::Dust, 0.0));
    assert_eq!(below, zero);
}

#[test]
fn test_simulation_request_from_json() {
    let json = r#"{
        "pollutants": {"PM2.5": 80.0, "NO₂": 120.0, "CO": 2.5},
        "multipliers": {"traffic": 0.5, "industrial": 1.0, "spaceships": 0.0}
    }"#;
    let request: SimulationRequest = serde_json::from_str(json).unwrap();
    let multipliers = request.multipliers();
    assert_eq!(multipliers.get(EmissionSource::Traffic), Some(0.5));

    let outcome = request.run();
    assert!(outcome.simulated_aqi < outcome.original_aqi);
    assert!(outcome.improvement_pct > 0.0);
}

#[test]
fn test_empty_baseline_policy() {
    let outcome = simulate_policy(
        &PollutantReading::new(),
        &PolicyMultipliers::new().with(EmissionSource::Traffic, 0.0),
    );
    assert_eq!(outcome.original_aqi, 0.0);
    assert_eq!(outcome.simulated_aqi, 0.0);
    assert_eq!(outcome.improvement_pct, 0.0);
}
