//! Public API properties of the classify → size pipeline

use approx::assert_relative_eq;
use bedesign::prelude::*;
use bedesign::sample_size::{cv_grid, Z_ALPHA, Z_BETA};

fn options() -> SampleSizeOptions {
    SampleSizeOptions::default()
}

/// Cross-over size re-derived from the published formula
fn crossover_by_formula(cv: f64, dropout: f64) -> usize {
    let sigma_sq = ((cv / 100.0).powi(2) + 1.0).ln();
    let base = (2.0 * (Z_ALPHA + Z_BETA).powi(2) * sigma_sq / 0.8f64.ln().powi(2)).ceil();
    let n = (base / (1.0 - dropout)).ceil() as usize;
    (n + n % 2).max(2)
}

#[test]
fn classification_boundaries() {
    assert_eq!(classify(30.0), DesignRegimen::TwoByTwoCrossover);
    assert_eq!(classify(30.000001), DesignRegimen::ThreeWayReplicate);
    assert_eq!(classify(50.0), DesignRegimen::ThreeWayReplicate);
    assert_eq!(classify(50.000001), DesignRegimen::FourWayReplicate);
}

#[test]
fn cv20_crossover_matches_formula() {
    let result = compute(classify(20.0), 20.0, &options()).unwrap();
    assert_eq!(result.regimen.name(), "2×2 Cross-over");
    assert_eq!(result.final_n, crossover_by_formula(20.0, 0.2));
    assert_relative_eq!(
        result.adjusted_n,
        result.base_n as f64 / 0.8,
        epsilon = 1e-12
    );
}

#[test]
fn cv50_and_cv60_scenarios() {
    let r50 = compute(classify(50.0), 50.0, &options()).unwrap();
    assert_eq!(r50.regimen.name(), "3-way Replicate");
    assert_eq!(r50.final_n % 3, 0);

    let r60 = compute(classify(60.0), 60.0, &options()).unwrap();
    assert_eq!(r60.regimen.name(), "4-way Replicate");
    assert_eq!(r60.final_n % 4, 0);
}

#[test]
fn sweep_preserves_invariants() {
    let grid = cv_grid(1.0, 120.0, 0.5);
    let rows = sample_size_table(&grid, &options());
    assert_eq!(rows.len(), grid.len());

    for (cv, row) in grid.iter().zip(rows) {
        let row = row.unwrap();
        assert_eq!(row.cvintra, *cv);
        assert_eq!(row.regimen, classify(*cv));
        assert_eq!(row.final_n % row.regimen.periods(), 0);
        assert!(row.final_n as f64 >= row.adjusted_n);
        assert!(row.adjusted_n >= row.base_n as f64);
        if row.regimen == DesignRegimen::TwoByTwoCrossover {
            assert_eq!(row.final_n, crossover_by_formula(*cv, 0.2));
        }
    }
}

#[test]
fn resolver_precedence_and_fallback() {
    let resolver = Resolver::new(ReferenceTable::builtin());

    let user = resolver.resolve("aspirin", Some(40.0), Some(22.0));
    assert_eq!(user, VariabilityEstimate::new(40.0, CvSource::UserInput));

    let unknown = resolver.resolve("unknownium", None, None);
    assert_eq!(unknown, VariabilityEstimate::new(25.0, CvSource::ReferenceTable));

    let insane = resolver.resolve("x", None, Some(3.0));
    assert_eq!(insane.source, CvSource::ReferenceTable);
    assert_eq!(insane.value, 25.0);

    let mined = resolver.resolve("ASPIRIN", None, Some(100.0));
    assert_eq!(mined.source, CvSource::LiteratureExtracted);
}

#[test]
fn forced_design_overrides_classification() {
    let choice: DesignChoice = "4way".parse().unwrap();
    let result = compute_for_choice(choice, 20.0, &options()).unwrap();
    assert_eq!(result.regimen, DesignRegimen::FourWayReplicate);
    assert_eq!(result.final_n % 4, 0);

    assert!(matches!(
        "5way".parse::<DesignChoice>(),
        Err(InputError::UnknownDesign(_))
    ));
}
