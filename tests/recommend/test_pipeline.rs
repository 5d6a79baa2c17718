use bedesign::lookup::{LookupOutcome, LookupSet};
use bedesign::recommend::{AnalysisRequest, Phase, Recommender};
use bedesign::sample_size::{compute, SampleSizeOptions};
use bedesign::variability::{CvSource, ReferenceTable};
use bedesign::{BeDesignError, DesignRegimen, InputError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::fakes::{FailingRegistry, FakeLiterature, FakeRegistry, FakeVendor};

fn recommender() -> Recommender {
    Recommender::new(ReferenceTable::builtin(), SampleSizeOptions::default())
}

#[tokio::test(start_paused = true)]
async fn literature_upgrades_table_estimate() {
    let lookups = LookupSet::new()
        .with_literature(FakeLiterature::reporting_cv(62.0))
        .with_registry(FakeRegistry {
            delay: Duration::from_secs(1),
        })
        .with_vendor(FakeVendor {
            delay: Duration::from_secs(1),
        });
    let request = AnalysisRequest::new("metformin");

    let provisional = recommender().provisional(&request, None).unwrap();
    assert_eq!(provisional.regimen, DesignRegimen::ThreeWayReplicate);

    let report = recommender().recommend(&request, &lookups).await.unwrap();
    let rec = &report.recommendation;

    assert_eq!(report.phase(), Phase::Final);
    assert_eq!(rec.estimate.value, 62.0);
    assert_eq!(rec.estimate.source, CvSource::LiteratureExtracted);
    assert_eq!(rec.regimen, DesignRegimen::FourWayReplicate);
    assert_eq!(rec.sample_size.final_n % 4, 0);
    assert!(report.pk_parameters().is_some());

    let expected = compute(
        DesignRegimen::FourWayReplicate,
        62.0,
        &SampleSizeOptions::default(),
    )
    .unwrap();
    assert_eq!(rec.sample_size, expected);
}

#[tokio::test(start_paused = true)]
async fn user_value_beats_literature() {
    let lookups = LookupSet::new().with_literature(FakeLiterature::reporting_cv(62.0));
    let request = AnalysisRequest::new("metformin").with_cvintra(20.0);

    let report = recommender().recommend(&request, &lookups).await.unwrap();
    let out = report.to_output();

    assert_eq!(out.design_recommendation.cvintra, 20.0);
    assert_eq!(out.design_recommendation.cvintra_source, "user_input");
    assert_eq!(out.design_recommendation.recommended_design, "2×2 Cross-over");
    assert_eq!(out.sample_size.final_sample_size % 2, 0);
    assert!(report.literature.literature.is_completed());
}

#[tokio::test(start_paused = true)]
async fn implausible_literature_value_is_ignored() {
    let lookups = LookupSet::new().with_literature(FakeLiterature::with_supplied_cv(3.0));
    let report = recommender()
        .recommend(&AnalysisRequest::new("aspirin"), &lookups)
        .await
        .unwrap();

    assert_eq!(report.recommendation.estimate.value, 15.0);
    assert_eq!(
        report.recommendation.estimate.source,
        CvSource::ReferenceTable
    );
    assert_eq!(report.phase(), Phase::Final);
}

#[tokio::test(start_paused = true)]
async fn literature_timeout_keeps_table_design() {
    let lookups = LookupSet::new()
        .with_literature(FakeLiterature::reporting_cv(62.0).with_delay(Duration::from_secs(60)))
        .with_registry(FakeRegistry {
            delay: Duration::from_secs(1),
        });

    let report = recommender()
        .recommend(&AnalysisRequest::new("metformin"), &lookups)
        .await
        .unwrap();

    assert_eq!(report.literature.literature, LookupOutcome::Timeout);
    assert!(report.literature.registry.is_completed());
    assert_eq!(report.recommendation.estimate.value, 35.0);
    assert_eq!(
        report.recommendation.regimen,
        DesignRegimen::ThreeWayReplicate
    );

    let json = report.to_json().unwrap();
    assert_eq!(json["literature"]["literature"]["status"], "timeout");
    assert_eq!(json["literature"]["registry"]["status"], "ok");
    assert_eq!(json["literature"]["vendor"]["status"], "skipped");
}

#[tokio::test(start_paused = true)]
async fn failing_collaborator_does_not_fail_request() {
    let lookups = LookupSet::new().with_registry(FailingRegistry);
    let report = recommender()
        .recommend(&AnalysisRequest::new("unknownium"), &lookups)
        .await
        .unwrap();

    assert_eq!(report.literature.registry.status(), "error");
    assert_eq!(report.recommendation.estimate.value, 25.0);
    assert_eq!(
        report.recommendation.regimen,
        DesignRegimen::TwoByTwoCrossover
    );
}

#[tokio::test(start_paused = true)]
async fn cancelled_lookups_still_produce_report() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let lookups = LookupSet::new()
        .with_literature(FakeLiterature::reporting_cv(62.0).with_delay(Duration::from_secs(5)));

    let report = recommender()
        .recommend_with_cancel(&AnalysisRequest::new("metformin"), &lookups, &cancel)
        .await
        .unwrap();

    assert_eq!(report.literature.literature, LookupOutcome::Cancelled);
    assert_eq!(report.recommendation.estimate.source, CvSource::ReferenceTable);
}

#[tokio::test]
async fn missing_drug_fails_before_lookups() {
    let err = recommender()
        .recommend(&AnalysisRequest::new(""), &LookupSet::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BeDesignError::Input(InputError::MissingDrugIdentifier)
    ));
}

#[tokio::test]
async fn negative_user_cv_is_rejected() {
    let err = recommender()
        .recommend(
            &AnalysisRequest::new("aspirin").with_cvintra(-5.0),
            &LookupSet::new(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        BeDesignError::Input(InputError::InvalidCvIntra(_))
    ));
}

#[tokio::test]
async fn injected_table_is_used() {
    let mut table = ReferenceTable::new();
    table.insert("Testozol", 55.0).unwrap();
    let recommender = Recommender::new(table, SampleSizeOptions::default().with_dropout(0.1));

    let report = recommender
        .recommend(&AnalysisRequest::new("testozol"), &LookupSet::new())
        .await
        .unwrap();
    let out = report.to_output();

    assert_eq!(out.design_recommendation.recommended_design, "4-way Replicate");
    assert_eq!(out.sample_size.dropout_rate, 10.0);
    assert_eq!(out.literature.literature, LookupOutcome::Skipped);
}
