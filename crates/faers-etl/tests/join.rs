//! Tests for the join engine, asserting on the diagnostic values as well as
//! the resulting rows.

use chrono::NaiveDate;

use faers_etl::diagnostics::{JoinKind, LossSeverity};
use faers_etl::join::build_events;
use faers_etl::normalize::{DemoRecord, DrugRecord, NormalizedTables, OutcRecord, ReacRecord};
use faers_model::{PipelineConfig, Sex, UNKNOWN_DRUG};

fn demo(case: &str) -> DemoRecord {
    DemoRecord {
        case_id: case.to_string(),
        sex: Sex::Unknown,
        age: None,
        country: None,
        event_date: NaiveDate::from_ymd_opt(2024, 1, 15),
    }
}

fn reac(case: &str, pt: &str) -> ReacRecord {
    ReacRecord {
        case_id: case.to_string(),
        reaction_pt: Some(pt.to_string()),
    }
}

fn drug(case: &str, name: &str) -> DrugRecord {
    DrugRecord {
        case_id: case.to_string(),
        drug: Some(name.to_string()),
    }
}

fn tables(
    demo_rows: Vec<DemoRecord>,
    reac_rows: Vec<ReacRecord>,
    drug_rows: Option<Vec<DrugRecord>>,
    outc_rows: Option<Vec<OutcRecord>>,
) -> NormalizedTables {
    NormalizedTables {
        demo: Some(demo_rows),
        reac: Some(reac_rows),
        drug: drug_rows,
        outc: outc_rows,
    }
}

#[test]
fn partial_key_overlap_reports_counts() {
    // DEMO keyed [A, B, C], REAC keyed [A, B, X]: join keeps A and B only,
    // and the overlap diagnostic must say exactly why.
    let t = tables(
        vec![demo("A"), demo("B"), demo("C")],
        vec![reac("A", "HEADACHE"), reac("B", "NAUSEA"), reac("X", "RASH")],
        None,
        None,
    );
    let (events, report) = build_events(&t, "faers_ascii_2024q1", &PipelineConfig::default());

    assert_eq!(events.len(), 2);
    let mut cases: Vec<&str> = events.iter().map(|e| e.case_id.as_str()).collect();
    cases.sort_unstable();
    assert_eq!(cases, vec!["A", "B"]);

    let overlap = &report.overlaps[0];
    assert_eq!(overlap.overlap, 2);
    assert_eq!(overlap.left_only, 1);
    assert_eq!(overlap.right_only, 1);
    assert!((overlap.overlap_percent - 66.7).abs() < 0.1);
    assert!(overlap.low_overlap);

    let inner = &report.joins[0];
    assert_eq!(inner.kind, JoinKind::Inner);
    assert_eq!(inner.before, 3);
    assert_eq!(inner.after, 2);
    assert!((inner.loss_percent - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(inner.severity, Some(LossSeverity::High));
}

#[test]
fn absent_drug_table_fills_sentinel_without_dropping_rows() {
    let t = tables(
        vec![demo("A"), demo("B")],
        vec![reac("A", "HEADACHE"), reac("B", "NAUSEA")],
        None,
        None,
    );
    let (events, report) = build_events(&t, "q", &PipelineConfig::default());

    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.drug.as_deref() == Some(UNKNOWN_DRUG)));
    // No left-join diagnostic is emitted for an absent table.
    assert_eq!(report.joins.len(), 1);
}

#[test]
fn drug_left_join_expands_one_to_many() {
    let t = tables(
        vec![demo("A")],
        vec![reac("A", "HEADACHE")],
        Some(vec![drug("A", "ASPIRIN"), drug("A", "IBUPROFEN")]),
        None,
    );
    let (events, report) = build_events(&t, "q", &PipelineConfig::default());

    assert_eq!(events.len(), 2);
    let left = report
        .joins
        .iter()
        .find(|j| j.kind == JoinKind::Left)
        .unwrap();
    assert_eq!(left.before, 1);
    assert_eq!(left.after, 2);
}

#[test]
fn drug_left_join_preserves_unmatched_rows() {
    let t = tables(
        vec![demo("A"), demo("B")],
        vec![reac("A", "HEADACHE"), reac("B", "NAUSEA")],
        Some(vec![drug("A", "ASPIRIN")]),
        None,
    );
    let (events, _report) = build_events(&t, "q", &PipelineConfig::default());

    assert_eq!(events.len(), 2);
    let b = events.iter().find(|e| e.case_id == "B").unwrap();
    // Case B had no drug row: the drug stays missing, the row survives.
    assert_eq!(b.drug, None);
}

#[test]
fn outcomes_collapse_to_max_severity_per_case() {
    let outc = vec![
        OutcRecord {
            case_id: "A".to_string(),
            serious: false,
        },
        OutcRecord {
            case_id: "A".to_string(),
            serious: true,
        },
        OutcRecord {
            case_id: "B".to_string(),
            serious: false,
        },
    ];
    let t = tables(
        vec![demo("A"), demo("B"), demo("C")],
        vec![reac("A", "HEADACHE"), reac("B", "NAUSEA"), reac("C", "RASH")],
        None,
        Some(outc),
    );
    let (events, report) = build_events(&t, "q", &PipelineConfig::default());

    let by_case = |case: &str| events.iter().find(|e| e.case_id == case).unwrap();
    assert!(by_case("A").serious);
    assert!(!by_case("B").serious);
    // Case C has no outcome row at all: defaults to false.
    assert!(!by_case("C").serious);

    // The collapsed left join preserves the row count exactly.
    let left = report
        .joins
        .iter()
        .find(|j| j.label == "EVENTS with OUTC")
        .unwrap();
    assert_eq!(left.before, left.after);
}

#[test]
fn rows_with_null_keys_or_reactions_are_dropped() {
    let t = tables(
        vec![demo("A"), demo("")],
        vec![
            reac("A", "HEADACHE"),
            ReacRecord {
                case_id: "A".to_string(),
                reaction_pt: None,
            },
            reac("", "ORPHAN"),
        ],
        None,
        None,
    );
    let (events, report) = build_events(&t, "q", &PipelineConfig::default());

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reaction_pt, "HEADACHE");
    assert_eq!(report.null_dropped, 1);
}

#[test]
fn exact_duplicate_tuples_are_deduplicated() {
    let t = tables(
        vec![demo("A")],
        vec![reac("A", "HEADACHE"), reac("A", "HEADACHE")],
        None,
        None,
    );
    let (events, report) = build_events(&t, "q", &PipelineConfig::default());

    assert_eq!(events.len(), 1);
    assert_eq!(report.duplicates_removed, 1);
}

#[test]
fn inner_join_after_count_never_exceeds_demo_multiplied_matches() {
    let t = tables(
        vec![demo("A"), demo("B")],
        vec![reac("A", "HEADACHE")],
        None,
        None,
    );
    let (_, report) = build_events(&t, "q", &PipelineConfig::default());
    let inner = &report.joins[0];
    assert!(inner.after <= inner.before);
    assert_eq!(inner.loss_percent, 50.0);
}

#[test]
fn quarter_total_loss_is_classified() {
    // 3 DEMO rows in, 1 event out: 66.7% total loss is HIGH (>30%).
    let t = tables(
        vec![demo("A"), demo("B"), demo("C")],
        vec![reac("A", "HEADACHE")],
        None,
        None,
    );
    let (events, report) = build_events(&t, "q", &PipelineConfig::default());
    assert_eq!(events.len(), 1);
    assert!((report.total_loss_percent - 200.0 / 3.0).abs() < 1e-9);
    assert_eq!(report.total_severity, LossSeverity::High);
}

#[test]
fn empty_demo_reports_zero_loss() {
    let t = tables(vec![], vec![reac("A", "HEADACHE")], None, None);
    let (events, report) = build_events(&t, "q", &PipelineConfig::default());
    assert!(events.is_empty());
    assert_eq!(report.joins[0].loss_percent, 0.0);
    assert_eq!(report.total_loss_percent, 0.0);
    assert_eq!(report.total_severity, LossSeverity::Perfect);
}
