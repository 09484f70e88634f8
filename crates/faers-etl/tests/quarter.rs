//! End-to-end quarter processing from fixture files.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use faers_etl::load_quarter;
use faers_ingest::discover_quarters;
use faers_model::{PipelineConfig, UNKNOWN_DRUG};

fn write_ascii(root: &Path, quarter: &str, files: &[(&str, &str)]) {
    let ascii = root.join(quarter).join("ascii");
    fs::create_dir_all(&ascii).unwrap();
    for (name, contents) in files {
        fs::write(ascii.join(name), contents).unwrap();
    }
}

#[test]
fn full_quarter_joins_all_tables() {
    let dir = TempDir::new().unwrap();
    write_ascii(
        dir.path(),
        "faers_ascii_2024q1",
        &[
            (
                "DEMO24Q1.txt",
                "primaryid$sex$age$occur_country$event_dt\n\
                 101$M$45$us$20240105\n\
                 102$F$61$GB$20240211\n\
                 103$U$$$\n",
            ),
            (
                "REAC24Q1.txt",
                "primaryid$pt\n101$headache\n101$nausea\n102$rash\n",
            ),
            ("DRUG24Q1.txt", "primaryid$drugname\n101$aspirin\n102$ibuprofen\n"),
            ("OUTC24Q1.txt", "primaryid$serious\n101$Y\n101$N\n"),
        ],
    );

    let quarters = discover_quarters(dir.path()).unwrap();
    let outcome = load_quarter(&quarters[0], &PipelineConfig::default())
        .unwrap()
        .unwrap();

    // 3 DEMO rows, case 103 has no reaction: 3 joined rows remain.
    assert_eq!(outcome.events.len(), 3);
    let first = outcome
        .events
        .iter()
        .find(|e| e.reaction_pt == "HEADACHE")
        .unwrap();
    assert_eq!(first.case_id, "101");
    assert_eq!(first.drug.as_deref(), Some("ASPIRIN"));
    assert_eq!(first.country.as_deref(), Some("US"));
    assert_eq!(first.age, Some(45.0));
    assert!(first.serious);
    assert_eq!(outcome.report.initial_demo_rows, 3);
}

#[test]
fn quarter_without_reac_is_skipped() {
    let dir = TempDir::new().unwrap();
    write_ascii(
        dir.path(),
        "faers_ascii_2024q1",
        &[("DEMO24Q1.txt", "primaryid$sex\n101$M\n")],
    );
    let quarters = discover_quarters(dir.path()).unwrap();
    let outcome = load_quarter(&quarters[0], &PipelineConfig::default()).unwrap();
    assert!(outcome.is_none());
}

#[test]
fn quarter_without_drug_table_uses_sentinel() {
    let dir = TempDir::new().unwrap();
    write_ascii(
        dir.path(),
        "faers_ascii_2024q1",
        &[
            ("DEMO24Q1.txt", "primaryid$sex$event_dt\n101$M$20240105\n"),
            ("REAC24Q1.txt", "primaryid$pt\n101$HEADACHE\n"),
        ],
    );
    let quarters = discover_quarters(dir.path()).unwrap();
    let outcome = load_quarter(&quarters[0], &PipelineConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(outcome.events.len(), 1);
    assert_eq!(outcome.events[0].drug.as_deref(), Some(UNKNOWN_DRUG));
}

#[test]
fn corrupt_optional_table_does_not_abort_quarter() {
    let dir = TempDir::new().unwrap();
    write_ascii(
        dir.path(),
        "faers_ascii_2024q1",
        &[
            ("DEMO24Q1.txt", "primaryid$sex$event_dt\n101$M$20240105\n"),
            ("REAC24Q1.txt", "primaryid$pt\n101$HEADACHE\n"),
            ("OUTC24Q1.txt", "primaryid$serious\n"), // header only, no rows
        ],
    );
    let quarters = discover_quarters(dir.path()).unwrap();
    let outcome = load_quarter(&quarters[0], &PipelineConfig::default())
        .unwrap()
        .unwrap();
    assert_eq!(outcome.events.len(), 1);
    assert!(!outcome.events[0].serious);
}
