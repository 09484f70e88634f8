//! Aggregation semantics and output shape tests.

use chrono::NaiveDate;

use faers_analysis::aggregate::{
    group_to_dataframe, monthly_by_drug, monthly_by_reaction, monthly_overall,
    overall_to_dataframe, top_items,
};
use faers_model::{Event, Sex};

fn event(case: &str, drug: Option<&str>, reaction: &str, date: Option<(i32, u32, u32)>) -> Event {
    Event {
        event_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        case_id: case.to_string(),
        drug: drug.map(str::to_string),
        reaction_pt: reaction.to_string(),
        sex: Sex::Unknown,
        age: None,
        country: None,
        serious: false,
        quarter: "faers_ascii_2024q1".to_string(),
    }
}

#[test]
fn empty_input_yields_correctly_shaped_tables() {
    let (rows, excluded) = monthly_overall(&[]);
    assert!(rows.is_empty());
    assert_eq!(excluded, 0);

    let df = overall_to_dataframe(&rows).unwrap();
    assert_eq!(df.height(), 0);
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["ym", "count"]);

    let (grouped, _) = monthly_by_drug(&[]);
    let df = group_to_dataframe(&grouped, "drug").unwrap();
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(names, vec!["ym", "drug", "count"]);
}

#[test]
fn buckets_by_month_start() {
    let events = vec![
        event("A", None, "HEADACHE", Some((2024, 1, 3))),
        event("B", None, "NAUSEA", Some((2024, 1, 28))),
        event("C", None, "RASH", Some((2024, 2, 14))),
    ];
    let (rows, excluded) = monthly_overall(&events);
    assert_eq!(excluded, 0);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].month, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    assert_eq!(rows[0].count, 2);
    assert_eq!(rows[1].count, 1);
}

#[test]
fn undated_events_are_excluded_and_counted() {
    let events = vec![
        event("A", None, "HEADACHE", Some((2024, 1, 3))),
        event("B", None, "NAUSEA", None),
    ];
    let (rows, excluded) = monthly_overall(&events);
    assert_eq!(rows.len(), 1);
    assert_eq!(excluded, 1);
}

#[test]
fn grouped_rows_sort_month_then_count_descending() {
    let events = vec![
        event("A", None, "NAUSEA", Some((2024, 1, 1))),
        event("B", None, "HEADACHE", Some((2024, 1, 2))),
        event("C", None, "HEADACHE", Some((2024, 1, 3))),
        event("D", None, "RASH", Some((2024, 2, 1))),
    ];
    let (rows, _) = monthly_by_reaction(&events);
    assert_eq!(rows[0].key, "HEADACHE");
    assert_eq!(rows[0].count, 2);
    assert_eq!(rows[1].key, "NAUSEA");
    assert_eq!(rows[2].key, "RASH");
    assert_eq!(rows[2].month, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
}

#[test]
fn missing_drug_is_excluded_from_drug_aggregation_only() {
    let events = vec![
        event("A", Some("ASPIRIN"), "HEADACHE", Some((2024, 1, 1))),
        event("B", None, "NAUSEA", Some((2024, 1, 2))),
    ];
    let (drug_rows, drug_excluded) = monthly_by_drug(&events);
    assert_eq!(drug_rows.len(), 1);
    assert_eq!(drug_excluded, 1);

    let (overall_rows, overall_excluded) = monthly_overall(&events);
    assert_eq!(overall_rows[0].count, 2);
    assert_eq!(overall_excluded, 0);
}

#[test]
fn top_items_ranks_by_total_count() {
    let events = vec![
        event("A", Some("ASPIRIN"), "HEADACHE", Some((2024, 1, 1))),
        event("B", Some("ASPIRIN"), "NAUSEA", Some((2024, 2, 1))),
        event("C", Some("IBUPROFEN"), "RASH", Some((2024, 1, 1))),
    ];
    let (rows, _) = monthly_by_drug(&events);
    let top = top_items(&rows, 10);
    assert_eq!(top, vec!["ASPIRIN".to_string(), "IBUPROFEN".to_string()]);
    assert_eq!(top_items(&rows, 1), vec!["ASPIRIN".to_string()]);
}
