pub mod build;
pub mod dates;
pub mod diagnostics;
pub mod join;
pub mod normalize;
pub mod output;
pub mod quarter;

pub use build::{Consolidated, DatasetStats, consolidate, sort_events_by_date};
pub use dates::parse_event_date;
pub use diagnostics::{JoinDiagnostic, JoinKind, KeyOverlap, LossSeverity, QuarterReport};
pub use join::build_events;
pub use normalize::{
    DemoRecord, DrugRecord, NormalizedTables, OutcRecord, ReacRecord, clean_term, normalize_demo,
    normalize_drug, normalize_outc, normalize_reac,
};
pub use output::{events_to_dataframe, write_events_parquet};
pub use quarter::{QuarterOutcome, load_quarter};
