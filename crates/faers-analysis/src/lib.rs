pub mod aggregate;
pub mod anomaly;
pub mod insights;
pub mod series;

pub use aggregate::{
    MonthlyCount, MonthlyGroupCount, monthly_by_drug, monthly_by_reaction, monthly_overall,
    top_items, write_group_csv, write_overall_csv,
};
pub use anomaly::{
    AnomalyFrame, Baseline, Decomposition, Detection, Method, RankedSpike, RollingBands, detect,
    rank_spikes, rolling_zscore, seasonal_spikes,
};
pub use insights::{
    SpikeEntry, SpikeSummary, spike_months, summarize_drug, summarize_overall, summarize_reaction,
};
pub use series::{MonthlySeries, ensure_monthly_index, month_start, next_month};
