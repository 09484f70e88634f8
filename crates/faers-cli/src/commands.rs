//! Command handlers.

use anyhow::{Context, Result, bail};

use faers_analysis::insights::{summarize_drug, summarize_overall, summarize_reaction};
use faers_cli::pipeline::{BuildOptions, run_build};
use faers_cli::summary::{print_build_summary, print_spike_summary};
use faers_cli::types::{BuildResult, OutputPaths};
use faers_ingest::{discover_quarters, resolve_table_files};
use faers_model::{PipelineConfig, TableKind};

use crate::cli::{BuildArgs, QuartersArgs, SpikesArgs};

pub fn run_build_command(args: &BuildArgs) -> Result<BuildResult> {
    let mut config = PipelineConfig::default().with_delimiter(args.delimiter.as_byte());
    if let Some(chunk_size) = args.chunk_size {
        config = config.with_chunk_size(chunk_size);
    }

    let out_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => args
            .raw_dir
            .parent()
            .map(|parent| parent.join("processed"))
            .unwrap_or_else(|| args.raw_dir.join("processed")),
    };

    let options = BuildOptions {
        raw_dir: args.raw_dir.clone(),
        out_dir,
        limit_quarters: args.limit_quarters,
        dry_run: args.dry_run,
        progress: !args.no_progress,
        config,
    };
    let result = run_build(&options)?;
    print_build_summary(&result);
    Ok(result)
}

pub fn run_spikes_command(args: &SpikesArgs) -> Result<()> {
    let config = PipelineConfig::default();
    let paths = OutputPaths::in_dir(&args.data_dir);

    let summary = if let Some(drug) = &args.drug {
        summarize_drug(&paths.monthly_by_drug, drug, &args.method, args.top, &config)
    } else if let Some(reaction) = &args.reaction {
        summarize_reaction(
            &paths.monthly_by_reaction,
            reaction,
            &args.method,
            args.top,
            &config,
        )
    } else {
        summarize_overall(&paths.monthly_counts, &args.method, args.top, &config)
    };

    if args.json {
        let rendered = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        println!("{rendered}");
    } else {
        print_spike_summary(&summary);
    }
    Ok(())
}

pub fn run_quarters_command(args: &QuartersArgs) -> Result<()> {
    let quarters = discover_quarters(&args.raw_dir)?;
    if quarters.is_empty() {
        bail!("no quarterly folders found in {}", args.raw_dir.display());
    }
    for quarter in &quarters {
        let files = resolve_table_files(quarter)?;
        let present: Vec<&str> = TableKind::ALL
            .iter()
            .filter(|kind| files.get(kind).map(Option::is_some).unwrap_or(false))
            .map(|kind| kind.as_str())
            .collect();
        let missing: Vec<&str> = TableKind::ALL
            .iter()
            .filter(|kind| files.get(kind).map(Option::is_none).unwrap_or(true))
            .map(|kind| kind.as_str())
            .collect();
        if missing.is_empty() {
            println!("{}: {}", quarter.name, present.join(", "));
        } else {
            println!(
                "{}: {} (missing: {})",
                quarter.name,
                present.join(", "),
                missing.join(", ")
            );
        }
    }
    Ok(())
}
