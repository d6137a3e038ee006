use std::env;
use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use trend_worker::pipeline::{
    PipelineSettings, TrendPipeline,
    rank::SortMode,
    types::{ContentItem, RawContentItem},
};

struct FixtureArgs {
    input: PathBuf,
    sort: SortMode,
    now: Option<DateTime<Utc>>,
    short_form_max_seconds: Option<u64>,
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let items: Vec<RawContentItem> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {} as a JSON array of items", args.input.display()))?;

    let mut settings = PipelineSettings::default();
    if let Some(seconds) = args.short_form_max_seconds {
        settings.short_form_max_seconds = seconds;
    }
    let pipeline = TrendPipeline::new(settings);
    let items: Vec<ContentItem> = items.into_iter().map(ContentItem::from).collect();
    let report = match args.now {
        Some(now) => pipeline.run_at(items, args.sort, now),
        None => pipeline.run(items, args.sort),
    };

    let rendered = serde_json::to_string_pretty(&report).context("failed to render report")?;
    println!("{rendered}");
    Ok(())
}

fn parse_args() -> Result<FixtureArgs> {
    let mut input = None;
    let mut sort = SortMode::default();
    let mut now = None;
    let mut short_form_max_seconds = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--input" => {
                let value = args.next().context("--input requires a path argument")?;
                input = Some(PathBuf::from(value));
            }
            "--sort" => {
                let value = args
                    .next()
                    .context("--sort requires `trend` or `viewCount`")?;
                sort = value.parse()?;
            }
            "--now" => {
                let value = args.next().context("--now requires an RFC 3339 timestamp")?;
                let parsed = DateTime::parse_from_rfc3339(&value)
                    .context("--now must be an RFC 3339 timestamp")?;
                now = Some(parsed.with_timezone(&Utc));
            }
            "--short-form-max-seconds" => {
                let value = args.next().context("--short-form-max-seconds requires seconds")?;
                let parsed = value
                    .parse::<u64>()
                    .context("--short-form-max-seconds must be an integer")?;
                short_form_max_seconds = Some(parsed);
            }
            "--help" => {
                print_usage();
                process::exit(0);
            }
            _ => {
                bail!("unknown argument: {}", arg);
            }
        }
    }

    let input = input.ok_or_else(|| anyhow!("--input is required"))?;

    Ok(FixtureArgs {
        input,
        sort,
        now,
        short_form_max_seconds,
    })
}

fn print_usage() {
    eprintln!(
        "Usage: rank_fixture --input <items.json> [--sort trend|viewCount] [--now 2026-10-19T12:00:00Z] [--short-form-max-seconds 60]"
    );
}
