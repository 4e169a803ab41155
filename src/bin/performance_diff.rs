use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use performance_diff::{
    build_report, load_recording, load_score, DiffConfig, DiffInput, PerformanceDifferBuilder,
    ReportSource,
};

#[path = "performance_diff/json_report_formatter.rs"]
mod json_report_formatter;

/// Compare a recorded performance against its score.
#[derive(Debug, Parser)]
#[command(name = "performance_diff")]
struct Args {
    /// Score JSON: `{ "tempo": <bpm>, "notes": [...] }`.
    #[arg(long, env = "PERFORMANCE_DIFF_EXPECTED")]
    expected: PathBuf,
    /// Recording JSON: `{ "notes": [...], "average_tempo": <bpm> }`.
    #[arg(long, env = "PERFORMANCE_DIFF_ACTUAL")]
    actual: PathBuf,
    /// Performer's average tempo; overrides the recording's `average_tempo`.
    #[arg(long, env = "PERFORMANCE_DIFF_OBSERVED_TEMPO")]
    observed_tempo: Option<f64>,
    #[arg(long, env = "PERFORMANCE_DIFF_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "PERFORMANCE_DIFF_GROUP_BY_MEASURE", default_value_t = false)]
    group_by_measure: bool,
    /// Report path; stdout when omitted.
    #[arg(long, env = "PERFORMANCE_DIFF_OUT")]
    out: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DiffConfig::load(path).map_err(|e| e.to_string())?,
        None => DiffConfig::default(),
    };
    let differ = PerformanceDifferBuilder::new(config)
        .build()
        .map_err(|e| e.to_string())?;

    let score = load_score(&args.expected).map_err(|e| e.to_string())?;
    let recording = load_recording(&args.actual).map_err(|e| e.to_string())?;
    let observed_tempo = args.observed_tempo.or(recording.average_tempo);

    let input = DiffInput {
        expected: score.notes,
        actual: recording.notes,
        reference_tempo: score.tempo,
        observed_tempo,
    };
    let output = differ.diff(&input).map_err(|e| e.to_string())?;
    tracing::info!(
        diffs = output.diffs.len(),
        warnings = output.warnings.len(),
        "performance_diff: comparison finished"
    );

    let report = build_report(
        ReportSource {
            generated_at: Utc::now().to_rfc3339(),
            expected_path: args.expected.display().to_string(),
            actual_path: args.actual.display().to_string(),
            reference_tempo: input.reference_tempo,
            observed_tempo,
        },
        output,
        args.group_by_measure,
    );

    match &args.out {
        Some(path) => {
            json_report_formatter::write_report(path, &report)?;
            println!("{}", path.display());
        }
        None => json_report_formatter::print_report(&report)?,
    }
    Ok(())
}
