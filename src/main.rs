//! Setpoint evaluator entry point: CLI wiring and config-driven pipeline construction.

use std::io;
use std::path::Path;
use std::process;

use setpoint_eval::cli::{self, CandidateSource, CliOptions};
use setpoint_eval::config::EvaluationConfig;
use setpoint_eval::error::EvalResult;
use setpoint_eval::io::export::{export_report, export_schedule, write_report_json, write_trace};
use setpoint_eval::io::{read_schedule, read_table, read_variables};
use setpoint_eval::runner::{Candidate, Evaluation};

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: could not install log subscriber: {e}");
    }
}

fn load_config(cli: &CliOptions) -> EvaluationConfig {
    let loaded = if let Some(ref path) = cli.config {
        EvaluationConfig::from_toml_file(path)
    } else if let Some(ref name) = cli.preset {
        EvaluationConfig::from_preset(name)
    } else {
        Ok(EvaluationConfig::office())
    };
    let config = loaded.unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    config
}

fn build_candidate(evaluation: &Evaluation, source: &CandidateSource) -> EvalResult<Candidate> {
    match source {
        CandidateSource::Variables(path) => evaluation.decode(&read_variables(path)?),
        CandidateSource::Random(seed) => evaluation.random(*seed),
        CandidateSource::Encode(path) => evaluation.encode(&read_schedule(path)?),
    }
}

fn print_candidate(candidate: &Candidate) {
    let join = |values: &[f64], precision: usize| {
        values
            .iter()
            .map(|v| format!("{v:.precision$}"))
            .collect::<Vec<_>>()
            .join(",")
    };
    println!("variables: {}", join(&candidate.variables, 4));
    println!("schedule:  {}", join(&candidate.schedule, 1));
}

fn run(cli: &CliOptions, evaluation: &Evaluation) -> EvalResult<()> {
    if let Some(ref source) = cli.candidate {
        let candidate = build_candidate(evaluation, source)?;
        print_candidate(&candidate);

        if let Some(ref path) = cli.schedule_out {
            export_schedule(&candidate.schedule, path)?;
            eprintln!("Schedule written to {}", path.display());
        }
        if let Some(ref path) = cli.trace_out {
            let file = std::fs::File::create(path)?;
            let tph = evaluation.extractor_config().timesteps_per_hour;
            write_trace(&candidate.trace, tph, io::BufWriter::new(file))?;
            eprintln!("Setpoint trace written to {}", path.display());
        }
    }

    if let Some(ref path) = cli.table {
        let table = read_table(path)?;
        let report = evaluation.evaluate(&table)?;
        if cli.json {
            write_report_json(&report, io::stdout().lock())?;
        } else {
            println!("\n{report}");
        }
        if let Some(ref out) = cli.report_out {
            export_report(&report, Path::new(out))?;
            eprintln!("Report written to {}", out.display());
        }
    }

    Ok(())
}

fn main() {
    let cli = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });
    init_tracing(cli.verbose);

    let config = load_config(&cli);
    let evaluation = Evaluation::from_config(&config).unwrap_or_else(|e| {
        eprintln!("error: {e}");
        process::exit(1);
    });

    if let Err(e) = run(&cli, &evaluation) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
