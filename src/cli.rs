//! Command-line argument parsing.

use std::env;
use std::path::PathBuf;

/// Where the candidate schedule comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    /// Variable vector read from a CSV file.
    Variables(PathBuf),
    /// Uniformly random variables from a seed.
    Random(u64),
    /// Known schedule read from a CSV file and re-encoded.
    Encode(PathBuf),
}

#[derive(Debug, Default)]
pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub preset: Option<String>,
    pub candidate: Option<CandidateSource>,
    pub table: Option<PathBuf>,
    pub schedule_out: Option<PathBuf>,
    pub trace_out: Option<PathBuf>,
    pub report_out: Option<PathBuf>,
    pub json: bool,
    pub verbose: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    if args.len() == 1 && (args[0] == "--help" || args[0] == "-h") {
        print_usage();
        std::process::exit(0);
    }
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--config" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --config (expected a TOML file path)")?;
                set_once(&mut opts.config, PathBuf::from(path), flag)?;
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                set_once(&mut opts.preset, name.to_string(), flag)?;
            }
            "--variables" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --variables (expected a CSV file path)")?;
                set_candidate(&mut opts, CandidateSource::Variables(PathBuf::from(path)))?;
            }
            "--random" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --random (expected a u64 seed)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--random value \"{raw}\" is not a valid u64"))?;
                set_candidate(&mut opts, CandidateSource::Random(seed))?;
            }
            "--encode" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --encode (expected a CSV file path)")?;
                set_candidate(&mut opts, CandidateSource::Encode(PathBuf::from(path)))?;
            }
            "--table" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --table (expected a CSV file path)")?;
                set_once(&mut opts.table, PathBuf::from(path), flag)?;
            }
            "--schedule-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --schedule-out (expected a file path)")?;
                set_once(&mut opts.schedule_out, PathBuf::from(path), flag)?;
            }
            "--trace-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --trace-out (expected a file path)")?;
                set_once(&mut opts.trace_out, PathBuf::from(path), flag)?;
            }
            "--report-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --report-out (expected a file path)")?;
                set_once(&mut opts.report_out, PathBuf::from(path), flag)?;
            }
            "--json" => opts.json = true,
            "--verbose" | "-v" => opts.verbose = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.config.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--config` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }
    if opts.candidate.is_none() && opts.table.is_none() {
        return Err(
            "nothing to do: give a candidate (--variables, --random, --encode) and/or --table"
                .to_string(),
        );
    }
    if opts.candidate.is_none() && (opts.schedule_out.is_some() || opts.trace_out.is_some()) {
        return Err("--schedule-out and --trace-out need a candidate".to_string());
    }
    if opts.table.is_none() && opts.report_out.is_some() {
        return Err("--report-out needs --table".to_string());
    }

    Ok(opts)
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), String> {
    if slot.replace(value).is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    Ok(())
}

fn set_candidate(opts: &mut CliOptions, source: CandidateSource) -> Result<(), String> {
    if opts.candidate.replace(source).is_some() {
        return Err(
            "arguments `--variables`, `--random` and `--encode` are mutually exclusive".to_string(),
        );
    }
    Ok(())
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("setpoint-eval: decode setpoint schedules and score simulator output");
    eprintln!();
    eprintln!("Usage: setpoint-eval [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load configuration from a TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (office, full_day, direct_encoding)");
    eprintln!("  --variables <csv>        Decode a variable vector");
    eprintln!("  --random <seed>          Decode a random variable vector");
    eprintln!("  --encode <csv>           Re-encode a known hourly schedule");
    eprintln!("  --table <csv>            Score a simulator output table");
    eprintln!("  --schedule-out <path>    Write the hourly schedule as CSV");
    eprintln!("  --trace-out <path>       Write the per-timestep setpoint trace as CSV");
    eprintln!("  --report-out <path>      Write the objective report (.json or CSV)");
    eprintln!("  --json                   Print the report as JSON");
    eprintln!("  --verbose, -v            Debug logging on stderr");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --config or --preset is given, the office preset is used.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn supports_config_and_table() {
        let opts = parse_args_from(args(&["--config", "office.toml", "--table", "out.csv"]))
            .expect("parse should succeed");
        assert_eq!(
            opts.config.as_deref().and_then(|p| p.to_str()),
            Some("office.toml")
        );
        assert!(opts.preset.is_none());
        assert!(opts.table.is_some());
    }

    #[test]
    fn supports_random_candidate() {
        let opts = parse_args_from(args(&["--preset", "office", "--random", "42", "--json"]))
            .expect("parse should succeed");
        assert_eq!(opts.candidate, Some(CandidateSource::Random(42)));
        assert_eq!(opts.preset.as_deref(), Some("office"));
        assert!(opts.json);
    }

    #[test]
    fn rejects_config_with_preset() {
        let err = parse_args_from(args(&[
            "--config", "a.toml", "--preset", "office", "--random", "1",
        ]))
        .unwrap_err();
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn rejects_two_candidate_sources() {
        let err =
            parse_args_from(args(&["--random", "1", "--variables", "v.csv"])).unwrap_err();
        assert!(err.contains("mutually exclusive"));
    }

    #[test]
    fn rejects_bad_seed() {
        let err = parse_args_from(args(&["--random", "abc"])).unwrap_err();
        assert!(err.contains("not a valid u64"));
    }

    #[test]
    fn rejects_missing_value() {
        let err = parse_args_from(args(&["--table"])).unwrap_err();
        assert!(err.contains("missing value for --table"));
    }

    #[test]
    fn rejects_empty_invocation() {
        let err = parse_args_from(Vec::new()).unwrap_err();
        assert!(err.contains("nothing to do"));
    }

    #[test]
    fn report_out_requires_table() {
        let err = parse_args_from(args(&["--random", "1", "--report-out", "r.json"])).unwrap_err();
        assert!(err.contains("--report-out"));
    }
}
