//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvHoldingsAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::http_analytics_adapter::HttpAnalyticsAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::config_validation::{
    validate_report_config, validate_service_config, DEFAULT_AXIS_TICKS,
};
use crate::domain::dashboard::AnalysisReport;
use crate::domain::error::PortlensError;
use crate::domain::holding::{split_pair, Holding, Portfolio};
use crate::domain::metrics::Metrics;
use crate::domain::session::{AnalyzeRequest, Session, SessionState};
use crate::domain::validation::{self, Validation};
use crate::ports::analytics_port::AnalyticsPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::holdings_port::{HoldingsPort, RawHolding};
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "portlens", about = "Portfolio analytics client")]
pub struct Cli {
    /// Log pipeline details (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default, Clone)]
pub struct HoldingsArgs {
    /// A holding as TICKER=VALUE; repeat for more
    #[arg(long = "holding", value_name = "TICKER=VALUE")]
    pub pairs: Vec<String>,
    /// CSV file with `ticker` and `value` columns
    #[arg(long = "holdings", value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit holdings for analysis and write a report
    Analyze {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        holdings: HoldingsArgs,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also store the raw service response as JSON
        #[arg(long)]
        save_response: Option<PathBuf>,
    },
    /// Print normalized weights without contacting the service
    Weights {
        #[command(flatten)]
        holdings: HoldingsArgs,
    },
    /// Check a saved service response
    Validate {
        #[arg(long)]
        response: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Interactive session, optionally seeded with holdings
    Session {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        holdings: HoldingsArgs,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            config,
            holdings,
            output,
            save_response,
        } => run_analyze(
            config.as_deref(),
            &holdings,
            output.as_deref(),
            save_response.as_deref(),
        ),
        Command::Weights { holdings } => run_weights(&holdings),
        Command::Validate { response, output } => run_validate(&response, output.as_deref()),
        Command::Session { config, holdings } => run_session(config.as_deref(), &holdings),
    }
}

fn fail(err: &PortlensError) -> ExitCode {
    eprintln!("error: {err}");
    if let PortlensError::InvalidResponse { reasons } = err {
        for reason in reasons {
            eprintln!("  - {reason}");
        }
    }
    err.into()
}

/// Load and validate the INI file, or an empty config when none is given.
pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, PortlensError> {
    let adapter = match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| PortlensError::ConfigParse {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?
        }
        None => FileConfigAdapter::empty(),
    };
    validate_service_config(&adapter)?;
    validate_report_config(&adapter)?;
    Ok(adapter)
}

/// Turn `TICKER=VALUE` (or `TICKER:VALUE`) arguments into raw pairs.
///
/// An argument without a separator becomes a pair with an empty value,
/// which the portfolio then rejects.
pub fn parse_holding_args(args: &[String]) -> Vec<RawHolding> {
    args.iter()
        .map(|arg| match split_pair(arg) {
            Some((ticker, value)) => RawHolding::new(ticker, value),
            None => RawHolding::new(arg.as_str(), ""),
        })
        .collect()
}

/// Add each pair in order; rejected pairs are logged and skipped.
pub fn portfolio_from_raw(rows: &[RawHolding]) -> Portfolio {
    let mut portfolio = Portfolio::new();
    for row in rows {
        if let Err(reason) = portfolio.add(&row.ticker, &row.value) {
            tracing::warn!(ticker = %row.ticker, value = %row.value, %reason, "holding ignored");
        }
    }
    portfolio
}

/// Holdings from the CSV file first, then from `--holding` arguments.
pub fn collect_holdings(args: &HoldingsArgs) -> Result<Portfolio, PortlensError> {
    let mut rows = match &args.file {
        Some(path) => CsvHoldingsAdapter::new(path.clone()).load_holdings()?,
        None => Vec::new(),
    };
    rows.extend(parse_holding_args(&args.pairs));
    Ok(portfolio_from_raw(&rows))
}

/// Submit one request and accept the response only if it validates.
pub fn fetch_metrics(
    analytics: &dyn AnalyticsPort,
    request: &AnalyzeRequest,
) -> Result<(Metrics, Value), PortlensError> {
    let payload = analytics.analyze(request)?;
    match validation::validate(&payload) {
        Validation::Valid(metrics) => Ok((metrics, payload)),
        Validation::Invalid(reasons) => {
            tracing::debug!(failures = reasons.len(), "response rejected");
            Err(PortlensError::InvalidResponse { reasons })
        }
    }
}

fn save_payload(payload: &Value, path: &Path) -> Result<(), PortlensError> {
    let content = serde_json::to_string_pretty(payload).map_err(io::Error::from)?;
    fs::write(path, content)?;
    eprintln!("Response saved to: {}", path.display());
    Ok(())
}

/// Weigh the holdings, submit them and render the validated result.
///
/// The raw response is saved before validation so a rejected payload can
/// still be inspected with `validate`.
pub fn run_analysis_pipeline(
    analytics: &dyn AnalyticsPort,
    report_port: &dyn ReportPort,
    portfolio: &Portfolio,
    output_path: &str,
    save_response: Option<&Path>,
    generated_on: NaiveDate,
) -> Result<AnalysisReport, PortlensError> {
    let weighted = portfolio.weighted()?;
    let request = AnalyzeRequest::from_weighted(&weighted);

    eprintln!("Submitting {} holdings for analysis...", weighted.len());
    let payload = analytics.analyze(&request)?;
    if let Some(path) = save_response {
        save_payload(&payload, path)?;
    }

    let metrics = validation::validate(&payload).into_result()?;
    let report = AnalysisReport::build(weighted, metrics, generated_on);

    report_port.write(&report, output_path)?;
    eprintln!("Report written to: {}", output_path);
    Ok(report)
}

fn run_analyze(
    config_path: Option<&Path>,
    holdings: &HoldingsArgs,
    output: Option<&Path>,
    save_response: Option<&Path>,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let portfolio = match collect_holdings(holdings) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let analytics = match HttpAnalyticsAdapter::from_config(&config) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    tracing::debug!(url = analytics.url(), "analytics endpoint");
    let reporter = TypstReportAdapter::from_config(&config);

    let output = match output {
        Some(path) => path.display().to_string(),
        None => config.get_string_or("report", "output", "report.typ"),
    };

    match run_analysis_pipeline(
        &analytics,
        &reporter,
        &portfolio,
        &output,
        save_response,
        Local::now().date_naive(),
    ) {
        Ok(report) => {
            let mut stdout = io::stdout().lock();
            match write_summary(&mut stdout, &report) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => fail(&PortlensError::from(e)),
            }
        }
        Err(e) => fail(&e),
    }
}

fn run_weights(holdings: &HoldingsArgs) -> ExitCode {
    let weighted = match collect_holdings(holdings).and_then(|p| p.weighted()) {
        Ok(w) => w,
        Err(e) => return fail(&e),
    };
    let mut stdout = io::stdout().lock();
    match write_weights(&mut stdout, &weighted) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&PortlensError::from(e)),
    }
}

/// Parse a saved response file into an untrusted JSON value.
pub fn read_response(path: &Path) -> Result<Value, PortlensError> {
    let content = fs::read_to_string(path)?;
    let value = serde_json::from_str(&content).map_err(io::Error::from)?;
    Ok(value)
}

fn run_validate(response: &Path, output: Option<&Path>) -> ExitCode {
    eprintln!("Validating {}", response.display());
    let payload = match read_response(response) {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };

    let metrics = match validation::validate(&payload).into_result() {
        Ok(m) => m,
        Err(e) => return fail(&e),
    };
    eprintln!("Response is valid");

    let report = AnalysisReport::build(Vec::new(), metrics, Local::now().date_naive());
    let mut stdout = io::stdout().lock();
    if let Err(e) = write_summary(&mut stdout, &report) {
        return fail(&PortlensError::from(e));
    }

    if let Some(path) = output {
        let reporter = TypstReportAdapter::new(None, DEFAULT_AXIS_TICKS as usize);
        let path = path.display().to_string();
        if let Err(e) = reporter.write(&report, &path) {
            return fail(&e);
        }
        eprintln!("Report written to: {}", path);
    }
    ExitCode::SUCCESS
}

pub fn write_weights<W: Write>(out: &mut W, holdings: &[Holding]) -> io::Result<()> {
    writeln!(out, "{:<10} {:>14} {:>9}", "Ticker", "Value", "Weight")?;
    for h in holdings {
        let weight = h
            .weight
            .map(|w| format!("{:.2}%", w))
            .unwrap_or_else(|| "-".to_string());
        writeln!(out, "{:<10} {:>14.2} {:>9}", h.ticker, h.value, weight)?;
    }
    let total: f64 = holdings.iter().map(|h| h.value).sum();
    writeln!(out, "{:<10} {:>14.2}", "Total", total)?;
    Ok(())
}

/// Console summary: holdings, metric cards and significant cycles.
pub fn write_summary<W: Write>(out: &mut W, report: &AnalysisReport) -> io::Result<()> {
    if !report.holdings.is_empty() {
        writeln!(out, "=== Holdings ===")?;
        write_weights(out, &report.holdings)?;
        writeln!(out)?;
    }

    for card in report.metrics.cards() {
        writeln!(out, "=== {} ===", card.title)?;
        for row in &card.rows {
            writeln!(out, "{:<20} {:>10}", row.label, row.display_value())?;
        }
        writeln!(out)?;
    }

    writeln!(out, "=== Historical Risk ===")?;
    for row in report.metrics.historical_risk_rows() {
        writeln!(out, "{:<24} {:>10}", row.label, row.display_value())?;
    }
    writeln!(out)?;

    if !report.risk_contributions.is_empty() {
        writeln!(out, "=== Risk Contributions ===")?;
        for entry in &report.risk_contributions {
            writeln!(out, "{:<24} {:>10.4}", entry.label, entry.contribution)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "=== Significant Cycles ===")?;
    match report.spectral.threshold {
        None => writeln!(out, "No spectral data available.")?,
        Some(threshold) => {
            writeln!(out, "Threshold: {:.4}", threshold)?;
            for cycle in report.spectral.significant() {
                writeln!(
                    out,
                    "{:>6} days  power {:>10.4}  strength {:>5.1}%",
                    cycle.period, cycle.power, cycle.relative_strength
                )?;
            }
        }
    }
    writeln!(
        out,
        "\nPrice points: {}  Return points: {}",
        report.prices.len(),
        report.returns.len()
    )?;
    Ok(())
}

const SESSION_HELP: &str = "\
commands:
  add TICKER VALUE   add a holding (also TICKER=VALUE)
  remove N           remove the N-th holding as shown by list
  list               show holdings and weights
  analyze            submit the holdings for analysis
  status             show the current state
  clear              dismiss the last error
  reset              drop all holdings and results
  help               show this help
  quit               leave the session";

fn write_status<W: Write>(out: &mut W, session: &Session) -> io::Result<()> {
    match session.state() {
        SessionState::Idle => writeln!(out, "idle")?,
        SessionState::Submitting { generation } => {
            writeln!(out, "submitting (attempt {generation})")?
        }
        SessionState::Success => writeln!(out, "analysis available")?,
        SessionState::Failure(failure) => writeln!(out, "failed: {}", failure.message)?,
    }
    writeln!(
        out,
        "{} holding(s), {} attempt(s)",
        session.portfolio().len(),
        session.generation()
    )
}

fn session_analyze<W: Write>(
    out: &mut W,
    session: &mut Session,
    analytics: &dyn AnalyticsPort,
    today: NaiveDate,
) -> io::Result<()> {
    let submission = match session.begin_submission() {
        Ok(s) => s,
        Err(e) => return writeln!(out, "error: {e}"),
    };
    writeln!(out, "analyzing {} holding(s)...", submission.request.holdings.len())?;

    let outcome = fetch_metrics(analytics, &submission.request).map(|(metrics, _)| metrics);
    session.complete(submission.generation, outcome);

    if let Some(failure) = session.failure() {
        return writeln!(out, "error: {}", failure.message);
    }
    if let (Some(metrics), Ok(weighted)) = (session.metrics(), session.portfolio().weighted()) {
        let report = AnalysisReport::build(weighted, metrics.clone(), today);
        write_summary(out, &report)?;
    }
    Ok(())
}

/// Read commands line by line until `quit` or end of input.
pub fn run_session_loop<R: BufRead, W: Write>(
    session: &mut Session,
    analytics: &dyn AnalyticsPort,
    input: R,
    out: &mut W,
    today: NaiveDate,
) -> io::Result<()> {
    writeln!(out, "portlens session; type `help` for commands")?;
    for line in input.lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };
        let rest: Vec<&str> = words.collect();

        match command.to_ascii_lowercase().as_str() {
            "add" => {
                let raw = match rest.as_slice() {
                    [pair] => parse_holding_args(&[pair.to_string()]),
                    [ticker, value] => vec![RawHolding::new(*ticker, *value)],
                    _ => vec![RawHolding::new(rest.join(" "), "")],
                };
                for row in raw {
                    if let Err(reason) = session.add_holding(&row.ticker, &row.value) {
                        tracing::warn!(ticker = %row.ticker, value = %row.value, %reason, "holding ignored");
                    }
                }
            }
            "remove" => {
                let removed = rest
                    .first()
                    .and_then(|n| n.parse::<usize>().ok())
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|index| session.remove_holding(index));
                match removed {
                    Some(h) => writeln!(out, "removed {}", h.ticker)?,
                    None => writeln!(out, "no such holding")?,
                }
            }
            "list" => {
                if session.portfolio().is_empty() {
                    writeln!(out, "no holdings")?;
                } else {
                    let shown = session
                        .portfolio()
                        .weighted()
                        .unwrap_or_else(|_| session.portfolio().holdings().to_vec());
                    for (i, h) in shown.iter().enumerate() {
                        let weight = h
                            .weight
                            .map(|w| format!("{:.2}%", w))
                            .unwrap_or_else(|| "-".to_string());
                        writeln!(out, "{:>3}. {:<10} {:>14.2} {:>9}", i + 1, h.ticker, h.value, weight)?;
                    }
                }
            }
            "analyze" => session_analyze(out, session, analytics, today)?,
            "status" => write_status(out, session)?,
            "clear" => session.clear_error(),
            "reset" => {
                session.reset();
                writeln!(out, "session reset")?;
            }
            "help" => writeln!(out, "{SESSION_HELP}")?,
            "quit" | "exit" => break,
            other => writeln!(out, "unknown command `{other}`; type `help`")?,
        }
    }
    Ok(())
}

fn run_session(config_path: Option<&Path>, holdings: &HoldingsArgs) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let portfolio = match collect_holdings(holdings) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let analytics = match HttpAnalyticsAdapter::from_config(&config) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    let mut session = Session::with_portfolio(portfolio);
    let stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    match run_session_loop(
        &mut session,
        &analytics,
        stdin,
        &mut stdout,
        Local::now().date_naive(),
    ) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&PortlensError::from(e)),
    }
}
