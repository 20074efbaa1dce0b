use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{eyre, Context, Result};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use cpamm_sim::bounds::BoundStrategy;
use cpamm_sim::scenario::{ReserveRanges, ScenarioGenerator};
use cpamm_sim::timing::{run_benchmark, BenchmarkSummary};
use cpamm_sim::{
    find_optimal_trade_with, ArbitrageReport, EventSink, Pool, PoolEvent, ReservePair,
    SearchConfig, Token, TracingSink,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "cpamm-arb")]
#[command(about = "Optimal two-pool arbitrage sizing for constant-product AMMs")]
#[command(version)]
#[command(after_help = "Exit status: 0 trade found, 2 no opportunity, 1 error.")]
struct Cli {
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// JSON search config; unset fields keep their defaults.
    #[arg(long, global = true, env = "CPAMM_CONFIG")]
    config: Option<PathBuf>,

    /// Overrides `fee_rate` from the config.
    #[arg(long, global = true)]
    fee_rate: Option<f64>,

    /// Overrides `max_evaluations` from the config.
    #[arg(long, global = true)]
    max_evaluations: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Solve for user-supplied reserves; missing values are prompted for.
    Solve(SolveArgs),
    /// Solve for randomly drawn DAI/ETH-sized reserves.
    Random(RandomArgs),
    /// Time the search over many random scenarios.
    Bench(BenchArgs),
    /// Run one swap on a fresh pool and print the event trail.
    Swap(SwapArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// Base (DAI) reserve of pool A.
    #[arg(long)]
    base_a: Option<f64>,

    /// Quote (ETH) reserve of pool A.
    #[arg(long)]
    quote_a: Option<f64>,

    /// Base (DAI) reserve of pool B.
    #[arg(long)]
    base_b: Option<f64>,

    /// Quote (ETH) reserve of pool B.
    #[arg(long)]
    quote_b: Option<f64>,

    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,
}

#[derive(Args, Debug)]
struct RandomArgs {
    /// RNG seed; a fresh one is drawn and logged when omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,
}

#[derive(Args, Debug)]
struct BenchArgs {
    #[arg(long, default_value_t = 100)]
    samples: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Overrides the bound heuristic from the config.
    #[arg(long, value_enum)]
    bounds: Option<BoundsArg>,

    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BoundsArg {
    CapitalWeighted,
    PriceScaled,
}

impl From<BoundsArg> for BoundStrategy {
    fn from(arg: BoundsArg) -> Self {
        match arg {
            BoundsArg::CapitalWeighted => BoundStrategy::CapitalWeighted,
            BoundsArg::PriceScaled => BoundStrategy::PriceScaled,
        }
    }
}

#[derive(Args, Debug)]
struct SwapArgs {
    #[arg(long)]
    base: f64,

    #[arg(long)]
    quote: f64,

    /// Input token: base/quote or DAI/ETH.
    #[arg(long)]
    token: String,

    #[arg(long)]
    amount: f64,

    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(fee_rate) = cli.fee_rate {
        config.fee_rate = fee_rate;
    }
    if let Some(max_evaluations) = cli.max_evaluations {
        config.max_evaluations = max_evaluations;
    }
    config.validate().wrap_err("invalid search configuration")?;

    match cli.command {
        Commands::Solve(args) => handle_solve(&config, args),
        Commands::Random(args) => handle_random(&config, args),
        Commands::Bench(args) => handle_bench(config, args),
        Commands::Swap(args) => handle_swap(&config, args),
    }
}

fn init_tracing(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::WARN
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.as_str()))
        .wrap_err("failed to initialize tracing filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SearchConfig> {
    let Some(path) = path else {
        return Ok(SearchConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    let config: SearchConfig = serde_json::from_str(&content)
        .wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
    info!(path = %path.display(), "loaded search config");
    Ok(config)
}

/// Status for a clean run that found no profitable trade. Hard errors exit
/// with 1 through `eyre`, so scripts can tell the two apart.
const NO_OPPORTUNITY_EXIT: u8 = 2;

fn exit_code(report: &ArbitrageReport) -> ExitCode {
    if report.found {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(NO_OPPORTUNITY_EXIT)
    }
}

fn handle_solve(config: &SearchConfig, args: SolveArgs) -> Result<ExitCode> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let base_a = value_or_prompt(args.base_a, "Enter DAI in pool A (X1)", &mut input)?;
    let quote_a = value_or_prompt(args.quote_a, "Enter ETH in pool A (Y1)", &mut input)?;
    let base_b = value_or_prompt(args.base_b, "Enter DAI in pool B (X2)", &mut input)?;
    let quote_b = value_or_prompt(args.quote_b, "Enter ETH in pool B (Y2)", &mut input)?;

    let reserves_a = ReservePair::new(base_a, quote_a);
    let reserves_b = ReservePair::new(base_b, quote_b);
    let report = find_optimal_trade_with(reserves_a, reserves_b, config)
        .wrap_err("arbitrage search failed")?;

    print_report(&reserves_a, &reserves_b, &report, args.output)?;
    Ok(exit_code(&report))
}

fn value_or_prompt(value: Option<f64>, prompt: &str, input: &mut impl BufRead) -> Result<f64> {
    if let Some(value) = value {
        return Ok(value);
    }

    let mut stderr = io::stderr();
    loop {
        write!(stderr, "{prompt}: ")?;
        stderr.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(eyre!("stdin closed while waiting for '{prompt}'"));
        }
        match line.trim().parse::<f64>() {
            Ok(value) => return Ok(value),
            Err(_) => writeln!(stderr, "Error: '{}' is not a valid float", line.trim())?,
        }
    }
}

fn handle_random(config: &SearchConfig, args: RandomArgs) -> Result<ExitCode> {
    let seed = args.seed.unwrap_or_else(rand_seed);
    let mut generator = ScenarioGenerator::from_seed_u64(seed, ReserveRanges::default())?;
    let scenario = generator.next_scenario();
    info!(
        seed,
        base_a = scenario.reserves_a.base,
        quote_a = scenario.reserves_a.quote,
        base_b = scenario.reserves_b.base,
        quote_b = scenario.reserves_b.quote,
        "randomly generated reserves"
    );

    let report = find_optimal_trade_with(scenario.reserves_a, scenario.reserves_b, config)
        .wrap_err("arbitrage search failed")?;

    print_report(&scenario.reserves_a, &scenario.reserves_b, &report, args.output)?;
    Ok(exit_code(&report))
}

/// Seed for runs without `--seed`, derived from the clock and logged so the
/// run can be replayed.
fn rand_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}

fn print_report(
    reserves_a: &ReservePair,
    reserves_b: &ReservePair,
    report: &ArbitrageReport,
    output: OutputFormat,
) -> Result<()> {
    match output {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "reserves_a": reserves_a,
                "reserves_b": reserves_b,
                "report": report,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).wrap_err("failed to encode report")?
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec!["Pool", "DAI (base)", "ETH (quote)", "Price (ETH/DAI)"]);
            for (label, pair) in [("A", reserves_a), ("B", reserves_b)] {
                table.add_row(vec![
                    label.to_string(),
                    format!("{:.4}", pair.base),
                    format!("{:.4}", pair.quote),
                    format!("{:.8}", pair.price()),
                ]);
            }
            println!("{table}\n");

            println!("Search (evaluations: {}):", report.evaluations);
            println!("  Upper bound:  {:.6}", report.upper_bound);
            println!("  Converged:    {}", report.converged);
            if report.found {
                println!("  ETH in:       {}", report.amount);
                println!("  ETH profit:   {}", report.profit);
            }
            println!("\n{report}");
        }
    }
    Ok(())
}

fn handle_bench(mut config: SearchConfig, args: BenchArgs) -> Result<ExitCode> {
    if args.samples == 0 {
        return Err(eyre!("--samples must be at least 1"));
    }
    if let Some(bounds) = args.bounds {
        config.bounds = bounds.into();
    }

    let seed = args.seed.unwrap_or_else(rand_seed);
    let mut generator = ScenarioGenerator::from_seed_u64(seed, ReserveRanges::default())?;

    let pb = ProgressBar::new(args.samples as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40}] {pos}/{len} {msg}")
            .wrap_err("failed to create progress style")?,
    );
    pb.set_message("timing searches");

    let summary = run_benchmark(&mut generator, args.samples, &config, |_| pb.inc(1));
    pb.finish_with_message("benchmark completed");

    match args.output {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&summary).wrap_err("failed to encode summary")?
        ),
        OutputFormat::Table => print_bench_table(&summary),
    }

    info!(
        seed,
        samples = summary.samples.len(),
        skipped = summary.skipped,
        profitable = summary.profitable,
        bounds = ?config.bounds,
        "bench command completed"
    );
    Ok(ExitCode::SUCCESS)
}

fn print_bench_table(summary: &BenchmarkSummary) {
    let (secs, evals) = (&summary.seconds, &summary.evaluations);
    let rows = [
        ("mean", secs.mean, evals.mean),
        ("std", secs.std, evals.std),
        ("min", secs.min, evals.min),
        ("25%", secs.p25, evals.p25),
        ("50%", secs.p50, evals.p50),
        ("75%", secs.p75, evals.p75),
        ("max", secs.max, evals.max),
    ];

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Stat", "Time (µs)", "Evaluations"]);
    table.add_row(vec![
        "count".to_string(),
        secs.count.to_string(),
        evals.count.to_string(),
    ]);
    for (label, seconds, evaluations) in rows {
        table.add_row(vec![
            label.to_string(),
            format!("{:.3}", seconds * 1e6),
            format!("{evaluations:.2}"),
        ]);
    }

    println!("{table}\n");
    println!("Summary (seed: {}):", summary.seed);
    println!("  Profitable:  {}", summary.profitable);
    println!("  Skipped:     {}", summary.skipped);
}

fn handle_swap(config: &SearchConfig, args: SwapArgs) -> Result<ExitCode> {
    let token: Token = args.token.parse()?;
    let mut pool = Pool::with_fee(args.base, args.quote, config.fee_rate)?;

    let mut trail: Vec<PoolEvent> = Vec::new();
    let amount_out = pool
        .swap_with(token, args.amount, &mut trail)
        .wrap_err("swap failed")?;

    let mut log = TracingSink;
    for event in &trail {
        log.record(event.clone());
    }

    match args.output {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&trail).wrap_err("failed to encode events")?
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec!["", "DAI (base)", "ETH (quote)", "K"]);
            if let Some(PoolEvent::Swap { before, after, .. }) = trail.first() {
                for (label, snapshot) in [("before", before), ("after", after)] {
                    table.add_row(vec![
                        label.to_string(),
                        format!("{:.6}", snapshot.base),
                        format!("{:.6}", snapshot.quote),
                        format!("{:.6}", snapshot.invariant),
                    ]);
                }
            }
            println!("{table}\n");
            println!(
                "Input: {} {} | Output: {} {}",
                args.amount,
                token.symbol(),
                amount_out,
                token.other().symbol()
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
