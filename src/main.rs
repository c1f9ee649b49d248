use affinity::export::{read_observations_csv, write_clusters_json, write_observations_csv, ClusterReport};
use affinity::generator::{
    read_metadata, InterviewGenerator, InterviewMetadata, DEFAULT_INTERVIEW_COUNT, DEFAULT_SEED,
    METADATA_FILE,
};
use affinity::insights::{render_findings, synthesize, write_synthesis_json, SynthesisReport};
use affinity::persona::{build_personas, write_personas_json, PersonaProfile};
use affinity::report::{self, ReportOptions};
use affinity::summary::{ClusterSummary, Distribution};
use affinity::{load_corpus, AffinityPipeline, AffinityTable, Config, FailureMode, Sentiment};
use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const TABLE_FILE: &str = "affinity_clusters.csv";
const CLUSTERS_FILE: &str = "clusters.json";
const PERSONAS_FILE: &str = "personas.json";
const INSIGHTS_FILE: &str = "insights.json";
const FINDINGS_FILE: &str = "research_findings.txt";
const REPORT_FILE: &str = "report.html";

#[derive(Parser, Debug)]
#[command(name = "affinity")]
#[command(author, version, about = "Cluster interview transcripts into an affinity map")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Config file (default: nearest .affinity/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a synthetic interview corpus
    Generate {
        /// Output directory
        #[arg(short, long, default_value = "data")]
        out: PathBuf,

        /// Number of interviews
        #[arg(short = 'n', long, default_value_t = DEFAULT_INTERVIEW_COUNT)]
        count: usize,

        /// RNG seed; the same seed always yields the same corpus
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
    },

    /// Extract and classify observations from a transcript directory
    Analyze {
        /// Directory containing interview_*.txt
        dir: PathBuf,

        /// Where to write the table and cluster summaries (default: <dir>)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Fail on the first malformed transcript
        #[arg(long)]
        strict: bool,
    },

    /// Print cluster summaries for a saved observation table
    Summary {
        /// Observation table CSV
        csv: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Render an HTML affinity map from a saved observation table
    Report {
        /// Observation table CSV
        csv: PathBuf,

        /// Output HTML file
        #[arg(short, long, default_value = REPORT_FILE)]
        output: PathBuf,

        /// Page title
        #[arg(long)]
        title: Option<String>,
    },

    /// Build persona profiles from a saved observation table
    Personas {
        /// Observation table CSV
        csv: PathBuf,

        /// Interview metadata JSON (default: interview_metadata.json next to the CSV)
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Output JSON file
        #[arg(short, long, default_value = PERSONAS_FILE)]
        output: PathBuf,
    },

    /// Synthesize key insights from a saved observation table
    Insights {
        /// Observation table CSV
        csv: PathBuf,

        /// Interview metadata JSON (default: interview_metadata.json next to the CSV)
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Print JSON instead of the findings text
        #[arg(long)]
        json: bool,

        /// Also write the synthesis as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate, analyze and report in one go
    Run {
        /// Output directory; transcripts go to <out>/transcripts
        #[arg(short, long, default_value = "research")]
        out: PathBuf,

        /// Number of interviews
        #[arg(short = 'n', long, default_value_t = DEFAULT_INTERVIEW_COUNT)]
        count: usize,

        /// RNG seed
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Fail on the first malformed transcript
        #[arg(long)]
        strict: bool,

        /// Report page title
        #[arg(long)]
        title: Option<String>,
    },

    /// Classify a single sentence
    Classify {
        text: String,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(Config::load()),
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Generate { out, count, seed } => {
            generate(&out, count, seed, cli.quiet)?;
        }

        Command::Analyze { dir, out, strict } => {
            analyze(&config, &dir, out.as_deref().unwrap_or(dir.as_path()), strict, cli.quiet)?;
        }

        Command::Personas {
            csv,
            metadata,
            output,
        } => {
            let observations = read_observations_csv(&csv)
                .with_context(|| format!("reading {}", csv.display()))?;
            let metadata = load_metadata(&csv, metadata.as_deref(), cli.quiet)?;
            let personas = build_personas(&observations, &metadata, config.summary.persona_quotes);
            write_personas_json(&output, &personas)
                .with_context(|| format!("writing {}", output.display()))?;
            if !cli.quiet {
                println!("   {} {}", "Creating".green(), output.display());
                print_personas(&personas);
            }
        }

        Command::Insights {
            csv,
            metadata,
            json,
            output,
        } => {
            let observations = read_observations_csv(&csv)
                .with_context(|| format!("reading {}", csv.display()))?;
            let metadata = load_metadata(&csv, metadata.as_deref(), cli.quiet || json)?;
            let synthesis = synthesize(&observations, &metadata, config.summary.sample_quotes);
            if let Some(output) = &output {
                write_synthesis_json(output, &synthesis)
                    .with_context(|| format!("writing {}", output.display()))?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&synthesis)?);
            } else if !cli.quiet {
                print!("{}", render_findings(&synthesis));
            }
        }

        Command::Run {
            out,
            count,
            seed,
            strict,
            title,
        } => {
            run_all(&config, &out, count, seed, strict, title, cli.quiet)?;
        }

        Command::Summary { csv, json } => {
            let observations = read_observations_csv(&csv)
                .with_context(|| format!("reading {}", csv.display()))?;
            let report = ClusterReport::build(&observations, config.summary.sample_quotes);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_clusters(&report.clusters, report.total_observations);
            }
        }

        Command::Report { csv, output, title } => {
            let observations = read_observations_csv(&csv)
                .with_context(|| format!("reading {}", csv.display()))?;
            let mut options = ReportOptions {
                sample_quotes: config.summary.sample_quotes,
                ..ReportOptions::default()
            };
            if let Some(title) = title {
                options.title = title;
            }
            report::generate(&output, &observations, &options)
                .with_context(|| format!("writing {}", output.display()))?;
            if !cli.quiet {
                println!("   {} {}", "Creating".green(), output.display());
            }
        }

        Command::Classify { text } => {
            let pipeline = AffinityPipeline::new(config.rules()?, config.extract.clone())?;
            let (negative, positive) = pipeline.sentiment().counts(&text);
            let sentiment = pipeline.sentiment().classify(&text);
            let theme = pipeline.themes().classify(&text);

            println!(
                "Sentiment: {} ({} negative, {} positive)",
                paint_sentiment(sentiment),
                negative,
                positive
            );
            println!("Theme:     {}", theme.label().cyan().bold());
            let scores: Vec<_> = pipeline
                .themes()
                .scores(&text)
                .into_iter()
                .filter(|(_, score)| *score > 0)
                .collect();
            if !scores.is_empty() {
                println!("Scores:");
                for (theme, score) in scores {
                    println!("  {:<28} {}", theme.label(), score);
                }
            }
        }

        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "affinity", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn generate(out: &Path, count: usize, seed: u64, quiet: bool) -> Result<()> {
    let written = InterviewGenerator::new(count, seed)
        .write_all(out)
        .with_context(|| format!("writing interviews to {}", out.display()))?;
    if !quiet {
        for path in &written {
            println!("   {} {}", "Creating".green(), path.display());
        }
        println!(
            "\n{} {} interviews (seed {})",
            "Generated".green().bold(),
            count,
            seed
        );
    }
    Ok(())
}

/// Metadata from `explicit`, else from next to the CSV when it exists
fn load_metadata(csv: &Path, explicit: Option<&Path>, quiet: bool) -> Result<Vec<InterviewMetadata>> {
    if let Some(path) = explicit {
        return read_metadata(path).with_context(|| format!("reading {}", path.display()));
    }
    let path = csv.parent().unwrap_or(Path::new("")).join(METADATA_FILE);
    if !path.exists() {
        if !quiet {
            println!("   {} no {}, persona data left out", "Warning".yellow(), path.display());
        }
        return Ok(Vec::new());
    }
    read_metadata(&path).with_context(|| format!("reading {}", path.display()))
}

/// Generate a corpus under `<out>/transcripts` and write every derived artifact to `out`
fn run_all(
    config: &Config,
    out: &Path,
    count: usize,
    seed: u64,
    strict: bool,
    title: Option<String>,
    quiet: bool,
) -> Result<()> {
    let transcripts = out.join("transcripts");
    generate(&transcripts, count, seed, quiet)?;
    let table = analyze(config, &transcripts, out, strict, quiet)?;
    let observations = table.observations();

    let metadata_path = transcripts.join(METADATA_FILE);
    let metadata = read_metadata(&metadata_path)
        .with_context(|| format!("reading {}", metadata_path.display()))?;

    let personas = build_personas(observations, &metadata, config.summary.persona_quotes);
    let personas_path = out.join(PERSONAS_FILE);
    write_personas_json(&personas_path, &personas)
        .with_context(|| format!("writing {}", personas_path.display()))?;

    let synthesis = synthesize(observations, &metadata, config.summary.sample_quotes);
    let insights_path = out.join(INSIGHTS_FILE);
    write_synthesis_json(&insights_path, &synthesis)
        .with_context(|| format!("writing {}", insights_path.display()))?;
    let findings_path = out.join(FINDINGS_FILE);
    std::fs::write(&findings_path, render_findings(&synthesis))
        .with_context(|| format!("writing {}", findings_path.display()))?;

    let mut options = ReportOptions {
        sample_quotes: config.summary.sample_quotes,
        ..ReportOptions::default()
    };
    if let Some(title) = title {
        options.title = title;
    }
    let report_path = out.join(REPORT_FILE);
    report::generate(&report_path, observations, &options)
        .with_context(|| format!("writing {}", report_path.display()))?;

    if !quiet {
        for path in [&personas_path, &insights_path, &findings_path, &report_path] {
            println!("   {} {}", "Creating".green(), path.display());
        }
        print_insights(&synthesis);
    }
    Ok(())
}

fn analyze(
    config: &Config,
    dir: &Path,
    out: &Path,
    strict: bool,
    quiet: bool,
) -> Result<AffinityTable> {
    let mode = if strict {
        FailureMode::Strict
    } else {
        config.failure_mode()
    };

    let load = load_corpus(dir)?;
    for (path, err) in &load.unreadable {
        if mode == FailureMode::Strict {
            bail!("cannot read {}: {}", path.display(), err);
        }
        if !quiet {
            println!("   {} {} ({})", "Skipping".yellow(), path.display(), err);
        }
    }
    if load.corpus.is_empty() && !quiet {
        println!("   {} no interview_*.txt files in {}", "Warning".yellow(), dir.display());
    }

    let pipeline = AffinityPipeline::new(config.rules()?, config.extract.clone())?.with_mode(mode);
    let table = pipeline.run(&load.corpus)?;

    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    let table_path = out.join(TABLE_FILE);
    write_observations_csv(&table_path, table.observations())
        .with_context(|| format!("writing {}", table_path.display()))?;
    let clusters_path = out.join(CLUSTERS_FILE);
    let report = ClusterReport::build(table.observations(), config.summary.sample_quotes);
    write_clusters_json(&clusters_path, &report)
        .with_context(|| format!("writing {}", clusters_path.display()))?;

    if quiet {
        return Ok(table);
    }

    for skipped in table.skipped() {
        println!("   {} {} ({})", "Skipping".yellow(), skipped.id, skipped.reason);
    }
    println!("   {} {}", "Creating".green(), table_path.display());
    println!("   {} {}", "Creating".green(), clusters_path.display());
    println!(
        "\n{} {} observations from {} transcripts",
        "Affinity map:".cyan().bold(),
        table.len(),
        table.transcript_count() - table.skipped().len()
    );
    print_distribution(&table.distribution());
    Ok(table)
}

fn paint_sentiment(sentiment: Sentiment) -> colored::ColoredString {
    match sentiment {
        Sentiment::Negative => sentiment.label().red(),
        Sentiment::Neutral => sentiment.label().normal(),
        Sentiment::Positive => sentiment.label().green(),
    }
}

fn bar(percentage: f64) -> String {
    "█".repeat((percentage / 2.5).round() as usize)
}

fn print_distribution(distribution: &Distribution) {
    if distribution.total == 0 {
        println!("\nNo observations.");
        return;
    }

    println!("\n{}", "Themes".bold());
    for share in &distribution.themes {
        println!(
            "  {:<28} {:>4}  {:>5.1}%  {}",
            share.label.label(),
            share.count,
            share.percentage,
            bar(share.percentage).cyan()
        );
    }

    println!("\n{}", "Sentiment".bold());
    for share in &distribution.sentiments {
        println!(
            "  {:<28} {:>4}  {:>5.1}%",
            paint_sentiment(share.label),
            share.count,
            share.percentage
        );
    }
    println!();
}

fn print_clusters(clusters: &[ClusterSummary], total: usize) {
    if clusters.is_empty() {
        println!("No observations.");
        return;
    }

    println!("{} observations in {} clusters\n", total, clusters.len());
    for cluster in clusters {
        println!(
            "{} {} ({:.1}%)",
            cluster.theme.label().cyan().bold(),
            cluster.observation_count,
            cluster.percentage
        );
        println!(
            "   {} negative, {} neutral, {} positive",
            cluster.sentiment_negative.to_string().red(),
            cluster.sentiment_neutral,
            cluster.sentiment_positive.to_string().green()
        );
        for quote in &cluster.sample_quotes {
            println!("   \"{}\"", quote);
        }
        println!();
    }
}

fn print_personas(personas: &[PersonaProfile]) {
    for profile in personas {
        println!(
            "\n{} ({} interviews, {} observations)",
            profile.persona.name().cyan().bold(),
            profile.interviews.len(),
            profile.observation_count
        );
        println!("   {}", profile.tagline);
        for pain in &profile.pain_points {
            println!("   {:<28} {}", pain.theme.label(), pain.mentions);
        }
    }
}

fn print_insights(synthesis: &SynthesisReport) {
    if synthesis.key_insights.is_empty() {
        return;
    }
    println!("{}", "Key insights".bold());
    for insight in &synthesis.key_insights {
        println!("  {} {} [{}]", insight.insight_id, insight.title, insight.priority);
    }
}
