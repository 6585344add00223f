//! kwgroup CLI
//!
//! Groups analyzed search keywords into clusters of phrase variations

mod config;
mod progress;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use kwgroup_core::{
    flatten_groups, mock_results, AnalysisSummary, Error as CoreError, GroupingStats,
    KeywordProcessor, Pipeline, ProcessOutput, VariationClassifier,
};
use kwgroup_filters::{NormalizerConfig, PhraseNormalizer};
use kwgroup_formats::{
    export_groups, export_records, load_keyword_list, load_keywords_with, load_metadata_with,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::RunConfig;
use progress::ProgressReporter;

#[derive(Parser)]
#[command(name = "kwgroup")]
#[command(version, about = "Group search keywords into phrase variations", long_about = None)]
#[command(author = "kwgroup")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output results in JSON format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Group analyzed keywords into parent/variation clusters
    Group {
        /// Analyzed keywords (JSONL, JSON, TXT; optionally .gz)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Keyword export with search volumes to enrich from
        #[arg(short, long)]
        meta: Option<PathBuf>,

        /// Grouped JSONL output
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Flat export, TSV when the name ends in .tsv, JSONL otherwise
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Run config file (YAML or TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the effective run config to this file (YAML or TOML)
        #[arg(long)]
        save_config: Option<PathBuf>,

        /// Also map teeth→tooth, mice→mouse, feet→foot, geese→goose
        #[arg(long)]
        extended_irregulars: bool,
    },

    /// Print the canonical comparison key of each phrase
    Normalize {
        /// Phrases to normalize
        #[arg(required = true)]
        phrases: Vec<String>,

        /// Also map irregular plurals such as teeth and mice
        #[arg(long)]
        extended_irregulars: bool,
    },

    /// Check whether two keywords are variations of the same phrase
    Compare {
        a: String,
        b: String,

        /// Also map irregular plurals such as teeth and mice
        #[arg(long)]
        extended_irregulars: bool,
    },

    /// Generate placeholder analysis results for a keyword list
    Mock {
        /// Keyword list (TXT, JSONL or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output records (JSONL or TSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(!cli.json) // Disable colors if JSON output
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Group {
            input,
            meta,
            output,
            export,
            config,
            save_config,
            extended_irregulars,
        } => {
            let mut run = match config {
                Some(path) => RunConfig::load(&path)?,
                None => RunConfig::default(),
            };
            // Flags win over the config file
            run.input = input.or(run.input);
            run.meta = meta.or(run.meta);
            run.output = output.or(run.output);
            run.export = export.or(run.export);
            run.normalizer.extended_irregulars |= extended_irregulars;

            if let Some(path) = save_config {
                run.save(&path)?;
                info!("Saved run config to {:?}", path);
            }

            group_keywords(run, cli.json).await?;
        }
        Commands::Normalize {
            phrases,
            extended_irregulars,
        } => {
            normalize_phrases(&phrases, extended_irregulars, cli.json)?;
        }
        Commands::Compare {
            a,
            b,
            extended_irregulars,
        } => {
            compare_keywords(&a, &b, extended_irregulars, cli.json)?;
        }
        Commands::Mock {
            input,
            output,
            seed,
        } => {
            mock_analysis(&input, &output, seed, cli.json)?;
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

async fn group_keywords(run: RunConfig, json_output: bool) -> Result<()> {
    let input = run
        .input
        .clone()
        .context("No input file given; use --input or set `input` in the config file")?;

    info!("Starting keyword grouping");
    info!("  Input: {:?}", input);
    if let Some(meta) = &run.meta {
        info!("  Metadata: {:?}", meta);
    }
    info!("  Extended irregulars: {}", run.normalizer.extended_irregulars);

    let start = Instant::now();
    let bar = progress::read_bar(json_output, "Reading keywords");
    let keywords = load_keywords_with(&input, |p| progress::update_read(&bar, p))
        .with_context(|| format!("Failed to read keywords from {}", input.display()))?;
    bar.finish_and_clear();

    let keyword_meta = match &run.meta {
        Some(path) => {
            let bar = progress::read_bar(json_output, "Reading metadata");
            let meta = load_metadata_with(path, |p| progress::update_read(&bar, p))
                .with_context(|| format!("Failed to read metadata from {}", path.display()))?;
            bar.finish_and_clear();
            Some(meta)
        }
        None => None,
    };
    info!("Loaded {} keywords", keywords.len());
    if keywords.is_empty() {
        warn!("Input contains no keywords");
    }

    let pipeline = Pipeline::new(run.pipeline_config())?;
    let mut processor = KeywordProcessor::spawn(pipeline)?;
    let canceller = processor.canceller()?;
    let fallback = keywords.clone();
    processor.submit(keywords, keyword_meta)?;

    // Ctrl-C cancels the request in flight; the worker answers with CANCELLED
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            let _ = canceller.cancel();
        }
    });

    let reporter = ProgressReporter::new(json_output);
    let bar = reporter.handle();
    let (processor, outcome) = tokio::task::spawn_blocking(move || {
        let outcome =
            processor.wait(|progress, message| ProgressReporter::update(&bar, progress, message));
        (processor, outcome)
    })
    .await?;
    ctrl_c.abort();
    drop(processor);

    let output = match outcome {
        Ok(output) => {
            reporter.finish();
            output
        }
        Err(CoreError::Cancelled) => {
            reporter.abandon("Cancelled");
            bail!("Processing cancelled");
        }
        Err(CoreError::Worker(message)) => {
            reporter.abandon("Failed");
            warn!("Grouping failed ({}); writing ungrouped results", message);
            ProcessOutput::ungrouped(fallback)
        }
        Err(e) => {
            reporter.abandon("Failed");
            return Err(e.into());
        }
    };

    write_outputs(&run, &output)?;

    let stats = GroupingStats::from_groups(&output.groups);
    let summary = AnalysisSummary::from_records(output.keyword_count(), &output.results)
        .with_processing_time(start.elapsed());

    let outputs: Vec<&Path> = [run.output.as_deref(), run.export.as_deref()]
        .into_iter()
        .flatten()
        .collect();

    if json_output {
        let report = serde_json::json!({
            "input": input.to_string_lossy().to_string(),
            "outputs": outputs.iter().map(|p| p.to_string_lossy().to_string()).collect::<Vec<_>>(),
            "stats": stats,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        progress::print_summary_report(&input, &outputs, &stats, &summary);
    }

    Ok(())
}

fn write_outputs(run: &RunConfig, output: &ProcessOutput) -> Result<()> {
    if let Some(path) = &run.output {
        export_groups(path, &output.groups)
            .with_context(|| format!("Failed to write groups to {}", path.display()))?;
    }
    if let Some(path) = &run.export {
        // Ungrouped output still exports every record
        let flat = if output.groups.is_empty() {
            output.results.clone()
        } else {
            flatten_groups(&output.groups)
        };
        export_records(path, &flat)
            .with_context(|| format!("Failed to write export to {}", path.display()))?;
    }
    if run.output.is_none() && run.export.is_none() {
        info!("No --output or --export given; only the summary is printed");
    }
    Ok(())
}

fn classifier(extended_irregulars: bool) -> Result<VariationClassifier> {
    let config = NormalizerConfig {
        extended_irregulars,
        ..Default::default()
    };
    Ok(VariationClassifier::new(PhraseNormalizer::new(&config)?))
}

fn normalize_phrases(phrases: &[String], extended_irregulars: bool, json_output: bool) -> Result<()> {
    let classifier = classifier(extended_irregulars)?;
    let normalizer = classifier.normalizer();

    if json_output {
        let keys: Vec<_> = phrases
            .iter()
            .map(|phrase| serde_json::json!({ "phrase": phrase, "key": normalizer.normalize(phrase) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&keys)?);
    } else {
        for phrase in phrases {
            println!("{}\t{}", phrase, normalizer.normalize(phrase));
        }
    }
    Ok(())
}

fn compare_keywords(a: &str, b: &str, extended_irregulars: bool, json_output: bool) -> Result<()> {
    let classifier = classifier(extended_irregulars)?;
    let normalizer = classifier.normalizer();
    let (key_a, key_b) = (normalizer.normalize(a), normalizer.normalize(b));
    let similarity = classifier.similarity(a, b);
    let variations = similarity > 0.0;

    if json_output {
        let report = serde_json::json!({
            "a": { "keyword": a, "key": key_a },
            "b": { "keyword": b, "key": key_b },
            "variations": variations,
            "similarity": similarity,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{:?} -> {:?}", a, key_a);
        println!("{:?} -> {:?}", b, key_b);
        println!(
            "{}",
            if variations {
                "Variations of the same phrase"
            } else {
                "Different phrases"
            }
        );
    }
    Ok(())
}

fn mock_analysis(input: &Path, output: &Path, seed: Option<u64>, json_output: bool) -> Result<()> {
    let keywords = load_keyword_list(input)
        .with_context(|| format!("Failed to read keywords from {}", input.display()))?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let records = mock_results(&keywords, &mut rng);
    let written = export_records(output, &records)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let summary = AnalysisSummary::from_records(keywords.len(), &records);
    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Wrote {} mock records to {} (average score {:.1}/10)",
            progress::format_with_commas(written),
            output.display(),
            summary.average_score
        );
    }
    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use kwgroup_core::PipelineBuilder;

    #[test]
    fn test_cli_parses_group() {
        let cli = Cli::try_parse_from([
            "kwgroup",
            "group",
            "--input",
            "k.jsonl",
            "--export",
            "flat.tsv",
            "--extended-irregulars",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Group {
                input,
                export,
                extended_irregulars,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("k.jsonl")));
                assert_eq!(export, Some(PathBuf::from("flat.tsv")));
                assert!(extended_irregulars);
            }
            _ => panic!("expected group command"),
        }
    }

    #[test]
    fn test_cli_requires_phrases() {
        assert!(Cli::try_parse_from(["kwgroup", "normalize"]).is_err());
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[tokio::test]
    async fn test_group_end_to_end() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("keywords.txt");
        std::fs::write(&input, "dog treats\ndog treat\nthe dog treats\ncat toys\n").unwrap();
        let meta = dir.path().join("meta.jsonl");
        std::fs::write(
            &meta,
            "{\"Keyword\": \"dog treat\", \"Search Volume\": \"9,000\"}\n{\"Keyword\": \"cat toys\", \"Search Volume\": \"100\"}\n",
        )
        .unwrap();

        let run = RunConfig {
            input: Some(input),
            meta: Some(meta),
            output: Some(dir.path().join("groups.jsonl")),
            export: Some(dir.path().join("flat.tsv")),
            ..Default::default()
        };
        group_keywords(run, true).await.unwrap();

        let groups = std::fs::read_to_string(dir.path().join("groups.jsonl")).unwrap();
        let first: serde_json::Value = serde_json::from_str(groups.lines().next().unwrap()).unwrap();
        assert_eq!(first["parent"]["keyword"], "dog treat");
        assert_eq!(first["totalVariations"], 2);

        let flat = std::fs::read_to_string(dir.path().join("flat.tsv")).unwrap();
        assert_eq!(flat.lines().count(), 5);
        assert!(flat.lines().nth(1).unwrap().starts_with("dog treat\t9000\t"));
    }

    #[test]
    fn test_ungrouped_output_exports_every_record() {
        let dir = tempfile::TempDir::new().unwrap();
        let run = RunConfig {
            output: Some(dir.path().join("groups.jsonl")),
            export: Some(dir.path().join("flat.tsv")),
            ..Default::default()
        };
        let output = ProcessOutput::ungrouped(vec![
            kwgroup_core::KeywordRecord::new("dog treats").with_volume(40),
            kwgroup_core::KeywordRecord::new("cat toys"),
        ]);

        write_outputs(&run, &output).unwrap();

        let flat = std::fs::read_to_string(dir.path().join("flat.tsv")).unwrap();
        let lines: Vec<&str> = flat.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("dog treats\t40\t"));
        assert!(lines[2].starts_with("cat toys\t\t"));

        let groups = std::fs::read_to_string(dir.path().join("groups.jsonl")).unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_builder_matches_run_config() {
        let mut run = RunConfig::default();
        run.normalizer.extended_irregulars = true;
        let from_config = Pipeline::new(run.pipeline_config()).unwrap();
        let from_builder = PipelineBuilder::new().extended_irregulars(true).build().unwrap();
        assert_eq!(from_config.config(), from_builder.config());
    }
}
