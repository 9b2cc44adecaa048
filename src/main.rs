// ABOUTME: Main entry point for the slidesmith program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use log::info;
use slidesmith::template::analyzer::{describe_as_text, export_template_schema};
use slidesmith::tools::{describe_slide, list_layouts};
use slidesmith::utils::ensure_parent_directory_exists;
use slidesmith::validation::{summarize, Severity};
use slidesmith::{Config, LayoutMatcher, Presentation, StyleGuide};
use std::fs;
use std::path::PathBuf;

/// 13.333in x 7.5in in EMUs.
const WIDESCREEN: (i64, i64) = (12_192_000, 6_858_000);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty presentation, optionally from a template
    New(NewArgs),

    /// List the layouts of a presentation or template
    Layouts(LayoutsArgs),

    /// Analyze a template's layouts, placeholders and theme
    Analyze(AnalyzeArgs),

    /// Show which layout a name would resolve to
    MatchLayout(MatchLayoutArgs),

    /// Build a presentation from markdown
    Build(BuildArgs),

    /// Export slide titles, bullets and tables as markdown
    ExportMarkdown(ExportMarkdownArgs),

    /// Check a presentation against a style guide
    Validate(ValidateArgs),

    /// Describe the slides of a presentation as JSON
    Describe(DescribeArgs),
}

#[derive(Args)]
struct NewArgs {
    /// Path to the output .pptx file
    #[arg(short, long)]
    output: PathBuf,

    /// Template (.pptx or .potx) to start from
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Use a 16:9 slide size instead of the template's
    #[arg(long)]
    widescreen: bool,
}

#[derive(Args)]
struct LayoutsArgs {
    /// Presentation or template file
    input: PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Template file
    input: PathBuf,

    /// Print the analysis as JSON
    #[arg(long)]
    json: bool,

    /// Also write the analysis to a JSON schema file
    #[arg(long)]
    schema: Option<PathBuf>,
}

#[derive(Args)]
struct MatchLayoutArgs {
    /// Presentation or template file
    input: PathBuf,

    /// Layout name to match, e.g. "title" or "two column"
    name: String,

    /// Minimum similarity for fuzzy matches
    #[arg(long)]
    threshold: Option<f64>,
}

#[derive(Args)]
struct BuildArgs {
    /// Path to the markdown file
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the output .pptx file
    #[arg(short, long)]
    output: PathBuf,

    /// Template (.pptx or .potx) to build on
    #[arg(short, long)]
    template: Option<PathBuf>,

    /// Style guide preset or JSON file to check the result against
    #[arg(long)]
    guide: Option<String>,
}

#[derive(Args)]
struct ExportMarkdownArgs {
    /// Presentation file
    input: PathBuf,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ValidateArgs {
    /// Presentation file
    input: PathBuf,

    /// Style guide preset (corporate, accessible, minimal) or JSON file
    #[arg(short, long)]
    guide: Option<String>,

    /// Print issues as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct DescribeArgs {
    /// Presentation file
    input: PathBuf,

    /// Only this slide (1-based)
    #[arg(short, long)]
    slide: Option<usize>,
}

fn resolve_guide(name: Option<&str>, config: &Config) -> anyhow::Result<StyleGuide> {
    match name {
        Some(name) => Ok(StyleGuide::resolve(name)?),
        None => Ok(config.style_guide()?.unwrap_or_else(StyleGuide::corporate)),
    }
}

/// Prints issues and returns whether any are errors.
fn report(issues: &[slidesmith::ValidationIssue], json: bool) -> anyhow::Result<bool> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "issues": issues,
                "summary": summarize(issues),
            }))?
        );
    } else if issues.is_empty() {
        println!("No style issues found");
    } else {
        for issue in issues {
            println!("{}", issue);
        }
        let summary = summarize(issues);
        println!(
            "{} issues: {} errors, {} warnings, {} info",
            summary.total, summary.error_count, summary.warning_count, summary.info_count
        );
    }
    Ok(issues.iter().any(|i| i.severity == Severity::Error))
}

fn run(command: &Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::New(args) => {
            info!("Executing new command...");
            let config = config.clone().with_template(args.template.clone());
            let mut pres = match &config.template {
                Some(path) => Presentation::from_template(path)?,
                None => Presentation::new()?,
            };
            if args.widescreen {
                pres.set_slide_size(WIDESCREEN.0, WIDESCREEN.1)?;
            }
            ensure_parent_directory_exists(&args.output)?;
            pres.save(&args.output)?;
            println!("Presentation created successfully: {:?}", args.output);
        }
        Commands::Layouts(args) => {
            let pres = Presentation::open(&args.input)?;
            let layouts = list_layouts(&pres);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&layouts)?);
            } else {
                for layout in layouts {
                    println!(
                        "{:>3}  {:<28} {:<22} {}",
                        layout.index,
                        layout.name,
                        layout.layout_type.as_str(),
                        layout.placeholders.join(", ")
                    );
                }
            }
        }
        Commands::Analyze(args) => {
            info!("Executing analyze command...");
            let analysis = slidesmith::analyze_template(&args.input)?;
            if let Some(schema) = &args.schema {
                ensure_parent_directory_exists(schema)?;
                export_template_schema(&analysis, schema)?;
                info!("Schema written to {:?}", schema);
            }
            if args.json {
                println!("{}", analysis.to_json()?);
            } else {
                print!("{}", describe_as_text(&analysis));
            }
        }
        Commands::MatchLayout(args) => {
            let pres = Presentation::open(&args.input)?;
            let threshold = args.threshold.unwrap_or(config.match_threshold);
            let config = config.clone().with_threshold(threshold)?;
            let result = LayoutMatcher::new(&pres.layout_names())
                .with_threshold(config.match_threshold)
                .match_name(&args.name);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.found() {
                return Err(anyhow!("No layout matches '{}'", args.name));
            }
        }
        Commands::Build(args) => {
            info!("Executing build command...");
            let config = config.clone().with_template(args.template.clone());
            let mut pres =
                slidesmith::build_from_markdown_file(&args.input, config.template.as_deref(), &config)?;
            ensure_parent_directory_exists(&args.output)?;
            pres.save(&args.output)?;
            println!(
                "Presentation generated successfully: {:?} ({} slides)",
                args.output,
                pres.slide_count()
            );
            if args.guide.is_some() || config.style_guide.is_some() {
                let guide = resolve_guide(args.guide.as_deref(), &config)?;
                if report(&slidesmith::validate(&pres, &guide), false)? {
                    return Err(anyhow!("Presentation violates the style guide"));
                }
            }
        }
        Commands::ExportMarkdown(args) => {
            let pres = Presentation::open(&args.input)?;
            let markdown = slidesmith::to_markdown(&pres);
            match &args.output {
                Some(path) => {
                    ensure_parent_directory_exists(path)?;
                    fs::write(path, markdown)
                        .with_context(|| format!("Failed to write output file {:?}", path))?;
                    println!("Markdown exported successfully: {:?}", path);
                }
                None => print!("{}", markdown),
            }
        }
        Commands::Validate(args) => {
            let pres = Presentation::open(&args.input)?;
            let guide = resolve_guide(args.guide.as_deref(), config)?;
            if report(&slidesmith::validate(&pres, &guide), args.json)? {
                return Err(anyhow!("Presentation violates the style guide"));
            }
        }
        Commands::Describe(args) => {
            let pres = Presentation::open(&args.input)?;
            let descriptions = match args.slide {
                Some(n) => vec![describe_slide(&pres, n)?],
                None => pres.slides().iter().map(|s| s.describe()).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&descriptions)?);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match &cli.command {
        Some(command) => Config::from_env()
            .map_err(anyhow::Error::from)
            .and_then(|config| run(command, &config)),
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
