//! deckfill CLI - fill a PowerPoint template from a deck form
//!
//! Reads a JSON deck form, substitutes it into the template and writes the
//! resulting presentation.

use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use deckfill::generate::{EXPECTED_SLIDE_COUNT, DEFAULT_TEMPLATE};
use deckfill::{DeckForm, GenerateOptions, Generator, Presentation};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Fill a PowerPoint template with the contents of a deck form
#[derive(Parser)]
#[command(
    name = "deckfill",
    author = "iyulab",
    version,
    about = "Generate presentations from a slide template",
    long_about = "deckfill - Generate presentations from a slide template.\n\n\
                  Substitutes the title, agenda, content slides and summary of a JSON\n\
                  deck form into the placeholders of a 16-slide PPTX template."
)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a presentation from a deck form
    #[command(visible_alias = "gen")]
    Generate {
        /// Deck form (JSON); image paths are relative to it
        form: PathBuf,

        /// Template presentation
        #[arg(short, long, env = "DECKFILL_TEMPLATE", default_value = DEFAULT_TEMPLATE)]
        template: PathBuf,

        /// Output file path (default: derived from the title)
        #[arg(short, long, conflicts_with = "out_dir")]
        output: Option<PathBuf>,

        /// Directory for the derived file name
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Show the slides and placeholders of a template
    Inspect {
        /// Template presentation
        template: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a blank deck form
    Form {
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        match e.downcast_ref::<deckfill::Error>() {
            Some(deckfill::Error::TemplateNotFound(path)) => {
                eprintln!(
                    "{}: template {} not found. Pass --template or set DECKFILL_TEMPLATE.",
                    "Error".red().bold(),
                    path.display()
                );
            }
            _ => eprintln!("{}: {}", "Error".red().bold(), e),
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Generate {
            form,
            template,
            output,
            out_dir,
        } => {
            let pb = create_spinner("Reading form...");

            let deck_form = DeckForm::load(&form)?;
            let base_dir = form.parent().unwrap_or_else(|| Path::new("."));
            let content = deck_form.resolve(base_dir)?;

            pb.set_message("Filling template...");
            let generator = Generator::new(GenerateOptions::new().with_template(&template));
            let deck = generator.generate(&content)?;

            let path = match (output, out_dir) {
                (Some(path), _) => path,
                (None, Some(dir)) => {
                    fs::create_dir_all(&dir)?;
                    dir.join(&deck.file_name)
                }
                (None, None) => PathBuf::from(&deck.file_name),
            };
            debug!("Writing {} ({})", path.display(), deck.mime_type);
            fs::write(&path, &deck.bytes)?;

            pb.finish_and_clear();
            println!(
                "{} Generated presentation: {}",
                "✓".green().bold(),
                path.display()
            );
        }

        Commands::Inspect { template, json } => {
            let pb = create_spinner("Analyzing template...");
            let presentation = Presentation::open(&template)?;
            let summary = presentation.summary();
            pb.finish_and_clear();

            if json {
                write_output(None, &serde_json::to_string_pretty(&summary)?)?;
                return Ok(());
            }

            println!("{}", "Template Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                template.file_name().unwrap_or_default().to_string_lossy()
            );
            let count = presentation.slide_count();
            let status = if count == EXPECTED_SLIDE_COUNT {
                "✓".green().bold()
            } else {
                "!".yellow().bold()
            };
            println!(
                "{}: {} {} (expected {})",
                "Slides".bold(),
                count,
                status,
                EXPECTED_SLIDE_COUNT
            );

            for slide in &summary {
                println!();
                println!(
                    "{} {}",
                    format!("Slide {}", slide.number).as_str().cyan().bold(),
                    slide.part_name.as_str().dimmed()
                );
                if slide.placeholders.is_empty() {
                    println!("  {}: -", "Placeholders".bold());
                } else {
                    println!("  {}: {}", "Placeholders".bold(), slide.placeholders.join(" "));
                }
                for (i, b) in slide.pictures.iter().enumerate() {
                    println!(
                        "  {} {}: {}x{} at ({}, {})",
                        "Picture".bold(),
                        i + 1,
                        b.width,
                        b.height,
                        b.left,
                        b.top
                    );
                }
            }
        }

        Commands::Form { output } => {
            let json = DeckForm::blank().to_json_pretty()?;
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!("{} Wrote blank form: {}", "✓".green().bold(), path.display());
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_version() {
    println!("{} {}", "deckfill".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Fill a PowerPoint template from a deck form");
    println!();
    println!(
        "Template: {} slides (cover, agenda, 13 content slides, summary)",
        EXPECTED_SLIDE_COUNT
    );
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
