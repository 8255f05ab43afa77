use application::rag_service::RagService;
use clap::Parser;
use colored::Colorize;
use domain::models::Answer;
use infrastructure::config::Config;
use shared::confirmation::ask_confirmation;
use shared::telemetry::Telemetry;
use shared::types::Result;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "report-analyzer")]
#[command(about = "Ask questions about a company annual report with RAG-backed accuracy")]
pub struct Cli {
    /// Annual report(s) to ingest into a fresh index
    #[arg(long = "pdf", value_name = "PATH")]
    pub pdf: Vec<PathBuf>,

    /// Load the previously persisted index instead of ingesting
    #[arg(long)]
    pub load_existing: bool,

    /// Ask a single question non-interactively
    #[arg(long, value_name = "QUESTION")]
    pub question: Option<String>,

    /// Enter an interactive question loop
    #[arg(long)]
    pub interactive: bool,

    /// Launch the web interface
    #[arg(long)]
    pub serve: bool,

    /// Port for the web interface
    #[arg(long, default_value = "3000")]
    pub port: u16,
}

pub struct CliApp {
    service: RagService,
}

const RULER: &str =
    "================================================================================";
const THIN_RULER: &str =
    "--------------------------------------------------------------------------------";

impl CliApp {
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self {
            service: RagService::from_config(config),
        })
    }

    pub async fn run(mut self, cli: Cli) -> Result<()> {
        if !cli.pdf.is_empty() {
            self.handle_ingest(&cli.pdf).await?;
        } else if cli.load_existing {
            self.handle_load()?;
        } else {
            println!(
                "{}",
                "Provide --pdf <PATH> to build an index or --load-existing to reuse one."
                    .yellow()
            );
            return Ok(());
        }

        if let Some(question) = &cli.question {
            self.handle_question(question).await
        } else if cli.interactive {
            self.handle_interactive().await
        } else if cli.serve {
            crate::web::serve(self.service, cli.port).await
        } else {
            println!(
                "Use --question 'your question', --interactive, or --serve for the web UI."
            );
            Ok(())
        }
    }

    async fn handle_ingest(&mut self, paths: &[PathBuf]) -> Result<()> {
        if self.service.has_persisted_index() {
            let prompt = format!(
                "An index already exists at {}. Overwrite it?",
                self.service.index_location().display()
            );
            if !ask_confirmation(&prompt, false)? {
                println!("{}", "Keeping the existing index.".yellow());
                return self.handle_load();
            }
        }

        println!("Building index for {} document(s)...", paths.len());
        let telemetry = Telemetry::new();
        let report = self.service.load_and_index(paths).await?;

        for (path, reason) in &report.failures {
            println!(
                "{}",
                format!("Skipped {}: {}", path.display(), reason).red()
            );
        }
        println!(
            "{}",
            format!(
                "Indexed {} passages from {} document(s) in {:.1}s",
                report.passages_indexed,
                report.sources_indexed,
                telemetry.elapsed().as_secs_f32()
            )
            .green()
        );
        Ok(())
    }

    fn handle_load(&mut self) -> Result<()> {
        let count = self.service.load_existing_index()?;
        println!(
            "{}",
            format!(
                "Loaded existing index ({} passages) from {}",
                count,
                self.service.index_location().display()
            )
            .green()
        );
        Ok(())
    }

    async fn handle_question(&self, question: &str) -> Result<()> {
        let answer = self.service.ask(question).await?;
        println!("\n{RULER}");
        println!("Question: {}", answer.question);
        println!("{RULER}");
        println!("\nAnswer:\n{}\n", answer.text);
        self.print_validation(&answer);
        println!("{RULER}");
        println!("\nSource Documents:");
        for (i, source) in answer.sources.iter().enumerate() {
            let preview: String = source.text.chars().take(200).collect();
            println!(
                "\n[Source {}] {} page {}:",
                i + 1,
                source.source_id,
                source.page
            );
            println!("{preview}...");
        }
        Ok(())
    }

    async fn handle_interactive(&self) -> Result<()> {
        use dialoguer::{theme::ColorfulTheme, Input};
        println!("\n{RULER}");
        println!("Interactive Annual Report Analyzer");
        println!("{RULER}");
        println!("Ask questions about the annual report. Type 'quit' or 'exit' to leave.\n");

        loop {
            let input: String = Input::with_theme(&ColorfulTheme::default())
                .with_prompt("Your question")
                .interact_text()?;
            let question = input.trim();
            if question.is_empty() {
                continue;
            }
            if matches!(question.to_lowercase().as_str(), "quit" | "exit" | "q") {
                println!("Goodbye!");
                break;
            }
            match self.service.ask(question).await {
                Ok(answer) => {
                    println!("\n{THIN_RULER}");
                    println!("Answer:\n{}", answer.text);
                    self.print_validation(&answer);
                    println!("{THIN_RULER}\n");
                }
                Err(e) => println!("{}", format!("Error: {e}").red()),
            }
        }
        Ok(())
    }

    fn print_validation(&self, answer: &Answer) {
        if !self.service.is_answer_supported(answer) {
            println!(
                "{}",
                "Warning: the answer contains figures that were not found verbatim in the retrieved context."
                    .yellow()
            );
        }
    }
}
