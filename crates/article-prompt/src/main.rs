use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

use article_prompt::config::Settings;
use article_prompt::document::ArticleFetcher;
use article_prompt::models::{CannedPrompt, PromptSpec};
use article_prompt::services::{ChunkPipeline, LlmService};
use article_prompt::ui::{present_result, ConsolePresenter, PromptMenu, Presenter};
use article_prompt::utils::{logger, AppError};

#[derive(Parser, Debug)]
#[command(name = "article-prompt", version)]
#[command(about = "Run an LLM prompt against the readable content of a web page")]
struct Cli {
    /// Page to read
    url: String,

    /// Canned prompt number, as listed in the menu
    #[arg(short, long, conflicts_with = "prompt")]
    choice: Option<usize>,

    /// Custom prompt run against every chunk of the page
    #[arg(short, long)]
    prompt: Option<String>,

    /// Prompt used to merge chunk responses
    #[arg(long, requires = "prompt")]
    combination_prompt: Option<String>,

    /// Completion model, overrides the configured one
    #[arg(short, long)]
    model: Option<String>,

    /// Upper bound on chunks sent to the completion service
    #[arg(long)]
    max_chunks: Option<usize>,

    /// Settings file (defaults to config/settings.*)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logger::init_logger() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let presenter = Arc::new(ConsolePresenter::new());

    match run(cli, presenter.clone()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            presenter.error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, presenter: Arc<ConsolePresenter>) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(max_chunks) = cli.max_chunks {
        settings.chunking.max_chunks = max_chunks;
        settings.validate()?;
    }

    // Fail on a missing credential before touching the network
    let llm = Arc::new(LlmService::new(settings.completion.clone())?);
    info!("Using completion model {}", cli.model.as_deref().unwrap_or(llm.default_model()));

    let fetcher = ArticleFetcher::new(&settings.fetch)?;
    let article = fetcher.fetch(&cli.url).await?;

    if !article.title.is_empty() {
        presenter.info(&article.title);
    }

    let spec = select_prompt(&cli)?;

    let pipeline = ChunkPipeline::new(llm, presenter.clone(), &settings.chunking)
        .with_model(cli.model.clone());
    let answer = pipeline.run(&article.text_content, &spec).await?;

    present_result(presenter.as_ref(), &article.title, &answer);

    Ok(())
}

fn select_prompt(cli: &Cli) -> Result<PromptSpec, AppError> {
    if let Some(choice) = cli.choice {
        return CannedPrompt::by_choice(choice)
            .map(CannedPrompt::to_spec)
            .ok_or_else(|| AppError::InvalidInput(format!("no canned prompt numbered {}", choice)));
    }

    if let Some(prompt) = cli.prompt.as_deref() {
        if prompt.trim().is_empty() {
            return Err(AppError::InvalidInput("prompt must not be blank".to_string()));
        }
        return Ok(PromptSpec::from_prompt(prompt.trim(), cli.combination_prompt.clone()));
    }

    let stdin = std::io::stdin();
    PromptMenu::new(stdin.lock(), std::io::stdout()).select()
}
