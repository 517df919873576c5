// SPDX-License-Identifier: MIT

use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::sync::Arc;

use scholar_flow::config::RunConfig;
use scholar_flow::error::ScholarError;
use scholar_flow::llm::{gemini::GeminiClient, openai::OpenAiClient, LlmClient};
use scholar_flow::memory::{InMemoryVectorIndex, MemoryStore, OpenAiEmbedder};
use scholar_flow::prompts::PromptManager;
use scholar_flow::tools::ArxivTool;
use scholar_flow::workflow::{FileCheckpointer, ResearchWorkflow, RunRequest};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a literature review from a config file
    Run {
        /// Path to the run config
        #[arg(short, long, default_value = "config/config.yaml")]
        config: String,

        /// Override the research question
        #[arg(short, long)]
        question: Option<String>,

        /// Override the thread id (resume or start a session)
        #[arg(short, long)]
        thread: Option<String>,
    },
    /// Serve the workflow over HTTP
    Serve {
        /// Path to the run config (model and template settings)
        #[arg(short, long, default_value = "config/config.yaml")]
        config: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

/// Pick the provider from the model name: gpt* goes to OpenAI, gemini* to
/// Gemini, anything else is unsupported.
fn client_for_model(model_name: &str) -> Result<Arc<dyn LlmClient>, ScholarError> {
    if model_name.contains("gpt") {
        Ok(Arc::new(OpenAiClient::new(model_name.to_string())?))
    } else if model_name.contains("gemini") {
        Ok(Arc::new(GeminiClient::new(model_name.to_string())?))
    } else {
        Err(ScholarError::config(format!(
            "Unsupported model name: {}. Supported models are 'gpt' and 'gemini'.",
            model_name
        )))
    }
}

fn build_workflow(config: &RunConfig) -> anyhow::Result<ResearchWorkflow> {
    let llm = client_for_model(&config.model_name)?;
    let prompts = Arc::new(
        PromptManager::from_dir(&config.template_dir)
            .with_context(|| format!("loading templates from {}", config.template_dir))?,
    );
    let embedder = Arc::new(OpenAiEmbedder::new(config.embedding_model.clone())?);
    let index = Arc::new(InMemoryVectorIndex::new(embedder.clone()));
    let memory = Arc::new(MemoryStore::new(embedder));
    let checkpointer = Arc::new(FileCheckpointer::new(&config.checkpoint_dir));

    Ok(ResearchWorkflow::standard(
        llm,
        prompts,
        Arc::new(ArxivTool::default()),
        index,
        checkpointer,
    )
    .with_memory(memory))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Run {
            config,
            question,
            thread,
        } => {
            let mut config = RunConfig::load(&config)?;
            if let Some(question) = question {
                config.research_question = question;
            }
            if let Some(thread) = thread {
                config.thread_id = thread;
            }

            log::info!(
                "Starting review '{}' with model {}",
                config.thread_id,
                config.model_name
            );

            let workflow = build_workflow(&config)?;
            let request = RunRequest {
                thread_id: config.thread_id.clone(),
                topic: config.topic.clone(),
                research_question: config.research_question.clone(),
                inclusion_criteria: config.inclusion_criteria.clone(),
                exclusion_criteria: config.exclusion_criteria.clone(),
            };

            let state = workflow.invoke(&request).await?;

            println!("== Progress ==");
            for line in &state.progress_log {
                println!("- {}", line);
            }
            println!("\n== Synthesis ==");
            println!("{}", state.artifact_str("synthesis"));
        }
        Commands::Serve { config, port } => {
            let config = RunConfig::load(&config)?;
            let workflow = Arc::new(build_workflow(&config)?);
            scholar_flow::server::serve(workflow, port).await?;
        }
    }

    Ok(())
}
