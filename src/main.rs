use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use concierge::{
    assistant::{ApprovalGate, Assistant, SharedComponents, TurnReply},
    chat::render_approval,
    config::AppConfig,
    llm::OpenAiChatModel,
    logging,
    session::SessionStore,
};
use concierge_mcp::{
    ApprovalDecision, ApprovalMode, DecisionSource, SessionId, TerminalPrompter, ToolRegistry,
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "Calendar and maps assistant over MCP tool providers")]
#[command(version)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(long, env = "CONCIERGE_CONFIG", default_value = "concierge.yaml")]
    config: PathBuf,

    /// Log level, overrides the configured one
    #[arg(long, env = "CONCIERGE_LOG")]
    log_level: Option<String>,

    /// Log as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive conversation on the terminal
    Chat {
        /// Conversation key
        #[arg(long, default_value = "cli")]
        session: String,
    },

    /// List the tools offered by the configured providers
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config).await?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.log_json;
    logging::init(&config.logging);

    match cli.command {
        Commands::Chat { session } => cmd_chat(config, SessionId::new(session)).await,
        Commands::Tools => cmd_tools(config).await,
    }
}

async fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        eprintln!("⚠️  {} not found, using defaults", path.display());
        return Ok(AppConfig::default());
    }
    AppConfig::from_file(path)
        .await
        .with_context(|| format!("Failed to load {}", path.display()))
}

async fn connect(config: &AppConfig) -> Result<Arc<ToolRegistry>> {
    println!("🔄 Connecting to MCP servers...");
    let registry = Arc::new(ToolRegistry::new());
    let ready = registry.connect_all(&config.mcp.servers).await;
    if registry.tool_count() == 0 {
        anyhow::bail!(
            "No tools available ({ready} of {} providers connected)",
            config.mcp.servers.len()
        );
    }
    let names: Vec<String> = registry
        .list_tools()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    println!("✅ Connected! Tools: {}", names.join(", "));
    Ok(registry)
}

async fn cmd_tools(config: AppConfig) -> Result<()> {
    let registry = connect(&config).await?;
    let sensitive = config.approval.sensitive_set();

    for entry in registry.list_tools() {
        let lock = if sensitive.requires_approval(entry.name()) {
            "🔒"
        } else {
            "  "
        };
        println!(
            "{lock} {:<24} [{}] {}",
            entry.name(),
            entry.provider(),
            entry.descriptor.description
        );
    }

    registry.disconnect_all().await;
    Ok(())
}

async fn cmd_chat(config: AppConfig, session_id: SessionId) -> Result<()> {
    let registry = connect(&config).await?;
    let llm = Arc::new(
        OpenAiChatModel::new(&config.llm).context("Failed to set up the language model")?,
    );

    let gate = match config.approval.mode {
        ApprovalMode::Synchronous => ApprovalGate::Synchronous(Arc::new(TerminalPrompter)),
        ApprovalMode::Asynchronous => ApprovalGate::Asynchronous,
    };
    let components = SharedComponents::new(llm, registry.clone(), gate)
        .with_sensitive(config.approval.sensitive_set())
        .with_tools(config.tools.clone());
    let assistant = Assistant::new(components, SessionStore::new(config.session.clone()));

    println!("💬 Type your request ('quit' to exit)");
    loop {
        let Some(line) = read_line("\n👤 You: ").await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line.to_lowercase().as_str(), "quit" | "exit" | "q") {
            break;
        }

        let mut reply = assistant.handle_turn(&session_id, line).await;
        while let Ok(TurnReply::ApprovalRequired(request)) = &reply {
            println!("\n{}", render_approval(request));
            let answer = read_line("Approve? [Y/n]: ").await?.unwrap_or_default();
            let decision = if answer.trim().eq_ignore_ascii_case("n") {
                ApprovalDecision::cancelled()
            } else {
                ApprovalDecision::approved()
            };
            reply = assistant
                .resolve_approval(&session_id, decision, DecisionSource::Terminal)
                .await;
        }

        match reply {
            Ok(TurnReply::Reply(answer)) => println!("\n🤖 Assistant: {answer}"),
            Ok(TurnReply::Cancelled) => println!("\n❌ Operation cancelled."),
            Ok(TurnReply::ApprovalRequired(_)) => {}
            Err(e) => {
                warn!(error = %e, "Turn failed");
                println!("\n❌ Error: {e}");
            }
        }
    }

    info!("Shutting down");
    registry.disconnect_all().await;
    println!("👋 Bye!");
    Ok(())
}

/// Prompt and read one line on a blocking thread. `None` on end of input.
async fn read_line(prompt: &'static str) -> Result<Option<String>> {
    let line = tokio::task::spawn_blocking(move || -> io::Result<Option<String>> {
        let mut stdout = io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;
        let mut line = String::new();
        match io::stdin().read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    })
    .await??;
    Ok(line)
}
