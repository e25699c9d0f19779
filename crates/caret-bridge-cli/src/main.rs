use std::path::{Path, PathBuf};

use caret_bridge_host::{HostCall, HostConfig, PageTemplate};
use miette::{IntoDiagnostic, Result};

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about = "caret-bridge - host page and script call generator", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the host page wrapping some editable content
    Page {
        /// HTML file to place in the editable container
        #[arg(long)]
        content: Option<PathBuf>,

        /// Path to a KDL host config
        #[arg(long, env = "CARET_BRIDGE_CONFIG")]
        config: Option<PathBuf>,

        /// Minimum container height in px, overriding the config
        #[arg(long)]
        min_height: Option<u32>,
    },
    /// Print the `javascript:` URL for a call into the page
    Call {
        #[command(subcommand)]
        call: CallCommand,
    },
}

#[derive(Subcommand)]
enum CallCommand {
    /// Ask the page for its content
    GetContent,
    /// Replace the user's selection with an HTML fragment
    Insert {
        html: String,
    },
    /// Move the caret to the start of an element
    Caret {
        element_id: String,
    },
}

impl From<CallCommand> for HostCall {
    fn from(call: CallCommand) -> Self {
        match call {
            CallCommand::GetContent => HostCall::GetContent,
            CallCommand::Insert { html } => HostCall::InsertContent(html),
            CallCommand::Caret { element_id } => HostCall::SetCaretToElement(element_id),
        }
    }
}

fn main() -> Result<()> {
    init_miette();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Page {
            content,
            config,
            min_height,
        } => {
            let config = load_config(config.as_deref())?;
            let content = match content {
                Some(path) => std::fs::read_to_string(&path)
                    .into_diagnostic()
                    .map_err(|e| e.wrap_err(format!("reading {}", path.display())))?,
                None => String::new(),
            };

            let mut page = PageTemplate::new(&config);
            if let Some(px) = min_height {
                page = page.with_min_height_px(px);
            }
            println!("{}", page.render(&content));
        }
        Commands::Call { call } => {
            println!("{}", HostCall::from(call).to_url());
        }
    }

    Ok(())
}

/// Explicit path, then the user config dir, then defaults.
fn load_config(path: Option<&Path>) -> Result<HostConfig> {
    if let Some(path) = path {
        return Ok(HostConfig::load(path)?);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            tracing::debug!("Using config at {}", path.display());
            Ok(HostConfig::load(path)?)
        }
        _ => Ok(HostConfig::default()),
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("caret-bridge").join("config.kdl"))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
