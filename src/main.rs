use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use slidewright::{serve_stdio, serve_tcp, DesignConfig, DesignSystem, Generator, ServerState, SlideRouter};
use std::{
    io,
    path::{Path, PathBuf},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate styled PowerPoint presentations, or serve the tools to build them over MCP.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// The address to listen on.
    #[clap(long, env = "SLIDEWRIGHT_HOST", default_value = "127.0.0.1")]
    host: String,

    /// The port to listen on.
    #[clap(long, env = "SLIDEWRIGHT_PORT", default_value_t = 8000)]
    port: u16,

    /// Serve over stdin/stdout rather than TCP.
    #[clap(long)]
    stdio: bool,

    /// The path to the design system file.
    #[clap(short, long, env = "SLIDEWRIGHT_DESIGN")]
    design: Option<PathBuf>,

    /// The theme to generate presentations with.
    #[clap(short, long)]
    theme: Option<String>,

    /// The directory presentations are written to when no explicit path is given.
    #[clap(long, env = "SLIDEWRIGHT_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Generate a presentation out of this content file and exit.
    #[clap(short, long)]
    content: Option<PathBuf>,

    /// Where to write the generated presentation.
    #[clap(short, long, requires = "content")]
    output: Option<PathBuf>,

    /// Generate a JSON schema for the design system file.
    #[clap(long)]
    generate_config_file_schema: bool,

    /// List all available themes.
    #[clap(long)]
    list_themes: bool,
}

fn init_tracing() {
    // stdout carries the protocol when serving over stdio.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_design(path: Option<&Path>) -> anyhow::Result<DesignSystem> {
    match path {
        Some(path) => DesignSystem::load(path).with_context(|| format!("loading design from {}", path.display())),
        None => Ok(DesignSystem::default()),
    }
}

fn validate_theme(design: &DesignSystem, theme: Option<&str>) {
    let Some(theme) = theme else {
        return;
    };
    if design.resolver().with_theme(theme).is_err() {
        let valid_themes = design.themes().theme_names().join(", ");
        let error_message = format!("invalid theme name, valid themes are: {valid_themes}");
        Cli::command().error(ErrorKind::InvalidValue, error_message).exit();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.generate_config_file_schema {
        let schema = schemars::schema_for!(DesignConfig);
        serde_json::to_writer_pretty(io::stdout(), &schema).context("failed to write schema")?;
        return Ok(());
    }
    init_tracing();

    let design = load_design(cli.design.as_deref())?;
    if cli.list_themes {
        for name in design.themes().theme_names() {
            println!("{name}");
        }
        return Ok(());
    }
    validate_theme(&design, cli.theme.as_deref());

    if let Some(content) = &cli.content {
        let generator = Generator::new(&design, &cli.output_dir).with_theme(cli.theme.clone());
        let path = generator
            .generate(content, cli.output.as_deref())
            .with_context(|| format!("generating presentation from {}", content.display()))?;
        println!("{}", path.display());
        return Ok(());
    }

    info!(version = env!("CARGO_PKG_VERSION"), output_dir = %cli.output_dir.display(), "starting server");
    let router = SlideRouter::new(ServerState::new(design, cli.output_dir));
    if cli.stdio { serve_stdio(router).await } else { serve_tcp(router, &cli.host, cli.port).await }
}
