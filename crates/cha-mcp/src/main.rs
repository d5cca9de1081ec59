//! Cha MCP server and client: entry point.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use cha_mcp::client::{McpClient, ServerProcess};
use cha_mcp::config::{load_catalog, resolve_server_command};
use cha_mcp::protocol::ProtocolHandler;
use cha_mcp::repl::{parse_tool_arguments, render_text};
use cha_mcp::transport::StdioTransport;
use cha_mcp::types::{Implementation, InitializeResult};

#[derive(Parser)]
#[command(
    name = "cha-mcp",
    about = "MCP server and client for a Chinese tea catalog",
    version
)]
struct Cli {
    /// Path to a catalog JSON file (default: the built-in catalog).
    #[arg(short, long, global = true)]
    catalog: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Validate a catalog file.
    Validate,

    /// Print server capabilities as JSON.
    Info,

    /// Call a tool on a spawned server and print the result.
    ///
    /// Examples:
    ///   cha-mcp call getTeasByType type=Oolong
    ///   cha-mcp call getTeasByRegion '{"region": "Fujian"}'
    Call {
        /// Tool name.
        tool: String,

        /// Arguments as key=value pairs or a single JSON object.
        args: Vec<String>,

        /// Server command line (default: this executable with `serve`).
        #[arg(long)]
        server: Option<String>,
    },

    /// Read a resource from a spawned server and print it.
    Read {
        /// Resource URI, e.g. tea://teas.
        uri: String,

        /// Server command line (default: this executable with `serve`).
        #[arg(long)]
        server: Option<String>,
    },

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   cha-mcp completions bash > ~/.local/share/bash-completion/completions/cha-mcp
    ///   cha-mcp completions zsh > ~/.zfunc/_cha-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },

    /// Launch interactive REPL mode against a spawned server.
    Repl {
        /// Server command line (default: this executable with `serve`).
        #[arg(long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let handler = ProtocolHandler::for_catalog(catalog)?;
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        Commands::Validate => match load_catalog(cli.catalog.as_deref()) {
            Ok(catalog) => {
                println!("Valid catalog");
                println!("  Teas:    {}", catalog.count());
                println!("  Types:   {}", catalog.types().join(", "));
                println!("  Regions: {}", catalog.regions().join(", "));
            }
            Err(e) => {
                eprintln!("Invalid catalog: {e}");
                std::process::exit(1);
            }
        },

        Commands::Info => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let handler = ProtocolHandler::for_catalog(catalog)?;
            let capabilities = InitializeResult::default_result();
            let tools = handler.tools().list_tools();
            let resources = handler.resources().list_resources();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
                "resource_count": resources.len(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Call { tool, args, server } => {
            let arguments = parse_tool_arguments(&args.join(" "))?;
            let (process, client) = connect(server.as_deref()).await?;
            let result = client.call_tool(&tool, arguments).await;
            process.shutdown().await?;
            for content in &result?.content {
                println!("{}", render_text(content.text()));
            }
        }

        Commands::Read { uri, server } => {
            let (process, client) = connect(server.as_deref()).await?;
            let result = client.read_resource(&uri).await;
            process.shutdown().await?;
            for content in &result?.contents {
                println!("{}", render_text(content.text.as_deref().unwrap_or("")));
            }
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "cha-mcp", &mut std::io::stdout());
        }

        Commands::Repl { server } => {
            let (process, client) = connect(server.as_deref()).await?;
            let handle = tokio::runtime::Handle::current();
            tokio::task::block_in_place(|| cha_mcp::repl::run(&client, &handle))?;
            process.shutdown().await?;
        }
    }

    Ok(())
}

/// Spawn the configured server and complete the handshake.
async fn connect(server: Option<&str>) -> anyhow::Result<(ServerProcess, McpClient)> {
    let command = resolve_server_command(server)?;
    let (process, client) = ServerProcess::spawn(&command)?;
    client.initialize(Implementation::client()).await?;
    Ok((process, client))
}
