//! Interactive REPL client for a cha MCP server.
//!
//! Launch with `cha-mcp repl` to spawn a server and browse it interactively.
//! Type `/help` for available commands, Tab for completion.

use anyhow::{bail, Context as _};
use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};
use serde_json::{Map, Value};
use tokio::runtime::Handle;

use crate::client::McpClient;
use crate::types::{ResourceDefinition, ToolDefinition};

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/info", "Show the connected server and its capabilities"),
    ("/tools", "List tools"),
    ("/resources", "List resources"),
    ("/call", "Call a tool: /call <name> key=value ... or a JSON object"),
    ("/read", "Read a resource: /read <uri>"),
    ("/ping", "Check the server is alive"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// Parse tool arguments from `key=value` pairs or a single JSON object.
pub fn parse_tool_arguments(input: &str) -> anyhow::Result<Map<String, Value>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Map::new());
    }

    if input.starts_with('{') {
        let value: Value = serde_json::from_str(input).context("arguments are not valid JSON")?;
        return match value {
            Value::Object(map) => Ok(map),
            _ => bail!("arguments must be a JSON object"),
        };
    }

    let mut map = Map::new();
    for pair in input.split_whitespace() {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected key=value, got '{pair}'");
        };
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
    Ok(map)
}

/// Pretty-print text that holds JSON; anything else verbatim.
pub fn render_text(text: &str) -> String {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}

/// REPL helper for tab completion.
struct ChaHelper {
    tool_names: Vec<String>,
    resource_uris: Vec<String>,
}

impl Completer for ChaHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<16} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
        let candidates = match cmd {
            "/call" => &self.tool_names,
            "/read" => &self.resource_uris,
            _ => return Ok((pos, Vec::new())),
        };

        if args.contains(' ') {
            return Ok((pos, Vec::new()));
        }

        let prefix_start = input.len() - args.len();
        let matches: Vec<Pair> = candidates
            .iter()
            .filter(|c| c.starts_with(args))
            .map(|c| Pair {
                display: c.clone(),
                replacement: format!("{c} "),
            })
            .collect();
        Ok((prefix_start, matches))
    }
}

impl Hinter for ChaHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for ChaHelper {}
impl Validator for ChaHelper {}
impl Helper for ChaHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// What the REPL knows about the server.
struct ReplState<'a> {
    client: &'a McpClient,
    handle: &'a Handle,
    tools: Vec<ToolDefinition>,
    resources: Vec<ResourceDefinition>,
}

/// Run the interactive REPL against an initialized client.
///
/// Blocks the current thread; async calls are driven through `handle`, so
/// call it from outside the runtime or inside `block_in_place`.
pub fn run(client: &McpClient, handle: &Handle) -> anyhow::Result<()> {
    let session = client
        .session()
        .context("client must be initialized before starting the REPL")?;
    let tools = handle.block_on(client.list_tools())?;
    let resources = handle.block_on(client.list_resources())?;

    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m Connected to \x1b[1m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        session.server_info.name, session.server_info.version
    );
    eprintln!();
    eprintln!(
        "    Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<ChaHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ChaHelper {
        tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        resource_uris: resources.iter().map(|r| r.uri.clone()).collect(),
    }));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    let hist_path = std::path::PathBuf::from(&home).join(".cha_mcp_history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let state = ReplState {
        client,
        handle,
        tools,
        resources,
    };
    let prompt = " \x1b[36m茶>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let input = line.strip_prefix('/').unwrap_or(line);
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let (cmd, args) = input.split_once(' ').unwrap_or((input, ""));
                let args = args.trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "info" => cmd_info(&state),
                    "tools" => cmd_tools(&state),
                    "resources" => cmd_resources(&state),
                    "call" => cmd_call(args, &state),
                    "read" => cmd_read(args, &state),
                    "ping" => cmd_ping(&state),
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(&hist_path);

    Ok(())
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<18} {desc}");
    }
    eprintln!();
    eprintln!("  Tip: Tab completes tool names after /call and URIs after /read.");
    eprintln!();
}

fn cmd_info(state: &ReplState<'_>) {
    let Some(session) = state.client.session() else {
        return;
    };
    eprintln!();
    eprintln!(
        "  Server:    {} v{}",
        session.server_info.name, session.server_info.version
    );
    eprintln!("  Protocol:  {}", session.protocol_version);
    eprintln!("  Tools:     {}", state.tools.len());
    eprintln!("  Resources: {}", state.resources.len());
    eprintln!();
}

fn cmd_tools(state: &ReplState<'_>) {
    eprintln!();
    eprintln!("  {} tools available:", state.tools.len());
    eprintln!();
    for tool in &state.tools {
        eprintln!(
            "    {:<20} {}",
            tool.name,
            tool.description.as_deref().unwrap_or("")
        );
    }
    eprintln!();
}

fn cmd_resources(state: &ReplState<'_>) {
    eprintln!();
    eprintln!("  {} resources available:", state.resources.len());
    eprintln!();
    for resource in &state.resources {
        eprintln!("    {:<28} {}", resource.uri, resource.name);
    }
    eprintln!();
}

fn cmd_call(args: &str, state: &ReplState<'_>) {
    let (name, rest) = args.split_once(' ').unwrap_or((args, ""));
    if name.is_empty() {
        eprintln!("  Usage: /call <tool> key=value ...");
        return;
    }

    let arguments = match parse_tool_arguments(rest) {
        Ok(arguments) => arguments,
        Err(e) => {
            eprintln!("  {e}");
            return;
        }
    };

    match state.handle.block_on(state.client.call_tool(name, arguments)) {
        Ok(result) => {
            for content in &result.content {
                println!("\n{}\n", render_text(content.text()));
            }
        }
        Err(e) => eprintln!("  Call failed: {e}"),
    }
}

fn cmd_read(args: &str, state: &ReplState<'_>) {
    if args.is_empty() {
        eprintln!("  Usage: /read <uri>");
        return;
    }

    match state.handle.block_on(state.client.read_resource(args)) {
        Ok(result) => {
            for content in &result.contents {
                println!("\n{}\n", render_text(content.text.as_deref().unwrap_or("")));
            }
        }
        Err(e) => eprintln!("  Read failed: {e}"),
    }
}

fn cmd_ping(state: &ReplState<'_>) {
    let started = std::time::Instant::now();
    match state.handle.block_on(state.client.ping()) {
        Ok(()) => eprintln!("  pong ({} ms)", started.elapsed().as_millis()),
        Err(e) => eprintln!("  Ping failed: {e}"),
    }
}
