use std::borrow::Cow::{self, Borrowed, Owned};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use counsel_application::{
    ArtifactDownloader, CommandPipeline, LocalFile, UploadPipeline, supported_mime_type,
};
use counsel_core::case::{AgentStatus, CaseStore, StepStatus};
use counsel_core::config::{ClientConfig, SecretConfig};
use counsel_core::notify::{Notifier, ToastKind};
use counsel_infrastructure::{ConfigStorage, SecretStorage};
use counsel_interaction::{ApproveStepRequest, CaseBackend, HttpCaseBackend};

const COMMANDS: &[&str] = &[
    "/agents",
    "/approve",
    "/attach",
    "/case",
    "/download",
    "/files",
    "/help",
    "/key",
    "/quit",
    "/remove",
    "/reset",
    "/set",
    "/settings",
    "/stop",
    "/timeline",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Bundle of the pipelines, rebuilt when the stored credential changes.
struct Pipelines {
    backend: Arc<dyn CaseBackend>,
    command: CommandPipeline,
    uploads: UploadPipeline,
    downloader: ArtifactDownloader,
}

impl Pipelines {
    fn new(config: &ClientConfig, store: Arc<CaseStore>, notifier: Notifier) -> Self {
        let backend: Arc<dyn CaseBackend> = Arc::new(HttpCaseBackend::from_config(config));
        Self {
            command: CommandPipeline::new(store.clone(), backend.clone(), config.user_id.clone()),
            uploads: UploadPipeline::new(store, backend.clone(), notifier.clone()),
            downloader: ArtifactDownloader::new(backend.clone(), notifier),
            backend,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigStorage::new()?.load()?;
    let store = Arc::new(CaseStore::new());
    let notifier = Notifier::new();
    print_toasts(&notifier);

    let mut pipelines = Pipelines::new(&config, store.clone(), notifier.clone());

    println!("{}", "Counsel - AI-powered legal case assistant".bold());
    println!("Backend: {}", config.base_url.dimmed());
    println!("Type your legal situation, or /help for commands.\n");

    let mut editor: Editor<CliHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(CliHelper::new()));

    loop {
        let line = match editor.readline("counsel> ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Readline error: {err}");
                break;
            }
        };

        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&line);

        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            let name = parts.next().unwrap_or_default();
            let args: Vec<&str> = parts.collect();

            match name {
                "quit" | "exit" => break,
                "help" => print_help(),
                "attach" => attach_files(&pipelines.uploads, &notifier, &args).await,
                "files" => list_files(&store),
                "remove" => match args.first() {
                    Some(id) => pipelines.uploads.unstage(id),
                    None => println!("Usage: /remove <file-id>"),
                },
                "settings" => print_settings(&store),
                "set" => apply_setting(&store, &args),
                "key" => match args.first() {
                    Some(key) => {
                        store_api_key(key, &notifier);
                        // Rebuild so the new credential applies immediately.
                        pipelines = Pipelines::new(&config, store.clone(), notifier.clone());
                    }
                    None => println!("Usage: /key <api-key>"),
                },
                "case" => fetch_case(&store, pipelines.backend.as_ref(), &notifier, &args).await,
                "approve" => approve_step(pipelines.backend.as_ref(), &notifier, &args).await,
                "download" => download_artifact(&store, &pipelines.downloader, &args).await,
                "agents" => print_agents(&store),
                "timeline" => print_timeline(&store),
                "stop" => pipelines.command.stop(),
                "reset" => {
                    store.reset();
                    println!("Session cleared. Settings kept.");
                }
                other => println!("Unknown command: /{other} (try /help)"),
            }
            continue;
        }

        if store.snapshot().is_running {
            println!(
                "{}",
                "Agents are already running. Wait for them to finish or /stop.".yellow()
            );
            continue;
        }

        pipelines.command.submit(&line).await;
        render_outcome(&store);
    }

    println!("Goodbye.");
    Ok(())
}

/// Prints each toast once, as it is published.
fn print_toasts(notifier: &Notifier) {
    let printed = Arc::new(Mutex::new(0u64));
    notifier.subscribe(move |toasts| {
        let mut last = printed.lock().unwrap();
        for toast in toasts {
            if toast.id <= *last {
                continue;
            }
            *last = toast.id;
            let line = match toast.kind {
                ToastKind::Success => format!("[ok] {}", toast.message).green(),
                ToastKind::Error => format!("[error] {}", toast.message).red(),
                ToastKind::Info => format!("[info] {}", toast.message).blue(),
            };
            println!("{line}");
        }
    });
}

fn print_help() {
    println!("Type any text to send it to the master agent.");
    println!();
    println!("  /attach <path>...        upload and stage files for the next run");
    println!("  /files                   list staged files");
    println!("  /remove <file-id>        unstage a file (local only)");
    println!("  /agents                  show the agent roster");
    println!("  /timeline                show the execution timeline");
    println!("  /download <n> [dir]      save artifact #n (see /timeline output)");
    println!("  /case <case-id>          fetch the backend case snapshot");
    println!("  /approve <step-id> [decision]   approve or reject a step");
    println!("  /settings                show settings");
    println!("  /set <field> <value>     change a setting (budget, thoroughness,");
    println!("                           plain_english, jurisdiction, max_depth, token_budget)");
    println!("  /key <api-key>           store the backend API key");
    println!("  /stop                    stop the current run");
    println!("  /reset                   clear the session (settings kept)");
    println!("  /quit                    exit");
}

async fn attach_files(uploads: &UploadPipeline, notifier: &Notifier, args: &[&str]) {
    if args.is_empty() {
        println!("Usage: /attach <path>...");
        return;
    }

    let mut selected = Vec::new();
    for &raw in args {
        let path = Path::new(raw);
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(raw)
            .to_string();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        if !supported_mime_type(&mime_type) {
            notifier.error(format!("Unsupported file type: {name}"));
            continue;
        }

        match std::fs::read(path) {
            Ok(bytes) => selected.push(LocalFile {
                name,
                mime_type,
                size: bytes.len() as u64,
                bytes,
            }),
            Err(err) => notifier.error(format!("Cannot read {name}: {err}")),
        }
    }

    uploads.stage_all(selected).await;
}

fn list_files(store: &CaseStore) {
    let files = store.snapshot().uploaded_files;
    if files.is_empty() {
        println!("No files staged.");
        return;
    }
    for file in files {
        println!(
            "  {}  {} ({} bytes, {})",
            file.id.bright_cyan(),
            file.name,
            file.size,
            file.mime_type.dimmed()
        );
    }
}

fn print_settings(store: &CaseStore) {
    let settings = store.snapshot().settings;
    println!("  budget        = {}", settings.budget);
    println!("  thoroughness  = {}", settings.thoroughness);
    println!("  plain_english = {}", settings.plain_english);
    println!("  jurisdiction  = {}", settings.jurisdiction);
    println!("  max_depth     = {}", settings.max_depth);
    println!("  token_budget  = {}", settings.token_budget);
}

fn apply_setting(store: &CaseStore, args: &[&str]) {
    use counsel_core::case::SettingsPatch;

    let (field, value) = match (args.first(), args.get(1)) {
        (Some(field), Some(value)) => (*field, *value),
        _ => {
            println!("Usage: /set <field> <value>");
            return;
        }
    };

    let mut patch = SettingsPatch::default();
    let parsed = match field {
        "budget" => value.parse().map(|v| patch.budget = Some(v)).is_ok(),
        "thoroughness" => value.parse().map(|v| patch.thoroughness = Some(v)).is_ok(),
        "plain_english" => value
            .parse()
            .map(|v| patch.plain_english = Some(v))
            .is_ok(),
        "jurisdiction" => {
            patch.jurisdiction = Some(value.to_string());
            true
        }
        "max_depth" => value.parse().map(|v| patch.max_depth = Some(v)).is_ok(),
        "token_budget" => value.parse().map(|v| patch.token_budget = Some(v)).is_ok(),
        _ => {
            println!("Unknown setting: {field}");
            return;
        }
    };

    if parsed {
        store.update_settings(&patch);
        println!("Set {field} = {value}");
    } else {
        println!("Invalid value for {field}: {value}");
    }
}

fn store_api_key(key: &str, notifier: &Notifier) {
    match SecretStorage::new() {
        Ok(storage) => {
            let config = SecretConfig {
                api_key: Some(key.to_string()),
            };
            match storage.store(&config) {
                Ok(()) => notifier.success("API key stored"),
                Err(err) => notifier.error(format!("Failed to store API key: {err}")),
            }
        }
        Err(err) => notifier.error(format!("Failed to resolve config path: {err}")),
    }
}

async fn fetch_case(
    store: &CaseStore,
    backend: &dyn CaseBackend,
    notifier: &Notifier,
    args: &[&str],
) {
    let Some(case_id) = args.first() else {
        println!("Usage: /case <case-id>");
        return;
    };

    match backend.fetch_case(case_id).await {
        Ok(record) => {
            println!("Case {}", record.id.bold());
            println!("{}", record.memory);
            store.set_case(Some(record));
        }
        Err(err) => notifier.error(format!("Failed to fetch case: {err}")),
    }
}

async fn approve_step(backend: &dyn CaseBackend, notifier: &Notifier, args: &[&str]) {
    let Some(step_id) = args.first() else {
        println!("Usage: /approve <step-id> [decision]");
        return;
    };
    let decision = args.get(1).copied().unwrap_or("approved");

    let request = ApproveStepRequest {
        step_id: step_id.to_string(),
        decision: decision.to_string(),
    };
    match backend.approve_step(request).await {
        Ok(response) => notifier.info(response.message),
        Err(err) => notifier.error(format!("Failed to approve step: {err}")),
    }
}

async fn download_artifact(store: &CaseStore, downloader: &ArtifactDownloader, args: &[&str]) {
    let artifacts = store.snapshot().artifacts;
    if artifacts.is_empty() {
        println!("No artifacts available.");
        return;
    }

    let Some(index) = args.first().and_then(|a| a.parse::<usize>().ok()) else {
        for (i, artifact) in artifacts.iter().enumerate() {
            println!("  {} {} ({})", i, artifact.name, artifact.kind.dimmed());
        }
        println!("Usage: /download <n> [dir]");
        return;
    };

    let Some(artifact) = artifacts.get(index) else {
        println!("No artifact #{index}.");
        return;
    };

    let dest_dir = args
        .get(1)
        .map(|dir| PathBuf::from(*dir))
        .unwrap_or_else(|| PathBuf::from("."));

    if let Some(path) = downloader.download(artifact, &dest_dir).await {
        println!("Saved to {}", path.display());
    }
}

fn print_agents(store: &CaseStore) {
    let agents = store.snapshot().agents;
    if agents.is_empty() {
        println!("No agents deployed.");
        return;
    }
    for agent in agents {
        let status = match agent.status {
            AgentStatus::Idle => "idle".dimmed(),
            AgentStatus::Running => "running".yellow(),
            AgentStatus::Completed => "completed".green(),
            AgentStatus::Error => "error".red(),
        };
        println!(
            "  {} [{}] {}% - win {}%, {} steps left",
            agent.name.bold(),
            status,
            agent.progress,
            agent.win_percentage,
            agent.steps_remaining
        );
        if !agent.last_update.is_empty() {
            println!("    {}", agent.last_update.dimmed());
        }
    }
}

fn print_timeline(store: &CaseStore) {
    let state = store.snapshot();
    if state.timeline.is_empty() {
        println!("Timeline is empty.");
        return;
    }
    for step in &state.timeline {
        let marker = match step.status {
            StepStatus::Pending => "o".dimmed(),
            StepStatus::Running => ">".yellow(),
            StepStatus::Completed => "+".green(),
            StepStatus::Blocked => "x".red(),
        };
        println!("  {} {} {}", marker, step.id.bright_cyan(), step.title);
        if !step.description.is_empty() {
            println!("      {}", step.description.dimmed());
        }
    }
    if !state.artifacts.is_empty() {
        println!("Artifacts:");
        for (i, artifact) in state.artifacts.iter().enumerate() {
            println!("  {} {} ({})", i, artifact.name, artifact.kind.dimmed());
        }
    }
}

/// Prints the result of a submission: the assistant reply plus the updated
/// roster and timeline.
fn render_outcome(store: &CaseStore) {
    let state = store.snapshot();
    if let Some(message) = state.messages.last() {
        let sender = message.agent.clone().unwrap_or_else(|| "You".to_string());
        println!("\n{}: {}\n", sender.bold(), message.content);
    }
    print_agents(store);
    print_timeline(store);
}
