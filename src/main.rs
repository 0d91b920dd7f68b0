mod commands;
mod core;

use clap::{Parser, Subcommand};

/// mnemo: project memory for AI coding agents.
/// Hooks into Claude Code's lifecycle events — no API key needed.
#[derive(Parser)]
#[command(name = "mnemo", version = env!("CARGO_PKG_VERSION"), about = "Project memory hooks for Claude Code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the context directory in the current project
    Init,

    /// Pause mnemo hooks for a session
    Pause {
        /// Session ID (overrides stdin)
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Resume mnemo hooks for a session
    Resume {
        /// Session ID (overrides stdin)
        #[arg(long)]
        session_id: Option<String>,
    },

    /// Suppress checkpoint nudges after wrap-up (called by skills, internal)
    #[command(hide = true)]
    MarkWrappedUp,

    /// Query the local hook event log
    Events {
        /// Filter by hook name
        #[arg(long, short = 'k')]
        hook: Option<String>,
        /// Filter by session ID
        #[arg(long, short = 's')]
        session: Option<String>,
        /// Filter by event type (relay, nudge, heartbeat)
        #[arg(long, short = 'e')]
        event: Option<String>,
        /// Show last N events
        #[arg(long, short = 'n', default_value = "50")]
        last: usize,
        /// Output raw JSONL (for piping to jq)
        #[arg(long, short = 'j')]
        json: bool,
        /// Include the rotated log file
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Manage hook message templates
    Message {
        #[command(subcommand)]
        action: MessageAction,
    },

    /// Manage the notification webhook
    Webhook {
        #[command(subcommand)]
        action: WebhookAction,
    },

    /// Hook commands invoked by Claude Code (internal)
    #[command(hide = true)]
    Hook {
        #[command(subcommand)]
        hook: HookCommands,
    },
}

#[derive(Subcommand)]
enum MessageAction {
    /// Show all hook messages with category and override status
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Print the effective message template for a hook/variant
    Show { hook: String, variant: String },
    /// Delete a project override and revert to the embedded default
    Reset { hook: String, variant: String },
}

#[derive(Subcommand)]
enum WebhookAction {
    /// Store the webhook URL
    Set { url: String },
    /// Remove the stored webhook URL
    Clear,
    /// Show webhook configuration
    Status,
}

#[derive(Subcommand)]
enum HookCommands {
    /// Auto-inject project context on first tool use (PreToolUse)
    ContextLoad,
    /// Context size checkpoint (UserPromptSubmit)
    CheckContextSize,
    /// Knowledge file growth nudge (UserPromptSubmit)
    CheckKnowledge,
    /// Journal export/enrich reminder (UserPromptSubmit)
    CheckJournal,
    /// Backup staleness check (UserPromptSubmit)
    CheckBackupAge,
    /// Binary/plugin version drift detection (UserPromptSubmit)
    CheckVersion,
    /// Resource pressure warning, DANGER only (UserPromptSubmit)
    CheckResources,
    /// QA reminder before commits (PreToolUse Bash)
    QaReminder,
    /// Plan-to-specs directory nudge (PreToolUse EnterPlanMode)
    SpecsNudge,
    /// Block dangerous command patterns (PreToolUse Bash)
    BlockDangerousCommands,
    /// Session heartbeat webhook, no stdout (UserPromptSubmit)
    Heartbeat,
    /// Remove stale state entries (SessionEnd)
    CleanupTmp,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            let cfg = core::config::load();
            if let Err(e) = commands::init::run(&cfg) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }

        Commands::Pause { session_id } => {
            commands::pause::run_pause(session_id);
        }

        Commands::Resume { session_id } => {
            commands::pause::run_resume(session_id);
        }

        Commands::MarkWrappedUp => {
            commands::mark_wrapped_up::run();
        }

        Commands::Events {
            hook,
            session,
            event,
            last,
            json,
            all,
        } => {
            let cfg = core::config::load();
            let args = commands::events::EventsArgs {
                hook,
                session,
                event,
                last,
                json,
                all,
            };
            if let Err(e) = commands::events::run(&cfg, &args) {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }

        Commands::Message { action } => {
            let cfg = core::config::load();
            let result = match action {
                MessageAction::List { json } => commands::message::run_list(&cfg, json),
                MessageAction::Show { hook, variant } => {
                    commands::message::run_show(&cfg, &hook, &variant)
                }
                MessageAction::Reset { hook, variant } => {
                    commands::message::run_reset(&cfg, &hook, &variant)
                }
            };
            if let Err(e) = result {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }

        Commands::Webhook { action } => {
            let cfg = core::config::load();
            match action {
                WebhookAction::Set { url } => {
                    if let Err(e) = commands::webhook::run_set(&cfg, &url) {
                        eprintln!("Error: {e}");
                        std::process::exit(1);
                    }
                }
                WebhookAction::Clear => commands::webhook::run_clear(&cfg),
                WebhookAction::Status => commands::webhook::run_status(&cfg),
            }
        }

        // Hooks never fail: every exit is a clean process exit, and the
        // only failure signal the host can observe is silence.
        Commands::Hook { hook } => match hook {
            HookCommands::ContextLoad => commands::context_load::run(),
            HookCommands::CheckContextSize => commands::check_context_size::run(),
            HookCommands::CheckKnowledge => commands::check_knowledge::run(),
            HookCommands::CheckJournal => commands::check_journal::run(),
            HookCommands::CheckBackupAge => commands::check_backup_age::run(),
            HookCommands::CheckVersion => commands::check_version::run(),
            HookCommands::CheckResources => commands::check_resources::run(),
            HookCommands::QaReminder => commands::qa_reminder::run(),
            HookCommands::SpecsNudge => commands::specs_nudge::run(),
            HookCommands::BlockDangerousCommands => commands::block_dangerous::run(),
            HookCommands::Heartbeat => commands::heartbeat::run(),
            HookCommands::CleanupTmp => commands::cleanup_tmp::run(),
        },
    }
}
