#![forbid(unsafe_code)]

mod cmd;
mod output;
mod tui;

use anyhow::Context as _;
use clap::{Args, CommandFactory, Parser, Subcommand};
use output::OutputMode;
use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use ticketbox_core::config::{DATA_DIR_ENV, load_user_config, resolve_data_dir};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, fmt::writer::BoxMakeWriter, prelude::*};

const LOG_ENV: &str = "TICKETBOX_LOG";
const LOG_FORMAT_ENV: &str = "TICKETBOX_LOG_FORMAT";
const LOG_FILE_ENV: &str = "TICKETBOX_LOG_FILE";

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ticketbox: a local ticket tracker",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty, text, or json.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Emit JSON output (same as --format json).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Directory holding the ticket data (overrides TICKETBOX_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Tickets",
        about = "Add a ticket",
        long_about = "Create a ticket in the new state and store it.",
        after_help = "EXAMPLES:\n    # Add a ticket\n    tb add \"Fix bug\"\n\n    # Add a ticket with text\n    tb add \"Fix bug\" --text \"Steps to reproduce\"\n\n    # Emit machine-readable output\n    tb add \"Fix bug\" --format json"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Read",
        about = "List tickets",
        long_about = "List tickets in natural (uid) order or sorted by a column.",
        after_help = "EXAMPLES:\n    # List tickets\n    tb list\n\n    # Sort by subject, descending\n    tb list --sort subject --desc\n\n    # Emit machine-readable output\n    tb list --format json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one ticket",
        long_about = "Show full details for a single ticket by uid.",
        after_help = "EXAMPLES:\n    # Show a ticket\n    tb show k3x9qa\n\n    # Emit machine-readable output\n    tb show k3x9qa --format json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Tickets",
        about = "Edit a ticket",
        long_about = "Change the subject, text, state, or priority of a ticket.",
        after_help = "EXAMPLES:\n    # Start work on a ticket\n    tb edit k3x9qa --state in_progress\n\n    # Rename and prioritize\n    tb edit k3x9qa --subject \"Fix bug v2\" --priority"
    )]
    Edit(cmd::edit::EditArgs),

    #[command(
        next_help_heading = "Tickets",
        about = "Delete a ticket",
        long_about = "Delete a ticket after confirmation.",
        after_help = "EXAMPLES:\n    # Delete with a confirmation prompt\n    tb delete k3x9qa\n\n    # Skip the prompt\n    tb delete k3x9qa --force"
    )]
    Delete(cmd::delete::DeleteArgs),

    #[command(
        next_help_heading = "Data",
        about = "Import tickets",
        long_about = "Replace every ticket with the contents of an export document. A malformed document changes nothing.",
        after_help = "EXAMPLES:\n    # Import from a file\n    tb import --file tickets.json\n\n    # Import from stdin without prompting\n    tb import --force < tickets.json"
    )]
    Import(cmd::import::ImportArgs),

    #[command(
        next_help_heading = "Data",
        about = "Export tickets",
        long_about = "Write every ticket as a JSON document that `tb import` accepts.",
        after_help = "EXAMPLES:\n    # Export to stdout\n    tb export\n\n    # Export to a file, indented\n    tb export --output tickets.json --pretty"
    )]
    Export(cmd::export::ExportArgs),

    #[command(
        next_help_heading = "Data",
        about = "Delete all tickets",
        long_about = "Delete every ticket after confirmation.",
        after_help = "EXAMPLES:\n    # Clear with a confirmation prompt\n    tb clear\n\n    # Skip the prompt\n    tb clear --force"
    )]
    Clear(cmd::clear::ClearArgs),

    #[command(
        next_help_heading = "Interface",
        about = "Hide or show the new ticket form",
        long_about = "Flip the persisted visibility of the TUI's new ticket form.",
        after_help = "EXAMPLES:\n    # Flip the form toggle\n    tb toggle-form"
    )]
    ToggleForm,

    #[command(
        next_help_heading = "Interface",
        about = "Open the interactive TUI",
        long_about = "Open a full-screen ticket table with inline editing.",
        after_help = "EXAMPLES:\n    # Open the TUI\n    tb ui\n\n    # Open with one ticket expanded\n    tb ui --focus k3x9qa"
    )]
    Ui(UiArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tb completions bash\n\n    # Generate zsh completions\n    tb completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

#[derive(Args, Debug)]
struct UiArgs {
    /// Start with this ticket expanded.
    #[arg(long, value_name = "UID")]
    focus: Option<String>,
}

/// Default log filter when `TICKETBOX_LOG` is unset.
///
/// `ticketbox` covers the core crate's targets, `tb` the binary's own.
fn default_filter(verbose: bool, debug_env: bool, tui: bool) -> &'static str {
    if verbose || debug_env {
        "ticketbox=debug,tb=debug,info"
    } else if tui {
        "warn"
    } else {
        "ticketbox=info,tb=info,warn"
    }
}

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogTarget {
    Stderr,
    File(PathBuf),
    Discard,
}

/// The TUI owns the terminal, so it never logs to stderr.
fn log_target(tui: bool, log_file: Option<PathBuf>) -> LogTarget {
    match (log_file, tui) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Discard,
        (None, false) => LogTarget::Stderr,
    }
}

fn init_tracing(default: &str, target: &LogTarget) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let format = env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "compact".to_string());

    let writer = match target {
        LogTarget::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        LogTarget::Discard => BoxMakeWriter::new(std::io::sink),
    };
    let ansi = *target == LogTarget::Stderr;

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(writer))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_ansi(ansi).with_writer(writer))
                .init();
        }
    }
    Ok(())
}

fn build_context(cli: &Cli) -> anyhow::Result<cmd::Context> {
    let config = load_user_config()?;
    let env_dir = env::var(DATA_DIR_ENV).ok();
    let data_dir = resolve_data_dir(cli.data_dir.as_deref(), env_dir.as_deref(), &config)?;
    let output = output::resolve_output_mode(cli.format, cli.json, config.output.as_deref());
    debug!(data_dir = %data_dir.display(), ?output, "resolved context");
    Ok(cmd::Context {
        output,
        data_dir,
        config,
        quiet: cli.quiet,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let is_tui = matches!(cli.command, Commands::Ui(_));
    init_tracing(
        default_filter(cli.verbose, env::var("DEBUG").is_ok(), is_tui),
        &log_target(is_tui, env::var_os(LOG_FILE_ENV).map(PathBuf::from)),
    )?;

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let ctx = build_context(&cli)?;

    match &cli.command {
        Commands::Add(args) => cmd::add::run_add(args, &ctx),
        Commands::List(args) => cmd::list::run_list(args, &ctx),
        Commands::Show(args) => cmd::show::run_show(args, &ctx),
        Commands::Edit(args) => cmd::edit::run_edit(args, &ctx),
        Commands::Delete(args) => cmd::delete::run_delete(args, &ctx),
        Commands::Import(args) => cmd::import::run_import(args, &ctx),
        Commands::Export(args) => cmd::export::run_export(args, &ctx),
        Commands::Clear(args) => cmd::clear::run_clear(args, &ctx),
        Commands::ToggleForm => cmd::toggle_form::run_toggle_form(&ctx),
        Commands::Ui(args) => {
            tui::run(&ctx, args.focus.as_deref()).context("TUI exited with an error")
        }
        Commands::Completions(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["tb", "--format", "json", "list"]);
        assert_eq!(cli.format, Some(OutputMode::Json));
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["tb", "list", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.format, None);
    }

    #[test]
    fn data_dir_flag_is_global() {
        let cli = Cli::parse_from(["tb", "list", "--data-dir", "/tmp/tickets"]);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/tickets")));
    }

    #[test]
    fn quiet_flag_parsed() {
        let cli = Cli::parse_from(["tb", "-q", "list"]);
        assert!(cli.quiet);
    }

    #[test]
    fn ui_focus_parses() {
        let cli = Cli::parse_from(["tb", "ui", "--focus", "abc123"]);
        match cli.command {
            Commands::Ui(args) => assert_eq!(args.focus.as_deref(), Some("abc123")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["tb", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(cmd::completions::CompletionsArgs {
                shell: clap_complete::Shell::Bash,
            })
        ));
    }

    #[test]
    fn all_subcommands_listed() {
        let subcommands = [
            vec!["tb", "add", "Fix bug"],
            vec!["tb", "add", "Fix bug", "--text", "details"],
            vec!["tb", "list", "--sort", "modified"],
            vec!["tb", "show", "abc123"],
            vec!["tb", "edit", "abc123", "--state", "done"],
            vec!["tb", "delete", "abc123", "--force"],
            vec!["tb", "import", "--file", "x.json", "--force"],
            vec!["tb", "export", "--pretty"],
            vec!["tb", "clear", "--force"],
            vec!["tb", "toggle-form"],
            vec!["tb", "ui"],
            vec!["tb", "completions", "zsh"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(result.is_ok(), "Failed to parse: {args:?}: {:?}", result.err());
        }
    }

    #[test]
    fn add_requires_subject() {
        assert!(Cli::try_parse_from(["tb", "add"]).is_err());
    }

    #[test]
    fn default_filter_levels() {
        assert_eq!(
            default_filter(false, false, false),
            "ticketbox=info,tb=info,warn"
        );
        assert_eq!(default_filter(false, false, true), "warn");
        assert_eq!(
            default_filter(true, false, true),
            "ticketbox=debug,tb=debug,info"
        );
        assert_eq!(
            default_filter(false, true, false),
            "ticketbox=debug,tb=debug,info"
        );
    }

    #[test]
    fn verbose_filter_enables_binary_debug_events() {
        let filter = EnvFilter::new(default_filter(true, false, false));
        assert!(filter.to_string().contains("tb=debug"));
    }

    #[test]
    fn tui_never_logs_to_stderr() {
        assert_eq!(log_target(true, None), LogTarget::Discard);
        assert_eq!(
            log_target(true, Some(PathBuf::from("/tmp/tb.log"))),
            LogTarget::File(PathBuf::from("/tmp/tb.log"))
        );
        assert_eq!(log_target(false, None), LogTarget::Stderr);
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
