//! Shared output layer for pretty/text/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: pretty output for humans, compact text for scripts, or stable JSON.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. `output` in the user config file
//! 4. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use ticketbox_core::config::normalize_output_mode;
use ticketbox_core::error::TicketError;

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<12} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output (tables, sections, visual framing).
    Pretty,
    /// Token-efficient plain text for scripts and pipes.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    fn from_name(raw: &str) -> Option<Self> {
        match normalize_output_mode(raw)? {
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            _ => Some(Self::Pretty),
        }
    }
}

/// Core resolution logic, separated from I/O for testability.
///
/// `format_flag`: explicit `--format` value if provided.
/// `json_flag`: hidden `--json` alias.
/// `format_env`: the value of `FORMAT` if set.
/// `config_output`: `output` from the user config.
/// `is_tty`: true if stdout is a TTY.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    config_output: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    // Unknown values fall through to the next layer.
    if let Some(mode) = format_env.and_then(OutputMode::from_name) {
        return mode;
    }

    if let Some(mode) = config_output.and_then(OutputMode::from_name) {
        return mode;
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, config, and TTY defaults.
pub fn resolve_output_mode(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    config_output: Option<&str>,
) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(
        format_flag,
        json_flag,
        env_val.as_deref(),
        config_output,
        is_tty,
    )
}

/// Trait implemented by any CLI result type that can be rendered in all modes.
///
/// The [`render_list`] free function dispatches to the appropriate method
/// based on [`OutputMode`].
pub trait Renderable {
    /// Render for human consumption.
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a JSON value (schema-stable, streaming-safe).
    fn render_json(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Render as a single text row (no header; see [`table_headers`]).
    ///
    /// [`table_headers`]: Renderable::table_headers
    fn render_table(&self, w: &mut dyn Write) -> io::Result<()>;

    /// Column headers for text mode, in the same order as [`render_table`] fields.
    ///
    /// [`render_table`]: Renderable::render_table
    fn table_headers() -> &'static [&'static str]
    where
        Self: Sized,
    {
        &[]
    }
}

/// Render a list of [`Renderable`] items into `out`.
///
/// - In JSON mode, wraps items in a JSON array.
/// - In pretty/text mode, renders items sequentially.
pub fn write_list<R: Renderable>(
    out: &mut dyn Write,
    items: &[R],
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Pretty => {
            for item in items {
                item.render_human(out)?;
            }
        }
        OutputMode::Text => {
            let headers = if items.is_empty() {
                &[] as &[&str]
            } else {
                R::table_headers()
            };
            if !headers.is_empty() {
                writeln!(out, "{}", headers.join("\t"))?;
            }
            for item in items {
                item.render_table(out)?;
            }
        }
        OutputMode::Json => {
            write!(out, "[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    write!(out, ",")?;
                }
                writeln!(out)?;
                let mut buf = Vec::new();
                item.render_json(&mut buf)?;
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                out.write_all(&buf)?;
            }
            writeln!(out, "\n]")?;
        }
    }
    Ok(())
}

/// Render a list of [`Renderable`] items to stdout.
pub fn render_list<R: Renderable>(items: &[R], mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_list(&mut out, items, mode)
}

/// Render a serializable value with explicit pretty/text renderers.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    value: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Text => text_fn(value, &mut out)?,
        OutputMode::Pretty => pretty_fn(value, &mut out)?,
    }
    Ok(())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Create an error with a suggestion and error code.
    pub fn with_details(
        message: impl Into<String>,
        suggestion: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            suggestion: Some(suggestion.into()),
            error_code: Some(error_code.into()),
        }
    }
}

/// Convert a [`TicketError`] into a [`CliError`].
impl From<&TicketError> for CliError {
    fn from(err: &TicketError) -> Self {
        Self {
            message: err.to_string(),
            suggestion: err.hint().map(String::from),
            error_code: Some(err.code().code().to_string()),
        }
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In pretty/text mode,
/// the provided `human_fn` closure is called to produce text output.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            human_fn(value, &mut out)?;
        }
    }
    Ok(())
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)
}

/// Render a [`TicketError`] to stderr and hand it back as an [`anyhow::Error`].
pub fn fail(mode: OutputMode, err: TicketError) -> anyhow::Error {
    // A broken stderr leaves nothing useful to report to.
    let _ = render_error(mode, &CliError::from(&err));
    anyhow::Error::new(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketbox_core::error::ErrorCode;

    // ── resolve_output_mode_inner (testable pure function) ──────────────────

    #[test]
    fn resolve_format_flag_wins_over_json_and_env() {
        let mode =
            resolve_output_mode_inner(Some(OutputMode::Text), true, Some("pretty"), None, true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_json_flag_wins_over_env() {
        let mode = resolve_output_mode_inner(None, true, Some("pretty"), None, true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn resolve_format_env_wins_over_config() {
        let mode = resolve_output_mode_inner(None, false, Some("text"), Some("json"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_format_env_case_insensitive() {
        let mode = resolve_output_mode_inner(None, false, Some("TEXT"), None, false);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn resolve_config_output_when_env_unset() {
        let mode = resolve_output_mode_inner(None, false, None, Some("json"), true);
        assert_eq!(mode, OutputMode::Json);
        let mode = resolve_output_mode_inner(None, false, Some("fancy"), Some("human"), false);
        assert_eq!(mode, OutputMode::Pretty);
    }

    #[test]
    fn resolve_unknown_values_fall_through_to_tty() {
        let mode_tty = resolve_output_mode_inner(None, false, Some("fancy"), Some("odd"), true);
        assert_eq!(mode_tty, OutputMode::Pretty);
        let mode_pipe = resolve_output_mode_inner(None, false, Some("fancy"), None, false);
        assert_eq!(mode_pipe, OutputMode::Text);
    }

    // ── Renderable trait and write_list ─────────────────────────────────────

    struct SimpleItem {
        name: String,
        count: u32,
    }

    impl Renderable for SimpleItem {
        fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
            writeln!(w, "{}: {}", self.name, self.count)
        }

        fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
            write!(
                w,
                "{{\"name\":{},\"count\":{}}}",
                serde_json::to_string(&self.name).unwrap(),
                self.count
            )
        }

        fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
            writeln!(w, "{}\t{}", self.name, self.count)
        }

        fn table_headers() -> &'static [&'static str] {
            &["NAME", "COUNT"]
        }
    }

    fn items() -> Vec<SimpleItem> {
        vec![
            SimpleItem {
                name: "a".into(),
                count: 1,
            },
            SimpleItem {
                name: "b".into(),
                count: 2,
            },
        ]
    }

    fn list_to_string(items: &[SimpleItem], mode: OutputMode) -> String {
        let mut buf = Vec::new();
        write_list(&mut buf, items, mode).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn write_list_text_has_header_and_rows() {
        let out = list_to_string(&items(), OutputMode::Text);
        assert_eq!(out, "NAME\tCOUNT\na\t1\nb\t2\n");
    }

    #[test]
    fn write_list_text_empty_has_no_header() {
        assert_eq!(list_to_string(&[], OutputMode::Text), "");
    }

    #[test]
    fn write_list_json_is_an_array() {
        let out = list_to_string(&items(), OutputMode::Json);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[1]["name"], "b");

        let empty: serde_json::Value =
            serde_json::from_str(&list_to_string(&[], OutputMode::Json)).unwrap();
        assert_eq!(empty, serde_json::json!([]));
    }

    #[test]
    fn write_list_pretty_renders_each_item() {
        let out = list_to_string(&items(), OutputMode::Pretty);
        assert_eq!(out, "a: 1\nb: 2\n");
    }

    // ── Errors ───────────────────────────────────────────────────────────────

    #[test]
    fn cli_error_from_ticket_error() {
        let err = TicketError::NotFound {
            uid: "abc123".into(),
        };
        let cli_err = CliError::from(&err);
        assert!(cli_err.message.contains("abc123"));
        assert!(cli_err.suggestion.is_some());
        assert_eq!(
            cli_err.error_code.as_deref(),
            Some(ErrorCode::TicketNotFound.code())
        );
    }

    #[test]
    fn error_json_is_wrapped() {
        let err = CliError::with_details("bad input", "try again", "E2003");
        let mut buf = Vec::new();
        write_error(&mut buf, OutputMode::Json, &err).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed["error"]["message"], "bad input");
        assert_eq!(parsed["error"]["suggestion"], "try again");
        assert_eq!(parsed["error"]["error_code"], "E2003");
    }

    #[test]
    fn error_human_has_suggestion_line() {
        let err = CliError::with_details("bad input", "try again", "E2003");
        let mut buf = Vec::new();
        write_error(&mut buf, OutputMode::Text, &err).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "error: bad input\n  suggestion: try again\n"
        );
    }

    #[test]
    fn render_human_output() {
        #[derive(Serialize)]
        struct TestData {
            name: String,
        }
        let data = TestData {
            name: "test".into(),
        };
        let result = render(OutputMode::Pretty, &data, |d, w| {
            writeln!(w, "Name: {}", d.name)
        });
        assert!(result.is_ok());
    }
}
