//! Command-line interface for diagrampad
//!
//! One-shot subcommands over the on-disk diagram store, plus an interactive
//! shell that drives the full editor.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossterm::tty::IsTty;
use serde::Serialize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::colorizer::{paint_active, paint_syntax_error, should_colorize};
use crate::config::Config;
use crate::shell::Shell;
use diagrampad::core::logging::init_logging;
use diagrampad::editor::{DeleteOutcome, Editor, FileManager, PreviewBridge, PreviewState, SaveOutcome};
use diagrampad::plugins::{CommandRenderer, FileStore};
use diagrampad::{
    effective_name, sort_records, timestamp_now, truncate_name, EditingSurface, RecordId,
    RecordStore, TextBuffer,
};

/// Widest a name may be in the `list` table
const LIST_NAME_WIDTH: usize = 40;

/// diagrampad - keep, edit and preview Mermaid diagrams from the terminal
#[derive(Parser)]
#[command(name = "diagrampad")]
#[command(about = "A local-first Mermaid diagram editor with live preview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// Directory holding the diagram store
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Renderer command that reads diagram source on stdin
    #[arg(long, global = true, value_name = "COMMAND")]
    pub renderer: Option<String>,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// When to use colors in output
    #[arg(long, value_enum, global = true, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// When to colorize output
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if output is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List stored diagrams, most recently modified first
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print a diagram's source
    Show {
        /// Diagram id
        id: String,
    },

    /// Save a file as a new diagram (use - for stdin)
    Import {
        path: PathBuf,

        /// Diagram name; defaults to the file stem
        #[arg(long)]
        name: Option<String>,
    },

    /// Write a diagram's source to a file or stdout
    Export {
        /// Diagram id
        id: String,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a diagram
    Delete {
        /// Diagram id
        id: String,
    },

    /// Render a diagram once through the configured renderer
    Render {
        /// Input file containing diagram source (use - for stdin)
        #[arg(short, long, conflicts_with = "id")]
        input: Option<PathBuf>,

        /// Render a stored diagram instead
        #[arg(long)]
        id: Option<String>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Interactive editing session
    Shell,
}

/// One row of `list --json`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListedDiagram<'a> {
    id: &'a str,
    name: &'a str,
    created: String,
    last_modified: String,
    time_ago: String,
}

/// Main CLI application
pub struct DiagrampadApp {
    config: Config,
}

impl DiagrampadApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the application with the given CLI arguments
    pub async fn run(&self, cli: Cli) -> Result<()> {
        if let Err(e) = init_logging(
            cli.log_level.map(|l| l.as_str()),
            cli.log_format.map(|f| f.as_str()),
        ) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("diagrampad v{}", env!("CARGO_PKG_VERSION"));
            eprintln!("Store: {}", self.config.data_dir.display());
        }
        debug!(config = ?self.config, "Configuration resolved");

        let color = should_colorize(cli.color, IsTty::is_tty(&io::stdout()));
        match cli.command {
            Commands::List { json } => self.list_command(json, color).await,
            Commands::Show { id } => self.show_command(&id).await,
            Commands::Import { path, name } => self.import_command(path, name).await,
            Commands::Export { id, output } => self.export_command(&id, output).await,
            Commands::Delete { id } => self.delete_command(&id).await,
            Commands::Render { input, id, output } => {
                self.render_command(input, id, output, color).await
            }
            Commands::Shell => self.shell_command(color).await,
        }
    }

    async fn open_store(&self) -> Result<FileStore> {
        FileStore::open(&self.config.data_dir)
            .await
            .with_context(|| format!("Cannot open store at {}", self.config.data_dir.display()))
    }

    fn renderer(&self) -> Result<CommandRenderer> {
        CommandRenderer::from_command_line(&self.config.renderer)
            .ok_or_else(|| anyhow!("Renderer command is empty"))
    }

    fn file_manager(&self, store: FileStore) -> FileManager<FileStore> {
        FileManager::new(store, TextBuffer::default())
    }

    /// Handle the list command
    async fn list_command(&self, json: bool, color: bool) -> Result<()> {
        let store = self.open_store().await?;
        let now = timestamp_now();

        if json {
            let mut records = store.list().await?;
            sort_records(&mut records);
            let rows: Vec<ListedDiagram> = records
                .iter()
                .map(|record| ListedDiagram {
                    id: record.id.as_str(),
                    name: record.display_name(),
                    created: record.created.to_rfc3339(),
                    last_modified: record.effective_timestamp().to_rfc3339(),
                    time_ago: diagrampad::time_ago(record.effective_timestamp(), now),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(());
        }

        let mut files = self.file_manager(store);
        let listing = files.refresh(now).await?;
        if listing.is_empty() {
            println!("No diagrams yet. Import one or start `diagrampad shell`.");
            return Ok(());
        }
        for entry in listing.entries() {
            let name = truncate_name(&entry.name, LIST_NAME_WIDTH);
            let line = format!("{:<40}  {:>10}  {}", name, entry.time_ago, entry.id);
            println!("{}", if entry.active { paint_active(&line, color) } else { line });
        }
        println!();
        println!(
            "{} diagram{}",
            listing.len(),
            if listing.len() == 1 { "" } else { "s" }
        );
        Ok(())
    }

    /// Handle the show command
    async fn show_command(&self, id: &str) -> Result<()> {
        let mut files = self.file_manager(self.open_store().await?);
        let record = files.open(&RecordId::new(id), timestamp_now()).await?;
        self.write_output(None, &record.content)
    }

    /// Handle the import command
    async fn import_command(&self, path: PathBuf, name: Option<String>) -> Result<()> {
        let content = self.read_input(Some(path.clone()))?;
        let name = name.unwrap_or_else(|| {
            path.file_stem()
                .filter(|_| path.to_string_lossy() != "-")
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });

        let mut files = self.file_manager(self.open_store().await?);
        files.surface_mut().set_value(&content);
        files.name_mut().reset(name.clone());

        let mut confirm = self.config.confirm.on_stdin();
        match files.save(&mut confirm, timestamp_now()).await? {
            SaveOutcome::Created(id) | SaveOutcome::Updated(id) => {
                info!(id = %id, "Imported diagram");
                println!("Saved \"{}\" as {}", effective_name(&name), id);
                Ok(())
            }
            SaveOutcome::Declined => bail!("Import cancelled"),
        }
    }

    /// Handle the export command
    async fn export_command(&self, id: &str, output: Option<PathBuf>) -> Result<()> {
        let store = self.open_store().await?;
        let record = store
            .get(&RecordId::new(id))
            .await?
            .ok_or_else(|| anyhow!("Diagram not found: {}", id))?;
        self.write_output(output, &record.content)
    }

    /// Handle the delete command
    async fn delete_command(&self, id: &str) -> Result<()> {
        let mut files = self.file_manager(self.open_store().await?);
        let mut confirm = self.config.confirm.on_stdin();
        match files
            .delete(&RecordId::new(id), &mut confirm, timestamp_now())
            .await?
        {
            DeleteOutcome::Deleted { .. } => {
                println!("Diagram deleted");
                Ok(())
            }
            DeleteOutcome::Declined => {
                println!("Delete cancelled");
                Ok(())
            }
            DeleteOutcome::NothingSelected => Ok(()),
        }
    }

    /// Handle the render command
    async fn render_command(
        &self,
        input: Option<PathBuf>,
        id: Option<String>,
        output: Option<PathBuf>,
        color: bool,
    ) -> Result<()> {
        let source = match id {
            Some(id) => {
                let store = self.open_store().await?;
                store
                    .get(&RecordId::new(&id))
                    .await?
                    .ok_or_else(|| anyhow!("Diagram not found: {}", id))?
                    .content
            }
            None => self.read_input(input)?,
        };

        let mut preview = PreviewBridge::new(Arc::new(self.renderer()?));
        match preview.refresh(&source).await {
            PreviewState::Rendered(diagram) => self.write_output(output, &diagram.body),
            PreviewState::SyntaxError { message, help } => {
                eprintln!("{}", paint_syntax_error(message, help, color));
                bail!("Diagram has syntax errors")
            }
            state => {
                println!("{}", state);
                Ok(())
            }
        }
    }

    /// Handle the shell command
    async fn shell_command(&self, color: bool) -> Result<()> {
        let store = self.open_store().await?;
        let renderer = Arc::new(self.renderer()?);
        let editor = Editor::init(store, TextBuffer::default(), renderer).await?;

        let stdin = io::stdin();
        let mut shell = Shell::new(editor, stdin.lock(), io::stdout(), self.config.confirm, color);
        shell.run().await
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                let mut stdout = io::stdout();
                stdout.write_all(content.as_bytes())?;
                if !content.is_empty() && !content.ends_with('\n') {
                    stdout.write_all(b"\n")?;
                }
                stdout.flush()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ConfirmPolicy;
    use tempfile::tempdir;

    fn app() -> DiagrampadApp {
        DiagrampadApp::new(Config {
            data_dir: PathBuf::from("unused"),
            renderer: "cat".into(),
            confirm: ConfirmPolicy::Decline,
        })
    }

    #[test]
    fn test_cli_parsing_list_command() {
        let cli = Cli::try_parse_from(["diagrampad", "list", "--json"]).unwrap();
        match cli.command {
            Commands::List { json } => assert!(json),
            _ => panic!("Expected List command"),
        }
        assert_eq!(cli.color, ColorChoice::Auto);
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_cli_parsing_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "diagrampad",
            "delete",
            "file_1",
            "--yes",
            "--data-dir",
            "/tmp/store",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert!(cli.yes);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/store")));
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        match cli.command {
            Commands::Delete { id } => assert_eq!(id, "file_1"),
            _ => panic!("Expected Delete command"),
        }
    }

    #[test]
    fn test_cli_parsing_import_command() {
        let cli = Cli::try_parse_from(["diagrampad", "import", "flow.mmd", "--name", "Flow"]).unwrap();
        match cli.command {
            Commands::Import { path, name } => {
                assert_eq!(path, PathBuf::from("flow.mmd"));
                assert_eq!(name.as_deref(), Some("Flow"));
            }
            _ => panic!("Expected Import command"),
        }
    }

    #[test]
    fn test_render_input_and_id_conflict() {
        let result = Cli::try_parse_from(["diagrampad", "render", "-i", "a.mmd", "--id", "file_1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_accepts_renderer_flag() {
        let cli = Cli::try_parse_from(["diagrampad", "--renderer", "mmdc -i - -o -", "render"]).unwrap();
        assert_eq!(cli.renderer.as_deref(), Some("mmdc -i - -o -"));
        assert!(matches!(cli.command, Commands::Render { .. }));
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.mmd");
        fs::write(&file_path, "graph TD; A-->B;").unwrap();
        assert_eq!(app().read_input(Some(file_path)).unwrap(), "graph TD; A-->B;");
    }

    #[test]
    fn test_read_input_missing_file_names_path() {
        let err = app()
            .read_input(Some(PathBuf::from("/definitely/missing.mmd")))
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/missing.mmd"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("output.mmd");
        app()
            .write_output(Some(file_path.clone()), "graph LR")
            .unwrap();
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "graph LR");
    }

    #[tokio::test]
    async fn test_import_saves_file_contents() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("checkout.mmd");
        fs::write(&source, "graph LR\n    Cart --> Pay").unwrap();

        let app = DiagrampadApp::new(Config {
            data_dir: dir.path().join("store"),
            renderer: "cat".into(),
            confirm: ConfirmPolicy::Decline,
        });
        app.import_command(source, None).await.unwrap();

        let store = FileStore::open(dir.path().join("store")).await.unwrap();
        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "checkout");
        assert_eq!(records[0].content, "graph LR\n    Cart --> Pay");
    }

    #[test]
    fn test_verbose_flag() {
        let cli = Cli::try_parse_from(["diagrampad", "--verbose", "shell"]).unwrap();
        assert!(cli.verbose);
    }
}
