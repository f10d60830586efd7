//! Line-oriented editing session
//!
//! Each input line is one editor command. Notifications the command produced
//! are printed right after it runs.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{BufRead, Write};
use tracing::debug;

use crate::colorizer::{paint_active, paint_notification, paint_syntax_error};
use crate::prompt::{answer, ConfirmPolicy};
use diagrampad::editor::{Command, Editor, KeyPress, PreviewState, Reaction};
use diagrampad::{truncate_name, Confirmation, RecordId, RecordStore, TextBuffer};

const PROMPT: &str = "diagrampad> ";

const HELP: &str = "\
Diagrams:
  ls                    list stored diagrams
  new                   start a new diagram
  open <id>             open a stored diagram
  save                  save (or update) the current diagram
  save-as               save a copy of the current diagram
  delete [id]           delete a diagram (the current one by default)
  rename <name>         change the diagram name
Text:
  show                  print the editor text
  type <line>           append a line
  clear                 empty the editor
  load <path>           replace the text with a file's contents
  write <path>          write the text to a file
Preview:
  preview               print the rendered preview
  zoom in|out|reset     change the zoom
  pan <dx> <dy>         drag the preview
  wheel <dy>            scroll the wheel over the preview
Layout:
  sidebar               toggle the sidebar
  resize <percent>      set the editor pane width
  key <chord>           press a shortcut, e.g. ctrl+s
  status                show editor state
  help                  this text
  quit                  leave the shell";

/// What the loop should do after a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct Shell<S, R, W> {
    editor: Editor<S, TextBuffer>,
    input: R,
    output: W,
    policy: ConfirmPolicy,
    color: bool,
}

impl<S, R, W> Shell<S, R, W>
where
    S: RecordStore,
    R: BufRead,
    W: Write,
{
    pub fn new(
        editor: Editor<S, TextBuffer>,
        input: R,
        output: W,
        policy: ConfirmPolicy,
        color: bool,
    ) -> Self {
        Self {
            editor,
            input,
            output,
            policy,
            color,
        }
    }

    /// Read and run commands until `quit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.output, "diagrampad shell. Type `help` for commands.")?;
        self.print_notifications()?;

        loop {
            write!(self.output, "{}", PROMPT)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                break;
            }

            let flow = match self.execute_line(line.trim()).await {
                Ok(flow) => flow,
                Err(e) => {
                    writeln!(self.output, "{}", e)?;
                    Flow::Continue
                }
            };
            self.print_notifications()?;
            if flow == Flow::Quit {
                break;
            }
        }
        Ok(())
    }

    async fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        debug!(command = word, "Shell command");

        match word {
            "" => {}
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => writeln!(self.output, "{}", HELP)?,
            "ls" => self.print_listing()?,
            "new" => {
                self.dispatch(Command::New).await;
            }
            "open" => {
                let id = required(rest, "open <id>")?;
                self.dispatch(Command::Open(RecordId::new(id))).await;
            }
            "save" => {
                self.dispatch(Command::Save).await;
            }
            "save-as" => {
                self.dispatch(Command::SaveAs).await;
            }
            "delete" => {
                let command = if rest.is_empty() {
                    Command::DeleteCurrent
                } else {
                    Command::Delete(RecordId::new(rest))
                };
                self.dispatch(command).await;
            }
            "rename" => {
                self.dispatch(Command::BeginRename).await;
                self.dispatch(Command::EditName(rest.to_string())).await;
                self.dispatch(Command::CommitRename).await;
                writeln!(self.output, "Title: {}", self.editor.title())?;
            }
            "show" => {
                let text = self.editor.text();
                writeln!(self.output, "# {}", self.editor.title())?;
                writeln!(self.output, "{}", text)?;
            }
            "type" => {
                self.editor.surface_mut().push_line(rest);
                self.dispatch(Command::TextChanged).await;
            }
            "clear" => {
                self.dispatch(Command::Edit(String::new())).await;
            }
            "load" => {
                let path = required(rest, "load <path>")?;
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read '{}'", path))?;
                self.dispatch(Command::Edit(text)).await;
            }
            "write" => {
                let path = required(rest, "write <path>")?;
                fs::write(path, self.editor.text())
                    .with_context(|| format!("Failed to write '{}'", path))?;
                writeln!(self.output, "Wrote {}", path)?;
            }
            "preview" => self.print_preview()?,
            "zoom" => {
                let command = match rest {
                    "in" => Command::ZoomIn,
                    "out" => Command::ZoomOut,
                    "reset" => Command::ResetZoom,
                    _ => return Err(anyhow!("Usage: zoom in|out|reset")),
                };
                self.dispatch(command).await;
                writeln!(self.output, "Zoom {}", self.editor.viewport().zoom_label())?;
            }
            "pan" => {
                let [dx, dy] = numbers::<2>(rest, "pan <dx> <dy>")?;
                self.dispatch(Command::PointerDown { x: 0.0, y: 0.0 }).await;
                self.dispatch(Command::PointerMove { x: dx, y: dy }).await;
                self.dispatch(Command::PointerUp).await;
                let scroll = self.editor.viewport().scroll();
                writeln!(self.output, "Scroll {}, {}", scroll.x, scroll.y)?;
            }
            "wheel" => {
                let [delta_y] = numbers::<1>(rest, "wheel <dy>")?;
                self.dispatch(Command::PointerEnter).await;
                self.dispatch(Command::Wheel { delta_y }).await;
                self.dispatch(Command::PointerLeave).await;
                writeln!(self.output, "Zoom {}", self.editor.viewport().zoom_label())?;
            }
            "sidebar" => {
                self.dispatch(Command::ToggleSidebar).await;
                let state = if self.editor.sidebar().is_collapsed() {
                    "collapsed"
                } else {
                    "expanded"
                };
                writeln!(self.output, "Sidebar {}", state)?;
            }
            "resize" => {
                let [percent] = numbers::<1>(rest, "resize <percent>")?;
                self.dispatch(Command::BeginResize).await;
                self.dispatch(Command::ResizeTo {
                    pointer_x: percent,
                    container_left: 0.0,
                    container_width: 100.0,
                })
                .await;
                self.dispatch(Command::EndResize).await;
                let layout = self.editor.layout();
                writeln!(
                    self.output,
                    "Editor {:.0}% / preview {:.0}%",
                    layout.editor_percent(),
                    layout.preview_percent()
                )?;
            }
            "key" => {
                let chord = required(rest, "key <chord>")?;
                let press =
                    KeyPress::parse(chord).ok_or_else(|| anyhow!("Unknown key chord: {}", chord))?;
                if self.key(&press).await.is_none() {
                    writeln!(self.output, "No shortcut for {}", chord)?;
                }
            }
            "status" => self.print_status()?,
            other => return Err(anyhow!("Unknown command: {} (type `help`)", other)),
        }
        Ok(Flow::Continue)
    }

    async fn dispatch(&mut self, command: Command) -> Reaction {
        let policy = self.policy;
        let input = &mut self.input;
        let output = &mut self.output;
        let mut confirm = |request: &Confirmation| answer(policy, &mut *input, &mut *output, request);
        self.editor.dispatch(command, &mut confirm).await
    }

    async fn key(&mut self, press: &KeyPress) -> Option<Reaction> {
        let policy = self.policy;
        let input = &mut self.input;
        let output = &mut self.output;
        let mut confirm = |request: &Confirmation| answer(policy, &mut *input, &mut *output, request);
        self.editor.key(press, &mut confirm).await
    }

    fn print_notifications(&mut self) -> Result<()> {
        for notification in self.editor.drain_notifications() {
            writeln!(
                self.output,
                "{}",
                paint_notification(notification.level, &notification.message, self.color)
            )?;
        }
        Ok(())
    }

    fn print_listing(&mut self) -> Result<()> {
        let listing = self.editor.listing();
        if listing.is_empty() {
            writeln!(self.output, "No diagrams yet. `save` stores the current one.")?;
            return Ok(());
        }
        for entry in listing.entries() {
            let line = format!(
                "{:<32}  {:>10}  {}",
                truncate_name(&entry.name, 32),
                entry.time_ago,
                entry.id
            );
            if entry.active {
                writeln!(self.output, "{}", paint_active(&line, self.color))?;
            } else {
                writeln!(self.output, "{}", line)?;
            }
        }
        writeln!(self.output, "{} total", listing.len())?;
        Ok(())
    }

    fn print_preview(&mut self) -> Result<()> {
        match self.editor.preview() {
            PreviewState::SyntaxError { message, help } => {
                writeln!(self.output, "{}", paint_syntax_error(message, help, self.color))?
            }
            state => writeln!(self.output, "{}", state)?,
        }
        Ok(())
    }

    fn print_status(&mut self) -> Result<()> {
        let editor = &self.editor;
        let current = editor
            .current()
            .map_or_else(|| "(unsaved)".to_string(), |id| id.to_string());
        let preview = match editor.preview() {
            PreviewState::Placeholder => "placeholder",
            PreviewState::Rendering { .. } => "rendering",
            PreviewState::Rendered(_) => "rendered",
            PreviewState::SyntaxError { .. } => "syntax error",
        };
        writeln!(self.output, "Title:   {}", editor.title())?;
        writeln!(self.output, "Id:      {}", current)?;
        writeln!(self.output, "Button:  {}", editor.save_label())?;
        writeln!(self.output, "Preview: {}", preview)?;
        writeln!(
            self.output,
            "Zoom:    {} ({})",
            editor.viewport().zoom_label(),
            editor.viewport().transform()
        )?;
        writeln!(
            self.output,
            "Split:   {:.0}% editor",
            editor.layout().editor_percent()
        )?;
        writeln!(
            self.output,
            "Sidebar: {}",
            if editor.sidebar().is_collapsed() { "collapsed" } else { "expanded" }
        )?;
        Ok(())
    }
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str> {
    if rest.is_empty() {
        Err(anyhow!("Usage: {}", usage))
    } else {
        Ok(rest)
    }
}

fn numbers<const N: usize>(rest: &str, usage: &str) -> Result<[f64; N]> {
    let values: Vec<f64> = rest
        .split_whitespace()
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .map_err(|_| anyhow!("Usage: {}", usage))?;
    values
        .try_into()
        .map_err(|_| anyhow!("Usage: {}", usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use diagrampad::plugins::MemoryStore;
    use diagrampad::{DiagramRenderer, RenderDiagnostic, RenderTarget, RenderedDiagram};
    use std::io::Cursor;
    use std::sync::Arc;

    struct Upper;

    #[async_trait]
    impl DiagramRenderer for Upper {
        async fn render(
            &self,
            target: &RenderTarget,
            source: &str,
        ) -> Result<RenderedDiagram, RenderDiagnostic> {
            if source.contains("oops") {
                return Err(RenderDiagnostic::new("Parse error on line 2"));
            }
            Ok(RenderedDiagram::new(target.clone(), source.to_uppercase()))
        }
    }

    async fn session(
        script: &str,
        policy: ConfirmPolicy,
    ) -> (Arc<MemoryStore>, String) {
        let store = Arc::new(MemoryStore::new());
        let editor = Editor::init(Arc::clone(&store), TextBuffer::default(), Arc::new(Upper))
            .await
            .unwrap();
        let mut output = Vec::new();
        let mut shell = Shell::new(editor, Cursor::new(script.to_string()), &mut output, policy, false);
        shell.run().await.unwrap();
        drop(shell);
        (store, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_numbers() {
        assert_eq!(numbers::<2>("3 -4.5", "u").unwrap(), [3.0, -4.5]);
        assert!(numbers::<2>("3", "u").is_err());
        assert!(numbers::<1>("x", "u").is_err());
    }

    #[tokio::test]
    async fn test_welcome_and_quit() {
        let (_, out) = session("quit\n", ConfirmPolicy::Decline).await;
        assert!(out.contains("[info] Welcome to diagrampad!"));
    }

    #[tokio::test]
    async fn test_edit_save_and_list() {
        let script = "clear\ntype graph LR\ntype     A --> B\nrename Flow\nsave\nls\nquit\n";
        let (store, out) = session(script, ConfirmPolicy::Decline).await;

        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Flow");
        assert_eq!(records[0].content, "graph LR\nA --> B");
        assert!(out.contains("[success] Diagram saved!"));
        assert!(out.contains("* Flow"));
        assert!(out.contains("1 total"));
    }

    #[tokio::test]
    async fn test_delete_asks_on_the_same_input() {
        let script = "save\ndelete\nn\ndelete\ny\nquit\n";
        let (store, out) = session(script, ConfirmPolicy::Prompt).await;
        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(out.matches("Delete diagram \"Untitled Diagram\"?").count(), 2);
        assert!(out.contains("[success] Diagram deleted"));
    }

    #[tokio::test]
    async fn test_preview_and_syntax_error() {
        let (_, out) = session("clear\ntype graph td\npreview\ntype oops\npreview\nquit\n", ConfirmPolicy::Decline).await;
        assert!(out.contains("GRAPH TD"));
        assert!(out.contains("Syntax Error\nParse error on line 2"));
    }

    #[tokio::test]
    async fn test_viewport_commands() {
        let script = "zoom in\nzoom in\nzoom reset\npan 5 -5\nwheel -1\nresize 30\nresize 90\nsidebar\nquit\n";
        let (_, out) = session(script, ConfirmPolicy::Decline).await;
        assert!(out.contains("Zoom 120%"));
        assert!(out.contains("Zoom 144%"));
        assert!(out.contains("Zoom 100%"));
        assert!(out.contains("Scroll -10, 10"));
        assert!(out.contains("Editor 30% / preview 70%"));
        assert!(out.contains("Sidebar collapsed"));
    }

    #[tokio::test]
    async fn test_open_missing_reports_and_continues() {
        let (_, out) = session("open file_nope\nbogus\nstatus\n", ConfirmPolicy::Decline).await;
        assert!(out.contains("[error] Diagram not found: file_nope"));
        assert!(out.contains("Unknown command: bogus"));
        assert!(out.contains("Id:      (unsaved)"));
    }

    #[tokio::test]
    async fn test_shortcut_keys() {
        let (store, out) = session("key ctrl+s\nkey ctrl+q\nquit\n", ConfirmPolicy::Decline).await;
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert!(out.contains("No shortcut for ctrl+q"));
    }
}
