//! veltrix REPL: drive a playground session from the terminal.
//!
//! The REPL is a host for the kernel's [`Playground`]: it feeds the sign-in
//! signal, turns command lines into session operations, prints the tree and
//! tab strip, and mirrors every preview generation into `preview.html` so a
//! browser pointed at that file shows the live result.
//!
//! - `login` / `logout` open and close the gate
//! - `ls`, `tabs`, `cat`, `preview` render state
//! - `new`, `mkdir`, `rm`, `cp`, `mv`, `import` edit the tree
//! - `open`, `close`, `write`, `append` drive the editor
//! - `refresh`, `reset`, `/help`, `/quit`

pub mod config;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use veltrix_kernel::{EditorMode, Entry, EntryId, EntryKind, Playground, Session, VfsError};

pub use config::ReplConfig;

type Confirmer = Box<dyn FnMut(&str) -> bool + Send>;

/// REPL state: the runtime, the gated playground and the preview mirror.
pub struct Repl {
    runtime: Runtime,
    playground: Playground,
    confirm: Confirmer,
    preview_path: PathBuf,
    preview_writer: Option<JoinHandle<()>>,
    color: bool,
    quit: bool,
}

impl Repl {
    /// Create a REPL. Nothing is loaded until `login`.
    pub fn new(config: &ReplConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .context("Failed to create tokio runtime")?;
        let playground = Playground::new(config.playground_config(), config.slot());
        Ok(Self {
            runtime,
            playground,
            confirm: Box::new(|_| false),
            preview_path: config.preview_path(),
            preview_writer: None,
            color: false,
            quit: false,
        })
    }

    /// Replace the yes/no prompt used for destructive commands.
    pub fn with_confirm(mut self, confirm: impl FnMut(&str) -> bool + Send + 'static) -> Self {
        self.confirm = Box::new(confirm);
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn preview_path(&self) -> &Path {
        &self.preview_path
    }

    /// Process a single line of input.
    pub fn process_line(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }
        if trimmed.starts_with('/') {
            return self.handle_meta_command(trimmed);
        }

        match self.dispatch(trimmed) {
            Err(e) => match e.downcast_ref::<VfsError>() {
                Some(rejection) if rejection.is_rejection() => {
                    Ok(Some(format!("rejected: {rejection}")))
                }
                _ => Err(e),
            },
            output => output,
        }
    }

    fn dispatch(&mut self, trimmed: &str) -> Result<Option<String>> {
        let handle = self.runtime.handle().clone();
        let _guard = handle.enter();
        let (command, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (trimmed, ""),
        };

        match command {
            "login" => self.login(),
            "logout" => self.logout(),
            _ if !self.playground.is_authenticated() => {
                Ok(Some("Not signed in. Type `login` first.".to_string()))
            }
            "ls" => Ok(Some(self.render_tree()?)),
            "tabs" => Ok(Some(self.render_tabs()?)),
            "new" => self.create(rest, EntryKind::File),
            "mkdir" => self.create(rest, EntryKind::Folder),
            "rm" => self.delete(rest),
            "cp" => self.duplicate(rest),
            "mv" => self.rename(rest),
            "open" => self.open(rest),
            "close" => self.close(rest),
            "cat" => self.cat(),
            "write" => self.write(rest),
            "append" => self.append(rest),
            "import" => self.import(rest),
            "preview" => Ok(Some(self.session()?.preview().html.to_string())),
            "refresh" => {
                let generation = self.session_mut()?.refresh_preview()?;
                Ok(Some(format!("preview generation {generation}")))
            }
            "reset" => {
                let Self {
                    playground,
                    confirm,
                    ..
                } = self;
                if playground.session_mut()?.reset(confirm)? {
                    Ok(Some("reset to starter files".to_string()))
                } else {
                    Ok(Some("reset cancelled".to_string()))
                }
            }
            other => Ok(Some(format!(
                "Unknown command: {other}\nType /help for available commands."
            ))),
        }
    }

    /// Handle a meta-command (starts with /).
    fn handle_meta_command(&mut self, cmd: &str) -> Result<Option<String>> {
        let command = cmd.split_whitespace().next().unwrap_or_default();
        match command {
            "/quit" | "/q" | "/exit" => {
                self.quit = true;
                Ok(None)
            }
            "/help" | "/h" | "/?" => Ok(Some(HELP_TEXT.to_string())),
            _ => Ok(Some(format!(
                "Unknown command: {command}\nType /help for available commands."
            ))),
        }
    }

    fn session(&self) -> Result<&Session> {
        Ok(self.playground.session()?)
    }

    fn session_mut(&mut self) -> Result<&mut Session> {
        Ok(self.playground.session_mut()?)
    }

    // ------------------------------------------------------------------
    // Gate
    // ------------------------------------------------------------------

    fn login(&mut self) -> Result<Option<String>> {
        if self.playground.is_authenticated() {
            return Ok(Some("already signed in".to_string()));
        }
        self.playground
            .set_authenticated(true)
            .context("Failed to open the playground")?;
        self.spawn_preview_writer()?;
        let session = self.session()?;
        Ok(Some(format!(
            "signed in: {} entries\n{}",
            session.vfs().entries().len(),
            self.render_tabs()?
        )))
    }

    fn logout(&mut self) -> Result<Option<String>> {
        if !self.playground.is_authenticated() {
            return Ok(Some("not signed in".to_string()));
        }
        if let Some(writer) = self.preview_writer.take() {
            writer.abort();
        }
        self.playground.set_authenticated(false)?;
        Ok(Some("signed out".to_string()))
    }

    /// Mirror each new preview generation into the preview file.
    fn spawn_preview_writer(&mut self) -> Result<()> {
        let mut rx = self.session()?.subscribe_preview();
        let path = self.preview_path.clone();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        self.preview_writer = Some(self.runtime.spawn(async move {
            while rx.changed().await.is_ok() {
                let html = rx.borrow_and_update().html.clone();
                if let Err(e) = tokio::fs::write(&path, html.as_bytes()).await {
                    tracing::warn!(path = %path.display(), error = %e, "failed to write preview");
                }
            }
        }));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tree commands
    // ------------------------------------------------------------------

    fn create(&mut self, name: &str, kind: EntryKind) -> Result<Option<String>> {
        let entry = self.session_mut()?.create(name, kind)?;
        Ok(Some(format!("created {kind} {}", entry.name)))
    }

    fn delete(&mut self, target: &str) -> Result<Option<String>> {
        let id = self.resolve(target)?;
        let Self {
            playground,
            confirm,
            ..
        } = self;
        match playground.session_mut()?.delete(&id, confirm)? {
            Some(removed) => Ok(Some(format!("deleted {} {}", removed.kind, removed.name))),
            None => Ok(Some("kept".to_string())),
        }
    }

    fn duplicate(&mut self, target: &str) -> Result<Option<String>> {
        let id = self.resolve(target)?;
        match self.session_mut()?.duplicate(&id)? {
            Some(copy) => Ok(Some(format!("copied to {}", copy.name))),
            None => Ok(Some("folders cannot be duplicated".to_string())),
        }
    }

    fn rename(&mut self, args: &str) -> Result<Option<String>> {
        let Some((from, to)) = args.split_once(char::is_whitespace) else {
            bail!("usage: mv <name>[/] <new-name>");
        };
        let id = self.resolve(from)?;
        if self.session_mut()?.rename(&id, to)? {
            Ok(Some(format!("renamed to {}", to.trim())))
        } else {
            Ok(Some("unchanged".to_string()))
        }
    }

    fn import(&mut self, path: &str) -> Result<Option<String>> {
        if path.is_empty() {
            bail!("usage: import <path>");
        }
        let path = Path::new(path);
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let Self {
            runtime,
            playground,
            ..
        } = self;
        let session = playground.session_mut()?;
        let entry = runtime.block_on(session.import(bytes, &name))?;
        Ok(Some(format!("imported {}", entry.name)))
    }

    // ------------------------------------------------------------------
    // Editor commands
    // ------------------------------------------------------------------

    fn open(&mut self, target: &str) -> Result<Option<String>> {
        let id = self.resolve(target)?;
        let session = self.session_mut()?;
        session.set_active(&id)?;
        Ok(Some(describe_editor(session)))
    }

    fn close(&mut self, target: &str) -> Result<Option<String>> {
        let session = self.session_mut()?;
        let id = match target {
            "" => session
                .vfs()
                .active_id()
                .cloned()
                .context("no tab is active")?,
            name => find(session, name)?.id.clone(),
        };
        if !session.close_tab(&id)? {
            return Ok(Some("tab is not open".to_string()));
        }
        Ok(Some(describe_editor(session)))
    }

    fn cat(&self) -> Result<Option<String>> {
        let session = self.session()?;
        let text = match session.editor().mode() {
            EditorMode::Empty => "(no file open)".to_string(),
            EditorMode::Editing(_) => session.editor().text().to_string(),
            EditorMode::ImagePreview(id) => {
                let url = session
                    .vfs()
                    .get(id)
                    .and_then(|e| e.data_url.as_deref())
                    .unwrap_or_default();
                format!("(image, {} byte data URL)", url.len())
            }
        };
        Ok(Some(text))
    }

    fn write(&mut self, text: &str) -> Result<Option<String>> {
        let text = unescape(text);
        if self.session_mut()?.input(&text)? {
            Ok(None)
        } else {
            Ok(Some("nothing to edit".to_string()))
        }
    }

    fn append(&mut self, text: &str) -> Result<Option<String>> {
        let text = unescape(text);
        let session = self.session_mut()?;
        if !session.editor_mut().append_text(&text) {
            return Ok(Some("nothing to edit".to_string()));
        }
        session.flush_editor_to_state()?;
        Ok(None)
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn render_tree(&self) -> Result<String> {
        let rows = self.session()?.tree_rows();
        if rows.is_empty() {
            return Ok("(empty)".to_string());
        }
        let lines: Vec<String> = rows
            .into_iter()
            .map(|row| {
                let suffix = if row.kind == EntryKind::Folder { "/" } else { "" };
                let label = format!("{} {}{suffix}", row.icon, row.name);
                match (row.active, self.color) {
                    (true, true) => format!("* {}", label.bold()),
                    (true, false) => format!("* {label}"),
                    (false, _) => format!("  {label}"),
                }
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn render_tabs(&self) -> Result<String> {
        let rows = self.session()?.tab_rows();
        if rows.is_empty() {
            return Ok("(no tabs)".to_string());
        }
        let tabs: Vec<String> = rows
            .into_iter()
            .map(|tab| match (tab.active, self.color) {
                (true, true) => format!("[{}]", tab.name.reversed()),
                (true, false) => format!("[{}]", tab.name),
                (false, _) => format!(" {} ", tab.name),
            })
            .collect();
        Ok(tabs.join("|"))
    }

    /// Map `name` to a file (or a folder when nothing else matches),
    /// `name/` to a folder.
    fn resolve(&self, target: &str) -> Result<EntryId> {
        Ok(find(self.session()?, target)?.id.clone())
    }
}

impl Drop for Repl {
    fn drop(&mut self) {
        if self.playground.is_authenticated() {
            let _guard = self.runtime.enter();
            if let Err(e) = self.playground.set_authenticated(false) {
                tracing::warn!(error = %e, "final flush failed");
            }
        }
    }
}

fn find<'a>(session: &'a Session, target: &str) -> Result<&'a Entry> {
    let target = target.trim();
    if target.is_empty() {
        bail!("missing name");
    }
    let vfs = session.vfs();
    let found = match target.strip_suffix('/') {
        Some(folder) => vfs.find_by_name(folder, EntryKind::Folder),
        None => vfs
            .find_by_name(target, EntryKind::File)
            .or_else(|| vfs.find_by_name(target, EntryKind::Folder)),
    };
    found.with_context(|| format!("no such entry: {target}"))
}

fn describe_editor(session: &Session) -> String {
    let name = |id: &EntryId| {
        session
            .vfs()
            .get(id)
            .map(|e| e.name.clone())
            .unwrap_or_default()
    };
    match session.editor().mode() {
        EditorMode::Empty => "editor empty".to_string(),
        EditorMode::Editing(id) => format!("editing {}", name(id)),
        EditorMode::ImagePreview(id) => format!("viewing image {}", name(id)),
    }
}

/// `\n` and `\t` escapes for single-line input.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

const HELP_TEXT: &str = r#"veltrix: playground REPL

Session:
  login / logout     Open or close the playground
  reset              Replace everything with the starter files

Tree:
  ls                 List entries, newest first (* = active)
  new <name>         Create a file and open it
  mkdir <name>       Create a folder
  rm <name>[/]       Delete (asks first); trailing / picks the folder
  cp <name>          Duplicate a file
  mv <name>[/] <new> Rename
  import <path>      Copy a file from disk into the playground

Editor:
  tabs               Show open tabs ([x] = active)
  open <name>        Make a file active
  close [name]       Close a tab (default: the active one)
  cat                Show the editor buffer
  write <text>       Replace the buffer (\n for newlines)
  append <text>      Append to the buffer

Preview:
  preview            Print the composed document
  refresh            Recompose now instead of waiting

Meta:
  /help, /h, /?      Show this help
  /quit, /q, /exit   Exit the REPL
"#;

/// Run the REPL.
pub fn run(config: ReplConfig) -> Result<()> {
    println!("veltrix v{}", env!("CARGO_PKG_VERSION"));
    println!("Type /help for commands, /quit to exit.\n");

    let mut rl: Editor<(), DefaultHistory> = Editor::new().context("Failed to create editor")?;

    let history_path = config.history_path();
    // Explicitly ignored: a missing history file is normal on first run
    let _ = rl.load_history(&history_path);

    let mut repl = Repl::new(&config)?
        .with_color(std::io::stdout().is_terminal())
        .with_confirm(prompt_yes_no);
    println!("preview file: {}", repl.preview_path().display());

    if config.login {
        match repl.process_line("login") {
            Ok(Some(output)) => println!("{output}"),
            Ok(None) => {}
            Err(e) => eprintln!("Error: {e:#}"),
        }
    }

    loop {
        let prompt = if repl.playground.is_authenticated() {
            "veltrix> "
        } else {
            "veltrix (signed out)> "
        };

        match rl.readline(prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());

                match repl.process_line(&line) {
                    Ok(Some(output)) => println!("{output}"),
                    Ok(None) => {}
                    Err(e) => eprintln!("Error: {e:#}"),
                }
                if repl.should_quit() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("^D");
                break;
            }
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    if let Some(parent) = history_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = rl.save_history(&history_path);

    Ok(())
}

/// Interactive confirmation on its own line editor.
fn prompt_yes_no(prompt: &str) -> bool {
    let answer = DefaultEditor::new().and_then(|mut rl| rl.readline(&format!("{prompt} [y/N] ")));
    matches!(answer.as_deref().map(str::trim), Ok("y" | "Y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_handles_newlines_and_tabs() {
        assert_eq!(unescape(r"a\nb\tc"), "a\nb\tc");
        assert_eq!(unescape(r"a\qb\"), r"a\qb\");
    }
}
