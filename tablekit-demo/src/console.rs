//! Line-oriented console driving a [`TableContainer`].
//!
//! Each input line is parsed into a [`ConsoleCommand`] and mapped onto the
//! container's selection events and commands. Row and column numbers typed
//! by the user are 1-based.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::str::FromStr;

use log::{debug, info, warn};
use tablekit::{Command, TableContainer};
use thiserror::Error;

use crate::dialog::MemoryClipboard;
use crate::render::{RenderOptions, render_controls, render_table};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    UnknownCommand(String),

    #[error("'{command}' needs a {argument} number")]
    MissingArgument {
        command: String,
        argument: &'static str,
    },

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("numbers start at 1")]
    Zero,
}

// =============================================================================
// I/O
// =============================================================================

/// Input and output streams shared by the console and its dialogs.
pub struct Io {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
}

pub type SharedIo = Rc<RefCell<Io>>;

impl Io {
    pub fn new(input: impl BufRead + 'static, output: impl Write + 'static) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
        }
    }

    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }

    pub fn shared(self) -> SharedIo {
        Rc::new(RefCell::new(self))
    }

    /// Read one line without its terminator. `None` at end of input.
    pub fn read_line(&mut self) -> Result<Option<String>, ConsoleError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    pub fn print(&mut self, text: &str) -> Result<(), ConsoleError> {
        self.output.write_all(text.as_bytes())?;
        self.output.flush()?;
        Ok(())
    }

    pub fn println(&mut self, text: &str) -> Result<(), ConsoleError> {
        writeln!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(())
    }

    /// Print a prompt and read the answer.
    pub fn prompt(&mut self, prompt: &str) -> Result<Option<String>, ConsoleError> {
        self.print(prompt)?;
        self.read_line()
    }
}

// =============================================================================
// Commands
// =============================================================================

/// A parsed console command. Row and column indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Show,
    Sort(usize),
    Select(usize),
    Unselect(usize),
    Toggle(usize),
    Click(usize),
    All,
    Clear,
    Add,
    Edit,
    Delete,
    Copy,
    Action(usize),
    Actions,
    Clip,
    Help,
    Quit,
}

fn index_argument(
    command: &str,
    argument: Option<&str>,
    kind: &'static str,
) -> Result<usize, ParseError> {
    let Some(raw) = argument else {
        return Err(ParseError::MissingArgument {
            command: command.to_string(),
            argument: kind,
        });
    };
    let number: usize = raw
        .parse()
        .map_err(|_| ParseError::InvalidNumber(raw.to_string()))?;
    number.checked_sub(1).ok_or(ParseError::Zero)
}

impl FromStr for ConsoleCommand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let Some(command) = words.next() else {
            return Err(ParseError::Empty);
        };
        let argument = words.next();
        let row = |kind| index_argument(command, argument, kind);

        let parsed = match command.to_ascii_lowercase().as_str() {
            "show" | "ls" => Self::Show,
            "sort" => Self::Sort(row("column")?),
            "select" | "sel" => Self::Select(row("row")?),
            "unselect" => Self::Unselect(row("row")?),
            "toggle" => Self::Toggle(row("row")?),
            "click" => Self::Click(row("row")?),
            "all" => Self::All,
            "none" | "clear" => Self::Clear,
            "add" | "new" => Self::Add,
            "edit" => Self::Edit,
            "delete" | "rm" => Self::Delete,
            "copy" => Self::Copy,
            "action" => Self::Action(row("action")?),
            "actions" => Self::Actions,
            "clip" => Self::Clip,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return Err(ParseError::UnknownCommand(command.to_string())),
        };
        Ok(parsed)
    }
}

const HELP: &str = "\
commands:
  show                    redraw the table
  sort <column>           sort by a column, again to reverse
  click <row>             select only this row
  select | unselect <row> add or remove a row from the selection
  toggle <row>            flip a row's selection
  all | none              select every row or clear the selection
  add | edit | delete     open the add/edit dialog or delete the selection
  copy | clip             copy the selection, show the clipboard
  actions | action <n>    list custom actions or run one
  quit";

// =============================================================================
// Console
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive front end for one table.
pub struct Console<T> {
    container: TableContainer<T>,
    io: SharedIo,
    clipboard: MemoryClipboard,
    options: RenderOptions,
}

impl<T: Clone + 'static> Console<T> {
    /// `clipboard` should be the same clipboard the container copies to.
    pub fn new(
        container: TableContainer<T>,
        io: SharedIo,
        clipboard: MemoryClipboard,
        options: RenderOptions,
    ) -> Self {
        Self {
            container,
            io,
            clipboard,
            options,
        }
    }

    pub fn container(&self) -> &TableContainer<T> {
        &self.container
    }

    fn say(&self, text: &str) -> Result<(), ConsoleError> {
        self.io.borrow_mut().println(text)
    }

    fn show(&self) -> Result<(), ConsoleError> {
        let table = self.container.table();
        let mut text = render_table(table, self.options).join("\n");
        text.push('\n');
        text.push_str(&render_controls(
            &self.container.controls(),
            self.container.actions(),
        ));
        table.clear_dirty();
        self.say(&text)
    }

    fn show_if_dirty(&self) -> Result<(), ConsoleError> {
        if self.container.table().is_dirty() {
            self.show()?;
        }
        Ok(())
    }

    /// Read and run commands until `quit` or end of input.
    pub fn run(&self) -> Result<(), ConsoleError> {
        self.show()?;
        loop {
            // The borrow ends before the command runs; dialogs prompt too.
            let line = self.io.borrow_mut().prompt("> ")?;
            let Some(line) = line else {
                info!("console: end of input");
                return Ok(());
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<ConsoleCommand>() {
                Ok(command) => {
                    if self.execute(command)? == Flow::Quit {
                        info!("console: quit");
                        return Ok(());
                    }
                }
                Err(e) => self.say(&e.to_string())?,
            }
        }
    }

    /// Run one command.
    pub fn execute(&self, command: ConsoleCommand) -> Result<Flow, ConsoleError> {
        debug!("console: {command:?}");
        let container = &self.container;
        match command {
            ConsoleCommand::Show => self.show()?,
            ConsoleCommand::Sort(column) => {
                if container.sort_by(column) {
                    self.show()?;
                } else {
                    self.say(&format!("column {} cannot be sorted", column + 1))?;
                }
            }
            ConsoleCommand::Select(row) => self.selection(container.on_row_selected(row))?,
            ConsoleCommand::Unselect(row) => self.selection(container.on_row_unselected(row))?,
            ConsoleCommand::Toggle(row) => self.selection(container.on_row_toggled(row))?,
            ConsoleCommand::Click(row) => self.selection(container.on_row_clicked(row))?,
            ConsoleCommand::All => {
                container.dispatch(Command::SelectAll);
                self.show()?;
            }
            ConsoleCommand::Clear => {
                container.clear_selection();
                self.show()?;
            }
            ConsoleCommand::Add => {
                container.dispatch(Command::Add);
                self.show_if_dirty()?;
            }
            ConsoleCommand::Edit => {
                if container.dispatch(Command::Edit) {
                    self.show_if_dirty()?;
                } else {
                    self.say("nothing selected")?;
                }
            }
            ConsoleCommand::Delete => {
                if container.dispatch(Command::Delete) {
                    self.show_if_dirty()?;
                } else {
                    self.say("nothing selected")?;
                }
            }
            ConsoleCommand::Copy => {
                if !container.dispatch(Command::Copy) {
                    self.say("nothing selected")?;
                }
            }
            ConsoleCommand::Action(action) => {
                if !container.dispatch(Command::Custom(action)) {
                    self.say(&format!("action {} is not available", action + 1))?;
                }
            }
            ConsoleCommand::Actions => self.list_actions()?,
            ConsoleCommand::Clip => {
                let text = self.clipboard.contents();
                self.say(if text.is_empty() { "(clipboard empty)" } else { text.as_str() })?;
            }
            ConsoleCommand::Help => self.say(HELP)?,
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn selection<R>(&self, result: Result<R, tablekit::TableError>) -> Result<(), ConsoleError> {
        match result {
            Ok(_) => self.show(),
            Err(e) => {
                warn!("console: {e}");
                self.say(&e.to_string())
            }
        }
    }

    fn list_actions(&self) -> Result<(), ConsoleError> {
        let actions = self.container.actions();
        if actions.is_empty() {
            return self.say("no custom actions");
        }
        let controls = self.container.controls();
        let lines: Vec<String> = actions
            .iter()
            .enumerate()
            .map(|(i, action)| {
                let enabled = controls.custom.get(i).copied().unwrap_or(false);
                format!(
                    "{}: {} [{}]",
                    i + 1,
                    action.label(),
                    if enabled { "enabled" } else { "disabled" }
                )
            })
            .collect();
        self.say(&lines.join("\n"))
    }
}

// =============================================================================
// Test support
// =============================================================================

/// Scripted I/O: reads `input`, captures everything written.
#[cfg(test)]
pub(crate) fn scripted(input: &str) -> (SharedIo, Rc<RefCell<Vec<u8>>>) {
    #[derive(Clone)]
    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let captured = Rc::new(RefCell::new(Vec::new()));
    let io = Io::new(
        io::Cursor::new(input.to_string().into_bytes()),
        Capture(Rc::clone(&captured)),
    );
    (io.shared(), captured)
}

#[cfg(test)]
pub(crate) fn output_of(captured: &Rc<RefCell<Vec<u8>>>) -> String {
    String::from_utf8_lossy(&captured.borrow()).into_owned()
}
