//! The interactive REPL.
//!
//! Each input line is parsed against the loaded grammar and the outcome is
//! printed. Lines starting with `:` are commands.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use burrow_debug::Tracer;
use burrow_foundation::{Error, Result};
use burrow_language::grammars::{ARITHMETIC_START, arithmetic};
use burrow_language::{Grammar, ParseOutcome, RulePath, TokenIndex, Vm};

use crate::editor::{LineEditor, ReadResult, RustylineEditor};

/// Commands understood by the REPL.
pub const COMMANDS: [&str; 6] = [":help", ":rules", ":trace", ":last", ":stats", ":quit"];

/// Number of trace records `:last` shows by default.
const DEFAULT_LAST: usize = 20;

/// What a command asks the loop to do next.
#[derive(Debug, PartialEq, Eq)]
enum Reply {
    /// Print the text and keep reading.
    Continue(String),
    /// Stop the loop.
    Quit,
}

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// The grammar input lines are parsed against.
    grammar: Grammar,

    /// The rule each parse starts from.
    start: RulePath,

    /// The VM running each parse.
    vm: Vm,

    /// Records VM events when enabled.
    tracer: Tracer,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a new REPL with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new() -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(editor))
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a new REPL over the arithmetic grammar with the given editor.
    pub fn with_editor(editor: E) -> Self {
        let mut repl = Self {
            editor,
            grammar: arithmetic(),
            start: RulePath::from(ARITHMETIC_START),
            vm: Vm::new(),
            tracer: Tracer::disabled(),
            show_banner: true,
            prompt: "burrow> ".to_string(),
        };
        repl.refresh_completions();
        repl
    }

    /// Replaces the grammar and start rule.
    #[must_use]
    pub fn with_grammar(mut self, grammar: Grammar, start: impl Into<RulePath>) -> Self {
        self.grammar = grammar;
        self.start = start.into();
        self.refresh_completions();
        self
    }

    /// Replaces the tracer.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns the grammar.
    #[must_use]
    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Returns the tracer.
    #[must_use]
    pub const fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    fn refresh_completions(&mut self) {
        let mut words: Vec<String> = COMMANDS.iter().map(ToString::to_string).collect();
        words.extend(
            self.grammar
                .rules()
                .map(|(_, rule)| rule.qualified_name().to_string()),
        );
        self.editor.set_completions(words);
    }

    /// Runs the REPL loop until EOF or `:quit`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        loop {
            match self.read_eval_print() {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => self.print_error(&e),
            }
        }

        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let input = match self.editor.read_line(&self.prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => {
                println!();
                return Ok(true);
            }
            ReadResult::Eof => return Ok(false),
        };

        if input.trim().is_empty() {
            return Ok(true);
        }

        self.editor.add_history(&input);

        if input.trim_start().starts_with(':') {
            return match self.command(input.trim())? {
                Reply::Continue(text) => {
                    if !text.is_empty() {
                        println!("{text}");
                    }
                    Ok(true)
                }
                Reply::Quit => Ok(false),
            };
        }

        match self.eval(&input) {
            Ok(outcome) => println!("{}", self.format_outcome(&outcome)),
            Err(e) => self.print_error(&e),
        }

        Ok(true)
    }

    /// Parses `input` with the current grammar, one token per character.
    ///
    /// # Errors
    ///
    /// Returns the fault that stopped the parse. A failed match is not an
    /// error.
    pub fn eval(&mut self, input: &str) -> Result<ParseOutcome> {
        let mut index = TokenIndex::from_source(input);
        self.tracer
            .trace_parse(&mut self.vm, &self.grammar, &self.start, &mut index)
    }

    /// Reads a file and parses its contents, ignoring trailing line breaks.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the parse faults.
    pub fn eval_file(&mut self, path: &Path) -> Result<ParseOutcome> {
        let source = fs::read_to_string(path).map_err(|e| {
            Error::invalid_input(format!("failed to read {}: {e}", path.display()))
        })?;
        self.eval(source.trim_end_matches(['\n', '\r']))
    }

    /// Runs one `:` command.
    fn command(&mut self, line: &str) -> Result<Reply> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        let arg = words.next();

        let text = match name {
            ":help" => Self::help(),
            ":rules" => self.rules(arg)?,
            ":trace" => {
                if self.tracer.is_enabled() {
                    self.tracer.disable();
                    "tracing off".to_string()
                } else {
                    self.tracer.enable();
                    "tracing on".to_string()
                }
            }
            ":last" => {
                let count = match arg {
                    Some(n) => n
                        .parse()
                        .map_err(|_| Error::invalid_input(format!("not a count: {n}")))?,
                    None => DEFAULT_LAST,
                };
                let buffer = self.tracer.buffer();
                self.tracer.format_records(&buffer.recent(count))
            }
            ":stats" => {
                let stats = self.tracer.stats();
                let mut text = format!(
                    "{} records ({} evicted) over {} parses, {} instructions in the last parse",
                    stats.record_count,
                    stats.evicted,
                    stats.parse_count,
                    self.vm.instructions_executed()
                );
                let mut counts: Vec<_> = stats.event_counts.into_iter().collect();
                counts.sort_unstable();
                for (event, count) in counts {
                    let _ = write!(text, "\n  {event}: {count}");
                }
                text
            }
            ":quit" | ":q" => return Ok(Reply::Quit),
            other => {
                return Err(Error::invalid_input(format!(
                    "unknown command {other} (try :help)"
                )));
            }
        };

        Ok(Reply::Continue(text))
    }

    /// Lists compiled rules, or only those whose name matches `filter`.
    fn rules(&self, filter: Option<&str>) -> Result<String> {
        let Some(filter) = filter else {
            return Ok(self.grammar.disassemble());
        };
        let listing: Vec<String> = self
            .grammar
            .rules()
            .filter(|(_, rule)| rule.name() == filter || rule.qualified_name() == filter)
            .map(|(_, rule)| rule.to_string())
            .collect();
        if listing.is_empty() {
            return Err(Error::invalid_input(format!("no rule named {filter}")));
        }
        Ok(listing.join("\n"))
    }

    fn help() -> String {
        [
            "Type a line to parse it.",
            "  :rules [NAME]  show compiled rules",
            "  :trace         toggle VM tracing",
            "  :last [N]      show the last N trace records",
            "  :stats         show trace buffer statistics",
            "  :quit          exit (or Ctrl+D)",
        ]
        .join("\n")
    }

    /// Formats an outcome for display.
    #[allow(clippy::unused_self)]
    fn format_outcome(&self, outcome: &ParseOutcome) -> String {
        if outcome.is_match() {
            format!("\x1b[1m{outcome}\x1b[0m")
        } else {
            format!("\x1b[33m{outcome}\x1b[0m")
        }
    }

    /// Prints an error to stderr.
    #[allow(clippy::unused_self)]
    fn print_error(&self, error: &Error) {
        eprintln!("\x1b[31mError: {error}\x1b[0m");
        if let Some(context) = &error.context {
            eprintln!("\x1b[31m  {context}\x1b[0m");
        }
    }

    /// Prints the welcome banner.
    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36mBurrow\x1b[0m v{}", env!("CARGO_PKG_VERSION"));
        println!("Type an expression such as =1+2*(3.5-4). :help lists commands, Ctrl+D exits.\n");
        let _ = io::stdout().flush();
    }
}
