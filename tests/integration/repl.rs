//! Scripted REPL sessions.

use std::collections::VecDeque;

use burrow::debug::{Tracer, TracerConfig};
use burrow::foundation::Result;
use burrow::language::NamedParser;
use burrow::language::compiler::{end, literal, optional, rule};
use burrow::language::{Grammar, Polarity};
use burrow::runtime::{LineEditor, ReadResult, Repl};

/// Replays a fixed script of editor results, then reports EOF.
#[derive(Default)]
struct ScriptedEditor {
    script: VecDeque<ReadResult>,
    history: Vec<String>,
}

impl ScriptedEditor {
    fn lines(lines: &[&str]) -> Self {
        Self {
            script: lines
                .iter()
                .map(|line| ReadResult::Line((*line).to_string()))
                .collect(),
            ..Self::default()
        }
    }
}

impl LineEditor for ScriptedEditor {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
        Ok(self.script.pop_front().unwrap_or(ReadResult::Eof))
    }

    fn add_history(&mut self, line: &str) {
        self.history.push(line.to_string());
    }

    fn set_completions(&mut self, _words: Vec<String>) {}
}

fn quiet(editor: ScriptedEditor) -> Repl<ScriptedEditor> {
    Repl::with_editor(editor).without_banner()
}

#[test]
fn only_parses_run_while_tracing_are_recorded() {
    let mut repl = quiet(ScriptedEditor::lines(&["=1", ":trace", "=2", "=3", ":trace", "=4"]));
    repl.run().unwrap();

    let tracer = repl.tracer();
    assert!(!tracer.is_enabled());
    assert_eq!(tracer.current_parse(), 4);
    assert_eq!(tracer.buffer().parses(), vec![2, 3]);
}

#[test]
fn bad_commands_and_interrupts_do_not_end_the_session() {
    let mut editor = ScriptedEditor::lines(&[":bogus", ":last x", "=1"]);
    editor.script.push_front(ReadResult::Interrupted);
    editor.script.extend([ReadResult::Line(":quit".into()), ReadResult::Line("=2".into())]);

    let mut repl = quiet(editor).with_tracer(Tracer::new(TracerConfig::new().enabled()));
    repl.run().unwrap();

    assert_eq!(repl.tracer().current_parse(), 1);
}

#[test]
fn a_loaded_grammar_replaces_arithmetic() {
    let grammar = Grammar::single(NamedParser::new(
        "greeting",
        vec![rule("Hi", [literal("h"), literal("i"), optional(literal("!")), end()])],
    ));
    let mut repl = quiet(ScriptedEditor::default()).with_grammar(grammar, "Hi");

    assert_eq!(repl.grammar().parsers()[0].name(), "greeting");
    assert_eq!(repl.eval("hi!").unwrap().polarity, Polarity::Positive);
    assert_eq!(repl.eval("=1").unwrap().polarity, Polarity::Negative);
    assert!(repl.eval("hi").unwrap().is_match());
}
