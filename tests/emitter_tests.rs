//! Statement log traversal against a recording emitter.

use std::io;

use ninju::ir::{DefaultDecl, PhonyEdge, PoolDef, Statement, StatementLog, VariableDef};
use ninju::ninja_gen::{EdgeDecl, RuleDecl, StatementEmitter};
use rstest::{fixture, rstest};

/// Records each call as a short string; fails once `fail_after` calls were made.
#[derive(Default)]
struct Recorder {
    calls: Vec<String>,
    fail_after: Option<usize>,
}

impl Recorder {
    fn record(&mut self, call: String) -> io::Result<()> {
        if self.fail_after.is_some_and(|limit| self.calls.len() >= limit) {
            return Err(io::Error::other("disk full"));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl StatementEmitter for Recorder {
    fn comment(&mut self, text: &str) -> io::Result<()> {
        self.record(format!("comment {text}"))
    }

    fn variable(&mut self, name: &str, value: &str, indent: usize) -> io::Result<()> {
        self.record(format!("variable {name}={value}@{indent}"))
    }

    fn pool(&mut self, name: &str, depth: u32) -> io::Result<()> {
        self.record(format!("pool {name}:{depth}"))
    }

    fn rule(&mut self, rule: &RuleDecl<'_>) -> io::Result<()> {
        self.record(format!("rule {}", rule.name))
    }

    fn build(&mut self, edge: &EdgeDecl<'_>) -> io::Result<()> {
        self.record(format!("build {}:{}", edge.outputs.join(","), edge.rule))
    }

    fn default(&mut self, targets: &[String]) -> io::Result<()> {
        self.record(format!("default {}", targets.join(",")))
    }

    fn newline(&mut self) -> io::Result<()> {
        self.record("newline".into())
    }
}

#[fixture]
fn log() -> StatementLog {
    let mut log = StatementLog::default();
    for statement in [
        Statement::Variable(VariableDef {
            name: "root".into(),
            value: ".".into(),
        }),
        Statement::Pool(PoolDef {
            name: "pool_2".into(),
            depth: 2,
        }),
        Statement::Phony(PhonyEdge {
            name: "all".into(),
            inputs: vec!["app".into()],
        }),
        Statement::Default(DefaultDecl {
            targets: vec!["all".into()],
        }),
    ] {
        log.append(statement).expect("append statement");
    }
    log
}

#[rstest]
#[case(true, &[
    "variable root=.@0", "newline",
    "pool pool_2:2", "newline",
    "build all:phony", "newline",
    "default all", "newline",
])]
#[case(false, &["variable root=.@0", "pool pool_2:2", "build all:phony", "default all"])]
fn statements_are_emitted_in_order(
    log: StatementLog,
    #[case] blank_lines: bool,
    #[case] expected: &[&str],
) {
    let mut recorder = <Recorder as Default>::default();
    log.serialize(&mut recorder, blank_lines).expect("serialize");
    assert_eq!(recorder.calls, expected);
}

#[rstest]
fn first_emitter_error_stops_serialization(log: StatementLog) {
    let mut recorder = Recorder {
        fail_after: Some(2),
        ..<Recorder as Default>::default()
    };
    let err = log.serialize(&mut recorder, false).expect_err("emitter failure");
    assert_eq!(err.to_string(), "disk full");
    assert_eq!(recorder.calls, ["variable root=.@0", "pool pool_2:2"]);
}
