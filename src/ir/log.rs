//! Append-only, ordered record of statements.

use serde::Serialize;

use super::Statement;
use crate::error::{NinjuError, Result};
use crate::ninja_gen::StatementEmitter;

/// Ordered statements of one session.
///
/// The log never reorders, deduplicates or removes entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatementLog {
    statements: Vec<Statement>,
}

impl StatementLog {
    /// Append `statement` to the tail of the log.
    ///
    /// # Errors
    ///
    /// Returns [`NinjuError::NoOutputs`] for a build edge without outputs or
    /// with an empty output path, and for a phony edge without a name; the
    /// log is left unchanged.
    pub fn append(&mut self, statement: Statement) -> Result<()> {
        let missing_output = match &statement {
            Statement::Build(edge) => (edge.outputs.is_empty()
                || edge.outputs.iter().any(String::is_empty))
            .then_some(edge.rule.as_str()),
            Statement::Phony(phony) => phony.name.is_empty().then_some("phony"),
            _ => None,
        };
        if let Some(rule) = missing_output {
            return Err(NinjuError::NoOutputs {
                rule: rule.to_owned(),
            });
        }
        tracing::debug!(
            kind = statement.label(),
            position = self.statements.len(),
            "append statement"
        );
        self.statements.push(statement);
        Ok(())
    }

    /// Statements in append order.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Return `true` when nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Emit every statement front to back, optionally followed by a blank line.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first emitter error.
    pub fn serialize<E: StatementEmitter + ?Sized>(
        &self,
        emitter: &mut E,
        blank_lines: bool,
    ) -> std::io::Result<()> {
        for statement in &self.statements {
            statement.write(emitter)?;
            if blank_lines {
                emitter.newline()?;
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a StatementLog {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::ir::{BuildEdge, DefaultDecl, PhonyEdge, VariableDef};
    use crate::ninja_gen::NinjaWriter;
    use rstest::rstest;

    fn var(name: &str) -> Statement {
        Statement::Variable(VariableDef {
            name: name.into(),
            value: "1".into(),
        })
    }

    fn edge(outputs: &[&str]) -> Statement {
        Statement::Build(BuildEdge {
            outputs: outputs.iter().map(ToString::to_string).collect(),
            rule: "cc".into(),
            ..BuildEdge::default()
        })
    }

    #[rstest]
    #[case(edge(&[]))]
    #[case(edge(&[""]))]
    #[case(edge(&["a.o", ""]))]
    #[case(Statement::Phony(PhonyEdge { name: String::new(), inputs: vec!["a".into()] }))]
    fn rejects_edges_without_outputs(#[case] statement: Statement) {
        let mut log = StatementLog::default();
        let err = log.append(statement).expect_err("missing output must fail");
        assert_eq!(err.kind(), ErrorKind::Generator);
        assert!(log.is_empty());
    }

    #[rstest]
    fn accepts_edge_with_outputs() {
        let mut log = StatementLog::default();
        log.append(edge(&["a.o"])).expect("append edge");
        assert_eq!(log.len(), 1);
    }

    #[rstest]
    #[case(true, "a = 1\n\nb = 1\n\ndefault x\n\n")]
    #[case(false, "a = 1\nb = 1\ndefault x\n")]
    fn serializes_in_append_order(#[case] blank_lines: bool, #[case] expected: &str) {
        let mut log = StatementLog::default();
        log.append(var("a")).expect("append a");
        log.append(var("b")).expect("append b");
        log.append(Statement::Default(DefaultDecl {
            targets: vec!["x".into()],
        }))
        .expect("append default");

        let mut writer = NinjaWriter::new(Vec::new());
        log.serialize(&mut writer, blank_lines).expect("serialize");
        let text = String::from_utf8(writer.into_inner()).expect("utf8");
        assert_eq!(text, expected);
    }
}
