//! Diagnostic reporting for the front-end.
//!
//! Diagnostics are printed to standard output in a fixed single-line format
//! (`Semantic Error--line: <L>, <message>.`) as they are emitted, and also
//! collected so callers and tests can inspect them afterwards. Recoverable
//! errors return control to the caller; fatal conditions are surfaced as a
//! [`FatalError`] value that propagates with `?` and terminates analysis.

use std::fmt;
use thiserror::Error;

/// Recoverable semantic error codes.
///
/// The names are stable; the rendered message for each code is fixed because
/// downstream harnesses diff the diagnostic stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Redeclaration,
    Undeclared,
    NotUsed,
    ArgumentsNum1,
    ArgumentsNum2,
    Bound,
    ProcMismatch,
    VarValMismatch,
    ConstantVar,
    ExprVar,
    ConstantAssign,
    IndexMismatch,
    FieldMismatch,
    ForwardRedeclare,
    RecordTypeMismatch,
    ArrayTypeMismatch,
    VariableMisuse,
    FuncMismatch,
    TypeMismatch,
    NotType,
    ArrayDimMismatch,
    MultiMain,
}

/// What the reporter does after printing a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Print and return to the caller.
    Continue,
    /// Print and terminate analysis.
    Abort,
}

/// Conditions that terminate analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FatalError {
    /// The scope stack exceeded its capacity.
    #[error("scope stack overflow")]
    StackOverflow,
    /// The symbol table exceeded its capacity.
    #[error("symbol table overflow")]
    SymbolTableOverflow,
    /// The shared attribute pool exceeded its capacity.
    #[error("attribute pool overflow")]
    AttributeOverflow,
    /// A member or index access was applied to a function or procedure.
    #[error("members of routine `{0}` cannot be accessed")]
    RoutineMemberAccess(String),
}

/// A single rendered diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: u32,
    pub message: String,
}

/// Collects and prints diagnostics.
///
/// The current source line is tracked explicitly; the parser updates it as it
/// consumes tokens so later analysis errors point at the construct's line.
#[derive(Debug, Default)]
pub struct Reporter {
    line: u32,
    diagnostics: Vec<Diagnostic>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_line(&mut self, line: u32) {
        self.line = line;
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// Reports a recoverable error and returns to the caller.
    ///
    /// `name` is the identifier the diagnostic is about, already resolved to
    /// its spelling; `seq` is a parameter position for the argument-related
    /// codes, rendered as an English ordinal.
    pub fn report(&mut self, code: ErrorCode, name: Option<&str>, seq: Option<i32>) {
        let message = render(code, name.unwrap_or(""), seq);
        self.emit(Severity::Continue, message);
    }

    /// Prints the diagnostic for a fatal condition and hands the error back
    /// so the caller can propagate it.
    pub fn fatal(&mut self, error: FatalError) -> FatalError {
        match &error {
            FatalError::StackOverflow => self.emit(Severity::Abort, "stack overflow.".into()),
            FatalError::SymbolTableOverflow => {
                self.emit(Severity::Abort, "symbol table overflow.".into())
            }
            FatalError::AttributeOverflow => {
                self.emit(Severity::Abort, "attribute array overflowed.".into())
            }
            FatalError::RoutineMemberAccess(name) => {
                // Printed bare, without the usual line prefix.
                let message = format!("method {} members cannot be accessed", name);
                println!("{}", message);
                self.diagnostics.push(Diagnostic {
                    severity: Severity::Abort,
                    line: self.line,
                    message,
                });
            }
        }
        error
    }

    /// Prints an internal-consistency note as a bare line, outside the
    /// `Semantic Error` format, and records it with the other diagnostics.
    pub fn note(&mut self, message: String) {
        println!("{}", message);
        self.diagnostics.push(Diagnostic {
            severity: Severity::Continue,
            line: self.line,
            message,
        });
    }

    fn emit(&mut self, severity: Severity, message: String) {
        println!("Semantic Error--line: {}, {}", self.line, message);
        self.diagnostics.push(Diagnostic {
            severity,
            line: self.line,
            message,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Renders the message body for a recoverable code.
fn render(code: ErrorCode, name: &str, seq: Option<i32>) -> String {
    match code {
        ErrorCode::Redeclaration => format!("symbol {}: redeclared.", name),
        ErrorCode::Undeclared => format!("symbol {}: undeclared.", name),
        ErrorCode::NotUsed => format!("symbol {}: declared but never used.", name),
        ErrorCode::ArgumentsNum1 => format!(
            "routine {}: argument number in definition is different from the previous forward declaration.",
            name
        ),
        ErrorCode::ArgumentsNum2 => format!(
            "routine {}: argument number is different from the previous declaration.",
            name
        ),
        ErrorCode::Bound => format!(
            "symbol {}: not declared as a constant, can't be used as subrange bound.",
            name
        ),
        ErrorCode::ProcMismatch => format!("symbol {}: can't act as a procedure call.", name),
        ErrorCode::FuncMismatch => format!("symbol {}: can't act as a function call.", name),
        ErrorCode::VarValMismatch => format!(
            "routine {}: reference/value type of the {} parameter is different from the previous forward declaration.",
            name,
            seq_str(seq.unwrap_or(0))
        ),
        ErrorCode::ConstantVar => format!(
            "routine {}: the {} parameter is a reference argument, can't be a constant.",
            name,
            seq_str(seq.unwrap_or(0))
        ),
        ErrorCode::ExprVar => format!(
            "routine {}: reference argument of the {} parameter can't be an expression.",
            name,
            seq_str(seq.unwrap_or(0))
        ),
        ErrorCode::ConstantAssign => format!(
            "symbol {}: declared as a constant, can't be assigned a new value.",
            name
        ),
        ErrorCode::ArrayTypeMismatch => match seq {
            None | Some(0) => format!("symbol {}: isn't defined as an array.", name),
            Some(s) => format!(
                "symbol {}: the {} index isn't defined as an array.",
                name,
                seq_str(s)
            ),
        },
        ErrorCode::ArrayDimMismatch => {
            format!("symbol {}: inappropriate usage of array element.", name)
        }
        ErrorCode::RecordTypeMismatch => {
            format!("symbol {}: illegal usage of a field name.", name)
        }
        ErrorCode::IndexMismatch => {
            format!("symbol {}: has incorrect number of dimensions.", name)
        }
        ErrorCode::FieldMismatch => format!("symbol {}: is an undeclared field name.", name),
        ErrorCode::VariableMisuse => format!("symbol {}: can't be used as a variable.", name),
        ErrorCode::NotType => format!("symbol {}: is not declared as a type.", name),
        ErrorCode::TypeMismatch => format!("symbol {}: incorrect type usage.", name),
        ErrorCode::MultiMain => "main() method already declared.".to_string(),
        ErrorCode::ForwardRedeclare => format!("routine {}: forward redeclaration.", name),
    }
}

/// English ordinal for a parameter position: `0th`, `1st`, `2nd`, `3rd`,
/// then `{n}th`.
pub fn seq_str(seq: i32) -> SeqOrdinal {
    SeqOrdinal(seq)
}

pub struct SeqOrdinal(i32);

impl fmt::Display for SeqOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "0th"),
            1 => write!(f, "1st"),
            2 => write!(f, "2nd"),
            3 => write!(f, "3rd"),
            n => write!(f, "{}th", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals() {
        assert_eq!(seq_str(0).to_string(), "0th");
        assert_eq!(seq_str(1).to_string(), "1st");
        assert_eq!(seq_str(2).to_string(), "2nd");
        assert_eq!(seq_str(3).to_string(), "3rd");
        assert_eq!(seq_str(11).to_string(), "11th");
    }

    #[test]
    fn report_records_line_and_message() {
        let mut reporter = Reporter::new();
        reporter.set_line(7);
        reporter.report(ErrorCode::Undeclared, Some("x"), None);
        let diags = reporter.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].line, 7);
        assert_eq!(diags[0].message, "symbol x: undeclared.");
        assert_eq!(diags[0].severity, Severity::Continue);
    }

    #[test]
    fn fatal_returns_the_error() {
        let mut reporter = Reporter::new();
        let err = reporter.fatal(FatalError::SymbolTableOverflow);
        assert_eq!(err, FatalError::SymbolTableOverflow);
        assert_eq!(reporter.diagnostics()[0].severity, Severity::Abort);
    }
}
