// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Error types, diagnostics, and reporting for the directive front end.

use std::fmt;
use std::sync::Arc;

use crate::core::module_state::ModuleState;
use crate::core::symbol_table::SymbolTable;
use crate::core::tokenizer::Span;

/// Line processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LineStatus {
    Ok = 0,
    NothingDone = 1,
    Warning = 2,
    Error = 3,
}

/// Categories of front-end errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsmErrorKind {
    Assembler,
    Cli,
    Directive,
    Io,
}

/// An error with a kind and a formatted message.
#[derive(Debug, Clone)]
pub struct AsmError {
    kind: AsmErrorKind,
    message: String,
}

impl AsmError {
    pub fn new(kind: AsmErrorKind, msg: &str, param: Option<&str>) -> Self {
        Self {
            kind,
            message: format_error(msg, param),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> AsmErrorKind {
        self.kind
    }
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AsmError {}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Directive-level failure taxonomy.
///
/// Each variant carries a stable diagnostic code so machine consumers can
/// match on codes rather than message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveErrorKind {
    MissingMemoryModel,
    ModelAlreadyDeclared,
    SyntaxError,
    InvalidModelParamForFlat,
    CpuModeNotAccepted,
    CpuOptionInvalid,
}

impl DirectiveErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingMemoryModel => "mdl001",
            Self::ModelAlreadyDeclared => "mdl002",
            Self::InvalidModelParamForFlat => "mdl003",
            Self::SyntaxError => "dir001",
            Self::CpuModeNotAccepted => "cpu001",
            Self::CpuOptionInvalid => "cpu002",
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Self::MissingMemoryModel => "Expected memory model",
            Self::ModelAlreadyDeclared => "Memory model declared already",
            Self::SyntaxError => "Syntax error",
            Self::InvalidModelParamForFlat => "Invalid model parameter for flat model",
            Self::CpuModeNotAccepted => {
                "Instruction or register not accepted in current CPU mode"
            }
            Self::CpuOptionInvalid => "CPU option invalid",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::ModelAlreadyDeclared => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// A failed directive, reported at the offending token.
#[derive(Debug, Clone)]
pub struct DirectiveError {
    pub kind: DirectiveErrorKind,
    pub param: Option<String>,
    pub span: Option<Span>,
}

impl DirectiveError {
    pub fn new(kind: DirectiveErrorKind) -> Self {
        Self {
            kind,
            param: None,
            span: None,
        }
    }

    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn into_diagnostic(self, line: u32) -> Diagnostic {
        let error = AsmError::new(
            AsmErrorKind::Directive,
            self.kind.text(),
            self.param.as_deref(),
        );
        let mut diag = Diagnostic::new(line, self.kind.severity(), error).with_code(self.kind.code());
        if let Some(span) = self.span {
            diag = diag
                .with_column(Some(span.col_start))
                .with_col_end(Some(span.col_end));
        }
        diag
    }
}

/// A diagnostic message with location and context.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub(crate) line: u32,
    pub(crate) column: Option<usize>,
    pub(crate) col_end: Option<usize>,
    pub(crate) code: String,
    pub(crate) severity: Severity,
    pub(crate) error: AsmError,
    pub(crate) file: Option<String>,
    pub(crate) help: Vec<String>,
}

impl Diagnostic {
    pub fn new(line: u32, severity: Severity, error: AsmError) -> Self {
        Self {
            line,
            column: None,
            col_end: None,
            code: default_diagnostic_code(error.kind()).to_string(),
            severity,
            error,
            file: None,
            help: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Option<usize>) -> Self {
        self.column = column;
        self
    }

    pub fn with_col_end(mut self, col_end: Option<usize>) -> Self {
        self.col_end = col_end;
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    pub fn format(&self) -> String {
        let sev = match self.severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        format!(
            "{}: {} [{}] - {}",
            self.line,
            sev,
            self.code,
            self.error.message()
        )
    }

    pub fn format_with_context(&self, lines: Option<&[String]>, use_color: bool) -> String {
        let sev = match self.severity {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        };
        let header = match &self.file {
            Some(file) => format!("{file}:{}: {sev} [{}]", self.line, self.code),
            None => format!("{}: {sev} [{}]", self.line, self.code),
        };

        let mut out = String::new();
        out.push_str(&header);
        out.push('\n');

        let line_idx = self.line.saturating_sub(1) as usize;
        match lines {
            Some(lines) if line_idx < lines.len() => {
                let display = highlight_line(&lines[line_idx], self.column, use_color);
                out.push_str(&format!("{:>5} | {}\n", self.line, display));
            }
            _ => {
                out.push_str(&format!("{:>5} | <source unavailable>\n", self.line));
            }
        }

        for help in &self.help {
            out.push_str("help: ");
            out.push_str(help);
            out.push('\n');
        }

        out.push_str(&format!("{sev}: {}", self.error.message()));
        out
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> &str {
        self.code.as_str()
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> Option<usize> {
        self.column
    }

    pub fn col_end(&self) -> Option<usize> {
        self.col_end
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn message(&self) -> &str {
        self.error.message()
    }

    pub fn help(&self) -> &[String] {
        &self.help
    }
}

/// Mark the character at `column` (1-based) in a source line.
pub fn highlight_line(line: &str, column: Option<usize>, use_color: bool) -> String {
    match column {
        Some(col) if col > 0 => {
            let idx = col - 1;
            if idx >= line.len() {
                if use_color {
                    return format!("{line}\x1b[31m^\x1b[0m");
                }
                return format!("{line}^");
            }
            let (head, tail) = line.split_at(idx);
            let ch = tail.chars().next().unwrap_or(' ');
            let rest = &tail[ch.len_utf8()..];
            if use_color {
                format!("{head}\x1b[31m{ch}\x1b[0m{rest}")
            } else {
                format!("{head}{ch}{rest}")
            }
        }
        _ => line.to_string(),
    }
}

/// Report from a completed run.
pub struct AsmRunReport {
    diagnostics: Vec<Diagnostic>,
    source_lines: Arc<Vec<String>>,
    module_state: ModuleState,
    symbols: SymbolTable,
}

impl AsmRunReport {
    pub fn new(
        diagnostics: Vec<Diagnostic>,
        source_lines: impl Into<Arc<Vec<String>>>,
        module_state: ModuleState,
        symbols: SymbolTable,
    ) -> Self {
        Self {
            diagnostics,
            source_lines: source_lines.into(),
            module_state,
            symbols,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }

    pub fn module_state(&self) -> &ModuleState {
        &self.module_state
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}

/// Error from a failed run.
#[derive(Debug)]
pub struct AsmRunError {
    error: AsmError,
    diagnostics: Vec<Diagnostic>,
    source_lines: Arc<Vec<String>>,
}

impl AsmRunError {
    pub fn new(
        error: AsmError,
        diagnostics: Vec<Diagnostic>,
        source_lines: impl Into<Arc<Vec<String>>>,
    ) -> Self {
        Self {
            error,
            diagnostics,
            source_lines: source_lines.into(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn source_lines(&self) -> &[String] {
        &self.source_lines
    }
}

impl fmt::Display for AsmRunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for AsmRunError {}

/// Pass statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassCounts {
    pub lines: u32,
    pub errors: u32,
    pub warnings: u32,
}

impl PassCounts {
    pub fn new() -> Self {
        Self::default()
    }
}

fn default_diagnostic_code(kind: AsmErrorKind) -> &'static str {
    match kind {
        AsmErrorKind::Assembler => "asm001",
        AsmErrorKind::Cli => "asm101",
        AsmErrorKind::Directive => "asm201",
        AsmErrorKind::Io => "asm501",
    }
}

/// Format an error message with an optional parameter.
pub fn format_error(msg: &str, param: Option<&str>) -> String {
    match param {
        Some(p) => format!("{msg}: {p}"),
        None => msg.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tokenizer::Span;

    #[test]
    fn diagnostic_format_includes_line_and_severity() {
        let err = AsmError::new(AsmErrorKind::Assembler, "Bad thing", None);
        let diag = Diagnostic::new(12, Severity::Error, err);
        assert_eq!(diag.format(), "12: ERROR [asm001] - Bad thing");
    }

    #[test]
    fn directive_error_carries_code_span_and_param() {
        let span = Span {
            line: 4,
            col_start: 8,
            col_end: 12,
        };
        let diag = DirectiveError::new(DirectiveErrorKind::SyntaxError)
            .with_param("blah")
            .with_span(span)
            .into_diagnostic(4);
        assert_eq!(diag.code(), "dir001");
        assert_eq!(diag.severity(), Severity::Error);
        assert_eq!(diag.column(), Some(8));
        assert_eq!(diag.message(), "Syntax error: blah");
    }

    #[test]
    fn model_redeclaration_is_a_warning() {
        let diag = DirectiveError::new(DirectiveErrorKind::ModelAlreadyDeclared).into_diagnostic(2);
        assert_eq!(diag.severity(), Severity::Warning);
        assert_eq!(diag.code(), "mdl002");
    }

    #[test]
    fn format_with_context_renders_source_and_help() {
        let err = AsmError::new(AsmErrorKind::Directive, "Expected memory model", None);
        let diag = Diagnostic::new(1, Severity::Error, err)
            .with_file(Some("example.asm".to_string()))
            .with_column(Some(8))
            .with_help("supply one of TINY..HUGE or FLAT");
        let lines = vec![".MODEL".to_string()];

        let rendered = diag.format_with_context(Some(&lines), false);
        assert!(rendered.contains("example.asm:1: ERROR [asm201]"));
        assert!(rendered.contains("    1 | .MODEL^"));
        assert!(rendered.contains("help: supply one of TINY..HUGE or FLAT"));
        assert!(rendered.ends_with("ERROR: Expected memory model"));
    }

    #[test]
    fn highlight_line_marks_column_without_color() {
        assert_eq!(highlight_line(".model", Some(2), false), ".model");
        assert_eq!(highlight_line(".model", Some(99), false), ".model^");
    }
}
