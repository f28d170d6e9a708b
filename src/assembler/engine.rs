// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

use super::*;

/// Driver-level options derived from the CLI.
#[derive(Debug, Clone, Default)]
pub struct AsmOptions {
    pub output_format: OutputFormat,
    /// Allow the optional `.XMM` vector-width operand.
    pub xmm_arg: bool,
    /// Start in the PE sub-format.
    pub pe: bool,
    /// Start committed to the 64-bit sub-format (set by the rewind path).
    pub start_64bit: bool,
}

/// The front-end state machine: owns the module configuration and its
/// collaborators, and dispatches one statement at a time.
pub struct Assembler {
    pub(crate) module: ModuleState,
    pub(crate) symbols: SymbolTable,
    pub(crate) segments: SegmentManager,
    pub(crate) queue: LineQueue,
    pub(crate) options: AsmOptions,
    pub(crate) output: OutputState,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) cur_line: u32,
    /// Pass-1 state was already rebuilt once by a rewind; don't rewind again.
    pub(crate) restarted: bool,
    rewind_requested: bool,
    ended: bool,
}

impl Assembler {
    pub fn new(options: AsmOptions) -> Self {
        let mut module = ModuleState::new();
        if options.start_64bit {
            module.sub_format = SubFormat::Bit64;
        } else if options.pe {
            module.sub_format = SubFormat::Pe;
        }
        let mut assembler = Self {
            module,
            symbols: SymbolTable::new(),
            segments: SegmentManager::new(),
            queue: LineQueue::new(),
            options,
            output: OutputState::new(),
            diagnostics: Vec::new(),
            cur_line: 0,
            restarted: false,
            rewind_requested: false,
            ended: false,
        };
        // @Cpu exists from the start, before any directive runs.
        assembler.set_cpu(CpuRequest::default());
        assembler
    }

    pub fn module_state(&self) -> &ModuleState {
        &self.module
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn segments(&self) -> &SegmentManager {
        &self.segments
    }

    pub fn output(&self) -> &OutputState {
        &self.output
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn clear_diagnostics(&mut self) {
        self.diagnostics.clear();
    }

    pub fn ended(&self) -> bool {
        self.ended
    }

    /// Reset per-pass state. Defined segments and the module configuration
    /// survive across passes; the open-segment stack and the END marker do
    /// not.
    pub fn start_pass(&mut self) {
        self.ended = false;
        self.segments.reset_open();
    }

    /// Process one source statement.
    pub fn process_line(&mut self, src: &str, line_num: u32, pass: Pass) -> LineStatus {
        self.cur_line = line_num;
        let tokens = Tokenizer::new(src, line_num).tokenize();
        let first = &tokens[0];
        let Some(name) = first.ident() else {
            return LineStatus::NothingDone;
        };
        let name = name.to_string();

        if name.eq_ignore_ascii_case(".MODEL") {
            return self.model_directive(&tokens, pass);
        }
        if let Some(kind) = cpu_directive_for(&name) {
            return self.cpu_directive(kind, &tokens);
        }
        if name.eq_ignore_ascii_case("OPTION") {
            return self.option_directive(&tokens);
        }
        if name.eq_ignore_ascii_case("END") {
            self.ended = true;
            return LineStatus::Ok;
        }
        if let Some(second) = tokens.get(1).and_then(Token::ident) {
            if second.eq_ignore_ascii_case("SEGMENT") {
                self.segments.open(&name);
                return LineStatus::Ok;
            }
            if second.eq_ignore_ascii_case("ENDS") {
                return match self.segments.close(&name) {
                    Ok(()) => LineStatus::Ok,
                    Err(message) => self.directive_failure(
                        DirectiveError::new(DirectiveErrorKind::SyntaxError)
                            .with_param(message)
                            .with_span(tokens[0].span),
                    ),
                };
            }
        }

        LineStatus::NothingDone
    }

    /// Run every queued generated line through normal statement dispatch.
    pub(crate) fn run_line_queue(&mut self, pass: Pass) {
        let line_num = self.cur_line;
        while let Some(line) = self.queue.pop() {
            let _ = self.process_line(&line, line_num, pass);
        }
    }

    /// Set the module-wide default offset size, respecting segment scope:
    /// inside an open segment the global default stays untouched.
    pub(crate) fn set_default_ofssize(&mut self, size: OffsetSize) {
        if self.segments.current().is_none() {
            self.module.def_ofssize = size;
        }
    }

    pub(crate) fn directive_failure(&mut self, err: DirectiveError) -> LineStatus {
        let severity = err.kind.severity();
        self.diagnostics.push(err.into_diagnostic(self.cur_line));
        match severity {
            Severity::Warning => LineStatus::Warning,
            Severity::Error => LineStatus::Error,
        }
    }

    pub(crate) fn directive_warning(&mut self, err: DirectiveError) {
        self.diagnostics.push(err.into_diagnostic(self.cur_line));
    }

    /// Abandon the current pass-1 state and re-enter with the 64-bit
    /// sub-format committed. The driver rebuilds the assembler once.
    pub(crate) fn request_rewind(&mut self) {
        self.module.sub_format = SubFormat::Bit64;
        self.rewind_requested = true;
    }

    pub fn take_rewind(&mut self) -> bool {
        std::mem::take(&mut self.rewind_requested)
    }
}
