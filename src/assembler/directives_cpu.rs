// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! CPU/FPU directives and the capability-state merger.
//!
//! `.8086` .. `.686P` reset the extension set through the merger's defaulting
//! rules; `.MMX`/`.K3D`/`.XMM` replace only the extension field and never
//! raise the CPU level. `.WIN64`/`.SYSV64` switch the 64-bit sub-format and
//! may carry an inline ABI flags operand after a colon.

use super::*;

impl Assembler {
    /// Merge a capability request into the module's CPU state.
    ///
    /// Never fails; directive-level validation happens before this is called.
    /// Also re-derives the Masm-compatible `@Cpu` value and, while no memory
    /// model is set, the default offset size.
    pub fn set_cpu(&mut self, request: CpuRequest) {
        let cpu = &mut self.module.cpu;
        if let Some((level, protected)) = request.level {
            cpu.level = level;
            cpu.protected = protected;
            // Re-derive the default FPU from the new level, unless the
            // request pins the FPU explicitly or .NO87 is in effect.
            if request.fpu.is_none() && cpu.fpu != FpuMode::NoFpu {
                cpu.fpu = default_fpu_for(cpu.level);
            }
        }
        if let Some(fpu) = request.fpu {
            cpu.fpu = match fpu {
                FpuRequest::Disable => FpuMode::NoFpu,
                FpuRequest::Level(mode) => mode,
            };
        }
        // The 64-bit baseline ABI guarantees every extension.
        if matches!(request.level, Some((CpuLevel::X64, _))) {
            cpu.extensions = ExtensionSet::all();
        }
        if let Some(set) = request.extensions {
            cpu.extensions = set;
        }

        self.module.cpu_compat = masm_compat(&self.module.cpu);

        if !self.module.model_set() {
            let width = if self.module.cpu.level >= CpuLevel::X64 {
                OffsetSize::Use64
            } else if self.module.cpu.level >= CpuLevel::Cpu386 {
                OffsetSize::Use32
            } else {
                OffsetSize::Use16
            };
            self.set_default_ofssize(width);
        }

        let _ = self
            .symbols
            .create_variable("@Cpu", u32::from(self.module.cpu_compat));
    }

    /// Handle one CPU-family directive statement.
    pub(crate) fn cpu_directive(&mut self, kind: CpuDirectiveKind, tokens: &[Token]) -> LineStatus {
        match kind {
            CpuDirectiveKind::Win64 => {
                if !self.restarted && self.module.sub_format != SubFormat::Bit64 {
                    self.request_rewind();
                }
                if tokens[1].kind == TokenKind::Colon {
                    return self.set_win64(tokens, 2);
                }
                LineStatus::Ok
            }
            CpuDirectiveKind::Sysv64 => {
                if !self.restarted && self.module.sub_format != SubFormat::Bit64 {
                    self.request_rewind();
                }
                if tokens[1].kind == TokenKind::Colon {
                    return self.set_sysv64(tokens, 2);
                }
                LineStatus::Ok
            }
            CpuDirectiveKind::X64 => {
                if tokens[1].kind == TokenKind::Colon {
                    let status = if self.options.output_format.is_sysv() {
                        self.set_sysv64(tokens, 2)
                    } else {
                        self.set_win64(tokens, 2)
                    };
                    if status != LineStatus::Ok {
                        return status;
                    }
                } else if !tokens[1].is_end() {
                    return self.trailing_token_failure(&tokens[1]);
                }
                self.set_cpu(CpuRequest::level(CpuLevel::X64, true));
                LineStatus::Ok
            }
            CpuDirectiveKind::Xmm => {
                let mut request =
                    CpuRequest::extensions(ExtensionSet::MMX | ExtensionSet::sse_cumulative(4));
                let mut i = 1;
                if self.options.xmm_arg && !tokens[1].is_end() {
                    let operand = &tokens[1];
                    let value = match &operand.kind {
                        TokenKind::Number(num) => num.value(),
                        TokenKind::Identifier(_) => None,
                        _ => {
                            return self.trailing_token_failure(operand);
                        }
                    };
                    // Out-of-range or non-constant widths clamp to the full set.
                    let width = match value {
                        Some(v) if (1..=4).contains(&v) => v,
                        _ => 4,
                    };
                    if self.module.cpu.level < CpuLevel::Cpu686 {
                        return self.directive_failure(
                            DirectiveError::new(DirectiveErrorKind::CpuOptionInvalid)
                                .with_param(operand.text())
                                .with_span(operand.span),
                        );
                    }
                    request = CpuRequest::extensions(ExtensionSet::sse_cumulative(width));
                    i = 2;
                }
                if !tokens[i].is_end() {
                    return self.trailing_token_failure(&tokens[i]);
                }
                self.set_cpu(request);
                LineStatus::Ok
            }
            CpuDirectiveKind::Level(level, protected) => {
                if !tokens[1].is_end() {
                    return self.trailing_token_failure(&tokens[1]);
                }
                self.set_cpu(CpuRequest::level(level, protected));
                LineStatus::Ok
            }
            CpuDirectiveKind::Fpu(mode) => {
                if !tokens[1].is_end() {
                    return self.trailing_token_failure(&tokens[1]);
                }
                self.set_cpu(CpuRequest::fpu(FpuRequest::Level(mode)));
                LineStatus::Ok
            }
            CpuDirectiveKind::No87 => {
                if !tokens[1].is_end() {
                    return self.trailing_token_failure(&tokens[1]);
                }
                self.set_cpu(CpuRequest::fpu(FpuRequest::Disable));
                LineStatus::Ok
            }
            CpuDirectiveKind::Extensions(set) => {
                if !tokens[1].is_end() {
                    return self.trailing_token_failure(&tokens[1]);
                }
                self.set_cpu(CpuRequest::extensions(set));
                LineStatus::Ok
            }
        }
    }

    /// `.WIN64 : <flags>` and the COFF side of `.X64 : <flags>`.
    pub(crate) fn set_win64(&mut self, tokens: &[Token], i: usize) -> LineStatus {
        match self.parse_abi_flags(tokens, i) {
            Ok(flags) => {
                self.module.win64_flags = flags;
                self.module.fastcall = FastcallAbi::Win64;
                LineStatus::Ok
            }
            Err(err) => self.directive_failure(err),
        }
    }

    /// `.SYSV64 : <flags>` and the ELF/Mach-O side of `.X64 : <flags>`.
    pub(crate) fn set_sysv64(&mut self, tokens: &[Token], i: usize) -> LineStatus {
        match self.parse_abi_flags(tokens, i) {
            Ok(flags) => {
                self.module.win64_flags = flags;
                self.module.fastcall = FastcallAbi::SysV64;
                LineStatus::Ok
            }
            Err(err) => self.directive_failure(err),
        }
    }

    // ABI flags are a constant 0..=7: SAVEREGPARAMS=1, AUTOSTACKSP=2,
    // STACKALIGN16=4.
    fn parse_abi_flags(&self, tokens: &[Token], i: usize) -> Result<u8, DirectiveError> {
        let operand = &tokens[i];
        let value = match &operand.kind {
            TokenKind::Number(num) => num.value(),
            _ => None,
        };
        match value {
            Some(v) if v <= 7 => {
                if !tokens[i + 1].is_end() {
                    return Err(DirectiveError::new(DirectiveErrorKind::SyntaxError)
                        .with_param(tokens[i + 1].text())
                        .with_span(tokens[i + 1].span));
                }
                Ok(v as u8)
            }
            _ => Err(DirectiveError::new(DirectiveErrorKind::CpuOptionInvalid)
                .with_param(operand.text())
                .with_span(operand.span)),
        }
    }

    pub(crate) fn trailing_token_failure(&mut self, token: &Token) -> LineStatus {
        self.directive_failure(
            DirectiveError::new(DirectiveErrorKind::SyntaxError)
                .with_param(token.text())
                .with_span(token.span),
        )
    }
}
