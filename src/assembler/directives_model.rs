// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! `.MODEL` directive: argument parsing, validation, and the model finalizer
//! that derives default widths, segment layout, and predefined symbols.

use super::*;

impl Assembler {
    /// Handle `.MODEL <model> [,<language>][,<NEARSTACK|FARSTACK>][,<OS_DOS|OS_OS2>]`.
    ///
    /// Arguments are parsed and validated into locals first; nothing is
    /// written to the module configuration unless the whole statement is
    /// acceptable. The one deliberate exception is the redeclaration warning,
    /// which is emitted as soon as the second model keyword resolves.
    pub(crate) fn model_directive(&mut self, tokens: &[Token], pass: Pass) -> LineStatus {
        // After pass one the arguments are already committed; only the
        // derived state needs refreshing. The language is not re-read here
        // since OPTION LANGUAGE may have changed it in between.
        if pass != Pass::First && self.module.model_set() {
            self.set_model(pass);
            return LineStatus::Ok;
        }

        let mut i = 1;
        if tokens[i].is_end() {
            return self.directive_failure(
                DirectiveError::new(DirectiveErrorKind::MissingMemoryModel)
                    .with_span(tokens[i].span),
            );
        }
        let model = match tokens[i].ident().and_then(|name| find_token(name, &MODEL_TOKENS)) {
            Some(index) => MODEL_VALUES[index],
            None => {
                return self.directive_failure(
                    DirectiveError::new(DirectiveErrorKind::SyntaxError)
                        .with_param(tokens[i].text())
                        .with_span(tokens[i].span),
                );
            }
        };
        if self.module.model_set() {
            self.directive_warning(
                DirectiveError::new(DirectiveErrorKind::ModelAlreadyDeclared)
                    .with_span(tokens[i].span),
            );
        }
        i += 1;

        // Comma-separated attributes; each category at most once. A repeated
        // category ends attribute parsing at that keyword.
        let mut language = None;
        let mut distance = None;
        let mut ostype = None;
        while tokens[i].kind == TokenKind::Comma {
            let comma = &tokens[i];
            i += 1;
            if tokens[i].is_end() {
                return self.directive_failure(
                    DirectiveError::new(DirectiveErrorKind::SyntaxError)
                        .with_param(comma.text())
                        .with_span(comma.span),
                );
            }
            if tokens[i].kind == TokenKind::Comma {
                continue;
            }
            if let Some(lang) = tokens[i].ident().and_then(language_for) {
                i += 1;
                if language.is_some() {
                    break;
                }
                language = Some(lang);
            } else if let Some(index) = tokens[i]
                .ident()
                .and_then(|name| find_token(name, &MODEL_ATTR_TOKENS))
            {
                let span = tokens[i].span;
                i += 1;
                match MODEL_ATTR_VALUES[index] {
                    ModelAttr::Stack(value) => {
                        if model == MemoryModel::Flat {
                            return self.directive_failure(
                                DirectiveError::new(DirectiveErrorKind::InvalidModelParamForFlat)
                                    .with_span(span),
                            );
                        }
                        if distance.is_some() {
                            break;
                        }
                        distance = Some(value);
                    }
                    ModelAttr::Os(value) => {
                        if model == MemoryModel::Flat {
                            return self.directive_failure(
                                DirectiveError::new(DirectiveErrorKind::InvalidModelParamForFlat)
                                    .with_span(span),
                            );
                        }
                        if ostype.is_some() {
                            break;
                        }
                        ostype = Some(value);
                    }
                }
            } else {
                break;
            }
        }

        if !tokens[i].is_end() {
            return self.directive_failure(
                DirectiveError::new(DirectiveErrorKind::SyntaxError)
                    .with_param(tokens[i].text())
                    .with_span(tokens[i].span),
            );
        }

        if model == MemoryModel::Flat && self.module.cpu.level < CpuLevel::Cpu386 {
            return self.directive_failure(DirectiveError::new(
                DirectiveErrorKind::CpuModeNotAccepted,
            ));
        }

        self.module.model = model;
        if let Some(lang) = language {
            self.module.language = lang;
        }
        if let Some(value) = distance {
            self.module.distance = value;
        }
        if let Some(value) = ostype {
            self.module.ostype = value;
        }
        if model == MemoryModel::Flat && self.module.cpu.level >= CpuLevel::X64 {
            if let Some(fmtopt) = format_options_64(self.options.output_format) {
                self.module.fmtopt = Some(fmtopt);
            }
        }
        self.segments.set_model_default_seg_names(model);
        self.set_model(pass);
        LineStatus::Ok
    }

    /// Finalize the committed model: derive the default offset size, the
    /// fast-call ABI, the FLAT group, the simplified segment layout, and (on
    /// the first pass only) the predefined symbols.
    pub(crate) fn set_model(&mut self, pass: Pass) {
        if self.module.model == MemoryModel::Flat {
            self.module.offset_type = OffsetType::Flat;
            let width = if self.module.cpu.level >= CpuLevel::X64 {
                OffsetSize::Use64
            } else {
                OffsetSize::Use32
            };
            self.set_default_ofssize(width);
            // The fast-call keyword alone is ambiguous across platforms; on a
            // 64-bit FLAT module the output format disambiguates it.
            if self.module.cpu.level >= CpuLevel::X64 {
                if self.options.output_format.is_sysv()
                    && matches!(
                        self.module.language,
                        Language::Sysvcall | Language::Regcall | Language::Syscall
                    )
                {
                    self.module.fastcall = FastcallAbi::SysV64;
                }
                if self.options.output_format == OutputFormat::Coff
                    && matches!(
                        self.module.language,
                        Language::Fastcall | Language::Vectorcall | Language::Regcall
                    )
                {
                    self.module.fastcall = FastcallAbi::Win64;
                }
            }
            // The group records its width at definition time, so the default
            // offset size must be final here.
            self.segments.define_flat_group(self.module.def_ofssize);
        } else {
            self.module.offset_type = OffsetType::Group;
        }

        self.segments
            .sim_segm_init(self.module.model, self.module.distance, &mut self.queue);
        self.run_line_queue(pass);

        if pass != Pass::First {
            return;
        }

        let code_size = if self.module.model.far_code() { 1 } else { 0 };
        self.symbols.add_predefined_constant("@CodeSize", code_size);
        let code_name = self.segments.sim_seg_name(SimSlot::Code).to_string();
        self.symbols.add_predefined_text("@code", &code_name);

        self.symbols
            .add_predefined_constant("@DataSize", self.module.model.data_size());
        let data_text = if self.module.model == MemoryModel::Flat {
            "FLAT"
        } else {
            "DGROUP"
        };
        self.symbols.add_predefined_text("@data", data_text);
        let stack_text = if self.module.distance == Distance::Far {
            "STACK"
        } else {
            data_text
        };
        self.symbols.add_predefined_text("@stack", stack_text);

        self.symbols
            .add_predefined_constant("@Model", self.module.model.value());
        self.symbols
            .add_predefined_constant("@Interface", self.module.language.value());

        if self.module.def_ofssize == OffsetSize::Use64 {
            self.symbols.add_predefined_constant("@ReservedStack", 0);
        }

        if self.module.sub_format == SubFormat::Pe
            || (self.module.sub_format == SubFormat::Bit64
                && self.options.output_format == OutputFormat::Bin)
        {
            self.output.create_pe_header();
        }
    }
}
