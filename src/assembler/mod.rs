// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Directive front end - main entry point.
//!
//! This module ties the CPU-agnostic core to the x86 capability model, the
//! segment manager, and the two-pass driver.

pub mod cli;
mod directives_cpu;
mod directives_model;
mod directives_option;
mod engine;
mod passes;

use std::fs;
use std::path::Path;

use clap::Parser;

use crate::core::error::{
    AsmError, AsmErrorKind, AsmRunError, AsmRunReport, Diagnostic, DirectiveError,
    DirectiveErrorKind, LineStatus, PassCounts, Severity,
};
use crate::core::keywords::{
    cpu_directive_for, find_token, language_for, CpuDirectiveKind, ModelAttr, MODEL_ATTR_TOKENS,
    MODEL_ATTR_VALUES, MODEL_TOKENS, MODEL_VALUES,
};
use crate::core::lqueue::LineQueue;
use crate::core::module_state::{
    Distance, FastcallAbi, Language, MemoryModel, ModuleState, OffsetSize, OffsetType, Pass,
};
use crate::core::symbol_table::SymbolTable;
use crate::core::tokenizer::{Token, TokenKind, Tokenizer};
use crate::output::{format_options_64, OutputFormat, OutputState, SubFormat};
use crate::segment::{SegmentManager, SimSlot};
use crate::x86::{
    default_fpu_for, masm_compat, CpuLevel, CpuRequest, ExtensionSet, FpuMode, FpuRequest,
};

use cli::{validate_cli, Cli, CliConfig};

pub use crate::core::error::{AsmRunError as RunError, AsmRunReport as RunReport};
pub use cli::VERSION;
pub use engine::{AsmOptions, Assembler};

/// Run the front end with command-line arguments.
pub fn run() -> Result<Vec<AsmRunReport>, AsmRunError> {
    passes::run()
}

pub fn run_with_cli(cli: &Cli) -> Result<Vec<AsmRunReport>, AsmRunError> {
    passes::run_with_cli(cli)
}
