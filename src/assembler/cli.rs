// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Command-line interface parsing and argument validation.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::core::error::{AsmError, AsmErrorKind, AsmRunError};
use crate::output::OutputFormat;

use super::engine::AsmOptions;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const LONG_ABOUT: &str = "Masm-style x86 assembler front end.

Processes .MODEL and CPU/FPU selection directives (.8086 .. .686, .X64, .MMX,
.XMM, ...) over one or more source files and reports the resulting module
configuration: memory model, calling convention, stack distance, default
address width, CPU capability value, and predefined symbols.

Statements other than the supported directives pass through unprocessed; this
tool validates the configuration-bearing part of a module, it does not encode
instructions.";

#[derive(Parser, Debug)]
#[command(
    name = "mforge",
    version = VERSION,
    about = "x86 .MODEL / CPU directive processor",
    long_about = LONG_ABOUT
)]
pub struct Cli {
    #[arg(
        long = "format",
        value_enum,
        default_value_t = ReportFormat::Text,
        long_help = "Select CLI output format. text is default; json emits machine-readable diagnostics and reports."
    )]
    pub format: ReportFormat,
    #[arg(
        short = 'q',
        long = "quiet",
        action = ArgAction::SetTrue,
        long_help = "Suppress report output for successful runs. Diagnostics are still emitted unless --no-error is set."
    )]
    pub quiet: bool,
    #[arg(
        short = 'E',
        long = "error",
        value_name = "FILE",
        long_help = "Write diagnostics to FILE instead of stderr."
    )]
    pub error_file: Option<PathBuf>,
    #[arg(
        long = "error-append",
        action = ArgAction::SetTrue,
        requires = "error_file",
        long_help = "Append diagnostics to --error FILE instead of truncating it."
    )]
    pub error_append: bool,
    #[arg(
        long = "no-error",
        action = ArgAction::SetTrue,
        conflicts_with_all = ["error_file", "error_append"],
        long_help = "Disable all diagnostic output routing."
    )]
    pub no_error: bool,
    #[arg(
        short = 'w',
        long = "no-warn",
        action = ArgAction::SetTrue,
        conflicts_with = "warn_error",
        long_help = "Suppress warning diagnostics."
    )]
    pub no_warn: bool,
    #[arg(
        long = "Werror",
        action = ArgAction::SetTrue,
        conflicts_with = "no_warn",
        long_help = "Treat warnings as errors (non-zero exit status)."
    )]
    pub warn_error: bool,
    #[arg(
        long = "output-format",
        value_enum,
        default_value_t = ObjectFormat::Bin,
        long_help = "Target object format. Drives 64-bit ABI selection (.X64 colon form) and the FLAT/64-bit format-option records."
    )]
    pub output_format: ObjectFormat,
    #[arg(
        long = "pe",
        action = ArgAction::SetTrue,
        long_help = "Select the PE sub-format; the model finalizer then requests PE header generation."
    )]
    pub pe: bool,
    #[arg(
        long = "xmm-arg",
        action = ArgAction::SetTrue,
        long_help = "Allow the optional .XMM vector-width operand (1-4)."
    )]
    pub xmm_arg: bool,
    #[arg(
        long = "dump-config",
        action = ArgAction::SetTrue,
        long_help = "Print the resolved module configuration after a successful run."
    )]
    pub dump_config: bool,
    #[arg(
        long = "dump-symbols",
        action = ArgAction::SetTrue,
        long_help = "Print the predefined symbol table after a successful run."
    )]
    pub dump_symbols: bool,
    #[arg(value_name = "FILE", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
}

/// Global CLI output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Target object format as named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ObjectFormat {
    Bin,
    Coff,
    Elf,
    Macho,
}

impl ObjectFormat {
    pub fn to_output_format(self) -> OutputFormat {
        match self {
            Self::Bin => OutputFormat::Bin,
            Self::Coff => OutputFormat::Coff,
            Self::Elf => OutputFormat::Elf,
            Self::Macho => OutputFormat::MachO,
        }
    }
}

/// Where diagnostics go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticsSinkConfig {
    Disabled,
    Stderr,
    File { path: PathBuf, append: bool },
}

/// Validated CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub input_paths: Vec<PathBuf>,
    pub options: AsmOptions,
    pub format: ReportFormat,
    pub quiet: bool,
    pub no_warn: bool,
    pub treat_warnings_as_errors: bool,
    pub diagnostics_sink: DiagnosticsSinkConfig,
    pub dump_config: bool,
    pub dump_symbols: bool,
}

pub fn validate_cli(cli: &Cli) -> Result<CliConfig, AsmRunError> {
    if cli.inputs.is_empty() {
        return Err(AsmRunError::new(
            AsmError::new(AsmErrorKind::Cli, "No input files", None),
            Vec::new(),
            Vec::new(),
        ));
    }
    if cli.pe && cli.output_format == ObjectFormat::Elf {
        return Err(AsmRunError::new(
            AsmError::new(
                AsmErrorKind::Cli,
                "--pe requires a bin or coff output format",
                None,
            ),
            Vec::new(),
            Vec::new(),
        ));
    }

    let diagnostics_sink = if cli.no_error {
        DiagnosticsSinkConfig::Disabled
    } else if let Some(path) = &cli.error_file {
        DiagnosticsSinkConfig::File {
            path: path.clone(),
            append: cli.error_append,
        }
    } else {
        DiagnosticsSinkConfig::Stderr
    };

    Ok(CliConfig {
        input_paths: cli.inputs.clone(),
        options: AsmOptions {
            output_format: cli.output_format.to_output_format(),
            xmm_arg: cli.xmm_arg,
            pe: cli.pe,
            start_64bit: false,
        },
        format: cli.format,
        quiet: cli.quiet,
        no_warn: cli.no_warn,
        treat_warnings_as_errors: cli.warn_error,
        diagnostics_sink,
        dump_config: cli.dump_config,
        dump_symbols: cli.dump_symbols,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn minimal_invocation_defaults_to_bin_and_text() {
        let cli = Cli::parse_from(["mforge", "boot.asm"]);
        let config = validate_cli(&cli).expect("valid");
        assert_eq!(config.format, ReportFormat::Text);
        assert_eq!(
            config.options.output_format,
            crate::output::OutputFormat::Bin
        );
        assert!(!config.options.xmm_arg);
        assert_eq!(config.diagnostics_sink, DiagnosticsSinkConfig::Stderr);
    }

    #[test]
    fn pe_with_elf_output_is_rejected() {
        let cli = Cli::parse_from(["mforge", "--pe", "--output-format", "elf", "boot.asm"]);
        assert!(validate_cli(&cli).is_err());
    }

    #[test]
    fn error_routing_options_build_the_sink_config() {
        let cli = Cli::parse_from(["mforge", "-E", "diag.log", "--error-append", "boot.asm"]);
        let config = validate_cli(&cli).expect("valid");
        assert_eq!(
            config.diagnostics_sink,
            DiagnosticsSinkConfig::File {
                path: PathBuf::from("diag.log"),
                append: true,
            }
        );

        let cli = Cli::parse_from(["mforge", "--no-error", "boot.asm"]);
        let config = validate_cli(&cli).expect("valid");
        assert_eq!(config.diagnostics_sink, DiagnosticsSinkConfig::Disabled);
    }

    #[test]
    fn werror_and_no_warn_conflict() {
        assert!(Cli::try_parse_from(["mforge", "--Werror", "-w", "boot.asm"]).is_err());
    }
}
