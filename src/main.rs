// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// CLI entrypoint for mforge.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::process;

use clap::Parser;
use serde_json::json;

use mforge::assembler::cli::{
    validate_cli, Cli, CliConfig, DiagnosticsSinkConfig, ReportFormat,
};
use mforge::assembler::run_with_cli;
use mforge::core::error::{AsmRunError, AsmRunReport, Diagnostic, Severity};
use mforge::core::module_state::ModuleState;

struct DiagnosticsSink {
    writer: Option<Box<dyn Write>>,
}

impl DiagnosticsSink {
    fn from_config(config: &DiagnosticsSinkConfig) -> io::Result<Self> {
        match config {
            DiagnosticsSinkConfig::Disabled => Ok(Self { writer: None }),
            DiagnosticsSinkConfig::Stderr => Ok(Self {
                writer: Some(Box::new(io::stderr())),
            }),
            DiagnosticsSinkConfig::File { path, append } => {
                let mut opts = OpenOptions::new();
                opts.create(true).write(true);
                if *append {
                    opts.append(true);
                } else {
                    opts.truncate(true);
                }
                let file = opts.open(path)?;
                Ok(Self {
                    writer: Some(Box::new(file)),
                })
            }
        }
    }

    fn emit_line(&mut self, line: &str) {
        if let Some(writer) = &mut self.writer {
            let _ = writeln!(writer, "{line}");
        }
    }

    fn emit_diagnostics(
        &mut self,
        diagnostics: &[Diagnostic],
        source_lines: Option<&[String]>,
        config: &CliConfig,
    ) {
        for diag in diagnostics {
            if config.no_warn && diag.severity() == Severity::Warning {
                continue;
            }
            self.emit_line(&format_diagnostic_line(diag, source_lines, config.format));
        }
    }
}

fn severity_to_str(severity: Severity) -> &'static str {
    match severity {
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

fn format_diagnostic_line(
    diag: &Diagnostic,
    source_lines: Option<&[String]>,
    format: ReportFormat,
) -> String {
    if format == ReportFormat::Json {
        return json!({
            "code": diag.code(),
            "severity": severity_to_str(diag.severity()),
            "message": diag.message(),
            "file": diag.file(),
            "line": diag.line(),
            "col_start": diag.column(),
            "col_end": diag.col_end(),
            "help": diag.help(),
        })
        .to_string();
    }
    diag.format_with_context(source_lines, false)
}

fn config_report_json(state: &ModuleState) -> serde_json::Value {
    json!({
        "schema": "mforge-config-v1",
        "model": state.model.to_string(),
        "language": state.language.to_string(),
        "distance": state.distance.to_string(),
        "ostype": state.ostype.to_string(),
        "offset_size": state.def_ofssize.width_bits(),
        "cpu": state.cpu.level.to_string(),
        "protected": state.cpu.protected,
        "fpu": state.cpu.fpu.to_string(),
        "extensions": state.cpu.extensions.names(),
        "cpu_value": state.cpu_compat,
        "fastcall": state.fastcall.to_string(),
        "format_variant": state.fmtopt.map(|opt| opt.name),
    })
}

fn print_report(report: &AsmRunReport, config: &CliConfig) {
    if config.dump_config {
        match config.format {
            ReportFormat::Json => {
                println!("{}", config_report_json(report.module_state()));
            }
            ReportFormat::Text => {
                for line in report.module_state().report_lines() {
                    println!("{line}");
                }
            }
        }
    }
    if config.dump_symbols {
        let stdout = io::stdout();
        let _ = report.symbols().dump(stdout.lock());
    }
}

fn emit_run_error(err: &AsmRunError, config: &CliConfig, sink: &mut DiagnosticsSink) {
    sink.emit_diagnostics(err.diagnostics(), Some(err.source_lines()), config);
    if config.format == ReportFormat::Json {
        sink.emit_line(
            &json!({
                "severity": "error",
                "message": err.to_string(),
            })
            .to_string(),
        );
    } else {
        sink.emit_line(&format!("ERROR: {err}"));
    }
}

fn main() {
    let cli = Cli::parse();
    let config = match validate_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("ERROR: {err}");
            process::exit(2);
        }
    };
    let mut sink = match DiagnosticsSink::from_config(&config.diagnostics_sink) {
        Ok(sink) => sink,
        Err(err) => {
            eprintln!("ERROR: cannot open diagnostics output: {err}");
            process::exit(2);
        }
    };

    match run_with_cli(&cli) {
        Ok(reports) => {
            let mut failed = false;
            for report in &reports {
                sink.emit_diagnostics(report.diagnostics(), Some(report.source_lines()), &config);
                if report.error_count() > 0 {
                    failed = true;
                    continue;
                }
                if !config.quiet {
                    print_report(report, &config);
                }
            }
            process::exit(if failed { 1 } else { 0 });
        }
        Err(err) => {
            emit_run_error(&err, &config, &mut sink);
            process::exit(1);
        }
    }
}
