//! Run/pass orchestration.
//!
//! Pass 1 validates directive arguments and commits the module
//! configuration; pass 2 re-derives dependent state without re-validating
//! committed choices. A `.WIN64`/`.SYSV64` rewind rebuilds pass 1 once with
//! the 64-bit sub-format committed up front. When pass 1 reports errors,
//! pass 2 is skipped and the pass-1 diagnostics stand.

use super::*;

/// Run the front end with command-line arguments.
pub(super) fn run() -> Result<Vec<AsmRunReport>, AsmRunError> {
    let cli = Cli::parse();
    run_with_cli(&cli)
}

pub(super) fn run_with_cli(cli: &Cli) -> Result<Vec<AsmRunReport>, AsmRunError> {
    let config = validate_cli(cli)?;

    let mut reports = Vec::new();
    for path in &config.input_paths {
        reports.push(run_one(path, &config)?);
    }

    if config.treat_warnings_as_errors {
        let mut warning_diags = Vec::new();
        let mut source_lines = Vec::new();
        for report in &reports {
            if source_lines.is_empty() {
                source_lines = report.source_lines().to_vec();
            }
            for diag in report.diagnostics() {
                if diag.severity() == Severity::Warning {
                    let mut warning = diag.clone();
                    warning.severity = Severity::Error;
                    warning_diags.push(warning);
                }
            }
        }
        if !warning_diags.is_empty() {
            return Err(AsmRunError::new(
                AsmError::new(
                    AsmErrorKind::Assembler,
                    "Warnings treated as errors (--Werror)",
                    None,
                ),
                warning_diags,
                source_lines,
            ));
        }
    }

    Ok(reports)
}

fn run_one(path: &Path, config: &CliConfig) -> Result<AsmRunReport, AsmRunError> {
    let source = fs::read_to_string(path).map_err(|_| {
        AsmRunError::new(
            AsmError::new(
                AsmErrorKind::Io,
                "Error reading source file",
                Some(&path.display().to_string()),
            ),
            Vec::new(),
            Vec::new(),
        )
    })?;
    let lines: Vec<String> = source.lines().map(str::to_string).collect();
    let file_name = path.display().to_string();

    let mut options = config.options.clone();
    let mut restarted = false;
    let (mut assembler, pass1) = loop {
        let mut assembler = Assembler::new(options.clone());
        assembler.restarted = restarted;
        let counts = run_pass(&mut assembler, &lines, Pass::First);
        if !restarted && assembler.take_rewind() {
            restarted = true;
            options.start_64bit = true;
            continue;
        }
        break (assembler, counts);
    };

    if pass1.errors == 0 {
        run_pass(&mut assembler, &lines, Pass::Later);
    }

    let diagnostics: Vec<Diagnostic> = assembler
        .take_diagnostics()
        .into_iter()
        .map(|diag| diag.with_file(Some(file_name.clone())))
        .collect();
    Ok(AsmRunReport::new(
        diagnostics,
        lines,
        assembler.module_state().clone(),
        std::mem::take(&mut assembler.symbols),
    ))
}

fn run_pass(assembler: &mut Assembler, lines: &[String], pass: Pass) -> PassCounts {
    assembler.start_pass();
    let seen = assembler.diagnostics().len();
    let mut counts = PassCounts::new();
    for (index, src) in lines.iter().enumerate() {
        let _ = assembler.process_line(src, index as u32 + 1, pass);
        counts.lines += 1;
        if assembler.ended() {
            break;
        }
    }
    // A statement can succeed while still emitting a warning (model
    // redeclaration), so the counts come from the diagnostics, not from the
    // per-line status.
    for diag in &assembler.diagnostics()[seen..] {
        match diag.severity() {
            Severity::Error => counts.errors += 1,
            Severity::Warning => counts.warnings += 1,
        }
    }
    counts
}
