// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Keyword tables and the token matcher.
//!
//! `find_token` is the single keyword recognizer for this front end: every
//! directive handler resolves its keywords through it, against ordered tables
//! whose index order matches a parallel value table. Handlers never compare
//! keyword strings directly.

use crate::core::module_state::{Distance, Language, MemoryModel, OsType};
use crate::x86::{CpuLevel, ExtensionSet, FpuMode};

/// Case-insensitive linear search; returns the index of the first match.
pub fn find_token(token: &str, table: &[&str]) -> Option<usize> {
    table
        .iter()
        .position(|entry| entry.eq_ignore_ascii_case(token))
}

/// Memory-model keywords. Index + 1 is the model's numeric value.
pub const MODEL_TOKENS: [&str; 7] = [
    "TINY", "SMALL", "COMPACT", "MEDIUM", "LARGE", "HUGE", "FLAT",
];

/// Values parallel to [`MODEL_TOKENS`].
pub const MODEL_VALUES: [MemoryModel; 7] = [
    MemoryModel::Tiny,
    MemoryModel::Small,
    MemoryModel::Compact,
    MemoryModel::Medium,
    MemoryModel::Large,
    MemoryModel::Huge,
    MemoryModel::Flat,
];

/// The category a model attribute keyword settles; at most one keyword per
/// category is accepted in a single `.MODEL` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelAttr {
    Stack(Distance),
    Os(OsType),
}

pub const MODEL_ATTR_TOKENS: [&str; 4] = ["NEARSTACK", "FARSTACK", "OS_OS2", "OS_DOS"];

/// Values parallel to [`MODEL_ATTR_TOKENS`].
pub const MODEL_ATTR_VALUES: [ModelAttr; 4] = [
    ModelAttr::Stack(Distance::Near),
    ModelAttr::Stack(Distance::Far),
    ModelAttr::Os(OsType::Os2),
    ModelAttr::Os(OsType::Dos),
];

pub const LANG_TOKENS: [&str; 10] = [
    "C",
    "SYSCALL",
    "STDCALL",
    "PASCAL",
    "FORTRAN",
    "BASIC",
    "FASTCALL",
    "VECTORCALL",
    "SYSVCALL",
    "REGCALL",
];

/// Values parallel to [`LANG_TOKENS`].
pub const LANG_VALUES: [Language; 10] = [
    Language::C,
    Language::Syscall,
    Language::Stdcall,
    Language::Pascal,
    Language::Fortran,
    Language::Basic,
    Language::Fastcall,
    Language::Vectorcall,
    Language::Sysvcall,
    Language::Regcall,
];

/// Resolve a calling-convention keyword.
pub fn language_for(token: &str) -> Option<Language> {
    find_token(token, &LANG_TOKENS).map(|index| LANG_VALUES[index])
}

/// What a CPU-family directive keyword asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuDirectiveKind {
    /// `.8086` .. `.686P`: CPU level, with the protected-mode flag.
    Level(CpuLevel, bool),
    /// `.X64` / `.AMD64`: the 64-bit level, ABI chosen by output format.
    X64,
    /// `.8087` / `.287` / `.387`.
    Fpu(FpuMode),
    /// `.NO87`.
    No87,
    /// Extension directives; the set replaces the current extension field.
    Extensions(ExtensionSet),
    /// `.XMM`, which optionally takes a vector-width operand.
    Xmm,
    /// 64-bit Windows ABI switch.
    Win64,
    /// 64-bit SysV ABI switch.
    Sysv64,
}

pub const CPU_DIRECTIVE_TOKENS: [&str; 23] = [
    ".8086", ".186", ".286", ".286P", ".386", ".386P", ".486", ".486P", ".586", ".586P", ".686",
    ".686P", ".X64", ".AMD64", ".8087", ".287", ".387", ".NO87", ".MMX", ".K3D", ".XMM", ".WIN64",
    ".SYSV64",
];

/// Values parallel to [`CPU_DIRECTIVE_TOKENS`].
const CPU_DIRECTIVE_VALUES: [CpuDirectiveKind; 23] = [
    CpuDirectiveKind::Level(CpuLevel::Cpu8086, false),
    CpuDirectiveKind::Level(CpuLevel::Cpu186, false),
    CpuDirectiveKind::Level(CpuLevel::Cpu286, false),
    CpuDirectiveKind::Level(CpuLevel::Cpu286, true),
    CpuDirectiveKind::Level(CpuLevel::Cpu386, false),
    CpuDirectiveKind::Level(CpuLevel::Cpu386, true),
    CpuDirectiveKind::Level(CpuLevel::Cpu486, false),
    CpuDirectiveKind::Level(CpuLevel::Cpu486, true),
    CpuDirectiveKind::Level(CpuLevel::Cpu586, false),
    CpuDirectiveKind::Level(CpuLevel::Cpu586, true),
    CpuDirectiveKind::Level(CpuLevel::Cpu686, false),
    CpuDirectiveKind::Level(CpuLevel::Cpu686, true),
    CpuDirectiveKind::X64,
    CpuDirectiveKind::X64,
    CpuDirectiveKind::Fpu(FpuMode::Fpu87),
    CpuDirectiveKind::Fpu(FpuMode::Fpu287),
    CpuDirectiveKind::Fpu(FpuMode::Fpu387),
    CpuDirectiveKind::No87,
    CpuDirectiveKind::Extensions(ExtensionSet::MMX),
    CpuDirectiveKind::Extensions(ExtensionSet::MMX.with(ExtensionSet::K3D)),
    CpuDirectiveKind::Xmm,
    CpuDirectiveKind::Win64,
    CpuDirectiveKind::Sysv64,
];

/// Resolve a CPU-family directive keyword.
pub fn cpu_directive_for(token: &str) -> Option<CpuDirectiveKind> {
    find_token(token, &CPU_DIRECTIVE_TOKENS).map(|index| CPU_DIRECTIVE_VALUES[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_token_matches_case_insensitively_in_order() {
        assert_eq!(find_token("small", &MODEL_TOKENS), Some(1));
        assert_eq!(find_token("FLAT", &MODEL_TOKENS), Some(6));
        assert_eq!(find_token("huge ", &MODEL_TOKENS), None);
        assert_eq!(find_token("medium2", &MODEL_TOKENS), None);
    }

    #[test]
    fn model_index_plus_one_is_the_model_value() {
        use crate::core::module_state::MemoryModel;
        for (index, _) in MODEL_TOKENS.iter().enumerate() {
            let model = MemoryModel::from_index(index + 1).expect("model");
            assert_eq!(model.value() as usize, index + 1);
        }
    }

    #[test]
    fn attribute_values_stay_parallel_to_tokens() {
        assert_eq!(
            MODEL_ATTR_VALUES[find_token("nearstack", &MODEL_ATTR_TOKENS).expect("found")],
            ModelAttr::Stack(Distance::Near)
        );
        assert_eq!(
            MODEL_ATTR_VALUES[find_token("OS_DOS", &MODEL_ATTR_TOKENS).expect("found")],
            ModelAttr::Os(OsType::Dos)
        );
        assert_eq!(
            MODEL_ATTR_VALUES[find_token("os_os2", &MODEL_ATTR_TOKENS).expect("found")],
            ModelAttr::Os(OsType::Os2)
        );
    }

    #[test]
    fn language_lookup_covers_all_conventions() {
        use crate::core::module_state::Language;
        assert_eq!(language_for("c"), Some(Language::C));
        assert_eq!(language_for("VECTORCALL"), Some(Language::Vectorcall));
        assert_eq!(language_for("sysvcall"), Some(Language::Sysvcall));
        assert_eq!(language_for("cdecl"), None);
    }

    #[test]
    fn cpu_directive_lookup_resolves_levels_and_privileged_variants() {
        use crate::x86::CpuLevel;
        assert_eq!(
            cpu_directive_for(".386"),
            Some(CpuDirectiveKind::Level(CpuLevel::Cpu386, false))
        );
        assert_eq!(
            cpu_directive_for(".586p"),
            Some(CpuDirectiveKind::Level(CpuLevel::Cpu586, true))
        );
        assert_eq!(cpu_directive_for(".amd64"), Some(CpuDirectiveKind::X64));
        assert_eq!(cpu_directive_for(".no87"), Some(CpuDirectiveKind::No87));
        assert_eq!(cpu_directive_for(".model"), None);
    }
}
