// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Module-wide configuration written by the directive handlers and read by
//! the rest of the pipeline.
//!
//! One instance exists per compilation unit. The pass driver owns it; there
//! is no ambient global.

use std::fmt;

use crate::output::{FormatOptions, SubFormat};
use crate::x86::{masm_compat, CpuSetting};

/// Compilation pass phase. The first pass validates and commits directive
/// arguments; later passes only re-derive dependent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    First,
    Later,
}

/// Memory model. Numeric values are the Masm `@Model` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MemoryModel {
    #[default]
    None = 0,
    Tiny = 1,
    Small = 2,
    Compact = 3,
    Medium = 4,
    Large = 5,
    Huge = 6,
    Flat = 7,
}

impl MemoryModel {
    /// Model for a one-based index into the model keyword table.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            1 => Some(Self::Tiny),
            2 => Some(Self::Small),
            3 => Some(Self::Compact),
            4 => Some(Self::Medium),
            5 => Some(Self::Large),
            6 => Some(Self::Huge),
            7 => Some(Self::Flat),
            _ => None,
        }
    }

    pub fn value(&self) -> u32 {
        *self as u32
    }

    /// Models with far code pointers (`@CodeSize` = 1).
    pub fn far_code(&self) -> bool {
        matches!(self, Self::Medium | Self::Large | Self::Huge)
    }

    /// `@DataSize` value: 0 near, 1 far, 2 huge.
    pub fn data_size(&self) -> u32 {
        match self {
            Self::Compact | Self::Large => 1,
            Self::Huge => 2,
            _ => 0,
        }
    }
}

impl fmt::Display for MemoryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Tiny => "tiny",
            Self::Small => "small",
            Self::Compact => "compact",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Huge => "huge",
            Self::Flat => "flat",
        };
        f.write_str(name)
    }
}

/// Calling-convention tag. Numeric values are the Masm `@Interface` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Language {
    #[default]
    None = 0,
    C = 1,
    Syscall = 2,
    Stdcall = 3,
    Pascal = 4,
    Fortran = 5,
    Basic = 6,
    Fastcall = 7,
    Vectorcall = 8,
    Sysvcall = 9,
    Regcall = 10,
}

impl Language {
    pub fn value(&self) -> u32 {
        *self as u32
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::C => "c",
            Self::Syscall => "syscall",
            Self::Stdcall => "stdcall",
            Self::Pascal => "pascal",
            Self::Fortran => "fortran",
            Self::Basic => "basic",
            Self::Fastcall => "fastcall",
            Self::Vectorcall => "vectorcall",
            Self::Sysvcall => "sysvcall",
            Self::Regcall => "regcall",
        };
        f.write_str(name)
    }
}

/// Stack distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distance {
    #[default]
    None,
    Near,
    Far,
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Near => "near",
            Self::Far => "far",
        };
        f.write_str(name)
    }
}

/// Target operating system named in the model attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OsType {
    #[default]
    Dos,
    Os2,
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dos => "dos",
            Self::Os2 => "os2",
        })
    }
}

/// Address width used for segments with unspecified size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum OffsetSize {
    #[default]
    Use16,
    Use32,
    Use64,
}

impl OffsetSize {
    pub fn width_bits(&self) -> u32 {
        match self {
            Self::Use16 => 16,
            Self::Use32 => 32,
            Self::Use64 => 64,
        }
    }
}

impl fmt::Display for OffsetSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.width_bits())
    }
}

/// How offsets are resolved: against a group, or the flat address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetType {
    #[default]
    Group,
    Flat,
}

/// Resolved fast-call ABI family, selected by the FLAT/64-bit finalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FastcallAbi {
    #[default]
    Default,
    Win64,
    SysV64,
}

impl fmt::Display for FastcallAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Default => "default",
            Self::Win64 => "win64",
            Self::SysV64 => "sysv64",
        })
    }
}

/// The per-module configuration record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModuleState {
    pub model: MemoryModel,
    pub language: Language,
    pub distance: Distance,
    pub ostype: OsType,
    pub def_ofssize: OffsetSize,
    pub cpu: CpuSetting,
    pub cpu_compat: u16,
    pub fastcall: FastcallAbi,
    pub offset_type: OffsetType,
    pub sub_format: SubFormat,
    pub fmtopt: Option<&'static FormatOptions>,
    pub win64_flags: u8,
}

impl ModuleState {
    pub fn new() -> Self {
        let mut state = Self::default();
        state.cpu_compat = masm_compat(&state.cpu);
        state
    }

    pub fn model_set(&self) -> bool {
        self.model != MemoryModel::None
    }

    /// Configuration report as `key=value` lines, stable order.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("model={}", self.model),
            format!("language={}", self.language),
            format!("distance={}", self.distance),
            format!("ostype={}", self.ostype),
            format!("offset_size={}", self.def_ofssize),
            format!("cpu={}", self.cpu.level),
            format!("protected={}", self.cpu.protected),
            format!("fpu={}", self.cpu.fpu),
            format!("extensions={}", self.cpu.extensions.names().join("+")),
            format!("cpu_value=0x{:04x}", self.cpu_compat),
            format!("fastcall={}", self.fastcall),
        ];
        if let Some(fmtopt) = self.fmtopt {
            lines.push(format!("format_variant={}", fmtopt.name));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_numeric_values_match_masm() {
        assert_eq!(MemoryModel::Tiny.value(), 1);
        assert_eq!(MemoryModel::Flat.value(), 7);
        assert_eq!(MemoryModel::from_index(3), Some(MemoryModel::Compact));
        assert_eq!(MemoryModel::from_index(0), None);
        assert_eq!(MemoryModel::from_index(8), None);
    }

    #[test]
    fn code_and_data_size_follow_the_model_table() {
        assert!(!MemoryModel::Small.far_code());
        assert!(MemoryModel::Medium.far_code());
        assert!(MemoryModel::Huge.far_code());
        assert_eq!(MemoryModel::Small.data_size(), 0);
        assert_eq!(MemoryModel::Compact.data_size(), 1);
        assert_eq!(MemoryModel::Large.data_size(), 1);
        assert_eq!(MemoryModel::Huge.data_size(), 2);
        assert_eq!(MemoryModel::Flat.data_size(), 0);
    }

    #[test]
    fn new_state_derives_the_initial_cpu_value() {
        let state = ModuleState::new();
        // 8086 with an 8087: 0x0001 | 0x0100.
        assert_eq!(state.cpu_compat, 0x0101);
        assert!(!state.model_set());
    }

    #[test]
    fn report_lists_format_variant_only_when_selected() {
        let mut state = ModuleState::new();
        assert!(!state
            .report_lines()
            .iter()
            .any(|l| l.starts_with("format_variant=")));
        state.fmtopt = Some(&crate::output::ELF64_FMTOPT);
        assert!(state
            .report_lines()
            .iter()
            .any(|l| l == "format_variant=ELF64"));
    }
}
