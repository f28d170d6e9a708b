// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! x86 capability model: CPU level, FPU level, and instruction-set
//! extensions, plus the derived Masm-compatible `@Cpu` value.
//!
//! The three sub-fields are kept as explicit typed fields instead of one
//! packed integer. CPU levels are cumulative (`Ord` on [`CpuLevel`] is the
//! capability ordering); extensions are an independent set not implied by
//! the level, except at the 64-bit floor where the baseline ABI guarantees
//! all of them.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Cumulative instruction-set target floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CpuLevel {
    Cpu8086,
    Cpu186,
    Cpu286,
    Cpu386,
    Cpu486,
    Cpu586,
    Cpu686,
    X64,
}

impl fmt::Display for CpuLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cpu8086 => "8086",
            Self::Cpu186 => "186",
            Self::Cpu286 => "286",
            Self::Cpu386 => "386",
            Self::Cpu486 => "486",
            Self::Cpu586 => "586",
            Self::Cpu686 => "686",
            Self::X64 => "x64",
        };
        f.write_str(name)
    }
}

/// FPU selection. `NoFpu` is the `.NO87` state and sticks across later
/// CPU-level-only changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FpuMode {
    NoFpu,
    Fpu87,
    Fpu287,
    Fpu387,
}

impl fmt::Display for FpuMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoFpu => "none",
            Self::Fpu87 => "8087",
            Self::Fpu287 => "80287",
            Self::Fpu387 => "80387",
        };
        f.write_str(name)
    }
}

/// Independently toggleable instruction-set extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ExtensionSet(u8);

impl ExtensionSet {
    pub const MMX: Self = Self(1 << 0);
    pub const K3D: Self = Self(1 << 1);
    pub const SSE1: Self = Self(1 << 2);
    pub const SSE2: Self = Self(1 << 3);
    pub const SSE3: Self = Self(1 << 4);
    pub const SSSE3: Self = Self(1 << 5);
    pub const SSE4: Self = Self(1 << 6);

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Const-context union, for building table entries.
    pub const fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Every extension; the 64-bit baseline set.
    pub const fn all() -> Self {
        Self(0x7f)
    }

    /// Cumulative SSE set for a vector width 1..=4.
    pub fn sse_cumulative(width: u32) -> Self {
        let mut set = Self::SSE1;
        if width >= 2 {
            set |= Self::SSE2;
        }
        if width >= 3 {
            set |= Self::SSE3 | Self::SSSE3;
        }
        if width >= 4 {
            set |= Self::SSE4;
        }
        set
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Human-readable extension list for reports.
    pub fn names(&self) -> Vec<&'static str> {
        const TABLE: &[(ExtensionSet, &str)] = &[
            (ExtensionSet::MMX, "mmx"),
            (ExtensionSet::K3D, "3dnow"),
            (ExtensionSet::SSE1, "sse"),
            (ExtensionSet::SSE2, "sse2"),
            (ExtensionSet::SSE3, "sse3"),
            (ExtensionSet::SSSE3, "ssse3"),
            (ExtensionSet::SSE4, "sse4"),
        ];
        TABLE
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for ExtensionSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ExtensionSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// The merged CPU/FPU/extension state carried in the module configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSetting {
    pub level: CpuLevel,
    pub protected: bool,
    pub fpu: FpuMode,
    pub extensions: ExtensionSet,
}

impl Default for CpuSetting {
    fn default() -> Self {
        Self {
            level: CpuLevel::Cpu8086,
            protected: false,
            fpu: FpuMode::Fpu87,
            extensions: ExtensionSet::empty(),
        }
    }
}

/// FPU part of a directive request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FpuRequest {
    /// `.NO87`
    Disable,
    Level(FpuMode),
}

/// What a CPU/FPU directive asks for. Absent sub-fields leave the current
/// setting untouched (subject to the FPU re-defaulting rule in the merger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuRequest {
    pub level: Option<(CpuLevel, bool)>,
    pub fpu: Option<FpuRequest>,
    pub extensions: Option<ExtensionSet>,
}

impl CpuRequest {
    pub fn level(level: CpuLevel, protected: bool) -> Self {
        Self {
            level: Some((level, protected)),
            ..Self::default()
        }
    }

    pub fn fpu(request: FpuRequest) -> Self {
        Self {
            fpu: Some(request),
            ..Self::default()
        }
    }

    pub fn extensions(set: ExtensionSet) -> Self {
        Self {
            extensions: Some(set),
            ..Self::default()
        }
    }
}

/// Default FPU for a CPU level, used when a level-only directive arrives
/// while the FPU has not been disabled.
pub fn default_fpu_for(level: CpuLevel) -> FpuMode {
    if level < CpuLevel::Cpu286 {
        FpuMode::Fpu87
    } else if level < CpuLevel::Cpu386 {
        FpuMode::Fpu287
    } else {
        FpuMode::Fpu387
    }
}

// Masm @Cpu bit assignments.
const M_8086: u16 = 0x0001;
const M_186: u16 = 0x0002;
const M_286: u16 = 0x0004;
const M_386: u16 = 0x0008;
const M_486: u16 = 0x0010;
const M_586: u16 = 0x0020;
const M_686: u16 = 0x0040;
const M_PROT: u16 = 0x0080;
const M_8087: u16 = 0x0100;
const M_287: u16 = 0x0400;
const M_387: u16 = 0x0800;

/// Masm-compatible `@Cpu` value: cumulative CPU bits up to the level (the
/// 64-bit level reports as a 686), a protected-mode bit, and cumulative FPU
/// bits.
pub fn masm_compat(cpu: &CpuSetting) -> u16 {
    let mut value = match cpu.level {
        CpuLevel::Cpu8086 => M_8086,
        CpuLevel::Cpu186 => M_8086 | M_186,
        CpuLevel::Cpu286 => M_8086 | M_186 | M_286,
        CpuLevel::Cpu386 => M_8086 | M_186 | M_286 | M_386,
        CpuLevel::Cpu486 => M_8086 | M_186 | M_286 | M_386 | M_486,
        CpuLevel::Cpu586 => M_8086 | M_186 | M_286 | M_386 | M_486 | M_586,
        CpuLevel::Cpu686 | CpuLevel::X64 => {
            M_8086 | M_186 | M_286 | M_386 | M_486 | M_586 | M_686
        }
    };
    if cpu.protected {
        value |= M_PROT;
    }
    value |= match cpu.fpu {
        FpuMode::NoFpu => 0,
        FpuMode::Fpu87 => M_8087,
        FpuMode::Fpu287 => M_8087 | M_287,
        FpuMode::Fpu387 => M_8087 | M_287 | M_387,
    };
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_levels_order_cumulatively() {
        assert!(CpuLevel::Cpu8086 < CpuLevel::Cpu286);
        assert!(CpuLevel::Cpu386 <= CpuLevel::Cpu386);
        assert!(CpuLevel::Cpu686 < CpuLevel::X64);
    }

    #[test]
    fn default_fpu_tracks_cpu_level_thresholds() {
        assert_eq!(default_fpu_for(CpuLevel::Cpu8086), FpuMode::Fpu87);
        assert_eq!(default_fpu_for(CpuLevel::Cpu186), FpuMode::Fpu87);
        assert_eq!(default_fpu_for(CpuLevel::Cpu286), FpuMode::Fpu287);
        assert_eq!(default_fpu_for(CpuLevel::Cpu386), FpuMode::Fpu387);
        assert_eq!(default_fpu_for(CpuLevel::X64), FpuMode::Fpu387);
    }

    #[test]
    fn sse_cumulative_widens_in_steps() {
        assert_eq!(ExtensionSet::sse_cumulative(1), ExtensionSet::SSE1);
        let w3 = ExtensionSet::sse_cumulative(3);
        assert!(w3.contains(ExtensionSet::SSE1 | ExtensionSet::SSE2));
        assert!(w3.contains(ExtensionSet::SSE3 | ExtensionSet::SSSE3));
        assert!(!w3.contains(ExtensionSet::SSE4));
        assert!(ExtensionSet::sse_cumulative(4).contains(ExtensionSet::SSE4));
    }

    #[test]
    fn all_extensions_cover_every_flag() {
        let all = ExtensionSet::all();
        for flag in [
            ExtensionSet::MMX,
            ExtensionSet::K3D,
            ExtensionSet::SSE1,
            ExtensionSet::SSE2,
            ExtensionSet::SSE3,
            ExtensionSet::SSSE3,
            ExtensionSet::SSE4,
        ] {
            assert!(all.contains(flag));
        }
    }

    #[test]
    fn masm_compat_accumulates_cpu_and_fpu_bits() {
        let cpu = CpuSetting {
            level: CpuLevel::Cpu486,
            protected: false,
            fpu: FpuMode::Fpu387,
            extensions: ExtensionSet::empty(),
        };
        assert_eq!(masm_compat(&cpu), 0x001F | 0x0D00);
    }

    #[test]
    fn masm_compat_reports_x64_as_686_with_protection_bit() {
        let cpu = CpuSetting {
            level: CpuLevel::X64,
            protected: true,
            fpu: FpuMode::NoFpu,
            extensions: ExtensionSet::all(),
        };
        assert_eq!(masm_compat(&cpu), 0x007F | 0x0080);
    }

    #[test]
    fn extension_names_list_only_present_flags() {
        let set = ExtensionSet::MMX | ExtensionSet::SSE2;
        assert_eq!(set.names(), vec!["mmx", "sse2"]);
    }
}
