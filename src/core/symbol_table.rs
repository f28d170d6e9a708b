// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Symbol table for predefined constants and text macros.

use std::io::{self, Write};

/// A symbol's payload: numeric equate or text macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolValue {
    Num(u32),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct SymbolEntry {
    pub name: String,
    pub value: SymbolValue,
    /// Compiler-injected symbols (`@Cpu`, `@Model`, ...).
    pub predefined: bool,
    /// Redefinable without a diagnostic (variables vs. one-shot equates).
    pub rw: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SymbolTableResult {
    Ok,
    Duplicate,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
}

impl SymbolTable {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Create or update a redefinable numeric variable. Predefined variables
    /// such as `@Cpu` are re-published through this on every change.
    pub fn create_variable(&mut self, name: &str, val: u32) -> SymbolTableResult {
        if let Some(entry) = self.entry_mut(name) {
            if !entry.rw {
                return SymbolTableResult::Duplicate;
            }
            entry.value = SymbolValue::Num(val);
            return SymbolTableResult::Ok;
        }
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            value: SymbolValue::Num(val),
            predefined: true,
            rw: true,
        });
        SymbolTableResult::Ok
    }

    /// Create or overwrite a predefined numeric constant.
    pub fn add_predefined_constant(&mut self, name: &str, val: u32) {
        self.put_predefined(name, SymbolValue::Num(val));
    }

    /// Create or overwrite a predefined text symbol.
    pub fn add_predefined_text(&mut self, name: &str, text: &str) {
        self.put_predefined(name, SymbolValue::Text(text.to_string()));
    }

    fn put_predefined(&mut self, name: &str, value: SymbolValue) {
        if let Some(entry) = self.entry_mut(name) {
            entry.value = value;
            entry.predefined = true;
            return;
        }
        self.entries.push(SymbolEntry {
            name: name.to_string(),
            value,
            predefined: true,
            rw: false,
        });
    }

    /// Numeric value of a symbol, `None` if missing or a text symbol.
    #[must_use]
    pub fn num_value(&self, name: &str) -> Option<u32> {
        match self.entry(name).map(|e| &e.value) {
            Some(SymbolValue::Num(val)) => Some(*val),
            _ => None,
        }
    }

    /// Text value of a symbol, `None` if missing or numeric.
    #[must_use]
    pub fn text_value(&self, name: &str) -> Option<&str> {
        match self.entry(name).map(|e| &e.value) {
            Some(SymbolValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dump<W: Write>(&self, mut out: W) -> io::Result<()> {
        for entry in &self.entries {
            match &entry.value {
                SymbolValue::Num(val) => {
                    writeln!(out, "{:<16}: {:04x} ({})", entry.name, val, val)?
                }
                SymbolValue::Text(text) => writeln!(out, "{:<16}: {}", entry.name, text)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut table = SymbolTable::new();
        table.add_predefined_constant("@Model", 2);
        assert_eq!(table.num_value("@model"), Some(2));
        assert_eq!(table.num_value("@MODEL"), Some(2));
        assert_eq!(table.num_value("@nope"), None);
    }

    #[test]
    fn predefined_constants_overwrite_silently() {
        let mut table = SymbolTable::new();
        table.add_predefined_constant("@DataSize", 0);
        table.add_predefined_constant("@DataSize", 2);
        assert_eq!(table.num_value("@DataSize"), Some(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn variables_are_redefinable_but_constants_are_not() {
        let mut table = SymbolTable::new();
        assert_eq!(table.create_variable("@Cpu", 0x101), SymbolTableResult::Ok);
        assert_eq!(table.create_variable("@cpu", 0x50f), SymbolTableResult::Ok);
        assert_eq!(table.num_value("@Cpu"), Some(0x50f));

        table.add_predefined_constant("@Model", 7);
        assert_eq!(
            table.create_variable("@Model", 1),
            SymbolTableResult::Duplicate
        );
        assert_eq!(table.num_value("@Model"), Some(7));
    }

    #[test]
    fn text_and_numeric_values_do_not_cross() {
        let mut table = SymbolTable::new();
        table.add_predefined_text("@code", "_TEXT");
        assert_eq!(table.text_value("@code"), Some("_TEXT"));
        assert_eq!(table.num_value("@code"), None);
        assert_eq!(table.text_value("@data"), None);
    }

    #[test]
    fn dump_renders_both_value_kinds() {
        let mut table = SymbolTable::new();
        table.add_predefined_constant("@Model", 2);
        table.add_predefined_text("@stack", "DGROUP");
        let mut out = Vec::new();
        table.dump(&mut out).expect("dump");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("@Model"));
        assert!(text.contains("0002 (2)"));
        assert!(text.contains("DGROUP"));
    }
}
