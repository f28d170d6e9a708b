// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Segment and group bookkeeping for the directive front end.
//!
//! Only the parts the model/CPU directives need exist here: per-model default
//! segment names, the simplified code/data/stack layout created when a model
//! is committed, the FLAT pseudo-group, and the "is a segment currently open"
//! query that gates default-offset-size changes. Segment contents, fixups and
//! emission live downstream.

use crate::core::lqueue::LineQueue;
use crate::core::module_state::{Distance, MemoryModel, OffsetSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    Data,
    Stack,
}

#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub kind: SegmentKind,
}

/// Simplified-layout slots, for predefined-symbol text lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimSlot {
    Code,
    Data,
    Stack,
}

#[derive(Debug, Default)]
pub struct SegmentManager {
    segments: Vec<Segment>,
    open: Vec<usize>,
    code_name: String,
    data_name: String,
    stack_name: String,
    flat_group: Option<OffsetSize>,
}

impl SegmentManager {
    pub fn new() -> Self {
        Self {
            segments: Vec::new(),
            open: Vec::new(),
            code_name: "_TEXT".to_string(),
            data_name: "_DATA".to_string(),
            stack_name: "STACK".to_string(),
            flat_group: None,
        }
    }

    /// Pick the default code/data segment names implied by a model.
    ///
    /// The simplified layout uses `_TEXT`/`_DATA` throughout; far-code models
    /// would prefix the code name with the module name once one is known,
    /// which is a downstream concern.
    pub fn set_model_default_seg_names(&mut self, model: MemoryModel) {
        let _ = model;
        self.code_name = "_TEXT".to_string();
        self.data_name = "_DATA".to_string();
    }

    /// Enqueue the model's implied segment layout as generated source lines.
    ///
    /// The lines run through ordinary statement dispatch after the model
    /// commit, the same route user-written `SEGMENT`/`ENDS` pairs take.
    /// Already-defined segments are not re-enqueued, so later passes and
    /// model redeclarations stay idempotent.
    pub fn sim_segm_init(&self, model: MemoryModel, distance: Distance, queue: &mut LineQueue) {
        let mut wanted: Vec<&str> = vec![&self.code_name, &self.data_name];
        if model != MemoryModel::Flat && distance == Distance::Far {
            wanted.push(&self.stack_name);
        }
        for name in wanted {
            if self.find(name).is_none() {
                queue.push(format!("{name} SEGMENT"));
                queue.push(format!("{name} ENDS"));
            }
        }
    }

    /// Define the FLAT pseudo-group. The default width must be final before
    /// this runs; consumers read the group's width at definition time.
    pub fn define_flat_group(&mut self, width: OffsetSize) {
        self.flat_group = Some(width);
    }

    pub fn flat_group_width(&self) -> Option<OffsetSize> {
        self.flat_group
    }

    /// Open a segment, defining it on first sight.
    pub fn open(&mut self, name: &str) {
        let index = match self.find(name) {
            Some(index) => index,
            None => {
                let kind = self.kind_for_name(name);
                self.segments.push(Segment {
                    name: name.to_string(),
                    kind,
                });
                self.segments.len() - 1
            }
        };
        self.open.push(index);
    }

    /// Close the innermost open segment. `name` must match it.
    pub fn close(&mut self, name: &str) -> Result<(), String> {
        match self.open.last() {
            Some(&index) if self.segments[index].name.eq_ignore_ascii_case(name) => {
                self.open.pop();
                Ok(())
            }
            Some(&index) => Err(format!(
                "block nesting error: expected ENDS for {}",
                self.segments[index].name
            )),
            None => Err("block nesting error: no open segment".to_string()),
        }
    }

    /// The innermost open segment, if any.
    pub fn current(&self) -> Option<&Segment> {
        self.open.last().map(|&index| &self.segments[index])
    }

    /// Drop any dangling open segments at the start of a pass.
    pub fn reset_open(&mut self) {
        self.open.clear();
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn sim_seg_name(&self, slot: SimSlot) -> &str {
        match slot {
            SimSlot::Code => &self.code_name,
            SimSlot::Data => &self.data_name,
            SimSlot::Stack => &self.stack_name,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.segments
            .iter()
            .position(|seg| seg.name.eq_ignore_ascii_case(name))
    }

    fn kind_for_name(&self, name: &str) -> SegmentKind {
        if name.eq_ignore_ascii_case(&self.code_name) {
            SegmentKind::Code
        } else if name.eq_ignore_ascii_case(&self.stack_name) {
            SegmentKind::Stack
        } else {
            SegmentKind::Data
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_segm_init_enqueues_code_and_data_pairs() {
        let manager = SegmentManager::new();
        let mut queue = LineQueue::new();
        manager.sim_segm_init(MemoryModel::Small, Distance::None, &mut queue);
        assert_eq!(queue.pop().as_deref(), Some("_TEXT SEGMENT"));
        assert_eq!(queue.pop().as_deref(), Some("_TEXT ENDS"));
        assert_eq!(queue.pop().as_deref(), Some("_DATA SEGMENT"));
        assert_eq!(queue.pop().as_deref(), Some("_DATA ENDS"));
        assert!(queue.is_empty());
    }

    #[test]
    fn far_stack_adds_a_stack_segment_except_for_flat() {
        let manager = SegmentManager::new();
        let mut queue = LineQueue::new();
        manager.sim_segm_init(MemoryModel::Large, Distance::Far, &mut queue);
        assert_eq!(queue.len(), 6);

        let mut queue = LineQueue::new();
        manager.sim_segm_init(MemoryModel::Flat, Distance::Far, &mut queue);
        assert_eq!(queue.len(), 4);
    }

    #[test]
    fn already_defined_segments_are_not_reenqueued() {
        let mut manager = SegmentManager::new();
        manager.open("_TEXT");
        manager.close("_TEXT").expect("close");
        let mut queue = LineQueue::new();
        manager.sim_segm_init(MemoryModel::Small, Distance::None, &mut queue);
        assert_eq!(queue.pop().as_deref(), Some("_DATA SEGMENT"));
        assert_eq!(queue.pop().as_deref(), Some("_DATA ENDS"));
        assert!(queue.is_empty());
    }

    #[test]
    fn open_and_close_track_the_current_segment() {
        let mut manager = SegmentManager::new();
        assert!(manager.current().is_none());
        manager.open("_TEXT");
        assert_eq!(manager.current().map(|s| s.kind), Some(SegmentKind::Code));
        assert!(manager.close("_DATA").is_err());
        assert!(manager.close("_text").is_ok());
        assert!(manager.current().is_none());
        assert!(manager.close("_TEXT").is_err());
    }

    #[test]
    fn kinds_are_inferred_from_default_names() {
        let mut manager = SegmentManager::new();
        manager.open("STACK");
        assert_eq!(manager.current().map(|s| s.kind), Some(SegmentKind::Stack));
        manager.close("STACK").expect("close");
        manager.open("MYDATA");
        assert_eq!(manager.current().map(|s| s.kind), Some(SegmentKind::Data));
    }

    #[test]
    fn flat_group_records_the_width_it_was_defined_with() {
        let mut manager = SegmentManager::new();
        assert!(manager.flat_group_width().is_none());
        manager.define_flat_group(OffsetSize::Use64);
        assert_eq!(manager.flat_group_width(), Some(OffsetSize::Use64));
    }
}
