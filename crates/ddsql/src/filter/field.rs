// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Predicate operands: fields, parameters, literals.
//!
//! Operands live in a flat arena shared by every predicate of an expression:
//! the same field or parameter slot may be referenced from several predicate
//! nodes, so "shared operand" is simply "same arena index". Each slot records
//! the predicates that depend on it, which is what drives the push-based
//! propagation during evaluation.

use super::value::{FilterValue, Payload};
use crate::dynamic::DynamicValue;

/// Expected scalar kind of a field's terminal member, used to read the
/// deserialized sample through the matching accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TerminalKind {
    Bool,
    Char,
    SignedInt,
    UnsignedInt,
    Float,
    Str,
    Enum,
}

/// One step of a field access path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldStep {
    /// Member index within the current struct.
    pub member: usize,
    /// Element index when the member is an array or sequence.
    pub index: Option<usize>,
}

/// A value bound to a field access path into the sample.
#[derive(Debug, Clone)]
pub(crate) struct FilterField {
    /// Canonical path text, for diagnostics.
    pub path: String,
    pub steps: Vec<FieldStep>,
    pub kind: TerminalKind,
    pub value: FilterValue,
    pub has_value: bool,
}

impl FilterField {
    pub fn new(path: String, steps: Vec<FieldStep>, kind: TerminalKind) -> Self {
        let initial = match kind {
            TerminalKind::Bool => Payload::Bool(false),
            TerminalKind::Char => Payload::Char('\0'),
            TerminalKind::SignedInt => Payload::SignedInt(0),
            TerminalKind::UnsignedInt => Payload::UnsignedInt(0),
            TerminalKind::Float => Payload::Float(0.0),
            TerminalKind::Str => Payload::Str(String::new()),
            TerminalKind::Enum => Payload::Enum(0),
        };
        Self {
            path,
            steps,
            kind,
            value: FilterValue::new(initial),
            has_value: false,
        }
    }

    /// Refresh this field's value from a deserialized sample.
    ///
    /// Walks the access path by member index; a step with an element index
    /// additionally indexes into the collection member. Returns `false`
    /// without touching `has_value` when the path cannot be resolved (absent
    /// member, out-of-range element, kind mismatch), which rejects the
    /// sample.
    pub fn set_value(&mut self, sample: &DynamicValue) -> bool {
        let mut current = sample;
        for step in &self.steps {
            let Some(member) = current.member(step.member) else {
                return false;
            };
            current = member;
            if let Some(index) = step.index {
                let Some(element) = current.element(index) else {
                    log::trace!(
                        "[filter] field '{}': element {} not present",
                        self.path,
                        index
                    );
                    return false;
                };
                current = element;
            }
        }

        let payload = match self.kind {
            TerminalKind::Bool => current.as_bool().map(Payload::Bool),
            TerminalKind::Char => current.as_char().map(Payload::Char),
            TerminalKind::SignedInt => current.as_i64().map(Payload::SignedInt),
            TerminalKind::UnsignedInt => current.as_u64().map(Payload::UnsignedInt),
            TerminalKind::Float => current.as_f64().map(Payload::Float),
            TerminalKind::Str => current.as_str().map(|s| Payload::Str(s.to_string())),
            TerminalKind::Enum => current.as_enum().map(Payload::Enum),
        };
        let Some(payload) = payload else {
            return false;
        };

        self.value.payload = payload;
        self.has_value = true;
        self.value.value_has_changed();
        true
    }
}

/// A value bound to a `%N` positional parameter.
#[derive(Debug, Clone)]
pub(crate) struct FilterParameter {
    pub ordinal: usize,
    pub value: FilterValue,
}

impl FilterParameter {
    pub fn new(ordinal: usize, value: FilterValue) -> Self {
        Self { ordinal, value }
    }

    /// Assign a freshly parsed value, recompiling the pattern when this
    /// parameter serves as a LIKE/MATCH operand.
    pub fn assign(&mut self, payload: Payload) {
        self.value.payload = payload;
        self.value.value_has_changed();
        log::trace!("[filter] parameter %{} updated", self.ordinal);
    }
}

/// One operand arena slot.
#[derive(Debug, Clone)]
pub(crate) enum OperandSlot {
    Literal(FilterValue),
    Field(FilterField),
    Parameter(FilterParameter),
}

impl OperandSlot {
    pub fn value(&self) -> &FilterValue {
        match self {
            OperandSlot::Literal(v) => v,
            OperandSlot::Field(f) => &f.value,
            OperandSlot::Parameter(p) => &p.value,
        }
    }

    pub fn value_mut(&mut self) -> &mut FilterValue {
        match self {
            OperandSlot::Literal(v) => v,
            OperandSlot::Field(f) => &mut f.value,
            OperandSlot::Parameter(p) => &mut p.value,
        }
    }

    /// Literals and parameters always carry a value; fields only after a
    /// successful path walk in the current pass.
    pub fn has_value(&self) -> bool {
        match self {
            OperandSlot::Literal(_) | OperandSlot::Parameter(_) => true,
            OperandSlot::Field(f) => f.has_value,
        }
    }
}

/// Flat operand storage plus the slot -> dependent-predicate relation.
#[derive(Debug, Clone, Default)]
pub(crate) struct OperandArena {
    slots: Vec<OperandSlot>,
    /// For each slot, the condition indices of predicates that use it.
    parents: Vec<Vec<usize>>,
}

impl OperandArena {
    pub fn push(&mut self, slot: OperandSlot) -> usize {
        self.slots.push(slot);
        self.parents.push(Vec::new());
        self.slots.len() - 1
    }

    pub fn slot(&self, index: usize) -> &OperandSlot {
        &self.slots[index]
    }

    pub fn slot_mut(&mut self, index: usize) -> &mut OperandSlot {
        &mut self.slots[index]
    }

    /// Register a predicate as depending on a slot.
    pub fn add_parent(&mut self, slot: usize, condition: usize) {
        self.parents[slot].push(condition);
    }

    pub fn parents(&self, slot: usize) -> &[usize] {
        &self.parents[slot]
    }

    /// Clear the per-pass state of every field slot.
    pub fn reset_fields(&mut self) {
        for slot in &mut self.slots {
            if let OperandSlot::Field(field) = slot {
                field.has_value = false;
            }
        }
    }
}
