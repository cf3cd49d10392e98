// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiles a parsed expression into a [`FilterExpression`].
//!
//! All type checking happens here, against the type descriptor passed in by
//! the caller: field paths are resolved to member-index steps with in-bounds
//! constant indices, operand kinds are checked against the compatibility
//! matrix, enum-name string literals are resolved to variant values, and the
//! constraints each `%N` parameter must keep satisfying are recorded for
//! later parameter updates. Samples never reach an untypeable comparison.

use std::collections::HashMap;
use std::sync::Arc;

use super::ast::{Expr, FieldPath, Literal, LogicOp, Operand, RelOp};
use super::condition::{ConditionNode, ConditionTree};
use super::expression::{FilterExpression, ParamInfo};
use super::field::{FieldStep, FilterField, FilterParameter, OperandArena, OperandSlot, TerminalKind};
use super::parser::parse_literal;
use super::value::{FilterValue, Payload, RegexKind};
use super::FilterError;
use crate::dynamic::{EnumDescriptor, PrimitiveKind, TypeDescriptor, TypeKind};

/// Nesting bound for the condition graph.
const MAX_DEPTH: usize = 64;

/// Build-time classification of an operand.
#[derive(Debug, Clone)]
pub(crate) enum OperandClass {
    Bool,
    Int,
    /// `single` marks a 32-bit float field: constants compared against it
    /// are rounded to f32 first, so equality behaves at the field's
    /// precision.
    Float { single: bool },
    Char,
    Str,
    Enum(EnumDescriptor),
}

impl OperandClass {
    fn describe(&self) -> String {
        match self {
            OperandClass::Bool => "boolean".into(),
            OperandClass::Int => "integer".into(),
            OperandClass::Float { .. } => "float".into(),
            OperandClass::Char => "char".into(),
            OperandClass::Str => "string".into(),
            OperandClass::Enum(e) => format!("enum {}", e.name),
        }
    }

    fn is_textual(&self) -> bool {
        matches!(self, OperandClass::Str | OperandClass::Char)
    }
}

/// Constraint a parameter must keep satisfying across updates.
#[derive(Debug, Clone)]
pub(crate) struct ParamConstraint {
    pub peer: OperandClass,
    pub op: RelOp,
    /// The parameter is the right-hand (pattern) side of LIKE/MATCH.
    pub is_pattern: bool,
}

impl ParamConstraint {
    pub fn pattern_kind(&self) -> Option<RegexKind> {
        if !self.is_pattern {
            return None;
        }
        match self.op {
            RelOp::Like => Some(RegexKind::Like),
            RelOp::Match => Some(RegexKind::Match),
            _ => None,
        }
    }
}

/// Compile an optional AST (None = empty expression) into an expression.
pub(crate) fn build(
    ast: Option<&Expr>,
    descriptor: &Arc<TypeDescriptor>,
    parameters: &[String],
) -> Result<FilterExpression, FilterError> {
    let mut builder = Builder {
        descriptor,
        parameters,
        operands: OperandArena::default(),
        tree: ConditionTree::default(),
        fields: Vec::new(),
        field_slots: HashMap::new(),
        params: Vec::new(),
    };

    let root = match ast {
        Some(expr) => Some(builder.build_node(expr, None, 0)?),
        None => None,
    };

    Ok(FilterExpression::from_parts(
        Arc::clone(descriptor),
        builder.operands,
        builder.tree,
        root,
        builder.fields,
        builder.params,
    ))
}

struct Builder<'a> {
    descriptor: &'a Arc<TypeDescriptor>,
    parameters: &'a [String],
    operands: OperandArena,
    tree: ConditionTree,
    /// Field slot indices in first-reference order.
    fields: Vec<usize>,
    field_slots: HashMap<String, (usize, OperandClass)>,
    /// Parameter table by ordinal.
    params: Vec<Option<ParamInfo>>,
}

/// An operand resolved far enough to type-check a predicate.
enum Resolved {
    Field { slot: usize, class: OperandClass },
    Literal { literal: Literal, class: OperandClass },
    Parameter { ordinal: usize, literal: Literal, class: OperandClass },
}

impl Resolved {
    fn class(&self) -> &OperandClass {
        match self {
            Resolved::Field { class, .. }
            | Resolved::Literal { class, .. }
            | Resolved::Parameter { class, .. } => class,
        }
    }

    fn is_field(&self) -> bool {
        matches!(self, Resolved::Field { .. })
    }
}

impl<'a> Builder<'a> {
    fn build_node(
        &mut self,
        expr: &Expr,
        parent: Option<usize>,
        depth: usize,
    ) -> Result<usize, FilterError> {
        if depth > MAX_DEPTH {
            return Err(FilterError::TooDeep(MAX_DEPTH));
        }
        match expr {
            Expr::And(l, r) => self.build_compound(LogicOp::And, &[l, r], parent, depth),
            Expr::Or(l, r) => self.build_compound(LogicOp::Or, &[l, r], parent, depth),
            Expr::Not(inner) => self.build_compound(LogicOp::Not, &[inner], parent, depth),
            Expr::Comparison { lhs, op, rhs } => self.build_predicate(lhs, *op, rhs, parent),
            Expr::Between {
                field,
                negated,
                low,
                high,
            } => {
                // x BETWEEN a AND b   =>  x >= a AND x <= b
                // x NOT BETWEEN a AND b  =>  x < a OR x > b
                let (logic, low_op, high_op) = if *negated {
                    (LogicOp::Or, RelOp::Lt, RelOp::Gt)
                } else {
                    (LogicOp::And, RelOp::Ge, RelOp::Le)
                };
                let idx = self.tree.push(
                    parent,
                    ConditionNode::Compound {
                        op: logic,
                        children_decided: 0,
                    },
                );
                let lhs = Operand::Field(field.clone());
                self.build_predicate(&lhs, low_op, low, Some(idx))?;
                self.build_predicate(&lhs, high_op, high, Some(idx))?;
                Ok(idx)
            }
        }
    }

    fn build_compound(
        &mut self,
        op: LogicOp,
        children: &[&Expr],
        parent: Option<usize>,
        depth: usize,
    ) -> Result<usize, FilterError> {
        let idx = self.tree.push(
            parent,
            ConditionNode::Compound {
                op,
                children_decided: 0,
            },
        );
        for child in children {
            self.build_node(child, Some(idx), depth + 1)?;
        }
        Ok(idx)
    }

    fn build_predicate(
        &mut self,
        lhs: &Operand,
        op: RelOp,
        rhs: &Operand,
        parent: Option<usize>,
    ) -> Result<usize, FilterError> {
        let left = self.resolve_operand(lhs)?;
        let right = self.resolve_operand(rhs)?;

        if !left.is_field() && !right.is_field() {
            return Err(FilterError::IncompatibleTypes(
                "comparison requires at least one field operand".into(),
            ));
        }

        match op {
            RelOp::Like | RelOp::Match => self.check_pattern_types(&left, &right)?,
            _ => {
                // An enum field against a string literal/parameter is the one
                // pair the matrix admits without same-class equality; the
                // literal must name a variant, which conform_literal checks.
                let enum_vs_name = |field: &Resolved, other: &Resolved| {
                    matches!(field.class(), OperandClass::Enum(_))
                        && field.is_field()
                        && !other.is_field()
                        && other.class().is_textual()
                };
                if !enum_vs_name(&left, &right) && !enum_vs_name(&right, &left) {
                    check_comparable(left.class(), right.class())?;
                }
            }
        }

        let pattern_kind = match op {
            RelOp::Like => Some(RegexKind::Like),
            RelOp::Match => Some(RegexKind::Match),
            _ => None,
        };

        let lhs_class = left.class().clone();
        let rhs_class = right.class().clone();
        let lhs_slot = self.commit_operand(left, rhs_class, op, false, None)?;
        let rhs_slot = self.commit_operand(right, lhs_class, op, true, pattern_kind)?;

        let idx = self.tree.push(parent, ConditionNode::Predicate {
            op,
            lhs: lhs_slot,
            rhs: rhs_slot,
        });
        for slot in [lhs_slot, rhs_slot] {
            if matches!(self.operands.slot(slot), OperandSlot::Field(_)) {
                self.operands.add_parent(slot, idx);
            }
        }
        Ok(idx)
    }

    /// LIKE/MATCH typing: both sides textual, at least one a true string.
    fn check_pattern_types(&self, left: &Resolved, right: &Resolved) -> Result<(), FilterError> {
        let (lc, rc) = (left.class(), right.class());
        if !lc.is_textual() || !rc.is_textual() {
            return Err(FilterError::IncompatibleTypes(format!(
                "LIKE/MATCH requires string operands, got {} and {}",
                lc.describe(),
                rc.describe()
            )));
        }
        if !matches!(lc, OperandClass::Str) && !matches!(rc, OperandClass::Str) {
            return Err(FilterError::IncompatibleTypes(
                "LIKE/MATCH requires at least one string operand".into(),
            ));
        }
        Ok(())
    }

    /// Turn a resolved operand into an arena slot, finalizing its payload
    /// against the peer's class (enum-name resolution) and pattern role.
    fn commit_operand(
        &mut self,
        operand: Resolved,
        peer: OperandClass,
        op: RelOp,
        is_pattern_side: bool,
        pattern_kind: Option<RegexKind>,
    ) -> Result<usize, FilterError> {
        match operand {
            Resolved::Field { slot, .. } => {
                if let Some(kind) = pattern_kind {
                    self.set_slot_pattern(slot, kind)?;
                }
                Ok(slot)
            }
            Resolved::Literal { literal, .. } => {
                let payload = conform_literal(&literal, &peer)?;
                let mut value = FilterValue::new(payload);
                if let Some(kind) = pattern_kind {
                    value.set_regex_kind(kind)?;
                }
                Ok(self.operands.push(OperandSlot::Literal(value)))
            }
            Resolved::Parameter { ordinal, literal, .. } => {
                let payload = conform_literal(&literal, &peer)?;
                let slot = self.parameter_slot(ordinal, &payload)?;
                if let Some(kind) = pattern_kind {
                    self.set_slot_pattern(slot, kind)?;
                }
                if let Some(info) = &mut self.params[ordinal] {
                    info.constraints.push(ParamConstraint {
                        peer,
                        op,
                        is_pattern: is_pattern_side && pattern_kind.is_some(),
                    });
                }
                Ok(slot)
            }
        }
    }

    /// Mark a shared slot as a pattern operand, rejecting conflicting roles.
    fn set_slot_pattern(&mut self, slot: usize, kind: RegexKind) -> Result<(), FilterError> {
        let value = self.operands.slot_mut(slot).value_mut();
        match value.regex_kind() {
            RegexKind::None => value.set_regex_kind(kind),
            existing if existing == kind => Ok(()),
            _ => Err(FilterError::IncompatibleTypes(
                "operand used as both LIKE and MATCH pattern".into(),
            )),
        }
    }

    fn resolve_operand(&mut self, operand: &Operand) -> Result<Resolved, FilterError> {
        match operand {
            Operand::Field(path) => {
                let (slot, class) = self.field_slot(path)?;
                Ok(Resolved::Field { slot, class })
            }
            Operand::Literal(literal) => Ok(Resolved::Literal {
                class: class_of_literal(literal),
                literal: literal.clone(),
            }),
            Operand::Parameter(ordinal) => {
                let text = self
                    .parameters
                    .get(*ordinal)
                    .ok_or(FilterError::ParameterOutOfRange(*ordinal))?;
                let literal = parse_literal(text).map_err(|e| FilterError::InvalidParameter {
                    value: text.clone(),
                    reason: e.to_string(),
                })?;
                Ok(Resolved::Parameter {
                    ordinal: *ordinal,
                    class: class_of_literal(&literal),
                    literal,
                })
            }
        }
    }

    /// Get or create the shared slot for a field path.
    fn field_slot(&mut self, path: &FieldPath) -> Result<(usize, OperandClass), FilterError> {
        let canonical = path.canonical();
        if let Some((slot, class)) = self.field_slots.get(&canonical) {
            return Ok((*slot, class.clone()));
        }

        let (steps, kind, class) = resolve_path(self.descriptor, path)?;
        let field = FilterField::new(canonical.clone(), steps, kind);
        let slot = self.operands.push(OperandSlot::Field(field));
        self.field_slots.insert(canonical, (slot, class.clone()));
        self.fields.push(slot);
        Ok((slot, class))
    }

    /// Get or create the shared slot for a parameter ordinal, checking that
    /// every use agrees on the resolved payload.
    fn parameter_slot(&mut self, ordinal: usize, payload: &Payload) -> Result<usize, FilterError> {
        if self.params.len() <= ordinal {
            self.params.resize_with(ordinal + 1, || None);
        }
        match &self.params[ordinal] {
            Some(info) => {
                let OperandSlot::Parameter(existing) = self.operands.slot(info.slot) else {
                    unreachable!("parameter table entries reference parameter slots");
                };
                if existing.value.payload != *payload {
                    return Err(FilterError::IncompatibleTypes(format!(
                        "parameter %{} is used with incompatible operand types",
                        ordinal
                    )));
                }
                Ok(info.slot)
            }
            None => {
                let param = FilterParameter::new(ordinal, FilterValue::new(payload.clone()));
                let slot = self.operands.push(OperandSlot::Parameter(param));
                self.params[ordinal] = Some(ParamInfo {
                    slot,
                    constraints: Vec::new(),
                });
                Ok(slot)
            }
        }
    }
}

fn class_of_literal(literal: &Literal) -> OperandClass {
    match literal {
        Literal::Bool(_) => OperandClass::Bool,
        Literal::Char(_) => OperandClass::Char,
        Literal::Integer(_) | Literal::Unsigned(_) => OperandClass::Int,
        Literal::Float(_) => OperandClass::Float { single: false },
        Literal::String(_) => OperandClass::Str,
    }
}

pub(crate) fn payload_of_literal(literal: &Literal) -> Payload {
    match literal {
        Literal::Bool(v) => Payload::Bool(*v),
        Literal::Char(v) => Payload::Char(*v),
        Literal::Integer(v) => Payload::SignedInt(*v),
        Literal::Unsigned(v) => Payload::UnsignedInt(*v),
        Literal::Float(v) => Payload::Float(*v),
        Literal::String(v) => Payload::Str(v.clone()),
    }
}

/// The compatibility matrix for relational comparison.
fn check_comparable(a: &OperandClass, b: &OperandClass) -> Result<(), FilterError> {
    use OperandClass::*;
    let ok = match (a, b) {
        (Bool, Bool | Int) | (Int, Bool) => true,
        (Int, Int | Float { .. }) | (Float { .. }, Int | Float { .. }) => true,
        (Int, Enum(_)) | (Enum(_), Int) => true,
        (Enum(x), Enum(y)) => x.name == y.name,
        (Str | Char, Str | Char) => true,
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(FilterError::IncompatibleTypes(format!(
            "cannot compare {} with {}",
            a.describe(),
            b.describe()
        )))
    }
}

/// Final payload of a literal given the peer operand's class.
///
/// String/char literals against an enum peer resolve to the variant value;
/// everything else keeps its parsed payload after a compatibility check.
pub(crate) fn conform_literal(
    literal: &Literal,
    peer: &OperandClass,
) -> Result<Payload, FilterError> {
    if let OperandClass::Enum(desc) = peer {
        let name = match literal {
            Literal::String(s) => Some(s.clone()),
            Literal::Char(c) => Some(c.to_string()),
            _ => None,
        };
        if let Some(name) = name {
            let variant = desc.variant(&name).ok_or_else(|| {
                FilterError::IncompatibleTypes(format!(
                    "'{}' is not a variant of enum {}",
                    name, desc.name
                ))
            })?;
            return Ok(Payload::Enum(variant.value));
        }
    }
    check_comparable(&class_of_literal(literal), peer)?;
    // Constants compared against a 32-bit float field are rounded to the
    // field's precision, so '3.14159' equals a float member set to 3.14159f.
    if let (OperandClass::Float { single: true }, Literal::Float(v)) = (peer, literal) {
        return Ok(Payload::Float(f64::from(*v as f32)));
    }
    Ok(payload_of_literal(literal))
}

/// Validate a parameter literal against one recorded constraint and produce
/// the payload it must take.
pub(crate) fn conform_parameter(
    literal: &Literal,
    constraint: &ParamConstraint,
) -> Result<Payload, FilterError> {
    if matches!(constraint.op, RelOp::Like | RelOp::Match) {
        let class = class_of_literal(literal);
        if !class.is_textual() {
            return Err(FilterError::IncompatibleTypes(format!(
                "LIKE/MATCH parameter must be a string, got {}",
                class.describe()
            )));
        }
        if !matches!(constraint.peer, OperandClass::Str) && !matches!(class, OperandClass::Str) {
            return Err(FilterError::IncompatibleTypes(
                "LIKE/MATCH requires at least one string operand".into(),
            ));
        }
        return Ok(payload_of_literal(literal));
    }
    conform_literal(literal, &constraint.peer)
}

/// Resolve a field path against the type descriptor.
///
/// Returns the member-index steps, the terminal scalar kind used for the
/// runtime read, and the build-time class.
fn resolve_path(
    descriptor: &Arc<TypeDescriptor>,
    path: &FieldPath,
) -> Result<(Vec<FieldStep>, TerminalKind, OperandClass), FilterError> {
    let canonical = path.canonical();
    let mut steps = Vec::with_capacity(path.segments.len());
    let mut current: &TypeDescriptor = descriptor;

    for (i, segment) in path.segments.iter().enumerate() {
        let member_index = current
            .member_index(&segment.name)
            .ok_or_else(|| FilterError::UnknownField(canonical.clone()))?;
        let member = current
            .member(member_index)
            .ok_or_else(|| FilterError::UnknownField(canonical.clone()))?;
        let mut member_type = member.type_desc.resolved();

        if let Some(index) = segment.index {
            member_type = match &member_type.kind {
                TypeKind::Array(arr) => {
                    if index >= arr.length {
                        return Err(FilterError::IndexOutOfBounds {
                            field: canonical.clone(),
                            index,
                        });
                    }
                    arr.element_type.resolved()
                }
                TypeKind::Sequence(seq) => {
                    if let Some(max) = seq.max_length {
                        if index >= max {
                            return Err(FilterError::IndexOutOfBounds {
                                field: canonical.clone(),
                                index,
                            });
                        }
                    }
                    seq.element_type.resolved()
                }
                _ => {
                    return Err(FilterError::InvalidFieldAccess(format!(
                        "'{}': '{}' is not an array or sequence",
                        canonical, segment.name
                    )))
                }
            };
        }

        steps.push(FieldStep {
            member: member_index,
            index: segment.index,
        });

        let last = i + 1 == path.segments.len();
        if last {
            let (kind, class) = terminal_of(member_type).ok_or_else(|| {
                FilterError::InvalidFieldAccess(format!(
                    "'{}' does not resolve to a primitive value",
                    canonical
                ))
            })?;
            return Ok((steps, kind, class));
        }
        if !member_type.is_struct() {
            return Err(FilterError::InvalidFieldAccess(format!(
                "'{}': '{}' is not a struct",
                canonical, segment.name
            )));
        }
        current = member_type;
    }

    // The parser never produces an empty path.
    Err(FilterError::UnknownField(canonical))
}

fn terminal_of(desc: &TypeDescriptor) -> Option<(TerminalKind, OperandClass)> {
    match &desc.kind {
        TypeKind::Primitive(p) => Some(match p {
            PrimitiveKind::Bool => (TerminalKind::Bool, OperandClass::Bool),
            PrimitiveKind::Char => (TerminalKind::Char, OperandClass::Char),
            PrimitiveKind::U64 => (TerminalKind::UnsignedInt, OperandClass::Int),
            PrimitiveKind::U8
            | PrimitiveKind::U16
            | PrimitiveKind::U32
            | PrimitiveKind::I8
            | PrimitiveKind::I16
            | PrimitiveKind::I32
            | PrimitiveKind::I64 => (TerminalKind::SignedInt, OperandClass::Int),
            PrimitiveKind::F32 => (TerminalKind::Float, OperandClass::Float { single: true }),
            PrimitiveKind::F64 => (TerminalKind::Float, OperandClass::Float { single: false }),
            PrimitiveKind::String { .. } => (TerminalKind::Str, OperandClass::Str),
        }),
        TypeKind::Enum(e) => Some((TerminalKind::Enum, OperandClass::Enum(e.clone()))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{EnumVariant, TypeDescriptorBuilder};
    use crate::filter::parser::parse_expression;

    fn test_type() -> Arc<TypeDescriptor> {
        let inner = Arc::new(
            TypeDescriptorBuilder::new("Inner")
                .field("value", PrimitiveKind::I32)
                .build(),
        );
        Arc::new(
            TypeDescriptorBuilder::new("TestType")
                .field("x", PrimitiveKind::I32)
                .field("flag", PrimitiveKind::Bool)
                .field("ratio", PrimitiveKind::F64)
                .field("letter", PrimitiveKind::Char)
                .string_field("name")
                .field("big", PrimitiveKind::U64)
                .enum_field(
                    "color",
                    EnumDescriptor::new(
                        "Color",
                        vec![
                            EnumVariant::new("RED", 0),
                            EnumVariant::new("GREEN", 1),
                            EnumVariant::new("BLUE", 2),
                        ],
                    ),
                )
                .enum_field(
                    "material",
                    EnumDescriptor::new(
                        "Material",
                        vec![EnumVariant::new("WOOD", 0), EnumVariant::new("METAL", 1)],
                    ),
                )
                .nested_field("inner", Arc::clone(&inner))
                .array_field("arr", PrimitiveKind::I16, 3)
                .bounded_sequence_field("seq", PrimitiveKind::U32, 4)
                .sequence_of("items", inner, None)
                .build(),
        )
    }

    fn try_build(expr: &str, params: &[&str]) -> Result<FilterExpression, FilterError> {
        let ast = parse_expression(expr)?;
        let params: Vec<String> = params.iter().map(|s| s.to_string()).collect();
        build(ast.as_ref(), &test_type(), &params)
    }

    #[test]
    fn test_build_accepts_valid_paths() {
        assert!(try_build("x = 1", &[]).is_ok());
        assert!(try_build("inner.value = 1", &[]).is_ok());
        assert!(try_build("arr[2] = 1", &[]).is_ok());
        assert!(try_build("seq[3] = 1", &[]).is_ok());
        assert!(try_build("items[9].value = 1", &[]).is_ok());
    }

    #[test]
    fn test_build_rejects_bad_paths() {
        assert!(matches!(
            try_build("missing = 1", &[]),
            Err(FilterError::UnknownField(_))
        ));
        assert!(matches!(
            try_build("inner.missing = 1", &[]),
            Err(FilterError::UnknownField(_))
        ));
        // Indexing a non-collection member.
        assert!(matches!(
            try_build("x[0] = 1", &[]),
            Err(FilterError::InvalidFieldAccess(_))
        ));
        // A struct is not a value.
        assert!(matches!(
            try_build("inner = 1", &[]),
            Err(FilterError::InvalidFieldAccess(_))
        ));
        // A collection needs an index.
        assert!(matches!(
            try_build("arr = 1", &[]),
            Err(FilterError::InvalidFieldAccess(_))
        ));
        // Member access through a primitive.
        assert!(matches!(
            try_build("x.y = 1", &[]),
            Err(FilterError::InvalidFieldAccess(_))
        ));
    }

    #[test]
    fn test_build_checks_constant_index_bounds() {
        assert!(matches!(
            try_build("arr[3] = 1", &[]),
            Err(FilterError::IndexOutOfBounds { index: 3, .. })
        ));
        assert!(matches!(
            try_build("seq[4] = 1", &[]),
            Err(FilterError::IndexOutOfBounds { index: 4, .. })
        ));
        // Unbounded sequences accept any constant index at build time.
        assert!(try_build("items[100].value = 1", &[]).is_ok());
    }

    #[test]
    fn test_compatibility_matrix() {
        // BOOL ~ {BOOL, INT}
        assert!(try_build("flag = TRUE", &[]).is_ok());
        assert!(try_build("flag = 1", &[]).is_ok());
        assert!(try_build("flag = 1.0", &[]).is_err());
        assert!(try_build("flag = 'x'", &[]).is_err());
        // INT ~ {BOOL, INT, FLOAT, ENUM}
        assert!(try_build("x = TRUE", &[]).is_ok());
        assert!(try_build("x = 5", &[]).is_ok());
        assert!(try_build("x = 5.0", &[]).is_ok());
        assert!(try_build("x = color", &[]).is_ok());
        assert!(try_build("x = 'abc'", &[]).is_err());
        // FLOAT ~ {INT, FLOAT}
        assert!(try_build("ratio = 5", &[]).is_ok());
        assert!(try_build("ratio = TRUE", &[]).is_err());
        // CHAR/STRING family
        assert!(try_build("letter = 'a'", &[]).is_ok());
        assert!(try_build("letter = 'abc'", &[]).is_ok());
        assert!(try_build("name = 'a'", &[]).is_ok());
        assert!(try_build("name = letter", &[]).is_ok());
        assert!(try_build("name = 5", &[]).is_err());
        // U64 fields are integers.
        assert!(try_build("big = 18446744073709551615", &[]).is_ok());
    }

    #[test]
    fn test_enum_compatibility() {
        assert!(try_build("color = 1", &[]).is_ok());
        assert!(try_build("color = 'RED'", &[]).is_ok());
        assert!(try_build("color = color", &[]).is_ok());
        // Unknown variant name.
        assert!(try_build("color = 'WOOD'", &[]).is_err());
        // Two distinct enum types.
        assert!(try_build("color = material", &[]).is_err());
        // Enum against a string field is not ENUM_STR.
        assert!(try_build("color = name", &[]).is_err());
    }

    #[test]
    fn test_like_match_typing() {
        assert!(try_build("name LIKE 'Jo%'", &[]).is_ok());
        assert!(try_build("name LIKE 'A'", &[]).is_ok());
        assert!(try_build("'XYZ' LIKE name", &[]).is_ok());
        assert!(try_build("name MATCH '.*'", &[]).is_ok());
        assert!(try_build("letter LIKE 'XYZ'", &[]).is_ok());
        // No string operand.
        assert!(try_build("letter LIKE 'A'", &[]).is_err());
        assert!(try_build("x LIKE '5'", &[]).is_err());
        assert!(try_build("x LIKE 5", &[]).is_err());
        assert!(try_build("color MATCH 'RED'", &[]).is_err());
        // Invalid MATCH pattern literal fails at build time.
        assert!(matches!(
            try_build("name MATCH '(['", &[]),
            Err(FilterError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn test_operand_only_comparisons_rejected() {
        assert!(try_build("1 = 1", &[]).is_err());
        assert!(try_build("'a' = 'b'", &[]).is_err());
        assert!(try_build("%0 = 1", &["1"]).is_err());
    }

    #[test]
    fn test_parameter_checks() {
        assert!(try_build("x > %0", &["5"]).is_ok());
        assert!(try_build("x > %0", &[]).is_err());
        assert!(try_build("x > %1", &["5"]).is_err());
        assert!(try_build("name LIKE %0", &["'J%'"]).is_ok());
        // Non-string parameter for LIKE.
        assert!(try_build("name LIKE %0", &["5"]).is_err());
        // Unparseable parameter literal.
        assert!(try_build("x > %0", &["'unterminated"]).is_err());
        // Enum-name parameter.
        assert!(try_build("color = %0", &["'GREEN'"]).is_ok());
        assert!(try_build("color = %0", &["'CYAN'"]).is_err());
    }

    #[test]
    fn test_shared_field_slots() {
        let expr = try_build("x > 1 AND x < 10", &[]).unwrap();
        // One shared slot for 'x' plus two literals.
        assert_eq!(expr.field_count(), 1);
    }

    #[test]
    fn test_between_desugars_to_compound() {
        let expr = try_build("x BETWEEN 1 AND 10", &[]).unwrap();
        // Root AND plus two predicates.
        assert_eq!(expr.condition_count(), 3);
        assert_eq!(expr.field_count(), 1);
        assert!(try_build("x NOT BETWEEN %0 AND %1", &["1", "10"]).is_ok());
        assert!(try_build("1 BETWEEN 1 AND 10", &[]).is_err());
    }

    #[test]
    fn test_empty_expression_builds() {
        let expr = try_build("", &[]).unwrap();
        assert_eq!(expr.condition_count(), 0);
    }
}
