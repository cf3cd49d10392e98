// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-sample evaluation orchestration.
//!
//! A [`FilterExpression`] owns the operand arena, the condition tree, and the
//! parameter table of one compiled filter. Evaluation deserializes the
//! payload, resets the tree, then pushes field values in a stable order until
//! the root condition is decided.
//!
//! Evaluation takes `&mut self`: one expression instance must not be shared
//! by concurrently evaluating readers. Clone the expression (cheap, the graph
//! is small) or serialize access externally.

use std::sync::Arc;

use super::builder::{conform_parameter, payload_of_literal, ParamConstraint};
use super::condition::{ConditionState, ConditionTree};
use super::field::{OperandArena, OperandSlot};
use super::parser::parse_literal;
use super::value::{FilterValue, Payload};
use super::FilterError;
use crate::dynamic::{decode_sample, TypeDescriptor};

/// Per-ordinal parameter bookkeeping.
#[derive(Debug, Clone)]
pub(crate) struct ParamInfo {
    /// Operand arena slot of the parameter.
    pub slot: usize,
    /// Every predicate's requirement this parameter has to satisfy.
    pub constraints: Vec<ParamConstraint>,
}

/// A compiled filter expression ready to evaluate serialized samples.
#[derive(Debug, Clone)]
pub struct FilterExpression {
    descriptor: Arc<TypeDescriptor>,
    operands: OperandArena,
    tree: ConditionTree,
    root: Option<usize>,
    /// Field slot indices in stable (first-reference) order.
    fields: Vec<usize>,
    /// Parameter table indexed by `%N` ordinal.
    params: Vec<Option<ParamInfo>>,
}

impl FilterExpression {
    pub(crate) fn from_parts(
        descriptor: Arc<TypeDescriptor>,
        operands: OperandArena,
        tree: ConditionTree,
        root: Option<usize>,
        fields: Vec<usize>,
        params: Vec<Option<ParamInfo>>,
    ) -> Self {
        Self {
            descriptor,
            operands,
            tree,
            root,
            fields,
            params,
        }
    }

    /// The sample type this expression was compiled against.
    pub fn type_descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Reconfigure the sample buffer descriptor.
    ///
    /// The new descriptor must describe the same structure the expression
    /// was compiled against (refreshed registration of the same type).
    pub fn set_type(&mut self, descriptor: Arc<TypeDescriptor>) {
        self.descriptor = descriptor;
    }

    /// Evaluate a serialized sample against the filter.
    ///
    /// Any failure on the data path (deserialization, unresolved field)
    /// rejects the sample; this never panics on malformed input.
    pub fn evaluate(&mut self, payload: &[u8]) -> bool {
        let sample = match decode_sample(payload, &self.descriptor) {
            Ok(sample) => sample,
            Err(e) => {
                log::debug!("[filter] rejecting sample, deserialization failed: {}", e);
                return false;
            }
        };

        self.tree.reset();
        self.operands.reset_fields();

        let Some(root) = self.root else {
            // Empty expression: every well-formed sample passes.
            return true;
        };

        for i in 0..self.fields.len() {
            if self.tree.state(root) != ConditionState::Undecided {
                break;
            }
            let slot = self.fields[i];
            let resolved = match self.operands.slot_mut(slot) {
                OperandSlot::Field(field) => field.set_value(sample.value()),
                _ => unreachable!("field table entries reference field slots"),
            };
            if !resolved {
                log::debug!("[filter] rejecting sample, field {} unresolved", slot);
                return false;
            }
            for &predicate in self.operands.parents(slot) {
                self.tree.operand_changed(predicate, &self.operands);
            }
        }

        self.tree.state(root) == ConditionState::True
    }

    /// Replace the `%N` parameter values.
    ///
    /// Every literal is parsed and validated against the constraints recorded
    /// at build time before anything is assigned: on error the previous
    /// values stay in effect and evaluation behavior is unchanged.
    pub fn set_parameters(&mut self, values: &[String]) -> Result<(), FilterError> {
        let mut staged: Vec<(usize, Payload)> = Vec::new();

        for (ordinal, info) in self.params.iter().enumerate() {
            let Some(info) = info else { continue };
            let text = values
                .get(ordinal)
                .ok_or(FilterError::ParameterOutOfRange(ordinal))?;
            let literal = parse_literal(text).map_err(|e| FilterError::InvalidParameter {
                value: text.clone(),
                reason: e.to_string(),
            })?;

            let mut payload: Option<Payload> = None;
            for constraint in &info.constraints {
                let conformed = conform_parameter(&literal, constraint)?;
                match &payload {
                    None => payload = Some(conformed),
                    Some(previous) if *previous == conformed => {}
                    Some(_) => {
                        return Err(FilterError::IncompatibleTypes(format!(
                            "parameter %{} is used with incompatible operand types",
                            ordinal
                        )))
                    }
                }
            }
            let payload = payload.unwrap_or_else(|| payload_of_literal(&literal));

            // A pattern parameter must compile before anything is committed.
            if let Some(kind) = info
                .constraints
                .iter()
                .find_map(ParamConstraint::pattern_kind)
            {
                let mut candidate = FilterValue::new(payload.clone());
                candidate.set_regex_kind(kind)?;
            }

            staged.push((info.slot, payload));
        }

        for (slot, payload) in staged {
            match self.operands.slot_mut(slot) {
                OperandSlot::Parameter(param) => param.assign(payload),
                _ => unreachable!("parameter table entries reference parameter slots"),
            }
        }
        Ok(())
    }

    /// Number of distinct fields referenced by the expression.
    pub(crate) fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Number of condition nodes.
    pub(crate) fn condition_count(&self) -> usize {
        self.tree.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::{
        encode_sample, DynamicData, PrimitiveKind, TypeDescriptorBuilder,
    };
    use crate::filter::builder::build;
    use crate::filter::parser::parse_expression;

    fn point_type() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptorBuilder::new("Point")
                .field("x", PrimitiveKind::I32)
                .field("y", PrimitiveKind::I32)
                .build(),
        )
    }

    fn compile(expr: &str, descriptor: &Arc<TypeDescriptor>, params: &[&str]) -> FilterExpression {
        let ast = parse_expression(expr).expect("parse");
        let params: Vec<String> = params.iter().map(|s| s.to_string()).collect();
        build(ast.as_ref(), descriptor, &params).expect("build")
    }

    fn point(x: i32, y: i32) -> Vec<u8> {
        let descriptor = point_type();
        let mut data = DynamicData::new(&descriptor);
        data.set("x", x).unwrap();
        data.set("y", y).unwrap();
        encode_sample(&data).unwrap()
    }

    #[test]
    fn test_and_expression_end_to_end() {
        let descriptor = point_type();
        let mut filter = compile("x = 5 AND y < 10", &descriptor, &[]);

        assert!(filter.evaluate(&point(5, 3)));
        assert!(!filter.evaluate(&point(5, 20)));
        assert!(!filter.evaluate(&point(4, 3)));
    }

    #[test]
    fn test_like_expression_end_to_end() {
        let descriptor = Arc::new(
            TypeDescriptorBuilder::new("Person")
                .string_field("name")
                .build(),
        );
        let mut filter = compile("name LIKE 'Jo%'", &descriptor, &[]);

        let sample = |name: &str| {
            let mut data = DynamicData::new(&descriptor);
            data.set("name", name).unwrap();
            encode_sample(&data).unwrap()
        };

        assert!(filter.evaluate(&sample("John")));
        assert!(filter.evaluate(&sample("Joan")));
        assert!(!filter.evaluate(&sample("Amy")));
    }

    #[test]
    fn test_parameter_update_retriggers_evaluation() {
        let descriptor = Arc::new(
            TypeDescriptorBuilder::new("Reading")
                .field("level", PrimitiveKind::I32)
                .build(),
        );
        let mut filter = compile("level > %0", &descriptor, &["3"]);

        let sample = |level: i32| {
            let mut data = DynamicData::new(&descriptor);
            data.set("level", level).unwrap();
            encode_sample(&data).unwrap()
        };

        assert!(filter.evaluate(&sample(5)));
        assert!(!filter.evaluate(&sample(2)));

        filter.set_parameters(&["10".to_string()]).expect("update");
        assert!(!filter.evaluate(&sample(5)));
        assert!(filter.evaluate(&sample(11)));
    }

    #[test]
    fn test_failed_parameter_update_preserves_state() {
        let descriptor = Arc::new(
            TypeDescriptorBuilder::new("Reading")
                .field("level", PrimitiveKind::I32)
                .build(),
        );
        let mut filter = compile("level > %0", &descriptor, &["3"]);

        let sample = |level: i32| {
            let mut data = DynamicData::new(&descriptor);
            data.set("level", level).unwrap();
            encode_sample(&data).unwrap()
        };

        assert!(filter.evaluate(&sample(5)));

        // Unparseable literal: rejected, old threshold still applies.
        assert!(filter.set_parameters(&["'bad".to_string()]).is_err());
        assert!(filter.evaluate(&sample(5)));
        assert!(!filter.evaluate(&sample(2)));

        // Type-incompatible literal: same.
        assert!(filter.set_parameters(&["'abc'".to_string()]).is_err());
        assert!(filter.evaluate(&sample(5)));

        // Missing value: same.
        assert!(filter.set_parameters(&[]).is_err());
        assert!(filter.evaluate(&sample(5)));
    }

    #[test]
    fn test_malformed_payload_rejected() {
        let descriptor = point_type();
        let mut filter = compile("x = 5", &descriptor, &[]);

        assert!(!filter.evaluate(&[]));
        assert!(!filter.evaluate(&[0x00]));
        assert!(!filter.evaluate(&[0x00, 0x01, 0x00, 0x00])); // header only
        assert!(!filter.evaluate(&[0x00, 0x01, 0x00, 0x00, 0x05])); // truncated body
        assert!(!filter.evaluate(&[0xFF, 0xFF, 0x00, 0x00, 0x05, 0, 0, 0])); // bad header

        // A well-formed payload still passes afterwards.
        assert!(filter.evaluate(&point(5, 0)));
    }

    #[test]
    fn test_empty_expression_accepts_wellformed_samples_only() {
        let descriptor = point_type();
        let ast = parse_expression("").unwrap();
        let mut filter = build(ast.as_ref(), &descriptor, &[]).expect("build");

        assert!(filter.evaluate(&point(1, 2)));
        assert!(!filter.evaluate(&[0x00, 0x01, 0x00])); // malformed still rejected
    }

    #[test]
    fn test_root_short_circuit_skips_remaining_fields() {
        // The second disjunct references seq[1], which the sample does not
        // populate. If evaluation short-circuits after x = 5 decides the
        // root, the unresolvable field is never walked and the sample passes.
        let descriptor = Arc::new(
            TypeDescriptorBuilder::new("WithSeq")
                .field("x", PrimitiveKind::I32)
                .bounded_sequence_field("seq", PrimitiveKind::I32, 4)
                .build(),
        );
        let mut filter = compile("x = 5 OR seq[1] > 0", &descriptor, &[]);

        let sample = |x: i32| {
            let mut data = DynamicData::new(&descriptor);
            data.set("x", x).unwrap();
            encode_sample(&data).unwrap()
        };

        assert!(filter.evaluate(&sample(5)));
        // Root undecided after x = 4, so the missing element is reached and
        // rejects the sample.
        assert!(!filter.evaluate(&sample(4)));
    }

    #[test]
    fn test_unresolved_field_rejects_sample() {
        let descriptor = Arc::new(
            TypeDescriptorBuilder::new("WithSeq")
                .bounded_sequence_field("seq", PrimitiveKind::I32, 4)
                .build(),
        );
        // NE would be true for any present value, but the element is absent.
        let mut filter = compile("seq[2] <> 0", &descriptor, &[]);

        let data = DynamicData::new(&descriptor);
        let payload = encode_sample(&data).unwrap();
        assert!(!filter.evaluate(&payload));
    }

    #[test]
    fn test_between_end_to_end() {
        let descriptor = point_type();
        let mut inside = compile("x BETWEEN 1 AND 10", &descriptor, &[]);
        let mut outside = compile("x NOT BETWEEN 1 AND 10", &descriptor, &[]);

        for (x, expect) in [(0, false), (1, true), (5, true), (10, true), (11, false)] {
            assert_eq!(inside.evaluate(&point(x, 0)), expect, "x = {}", x);
            assert_eq!(outside.evaluate(&point(x, 0)), !expect, "x = {}", x);
        }
    }

    #[test]
    fn test_clone_gives_independent_instance() {
        let descriptor = point_type();
        let mut a = compile("x > %0", &descriptor, &["5"]);
        let mut b = a.clone();

        b.set_parameters(&["100".to_string()]).unwrap();
        assert!(a.evaluate(&point(10, 0)));
        assert!(!b.evaluate(&point(10, 0)));
    }
}
