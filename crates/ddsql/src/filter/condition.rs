// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Incremental boolean condition evaluation.
//!
//! The condition graph is a flat arena of nodes; children reference their
//! parent by index and decisions propagate bottom-up. There is no top-down
//! tree walk during evaluation: a field mutation notifies its predicates,
//! each decided predicate notifies its parent compound, and so on toward the
//! root. Propagation cost is O(depth) per changed field.
//!
//! Within one evaluation pass a node's state is monotonic: once decided it
//! never changes until the next [`ConditionTree::reset`]. This makes the
//! final root verdict independent of the order in which fields are pushed;
//! ordering only affects how much work short-circuiting skips.

use super::ast::{LogicOp, RelOp};
use super::field::OperandArena;
use std::cmp::Ordering;

/// Tri-state result of a condition node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConditionState {
    Undecided,
    False,
    True,
}

/// Node payload.
#[derive(Debug, Clone)]
pub(crate) enum ConditionNode {
    /// Binary comparison over two operand slots.
    Predicate {
        op: RelOp,
        lhs: usize,
        rhs: usize,
    },
    /// Logical combinator; children are the nodes whose `parent` is this one.
    Compound {
        op: LogicOp,
        children_decided: u8,
    },
}

#[derive(Debug, Clone)]
pub(crate) struct Condition {
    pub state: ConditionState,
    pub parent: Option<usize>,
    pub node: ConditionNode,
}

/// Flat arena of condition nodes.
#[derive(Debug, Clone, Default)]
pub(crate) struct ConditionTree {
    nodes: Vec<Condition>,
}

impl ConditionTree {
    pub fn push(&mut self, parent: Option<usize>, node: ConditionNode) -> usize {
        self.nodes.push(Condition {
            state: ConditionState::Undecided,
            parent,
            node,
        });
        self.nodes.len() - 1
    }

    pub fn state(&self, index: usize) -> ConditionState {
        self.nodes[index].state
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Return every node to Undecided. Never notifies anyone.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.state = ConditionState::Undecided;
            if let ConditionNode::Compound {
                children_decided, ..
            } = &mut node.node
            {
                *children_decided = 0;
            }
        }
    }

    /// An operand referenced by the predicate at `index` changed value.
    ///
    /// Fires only when both operands currently carry a value; a decided
    /// predicate ignores further notifications.
    pub fn operand_changed(&mut self, index: usize, operands: &OperandArena) {
        if self.nodes[index].state != ConditionState::Undecided {
            return;
        }
        let ConditionNode::Predicate { op, lhs, rhs } = self.nodes[index].node else {
            unreachable!("operand notifications target predicates only");
        };
        let (l, r) = (operands.slot(lhs), operands.slot(rhs));
        if !l.has_value() || !r.has_value() {
            return;
        }

        let outcome = match op {
            RelOp::Like | RelOp::Match => l.value().is_like(r.value()),
            _ => {
                let ord = l.value().compare(r.value());
                match op {
                    RelOp::Eq => ord == Ordering::Equal,
                    RelOp::Ne => ord != Ordering::Equal,
                    RelOp::Lt => ord == Ordering::Less,
                    RelOp::Le => ord != Ordering::Greater,
                    RelOp::Gt => ord == Ordering::Greater,
                    RelOp::Ge => ord != Ordering::Less,
                    RelOp::Like | RelOp::Match => unreachable!(),
                }
            }
        };

        self.set_state(
            index,
            if outcome {
                ConditionState::True
            } else {
                ConditionState::False
            },
        );
    }

    /// Transition a node to a decided state and notify its parent.
    /// No-op when the node is already decided.
    fn set_state(&mut self, index: usize, new_state: ConditionState) {
        debug_assert_ne!(new_state, ConditionState::Undecided);
        if self.nodes[index].state != ConditionState::Undecided {
            return;
        }
        self.nodes[index].state = new_state;
        if let Some(parent) = self.nodes[index].parent {
            self.child_changed(parent, new_state);
        }
    }

    /// A child of the compound at `parent` reached a decided state.
    fn child_changed(&mut self, parent: usize, child_state: ConditionState) {
        let op = {
            let ConditionNode::Compound {
                op,
                children_decided,
            } = &mut self.nodes[parent].node
            else {
                unreachable!("child notifications target compounds only");
            };
            *children_decided += 1;
            debug_assert!(*children_decided <= if *op == LogicOp::Not { 1 } else { 2 });
            *op
        };
        if self.nodes[parent].state != ConditionState::Undecided {
            return;
        }
        let decided = match &self.nodes[parent].node {
            ConditionNode::Compound {
                children_decided, ..
            } => *children_decided,
            ConditionNode::Predicate { .. } => unreachable!(),
        };

        match op {
            LogicOp::Not => self.set_state(
                parent,
                if child_state == ConditionState::False {
                    ConditionState::True
                } else {
                    ConditionState::False
                },
            ),
            LogicOp::And => {
                if child_state == ConditionState::False {
                    self.set_state(parent, ConditionState::False);
                } else if decided == 2 {
                    self.set_state(parent, ConditionState::True);
                }
            }
            LogicOp::Or => {
                if child_state == ConditionState::True {
                    self.set_state(parent, ConditionState::True);
                } else if decided == 2 {
                    self.set_state(parent, ConditionState::False);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::field::{FieldStep, FilterField, OperandSlot, TerminalKind};
    use crate::filter::value::{FilterValue, Payload};
    use crate::dynamic::DynamicValue;

    /// One int field at member 0 plus an integer literal, joined by `op`.
    /// Returns (arena, tree, predicate index, field slot index).
    fn single_predicate(op: RelOp, literal: i64) -> (OperandArena, ConditionTree, usize, usize) {
        let mut arena = OperandArena::default();
        let field = arena.push(OperandSlot::Field(FilterField::new(
            "x".into(),
            vec![FieldStep {
                member: 0,
                index: None,
            }],
            TerminalKind::SignedInt,
        )));
        let lit = arena.push(OperandSlot::Literal(FilterValue::new(Payload::SignedInt(
            literal,
        ))));

        let mut tree = ConditionTree::default();
        let pred = tree.push(None, ConditionNode::Predicate {
            op,
            lhs: field,
            rhs: lit,
        });
        arena.add_parent(field, pred);
        (arena, tree, pred, field)
    }

    fn push_field(arena: &mut OperandArena, tree: &mut ConditionTree, slot: usize, value: i64) {
        let sample = DynamicValue::Struct(vec![DynamicValue::I64(value)]);
        let OperandSlot::Field(field) = arena.slot_mut(slot) else {
            panic!("not a field slot");
        };
        assert!(field.set_value(&sample));
        for &p in arena.parents(slot) {
            tree.operand_changed(p, arena);
        }
    }

    #[test]
    fn test_predicate_waits_for_value() {
        let (arena, mut tree, pred, _) = single_predicate(RelOp::Gt, 5);
        // No value pushed yet: notification is a no-op.
        tree.operand_changed(pred, &arena);
        assert_eq!(tree.state(pred), ConditionState::Undecided);
    }

    #[test]
    fn test_predicate_decides_on_value() {
        let (mut arena, mut tree, pred, field) = single_predicate(RelOp::Gt, 5);
        push_field(&mut arena, &mut tree, field, 9);
        assert_eq!(tree.state(pred), ConditionState::True);
    }

    #[test]
    fn test_state_is_monotonic_within_pass() {
        let (mut arena, mut tree, pred, field) = single_predicate(RelOp::Eq, 5);
        push_field(&mut arena, &mut tree, field, 5);
        assert_eq!(tree.state(pred), ConditionState::True);

        // A conflicting late notification must not flip the decision.
        push_field(&mut arena, &mut tree, field, 6);
        assert_eq!(tree.state(pred), ConditionState::True);

        tree.reset();
        arena.reset_fields();
        assert_eq!(tree.state(pred), ConditionState::Undecided);
        push_field(&mut arena, &mut tree, field, 6);
        assert_eq!(tree.state(pred), ConditionState::False);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let (mut arena, mut tree, pred, field) = single_predicate(RelOp::Lt, 5);
        push_field(&mut arena, &mut tree, field, 1);
        assert_eq!(tree.state(pred), ConditionState::True);

        tree.reset();
        assert_eq!(tree.state(pred), ConditionState::Undecided);
        tree.reset();
        assert_eq!(tree.state(pred), ConditionState::Undecided);
    }

    /// AND over two leaf predicates; returns (tree, root, leaf_a, leaf_b)
    /// with leaves that can be decided directly via set_state.
    fn compound(op: LogicOp) -> (ConditionTree, usize, usize, usize) {
        let mut tree = ConditionTree::default();
        let root = tree.push(None, ConditionNode::Compound {
            op,
            children_decided: 0,
        });
        let a = tree.push(Some(root), ConditionNode::Predicate {
            op: RelOp::Eq,
            lhs: 0,
            rhs: 1,
        });
        let b = tree.push(Some(root), ConditionNode::Predicate {
            op: RelOp::Eq,
            lhs: 2,
            rhs: 3,
        });
        (tree, root, a, b)
    }

    #[test]
    fn test_and_short_circuits_on_false() {
        let (mut tree, root, a, b) = compound(LogicOp::And);
        tree.set_state(a, ConditionState::False);
        // Root decided without b ever being visited.
        assert_eq!(tree.state(root), ConditionState::False);
        assert_eq!(tree.state(b), ConditionState::Undecided);
    }

    #[test]
    fn test_and_waits_for_both_on_true() {
        let (mut tree, root, a, b) = compound(LogicOp::And);
        tree.set_state(a, ConditionState::True);
        assert_eq!(tree.state(root), ConditionState::Undecided);
        tree.set_state(b, ConditionState::True);
        assert_eq!(tree.state(root), ConditionState::True);
    }

    #[test]
    fn test_or_short_circuits_on_true() {
        let (mut tree, root, a, b) = compound(LogicOp::Or);
        tree.set_state(a, ConditionState::True);
        assert_eq!(tree.state(root), ConditionState::True);
        assert_eq!(tree.state(b), ConditionState::Undecided);
    }

    #[test]
    fn test_or_waits_for_both_on_false() {
        let (mut tree, root, a, b) = compound(LogicOp::Or);
        tree.set_state(b, ConditionState::False);
        assert_eq!(tree.state(root), ConditionState::Undecided);
        tree.set_state(a, ConditionState::False);
        assert_eq!(tree.state(root), ConditionState::False);
    }

    #[test]
    fn test_evaluation_order_does_not_change_verdict() {
        // a=False, b=True under AND: both orders give False.
        for order in [[true, false], [false, true]] {
            let (mut tree, root, a, b) = compound(LogicOp::And);
            let decide = |tree: &mut ConditionTree, which: bool| {
                if which {
                    tree.set_state(a, ConditionState::False);
                } else {
                    tree.set_state(b, ConditionState::True);
                }
            };
            decide(&mut tree, order[0]);
            decide(&mut tree, order[1]);
            assert_eq!(tree.state(root), ConditionState::False);
        }
    }

    #[test]
    fn test_not_inverts_child() {
        let mut tree = ConditionTree::default();
        let root = tree.push(None, ConditionNode::Compound {
            op: LogicOp::Not,
            children_decided: 0,
        });
        let child = tree.push(Some(root), ConditionNode::Predicate {
            op: RelOp::Eq,
            lhs: 0,
            rhs: 1,
        });
        tree.set_state(child, ConditionState::False);
        assert_eq!(tree.state(root), ConditionState::True);

        tree.reset();
        tree.set_state(child, ConditionState::True);
        assert_eq!(tree.state(root), ConditionState::False);
    }

    #[test]
    fn test_nested_propagation_reaches_root() {
        // NOT (a AND b)
        let mut tree = ConditionTree::default();
        let root = tree.push(None, ConditionNode::Compound {
            op: LogicOp::Not,
            children_decided: 0,
        });
        let and = tree.push(Some(root), ConditionNode::Compound {
            op: LogicOp::And,
            children_decided: 0,
        });
        let a = tree.push(Some(and), ConditionNode::Predicate {
            op: RelOp::Eq,
            lhs: 0,
            rhs: 1,
        });
        let _b = tree.push(Some(and), ConditionNode::Predicate {
            op: RelOp::Eq,
            lhs: 2,
            rhs: 3,
        });

        tree.set_state(a, ConditionState::False);
        assert_eq!(tree.state(and), ConditionState::False);
        assert_eq!(tree.state(root), ConditionState::True);
    }
}
