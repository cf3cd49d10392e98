// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-erased sample container with index-addressed member access.
//!
//! Struct values store their members as a `Vec` ordered exactly like the
//! members of the corresponding [`TypeDescriptor`], so a field can be reached
//! by walking member indices without any name lookups on the data path.

use crate::dynamic::{EnumDescriptor, PrimitiveKind, TypeDescriptor, TypeKind};
use std::sync::Arc;
use thiserror::Error;

/// Errors for [`DynamicData`] operations.
#[derive(Debug, Clone, Error)]
pub enum DynamicDataError {
    #[error("member not found: {0}")]
    MemberNotFound(String),
    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },
    #[error("invalid operation for type: {0}")]
    InvalidOperation(String),
    #[error("index out of bounds: {index} >= {length}")]
    IndexOutOfBounds { index: usize, length: usize },
}

/// A dynamic value holding any filterable type.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Char(char),
    String(String),
    /// Struct members, ordered by member index.
    Struct(Vec<DynamicValue>),
    Sequence(Vec<DynamicValue>),
    Array(Vec<DynamicValue>),
    /// Underlying 32-bit enum value.
    Enum(i32),
}

impl DynamicValue {
    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as a signed 64-bit integer (any signed or unsigned
    /// sub-64-bit integer widens losslessly).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::U8(v) => Some(i64::from(*v)),
            Self::U16(v) => Some(i64::from(*v)),
            Self::U32(v) => Some(i64::from(*v)),
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as u64.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as f64 (f32 widens).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as char.
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get the underlying enum value.
    pub fn as_enum(&self) -> Option<i32> {
        match self {
            Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    /// Borrow a struct member by index.
    pub fn member(&self, index: usize) -> Option<&DynamicValue> {
        match self {
            Self::Struct(members) => members.get(index),
            _ => None,
        }
    }

    /// Borrow a collection element by index.
    pub fn element(&self, index: usize) -> Option<&DynamicValue> {
        match self {
            Self::Sequence(v) | Self::Array(v) => v.get(index),
            _ => None,
        }
    }

    /// Number of elements (collections only).
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Sequence(v) | Self::Array(v) => Some(v.len()),
            _ => None,
        }
    }

    /// True for an empty collection.
    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|l| l == 0)
    }
}

macro_rules! impl_from_primitive {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for DynamicValue {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_primitive!(bool, Bool);
impl_from_primitive!(u8, U8);
impl_from_primitive!(u16, U16);
impl_from_primitive!(u32, U32);
impl_from_primitive!(u64, U64);
impl_from_primitive!(i8, I8);
impl_from_primitive!(i16, I16);
impl_from_primitive!(i32, I32);
impl_from_primitive!(i64, I64);
impl_from_primitive!(f32, F32);
impl_from_primitive!(f64, F64);
impl_from_primitive!(char, Char);
impl_from_primitive!(String, String);

impl From<&str> for DynamicValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// Typed sample buffer: a [`DynamicValue`] tree paired with its descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicData {
    descriptor: Arc<TypeDescriptor>,
    value: DynamicValue,
}

impl DynamicData {
    /// Create new data with default (zero) values.
    pub fn new(descriptor: &Arc<TypeDescriptor>) -> Self {
        Self {
            descriptor: Arc::clone(descriptor),
            value: default_value(&descriptor.kind),
        }
    }

    /// Create from an existing value.
    pub fn from_value(descriptor: &Arc<TypeDescriptor>, value: DynamicValue) -> Self {
        Self {
            descriptor: Arc::clone(descriptor),
            value,
        }
    }

    /// Get the type descriptor.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Get the underlying value tree.
    pub fn value(&self) -> &DynamicValue {
        &self.value
    }

    /// Get mutable access to the value tree.
    pub fn value_mut(&mut self) -> &mut DynamicValue {
        &mut self.value
    }

    /// Set a top-level struct member by name.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<DynamicValue>,
    ) -> Result<(), DynamicDataError> {
        let index = self
            .descriptor
            .member_index(name)
            .ok_or_else(|| DynamicDataError::MemberNotFound(name.to_string()))?;
        match &mut self.value {
            DynamicValue::Struct(members) => {
                let length = members.len();
                match members.get_mut(index) {
                    Some(slot) => {
                        *slot = value.into();
                        Ok(())
                    }
                    None => Err(DynamicDataError::IndexOutOfBounds { index, length }),
                }
            }
            _ => Err(DynamicDataError::InvalidOperation(
                "set requires struct type".into(),
            )),
        }
    }

    /// Borrow a top-level struct member by name.
    pub fn get(&self, name: &str) -> Result<&DynamicValue, DynamicDataError> {
        let index = self
            .descriptor
            .member_index(name)
            .ok_or_else(|| DynamicDataError::MemberNotFound(name.to_string()))?;
        self.value
            .member(index)
            .ok_or_else(|| DynamicDataError::MemberNotFound(name.to_string()))
    }
}

/// Build the default value for a type kind.
fn default_value(kind: &TypeKind) -> DynamicValue {
    match kind {
        TypeKind::Primitive(p) => default_primitive(*p),
        TypeKind::Struct(members) => DynamicValue::Struct(
            members
                .iter()
                .map(|m| default_value(&m.type_desc.kind))
                .collect(),
        ),
        TypeKind::Sequence(_) => DynamicValue::Sequence(Vec::new()),
        TypeKind::Array(arr) => {
            let elem = default_value(&arr.element_type.kind);
            DynamicValue::Array(vec![elem; arr.length])
        }
        TypeKind::Enum(e) => DynamicValue::Enum(default_enum_value(e)),
        TypeKind::Nested(inner) => default_value(&inner.kind),
    }
}

fn default_enum_value(e: &EnumDescriptor) -> i32 {
    e.variants.first().map(|v| v.value).unwrap_or(0)
}

fn default_primitive(kind: PrimitiveKind) -> DynamicValue {
    match kind {
        PrimitiveKind::Bool => DynamicValue::Bool(false),
        PrimitiveKind::U8 => DynamicValue::U8(0),
        PrimitiveKind::U16 => DynamicValue::U16(0),
        PrimitiveKind::U32 => DynamicValue::U32(0),
        PrimitiveKind::U64 => DynamicValue::U64(0),
        PrimitiveKind::I8 => DynamicValue::I8(0),
        PrimitiveKind::I16 => DynamicValue::I16(0),
        PrimitiveKind::I32 => DynamicValue::I32(0),
        PrimitiveKind::I64 => DynamicValue::I64(0),
        PrimitiveKind::F32 => DynamicValue::F32(0.0),
        PrimitiveKind::F64 => DynamicValue::F64(0.0),
        PrimitiveKind::Char => DynamicValue::Char('\0'),
        PrimitiveKind::String { .. } => DynamicValue::String(String::new()),
    }
}
