// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type descriptors for filterable sample types.
//!
//! A [`TypeDescriptor`] describes the shape of a topic data type at runtime:
//! structs with ordered members, primitives, strings, enumerations, fixed
//! arrays and bounded/unbounded sequences. Filter expressions are compiled
//! against a descriptor, and serialized samples are decoded through it.

use std::sync::Arc;

/// Primitive type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Char,
    String { max_length: Option<usize> },
}

/// Type kind enumeration.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Primitive type.
    Primitive(PrimitiveKind),
    /// Struct with named, ordered members.
    Struct(Vec<FieldDescriptor>),
    /// Sequence (dynamic length, optionally bounded).
    Sequence(SequenceDescriptor),
    /// Array (fixed length).
    Array(ArrayDescriptor),
    /// Enumeration with a 32-bit underlying value.
    Enum(EnumDescriptor),
    /// Nested type reference.
    Nested(Arc<TypeDescriptor>),
}

/// A complete type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Type name.
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// Create a new type descriptor.
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Create a primitive type descriptor.
    pub fn primitive(name: impl Into<String>, kind: PrimitiveKind) -> Self {
        Self::new(name, TypeKind::Primitive(kind))
    }

    /// Create a struct type descriptor.
    pub fn struct_type(name: impl Into<String>, members: Vec<FieldDescriptor>) -> Self {
        Self::new(name, TypeKind::Struct(members))
    }

    /// Check if this is a struct type.
    pub fn is_struct(&self) -> bool {
        matches!(self.resolved().kind, TypeKind::Struct(_))
    }

    /// Get members if this is a struct.
    pub fn members(&self) -> Option<&[FieldDescriptor]> {
        match &self.resolved().kind {
            TypeKind::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Get member index by name.
    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members()?.iter().position(|m| m.name == name)
    }

    /// Get member by index.
    pub fn member(&self, index: usize) -> Option<&FieldDescriptor> {
        self.members()?.get(index)
    }

    /// Follow `Nested` indirections down to the concrete descriptor.
    pub fn resolved(&self) -> &TypeDescriptor {
        let mut desc = self;
        while let TypeKind::Nested(inner) = &desc.kind {
            desc = inner;
        }
        desc
    }
}

/// Member descriptor for struct types.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Member name.
    pub name: String,
    /// Member type.
    pub type_desc: Arc<TypeDescriptor>,
}

impl FieldDescriptor {
    /// Create a new member descriptor.
    pub fn new(name: impl Into<String>, type_desc: Arc<TypeDescriptor>) -> Self {
        Self {
            name: name.into(),
            type_desc,
        }
    }
}

/// Sequence type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceDescriptor {
    /// Element type.
    pub element_type: Arc<TypeDescriptor>,
    /// Maximum length (None = unbounded).
    pub max_length: Option<usize>,
}

impl SequenceDescriptor {
    /// Create unbounded sequence.
    pub fn unbounded(element_type: Arc<TypeDescriptor>) -> Self {
        Self {
            element_type,
            max_length: None,
        }
    }

    /// Create bounded sequence.
    pub fn bounded(element_type: Arc<TypeDescriptor>, max_length: usize) -> Self {
        Self {
            element_type,
            max_length: Some(max_length),
        }
    }
}

/// Array type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDescriptor {
    /// Element type.
    pub element_type: Arc<TypeDescriptor>,
    /// Fixed length.
    pub length: usize,
}

impl ArrayDescriptor {
    /// Create array descriptor.
    pub fn new(element_type: Arc<TypeDescriptor>, length: usize) -> Self {
        Self {
            element_type,
            length,
        }
    }
}

/// Enumeration type descriptor.
///
/// The `name` is the enum's type identity: two enum members are only
/// comparable in a filter expression when their descriptors carry the same
/// name.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    /// Enum type name.
    pub name: String,
    /// Enum variants.
    pub variants: Vec<EnumVariant>,
}

impl EnumDescriptor {
    /// Create enum descriptor.
    pub fn new(name: impl Into<String>, variants: Vec<EnumVariant>) -> Self {
        Self {
            name: name.into(),
            variants,
        }
    }

    /// Get variant by name.
    pub fn variant(&self, name: &str) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Get variant by value.
    pub fn variant_by_value(&self, value: i32) -> Option<&EnumVariant> {
        self.variants.iter().find(|v| v.value == value)
    }
}

/// Enum variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumVariant {
    /// Variant name.
    pub name: String,
    /// Variant value.
    pub value: i32,
}

impl EnumVariant {
    /// Create enum variant.
    pub fn new(name: impl Into<String>, value: i32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}
