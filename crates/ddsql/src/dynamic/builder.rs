// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for TypeDescriptor.

use crate::dynamic::{
    ArrayDescriptor, EnumDescriptor, FieldDescriptor, PrimitiveKind, SequenceDescriptor,
    TypeDescriptor, TypeKind,
};
use std::sync::Arc;

/// Builder for creating struct [`TypeDescriptor`] instances.
#[derive(Debug)]
pub struct TypeDescriptorBuilder {
    name: String,
    members: Vec<FieldDescriptor>,
}

impl TypeDescriptorBuilder {
    /// Create a new builder for a struct type.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a primitive member.
    pub fn field(mut self, name: impl Into<String>, kind: PrimitiveKind) -> Self {
        let type_desc = Arc::new(TypeDescriptor::primitive("", kind));
        self.members.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add a member with an explicit type descriptor.
    pub fn field_with_type(
        mut self,
        name: impl Into<String>,
        type_desc: Arc<TypeDescriptor>,
    ) -> Self {
        self.members.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add an unbounded string member.
    pub fn string_field(self, name: impl Into<String>) -> Self {
        self.field(name, PrimitiveKind::String { max_length: None })
    }

    /// Add a bounded string member.
    pub fn bounded_string_field(self, name: impl Into<String>, max_length: usize) -> Self {
        self.field(
            name,
            PrimitiveKind::String {
                max_length: Some(max_length),
            },
        )
    }

    /// Add an enum member.
    pub fn enum_field(mut self, name: impl Into<String>, desc: EnumDescriptor) -> Self {
        let type_desc = Arc::new(TypeDescriptor::new(desc.name.clone(), TypeKind::Enum(desc)));
        self.members.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add an unbounded sequence member with primitive elements.
    pub fn sequence_field(mut self, name: impl Into<String>, element_kind: PrimitiveKind) -> Self {
        let element_type = Arc::new(TypeDescriptor::primitive("", element_kind));
        let seq = SequenceDescriptor::unbounded(element_type);
        let type_desc = Arc::new(TypeDescriptor::new("", TypeKind::Sequence(seq)));
        self.members.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add a bounded sequence member with primitive elements.
    pub fn bounded_sequence_field(
        mut self,
        name: impl Into<String>,
        element_kind: PrimitiveKind,
        max_length: usize,
    ) -> Self {
        let element_type = Arc::new(TypeDescriptor::primitive("", element_kind));
        let seq = SequenceDescriptor::bounded(element_type, max_length);
        let type_desc = Arc::new(TypeDescriptor::new("", TypeKind::Sequence(seq)));
        self.members.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add a sequence member with elements of an explicit type.
    pub fn sequence_of(
        mut self,
        name: impl Into<String>,
        element_type: Arc<TypeDescriptor>,
        max_length: Option<usize>,
    ) -> Self {
        let seq = SequenceDescriptor {
            element_type,
            max_length,
        };
        let type_desc = Arc::new(TypeDescriptor::new("", TypeKind::Sequence(seq)));
        self.members.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add an array member with primitive elements.
    pub fn array_field(
        mut self,
        name: impl Into<String>,
        element_kind: PrimitiveKind,
        length: usize,
    ) -> Self {
        let element_type = Arc::new(TypeDescriptor::primitive("", element_kind));
        let arr = ArrayDescriptor::new(element_type, length);
        let type_desc = Arc::new(TypeDescriptor::new("", TypeKind::Array(arr)));
        self.members.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add an array member with elements of an explicit type.
    pub fn array_of(
        mut self,
        name: impl Into<String>,
        element_type: Arc<TypeDescriptor>,
        length: usize,
    ) -> Self {
        let arr = ArrayDescriptor::new(element_type, length);
        let type_desc = Arc::new(TypeDescriptor::new("", TypeKind::Array(arr)));
        self.members.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Add a nested struct member.
    pub fn nested_field(mut self, name: impl Into<String>, nested: Arc<TypeDescriptor>) -> Self {
        let type_desc = Arc::new(TypeDescriptor::new("", TypeKind::Nested(nested)));
        self.members.push(FieldDescriptor::new(name, type_desc));
        self
    }

    /// Build the TypeDescriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor::struct_type(self.name, self.members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic::EnumVariant;

    #[test]
    fn test_builder_member_order() {
        let desc = TypeDescriptorBuilder::new("Sensor")
            .field("id", PrimitiveKind::U32)
            .field("value", PrimitiveKind::F64)
            .string_field("label")
            .build();

        assert_eq!(desc.name, "Sensor");
        assert_eq!(desc.member_index("id"), Some(0));
        assert_eq!(desc.member_index("value"), Some(1));
        assert_eq!(desc.member_index("label"), Some(2));
    }

    #[test]
    fn test_builder_enum_field() {
        let desc = TypeDescriptorBuilder::new("Shape")
            .enum_field(
                "color",
                EnumDescriptor::new(
                    "Color",
                    vec![EnumVariant::new("RED", 0), EnumVariant::new("GREEN", 1)],
                ),
            )
            .build();

        let member = desc.member(0).expect("color member");
        assert!(matches!(member.type_desc.kind, TypeKind::Enum(_)));
    }

    #[test]
    fn test_builder_collections() {
        let inner = Arc::new(
            TypeDescriptorBuilder::new("Inner")
                .field("v", PrimitiveKind::I16)
                .build(),
        );

        let desc = TypeDescriptorBuilder::new("Outer")
            .array_field("arr", PrimitiveKind::U8, 8)
            .bounded_sequence_field("seq", PrimitiveKind::I32, 4)
            .sequence_of("structs", inner, None)
            .build();

        assert!(matches!(
            desc.member(0).unwrap().type_desc.kind,
            TypeKind::Array(_)
        ));
        assert!(matches!(
            desc.member(1).unwrap().type_desc.kind,
            TypeKind::Sequence(_)
        ));
        assert!(matches!(
            desc.member(2).unwrap().type_desc.kind,
            TypeKind::Sequence(_)
        ));
    }
}
