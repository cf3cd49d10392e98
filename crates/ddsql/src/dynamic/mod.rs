// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime type and data model for filterable samples.
//!
//! This is the typed-sample layer the filter engine reads through: type
//! descriptors built at runtime, a type-erased data container addressed by
//! member index, and a CDR codec for the RTPS serialized representation.
//!
//! # Example
//!
//! ```rust
//! use ddsql::dynamic::{TypeDescriptorBuilder, DynamicData, PrimitiveKind, encode_sample};
//! use std::sync::Arc;
//!
//! let descriptor = Arc::new(TypeDescriptorBuilder::new("SensorReading")
//!     .field("sensor_id", PrimitiveKind::U32)
//!     .field("temperature", PrimitiveKind::F64)
//!     .build());
//!
//! let mut data = DynamicData::new(&descriptor);
//! data.set("sensor_id", 42u32).unwrap();
//! data.set("temperature", 23.5f64).unwrap();
//!
//! let payload = encode_sample(&data).unwrap();
//! assert_eq!(payload[..2], [0x00, 0x01]); // CDR_LE
//! ```

mod builder;
mod cdr;
mod data;
mod descriptor;

pub use builder::TypeDescriptorBuilder;
pub use cdr::{decode_body, decode_sample, encode_sample, CdrError, CDR_BE, CDR_LE};
pub use data::{DynamicData, DynamicDataError, DynamicValue};
pub use descriptor::{
    ArrayDescriptor, EnumDescriptor, EnumVariant, FieldDescriptor, PrimitiveKind,
    SequenceDescriptor, TypeDescriptor, TypeKind,
};
