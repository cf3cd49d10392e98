// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DDSQL - DDS-SQL content filtering for DDS samples
//!
//! A pure Rust implementation of the OMG DDS v1.4 content-filter expression
//! language, built for receive-path filtering: SQL-like expressions compiled
//! once into an incremental condition graph, then evaluated against RTPS
//! serialized payloads without any compile-time type knowledge.
//!
//! ## Quick Start
//!
//! ```rust
//! use ddsql::dynamic::{TypeDescriptorBuilder, DynamicData, PrimitiveKind, encode_sample};
//! use ddsql::filter::ContentFilter;
//! use std::sync::Arc;
//!
//! // Describe the topic data type at runtime
//! let descriptor = Arc::new(TypeDescriptorBuilder::new("SensorReading")
//!     .field("sensor_id", PrimitiveKind::U32)
//!     .field("temperature", PrimitiveKind::F64)
//!     .build());
//!
//! // Compile a filter once
//! let mut filter = ContentFilter::with_parameters(
//!     "temperature > %0",
//!     &descriptor,
//!     vec!["25.0".to_string()],
//! ).unwrap();
//!
//! // Evaluate incoming serialized samples
//! let mut sample = DynamicData::new(&descriptor);
//! sample.set("sensor_id", 7u32).unwrap();
//! sample.set("temperature", 31.5f64).unwrap();
//! assert!(filter.evaluate(&encode_sample(&sample).unwrap()));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |  ContentFilter / ContentFilterFactory                            |
//! |  expression text + parameters + compiled FilterExpression        |
//! +------------------------------------------------------------------+
//! |  filter: parser -> AST -> builder -> condition graph             |
//! |  FilterValue promotion | predicates | AND/OR/NOT short-circuit   |
//! +------------------------------------------------------------------+
//! |  dynamic: TypeDescriptor | DynamicData | CDR codec               |
//! +------------------------------------------------------------------+
//! ```
//!
//! Per sample: deserialize -> reset graph -> push field values in stable
//! order -> read the root condition. Decisions propagate bottom-up from
//! changed leaves, so evaluation stops as soon as the root is decided and
//! unneeded fields are never read.
//!
//! ## Modules Overview
//!
//! - [`filter`] - The filter engine (start here)
//! - [`dynamic`] - Runtime type descriptors, dynamic data, CDR codec
//!
//! ## See Also
//!
//! - [DDS Specification](https://www.omg.org/spec/DDS/1.4/) Annex B, SQL subset
//! - [RTPS Specification](https://www.omg.org/spec/DDSI-RTPS/2.5/)

/// Runtime type and data model for filterable samples.
pub mod dynamic;
/// DDS-SQL expression parsing, compilation and evaluation.
pub mod filter;

pub use filter::{ContentFilter, ContentFilterFactory, FilterError, FilterExpression};
