// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! DDS-SQL content filter engine.
//!
//! Implements SQL-like filter expressions per the DDS v1.4 specification,
//! evaluated incrementally over deserialized samples: the expression is
//! compiled once into a condition graph, and each sample pushes field values
//! bottom-up through predicates until the root condition is decided.
//!
//! # Supported syntax
//!
//! ```text
//! expression ::= condition
//!              | expression AND expression
//!              | expression OR expression
//!              | NOT expression
//!              | '(' expression ')'
//!
//! condition  ::= operand operator operand
//!              | field [NOT] BETWEEN operand AND operand
//!
//! operator   ::= '=' | '>' | '>=' | '<' | '<=' | '<>' | '!=' | LIKE | MATCH
//!
//! field      ::= name { '.' name | '[' index ']' }
//! operand    ::= field | parameter | literal
//! parameter  ::= '%' digit digit?
//! literal    ::= integer | float | 'string' | 'c' | TRUE | FALSE
//! ```
//!
//! Keywords are case-insensitive. LIKE patterns use SQL wildcards (`%`/`*`
//! for any run, `_`/`?` for one character); MATCH takes a verbatim regular
//! expression. Both are anchored to the full value.
//!
//! # Example
//!
//! ```rust
//! use ddsql::dynamic::{TypeDescriptorBuilder, DynamicData, PrimitiveKind, encode_sample};
//! use ddsql::filter::ContentFilter;
//! use std::sync::Arc;
//!
//! let descriptor = Arc::new(TypeDescriptorBuilder::new("SensorReading")
//!     .field("temperature", PrimitiveKind::F64)
//!     .field("humidity", PrimitiveKind::F64)
//!     .build());
//!
//! let mut filter = ContentFilter::with_parameters(
//!     "temperature > %0 AND humidity < %1",
//!     &descriptor,
//!     vec!["25.0".to_string(), "80".to_string()],
//! ).unwrap();
//!
//! let mut data = DynamicData::new(&descriptor);
//! data.set("temperature", 30.0f64).unwrap();
//! data.set("humidity", 40.0f64).unwrap();
//! assert!(filter.evaluate(&encode_sample(&data).unwrap()));
//! ```

mod ast;
mod builder;
mod condition;
mod expression;
mod field;
mod parser;
mod value;

pub use ast::{Expr, FieldPath, Literal, LogicOp, Operand, PathSegment, RelOp};
pub use expression::FilterExpression;
pub use parser::{parse_expression, parse_literal};

use crate::dynamic::TypeDescriptor;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Name of the filter class this factory serves, per the DDS specification.
pub const DDSSQL_FILTER_CLASS: &str = "DDSSQL";

/// Errors raised while compiling a filter or updating its parameters.
///
/// All of these surface at filter-registration or parameter-update time; the
/// per-sample data path never errors, it rejects the sample instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// Malformed expression text.
    #[error("syntax error at offset {offset}: {message}")]
    Parse { message: String, offset: usize },
    /// Field path does not name a member of the type.
    #[error("unknown field: {0}")]
    UnknownField(String),
    /// Field path is structurally invalid for the type.
    #[error("invalid field access: {0}")]
    InvalidFieldAccess(String),
    /// Constant index outside the collection's bound.
    #[error("index {index} out of bounds in '{field}'")]
    IndexOutOfBounds { field: String, index: usize },
    /// Operand types outside the promotion lattice.
    #[error("incompatible types: {0}")]
    IncompatibleTypes(String),
    /// Expression references `%N` without a matching parameter.
    #[error("parameter %{0} not provided")]
    ParameterOutOfRange(usize),
    /// Parameter literal failed to parse or validate.
    #[error("invalid parameter value '{value}': {reason}")]
    InvalidParameter { value: String, reason: String },
    /// LIKE/MATCH pattern failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },
    /// Expression nesting exceeds the supported depth.
    #[error("expression too deeply nested (max {0})")]
    TooDeep(usize),
    /// Factory asked for a filter class other than [`DDSSQL_FILTER_CLASS`].
    #[error("unknown filter class: {0}")]
    UnknownFilterClass(String),
}

/// A compiled content filter bound to a topic data type.
///
/// Wraps a [`FilterExpression`] together with the expression text and the
/// current parameter strings. Evaluation takes `&mut self`; give each
/// concurrently evaluating reader its own clone.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    expression_str: String,
    parameters: Vec<String>,
    name: Option<String>,
    expression: FilterExpression,
}

impl ContentFilter {
    /// Compile a filter expression without parameters.
    pub fn new(expression: &str, descriptor: &Arc<TypeDescriptor>) -> Result<Self, FilterError> {
        Self::with_parameters(expression, descriptor, Vec::new())
    }

    /// Compile a filter expression with initial `%N` parameter values.
    pub fn with_parameters(
        expression: &str,
        descriptor: &Arc<TypeDescriptor>,
        parameters: Vec<String>,
    ) -> Result<Self, FilterError> {
        let ast = parser::parse_expression(expression)?;
        let compiled = builder::build(ast.as_ref(), descriptor, &parameters)?;
        log::debug!(
            "[filter] compiled '{}' for type {} ({} parameters)",
            expression,
            descriptor.name,
            parameters.len()
        );
        Ok(Self {
            expression_str: expression.to_string(),
            parameters,
            name: None,
            expression: compiled,
        })
    }

    /// Replace the parameter values.
    ///
    /// All-or-nothing: on error the previous values remain in effect.
    pub fn set_parameters(&mut self, parameters: Vec<String>) -> Result<(), FilterError> {
        self.expression.set_parameters(&parameters)?;
        self.parameters = parameters;
        Ok(())
    }

    /// Current parameter values.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// The filter expression text.
    pub fn expression(&self) -> &str {
        &self.expression_str
    }

    /// Set an optional name for this filter.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Get the filter name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Evaluate a serialized sample. See [`FilterExpression::evaluate`].
    pub fn evaluate(&mut self, payload: &[u8]) -> bool {
        self.expression.evaluate(payload)
    }

    /// Reconfigure the sample type descriptor.
    pub fn set_type(&mut self, descriptor: Arc<TypeDescriptor>) {
        self.expression.set_type(descriptor);
    }

    /// Access the compiled expression.
    pub fn filter_expression(&self) -> &FilterExpression {
        &self.expression
    }
}

/// Factory for DDS-SQL content filters.
///
/// Validates the filter class name and caches parsed expression trees, so
/// registering the same expression for many readers parses it once.
#[derive(Debug, Default)]
pub struct ContentFilterFactory {
    ast_cache: HashMap<String, Arc<Option<Expr>>>,
}

impl ContentFilterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a content filter of the given class.
    pub fn create_filter(
        &mut self,
        filter_class: &str,
        descriptor: &Arc<TypeDescriptor>,
        expression: &str,
        parameters: Vec<String>,
    ) -> Result<ContentFilter, FilterError> {
        if filter_class != DDSSQL_FILTER_CLASS {
            return Err(FilterError::UnknownFilterClass(filter_class.to_string()));
        }

        let ast = match self.ast_cache.get(expression) {
            Some(ast) => Arc::clone(ast),
            None => {
                let parsed = Arc::new(parser::parse_expression(expression)?);
                self.ast_cache
                    .insert(expression.to_string(), Arc::clone(&parsed));
                parsed
            }
        };

        let compiled = builder::build(ast.as_ref().as_ref(), descriptor, &parameters)?;
        Ok(ContentFilter {
            expression_str: expression.to_string(),
            parameters,
            name: None,
            expression: compiled,
        })
    }

    /// Number of cached expression trees.
    pub fn cached_expressions(&self) -> usize {
        self.ast_cache.len()
    }
}
