// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDR (XCDR1) encoding/decoding for [`DynamicData`].
//!
//! [`decode_sample`] consumes an RTPS serialized payload: a four-byte
//! encapsulation header (representation identifier + options) followed by the
//! CDR body. Both little- and big-endian representations are accepted.
//! Alignment is computed relative to the start of the body.

use crate::dynamic::{DynamicData, DynamicValue, PrimitiveKind, TypeDescriptor, TypeKind};
use std::sync::Arc;
use thiserror::Error;

/// CDR big-endian representation identifier.
pub const CDR_BE: [u8; 2] = [0x00, 0x00];
/// CDR little-endian representation identifier.
pub const CDR_LE: [u8; 2] = [0x00, 0x01];

/// Errors for CDR operations.
#[derive(Debug, Clone, Error)]
pub enum CdrError {
    #[error("buffer too small: need {need} bytes, have {have}")]
    BufferTooSmall { need: usize, have: usize },
    #[error("invalid encapsulation header")]
    BadEncapsulation,
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("invalid UTF-8 in string")]
    Utf8Error,
}

/// Decode an RTPS serialized payload (encapsulation header + CDR body).
pub fn decode_sample(
    payload: &[u8],
    descriptor: &Arc<TypeDescriptor>,
) -> Result<DynamicData, CdrError> {
    if payload.len() < 4 {
        return Err(CdrError::BufferTooSmall {
            need: 4,
            have: payload.len(),
        });
    }
    let le = match [payload[0], payload[1]] {
        id if id == CDR_LE => true,
        id if id == CDR_BE => false,
        _ => return Err(CdrError::BadEncapsulation),
    };
    decode_body(&payload[4..], descriptor, le)
}

/// Decode a bare CDR body with explicit endianness.
pub fn decode_body(
    body: &[u8],
    descriptor: &Arc<TypeDescriptor>,
    le: bool,
) -> Result<DynamicData, CdrError> {
    let mut decoder = Decoder::new(body, le);
    let value = decoder.decode_value(&descriptor.kind)?;
    Ok(DynamicData::from_value(descriptor, value))
}

/// Encode data as an RTPS serialized payload (CDR_LE header + body).
pub fn encode_sample(data: &DynamicData) -> Result<Vec<u8>, CdrError> {
    let mut encoder = Encoder::new();
    encoder.encode_value(data.value(), &data.descriptor().kind)?;
    let body = encoder.buffer;
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend(CDR_LE);
    out.extend([0u8, 0u8]); // options
    out.extend(body);
    Ok(out)
}

struct Decoder<'a> {
    buffer: &'a [u8],
    offset: usize,
    le: bool,
}

impl<'a> Decoder<'a> {
    fn new(buffer: &'a [u8], le: bool) -> Self {
        Self {
            buffer,
            offset: 0,
            le,
        }
    }

    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn align(&mut self, alignment: usize) {
        self.offset = (self.offset + alignment - 1) & !(alignment - 1);
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], CdrError> {
        if self.offset + count > self.buffer.len() {
            return Err(CdrError::BufferTooSmall {
                need: count,
                have: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    fn read_u16(&mut self) -> Result<u16, CdrError> {
        self.align(2);
        let b = self.read_bytes(2)?;
        let arr = [b[0], b[1]];
        Ok(if self.le {
            u16::from_le_bytes(arr)
        } else {
            u16::from_be_bytes(arr)
        })
    }

    fn read_u32(&mut self) -> Result<u32, CdrError> {
        self.align(4);
        let b = self.read_bytes(4)?;
        let arr = [b[0], b[1], b[2], b[3]];
        Ok(if self.le {
            u32::from_le_bytes(arr)
        } else {
            u32::from_be_bytes(arr)
        })
    }

    fn read_u64(&mut self) -> Result<u64, CdrError> {
        self.align(8);
        let b = self.read_bytes(8)?;
        let arr = [b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]];
        Ok(if self.le {
            u64::from_le_bytes(arr)
        } else {
            u64::from_be_bytes(arr)
        })
    }

    fn decode_value(&mut self, kind: &TypeKind) -> Result<DynamicValue, CdrError> {
        match kind {
            TypeKind::Primitive(p) => self.decode_primitive(*p),
            TypeKind::Struct(members) => {
                let mut values = Vec::with_capacity(members.len());
                for member in members {
                    values.push(self.decode_value(&member.type_desc.kind)?);
                }
                Ok(DynamicValue::Struct(values))
            }
            TypeKind::Sequence(seq) => {
                let len = self.read_u32()? as usize;
                // A corrupt length must not drive allocation: every element
                // occupies at least one byte of the remaining buffer.
                if len > self.remaining() {
                    return Err(CdrError::InvalidData(format!(
                        "sequence length {} exceeds remaining payload",
                        len
                    )));
                }
                if let Some(max) = seq.max_length {
                    if len > max {
                        return Err(CdrError::InvalidData(format!(
                            "sequence length {} exceeds bound {}",
                            len, max
                        )));
                    }
                }
                let mut values = Vec::with_capacity(len);
                for _ in 0..len {
                    values.push(self.decode_value(&seq.element_type.kind)?);
                }
                Ok(DynamicValue::Sequence(values))
            }
            TypeKind::Array(arr) => {
                let mut values = Vec::with_capacity(arr.length);
                for _ in 0..arr.length {
                    values.push(self.decode_value(&arr.element_type.kind)?);
                }
                Ok(DynamicValue::Array(values))
            }
            TypeKind::Enum(_) => {
                let raw = self.read_u32()?;
                Ok(DynamicValue::Enum(raw as i32))
            }
            TypeKind::Nested(inner) => self.decode_value(&inner.kind),
        }
    }

    fn decode_primitive(&mut self, kind: PrimitiveKind) -> Result<DynamicValue, CdrError> {
        match kind {
            PrimitiveKind::Bool => Ok(DynamicValue::Bool(self.read_bytes(1)?[0] != 0)),
            PrimitiveKind::U8 => Ok(DynamicValue::U8(self.read_bytes(1)?[0])),
            PrimitiveKind::U16 => Ok(DynamicValue::U16(self.read_u16()?)),
            PrimitiveKind::U32 => Ok(DynamicValue::U32(self.read_u32()?)),
            PrimitiveKind::U64 => Ok(DynamicValue::U64(self.read_u64()?)),
            PrimitiveKind::I8 => Ok(DynamicValue::I8(self.read_bytes(1)?[0] as i8)),
            PrimitiveKind::I16 => Ok(DynamicValue::I16(self.read_u16()? as i16)),
            PrimitiveKind::I32 => Ok(DynamicValue::I32(self.read_u32()? as i32)),
            PrimitiveKind::I64 => Ok(DynamicValue::I64(self.read_u64()? as i64)),
            PrimitiveKind::F32 => Ok(DynamicValue::F32(f32::from_bits(self.read_u32()?))),
            PrimitiveKind::F64 => Ok(DynamicValue::F64(f64::from_bits(self.read_u64()?))),
            PrimitiveKind::Char => Ok(DynamicValue::Char(self.read_bytes(1)?[0] as char)),
            PrimitiveKind::String { max_length } => {
                let len = self.read_u32()? as usize;
                if let Some(max) = max_length {
                    // Wire length includes the null terminator.
                    if len > max + 1 {
                        return Err(CdrError::InvalidData("string exceeds bound".into()));
                    }
                }
                if len == 0 {
                    return Ok(DynamicValue::String(String::new()));
                }
                let bytes = self.read_bytes(len)?;
                let text_len = if bytes[len - 1] == 0 { len - 1 } else { len };
                let s = std::str::from_utf8(&bytes[..text_len])
                    .map_err(|_| CdrError::Utf8Error)?;
                Ok(DynamicValue::String(s.to_string()))
            }
        }
    }
}

struct Encoder {
    buffer: Vec<u8>,
}

impl Encoder {
    fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    fn align(&mut self, alignment: usize) {
        let padding = (alignment - (self.buffer.len() % alignment)) % alignment;
        self.buffer.extend(std::iter::repeat(0).take(padding));
    }

    fn encode_value(&mut self, value: &DynamicValue, kind: &TypeKind) -> Result<(), CdrError> {
        match (kind, value) {
            (TypeKind::Primitive(p), _) => self.encode_primitive(value, *p),
            (TypeKind::Struct(members), DynamicValue::Struct(values)) => {
                if members.len() != values.len() {
                    return Err(CdrError::InvalidData(format!(
                        "struct member count mismatch: descriptor {}, value {}",
                        members.len(),
                        values.len()
                    )));
                }
                for (member, v) in members.iter().zip(values) {
                    self.encode_value(v, &member.type_desc.kind)?;
                }
                Ok(())
            }
            (TypeKind::Sequence(seq), DynamicValue::Sequence(values)) => {
                self.align(4);
                self.buffer.extend((values.len() as u32).to_le_bytes());
                for v in values {
                    self.encode_value(v, &seq.element_type.kind)?;
                }
                Ok(())
            }
            (TypeKind::Array(arr), DynamicValue::Array(values)) => {
                if values.len() != arr.length {
                    return Err(CdrError::InvalidData(format!(
                        "array length mismatch: expected {}, got {}",
                        arr.length,
                        values.len()
                    )));
                }
                for v in values {
                    self.encode_value(v, &arr.element_type.kind)?;
                }
                Ok(())
            }
            (TypeKind::Enum(_), DynamicValue::Enum(v)) => {
                self.align(4);
                self.buffer.extend((*v as u32).to_le_bytes());
                Ok(())
            }
            (TypeKind::Nested(inner), _) => self.encode_value(value, &inner.kind),
            _ => Err(CdrError::InvalidData(format!(
                "value {:?} does not match type kind",
                value
            ))),
        }
    }

    fn encode_primitive(&mut self, value: &DynamicValue, kind: PrimitiveKind) -> Result<(), CdrError> {
        match (value, kind) {
            (DynamicValue::Bool(v), PrimitiveKind::Bool) => self.buffer.push(u8::from(*v)),
            (DynamicValue::U8(v), PrimitiveKind::U8) => self.buffer.push(*v),
            (DynamicValue::U16(v), PrimitiveKind::U16) => {
                self.align(2);
                self.buffer.extend(v.to_le_bytes());
            }
            (DynamicValue::U32(v), PrimitiveKind::U32) => {
                self.align(4);
                self.buffer.extend(v.to_le_bytes());
            }
            (DynamicValue::U64(v), PrimitiveKind::U64) => {
                self.align(8);
                self.buffer.extend(v.to_le_bytes());
            }
            (DynamicValue::I8(v), PrimitiveKind::I8) => self.buffer.push(*v as u8),
            (DynamicValue::I16(v), PrimitiveKind::I16) => {
                self.align(2);
                self.buffer.extend(v.to_le_bytes());
            }
            (DynamicValue::I32(v), PrimitiveKind::I32) => {
                self.align(4);
                self.buffer.extend(v.to_le_bytes());
            }
            (DynamicValue::I64(v), PrimitiveKind::I64) => {
                self.align(8);
                self.buffer.extend(v.to_le_bytes());
            }
            (DynamicValue::F32(v), PrimitiveKind::F32) => {
                self.align(4);
                self.buffer.extend(v.to_le_bytes());
            }
            (DynamicValue::F64(v), PrimitiveKind::F64) => {
                self.align(8);
                self.buffer.extend(v.to_le_bytes());
            }
            (DynamicValue::Char(v), PrimitiveKind::Char) => self.buffer.push(*v as u8),
            (DynamicValue::String(s), PrimitiveKind::String { max_length }) => {
                if let Some(max) = max_length {
                    if s.len() > max {
                        return Err(CdrError::InvalidData("string exceeds bound".into()));
                    }
                }
                self.align(4);
                let bytes = s.as_bytes();
                self.buffer.extend(((bytes.len() + 1) as u32).to_le_bytes());
                self.buffer.extend(bytes);
                self.buffer.push(0);
            }
            _ => {
                return Err(CdrError::InvalidData(format!(
                    "value {:?} does not match primitive kind {:?}",
                    value, kind
                )))
            }
        }
        Ok(())
    }
}
