//! Built-in operators
//!
//! String operators (`Upper`, `Lower`, `Trim`, `Redact`, `Truncate`) leave
//! non-string values untouched. Null inputs are passed through unless an
//! operator says otherwise.
//!
//! Copyright (c) 2025 Fieldwise Team
//! Licensed under the Apache-2.0 license

use crate::error::OperatorError;
use fieldwise_core::{Operator, TypeDescriptor};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Placeholder written into non-empty string fields by [`Mask`]
pub const MASKED: &str = "***";
/// Placeholder written into empty or absent string fields by [`Mask`]
pub const MASKED_EMPTY: &str = "###";
/// Default replacement used by [`Redact`]
pub const REDACTED: &str = "[REDACTED]";

/// Type-aware masking
///
/// String targets become `"***"`, or `"###"` when the value was null or
/// empty. Integer targets become `1`, or `0` when the value was null. Any
/// other target is left as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mask;

impl Operator for Mask {
    fn apply(&self, input: &Value, target: &TypeDescriptor) -> anyhow::Result<Value> {
        if target.is_string() {
            let empty = match input {
                Value::Null => true,
                Value::String(s) => s.is_empty(),
                _ => false,
            };
            let masked = if empty { MASKED_EMPTY } else { MASKED };
            return Ok(Value::String(masked.to_string()));
        }

        if target.is_integer() {
            return Ok(Value::from(if input.is_null() { 0 } else { 1 }));
        }

        Ok(input.clone())
    }
}

fn map_string(input: &Value, f: impl FnOnce(&str) -> String) -> Value {
    match input {
        Value::String(s) => Value::String(f(s)),
        other => other.clone(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Upper;

impl Operator for Upper {
    fn apply(&self, input: &Value, _target: &TypeDescriptor) -> anyhow::Result<Value> {
        Ok(map_string(input, str::to_uppercase))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Lower;

impl Operator for Lower {
    fn apply(&self, input: &Value, _target: &TypeDescriptor) -> anyhow::Result<Value> {
        Ok(map_string(input, str::to_lowercase))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Trim;

impl Operator for Trim {
    fn apply(&self, input: &Value, _target: &TypeDescriptor) -> anyhow::Result<Value> {
        Ok(map_string(input, |s| s.trim().to_string()))
    }
}

/// Replace every string with a fixed text
#[derive(Debug, Clone, PartialEq)]
pub struct Redact {
    pub replacement: String,
}

impl Redact {
    pub fn new(replacement: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
        }
    }
}

impl Default for Redact {
    fn default() -> Self {
        Self::new(REDACTED)
    }
}

impl Operator for Redact {
    fn apply(&self, input: &Value, _target: &TypeDescriptor) -> anyhow::Result<Value> {
        Ok(map_string(input, |_| self.replacement.clone()))
    }
}

/// Keep at most `max_chars` characters of a string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncate {
    pub max_chars: usize,
}

impl Operator for Truncate {
    fn apply(&self, input: &Value, _target: &TypeDescriptor) -> anyhow::Result<Value> {
        Ok(map_string(input, |s| s.chars().take(self.max_chars).collect()))
    }
}

/// Always produce the same value, null inputs included
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub value: Value,
}

impl Operator for Constant {
    fn apply(&self, _input: &Value, _target: &TypeDescriptor) -> anyhow::Result<Value> {
        Ok(self.value.clone())
    }
}

/// Fill null fields, keep everything else
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultValue {
    pub value: Value,
}

impl Operator for DefaultValue {
    fn apply(&self, input: &Value, _target: &TypeDescriptor) -> anyhow::Result<Value> {
        if input.is_null() {
            Ok(self.value.clone())
        } else {
            Ok(input.clone())
        }
    }
}

/// Map string values through a lookup table
///
/// Unmapped values fall back to `default`, or fail when there is none.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumMapping {
    pub mappings: HashMap<String, String>,
    pub default: Option<String>,
}

impl EnumMapping {
    pub fn new(mappings: HashMap<String, String>, default: Option<String>) -> Self {
        Self { mappings, default }
    }
}

impl Operator for EnumMapping {
    fn apply(&self, input: &Value, _target: &TypeDescriptor) -> anyhow::Result<Value> {
        let raw = match input {
            Value::Null => return Ok(Value::Null),
            Value::String(s) => s.as_str(),
            other => {
                return Err(OperatorError::UnexpectedValue {
                    expected: "a string",
                    value: other.to_string(),
                }
                .into())
            }
        };

        if let Some(mapped) = self.mappings.get(raw) {
            Ok(Value::String(mapped.clone()))
        } else if let Some(default) = &self.default {
            Ok(Value::String(default.clone()))
        } else {
            let mut available_mappings: Vec<String> = self.mappings.keys().cloned().collect();
            available_mappings.sort();
            Err(OperatorError::EnumMapping {
                value: raw.to_string(),
                available_mappings,
            }
            .into())
        }
    }
}

/// Linear numeric scaling: `value * scale + offset`
///
/// Integer targets receive the rounded result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    pub scale: f64,
    pub offset: f64,
}

impl Linear {
    pub fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }
}

impl Operator for Linear {
    fn apply(&self, input: &Value, target: &TypeDescriptor) -> anyhow::Result<Value> {
        if input.is_null() {
            return Ok(Value::Null);
        }
        let Some(number) = input.as_f64() else {
            return Err(OperatorError::UnexpectedValue {
                expected: "a number",
                value: input.to_string(),
            }
            .into());
        };

        let result = number * self.scale + self.offset;
        if !result.is_finite() {
            return Err(OperatorError::NotRepresentable { result }.into());
        }

        if target.is_integer() {
            let rounded = result.round();
            if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                return Err(OperatorError::NotRepresentable { result }.into());
            }
            return Ok(Value::from(rounded as i64));
        }

        Number::from_f64(result)
            .map(Value::Number)
            .ok_or_else(|| OperatorError::NotRepresentable { result }.into())
    }
}

/// Convert a 0-2 range into a 0-1 range
pub fn halve() -> Linear {
    Linear::new(0.5, 0.0)
}

/// Convert Celsius readings to Fahrenheit
pub fn celsius_to_fahrenheit() -> Linear {
    Linear::new(9.0 / 5.0, 32.0)
}
