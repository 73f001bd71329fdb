//! Request parameters, model and the V3 model/view pair

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Request parameters, one value per name
pub type ParamMap = HashMap<String, String>;

/// Data handed to the template, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Model {
    values: Map<String, Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `value` and store it under `key`, replacing any previous value
    pub fn put(&mut self, key: impl Into<String>, value: impl Serialize) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.values.insert(key.into(), value);
        Ok(())
    }

    #[allow(dead_code)] // Templates read the model through serde; used in tests
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[allow(dead_code)] // Pairs with len() for clippy; used in tests
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// What a V3 controller returns: its model plus a logical view name
#[derive(Debug, Clone, PartialEq)]
pub struct ModelView {
    view_name: String,
    model: Model,
}

impl ModelView {
    pub fn new(view_name: impl Into<String>) -> Self {
        Self {
            view_name: view_name.into(),
            model: Model::new(),
        }
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub const fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn into_parts(self) -> (String, Model) {
        (self.view_name, self.model)
    }
}

/// Fetch a parameter that must be present
pub fn required<'a>(params: &'a ParamMap, name: &'static str) -> Result<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or(Error::MissingParameter(name))
}

/// Fetch a parameter that must parse as a non-negative integer
pub fn required_u32(params: &ParamMap, name: &'static str) -> Result<u32> {
    let raw = required(params, name)?;
    raw.trim().parse().map_err(|_| Error::InvalidParameter {
        name,
        value: raw.to_string(),
    })
}
