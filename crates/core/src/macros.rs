//! `#define` bindings and `#include` paths collected while building a document.

use crate::literal::{UndefinedVariable, Value, resolve};
use std::collections::BTreeMap;

/// Variables defined so far plus the include list, in encounter order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacroEnv {
    defines: BTreeMap<String, Value>,
    includes: Vec<String>,
}

impl MacroEnv {
    /// Bind `name` (leading `$` optional) to the resolved `raw` value.
    /// Redefinition overwrites.
    ///
    /// A value that references an undefined variable is stored as its raw
    /// text and the error is returned for reporting.
    pub fn define(&mut self, name: &str, raw: &str) -> Result<(), UndefinedVariable> {
        let name = name.strip_prefix('$').unwrap_or(name);
        let (value, result) = match resolve(raw, self) {
            Ok(value) => (value, Ok(())),
            Err(e) => (Value::Str(raw.to_string()), Err(e)),
        };
        self.defines.insert(name.to_string(), value);
        result
    }

    /// Append the text form of the resolved `raw` path. Duplicates are kept.
    pub fn include(&mut self, raw: &str) -> Result<(), UndefinedVariable> {
        let (path, result) = match resolve(raw, self) {
            Ok(value) => (value.to_string(), Ok(())),
            Err(e) => (raw.to_string(), Err(e)),
        };
        self.includes.push(path);
        result
    }

    /// Look up a variable by bare name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.defines.get(name)
    }

    /// Include paths in encounter order.
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Split into the define map and the include list.
    pub fn into_parts(self) -> (BTreeMap<String, Value>, Vec<String>) {
        (self.defines, self.includes)
    }
}
