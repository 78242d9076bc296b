//! Binding wire parameters onto a procedure's declared arguments.

use serde_json::Value;
use thiserror::Error;

use crate::coerce::{ArgValue, CoerceError, coerce_json, coerce_text};
use crate::procedure::RpcMethod;
use crate::request::RequestParams;

/// Parameter binding failures
#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("parameters must be an object or an array")]
    NotStructured,

    #[error("got {got} parameters, want {want}")]
    ArityMismatch { got: usize, want: usize },

    #[error("decoding parameter {name:?}: {source}")]
    Decode {
        name: String,
        #[source]
        source: CoerceError,
    },
}

impl ParamsError {
    /// True when the failure stems from how the procedure was declared.
    pub fn is_registration_error(&self) -> bool {
        matches!(self, ParamsError::Decode { source, .. } if source.is_unsupported_shape())
    }
}

/// Arguments bound for one invocation, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    names: Vec<String>,
    values: Vec<ArgValue>,
}

impl BoundArgs {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.values[i])
    }

    pub fn get_index(&self, index: usize) -> Option<&ArgValue> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn push(&mut self, name: &str, value: ArgValue) {
        self.names.push(name.to_string());
        self.values.push(value);
    }
}

/// Binds query-string style values, looked up by argument name.
///
/// Missing names bind the argument's zero value.
pub fn bind_text_params<'a, F>(method: &RpcMethod, lookup: F) -> Result<BoundArgs, ParamsError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut bound = BoundArgs::default();
    for spec in method.args() {
        let value = match lookup(&spec.name) {
            None => spec.zero_value(),
            Some(text) => coerce_text(spec.shape, text).map_err(|source| ParamsError::Decode {
                name: spec.name.clone(),
                source,
            })?,
        };
        bound.push(&spec.name, value);
    }
    Ok(bound)
}

/// Flattens JSON-RPC `params` into one optional raw value per declared argument.
///
/// Object params are looked up by name, array params must match the declared
/// arity exactly, and absent or `null` params leave every slot empty.
pub fn json_param_slots(
    method: &RpcMethod,
    raw: Option<&Value>,
) -> Result<Vec<Option<Value>>, ParamsError> {
    let want = method.args().len();
    match RequestParams::from_raw(raw)? {
        None => Ok(vec![None; want]),
        Some(RequestParams::Object(mut map)) => Ok(method
            .arg_names()
            .map(|name| map.remove(name))
            .collect()),
        Some(RequestParams::Array(items)) => {
            if items.len() != want {
                return Err(ParamsError::ArityMismatch {
                    got: items.len(),
                    want,
                });
            }
            Ok(items.into_iter().map(Some).collect())
        }
    }
}

/// Binds JSON-RPC `params` onto the method's arguments.
pub fn bind_json_params(method: &RpcMethod, raw: Option<&Value>) -> Result<BoundArgs, ParamsError> {
    let slots = json_param_slots(method, raw)?;
    let mut bound = BoundArgs::default();
    for (spec, slot) in method.args().iter().zip(slots) {
        let value = match slot {
            None | Some(Value::Null) => spec.zero_value(),
            Some(value) => coerce_json(spec.shape, &value).map_err(|source| ParamsError::Decode {
                name: spec.name.clone(),
                source,
            })?,
        };
        bound.push(&spec.name, value);
    }
    Ok(bound)
}
