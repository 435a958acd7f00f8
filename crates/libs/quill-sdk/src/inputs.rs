//! Action inputs and per-parameter type overrides.

use quill_wire::{DataType, Value};
use serde_json::Value as JsonValue;

use crate::error::SdkError;
use crate::schema::bare_name;

/// One set of named arguments, kept in insertion order.
///
/// Names may be given with or without the `$` sigil; lookups ignore it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NamedParams(Vec<(String, Value)>);

impl NamedParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets `name`, replacing an earlier value under the same bare name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| bare_name(existing) == bare_name(&name)) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(existing, _)| bare_name(existing) == bare_name(name))
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for NamedParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Every input set of one build. More than one set makes a bulk execution.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionInputs {
    Named(Vec<NamedParams>),
    Positional(Vec<Vec<Value>>),
}

impl Default for ActionInputs {
    fn default() -> Self {
        Self::Named(Vec::new())
    }
}

impl ActionInputs {
    pub fn named(set: NamedParams) -> Self {
        Self::Named(vec![set])
    }

    pub fn positional(values: Vec<Value>) -> Self {
        Self::Positional(vec![values])
    }

    /// Number of input sets.
    pub fn len(&self) -> usize {
        match self {
            Self::Named(sets) => sets.len(),
            Self::Positional(sets) => sets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads inputs from JSON.
    ///
    /// An object is one named set, an array of objects is several. An array
    /// of arrays is several positional sets; an array of scalars is one.
    pub fn from_json(json: &JsonValue) -> Result<Self, SdkError> {
        match json {
            JsonValue::Object(map) => Ok(Self::named(named_from_json(map)?)),
            JsonValue::Array(items) if items.is_empty() => Ok(Self::default()),
            JsonValue::Array(items) if items.iter().all(JsonValue::is_object) => items
                .iter()
                .filter_map(JsonValue::as_object)
                .map(named_from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Named),
            JsonValue::Array(items) if items.iter().all(JsonValue::is_array) => items
                .iter()
                .filter_map(JsonValue::as_array)
                .map(|set| set.iter().map(Value::from_json).collect::<Result<Vec<_>, _>>())
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Positional)
                .map_err(SdkError::from),
            JsonValue::Array(items) => items
                .iter()
                .map(Value::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::positional)
                .map_err(SdkError::from),
            other => Err(SdkError::validation(format!(
                "action inputs must be an object or an array, got {other}"
            ))),
        }
    }
}

fn named_from_json(map: &serde_json::Map<String, JsonValue>) -> Result<NamedParams, SdkError> {
    let mut params = NamedParams::new();
    for (name, value) in map {
        params.insert(name.as_str(), Value::from_json(value)?);
    }
    Ok(params)
}

impl From<NamedParams> for ActionInputs {
    fn from(set: NamedParams) -> Self {
        Self::named(set)
    }
}

impl From<Vec<NamedParams>> for ActionInputs {
    fn from(sets: Vec<NamedParams>) -> Self {
        Self::Named(sets)
    }
}

impl From<Vec<Value>> for ActionInputs {
    fn from(values: Vec<Value>) -> Self {
        Self::positional(values)
    }
}

/// Explicit parameter types that override inference.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamTypes {
    /// By position; `None` leaves that position to inference.
    Positional(Vec<Option<DataType>>),
    Named(Vec<(String, DataType)>),
}

impl ParamTypes {
    pub fn named<I, K>(types: I) -> Self
    where
        I: IntoIterator<Item = (K, DataType)>,
        K: Into<String>,
    {
        Self::Named(types.into_iter().map(|(name, ty)| (name.into(), ty)).collect())
    }

    pub fn positional<I: IntoIterator<Item = DataType>>(types: I) -> Self {
        Self::Positional(types.into_iter().map(Some).collect())
    }

    /// Override for the parameter at `index` called `name`.
    ///
    /// Named overrides match on the bare name; positional ones on the index.
    pub fn lookup(&self, index: usize, name: Option<&str>) -> Option<&DataType> {
        match self {
            Self::Positional(types) => types.get(index).and_then(Option::as_ref),
            Self::Named(types) => {
                let name = bare_name(name?);
                types.iter().find(|(declared, _)| bare_name(declared) == name).map(|(_, ty)| ty)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_replaces_across_sigils() {
        let params = NamedParams::new().with("$id", 1i64).with("id", 2i64).with("title", "x");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("id"), Some(&Value::Int(2)));
        assert_eq!(params.get("$title"), Some(&Value::from("x")));
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["$id", "title"]);
    }

    #[test]
    fn json_shapes() {
        let named = ActionInputs::from_json(&json!({"$id": 1})).expect("object");
        assert_eq!(named, ActionInputs::named(NamedParams::new().with("$id", 1i64)));

        let bulk = ActionInputs::from_json(&json!([{"a": 1}, {"a": 2}])).expect("objects");
        assert_eq!(bulk.len(), 2);

        let sets = ActionInputs::from_json(&json!([[1, "x"], [2, "y"]])).expect("arrays");
        assert_eq!(
            sets,
            ActionInputs::Positional(vec![
                vec![Value::Int(1), Value::from("x")],
                vec![Value::Int(2), Value::from("y")],
            ])
        );

        let single = ActionInputs::from_json(&json!([1, null])).expect("scalars");
        assert_eq!(single, ActionInputs::positional(vec![Value::Int(1), Value::Null]));

        assert!(ActionInputs::from_json(&json!("nope")).is_err());
        assert!(ActionInputs::from_json(&json!([])).expect("empty").is_empty());
    }

    #[test]
    fn type_lookup() {
        let named = ParamTypes::named([("$id", DataType::uuid())]);
        assert_eq!(named.lookup(3, Some("id")), Some(&DataType::uuid()));
        assert_eq!(named.lookup(0, None), None);

        let positional = ParamTypes::Positional(vec![None, Some(DataType::int8())]);
        assert_eq!(positional.lookup(0, Some("id")), None);
        assert_eq!(positional.lookup(1, None), Some(&DataType::int8()));
    }
}
