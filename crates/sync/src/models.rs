//! Datasource, entry and component shapes, both as declared locally and as
//! returned by the management API.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A named axis of variation (usually a language) attached to a datasource.
///
/// `name` is the identity key. Remote dimensions carry extra fields (`id`,
/// `datasource_id`, timestamps) which are kept verbatim so they survive a
/// round trip through an update payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub entry_value: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Dimension {
    pub fn new(name: impl Into<String>, entry_value: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            entry_value: entry_value.into(),
            extra: Map::new(),
        }
    }
}

/// A datasource as declared in a local definition file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocalDatasource {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(default)]
    pub datasource_entries: Vec<LocalEntry>,
}

/// A key/value entry declared locally.
///
/// Definition files may use either an explicit `{name, value}` object or a
/// legacy positional record whose first two values are read as name and
/// value; both end up in this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalEntry {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimension_value: BTreeMap<String, String>,
}

impl LocalEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            dimension_value: BTreeMap::new(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for LocalEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = Map::<String, Value>::deserialize(deserializer)?;

        if let Some(name) = record.get("name") {
            let name = scalar_to_string(name)
                .ok_or_else(|| de::Error::custom("entry `name` must be a scalar"))?;
            let value = match record.get("value") {
                Some(v) => scalar_to_string(v)
                    .ok_or_else(|| de::Error::custom("entry `value` must be a scalar"))?,
                None => String::new(),
            };
            let dimension_value = match record.get("dimension_value") {
                None | Some(Value::Null) => BTreeMap::new(),
                Some(Value::Object(map)) => map
                    .iter()
                    .map(|(k, v)| {
                        scalar_to_string(v)
                            .map(|v| (k.clone(), v))
                            .ok_or_else(|| de::Error::custom("dimension values must be scalars"))
                    })
                    .collect::<Result<_, D::Error>>()?,
                Some(_) => {
                    return Err(de::Error::custom(
                        "entry `dimension_value` must map dimension names to values",
                    ))
                }
            };
            return Ok(Self {
                name,
                value,
                dimension_value,
            });
        }

        let mut values = record.values();
        let (Some(name), Some(value)) = (values.next(), values.next()) else {
            return Err(de::Error::custom(
                "positional entry needs at least two values (name, value)",
            ));
        };
        let name = scalar_to_string(name)
            .ok_or_else(|| de::Error::custom("positional entry name must be a scalar"))?;
        let value = scalar_to_string(value)
            .ok_or_else(|| de::Error::custom("positional entry value must be a scalar"))?;
        Ok(Self::new(name, value))
    }
}

/// A datasource as stored in the remote space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteDatasource {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub dimensions: Vec<Dimension>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A datasource entry as stored in the remote space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteEntry {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to a preset attached to a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// A component schema as stored in the remote space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteComponent {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub all_presets: Vec<PresetRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a datasource create/update request.
///
/// The API wants the dimension list twice, under `dimensions` and
/// `dimensions_attributes`, with identical content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasourcePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub slug: String,
    pub dimensions: Vec<Dimension>,
    pub dimensions_attributes: Vec<Dimension>,
}

/// Body of an entry create/update request. The whole value is replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    pub value: String,
    pub datasource_id: u64,
}
