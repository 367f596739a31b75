use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level envelope of a chunk-dataset file. Individual chunks stay as raw
/// JSON values so schema validation can report missing or mistyped fields
/// instead of failing the whole load.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkDataset {
    #[serde(default)]
    pub chunks: Vec<Value>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ChunkType {
    Section,
    Table,
    ImageCaption,
    Micro,
    Intro,
}

impl ChunkType {
    pub const ALL: [&'static str; 5] = ["section", "table", "image_caption", "micro", "intro"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "section" => Some(Self::Section),
            "table" => Some(Self::Table),
            "image_caption" => Some(Self::ImageCaption),
            "micro" => Some(Self::Micro),
            "intro" => Some(Self::Intro),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReferenceType {
    Internal,
    CrossPart,
    External,
}

impl ReferenceType {
    pub const ALL: [&'static str; 3] = ["internal", "cross_part", "external"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "internal" => Some(Self::Internal),
            "cross_part" => Some(Self::CrossPart),
            "external" => Some(Self::External),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RelationType {
    Requires,
    Defines,
    Restricts,
    Exempts,
    Supplements,
}

impl RelationType {
    pub const ALL: [&'static str; 5] = [
        "requires",
        "defines",
        "restricts",
        "exempts",
        "supplements",
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "requires" => Some(Self::Requires),
            "defines" => Some(Self::Defines),
            "restricts" => Some(Self::Restricts),
            "exempts" => Some(Self::Exempts),
            "supplements" => Some(Self::Supplements),
            _ => None,
        }
    }
}

/// Knowledge-graph entity types for `domain_entities` / `ontology_keywords`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EntityType {
    ShipType,
    StructuralMember,
    Equipment,
    Material,
    Inspection,
    LoadCondition,
    Parameter,
}

impl EntityType {
    pub const ALL: [&'static str; 7] = [
        "ship_type",
        "structural_member",
        "equipment",
        "material",
        "inspection",
        "load_condition",
        "parameter",
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ship_type" => Some(Self::ShipType),
            "structural_member" => Some(Self::StructuralMember),
            "equipment" => Some(Self::Equipment),
            "material" => Some(Self::Material),
            "inspection" => Some(Self::Inspection),
            "load_condition" => Some(Self::LoadCondition),
            "parameter" => Some(Self::Parameter),
            _ => None,
        }
    }
}

/// JSON type name used when flagging a value of the wrong shape.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
