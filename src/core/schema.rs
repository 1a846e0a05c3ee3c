//! Schema descriptors: the declared shape of a snapshot
//!
//! A descriptor is plain data. Every attribute has a name, a type and a
//! presence policy; object attributes carry their own nested table. The
//! converter walks whatever descriptor it is given, so a new attribute or a
//! new schema version never needs converter changes.
//!
//! Attribute names are the document's YAML keys, which keeps the document
//! model and the descriptor on one set of names.

use crate::core::error::SnapshotError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Name every built-in descriptor is published under
pub const SCHEMA_NAME: &str = "gitlabci_file";

/// Kind of a scalar value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    String,
    Int64,
    Bool,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::String => write!(f, "string"),
            ScalarKind::Int64 => write!(f, "int64"),
            ScalarKind::Bool => write!(f, "bool"),
        }
    }
}

/// Declared type of an attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeType {
    Scalar(ScalarKind),
    /// Ordered list of scalars
    List(ScalarKind),
    /// Nested object
    Object(ObjectSchema),
    /// Ordered list of nested objects sharing one schema
    ObjectList(ObjectSchema),
}

impl AttributeType {
    /// Nested attribute table, for object and object-list types
    pub fn object_schema(&self) -> Option<&ObjectSchema> {
        match self {
            AttributeType::Object(schema) | AttributeType::ObjectList(schema) => Some(schema),
            AttributeType::Scalar(_) | AttributeType::List(_) => None,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeType::Scalar(kind) => write!(f, "{}", kind),
            AttributeType::List(kind) => write!(f, "list({})", kind),
            AttributeType::Object(_) => write!(f, "object"),
            AttributeType::ObjectList(_) => write!(f, "list(object)"),
        }
    }
}

/// What happens when the document leaves an attribute out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// Conversion fails
    Required,
    /// The zero value of the declared type is used
    #[default]
    Optional,
    /// Left as a typed null for the host to fill in
    Computed,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Required => write!(f, "required"),
            Presence::Optional => write!(f, "optional"),
            Presence::Computed => write!(f, "computed"),
        }
    }
}

/// A single named attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub ty: AttributeType,
    pub presence: Presence,
    pub description: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, ty: AttributeType, presence: Presence) -> Self {
        Self {
            name: name.into(),
            ty,
            presence,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Attribute table of one nesting level, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectSchema {
    attributes: Vec<Attribute>,
}

impl ObjectSchema {
    pub fn new(attributes: Vec<Attribute>) -> Self {
        Self { attributes }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }
}

/// A complete, named and versioned descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    name: String,
    version: u32,
    root: ObjectSchema,
}

impl SchemaDescriptor {
    pub fn new(name: impl Into<String>, version: u32, root: ObjectSchema) -> Self {
        Self {
            name: name.into(),
            version,
            root,
        }
    }

    /// One of the built-in descriptors; shared and read-only
    pub fn builtin(version: SchemaVersion) -> &'static SchemaDescriptor {
        match version {
            SchemaVersion::StagesOnly => &*STAGES_ONLY,
            SchemaVersion::DefaultScalars => &*DEFAULT_SCALARS,
            SchemaVersion::DefaultCache => &*DEFAULT_CACHE,
            SchemaVersion::Full => &*FULL,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn root(&self) -> &ObjectSchema {
        &self.root
    }

    /// Look an attribute up by dotted path, e.g. `default.cache.paths`
    ///
    /// Object-list attributes are traversed through their element schema,
    /// so `default.services.alias` names the alias of every service.
    pub fn attribute(&self, path: &str) -> Option<&Attribute> {
        let mut segments = path.split('.');
        let mut current = self.root.get(segments.next()?)?;
        for segment in segments {
            current = current.ty.object_schema()?.get(segment)?;
        }
        Some(current)
    }

    /// Every attribute with its dotted path, depth-first in declaration order
    pub fn paths(&self) -> Vec<(String, &Attribute)> {
        let mut out = Vec::new();
        collect_paths(&self.root, "", &mut out);
        out
    }

    /// Load a descriptor from its YAML description
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SnapshotError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse a descriptor from YAML
    ///
    /// ```yaml
    /// name: gitlabci_file
    /// version: 5
    /// attributes:
    ///   stages: { type: list(string), presence: required }
    ///   default:
    ///     type: object
    ///     attributes:
    ///       image: { type: string }
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, SnapshotError> {
        let raw: RawDescriptor = serde_yaml::from_str(yaml)?;
        if raw.name.trim().is_empty() {
            return Err(SnapshotError::Schema("descriptor name must not be empty".to_string()));
        }
        let root = object_from_raw(&raw.attributes, "")?;
        Ok(Self::new(raw.name, raw.version, root))
    }
}

fn collect_paths<'a>(schema: &'a ObjectSchema, prefix: &str, out: &mut Vec<(String, &'a Attribute)>) {
    for attribute in schema.attributes() {
        let path = join_path(prefix, &attribute.name);
        out.push((path.clone(), attribute));
        if let Some(nested) = attribute.ty.object_schema() {
            collect_paths(nested, &path, out);
        }
    }
}

/// Join a parent path and an attribute name with a dot
pub fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    name: String,
    version: u32,
    attributes: serde_yaml::Mapping,
}

#[derive(Debug, Deserialize)]
struct RawAttribute {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    presence: Presence,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    attributes: Option<serde_yaml::Mapping>,
}

fn object_from_raw(mapping: &serde_yaml::Mapping, prefix: &str) -> Result<ObjectSchema, SnapshotError> {
    if mapping.is_empty() {
        let at = if prefix.is_empty() { "the root" } else { prefix };
        return Err(SnapshotError::Schema(format!("{} declares no attributes", at)));
    }

    let mut attributes = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let name = key
            .as_str()
            .ok_or_else(|| SnapshotError::Schema(format!("non-string attribute name under '{}'", prefix)))?;
        if name.is_empty() || name.contains('.') {
            return Err(SnapshotError::Schema(format!("invalid attribute name '{}'", name)));
        }
        let path = join_path(prefix, name);
        let raw: RawAttribute = serde_yaml::from_value(value.clone())
            .map_err(|e| SnapshotError::Schema(format!("{}: {}", path, e)))?;

        let ty = match (raw.ty.trim(), &raw.attributes) {
            ("object", Some(nested)) => AttributeType::Object(object_from_raw(nested, &path)?),
            ("list(object)", Some(nested)) => AttributeType::ObjectList(object_from_raw(nested, &path)?),
            ("object", None) | ("list(object)", None) => {
                return Err(SnapshotError::Schema(format!("{}: object type needs 'attributes'", path)));
            }
            (other, None) => parse_simple_type(other)
                .ok_or_else(|| SnapshotError::Schema(format!("{}: unknown type '{}'", path, other)))?,
            (other, Some(_)) => {
                return Err(SnapshotError::Schema(format!(
                    "{}: type '{}' cannot declare nested attributes",
                    path, other
                )));
            }
        };

        let mut attribute = Attribute::new(name, ty, raw.presence);
        attribute.description = raw.description;
        attributes.push(attribute);
    }
    Ok(ObjectSchema::new(attributes))
}

fn parse_simple_type(s: &str) -> Option<AttributeType> {
    let scalar = |s: &str| match s {
        "string" => Some(ScalarKind::String),
        "int64" => Some(ScalarKind::Int64),
        "bool" => Some(ScalarKind::Bool),
        _ => None,
    };
    match s.strip_prefix("list(").and_then(|rest| rest.strip_suffix(')')) {
        Some(inner) => scalar(inner).map(AttributeType::List),
        None => scalar(s).map(AttributeType::Scalar),
    }
}

/// Built-in descriptor versions, oldest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaVersion {
    /// `stages` only
    StagesOnly,
    /// `stages` and the scalar/list fields of `default`
    DefaultScalars,
    /// adds `default.cache`
    DefaultCache,
    /// adds `default.services` and `default.artifacts`
    #[default]
    Full,
}

impl SchemaVersion {
    pub const ALL: [SchemaVersion; 4] = [
        SchemaVersion::StagesOnly,
        SchemaVersion::DefaultScalars,
        SchemaVersion::DefaultCache,
        SchemaVersion::Full,
    ];

    pub fn number(self) -> u32 {
        match self {
            SchemaVersion::StagesOnly => 1,
            SchemaVersion::DefaultScalars => 2,
            SchemaVersion::DefaultCache => 3,
            SchemaVersion::Full => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaVersion::StagesOnly => "stages-only",
            SchemaVersion::DefaultScalars => "default-scalars",
            SchemaVersion::DefaultCache => "default-cache",
            SchemaVersion::Full => "full",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemaVersion::ALL
            .into_iter()
            .find(|v| v.as_str() == s || v.number().to_string() == s)
            .ok_or_else(|| format!("unknown schema version '{}'", s))
    }
}

fn string(name: &str) -> Attribute {
    Attribute::new(name, AttributeType::Scalar(ScalarKind::String), Presence::Optional)
}

fn strings(name: &str) -> Attribute {
    Attribute::new(name, AttributeType::List(ScalarKind::String), Presence::Optional)
}

fn stages() -> Attribute {
    Attribute::new("stages", AttributeType::List(ScalarKind::String), Presence::Computed)
        .with_description("The names and order of the pipeline stages")
}

fn default_scalars() -> Vec<Attribute> {
    vec![
        string("image"),
        string("timeout"),
        strings("tags"),
        Attribute::new("retry", AttributeType::Scalar(ScalarKind::Int64), Presence::Optional),
        Attribute::new("interruptible", AttributeType::Scalar(ScalarKind::Bool), Presence::Optional),
        strings("before_script"),
        strings("after_script"),
    ]
}

fn cache() -> Attribute {
    Attribute::new(
        "cache",
        AttributeType::Object(ObjectSchema::new(vec![string("key"), strings("paths")])),
        Presence::Optional,
    )
}

fn services() -> Attribute {
    Attribute::new(
        "services",
        AttributeType::ObjectList(ObjectSchema::new(vec![
            string("name"),
            string("alias"),
            strings("entrypoint"),
            strings("command"),
        ])),
        Presence::Optional,
    )
}

fn artifacts() -> Attribute {
    Attribute::new(
        "artifacts",
        AttributeType::Object(ObjectSchema::new(vec![
            string("name"),
            string("when"),
            Attribute::new("public", AttributeType::Scalar(ScalarKind::Bool), Presence::Optional),
            Attribute::new("untracked", AttributeType::Scalar(ScalarKind::Bool), Presence::Optional),
            string("expose_as"),
            string("expire_in"),
            strings("exclude"),
            strings("paths"),
        ])),
        Presence::Optional,
    )
}

fn default_section(attributes: Vec<Attribute>) -> Attribute {
    Attribute::new("default", AttributeType::Object(ObjectSchema::new(attributes)), Presence::Optional)
        .with_description("Settings every job inherits")
}

fn versioned(version: SchemaVersion, attributes: Vec<Attribute>) -> SchemaDescriptor {
    SchemaDescriptor::new(SCHEMA_NAME, version.number(), ObjectSchema::new(attributes))
}

static STAGES_ONLY: Lazy<SchemaDescriptor> =
    Lazy::new(|| versioned(SchemaVersion::StagesOnly, vec![stages()]));

static DEFAULT_SCALARS: Lazy<SchemaDescriptor> = Lazy::new(|| {
    versioned(
        SchemaVersion::DefaultScalars,
        vec![stages(), default_section(default_scalars())],
    )
});

static DEFAULT_CACHE: Lazy<SchemaDescriptor> = Lazy::new(|| {
    let mut default = default_scalars();
    default.push(cache());
    versioned(SchemaVersion::DefaultCache, vec![stages(), default_section(default)])
});

static FULL: Lazy<SchemaDescriptor> = Lazy::new(|| {
    let mut default = default_scalars();
    default.extend([cache(), services(), artifacts()]);
    versioned(SchemaVersion::Full, vec![stages(), default_section(default)])
});
