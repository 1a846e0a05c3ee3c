//! Tree converter - walks a document against a schema descriptor
//!
//! The walk is driven entirely by the descriptor: for each declared
//! attribute the converter looks up the same key in the document and either
//! wraps the value or applies the attribute's presence policy. Objects
//! (including every element of an object list) go through the same
//! recursive routine with their own attribute table.

use crate::core::document::PipelineDocument;
use crate::core::error::ConversionError;
use crate::core::schema::{join_path, Attribute, AttributeType, ObjectSchema, Presence, ScalarKind, SchemaDescriptor};
use crate::core::tree::{Scalar, TreeBuilder, TypedTree, TypedValue};
use serde_yaml::{Mapping, Value};
use tracing::{debug, trace};

/// Converts documents for one schema descriptor
///
/// Holds nothing but a shared reference to the descriptor, so one converter
/// (or many) can be used from any number of threads at once.
#[derive(Debug, Clone, Copy)]
pub struct TreeConverter<'a> {
    schema: &'a SchemaDescriptor,
}

impl<'a> TreeConverter<'a> {
    pub fn new(schema: &'a SchemaDescriptor) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &'a SchemaDescriptor {
        self.schema
    }

    /// Convert a parsed document
    pub fn convert(&self, document: &PipelineDocument) -> Result<TypedTree, ConversionError> {
        let value = document
            .to_value()
            .map_err(|e| ConversionError::Model(e.to_string()))?;
        self.convert_value(&value)
    }

    /// Convert an arbitrary YAML value tree
    ///
    /// A null or empty document is treated as a mapping with no keys.
    pub fn convert_value(&self, document: &Value) -> Result<TypedTree, ConversionError> {
        let root = match document {
            Value::Null => None,
            Value::Mapping(mapping) => Some(mapping),
            _ => {
                return Err(ConversionError::SchemaMismatch {
                    path: String::new(),
                    expected: "object".to_string(),
                })
            }
        };

        let tree = self.convert_object(self.schema.root(), root, "")?;

        if let Some(stages) = tree.get("stages").and_then(TypedValue::as_string_list) {
            debug!(schema = self.schema.name(), version = self.schema.version(), ?stages, "computed stages");
        }
        Ok(tree)
    }

    fn convert_object(
        &self,
        schema: &ObjectSchema,
        source: Option<&Mapping>,
        prefix: &str,
    ) -> Result<TypedTree, ConversionError> {
        let mut builder = TreeBuilder::new();
        for attribute in schema.attributes() {
            let path = join_path(prefix, &attribute.name);
            let field = source
                .and_then(|mapping| mapping.get(attribute.name.as_str()))
                .filter(|value| !value.is_null());
            let value = self.convert_attribute(attribute, field, &path)?;
            builder.insert(attribute.name.clone(), value);
        }
        Ok(builder.build())
    }

    fn convert_attribute(
        &self,
        attribute: &Attribute,
        field: Option<&Value>,
        path: &str,
    ) -> Result<TypedValue, ConversionError> {
        let field = match field {
            Some(field) => field,
            None => return self.placeholder(attribute, path),
        };

        match &attribute.ty {
            AttributeType::Scalar(kind) => Ok(TypedValue::Scalar(scalar(*kind, field, path)?)),
            AttributeType::List(kind) => {
                let items = sequence(field, attribute, path)?
                    .iter()
                    .map(|item| scalar(*kind, item, path))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypedValue::List { element: *kind, items })
            }
            AttributeType::Object(nested) => {
                let mapping = field.as_mapping().ok_or_else(|| mismatch(attribute, path))?;
                Ok(TypedValue::Object(self.convert_object(nested, Some(mapping), path)?))
            }
            AttributeType::ObjectList(nested) => {
                let items = sequence(field, attribute, path)?
                    .iter()
                    .map(|item| {
                        let mapping = item.as_mapping().ok_or_else(|| mismatch(attribute, path))?;
                        self.convert_object(nested, Some(mapping), path)
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(TypedValue::ObjectList { items })
            }
        }
    }

    /// Value for an attribute the document leaves out
    ///
    /// Declared objects are always emitted, as a tree of placeholders.
    fn placeholder(&self, attribute: &Attribute, path: &str) -> Result<TypedValue, ConversionError> {
        match (&attribute.ty, attribute.presence) {
            (_, Presence::Required) => Err(ConversionError::Missing { path: path.to_string() }),
            (AttributeType::Object(nested), _) => {
                trace!(path, "object absent, emitting placeholders");
                Ok(TypedValue::Object(self.convert_object(nested, None, path)?))
            }
            (_, Presence::Computed) => {
                trace!(path, "computed attribute absent, emitting null");
                Ok(TypedValue::Null(attribute.ty.clone()))
            }
            (AttributeType::Scalar(kind), Presence::Optional) => {
                trace!(path, "optional attribute absent, emitting zero value");
                Ok(TypedValue::Scalar(Scalar::zero(*kind)))
            }
            (AttributeType::List(kind), Presence::Optional) => {
                trace!(path, "optional attribute absent, emitting empty list");
                Ok(TypedValue::List {
                    element: *kind,
                    items: Vec::new(),
                })
            }
            (AttributeType::ObjectList(_), Presence::Optional) => {
                trace!(path, "optional attribute absent, emitting empty object list");
                Ok(TypedValue::ObjectList { items: Vec::new() })
            }
        }
    }
}

/// Convert a document with the given descriptor
pub fn convert(document: &PipelineDocument, schema: &SchemaDescriptor) -> Result<TypedTree, ConversionError> {
    TreeConverter::new(schema).convert(document)
}

fn scalar(kind: ScalarKind, value: &Value, path: &str) -> Result<Scalar, ConversionError> {
    let converted = match kind {
        ScalarKind::String => value.as_str().map(|s| Scalar::String(s.to_string())),
        ScalarKind::Int64 => value.as_i64().map(Scalar::Int64),
        ScalarKind::Bool => value.as_bool().map(Scalar::Bool),
    };
    converted.ok_or_else(|| ConversionError::SchemaMismatch {
        path: path.to_string(),
        expected: kind.to_string(),
    })
}

fn sequence<'v>(value: &'v Value, attribute: &Attribute, path: &str) -> Result<&'v [Value], ConversionError> {
    value
        .as_sequence()
        .map(Vec::as_slice)
        .ok_or_else(|| mismatch(attribute, path))
}

fn mismatch(attribute: &Attribute, path: &str) -> ConversionError {
    ConversionError::SchemaMismatch {
        path: path.to_string(),
        expected: attribute.ty.to_string(),
    }
}
