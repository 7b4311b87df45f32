use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::core::resource::ResourceKind;

/// Keywords that give a schema node a shape, in priority order.
pub const TYPE_KEYWORDS: &[&str] = &["type", "contains", "allOf", "anyOf", "oneOf", "not", "$ref"];

/// Scalar JSON-Schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Boolean,
    Number,
    Integer,
    String,
}

impl ScalarKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "boolean" => Some(ScalarKind::Boolean),
            "number" => Some(ScalarKind::Number),
            "integer" => Some(ScalarKind::Integer),
            "string" => Some(ScalarKind::String),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Boolean => "boolean",
            ScalarKind::Number => "number",
            ScalarKind::Integer => "integer",
            ScalarKind::String => "string",
        }
    }

    /// Whether a document value has this type. Integers are numbers too.
    /// Only used to choose between `anyOf` alternatives; elsewhere a scalar
    /// of another kind is taken as it is.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ScalarKind::Boolean => value.is_boolean(),
            ScalarKind::Number => value.is_number(),
            ScalarKind::Integer => value.is_i64() || value.is_u64(),
            ScalarKind::String => value.is_string(),
        }
    }
}

/// The shape of a schema node, decided once when the schema is loaded.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaShape {
    Scalar(ScalarKind),
    Object {
        properties: IndexMap<String, SchemaNode>,
        additional_properties: Option<Box<SchemaNode>>,
        /// Members written into localized output when the source lacks them.
        required: Vec<String>,
    },
    Array {
        items: Option<Box<SchemaNode>>,
    },
    Ref(String),
    AnyOf(Vec<SchemaNode>),
    /// A shape keyword this engine does not interpret (`contains`, `allOf`,
    /// `oneOf`, `not`, or an unknown `type`).
    Uninterpreted(String),
    /// None of the shape keywords is present.
    Untyped,
}

/// Where a satellite field takes its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingSource {
    /// `_value`: the text of the node being visited.
    Value,
    /// `_element`: the name of the element that holds the resource.
    Element,
    /// `_path`: the document pointer of the node, as a resource key.
    Path,
    /// `_pathname`: the path of the document being walked.
    PathName,
    /// `_basename`: the document file name up to its first dot.
    BaseName,
    /// Any other string is taken literally.
    Literal(String),
}

impl BindingSource {
    fn from_value(value: &Value) -> Option<Self> {
        let text = match value {
            Value::String(s) => s.as_str(),
            Value::Null => return None,
            other => return Some(BindingSource::Literal(other.to_string())),
        };
        Some(match text {
            "_value" => BindingSource::Value,
            "_element" => BindingSource::Element,
            "_path" => BindingSource::Path,
            "_pathname" => BindingSource::PathName,
            "_basename" => BindingSource::BaseName,
            _ => BindingSource::Literal(text.to_string()),
        })
    }
}

/// Satellite bindings: one optional rule per resource field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    pub category: Option<BindingSource>,
    pub locale: Option<BindingSource>,
    pub source: Option<BindingSource>,
    pub key: Option<BindingSource>,
    pub comment: Option<BindingSource>,
}

impl Bindings {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.locale.is_none()
            && self.source.is_none()
            && self.key.is_none()
            && self.comment.is_none()
    }
}

/// The `localizableType` annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizableTypeSpec {
    pub kind: ResourceKind,
    pub bindings: Bindings,
}

impl LocalizableTypeSpec {
    /// Accepts either a kind name (`"array"`) or an object with an optional
    /// `type` and the five binding fields.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(kind) => Some(Self {
                kind: ResourceKind::from_name(kind),
                bindings: Bindings::default(),
            }),
            Value::Object(map) => {
                let field = |name: &str| map.get(name).and_then(BindingSource::from_value);
                Some(Self {
                    kind: map
                        .get("type")
                        .and_then(Value::as_str)
                        .map(ResourceKind::from_name)
                        .unwrap_or_default(),
                    bindings: Bindings {
                        category: field("category"),
                        locale: field("locale"),
                        source: field("source"),
                        key: field("key"),
                        comment: field("comment"),
                    },
                })
            }
            _ => None,
        }
    }
}

/// One node of a schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub shape: SchemaShape,
    pub localizable: bool,
    pub localizable_type: Option<LocalizableTypeSpec>,
    pub anchor: Option<String>,
}

impl SchemaNode {
    pub fn new(shape: SchemaShape) -> Self {
        Self {
            shape,
            localizable: false,
            localizable_type: None,
            anchor: None,
        }
    }

    pub fn localizable(mut self) -> Self {
        self.localizable = true;
        self
    }

    /// Build a node from its JSON form. Non-object values (boolean schemas
    /// and the like) become [`SchemaShape::Untyped`].
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return SchemaNode::new(SchemaShape::Untyped);
        };

        SchemaNode {
            shape: shape_of(map),
            localizable: map
                .get("localizable")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            localizable_type: map
                .get("localizableType")
                .and_then(LocalizableTypeSpec::from_value),
            anchor: map
                .get("$anchor")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// True when this node binds at least one satellite field.
    pub fn has_bindings(&self) -> bool {
        self.localizable_type
            .as_ref()
            .is_some_and(|spec| !spec.bindings.is_empty())
    }

    pub fn bindings(&self) -> Option<&Bindings> {
        self.localizable_type
            .as_ref()
            .map(|spec| &spec.bindings)
            .filter(|bindings| !bindings.is_empty())
    }
}

fn shape_of(map: &Map<String, Value>) -> SchemaShape {
    let Some(keyword) = TYPE_KEYWORDS.iter().find(|k| map.contains_key(**k)) else {
        return SchemaShape::Untyped;
    };
    let value = &map[*keyword];

    match *keyword {
        "type" => shape_of_type(map, value),
        "anyOf" => match value {
            Value::Array(alternatives) => {
                SchemaShape::AnyOf(alternatives.iter().map(SchemaNode::from_value).collect())
            }
            _ => SchemaShape::Uninterpreted("anyOf".to_string()),
        },
        "$ref" => match value.as_str() {
            Some(target) => SchemaShape::Ref(target.to_string()),
            None => SchemaShape::Uninterpreted("$ref".to_string()),
        },
        other => SchemaShape::Uninterpreted(other.to_string()),
    }
}

fn shape_of_type(map: &Map<String, Value>, value: &Value) -> SchemaShape {
    // "type": ["string", "null"] picks the first type we understand
    let name = match value {
        Value::String(name) => Some(name.as_str()),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| *name == "object" || *name == "array" || ScalarKind::from_name(name).is_some()),
        _ => None,
    };

    match name {
        Some("object") => SchemaShape::Object {
            properties: map
                .get("properties")
                .and_then(Value::as_object)
                .map(|props| {
                    props
                        .iter()
                        .map(|(name, schema)| (name.clone(), SchemaNode::from_value(schema)))
                        .collect()
                })
                .unwrap_or_default(),
            additional_properties: map
                .get("additionalProperties")
                .filter(|schema| schema.is_object())
                .map(|schema| Box::new(SchemaNode::from_value(schema))),
            required: map
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default(),
        },
        Some("array") => SchemaShape::Array {
            items: map
                .get("items")
                .filter(|schema| schema.is_object())
                .map(|schema| Box::new(SchemaNode::from_value(schema))),
        },
        Some(name) => match ScalarKind::from_name(name) {
            Some(kind) => SchemaShape::Scalar(kind),
            None => SchemaShape::Uninterpreted(name.to_string()),
        },
        None => SchemaShape::Uninterpreted(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use crate::core::schema::node::*;
    use serde_json::json;

    #[test]
    fn test_type_keyword_priority() {
        // "type" wins over "$ref" when both are present
        let node = SchemaNode::from_value(&json!({"$ref": "#/x", "type": "string"}));
        assert_eq!(node.shape, SchemaShape::Scalar(ScalarKind::String));

        let node = SchemaNode::from_value(&json!({"$ref": "#/x", "anyOf": [{"type": "string"}]}));
        assert!(matches!(node.shape, SchemaShape::AnyOf(ref alts) if alts.len() == 1));
    }

    #[test]
    fn test_untyped_and_uninterpreted() {
        let node = SchemaNode::from_value(&json!({"description": "nothing here"}));
        assert_eq!(node.shape, SchemaShape::Untyped);

        let node = SchemaNode::from_value(&json!({"allOf": [{"type": "string"}]}));
        assert_eq!(node.shape, SchemaShape::Uninterpreted("allOf".to_string()));

        assert_eq!(SchemaNode::from_value(&json!(true)).shape, SchemaShape::Untyped);
    }

    #[test]
    fn test_object_shape() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "localizable": true}
            },
            "additionalProperties": {"type": "integer"}
        }));

        let SchemaShape::Object {
            properties,
            additional_properties,
            required,
        } = node.shape
        else {
            panic!("expected object shape");
        };
        assert!(properties["title"].localizable);
        assert_eq!(
            additional_properties.map(|s| s.shape),
            Some(SchemaShape::Scalar(ScalarKind::Integer))
        );
        assert!(required.is_empty());
    }

    #[test]
    fn test_required_members() {
        let node = SchemaNode::from_value(&json!({
            "type": "object",
            "properties": {"title": {"type": "string"}},
            "required": ["title", 3]
        }));
        assert!(matches!(
            node.shape,
            SchemaShape::Object { ref required, .. } if required == &["title".to_string()]
        ));
    }

    #[test]
    fn test_additional_properties_false_is_ignored() {
        let node = SchemaNode::from_value(&json!({"type": "object", "additionalProperties": false}));
        assert!(matches!(
            node.shape,
            SchemaShape::Object {
                additional_properties: None,
                ..
            }
        ));
    }

    #[test]
    fn test_type_list_picks_first_known() {
        let node = SchemaNode::from_value(&json!({"type": ["null", "string"]}));
        assert_eq!(node.shape, SchemaShape::Scalar(ScalarKind::String));
    }

    #[test]
    fn test_localizable_type_string_form() {
        let node = SchemaNode::from_value(&json!({
            "type": "array",
            "items": {"type": "string"},
            "localizable": true,
            "localizableType": "array"
        }));
        let spec = node.localizable_type.unwrap();
        assert_eq!(spec.kind, ResourceKind::Array);
        assert!(spec.bindings.is_empty());
    }

    #[test]
    fn test_localizable_type_bindings() {
        let node = SchemaNode::from_value(&json!({
            "type": "string",
            "localizableType": {
                "category": "_element",
                "source": "_value",
                "comment": "plural form"
            }
        }));
        assert!(node.has_bindings());
        let bindings = node.bindings().unwrap();
        assert_eq!(bindings.category, Some(BindingSource::Element));
        assert_eq!(bindings.source, Some(BindingSource::Value));
        assert_eq!(
            bindings.comment,
            Some(BindingSource::Literal("plural form".to_string()))
        );
        assert_eq!(bindings.key, None);
    }

    #[test]
    fn test_unknown_kind_defaults_to_string() {
        let spec = LocalizableTypeSpec::from_value(&json!("sentence")).unwrap();
        assert_eq!(spec.kind, ResourceKind::String);
    }
}
