//! API model: operations and the shape index they reference
//!
//! The model is read from a service description document. Structure members
//! keep the order in which the document declares them, which is the order
//! generated literals follow.

use crate::error::{CoreError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Reference from one shape (or operation) to another
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShapeRef {
    pub shape: String,
}

impl ShapeRef {
    fn named(shape: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
        }
    }
}

/// A named member of a structure shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub target: ShapeRef,
}

/// Recursive type descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    String,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Blob,
    Timestamp,
    List { member: ShapeRef },
    Map { key: ShapeRef, value: ShapeRef },
    Structure { members: Vec<Member>, required: Vec<String> },
}

impl Shape {
    /// Look up a structure member by its declared name
    pub fn member(&self, name: &str) -> Option<&Member> {
        match self {
            Shape::Structure { members, .. } => members.iter().find(|m| m.name == name),
            _ => None,
        }
    }

    /// Whether a structure member is required
    pub fn is_required(&self, name: &str) -> bool {
        match self {
            Shape::Structure { required, .. } => required.iter().any(|r| r == name),
            _ => false,
        }
    }

    /// Short type name used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::String => "string",
            Shape::Integer => "integer",
            Shape::Long => "long",
            Shape::Float => "float",
            Shape::Double => "double",
            Shape::Boolean => "boolean",
            Shape::Blob => "blob",
            Shape::Timestamp => "timestamp",
            Shape::List { .. } => "list",
            Shape::Map { .. } => "map",
            Shape::Structure { .. } => "structure",
        }
    }
}

/// A named API action
#[derive(Debug, Clone)]
pub struct Operation {
    pub name: String,
    pub input: ShapeRef,
    pub output: ShapeRef,
}

/// Operations and shapes of one service
#[derive(Debug, Clone, Default)]
pub struct ApiModel {
    operations: BTreeMap<String, Operation>,
    shapes: HashMap<String, Shape>,
}

#[derive(Deserialize)]
struct RawModel {
    #[serde(default)]
    operations: BTreeMap<String, RawOperation>,
    #[serde(default)]
    shapes: HashMap<String, RawShape>,
}

#[derive(Deserialize)]
struct RawOperation {
    input: Option<ShapeRef>,
    output: Option<ShapeRef>,
}

#[derive(Deserialize)]
struct RawShape {
    #[serde(rename = "type")]
    shape_type: String,
    #[serde(default)]
    members: Map<String, Value>,
    #[serde(default)]
    required: Vec<String>,
    member: Option<ShapeRef>,
    key: Option<ShapeRef>,
    value: Option<ShapeRef>,
}

impl ApiModel {
    /// Load a model from a JSON file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::parse(path.display().to_string(), e))?;
        Self::from_json(&content).map_err(|e| match e {
            CoreError::Json(json) => CoreError::parse(path.display().to_string(), json),
            other => other,
        })
    }

    /// Load a model from a JSON string
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: RawModel = serde_json::from_str(content)?;

        let mut shapes = HashMap::with_capacity(raw.shapes.len());
        for (name, raw_shape) in raw.shapes {
            let shape = convert_shape(&name, raw_shape)?;
            shapes.insert(name, shape);
        }

        let mut operations = BTreeMap::new();
        for (name, raw_op) in raw.operations {
            let input = raw_op
                .input
                .unwrap_or_else(|| synthesize_empty(&mut shapes, format!("{name}Input")));
            let output = raw_op
                .output
                .unwrap_or_else(|| synthesize_empty(&mut shapes, format!("{name}Output")));
            operations.insert(
                name.clone(),
                Operation {
                    name,
                    input,
                    output,
                },
            );
        }

        let model = ApiModel {
            operations,
            shapes,
        };
        model.check_references()?;

        tracing::debug!(
            "Loaded API model with {} operations and {} shapes",
            model.operations.len(),
            model.shapes.len()
        );
        Ok(model)
    }

    /// Find an operation by name
    pub fn operation(&self, name: &str) -> Result<&Operation> {
        self.operations
            .get(name)
            .ok_or_else(|| CoreError::UnknownOperation(name.to_string()))
    }

    /// Find a shape by name
    pub fn shape(&self, name: &str) -> Result<&Shape> {
        self.shapes
            .get(name)
            .ok_or_else(|| CoreError::UnknownShape(name.to_string()))
    }

    /// Resolve a reference to its shape
    pub fn resolve(&self, shape_ref: &ShapeRef) -> Result<&Shape> {
        self.shape(&shape_ref.shape)
    }

    /// Every reference must point at a defined shape
    fn check_references(&self) -> Result<()> {
        for op in self.operations.values() {
            self.resolve(&op.input)?;
            self.resolve(&op.output)?;
        }
        for shape in self.shapes.values() {
            match shape {
                Shape::List { member } => {
                    self.resolve(member)?;
                }
                Shape::Map { key, value } => {
                    self.resolve(key)?;
                    self.resolve(value)?;
                }
                Shape::Structure { members, .. } => {
                    for member in members {
                        self.resolve(&member.target)?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn synthesize_empty(shapes: &mut HashMap<String, Shape>, name: String) -> ShapeRef {
    shapes.entry(name.clone()).or_insert(Shape::Structure {
        members: Vec::new(),
        required: Vec::new(),
    });
    ShapeRef::named(name)
}

fn convert_shape(name: &str, raw: RawShape) -> Result<Shape> {
    let missing = |field: &str| CoreError::Validation {
        path: format!("shapes.{name}"),
        message: format!("{} shape is missing `{field}`", raw.shape_type),
    };

    let shape = match raw.shape_type.as_str() {
        "string" => Shape::String,
        "integer" => Shape::Integer,
        "long" => Shape::Long,
        "float" => Shape::Float,
        "double" => Shape::Double,
        "boolean" => Shape::Boolean,
        "blob" => Shape::Blob,
        "timestamp" => Shape::Timestamp,
        "list" => Shape::List {
            member: raw.member.clone().ok_or_else(|| missing("member"))?,
        },
        "map" => Shape::Map {
            key: raw.key.clone().ok_or_else(|| missing("key"))?,
            value: raw.value.clone().ok_or_else(|| missing("value"))?,
        },
        "structure" => {
            let mut members = Vec::with_capacity(raw.members.len());
            for (member_name, target) in raw.members {
                let target: ShapeRef =
                    serde_json::from_value(target).map_err(|e| CoreError::Validation {
                        path: format!("shapes.{name}.members.{member_name}"),
                        message: e.to_string(),
                    })?;
                members.push(Member {
                    name: member_name,
                    target,
                });
            }
            Shape::Structure {
                members,
                required: raw.required,
            }
        }
        other => {
            return Err(CoreError::Validation {
                path: format!("shapes.{name}"),
                message: format!("unsupported shape type `{other}`"),
            })
        }
    };
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL: &str = r#"{
        "metadata": {"serviceId": "Sample Service", "protocol": "rest-json"},
        "operations": {
            "EmptyOperation": {"http": {"method": "GET", "requestUri": "/"}},
            "PutThing": {
                "http": {"method": "PUT", "requestUri": "/things"},
                "input": {"shape": "PutThingInput"}
            }
        },
        "shapes": {
            "PutThingInput": {
                "type": "structure",
                "required": ["Name"],
                "members": {
                    "Zeta": {"shape": "String"},
                    "Name": {"shape": "String"},
                    "Alpha": {"shape": "Tags"}
                }
            },
            "Tags": {"type": "list", "member": {"shape": "String"}},
            "String": {"type": "string"}
        }
    }"#;

    #[test]
    fn test_member_order_is_declared_order() {
        let model = ApiModel::from_json(MODEL).unwrap();
        let shape = model.shape("PutThingInput").unwrap();
        let Shape::Structure { members, .. } = shape else {
            panic!("expected structure");
        };
        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Zeta", "Name", "Alpha"]);
        assert!(shape.is_required("Name"));
        assert!(!shape.is_required("Zeta"));
    }

    #[test]
    fn test_missing_io_shapes_are_synthesized() {
        let model = ApiModel::from_json(MODEL).unwrap();
        let op = model.operation("EmptyOperation").unwrap();
        assert_eq!(op.input.shape, "EmptyOperationInput");
        assert_eq!(op.output.shape, "EmptyOperationOutput");
        assert!(matches!(
            model.resolve(&op.input).unwrap(),
            Shape::Structure { members, .. } if members.is_empty()
        ));
    }

    #[test]
    fn test_unknown_operation() {
        let model = ApiModel::from_json(MODEL).unwrap();
        assert!(matches!(
            model.operation("Nope"),
            Err(CoreError::UnknownOperation(name)) if name == "Nope"
        ));
    }

    #[test]
    fn test_dangling_reference_is_rejected() {
        let json = r#"{"shapes": {"L": {"type": "list", "member": {"shape": "Missing"}}}}"#;
        assert!(matches!(
            ApiModel::from_json(json),
            Err(CoreError::UnknownShape(name)) if name == "Missing"
        ));
    }
}
