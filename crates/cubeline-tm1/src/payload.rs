//! TM1 REST payloads borrowing the dimension model

use cubeline_core::{Dimension, Edge, Element, Hierarchy};
use serde::Serialize;

/// Quote an entity key for use inside `('...')`
pub fn key(name: &str) -> String {
    name.replace('\'', "''")
}

/// `Dimensions('d')`
pub fn dimension_path(dimension: &str) -> String {
    format!("Dimensions('{}')", key(dimension))
}

/// `Dimensions('d')/Hierarchies('h')`
pub fn hierarchy_path(dimension: &str, hierarchy: &str) -> String {
    format!("{}/Hierarchies('{}')", dimension_path(dimension), key(hierarchy))
}

/// `Cubes('c')`
pub fn cube_path(cube: &str) -> String {
    format!("Cubes('{}')", key(cube))
}

/// Name of the control dimension and cube holding element attributes
pub fn attributes_name(dimension: &str) -> String {
    format!("}}ElementAttributes_{dimension}")
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DimensionPayload<'a> {
    pub name: &'a str,
    pub hierarchies: Vec<HierarchyPayload<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HierarchyPayload<'a> {
    pub name: &'a str,
    pub elements: Vec<ElementPayload<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgePayload<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ElementPayload<'a> {
    pub name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EdgePayload<'a> {
    pub parent_name: &'a str,
    pub component_name: &'a str,
    pub weight: f64,
}

impl<'a> From<&'a Dimension> for DimensionPayload<'a> {
    fn from(dimension: &'a Dimension) -> Self {
        Self {
            name: dimension.name(),
            hierarchies: dimension.hierarchies().iter().map(Into::into).collect(),
        }
    }
}

impl<'a> From<&'a Hierarchy> for HierarchyPayload<'a> {
    fn from(hierarchy: &'a Hierarchy) -> Self {
        Self {
            name: hierarchy.name(),
            elements: hierarchy.elements().iter().map(Into::into).collect(),
            edges: hierarchy.edges().iter().map(Into::into).collect(),
        }
    }
}

impl<'a> From<&'a Element> for ElementPayload<'a> {
    fn from(element: &'a Element) -> Self {
        Self {
            name: &element.name,
        }
    }
}

impl<'a> From<&'a Edge> for EdgePayload<'a> {
    fn from(edge: &'a Edge) -> Self {
        Self {
            parent_name: &edge.parent,
            component_name: &edge.component,
            weight: edge.weight,
        }
    }
}

/// Element attribute definition
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributePayload<'a> {
    pub name: &'a str,
    #[serde(rename = "Type")]
    pub kind: &'a str,
}

/// Cube definition bound to existing dimensions
#[derive(Debug, Serialize)]
pub struct CubePayload<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Dimensions@odata.bind")]
    pub dimensions: Vec<String>,
    #[serde(rename = "Rules", skip_serializing_if = "Option::is_none")]
    pub rules: Option<&'a str>,
}

impl<'a> CubePayload<'a> {
    pub fn new(name: &'a str, dimensions: &[&str], rules: Option<&'a str>) -> Self {
        Self {
            name,
            dimensions: dimensions.iter().map(|d| dimension_path(d)).collect(),
            rules: rules.filter(|r| !r.trim().is_empty()),
        }
    }
}
