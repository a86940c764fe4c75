//! Dimensional model: dimensions own hierarchies, hierarchies own elements and edges
//!
//! Everything here is append-only. Elements keep first-seen order, edges keep
//! creation order, and hierarchies keep creation order (the first one is the
//! dimension's default hierarchy).

use std::collections::{BTreeMap, HashSet};

use crate::error::ModelError;

/// Default consolidation weight of an edge
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Node of a hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
}

/// `component` rolls up into `parent` with `weight`
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub parent: String,
    pub component: String,
    pub weight: f64,
}

/// One consolidation tree within a dimension
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    name: String,
    elements: Vec<Element>,
    edges: Vec<Edge>,
    captions: BTreeMap<String, String>,
}

impl Hierarchy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an element. The caption is only recorded when it is non-empty
    /// and differs from the identifier.
    pub fn add_element(&mut self, name: impl Into<String>, caption: &str) -> &Element {
        let name = name.into();
        if !caption.is_empty() && caption != name {
            self.captions.insert(name.clone(), caption.to_string());
        }
        self.elements.push(Element { name });
        &self.elements[self.elements.len() - 1]
    }

    /// Append an edge with the default weight
    pub fn add_edge(&mut self, parent: impl Into<String>, component: impl Into<String>) -> &Edge {
        self.add_weighted_edge(parent, component, DEFAULT_WEIGHT)
    }

    pub fn add_weighted_edge(
        &mut self,
        parent: impl Into<String>,
        component: impl Into<String>,
        weight: f64,
    ) -> &Edge {
        self.edges.push(Edge {
            parent: parent.into(),
            component: component.into(),
            weight,
        });
        &self.edges[self.edges.len() - 1]
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Captions keyed by element identifier, sorted by identifier
    pub fn captions(&self) -> &BTreeMap<String, String> {
        &self.captions
    }

    pub fn caption(&self, element: &str) -> Option<&str> {
        self.captions.get(element).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Check element uniqueness and that every edge references elements
    /// appended before it.
    ///
    /// Streaming construction never looks elements up, so this is the only
    /// place where a mis-sorted or unqualified input is detected.
    pub fn validate(&self) -> Result<(), ModelError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.elements.len());
        for element in &self.elements {
            if !seen.insert(element.name.as_str()) {
                return Err(ModelError::DuplicateElement {
                    hierarchy: self.name.clone(),
                    element: element.name.clone(),
                });
            }
        }
        for edge in &self.edges {
            if !seen.contains(edge.parent.as_str()) || !seen.contains(edge.component.as_str()) {
                return Err(ModelError::DanglingEdge {
                    hierarchy: self.name.clone(),
                    parent: edge.parent.clone(),
                    child: edge.component.clone(),
                });
            }
        }
        Ok(())
    }
}

/// A named classification axis
#[derive(Debug, Clone)]
pub struct Dimension {
    name: String,
    hierarchies: Vec<Hierarchy>,
}

impl Dimension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hierarchies: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Create an empty hierarchy and return it for filling
    pub fn add_hierarchy(&mut self, name: impl Into<String>) -> &mut Hierarchy {
        self.hierarchies.push(Hierarchy::new(name));
        let last = self.hierarchies.len() - 1;
        &mut self.hierarchies[last]
    }

    /// Append a hierarchy built elsewhere (e.g. by a `HierarchyBuilder`)
    pub fn push_hierarchy(&mut self, hierarchy: Hierarchy) {
        self.hierarchies.push(hierarchy);
    }

    pub fn hierarchies(&self) -> &[Hierarchy] {
        &self.hierarchies
    }

    /// First hierarchy created, if any
    pub fn default_hierarchy(&self) -> Option<&Hierarchy> {
        self.hierarchies.first()
    }

    pub fn hierarchy(&self, name: &str) -> Option<&Hierarchy> {
        self.hierarchies.iter().find(|h| h.name == name)
    }

    pub fn has_captions(&self) -> bool {
        self.hierarchies.iter().any(|h| !h.captions.is_empty())
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.hierarchies.iter().try_for_each(Hierarchy::validate)
    }

    /// Dependency-ordered steps needed to recreate this dimension remotely.
    ///
    /// The dimension definition (hierarchies, elements, then edges) always
    /// comes first; captions follow as a separate phase because attribute
    /// values can only be written once the elements exist.
    pub fn creation_plan(&self) -> Vec<PlanStep<'_>> {
        let mut steps = vec![PlanStep::CreateDimension(self)];
        if self.has_captions() {
            steps.push(PlanStep::CreateCaptionAttribute {
                dimension: &self.name,
            });
            for hierarchy in self.hierarchies.iter().filter(|h| !h.captions.is_empty()) {
                steps.push(PlanStep::SetCaptions {
                    dimension: &self.name,
                    hierarchy,
                });
            }
        }
        steps
    }
}

/// One step of a [`Dimension::creation_plan`]
#[derive(Debug, Clone, Copy)]
pub enum PlanStep<'a> {
    /// Dimension with all hierarchies, elements and edges
    CreateDimension(&'a Dimension),
    /// String attribute named `Caption` on the dimension
    CreateCaptionAttribute { dimension: &'a str },
    /// Caption values of one hierarchy
    SetCaptions {
        dimension: &'a str,
        hierarchy: &'a Hierarchy,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_only_kept_when_different() {
        let mut h = Hierarchy::new("Measures");
        h.add_element("Quantity", "");
        h.add_element("Revenue", "Revenue");
        h.add_element("UnitPrice", "Unit Price");
        assert_eq!(h.len(), 3);
        assert_eq!(h.captions().len(), 1);
        assert_eq!(h.caption("UnitPrice"), Some("Unit Price"));
        assert_eq!(h.caption("Revenue"), None);
    }

    #[test]
    fn edge_default_weight() {
        let mut h = Hierarchy::new("h");
        h.add_element("All", "");
        h.add_element("a", "");
        let edge = h.add_edge("All", "a");
        assert_eq!(edge.weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn validate_detects_duplicates() {
        let mut h = Hierarchy::new("Customers");
        h.add_element("US", "");
        h.add_element("US", "");
        assert_eq!(
            h.validate(),
            Err(ModelError::DuplicateElement {
                hierarchy: "Customers".to_string(),
                element: "US".to_string(),
            })
        );
    }

    #[test]
    fn validate_detects_dangling_edge() {
        let mut h = Hierarchy::new("h");
        h.add_element("All", "");
        h.add_edge("All", "missing");
        assert!(matches!(
            h.validate(),
            Err(ModelError::DanglingEdge { .. })
        ));
    }

    #[test]
    fn default_hierarchy_is_first_created() {
        let mut d = Dimension::new("Employees");
        d.add_hierarchy("Employees");
        d.add_hierarchy("Generation");
        assert_eq!(d.default_hierarchy().map(Hierarchy::name), Some("Employees"));
        assert!(d.hierarchy("Generation").is_some());
    }

    #[test]
    fn plan_without_captions_is_single_step() {
        let mut d = Dimension::new("Plain");
        d.add_hierarchy("Plain").add_element("x", "");
        let plan = d.creation_plan();
        assert_eq!(plan.len(), 1);
        assert!(matches!(plan[0], PlanStep::CreateDimension(_)));
    }

    #[test]
    fn plan_orders_definition_before_captions() {
        let mut d = Dimension::new("Employees");
        d.add_hierarchy("Employees").add_element("1", "Davolio, Nancy");
        d.add_hierarchy("Generation").add_element("1", "");
        d.add_hierarchy("Cohorts").add_element("X", "Generation X");

        let plan = d.creation_plan();
        assert_eq!(plan.len(), 4);
        assert!(matches!(plan[0], PlanStep::CreateDimension(_)));
        assert!(matches!(
            plan[1],
            PlanStep::CreateCaptionAttribute { dimension: "Employees" }
        ));
        let captioned: Vec<&str> = plan[2..]
            .iter()
            .filter_map(|s| match s {
                PlanStep::SetCaptions { hierarchy, .. } => Some(hierarchy.name()),
                _ => None,
            })
            .collect();
        assert_eq!(captioned, ["Employees", "Cohorts"]);
    }
}
