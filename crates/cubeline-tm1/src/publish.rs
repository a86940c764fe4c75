//! Publishing dimensions, cubes and cell data to a TM1 server

use anyhow::{Context, Result};
use cubeline_core::{Dimension, FetchError, PlanStep, Session};

use crate::cells::CellUpdate;
use crate::payload::{
    AttributePayload, CubePayload, DimensionPayload, attributes_name, cube_path, hierarchy_path,
};

/// Write side of the target server
pub trait Target {
    /// POST a JSON body and return the response body if the status matches.
    fn post(
        &self,
        target: &str,
        body: String,
        expected: u16,
        operation: &str,
    ) -> Result<String, FetchError>;
}

impl Target for Session {
    fn post(
        &self,
        target: &str,
        body: String,
        expected: u16,
        operation: &str,
    ) -> Result<String, FetchError> {
        Session::post(self, target, body, expected, operation)
    }
}

const CREATED: u16 = 201;
const NO_CONTENT: u16 = 204;

/// Ask the server for its version; on a fresh session this is the
/// authenticated request that establishes the session cookie.
pub fn product_version(session: &Session) -> Result<String> {
    let version = session
        .probe(
            "Configuration/ProductVersion/$value",
            "request server product version",
        )
        .context("TM1 server not reachable")?;
    Ok(version.trim().to_string())
}

/// Issues the model write requests in dependency order.
pub struct Publisher<'t, T: ?Sized> {
    target: &'t T,
}

impl<'t, T: Target + ?Sized> Publisher<'t, T> {
    pub fn new(target: &'t T) -> Self {
        Self { target }
    }

    /// Create `dimension` and then set its element captions.
    pub fn publish_dimension(&self, dimension: &Dimension) -> Result<()> {
        let name = dimension.name();
        for step in dimension.creation_plan() {
            match step {
                PlanStep::CreateDimension(dimension) => {
                    log::info!("Creating dimension {name}");
                    let body = serde_json::to_string(&DimensionPayload::from(dimension))?;
                    self.target.post(
                        "Dimensions",
                        body,
                        CREATED,
                        &format!("create dimension '{name}'"),
                    )?;
                }
                PlanStep::CreateCaptionAttribute { dimension } => {
                    log::info!("Creating 'Caption' attribute for dimension {dimension}");
                    let body = serde_json::to_string(&AttributePayload {
                        name: "Caption",
                        kind: "String",
                    })?;
                    self.target.post(
                        &format!("{}/ElementAttributes", hierarchy_path(dimension, dimension)),
                        body,
                        CREATED,
                        &format!("create element attribute 'Caption' for dimension '{dimension}'"),
                    )?;
                }
                PlanStep::SetCaptions {
                    dimension,
                    hierarchy,
                } => {
                    log::info!(
                        "Setting {} captions in {dimension}/{}",
                        hierarchy.captions().len(),
                        hierarchy.name()
                    );
                    let updates: Vec<CellUpdate> = hierarchy
                        .captions()
                        .iter()
                        .map(|(element, caption)| {
                            CellUpdate::caption(dimension, hierarchy.name(), element, caption)
                        })
                        .collect();
                    self.update(
                        &attributes_name(dimension),
                        &updates,
                        &format!(
                            "set captions of elements in {dimension}/{}",
                            hierarchy.name()
                        ),
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Create a cube over existing dimensions. Returns its entity path.
    pub fn create_cube(&self, name: &str, dimensions: &[&str], rules: Option<&str>) -> Result<String> {
        log::info!("Creating cube {name} over {}", dimensions.join(", "));
        let body = serde_json::to_string(&CubePayload::new(name, dimensions, rules))?;
        self.target
            .post("Cubes", body, CREATED, &format!("create cube '{name}'"))?;
        Ok(cube_path(name))
    }

    /// Write a batch of cells into `cube`. An empty batch sends nothing.
    pub fn update_cells(&self, cube: &str, updates: &[CellUpdate]) -> Result<()> {
        self.update(cube, updates, &format!("load data into cube '{cube}'"))
    }

    fn update(&self, cube: &str, updates: &[CellUpdate], operation: &str) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        let body = serde_json::to_string(updates)?;
        self.target.post(
            &format!("{}/tm1.Update", cube_path(cube)),
            body,
            NO_CONTENT,
            operation,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use cubeline_core::{HierarchyBuilder, Level, Node};

    use super::*;
    use crate::cells::{CellValue, ElementRef};

    /// Records posts; fails the post whose index matches `fail_at`
    #[derive(Default)]
    struct Recorder {
        posts: RefCell<Vec<(String, serde_json::Value, u16)>>,
        fail_at: Option<usize>,
    }

    impl Target for Recorder {
        fn post(
            &self,
            target: &str,
            body: String,
            expected: u16,
            operation: &str,
        ) -> Result<String, FetchError> {
            let mut posts = self.posts.borrow_mut();
            if self.fail_at == Some(posts.len()) {
                return Err(FetchError::Status {
                    operation: operation.to_string(),
                    expected,
                    actual: 400,
                    body: "rejected".to_string(),
                });
            }
            posts.push((target.to_string(), serde_json::from_str(&body).unwrap(), expected));
            Ok(String::new())
        }
    }

    /// category id, category, product id, product
    type Line = (u32, &'static str, u32, &'static str);

    fn products() -> Dimension {
        let mut builder = HierarchyBuilder::new(
            "Products",
            Node::new("All", "All Products"),
            vec![Level::required("Category", |r: &Line| {
                Node::new(format!("C-{}", r.0), r.1)
            })],
            |r: &Line| Node::new(format!("P-{}", r.2), r.3),
        );
        builder
            .extend(&[(1, "Beverages", 1, "Chai"), (1, "Beverages", 2, "Chang")])
            .unwrap();
        let mut d = Dimension::new("Products");
        d.push_hierarchy(builder.finish());
        d
    }

    #[test]
    fn dimension_then_attribute_then_captions() {
        let recorder = Recorder::default();
        Publisher::new(&recorder)
            .publish_dimension(&products())
            .unwrap();

        let posts = recorder.posts.borrow();
        let targets: Vec<&str> = posts.iter().map(|(t, _, _)| t.as_str()).collect();
        assert_eq!(
            targets,
            [
                "Dimensions",
                "Dimensions('Products')/Hierarchies('Products')/ElementAttributes",
                "Cubes('}ElementAttributes_Products')/tm1.Update",
            ]
        );
        assert_eq!(posts[0].2, 201);
        assert_eq!(posts[1].1, serde_json::json!({"Name": "Caption", "Type": "String"}));
        assert_eq!(posts[2].2, 204);
        // All, C-1, P-1, P-2 carry captions
        assert_eq!(posts[2].1.as_array().map(Vec::len), Some(4));
        assert_eq!(posts[0].1["Hierarchies"][0]["Edges"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn uncaptioned_dimension_is_single_request() {
        let mut d = Dimension::new("Plain");
        d.add_hierarchy("Plain").add_element("x", "");
        let recorder = Recorder::default();
        Publisher::new(&recorder).publish_dimension(&d).unwrap();
        assert_eq!(recorder.posts.borrow().len(), 1);
    }

    #[test]
    fn failure_stops_publishing() {
        let recorder = Recorder {
            fail_at: Some(1),
            ..Default::default()
        };
        let err = Publisher::new(&recorder)
            .publish_dimension(&products())
            .unwrap_err();
        assert!(format!("{err:#}").contains("create element attribute 'Caption'"));
        assert_eq!(recorder.posts.borrow().len(), 1);
    }

    #[test]
    fn cube_creation() {
        let recorder = Recorder::default();
        let path = Publisher::new(&recorder)
            .create_cube("Sales", &["Products", "Measures"], None)
            .unwrap();
        assert_eq!(path, "Cubes('Sales')");
        let posts = recorder.posts.borrow();
        assert_eq!(posts[0].0, "Cubes");
        assert!(posts[0].1.get("Rules").is_none());
    }

    #[test]
    fn cell_updates_and_empty_batch() {
        let recorder = Recorder::default();
        let publisher = Publisher::new(&recorder);
        publisher.update_cells("Sales", &[]).unwrap();
        assert!(recorder.posts.borrow().is_empty());

        let update = CellUpdate::new(
            vec![
                ElementRef::default_of("Products", "P-1"),
                ElementRef::default_of("Measures", "Quantity"),
            ],
            CellValue::Increment(5.0),
        );
        publisher.update_cells("Sales", &[update]).unwrap();
        let posts = recorder.posts.borrow();
        assert_eq!(posts[0].0, "Cubes('Sales')/tm1.Update");
        assert_eq!(posts[0].1[0]["Value"], "+5");
    }
}
