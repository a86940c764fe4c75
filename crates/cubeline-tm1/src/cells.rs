//! Cell coordinates and values for `tm1.Update`

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::payload::{attributes_name, hierarchy_path, key};

/// Element addressed through a dimension hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementRef {
    pub dimension: String,
    pub hierarchy: String,
    pub element: String,
}

impl ElementRef {
    pub fn new(
        dimension: impl Into<String>,
        hierarchy: impl Into<String>,
        element: impl Into<String>,
    ) -> Self {
        Self {
            dimension: dimension.into(),
            hierarchy: hierarchy.into(),
            element: element.into(),
        }
    }

    /// Element in the same-named (default) hierarchy of `dimension`
    pub fn default_of(dimension: &str, element: impl Into<String>) -> Self {
        Self::new(dimension, dimension, element)
    }

    /// `Dimensions('d')/Hierarchies('h')/Elements('e')`
    pub fn binding(&self) -> String {
        format!(
            "{}/Elements('{}')",
            hierarchy_path(&self.dimension, &self.hierarchy),
            key(&self.element)
        )
    }
}

/// Value written to a cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Replace the numeric value
    Number(f64),
    /// Add to the existing numeric value
    Increment(f64),
    Text(String),
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(v) => serializer.serialize_f64(*v),
            // TM1 spreading syntax: a leading '+' adds to the stored value
            Self::Increment(v) => serializer.serialize_str(&format!("+{v}")),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// One cell of a bulk update
#[derive(Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub tuple: Vec<ElementRef>,
    pub value: CellValue,
}

impl CellUpdate {
    pub fn new(tuple: Vec<ElementRef>, value: CellValue) -> Self {
        Self { tuple, value }
    }

    /// Caption attribute value of `element`
    pub fn caption(dimension: &str, hierarchy: &str, element: &str, caption: &str) -> Self {
        let attributes = attributes_name(dimension);
        Self {
            tuple: vec![
                ElementRef::new(dimension, hierarchy, element),
                ElementRef::new(attributes.as_str(), attributes.as_str(), "Caption"),
            ],
            value: CellValue::Text(caption.to_string()),
        }
    }
}

impl Serialize for CellUpdate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let slice: Vec<String> = self.tuple.iter().map(ElementRef::binding).collect();
        let mut s = serializer.serialize_struct("CellUpdate", 2)?;
        s.serialize_field("Slice@odata.bind", &slice)?;
        s.serialize_field("Value", &self.value)?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_path() {
        let e = ElementRef::default_of("Customers", "ALFKI");
        assert_eq!(
            e.binding(),
            "Dimensions('Customers')/Hierarchies('Customers')/Elements('ALFKI')"
        );
    }

    #[test]
    fn increment_is_prefixed_string() {
        assert_eq!(
            serde_json::to_value(CellValue::Increment(12.0)).unwrap(),
            serde_json::json!("+12")
        );
        assert_eq!(
            serde_json::to_value(CellValue::Increment(167.4)).unwrap(),
            serde_json::json!("+167.4")
        );
        assert_eq!(
            serde_json::to_value(CellValue::Number(3.5)).unwrap(),
            serde_json::json!(3.5)
        );
    }

    #[test]
    fn caption_update_shape() {
        let update = CellUpdate::caption("Customers", "Customers", "USA-Seattle", "Seattle");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Slice@odata.bind": [
                    "Dimensions('Customers')/Hierarchies('Customers')/Elements('USA-Seattle')",
                    "Dimensions('}ElementAttributes_Customers')/Hierarchies('}ElementAttributes_Customers')/Elements('Caption')"
                ],
                "Value": "Seattle"
            })
        );
    }
}
