//! Measures dimension

use cubeline_core::Dimension;

pub const QUANTITY: &str = "Quantity";
pub const UNIT_PRICE: &str = "UnitPrice";
pub const REVENUE: &str = "Revenue";

/// Flat list of the three measures; no source data involved
pub fn measures(name: &str) -> Dimension {
    let mut dimension = Dimension::new(name);
    let h = dimension.add_hierarchy(name);
    h.add_element(QUANTITY, "");
    h.add_element(UNIT_PRICE, "Unit Price");
    h.add_element(REVENUE, "");
    dimension
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_with_one_caption() {
        let d = measures("Measures");
        let h = d.default_hierarchy().unwrap();
        assert_eq!(h.len(), 3);
        assert!(h.edges().is_empty());
        assert_eq!(h.captions().len(), 1);
        assert_eq!(h.caption(UNIT_PRICE), Some("Unit Price"));
    }
}
