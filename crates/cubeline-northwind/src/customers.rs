//! Customers dimension: country, optional region, city, customer

use anyhow::Result;
use cubeline_core::{CollectionQuery, Dimension, HierarchyBuilder, Level, Node, Transport};
use indicatif::ProgressBar;

use crate::records::Customer;
use crate::source::Northwind;

/// Sorted by the level path the builder expects
pub fn customers_query() -> CollectionQuery {
    CollectionQuery::new("Customers")
        .order_by("Country asc,Region asc,City asc")
        .select("CustomerID,CompanyName,City,Region,Country")
}

/// City names repeat across countries, so city ids carry the country.
pub fn customer_builder(name: &str) -> HierarchyBuilder<Customer> {
    HierarchyBuilder::new(
        name,
        Node::new("All", "All Customers"),
        vec![
            Level::required("Country", |c: &Customer| Node::id(c.country.as_str())),
            Level::optional("Region", |c: &Customer| {
                Node::id(c.region.clone().unwrap_or_default())
            }),
            Level::required("City", |c: &Customer| {
                Node::new(format!("{}-{}", c.country, c.city), c.city.as_str())
            }),
        ],
        |c: &Customer| Node::new(c.id.as_str(), c.name.as_str()),
    )
}

impl<T: Transport> Northwind<T> {
    pub fn customers(&self, name: &str, pb: &ProgressBar) -> Result<Dimension> {
        let mut builder = customer_builder(name);
        self.for_each_page(&customers_query(), pb, |customers: Vec<Customer>| {
            Ok(builder.extend(&customers)?)
        })?;

        let mut dimension = Dimension::new(name);
        dimension.push_hierarchy(builder.finish());
        Ok(dimension)
    }
}

#[cfg(test)]
mod tests {
    use cubeline_core::test_utils::ScriptedTransport;
    use serde_json::json;

    use super::*;
    use crate::fixtures::page;

    #[test]
    fn regions_and_qualified_cities() {
        let transport = ScriptedTransport::bodies([
            page(
                Some(4),
                json!([
                    {"CustomerID": "CACTU", "CompanyName": "Cactus Comidas para llevar", "City": "Buenos Aires", "Region": null, "Country": "Argentina"},
                    {"CustomerID": "OCEAN", "CompanyName": "Océano Atlántico Ltda.", "City": "Buenos Aires", "Region": null, "Country": "Argentina"},
                ]),
            ),
            page(
                None,
                json!([
                    {"CustomerID": "WHITC", "CompanyName": "White Clover Markets", "City": "Seattle", "Region": "WA", "Country": "USA"},
                    {"CustomerID": "LAZYK", "CompanyName": "Lazy K Kountry Store", "City": "Walla Walla", "Region": "WA", "Country": "USA"},
                ]),
            ),
        ]);
        let source = Northwind::new(&transport, 2);
        let dimension = source.customers("Customers", &ProgressBar::hidden()).unwrap();
        dimension.validate().unwrap();

        let h = dimension.default_hierarchy().unwrap();
        let names: Vec<&str> = h.elements().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "All",
                "Argentina",
                "Argentina-Buenos Aires",
                "CACTU",
                "OCEAN",
                "USA",
                "WA",
                "USA-Seattle",
                "WHITC",
                "USA-Walla Walla",
                "LAZYK",
            ]
        );
        assert_eq!(h.caption("USA-Seattle"), Some("Seattle"));
        assert_eq!(h.caption("WHITC"), Some("White Clover Markets"));
        assert!(h
            .edges()
            .iter()
            .any(|e| e.parent == "Argentina" && e.component == "Argentina-Buenos Aires"));
        assert_eq!(
            transport.targets()[1],
            "Customers?$orderby=Country%20asc,Region%20asc,City%20asc&$select=CustomerID,CompanyName,City,Region,Country&$skip=2&$top=2"
        );
    }
}
