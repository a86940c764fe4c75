//! Products dimension: category, product

use anyhow::Result;
use cubeline_core::{CollectionQuery, Dimension, HierarchyBuilder, Level, Node, Transport};
use indicatif::ProgressBar;

use crate::records::Category;
use crate::source::Northwind;

/// Category and product ids share a number space, hence the prefixes
#[derive(Debug, Clone)]
pub struct ProductLine {
    pub category_id: i64,
    pub category: String,
    pub product_id: i64,
    pub product: String,
}

pub fn categories_query() -> CollectionQuery {
    CollectionQuery::new("Categories")
        .select("CategoryID,CategoryName")
        .order_by("CategoryName")
        .expand("Products($select=ProductID,ProductName;$orderby=ProductName)")
}

/// One line per product, in category order
pub fn product_lines(categories: &[Category]) -> Vec<ProductLine> {
    categories
        .iter()
        .flat_map(|c| {
            c.products.iter().map(move |p| ProductLine {
                category_id: c.id,
                category: c.name.clone(),
                product_id: p.id,
                product: p.name.clone(),
            })
        })
        .collect()
}

pub fn product_builder(name: &str) -> HierarchyBuilder<ProductLine> {
    HierarchyBuilder::new(
        name,
        Node::new("All", "All Products"),
        vec![Level::required("Category", |p: &ProductLine| {
            Node::new(format!("C-{}", p.category_id), p.category.as_str())
        })],
        |p: &ProductLine| Node::new(format!("P-{}", p.product_id), p.product.as_str()),
    )
}

impl<T: Transport> Northwind<T> {
    pub fn products(&self, name: &str, pb: &ProgressBar) -> Result<Dimension> {
        let mut builder = product_builder(name);
        self.for_each_page(&categories_query(), pb, |categories: Vec<Category>| {
            Ok(builder.extend(&product_lines(&categories))?)
        })?;

        let mut dimension = Dimension::new(name);
        dimension.push_hierarchy(builder.finish());
        Ok(dimension)
    }
}
