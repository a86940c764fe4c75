//! Order lines as additive cell updates for the sales cube

use anyhow::Result;
use cubeline_core::{CollectionQuery, FetchSummary, Transport};
use cubeline_tm1::{CellUpdate, CellValue, ElementRef};
use indicatif::ProgressBar;

use crate::measures::{QUANTITY, REVENUE};
use crate::records::Order;
use crate::source::Northwind;
use crate::time::day_id;

/// Names of the sales cube and of its dimensions, in cube order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesCube {
    pub name: String,
    pub products: String,
    pub customers: String,
    pub employees: String,
    pub time: String,
    pub measures: String,
}

impl Default for SalesCube {
    fn default() -> Self {
        Self {
            name: "Sales".to_string(),
            products: "Products".to_string(),
            customers: "Customers".to_string(),
            employees: "Employees".to_string(),
            time: "Time".to_string(),
            measures: "Measures".to_string(),
        }
    }
}

impl SalesCube {
    pub fn dimensions(&self) -> [&str; 5] {
        [
            self.products.as_str(),
            self.customers.as_str(),
            self.employees.as_str(),
            self.time.as_str(),
            self.measures.as_str(),
        ]
    }

    /// Two updates per order line: quantity and revenue.
    ///
    /// Values are increments, so lines sharing a cell add up on the server
    /// without reading the cell first.
    pub fn cell_updates(&self, order: &Order) -> Vec<CellUpdate> {
        let customer = ElementRef::default_of(&self.customers, order.customer_id.as_str());
        let employee = ElementRef::default_of(&self.employees, order.employee_id.to_string());
        let day = ElementRef::default_of(&self.time, day_id(order.day()));

        let mut updates = Vec::with_capacity(order.details.len() * 2);
        for detail in &order.details {
            let product = ElementRef::default_of(&self.products, format!("P-{}", detail.product_id));
            let tuple = |measure: &str| {
                vec![
                    product.clone(),
                    customer.clone(),
                    employee.clone(),
                    day.clone(),
                    ElementRef::default_of(&self.measures, measure),
                ]
            };
            updates.push(CellUpdate::new(
                tuple(QUANTITY),
                CellValue::Increment(detail.quantity as f64),
            ));
            updates.push(CellUpdate::new(
                tuple(REVENUE),
                CellValue::Increment(detail.revenue()),
            ));
        }
        updates
    }
}

pub fn orders_query() -> CollectionQuery {
    CollectionQuery::new("Orders")
        .select("CustomerID,EmployeeID,OrderDate")
        .order_by("OrderID")
        .expand("Order_Details($select=ProductID,UnitPrice,Quantity)")
}

impl<T: Transport> Northwind<T> {
    /// Page through all orders and hand every page's updates to `sink`.
    ///
    /// Pages without order lines produce no call. An error from `sink`
    /// stops the load before the next page is requested.
    pub fn load_orders<F>(&self, cube: &SalesCube, pb: &ProgressBar, mut sink: F) -> Result<FetchSummary>
    where
        F: FnMut(&[CellUpdate]) -> Result<()>,
    {
        self.for_each_page(&orders_query(), pb, |orders: Vec<Order>| {
            let updates: Vec<CellUpdate> = orders.iter().flat_map(|o| cube.cell_updates(o)).collect();
            if updates.is_empty() {
                return Ok(());
            }
            log::debug!("{} orders -> {} cell updates", orders.len(), updates.len());
            sink(&updates)
        })
    }
}

#[cfg(test)]
mod tests {
    use cubeline_core::test_utils::ScriptedTransport;
    use serde_json::json;

    use super::*;
    use crate::fixtures::page;

    fn vinet() -> serde_json::Value {
        json!({
            "CustomerID": "VINET", "EmployeeID": 5, "OrderDate": "1996-07-04T00:00:00Z",
            "Order_Details": [
                {"ProductID": 11, "UnitPrice": 14.0, "Quantity": 12},
                {"ProductID": 42, "UnitPrice": 9.5, "Quantity": 10}
            ]
        })
    }

    #[test]
    fn quantity_and_revenue_per_line() {
        let order: Order = serde_json::from_value(vinet()).unwrap();
        let updates = SalesCube::default().cell_updates(&order);
        assert_eq!(updates.len(), 4);

        let first = serde_json::to_value(&updates[0]).unwrap();
        assert_eq!(
            first["Slice@odata.bind"],
            json!([
                "Dimensions('Products')/Hierarchies('Products')/Elements('P-11')",
                "Dimensions('Customers')/Hierarchies('Customers')/Elements('VINET')",
                "Dimensions('Employees')/Hierarchies('Employees')/Elements('5')",
                "Dimensions('Time')/Hierarchies('Time')/Elements('04-07-1996')",
                "Dimensions('Measures')/Hierarchies('Measures')/Elements('Quantity')"
            ])
        );
        assert_eq!(first["Value"], "+12");
        assert_eq!(updates[1].value, CellValue::Increment(168.0));
        assert_eq!(updates[3].tuple[0].element, "P-42");
        assert_eq!(updates[3].value, CellValue::Increment(95.0));
    }

    #[test]
    fn one_sink_call_per_page() {
        let transport = ScriptedTransport::bodies([
            page(Some(3), json!([vinet()])),
            page(
                None,
                json!([
                    {"CustomerID": "TOMSP", "EmployeeID": 6, "OrderDate": "1996-07-05T00:00:00Z",
                     "Order_Details": []},
                ]),
            ),
            page(None, json!([vinet()])),
        ]);
        let mut batches = Vec::new();
        let summary = Northwind::new(&transport, 1)
            .load_orders(&SalesCube::default(), &ProgressBar::hidden(), |updates| {
                batches.push(updates.len());
                Ok(())
            })
            .unwrap();
        assert_eq!(summary.pages, 3);
        // the page with no lines is skipped
        assert_eq!(batches, [4, 4]);
        assert!(transport.targets()[0].starts_with("Orders?$select=CustomerID,EmployeeID,OrderDate"));
    }

    #[test]
    fn sink_failure_stops_paging() {
        let transport = ScriptedTransport::bodies([
            page(Some(2), json!([vinet()])),
            page(None, json!([vinet()])),
        ]);
        let result = Northwind::new(&transport, 1).load_orders(
            &SalesCube::default(),
            &ProgressBar::hidden(),
            |_| Err(anyhow::anyhow!("interrupted")),
        );
        assert!(result.is_err());
        assert_eq!(transport.remaining(), 1);
    }

    #[test]
    fn cube_dimension_order() {
        assert_eq!(
            SalesCube::default().dimensions(),
            ["Products", "Customers", "Employees", "Time", "Measures"]
        );
    }
}
