//! Northwind entities as returned by the OData service

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    #[serde(rename = "CustomerID")]
    pub id: String,
    #[serde(rename = "CompanyName", default)]
    pub name: String,
    #[serde(rename = "City", default)]
    pub city: String,
    #[serde(rename = "Region", default)]
    pub region: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Employee {
    #[serde(rename = "EmployeeID")]
    pub id: i64,
    #[serde(rename = "TitleOfCourtesy", default)]
    pub title_of_courtesy: Option<String>,
    #[serde(rename = "FirstName", default)]
    pub first_name: String,
    #[serde(rename = "LastName", default)]
    pub last_name: String,
    #[serde(rename = "City", default)]
    pub city: String,
    #[serde(rename = "Region", default)]
    pub region: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: String,
    #[serde(rename = "BirthDate", default)]
    pub birth_date: Option<DateTime<Utc>>,
}

impl Employee {
    /// `Last, First`
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    pub fn birth_year(&self) -> Option<i32> {
        self.birth_date.map(|d| d.year())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    #[serde(rename = "ProductID")]
    pub id: i64,
    #[serde(rename = "ProductName", default)]
    pub name: String,
}

/// Category with its products expanded inline
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    #[serde(rename = "CategoryID")]
    pub id: i64,
    #[serde(rename = "CategoryName", default)]
    pub name: String,
    #[serde(rename = "Products", default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderDetail {
    #[serde(rename = "ProductID")]
    pub product_id: i64,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
}

impl OrderDetail {
    pub fn revenue(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    #[serde(rename = "CustomerID", default)]
    pub customer_id: String,
    #[serde(rename = "EmployeeID", default)]
    pub employee_id: i64,
    #[serde(rename = "OrderDate")]
    pub order_date: DateTime<Utc>,
    #[serde(rename = "Order_Details", default)]
    pub details: Vec<OrderDetail>,
}

impl Order {
    pub fn day(&self) -> NaiveDate {
        self.order_date.date_naive()
    }
}

/// Projection used when only the order date is selected
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDate {
    #[serde(rename = "OrderDate")]
    pub order_date: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_from_service_json() {
        let e: Employee = serde_json::from_str(
            r#"{"EmployeeID": 5, "LastName": "Buchanan", "FirstName": "Steven",
                "TitleOfCourtesy": "Mr.", "City": "London", "Region": null,
                "Country": "UK", "BirthDate": "1955-03-04T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(e.display_name(), "Buchanan, Steven");
        assert_eq!(e.birth_year(), Some(1955));
        assert_eq!(e.region, None);
    }

    #[test]
    fn order_with_details() {
        let o: Order = serde_json::from_str(
            r#"{"CustomerID": "VINET", "EmployeeID": 5, "OrderDate": "1996-07-04T00:00:00Z",
                "Order_Details": [{"ProductID": 11, "UnitPrice": 14.0, "Quantity": 12}]}"#,
        )
        .unwrap();
        assert_eq!(o.day(), NaiveDate::from_ymd_opt(1996, 7, 4).unwrap());
        assert_eq!(o.details[0].revenue(), 168.0);
    }
}
