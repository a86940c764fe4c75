//! Time dimension covering every day between the first and last order.
//!
//! The default hierarchy is year, quarter, month, day. Three alternate
//! hierarchies group the same days by year only, by quarter of year and by
//! month of year; those need the day list re-sorted before it is fed to the
//! builder.

use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate};
use cubeline_core::{CollectionQuery, Dimension, HierarchyBuilder, Level, Node, Transport};

use crate::records::OrderDate;
use crate::source::Northwind;

/// `DD-MM-YYYY`, also used to address days when loading orders
pub fn day_id(day: NaiveDate) -> String {
    day.format("%d-%m-%Y").to_string()
}

fn quarter(day: &NaiveDate) -> u32 {
    (day.month() + 2) / 3
}

fn year_level() -> Level<NaiveDate> {
    Level::required("Year", |d: &NaiveDate| Node::id(d.year().to_string()))
}

fn day_leaf(d: &NaiveDate) -> Node {
    Node::id(day_id(*d))
}

fn calendar_builder(name: &str) -> HierarchyBuilder<NaiveDate> {
    HierarchyBuilder::new(
        name,
        Node::new("All", "All Years"),
        vec![
            year_level(),
            Level::required("Quarter", |d: &NaiveDate| {
                let (q, y) = (quarter(d), d.year());
                Node::new(format!("Q{q}-{y:04}"), format!("Q{q} {y:04}"))
            }),
            Level::required("Month", |d: &NaiveDate| {
                Node::new(d.format("%m-%Y").to_string(), d.format("%b %Y").to_string())
            }),
        ],
        |d: &NaiveDate| Node::new(day_id(*d), d.format("%a %b %e %Y").to_string()),
    )
}

fn years_builder() -> HierarchyBuilder<NaiveDate> {
    HierarchyBuilder::new(
        "Years",
        Node::new("Years", "All Years"),
        vec![year_level()],
        day_leaf,
    )
}

fn quarters_builder() -> HierarchyBuilder<NaiveDate> {
    HierarchyBuilder::new(
        "Quarters",
        Node::new("Quarters", "All Quarters"),
        vec![Level::required("Quarter", |d: &NaiveDate| {
            let q = quarter(d);
            Node::new(format!("Q{q}"), format!("Quarter {q}"))
        })],
        day_leaf,
    )
}

fn months_builder() -> HierarchyBuilder<NaiveDate> {
    HierarchyBuilder::new(
        "Months",
        Node::new("Months", "All Months"),
        vec![Level::required("Month", |d: &NaiveDate| {
            Node::id(d.format("%B").to_string())
        })],
        day_leaf,
    )
}

/// Build the time dimension for `first..=last`.
pub fn time_dimension(name: &str, first: NaiveDate, last: NaiveDate) -> Result<Dimension> {
    if last < first {
        bail!("time range is empty: {first} is after {last}");
    }
    let mut days: Vec<NaiveDate> = first.iter_days().take_while(|d| *d <= last).collect();
    log::debug!("time dimension '{name}': {} days from {first} to {last}", days.len());

    let mut dimension = Dimension::new(name);

    let mut calendar = calendar_builder(name);
    calendar.extend(&days)?;
    dimension.push_hierarchy(calendar.finish());

    let mut years = years_builder();
    years.extend(&days)?;
    dimension.push_hierarchy(years.finish());

    // stable sorts keep days chronological within each group
    days.sort_by_key(quarter);
    let mut quarters = quarters_builder();
    quarters.extend(&days)?;
    dimension.push_hierarchy(quarters.finish());

    days.sort_by_key(|d| d.month());
    let mut months = months_builder();
    months.extend(&days)?;
    dimension.push_hierarchy(months.finish());

    Ok(dimension)
}

fn order_date_query(direction: &str) -> CollectionQuery {
    CollectionQuery::new("Orders")
        .select("OrderDate")
        .order_by(&format!("OrderDate {direction}"))
        .option("$top", "1")
}

impl<T: Transport> Northwind<T> {
    /// Dates of the first and the last order
    pub fn order_range(&self) -> Result<(NaiveDate, NaiveDate)> {
        let first: OrderDate =
            self.require_first(&order_date_query("asc"), "retrieve first order date")?;
        let last: OrderDate =
            self.require_first(&order_date_query("desc"), "retrieve last order date")?;
        Ok((first.order_date.date_naive(), last.order_date.date_naive()))
    }

    pub fn time(&self, name: &str) -> Result<Dimension> {
        let (first, last) = self.order_range()?;
        log::info!("Order date range: {first} - {last}");
        time_dimension(name, first, last)
    }
}
