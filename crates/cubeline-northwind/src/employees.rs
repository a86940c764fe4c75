//! Employees dimension with a geography hierarchy and a generation hierarchy

use anyhow::Result;
use cubeline_core::{CollectionQuery, Dimension, HierarchyBuilder, Level, Node, Transport};
use indicatif::ProgressBar;

use crate::records::Employee;
use crate::source::Northwind;

/// Birth-year cohort
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Generation {
    Silent,
    Boomers,
    GenX,
    Millennials,
    GenZ,
}

impl Generation {
    pub fn of_year(year: i32) -> Self {
        match year {
            i32::MIN..=1945 => Self::Silent,
            1946..=1964 => Self::Boomers,
            1965..=1979 => Self::GenX,
            1980..=1995 => Self::Millennials,
            _ => Self::GenZ,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Self::Silent => "1925-1945",
            Self::Boomers => "1946-1964",
            Self::GenX => "1965-1979",
            Self::Millennials => "1980-1995",
            Self::GenZ => "1996-2010",
        }
    }

    pub fn caption(self) -> &'static str {
        match self {
            Self::Silent => "The Silent Generation (1925-1945)",
            Self::Boomers => "The Baby Boomers (1946-1964)",
            Self::GenX => "Generation X (1965-1979)",
            Self::Millennials => "The Millennials (1980-1995)",
            Self::GenZ => "Generation Z (1996-2010)",
        }
    }
}

/// Employees without a birth date are filed with the youngest cohort
fn generation(e: &Employee) -> Generation {
    e.birth_year().map_or(Generation::GenZ, Generation::of_year)
}

pub fn employees_query() -> CollectionQuery {
    CollectionQuery::new("Employees")
        .select("EmployeeID,LastName,FirstName,TitleOfCourtesy,City,Region,Country,BirthDate")
        .order_by("Country asc,Region asc,City asc")
}

/// Geography hierarchy, named after the dimension so it is the default one.
///
/// Employee cities are unique in the data set and stay unqualified.
pub fn geography_builder(name: &str) -> HierarchyBuilder<Employee> {
    HierarchyBuilder::new(
        name,
        Node::new("All", "All Geographies"),
        vec![
            Level::required("Country", |e: &Employee| Node::id(e.country.as_str())),
            Level::optional("Region", |e: &Employee| {
                Node::id(e.region.clone().unwrap_or_default())
            }),
            Level::required("City", |e: &Employee| Node::id(e.city.as_str())),
        ],
        |e: &Employee| Node::new(e.id.to_string(), e.display_name()),
    )
}

pub fn generation_builder() -> HierarchyBuilder<Employee> {
    HierarchyBuilder::new(
        "Generation",
        Node::new("All", "All Generations"),
        vec![Level::required("Generation", |e: &Employee| {
            let g = generation(e);
            Node::new(g.id(), g.caption())
        })],
        |e: &Employee| Node::id(e.id.to_string()),
    )
}

impl<T: Transport> Northwind<T> {
    /// The generation hierarchy needs a different order than the query
    /// returns, so records are kept until the geography pass is done.
    pub fn employees(&self, name: &str, pb: &ProgressBar) -> Result<Dimension> {
        let mut geography = geography_builder(name);
        let mut employees = Vec::new();
        self.for_each_page(&employees_query(), pb, |page: Vec<Employee>| {
            geography.extend(&page)?;
            employees.extend(page);
            Ok(())
        })?;

        // stable: employees keep geography order within a cohort
        employees.sort_by_key(generation);
        let mut generations = generation_builder();
        generations.extend(&employees)?;

        let mut dimension = Dimension::new(name);
        dimension.push_hierarchy(geography.finish());
        dimension.push_hierarchy(generations.finish());
        Ok(dimension)
    }
}
