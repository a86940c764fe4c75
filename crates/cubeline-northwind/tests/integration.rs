//! Integration tests for cubeline-northwind
//!
//! These tests require network access and are marked #[ignore] by default.
//! Run with: cargo test -p cubeline-northwind --test integration -- --ignored

use cubeline_core::{Session, SessionConfig};
use cubeline_northwind::{Northwind, SERVICE_ROOT, SalesCube};
use indicatif::ProgressBar;

fn source() -> Northwind<Session> {
    let _ = env_logger::builder().is_test(true).try_init();
    let session = Session::open(&SessionConfig::new(SERVICE_ROOT)).expect("session should open");
    Northwind::new(session, cubeline_core::DEFAULT_PAGE_SIZE)
}

/// Run with: cargo test -p cubeline-northwind --test integration -- --ignored customers_dimension
#[test]
#[ignore]
fn customers_dimension() {
    let dimension = source()
        .customers("Customers", &ProgressBar::hidden())
        .expect("customers should build");
    dimension.validate().expect("sorted input gives a valid hierarchy");

    let h = dimension.default_hierarchy().unwrap();
    // 91 customers plus countries, regions and cities
    assert!(h.len() > 91, "got {} elements", h.len());
    assert_eq!(h.caption("ALFKI"), Some("Alfreds Futterkiste"));
}

/// Run with: cargo test -p cubeline-northwind --test integration -- --ignored all_dimensions_validate
#[test]
#[ignore]
fn all_dimensions_validate() {
    let source = source();
    let pb = ProgressBar::hidden();
    let dimensions = [
        source.products("Products", &pb).expect("products"),
        source.employees("Employees", &pb).expect("employees"),
        source.time("Time").expect("time"),
    ];
    for dimension in &dimensions {
        dimension
            .validate()
            .unwrap_or_else(|e| panic!("{}: {e}", dimension.name()));
    }
    assert_eq!(dimensions[1].hierarchies().len(), 2);
    assert_eq!(dimensions[2].hierarchies().len(), 4);
}

/// Run with: cargo test -p cubeline-northwind --test integration -- --ignored order_updates
#[test]
#[ignore]
fn order_updates() {
    let mut updates = 0usize;
    let summary = source()
        .load_orders(&SalesCube::default(), &ProgressBar::hidden(), |batch| {
            updates += batch.len();
            Ok(())
        })
        .expect("orders should load");

    // 830 orders with 2155 lines in the sample data
    assert_eq!(summary.total, 830);
    assert_eq!(updates, 2 * 2155);
}
