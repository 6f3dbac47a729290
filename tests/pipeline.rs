mod common;

use std::sync::Arc;

use geo_reconcile::{
    aggregate::aggregate,
    boundary::{build_regions, load_boundary, region_name_key},
    detect::{detect_state_column, metric_candidates},
    reconcile::{ranked_table, reconcile},
};

use common::{INDIA_BOUNDARY, TestWorkspace};

fn table(csv: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut lines = csv.lines();
    let headers = lines
        .next()
        .unwrap()
        .split(',')
        .map(str::to_string)
        .collect::<Vec<_>>();
    let rows = lines
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect();
    (headers, rows)
}

#[test]
fn end_to_end_reconciliation_through_the_library() {
    let ws = TestWorkspace::new();
    let boundary_path = ws.write("india.geojson", INDIA_BOUNDARY);

    let collection = load_boundary(&boundary_path).expect("load boundary");
    let name_key = region_name_key(&collection).expect("name key");
    assert_eq!(name_key, "NAME_1");
    let regions = build_regions(&collection, &name_key);

    let (headers, rows) = table("State/UT,2022\nOdisha,100\nKerala,40");
    let state_column = detect_state_column(&headers, &rows).expect("state column");
    assert_eq!(state_column, "State/UT");
    let metric_column = metric_candidates(&headers, &rows).expect("metric candidates")[0].clone();
    assert_eq!(metric_column, "2022");

    let totals = aggregate(&rows, 0, 1);
    let result = reconcile(&regions, &totals);

    assert!(result.unmatched.is_empty());
    let values = result
        .regions
        .iter()
        .map(|r| (r.raw_name.as_str(), r.metric_value))
        .collect::<Vec<_>>();
    assert_eq!(
        values,
        vec![("Orissa", 100.0), ("Kerala", 40.0), ("Goa", 0.0)]
    );

    let ranked = ranked_table(&result.regions);
    assert_eq!(ranked[0], ("Orissa".to_string(), 100.0));
    assert_eq!(ranked[2], ("Goa".to_string(), 0.0));
}

#[test]
fn boundary_loads_are_memoized_by_source_path() {
    let ws = TestWorkspace::new();
    let boundary_path = ws.write("india.geojson", INDIA_BOUNDARY);

    let first = load_boundary(&boundary_path).expect("first load");
    let second = load_boundary(&boundary_path).expect("second load");
    assert!(
        Arc::ptr_eq(&first, &second),
        "repeat load of the same source must hit the cache"
    );
}

#[test]
fn reconciliation_never_mutates_the_cached_boundary() {
    let ws = TestWorkspace::new();
    let boundary_path = ws.write("india.geojson", INDIA_BOUNDARY);

    let collection = load_boundary(&boundary_path).expect("load boundary");
    let mut annotated = (*collection).clone();
    let regions = build_regions(&collection, "NAME_1");
    geo_reconcile::boundary::annotate_features(&mut annotated, &regions);

    let cached = load_boundary(&boundary_path).expect("cached load");
    assert!(
        cached.features[0]
            .properties
            .as_ref()
            .unwrap()
            .get("metric_value")
            .is_none(),
        "annotation must act on a clone, not the cached collection"
    );
}
