use proptest::prelude::*;
use sheet_managed::{
    cell::RawCell,
    dataset::{Dataset, UniquenessPolicy},
    error::SheetError,
    filter::{self, FilterSpec},
};

fn orders() -> Dataset {
    let rows = [
        ["1001", "Shipped", "Oslo"],
        ["1002", "pending", "Lima"],
        ["1003", "SHIPPED", "Lima"],
        ["1004", "", "Oslo"],
    ]
    .iter()
    .map(|row| row.iter().map(|v| RawCell::from(*v)).collect())
    .collect();
    Dataset::load(
        vec!["Id".to_string(), "Status".to_string(), "City".to_string()],
        rows,
        UniquenessPolicy::FirstColumnKey,
    )
    .expect("load")
}

fn ids(view: &filter::FilteredView<'_>) -> Vec<String> {
    view.rows().iter().map(|row| row.cells()[0].clone()).collect()
}

#[test]
fn empty_spec_returns_full_view_in_order() {
    let dataset = orders();
    let view = filter::apply(&dataset, &FilterSpec::new()).expect("filter");
    assert_eq!(ids(&view), vec!["1001", "1002", "1003", "1004"]);
    assert!(view.warning().is_none());
}

#[test]
fn matching_ignores_case_on_both_sides() {
    let dataset = orders();
    let view = filter::apply(&dataset, &FilterSpec::new().with("Status", "sHiPpEd"))
        .expect("filter");
    assert_eq!(ids(&view), vec!["1001", "1003"]);
}

#[test]
fn conditions_combine_with_and() {
    let dataset = orders();
    let spec: FilterSpec = [("Status", "shipped"), ("City", "lima")].into_iter().collect();
    let view = filter::apply(&dataset, &spec).expect("filter");
    assert_eq!(ids(&view), vec!["1003"]);
}

#[test]
fn sentinel_matches_only_explicit_na() {
    let dataset = orders();
    let view = filter::apply(&dataset, &FilterSpec::new().with("Status", "NA")).expect("filter");
    assert_eq!(ids(&view), vec!["1004"]);

    let none = filter::apply(&dataset, &FilterSpec::new().with("Status", "N"))
        .expect("filter");
    assert!(none.is_empty());
}

#[test]
fn blank_value_imposes_no_constraint() {
    let dataset = orders();
    let view = filter::apply(&dataset, &FilterSpec::new().with("City", "")).expect("filter");
    assert_eq!(view.len(), 4);
}

#[test]
fn no_match_is_an_empty_view_with_warning() {
    let dataset = orders();
    let view = filter::apply(&dataset, &FilterSpec::new().with("City", "Paris"))
        .expect("filter");
    assert!(view.is_empty());
    let warning = view.warning().expect("warning");
    assert_eq!(warning.conditions, 1);
    assert_eq!(view.to_table().columns, vec!["Id", "Status", "City"]);
}

#[test]
fn substring_does_not_match() {
    let dataset = orders();
    let view = filter::apply(&dataset, &FilterSpec::new().with("City", "Osl")).expect("filter");
    assert!(view.is_empty());
}

#[test]
fn unknown_column_is_rejected() {
    let dataset = orders();
    let err = filter::apply(&dataset, &FilterSpec::new().with("Country", "NO")).unwrap_err();
    assert!(matches!(err, SheetError::UnknownColumn(name) if name == "Country"));
}

fn dataset_from(rows: &[(String, String, String)]) -> Dataset {
    let raw = rows
        .iter()
        .map(|(a, b, c)| {
            vec![
                RawCell::from(a.as_str()),
                RawCell::from(b.as_str()),
                RawCell::from(c.as_str()),
            ]
        })
        .collect();
    Dataset::load(
        vec!["Key".to_string(), "Tier".to_string(), "Region".to_string()],
        raw,
        UniquenessPolicy::FirstColumnKey,
    )
    .expect("load")
}

proptest! {
    #[test]
    fn single_column_filter_selects_exactly_matching_rows(
        rows in proptest::collection::vec(("[a-z]{1,4}", "[abAB]{1,2}", "[xyXY]"), 0..30),
        needle in "[abAB]{1,2}",
    ) {
        let dataset = dataset_from(&rows);
        let view = filter::apply(&dataset, &FilterSpec::new().with("Tier", needle.clone()))
            .expect("filter");
        let expected = dataset
            .current_view()
            .iter()
            .filter(|row| row.cells()[1].to_lowercase() == needle.to_lowercase())
            .collect::<Vec<_>>();
        prop_assert_eq!(view.rows(), expected.as_slice());
    }

    #[test]
    fn adding_conditions_never_grows_the_result(
        rows in proptest::collection::vec(("[a-z]{1,4}", "[abAB]{1,2}", "[xyXY]"), 0..30),
        tier in "[abAB]{1,2}",
        region in "[xyXY]",
    ) {
        let dataset = dataset_from(&rows);
        let all = filter::apply(&dataset, &FilterSpec::new()).expect("filter").len();
        let one = filter::apply(&dataset, &FilterSpec::new().with("Tier", tier.clone()))
            .expect("filter")
            .len();
        let two = filter::apply(
            &dataset,
            &FilterSpec::new().with("Tier", tier).with("Region", region),
        )
        .expect("filter")
        .len();
        prop_assert_eq!(all, dataset.len());
        prop_assert!(one <= all);
        prop_assert!(two <= one);
    }
}
