use dynafinder::entity::PersistentEntity;
use dynafinder::error::FinderError;
use dynafinder::options::{
    apply_detached_criteria, configure_query_with_arguments, populate_arguments_for_criteria, QueryOptions,
};
use dynafinder::query::{Criterion, DetachedCriteria, FetchType, Order, Projection, Query, SortDirection};
use dynafinder::recording::RecordingQuery;
use dynafinder::value::{ArgumentMap, Value, ValueType};

fn setup() -> (PersistentEntity, RecordingQuery) {
    let entity = PersistentEntity::new("Person")
        .property("lastName", ValueType::String)
        .property("age", ValueType::Long)
        .to_one("company", "Company")
        .to_many("pets", "Pet");
    (entity, RecordingQuery::new("Person"))
}

fn options(value: Value) -> ArgumentMap {
    value.as_map().cloned().expect("a map")
}

#[test]
fn pagination_and_ordering() {
    let parsed = QueryOptions::parse(&options(Value::map([
        ("max", Value::from(10)),
        ("offset", Value::from("5")),
        ("sort", Value::from("age")),
        ("order", Value::from("DESC")),
    ])))
    .expect("parsed");
    assert_eq!(parsed.max, Some(10));
    assert_eq!(parsed.offset, Some(5));
    assert_eq!(parsed.sort.as_deref(), Some("age"));
    assert_eq!(parsed.order, SortDirection::Desc);

    let (_, mut query) = setup();
    parsed.apply(&mut query);
    let snapshot = query.snapshot();
    assert_eq!(snapshot.max, Some(10));
    assert_eq!(snapshot.offset, Some(5));
    assert_eq!(snapshot.orders, vec![Order::desc("age")]);
}

#[test]
fn sort_defaults_to_ascending() {
    let parsed = QueryOptions::parse(&options(Value::map([("sort", "lastName")]))).expect("parsed");
    assert_eq!(parsed.order, SortDirection::Asc);
    let sideways = Value::map([("sort", "lastName"), ("order", "sideways")]);
    let parsed = QueryOptions::parse(&options(sideways)).expect("parsed");
    assert_eq!(parsed.order, SortDirection::Asc);
}

#[test]
fn negative_pagination_is_ignored() {
    let parsed = QueryOptions::parse(&options(Value::map([("max", -1), ("offset", -3)]))).expect("parsed");
    assert_eq!(parsed.max, None);
    assert_eq!(parsed.offset, None);

    let (_, mut query) = setup();
    parsed.apply(&mut query);
    assert_eq!(query.snapshot().max, None);
    assert_eq!(query.snapshot().offset, None);
}

#[test]
fn unconvertible_pagination_is_an_error() {
    let error = QueryOptions::parse(&options(Value::map([("max", "lots")]))).expect_err("not a number");
    assert!(matches!(error, FinderError::Conversion(_)));
}

#[test]
fn fetch_modes() {
    let fetch = Value::map([("company", "join"), ("pets", "lazy"), ("address", "EAGER")]);
    let parsed = QueryOptions::parse(&options(Value::map([("fetch", fetch)]))).expect("parsed");
    let (_, mut query) = setup();
    parsed.apply(&mut query);
    assert_eq!(query.snapshot().joins, vec!["address".to_string(), "company".to_string()]);
    assert_eq!(query.snapshot().selects, vec!["pets".to_string()]);
}

#[test]
fn flags_are_parsed() {
    let parsed = QueryOptions::parse(&options(Value::map([
        ("ignoreCase", Value::from(true)),
        ("cache", Value::from("true")),
    ])))
    .expect("parsed");
    assert_eq!(parsed.ignore_case, Some(true));
    assert_eq!(parsed.cache, Some(true));
    assert_eq!(parsed.lock, None);
}

#[test]
fn arguments_aware_query_receives_the_raw_map() {
    let (entity, mut query) = setup();
    let raw = options(Value::map([
        ("max", Value::from(3)),
        ("readOnly", Value::from(true)),
    ]));
    populate_arguments_for_criteria(&entity, &mut query, Some(&raw)).expect("populated");
    assert_eq!(query.snapshot().max, Some(3));
    assert_eq!(query.snapshot().arguments.as_ref(), Some(&raw));
}

#[test]
fn absent_options_change_nothing() {
    let (entity, mut query) = setup();
    populate_arguments_for_criteria(&entity, &mut query, None).expect("nothing to do");
    configure_query_with_arguments(&entity, &mut query, &[Value::from("not a map"), Value::map([("max", 1)])])
        .expect("first argument is not a map");
    configure_query_with_arguments(&entity, &mut query, &[]).expect("no arguments");
    assert_eq!(query.snapshot().max, None);
    assert_eq!(query.snapshot().arguments, None);
}

#[test]
fn first_remaining_argument_is_the_options_map() {
    let (entity, mut query) = setup();
    configure_query_with_arguments(&entity, &mut query, &[Value::map([("offset", 20)])]).expect("configured");
    assert_eq!(query.snapshot().offset, Some(20));
}

#[test]
fn detached_criteria_are_copied() {
    let detached = DetachedCriteria::new("Person")
        .add(Criterion::gt("age", 18))
        .project(Projection::Distinct)
        .order(Order::asc("lastName"))
        .join("company")
        .fetch("pets", FetchType::Lazy);
    let (_, mut query) = setup();
    apply_detached_criteria(&mut query, Some(&detached));
    let snapshot = query.snapshot();
    assert_eq!(snapshot.criteria, vec![Criterion::gt("age", 18)]);
    assert!(snapshot.projections.contains(&Projection::Distinct));
    assert_eq!(snapshot.orders, vec![Order::asc("lastName")]);
    assert_eq!(snapshot.joins, vec!["company".to_string()]);
    assert_eq!(snapshot.selects, vec!["pets".to_string()]);
}

#[test]
fn detached_criteria_applied_twice_accumulate() {
    let detached = DetachedCriteria::new("Person").add(Criterion::eq("lastName", "Smith"));
    let (_, mut query) = setup();
    apply_detached_criteria(&mut query, Some(&detached));
    apply_detached_criteria(&mut query, Some(&detached));
    apply_detached_criteria(&mut query, None);
    assert_eq!(query.snapshot().criteria.len(), 2);
    query.add(Criterion::is_null("age"));
    assert_eq!(query.snapshot().criteria.len(), 3);
}

#[test]
fn later_fetch_mode_replaces_earlier() {
    let detached = DetachedCriteria::new("Person").join("company").select("company");
    assert_eq!(detached.fetch_strategies(), &[("company".to_string(), FetchType::Lazy)]);
}
