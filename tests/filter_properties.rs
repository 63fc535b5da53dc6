//! Properties of the schema filter over arbitrary object sequences.

use proptest::prelude::*;
use schemapack::filter::{FilterPolicy, ObjectFilter, SchemaFilter};
use schemapack::model::{ObjectKind, ObjectName, SchemaObject};

fn schema_part() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["dev", "Dev", "DEV", "prod", "test", "TeSt", "public", "auth"])
        .prop_map(str::to_string)
}

fn arb_object() -> impl Strategy<Value = SchemaObject> {
    let named = (
        schema_part(),
        "[a-z]{1,8}",
        prop::collection::vec(schema_part(), 0..2),
    )
        .prop_map(|(schema, name, external)| {
            SchemaObject::local(
                ObjectKind::Table,
                Some(ObjectName::new([schema, name]).with_external_parts(external)),
                None,
            )
        });
    let unnamed = Just(SchemaObject::local(ObjectKind::Constraint, None, None));
    let empty = Just(SchemaObject::local(
        ObjectKind::Constraint,
        Some(ObjectName::new(Vec::<String>::new())),
        None,
    ));
    prop_oneof![8 => named, 1 => unnamed, 1 => empty]
}

fn arb_objects() -> impl Strategy<Value = Vec<SchemaObject>> {
    prop::collection::vec(arb_object(), 0..40)
}

fn arb_schemas() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(schema_part(), 0..4)
}

fn has_schema(object: &SchemaObject) -> bool {
    object
        .name
        .as_ref()
        .is_some_and(|name| !name.parts.is_empty())
}

proptest! {
    #[test]
    fn exclude_and_include_partition_the_input(objects in arb_objects(), schemas in arb_schemas()) {
        let mut filter = SchemaFilter::new(&schemas);
        let excluded: Vec<&SchemaObject> = filter.filter(objects.iter()).collect();
        filter.set_policy(FilterPolicy::Include);
        let included: Vec<&SchemaObject> = filter.filter(objects.iter()).collect();

        prop_assert_eq!(excluded.len() + included.len(), objects.len());
        for object in &objects {
            let in_excluded = excluded.iter().any(|o| std::ptr::eq(*o, object));
            let in_included = included.iter().any(|o| std::ptr::eq(*o, object));
            prop_assert!(in_excluded != in_included);
            if !has_schema(object) {
                prop_assert!(in_excluded);
            }
        }
    }

    #[test]
    fn matching_is_case_insensitive(schema in schema_part(), name in "[a-z]{1,8}") {
        let upper = SchemaFilter::new([schema.to_uppercase()]).with_policy(FilterPolicy::Include);
        let lower = SchemaFilter::new([schema.to_lowercase()]).with_policy(FilterPolicy::Include);
        let object = SchemaObject::local(
            ObjectKind::Table,
            Some(ObjectName::new([schema.as_str(), name.as_str()])),
            None,
        );
        prop_assert!(upper.keep(&object));
        prop_assert!(lower.keep(&object));
    }

    #[test]
    fn output_preserves_input_order(objects in arb_objects(), schemas in arb_schemas()) {
        let filter = SchemaFilter::new(&schemas);
        let positions: Vec<usize> = filter
            .filter(objects.iter())
            .map(|kept| objects.iter().position(|o| std::ptr::eq(o, kept)).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn filtering_twice_changes_nothing(objects in arb_objects(), schemas in arb_schemas()) {
        let filter = SchemaFilter::new(&schemas);
        let once: Vec<SchemaObject> = filter.filter(objects.iter()).cloned().collect();
        let twice: Vec<SchemaObject> = filter.filter(once.iter()).cloned().collect();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn empty_set_keeps_everything_or_nothing(objects in arb_objects()) {
        let filter = SchemaFilter::new(Vec::<String>::new());
        prop_assert_eq!(filter.filter(objects.iter()).count(), objects.len());

        let filter = filter.with_policy(FilterPolicy::Include);
        prop_assert_eq!(filter.filter(objects.iter()).count(), 0);
    }
}

#[test]
fn prod_dev_dev_test_scenario() {
    let objects: Vec<SchemaObject> = ["prod", "dev", "dev", "test"]
        .iter()
        .enumerate()
        .map(|(i, schema)| {
            SchemaObject::local(
                ObjectKind::Table,
                Some(ObjectName::new([schema.to_string(), format!("t{i}")])),
                None,
            )
        })
        .collect();

    let mut filter = SchemaFilter::new(["dev", "test"]);
    let kept: Vec<&str> = filter
        .filter(objects.iter())
        .filter_map(|o| o.name.as_ref().and_then(ObjectName::schema))
        .collect();
    assert_eq!(kept, vec!["prod"]);

    filter.set_policy(FilterPolicy::Include);
    let kept: Vec<&str> = filter
        .filter(objects.iter())
        .filter_map(|o| o.name.as_ref().and_then(ObjectName::schema))
        .collect();
    assert_eq!(kept, vec!["dev", "dev", "test"]);
}
