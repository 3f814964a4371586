use proptest::prelude::*;
use serde_json::{json, Map, Value};
use valobj_core::valobj_schema::{array, number, object, record, string};
use valobj_core::{Kind, Registry, ValueObject};

fn scores(registry: &Registry) -> Kind {
    registry.define("Scores", record(number().int())).unwrap()
}

fn to_object<'a>(entries: impl Iterator<Item = (&'a String, &'a i64)>) -> Value {
    Value::Object(entries.map(|(k, v)| (k.clone(), json!(v))).collect::<Map<_, _>>())
}

#[test]
fn integral_floats_are_the_same_number() {
    let registry = Registry::default();
    let count = registry.define("Count", number().int()).unwrap();

    let a = count.create(3).unwrap();
    let b = count.create(3.0).unwrap();
    assert!(ValueObject::ptr_eq(&a, &b));
    assert!(a.equals(3.0));
    assert_eq!(b.to_json(), "3");
}

#[test]
fn negative_zero_is_zero() {
    let registry = Registry::default();
    let amount = registry.define("Amount", number()).unwrap();

    let a = amount.create(0.0).unwrap();
    let b = amount.create(-0.0).unwrap();
    assert!(ValueObject::ptr_eq(&a, &b));
    assert_eq!(a.to_json(), "0");
}

#[test]
fn float_sequences_store_integers() {
    let registry = Registry::default();
    let arr = registry.define("Arr", array(number())).unwrap();

    let x = arr.create(vec![1, 2, 3]).unwrap();
    let y = arr.create(vec![1.0, 2.0, 3.0]).unwrap();
    assert!(ValueObject::ptr_eq(&x, &y));
    assert_eq!(y.to_json(), "[1,2,3]");
    assert_eq!(arr.create(vec![1.5]).unwrap().to_json(), "[1.5]");
}

#[test]
fn with_float_patch_resolves_to_the_integer_instance() {
    let registry = Registry::default();
    let point = registry
        .define("Point", object().field("x", number()).field("y", number()))
        .unwrap();

    let a = point.create(json!({ "x": 1, "y": 2 })).unwrap();
    let b = point.create(json!({ "x": 2, "y": 2 })).unwrap();
    assert!(ValueObject::ptr_eq(&a.with(json!({ "x": 2.0 })).unwrap(), &b));
}

proptest! {
    #[test]
    fn integer_and_float_encodings_share_an_instance(n in any::<i32>()) {
        let registry = Registry::default();
        let kind = registry.define("Number", number()).unwrap();
        let a = kind.create(n).unwrap();
        let b = kind.create(f64::from(n)).unwrap();
        prop_assert!(ValueObject::ptr_eq(&a, &b));
        prop_assert!(b.equals(n));
    }

    #[test]
    fn equal_values_are_identical(
        entries in proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..8)
    ) {
        let registry = Registry::default();
        let kind = scores(&registry);
        let a = kind.create(to_object(entries.iter())).unwrap();
        let b = kind.create(to_object(entries.iter().rev())).unwrap();
        prop_assert!(ValueObject::ptr_eq(&a, &b));
        prop_assert!(a.equals(&b));
        prop_assert!(b.equals(&a));
    }

    #[test]
    fn identity_implies_equal_values(a in "[a-z]{0,4}", b in "[a-z]{0,4}") {
        let registry = Registry::default();
        let kind = registry.define("Word", string()).unwrap();
        let x = kind.create(a.as_str()).unwrap();
        let y = kind.create(b.as_str()).unwrap();
        prop_assert_eq!(x == y, a == b);
        prop_assert_eq!(x.equals(b.as_str()), a == b);
    }

    #[test]
    fn round_trip_is_identical(
        entries in proptest::collection::btree_map("[a-z]{1,6}", any::<i64>(), 0..8)
    ) {
        let registry = Registry::default();
        let kind = scores(&registry);
        let a = kind.create(to_object(entries.iter())).unwrap();
        let b = kind.create(a.to_plain_value()).unwrap();
        prop_assert!(ValueObject::ptr_eq(&a, &b));
    }
}
