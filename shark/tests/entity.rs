//! Entity derive behavior that needs no server.
use shark::{ColumnType, Entity, Nullable, Value};

#[derive(Default, Entity)]
#[allow(non_snake_case)]
struct Naming {
    testId: Nullable<i32>,
    HTTPHeader: Nullable<String>,
    #[sql(name = "string")]
    test: Nullable<String>,
}

#[test]
fn column_name_resolution() {
    let names: Vec<_> = Naming::fields().iter().map(|f| f.name).collect();
    assert_eq!(names, ["test_id", "_h_t_t_p_header", "string"]);
}

#[derive(Default, Entity)]
#[sql("test")]
struct Test1 {
    #[sql(primary_key, auto_increment)]
    test_id: Nullable<i32>,
    #[sql(name = "string", length = 10)]
    test: Nullable<String>,
    #[sql(not_null)]
    a: Nullable<i32>,
    #[sql(unique)]
    b: Nullable<i16>,
}

#[test]
fn table_name_comes_from_the_instance() {
    assert_eq!(Test1::default().table_name(), "test");
    assert_eq!(Naming::default().table_name(), "naming");
}

#[test]
fn declared_field_specs() {
    let fields = Test1::fields();

    assert_eq!(fields[0].name, "test_id");
    assert_eq!(fields[0].ty, ColumnType::INT);
    assert!(fields[0].auto_increment);
    assert!(!fields[0].nullable, "auto increment forces not null");

    assert_eq!(fields[1].name, "string");
    assert_eq!(fields[1].length, 10);
    assert!(fields[1].nullable);

    assert!(!fields[2].nullable, "not_null overrides the wrapper");
    assert!(fields[3].unique);

    assert_eq!(Test1::primary_keys(), ["test_id"]);
}

#[test]
fn value_and_apply_round_trip() {
    let mut entity = Test1::default();
    assert_eq!(entity.value(0), Value::Null);

    entity.apply(0, &Value::Int(1)).unwrap();
    assert_eq!(entity.test_id.get(), Some(&1));
    assert_eq!(entity.value(0), Value::Int(1));

    entity.apply(0, &Value::Null).unwrap();
    assert!(entity.test_id.is_null());

    // a long cell carrying a generated key still fits an int field
    entity.apply(0, &Value::Long(2)).unwrap();
    assert_eq!(entity.test_id.get(), Some(&2));

    assert!(entity.apply(1, &Value::Int(3)).is_err(), "int cell into a string field");
}

#[derive(Default, Entity)]
struct Composite {
    #[sql(primary_key)]
    id1: Nullable<i32>,
    #[sql(primary_key)]
    id2: Nullable<String>,
    value: Nullable<i32>,
}

#[test]
fn composite_primary_keys() {
    assert_eq!(Composite::primary_keys(), ["id1", "id2"]);
}
