//! End-to-end scenarios against a live postgres server.
//!
//! Run with a server on localhost:5432 and a `post` database owned by
//! `postgres`/`postgres`:
//!
//! ```text
//! cargo test -- --ignored
//! ```
use shark::{
    Blob, Clob, Database, Entity, ErrorKind, Nullable, Order, PgDatabase, Select,
    clause::var,
};
use time::macros::{date, datetime, time};

#[derive(Default, Entity)]
#[sql("test")]
struct Test0 {
    #[sql(primary_key, auto_increment)]
    test_id: Nullable<i32>,
    #[sql(name = "string", length = 10)]
    test: Nullable<String>,
}

#[derive(Default, Debug, Entity)]
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

#[derive(Default, Debug, PartialEq, Entity)]
#[sql("test2")]
struct Test2 {
    a: Nullable<bool>,
    c: Nullable<i16>,
    d: Nullable<i64>,
    e: Nullable<i32>,
    f: Nullable<f32>,
    g: Nullable<f64>,
    h: Nullable<char>,
    #[sql(length = 10)]
    i: Nullable<String>,
    l: Nullable<Vec<u8>>,
    m: Nullable<Clob>,
    n: Nullable<Blob>,
    o: Nullable<time::Date>,
    p: Nullable<time::PrimitiveDateTime>,
    q: Nullable<time::Time>,
}

#[derive(Default, Debug, Entity)]
#[sql("test3")]
struct Test3 {
    #[sql(primary_key)]
    id1: Nullable<i32>,
    #[sql(primary_key, length = 20)]
    id2: Nullable<String>,
    value: Nullable<i32>,
}

#[derive(Default, Debug, Entity)]
#[sql("test4")]
struct Test4 {
    #[sql(primary_key, auto_increment)]
    id: Nullable<i32>,
    #[sql(length = 64)]
    str: Nullable<String>,
}

fn connect() -> PgDatabase {
    Database::postgres("post", "postgres", "postgres").expect("live postgres on localhost")
}

#[test]
#[ignore = "requires a postgres server on localhost"]
fn end_to_end() {
    let mut db = connect();
    for table in ["test", "test2", "test3", "test4"] {
        db.drop_table_if_exists(table).unwrap();
    }

    create_and_alter(&mut db);
    insert_and_constraints(&mut db);
    select_one_by_equality(&mut db);
    ordering_and_composite_where(&mut db);
    all_types_round_trip(&mut db);
    composite_key_lifecycle(&mut db);
    escaping_round_trip(&mut db);

    db.close().unwrap();
}

/// S1: init creates, a wider declaration alters columns in.
fn create_and_alter(db: &mut PgDatabase) {
    db.init::<Test0>().unwrap();
    db.init::<Test1>().unwrap();

    let rows: Vec<Test1> = db.select(Select::new()).unwrap();
    assert!(rows.is_empty());
}

/// S2: generated keys come back, constraint violations are backend coded.
fn insert_and_constraints(db: &mut PgDatabase) {
    let mut row = Test1::default();
    row.test.set("test".into());
    row.a.set(55);
    row.b.set(-1);
    db.insert(&mut row).unwrap();
    assert_eq!(row.test_id.get(), Some(&1));

    // a second row with the same unique b
    row.test_id.nullify();
    let err = db.insert(&mut row).unwrap_err();
    let ErrorKind::Postgres(errors) = err.kind() else {
        panic!("expected a backend coded error, got {err:?}")
    };
    assert_eq!(errors.sqlstate(), Some("23505"), "unique violation");

    // null into a not-null column
    row.a.nullify();
    row.b.set(2);
    let err = db.insert(&mut row).unwrap_err();
    let ErrorKind::Postgres(errors) = err.kind() else {
        panic!("expected a backend coded error, got {err:?}")
    };
    assert_eq!(errors.sqlstate(), Some("23502"), "not-null violation");

    let mut row = Test1::default();
    row.a.set(44);
    row.b.set(1);
    db.insert_without_id(&row).unwrap();
    assert!(row.test_id.is_null());

    let mut row = Test1::default();
    row.a.set(33);
    row.b.set(6);
    db.insert(&mut row).unwrap();

    let rows: Vec<Test1> = db.select(Select::new()).unwrap();
    assert_eq!(rows.len(), 3);
}

/// S3: selectOne over a projection.
fn select_one_by_equality(db: &mut PgDatabase) {
    let row: Test1 = db
        .select_one_fields(&["string"], var("string").equals("test"))
        .unwrap()
        .expect("the first inserted row");
    assert_eq!(row.test.get().map(String::as_str), Some("test"));
    assert!(row.test_id.is_null(), "unselected fields stay default");
}

/// S4: ordering and composed filters.
fn ordering_and_composite_where(db: &mut PgDatabase) {
    let rows: Vec<Test1> = db.select(Order::by("a")).unwrap();
    let values: Vec<i32> = rows.iter().filter_map(|r| r.a.get().copied()).collect();
    assert_eq!(values, [33, 44, 55]);

    let rows: Vec<Test1> = db
        .select(var("a").less_than(40) & var("b").not_equals(0))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].a.get(), Some(&33));
}

/// S5: every logical type survives an insert/select round trip.
fn all_types_round_trip(db: &mut PgDatabase) {
    db.init::<Test2>().unwrap();

    let mut row = Test2::default();
    row.a.set(true);
    row.c.set(13);
    row.d.set(-14);
    row.f.set(0.55);
    row.g.set(7.34823e+10);
    row.h.set(';');
    row.i.set("test".into());
    row.l.set(vec![0, 1, 2, 55]);
    row.m.set(Clob::from("___________________"));
    row.n.set(Blob::from(vec![0u8; 7]));
    row.o.set(date!(2018-12-31));
    row.p.set(datetime!(2019-01-01 00:27:43));
    row.q.set(time!(00:36:12));
    db.insert_without_id(&row).unwrap();

    let fetched: Test2 = db.select_one(Select::new()).unwrap().expect("one row");
    assert!(fetched.e.is_null());
    assert_eq!(fetched, row);
}

/// S6: composite key update, selectId and delete.
fn composite_key_lifecycle(db: &mut PgDatabase) {
    db.init::<Test3>().unwrap();

    let mut row = Test3::default();
    row.id1.set(1);
    row.id2.set("test".into());
    row.value.set(i32::MAX);
    db.insert_without_id(&row).unwrap();

    row.value.set(12);
    db.update(&row, &["value"], None).unwrap();

    let fetched = db.select_id(&row).unwrap().expect("row by composite key");
    assert_eq!(fetched.id1.get(), Some(&1));
    assert_eq!(fetched.id2.get().map(String::as_str), Some("test"));
    assert_eq!(fetched.value.get(), Some(&12));

    db.delete(&row).unwrap();
    let rows: Vec<Test3> = db.select(Select::new()).unwrap();
    assert!(rows.is_empty());
}

/// S7: quoting survives hostile strings.
fn escaping_round_trip(db: &mut PgDatabase) {
    db.init::<Test4>().unwrap();

    for value in ["'", "');drop table test;--"] {
        let mut row = Test4::default();
        row.str.set(value.into());
        db.insert(&mut row).unwrap();
    }

    let rows: Vec<Test4> = db.select(Order::by("id")).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].str.get().map(String::as_str), Some("'"));
    assert_eq!(
        rows[1].str.get().map(String::as_str),
        Some("');drop table test;--"),
    );

    // the table survived the hostile literal
    let still_there: Vec<Test1> = db.select(Select::new()).unwrap();
    assert_eq!(still_there.len(), 3);
}
