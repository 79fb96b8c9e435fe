// Live PostgreSQL round trips. These need a reachable server, so they are
// ignored by default: run with
//   DATABASE_URL=postgres://... cargo test --test pg_integration -- --ignored
#![cfg(feature = "postgres")]

use sqlx_named::{
    nested_transaction, params, transaction, Db, Error, Executor, Params, Record, Router, SqlValue,
};

async fn connect() -> Db {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://postgres:@127.0.0.1/test-sqlx-named".to_string());
    Db::connect(&database_url)
        .await
        .expect("failed to connect to database")
}

async fn setup(db: &mut Db) {
    db.execute("drop table if exists named_accounts", &Params::Empty)
        .await
        .ok();
    db.execute(
        "create table named_accounts (id bigint primary key, name text not null, total bigint not null default 0)",
        &Params::Empty,
    )
    .await
    .expect("create table");
}

#[derive(Default, Debug, PartialEq, Record)]
struct NamedAccount {
    id: i64,
    name: String,
    total: i64,
}

#[tokio::test]
#[ignore]
async fn cast_expression_round_trip() {
    let mut db = connect().await;

    let row = db
        .get_map("select ${a}::int+${b}::int as c", &params! { a: 45, b: 459 })
        .await
        .unwrap()
        .expect("one row");
    assert_eq!(row["c"], SqlValue::Int(504));
}

#[tokio::test]
#[ignore]
async fn execute_get_and_select() {
    let mut db = connect().await;
    setup(&mut db).await;

    for (id, name) in [(1i64, "ada"), (2, "grace"), (3, "edsger")] {
        let result = db
            .execute(
                "insert into named_accounts (id, name) values (${id}, ${name})",
                &params! { id: id, name: name },
            )
            .await
            .unwrap();
        assert_eq!(result.rows_affected, 1);
    }

    let mut account = NamedAccount::default();
    let found = db
        .get(
            "select id, name, total from named_accounts where id = ${id}",
            &params! { id: 2 },
            &mut account,
        )
        .await
        .unwrap();
    assert!(found);
    assert_eq!(account.name, "grace");

    let found = db
        .get(
            "select id, name, total from named_accounts where id = ${id}",
            &params! { id: 99 },
            &mut account,
        )
        .await
        .unwrap();
    assert!(!found);

    let mut all: Vec<NamedAccount> = Vec::new();
    db.select(
        "select id, name, total from named_accounts order by id",
        &Params::Empty,
        &mut all,
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].name, "ada");

    // The destination keeps its prior allocation and shrinks to fit.
    db.select(
        "select id, name, total from named_accounts where id > ${id} order by id",
        &params! { id: 1 },
        &mut all,
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "grace");
}

#[tokio::test]
#[ignore]
async fn direct_scan_targets() {
    let mut db = connect().await;

    let mut total: i64 = 0;
    let mut label = String::new();
    let found = db
        .get_direct(
            "select ${n}::bigint, ${s}::text",
            &params! { n: 41, s: "answer" },
            &mut [&mut total, &mut label],
        )
        .await
        .unwrap();
    assert!(found);
    assert_eq!(total, 41);
    assert_eq!(label, "answer");
}

#[tokio::test]
#[ignore]
async fn transaction_commits_and_rolls_back() {
    let mut db = connect().await;
    setup(&mut db).await;

    transaction(&db, |tx| {
        Box::pin(async move {
            tx.execute(
                "insert into named_accounts (id, name) values (${id}, ${name})",
                &params! { id: 10, name: "kept" },
            )
            .await?;
            Ok::<_, Error>(())
        })
    })
    .await
    .unwrap();

    let err = transaction(&db, |tx| {
        Box::pin(async move {
            tx.execute(
                "insert into named_accounts (id, name) values (${id}, ${name})",
                &params! { id: 11, name: "discarded" },
            )
            .await?;
            Err::<(), Error>(Error::MissingParam("boom".into()))
        })
    })
    .await;
    assert!(err.is_err());

    let count = db
        .get_map("select count(*) as n from named_accounts", &Params::Empty)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(count["n"], SqlValue::Int(1));
}

#[tokio::test]
#[ignore]
async fn savepoint_keeps_outer_transaction_usable() {
    let mut db = connect().await;
    setup(&mut db).await;

    transaction(&db, |tx| {
        Box::pin(async move {
            tx.execute(
                "insert into named_accounts (id, name) values (${id}, ${name})",
                &params! { id: 20, name: "outer" },
            )
            .await?;

            let inner = nested_transaction(tx, |sp| {
                Box::pin(async move {
                    sp.execute(
                        "insert into named_accounts (id, name) values (${id}, ${name})",
                        &params! { id: 21, name: "inner" },
                    )
                    .await?;
                    Err::<(), Error>(Error::MissingParam("boom".into()))
                })
            })
            .await;
            assert!(inner.is_err());

            Ok::<_, Error>(())
        })
    })
    .await
    .unwrap();

    let count = db
        .get_map("select count(*) as n from named_accounts", &Params::Empty)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(count["n"], SqlValue::Int(1));
}

#[tokio::test]
#[ignore]
async fn prepared_statement_reruns() {
    let mut db = connect().await;
    setup(&mut db).await;

    for (id, name) in [(1i64, "ada"), (2, "grace")] {
        db.execute(
            "insert into named_accounts (id, name) values (${id}, ${name})",
            &params! { id: id, name: name },
        )
        .await
        .unwrap();
    }

    let mut stmt = db
        .prepare("select id, name, total from named_accounts where id = ${id}")
        .unwrap();
    assert_eq!(stmt.sql(), "select id, name, total from named_accounts where id = $1");
    assert_eq!(stmt.keys(), ["id"]);

    let mut account = NamedAccount::default();
    assert!(stmt.get(&params! { id: 1 }, &mut account).await.unwrap());
    assert_eq!(account.name, "ada");
    assert!(stmt.get(&params! { id: 2 }, &mut account).await.unwrap());
    assert_eq!(account.name, "grace");
}

#[tokio::test]
#[ignore]
async fn router_serves_reads_and_writes() {
    let db = connect().await;
    let mut router = Router::new(db.clone());
    router.add_reader(db);

    let mut writer = router.writer();
    setup(&mut writer).await;
    writer
        .execute(
            "insert into named_accounts (id, name) values (${id}, ${name})",
            &params! { id: 1, name: "ada" },
        )
        .await
        .unwrap();

    let mut reader = router.reader();
    let row = reader
        .get_map(
            "select name from named_accounts where id = ${id}",
            &params! { id: 1 },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row["name"], SqlValue::Text("ada".into()));
}
