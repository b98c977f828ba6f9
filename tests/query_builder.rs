use std::sync::Arc;

use mapsql::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
use mapsql::traits::DatabaseDriver;
use mapsql::{record, sql_args, ExecResult, MapSqlClient, MapSqlError, SqlValue};

fn client_for(driver: &Arc<InMemoryTestDriver>) -> MapSqlClient {
    let driver: Arc<dyn DatabaseDriver> = Arc::clone(driver) as Arc<dyn DatabaseDriver>;
    MapSqlClient::with_driver(driver, true)
}

#[tokio::test]
async fn test_insert_returns_generated_id() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_exec_result(ExecResult::new(1, Some(42))));
    let client = client_for(&in_memory_test_driver);
    let querier = client.querier();

    let id = querier
        .insert("users", &record! { "name" => "Alice", "age" => 30 })
        .await
        .unwrap();

    assert_eq!(id, 42);
    in_memory_test_driver.assert_last_query(
        "INSERT INTO `users` (`name`,`age`) VALUES (?,?)",
        &[SqlValue::from("Alice"), SqlValue::Int(30)],
    );
    in_memory_test_driver.assert_query_count(1);
}

#[tokio::test]
async fn test_insert_without_generated_id_returns_zero() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_exec_result(ExecResult::new(1, None)));
    let client = client_for(&in_memory_test_driver);

    let id = client
        .querier()
        .insert("tags", &record! { "tag" => "rust" })
        .await
        .unwrap();
    assert_eq!(id, 0);
}

#[tokio::test]
async fn test_update_binds_record_then_where_args() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_exec_result(ExecResult::new(3, None)));
    let client = client_for(&in_memory_test_driver);

    let affected = client
        .querier()
        .update(
            "users",
            &record! { "age" => 31, "memo" => None::<String> },
            "name=? AND age<?",
            &sql_args!["Alice", 40],
        )
        .await
        .unwrap();

    assert_eq!(affected, 3);
    in_memory_test_driver.assert_last_query(
        "UPDATE `users` SET `age`=?,`memo`=? WHERE name=? AND age<?",
        &[
            SqlValue::Int(31),
            SqlValue::Null,
            SqlValue::from("Alice"),
            SqlValue::Int(40),
        ],
    );
}

#[tokio::test]
async fn test_update_without_where_touches_every_row() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let client = client_for(&in_memory_test_driver);

    client
        .querier()
        .update("users", &record! { "active" => true }, "", &[])
        .await
        .unwrap();

    in_memory_test_driver.assert_last_query(
        "UPDATE `users` SET `active`=?",
        &[SqlValue::Bool(true)],
    );
}

#[tokio::test]
async fn test_delete() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_exec_result(ExecResult::new(2, None)));
    let client = client_for(&in_memory_test_driver);

    let deleted = client
        .querier()
        .delete("users", "age<?", &sql_args![18])
        .await
        .unwrap();

    assert_eq!(deleted, 2);
    in_memory_test_driver.assert_last_query("DELETE FROM `users` WHERE age<?", &[SqlValue::Int(18)]);
}

#[tokio::test]
async fn test_count_reads_text_protocol_value() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["total"])
                .row(vec![SqlValue::Bytes(b"5".to_vec())])
                .build(),
        ),
    );
    let client = client_for(&in_memory_test_driver);

    let total = client.querier().count("users", "", &[]).await.unwrap();

    assert_eq!(total, 5);
    in_memory_test_driver.assert_last_query("SELECT COUNT(*) AS total FROM `users`", &[]);
}

#[tokio::test]
async fn test_count_without_rows_is_an_error() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let client = client_for(&in_memory_test_driver);

    let err = client.querier().count("users", "", &[]).await.unwrap_err();
    assert!(matches!(err, MapSqlError::QueryFailed(_)));
}

#[tokio::test]
async fn test_select_with_where() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id", "name"])
                .row(sql_args![1, "Alice"])
                .row(sql_args![2, "Alice"])
                .build(),
        ),
    );
    let client = client_for(&in_memory_test_driver);

    let rows = client
        .querier()
        .select("users", "id, name", "name=?", &sql_args!["Alice"])
        .await
        .unwrap();

    in_memory_test_driver.assert_last_query(
        "SELECT id, name FROM `users` WHERE name=?",
        &[SqlValue::from("Alice")],
    );
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("id"), Some(&SqlValue::Int(1)));
    assert_eq!(rows[1].get("id"), Some(&SqlValue::Int(2)));
}

#[tokio::test]
async fn test_get_one_appends_limit() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id", "name"])
                .row(vec![SqlValue::Int(7), SqlValue::Bytes(b"Bob".to_vec())])
                .build(),
        ),
    );
    let client = client_for(&in_memory_test_driver);

    let row = client
        .querier()
        .get_one("users", "*", "id=?", &sql_args![7])
        .await
        .unwrap();

    in_memory_test_driver.assert_last_query(
        "SELECT * FROM `users` WHERE id=? LIMIT 1",
        &[SqlValue::Int(7)],
    );
    assert_eq!(mapsql::format_to_string(&row, "name"), "Bob");
}

#[tokio::test]
async fn test_get_one_miss_returns_empty_row() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new().with_response(
        InMemoryTestResponseBuilder::new().columns(&["id"]).build(), // No rows
    ));
    let client = client_for(&in_memory_test_driver);

    let row = client
        .querier()
        .get_one("users", "*", "id=?", &sql_args![999])
        .await
        .unwrap();

    assert!(row.is_empty());
}

#[tokio::test]
async fn test_raw_query_and_exec_pass_through() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(
                InMemoryTestResponseBuilder::new()
                    .columns(&["n"])
                    .row(sql_args![1])
                    .build(),
            )
            .with_exec_result(ExecResult::new(0, None)),
    );
    let client = client_for(&in_memory_test_driver);
    let querier = client.querier();

    let rows = querier.query("SELECT ? AS n", &sql_args![1]).await.unwrap();
    querier
        .exec("TRUNCATE TABLE `users`", &[])
        .await
        .unwrap();

    in_memory_test_driver.assert_query_count(2);
    let queries = in_memory_test_driver.recorded_queries();
    assert_eq!(queries[0].sql, "SELECT ? AS n");
    assert_eq!(queries[0].params, vec![SqlValue::Int(1)]);
    assert_eq!(queries[1].sql, "TRUNCATE TABLE `users`");
    assert_eq!(rows[0].get("n"), Some(&SqlValue::Int(1)));
}

#[tokio::test]
async fn test_batch_insert_multi_row() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_exec_result(ExecResult::new(3, Some(10))));
    let client = client_for(&in_memory_test_driver);

    let records = vec![
        record! { "name" => "a", "age" => 1 },
        record! { "age" => 2, "name" => "b" },
        record! { "name" => "c", "age" => 3 },
    ];
    let affected = client
        .querier()
        .batch_insert("users", &records)
        .await
        .unwrap();

    assert_eq!(affected, 3);
    in_memory_test_driver.assert_last_query(
        "INSERT INTO `users` (`name`,`age`) VALUES (?,?),(?,?),(?,?)",
        &sql_args!["a", 1, "b", 2, "c", 3],
    );
}

#[tokio::test]
async fn test_batch_insert_single_record_delegates_to_insert() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_exec_result(ExecResult::new(1, Some(5))));
    let client = client_for(&in_memory_test_driver);

    let affected = client
        .querier()
        .batch_insert("users", &[record! { "name" => "solo" }])
        .await
        .unwrap();

    assert_eq!(affected, 1);
    in_memory_test_driver.assert_last_query(
        "INSERT INTO `users` (`name`) VALUES (?)",
        &[SqlValue::from("solo")],
    );
}

#[tokio::test]
async fn test_invalid_arguments_send_nothing() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let client = client_for(&in_memory_test_driver);
    let querier = client.querier();

    let records = vec![record! { "name" => "a" }, record! { "title" => "b" }];
    let results = vec![
        querier.batch_insert("", &records).await.unwrap_err(),
        querier.batch_insert("users", &[]).await.unwrap_err(),
        querier.batch_insert("users", &records).await.unwrap_err(),
        querier.insert("users", &record! {}).await.unwrap_err(),
        querier.delete(" ", "", &[]).await.unwrap_err(),
    ];

    for err in results {
        assert!(
            matches!(err, MapSqlError::InvalidParameter(_)),
            "unexpected error: {:?}",
            err
        );
    }
    in_memory_test_driver.assert_query_count(0);
}

#[tokio::test]
async fn test_driver_errors_pass_through() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_failure("Duplicate entry 'a' for key 'name'"));
    let client = client_for(&in_memory_test_driver);

    let err = client
        .querier()
        .insert("users", &record! { "name" => "a" })
        .await
        .unwrap_err();

    match err {
        MapSqlError::QueryFailed(msg) => assert_eq!(msg, "Duplicate entry 'a' for key 'name'"),
        other => panic!("Expected QueryFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_close_releases_driver() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let client = client_for(&in_memory_test_driver);
    let querier = client.querier();

    client.ping().await.unwrap();
    assert_eq!(in_memory_test_driver.ping_count(), 1);

    client.close().await.unwrap();
    assert!(in_memory_test_driver.is_closed());
    assert!(matches!(
        client.close().await,
        Err(MapSqlError::ConnectionFailed(_))
    ));
    assert!(matches!(
        querier.select("users", "*", "", &[]).await,
        Err(MapSqlError::ConnectionFailed(_))
    ));
}
