#![cfg(feature = "postgres")]

use std::time::{SystemTime, UNIX_EPOCH};
use tablekit::{
    Condition, ConditionSet, Operator, PgHost, PgHostConfig, Table, TableConfig, TableResult,
    Value, list,
};

fn host() -> Option<PgHost> {
    let database_url = std::env::var("DATABASE_URL").ok()?;
    Some(PgHost::connect(&PgHostConfig::new(database_url)).expect("invalid DATABASE_URL"))
}

fn unique_table() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("tablekit_test_{}_{}", std::process::id(), nanos)
}

#[tokio::test]
async fn crud_roundtrip() -> TableResult<()> {
    let Some(host) = host() else {
        eprintln!("DATABASE_URL is not set; skipping crud_roundtrip");
        return Ok(());
    };
    let name = unique_table();

    let client = host.pool().get().await?;
    client
        .batch_execute(&format!(
            "CREATE TABLE {name} (
                id BIGSERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                category TEXT,
                views INT NOT NULL DEFAULT 0
            )"
        ))
        .await?;

    let result = async {
        let table = Table::open(&host, &name).await?;
        assert_eq!(table.columns().len(), 4);

        let first = table
            .insert([
                ("title", Value::from("a")),
                ("category", Value::from("news")),
                ("views", Value::from("5")),
            ])
            .await?
            .expect("RETURNING id");
        let second = table
            .insert([("title", Value::from("b")), ("category", Value::Null)])
            .await?
            .expect("RETURNING id");
        assert!(second > first);
        assert_eq!(table.count().await?, 2);

        let row = table.get_row("id", first, "%d", 0).await?.expect("row");
        assert_eq!(row.get("views"), Some(&Value::Int(5)));

        let rows = table
            .get_wheres(
                ["title"],
                &ConditionSet::new()
                    .with_op("views", list([1, 10]), Operator::Between)
                    .with("category", "news"),
                None,
                None,
            )
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("title"), Some(&Value::from("a")));

        let zero_views = table
            .get_by("*", Condition::new("views", 0), None, None)
            .await?;
        assert_eq!(zero_views.len(), 1);

        let updated = table
            .update([("views", 7)], [("category", Value::Null)])
            .await?;
        assert_eq!(updated, 1);

        let counts = table.count_column("views").await?;
        assert_eq!(counts.total, 2);

        assert_eq!(table.bulk_delete("id", [first, second], "%d").await?, 2);
        assert_eq!(table.count().await?, 0);
        Ok::<_, tablekit::TableError>(())
    }
    .await;

    client
        .batch_execute(&format!("DROP TABLE IF EXISTS {name}"))
        .await?;
    result
}

#[tokio::test]
async fn missing_table_is_reported() -> TableResult<()> {
    let Some(host) = host() else {
        eprintln!("DATABASE_URL is not set; skipping missing_table_is_reported");
        return Ok(());
    };

    let err = Table::open_with(&host, &unique_table(), TableConfig::new().without_prefix())
        .await
        .err()
        .expect("table should not exist");
    assert!(err.is_table_not_found());
    Ok(())
}
