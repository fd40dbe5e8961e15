use pgdecl::qb::{Row, Select};
use pgdecl::schema::{Catalog, Constraint, Env, Index, ModelMeta, PgCatalog, Registry, SchemaSync};
use pgdecl::{OrmError, OrmResult, SyncConfig};
use std::time::{SystemTime, UNIX_EPOCH};

fn database_url(test: &str) -> Option<String> {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    match std::env::var("DATABASE_URL") {
        Ok(v) => Some(v),
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            None
        }
    }
}

fn scratch_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before UNIX_EPOCH")
        .as_nanos();
    format!("{prefix}_{}_{}", std::process::id(), nanos % 1_000_000_000)
}

fn quant_model(name: &str, qty_check: &str) -> ModelMeta {
    ModelMeta::new(name)
        .declare(
            "_qty_positive",
            Constraint::new(qty_check).message("Quantity cannot be negative"),
        )
        .declare("_location_idx", Index::new("(location_id) WHERE quantity > 0"))
        .declare("_lot_uniq", Index::unique("(location_id, lot)"))
}

#[tokio::test]
async fn sync_creates_updates_and_translates() -> OrmResult<()> {
    let Some(database_url) = database_url("sync_creates_updates_and_translates") else {
        return Ok(());
    };

    let pool = pgdecl::create_pool(&database_url, 2)?;
    let mut client = pool.get().await?;
    let tx = client.transaction().await.map_err(OrmError::from_db_error)?;

    let table = scratch_name("pgdecl_quant");
    tx.batch_execute(&format!(
        "CREATE TABLE {table} (id serial PRIMARY KEY, location_id int, lot text, quantity numeric)"
    ))
    .await
    .map_err(OrmError::from_db_error)?;

    let catalog = PgCatalog::new(&tx);
    let mut registry = Registry::new();
    registry.register(quant_model(&table, "CHECK (quantity >= 0)"))?;

    // First pass creates everything.
    let mut sync = SchemaSync::new(&catalog);
    registry.init_models(&mut sync).await?;

    let constraint = format!("{table}_qty_positive");
    assert_eq!(
        catalog.constraint_definition(&table, &constraint).await?.as_deref(),
        Some("CHECK (quantity >= 0)")
    );
    let index = catalog
        .index_definition(&format!("{table}_lot_uniq"))
        .await?
        .expect("unique index created");
    assert_eq!(index.comment.as_deref(), Some("UNIQUE INDEX (location_id, lot)"));
    assert!(index.indexdef.starts_with("CREATE UNIQUE INDEX"));

    // Second pass is a no-op.
    let mut sync = SchemaSync::new(&catalog);
    registry.init_models(&mut sync).await?;
    assert_eq!(sync.pending().count(), 0);

    // A changed definition replaces the constraint.
    registry.register(quant_model(&table, "CHECK (quantity >= 0 OR lot IS NULL)"))?;
    let mut sync = SchemaSync::with_config(&catalog, SyncConfig::new());
    registry.init_models(&mut sync).await?;
    assert_eq!(
        catalog.constraint_definition(&table, &constraint).await?.as_deref(),
        Some("CHECK (quantity >= 0 OR lot IS NULL)")
    );

    // Build queries against the scratch tables.
    tx.batch_execute(&format!(
        "CREATE TABLE {table}_loc (id int PRIMARY KEY, name text);
         CREATE TABLE {table}_lot (id int PRIMARY KEY, note text);
         INSERT INTO {table}_loc VALUES (1, 'Stock');
         INSERT INTO {table}_lot VALUES (1, 'first');
         INSERT INTO {table} (location_id, lot, quantity) VALUES (1, 'A', 3);"
    ))
    .await
    .map_err(OrmError::from_db_error)?;
    let quant = Row::new(table.clone());
    let rows = Select::new(vec![quant.col("lot")])
        .where_(quant.col("location_id").eq(1i32) & quant.col("lot").is_not_null())
        .query(&tx)
        .await?;
    assert_eq!(rows.len(), 1);
    let lot: String = rows[0].get(0);
    assert_eq!(lot, "A");

    // Three tables, joined from the first one in FROM.
    let location = Row::nullable(format!("{table}_loc"));
    let lot_note = Row::new(format!("{table}_lot"));
    let rows = Select::new(vec![quant.col("lot"), location.col("name"), lot_note.col("note")])
        .join(quant.col("location_id").eq_col(&location.col("id")))
        .where_(lot_note.col("id").eq(1i32))
        .query(&tx)
        .await?;
    assert_eq!(rows.len(), 1);
    let name: Option<String> = rows[0].get(1);
    assert_eq!(name.as_deref(), Some("Stock"));

    // A violation raised through the crate's client maps to the declared message.
    let err = pgdecl::GenericClient::execute(
        &tx,
        &format!("INSERT INTO {table} (location_id, lot, quantity) VALUES (2, 'B', -1)"),
        &[],
    )
    .await
    .expect_err("negative quantity must be rejected");
    assert!(matches!(err, OrmError::CheckViolation { .. }));
    assert_eq!(
        err.db_error().and_then(|e| e.constraint()),
        Some(constraint.as_str())
    );
    match registry.translate(&Env::new(), err) {
        OrmError::ConstraintViolation { constraint: name, message } => {
            assert_eq!(name, constraint);
            assert_eq!(message, "Quantity cannot be negative");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Dropping the transaction rolls the scratch table back.
    drop(catalog);
    drop(tx);
    Ok(())
}
