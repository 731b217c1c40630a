//! Concurrency checks against a real Postgres.
//!
//! Set `DATABASE_URL` to run them; without it every test returns early.
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::PgPool;
use tokio::sync::Barrier;

use pharmacy_backend::auth::actor::{ActorContext, Role};
use pharmacy_backend::database;
use pharmacy_backend::dtos::customer::CustomerRequest;
use pharmacy_backend::dtos::import::{CreateImportRequest, ImportItemRequest};
use pharmacy_backend::dtos::invoice::{CreateInvoiceRequest, InvoiceItemRequest};
use pharmacy_backend::dtos::medicine::MedicineRequest;
use pharmacy_backend::dtos::supplier::SupplierRequest;
use pharmacy_backend::error::AppError;
use pharmacy_backend::ledger::{LedgerTx, PgLedger};
use pharmacy_backend::models::inventory_log::InventoryLogType;
use pharmacy_backend::services::{catalog, import, invoice};

const SETTLE: Duration = Duration::from_millis(200);

async fn connect() -> Option<(PgPool, ActorContext)> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let pool = database::create_pool(&url, 8).await.unwrap();
    database::run_migrations(&pool).await.unwrap();

    let username = format!("ledger-test-{}", chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default());
    let user_id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, username, password_hash, role) VALUES ($1, $2, 'x', 'ADMIN') RETURNING id",
    )
    .bind("Ledger Test")
    .bind(&username)
    .fetch_one(&pool)
    .await
    .unwrap();

    Some((pool, ActorContext::new(user_id, Role::Admin, username)))
}

async fn medicine_with_stock(pool: &PgPool, actor: &ActorContext, name: &str, stock: i32) -> i64 {
    let mut tx = PgLedger::begin(pool).await.unwrap();
    let req = MedicineRequest {
        name: name.into(),
        category: "Test".into(),
        retail_price: 1.0,
        stock: Some(stock),
        ..Default::default()
    };
    let id = catalog::create_medicine(&mut tx, actor, &req).await.unwrap().id;
    tx.commit().await.unwrap();
    id
}

async fn stock_of(pool: &PgPool, id: i64) -> i32 {
    let mut tx = PgLedger::begin(pool).await.unwrap();
    tx.get_medicine(id).await.unwrap().unwrap().stock
}

async fn log_types(pool: &PgPool, id: i64) -> Vec<InventoryLogType> {
    let mut tx = PgLedger::begin(pool).await.unwrap();
    tx.medicine_logs(id).await.unwrap().into_iter().map(|l| l.log_type).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_never_oversell() {
    let Some((pool, actor)) = connect().await else { return };
    let id = medicine_with_stock(&pool, &actor, "Diclofenac 50mg", 5).await;

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for _ in 0..2 {
        let pool = pool.clone();
        let actor = actor.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            let req = CreateInvoiceRequest {
                items: vec![InvoiceItemRequest { medicine_id: id, quantity: 3, price: None, total: None }],
                ..Default::default()
            };
            barrier.wait().await;
            let mut tx = PgLedger::begin(&pool).await?;
            let detail = invoice::create_invoice(&mut tx, &actor, &req).await?;
            tx.commit().await?;
            Ok::<_, AppError>(detail)
        }));
    }

    let mut ok = 0;
    let mut short = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(AppError::InsufficientStock(_)) => short += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!((ok, short), (1, 1));

    assert_eq!(stock_of(&pool, id).await, 2);
    let mut tx = PgLedger::begin(&pool).await.unwrap();
    let sum: i32 = tx.medicine_logs(id).await.unwrap().iter().map(|l| l.quantity).sum();
    assert_eq!(sum, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_invoice_deletes_restore_stock_once() {
    let Some((pool, actor)) = connect().await else { return };
    let id = medicine_with_stock(&pool, &actor, "Amoxicillin 500mg", 10).await;

    let mut tx = PgLedger::begin(&pool).await.unwrap();
    let req = CreateInvoiceRequest {
        items: vec![InvoiceItemRequest { medicine_id: id, quantity: 4, price: None, total: None }],
        ..Default::default()
    };
    let invoice_id = invoice::create_invoice(&mut tx, &actor, &req).await.unwrap().invoice.id;
    tx.commit().await.unwrap();

    let mut first = PgLedger::begin(&pool).await.unwrap();
    invoice::delete_invoice(&mut first, &actor, invoice_id).await.unwrap();

    let second = {
        let pool = pool.clone();
        let actor = actor.clone();
        tokio::spawn(async move {
            let mut tx = PgLedger::begin(&pool).await?;
            invoice::delete_invoice(&mut tx, &actor, invoice_id).await?;
            tx.commit().await
        })
    };

    tokio::time::sleep(SETTLE).await;
    first.commit().await.unwrap();

    assert!(matches!(second.await.unwrap(), Err(AppError::NotFound(_))));
    assert_eq!(stock_of(&pool, id).await, 10);
    assert_eq!(
        log_types(&pool, id).await,
        vec![InventoryLogType::Initial, InventoryLogType::Sale, InventoryLogType::Return]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn racing_import_cancels_withdraw_stock_once() {
    let Some((pool, actor)) = connect().await else { return };
    let id = medicine_with_stock(&pool, &actor, "Metformin 850mg", 200).await;

    let mut tx = PgLedger::begin(&pool).await.unwrap();
    let supplier = SupplierRequest {
        name: "Racing Supplier".into(),
        phone: "0900000000".into(),
        address: "1 Dock Road".into(),
        contact_person: "Mai".into(),
        ..Default::default()
    };
    let supplier_id = catalog::create_supplier(&mut tx, &actor, &supplier).await.unwrap().id;
    let req = CreateImportRequest {
        supplier_id,
        note: None,
        items: vec![ImportItemRequest {
            medicine_id: id,
            quantity: 50,
            price: 0.4,
            lot_number: "LOT-R1".into(),
            expiry_date: NaiveDate::from_ymd_opt(2028, 1, 31).unwrap(),
            total: None,
        }],
    };
    let import_id = import::create_import(&mut tx, &actor, &req).await.unwrap().import.id;
    tx.commit().await.unwrap();
    assert_eq!(stock_of(&pool, id).await, 250);

    let mut first = PgLedger::begin(&pool).await.unwrap();
    import::delete_import(&mut first, &actor, import_id).await.unwrap();

    let second = {
        let pool = pool.clone();
        let actor = actor.clone();
        tokio::spawn(async move {
            let mut tx = PgLedger::begin(&pool).await?;
            import::delete_import(&mut tx, &actor, import_id).await?;
            tx.commit().await
        })
    };

    tokio::time::sleep(SETTLE).await;
    first.commit().await.unwrap();

    assert!(matches!(second.await.unwrap(), Err(AppError::NotFound(_))));
    assert_eq!(stock_of(&pool, id).await, 200);
    assert_eq!(
        log_types(&pool, id).await,
        vec![InventoryLogType::Initial, InventoryLogType::Import, InventoryLogType::ImportCancel]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overflowing_stock_is_a_validation_error() {
    let Some((pool, actor)) = connect().await else { return };
    let id = medicine_with_stock(&pool, &actor, "Saline 0.9%", 1).await;

    sqlx::query("UPDATE medicines SET stock = 2147483647 WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let mut tx = PgLedger::begin(&pool).await.unwrap();
    let err = tx.shift_stock(id, 1).await.unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_customers_get_distinct_codes() {
    let Some((pool, _)) = connect().await else { return };
    let req = CustomerRequest { name: "Walk-in regular".into(), ..Default::default() };

    let mut first = PgLedger::begin(&pool).await.unwrap();
    let a = catalog::create_customer(&mut first, &req).await.unwrap();

    let second = {
        let pool = pool.clone();
        let req = req.clone();
        tokio::spawn(async move {
            let mut tx = PgLedger::begin(&pool).await?;
            let customer = catalog::create_customer(&mut tx, &req).await?;
            tx.commit().await?;
            Ok::<_, AppError>(customer)
        })
    };

    tokio::time::sleep(SETTLE).await;
    first.commit().await.unwrap();

    let b = second.await.unwrap().unwrap();
    assert_ne!(a.code, b.code);
}
