use chrono::NaiveDate;

use pharmacy_backend::auth::actor::{ActorContext, Role};
use pharmacy_backend::dtos::customer::CustomerRequest;
use pharmacy_backend::dtos::import::{CreateImportRequest, ImportItemRequest};
use pharmacy_backend::dtos::interaction::{InteractionRequest, MedicineRef};
use pharmacy_backend::dtos::inventory::{AdjustStockRequest, AdjustType};
use pharmacy_backend::dtos::invoice::{CreateInvoiceRequest, InvoiceItemRequest};
use pharmacy_backend::dtos::medicine::MedicineRequest;
use pharmacy_backend::dtos::supplier::SupplierRequest;
use pharmacy_backend::error::AppError;
use pharmacy_backend::ledger::{LedgerTx, MemoryLedger};
use pharmacy_backend::models::inventory_log::InventoryLogType;
use pharmacy_backend::services::{adjustment, catalog, history, import, interaction, invoice};

fn admin() -> ActorContext {
    ActorContext::new(1, Role::Admin, "admin")
}

fn manager() -> ActorContext {
    ActorContext::new(2, Role::InventoryManager, "stock")
}

fn clerk() -> ActorContext {
    ActorContext::new(3, Role::User, "counter")
}

async fn medicine(ledger: &MemoryLedger, name: &str, stock: Option<i32>) -> i64 {
    let mut tx = ledger.begin().await;
    let req = MedicineRequest {
        name: name.into(),
        category: "Analgesic".into(),
        import_price: 1.0,
        retail_price: 2.5,
        stock,
        ..Default::default()
    };
    let m = catalog::create_medicine(&mut tx, &manager(), &req).await.unwrap();
    tx.commit();
    m.id
}

async fn supplier(ledger: &MemoryLedger) -> i64 {
    let mut tx = ledger.begin().await;
    let req = SupplierRequest {
        name: "Northwind Pharma".into(),
        phone: "555-0100".into(),
        address: "1 Dock Road".into(),
        contact_person: "R. Vale".into(),
        ..Default::default()
    };
    let s = catalog::create_supplier(&mut tx, &manager(), &req).await.unwrap();
    tx.commit();
    s.id
}

fn import_line(medicine_id: i64, quantity: i32) -> ImportItemRequest {
    ImportItemRequest {
        medicine_id,
        quantity,
        price: 1.0,
        lot_number: "LOT-A1".into(),
        expiry_date: NaiveDate::from_ymd_opt(2028, 6, 30).unwrap(),
        total: None,
    }
}

fn sale(medicine_id: i64, quantity: i32) -> CreateInvoiceRequest {
    CreateInvoiceRequest {
        items: vec![InvoiceItemRequest { medicine_id, quantity, price: None, total: None }],
        ..Default::default()
    }
}

async fn stock_of(ledger: &MemoryLedger, id: i64) -> i32 {
    let mut tx = ledger.begin().await;
    tx.get_medicine(id).await.unwrap().unwrap().stock
}

async fn logged_sum(ledger: &MemoryLedger, id: i64) -> i64 {
    let mut tx = ledger.begin().await;
    tx.medicine_logs(id).await.unwrap().iter().map(|l| i64::from(l.quantity)).sum()
}

#[tokio::test]
async fn import_sell_return_cancel() {
    let ledger = MemoryLedger::new();
    let m = medicine(&ledger, "Paracetamol 500mg", None).await;
    let s = supplier(&ledger).await;
    assert_eq!(stock_of(&ledger, m).await, 0);

    let mut tx = ledger.begin().await;
    let req = CreateImportRequest { supplier_id: s, note: None, items: vec![import_line(m, 100)] };
    let imported = import::create_import(&mut tx, &manager(), &req).await.unwrap();
    tx.commit();
    assert_eq!(stock_of(&ledger, m).await, 100);

    let mut tx = ledger.begin().await;
    let sold = invoice::create_invoice(&mut tx, &clerk(), &sale(m, 30)).await.unwrap();
    tx.commit();
    assert_eq!(stock_of(&ledger, m).await, 70);

    let mut tx = ledger.begin().await;
    invoice::delete_invoice(&mut tx, &admin(), sold.invoice.id).await.unwrap();
    tx.commit();
    assert_eq!(stock_of(&ledger, m).await, 100);

    let mut tx = ledger.begin().await;
    import::delete_import(&mut tx, &manager(), imported.import.id).await.unwrap();
    tx.commit();
    assert_eq!(stock_of(&ledger, m).await, 0);

    let mut tx = ledger.begin().await;
    let logs = tx.medicine_logs(m).await.unwrap();
    let trail: Vec<(InventoryLogType, i32)> = logs.iter().map(|l| (l.log_type, l.quantity)).collect();
    assert_eq!(
        trail,
        vec![
            (InventoryLogType::Import, 100),
            (InventoryLogType::Sale, -30),
            (InventoryLogType::Return, 30),
            (InventoryLogType::ImportCancel, -100),
        ]
    );
    assert_eq!(logs[1].reference.as_deref(), Some(sold.invoice.code.as_str()));
}

#[tokio::test]
async fn stock_always_equals_logged_total() {
    let ledger = MemoryLedger::new();
    let a = medicine(&ledger, "Ibuprofen 200mg", Some(40)).await;
    let b = medicine(&ledger, "Cetirizine 10mg", None).await;
    let s = supplier(&ledger).await;

    let mut tx = ledger.begin().await;
    let req = CreateImportRequest { supplier_id: s, note: None, items: vec![import_line(a, 15), import_line(b, 60)] };
    import::create_import(&mut tx, &manager(), &req).await.unwrap();
    tx.commit();

    let mut tx = ledger.begin().await;
    let two_lines = CreateInvoiceRequest {
        items: vec![
            InvoiceItemRequest { medicine_id: a, quantity: 12, price: None, total: None },
            InvoiceItemRequest { medicine_id: b, quantity: 7, price: Some(3.0), total: None },
        ],
        ..Default::default()
    };
    let first = invoice::create_invoice(&mut tx, &clerk(), &two_lines).await.unwrap();
    invoice::create_invoice(&mut tx, &clerk(), &sale(b, 20)).await.unwrap();
    tx.commit();

    let mut tx = ledger.begin().await;
    let req = AdjustStockRequest { medicine_id: a, adjust_type: AdjustType::Subtract, quantity: 3, reason: Some("Broken blister".into()) };
    adjustment::adjust_stock(&mut tx, &manager(), &req).await.unwrap();
    let req = AdjustStockRequest { medicine_id: b, adjust_type: AdjustType::Set, quantity: 50, reason: None };
    adjustment::adjust_stock(&mut tx, &manager(), &req).await.unwrap();
    invoice::delete_invoice(&mut tx, &manager(), first.invoice.id).await.unwrap();
    tx.commit();

    // a: 40 + 15 - 12 - 3 + 12; b: 60 - 7 - 20, then set to 50, + 7
    assert_eq!(stock_of(&ledger, a).await, 52);
    assert_eq!(stock_of(&ledger, b).await, 57);

    for id in [a, b] {
        assert_eq!(i64::from(stock_of(&ledger, id).await), logged_sum(&ledger, id).await);
        let mut tx = ledger.begin().await;
        assert!(history::medicine_history(&mut tx, id).await.unwrap().consistent);
    }
}

#[tokio::test]
async fn oversell_leaves_nothing_behind() {
    let ledger = MemoryLedger::new();
    let a = medicine(&ledger, "Amoxicillin 250mg", Some(8)).await;
    let b = medicine(&ledger, "Metformin 500mg", Some(2)).await;

    {
        let mut tx = ledger.begin().await;
        let req = CreateInvoiceRequest {
            items: vec![
                InvoiceItemRequest { medicine_id: a, quantity: 5, price: None, total: None },
                InvoiceItemRequest { medicine_id: b, quantity: 3, price: None, total: None },
            ],
            ..Default::default()
        };
        let err = invoice::create_invoice(&mut tx, &clerk(), &req).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(_)));
    }

    assert_eq!(stock_of(&ledger, a).await, 8);
    assert_eq!(stock_of(&ledger, b).await, 2);
    assert_eq!(logged_sum(&ledger, a).await, 8);

    let mut tx = ledger.begin().await;
    assert_eq!(tx.medicine_logs(a).await.unwrap().len(), 1);
    assert_eq!(tx.count_rows(pharmacy_backend::ledger::Sequence::Invoice).await.unwrap(), 0);
}

#[tokio::test]
async fn cancelling_a_drawn_down_import_is_refused() {
    let ledger = MemoryLedger::new();
    let m = medicine(&ledger, "Loperamide 2mg", None).await;
    let s = supplier(&ledger).await;

    let mut tx = ledger.begin().await;
    let req = CreateImportRequest { supplier_id: s, note: None, items: vec![import_line(m, 20)] };
    let imported = import::create_import(&mut tx, &manager(), &req).await.unwrap();
    invoice::create_invoice(&mut tx, &clerk(), &sale(m, 5)).await.unwrap();
    tx.commit();

    {
        let mut tx = ledger.begin().await;
        let err = import::delete_import(&mut tx, &manager(), imported.import.id).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(_)));
    }

    let mut tx = ledger.begin().await;
    assert_eq!(tx.get_medicine(m).await.unwrap().unwrap().stock, 15);
    assert!(tx.get_import(imported.import.id).await.unwrap().is_some());
}

#[tokio::test]
async fn set_adjustment_logs_the_difference() {
    let ledger = MemoryLedger::new();
    let m = medicine(&ledger, "Omeprazole 20mg", Some(10)).await;

    let mut tx = ledger.begin().await;
    let req = AdjustStockRequest { medicine_id: m, adjust_type: AdjustType::Set, quantity: 25, reason: None };
    let result = adjustment::adjust_stock(&mut tx, &manager(), &req).await.unwrap();
    tx.commit();

    assert_eq!(result.medicine.stock, 25);
    assert_eq!(result.delta, 15);
    let log = result.log.unwrap();
    assert_eq!(log.log_type, InventoryLogType::AdjustmentAdd);
    assert_eq!(log.quantity, 15);
    assert_eq!(stock_of(&ledger, m).await, 25);
}

#[tokio::test]
async fn return_restores_exact_quantities_after_adjustment() {
    let ledger = MemoryLedger::new();
    let m = medicine(&ledger, "Salbutamol inhaler", Some(30)).await;

    let mut tx = ledger.begin().await;
    let sold = invoice::create_invoice(&mut tx, &clerk(), &sale(m, 12)).await.unwrap();
    let req = AdjustStockRequest { medicine_id: m, adjust_type: AdjustType::Set, quantity: 0, reason: Some("Stock take".into()) };
    adjustment::adjust_stock(&mut tx, &manager(), &req).await.unwrap();
    invoice::delete_invoice(&mut tx, &manager(), sold.invoice.id).await.unwrap();
    tx.commit();

    assert_eq!(stock_of(&ledger, m).await, 12);
    assert_eq!(logged_sum(&ledger, m).await, 12);
}

#[tokio::test]
async fn reversed_interaction_pair_is_a_duplicate() {
    let ledger = MemoryLedger::new();
    let warfarin = medicine(&ledger, "Warfarin", None).await;
    let aspirin = medicine(&ledger, "Aspirin", None).await;

    let mut tx = ledger.begin().await;
    let forward = InteractionRequest {
        medicine1: MedicineRef::Id(warfarin),
        medicine2: MedicineRef::Id(aspirin),
        severity: "severe".into(),
        description: "Raised bleeding risk".into(),
        recommendation: None,
    };
    interaction::create_interaction(&mut tx, &admin(), &forward).await.unwrap();

    let reversed = InteractionRequest {
        medicine1: MedicineRef::Name("Aspirin".into()),
        medicine2: MedicineRef::Id(warfarin),
        ..forward.clone()
    };
    let err = interaction::create_interaction(&mut tx, &admin(), &reversed).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn customer_with_invoices_cannot_be_deleted() {
    let ledger = MemoryLedger::new();
    let m = medicine(&ledger, "Vitamin C", Some(5)).await;

    let mut tx = ledger.begin().await;
    let customer = catalog::create_customer(
        &mut tx,
        &CustomerRequest { name: "Mai Tran".into(), phone: Some("0901".into()), ..Default::default() },
    )
    .await
    .unwrap();
    let req = CreateInvoiceRequest { customer_id: Some(customer.id), ..sale(m, 1) };
    invoice::create_invoice(&mut tx, &clerk(), &req).await.unwrap();

    let err = catalog::delete_customer(&mut tx, customer.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
