use crate::dtos::interaction::MedicineRef;
use crate::error::AppError;
use crate::ledger::LedgerTx;
use crate::models::customer::Customer;
use crate::models::medicine::Medicine;
use crate::models::supplier::Supplier;

pub async fn medicine<L>(tx: &mut L, id: i64) -> Result<Medicine, AppError>
where
    L: LedgerTx + ?Sized,
{
    tx.get_medicine(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Medicine {id} not found")))
}

pub async fn customer<L>(tx: &mut L, id: i64) -> Result<Customer, AppError>
where
    L: LedgerTx + ?Sized,
{
    tx.get_customer(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {id} not found")))
}

pub async fn supplier<L>(tx: &mut L, id: i64) -> Result<Supplier, AppError>
where
    L: LedgerTx + ?Sized,
{
    tx.get_supplier(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Supplier {id} not found")))
}

/// Resolves an id exactly, or a name only when exactly one medicine carries it.
pub async fn medicine_by_ref<L>(tx: &mut L, r: &MedicineRef) -> Result<Medicine, AppError>
where
    L: LedgerTx + ?Sized,
{
    match r {
        MedicineRef::Id(id) => medicine(tx, *id).await,
        MedicineRef::Name(name) => {
            let name = name.trim();
            let mut matches = tx.find_medicines_by_name(name).await?;
            match matches.len() {
                0 => Err(AppError::not_found(format!("Medicine '{name}' not found"))),
                1 => Ok(matches.remove(0)),
                n => Err(AppError::validation(format!(
                    "{n} medicines are named '{name}'; refer to the medicine by id"
                ))),
            }
        }
    }
}

/// Refuses deletion while invoices still point at the customer.
pub async fn ensure_customer_deletable<L>(tx: &mut L, id: i64) -> Result<(), AppError>
where
    L: LedgerTx + ?Sized,
{
    let invoices = tx.count_customer_invoices(id).await?;
    if invoices > 0 {
        return Err(AppError::conflict(format!(
            "Customer has {invoices} invoice(s) and cannot be deleted"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::models::medicine::MedicineFields;

    fn named(name: &str) -> MedicineFields {
        MedicineFields { name: name.into(), category: "General".into(), ..Default::default() }
    }

    #[tokio::test]
    async fn name_lookup_flags_ambiguity() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin().await;
        let aspirin = tx.insert_medicine("MED-1001", &named("Aspirin")).await.unwrap();
        tx.insert_medicine("MED-1002", &named("Vitamin C")).await.unwrap();
        tx.insert_medicine("MED-1003", &named("Vitamin C")).await.unwrap();

        let found = medicine_by_ref(&mut tx, &MedicineRef::Name(" Aspirin ".into())).await.unwrap();
        assert_eq!(found.id, aspirin.id);

        let err = medicine_by_ref(&mut tx, &MedicineRef::Name("Vitamin C".into())).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = medicine_by_ref(&mut tx, &MedicineRef::Name("Quinine".into())).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn id_lookup_is_exact() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin().await;
        let m = tx.insert_medicine("MED-1001", &named("Aspirin")).await.unwrap();
        assert_eq!(medicine_by_ref(&mut tx, &MedicineRef::Id(m.id)).await.unwrap().code, "MED-1001");
        assert!(matches!(medicine(&mut tx, m.id + 1).await, Err(AppError::NotFound(_))));
    }
}
