use crate::error::AppError;
use crate::ledger::{LedgerTx, Sequence};

/// Next free code for `seq`, starting from the row count.
///
/// Takes the sequence lock first, so concurrent writers wait for this unit of
/// work to commit and then see its row.
pub async fn next_code<L>(tx: &mut L, seq: Sequence) -> Result<String, AppError>
where
    L: LedgerTx + ?Sized,
{
    tx.lock_sequence(seq).await?;
    let mut n = tx.count_rows(seq).await? + 1;
    loop {
        let code = seq.format(n);
        if !tx.code_taken(seq, &code).await? {
            return Ok(code);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryLedger;
    use crate::models::customer::CustomerFields;

    #[tokio::test]
    async fn skips_codes_freed_by_deletion() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin().await;
        let fields = CustomerFields { name: "Lan".into(), ..Default::default() };

        let code = next_code(&mut tx, Sequence::Customer).await.unwrap();
        let first = tx.insert_customer(&code, &fields).await.unwrap();
        let code = next_code(&mut tx, Sequence::Customer).await.unwrap();
        let second = tx.insert_customer(&code, &fields).await.unwrap();
        assert_eq!(first.code, "CUS-0001");
        assert_eq!(second.code, "CUS-0002");

        // One row left, so the count points at CUS-0002, which is still in use.
        tx.delete_customer(first.id).await.unwrap();
        assert_eq!(next_code(&mut tx, Sequence::Customer).await.unwrap(), "CUS-0003");
    }
}
