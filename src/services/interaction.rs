//! Drug interaction records. A pair is unordered: (A, B) and (B, A) are one row.
use tracing::info;

use super::lookup;
use crate::auth::actor::ActorContext;
use crate::dtos::interaction::{
    CheckInteractionRequest, CheckInteractionResponse, InteractionDetail, InteractionRequest, MedicineRef,
};
use crate::error::AppError;
use crate::ledger::LedgerTx;
use crate::models::interaction::{Interaction, InteractionFields};
use crate::models::medicine::Medicine;

pub async fn create_interaction<L>(
    tx: &mut L,
    actor: &ActorContext,
    req: &InteractionRequest,
) -> Result<InteractionDetail, AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_admin("manage drug interactions")?;
    req.validate()?;

    let (from, to) = resolve_pair(tx, &req.medicine1, &req.medicine2).await?;
    if tx.find_interaction_pair(from.id, to.id, None).await?.is_some() {
        return Err(AppError::conflict(format!(
            "Interaction between {} and {} already exists",
            from.name, to.name
        )));
    }

    let interaction = tx.insert_interaction(&fields(&from, &to, req)).await?;
    info!(interaction_id = interaction.id, from = from.id, to = to.id, "Interaction created");
    Ok(detail(interaction, from, to))
}

pub async fn update_interaction<L>(
    tx: &mut L,
    actor: &ActorContext,
    id: i64,
    req: &InteractionRequest,
) -> Result<InteractionDetail, AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_admin("manage drug interactions")?;
    req.validate()?;
    find(tx, id).await?;

    let (from, to) = resolve_pair(tx, &req.medicine1, &req.medicine2).await?;
    if tx.find_interaction_pair(from.id, to.id, Some(id)).await?.is_some() {
        return Err(AppError::conflict(format!(
            "Interaction between {} and {} already exists",
            from.name, to.name
        )));
    }

    let interaction = tx
        .update_interaction(id, &fields(&from, &to, req))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Interaction {id} not found")))?;
    Ok(detail(interaction, from, to))
}

pub async fn delete_interaction<L>(tx: &mut L, actor: &ActorContext, id: i64) -> Result<(), AppError>
where
    L: LedgerTx + ?Sized,
{
    actor.require_admin("manage drug interactions")?;
    if !tx.delete_interaction(id).await? {
        return Err(AppError::not_found(format!("Interaction {id} not found")));
    }
    info!(interaction_id = id, "Interaction deleted");
    Ok(())
}

pub async fn get_interaction<L>(tx: &mut L, id: i64) -> Result<InteractionDetail, AppError>
where
    L: LedgerTx + ?Sized,
{
    let interaction = find(tx, id).await?;
    let from = lookup::medicine(tx, interaction.medicine_from_id).await?;
    let to = lookup::medicine(tx, interaction.medicine_to_id).await?;
    Ok(detail(interaction, from, to))
}

pub async fn check_interaction<L>(tx: &mut L, req: &CheckInteractionRequest) -> Result<CheckInteractionResponse, AppError>
where
    L: LedgerTx + ?Sized,
{
    req.validate()?;
    let (a, b) = resolve_pair(tx, &req.medicine1, &req.medicine2).await?;

    let Some(interaction) = tx.find_interaction_pair(a.id, b.id, None).await? else {
        return Ok(CheckInteractionResponse { found: false, interaction: None });
    };

    // Report names in the stored direction, not the asked one.
    let (from, to) = if interaction.medicine_from_id == a.id { (a, b) } else { (b, a) };
    Ok(CheckInteractionResponse { found: true, interaction: Some(detail(interaction, from, to)) })
}

async fn resolve_pair<L>(tx: &mut L, first: &MedicineRef, second: &MedicineRef) -> Result<(Medicine, Medicine), AppError>
where
    L: LedgerTx + ?Sized,
{
    let a = lookup::medicine_by_ref(tx, first).await?;
    let b = lookup::medicine_by_ref(tx, second).await?;
    if a.id == b.id {
        return Err(AppError::validation("A medicine cannot interact with itself"));
    }
    Ok((a, b))
}

async fn find<L>(tx: &mut L, id: i64) -> Result<Interaction, AppError>
where
    L: LedgerTx + ?Sized,
{
    tx.get_interaction(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Interaction {id} not found")))
}

fn fields(from: &Medicine, to: &Medicine, req: &InteractionRequest) -> InteractionFields {
    InteractionFields {
        medicine_from_id: from.id,
        medicine_to_id: to.id,
        severity: req.severity.trim().to_string(),
        description: req.description.trim().to_string(),
        recommendation: req.recommendation(),
    }
}

fn detail(interaction: Interaction, from: Medicine, to: Medicine) -> InteractionDetail {
    InteractionDetail {
        interaction,
        medicine_from_name: from.name,
        medicine_to_name: to.name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::actor::Role;
    use crate::ledger::MemoryLedger;
    use crate::models::medicine::MedicineFields;

    fn admin() -> ActorContext {
        ActorContext::new(1, Role::Admin, "admin")
    }

    async fn three_medicines(ledger: &MemoryLedger) -> [i64; 3] {
        let mut tx = ledger.begin().await;
        let mut ids = [0; 3];
        for (i, name) in ["Warfarin", "Aspirin", "Ibuprofen"].iter().enumerate() {
            let f = MedicineFields { name: name.to_string(), category: "General".into(), ..Default::default() };
            ids[i] = tx.insert_medicine(&format!("MED-{}", 1001 + i), &f).await.unwrap().id;
        }
        tx.commit();
        ids
    }

    fn req(a: MedicineRef, b: MedicineRef) -> InteractionRequest {
        InteractionRequest {
            medicine1: a,
            medicine2: b,
            severity: "HIGH".into(),
            description: "Increased bleeding risk".into(),
            recommendation: Some("Avoid combination".into()),
        }
    }

    #[tokio::test]
    async fn reversed_pair_is_a_duplicate() {
        let ledger = MemoryLedger::new();
        let [w, a, _] = three_medicines(&ledger).await;
        let mut tx = ledger.begin().await;

        create_interaction(&mut tx, &admin(), &req(MedicineRef::Id(w), MedicineRef::Id(a))).await.unwrap();
        let err = create_interaction(&mut tx, &admin(), &req(MedicineRef::Name("Aspirin".into()), MedicineRef::Id(w)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_may_keep_its_own_pair_but_not_take_another() {
        let ledger = MemoryLedger::new();
        let [w, a, i] = three_medicines(&ledger).await;
        let mut tx = ledger.begin().await;

        let first = create_interaction(&mut tx, &admin(), &req(MedicineRef::Id(w), MedicineRef::Id(a))).await.unwrap();
        create_interaction(&mut tx, &admin(), &req(MedicineRef::Id(w), MedicineRef::Id(i))).await.unwrap();

        let id = first.interaction.id;
        let same = update_interaction(&mut tx, &admin(), id, &req(MedicineRef::Id(a), MedicineRef::Id(w))).await.unwrap();
        assert_eq!(same.medicine_from_name, "Aspirin");

        let err = update_interaction(&mut tx, &admin(), id, &req(MedicineRef::Id(i), MedicineRef::Id(w)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn self_interaction_and_non_admins_are_rejected() {
        let ledger = MemoryLedger::new();
        let [w, a, _] = three_medicines(&ledger).await;
        let mut tx = ledger.begin().await;

        let err = create_interaction(&mut tx, &admin(), &req(MedicineRef::Id(w), MedicineRef::Id(w))).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let manager = ActorContext::new(2, Role::InventoryManager, "stock");
        let err = create_interaction(&mut tx, &manager, &req(MedicineRef::Id(w), MedicineRef::Id(a))).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn check_finds_either_order() {
        let ledger = MemoryLedger::new();
        let [w, a, i] = three_medicines(&ledger).await;
        let mut tx = ledger.begin().await;
        create_interaction(&mut tx, &admin(), &req(MedicineRef::Id(w), MedicineRef::Id(a))).await.unwrap();

        let hit = check_interaction(
            &mut tx,
            &CheckInteractionRequest { medicine1: MedicineRef::Name("Aspirin".into()), medicine2: MedicineRef::Name("Warfarin".into()) },
        )
        .await
        .unwrap();
        assert!(hit.found);
        assert_eq!(hit.interaction.unwrap().medicine_from_name, "Warfarin");

        let miss = check_interaction(
            &mut tx,
            &CheckInteractionRequest { medicine1: MedicineRef::Id(a), medicine2: MedicineRef::Id(i) },
        )
        .await
        .unwrap();
        assert!(!miss.found);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let ledger = MemoryLedger::new();
        let mut tx = ledger.begin().await;
        assert!(matches!(delete_interaction(&mut tx, &admin(), 5).await, Err(AppError::NotFound(_))));
    }
}
