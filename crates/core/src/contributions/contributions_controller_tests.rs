//! Tests for the contribution list controller.

use async_trait::async_trait;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tokio::sync::{Notify, Semaphore};

use super::contributions_controller::*;
use super::contributions_model::{
    Contribution, ContributionFrequency, ContributionUpdate, NewContribution, PageSize,
    ValidContribution,
};
use super::contributions_traits::ContributionRepositoryTrait;
use crate::context::AppContext;
use crate::errors::{Error, Result, ValidationError};
use crate::notices::{MockNoticeSink, Notice};
use crate::test_support::{
    contribution, date, enseignes, session, MemoryStore, BANQUE_ID, BENEFICIARY_ID, LIVRET_A_ID,
    PEL_ID, USER_ID,
};

fn valid(amount: rust_decimal::Decimal) -> ValidContribution {
    ValidContribution {
        account_type_id: Some(LIVRET_A_ID.to_string()),
        enseigne_id: None,
        amount,
        frequency: ContributionFrequency::Monthly,
        start_date: date(2024, 3, 1),
        logo_url: None,
        beneficiary_id: None,
        is_shared: false,
    }
}

fn seeded() -> Vec<Contribution> {
    vec![
        contribution("a", "Livret A", dec!(50)),
        contribution("b", "PEL", dec!(100)),
        contribution("c", "Livret A", dec!(25)),
        contribution("d", "Assurance vie", dec!(200)),
    ]
}

fn seeded_controller(store: &MemoryStore, notices: &MockNoticeSink) -> ContributionListController {
    ContributionListController::with_contributions(store.context(notices), seeded())
}

fn ids(contributions: Vec<Contribution>) -> Vec<String> {
    contributions.into_iter().map(|c| c.id).collect()
}

// ==================== list / paginate ====================

#[test]
fn test_list_filters_on_account_type_case_insensitive() {
    let store = MemoryStore::new();
    let notices = MockNoticeSink::new();
    let controller = seeded_controller(&store, &notices);

    assert_eq!(ids(controller.list("livret")), vec!["a", "c"]);
    assert_eq!(ids(controller.list("  VIE ")), vec!["d"]);

    assert_eq!(controller.list("").len(), 4);
    assert!(controller.list("crypto").is_empty());
}

#[test]
fn test_paginate_slices_and_counts_pages() {
    let items: Vec<_> = (0..23)
        .map(|i| contribution(&format!("c{}", i), "Livret A", dec!(10)))
        .collect();

    let page = paginate(items.clone(), 3, PageSize::Count(10));
    assert_eq!(page.page_count, 3);
    assert_eq!(page.total, 23);
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.items[0].id, "c20");

    let page = paginate(items.clone(), 1, PageSize::All);
    assert_eq!(page.page_count, 1);
    assert_eq!(page.items.len(), 23);

    let page = paginate(items, 9, PageSize::Count(10));
    assert_eq!(page.page, 3);
}

#[test]
fn test_paginate_empty_list_has_one_page() {
    let page = paginate(Vec::new(), 1, PageSize::Count(10));
    assert_eq!(page.page_count, 1);
    assert_eq!(page.page, 1);
    assert!(page.items.is_empty());
}

#[test]
fn test_controller_paginates_filtered_list() {
    let store = MemoryStore::new();
    let notices = MockNoticeSink::new();
    let controller = seeded_controller(&store, &notices);

    let page = controller.paginate("livret", 2, PageSize::Count(1));
    assert_eq!(page.total, 2);
    assert_eq!(page.page_count, 2);
    assert_eq!(page.items[0].id, "c");
}

// ==================== load ====================

#[tokio::test]
async fn test_load_replaces_cache() {
    let store = MemoryStore::with_contributions(seeded());
    let notices = MockNoticeSink::new();
    let controller = ContributionListController::new(store.context(&notices));

    assert_eq!(controller.load().await.unwrap(), 4);
    assert_eq!(controller.contributions().len(), 4);
    assert_eq!(controller.enseignes(), enseignes());
}

// ==================== create ====================

#[tokio::test]
async fn test_create_appends_and_celebrates() {
    let store = MemoryStore::new();
    let notices = MockNoticeSink::new();
    let controller = seeded_controller(&store, &notices);
    controller.set_enseignes(enseignes());

    let mut payload = valid(dec!(75));
    payload.enseigne_id = Some(BANQUE_ID.to_string());
    let created = controller.create(payload).await.unwrap();

    assert_eq!(created.user_id, USER_ID);
    assert_eq!(
        created.organization_name.as_deref(),
        Some("Banque Populaire")
    );
    assert_eq!(
        created.logo_url.as_deref(),
        Some("https://cdn.example.com/bp.png")
    );

    let cached = controller.contributions();
    assert_eq!(cached.len(), 5);
    assert_eq!(cached.last().unwrap().id, created.id);
    assert_eq!(
        notices.notices(),
        vec![
            Notice::success(CONTRIBUTION_CREATED_MESSAGE),
            Notice::Celebration
        ]
    );
}

#[tokio::test]
async fn test_snapshot_is_not_a_live_join() {
    let store = MemoryStore::new();
    let notices = MockNoticeSink::new();
    let controller = ContributionListController::new(store.context(&notices));
    controller.set_enseignes(enseignes());

    let mut payload = valid(dec!(75));
    payload.enseigne_id = Some(BANQUE_ID.to_string());
    let created = controller.create(payload).await.unwrap();

    // Renaming the institution afterwards does not touch saved records.
    let mut renamed = enseignes();
    renamed[0].name = "BP Rives de Paris".to_string();
    controller.set_enseignes(renamed);

    let cached = controller.contributions();
    assert_eq!(cached[0].id, created.id);
    assert_eq!(
        cached[0].organization_name.as_deref(),
        Some("Banque Populaire")
    );
}

#[tokio::test]
async fn test_create_failure_relays_message_and_keeps_cache() {
    let store = MemoryStore::new();
    store.set_failure(Some("new row violates row-level security policy"));
    let notices = MockNoticeSink::new();
    let controller = seeded_controller(&store, &notices);

    let result = controller.create(valid(dec!(10))).await;

    assert!(matches!(result, Err(Error::Remote(_))));
    assert_eq!(controller.contributions().len(), 4);
    assert_eq!(
        notices.errors(),
        vec!["new row violates row-level security policy".to_string()]
    );
}

#[tokio::test]
async fn test_mutations_require_signed_in_user() {
    let store = MemoryStore::with_contributions(seeded());
    let notices = MockNoticeSink::new();
    let context =
        AppContext::new(None, Some(store.handle())).with_notices(Arc::new(notices.clone()));
    let controller = ContributionListController::with_contributions(context, seeded());

    assert!(matches!(
        controller.create(valid(dec!(10))).await,
        Err(Error::Unauthorized(_))
    ));
    assert!(matches!(
        controller.delete("a").await,
        Err(Error::Unauthorized(_))
    ));
    assert_eq!(controller.contributions().len(), 4);
    assert_eq!(store.contributions.lock().unwrap().len(), 4);
    assert_eq!(notices.errors().len(), 2);
}

#[tokio::test]
async fn test_mutations_require_store_handle() {
    let notices = MockNoticeSink::new();
    let context = AppContext::new(Some(session()), None).with_notices(Arc::new(notices.clone()));
    let controller = ContributionListController::with_contributions(context, seeded());

    let result = controller.update("a", valid(dec!(10))).await;
    assert!(matches!(result, Err(Error::Unauthorized(_))));
    assert_eq!(controller.contributions()[0].amount, dec!(50));
}

#[tokio::test]
async fn test_unknown_beneficiary_is_rejected() {
    let store = MemoryStore::new();
    let notices = MockNoticeSink::new();
    let controller = ContributionListController::new(store.context(&notices));
    controller.set_beneficiaries(Vec::new());

    let mut payload = valid(dec!(10));
    payload.beneficiary_id = Some(BENEFICIARY_ID.to_string());
    let result = controller.create(payload).await;

    assert!(matches!(
        result,
        Err(Error::Validation(ValidationError::Fields(ref f))) if f.contains("beneficiary_id")
    ));
    assert!(store.contributions.lock().unwrap().is_empty());
}

// ==================== update ====================

#[tokio::test]
async fn test_update_replaces_matching_record() {
    let store = MemoryStore::with_contributions(seeded());
    let notices = MockNoticeSink::new();
    let controller = seeded_controller(&store, &notices);

    let mut payload = valid(dec!(80));
    payload.account_type_id = Some(PEL_ID.to_string());
    payload.frequency = ContributionFrequency::Quarterly;
    let updated = controller.update("c", payload).await.unwrap();

    assert_eq!(updated.account_type_name(), "PEL");
    let cached = controller.contributions();
    assert_eq!(cached.len(), 4);
    assert_eq!(cached[2].id, "c");
    assert_eq!(cached[2].amount, dec!(80));
    assert_eq!(cached[2].frequency, ContributionFrequency::Quarterly);
    assert_eq!(cached[0].amount, dec!(50));
}

// ==================== delete ====================

#[tokio::test]
async fn test_delete_removes_only_matching_record() {
    let store = MemoryStore::with_contributions(seeded());
    let notices = MockNoticeSink::new();
    let controller = seeded_controller(&store, &notices);

    controller.delete("b").await.unwrap();

    assert_eq!(ids(controller.contributions()), vec!["a", "c", "d"]);
    assert_eq!(store.contributions.lock().unwrap().len(), 3);
    assert_eq!(
        notices.notices(),
        vec![Notice::success(CONTRIBUTION_DELETED_MESSAGE)]
    );
}

#[tokio::test]
async fn test_delete_failure_keeps_record() {
    let store = MemoryStore::with_contributions(seeded());
    store.set_failure(Some("network unreachable"));
    let notices = MockNoticeSink::new();
    let controller = seeded_controller(&store, &notices);

    assert!(controller.delete("b").await.is_err());
    assert_eq!(controller.contributions().len(), 4);
}

// ==================== concurrency guard ====================

/// Contribution repository whose inserts block until released.
struct GatedContributions {
    inner: MemoryStore,
    entered: Arc<Notify>,
    gate: Arc<Semaphore>,
}

#[async_trait]
impl ContributionRepositoryTrait for GatedContributions {
    async fn list(&self, owner_ids: &[String]) -> Result<Vec<Contribution>> {
        ContributionRepositoryTrait::list(&self.inner, owner_ids).await
    }

    async fn insert(&self, new_contribution: NewContribution) -> Result<Contribution> {
        self.entered.notify_one();
        let _permit = self.gate.acquire().await.unwrap();
        self.inner.insert(new_contribution).await
    }

    async fn update(&self, update: ContributionUpdate) -> Result<Contribution> {
        self.inner.update(update).await
    }

    async fn delete(&self, contribution_id: &str) -> Result<()> {
        self.inner.delete(contribution_id).await
    }
}

#[tokio::test]
async fn test_second_create_refused_while_first_in_flight() {
    let store = MemoryStore::new();
    let entered = Arc::new(Notify::new());
    let gate = Arc::new(Semaphore::new(0));
    let mut handle = store.handle();
    handle.contributions = Arc::new(GatedContributions {
        inner: store.clone(),
        entered: entered.clone(),
        gate: gate.clone(),
    });
    let notices = MockNoticeSink::new();
    let context =
        AppContext::new(Some(session()), Some(handle)).with_notices(Arc::new(notices.clone()));
    let controller = Arc::new(ContributionListController::new(context));

    let first = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.create(valid(dec!(10))).await })
    };
    entered.notified().await;

    let second = controller.create(valid(dec!(10))).await;
    assert!(matches!(second, Err(Error::Busy(_))));
    assert_eq!(
        notices.errors(),
        vec![MUTATION_IN_PROGRESS_MESSAGE.to_string()]
    );

    gate.add_permits(1);
    assert!(first.await.unwrap().is_ok());
    assert_eq!(controller.contributions().len(), 1);
}

#[tokio::test]
async fn test_guard_is_released_after_failure() {
    let store = MemoryStore::with_contributions(seeded());
    let notices = MockNoticeSink::new();
    let controller = seeded_controller(&store, &notices);

    store.set_failure(Some("timeout"));
    assert!(controller.delete("a").await.is_err());
    store.set_failure(None);
    assert!(controller.delete("a").await.is_ok());
}
