//! Lifecycle scenarios against the SQLite store.

mod support;

use std::sync::Arc;

use chrono::Duration;
use rust_decimal_macros::dec;
use support::db::TempDb;
use tokio::sync::Barrier;
use vantedge::application::{LifecycleConfig, LifecycleManager, Transition};
use vantedge::domain::{
    aggregate, evaluate, DomainError, OddsObservation, OpportunityStatus, PriceEvaluation,
    Settlement, StakeConfig,
};
use vantedge::error::Error;
use vantedge::port::OpportunityStore;
use vantedge::testkit::{after_kickoff, before_kickoff, observation};

fn priced(batch: &[OddsObservation]) -> Vec<PriceEvaluation> {
    evaluate(&aggregate(batch), &StakeConfig::default()).evaluations
}

fn home(soft_odds: rust_decimal::Decimal) -> PriceEvaluation {
    priced(&[
        observation("pinnacle", true, "Home", dec!(2.00)),
        observation("bet9ja", false, "Home", soft_odds),
    ])
    .remove(0)
}

#[tokio::test]
async fn basic_detection_is_persisted() {
    let db = TempDb::create();
    let manager = LifecycleManager::new(db.store(), LifecycleConfig::default());

    let transition = manager.apply(&home(dec!(2.30)), before_kickoff()).await.unwrap();
    let Transition::Created { opportunity } = transition else {
        panic!("expected created");
    };
    assert_eq!(opportunity.edge_percent, dec!(15));
    assert!(opportunity.kelly_fraction > dec!(0.0288) && opportunity.kelly_fraction < dec!(0.0289));

    // Visible through an independent pool.
    let reopened = db.store();
    let stored = reopened.find_active(&opportunity.key()).await.unwrap().unwrap();
    assert_eq!(stored, opportunity);
}

#[tokio::test]
async fn below_threshold_creates_nothing() {
    let db = TempDb::create();
    let manager = LifecycleManager::new(db.store(), LifecycleConfig::default());

    // 2.04 vs 2.00 is a 2% edge.
    let transition = manager.apply(&home(dec!(2.04)), before_kickoff()).await.unwrap();
    assert_eq!(transition, Transition::Ignored);
    assert!(db.store().list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn odds_correction_closes_without_reopening() {
    let db = TempDb::create();
    let manager = LifecycleManager::new(db.store(), LifecycleConfig::default());
    manager.apply(&home(dec!(2.30)), before_kickoff()).await.unwrap();

    let later = before_kickoff() + Duration::minutes(15);
    let transition = manager.apply(&home(dec!(2.02)), later).await.unwrap();
    let Transition::OddsMoved { opportunity } = transition else {
        panic!("expected odds_moved");
    };
    assert_eq!(opportunity.expired_at, Some(later));

    let history = db.store().history(&opportunity.key()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, OpportunityStatus::OddsMoved);
    assert!(db.store().find_active(&opportunity.key()).await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_odds_are_skipped_and_batch_continues() {
    let db = TempDb::create();
    let manager = LifecycleManager::new(db.store(), LifecycleConfig::default());

    let batch = [
        observation("pinnacle", true, "Home", dec!(2.00)),
        observation("bet9ja", false, "Home", dec!(0.95)),
        observation("betking", false, "Home", dec!(2.30)),
    ];
    let aggregation = aggregate(&batch);
    assert_eq!(aggregation.stats.invalid_odds, 1);

    let evaluations = evaluate(&aggregation, &StakeConfig::default()).evaluations;
    assert_eq!(evaluations.len(), 1);
    let transition = manager.apply(&evaluations[0], before_kickoff()).await.unwrap();
    assert_eq!(transition.label(), "created");
}

#[tokio::test]
async fn invalid_settlement_leaves_record_unchanged() {
    let db = TempDb::create();
    let manager = LifecycleManager::new(db.store(), LifecycleConfig::default());
    manager.apply(&home(dec!(2.30)), before_kickoff()).await.unwrap();
    let moved = manager.apply(&home(dec!(2.02)), before_kickoff()).await.unwrap();
    let record = moved.opportunity().unwrap().clone();

    let err = manager
        .settle(&record.key(), Settlement::Won, before_kickoff())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Domain(DomainError::InvalidStateTransition {
            from: Some(OpportunityStatus::OddsMoved),
            to: OpportunityStatus::Won,
            ..
        })
    ));
    assert!(err.to_string().contains("odds_moved"));

    let stored = db.store().get(&record.id).await.unwrap().unwrap();
    assert_eq!(stored, record);
}

#[tokio::test]
async fn settlement_then_sweep() {
    let db = TempDb::create();
    let manager = LifecycleManager::new(db.store(), LifecycleConfig::default());
    let batch = [
        observation("pinnacle", true, "Home", dec!(2.00)),
        observation("bet9ja", false, "Home", dec!(2.30)),
        observation("betking", false, "Home", dec!(2.25)),
    ];
    let mut keys = Vec::new();
    for evaluation in priced(&batch) {
        let transition = manager.apply(&evaluation, before_kickoff()).await.unwrap();
        keys.push(transition.opportunity().unwrap().key());
    }

    let settled = manager
        .settle(&keys[0], Settlement::Lost, after_kickoff())
        .await
        .unwrap();
    assert_eq!(settled.status, OpportunityStatus::Lost);

    let sweep = manager.sweep_expired(after_kickoff()).await.unwrap();
    assert_eq!(sweep.failed, 0);
    let expired = sweep.expired;
    assert_eq!(expired.len(), 1);
    assert_eq!(expired[0].key(), keys[1]);
    assert!(db.store().list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn one_active_per_tuple_across_managers() {
    let db = TempDb::create();
    // Two managers share nothing but the database, like two processes.
    let first = LifecycleManager::new(db.store(), LifecycleConfig::default());
    let second = LifecycleManager::new(db.store(), LifecycleConfig::default());
    let evaluation = home(dec!(2.30));

    first.apply(&evaluation, before_kickoff()).await.unwrap();
    let result = second.apply(&evaluation, before_kickoff()).await;

    // The second manager sees the active record and refreshes it.
    assert_eq!(result.unwrap().label(), "refreshed");
    assert_eq!(db.store().list_active().await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_settlement_and_odds_move_do_not_lose_updates() {
    let db = TempDb::create();
    let manager = Arc::new(LifecycleManager::new(db.store(), LifecycleConfig::default()));
    let created = manager.apply(&home(dec!(2.30)), before_kickoff()).await.unwrap();
    let key = created.opportunity().unwrap().key();

    let barrier = Arc::new(Barrier::new(2));
    let settle = {
        let (manager, barrier, key) = (Arc::clone(&manager), Arc::clone(&barrier), key.clone());
        tokio::spawn(async move {
            barrier.wait().await;
            manager.settle(&key, Settlement::Won, before_kickoff()).await
        })
    };
    let moved = {
        let (manager, barrier) = (Arc::clone(&manager), Arc::clone(&barrier));
        let evaluation = home(dec!(2.02));
        tokio::spawn(async move {
            barrier.wait().await;
            manager.apply(&evaluation, before_kickoff()).await
        })
    };

    let settle = settle.await.unwrap();
    let moved = moved.await.unwrap().unwrap();

    let history = db.store().history(&key).await.unwrap();
    assert_eq!(history.len(), 1);
    match settle {
        // Settlement won the race: the odds move found nothing active.
        Ok(_) => {
            assert_eq!(moved, Transition::Ignored);
            assert_eq!(history[0].status, OpportunityStatus::Won);
        }
        // Odds move won: settlement is rejected, not silently applied.
        Err(Error::Domain(DomainError::InvalidStateTransition { .. })) => {
            assert_eq!(moved.label(), "odds_moved");
            assert_eq!(history[0].status, OpportunityStatus::OddsMoved);
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}
