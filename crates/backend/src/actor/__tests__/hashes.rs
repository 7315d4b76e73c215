//! HashStoreActor scenario tests: id assignment, digests, lookups.

#[cfg(test)]
mod tests {
  use std::{collections::HashSet, time::Duration};

  use futures::future::join_all;
  use pretty_assertions::assert_eq;

  use crate::{
    actor::{
      HashStoreConfig,
      __tests__::helpers::{STUCK_ACTOR, StoreTestContext, wait_for},
      handle::SendError,
      lifecycle::ShutdownCause,
      message::{HashMessage, Reservation, ResolvedDigest},
    },
    digest,
  };

  const ANGRY_MONKEY: &str =
    "ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A+gf7Q==";

  // ==========================================================================
  // Id Assignment
  // ==========================================================================

  #[tokio::test]
  async fn test_first_id_is_one() {
    let ctx = StoreTestContext::immediate();
    assert_eq!(ctx.reserve_ok("first").await, 1);
  }

  #[tokio::test]
  async fn test_sequential_ids_increase_by_one() {
    let ctx = StoreTestContext::immediate();

    let mut ids = Vec::new();
    for i in 0..20 {
      ids.push(ctx.reserve_ok(&format!("password-{}", i)).await);
    }

    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
  }

  #[tokio::test]
  async fn test_concurrent_reservations_are_unique_and_gapless() {
    let ctx = StoreTestContext::immediate();

    let calls = (0..64).map(|i| {
      let handle = ctx.handle.clone();
      async move { handle.reserve(format!("concurrent-{}", i)).await }
    });
    let results = tokio::time::timeout(STUCK_ACTOR, join_all(calls)).await.expect("store stuck");

    let mut ids: Vec<u64> = results
      .into_iter()
      .map(|r| r.expect("store alive").id().expect("accepted"))
      .collect();
    ids.sort_unstable();

    assert_eq!(ids, (1..=64).collect::<Vec<u64>>());
  }

  #[tokio::test]
  async fn test_tiny_mailbox_applies_backpressure_without_losing_ids() {
    let ctx = StoreTestContext::with_config(HashStoreConfig {
      hash_delay: Duration::from_millis(5),
      mailbox_capacity: 1,
    });

    let calls = (0..32).map(|i| {
      let handle = ctx.handle.clone();
      tokio::spawn(async move { handle.reserve(format!("bp-{}", i)).await })
    });
    let results = tokio::time::timeout(STUCK_ACTOR, join_all(calls)).await.expect("store stuck");

    let ids: HashSet<u64> = results
      .into_iter()
      .map(|r| r.expect("task").expect("store alive").id().expect("accepted"))
      .collect();
    assert_eq!(ids, (1..=32).collect::<HashSet<u64>>());

    // Every delayed digest still lands
    let handle = ctx.handle.clone();
    let all_resolved = wait_for(STUCK_ACTOR, || {
      let handle = handle.clone();
      async move {
        for id in 1..=32 {
          if !matches!(handle.retrieve(id).await, Ok(Some(_))) {
            return false;
          }
        }
        true
      }
    })
    .await;
    assert!(all_resolved, "all 32 digests should resolve");
  }

  // ==========================================================================
  // Digests
  // ==========================================================================

  #[tokio::test]
  async fn test_round_trip_without_delay() {
    let ctx = StoreTestContext::immediate();

    let id = ctx.reserve_ok("angryMonkey").await;
    let digest = ctx.handle.retrieve(id).await.expect("store alive");

    assert_eq!(digest.as_deref(), Some(ANGRY_MONKEY));
  }

  #[tokio::test]
  async fn test_unknown_id_is_not_found() {
    let ctx = StoreTestContext::immediate();
    ctx.reserve_ok("something").await;

    assert_eq!(ctx.handle.retrieve(999).await.expect("store alive"), None);
    assert_eq!(ctx.handle.retrieve(0).await.expect("store alive"), None);
  }

  #[tokio::test]
  async fn test_pending_digest_looks_like_not_found() {
    let ctx = StoreTestContext::with_delay(Duration::from_millis(150));

    let id = ctx.reserve_ok("angryMonkey").await;
    assert_eq!(
      ctx.handle.retrieve(id).await.expect("store alive"),
      None,
      "digest must not be visible before the delay"
    );

    let handle = ctx.handle.clone();
    let resolved = wait_for(STUCK_ACTOR, || {
      let handle = handle.clone();
      async move { matches!(handle.retrieve(id).await, Ok(Some(_))) }
    })
    .await;
    assert!(resolved, "digest should appear after the delay");
    assert_eq!(ctx.handle.retrieve(id).await.expect("store alive").as_deref(), Some(ANGRY_MONKEY));
  }

  #[tokio::test]
  async fn test_reservation_does_not_wait_for_digest() {
    let ctx = StoreTestContext::with_delay(Duration::from_secs(30));

    let started = tokio::time::Instant::now();
    let id = ctx.reserve_ok("slow").await;
    assert_eq!(id, 1);
    assert!(started.elapsed() < Duration::from_secs(1));
  }

  #[tokio::test]
  async fn test_each_id_gets_its_own_digest() {
    let ctx = StoreTestContext::immediate();

    let a = ctx.reserve_ok("alpha").await;
    let b = ctx.reserve_ok("beta").await;

    assert_eq!(ctx.handle.retrieve(a).await.unwrap(), Some(digest::encode("alpha")));
    assert_eq!(ctx.handle.retrieve(b).await.unwrap(), Some(digest::encode("beta")));
  }

  // ==========================================================================
  // Protocol Violations
  // ==========================================================================

  #[tokio::test]
  async fn test_duplicate_merge_kills_the_store() {
    let mut ctx = StoreTestContext::immediate();
    let id = ctx.reserve_ok("once").await;

    ctx
      .handle
      .sender()
      .send(HashMessage::Merge(ResolvedDigest::compute(id, "twice")))
      .await
      .expect("mailbox open");

    let after = tokio::time::timeout(STUCK_ACTOR, ctx.handle.reserve("next")).await.expect("store stuck");
    assert!(matches!(after, Err(SendError::ActorGone)));

    let cause = tokio::time::timeout(STUCK_ACTOR, &mut ctx.listener).await.expect("listener stuck");
    assert_eq!(cause, ShutdownCause::StoreGone);
  }

  #[tokio::test]
  async fn test_merge_for_unreserved_id_kills_the_store() {
    let ctx = StoreTestContext::immediate();

    ctx
      .handle
      .sender()
      .send(HashMessage::Merge(ResolvedDigest::compute(42, "never reserved")))
      .await
      .expect("mailbox open");

    let after = tokio::time::timeout(STUCK_ACTOR, ctx.handle.retrieve(42)).await.expect("store stuck");
    assert!(matches!(after, Err(SendError::ActorGone)));
  }

  // ==========================================================================
  // Actor Lifecycle
  // ==========================================================================

  #[tokio::test]
  async fn test_cancelled_store_reports_actor_gone() {
    let mut ctx = StoreTestContext::immediate();
    ctx.reserve_ok("before").await;

    ctx.cancel.cancel();

    let handle = ctx.handle.clone();
    let gone = wait_for(STUCK_ACTOR, || {
      let handle = handle.clone();
      async move { matches!(handle.reserve("after").await, Err(SendError::ActorGone)) }
    })
    .await;
    assert!(gone, "cancelled store should stop answering");

    let cause = tokio::time::timeout(STUCK_ACTOR, &mut ctx.listener).await.expect("listener stuck");
    assert_eq!(cause, ShutdownCause::StoreGone);
  }

  #[test]
  fn test_reservation_value_helpers() {
    assert_eq!(Reservation::Accepted(3).id(), Some(3));
    assert_eq!(Reservation::Rejected.id(), None);
  }
}
