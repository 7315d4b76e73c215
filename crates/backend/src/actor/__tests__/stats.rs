//! StatsActor scenario tests.

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use futures::future::join_all;

  use crate::actor::{
    __tests__::helpers::{STUCK_ACTOR, spawn_stats, wait_for},
    handle::SendError,
    message::StatsSnapshot,
  };

  #[tokio::test]
  async fn test_fresh_store_is_zero() {
    let (stats, _cancel) = spawn_stats();
    assert_eq!(stats.snapshot().await.unwrap(), StatsSnapshot::default());
  }

  #[tokio::test]
  async fn test_totals_accumulate() {
    let (stats, _cancel) = spawn_stats();

    stats.record(Duration::from_millis(10)).await.unwrap();
    stats.record(Duration::from_millis(30)).await.unwrap();

    let snapshot = stats.snapshot().await.unwrap();
    assert_eq!(snapshot.count, 2);
    assert_eq!(snapshot.total_latency_micros, 40_000);
    assert_eq!(snapshot.total_latency_micros / snapshot.count, 20_000);
  }

  #[tokio::test]
  async fn test_zero_latency_still_counts() {
    let (stats, _cancel) = spawn_stats();

    stats.record(Duration::ZERO).await.unwrap();

    let snapshot = stats.snapshot().await.unwrap();
    assert_eq!(snapshot.count, 1);
    assert_eq!(snapshot.total_latency_micros, 0);
  }

  #[tokio::test]
  async fn test_concurrent_records_are_all_counted() {
    let (stats, _cancel) = spawn_stats();

    let records = (0..200).map(|_| {
      let stats = stats.clone();
      async move { stats.record(Duration::from_micros(5)).await }
    });
    for result in tokio::time::timeout(STUCK_ACTOR, join_all(records)).await.expect("stats stuck") {
      result.unwrap();
    }

    let snapshot = stats.snapshot().await.unwrap();
    assert_eq!(snapshot.count, 200);
    assert_eq!(snapshot.total_latency_micros, 1_000);
  }

  #[tokio::test]
  async fn test_detached_records_arrive() {
    let (stats, _cancel) = spawn_stats();

    for _ in 0..3 {
      stats.record_detached(Duration::from_millis(1));
    }

    let handle = stats.clone();
    let arrived = wait_for(STUCK_ACTOR, || {
      let handle = handle.clone();
      async move { handle.snapshot().await.map(|s| s.count == 3).unwrap_or(false) }
    })
    .await;
    assert!(arrived, "detached records should land");
  }

  #[tokio::test]
  async fn test_totals_never_decrease() {
    let (stats, _cancel) = spawn_stats();

    let mut last = StatsSnapshot::default();
    for ms in [0, 5, 0, 12, 1] {
      stats.record(Duration::from_millis(ms)).await.unwrap();
      let now = stats.snapshot().await.unwrap();
      assert!(now.count > last.count);
      assert!(now.total_latency_micros >= last.total_latency_micros);
      last = now;
    }
  }

  #[tokio::test]
  async fn test_cancelled_stats_report_actor_gone() {
    let (stats, cancel) = spawn_stats();
    cancel.cancel();

    let handle = stats.clone();
    let gone = wait_for(STUCK_ACTOR, || {
      let handle = handle.clone();
      async move { matches!(handle.snapshot().await, Err(SendError::ActorGone)) }
    })
    .await;
    assert!(gone);
  }
}
