/*
    Replica convergence tests

    Multi-replica scenarios driven through the loopback hub: increments
    land on different replicas, state moves by push and by read-time
    pull, and every replica must end up reporting the same total. Also
    covers conservation (no increment lost, none double counted) and
    reads that keep working through a peer outage.
*/

use crate::catalog::{StaticCatalog, VideoCatalog};
use crate::test_utils::LoopbackHub;
use std::sync::Arc;
use std::time::Duration;

const VIDEO: u64 = 29;

fn catalog() -> Arc<dyn VideoCatalog> {
    Arc::new(StaticCatalog::from_ids([VIDEO]))
}

#[tokio::test]
async fn test_push_delivers_increment_to_peer() {
    let hub = LoopbackHub::new();
    let r1 = hub.service("replica-1", &["replica-2"], catalog()).await;
    // replica-2 has no peers, so its reads reflect only what was
    // pushed to it
    let r2 = hub.service("replica-2", &[], catalog()).await;

    r1.record_view(VIDEO).await.unwrap();
    r1.flush_pushes().await;

    // The increment also schedules a background flush; wait for
    // whichever flush wins to land on replica-2
    let mut total = 0;
    for _ in 0..100 {
        total = r2.merged_total(VIDEO).await.unwrap();
        if total == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_concurrent_writes_converge_on_both_replicas() {
    let hub = LoopbackHub::new();
    let r1 = hub.service("replica-1", &["replica-2"], catalog()).await;
    let r2 = hub.service("replica-2", &["replica-1"], catalog()).await;

    // One view lands first, then five more on one replica and three
    // on the other
    r1.record_view(VIDEO).await.unwrap();
    for _ in 0..5 {
        r1.record_view(VIDEO).await.unwrap();
    }
    for _ in 0..3 {
        r2.record_view(VIDEO).await.unwrap();
    }

    // Read-time pull merges the other replica's entries in, so both
    // sides answer with the same total
    assert_eq!(r1.merged_total(VIDEO).await.unwrap(), 9);
    assert_eq!(r2.merged_total(VIDEO).await.unwrap(), 9);
}

#[tokio::test]
async fn test_load_balanced_writes_produce_equal_totals() {
    let hub = LoopbackHub::new();
    let r1 = hub.service("replica-1", &["replica-2"], catalog()).await;
    let r2 = hub.service("replica-2", &["replica-1"], catalog()).await;

    // Twenty views spread across both replicas, as a round-robin load
    // balancer would
    for i in 0..20 {
        if i % 2 == 0 {
            r1.record_view(VIDEO).await.unwrap();
        } else {
            r2.record_view(VIDEO).await.unwrap();
        }
    }

    let total_r1 = r1.merged_total(VIDEO).await.unwrap();
    let total_r2 = r2.merged_total(VIDEO).await.unwrap();
    assert_eq!(total_r1, 20);
    assert_eq!(total_r1, total_r2);
}

#[tokio::test]
async fn test_conservation_of_increments() {
    let hub = LoopbackHub::new();
    let r1 = hub.service("replica-1", &["replica-2"], catalog()).await;
    let r2 = hub.service("replica-2", &["replica-1"], catalog()).await;

    for _ in 0..7 {
        r1.record_view(VIDEO).await.unwrap();
    }
    for _ in 0..11 {
        r2.record_view(VIDEO).await.unwrap();
    }

    // Repeated sync never double counts and never drops: the merged
    // total is exactly the sum of per-replica increments
    for _ in 0..3 {
        assert_eq!(r1.merged_total(VIDEO).await.unwrap(), 18);
        assert_eq!(r2.merged_total(VIDEO).await.unwrap(), 18);
    }
}

#[tokio::test]
async fn test_reads_survive_partition_then_converge() {
    let hub = LoopbackHub::new();
    let r1 = hub.service("replica-1", &["replica-2"], catalog()).await;
    let r2 = hub.service("replica-2", &["replica-1"], catalog()).await;

    hub.set_down("replica-2", true).await;

    // Writes and reads on replica-1 keep working while its peer is
    // unreachable; it just answers from local state
    for _ in 0..4 {
        r1.record_view(VIDEO).await.unwrap();
    }
    assert_eq!(r1.merged_total(VIDEO).await.unwrap(), 4);

    // Replica-2 kept accepting its own writes on the other side of
    // the partition
    hub.set_down("replica-1", true).await;
    for _ in 0..2 {
        r2.record_view(VIDEO).await.unwrap();
    }

    // Partition heals; the next reads reconcile both sides
    hub.set_down("replica-1", false).await;
    hub.set_down("replica-2", false).await;
    assert_eq!(r1.merged_total(VIDEO).await.unwrap(), 6);
    assert_eq!(r2.merged_total(VIDEO).await.unwrap(), 6);
}

#[tokio::test]
async fn test_totals_never_decrease_across_reads() {
    let hub = LoopbackHub::new();
    let r1 = hub.service("replica-1", &["replica-2"], catalog()).await;
    let r2 = hub.service("replica-2", &["replica-1"], catalog()).await;

    let mut last = 0;
    for round in 0..10 {
        if round % 3 == 0 {
            r2.record_view(VIDEO).await.unwrap();
        } else {
            r1.record_view(VIDEO).await.unwrap();
        }

        let total = r1.merged_total(VIDEO).await.unwrap();
        assert!(total >= last, "total went backwards {} -> {}", last, total);
        last = total;
    }
    assert_eq!(last, 10);
}
