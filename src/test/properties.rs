use std::collections::{BTreeMap, HashSet};

use serde_json::{Value, json};

use super::{run, spec};
use crate::net::{NetWorld, NodeId, PacketKind};
use crate::sim::{ModelSpec, SimTime};

/// 4 节点带一条对角线的环，所有节点都是 Poisson 流量源。
fn mesh(policy: Value, extra: Value) -> ModelSpec {
    let mut host = json!({
        "generation": { "mode": "poisson", "value": 20.0 },
        "service_rate": 200.0,
        "queue_check": 0.001,
        "policy": policy
    });
    if let (Some(host), Some(extra)) = (host.as_object_mut(), extra.as_object()) {
        host.extend(extra.clone());
    }
    spec(json!({
        "name": "mesh",
        "edges": [["1", "2"], ["2", "3"], ["3", "4"], ["4", "1"], ["2", "4"]],
        "node_types": { "1": "host", "2": "host", "3": "host", "4": "host" },
        "node_params": { "host": host },
        "link_params": { "host-host": { "capacity": 5, "delay": 0.005 } }
    }))
}

fn nodes(world: &NetWorld) -> impl Iterator<Item = NodeId> + '_ {
    world.net.nodes().iter().map(|n| n.id)
}

#[test]
fn delivered_packets_travel_shortest_paths() {
    let spec = mesh(json!({ "kind": "fcfs" }), json!({}));
    let (_sim, world) = run(&spec, 3, SimTime::from_secs(5));
    let routing = world.net.routing();

    let mut delivered = 0;
    for node in nodes(&world) {
        for e in &world.net.stats().node(node).received {
            assert_eq!(e.pkt.dst, node);
            assert_eq!(Some(e.pkt.hops), routing.hops(e.pkt.src, e.pkt.dst), "{:?}", e.pkt);
            delivered += 1;
        }
    }
    assert!(delivered > 100, "only {delivered} packets delivered");
}

#[test]
fn round_robin_rounds_account_for_the_whole_burst() {
    let quantum = SimTime::from_secs_f64(0.002);
    let spec = mesh(json!({ "kind": "round_robin", "quantum": 0.002 }), json!({}));
    let (_sim, world) = run(&spec, 5, SimTime::from_secs(5));

    let mut multi_round = 0;
    for node in nodes(&world) {
        for e in &world.net.stats().node(node).received {
            let p = &e.pkt;
            assert!(p.rounds >= 1);
            assert!(p.remaining <= quantum, "{p:?}");
            let sliced = SimTime(quantum.0 * u64::from(p.rounds - 1));
            assert_eq!(sliced.saturating_add(p.remaining), p.burst, "{p:?}");
            if p.rounds > 1 {
                multi_round += 1;
            }
        }
    }
    assert!(multi_round > 0);
}

#[test]
fn fork_join_completes_exactly_when_all_threads_finish() {
    let spec = mesh(
        json!({ "kind": "fork_join", "quantum": 0.002, "success_p": 0.5 }),
        json!({}),
    );
    let (_sim, world) = run(&spec, 11, SimTime::from_secs(5));
    let stats = world.net.stats();

    // 每个线程只属于一个进程，进程的线程数等于抽样扇出
    let mut thread_ids = HashSet::new();
    let mut threads_of: BTreeMap<u64, (u32, u32)> = BTreeMap::new();
    for node in nodes(&world) {
        for e in &stats.node(node).generated {
            assert_eq!(e.pkt.kind, PacketKind::Thread);
            let fork = e.pkt.fork.expect("thread carries its process");
            assert!(thread_ids.insert(e.pkt.id), "thread {} generated twice", e.pkt.id);
            let slot = threads_of.entry(fork.process_id).or_insert((fork.fan_out, 0));
            assert_eq!(slot.0, fork.fan_out);
            slot.1 += 1;
        }
    }
    assert!(threads_of.values().all(|&(fan_out, n)| fan_out == n));
    assert!(threads_of.values().any(|&(fan_out, _)| fan_out > 1));

    let mut completed = 0;
    for node in nodes(&world) {
        let s = stats.node(node);
        for rec in s.processes.values() {
            assert!(rec.completed <= rec.fan_out);
            assert_eq!(rec.service_time.is_some(), rec.completed == rec.fan_out, "{rec:?}");
            if let (Some(done), Some(service)) = (rec.done_at, rec.service_time) {
                assert_eq!(done.saturating_sub(rec.created_at), service);
                completed += 1;
            }
        }
        let finished_threads: u32 = s.processes.values().map(|r| r.completed).sum();
        let received_threads = s
            .received
            .iter()
            .filter(|e| e.pkt.kind == PacketKind::Thread)
            .count();
        assert_eq!(finished_threads as usize, received_threads);
    }
    assert!(completed > 0);
    assert_eq!(world.net.summary().completed_processes, completed);
}

#[test]
fn received_plus_discarded_never_exceeds_generated() {
    let spec = mesh(json!({ "kind": "fcfs" }), json!({ "queue_cutoff": 1 }));
    let (_sim, world) = run(&spec, 2, SimTime::from_secs(3));
    let s = world.net.summary();
    assert!(s.discarded > 0, "cutoff 1 should force overflow");
    assert!(s.received + s.discarded <= s.generated, "{s:?}");
    assert!(s.recv <= s.sent);
}

#[test]
fn bounded_sources_drain_completely() {
    let spec = mesh(json!({ "kind": "fcfs" }), json!({ "limit": 5 }));
    let (_sim, world) = run(&spec, 4, SimTime::from_secs(50));
    let s = world.net.summary();
    assert_eq!(s.generated, 20);
    assert_eq!(s.discarded, 0);
    assert_eq!(s.received, s.generated);
    assert_eq!(s.recv, s.sent);
    assert_eq!(s.throughput, Some(1.0));

    let link_sent: u64 = world.net.links().iter().flat_map(|l| l.counters()).map(|c| c.sent).sum();
    assert_eq!(link_sent, s.sent);
}

fn report_json(spec: &ModelSpec, seed: u64) -> String {
    let until = SimTime::from_secs(2);
    let (_sim, world) = run(spec, seed, until);
    serde_json::to_string(&world.net.report(until)).expect("report serialises")
}

#[test]
fn same_seed_gives_byte_identical_reports() {
    let spec = mesh(
        json!({ "kind": "batch_interactive", "quantum": 0.002 }),
        json!({ "queue_cutoff": 4, "priority_levels": 3 }),
    );
    let a = report_json(&spec, 9);
    let b = report_json(&spec, 9);
    assert_eq!(a, b);

    let c = report_json(&spec, 10);
    assert_ne!(a, c);
}
