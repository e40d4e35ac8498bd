use serde_json::{Value, json};

use super::{run, spec};
use crate::net::NetWorld;
use crate::sim::{ModelSpec, SimConfig, SimTime, Simulator};

/// 单节点模型：没有边，也没有流量源，包由测试直接注入。
fn single(params: Value) -> ModelSpec {
    spec(json!({
        "edges": [],
        "node_types": { "n": "cpu" },
        "node_params": { "cpu": params }
    }))
}

fn setup(spec: &ModelSpec) -> (Simulator, NetWorld) {
    let mut sim = Simulator::default();
    let world = NetWorld::setup(spec, &SimConfig::default(), &mut sim).expect("network builds");
    (sim, world)
}

#[test]
fn one_packet_crosses_one_link() {
    let spec = spec(json!({
        "edges": [["1", "2"]],
        "node_types": { "1": "user", "2": "server" },
        "node_params": {
            "user": {
                "generation": { "mode": "periodic", "value": 0.0 },
                "limit": 1,
                "destinations": ["2"],
                "service_rate": 1e9,
                "queue_check": 0.0001
            },
            "server": { "service_rate": 1e9, "queue_check": 0.0001 }
        },
        "link_params": { "user-server": { "capacity": 1, "delay": 1.0 } }
    }));
    let (_sim, world) = run(&spec, 0, SimTime::from_secs(2));
    let n1 = world.net.node_id("1").expect("node 1");
    let n2 = world.net.node_id("2").expect("node 2");
    let stats = world.net.stats();

    assert_eq!(stats.node(n1).generated.len(), 1);
    assert_eq!(stats.node(n1).generated[0].at, SimTime::ZERO);
    assert_eq!(stats.node(n1).forwarded.len(), 1);

    let received = &stats.node(n2).received;
    assert_eq!(received.len(), 1);
    let entry = &received[0];
    let at = entry.at.as_secs_f64();
    assert!((1.0..1.001).contains(&at), "received at {at}");
    assert_eq!(entry.pkt.hops, 1);
    assert_eq!(entry.pkt.src, n1);
    assert_eq!(entry.pkt.dst, n2);
    assert_eq!(entry.pkt.done_at, Some(entry.at));

    assert_eq!(stats.node(n1).sent[&n2], 1);
    assert_eq!(stats.node(n2).recv[&n1], 1);
    let summary = world.net.summary();
    assert_eq!(summary.throughput, Some(1.0));
}

#[test]
fn priority_node_serves_higher_priority_first() {
    let spec = single(json!({
        "service_rate": 1000.0,
        "queue_check": 0.001,
        "policy": { "kind": "priority" },
        "priority_levels": 5
    }));
    let (mut sim, mut world) = setup(&spec);
    let n = world.net.node_id("n").expect("node n");
    for prio in [1, 5] {
        let pkt = world.net.make_packet(SimTime::ZERO, n, n).with_priority(prio);
        world.net.inject(n, pkt, SimTime::ZERO);
    }
    sim.run_until(SimTime::from_secs(1), &mut world);

    let received = &world.net.stats().node(n).received;
    let order: Vec<u8> = received.iter().map(|e| e.pkt.priority).collect();
    assert_eq!(order, [5, 1]);
}

#[test]
fn round_robin_burst_of_three_quanta_takes_three_rounds() {
    let spec = single(json!({
        "service_rate": 1.0,
        "queue_check": 0.001,
        "policy": { "kind": "round_robin", "quantum": 1.0 }
    }));
    let (mut sim, mut world) = setup(&spec);
    let n = world.net.node_id("n").expect("node n");
    let pkt = world
        .net
        .make_packet(SimTime::ZERO, n, n)
        .with_burst(SimTime::from_secs(3));
    world.net.inject(n, pkt, SimTime::ZERO);
    sim.run_until(SimTime::from_secs(10), &mut world);

    let received = &world.net.stats().node(n).received;
    assert_eq!(received.len(), 1);
    let entry = &received[0];
    assert_eq!(entry.pkt.rounds, 3);
    assert_eq!(entry.at, SimTime::from_secs(3));
    assert_eq!(entry.pkt.remaining, SimTime::from_secs(1));
    assert_eq!(entry.pkt.service_time, Some(SimTime::from_secs(3)));
}

#[test]
fn round_robin_puts_unfinished_packets_behind_waiting_ones() {
    let spec = single(json!({
        "service_rate": 1.0,
        "queue_check": 0.001,
        "policy": { "kind": "round_robin", "quantum": 1.0 }
    }));
    let (mut sim, mut world) = setup(&spec);
    let n = world.net.node_id("n").expect("node n");
    let long = world
        .net
        .make_packet(SimTime::ZERO, n, n)
        .with_burst(SimTime::from_secs(2));
    let short = world
        .net
        .make_packet(SimTime::ZERO, n, n)
        .with_burst(SimTime::from_millis(500));
    let (long_id, short_id) = (long.id, short.id);
    world.net.inject(n, long, SimTime::ZERO);
    world.net.inject(n, short, SimTime::ZERO);
    sim.run_until(SimTime::from_secs(10), &mut world);

    let done: Vec<(u64, SimTime, u32)> = world
        .net
        .stats()
        .node(n)
        .received
        .iter()
        .map(|e| (e.pkt.id, e.at, e.pkt.rounds))
        .collect();
    assert_eq!(
        done,
        [
            (short_id, SimTime::from_millis(1500), 1),
            (long_id, SimTime::from_millis(2500), 2),
        ]
    );
}

#[test]
fn overflow_goes_to_discarded_ledger() {
    let spec = single(json!({
        "service_rate": 1000.0,
        "queue_check": 0.001,
        "queue_cutoff": 2
    }));
    let (mut sim, mut world) = setup(&spec);
    let n = world.net.node_id("n").expect("node n");
    let mut ids = Vec::new();
    for _ in 0..5 {
        let pkt = world.net.make_packet(SimTime::ZERO, n, n);
        ids.push(pkt.id);
        world.net.inject(n, pkt, SimTime::ZERO);
    }
    sim.run_until(SimTime::from_secs(1), &mut world);

    let stats = world.net.stats().node(n);
    assert_eq!(stats.generated.len(), 5);
    let discarded: Vec<u64> = stats.discarded.iter().map(|e| e.pkt.id).collect();
    assert_eq!(discarded, ids[2..]);
    assert!(stats.discarded.iter().all(|e| e.at == SimTime::ZERO));
    let received: Vec<u64> = stats.received.iter().map(|e| e.pkt.id).collect();
    assert_eq!(received, ids[..2]);
}

#[test]
fn queue_monitor_samples_every_interval_including_time_zero() {
    let spec = single(json!({
        "service_rate": 1.0,
        "queue_check": 0.001,
        "policy": { "kind": "batch_interactive", "quantum": 0.5 }
    }));
    let (mut sim, mut world) = setup(&spec);
    let n = world.net.node_id("n").expect("node n");
    sim.run_until(SimTime::from_secs_f64(0.01), &mut world);

    let series = &world.net.stats().node(n).queue;
    assert_eq!(series.len(), 11);
    assert_eq!(series[0].at, SimTime::ZERO);
    assert_eq!(series[10].at, SimTime::from_millis(10));
    assert!(series.iter().all(|s| s.lengths.len() == 2 && s.total() == 0));
}

#[test]
fn run_ends_at_horizon_with_events_still_pending() {
    let spec = single(json!({ "service_rate": 1.0, "queue_check": 0.001 }));
    let (sim, _world) = run(&spec, 0, SimTime::from_secs_f64(0.5));
    assert_eq!(sim.now(), SimTime::from_millis(500));
    assert!(sim.pending() > 0);
}
