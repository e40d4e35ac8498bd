//! 网络拓扑管理
//!
//! `Network` 持有全部节点、链路、路由表、随机源和统计信息，节点和链路之间
//! 只通过下标互相引用。节点上的各个进程通过这里的方法推进。

use std::collections::BTreeMap;

use super::id::{LinkId, NodeId};
use super::link::{ChannelCounters, Link};
use super::node::{ForwardState, Generation, Node};
use super::packet::{ForkInfo, Packet, PacketKind};
use super::process::{Forwarder, Generator, QueueMonitor, Receiver};
use super::routing::RoutingTable;
use super::stats::{NodeStats, Stats, Summary};
use super::topology::Topology;
use crate::error::{Result, SimError};
use crate::queue::{SchedulingPolicy, Service};
use crate::sim::{LinkParams, ModelSpec, Rng, SimConfig, SimTime, Simulator, Wait};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

/// 网络拓扑
pub struct Network {
    name: Option<String>,
    topo: Topology,
    routing: RoutingTable,
    nodes: Vec<Node>,
    links: Vec<Link>,
    rng: Rng,
    next_pkt_id: u64,
    monitor_interval: SimTime,
    stats: Stats,
}

fn lookup_link_params<'a>(
    spec: &'a ModelSpec,
    ta: &str,
    tb: &str,
) -> Option<&'a LinkParams> {
    spec.link_params
        .get(&format!("{ta}-{tb}"))
        .or_else(|| spec.link_params.get(&format!("{tb}-{ta}")))
}

fn check_positive(component: &str, what: &str, v: f64) -> Result<()> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(SimError::config(
            component,
            format!("{what} must be a positive number, got {v}"),
        ))
    }
}

impl Network {
    /// 由模型描述构建网络：校验拓扑与参数、计算路由表、创建节点和链路。
    ///
    /// 任何错误都在调度第一个事件之前返回。
    #[tracing::instrument(skip_all, fields(model = spec.name.as_deref().unwrap_or("-"), seed = cfg.seed))]
    pub fn build(spec: &ModelSpec, cfg: &SimConfig) -> Result<Self> {
        check_positive("stats", "monitor interval", cfg.monitor_interval)?;
        let monitor_interval = SimTime::from_secs_f64(cfg.monitor_interval);
        if monitor_interval == SimTime::ZERO {
            return Err(SimError::config(
                "stats",
                "monitor interval is below the clock resolution",
            ));
        }

        let topo = Topology::build(&spec.edges, &spec.node_types)?;

        let mut nodes = Vec::with_capacity(topo.len());
        for (idx, name) in topo.names().iter().enumerate() {
            let id = NodeId(idx);
            let component = format!("node '{name}'");
            let node_type = spec
                .node_types
                .get(name)
                .ok_or_else(|| SimError::config(component.as_str(), "node does not have a type"))?;
            let params = spec.node_params.get(node_type).ok_or_else(|| {
                SimError::config(
                    component.as_str(),
                    format!("node type '{node_type}' does not have parameters"),
                )
            })?;

            check_positive(&component, "service rate", params.service_rate)?;
            check_positive(&component, "queue check interval", params.queue_check)?;
            let queue_check = SimTime::from_secs_f64(params.queue_check);
            if queue_check == SimTime::ZERO {
                return Err(SimError::config(
                    component.as_str(),
                    "queue check interval is below the clock resolution",
                ));
            }

            let generation = params
                .generation
                .as_ref()
                .map(|g| Generation::from_spec(g, name))
                .transpose()?;
            if matches!(generation, Some(Generation::Periodic { interval }) if interval == SimTime::ZERO)
                && params.limit.is_none()
            {
                return Err(SimError::config(
                    component.as_str(),
                    "a zero-interval periodic generator needs a limit",
                ));
            }
            let policy = SchedulingPolicy::from_spec(&params.policy, name)?;

            let destinations = match &params.destinations {
                Some(names) => names
                    .iter()
                    .map(|d| {
                        topo.id_of(d).ok_or_else(|| {
                            SimError::config(
                                component.as_str(),
                                format!("unknown destination node '{d}'"),
                            )
                        })
                    })
                    .filter(|d| !matches!(d, Ok(d) if *d == id))
                    .collect::<Result<Vec<_>>>()?,
                None => (0..topo.len()).map(NodeId).filter(|&d| d != id).collect(),
            };
            if generation.is_some() && destinations.is_empty() {
                return Err(SimError::config(
                    component.as_str(),
                    "traffic source has no destination",
                ));
            }

            nodes.push(Node {
                id,
                name: name.clone(),
                node_type: node_type.clone(),
                generation,
                limit: params.limit,
                destinations,
                service_rate: params.service_rate,
                queue_check,
                priority_levels: params.priority_levels.max(1),
                policy,
                queue: policy.make_queue(params.queue_cutoff),
                ports: BTreeMap::new(),
                state: ForwardState::Idle,
            });
        }

        let mut stats = Stats::new(topo.len());
        let mut links = Vec::with_capacity(topo.edges().len());
        for &(a, b) in topo.edges() {
            let (ta, tb) = (&nodes[a.0].node_type, &nodes[b.0].node_type);
            let component = format!("link '{}'-'{}'", topo.name_of(a), topo.name_of(b));
            let lp = lookup_link_params(spec, ta, tb).ok_or_else(|| {
                SimError::config(
                    component.as_str(),
                    format!("no parameters for link type '{ta}-{tb}'"),
                )
            })?;
            if lp.capacity == 0 {
                return Err(SimError::config(
                    component.as_str(),
                    "link capacity must be at least 1",
                ));
            }
            if !(lp.delay.is_finite() && lp.delay >= 0.0) {
                return Err(SimError::config(
                    component.as_str(),
                    format!("propagation delay must be non-negative, got {}", lp.delay),
                ));
            }

            let id = LinkId(links.len());
            let link = Link::new(id, a, b, SimTime::from_secs_f64(lp.delay), lp.capacity);
            for (from, to) in [(a, b), (b, a)] {
                if let Some(dir) = link.dir_from(from) {
                    nodes[from.0].ports.insert(to, (id, dir));
                }
                stats.add_neighbor(from, to);
            }
            links.push(link);
        }

        let routing = RoutingTable::build(&topo)?;

        info!(
            nodes = nodes.len(),
            links = links.len(),
            sources = nodes.iter().filter(|n| n.is_source()).count(),
            "🧩 网络构建完成"
        );

        Ok(Network {
            name: spec.name.clone(),
            topo,
            routing,
            nodes,
            links,
            rng: Rng::from_seed(cfg.seed),
            next_pkt_id: 0,
            monitor_interval,
            stats,
        })
    }

    /// 启动所有节点进程：每个邻居一个接收进程，流量源一个发包进程，
    /// 以及每个节点的转发进程和队列监控进程。
    pub fn start(&self, sim: &mut Simulator) {
        for node in &self.nodes {
            for from in node.neighbors() {
                sim.spawn(Receiver::new(node.id, from));
            }
            if let Some(generation) = node.generation {
                sim.spawn(Generator::new(node.id, generation, node.limit));
            }
            sim.spawn(Forwarder::new(node.id));
            sim.spawn(QueueMonitor::new(node.id, self.monitor_interval));
        }
        debug!(nodes = self.nodes.len(), "节点进程已启动");
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn topology(&self) -> &Topology {
        &self.topo
    }

    pub fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.topo.id_of(name)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub(crate) fn link_mut(&mut self, id: LinkId) -> &mut Link {
        &mut self.links[id.0]
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn summary(&self) -> Summary {
        self.stats.summary()
    }

    /// 创建数据包
    pub fn make_packet(&mut self, now: SimTime, src: NodeId, dst: NodeId) -> Packet {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        Packet::new(id, now, src, dst)
    }

    /// 把包放进节点队列；超过上限时转入丢弃账本。
    fn admit(&mut self, node: NodeId, pkt: Packet, now: SimTime) {
        let n = &mut self.nodes[node.0];
        if let Err(pkt) = n.queue.enqueue(pkt) {
            warn!(
                node = %n.name,
                pkt_id = pkt.id,
                cutoff = ?n.queue.cutoff(),
                "队列溢出，丢弃数据包"
            );
            self.stats.on_discarded(node, now, pkt);
        }
    }

    /// 从外部注入一个包：记入 generated 账本并放入节点队列。
    pub fn inject(&mut self, node: NodeId, pkt: Packet, now: SimTime) {
        self.stats.on_generated(node, now, &pkt);
        self.admit(node, pkt, now);
    }

    pub(crate) fn next_gap(&mut self, generation: &Generation) -> SimTime {
        generation.next_gap(&mut self.rng)
    }

    /// 发包进程的一次触发：生成一个包，fork-join 节点生成一个进程的全部线程。
    #[tracing::instrument(skip(self), fields(node_name = %self.nodes[node.0].name))]
    pub(crate) fn generate(&mut self, node: NodeId, now: SimTime) {
        let (dst, priority, kind, burst, fan_out) = {
            let n = &self.nodes[node.0];
            let dst = n.destinations[self.rng.index(n.destinations.len())];
            let priority = self.rng.between(1, n.priority_levels);
            let kind = n.policy.classify(&mut self.rng);
            let burst = self.rng.exp_time(n.service_rate);
            let fan_out = n.policy.fan_out(&mut self.rng);
            (dst, priority, kind, burst, fan_out)
        };

        match fan_out {
            None => {
                let pkt = self
                    .make_packet(now, node, dst)
                    .with_kind(kind)
                    .with_priority(priority)
                    .with_burst(burst);
                debug!(pkt_id = pkt.id, dst = ?dst, "生成数据包");
                self.inject(node, pkt, now);
            }
            Some(fan_out) => {
                let process_id = self.next_pkt_id;
                self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
                let fork = ForkInfo {
                    process_id,
                    created_at: now,
                    fan_out,
                };
                debug!(process_id, fan_out, dst = ?dst, "生成 fork-join 进程");
                for _ in 0..fan_out {
                    let mut pkt = self
                        .make_packet(now, node, dst)
                        .with_kind(PacketKind::Thread)
                        .with_priority(priority)
                        .with_burst(burst);
                    pkt.fork = Some(fork);
                    self.inject(node, pkt, now);
                }
            }
        }
    }

    /// 接收进程：取走链路上所有已到达的包放入节点队列，然后等待下一次到达。
    pub(crate) fn receive(&mut self, node: NodeId, from: NodeId, sim: &mut Simulator) -> Wait {
        let Some((link_id, out_dir)) = self.nodes[node.0].port(from) else {
            return Wait::Exit;
        };
        let dir = 1 - out_dir;
        loop {
            let Some(pkt) = self.links[link_id.0].get(dir, sim) else {
                return Wait::Signal(self.links[link_id.0].data_signal(dir));
            };
            self.stats.on_arrival(node, from);
            trace!(node = %self.nodes[node.0].name, pkt_id = pkt.id, "接收数据包");
            self.admit(node, pkt, sim.now());
        }
    }

    /// 转发进程的一步：推进状态机直到需要等待。
    pub(crate) fn forward_step(&mut self, node: NodeId, sim: &mut Simulator) -> Wait {
        loop {
            let state = std::mem::take(&mut self.nodes[node.0].state);
            match state {
                ForwardState::Idle => {
                    let n = &mut self.nodes[node.0];
                    let Some(pkt) = n.queue.dequeue() else {
                        return Wait::Timeout(n.queue_check);
                    };
                    let at_sink = pkt.dst == node;
                    let service = n.policy.plan(&pkt, at_sink, n.service_rate, &mut self.rng);
                    trace!(
                        node = %n.name,
                        pkt_id = pkt.id,
                        at_sink,
                        service = ?service,
                        "选中数据包"
                    );
                    let delay = service.time();
                    n.state = ForwardState::Servicing { pkt, service };
                    return Wait::Timeout(delay);
                }
                ForwardState::Servicing { pkt, service } => match service {
                    Service::Transit(_) => {
                        let Some(next_hop) = self.routing.next_hop(node, pkt.dst) else {
                            warn!(node = %self.nodes[node.0].name, pkt_id = pkt.id, "没有路由，丢弃数据包");
                            self.stats.on_discarded(node, sim.now(), pkt);
                            continue;
                        };
                        if let Err(wait) = self.send(node, pkt, next_hop, sim) {
                            return wait;
                        }
                    }
                    Service::Slice {
                        consumed, finished, ..
                    } => {
                        self.finish_slice(node, pkt, consumed, finished, sim.now());
                    }
                },
                ForwardState::Blocked { pkt, next_hop } => {
                    if let Err(wait) = self.send(node, pkt, next_hop, sim) {
                        return wait;
                    }
                }
            }
        }
    }

    /// 在目的地服务完一轮。
    fn finish_slice(
        &mut self,
        node: NodeId,
        mut pkt: Packet,
        consumed: SimTime,
        finished: bool,
        now: SimTime,
    ) {
        pkt.rounds = pkt.rounds.saturating_add(1);
        if !finished {
            pkt.remaining = pkt.remaining.saturating_sub(consumed);
            trace!(pkt_id = pkt.id, rounds = pkt.rounds, remaining = ?pkt.remaining, "本轮未完成，放回队尾");
            self.nodes[node.0].queue.requeue(pkt);
            return;
        }

        pkt.complete(now);
        debug!(
            node = %self.nodes[node.0].name,
            pkt_id = pkt.id,
            hops = pkt.hops,
            rounds = pkt.rounds,
            "✅ 数据包到达目的地"
        );
        if let Some(fork) = pkt.fork {
            if self.stats.on_thread_done(node, &fork, pkt.src, now) {
                debug!(process_id = fork.process_id, fan_out = fork.fan_out, "fork-join 进程汇合完成");
            }
        }
        self.stats.on_received(node, now, pkt);
    }

    /// 把包交给下一跳链路；链路满时保存为 Blocked 并返回要等待的信号。
    fn send(
        &mut self,
        from: NodeId,
        pkt: Packet,
        next_hop: NodeId,
        sim: &mut Simulator,
    ) -> std::result::Result<(), Wait> {
        let Some((link_id, dir)) = self.nodes[from.0].port(next_hop) else {
            warn!(node = %self.nodes[from.0].name, pkt_id = pkt.id, "下一跳不是邻居，丢弃数据包");
            self.stats.on_discarded(from, sim.now(), pkt);
            return Ok(());
        };
        let link = &mut self.links[link_id.0];
        if !link.has_room(dir) {
            trace!(node = %self.nodes[from.0].name, pkt_id = pkt.id, link_id = link_id.0, "链路已满，等待空位");
            let signal = link.space_signal(dir);
            self.nodes[from.0].state = ForwardState::Blocked { pkt, next_hop };
            return Err(Wait::Signal(signal));
        }

        let pkt = pkt.advance(next_hop);
        self.stats.on_forwarded(from, next_hop, sim.now(), &pkt);
        link.put(dir, pkt, sim);
        Ok(())
    }

    /// 采样节点队列长度
    pub(crate) fn sample_queue(&mut self, node: NodeId, now: SimTime) {
        let lengths = self.nodes[node.0].queue.lengths();
        self.stats.sample(node, now, lengths);
    }

    /// 汇总报告（用于 JSON 输出）
    pub fn report(&self, until: SimTime) -> Report<'_> {
        Report {
            model: self.name.as_deref(),
            until,
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeReport {
                    id: n.id,
                    name: &n.name,
                    node_type: &n.node_type,
                    policy: n.policy.name(),
                    stats: self.stats.node(n.id),
                })
                .collect(),
            links: self.links.iter().flat_map(|l| l.counters()).collect(),
            summary: self.summary(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NodeReport<'a> {
    pub id: NodeId,
    pub name: &'a str,
    pub node_type: &'a str,
    pub policy: &'static str,
    pub stats: &'a NodeStats,
}

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub model: Option<&'a str>,
    pub until: SimTime,
    pub nodes: Vec<NodeReport<'a>>,
    pub links: Vec<ChannelCounters>,
    pub summary: Summary,
}
