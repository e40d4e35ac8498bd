//! 节点进程
//!
//! 每个进程只保存所属节点的下标，真正的状态在 `Network` 的 arena 里。

use super::id::NodeId;
use super::net_world::NetWorld;
use super::network::Network;
use super::node::Generation;
use crate::sim::{Process, SimTime, Simulator, Wait, World};

fn net(world: &mut dyn World) -> &mut Network {
    &mut world
        .as_any_mut()
        .downcast_mut::<NetWorld>()
        .expect("world must be NetWorld")
        .net
}

/// 接收进程：每个邻居一个，等待链路上有包到达。
#[derive(Debug)]
pub struct Receiver {
    node: NodeId,
    from: NodeId,
}

impl Receiver {
    pub fn new(node: NodeId, from: NodeId) -> Self {
        Self { node, from }
    }
}

impl Process for Receiver {
    fn resume(&mut self, sim: &mut Simulator, world: &mut dyn World) -> Wait {
        net(world).receive(self.node, self.from, sim)
    }
}

/// 发包进程：等一个间隔，生成包，重复；达到 `limit` 后退出。
#[derive(Debug)]
pub struct Generator {
    node: NodeId,
    generation: Generation,
    limit: Option<u64>,
    fired: u64,
    waiting: bool,
}

impl Generator {
    pub fn new(node: NodeId, generation: Generation, limit: Option<u64>) -> Self {
        Self {
            node,
            generation,
            limit,
            fired: 0,
            waiting: false,
        }
    }
}

impl Process for Generator {
    fn resume(&mut self, sim: &mut Simulator, world: &mut dyn World) -> Wait {
        let net = net(world);
        if self.waiting {
            net.generate(self.node, sim.now());
            self.fired = self.fired.saturating_add(1);
        }
        if self.limit.is_some_and(|limit| self.fired >= limit) {
            return Wait::Exit;
        }
        self.waiting = true;
        Wait::Timeout(net.next_gap(&self.generation))
    }
}

/// 转发进程：节点容器的唯一消费者。
#[derive(Debug)]
pub struct Forwarder {
    node: NodeId,
}

impl Forwarder {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }
}

impl Process for Forwarder {
    fn resume(&mut self, sim: &mut Simulator, world: &mut dyn World) -> Wait {
        net(world).forward_step(self.node, sim)
    }
}

/// 队列监控：每隔 `interval` 采样一次队列长度（t=0 时先采一次）。
#[derive(Debug)]
pub struct QueueMonitor {
    node: NodeId,
    interval: SimTime,
}

impl QueueMonitor {
    pub fn new(node: NodeId, interval: SimTime) -> Self {
        Self { node, interval }
    }
}

impl Process for QueueMonitor {
    fn resume(&mut self, sim: &mut Simulator, world: &mut dyn World) -> Wait {
        net(world).sample_queue(self.node, sim.now());
        Wait::Timeout(self.interval)
    }
}
