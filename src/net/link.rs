//! 链路类型
//!
//! 一条无向边对应一条链路，两个方向各有独立的缓冲。每个方向最多容纳
//! `capacity` 个已发出但尚未被接收端取走的包；满了之后发送方必须等待（背压）。

use std::collections::VecDeque;

use serde::Serialize;

use super::id::{LinkId, NodeId};
use super::net_world::NetWorld;
use super::packet::Packet;
use crate::sim::{Event, Signal, SimTime, Simulator, World};
use tracing::trace;

/// 链路的一个方向
#[derive(Debug)]
pub struct Channel {
    pub from: NodeId,
    pub to: NodeId,
    /// 已接纳但接收端尚未取走的包数（在途 + 待取）
    occupied: usize,
    /// 已到达、等待接收进程取走的包
    ready: VecDeque<Packet>,
    pub sent: u64,
    pub received: u64,
}

impl Channel {
    fn new(from: NodeId, to: NodeId) -> Self {
        Self {
            from,
            to,
            occupied: 0,
            ready: VecDeque::new(),
            sent: 0,
            received: 0,
        }
    }

    pub fn occupied(&self) -> usize {
        self.occupied
    }
}

/// 网络链路
#[derive(Debug)]
pub struct Link {
    pub id: LinkId,
    pub delay: SimTime,
    pub capacity: usize,
    dirs: [Channel; 2],
}

/// 某个方向的计数快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelCounters {
    pub from: NodeId,
    pub to: NodeId,
    pub sent: u64,
    pub received: u64,
}

impl Link {
    /// 创建新链路（a <-> b）
    pub fn new(id: LinkId, a: NodeId, b: NodeId, delay: SimTime, capacity: usize) -> Self {
        Self {
            id,
            delay,
            capacity,
            dirs: [Channel::new(a, b), Channel::new(b, a)],
        }
    }

    /// 从 `from` 发出的方向下标
    pub fn dir_from(&self, from: NodeId) -> Option<usize> {
        self.dirs.iter().position(|c| c.from == from)
    }

    pub fn channel(&self, dir: usize) -> &Channel {
        &self.dirs[dir]
    }

    /// 接收端等待“有包可取”的信号
    pub fn data_signal(&self, dir: usize) -> Signal {
        Signal(((self.id.0 as u64) << 2) | ((dir as u64) << 1))
    }

    /// 发送端等待“有空位”的信号
    pub fn space_signal(&self, dir: usize) -> Signal {
        Signal(self.data_signal(dir).0 | 1)
    }

    pub fn has_room(&self, dir: usize) -> bool {
        self.dirs[dir].occupied < self.capacity
    }

    /// 把包放上链路；传播时延之后到达接收端。调用方须先用 `has_room` 检查。
    pub fn put(&mut self, dir: usize, pkt: Packet, sim: &mut Simulator) {
        let ch = &mut self.dirs[dir];
        ch.occupied = ch.occupied.saturating_add(1);
        ch.sent = ch.sent.saturating_add(1);
        trace!(
            link_id = self.id.0,
            from = ?ch.from,
            to = ?ch.to,
            occupied = ch.occupied,
            pkt_id = pkt.id,
            "包进入链路"
        );
        sim.schedule_in(
            self.delay,
            LinkDeliver {
                link: self.id,
                dir,
                pkt,
            },
        );
    }

    fn deliver(&mut self, dir: usize, pkt: Packet, sim: &mut Simulator) {
        self.dirs[dir].ready.push_back(pkt);
        sim.notify(self.data_signal(dir));
    }

    /// 接收端取走下一个已到达的包，并释放一个缓冲位
    pub fn get(&mut self, dir: usize, sim: &mut Simulator) -> Option<Packet> {
        let ch = &mut self.dirs[dir];
        let pkt = ch.ready.pop_front()?;
        ch.occupied = ch.occupied.saturating_sub(1);
        ch.received = ch.received.saturating_add(1);
        sim.notify(self.space_signal(dir));
        Some(pkt)
    }

    pub fn counters(&self) -> [ChannelCounters; 2] {
        self.dirs.each_ref().map(|c| ChannelCounters {
            from: c.from,
            to: c.to,
            sent: c.sent,
            received: c.received,
        })
    }
}

/// 事件：传播时延结束，包到达链路接收端的缓冲。
#[derive(Debug)]
pub struct LinkDeliver {
    pub link: LinkId,
    pub dir: usize,
    pub pkt: Packet,
}

impl Event for LinkDeliver {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let LinkDeliver { link, dir, pkt } = *self;
        trace!(link_id = link.0, dir, pkt_id = pkt.id, now = ?sim.now(), "包到达链路末端");
        let w = world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld");
        w.net.link_mut(link).deliver(dir, pkt, sim);
    }
}
