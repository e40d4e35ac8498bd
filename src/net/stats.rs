//! 统计信息
//!
//! 每个节点一组按时间追加的账本（generated/forwarded/received/discarded）、
//! 队列长度时间序列、按邻居的收发计数，以及 fork-join 进程的汇合记录。

use std::collections::BTreeMap;

use serde::Serialize;

use super::id::NodeId;
use super::packet::{ForkInfo, Packet};
use crate::sim::SimTime;

/// 账本条目：记录时刻 + 包快照
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub at: SimTime,
    pub pkt: Packet,
}

/// 队列长度采样；多类节点每个子容器一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueSample {
    pub at: SimTime,
    pub lengths: Vec<usize>,
}

impl QueueSample {
    pub fn total(&self) -> usize {
        self.lengths.iter().sum()
    }
}

/// fork-join 进程的汇合状态，保存在线程的目的节点上
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    pub id: u64,
    pub src: NodeId,
    pub created_at: SimTime,
    pub fan_out: u32,
    /// 已完成的线程数
    pub completed: u32,
    /// 最后一个线程完成时才写入
    pub done_at: Option<SimTime>,
    pub service_time: Option<SimTime>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct NodeStats {
    pub generated: Vec<LedgerEntry>,
    pub forwarded: Vec<LedgerEntry>,
    pub received: Vec<LedgerEntry>,
    pub discarded: Vec<LedgerEntry>,
    pub queue: Vec<QueueSample>,
    /// 邻居 -> 发往该邻居的包数
    pub sent: BTreeMap<NodeId, u64>,
    /// 邻居 -> 从该邻居收到的包数
    pub recv: BTreeMap<NodeId, u64>,
    /// 进程 id -> 汇合记录
    pub processes: BTreeMap<u64, ProcessRecord>,
}

impl NodeStats {
    pub fn total_sent(&self) -> u64 {
        self.sent.values().sum()
    }

    pub fn total_recv(&self) -> u64 {
        self.recv.values().sum()
    }
}

/// 全网汇总
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub generated: u64,
    pub forwarded: u64,
    pub received: u64,
    pub discarded: u64,
    /// 各节点发往邻居的包数之和
    pub sent: u64,
    /// 各节点从邻居收到的包数之和
    pub recv: u64,
    /// recv / sent；没有发送时为 None
    pub throughput: Option<f64>,
    pub completed_processes: u64,
}

/// 网络统计信息
#[derive(Debug, Default, Clone, Serialize)]
pub struct Stats {
    nodes: Vec<NodeStats>,
}

impl Stats {
    pub fn new(nodes: usize) -> Self {
        Self {
            nodes: vec![NodeStats::default(); nodes],
        }
    }

    pub fn node(&self, id: NodeId) -> &NodeStats {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[NodeStats] {
        &self.nodes
    }

    /// 初始化与某邻居的收发计数（保证汇总里出现所有连接）
    pub(crate) fn add_neighbor(&mut self, node: NodeId, neighbor: NodeId) {
        let s = &mut self.nodes[node.0];
        s.sent.entry(neighbor).or_insert(0);
        s.recv.entry(neighbor).or_insert(0);
    }

    pub(crate) fn on_generated(&mut self, node: NodeId, at: SimTime, pkt: &Packet) {
        self.nodes[node.0].generated.push(LedgerEntry {
            at,
            pkt: pkt.clone(),
        });
    }

    pub(crate) fn on_forwarded(&mut self, node: NodeId, to: NodeId, at: SimTime, pkt: &Packet) {
        let s = &mut self.nodes[node.0];
        *s.sent.entry(to).or_insert(0) += 1;
        s.forwarded.push(LedgerEntry {
            at,
            pkt: pkt.clone(),
        });
    }

    pub(crate) fn on_arrival(&mut self, node: NodeId, from: NodeId) {
        *self.nodes[node.0].recv.entry(from).or_insert(0) += 1;
    }

    pub(crate) fn on_received(&mut self, node: NodeId, at: SimTime, pkt: Packet) {
        self.nodes[node.0].received.push(LedgerEntry { at, pkt });
    }

    pub(crate) fn on_discarded(&mut self, node: NodeId, at: SimTime, pkt: Packet) {
        self.nodes[node.0].discarded.push(LedgerEntry { at, pkt });
    }

    /// 记录一个线程的完成；返回汇合是否在这一次完成。
    pub(crate) fn on_thread_done(&mut self, node: NodeId, fork: &ForkInfo, src: NodeId, at: SimTime) -> bool {
        let rec = self.nodes[node.0]
            .processes
            .entry(fork.process_id)
            .or_insert(ProcessRecord {
                id: fork.process_id,
                src,
                created_at: fork.created_at,
                fan_out: fork.fan_out,
                completed: 0,
                done_at: None,
                service_time: None,
            });
        rec.completed = rec.completed.saturating_add(1);
        if rec.completed == rec.fan_out {
            rec.done_at = Some(at);
            rec.service_time = Some(at.saturating_sub(rec.created_at));
            return true;
        }
        false
    }

    pub(crate) fn sample(&mut self, node: NodeId, at: SimTime, lengths: Vec<usize>) {
        self.nodes[node.0].queue.push(QueueSample { at, lengths });
    }

    pub fn summary(&self) -> Summary {
        let count = |f: fn(&NodeStats) -> usize| -> u64 {
            self.nodes.iter().map(|s| f(s) as u64).sum()
        };
        let sent: u64 = self.nodes.iter().map(NodeStats::total_sent).sum();
        let recv: u64 = self.nodes.iter().map(NodeStats::total_recv).sum();
        Summary {
            generated: count(|s| s.generated.len()),
            forwarded: count(|s| s.forwarded.len()),
            received: count(|s| s.received.len()),
            discarded: count(|s| s.discarded.len()),
            sent,
            recv,
            throughput: (sent > 0).then(|| recv as f64 / sent as f64),
            completed_processes: count(|s| {
                s.processes
                    .values()
                    .filter(|p| p.service_time.is_some())
                    .count()
            }),
        }
    }
}
