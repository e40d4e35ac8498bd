//! 数据包类型
//!
//! 定义网络数据包及其相关操作。

use serde::Serialize;

use super::id::NodeId;
use crate::sim::SimTime;

/// 包的类别。多类队列按类别分流。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    Data,
    Batch,
    Interactive,
    /// fork-join 进程派生出的线程
    Thread,
}

/// 线程所属的进程（fork-join）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForkInfo {
    pub process_id: u64,
    pub created_at: SimTime,
    /// 抽样得到的扇出，即该进程的线程总数
    pub fan_out: u32,
}

/// 网络数据包
///
/// `id`/`created_at`/`src`/`dst` 在创建后不再改变，其余字段随仿真推进更新。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Packet {
    pub id: u64,
    pub created_at: SimTime,
    pub src: NodeId,
    pub dst: NodeId,
    pub kind: PacketKind,
    pub priority: u8,
    /// 最近一次转发选中的下一跳
    pub next_hop: Option<NodeId>,
    /// 已走过的跳数
    pub hops: u32,
    /// 已消耗的服务轮数
    pub rounds: u32,
    /// 原始 CPU 突发时长
    pub burst: SimTime,
    /// 剩余突发；完成时保留最后一轮的余量
    pub remaining: SimTime,
    pub fork: Option<ForkInfo>,
    /// 到达目的地并完成服务的时刻
    pub done_at: Option<SimTime>,
    /// done_at - created_at
    pub service_time: Option<SimTime>,
}

impl Packet {
    /// 创建新包
    pub fn new(id: u64, created_at: SimTime, src: NodeId, dst: NodeId) -> Self {
        Self {
            id,
            created_at,
            src,
            dst,
            kind: PacketKind::Data,
            priority: 1,
            next_hop: None,
            hops: 0,
            rounds: 0,
            burst: SimTime::ZERO,
            remaining: SimTime::ZERO,
            fork: None,
            done_at: None,
            service_time: None,
        }
    }

    pub fn with_kind(mut self, kind: PacketKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_burst(mut self, burst: SimTime) -> Self {
        self.burst = burst;
        self.remaining = burst;
        self
    }

    /// 进入下一跳：记录下一跳并累加跳数
    pub fn advance(mut self, next_hop: NodeId) -> Self {
        self.next_hop = Some(next_hop);
        self.hops = self.hops.saturating_add(1);
        self
    }

    /// 在目的地完成：记录完成时间与逗留时间
    pub fn complete(&mut self, now: SimTime) {
        self.done_at = Some(now);
        self.service_time = Some(now.saturating_sub(self.created_at));
    }
}
