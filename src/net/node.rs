//! 节点类型
//!
//! 节点独占自己的包容器；只有它自己的接收进程和转发进程会改动容器。
//! 转发进程是一个状态机：Idle（队列空，按 queue_check 轮询）-> Servicing
//! （服务时间）-> 在目的地完成或交给下一跳链路；链路满时进入 Blocked 等待空位。

use std::collections::BTreeMap;

use super::id::{LinkId, NodeId};
use super::packet::Packet;
use crate::error::{Result, SimError};
use crate::queue::{PacketQueue, SchedulingPolicy, Service};
use crate::sim::{GenerationSpec, Rng, SimTime};

/// 发包间隔分布
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Generation {
    /// 间隔 ~ Exp(rate)
    Poisson { rate: f64 },
    /// 固定间隔
    Periodic { interval: SimTime },
}

impl Generation {
    pub fn from_spec(spec: &GenerationSpec, node: &str) -> Result<Self> {
        let invalid = || {
            SimError::config(
                format!("node '{node}'"),
                format!("invalid {} generator value {}", spec.mode, spec.value),
            )
        };
        match spec.mode.as_str() {
            "poisson" => {
                if spec.value.is_finite() && spec.value > 0.0 {
                    Ok(Generation::Poisson { rate: spec.value })
                } else {
                    Err(invalid())
                }
            }
            "periodic" => {
                if spec.value.is_finite() && spec.value >= 0.0 {
                    Ok(Generation::Periodic {
                        interval: SimTime::from_secs_f64(spec.value),
                    })
                } else {
                    Err(invalid())
                }
            }
            other => Err(SimError::UnknownGenerationMode {
                node: node.to_string(),
                mode: other.to_string(),
            }),
        }
    }

    /// 下一次发包前的等待时间
    pub fn next_gap(&self, rng: &mut Rng) -> SimTime {
        match *self {
            Generation::Poisson { rate } => rng.exp_time(rate),
            Generation::Periodic { interval } => interval,
        }
    }
}

/// 转发进程状态
#[derive(Debug, Default)]
pub enum ForwardState {
    #[default]
    Idle,
    Servicing {
        pkt: Packet,
        service: Service,
    },
    /// 下一跳链路已满，持有包等待空位
    Blocked {
        pkt: Packet,
        next_hop: NodeId,
    },
}

/// 网络节点
#[derive(Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// 节点类型名（参数表的键）
    pub node_type: String,
    pub generation: Option<Generation>,
    pub limit: Option<u64>,
    /// 候选目的节点（不含自身）
    pub destinations: Vec<NodeId>,
    pub service_rate: f64,
    pub queue_check: SimTime,
    pub priority_levels: u8,
    pub policy: SchedulingPolicy,
    pub(crate) queue: Box<dyn PacketQueue>,
    /// 邻居 -> (链路, 发往该邻居的方向)
    pub(crate) ports: BTreeMap<NodeId, (LinkId, usize)>,
    pub(crate) state: ForwardState,
}

impl Node {
    pub fn is_source(&self) -> bool {
        self.generation.is_some()
    }

    pub fn queue(&self) -> &dyn PacketQueue {
        self.queue.as_ref()
    }

    pub fn neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ports.keys().copied()
    }

    pub fn port(&self, neighbor: NodeId) -> Option<(LinkId, usize)> {
        self.ports.get(&neighbor).copied()
    }

    pub fn state(&self) -> &ForwardState {
        &self.state
    }
}
