//! 调度策略
//!
//! 每个节点在构建时绑定一个策略，决定用什么容器、怎样服务队首的包。
//! 量子切片只作用于以本节点为目的地的包；过路包在任何策略下都只做一次
//! Exp(service_rate) 的转发服务。

use crate::error::{Result, SimError};
use crate::net::{Packet, PacketKind};
use crate::sim::{PolicySpec, Rng, SimTime};

use super::{ClassQueue, FifoQueue, PacketQueue, PriorityQueue};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulingPolicy {
    /// 先到先服务
    Fcfs,
    /// 优先级高者先服务，同优先级按到达顺序；非抢占
    Priority,
    /// 每轮至多服务 `quantum`，未完成的放回队尾
    RoundRobin { quantum: SimTime },
    /// 发包时派生 Geometric(success_p) 个线程，线程按轮转服务
    ForkJoin { quantum: SimTime, success_p: f64 },
    /// 批处理包轮转服务且优先，交互包一次服务
    BatchInteractive { quantum: SimTime },
}

/// 一次服务的计划
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    /// 转发前的处理时间
    Transit(SimTime),
    /// 在目的地服务一轮；`finished` 为 false 时扣掉 `consumed` 后放回队尾
    Slice {
        time: SimTime,
        consumed: SimTime,
        finished: bool,
    },
}

impl Service {
    pub fn time(&self) -> SimTime {
        match *self {
            Service::Transit(t) => t,
            Service::Slice { time, .. } => time,
        }
    }
}

fn positive(node: &str, what: &str, v: f64) -> Result<f64> {
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(SimError::config(
            format!("node '{node}'"),
            format!("{what} must be a positive number, got {v}"),
        ))
    }
}

impl SchedulingPolicy {
    pub fn from_spec(spec: &PolicySpec, node: &str) -> Result<Self> {
        let quantum = |q: f64| -> Result<SimTime> {
            let q = SimTime::from_secs_f64(positive(node, "quantum", q)?);
            if q == SimTime::ZERO {
                return Err(SimError::config(
                    format!("node '{node}'"),
                    "quantum is below the clock resolution",
                ));
            }
            Ok(q)
        };
        Ok(match *spec {
            PolicySpec::Fcfs => SchedulingPolicy::Fcfs,
            PolicySpec::Priority => SchedulingPolicy::Priority,
            PolicySpec::RoundRobin { quantum: q } => SchedulingPolicy::RoundRobin {
                quantum: quantum(q)?,
            },
            PolicySpec::ForkJoin {
                quantum: q,
                success_p,
            } => {
                if !(success_p > 0.0 && success_p <= 1.0) {
                    return Err(SimError::config(
                        format!("node '{node}'"),
                        format!("fork-join success_p must be in (0, 1], got {success_p}"),
                    ));
                }
                SchedulingPolicy::ForkJoin {
                    quantum: quantum(q)?,
                    success_p,
                }
            }
            PolicySpec::BatchInteractive { quantum: q } => SchedulingPolicy::BatchInteractive {
                quantum: quantum(q)?,
            },
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchedulingPolicy::Fcfs => "fcfs",
            SchedulingPolicy::Priority => "priority",
            SchedulingPolicy::RoundRobin { .. } => "round_robin",
            SchedulingPolicy::ForkJoin { .. } => "fork_join",
            SchedulingPolicy::BatchInteractive { .. } => "batch_interactive",
        }
    }

    /// 按策略创建节点的包容器
    pub fn make_queue(&self, cutoff: Option<usize>) -> Box<dyn PacketQueue> {
        match self {
            SchedulingPolicy::Priority => Box::new(PriorityQueue::new(cutoff)),
            SchedulingPolicy::BatchInteractive { .. } => Box::new(ClassQueue::new(cutoff)),
            SchedulingPolicy::Fcfs
            | SchedulingPolicy::RoundRobin { .. }
            | SchedulingPolicy::ForkJoin { .. } => Box::new(FifoQueue::new(cutoff)),
        }
    }

    /// 该包在目的地是否按量子切片服务
    pub fn quantum_for(&self, pkt: &Packet) -> Option<SimTime> {
        match *self {
            SchedulingPolicy::RoundRobin { quantum } | SchedulingPolicy::ForkJoin { quantum, .. } => {
                Some(quantum)
            }
            SchedulingPolicy::BatchInteractive { quantum } if pkt.kind == PacketKind::Batch => {
                Some(quantum)
            }
            _ => None,
        }
    }

    /// 为选中的包安排一次服务
    pub fn plan(&self, pkt: &Packet, at_sink: bool, service_rate: f64, rng: &mut Rng) -> Service {
        if !at_sink {
            return Service::Transit(rng.exp_time(service_rate));
        }
        match self.quantum_for(pkt) {
            Some(quantum) if pkt.remaining > quantum => Service::Slice {
                time: quantum,
                consumed: quantum,
                finished: false,
            },
            Some(_) => Service::Slice {
                time: pkt.remaining,
                consumed: SimTime::ZERO,
                finished: true,
            },
            None => Service::Slice {
                time: rng.exp_time(service_rate),
                consumed: SimTime::ZERO,
                finished: true,
            },
        }
    }

    /// 发包时的扇出：只有 fork-join 节点会派生线程
    pub fn fan_out(&self, rng: &mut Rng) -> Option<u32> {
        match *self {
            SchedulingPolicy::ForkJoin { success_p, .. } => Some(rng.trials(success_p)),
            _ => None,
        }
    }

    /// 发包时的包类别
    pub fn classify(&self, rng: &mut Rng) -> PacketKind {
        match self {
            SchedulingPolicy::BatchInteractive { .. } => {
                if rng.coin() {
                    PacketKind::Batch
                } else {
                    PacketKind::Interactive
                }
            }
            _ => PacketKind::Data,
        }
    }
}
