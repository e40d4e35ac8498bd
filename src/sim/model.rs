//! 网络模型描述（JSON）
//!
//! 拓扑边表、节点类型和按类型给出的节点/链路参数。解析只做形状检查，
//! 语义校验（自环、缺失参数、未知发包模式等）在构建网络时进行。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

/// 默认队列采样间隔（秒）
pub const DEFAULT_MONITOR_INTERVAL: f64 = 0.001;
/// fork-join 扇出默认成功概率
pub const DEFAULT_FORK_SUCCESS_P: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    #[serde(default)]
    pub name: Option<String>,
    /// 无向边表：每一项是一对节点名
    pub edges: Vec<(String, String)>,
    /// 节点名 -> 节点类型
    pub node_types: BTreeMap<String, String>,
    /// 节点类型 -> 节点参数
    pub node_params: BTreeMap<String, NodeParams>,
    /// "类型A-类型B" -> 链路参数（反向写法同样有效）
    #[serde(default)]
    pub link_params: BTreeMap<String, LinkParams>,
}

impl ModelSpec {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeParams {
    /// 发包过程；缺省表示该节点不是流量源
    #[serde(default)]
    pub generation: Option<GenerationSpec>,
    /// 最多触发多少次发包
    #[serde(default)]
    pub limit: Option<u64>,
    /// 候选目的节点；缺省为除自身外的所有节点
    #[serde(default)]
    pub destinations: Option<Vec<String>>,
    /// 服务速率：服务时间 ~ Exp(service_rate)
    pub service_rate: f64,
    /// 队列为空时的轮询间隔（秒）
    pub queue_check: f64,
    /// 队列长度上限（包数）；超出的包被丢弃
    #[serde(default)]
    pub queue_cutoff: Option<usize>,
    #[serde(default)]
    pub policy: PolicySpec,
    /// 优先级取值范围 1..=priority_levels
    #[serde(default = "default_priority_levels")]
    pub priority_levels: u8,
}

fn default_priority_levels() -> u8 {
    1
}

/// 发包模式的原始描述，例如 `{ "mode": "poisson", "value": 2.0 }`。
///
/// `mode` 保持为字符串：未知模式在构建时报错，而不是在解析时。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSpec {
    pub mode: String,
    /// poisson: 速率；periodic: 间隔（秒）
    pub value: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicySpec {
    #[default]
    Fcfs,
    Priority,
    RoundRobin {
        quantum: f64,
    },
    ForkJoin {
        quantum: f64,
        #[serde(default = "default_success_p")]
        success_p: f64,
    },
    BatchInteractive {
        quantum: f64,
    },
}

fn default_success_p() -> f64 {
    DEFAULT_FORK_SUCCESS_P
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkParams {
    /// 每个方向最多同时在途的包数
    pub capacity: usize,
    /// 传播时延（秒）
    pub delay: f64,
}

/// 单次运行的上下文，显式传给网络构建函数。
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    pub seed: u64,
    /// 队列长度采样间隔（秒）
    pub monitor_interval: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
        }
    }
}
