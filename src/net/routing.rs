//! 最短路径路由表
//!
//! 对每个 (from, dst) 预计算无权最短路径上的下一跳。对每个 dst 做一次 BFS
//! 得到各节点到 dst 的跳数，然后 from 的下一跳取满足
//! `dist[next] = dist[from] - 1` 的邻居中 NodeId 最小者，结果对固定拓扑是确定的。
//! 路由表构建后不再修改。

use std::collections::{HashMap, VecDeque};

use super::id::NodeId;
use super::topology::Topology;
use crate::error::{Result, SimError};
use tracing::info;

#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    /// (from, dst) -> 下一跳
    next_hop: HashMap<(NodeId, NodeId), NodeId>,
    /// (from, dst) -> 最短路径跳数
    hops: HashMap<(NodeId, NodeId), u32>,
}

impl RoutingTable {
    /// 构建全节点对路由表；存在不可达节点对时失败。
    #[tracing::instrument(skip_all, fields(nodes = topo.len()))]
    pub fn build(topo: &Topology) -> Result<Self> {
        let n = topo.len();
        let mut rt = RoutingTable::default();

        let mut dist: Vec<u32> = vec![u32::MAX; n];
        let mut q: VecDeque<NodeId> = VecDeque::new();

        for dst_idx in 0..n {
            dist.fill(u32::MAX);
            q.clear();

            let dst = NodeId(dst_idx);
            dist[dst_idx] = 0;
            q.push_back(dst);

            // 无向图：正向邻接即反向邻接
            while let Some(v) = q.pop_front() {
                let dv = dist[v.0];
                for &nb in topo.neighbors(v) {
                    if dist[nb.0] == u32::MAX {
                        dist[nb.0] = dv.saturating_add(1);
                        q.push_back(nb);
                    }
                }
            }

            for from_idx in 0..n {
                let from = NodeId(from_idx);
                if from == dst {
                    continue;
                }
                let df = dist[from_idx];
                if df == u32::MAX {
                    return Err(SimError::Routing {
                        from: topo.name_of(from).to_string(),
                        to: topo.name_of(dst).to_string(),
                    });
                }
                // 邻接表按 NodeId 升序，第一个满足条件的即最小者
                let next = topo
                    .neighbors(from)
                    .iter()
                    .copied()
                    .find(|nh| dist[nh.0] == df - 1)
                    .ok_or_else(|| SimError::Routing {
                        from: topo.name_of(from).to_string(),
                        to: topo.name_of(dst).to_string(),
                    })?;
                rt.next_hop.insert((from, dst), next);
                rt.hops.insert((from, dst), df);
            }
        }

        info!(pairs = rt.next_hop.len(), "最短路径表计算完成");
        Ok(rt)
    }

    /// 获取 (from, dst) 的下一跳
    pub fn next_hop(&self, from: NodeId, dst: NodeId) -> Option<NodeId> {
        self.next_hop.get(&(from, dst)).copied()
    }

    /// 获取 (from, dst) 最短路径的跳数
    pub fn hops(&self, from: NodeId, dst: NodeId) -> Option<u32> {
        self.hops.get(&(from, dst)).copied()
    }

    /// 按下一跳逐跳展开完整路径（含两端）
    pub fn path(&self, from: NodeId, dst: NodeId) -> Option<Vec<NodeId>> {
        if from == dst {
            return Some(vec![from]);
        }
        let mut path = vec![from];
        let mut at = from;
        while at != dst {
            at = self.next_hop(at, dst)?;
            path.push(at);
        }
        Some(path)
    }

    pub fn len(&self) -> usize {
        self.next_hop.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next_hop.is_empty()
    }
}
