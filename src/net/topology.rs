//! 拓扑
//!
//! 由边表构建无向图。节点按在边表中首次出现的顺序编号，随后是只出现在
//! 类型表里、没有任何边的孤立节点（按名字顺序）。重复边（任一方向）只保留一条。

use std::collections::{BTreeMap, HashMap, HashSet};

use super::id::NodeId;
use crate::error::{Result, SimError};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Topology {
    names: Vec<String>,
    index: HashMap<String, NodeId>,
    edges: Vec<(NodeId, NodeId)>,
    /// 邻接表，按 NodeId 升序
    adj: Vec<Vec<NodeId>>,
}

impl Topology {
    #[tracing::instrument(skip_all, fields(edges = edges.len(), typed_nodes = node_types.len()))]
    pub fn build(edges: &[(String, String)], node_types: &BTreeMap<String, String>) -> Result<Self> {
        let mut topo = Topology {
            names: Vec::new(),
            index: HashMap::new(),
            edges: Vec::new(),
            adj: Vec::new(),
        };

        for (a, b) in edges {
            if a == b {
                return Err(SimError::config(
                    "topology",
                    format!("link connects node '{a}' to itself"),
                ));
            }
        }

        let mut seen: HashSet<(NodeId, NodeId)> = HashSet::new();
        for (a, b) in edges {
            let ia = topo.intern(a);
            let ib = topo.intern(b);
            let key = (ia.min(ib), ia.max(ib));
            if !seen.insert(key) {
                debug!(a = %a, b = %b, "忽略重复边");
                continue;
            }
            topo.edges.push((ia, ib));
        }

        // 孤立节点
        for name in node_types.keys() {
            topo.intern(name);
        }

        for name in &topo.names {
            if !node_types.contains_key(name) {
                return Err(SimError::config(
                    "topology",
                    format!("node '{name}' does not have a type"),
                ));
            }
        }

        topo.adj = vec![Vec::new(); topo.names.len()];
        for &(a, b) in &topo.edges {
            topo.adj[a.0].push(b);
            topo.adj[b.0].push(a);
        }
        for nbrs in &mut topo.adj {
            nbrs.sort_unstable();
        }

        info!(
            nodes = topo.names.len(),
            total_links = edges.len(),
            unique_links = topo.edges.len(),
            "拓扑校验通过"
        );
        Ok(topo)
    }

    fn intern(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = NodeId(self.names.len());
        self.names.push(name.to_string());
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn name_of(&self, id: NodeId) -> &str {
        &self.names[id.0]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// 去重后的无向边
    pub fn edges(&self) -> &[(NodeId, NodeId)] {
        &self.edges
    }

    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.adj[id.0]
    }
}
