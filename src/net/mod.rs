//! 网络模拟模块
//!
//! 此模块包含网络模拟的核心组件，如节点、链路、数据包、拓扑和路由。

// 子模块声明
mod id;
mod link;
mod net_world;
mod network;
mod node;
mod packet;
mod process;
mod routing;
mod stats;
mod topology;

// 重新导出公共接口
pub use id::{LinkId, NodeId};
pub use link::{Channel, ChannelCounters, Link, LinkDeliver};
pub use net_world::NetWorld;
pub use network::{Network, NodeReport, Report};
pub use node::{ForwardState, Generation, Node};
pub use packet::{ForkInfo, Packet, PacketKind};
pub use process::{Forwarder, Generator, QueueMonitor, Receiver};
pub use routing::RoutingTable;
pub use stats::{LedgerEntry, NodeStats, ProcessRecord, QueueSample, Stats, Summary};
pub use topology::Topology;
