//! 网络世界实现
//!
//! 定义网络仿真的世界（World）实现，持有网络拓扑。

use super::network::Network;
use crate::error::Result;
use crate::sim::{ModelSpec, SimConfig, Simulator, World};
use std::any::Any;

/// 持有 Network 的世界；事件和进程通过 downcast 取回它。
pub struct NetWorld {
    pub net: Network,
}

impl NetWorld {
    pub fn new(net: Network) -> Self {
        Self { net }
    }

    /// 构建网络并在 `sim` 上启动所有节点进程。
    pub fn setup(spec: &ModelSpec, cfg: &SimConfig, sim: &mut Simulator) -> Result<Self> {
        let net = Network::build(spec, cfg)?;
        net.start(sim);
        Ok(Self { net })
    }
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
