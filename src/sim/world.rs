//! 仿真世界
//!
//! 调度器不知道业务状态的具体类型，只通过这里的接口把它交给事件和进程。

use super::simulator::Simulator;
use std::any::Any;

/// 事件和进程通过 `as_any_mut` 向下转型取回具体的世界（例如 `NetWorld`）。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// 每执行完一个事件或一次进程恢复后调用
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}
