//! 一次性事件
//!
//! 与进程不同，事件执行一次就被丢弃，例如链路末端的包到达。

use super::simulator::Simulator;
use super::world::World;

/// 在调度时刻执行一次。按值消费 `self: Box<Self>`，可以把携带的包移交出去。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}

/// 事件句柄：即插入序列号，同一时刻的事件按它先后执行。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u64);
