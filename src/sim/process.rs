//! 可恢复进程
//!
//! 进程是长期存在的逻辑任务（发包、收包、转发、队列监控）。每次被调度器恢复后，
//! 进程执行到下一个挂起点并返回一个等待条件，由调度器负责再次唤醒。

use super::simulator::Simulator;
use super::time::SimTime;
use super::world::World;

/// 进程标识符（调度器内部进程表的下标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub usize);

/// 信号：业务层定义的“数据可用”条件，例如某条链路某个方向上有包到达。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Signal(pub u64);

/// 进程挂起时返回的等待条件。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// 在 `now + delay` 时恢复
    Timeout(SimTime),
    /// 直到有人 `notify` 该信号
    Signal(Signal),
    /// 进程结束，不再恢复
    Exit,
}

/// 可恢复进程
pub trait Process: Send + 'static {
    fn resume(&mut self, sim: &mut Simulator, world: &mut dyn World) -> Wait;
}
