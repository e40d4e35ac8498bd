//! 调度事件
//!
//! 定义调度事件结构及其优先级比较。

use super::event::{Event, EventId};
use super::process::ProcessId;
use super::time::SimTime;
use std::cmp::Ordering;

/// 到期后要做的事：执行一次性事件，或恢复一个挂起的进程。
pub(crate) enum Action {
    Event(Box<dyn Event>),
    Resume(ProcessId),
}

/// 调度事件，包含执行时间、序列号和动作。
pub(crate) struct ScheduledEvent {
    pub(crate) at: SimTime,
    pub(crate) id: EventId,
    pub(crate) action: Action,
}

// BinaryHeap 是 max-heap；我们需要最小时间优先，因此反向比较。
// 同一时刻按插入序号 FIFO。
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.at
            .cmp(&other.at)
            .then_with(|| self.id.cmp(&other.id))
            .reverse()
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.id == other.id
    }
}

impl Eq for ScheduledEvent {}
