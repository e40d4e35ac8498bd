//! 队列策略（Queue disciplines）
//!
//! 节点的包容器与调度策略。简单策略使用单个 FIFO 容器，多类策略使用分开的子容器。

use crate::net::Packet;

mod class;
mod fifo;
mod policy;
mod priority;

pub use class::ClassQueue;
pub use fifo::FifoQueue;
pub use policy::{SchedulingPolicy, Service};
pub use priority::PriorityQueue;

/// Packet 队列抽象
pub trait PacketQueue: std::fmt::Debug + Send {
    /// 入队：成功返回 Ok；超过长度上限则返回 Err(pkt)
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet>;
    /// 服务一轮后放回队尾，不受长度上限约束
    fn requeue(&mut self, pkt: Packet);
    /// 出队：按队列策略返回下一个 packet
    fn dequeue(&mut self) -> Option<Packet>;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// 各子容器的长度（单容器时只有一项）
    fn lengths(&self) -> Vec<usize> {
        vec![self.len()]
    }
    fn cutoff(&self) -> Option<usize>;
}

/// 容器已满：长度达到上限后再来的包会被拒绝。
pub(crate) fn is_full(len: usize, cutoff: Option<usize>) -> bool {
    cutoff.is_some_and(|c| len >= c)
}
