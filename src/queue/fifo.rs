//! FIFO 队列
//!
//! 先到先服务；长度达到上限时直接拒绝新到达的 packet（尾丢弃）。

use std::collections::VecDeque;

use crate::net::Packet;

use super::{PacketQueue, is_full};

#[derive(Debug, Default)]
pub struct FifoQueue {
    cutoff: Option<usize>,
    q: VecDeque<Packet>,
}

impl FifoQueue {
    pub fn new(cutoff: Option<usize>) -> Self {
        Self {
            cutoff,
            q: VecDeque::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Packet> {
        self.q.iter()
    }
}

impl PacketQueue for FifoQueue {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        if is_full(self.q.len(), self.cutoff) {
            return Err(pkt);
        }
        self.q.push_back(pkt);
        Ok(())
    }

    fn requeue(&mut self, pkt: Packet) {
        self.q.push_back(pkt);
    }

    fn dequeue(&mut self) -> Option<Packet> {
        self.q.pop_front()
    }

    fn len(&self) -> usize {
        self.q.len()
    }

    fn cutoff(&self) -> Option<usize> {
        self.cutoff
    }
}
