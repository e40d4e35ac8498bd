//! 批处理/交互两类队列
//!
//! 入队时按包类别分流；出队时批处理队列优先，交互队列只在批处理队列为空时服务。
//! 长度上限分别作用于两个子容器。

use std::collections::VecDeque;

use crate::net::{Packet, PacketKind};

use super::{PacketQueue, is_full};

#[derive(Debug, Default)]
pub struct ClassQueue {
    cutoff: Option<usize>,
    batch: VecDeque<Packet>,
    interactive: VecDeque<Packet>,
}

impl ClassQueue {
    pub fn new(cutoff: Option<usize>) -> Self {
        Self {
            cutoff,
            batch: VecDeque::new(),
            interactive: VecDeque::new(),
        }
    }

    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    pub fn interactive_len(&self) -> usize {
        self.interactive.len()
    }

    fn lane(&mut self, kind: PacketKind) -> &mut VecDeque<Packet> {
        match kind {
            PacketKind::Batch => &mut self.batch,
            _ => &mut self.interactive,
        }
    }
}

impl PacketQueue for ClassQueue {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        let cutoff = self.cutoff;
        let lane = self.lane(pkt.kind);
        if is_full(lane.len(), cutoff) {
            return Err(pkt);
        }
        lane.push_back(pkt);
        Ok(())
    }

    fn requeue(&mut self, pkt: Packet) {
        self.lane(pkt.kind).push_back(pkt);
    }

    fn dequeue(&mut self) -> Option<Packet> {
        self.batch
            .pop_front()
            .or_else(|| self.interactive.pop_front())
    }

    fn len(&self) -> usize {
        self.batch.len().saturating_add(self.interactive.len())
    }

    fn lengths(&self) -> Vec<usize> {
        vec![self.batch.len(), self.interactive.len()]
    }

    fn cutoff(&self) -> Option<usize> {
        self.cutoff
    }
}
