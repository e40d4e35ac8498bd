//! Priority queue with a packet-count cutoff.
//!
//! Dequeue always returns the highest `priority` value; packets with equal
//! priority leave in arrival order. Selection is non-preemptive: a packet in
//! service is never displaced by a later, higher-priority arrival.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::net::Packet;

use super::{PacketQueue, is_full};

#[derive(Debug)]
struct Ranked {
    priority: u8,
    seq: u64,
    pkt: Packet,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        // max-heap: higher priority first, then the smaller (older) seq.
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Ranked {}

#[derive(Debug, Default)]
pub struct PriorityQueue {
    cutoff: Option<usize>,
    next_seq: u64,
    heap: BinaryHeap<Ranked>,
}

impl PriorityQueue {
    pub fn new(cutoff: Option<usize>) -> Self {
        Self {
            cutoff,
            next_seq: 0,
            heap: BinaryHeap::new(),
        }
    }

    fn push(&mut self, pkt: Packet) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Ranked {
            priority: pkt.priority,
            seq,
            pkt,
        });
    }
}

impl PacketQueue for PriorityQueue {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        if is_full(self.heap.len(), self.cutoff) {
            return Err(pkt);
        }
        self.push(pkt);
        Ok(())
    }

    fn requeue(&mut self, pkt: Packet) {
        self.push(pkt);
    }

    fn dequeue(&mut self) -> Option<Packet> {
        self.heap.pop().map(|r| r.pkt)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }

    fn cutoff(&self) -> Option<usize> {
        self.cutoff
    }
}
