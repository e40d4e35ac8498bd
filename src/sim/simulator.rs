//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间、事件队列与进程表。

use super::event::{Event, EventId};
use super::process::{Process, ProcessId, Signal, Wait};
use super::scheduled_event::{Action, ScheduledEvent};
use super::time::SimTime;
use super::world::World;
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列。
///
/// 单一时钟、协作式调度：任一时刻只有一个事件或进程在执行。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    q: BinaryHeap<ScheduledEvent>,
    /// 进程表；槽位为 None 表示进程正在执行或已退出。
    procs: Vec<Option<Box<dyn Process>>>,
    /// 挂在信号上的进程（按挂起顺序）
    parked: HashMap<Signal, Vec<ProcessId>>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 尚未执行的事件数
    pub fn pending(&self) -> usize {
        self.q.len()
    }

    fn push(&mut self, at: SimTime, action: Action) -> EventId {
        // 不允许回溯调度：早于当前时间的请求按当前时间处理。
        if at < self.now {
            debug!(at = ?at, now = ?self.now, "调度时间早于当前时间，按当前时间处理");
        }
        let at = at.max(self.now);
        let id = EventId(self.next_seq);
        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent { at, id, action });
        id
    }

    /// 调度事件在指定时间执行
    #[tracing::instrument(skip(self, ev), fields(event_type = std::any::type_name::<E>(), schedule_at = ?at))]
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) -> EventId {
        trace!(now = ?self.now, seq = self.next_seq, "调度事件");
        let id = self.push(at, Action::Event(Box::new(ev)));
        debug!(queue_size = self.q.len(), "事件已加入队列");
        id
    }

    /// 调度事件在 `now + delay` 执行
    pub fn schedule_in<E: Event>(&mut self, delay: SimTime, ev: E) -> EventId {
        self.schedule(self.now.saturating_add(delay), ev)
    }

    /// 注册一个进程，并在当前时刻安排它的第一次恢复。
    pub fn spawn<P: Process>(&mut self, p: P) -> ProcessId {
        let pid = ProcessId(self.procs.len());
        self.procs.push(Some(Box::new(p)));
        self.push(self.now, Action::Resume(pid));
        trace!(pid = pid.0, process_type = std::any::type_name::<P>(), "注册进程");
        pid
    }

    /// 唤醒所有挂在 `signal` 上的进程：按挂起顺序在当前时刻恢复。
    pub fn notify(&mut self, signal: Signal) {
        let Some(waiters) = self.parked.remove(&signal) else {
            return;
        };
        trace!(signal = signal.0, waiters = waiters.len(), "唤醒进程");
        for pid in waiters {
            self.push(self.now, Action::Resume(pid));
        }
    }

    /// 是否有进程挂在该信号上
    pub fn has_waiters(&self, signal: Signal) -> bool {
        self.parked.get(&signal).is_some_and(|w| !w.is_empty())
    }

    fn resume(&mut self, pid: ProcessId, world: &mut dyn World) {
        let Some(mut p) = self.procs.get_mut(pid.0).and_then(Option::take) else {
            return;
        };
        match p.resume(self, world) {
            Wait::Timeout(delay) => {
                self.procs[pid.0] = Some(p);
                self.push(self.now.saturating_add(delay), Action::Resume(pid));
            }
            Wait::Signal(signal) => {
                self.procs[pid.0] = Some(p);
                self.parked.entry(signal).or_default().push(pid);
            }
            Wait::Exit => {
                trace!(pid = pid.0, "进程退出");
            }
        }
    }

    fn dispatch(&mut self, item: ScheduledEvent, world: &mut dyn World) {
        self.now = item.at;
        match item.action {
            Action::Event(ev) => ev.execute(self, world),
            Action::Resume(pid) => self.resume(pid, world),
        }
        world.on_tick(self);
    }

    /// 运行直到事件队列为空或到达 `until`。
    ///
    /// 恰好在 `until` 时刻的事件会被执行；之后的事件保留在队列中。
    #[tracing::instrument(skip(self, world), fields(until = ?until))]
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        info!("▶️  开始运行仿真");
        let mut event_count: u64 = 0;
        while let Some(top) = self.q.peek() {
            if top.at > until {
                break;
            }
            let Some(item) = self.q.pop() else { break };
            event_count += 1;
            self.dispatch(item, world);
        }
        self.now = self.now.max(until);
        info!(
            total_events = event_count,
            final_time = ?self.now,
            remaining_queue = self.q.len(),
            "✅ 仿真完成"
        );
    }

    /// 运行所有事件直到队列为空。
    #[tracing::instrument(skip(self, world))]
    pub fn run(&mut self, world: &mut dyn World) {
        info!("▶️  开始运行仿真");
        debug!(now = ?self.now, queue_size = self.q.len(), "初始状态");

        let mut event_count: u64 = 0;
        while let Some(item) = self.q.pop() {
            event_count += 1;
            debug!(
                event_num = event_count,
                scheduled_at = ?item.at,
                seq = item.id.0,
                remaining_queue = self.q.len(),
                "执行事件"
            );
            self.dispatch(item, world);
        }

        info!(
            total_events = event_count,
            final_time = ?self.now,
            "✅ 仿真完成"
        );
    }
}
