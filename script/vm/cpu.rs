use std::{collections::VecDeque, rc::Rc};

use script_component::{
    host::{Host, Seconds},
    program::Program,
};

use crate::{
    error::RuntimeError,
    thread::{Request, Thread},
};

/// A little scheduler over a bundle of [`Thread`]s driving one host.
///
/// Threads are identified by spawn order. The run queue is always a
/// permutation of the thread ids; it decides tick order and who is
/// "next" for a plain yield, never whether a thread ticks at all.
pub struct Cpu {
    threads: Vec<Thread>,
    queue: VecDeque<usize>,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            threads: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn spawn(&mut self, name: &str, program: Rc<Program>, seed: u64) -> usize {
        debug_assert!(self.index_of(name).is_none());

        let id = self.threads.len();
        log::debug!("spawn thread {} '{}' running '{}'", id, name, program.name());
        self.threads.push(Thread::new(name, program, seed));
        self.queue.push_back(id);
        id
    }

    /// Ticks every thread once, in the queue order captured at entry.
    /// Yields raised mid-frame reorder the queue for the next frame
    /// without taking this frame's tick away from anyone.
    pub fn tick(&mut self, host: &mut dyn Host, dt: Seconds) -> Result<(), RuntimeError> {
        let order: Vec<usize> = self.queue.iter().copied().collect();
        for id in order {
            match self.threads[id].tick(host, dt)? {
                Request::None => (),
                Request::Yield => {
                    let next = self.next();
                    self.yield_to(id, next);
                }
                Request::YieldTo(target) => {
                    if target >= self.threads.len() {
                        let from = &self.threads[id];
                        return Err(RuntimeError::NoSuchThread {
                            thread: from.name().to_string(),
                            program: from.program().name().to_string(),
                            addr: from.addr(),
                            target,
                        });
                    }
                    self.yield_to(id, target);
                }
            }
        }
        Ok(())
    }

    /// Hands the head slot to `to`: both leave the queue, `to` rejoins
    /// at the head, `from` at the tail; `from` pauses and `to` resumes.
    /// Yielding to yourself changes nothing.
    pub fn yield_to(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        log::trace!("yield: thread {} -> {}", from, to);
        self.queue.retain(|&id| id != from && id != to);
        self.queue.push_front(to);
        self.queue.push_back(from);
        self.threads[from].pause();
        self.threads[to].resume();
    }

    fn next(&self) -> usize {
        match self.queue.len() {
            0 | 1 => *self.queue.front().unwrap_or(&0),
            _ => self.queue[1],
        }
    }

    pub fn thread(&self, id: usize) -> Option<&Thread> {
        self.threads.get(id)
    }

    pub fn thread_mut(&mut self, id: usize) -> Option<&mut Thread> {
        self.threads.get_mut(id)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.threads.iter().position(|t| t.name() == name)
    }

    pub fn queue(&self) -> &VecDeque<usize> {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::new()
    }
}
