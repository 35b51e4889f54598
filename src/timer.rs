//! Deterministic single-shot timers.
//!
//! The queue keeps its own clock that only moves when [`TimerQueue::advance`]
//! is called, so tasks run exactly where the host serializes them (between
//! input handling and drawing) and tests can step time by hand.

use std::fmt;
use std::time::Duration;

use crate::error::Result;

/// Handle of a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A deferred task. It gets the context the queue is advanced with and the
/// queue itself, so it can schedule follow-ups.
pub type TimerTask<C> = Box<dyn FnOnce(&mut C, &mut TimerQueue<C>) -> Result<()>>;

struct Entry<C> {
    id: TimerId,
    due: Duration,
    task: TimerTask<C>,
}

pub struct TimerQueue<C> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<C>>,
}

impl<C> TimerQueue<C> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Time elapsed on the queue's clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Run `task` once, `delay` after the current time.
    pub fn schedule_once<F>(&mut self, delay: Duration, task: F) -> TimerId
    where
        F: FnOnce(&mut C, &mut TimerQueue<C>) -> Result<()> + 'static,
    {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due: self.now + delay,
            task: Box::new(task),
        });
        id
    }

    /// Drop a pending task. Returns false if it already ran or was
    /// cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Move the clock forward by `elapsed`, running every task that comes
    /// due in deadline order (ties in scheduling order). Tasks scheduled by
    /// a running task fire in the same call if they are due by the end of
    /// the step.
    ///
    /// Returns the number of tasks run. The first failing task stops the
    /// step; the clock then stays at that task's deadline.
    pub fn advance(&mut self, elapsed: Duration, ctx: &mut C) -> Result<usize> {
        let target = self.now + elapsed;
        let mut fired = 0;

        while let Some(index) = self.next_due(target) {
            let entry = self.entries.swap_remove(index);
            self.now = self.now.max(entry.due);
            (entry.task)(ctx, self)?;
            fired += 1;
        }

        self.now = target;
        if fired > 0 {
            log::trace!("{} timer(s) fired, {} pending", fired, self.entries.len());
        }
        Ok(fired)
    }

    fn next_due(&self, target: Duration) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= target)
            .min_by_key(|(_, e)| (e.due, e.id))
            .map(|(index, _)| index)
    }
}

impl<C> Default for TimerQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for TimerQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now", &self.now)
            .field("pending", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::tree::{ContainerProps, Tree};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_fires_in_deadline_order() {
        let mut queue: TimerQueue<Vec<&'static str>> = TimerQueue::new();
        queue.schedule_once(ms(30), |log, _| {
            log.push("late");
            Ok(())
        });
        queue.schedule_once(ms(10), |log, _| {
            log.push("early");
            Ok(())
        });
        queue.schedule_once(ms(10), |log, _| {
            log.push("early-second");
            Ok(())
        });

        let mut log = Vec::new();
        assert_eq!(queue.advance(ms(5), &mut log).unwrap(), 0);
        assert_eq!(queue.advance(ms(25), &mut log).unwrap(), 3);
        assert_eq!(log, vec!["early", "early-second", "late"]);
        assert!(queue.is_empty());
        assert_eq!(queue.now(), ms(30));
    }

    #[test]
    fn test_cancel() {
        let mut queue: TimerQueue<u32> = TimerQueue::new();
        let id = queue.schedule_once(ms(10), |count, _| {
            *count += 1;
            Ok(())
        });
        assert!(queue.is_scheduled(id));
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));

        let mut count = 0;
        queue.advance(ms(100), &mut count).unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_chained_tasks_fire_within_one_step() {
        let mut queue: TimerQueue<Vec<Duration>> = TimerQueue::new();
        queue.schedule_once(ms(10), |log, queue| {
            log.push(queue.now());
            queue.schedule_once(ms(10), |log, queue| {
                log.push(queue.now());
                queue.schedule_once(ms(50), |log, queue| {
                    log.push(queue.now());
                    Ok(())
                });
                Ok(())
            });
            Ok(())
        });

        let mut log = Vec::new();
        assert_eq!(queue.advance(ms(40), &mut log).unwrap(), 2);
        assert_eq!(log, vec![ms(10), ms(20)]);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.advance(ms(30), &mut log).unwrap(), 1);
        assert_eq!(log[2], ms(70));
    }

    #[test]
    fn test_error_stops_the_step() {
        let mut tree = Tree::new();
        let id = tree.create(ContainerProps::default());
        tree.destroy(id).unwrap();

        let mut queue: TimerQueue<Tree> = TimerQueue::new();
        queue.schedule_once(ms(10), move |tree, _| tree.set_left(id, 1.0));
        queue.schedule_once(ms(20), |_, _| Ok(()));

        let result = queue.advance(ms(50), &mut tree);
        assert!(matches!(result, Err(Error::StaleNode(_))));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.now(), ms(10));
    }
}
