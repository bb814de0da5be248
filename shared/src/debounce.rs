/// Identifies one scheduled redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket {
    generation: u64,
    /// Time (ms) the redraw is due.
    pub fire_at: u64,
}

/// Coalesces bursts of resize events: every `schedule` supersedes the
/// previous ticket, so only the last one in a burst is honored.
#[derive(Debug, Clone)]
pub struct ResizeDebounce {
    quiet_ms: u64,
    generation: u64,
    pending: bool,
}

impl ResizeDebounce {
    pub fn new(quiet_ms: u64) -> Self {
        Self {
            quiet_ms,
            generation: 0,
            pending: false,
        }
    }

    pub fn quiet_ms(&self) -> u64 {
        self.quiet_ms
    }

    /// Register an event at `now` and return the ticket for the redraw it
    /// would trigger.
    pub fn schedule(&mut self, now: u64) -> DebounceTicket {
        self.generation += 1;
        self.pending = true;
        DebounceTicket {
            generation: self.generation,
            fire_at: now + self.quiet_ms,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Claim the redraw for `ticket`. Fails for superseded or already
    /// claimed tickets.
    pub fn take(&mut self, ticket: DebounceTicket) -> bool {
        if self.pending && ticket.generation == self.generation {
            self.pending = false;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fire every ticket in due order, returning the times that redrew.
    fn run(debounce: &mut ResizeDebounce, mut tickets: Vec<DebounceTicket>) -> Vec<u64> {
        tickets.sort_by_key(|t| t.fire_at);
        tickets
            .into_iter()
            .filter(|t| debounce.take(*t))
            .map(|t| t.fire_at)
            .collect()
    }

    #[test]
    fn burst_collapses_to_one_redraw_after_last_event() {
        let mut d = ResizeDebounce::new(100);
        let tickets: Vec<DebounceTicket> =
            [0, 12, 25, 37, 50].iter().map(|&t| d.schedule(t)).collect();
        assert_eq!(run(&mut d, tickets), vec![150]);
        assert!(!d.is_pending());
    }

    #[test]
    fn separate_bursts_each_redraw() {
        let mut d = ResizeDebounce::new(100);
        let first = d.schedule(0);
        assert!(d.take(first));
        let second = d.schedule(500);
        assert_eq!(second.fire_at, 600);
        assert!(d.take(second));
    }

    #[test]
    fn ticket_claims_once() {
        let mut d = ResizeDebounce::new(100);
        let t = d.schedule(0);
        assert!(d.take(t));
        assert!(!d.take(t));
    }
}
