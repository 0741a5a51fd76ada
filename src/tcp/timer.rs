/// The retransmission timer of a sender.
///
/// Time is whatever the caller says it is: the timer only moves forward when
/// [`tick`](RetransmitTimer::tick) is called with the milliseconds elapsed
/// since the previous call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetransmitTimer {
    initial_rto: u64,
    rto: u64,
    state: TimerState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Nothing is outstanding
    Idle,
    /// Counting toward the current RTO
    Running { elapsed: u64 },
    /// The RTO elapsed and the oldest outstanding segment is due to be resent
    Expired,
}

impl RetransmitTimer {
    pub fn new(initial_rto: u64) -> Self {
        Self {
            initial_rto,
            rto: initial_rto,
            state: TimerState::Idle,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// The current retransmission timeout in milliseconds.
    pub fn rto(&self) -> u64 {
        self.rto
    }

    /// Starts counting from zero, whatever the previous state.
    pub fn start(&mut self) {
        self.state = TimerState::Running { elapsed: 0 };
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Idle;
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, TimerState::Idle)
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.state, TimerState::Expired)
    }

    pub fn tick(&mut self, ms_since_last_tick: u64) {
        if let TimerState::Running { elapsed } = self.state {
            let elapsed = elapsed.saturating_add(ms_since_last_tick);
            self.state = if elapsed >= self.rto {
                TimerState::Expired
            } else {
                TimerState::Running { elapsed }
            };
        }
    }

    /// Exponential backoff after a retransmission.
    pub fn double_rto(&mut self) {
        self.rto = self.rto.saturating_mul(2);
    }

    pub fn reset_rto(&mut self) {
        self.rto = self.initial_rto;
    }
}
