use std::time::Duration;

/// Identifies one armed dismissal or exit-guard timer.
///
/// Tokens are never reused; a fired token that no longer matches the armed
/// one is stale and ignored, which is how pending timers get cancelled.
pub type TimerToken = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Loading,
    Success,
    Warning,
    Error,
}

/// What the host surface should currently display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastView {
    pub kind: ToastKind,
    pub message: String,
}

/// Side effects requested by the controller; the host executes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastEffect {
    /// Create the toast or update the existing one in place.
    Render(ToastView),
    /// Start the short exit transition.
    BeginExit,
    /// Take the toast down.
    Remove,
    /// Call back `timer_fired(token)` after `delay`.
    Schedule { token: TimerToken, delay: Duration },
}

/// Standard display delays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastTiming {
    pub success_ttl: Duration,
    pub warning_ttl: Duration,
    pub error_ttl: Duration,
    /// Removal guard: the toast comes down this long after `BeginExit` even
    /// if the host never reports the transition finished.
    pub exit_fallback: Duration,
}

impl Default for ToastTiming {
    fn default() -> Self {
        Self {
            success_ttl: Duration::from_secs(3),
            warning_ttl: Duration::from_secs(4),
            error_ttl: Duration::from_secs(5),
            exit_fallback: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Visible,
    Exiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LiveToast {
    view: ToastView,
    phase: Phase,
    armed: Option<TimerToken>,
}

/// State machine for the single per-page toast.
///
/// At most one toast is live at a time: every `show` is an idempotent upsert
/// of that instance. A sticky suppression flag, set on page navigation or an
/// equivalent dismissal gesture, silences all display until the next
/// dispatch explicitly begins. The controller is pure; it hands back
/// [`ToastEffect`]s and is driven by `timer_fired`/`exit_finished` calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastController {
    live: Option<LiveToast>,
    suppressed: bool,
    next_token: TimerToken,
    timing: ToastTiming,
}

impl ToastController {
    pub fn new(timing: ToastTiming) -> Self {
        Self {
            live: None,
            suppressed: false,
            next_token: 1,
            timing,
        }
    }

    pub fn timing(&self) -> ToastTiming {
        self.timing
    }

    /// The sticky suppression flag is reset here and nowhere else.
    pub fn begin_dispatch(&mut self) {
        self.suppressed = false;
    }

    pub fn suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn live_view(&self) -> Option<&ToastView> {
        self.live.as_ref().map(|live| &live.view)
    }

    /// Upsert the toast. A finite `ttl` arms automatic dismissal, replacing
    /// any previously armed timer; `None` leaves the toast up until a later
    /// call decides otherwise. Emits nothing while suppressed.
    pub fn show(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        ttl: Option<Duration>,
    ) -> Vec<ToastEffect> {
        if self.suppressed {
            return Vec::new();
        }

        let view = ToastView {
            kind,
            message: message.into(),
        };
        let armed = ttl.map(|_| self.allocate_token());
        self.live = Some(LiveToast {
            view: view.clone(),
            phase: Phase::Visible,
            armed,
        });

        let mut effects = vec![ToastEffect::Render(view)];
        if let (Some(token), Some(delay)) = (armed, ttl) {
            effects.push(ToastEffect::Schedule { token, delay });
        }
        effects
    }

    /// Explicitly dismiss the toast through the exit transition.
    pub fn clear(&mut self) -> Vec<ToastEffect> {
        match &self.live {
            Some(live) if live.phase == Phase::Visible => self.start_exit(),
            _ => Vec::new(),
        }
    }

    /// Suppress display for the rest of the page's life and take down any
    /// live toast at once, skipping the exit transition.
    pub fn suppress(&mut self) -> Vec<ToastEffect> {
        self.suppressed = true;
        if self.live.take().is_some() {
            vec![ToastEffect::Remove]
        } else {
            Vec::new()
        }
    }

    /// A scheduled timer fired. Stale tokens are no-ops.
    pub fn timer_fired(&mut self, token: TimerToken) -> Vec<ToastEffect> {
        let Some(live) = &self.live else {
            return Vec::new();
        };
        if live.armed != Some(token) {
            return Vec::new();
        }
        match live.phase {
            Phase::Visible => self.start_exit(),
            Phase::Exiting => {
                self.live = None;
                vec![ToastEffect::Remove]
            }
        }
    }

    /// The host reports the exit transition completed ahead of the guard.
    pub fn exit_finished(&mut self) -> Vec<ToastEffect> {
        match &self.live {
            Some(live) if live.phase == Phase::Exiting => {
                self.live = None;
                vec![ToastEffect::Remove]
            }
            _ => Vec::new(),
        }
    }

    fn start_exit(&mut self) -> Vec<ToastEffect> {
        let guard = self.allocate_token();
        let delay = self.timing.exit_fallback;
        if let Some(live) = &mut self.live {
            live.phase = Phase::Exiting;
            live.armed = Some(guard);
        }
        vec![
            ToastEffect::BeginExit,
            ToastEffect::Schedule {
                token: guard,
                delay,
            },
        ]
    }

    fn allocate_token(&mut self) -> TimerToken {
        let token = self.next_token;
        self.next_token += 1;
        token
    }
}

impl Default for ToastController {
    fn default() -> Self {
        Self::new(ToastTiming::default())
    }
}
