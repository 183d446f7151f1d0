use std::sync::Once;
use std::time::Duration;

use clipper_core::{TimerToken, ToastController, ToastEffect, ToastKind, ToastTiming, ToastView};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(clipper_logging::initialize_for_tests);
}

fn scheduled_token(effects: &[ToastEffect]) -> TimerToken {
    effects
        .iter()
        .find_map(|effect| match effect {
            ToastEffect::Schedule { token, .. } => Some(*token),
            _ => None,
        })
        .expect("a timer should have been scheduled")
}

fn view(kind: ToastKind, message: &str) -> ToastView {
    ToastView {
        kind,
        message: message.to_string(),
    }
}

#[test]
fn show_is_an_upsert_of_a_single_toast() {
    init_logging();
    let mut controller = ToastController::default();

    let first = controller.show(ToastKind::Loading, "Capturing page...", None);
    assert_eq!(
        first,
        vec![ToastEffect::Render(view(ToastKind::Loading, "Capturing page..."))]
    );

    let second = controller.show(ToastKind::Loading, "Processing...", None);
    assert_eq!(
        second,
        vec![ToastEffect::Render(view(ToastKind::Loading, "Processing..."))]
    );
    assert_eq!(
        controller.live_view(),
        Some(&view(ToastKind::Loading, "Processing..."))
    );
}

#[test]
fn timed_toast_walks_through_exit_to_removal() {
    init_logging();
    let mut controller = ToastController::default();
    let ttl = Duration::from_secs(3);

    let shown = controller.show(ToastKind::Success, "Saved", Some(ttl));
    assert_eq!(shown[0], ToastEffect::Render(view(ToastKind::Success, "Saved")));
    let dismiss = scheduled_token(&shown);
    assert_eq!(shown[1], ToastEffect::Schedule { token: dismiss, delay: ttl });

    let exiting = controller.timer_fired(dismiss);
    assert_eq!(exiting[0], ToastEffect::BeginExit);
    let guard = scheduled_token(&exiting);
    assert_eq!(
        exiting[1],
        ToastEffect::Schedule {
            token: guard,
            delay: ToastTiming::default().exit_fallback,
        }
    );

    assert_eq!(controller.timer_fired(guard), vec![ToastEffect::Remove]);
    assert_eq!(controller.live_view(), None);
}

#[test]
fn rearming_stales_the_previous_timer() {
    init_logging();
    let mut controller = ToastController::default();
    let ttl = Duration::from_secs(5);

    let first = controller.show(ToastKind::Error, "network error", Some(ttl));
    let stale = scheduled_token(&first);
    let second = controller.show(ToastKind::Error, "network error", Some(ttl));
    let armed = scheduled_token(&second);

    assert_eq!(controller.timer_fired(stale), Vec::new());
    assert_eq!(controller.timer_fired(armed)[0], ToastEffect::BeginExit);
}

#[test]
fn early_exit_report_beats_the_guard() {
    init_logging();
    let mut controller = ToastController::default();

    let shown = controller.show(ToastKind::Success, "Saved", Some(Duration::from_secs(3)));
    let exiting = controller.timer_fired(scheduled_token(&shown));
    let guard = scheduled_token(&exiting);

    assert_eq!(controller.exit_finished(), vec![ToastEffect::Remove]);
    // The guard is stale once the exit has been completed.
    assert_eq!(controller.timer_fired(guard), Vec::new());
    assert_eq!(controller.exit_finished(), Vec::new());
}

#[test]
fn clear_only_acts_on_a_visible_toast() {
    init_logging();
    let mut controller = ToastController::default();
    assert_eq!(controller.clear(), Vec::new());

    controller.show(ToastKind::Loading, "Capturing page...", None);
    let exiting = controller.clear();
    assert_eq!(exiting[0], ToastEffect::BeginExit);

    assert_eq!(controller.clear(), Vec::new());
}

#[test]
fn suppression_is_sticky_until_the_next_dispatch() {
    init_logging();
    let mut controller = ToastController::default();

    controller.show(ToastKind::Loading, "Capturing page...", None);
    assert_eq!(controller.suppress(), vec![ToastEffect::Remove]);
    assert!(controller.suppressed());

    assert_eq!(
        controller.show(ToastKind::Error, "network error", None),
        Vec::new()
    );
    assert_eq!(controller.live_view(), None);

    controller.begin_dispatch();
    assert!(!controller.suppressed());
    let shown = controller.show(ToastKind::Loading, "Capturing page...", None);
    assert_eq!(shown.len(), 1);
}

#[test]
fn suppressing_without_a_toast_emits_nothing() {
    init_logging();
    let mut controller = ToastController::default();
    assert_eq!(controller.suppress(), Vec::new());
    assert!(controller.suppressed());
}

#[test]
fn suppression_skips_the_exit_transition() {
    init_logging();
    let mut controller = ToastController::default();

    let shown = controller.show(ToastKind::Success, "Saved", Some(Duration::from_secs(3)));
    let dismiss = scheduled_token(&shown);

    assert_eq!(controller.suppress(), vec![ToastEffect::Remove]);
    // The pending dismissal is stale now that the toast is gone.
    assert_eq!(controller.timer_fired(dismiss), Vec::new());
}

#[test]
fn showing_during_exit_revives_the_toast() {
    init_logging();
    let mut controller = ToastController::default();

    let shown = controller.show(ToastKind::Success, "Saved", Some(Duration::from_secs(3)));
    let exiting = controller.timer_fired(scheduled_token(&shown));
    let guard = scheduled_token(&exiting);

    let revived = controller.show(ToastKind::Loading, "Capturing page...", None);
    assert_eq!(
        revived,
        vec![ToastEffect::Render(view(ToastKind::Loading, "Capturing page..."))]
    );

    // Neither the stale guard nor an exit report may take the revived toast down.
    assert_eq!(controller.timer_fired(guard), Vec::new());
    assert_eq!(controller.exit_finished(), Vec::new());
    assert_eq!(
        controller.live_view(),
        Some(&view(ToastKind::Loading, "Capturing page..."))
    );
}

#[test]
fn timers_without_a_live_toast_are_ignored() {
    init_logging();
    let mut controller = ToastController::default();
    assert_eq!(controller.timer_fired(7), Vec::new());
    assert_eq!(controller.exit_finished(), Vec::new());
}
