use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;
use edge_anim::animation::keyframes::distinct_offsets;
use edge_anim::animation::{
    Animator, FINISH_EPSILON_MS, FillMode, IterationCount, Keyframe, PlayState, PlaybackDirection,
    Timing, compile_keyframes, parse_animation,
};
use edge_anim::host::memory::{MemoryElement, MemoryHost, RecordedWrite};

fn fade() -> Vec<Keyframe> {
    vec![
        Keyframe::new(0.0).set("opacity", 0.0),
        Keyframe::new(1.0).set("opacity", 1.0),
    ]
}

#[test]
fn identical_declarations_share_one_rule() {
    let host = MemoryHost::new();
    let animator = Animator::new(host.host());

    let ordered = [
        Keyframe::new(0.0).set("opacity", 0.0).set("transform", "scale(1)"),
        Keyframe::new(1.0).set("opacity", 1.0),
    ];
    let shuffled = [
        Keyframe::new(1.0).set("opacity", 1.0),
        Keyframe::new(0.0).set("transform", "scale(1)"),
        Keyframe::new(0.0).set("opacity", 0.0),
    ];

    let a = animator.animate(Rc::new(MemoryElement::new()), &ordered, Timing::new(100.0));
    let b = animator.animate(Rc::new(MemoryElement::new()), &shuffled, Timing::new(100.0));
    assert_eq!(a.name(), b.name());
    assert_eq!(animator.registry().len(), 1);

    host.tick();
    let sheets = host.document().style_sheets();
    assert_eq!(sheets.len(), 1, "one stylesheet for the whole process");
    assert_eq!(sheets[0].replacements(), 1, "inserts in one tick coalesce");
}

#[test]
fn compiled_offsets_are_ascending_and_complete() {
    let keyframes = [
        Keyframe::new(0.75).set("opacity", 0.2),
        Keyframe::new(0.0).set("opacity", 0.0),
        Keyframe::new(1.0).set("opacity", 1.0),
        Keyframe::new(0.25).set("opacity", 0.9),
        Keyframe::new(0.75).set("color", "red"),
    ];
    let compiled = compile_keyframes(&keyframes);
    let emitted: Vec<&str> = compiled
        .lines()
        .filter_map(|block| block.split('%').next())
        .collect();
    let expected: Vec<String> = distinct_offsets(&keyframes)
        .into_iter()
        .map(|offset| format!("{}", offset * 100.0))
        .collect();
    assert_eq!(emitted, expected);
    assert_eq!(emitted, vec!["0", "25", "75", "100"]);
}

#[test]
fn finish_lands_exactly_on_the_boundary_without_fill() {
    let host = MemoryHost::new();
    let animator = Animator::new(host.host());
    let animation = animator.animate(Rc::new(MemoryElement::new()), &fade(), Timing::new(1000.0));

    assert_eq!(animation.play_state(), PlayState::Running);
    animation.finish();
    assert_eq!(animation.play_state(), PlayState::Finished);
    assert_eq!(animation.current_time(), Some(1000.0));
}

#[test]
fn cancel_then_play_restarts_from_zero() {
    let host = MemoryHost::new();
    let animator = Animator::new(host.host());
    let animation = animator.animate(Rc::new(MemoryElement::new()), &fade(), Timing::new(1000.0));

    host.advance(400.0);
    animation.cancel();
    assert_eq!(animation.play_state(), PlayState::Idle);
    assert_eq!(animation.current_time(), None);

    host.advance(100.0);
    animation.play();
    assert_eq!(animation.play_state(), PlayState::Running);
    assert_eq!(animation.current_time(), Some(0.0));
}

#[test]
fn forwards_fill_pins_just_inside_the_end() {
    let host = MemoryHost::new();
    let animator = Animator::new(host.host());
    let element = Rc::new(MemoryElement::new());
    let animation = animator.animate(
        element.clone(),
        &fade(),
        Timing::new(1000.0).fill(FillMode::Forwards),
    );

    host.advance(1200.0);
    assert_eq!(animation.play_state(), PlayState::Finished);
    let time = animation.current_time().unwrap_or_default();
    assert!((time - (1000.0 - FINISH_EPSILON_MS)).abs() < 1e-9, "pinned at {time}");
    assert!(time < 1000.0);
    assert_eq!(
        element.property("animation-play-state").as_deref(),
        Some("paused")
    );
    assert_eq!(
        element.property("animation-fill-mode").as_deref(),
        Some("forwards")
    );
}

#[test]
fn reverse_flips_direction_without_a_jump() {
    let host = MemoryHost::new();
    let animator = Animator::new(host.host());
    let animation = animator.animate(Rc::new(MemoryElement::new()), &fade(), Timing::new(1000.0));

    host.advance(300.0);
    let before = animation.current_time();
    animation.reverse();
    assert_eq!(animation.current_time(), before);

    host.advance(50.0);
    assert_eq!(animation.current_time(), Some(250.0));
}

#[test]
fn alternate_direction_maps_local_time() {
    let host = MemoryHost::new();
    let animator = Animator::new(host.host());
    let element = Rc::new(MemoryElement::new());
    let animation = animator.animate(
        element.clone(),
        &fade(),
        Timing::new(500.0)
            .iterations(IterationCount::Count(2.0))
            .direction(PlaybackDirection::Alternate),
    );

    animation.pause();
    animation.seek(750.0);
    assert_eq!(animation.local_time(), Some(500.0 - 750.0 % 500.0));
    assert_eq!(element.property("animation-delay").as_deref(), Some("-250ms"));

    animation.seek(250.0);
    assert_eq!(animation.local_time(), Some(250.0 % 500.0));
}

#[test]
fn pause_twice_does_not_drift() {
    let host = MemoryHost::new();
    let animator = Animator::new(host.host());
    let animation = animator.animate(Rc::new(MemoryElement::new()), &fade(), Timing::new(1000.0));

    host.advance(120.0);
    animation.pause();
    let first = animation.current_time();
    host.advance(500.0);
    animation.pause();
    assert_eq!(animation.current_time(), first);
    assert_eq!(first, Some(120.0));
}

#[test]
fn each_update_restarts_the_declarative_animation() {
    let host = MemoryHost::new();
    let animator = Animator::new(host.host());
    let element = Rc::new(MemoryElement::new());
    let animation = animator.animate(element.clone(), &fade(), Timing::new(1000.0));
    let name = animation.name();

    host.advance(200.0);
    element.clear_writes();
    animation.pause();

    let writes = element.writes();
    let tail = &writes[writes.len() - 5..];
    assert_eq!(
        tail,
        &[
            RecordedWrite::Remove("animation-name".to_string()),
            RecordedWrite::Reflow,
            RecordedWrite::Set("animation-delay".to_string(), "-200ms".to_string()),
            RecordedWrite::Set("animation-play-state".to_string(), "paused".to_string()),
            RecordedWrite::Set("animation-name".to_string(), name),
        ]
    );
}

#[test]
fn callbacks_fire_once_per_event() {
    let host = MemoryHost::new();
    let animator = Animator::new(host.host());
    let animation = animator.animate(Rc::new(MemoryElement::new()), &fade(), Timing::new(300.0));
    let finishes = Rc::new(Cell::new(0));
    let cancels = Rc::new(Cell::new(0));
    {
        let finishes = finishes.clone();
        animation.on_finish(move || finishes.set(finishes.get() + 1));
        let cancels = cancels.clone();
        animation.on_cancel(move || cancels.set(cancels.get() + 1));
    }

    host.advance(1000.0);
    animation.sample();
    host.advance(1000.0);
    assert_eq!(finishes.get(), 1);

    animation.cancel();
    animation.cancel();
    assert_eq!(cancels.get(), 1);

    let events = animator.drain_events();
    assert_eq!(events.len(), 2);
    assert!(events[0].is_finished());
    assert!(events[1].is_cancelled());
}

#[test]
fn dropped_animations_leave_no_timers() {
    let host = MemoryHost::new();
    let animator = Animator::new(host.host());
    for _ in 0..3 {
        animator.animate(Rc::new(MemoryElement::new()), &fade(), Timing::new(1000.0));
    }
    host.tick();
    assert!(host.timers().is_empty());
}

#[test]
fn animation_from_json() -> Result<()> {
    let spec = parse_animation(
        r#"{
            "keyframes": [
                {"offset": 0, "opacity": 0, "easing": "ease-in"},
                {"offset": 1, "opacity": 1}
            ],
            "timing": {"duration": 400, "delay": 100, "fill": "both", "iterations": "infinite"}
        }"#,
    )?;

    let host = MemoryHost::new();
    let animator = Animator::new(host.host());
    let element = Rc::new(MemoryElement::new());
    let animation = animator.animate_spec(element.clone(), &spec);

    assert_eq!(
        element.property("animation-iteration-count").as_deref(),
        Some("infinite")
    );
    assert_eq!(element.property("animation-duration").as_deref(), Some("400ms"));
    assert!(!animation.has_pending_finish());

    host.advance(5000.0);
    assert_eq!(animation.play_state(), PlayState::Running);

    let text = animator.registry().stylesheet_text();
    assert_eq!(
        text,
        format!(
            "@keyframes {}{{0%{{animation-timing-function:ease-in;opacity:0}}\n100%{{opacity:1}}}}",
            animation.name()
        )
    );
    Ok(())
}
