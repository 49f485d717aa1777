use std::sync::atomic::Ordering;
use std::time::Duration;

use canvas_pacer::render::ui::HeadlessRenderer;
use canvas_pacer::{Application, PacerConfig};

// Built outside any runtime: deferred repaints use the dedicated timer thread.
#[test]
fn headless_run_paces_frames_against_a_fast_producer() {
    let renderer = HeadlessRenderer::new(120, 40);
    let frames = renderer.frame_counter();
    let config = PacerConfig::default()
        .with_fixed_interval(25)
        .with_tick_hz(1000);

    let mut app = Application::new(config, Box::new(renderer)).unwrap();
    let summary = tokio_test::block_on(app.run_for(Duration::from_millis(400))).unwrap();

    let drawn = frames.load(Ordering::Relaxed);
    assert_eq!(drawn, summary.frames);
    assert!(drawn >= 2, "frames: {drawn}");
    // 25ms minimum spacing over ~400ms, plus the first immediate frame
    assert!(drawn <= 18, "frames: {drawn}");

    // The producer ticked far more often than the canvas was drawn.
    assert!(summary.stats.dirty_notifications > summary.frames);
    assert!(summary.stats.coalesced_notifications > 0);
    assert_eq!(summary.stats.completions, summary.frames);
    assert_eq!(summary.stats.ignored_completions, 0);
}

#[test]
fn app_built_inside_runtime_defers_repaints_on_tokio_timers() {
    let renderer = HeadlessRenderer::default();
    let frames = renderer.frame_counter();

    let summary = tokio_test::block_on(async {
        let config = PacerConfig::default()
            .with_fixed_interval(30)
            .with_tick_hz(2000);
        let mut app = Application::new(config, Box::new(renderer))?;
        app.run_for(Duration::from_millis(300)).await
    })
    .unwrap();

    assert_eq!(frames.load(Ordering::Relaxed), summary.frames);
    assert!(summary.stats.deferred_redraws > 0, "stats: {:?}", summary.stats);
    assert_eq!(summary.stats.stale_timer_firings, 0);
    assert_eq!(summary.stats.completions, summary.frames);
    // 30ms spacing over ~300ms
    assert!(summary.frames <= 12, "frames: {}", summary.frames);
}

#[test]
fn paused_simulation_still_draws_the_initial_frame() {
    let renderer = HeadlessRenderer::default();
    let frames = renderer.frame_counter();
    let mut app = Application::new(PacerConfig::default(), Box::new(renderer)).unwrap();
    app.control().toggle_pause();

    let summary = tokio_test::block_on(app.run_for(Duration::from_millis(150))).unwrap();

    assert_eq!(summary.ticks, 0);
    assert_eq!(frames.load(Ordering::Relaxed), 1);
    assert!(app.coordinator().is_idle());
    assert_eq!(app.coordinator().clean_epoch(), app.coordinator().dirty_epoch());
}

#[test]
fn invalid_config_is_rejected_before_anything_starts() {
    let config = PacerConfig::default().with_tick_hz(0);
    let result = Application::new(config, Box::new(HeadlessRenderer::default()));
    assert!(result.is_err());
}
