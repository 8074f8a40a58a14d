//! Runtime: terminal lifecycle and the event loop.
//!
//! A dedicated task forwards `crossterm` events over a channel; the loop
//! selects over input, an adaptive ticker, finished background requests and
//! Ctrl+C. Effects returned by components are applied right after the event
//! that produced them: view changes first, then background commands.
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers, MouseEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::{StreamExt, stream::FuturesUnordered};
use rat_focus::FocusBuilder;
use ratatui::{Terminal, prelude::*};
use tokio::{
    signal,
    sync::mpsc,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, warn};
use workbench_types::{Effect, ExecOutcome, Msg};

use crate::app::{App, TuiOptions};
use crate::cmd;
use crate::ui::components::component::Component;
use crate::ui::main_component::MainView;

/// Effects may queue follow-ups; stop after this many rounds per event.
const MAX_EFFECT_ROUNDS: usize = 8;

/// Forward terminal input over a channel, dropping mouse moves that arrive
/// within 16 ms of the previous one.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);

    tokio::spawn(async move {
        let frame = Duration::from_millis(16);
        let mut last_mouse_move = Instant::now();
        loop {
            match event::poll(frame) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(error) => {
                    warn!(%error, "failed to poll terminal input");
                    break;
                }
            }
            match event::read() {
                Ok(event) => {
                    let is_mouse_move = event.as_mouse_event().is_some_and(|mouse| mouse.kind == MouseEventKind::Moved);
                    if is_mouse_move {
                        if last_mouse_move.elapsed() < frame {
                            continue;
                        }
                        last_mouse_move = Instant::now();
                    }
                    if let Err(error) = sender.send(event).await {
                        warn!(%error, "input receiver dropped");
                        break;
                    }
                }
                Err(error) => {
                    warn!(%error, "failed to read terminal input");
                    break;
                }
            }
        }
    });
    receiver
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

fn render(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, app: &mut App, main_view: &mut MainView) -> Result<()> {
    // Rebuild focus just before rendering so structure changes are reflected
    let old_focus = std::mem::take(&mut app.focus);
    app.focus = FocusBuilder::rebuild_for(app, Some(old_focus));
    if app.focus.focused().is_none() {
        main_view.restore_focus(app);
    }
    terminal.draw(|frame| main_view.render(frame, frame.area(), app))?;
    Ok(())
}

fn handle_input_event(app: &mut App, main_view: &mut MainView, input_event: Event) -> Vec<Effect> {
    match input_event {
        Event::Key(key_event) => main_view.handle_key_events(app, key_event),
        Event::Mouse(mouse_event) => main_view.handle_mouse_events(app, mouse_event),
        Event::Resize(width, height) => main_view.handle_message(app, &Msg::Resize(width, height)),
        Event::FocusGained | Event::FocusLost | Event::Paste(_) => Vec::new(),
    }
}

/// Apply `effects` and whatever they cascade into; background requests are
/// pushed onto `pending_execs`.
fn process_effects(
    app: &mut App,
    main_view: &mut MainView,
    mut effects: Vec<Effect>,
    pending_execs: &mut FuturesUnordered<JoinHandle<ExecOutcome>>,
) {
    for _ in 0..MAX_EFFECT_ROUNDS {
        if effects.is_empty() {
            return;
        }
        let remaining = main_view.apply_view_effects(app, effects);
        let batch = cmd::run_from_effects(app, remaining);
        pending_execs.extend(batch.pending);

        effects = Vec::new();
        for outcome in batch.immediate {
            effects.extend(main_view.handle_message(app, &Msg::ExecCompleted(Box::new(outcome))));
        }
    }
    if !effects.is_empty() {
        warn!(dropped = effects.len(), "effect cascade did not settle");
    }
}

/// Sets up the terminal, runs the event loop until Ctrl+C and restores the
/// terminal.
pub async fn run_app(options: TuiOptions) -> Result<()> {
    let mut input_receiver = spawn_input_thread();
    let mut app = App::new(options);
    let mut main_view = MainView::new();
    main_view.sync_route(&mut app);

    let mut terminal = setup_terminal()?;
    let mut pending_execs: FuturesUnordered<JoinHandle<ExecOutcome>> = FuturesUnordered::new();

    // Fast ticks drive the throbber while a request is in flight.
    let fast_interval = Duration::from_millis(100);
    let idle_interval = Duration::from_millis(5000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    render(&mut terminal, &mut app, &mut main_view)?;

    loop {
        let needs_animation = app.is_executing();
        let target_interval = if needs_animation { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let mut needs_render = false;
        let mut effects = Vec::new();
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    debug!("input channel closed");
                    break;
                };
                if let Event::Key(key_event) = event
                    && key_event.code == KeyCode::Char('c')
                    && key_event.modifiers.contains(KeyModifiers::CONTROL)
                {
                    break;
                }
                effects.extend(handle_input_event(&mut app, &mut main_view, event));
                needs_render = true;
            }

            _ = ticker.tick() => {
                effects.extend(main_view.handle_message(&mut app, &Msg::Tick));
                needs_render = needs_animation;
            }

            Some(joined) = pending_execs.next(), if !pending_execs.is_empty() => {
                let outcome = joined.unwrap_or_else(|error| ExecOutcome::Log(format!("Background task failed: {error}")));
                effects.extend(main_view.handle_message(&mut app, &Msg::ExecCompleted(Box::new(outcome))));
                if !app.is_executing() {
                    app.throbber_idx = 0;
                }
                needs_render = true;
            }

            _ = signal::ctrl_c() => { break; }
        }

        if !effects.is_empty() {
            process_effects(&mut app, &mut main_view, effects, &mut pending_execs);
            needs_render = true;
        }
        if needs_render {
            render(&mut terminal, &mut app, &mut main_view)?;
        }
    }

    if !pending_execs.is_empty() {
        debug!(pending = pending_execs.len(), "abandoning in-flight requests");
    }
    cleanup_terminal(&mut terminal)?;
    Ok(())
}
