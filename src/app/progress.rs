use std::io::{IsTerminal, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use tokio::sync::watch;
use tokio::time::Instant;

const BAR_WIDTH: usize = 30;
const REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// Keeps a single progress line on stderr until `done_rx` flips to `true`.
/// Does nothing when stderr is not a terminal.
pub(crate) fn setup_progress_indicator(
    completed: Arc<AtomicU64>,
    total: u64,
    no_color: bool,
    mut done_rx: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    let run_start = Instant::now();
    let style = ProgressStyle::new(BAR_WIDTH);

    tokio::spawn(async move {
        if !std::io::stderr().is_terminal() {
            return;
        }

        let mut ticker = tokio::time::interval(REFRESH_INTERVAL);

        loop {
            tokio::select! {
                changed = done_rx.changed() => {
                    let finished = changed.is_err() || *done_rx.borrow();
                    if !finished {
                        continue;
                    }
                    let current = completed.load(Ordering::Acquire);
                    let elapsed_ms = run_start.elapsed().as_millis();
                    if render_progress_line(&style, current, total, elapsed_ms, no_color).is_err() {
                        break;
                    }
                    if finish_progress_line().is_err() {
                        break;
                    }
                    break;
                }
                _ = ticker.tick() => {
                    let current = completed.load(Ordering::Acquire);
                    let elapsed_ms = run_start.elapsed().as_millis();
                    if render_progress_line(&style, current, total, elapsed_ms, no_color).is_err() {
                        break;
                    }
                }
            }
        }
    })
}

fn render_progress_line(
    style: &ProgressStyle,
    current: u64,
    goal: u64,
    elapsed_ms: u128,
    no_color: bool,
) -> Result<(), std::io::Error> {
    let line = build_progress_line(style, current, goal, elapsed_ms, no_color);

    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for segment in line {
        if let Some(color) = segment.color {
            queue!(
                out,
                SetForegroundColor(color),
                Print(&segment.text),
                ResetColor
            )?;
        } else {
            queue!(out, Print(&segment.text))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn finish_progress_line() -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn build_progress_line(
    style: &ProgressStyle,
    current: u64,
    goal: u64,
    elapsed_ms: u128,
    no_color: bool,
) -> Vec<ProgressSegment> {
    let size = style.size.max(1);
    let goal = goal.max(1);
    let current = current.min(goal);

    let current_u128 = u128::from(current);
    let goal_u128 = u128::from(goal);
    let size_u128 = u128::from(u64::try_from(size).unwrap_or(u64::MAX));

    let scaled = current_u128
        .saturating_mul(size_u128)
        .checked_div(goal_u128)
        .unwrap_or(0);
    let complete_size = usize::try_from(scaled).unwrap_or(size).min(size);
    let incomplete_size = size.saturating_sub(complete_size);

    let percent_x100 = current_u128
        .saturating_mul(10_000)
        .checked_div(goal_u128)
        .unwrap_or(0);
    let percent_whole = percent_x100.checked_div(100).unwrap_or(0);
    let percent_frac = percent_x100.checked_rem(100).unwrap_or(0);
    let percent_text = format!(" {}.{:02}%", percent_whole, percent_frac);

    let count_text = format!(" | {}/{} req", current, goal);

    let elapsed_tenths = elapsed_ms.checked_div(100).unwrap_or(0);
    let secs = elapsed_tenths.checked_div(10).unwrap_or(0);
    let tenths = elapsed_tenths.checked_rem(10).unwrap_or(0);
    let time_text = format!(" | {}.{}s", secs, tenths);

    let progress_bar = format!(
        "{}{}{}{}",
        style.begin,
        style.fill.repeat(complete_size),
        style.empty.repeat(incomplete_size),
        style.end
    );

    if no_color {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::plain(percent_text),
            ProgressSegment::plain(count_text),
            ProgressSegment::plain(time_text),
        ]
    } else {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::colored(percent_text, Color::Cyan),
            ProgressSegment::colored(count_text, Color::Green),
            ProgressSegment::colored(time_text, Color::Yellow),
        ]
    }
}

struct ProgressStyle {
    size: usize,
    begin: &'static str,
    end: &'static str,
    fill: &'static str,
    empty: &'static str,
}

impl ProgressStyle {
    const fn new(size: usize) -> Self {
        Self {
            size,
            begin: "[",
            end: "]",
            fill: "#",
            empty: "-",
        }
    }
}

struct ProgressSegment {
    text: String,
    color: Option<Color>,
}

impl ProgressSegment {
    const fn plain(text: String) -> Self {
        Self { text, color: None }
    }

    const fn colored(text: String, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}
