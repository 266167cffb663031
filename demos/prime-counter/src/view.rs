//! Terminal view
//!
//! The view reads state only through its scoped stores and answers key
//! presses only by sending actions through them. Whether the prime modal is
//! open is presentation state and lives here, not in the store.

use std::cell::Cell;
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use scope_dispatch::{ScopedStore, StoreError};

use crate::action::{CounterAction, CounterViewAction, NthPrimeAction, PrimeModalAction};
use crate::reducer::is_prime;
use crate::state::{ordinal, CounterViewState, PrimeModalState};

/// Result of handling a key press
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not bound in the current mode
    Ignored,
    /// Handled; the screen should be redrawn
    Handled,
    /// Exit the application
    Quit,
}

/// Everything one frame needs
#[derive(Clone, Debug, PartialEq)]
pub struct Screen {
    pub counter: CounterViewState,
    /// Present while the prime modal is open
    pub modal: Option<PrimeModalState>,
}

pub struct CounterUi {
    counter: ScopedStore<CounterViewState, CounterViewAction>,
    modal: ScopedStore<PrimeModalState, PrimeModalAction>,
    modal_open: bool,
    dirty: Rc<Cell<bool>>,
}

impl CounterUi {
    /// Build the view on top of the counter screen's scoped store
    pub fn new(
        counter: ScopedStore<CounterViewState, CounterViewAction>,
    ) -> Result<Self, StoreError> {
        let modal = counter.scope(PrimeModalState::project, CounterViewAction::PrimeModal);

        let dirty = Rc::new(Cell::new(true));
        let flag = Rc::clone(&dirty);
        counter.subscribe_distinct(move |_: &CounterViewState| flag.set(true))?;

        Ok(Self {
            counter,
            modal,
            modal_open: false,
            dirty,
        })
    }

    /// Whether anything visible changed since the last call
    pub fn take_dirty(&self) -> bool {
        self.dirty.replace(false)
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// Snapshot the state for rendering
    pub fn screen(&self) -> Result<Screen, StoreError> {
        let modal = if self.modal_open {
            Some(self.modal.current_state()?)
        } else {
            None
        };
        Ok(Screen {
            counter: self.counter.current_state()?,
            modal,
        })
    }

    /// Map a key press to actions
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<KeyOutcome, StoreError> {
        if key.kind != KeyEventKind::Press {
            return Ok(KeyOutcome::Ignored);
        }
        if key.code == KeyCode::Char('q')
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            return Ok(KeyOutcome::Quit);
        }

        let (count, is_loading, has_alert) = self.counter.with_state(|state| {
            (
                state.count,
                state.nth_prime.is_loading,
                state.nth_prime.alert.is_some(),
            )
        })?;

        if has_alert {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') => {
                    self.counter
                        .send(NthPrimeAction::AlertDismissed.into())?;
                    Ok(KeyOutcome::Handled)
                }
                _ => Ok(KeyOutcome::Ignored),
            };
        }

        if self.modal_open {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('p') => {
                    self.modal_open = false;
                    Ok(KeyOutcome::Handled)
                }
                KeyCode::Enter | KeyCode::Char('s') => {
                    let modal = self.modal.current_state()?;
                    let action = if modal.is_favorite() {
                        PrimeModalAction::RemoveFavoritePrime
                    } else if is_prime(modal.count) {
                        PrimeModalAction::SaveFavoritePrime
                    } else {
                        return Ok(KeyOutcome::Ignored);
                    };
                    self.modal.send(action)?;
                    Ok(KeyOutcome::Handled)
                }
                _ => Ok(KeyOutcome::Ignored),
            };
        }

        let action: CounterViewAction = match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Char('k') | KeyCode::Up => {
                CounterAction::Increment.into()
            }
            KeyCode::Char('-') | KeyCode::Char('j') | KeyCode::Down => {
                CounterAction::Decrement.into()
            }
            KeyCode::Char('p') => {
                self.modal_open = true;
                return Ok(KeyOutcome::Handled);
            }
            KeyCode::Char('n') if !is_loading => NthPrimeAction::Requested(count).into(),
            _ => return Ok(KeyOutcome::Ignored),
        };
        self.counter.send(action)?;
        Ok(KeyOutcome::Handled)
    }
}

impl std::fmt::Debug for CounterUi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounterUi")
            .field("modal_open", &self.modal_open)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Rendering
// ============================================================================

pub fn render(frame: &mut Frame, screen: &Screen) {
    let area = frame.area();
    let [main, help_area] =
        Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);

    render_counter(frame, main, &screen.counter);

    let help = match (&screen.counter.nth_prime.alert, &screen.modal) {
        (Some(_), _) => "Enter/Esc: dismiss",
        (None, Some(_)) => "s/Enter: save or remove  p/Esc: close  q: quit",
        (None, None) => "+/k: +1  -/j: -1  p: is this prime?  n: nth prime  q: quit",
    };
    frame.render_widget(
        Paragraph::new(help)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        help_area,
    );

    if let Some(modal) = &screen.modal {
        render_modal(frame, centered(area, 40, 7), modal);
    }
    if let Some(alert) = &screen.counter.nth_prime.alert {
        let popup = centered(area, 40, 5);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(alert.message())
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title(" Nth prime ")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                ),
            popup,
        );
    }
}

fn render_counter(frame: &mut Frame, area: Rect, state: &CounterViewState) {
    let [_, center, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(8),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, center, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(44),
        Constraint::Fill(1),
    ])
    .flex(Flex::Center)
    .areas(center);

    let nth_line = if state.nth_prime.is_loading {
        Line::from(Span::styled(
            "Looking it up...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from(format!("What is the {} prime?", ordinal(state.count)))
    };

    let favorites = if state.favorite_primes.is_empty() {
        "none".to_string()
    } else {
        state
            .favorite_primes
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };

    let lines = vec![
        Line::from(vec![
            Span::raw("-  "),
            Span::styled(
                state.count.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  +"),
        ]),
        Line::from("Is this prime?"),
        nth_line,
        Line::from(""),
        Line::from(Span::styled(
            format!("Favorite primes: {favorites}"),
            Style::default().fg(Color::Green),
        )),
    ];

    let block = Block::default()
        .title(" Counter demo ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        center,
    );
}

fn render_modal(frame: &mut Frame, area: Rect, state: &PrimeModalState) {
    let mut lines = Vec::new();
    if is_prime(state.count) {
        lines.push(Line::from(format!("{} is prime!", state.count)));
        if state.is_favorite() {
            lines.push(Line::from("[s] Remove from favorite primes"));
        } else {
            lines.push(Line::from("[s] Save to favorite primes"));
        }
    } else {
        lines.push(Line::from(format!("{} is not prime :(", state.count)));
        if state.is_favorite() {
            lines.push(Line::from("[s] Remove from favorite primes"));
        }
    }

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .title(" Is this prime? ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        ),
        area,
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [_, row, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(area);
    let [_, cell, _] = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width),
        Constraint::Fill(1),
    ])
    .areas(row);
    cell
}
