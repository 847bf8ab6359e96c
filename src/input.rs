use std::{sync::{Arc, Mutex}, time::Duration};
use crossterm::event::KeyCode;
use tokio::runtime::Runtime;
use arboard::Clipboard;
use anyhow::Result;
use tracing::debug;
use crate::catalog::Painting;
use crate::chat::{ChatSession, SubmitError, deliver_reply, lock_session};
use crate::models::{AppState, FocusArea, NAV_ITEMS};
use crate::responder::{RandomSource, ResponderEngine};
use crate::tracker::SectionId;

/// Handles one key press. Returns `Ok(false)` when the app should quit.
pub fn handle_key<R: RandomSource>(
    key: KeyCode,
    app: &mut AppState,
    catalog: &[Painting],
    session: &Arc<Mutex<ChatSession>>,
    responder: &mut ResponderEngine<R>,
    reply_delay: Duration,
    rt: &Runtime,
) -> Result<bool> {
    app.status = None;
    match app.focus {
        FocusArea::Page => handle_page_key(key, app, catalog, session),
        FocusArea::Modal => {
            handle_modal_key(key, app, catalog);
            Ok(true)
        }
        FocusArea::Chat => {
            handle_chat_key(key, app, session, responder, reply_delay, rt);
            Ok(true)
        }
    }
}

fn handle_page_key(
    key: KeyCode,
    app: &mut AppState,
    catalog: &[Painting],
    session: &Arc<Mutex<ChatSession>>,
) -> Result<bool> {
    let page_step = i32::from(app.viewport_height.max(2) - 1);
    match key {
        KeyCode::Char('q') => return Ok(false),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_by(1),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_by(-1),
        KeyCode::PageDown | KeyCode::Char(' ') => app.scroll_by(page_step),
        KeyCode::PageUp => app.scroll_by(-page_step),
        KeyCode::Home | KeyCode::Char('g') => app.scroll_to(0),
        KeyCode::End | KeyCode::Char('G') => app.scroll_to(app.max_scroll),
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            let section = SectionId::from(NAV_ITEMS[index].section);
            if !app.jump_to(&section) {
                debug!(section = %section, "no anchor for section");
            }
        }
        KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.select_card(1),
        KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.select_card(-1),
        KeyCode::Enter => {
            if let Some(painting) = catalog.get(app.selected_card) {
                debug!(painting = %painting.id, "opening detail view");
                app.open_modal(painting.media().len(), painting.main_media_index());
            }
        }
        KeyCode::Char('?') | KeyCode::Char('c') => {
            let mut session = lock_session(session);
            session.open = !session.open;
            if session.open {
                app.focus = FocusArea::Chat;
            }
        }
        _ => {}
    }
    Ok(true)
}

fn handle_modal_key(key: KeyCode, app: &mut AppState, catalog: &[Painting]) {
    match key {
        KeyCode::Esc | KeyCode::Char('q') => app.close_modal(),
        KeyCode::Left | KeyCode::Char('h') => {
            if let Some(modal) = app.modal.as_mut() {
                modal.prev_media();
            }
        }
        KeyCode::Right | KeyCode::Char('l') => {
            if let Some(modal) = app.modal.as_mut() {
                modal.next_media();
            }
        }
        KeyCode::Char('c') => {
            let summary = app
                .modal
                .as_ref()
                .and_then(|modal| catalog.get(modal.painting))
                .map(Painting::summary);
            if let Some(summary) = summary {
                let mut clipboard = Clipboard::new().ok();
                let copied = clipboard.as_mut().is_some_and(|cb| cb.set_text(summary).is_ok());
                app.status = Some(if copied {
                    "Details copied to clipboard".to_string()
                } else {
                    "Clipboard is not available".to_string()
                });
            }
        }
        _ => {}
    }
}

fn handle_chat_key<R: RandomSource>(
    key: KeyCode,
    app: &mut AppState,
    session: &Arc<Mutex<ChatSession>>,
    responder: &mut ResponderEngine<R>,
    reply_delay: Duration,
    rt: &Runtime,
) {
    let mut guard = lock_session(session);
    match key {
        KeyCode::Esc => {
            guard.open = false;
            app.focus = FocusArea::Page;
        }
        KeyCode::Enter => {
            let submitted = guard.submit_input();
            drop(guard);
            match submitted {
                Ok(pending) => {
                    let reply = responder.respond(&pending.prompt);
                    debug!(message_id = pending.message_id, delay_ms = reply_delay.as_millis() as u64, "reply scheduled");
                    rt.spawn(deliver_reply(session.clone(), reply, reply_delay));
                }
                Err(SubmitError::Busy) => app.status = Some("Please wait for the reply…".to_string()),
                Err(SubmitError::Empty) => {}
            }
        }
        KeyCode::Backspace => guard.pop_input(),
        KeyCode::Char(c) => {
            if !guard.push_input(c) {
                app.status = Some("Please wait for the reply…".to_string());
            }
        }
        _ => {}
    }
}
