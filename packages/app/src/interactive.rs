#![allow(clippy::module_name_repetitions)]

//! Interactive console browser for the call stream.
//!
//! Drives the [`SelectionCoordinator`] the way the map UI does: picking an
//! incident from the list activates it (camera focus + collapsed selection),
//! a second step opens the detail overlay, and the overlay offers "view on
//! map" and dismissal.

use std::path::Path;
use std::sync::Arc;

use call_stream_feed::fetch::{FeedCache, FeedState};
use call_stream_feed_models::ServiceRequest;
use dialoguer::{Confirm, Select};

use crate::map::{ConsoleMap, DEFAULT_CENTER};
use crate::render;
use crate::selection::{SelectionCoordinator, SelectionObserver, SelectionState};

/// Actions available for a selected incident.
enum RecordAction {
    Details,
    FocusMap,
    Back,
}

impl RecordAction {
    const ALL: &[Self] = &[Self::Details, Self::FocusMap, Self::Back];

    const fn label(&self) -> &'static str {
        match self {
            Self::Details => "Show details",
            Self::FocusMap => "Focus map on this incident",
            Self::Back => "Back to the list",
        }
    }
}

/// Actions available while the detail overlay is open.
enum OverlayAction {
    FocusMap,
    Close,
}

impl OverlayAction {
    const ALL: &[Self] = &[Self::FocusMap, Self::Close];

    const fn label(&self) -> &'static str {
        match self {
            Self::FocusMap => "View on map (closes details)",
            Self::Close => "Close details",
        }
    }
}

/// Logs every selection change, standing in for a subscribed view.
struct SelectionLog;

impl SelectionObserver for SelectionLog {
    fn selection_changed(&self, state: &SelectionState) {
        log::debug!(
            "selection -> {:?} (case {:?})",
            state.phase(),
            state.selected().map(|r| r.case_enquiry_id.as_str())
        );
    }
}

/// Loads the feed (retrying on failure if the user asks) and runs the
/// incident browser over the result.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub async fn run(
    cache: &mut FeedCache,
    file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let requests = loop {
        let state = match file {
            Some(path) => cache.load_path(path).clone(),
            None => cache.load().await.clone(),
        };

        match state {
            FeedState::Ready(requests) => break requests,
            FeedState::Error(message) => {
                eprintln!("Failed to load feed: {message}");
                let retry = Confirm::new()
                    .with_prompt("Retry?")
                    .default(true)
                    .interact()?;
                if !retry {
                    return Ok(());
                }
                // Full pipeline re-run; the new result replaces everything.
            }
            FeedState::Loading => {}
        }
    };

    log::info!(
        "Viewport centered on ({}, {}) with {} incidents",
        DEFAULT_CENTER.0,
        DEFAULT_CENTER.1,
        requests.len()
    );

    browse(&requests)
}

/// Runs the list/selection loop over an already-normalized record set.
///
/// # Errors
///
/// Returns an error if a terminal prompt fails.
pub fn browse(requests: &[ServiceRequest]) -> Result<(), Box<dyn std::error::Error>> {
    if requests.is_empty() {
        println!("The feed produced no incidents.");
        return Ok(());
    }

    let mut coordinator = SelectionCoordinator::new(ConsoleMap);
    coordinator.subscribe(Arc::new(SelectionLog));

    let labels: Vec<String> = requests.iter().map(render::list_row).collect();

    loop {
        let Some(idx) = Select::new()
            .with_prompt(format!(
                "{} recent incidents (Esc to quit)",
                requests.len()
            ))
            .items(&labels)
            .default(0)
            .max_length(20)
            .interact_opt()?
        else {
            break;
        };

        let record = &requests[idx];
        coordinator.activate(record);
        record_menu(&mut coordinator, record)?;
    }

    coordinator.clear();
    Ok(())
}

/// Inner menu for one activated incident.
fn record_menu(
    coordinator: &mut SelectionCoordinator<ConsoleMap>,
    record: &ServiceRequest,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let labels: Vec<&str> = RecordAction::ALL.iter().map(RecordAction::label).collect();
        let Some(idx) = Select::new()
            .with_prompt(record.case_title.to_lowercase())
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };

        match RecordAction::ALL[idx] {
            RecordAction::Details => {
                coordinator.request_details(record);
                println!("{}", render::detail(record));
                overlay_menu(coordinator)?;
            }
            RecordAction::FocusMap => {
                if record.coordinates().is_none() {
                    println!("This incident has no usable map position.");
                }
                coordinator.activate(record);
            }
            RecordAction::Back => return Ok(()),
        }
    }
}

/// Menu shown while the detail overlay is open.
fn overlay_menu(
    coordinator: &mut SelectionCoordinator<ConsoleMap>,
) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = OverlayAction::ALL.iter().map(OverlayAction::label).collect();
    let choice = Select::new()
        .items(&labels)
        .default(0)
        .interact_opt()?;

    match choice {
        Some(idx) => match OverlayAction::ALL[idx] {
            OverlayAction::FocusMap => coordinator.focus_selected(),
            OverlayAction::Close => coordinator.dismiss(),
        },
        // Esc behaves like the overlay's backdrop click.
        None => coordinator.dismiss(),
    }

    Ok(())
}
