//! Selection coordination across the list, the map, and the detail overlay.
//!
//! [`SelectionCoordinator`] is the single source of truth for which incident
//! is selected and whether its detail overlay is open. Views subscribe via
//! [`SelectionObserver`] and re-render from the shared [`SelectionState`]
//! instead of holding their own copies. The map is reached only through the
//! narrow [`MapSurface`] capability injected at construction.

use std::sync::Arc;

use call_stream_feed_models::ServiceRequest;

/// The one operation the coordinator needs from the map widget.
pub trait MapSurface {
    /// Animates the camera to center on a coordinate.
    ///
    /// Fire-and-forget: no return value, no error channel. Issuing a new
    /// command before a prior animation finishes simply retargets it.
    fn focus_on_location(&self, latitude: f64, longitude: f64);
}

/// Callback interface for views that track the selection.
pub trait SelectionObserver {
    /// Called after every coordinator mutation with the new state.
    fn selection_changed(&self, state: &SelectionState);
}

/// The three phases of the selection state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// Nothing selected.
    NoSelection,
    /// An incident is selected; the detail overlay is closed.
    SelectedCollapsed,
    /// An incident is selected and its detail overlay is open.
    SelectedExpanded,
}

/// Which incident is selected and whether its overlay is open.
///
/// Fields are private so the invariant holds by construction: the overlay
/// can only be open while an incident is selected.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected: Option<ServiceRequest>,
    overlay_open: bool,
}

impl SelectionState {
    /// The selected incident, if any.
    #[must_use]
    pub const fn selected(&self) -> Option<&ServiceRequest> {
        self.selected.as_ref()
    }

    /// Whether the detail overlay is open. Only ever `true` while an
    /// incident is selected.
    #[must_use]
    pub const fn overlay_open(&self) -> bool {
        self.overlay_open
    }

    /// The current phase, derived from the two fields.
    #[must_use]
    pub const fn phase(&self) -> SelectionPhase {
        match (&self.selected, self.overlay_open) {
            (None, _) => SelectionPhase::NoSelection,
            (Some(_), false) => SelectionPhase::SelectedCollapsed,
            (Some(_), true) => SelectionPhase::SelectedExpanded,
        }
    }

    /// Whether `record` is the selected incident, by case identity.
    #[must_use]
    pub fn is_selected(&self, record: &ServiceRequest) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|selected| selected.case_enquiry_id == record.case_enquiry_id)
    }
}

/// State machine owning the selection, camera focus, and overlay lifecycle.
pub struct SelectionCoordinator<M: MapSurface> {
    map: M,
    state: SelectionState,
    observers: Vec<Arc<dyn SelectionObserver>>,
}

impl<M: MapSurface> SelectionCoordinator<M> {
    /// Creates a coordinator with no selection, driving the given map.
    #[must_use]
    pub const fn new(map: M) -> Self {
        Self {
            map,
            state: SelectionState {
                selected: None,
                overlay_open: false,
            },
            observers: Vec::new(),
        }
    }

    /// Registers a view to be notified after every mutation.
    pub fn subscribe(&mut self, observer: Arc<dyn SelectionObserver>) {
        self.observers.push(observer);
    }

    /// The current selection state.
    #[must_use]
    pub const fn state(&self) -> &SelectionState {
        &self.state
    }

    /// An incident was activated from the list or a marker on the map.
    ///
    /// When the record has valid coordinates the camera focuses on it
    /// before any state changes. The selection is replaced (no deselect
    /// step needed) and the phase is forced to collapsed.
    pub fn activate(&mut self, record: &ServiceRequest) {
        if let Some((latitude, longitude)) = record.coordinates() {
            self.map.focus_on_location(latitude, longitude);
        } else {
            log::debug!(
                "case {} has no usable coordinates, skipping camera focus",
                record.case_enquiry_id
            );
        }

        self.state.selected = Some(record.clone());
        self.state.overlay_open = false;
        self.notify();
    }

    /// Details were requested for an incident: select it and open the
    /// overlay. Distinct from [`activate`](Self::activate) — no camera
    /// movement.
    pub fn request_details(&mut self, record: &ServiceRequest) {
        self.state.selected = Some(record.clone());
        self.state.overlay_open = true;
        self.notify();
    }

    /// The overlay was dismissed (close button, escape, backdrop). The
    /// selection itself survives; only the overlay closes.
    pub fn dismiss(&mut self) {
        if self.state.overlay_open {
            self.state.overlay_open = false;
            self.notify();
        }
    }

    /// "View on map" from inside the open overlay: re-issue the camera
    /// focus for the selected incident, then close the overlay. No-op when
    /// the overlay is closed or the coordinates are unusable.
    pub fn focus_selected(&mut self) {
        if !self.state.overlay_open {
            return;
        }
        let Some((latitude, longitude)) = self
            .state
            .selected
            .as_ref()
            .and_then(ServiceRequest::coordinates)
        else {
            return;
        };

        self.map.focus_on_location(latitude, longitude);
        self.state.overlay_open = false;
        self.notify();
    }

    /// Explicit deselect: clears the selection and the overlay together.
    pub fn clear(&mut self) {
        if self.state.selected.is_some() {
            self.state.selected = None;
            self.state.overlay_open = false;
            self.notify();
        }
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.selection_changed(&self.state);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use call_stream_feed_models::FIELDS;

    use super::*;

    #[derive(Clone, Default)]
    struct RecordingMap {
        calls: Rc<RefCell<Vec<(f64, f64)>>>,
    }

    impl MapSurface for RecordingMap {
        fn focus_on_location(&self, latitude: f64, longitude: f64) {
            self.calls.borrow_mut().push((latitude, longitude));
        }
    }

    #[derive(Default)]
    struct CountingObserver {
        notifications: AtomicUsize,
    }

    impl SelectionObserver for CountingObserver {
        fn selection_changed(&self, _state: &SelectionState) {
            self.notifications.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn record(case_id: &str) -> ServiceRequest {
        let fields: BTreeMap<String, Option<String>> = FIELDS
            .iter()
            .map(|spec| {
                let value = match spec.name {
                    "case_enquiry_id" => case_id,
                    "latitude" => "42.3601",
                    "longitude" => "-71.0589",
                    name => name,
                };
                (spec.name.to_owned(), Some(value.to_owned()))
            })
            .collect();
        ServiceRequest::from_fields(1, &fields).unwrap()
    }

    fn record_without_coordinates(case_id: &str) -> ServiceRequest {
        let mut r = record(case_id);
        r.latitude = "null".to_owned();
        r
    }

    fn coordinator() -> (SelectionCoordinator<RecordingMap>, Rc<RefCell<Vec<(f64, f64)>>>) {
        let map = RecordingMap::default();
        let calls = map.calls.clone();
        (SelectionCoordinator::new(map), calls)
    }

    #[test]
    fn starts_with_no_selection() {
        let (coordinator, _) = coordinator();
        assert_eq!(coordinator.state().phase(), SelectionPhase::NoSelection);
        assert!(!coordinator.state().overlay_open());
    }

    #[test]
    fn activate_selects_collapsed_and_focuses_camera() {
        let (mut coordinator, calls) = coordinator();
        let r = record("100123");

        coordinator.activate(&r);

        assert_eq!(
            coordinator.state().phase(),
            SelectionPhase::SelectedCollapsed
        );
        assert!(coordinator.state().is_selected(&r));
        assert_eq!(calls.borrow().as_slice(), &[(42.3601, -71.0589)]);
    }

    #[test]
    fn activate_without_coordinates_skips_camera() {
        let (mut coordinator, calls) = coordinator();
        let r = record_without_coordinates("100123");

        coordinator.activate(&r);

        // Still listed and selectable, just no map placement.
        assert!(coordinator.state().is_selected(&r));
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn request_details_expands_the_overlay() {
        let (mut coordinator, calls) = coordinator();
        let r = record("100123");

        coordinator.activate(&r);
        coordinator.request_details(&r);

        assert_eq!(coordinator.state().phase(), SelectionPhase::SelectedExpanded);
        // Details never move the camera; only the activation did.
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn dismiss_closes_overlay_but_keeps_selection() {
        let (mut coordinator, _) = coordinator();
        let r = record("100123");

        coordinator.request_details(&r);
        coordinator.dismiss();

        assert_eq!(
            coordinator.state().phase(),
            SelectionPhase::SelectedCollapsed
        );
        assert!(coordinator.state().is_selected(&r));
    }

    #[test]
    fn activating_another_record_replaces_and_collapses() {
        let (mut coordinator, _) = coordinator();
        let first = record("100123");
        let second = record("100456");

        coordinator.request_details(&first);
        coordinator.activate(&second);

        assert_eq!(
            coordinator.state().phase(),
            SelectionPhase::SelectedCollapsed
        );
        assert!(coordinator.state().is_selected(&second));
        assert!(!coordinator.state().is_selected(&first));
    }

    #[test]
    fn focus_selected_refocuses_and_closes_overlay() {
        let (mut coordinator, calls) = coordinator();
        let r = record("100123");

        coordinator.activate(&r);
        coordinator.request_details(&r);
        coordinator.focus_selected();

        assert_eq!(calls.borrow().len(), 2);
        assert_eq!(
            coordinator.state().phase(),
            SelectionPhase::SelectedCollapsed
        );
    }

    #[test]
    fn focus_selected_is_a_no_op_without_coordinates() {
        let (mut coordinator, calls) = coordinator();
        let r = record_without_coordinates("100123");

        coordinator.request_details(&r);
        coordinator.focus_selected();

        assert!(calls.borrow().is_empty());
        // Overlay stays open: nothing happened.
        assert_eq!(coordinator.state().phase(), SelectionPhase::SelectedExpanded);
    }

    #[test]
    fn clear_returns_to_no_selection() {
        let (mut coordinator, _) = coordinator();
        let r = record("100123");

        coordinator.request_details(&r);
        coordinator.clear();

        assert_eq!(coordinator.state().phase(), SelectionPhase::NoSelection);
        assert!(!coordinator.state().overlay_open());
    }

    #[test]
    fn overlay_never_open_without_selection() {
        let (mut coordinator, _) = coordinator();
        let r = record("100123");

        coordinator.request_details(&r);
        coordinator.clear();
        coordinator.dismiss();
        coordinator.focus_selected();

        assert!(coordinator.state().selected().is_none());
        assert!(!coordinator.state().overlay_open());
    }

    #[test]
    fn observers_are_notified_per_mutation() {
        let (mut coordinator, _) = coordinator();
        let observer = Arc::new(CountingObserver::default());
        coordinator.subscribe(observer.clone());

        let r = record("100123");
        coordinator.activate(&r);
        coordinator.request_details(&r);
        coordinator.dismiss();
        // A dismiss with no open overlay mutates nothing.
        coordinator.dismiss();
        coordinator.clear();

        assert_eq!(observer.notifications.load(Ordering::SeqCst), 4);
    }
}
