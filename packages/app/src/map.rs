//! Console stand-in for the map widget.
//!
//! The real map surface (tiles, markers, animation) lives outside this
//! crate; [`ConsoleMap`] implements the [`MapSurface`] capability by logging
//! the camera commands it receives.

use crate::selection::MapSurface;

/// Default viewport center: downtown Boston.
pub const DEFAULT_CENTER: (f64, f64) = (42.3601, -71.0589);

/// Map surface that logs camera-focus commands instead of animating.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleMap;

impl MapSurface for ConsoleMap {
    fn focus_on_location(&self, latitude: f64, longitude: f64) {
        log::info!("Map camera -> ({latitude:.5}, {longitude:.5})");
    }
}
