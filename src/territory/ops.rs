//! Boolean operations that report failure instead of unwinding.
//!
//! The boolean-op backend panics on some malformed input (NaN coordinates,
//! broken rings). Those panics are caught here and returned as
//! `GeometryError`, but the process panic hook still runs first, so each one
//! also prints a "thread panicked" line to stderr. Callers log the failure
//! with the league or region it belongs to, which ties that output back to
//! its source.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::{Area, BooleanOps, MultiPolygon};

use crate::error::GeometryError;

pub fn intersection(
    a: &MultiPolygon<f64>,
    b: &MultiPolygon<f64>,
) -> Result<MultiPolygon<f64>, GeometryError> {
    guarded("intersection", || a.intersection(b))
}

pub fn union(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>, GeometryError> {
    guarded("union", || a.union(b))
}

/// Union every geometry, skipping the ones the union rejects.
///
/// Returns the union and the number of skipped inputs.
pub fn union_all<'a>(
    geometries: impl IntoIterator<Item = &'a MultiPolygon<f64>>,
) -> (MultiPolygon<f64>, usize) {
    let mut merged = MultiPolygon(vec![]);
    let mut skipped = 0;

    for geometry in geometries {
        if merged.0.is_empty() {
            merged = geometry.clone();
            continue;
        }
        match union(&merged, geometry) {
            Ok(result) => merged = result,
            Err(e) => {
                tracing::debug!("Skipping piece {} of the union: {}", skipped + 1, e);
                skipped += 1;
            }
        }
    }

    (merged, skipped)
}

/// Non-empty with a positive area; slivers of any size count.
pub fn has_area(geometry: &MultiPolygon<f64>) -> bool {
    !geometry.0.is_empty() && geometry.unsigned_area() > 0.0
}

fn guarded<F>(operation: &'static str, op: F) -> Result<MultiPolygon<f64>, GeometryError>
where
    F: FnOnce() -> MultiPolygon<f64>,
{
    catch_unwind(AssertUnwindSafe(op)).map_err(|payload| GeometryError {
        operation,
        reason: panic_message(payload.as_ref()),
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
