//! Field-binding recorder.
//!
//! A [`FieldRecorder`] records the fields of one fixture type. Each field
//! is a key named after the field, and the recorded (or replayed) value is
//! written straight back into the fixture.

use crate::recordable::{Recordable, Recording};
use crate::recorder::Recorder;
use crate::registry::Registrable;
use encore_core::{CoreError, CoreResult};
use std::fmt;
use std::marker::PhantomData;

/// A fixture type whose fields can be recorded
pub trait Fixture: 'static {
    /// Recorder name
    const NAME: &'static str;
    /// Names of the recordable fields
    const FIELDS: &'static [&'static str];
}

/// Recorder binding values to the fields of `F`
pub struct FieldRecorder<F: Fixture> {
    name: String,
    inner: Recorder,
    fixture: PhantomData<fn() -> F>,
}

impl<F: Fixture> FieldRecorder<F> {
    /// Create an unnamed recorder; the name is set on registration
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: String::new(),
            inner: Recorder::new(),
            fixture: PhantomData,
        }
    }

    /// Record or replay a field and store the result in `slot`
    ///
    /// Use [`record_field!`](crate::record_field) to derive the name from
    /// the field itself.
    ///
    /// # Errors
    ///
    /// Returns error if `F` does not track `field`, or on a duplicate or
    /// missing key
    pub fn record_field<T>(&self, field: &str, slot: &mut T, live: T) -> CoreResult<()>
    where
        T: Recordable + Clone,
    {
        if !F::FIELDS.contains(&field) {
            return Err(CoreError::UnknownField {
                fixture: F::NAME.to_string(),
                field: field.to_string(),
            });
        }
        *slot = self.inner.record(F::NAME, field, live)?;
        Ok(())
    }

    /// Recorded fields in insertion order
    #[must_use]
    pub fn records(&self) -> Vec<Recording> {
        self.inner.recordings(F::NAME)
    }
}

impl<F: Fixture> Default for FieldRecorder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Fixture> fmt::Debug for FieldRecorder<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRecorder")
            .field("fixture", &F::NAME)
            .field("name", &self.name)
            .field("inner", &self.inner)
            .finish()
    }
}

impl<F: Fixture> Registrable for FieldRecorder<F> {
    fn init(&mut self) -> CoreResult<()> {
        self.name = F::NAME.to_string();
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn enable_recording(&self, enabled: bool) {
        self.inner.enable_recording(enabled);
    }

    fn load(&self, recordings: Vec<Recording>) -> CoreResult<()> {
        self.inner.load(F::NAME, recordings)
    }

    fn records(&self) -> Vec<Recording> {
        FieldRecorder::records(self)
    }

    fn reset(&self) {
        self.inner.reset();
    }
}

/// Record a fixture field, naming it after the field expression
///
/// `record_field!(recorder, fixture.field, live)` expands to
/// `recorder.record_field("field", &mut fixture.field, live)`.
#[macro_export]
macro_rules! record_field {
    ($recorder:expr, $fixture:ident . $field:ident, $live:expr) => {
        $recorder.record_field(stringify!($field), &mut $fixture.$field, $live)
    };
}
