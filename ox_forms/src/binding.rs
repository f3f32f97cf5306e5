use crate::values::FormValues;
use anyhow::Result;

/// Trait for binding domain objects to form values.
pub trait Binder<T> {
    /// Produces form values (typically used as engine defaults) from an existing object.
    fn hydrate(&self, obj: &T) -> Result<FormValues>;

    /// Extracts an object from submitted form values.
    fn extract(&self, values: &FormValues) -> Result<T>;
}
