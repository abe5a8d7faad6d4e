use crate::{Document, DocumentChange};

/// Reacts to changes of one document type (subscription abstraction).
///
/// A handler is invoked synchronously after the document write succeeds and
/// before the enclosing unit of work commits. `C` is that unit of work: every
/// write the handler performs goes through it, so a handler error rolls back the
/// document write together with everything the handler attempted.
///
/// The trait makes **no storage assumptions**; the context and error types are
/// chosen by the implementor.
pub trait DocumentHandler<D: Document, C: ?Sized> {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn handle(&self, ctx: &mut C, change: &DocumentChange<D>) -> Result<(), Self::Error>;
}
