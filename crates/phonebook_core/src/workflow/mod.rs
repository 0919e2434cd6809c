//! UI-local workflows driven by the contacts screen.
//!
//! # Responsibility
//! - Keep transient screen state (edit buffers, dialogs) out of storage.
//! - Turn user gestures into validated write intents.

pub mod contact_list;
