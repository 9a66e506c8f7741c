//! Keywords that only exist in draft 3.
pub(crate) mod extends_draft_3;
pub(crate) mod required_draft_3;
pub(crate) mod type_draft_3;
