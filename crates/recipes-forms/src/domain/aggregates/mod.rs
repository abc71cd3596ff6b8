//! Aggregates module

pub mod draft;

pub use draft::{AsyncCheckTicket, DraftSnapshot, FormDraft, FormPhase, SubmitPlan, UploadJob, UploadTicket};
