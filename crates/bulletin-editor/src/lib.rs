//! Prompt-to-document pipeline for bulletin authoring.
//!
//! This crate wires a [`bulletin_doc`] document to a [`bulletin_ai`] chat
//! client: the [`PromptController`] owns the draft prompt and the busy
//! flag, the [`apply`] module turns response units into mutation batches,
//! and [`Notice`]s carry submission outcomes to whatever front end is
//! listening.
//!
//! # Design Philosophy
//!
//! - **Explicit dependencies.** The controller receives its document and
//!   client at construction. Nothing reads ambient context, so tests wire
//!   a scripted client in the same way the CLI wires the HTTP one.
//! - **One batch per unit.** Each received response unit costs exactly one
//!   document batch; positions are re-derived inside each batch, never
//!   carried across an await.
//! - **Failures are notices.** The drive task converts every error into a
//!   user-visible [`Notice`] and a cleared busy flag. Partial streamed
//!   insertions stay in the document; nothing is rolled back.

pub mod apply;
mod controller;
mod error;
mod notice;
pub mod prompts;

pub use apply::ApplyMode;
pub use controller::{ControllerOptions, PromptController, PromptState, SubmitOutcome};
pub use error::{EditorError, Result};
pub use notice::{NOTICE_CHANNEL_CAPACITY, Notice, NoticeLevel};
