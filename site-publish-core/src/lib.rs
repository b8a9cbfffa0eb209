#![doc = "site-publish-core: pipeline logic for publishing the Open Worship static site."]

//! This crate holds everything needed to mirror a built static site into an
//! object store and purge the CDN in front of it, independent of any cloud SDK.
//!
//! # Usage
//! Build a [`config::PublishConfig`], provide implementations of
//! [`contract::ObjectStore`] and [`contract::CdnInvalidator`], and call
//! [`synchronise::synchronise`].

pub mod config;
pub mod content_type;
pub mod contract;
pub mod discover;
pub mod error;
pub mod invalidate;
pub mod key;
pub mod publish;
mod retry;
pub mod synchronise;

pub use error::{ClientError, PublishError};
