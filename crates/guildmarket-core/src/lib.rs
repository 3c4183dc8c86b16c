//! # guildmarket-core
//!
//! Shared identity domain types for the guildmarket platform.
//!
//! This crate holds the types that both the session engine
//! (`guildmarket-auth`) and the onboarding engine
//! (`guildmarket-onboarding`) agree on:
//!
//! - [`Role`] - the marketplace role attached to an account
//! - [`OnboardingStatus`] - progress through the registration wizard
//! - [`UserProfile`] - the backend user-store row
//! - millisecond clock helpers used for token expiry math

pub mod identity;
pub mod time;

pub use identity::{FeatureFlags, OnboardingStatus, Role, UserProfile};
pub use time::{now_millis, unix_millis};
