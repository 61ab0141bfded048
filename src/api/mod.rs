//! Backend API
//!
//! HTTP client and the wire types it exchanges with the remote backend.

pub mod client;
pub mod models;

pub use client::{ApiClient, DashboardData, LoginGrant};
pub use models::{
    ActionResponse, ConversationMessage, EmailDraft, ImportEntry, ImportResult, Stats,
    Subscriber, SubscriberStatus, SystemStatus,
};
