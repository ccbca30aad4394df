//! Municipal Tax Payment Portal Library
//!
//! This library provides a small browser-facing portal that looks up a
//! taxpayer by national ID (DNI), shows their debt and subscription status,
//! and hands the browser over to the payment processor's checkout link.
//!
//! # Modules
//!
//! - `api`: HTTP surface of the portal.
//! - `core`: Controller state machine, models and errors.
//! - `integrations`: Collaborator clients.
//! - `config`: Configuration management.
//! - `controller`: Lookup-and-Pay controller.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `models`: Wire payloads and view state.
//! - `page`: Server-rendered portal markup.
//! - `portal_client`: Taxpayer lookup and payment-initiation client.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and the binary
pub mod config;
pub mod controller;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod page;
pub mod portal_client;
