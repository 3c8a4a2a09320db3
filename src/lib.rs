/// Basic application code
pub mod app;
/// REST clients for outside services
pub mod client;
/// Time source
pub mod clock;
/// Controllers for REST endpoints
pub mod controller;
/// Cryptography-related objects
pub mod crypto;
/// Domain objects
pub mod domain;
/// Service errors
pub mod error;
/// Stored records
pub mod model;
/// Repositories
pub mod repo;
/// Cron triggers for notifications
pub mod scheduler;
/// Subscription, weather and notification services
pub mod service;
/// Application settings
pub mod settings;
/// Application telemetry for tracing and logging
pub mod telemetry;
