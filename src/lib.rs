//! AI-Powered Job Opportunity Tracker
//!
//! This library provides the core functionality for the job-scout system,
//! which scrapes job listings, scores them against a candidate skill profile
//! using the Groq LLM API, and pushes Telegram alerts for strong matches.

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod services;
