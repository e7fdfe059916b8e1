//! # Meetwise
//!
//! A meeting and document chatbot backend.
//!
//! Meetwise stores free-text documents and summarized meeting
//! transcripts in SQLite, retrieves the records relevant to a question
//! by keyword overlap, and asks a configured AI provider (OpenAI or
//! Gemini) to answer grounded in that context. Everything is exposed
//! via a CLI and a JSON HTTP server.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌─────────────┐   ┌──────────┐
//! │ Documents  │──▶│  Retrieval   │──▶│ Provider │
//! │ Meetings   │   │ keyword rank│   │ OpenAI / │
//! │  (SQLite)  │   │ + context   │   │  Gemini  │
//! └────────────┘   └─────────────┘   └────┬─────┘
//!                                         │
//!                     ┌───────────────────┤
//!                     ▼                   ▼
//!                ┌──────────┐       ┌──────────┐
//!                │   CLI    │       │   HTTP   │
//!                │   (mw)   │       │  (JSON)  │
//!                └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! mw init                        # create database
//! mw seed                        # load sample data
//! mw ask "What is MongoDB used for?"
//! mw search "budget"             # keyword search over recent meetings
//! mw serve                       # start the HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`store`] | Storage trait, SQLite and in-memory backends |
//! | [`retrieval`] | Keyword extraction and relevance ranking |
//! | [`context`] | Context block assembly and previews |
//! | [`provider`] | OpenAI/Gemini answer generators |
//! | [`chat`] | Chat orchestration and confidence heuristic |
//! | [`summary`] | Transcript summarization |
//! | [`search`] | Recent-meeting keyword search |
//! | [`server`] | JSON HTTP server |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`seed`] | Sample data |

pub mod chat;
pub mod config;
pub mod context;
pub mod db;
pub mod migrate;
pub mod models;
pub mod provider;
pub mod retrieval;
pub mod search;
pub mod seed;
pub mod server;
pub mod store;
pub mod summary;
