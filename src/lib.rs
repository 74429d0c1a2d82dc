//! # Cronograma
//!
//! A study-schedule service. Flat spreadsheet rows (week, day, combined
//! topic, lesson, links) are folded into a nested tree and served as JSON,
//! with a free-text search over it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────┐   ┌─────────────┐
//! │ Discovery   │──▶│ Spreadsheet  │──▶│  Hierarchy  │
//! │ (globs)     │   │  CSV / XLSX  │   │  builder    │
//! └─────────────┘   └──────────────┘   └──────┬──────┘
//!                                             │ Schedule
//!                      ┌──────────────────────┤
//!                      ▼                      ▼
//!                 ┌──────────┐          ┌──────────┐
//!                 │   CLI    │          │   HTTP   │
//!                 │ (search) │          │  (axum)  │
//!                 └──────────┘          └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cronograma sources            # which spreadsheets will be read
//! cronograma build              # ingest summary
//! cronograma search "cardio"    # query from the terminal
//! cronograma serve              # start the HTTP API on :5000
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Row and schedule types |
//! | [`connector_fs`] | Spreadsheet discovery |
//! | [`spreadsheet`] | CSV and XLSX readers |
//! | [`normalize`] | Field derivation from raw rows |
//! | [`hierarchy`] | Nested schedule builder |
//! | [`ingest`] | Build orchestration and report |
//! | [`sources`] | Source file listing |
//! | [`search`] | Free-text search |
//! | [`server`] | HTTP API |
//! | [`openapi`] | API descriptor and docs pages |

pub mod config;
pub mod connector_fs;
pub mod hierarchy;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod openapi;
pub mod search;
pub mod server;
pub mod sources;
pub mod spreadsheet;
