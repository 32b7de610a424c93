//! Screencast - screen and audio recording CLI
//!
//! This crate records the screen together with microphone audio, buffers
//! the encoded fragments in memory, and publishes the finished recording
//! for preview, download and upload.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Core business logic, value objects, entities, and errors
//! - **Application**: Use cases and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (FFmpeg, filesystem, upload service, etc.)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
