//! # petstore
//!
//! Blocking client for the Petstore pet API.
//!
//! This crate provides:
//! - Wire types for pets, tags and categories ([`Pet`], [`Tag`], [`Category`])
//! - The [`PetClient`] trait with four single-attempt operations
//! - An HTTP implementation ([`HttpPetClient`]) and an in-memory
//!   implementation for tests ([`MockPetClient`])
//! - Error classification that separates "not found" from other failures
//!
//! ## Example
//!
//! ```no_run
//! use petstore::{ClientConfig, HttpPetClient, Pet, PetClient, RandomIds};
//! use std::sync::Arc;
//!
//! let client = HttpPetClient::new(
//!     ClientConfig::new("https://petstore.example.com/api/v3"),
//!     Arc::new(RandomIds),
//! );
//!
//! let created = client.add_pet(Pet::named("rex")).expect("create failed");
//! let id = created.id.expect("created pets carry an id").to_string();
//!
//! match client.get_pet_by_id(&id) {
//!     Ok(pet) => println!("{} is {:?}", pet.name, pet.status),
//!     Err(e) if e.is_not_found() => println!("gone"),
//!     Err(e) => eprintln!("transient: {e}"),
//! }
//! ```
//!
//! All calls block and are attempted exactly once. Retry policy belongs to
//! the caller; use [`Error::is_retryable`] to decide.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod error;
pub mod ids;
pub mod types;

pub use client::http::{ClientConfig, HttpPetClient};
pub use client::{MockPetClient, Operation, PetClient};
pub use error::{Error, ErrorCategory, Result};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use types::{Category, Pet, PetStatus, Tag};
