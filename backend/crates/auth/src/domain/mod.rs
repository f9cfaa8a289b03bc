//! Domain Layer
//!
//! Entities, value objects, the credential verifier, and the gateway
//! traits the application layer is written against.

pub mod entity;
pub mod gateway;
pub mod value_object;
pub mod verifier;
