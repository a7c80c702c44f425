//! Generate OpenAPI component schemas from Protocol Buffer definitions.
//!
//! `proto2openapi` reads a `.proto` file and renders the `components.schemas`
//! fragment of an OpenAPI 3 document as YAML, one schema per top-level
//! message.
//!
//! # Features
//!
//! - Maps the proto3 scalar types to OpenAPI `type`/`format` pairs
//! - Renders message-typed fields as `$ref` to `#/components/schemas/<package>.<Type>`
//! - Renders `repeated` fields as arrays with `items`
//! - Renders map fields by their value type
//! - Converts snake_case field names to camelCase property names
//! - Carries leading and trailing comments over as `description`
//! - Marks fields with `(gogoproto.nullable) = true` as `nullable`
//! - Deterministic output: byte-identical across runs
//!
//! # Usage
//!
//! ```
//! let yaml = proto2openapi::codegen::convert(
//!     r#"
//!     syntax = "proto3";
//!     package acme.v1;
//!
//!     // A registered user.
//!     message User {
//!       string user_name = 1;
//!     }
//!     "#,
//! )?;
//! assert!(yaml.starts_with("  schemas:\n    acme.v1.User:\n"));
//! # Ok::<(), proto2openapi::error::Error>(())
//! ```

pub mod codegen;
pub mod definition;
pub mod error;
pub mod parser;
pub mod type_map;
pub mod yaml;
