//! Domain layer for the stas translation bridge.
//!
//! This crate holds everything that does not touch a process or a socket:
//! the endpoint settings surface, the port traits adapters implement, the
//! retranslation filter and the single/batch wire codec.

pub mod codec;
pub mod filter;
pub mod ports;
pub mod settings;

pub use codec::{CodecError, PayloadShape, RequestCodec};
pub use filter::{NameSubstitutionRule, RetranslationFilter};
pub use settings::{EndpointSettings, SettingsError, SETTINGS_SECTION};
