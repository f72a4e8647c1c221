//! Core HTTP protocol types.
//!
//! This module holds the vocabulary the rest of the crate speaks:
//!
//! - **Messages**: [`Request`]/[`RequestHead`] and [`Response`]/[`ResponseHead`],
//!   thin structs over the `http` crate's method/uri/status/header types,
//!   extended with the fields those types do not model (the host and the
//!   declared content length as data of their own, and the response status
//!   line text).
//! - **Bodies** ([`body`]): absent, buffered, or lazily streamed from the
//!   connection ([`Body`], [`BodyStream`]).
//! - **Frames** ([`Frame`], [`BodyChunk`], [`Framing`]): the units the codec
//!   layer reads and writes, and the three wire body-framing modes.
//! - **Errors**: [`HttpError`] at the top, [`ParseError`] for the read side,
//!   [`SendError`] for the write side, plus [`ClientError`] and
//!   [`ServeError`] for the two endpoints.
//!
//! Header maps are `http::HeaderMap`: lookups are case-insensitive, a key
//! holds its values in insertion order, and iteration visits keys in
//! first-occurrence order, which is exactly the multimap shape the wire
//! format needs.

mod frame;
pub use frame::BodyChunk;
pub use frame::Frame;
pub use frame::Framing;

mod request;
pub use request::Request;
pub use request::RequestBuilder;
pub use request::RequestHead;

mod response;
pub(crate) use response::canonical_status_text;
pub use response::Response;
pub use response::ResponseBuilder;
pub use response::ResponseHead;

mod body;
pub use body::Body;
pub use body::BodyStream;

mod error;
pub use error::ClientError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::ServeError;
