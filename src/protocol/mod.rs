//! Protocol constants and header helpers shared by the server and the client.

mod headers;

pub use headers::{format_version_header, parse_version_header};

/// Protocol constants.
pub mod constants {
    /// Header names (lowercase, as normalized by `http`).
    pub mod headers {
        use http::HeaderName;

        /// Version produced by an accepted operation, or the version of returned state
        pub const VERSION: HeaderName = HeaderName::from_static("version");
        /// Version an operation was composed against
        pub const PARENTS: HeaderName = HeaderName::from_static("parents");
        /// Identifier of the submitting peer, used for log correlation
        pub const PEER: HeaderName = HeaderName::from_static("peer");
    }
}
