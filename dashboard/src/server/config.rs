//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use dashboard::domain::TokenPolicy;
use dashboard::inbound::http::state::{HttpStateOptions, HttpStatePorts};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) ports: HttpStatePorts,
    pub(crate) options: HttpStateOptions,
    pub(crate) token_policy: TokenPolicy,
}

impl ServerConfig {
    /// Construct a configuration serving the given backend ports.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, ports: HttpStatePorts) -> Self {
        Self {
            bind_addr,
            ports,
            options: HttpStateOptions::default(),
            token_policy: TokenPolicy::default(),
        }
    }

    /// Set the `Secure` attribute of the `token` cookie.
    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.options.cookies.secure = secure;
        self
    }

    /// Choose how the route guard trusts token claims.
    #[must_use]
    pub fn with_token_policy(mut self, policy: TokenPolicy) -> Self {
        self.token_policy = policy;
        self
    }

    #[must_use]
    pub fn with_max_images(mut self, max_images: usize) -> Self {
        self.options.max_images = max_images;
        self
    }

    #[must_use]
    pub fn with_max_drafts(mut self, max_drafts: usize) -> Self {
        self.options.max_drafts = max_drafts;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
