//! WebSocket close codes
//!
//! The gateway only closes a connection itself when the upgrade credential
//! is missing or rejected; every other failure is reported with an `error`
//! frame and the connection stays open.

/// Application close codes sent by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum CloseCode {
    /// Transport failure on the receive side
    UnknownError = 4000,
    /// No credential presented at upgrade
    NotAuthenticated = 4003,
    /// Credential could not be resolved to a user
    AuthenticationFailed = 4004,
}

impl CloseCode {
    pub const ALL: [Self; 3] = [
        Self::UnknownError,
        Self::NotAuthenticated,
        Self::AuthenticationFailed,
    ];

    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_u16() == value)
    }

    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Reason text carried in the close frame
    pub const fn description(self) -> &'static str {
        match self {
            Self::UnknownError => "Unknown error occurred",
            Self::NotAuthenticated => "Not authenticated",
            Self::AuthenticationFailed => "Authentication failed",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.description())
    }
}
