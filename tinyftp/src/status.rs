//! # Status
//!
//! Classification of reply codes by completion class, and the few codes the client expects exactly

/// Completion class of a reply code, given by its first digit.
///
/// RFC 959 §4.2 names the classes "positive preliminary", "positive completion", "positive intermediate",
/// "transient negative completion" and "permanent negative completion".
/// Any code outside `100..600` (and the zero code produced when the control connection broke) is `Unusable`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReplyClass {
    /// 1xx: the action is being started, expect another reply
    Preliminary,
    /// 2xx: the action completed successfully
    Completion,
    /// 3xx: the command was accepted, but more information is needed
    Intermediate,
    /// 4xx: the command failed, but the failure is temporary
    TransientNegative,
    /// 5xx: the command failed permanently
    PermanentNegative,
    /// The reply could not be read or its code is invalid
    Unusable,
}

impl ReplyClass {
    /// Classify a raw reply code
    pub fn from_code(code: u32) -> Self {
        match code {
            100..=199 => Self::Preliminary,
            200..=299 => Self::Completion,
            300..=399 => Self::Intermediate,
            400..=499 => Self::TransientNegative,
            500..=599 => Self::PermanentNegative,
            _ => Self::Unusable,
        }
    }

    /// Whether the class reports a positive outcome (1xx, 2xx or 3xx)
    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            Self::Preliminary | Self::Completion | Self::Intermediate
        )
    }

    /// Whether the class reports a failure (4xx, 5xx or an unusable reply)
    pub fn is_negative(&self) -> bool {
        !self.is_positive()
    }
}

/// Reply codes which a command needs exactly; any other code is `Other`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// 227, answer to `PASV`
    PassiveMode,
    /// 230, answer to `USER` when no password is needed, or to `PASS`
    LoggedIn,
    /// 331, answer to `USER` when a password is needed
    NeedPassword,
    /// Any other code
    Other(u32),
}

impl Status {
    /// Get status code
    pub fn code(&self) -> u32 {
        match self {
            Self::PassiveMode => 227,
            Self::LoggedIn => 230,
            Self::NeedPassword => 331,
            Self::Other(code) => *code,
        }
    }

    /// Get the completion class of the status
    pub fn class(&self) -> ReplyClass {
        ReplyClass::from_code(self.code())
    }
}

impl From<u32> for Status {
    fn from(code: u32) -> Self {
        match code {
            227 => Self::PassiveMode,
            230 => Self::LoggedIn,
            331 => Self::NeedPassword,
            code => Self::Other(code),
        }
    }
}
