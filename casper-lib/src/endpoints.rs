//! Platform endpoint table.
//!
//! Each platform call is one entry: path, method, how it is authorized and
//! which status counts as success. The client runs every entry through the
//! same primitive, so adding a call is adding a variant here.

use std::str::FromStr;

use crate::transport::HttpMethod;
use crate::CasperError;

/// How a call is authorized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Session bootstrap through the login exchange.
    Bootstrap,
    /// Endpoint resolution without a session (registration).
    Resolved,
    /// Authenticated session plus endpoint resolution.
    Session,
    /// Sent directly to the platform, no session, no resolution.
    Public,
}

/// One platform call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Log in and bootstrap a session.
    Login,
    /// Register a new account.
    Register,
    /// End the session.
    Logout,
    /// Fetch the full account state.
    AllUpdates,
    /// Fetch conversations.
    Conversations,
    /// List Discover channels.
    DiscoverChannels,
    /// Add, delete, block, unblock or rename a friend.
    Friend,
    /// Fetch suggested friends.
    SuggestedFriends,
    /// Fetch stories.
    Stories,
    /// Delete one of the user's stories.
    DeleteStory,
    /// Fetch a captcha challenge archive.
    GetCaptcha,
    /// Submit a captcha solution.
    SolveCaptcha,
    /// Fetch the lens schedule.
    LensSchedule,
}

impl Endpoint {
    /// Every endpoint, in table order.
    pub const ALL: &'static [Endpoint] = &[
        Self::Login,
        Self::Register,
        Self::Logout,
        Self::AllUpdates,
        Self::Conversations,
        Self::DiscoverChannels,
        Self::Friend,
        Self::SuggestedFriends,
        Self::Stories,
        Self::DeleteStory,
        Self::GetCaptcha,
        Self::SolveCaptcha,
        Self::LensSchedule,
    ];

    /// Platform path.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => "/loq/login",
            Self::Register => "/loq/register",
            Self::Logout => "/ph/logout",
            Self::AllUpdates => "/loq/all_updates",
            Self::Conversations => "/loq/conversations",
            Self::DiscoverChannels => "/discover/channel_list",
            Self::Friend => "/bq/friend",
            Self::SuggestedFriends => "/bq/suggest_friend",
            Self::Stories => "/bq/stories",
            Self::DeleteStory => "/bq/delete_story",
            Self::GetCaptcha => "/bq/get_captcha",
            Self::SolveCaptcha => "/bq/solve_captcha",
            Self::LensSchedule => "/lens/get_schedule",
        }
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        match self {
            Self::DiscoverChannels => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    /// How the call is authorized.
    pub fn access(&self) -> Access {
        match self {
            Self::Login => Access::Bootstrap,
            Self::Register => Access::Resolved,
            Self::DiscoverChannels => Access::Public,
            _ => Access::Session,
        }
    }

    /// Status treated as success.
    pub fn expected_status(&self) -> u16 {
        match self {
            Self::DeleteStory => 204,
            _ => 200,
        }
    }

    /// Whether the call needs an authenticated session.
    pub fn requires_session(&self) -> bool {
        self.access() == Access::Session
    }

    /// Short name used on the command line and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
            Self::Logout => "logout",
            Self::AllUpdates => "all_updates",
            Self::Conversations => "conversations",
            Self::DiscoverChannels => "discover_channels",
            Self::Friend => "friend",
            Self::SuggestedFriends => "suggested_friends",
            Self::Stories => "stories",
            Self::DeleteStory => "delete_story",
            Self::GetCaptcha => "get_captcha",
            Self::SolveCaptcha => "solve_captcha",
            Self::LensSchedule => "lens_schedule",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = CasperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.name() == s)
            .ok_or_else(|| CasperError::validation("endpoint", format!("unknown endpoint '{}'", s)))
    }
}

/// Action for the friend endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FriendAction {
    /// Send a friend request.
    Add,
    /// Remove a friend.
    Delete,
    /// Block a user.
    Block,
    /// Unblock a user.
    Unblock,
    /// Set a friend's display name.
    Display,
}

impl FriendAction {
    /// Wire value of the `action` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Delete => "delete",
            Self::Block => "block",
            Self::Unblock => "unblock",
            Self::Display => "display",
        }
    }
}

impl std::fmt::Display for FriendAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FriendAction {
    type Err = CasperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Self::Add),
            "delete" => Ok(Self::Delete),
            "block" => Ok(Self::Block),
            "unblock" => Ok(Self::Unblock),
            "display" => Ok(Self::Display),
            other => Err(CasperError::validation(
                "action",
                format!("unknown friend action '{}'", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_consistent() {
        for endpoint in Endpoint::ALL {
            assert!(endpoint.path().starts_with('/'));
            assert_eq!(endpoint.name().parse::<Endpoint>().unwrap(), *endpoint);
        }
    }

    #[test]
    fn test_public_and_bootstrap_entries() {
        assert!(!Endpoint::Login.requires_session());
        assert!(!Endpoint::Register.requires_session());
        assert!(!Endpoint::DiscoverChannels.requires_session());
        assert_eq!(Endpoint::DiscoverChannels.method(), HttpMethod::Get);
        assert!(Endpoint::AllUpdates.requires_session());
    }

    #[test]
    fn test_expected_statuses() {
        assert_eq!(Endpoint::Logout.expected_status(), 200);
        assert_eq!(Endpoint::DeleteStory.expected_status(), 204);
    }

    #[test]
    fn test_friend_action_round_trip() {
        for action in ["add", "delete", "block", "unblock", "display"] {
            assert_eq!(action.parse::<FriendAction>().unwrap().as_str(), action);
        }
    }

    #[test]
    fn test_unknown_friend_action_rejected() {
        let err = "poke".parse::<FriendAction>().unwrap_err();
        assert_eq!(err.code(), crate::CasperErrorCode::Validation);
        assert!("ADD".parse::<FriendAction>().is_err());
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        assert!("send_media".parse::<Endpoint>().is_err());
    }
}
