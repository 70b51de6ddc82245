use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// Organisation role carried in the token. Issued by the login service,
/// only read here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Pengurus,
    Siswa,
}

impl Role {
    /// Admins and committee members manage topics, options and results.
    pub fn can_manage_voting(self) -> bool {
        matches!(self, Role::Admin | Role::Pengurus)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pengurus => "pengurus",
            Role::Siswa => "siswa",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

// -- Topics --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTopicRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTopicRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

// -- Options --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateOptionRequest {
    #[serde(alias = "option")]
    pub label: String,
    #[serde(default, alias = "img")]
    pub image: Option<String>,
}

/// Partial update: absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateOptionRequest {
    #[serde(default, alias = "option")]
    pub label: Option<String>,
    #[serde(default, alias = "img")]
    pub image: Option<String>,
}

// -- Votes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitVoteRequest {
    pub option_id: Uuid,
    /// Accepted for compatibility with older clients; must match the token subject.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

// -- Generic --

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearedResultsResponse {
    pub topic_id: Uuid,
    pub removed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_request_accepts_legacy_field_names() {
        let req: CreateOptionRequest =
            serde_json::from_str(r#"{"option": "Alice", "img": "/uploads/images/a.png"}"#).unwrap();
        assert_eq!(req.label, "Alice");
        assert_eq!(req.image.as_deref(), Some("/uploads/images/a.png"));
    }

    #[test]
    fn role_round_trips_lowercase() {
        let role: Role = serde_json::from_str(r#""pengurus""#).unwrap();
        assert_eq!(role, Role::Pengurus);
        assert!(role.can_manage_voting());
        assert!(!Role::Siswa.can_manage_voting());
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), r#""admin""#);
    }
}
