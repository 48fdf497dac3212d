use serde::{Deserialize, Serialize};
use std::fmt;

/// 策略规则
/// `Grant` 对应 `p, role, path, method`，`Membership` 对应 `g, user, role`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "ptype", rename_all = "snake_case")]
pub enum PolicyRule {
    Grant {
        role_id: String,
        path: String,
        method: String,
    },
    Membership {
        user_id: String,
        role_id: String,
    },
}

impl PolicyRule {
    pub fn grant(
        role_id: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        PolicyRule::Grant {
            role_id: role_id.into(),
            path: path.into(),
            method: method.into().to_ascii_uppercase(),
        }
    }

    pub fn membership(user_id: impl Into<String>, role_id: impl Into<String>) -> Self {
        PolicyRule::Membership {
            user_id: user_id.into(),
            role_id: role_id.into(),
        }
    }
}

impl fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyRule::Grant { role_id, path, method } => {
                write!(f, "p, {role_id}, {path}, {method}")
            }
            PolicyRule::Membership { user_id, role_id } => write!(f, "g, {user_id}, {role_id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_rule_lines() {
        let grant = PolicyRule::grant("r1", "/api/v1/widgets", "get");
        assert_eq!(grant.to_string(), "p, r1, /api/v1/widgets, GET");

        let membership = PolicyRule::membership("u1", "r1");
        assert_eq!(membership.to_string(), "g, u1, r1");
    }
}
