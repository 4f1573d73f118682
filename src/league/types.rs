use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default and allowed membership caps.
pub const DEFAULT_MAX_MEMBERS: u32 = 50;
pub const MIN_MAX_MEMBERS: u32 = 2;
pub const MAX_MAX_MEMBERS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Admin,
    Grader,
    Member,
}

impl Role {
    pub fn can_grade(self) -> bool {
        matches!(self, Role::Owner | Role::Admin | Role::Grader)
    }

    pub fn can_manage(self) -> bool {
        matches!(self, Role::Owner | Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Grader => "grader",
            Role::Member => "member",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: String,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    pub max_members: u32,
    pub invite_code: String,
    pub owner_id: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl League {
    pub fn member(&self, user_id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.member(user_id).is_some()
    }

    pub fn role_of(&self, user_id: &str) -> Option<Role> {
        self.member(user_id).map(|m| m.role)
    }

    pub fn is_full(&self) -> bool {
        self.members.len() as u32 >= self.max_members
    }
}

/// Human-awarded points for a prediction's free-text picks, per league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueGrade {
    pub league_id: u32,
    pub prediction_id: u64,
    pub grader_id: String,
    pub wild_points: u32,
    pub flop_points: u32,
    pub surprise_points: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub graded_at: DateTime<Utc>,
}

impl LeagueGrade {
    pub fn total(&self) -> u32 {
        self.wild_points + self.flop_points + self.surprise_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_permissions() {
        assert!(Role::Owner.can_grade() && Role::Owner.can_manage());
        assert!(Role::Admin.can_grade() && Role::Admin.can_manage());
        assert!(Role::Grader.can_grade() && !Role::Grader.can_manage());
        assert!(!Role::Member.can_grade() && !Role::Member.can_manage());
    }

    #[test]
    fn test_role_serde() {
        assert_eq!(serde_json::to_string(&Role::Grader).unwrap(), "\"grader\"");
        let role: Role = serde_json::from_str("\"owner\"").unwrap();
        assert_eq!(role, Role::Owner);
    }

    #[test]
    fn test_grade_total() {
        let grade = LeagueGrade {
            league_id: 1,
            prediction_id: 1,
            grader_id: "g".to_string(),
            wild_points: 10,
            flop_points: 5,
            surprise_points: 0,
            notes: None,
            graded_at: Utc::now(),
        };
        assert_eq!(grade.total(), 15);
    }
}
