use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Company,
    HiringAgency,
    Recruiter,
    Candidate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Company => "COMPANY",
            Role::HiringAgency => "HIRING_AGENCY",
            Role::Recruiter => "RECRUITER",
            Role::Candidate => "CANDIDATE",
        }
    }

    /// Roles that may own candidate records.
    pub fn can_own_candidates(&self) -> bool {
        match self {
            Role::Company | Role::HiringAgency | Role::Recruiter => true,
            Role::Admin | Role::Candidate => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_screaming_snake_case() {
        let json = serde_json::to_string(&Role::HiringAgency).unwrap();
        assert_eq!(json, "\"HIRING_AGENCY\"");
        let back: Role = serde_json::from_str("\"RECRUITER\"").unwrap();
        assert_eq!(back, Role::Recruiter);
    }

    #[test]
    fn unknown_roles_do_not_parse() {
        assert!(serde_json::from_str::<Role>("\"SUPERUSER\"").is_err());
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }

    #[test]
    fn display_matches_wire_name() {
        for role in [
            Role::Admin,
            Role::Company,
            Role::HiringAgency,
            Role::Recruiter,
            Role::Candidate,
        ] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json.trim_matches('"'), role.to_string());
        }
    }
}
