use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::keys;

/// Contact and identity fields shared by every resume of one owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// One profile per owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub owner_id: Uuid,
    pub personal_info: PersonalInfo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(owner_id: Uuid, personal_info: PersonalInfo) -> Self {
        let now = Utc::now();
        Self {
            owner_id,
            personal_info,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRecord {
    pub pk: String,
    pub sk: String,
    pub owner_id: Uuid,
    pub personal_info: Json<PersonalInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProfileRecord {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            pk: keys::owner_pk(profile.owner_id),
            sk: keys::profile_sk(),
            owner_id: profile.owner_id,
            personal_info: Json(profile.personal_info.clone()),
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }

    pub fn into_profile(self) -> Profile {
        Profile {
            owner_id: self.owner_id,
            personal_info: self.personal_info.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_storage_round_trip() {
        let profile = Profile::new(
            Uuid::new_v4(),
            PersonalInfo {
                name: Some("Jane".to_string()),
                email: Some("jane@example.com".to_string()),
                links: vec!["https://example.com/jane".to_string()],
                ..Default::default()
            },
        );
        let record = ProfileRecord::from_profile(&profile);
        assert_eq!(record.sk, "PROFILE");
        assert_eq!(record.into_profile(), profile);
    }
}
