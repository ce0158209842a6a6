use crate::framework::Editable;
use crate::server::Record;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A person shown by the user views and collected by the onboarding flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u32,
    pub name: String,
    pub age: u32,
    pub hair_color: String,
    #[serde(default)]
    pub hobbies: Vec<String>,
}

impl User {
    pub fn new(id: u32, name: impl Into<String>, age: u32, hair_color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            hair_color: hair_color.into(),
            hobbies: Vec::new(),
        }
    }

    pub fn with_hobbies<S: Into<String>>(mut self, hobbies: impl IntoIterator<Item = S>) -> Self {
        self.hobbies = hobbies.into_iter().map(Into::into).collect();
        self
    }
}

/// Partial update of a [`User`]; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub hair_color: Option<String>,
    pub hobbies: Option<Vec<String>>,
}

impl UserPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn age(age: u32) -> Self {
        Self {
            age: Some(age),
            ..Self::default()
        }
    }

    pub fn hair_color(hair_color: impl Into<String>) -> Self {
        Self {
            hair_color: Some(hair_color.into()),
            ..Self::default()
        }
    }
}

impl Editable for User {
    type Patch = UserPatch;

    fn merged(&self, patch: UserPatch) -> Self {
        Self {
            id: self.id,
            name: patch.name.unwrap_or_else(|| self.name.clone()),
            age: patch.age.unwrap_or(self.age),
            hair_color: patch.hair_color.unwrap_or_else(|| self.hair_color.clone()),
            hobbies: patch.hobbies.unwrap_or_else(|| self.hobbies.clone()),
        }
    }
}

/// Reasons the server refuses a user.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User name is empty")]
    EmptyName,
    #[error("User age {0} is not plausible")]
    ImplausibleAge(u32),
}

impl Record for User {
    type Id = u32;
    type Error = UserError;

    fn id(&self) -> u32 {
        self.id
    }

    /// Collapses whitespace in the name and drops blank or repeated hobbies.
    fn normalize(mut self, _previous: Option<&Self>) -> Result<Self, UserError> {
        self.name = self.name.split_whitespace().collect::<Vec<_>>().join(" ");
        if self.name.is_empty() {
            return Err(UserError::EmptyName);
        }
        if self.age > 150 {
            return Err(UserError::ImplausibleAge(self.age));
        }
        let mut hobbies: Vec<String> = Vec::with_capacity(self.hobbies.len());
        for hobby in self.hobbies.drain(..) {
            let hobby = hobby.trim().to_string();
            if !hobby.is_empty() && !hobbies.contains(&hobby) {
                hobbies.push(hobby);
            }
        }
        self.hobbies = hobbies;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_overwrites_present_fields_only() {
        let user = User::new(1, "Ann", 54, "brown").with_hobbies(["golf"]);
        let changed = user.merged(UserPatch::age(55));
        assert_eq!(changed.age, 55);
        assert_eq!(changed.name, "Ann");
        assert_eq!(changed.hobbies, ["golf"]);
        assert_eq!(user.age, 54);
    }

    #[test]
    fn test_normalize() {
        let user = User::new(1, " Ann  Lee ", 54, "brown").with_hobbies(["golf", " golf", "", "chess"]);
        let stored = user.normalize(None).unwrap();
        assert_eq!(stored.name, "Ann Lee");
        assert_eq!(stored.hobbies, ["golf", "chess"]);

        assert_eq!(
            User::new(1, "  ", 54, "brown").normalize(None),
            Err(UserError::EmptyName)
        );
        assert_eq!(
            User::new(1, "Old", 200, "gray").normalize(None),
            Err(UserError::ImplausibleAge(200))
        );
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(User::new(1, "Ann", 54, "brown")).unwrap();
        assert_eq!(json["hairColor"], "brown");
        assert_eq!(json["hobbies"], serde_json::json!([]));
    }
}
