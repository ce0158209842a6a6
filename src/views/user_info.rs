use super::render_resource;
use crate::framework::ViewDescriptor;
use crate::model::User;

pub const KIND: &str = "UserInfo";

/// Reads the `user` resource.
pub fn descriptor() -> ViewDescriptor {
    ViewDescriptor::new(KIND)
}

pub fn render(view: &ViewDescriptor) -> String {
    render_resource(view, "user", |user: User| {
        let mut lines = vec![
            format!("Name: {}", user.name),
            format!("Age: {} years", user.age),
            format!("Hair Color: {}", user.hair_color),
        ];
        if !user.hobbies.is_empty() {
            lines.push(format!("Hobbies: {}", user.hobbies.join(", ")));
        }
        lines.join("\n")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{FetchError, ResourceProp, ResourceState};

    fn with_user(state: ResourceState<User>) -> ViewDescriptor {
        descriptor().with("user", ResourceProp::from_state(&state))
    }

    #[test]
    fn test_three_states() {
        assert_eq!(render(&with_user(ResourceState::Loading)), "Loading...");
        assert_eq!(
            render(&with_user(ResourceState::Error(FetchError::Transport("offline".into())))),
            "Could not load user: Transport failure: offline"
        );
        let user = User::new(1, "Ann", 54, "brown").with_hobbies(["golf", "chess"]);
        assert_eq!(
            render(&with_user(ResourceState::Ready(user))),
            "Name: Ann\nAge: 54 years\nHair Color: brown\nHobbies: golf, chess"
        );
        assert_eq!(render(&descriptor()), "No user");
    }
}
