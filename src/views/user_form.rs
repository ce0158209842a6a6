//! Editable user form.
//!
//! Unlike the display views it receives a [`ResourceHandle`] under `user`, not a resource
//! snapshot, and the buttons a real form would have map onto the handle's operations.

use super::LOADING;
use crate::framework::{ResourceHandle, ResourceStatus, ViewDescriptor};
use crate::model::User;

pub const KIND: &str = "UserForm";

pub type UserHandle = ResourceHandle<u32, User>;

pub fn descriptor() -> ViewDescriptor {
    ViewDescriptor::new(KIND)
}

/// The handle injected into a rendered form.
pub fn handle(view: &ViewDescriptor) -> Option<UserHandle> {
    view.capability::<UserHandle>("user")
}

pub fn render(view: &ViewDescriptor) -> String {
    let Some(user) = handle(view) else {
        return "No user".to_string();
    };
    match (user.status(), user.value()) {
        (ResourceStatus::Ready, Some(value)) => {
            let marker = if user.is_dirty() { " (unsaved)" } else { "" };
            format!(
                "Name: [{}]\nAge: [{}]\nHair Color: [{}]\n[Reset] [Save]{marker}",
                value.name, value.age, value.hair_color
            )
        }
        (ResourceStatus::Error, _) => "Could not load user".to_string(),
        _ => LOADING.to_string(),
    }
}
