//! Onboarding steps. Each step asks for one field and passes it to its `on_next` callback.

use crate::framework::{StepData, ViewDescriptor};
use serde_json::json;

/// Every step kind starts with this.
pub const KIND_PREFIX: &str = "Onboarding";

pub const NAME_STEP: &str = "OnboardingName";
pub const AGE_STEP: &str = "OnboardingAge";
pub const HAIR_COLOR_STEP: &str = "OnboardingHairColor";
pub const DISCOUNT_STEP: &str = "OnboardingDiscount";

/// Age above which the discount step is shown.
pub const DISCOUNT_AGE: u64 = 65;

pub fn name_step() -> ViewDescriptor {
    ViewDescriptor::new(NAME_STEP)
}

pub fn age_step() -> ViewDescriptor {
    ViewDescriptor::new(AGE_STEP)
}

pub fn hair_color_step() -> ViewDescriptor {
    ViewDescriptor::new(HAIR_COLOR_STEP)
}

pub fn discount_step() -> ViewDescriptor {
    ViewDescriptor::new(DISCOUNT_STEP)
}

/// The steps for the data collected so far. Older users get the discount step right after
/// the age step.
pub fn steps_for(data: &StepData) -> Vec<ViewDescriptor> {
    let mut steps = vec![name_step(), age_step(), hair_color_step()];
    let senior = data
        .get("age")
        .and_then(|age| age.as_u64())
        .is_some_and(|age| age > DISCOUNT_AGE);
    if senior {
        steps.insert(2, discount_step());
    }
    steps
}

pub fn render(view: &ViewDescriptor) -> String {
    let prompt = match view.kind() {
        NAME_STEP => "What is your name?",
        AGE_STEP => "How old are you?",
        HAIR_COLOR_STEP => "What is your hair color?",
        DISCOUNT_STEP => "Congratulations! You qualify for our senior discount.",
        _ => "Unknown step",
    };
    if view.callback("on_next").is_some() {
        format!("{prompt} [Next]")
    } else {
        prompt.to_string()
    }
}

/// What the discount step reports when acknowledged.
pub fn discount_acknowledged() -> serde_json::Value {
    json!({ "discount": true })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_step_only_for_seniors() {
        let mut data = StepData::new();
        data.insert("age".into(), json!(40));
        assert_eq!(steps_for(&data).len(), 3);
        data.insert("age".into(), json!(70));
        let steps = steps_for(&data);
        assert_eq!(steps.len(), 4);
        let kinds: Vec<_> = steps.iter().map(ViewDescriptor::kind).collect();
        assert_eq!(kinds, [NAME_STEP, AGE_STEP, DISCOUNT_STEP, HAIR_COLOR_STEP]);
    }
}
