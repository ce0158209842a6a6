//! Demo: loaders, an editable form and the onboarding flow against the in-memory servers.

use serde_json::json;
use std::sync::{Arc, Mutex};
use tracing::{info, warn, Instrument};
use view_binding::framework::{
    partially_apply, params, Callback, Child, ControlledFlow, EditableResourceController, FlowMachine,
    FlowState, Prop, ResourceLoader, StepData, UncontrolledFlow, ViewDescriptor,
};
use view_binding::lifecycle::{setup_tracing, DemoSystem, CURRENT_USER_ID};
use view_binding::model::UserPatch;
use view_binding::server::ServerConfig;
use view_binding::views::{self, onboarding, product_info, user_form, user_info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();
    info!("Starting demo");

    let system = DemoSystem::new(ServerConfig::default());
    system.seed().await?;

    loaders(&system).instrument(tracing::info_span!("loaders")).await;
    editable_form(&system)
        .instrument(tracing::info_span!("editable_form"))
        .await?;
    onboarding_flows();

    system.shutdown().await?;
    Ok(())
}

async fn loaders(system: &DemoSystem) {
    // The current user is a loader over a fixed key, created here and passed down.
    let current_user = ResourceLoader::new("user", system.user_client.clone());
    let products = ResourceLoader::new("product", system.product_client.clone());

    current_user.bind(CURRENT_USER_ID);
    products.bind(1);
    println!("{}", views::render_all(&current_user.render(&[user_info::descriptor().into()])));

    current_user.settled().await;
    products.settled().await;
    let children: Vec<Child> = vec![Child::text("== Current user =="), user_info::descriptor().into()];
    println!("{}", views::render_all(&current_user.render(&children)));
    println!("{}", views::render_all(&products.render(&[product_info::descriptor().into()])));

    // Re-keying before the first read settles: only the newer answer is kept.
    products.bind(2);
    products.bind(3);
    products.settled().await;
    println!("{}", views::render_all(&products.render(&[product_info::descriptor().into()])));

    let missing = ResourceLoader::new("user", system.user_client.clone()).mount_when_ready();
    missing.bind(42);
    missing.settled().await;
    let rendered = missing.render(&[user_info::descriptor().into()]);
    info!(children = rendered.len(), "Missing user mounts nothing");

    // Preset parameters act as defaults; the caller's own value wins.
    let danger = partially_apply(
        &ViewDescriptor::new("Button").with_value("text", "Delete"),
        &params([("color", Prop::Value(json!("red"))), ("text", Prop::Value(json!("Danger")))]),
    );
    info!(?danger, "Partially applied button");
}

async fn editable_form(system: &DemoSystem) -> Result<(), Box<dyn std::error::Error>> {
    let controller = EditableResourceController::new("user", system.user_client.clone());
    controller.bind(2);
    controller.settled().await;

    let form = controller.render(&[user_form::descriptor().into()]);
    let Some(handle) = form[0].as_view().and_then(user_form::handle) else {
        warn!("Form has no user handle");
        return Ok(());
    };
    println!("{}", views::render_all(&form));

    handle.change(UserPatch::name("  Brenda   Jones "));
    handle.change(UserPatch::age(34));
    println!("{}", views::render_all(&controller.render(&[user_form::descriptor().into()])));

    handle.reset();
    handle.change(UserPatch::hair_color("auburn"));
    handle.save().await?;
    println!("{}", views::render_all(&controller.render(&[user_form::descriptor().into()])));
    Ok(())
}

fn onboarding_flows() {
    // Uncontrolled: the flow owns the index and the collected data.
    let flow = UncontrolledFlow::new(
        vec![
            onboarding::name_step().into(),
            onboarding::age_step().into(),
            onboarding::hair_color_step().into(),
        ],
        |data: StepData| info!(?data, "Onboarding finished"),
    );
    for answer in [json!({"name": "John Doe"}), json!({"age": 100}), json!({"hairColor": "brown"})] {
        let Some(step) = flow.render() else { break };
        println!("{}", views::render(&step));
        if let Some(on_next) = step.as_view().and_then(|view| view.callback("on_next")) {
            on_next.call(answer);
        }
    }

    // Controlled: the parent owns the machine and rebuilds the steps from the data so far.
    let collected = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&collected);
    let mut machine = FlowMachine::new(move |data| {
        if let Ok(mut slot) = sink.lock() {
            *slot = Some(data);
        }
    });
    let controlled = ControlledFlow::new();
    let noop = Callback::new(|_| {});
    let answers = [
        json!({"name": "Ann"}),
        json!({"age": 70}),
        onboarding::discount_acknowledged(),
        json!({"hairColor": "gray"}),
    ];
    for answer in answers {
        let FlowState::Active(index) = machine.state() else { break };
        let steps: Vec<Child> = onboarding::steps_for(machine.data())
            .into_iter()
            .map(Child::from)
            .collect();
        if let Some(step) = controlled.render(&steps, index, &noop) {
            println!("{}", views::render(&step));
        }
        let step_data = match answer {
            serde_json::Value::Object(fields) => fields,
            _ => StepData::new(),
        };
        if let Err(e) = machine.advance_with(step_data, |data| onboarding::steps_for(data).len()) {
            warn!(error = %e, "Advance rejected");
        }
    }
    if let Ok(slot) = collected.lock() {
        info!(data = ?*slot, "Controlled onboarding collected");
    };
}
