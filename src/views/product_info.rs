use super::render_resource;
use crate::framework::ViewDescriptor;
use crate::model::Product;

pub const KIND: &str = "ProductInfo";

/// Reads the `product` resource.
pub fn descriptor() -> ViewDescriptor {
    ViewDescriptor::new(KIND)
}

pub fn render(view: &ViewDescriptor) -> String {
    render_resource(view, "product", |product: Product| {
        let mut lines = vec![product.name.clone(), product.price()];
        if !product.description.is_empty() {
            lines.push(product.description.clone());
        }
        lines.push(format!("Average Rating: {}", product.rating));
        lines.join("\n")
    })
}
