//! Trellis demo binary
//!
//! Wires a front controller with one registered page (a customer form with
//! a submit button) and simulates a GET followed by a POST, printing the
//! responses. Run with `RUST_LOG=debug` to see the lifecycle tracing.

use serde_json::json;
use trellis::context::Context;
use trellis::field::{Button, Field, IntegerField, TextField};
use trellis::page::Mode;
use trellis::service::InMemoryTemplateRenderer;
use trellis::{
    Form, FrontController, FrontControllerConfig, Page, PageClass, Request, Result, NAME, VERSION,
};

struct CustomerPage;

impl PageClass for CustomerPage {
    fn on_init(&mut self, page: &mut Page, _ctx: &mut Context) -> Result<()> {
        let form = page.add_control(Box::new(Form::new("customer")));
        let name = page.tree_mut().insert(Box::new(
            TextField::new("name")
                .with_label("Full Name")
                .with_required(true),
        ));
        let age = page.tree_mut().insert(Box::new(
            IntegerField::new("age")
                .with_label("Age")
                .with_min_value(0)
                .with_max_value(130),
        ));
        let save = page
            .tree_mut()
            .insert(Box::new(Button::submit("save").with_label("Save")));
        page.tree_mut().add(form, name)?;
        page.tree_mut().add(form, age)?;
        page.tree_mut().add(form, save)?;
        Ok(())
    }

    fn on_post(&mut self, page: &mut Page, _ctx: &mut Context) -> Result<()> {
        let Some(form) = page.root_by_name("customer") else {
            return Ok(());
        };
        let valid = page
            .tree()
            .downcast_ref::<Form>(form)
            .is_some_and(|f| f.is_valid(page.tree()));
        if valid {
            let name = page
                .tree()
                .child_by_name(form, "name")
                .and_then(|id| page.tree().downcast_ref::<TextField>(id))
                .map(|f| f.field().value().to_string())
                .unwrap_or_default();
            page.add_model("message", json!(format!("Saved customer {}", name)));
        } else {
            page.add_model("message", json!("Please fix the errors below"));
        }
        Ok(())
    }
}

fn main() {
    env_logger::init();

    println!("{} v{} - component-based web MVC demo", NAME, VERSION);
    println!("=================================================");

    let mut renderer = InMemoryTemplateRenderer::new();
    renderer.add_template("customer.htm", "<html>\n<p>$message</p>\n$customer\n</html>");

    let config = FrontControllerConfig::new()
        .with_mode(Mode::Debug)
        .with_auto_deploy(false)
        .with_default_header("Cache-Control", "no-cache");
    let mut controller = FrontController::new(config, Box::new(renderer));
    controller.register_page(
        "/customer.htm",
        "customer.htm",
        Box::new(|| Box::new(CustomerPage)),
    );

    let requests = [
        Request::get("/customer.htm"),
        Request::post("/customer.htm")
            .with_param("name", "Steve")
            .with_param("age", "42")
            .with_param("save", "Save"),
        Request::post("/customer.htm")
            .with_param("age", "200")
            .with_param("save", "Save"),
    ];

    for request in requests {
        let label = format!("{:?} {}", request.method(), request.path());
        match controller.handle(request) {
            Ok(response) => {
                println!("\n--- {} -> {} ---", label, response.status());
                println!("{}", response.body_str());
            }
            Err(error) => {
                eprintln!("\n--- {} failed: {} ---", label, error);
            }
        }
    }
}
