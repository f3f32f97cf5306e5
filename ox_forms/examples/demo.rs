use async_trait::async_trait;
use ox_forms::{
    FieldDefinition, FormDefinition, FormEngine, ProgressConfig, SubmitHandler, SubmitPayload,
    ValidationRule,
};

struct PrintHandler;

#[async_trait]
impl SubmitHandler for PrintHandler {
    async fn on_submit(&self, payload: SubmitPayload) -> anyhow::Result<()> {
        println!("Submitted: {}", serde_json::to_string_pretty(&payload.values)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let form = FormDefinition {
        progress: Some(ProgressConfig::default()),
        ..FormDefinition::new(
            "login_form",
            vec![
                FieldDefinition::new("username", "text")
                    .with_label("Username")
                    .with_rule(ValidationRule::required()),
                FieldDefinition::new("age", "number")
                    .with_label("Age")
                    .on_page(2)
                    .with_rule(ValidationRule::min(13.0)),
            ],
        )
    };

    let mut engine = FormEngine::builder(form)
        .on_page_change(|page, direction| println!("Page change: {} ({})", page, direction))
        .build()?;

    println!("--- Page 1 ---\n{}", engine.render()?);
    println!("Next without username: {:?}", engine.go_to_next_page());

    engine.set_field_value("username", "ada")?;
    println!("Next with username: {:?}", engine.go_to_next_page());

    engine.set_field_value("age", 36)?;
    println!("--- Page 2 ---\n{}", engine.render()?);

    let outcome = engine.handle_form_action(&PrintHandler).await?;
    println!("Outcome: {:?}", outcome);
    Ok(())
}
