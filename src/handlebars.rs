use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

pub fn create_new_handlebars<'b>() -> Handlebars<'b> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(str::to_string);
    handlebars.set_strict_mode(true);

    handlebars
}

pub fn render<T>(handlebars: &Handlebars<'_>, template: &str, data: &T) -> Result<String>
where
    T: Serialize,
{
    handlebars
        .render_template(template, data)
        .with_context(|| format!("render template {template:?}"))
}
