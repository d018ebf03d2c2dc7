use std::sync::Arc;

use anyhow::Context;
use mailbridge_templates_contracts::{
    Template, TemplateFormat, TemplateService, BASE_TEMPLATE, TEMPLATES,
};
use tera::Tera;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct TemplateServiceImpl {
    tera: Arc<Tera>,
}

impl TemplateServiceImpl {
    pub fn new() -> anyhow::Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_template(&template_name("base", TemplateFormat::Html), BASE_TEMPLATE)
            .context("Failed to register base template")?;

        for &(name, text, html) in TEMPLATES {
            tera.add_raw_templates([
                (template_name(name, TemplateFormat::Text), text),
                (template_name(name, TemplateFormat::Html), html),
            ])
            .with_context(|| format!("Failed to register template {name}"))?;
        }

        // only html templates are escaped, plain text must stay verbatim
        tera.autoescape_on(vec![TemplateFormat::Html.suffix()]);

        Ok(Self { tera: tera.into() })
    }
}

impl TemplateService for TemplateServiceImpl {
    fn render<T: Template + 'static>(
        &self,
        template: &T,
        format: TemplateFormat,
    ) -> anyhow::Result<String> {
        let name = template_name(T::NAME, format);
        trace!(%name, "render template");

        let context = tera::Context::from_serialize(template)?;
        self.tera
            .render(&name, &context)
            .with_context(|| format!("Failed to render template {name}"))
    }
}

fn template_name(name: &str, format: TemplateFormat) -> String {
    format!("{name}{}", format.suffix())
}
