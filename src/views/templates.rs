use handlebars::{Handlebars, TemplateError};
use std::sync::Arc;

pub type Hbs = Arc<Handlebars<'static>>;

// compiled into the binary so the server runs from any working directory
const TEMPLATES: &[(&str, &str)] = &[
    // Layout + pages
    ("layouts/base", include_str!("../../templates/layouts/base.hbs")),
    ("pages/home", include_str!("../../templates/pages/home.hbs")),
    ("pages/not_found", include_str!("../../templates/pages/not_found.hbs")),
    ("pages/login", include_str!("../../templates/pages/login.hbs")),
    ("pages/register", include_str!("../../templates/pages/register.hbs")),
    ("pages/trade", include_str!("../../templates/pages/trade.hbs")),
    ("pages/portfolio", include_str!("../../templates/pages/portfolio.hbs")),
    // Partial endpoints
    ("partials/quote", include_str!("../../templates/partials/quote.hbs")),
    ("partials/trade_estimate", include_str!("../../templates/partials/trade_estimate.hbs")),
    ("partials/holdings", include_str!("../../templates/partials/holdings.hbs")),
    ("partials/trades_list", include_str!("../../templates/partials/trades_list.hbs")),
];

pub fn build_handlebars() -> Result<Hbs, TemplateError> {
    let mut hb = Handlebars::new();

    for &(name, source) in TEMPLATES {
        hb.register_template_string(name, source)?;
    }

    hb.register_partial("navbar", include_str!("../../templates/partials/navbar.hbs"))?;

    Ok(Arc::new(hb))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_templates_compile() {
        let hb = build_handlebars().unwrap();
        for (name, _) in TEMPLATES {
            assert!(hb.has_template(name), "{name} missing");
        }
    }

    #[test]
    fn base_layout_renders_body_unescaped() {
        let hb = build_handlebars().unwrap();
        let html = hb
            .render("layouts/base", &json!({ "title": "T", "body": "<p id=\"x\">hi</p>", "is_logged_in": false }))
            .unwrap();
        assert!(html.contains("<p id=\"x\">hi</p>"));
        assert!(html.contains("/register"));
    }
}
