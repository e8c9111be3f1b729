use anyhow::{Context, Result, anyhow};
use minijinja::{Environment, context};
use once_cell::sync::Lazy;

use crate::data_models::SearchResult;

pub const PAGE_TITLE: &str = "Search my snapchat";
pub const SEARCHING_INDICATOR: &str = "searching...";

const SEARCH_BOX_TEMPLATE: &str = r#"<div style="padding-bottom: 20px">
  <input type="text" value="{{ value }}" placeholder="{{ placeholder }}" style="display: inline-block; font-family: Helvetica">
  <span style="padding-left: 10px; font-family: Helvetica">{% if searching %}{{ indicator }}{% endif %}</span>
</div>"#;

const RESULTS_TEMPLATE: &str = r#"{% for r in results -%}
<a href="{{ r.image_url }}" target="_blank" rel="noreferrer"{% if r.content %} title="{{ r.content }}"{% endif %}><img src="{{ r.thumbnail_url }}" style="height: 200px"></a>
{% endfor %}"#;

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>{{ title }}</title></head>
<body>
<h1 style="font-family: Helvetica">{{ title }}</h1>
{% include "search_box.html" %}
{% include "results.html" %}
</body>
</html>
"#;

/// Everything the page needs, detached from the live trigger.
#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub title: &'a str,
    pub placeholder: &'a str,
    pub value: &'a str,
    pub searching: bool,
    pub results: &'a [SearchResult],
}

// Template names end in .html so minijinja escapes every interpolation.
static TEMPLATES: Lazy<Result<Environment<'static>, minijinja::Error>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("search_box.html", SEARCH_BOX_TEMPLATE)?;
    env.add_template("results.html", RESULTS_TEMPLATE)?;
    env.add_template("page.html", PAGE_TEMPLATE)?;
    Ok(env)
});

fn templates() -> Result<&'static Environment<'static>> {
    TEMPLATES
        .as_ref()
        .map_err(|e| anyhow!("Failed to load HTML templates: {e:#}"))
}

/// One thumbnail link per result, in order.
pub fn render_results(results: &[SearchResult]) -> Result<String> {
    let env = templates()?;
    env.get_template("results.html")?
        .render(context! { results })
        .context("Failed to render results")
}

pub fn render_search_box(placeholder: &str, value: &str, searching: bool) -> Result<String> {
    let env = templates()?;
    env.get_template("search_box.html")?
        .render(context! {
            placeholder,
            value,
            searching,
            indicator => SEARCHING_INDICATOR,
        })
        .context("Failed to render search box")
}

pub fn render_page(view: &PageView<'_>) -> Result<String> {
    let env = templates()?;
    env.get_template("page.html")?
        .render(context! {
            title => view.title,
            placeholder => view.placeholder,
            value => view.value,
            searching => view.searching,
            indicator => SEARCHING_INDICATOR,
            results => view.results,
        })
        .context("Failed to render page")
}
