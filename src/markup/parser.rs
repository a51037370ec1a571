use crate::components::booking::FormData;
use crate::components::time_range::TimeOption;
use crate::error::{PageError, Result};
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// The booking form as found in the markup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormBinding {
    /// Every named control with its initial value
    pub fields: FormData,
    /// Option values of every named `select` (placeholders excluded)
    pub choices: BTreeMap<String, Vec<String>>,
    pub submit_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterBinding {
    pub label: String,
    pub target: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub href: String,
}

/// Everything the page controller attaches to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageBindings {
    pub title: String,
    pub navbar: bool,
    pub hero_background: bool,
    pub form: Option<FormBinding>,
    /// Pickup/drop slot list, placeholder first; empty without time selectors
    pub time_options: Vec<TimeOption>,
    pub date_inputs: bool,
    pub hero_slides: Vec<String>,
    pub text_slides: Vec<String>,
    /// Labels of the elements tagged for the entrance animation
    pub reveal_targets: Vec<String>,
    pub counters: Vec<CounterBinding>,
    /// `href` of every in-page link
    pub anchors: Vec<String>,
    pub element_ids: HashSet<String>,
    pub bike_cards: Vec<String>,
    pub tooltips: Vec<String>,
    /// Present when both the menu toggle and its panel exist
    pub menu: Option<Vec<MenuItem>>,
    pub buttons: Vec<String>,
}

impl PageBindings {
    /// Whether `#id` resolves to an element on the page
    pub fn has_target(&self, href: &str) -> bool {
        href.strip_prefix('#')
            .is_some_and(|id| !id.is_empty() && self.element_ids.contains(id))
    }

    /// In-page links whose `#id` has no element to scroll to
    pub fn dangling_anchors(&self) -> Vec<&str> {
        self.anchors
            .iter()
            .filter(|href| href.as_str() != "#" && !self.has_target(href))
            .map(String::as_str)
            .collect()
    }
}

/// Read and bind a page from disk
pub fn parse_page<P: AsRef<Path>>(path: P) -> Result<PageBindings> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PageError::PageNotFound(path.to_string_lossy().to_string()));
    }

    let html = std::fs::read_to_string(path)?;
    tracing::info!("Binding page {} ({} bytes)", path.display(), html.len());
    parse_html(&html)
}

/// Bind a page from its HTML source
pub fn parse_html(html: &str) -> Result<PageBindings> {
    let doc = Html::parse_document(html);

    let bindings = PageBindings {
        title: first_text(&doc, "title")?.unwrap_or_default(),
        navbar: exists(&doc, ".navbar")?,
        hero_background: exists(&doc, ".hero")?,
        form: parse_form(&doc)?,
        time_options: parse_time_options(&doc)?,
        date_inputs: exists(&doc, "#pick")? && exists(&doc, "#drop")?,
        hero_slides: texts(&doc, ".hero-slider .hero-slide")?,
        text_slides: texts(&doc, ".text-carousel .text-slide")?,
        reveal_targets: parse_reveal_targets(&doc)?,
        counters: parse_counters(&doc)?,
        anchors: attrs(&doc, "a[href^=\"#\"]", "href")?,
        element_ids: attrs(&doc, "[id]", "id")?.into_iter().collect(),
        bike_cards: texts(&doc, ".card .card-title")?,
        tooltips: parse_tooltips(&doc)?,
        menu: parse_menu(&doc)?,
        buttons: texts(&doc, ".btn")?,
    };

    tracing::debug!(
        "Bound page '{}': {} hero slides, {} text slides, {} counters, {} reveal targets, {} time slots",
        bindings.title,
        bindings.hero_slides.len(),
        bindings.text_slides.len(),
        bindings.counters.len(),
        bindings.reveal_targets.len(),
        bindings.time_options.len()
    );
    for href in bindings.dangling_anchors() {
        tracing::warn!("Link {} has no target on this page", href);
    }

    Ok(bindings)
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PageError::Markup(format!("bad selector '{}': {}", css, e)))
}

fn exists(doc: &Html, css: &str) -> Result<bool> {
    Ok(doc.select(&selector(css)?).next().is_some())
}

/// Text content with runs of whitespace collapsed to single spaces
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn first_text(doc: &Html, css: &str) -> Result<Option<String>> {
    Ok(doc.select(&selector(css)?).next().map(element_text))
}

fn texts(doc: &Html, css: &str) -> Result<Vec<String>> {
    Ok(doc.select(&selector(css)?).map(element_text).collect())
}

fn attrs(doc: &Html, css: &str, attr: &str) -> Result<Vec<String>> {
    Ok(doc
        .select(&selector(css)?)
        .filter_map(|el| el.value().attr(attr))
        .map(str::to_string)
        .collect())
}

fn parse_form(doc: &Html) -> Result<Option<FormBinding>> {
    let Some(form) = doc.select(&selector("#bookingForm")?).next() else {
        tracing::warn!("No #bookingForm on page; booking handler stays inert");
        return Ok(None);
    };

    let mut binding = FormBinding::default();

    for control in form.select(&selector("input[name], select[name], textarea[name]")?) {
        let el = control.value();
        let Some(name) = el.attr("name") else {
            continue;
        };

        let value = match el.name() {
            "select" => {
                let options = select_options(control)?;
                binding.choices.insert(
                    name.to_string(),
                    options
                        .iter()
                        .map(|o| o.value.clone())
                        .filter(|v| !v.is_empty())
                        .collect(),
                );
                selected_value(control)?
            }
            "textarea" => element_text(control),
            _ => match el.attr("type") {
                Some("radio") | Some("checkbox") => {
                    let entry = binding.choices.entry(name.to_string()).or_default();
                    if let Some(v) = el.attr("value") {
                        entry.push(v.to_string());
                    }
                    if el.attr("checked").is_none() {
                        binding.fields.entry(name.to_string()).or_default();
                        continue;
                    }
                    el.attr("value").unwrap_or("on").to_string()
                }
                _ => el.attr("value").unwrap_or_default().to_string(),
            },
        };

        binding.fields.insert(name.to_string(), value);
    }

    binding.submit_label = form
        .select(&selector("button[type=\"submit\"]")?)
        .next()
        .map(element_text)
        .unwrap_or_else(|| "Submit".to_string());

    Ok(Some(binding))
}

fn select_options(select: ElementRef) -> Result<Vec<TimeOption>> {
    Ok(select
        .select(&selector("option")?)
        .map(|option| {
            let label = element_text(option);
            let value = option
                .value()
                .attr("value")
                .map(str::to_string)
                .unwrap_or_else(|| label.clone());
            TimeOption::new(value, label)
        })
        .collect())
}

fn selected_value(select: ElementRef) -> Result<String> {
    let options = select_options(select)?;
    let selected = select
        .select(&selector("option")?)
        .position(|o| o.value().attr("selected").is_some())
        .unwrap_or(0);
    Ok(options
        .get(selected)
        .map(|o| o.value.clone())
        .unwrap_or_default())
}

fn parse_time_options(doc: &Html) -> Result<Vec<TimeOption>> {
    let pickup = doc
        .select(&selector(".time-select-wrapper:first-child .time-select")?)
        .next();
    let drop = doc
        .select(&selector(".time-select-wrapper:last-child .time-select")?)
        .next();

    match (pickup, drop) {
        (Some(pickup), Some(drop)) => {
            let options = select_options(pickup)?;
            if select_options(drop)? != options {
                tracing::warn!("Pickup and drop time selectors differ; using the pickup slots");
            }
            if options.first().is_some_and(|o| !o.value.is_empty()) {
                tracing::warn!("Time selector has no placeholder option first");
            }
            Ok(options)
        }
        _ => {
            tracing::warn!("Time selectors not found; time range handler stays inert");
            Ok(Vec::new())
        }
    }
}

fn parse_reveal_targets(doc: &Html) -> Result<Vec<String>> {
    let title = selector(".card-title")?;
    Ok(doc
        .select(&selector(".card, .booking-card, .section-title")?)
        .map(|el| {
            el.select(&title)
                .next()
                .map(element_text)
                .or_else(|| el.value().id().map(str::to_string))
                .unwrap_or_else(|| element_text(el))
        })
        .collect())
}

fn parse_counters(doc: &Html) -> Result<Vec<CounterBinding>> {
    let label_sel = selector(".stat-label")?;
    let mut counters = Vec::new();

    for stat in doc.select(&selector(".stat-number")?) {
        let raw = stat.value().attr("data-target").unwrap_or_default();
        let Ok(target) = raw.trim().parse::<u64>() else {
            tracing::warn!("Skipping counter with data-target '{}'", raw);
            continue;
        };

        let label = stat
            .parent()
            .and_then(ElementRef::wrap)
            .and_then(|parent| parent.select(&label_sel).next())
            .map(element_text)
            .unwrap_or_default();

        counters.push(CounterBinding { label, target });
    }

    Ok(counters)
}

fn parse_tooltips(doc: &Html) -> Result<Vec<String>> {
    Ok(doc
        .select(&selector("[data-bs-toggle=\"tooltip\"]")?)
        .map(|el| {
            el.value()
                .attr("title")
                .or_else(|| el.value().attr("data-bs-title"))
                .unwrap_or_default()
                .to_string()
        })
        .collect())
}

fn parse_menu(doc: &Html) -> Result<Option<Vec<MenuItem>>> {
    if !exists(doc, "#navMenuBtn")? {
        return Ok(None);
    }
    let Some(panel) = doc.select(&selector("#navPopupMenu")?).next() else {
        return Ok(None);
    };

    Ok(Some(
        panel
            .select(&selector("a")?)
            .map(|a| MenuItem {
                label: element_text(a),
                href: a.value().attr("href").unwrap_or_default().to_string(),
            })
            .collect(),
    ))
}
