//! Document snapshots and element queries
//!
//! A [`Document`] is the immutable result of one settled navigation: final
//! URL, HTTP status, and the HTML body. Queries parse the body on demand so
//! the snapshot itself stays plain data and can be held across await points.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use url::Url;

use crate::common::{Error, Result};

use super::Target;

/// A settled page snapshot
#[derive(Debug, Clone)]
pub struct Document {
    url: Url,
    status: u16,
    body: String,
}

/// Owned facts about one matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    /// Tag name, lowercase
    pub tag: String,
    /// Whitespace-normalized text content
    pub text: String,
    /// Whether the element would render (no `hidden`, no inline
    /// `display:none`/`visibility:hidden` on it or an ancestor)
    pub visible: bool,
}

/// What executing a click means for the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavPlan {
    /// Follow an anchor href
    Follow { href: String },
    /// Submit a form
    Submit(FormSubmission),
}

/// A serialized form ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub method: FormMethod,
    /// Form `action`, unresolved; `None` re-targets the current URL
    pub action: Option<String>,
    /// Successful controls in document order, overrides applied
    pub fields: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMethod {
    Get,
    Post,
}

impl Document {
    pub fn new(url: Url, status: u16, body: String) -> Self {
        Self { url, status, body }
    }

    /// Final URL after redirects settled
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status of the settled response
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw HTML body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// All elements matching the target, as owned facts
    pub fn query(&self, target: &Target) -> Result<Vec<ElementInfo>> {
        let html = self.parse();
        let hits = select_all(&html, target)?;
        Ok(hits
            .iter()
            .map(|el| ElementInfo {
                tag: el.value().name().to_ascii_lowercase(),
                text: normalized_text(el),
                visible: is_visible(el),
            })
            .collect())
    }

    /// Number of elements matching the target
    pub fn count(&self, target: &Target) -> Result<usize> {
        let html = self.parse();
        Ok(select_all(&html, target)?.len())
    }

    /// Resolve a fill target to the `name` of exactly one form control
    pub(crate) fn resolve_field(&self, target: &Target) -> Result<String> {
        let html = self.parse();
        let el = resolve_one(&html, target)?;
        let value = el.value();
        let fillable = match value.name() {
            "textarea" | "select" => true,
            "input" => {
                let ty = value.attr("type").unwrap_or("text").to_ascii_lowercase();
                !matches!(
                    ty.as_str(),
                    "submit" | "button" | "reset" | "image" | "checkbox" | "radio" | "file"
                )
            }
            _ => false,
        };
        if !fillable {
            return Err(Error::NotFillable {
                target: target.to_string(),
            });
        }
        value
            .attr("name")
            .map(str::to_string)
            .ok_or_else(|| Error::NotFillable {
                target: target.to_string(),
            })
    }

    /// Resolve a click target to the navigation it causes
    ///
    /// Anchors navigate to their href; submit controls submit their
    /// enclosing form with the fill overlay applied and their own
    /// name/value pair appended. Anything else is not interactive.
    pub(crate) fn click_plan(
        &self,
        target: &Target,
        overrides: &HashMap<String, String>,
    ) -> Result<NavPlan> {
        let html = self.parse();
        let el = resolve_one(&html, target)?;
        let value = el.value();

        if value.name() == "a" {
            return match value.attr("href") {
                Some(href) => Ok(NavPlan::Follow {
                    href: href.to_string(),
                }),
                None => Err(Error::ElementNotFound {
                    target: target.to_string(),
                }),
            };
        }

        let is_submit = match value.name() {
            "input" => value
                .attr("type")
                .map(|t| t.eq_ignore_ascii_case("submit"))
                .unwrap_or(false),
            "button" => value
                .attr("type")
                .map(|t| t.eq_ignore_ascii_case("submit"))
                .unwrap_or(true),
            _ => false,
        };
        if !is_submit {
            return Err(Error::ElementNotFound {
                target: target.to_string(),
            });
        }

        let form = enclosing_form(&el).ok_or_else(|| Error::ElementNotFound {
            target: target.to_string(),
        })?;
        Ok(NavPlan::Submit(serialize_form(&form, overrides, Some(&el))?))
    }

    /// Resolve a form target and serialize it with the given overrides
    pub(crate) fn submit_plan(
        &self,
        target: &Target,
        overrides: &HashMap<String, String>,
    ) -> Result<FormSubmission> {
        let html = self.parse();
        let el = resolve_one(&html, target)?;
        if el.value().name() != "form" {
            return Err(Error::ElementNotFound {
                target: target.to_string(),
            });
        }
        serialize_form(&el, overrides, None)
    }

    fn parse(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::selector(css, e))
}

/// All elements the target matches, in document order
fn select_all<'a>(html: &'a Html, target: &Target) -> Result<Vec<ElementRef<'a>>> {
    match target {
        Target::Css(css) => {
            let sel = parse_selector(css)?;
            Ok(html.select(&sel).collect())
        }
        Target::Text {
            selector,
            text,
            find,
        } => {
            let sel = parse_selector(selector)?;
            let needle = normalize(text);
            let mut hits: Vec<ElementRef<'a>> = html
                .select(&sel)
                .filter(|el| normalized_text(el).contains(needle.as_str()))
                .collect();
            if let Some(inner) = find {
                let inner_sel = parse_selector(inner)?;
                hits = hits
                    .into_iter()
                    .flat_map(|el| el.select(&inner_sel).collect::<Vec<_>>())
                    .collect();
            }
            Ok(hits)
        }
        Target::Role { role, name } => {
            let candidates: Vec<ElementRef<'a>> = match role.as_str() {
                "link" => html.select(&parse_selector("a[href]")?).collect(),
                "button" => html
                    .select(&parse_selector(
                        "button, input[type=submit], input[type=button], input[type=reset]",
                    )?)
                    .collect(),
                "heading" => html
                    .select(&parse_selector("h1, h2, h3, h4, h5, h6")?)
                    .collect(),
                other => {
                    return Err(Error::selector(
                        other,
                        "unsupported role (expected link, button, or heading)",
                    ))
                }
            };
            let wanted = normalize(name);
            Ok(candidates
                .into_iter()
                .filter(|el| accessible_name(el) == wanted)
                .collect())
        }
    }
}

/// Exactly one match, or the matching error
fn resolve_one<'a>(html: &'a Html, target: &Target) -> Result<ElementRef<'a>> {
    let mut hits = select_all(html, target)?;
    match hits.len() {
        0 => Err(Error::ElementNotFound {
            target: target.to_string(),
        }),
        1 => Ok(hits.remove(0)),
        n => Err(Error::AmbiguousSelector {
            target: target.to_string(),
            count: n,
        }),
    }
}

fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalized_text(el: &ElementRef) -> String {
    normalize(&el.text().collect::<String>())
}

/// Accessible name: control value for inputs, visible text otherwise
fn accessible_name(el: &ElementRef) -> String {
    if el.value().name() == "input" {
        normalize(el.value().attr("value").unwrap_or(""))
    } else {
        normalized_text(el)
    }
}

fn element_shows(el: &scraper::node::Element) -> bool {
    if el.attr("hidden").is_some() {
        return false;
    }
    if el.name() == "input"
        && el
            .attr("type")
            .map(|t| t.eq_ignore_ascii_case("hidden"))
            .unwrap_or(false)
    {
        return false;
    }
    if let Some(style) = el.attr("style") {
        let style: String = style
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if style.contains("display:none") || style.contains("visibility:hidden") {
            return false;
        }
    }
    true
}

fn is_visible(el: &ElementRef) -> bool {
    if !element_shows(el.value()) {
        return false;
    }
    for node in el.ancestors() {
        if let Some(ancestor) = ElementRef::wrap(node) {
            if !element_shows(ancestor.value()) {
                return false;
            }
        }
    }
    true
}

fn enclosing_form<'a>(el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    el.ancestors().find_map(|node| {
        let e = ElementRef::wrap(node)?;
        (e.value().name() == "form").then_some(e)
    })
}

/// Collect the form's successful controls, apply overrides by control name,
/// then append the submitter's own pair.
fn serialize_form(
    form: &ElementRef,
    overrides: &HashMap<String, String>,
    submitter: Option<&ElementRef>,
) -> Result<FormSubmission> {
    let controls = parse_selector("input, textarea, select")?;
    let options = parse_selector("option")?;
    let mut fields: Vec<(String, String)> = Vec::new();

    for control in form.select(&controls) {
        let el = control.value();
        let Some(name) = el.attr("name") else {
            continue;
        };
        let value = match el.name() {
            "textarea" => control.text().collect::<String>(),
            "select" => {
                let mut selected = None;
                let mut first = None;
                for opt in control.select(&options) {
                    let v = opt
                        .value()
                        .attr("value")
                        .map(str::to_string)
                        .unwrap_or_else(|| normalized_text(&opt));
                    if first.is_none() {
                        first = Some(v.clone());
                    }
                    if opt.value().attr("selected").is_some() {
                        selected = Some(v);
                        break;
                    }
                }
                match selected.or(first) {
                    Some(v) => v,
                    None => continue,
                }
            }
            "input" => {
                let ty = el.attr("type").unwrap_or("text").to_ascii_lowercase();
                match ty.as_str() {
                    "submit" | "button" | "reset" | "image" | "file" => continue,
                    "checkbox" | "radio" => {
                        if el.attr("checked").is_none() && !overrides.contains_key(name) {
                            continue;
                        }
                        el.attr("value").unwrap_or("on").to_string()
                    }
                    _ => el.attr("value").unwrap_or("").to_string(),
                }
            }
            _ => continue,
        };
        fields.push((name.to_string(), value));
    }

    for (name, value) in fields.iter_mut() {
        if let Some(replacement) = overrides.get(name.as_str()) {
            *value = replacement.clone();
        }
    }

    if let Some(sub) = submitter {
        if let Some(name) = sub.value().attr("name") {
            fields.push((
                name.to_string(),
                sub.value().attr("value").unwrap_or("").to_string(),
            ));
        }
    }

    let method = match form.value().attr("method") {
        Some(m) if m.eq_ignore_ascii_case("post") => FormMethod::Post,
        _ => FormMethod::Get,
    };

    Ok(FormSubmission {
        method,
        action: form.value().attr("action").map(str::to_string),
        fields,
    })
}
