use scraper::{ElementRef, Html, Selector};
use slotwatch_core::error::AppError;
use slotwatch_core::models::{Observation, PageMarkers, StatusSignal};
use slotwatch_core::traits::Extractor;
use slotwatch_core::util::parse_count;

pub const DEFAULT_IDENTITY_PHRASE: &str = "Register account";
pub const DEFAULT_LIMIT_REACHED_PHRASE: &str =
    "The limit of registered accounts has been reached";

/// Where to look for one counter field.
#[derive(Debug, Clone)]
pub struct CounterSelector {
    /// CSS selector for the element.
    pub selector: String,
    /// Attribute read before falling back to the element's text.
    pub attribute: String,
}

impl CounterSelector {
    pub fn new(selector: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            attribute: attribute.into(),
        }
    }
}

/// Operator-tunable extraction settings.
#[derive(Debug, Clone)]
pub struct ExtractionRules {
    /// Phrase proving the fetch landed on the target page.
    pub identity_phrase: String,
    /// Exact sentence the provider shows when registration is closed.
    pub limit_reached_phrase: String,
    /// Element tagged with a "current accounts" marker attribute.
    pub current_marker: CounterSelector,
    /// Element tagged with a "limit" marker attribute.
    pub limit_marker: CounterSelector,
    /// Counter widget identified by class or role.
    pub current_widget: CounterSelector,
    pub limit_widget: CounterSelector,
    /// Limit assumed when no strategy finds one. `None` leaves it absent.
    pub fallback_limit: Option<u64>,
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            identity_phrase: DEFAULT_IDENTITY_PHRASE.to_string(),
            limit_reached_phrase: DEFAULT_LIMIT_REACHED_PHRASE.to_string(),
            current_marker: CounterSelector::new("[data-accounts]", "data-accounts"),
            limit_marker: CounterSelector::new("[data-limit]", "data-limit"),
            current_widget: CounterSelector::new(
                ".is--counter--accounts, [role=\"status\"][data-counter=\"accounts\"]",
                "data-count",
            ),
            limit_widget: CounterSelector::new(
                ".is--counter--limit, [role=\"status\"][data-counter=\"limit\"]",
                "data-count",
            ),
            fallback_limit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Current,
    Limit,
}

/// Compiled [`CounterSelector`].
#[derive(Debug, Clone)]
struct CompiledCounter {
    selector: Selector,
    attribute: String,
}

impl CompiledCounter {
    fn compile(counter: &CounterSelector) -> Result<Self, AppError> {
        let selector = Selector::parse(&counter.selector).map_err(|e| {
            AppError::ConfigError(format!("Invalid CSS selector '{}': {e}", counter.selector))
        })?;
        Ok(Self {
            selector,
            attribute: counter.attribute.clone(),
        })
    }

    /// First matching element whose attribute, or failing that text, holds a number.
    fn read(&self, doc: &Html) -> Option<u64> {
        doc.select(&self.selector)
            .find_map(|el| read_attribute_or_text(el, &self.attribute))
    }
}

fn read_attribute_or_text(el: ElementRef<'_>, attribute: &str) -> Option<u64> {
    el.value()
        .attr(attribute)
        .and_then(parse_count)
        .or_else(|| parse_count(&el.text().collect::<String>()))
}

/// A single extraction strategy. Returns `None` when it finds nothing.
type Strategy = fn(&HtmlExtractor, &Html, Field) -> Option<u64>;

/// Strategies in priority order; later ones only run for fields still missing.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("attribute_marker", attribute_marker),
    ("counter_widget", counter_widget),
];

fn attribute_marker(ex: &HtmlExtractor, doc: &Html, field: Field) -> Option<u64> {
    match field {
        Field::Current => ex.current_marker.read(doc),
        Field::Limit => ex.limit_marker.read(doc),
    }
}

fn counter_widget(ex: &HtmlExtractor, doc: &Html, field: Field) -> Option<u64> {
    match field {
        Field::Current => ex.current_widget.read(doc),
        Field::Limit => ex.limit_widget.read(doc),
    }
}

/// HTML extractor backed by `scraper`.
///
/// Selectors are compiled once at construction so a bad selector surfaces as
/// a configuration error at startup rather than as a silent miss every cycle.
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    identity_phrase: String,
    limit_reached_phrase: String,
    current_marker: CompiledCounter,
    limit_marker: CompiledCounter,
    current_widget: CompiledCounter,
    limit_widget: CompiledCounter,
    fallback_limit: Option<u64>,
}

impl HtmlExtractor {
    pub fn new(rules: &ExtractionRules) -> Result<Self, AppError> {
        Ok(Self {
            identity_phrase: rules.identity_phrase.clone(),
            limit_reached_phrase: rules.limit_reached_phrase.clone(),
            current_marker: CompiledCounter::compile(&rules.current_marker)?,
            limit_marker: CompiledCounter::compile(&rules.limit_marker)?,
            current_widget: CompiledCounter::compile(&rules.current_widget)?,
            limit_widget: CompiledCounter::compile(&rules.limit_widget)?,
            fallback_limit: rules.fallback_limit,
        })
    }

    fn read_field(&self, doc: &Html, field: Field) -> Option<u64> {
        STRATEGIES.iter().find_map(|(name, strategy)| {
            let value = strategy(self, doc, field);
            if let Some(v) = value {
                tracing::debug!(strategy = *name, ?field, value = v, "Counter extracted");
            }
            value
        })
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, raw: &str) -> Observation {
        let doc = Html::parse_document(raw);

        let current_count = self.read_field(&doc, Field::Current);
        let limit_count = self
            .read_field(&doc, Field::Limit)
            .or(self.fallback_limit);

        Observation {
            signal: StatusSignal::new(current_count, limit_count),
            markers: PageMarkers::detect(raw, &self.identity_phrase, &self.limit_reached_phrase),
        }
    }
}
