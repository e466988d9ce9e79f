//! Weighted template catalogs and sampling.
//!
//! A template carries a payload prototype, a relative weight controlling how
//! likely it is to be picked, and an optional expected duration in minutes.
//! The weight and duration hint stay on the template; only the payload is
//! copied onto emitted events.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::Deserialize;
use tracing::debug;

use crate::error::GenerateError;
use crate::event::{AfkData, AfkStatus, BrowserData, EventData, WindowData};

/// Longest duration hint a template may carry: one day.
pub const MAX_DURATION_MINUTES: f64 = 24.0 * 60.0;

/// A weighted payload prototype.
#[derive(Debug, Clone, PartialEq)]
pub struct EventTemplate {
    /// Payload copied onto every event stamped from this template.
    pub data: EventData,
    /// Relative likelihood of being sampled.
    pub weight: f64,
    /// Expected event length in minutes, if known.
    pub duration_minutes: Option<f64>,
}

impl EventTemplate {
    pub fn new(data: impl Into<EventData>, weight: f64, duration_minutes: Option<f64>) -> Self {
        Self {
            data: data.into(),
            weight,
            duration_minutes,
        }
    }
}

/// A validated, non-empty set of templates ready for weighted sampling.
#[derive(Debug, Clone)]
pub struct Catalog {
    name: String,
    templates: Vec<EventTemplate>,
    index: WeightedIndex<f64>,
}

impl Catalog {
    /// Builds a catalog.
    ///
    /// Fails if there are no templates, any weight is negative or not finite,
    /// any duration hint is outside `0..=MAX_DURATION_MINUTES`, or every weight
    /// is zero.
    pub fn new(name: impl Into<String>, templates: Vec<EventTemplate>) -> Result<Self, GenerateError> {
        let name = name.into();
        if templates.is_empty() {
            return Err(GenerateError::catalog(&name, "catalog has no templates"));
        }
        for (idx, template) in templates.iter().enumerate() {
            if !template.weight.is_finite() || template.weight < 0.0 {
                return Err(GenerateError::catalog(
                    &name,
                    format!("template {idx} has invalid weight {}", template.weight),
                ));
            }
            if let Some(minutes) = template.duration_minutes {
                if !(0.0..=MAX_DURATION_MINUTES).contains(&minutes) {
                    return Err(GenerateError::catalog(
                        &name,
                        format!("template {idx} has invalid duration {minutes}"),
                    ));
                }
            }
        }
        if templates.iter().all(|t| t.weight <= 0.0) {
            return Err(GenerateError::catalog(&name, "all template weights are zero"));
        }

        let index = WeightedIndex::new(templates.iter().map(|t| t.weight))
            .map_err(|err| GenerateError::catalog(&name, err.to_string()))?;

        Ok(Self {
            name,
            templates,
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn templates(&self) -> &[EventTemplate] {
        &self.templates
    }

    /// Picks one template with probability proportional to its weight.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &EventTemplate {
        &self.templates[self.index.sample(rng)]
    }
}

/// The three catalogs a generation run samples from.
#[derive(Debug, Clone)]
pub struct Catalogs {
    pub afk: Catalog,
    pub window: Catalog,
    pub browser: Catalog,
}

impl Catalogs {
    /// The built-in catalogs.
    pub fn builtin() -> Result<Self, GenerateError> {
        Ok(Self {
            afk: Catalog::new("afk", builtin_afk())?,
            window: Catalog::new("window", builtin_window())?,
            browser: Catalog::new("browser", builtin_browser())?,
        })
    }

    /// The built-in catalogs with any non-empty section of `file` replacing its
    /// built-in counterpart.
    pub fn with_overrides(file: CatalogFile) -> Result<Self, GenerateError> {
        let mut catalogs = Self::builtin()?;
        replace(&mut catalogs.afk, file.afk)?;
        replace(&mut catalogs.window, file.window)?;
        replace(&mut catalogs.browser, file.browser)?;
        Ok(catalogs)
    }
}

fn replace<D: Into<EventData>>(
    catalog: &mut Catalog,
    entries: Vec<TemplateEntry<D>>,
) -> Result<(), GenerateError> {
    if entries.is_empty() {
        return Ok(());
    }
    *catalog = Catalog::new(catalog.name(), into_templates(entries))?;
    debug!(
        catalog = catalog.name(),
        templates = catalog.templates().len(),
        "replaced built-in catalog"
    );
    Ok(())
}

/// On-disk catalog definition, one array per catalog.
///
/// ```toml
/// [[window]]
/// app = "Terminal"
/// title = "vim"
/// weight = 10
/// duration = 5
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub afk: Vec<TemplateEntry<AfkData>>,
    #[serde(default)]
    pub window: Vec<TemplateEntry<WindowData>>,
    #[serde(default)]
    pub browser: Vec<TemplateEntry<BrowserData>>,
}

/// One template as written in a catalog file.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateEntry<D> {
    #[serde(flatten)]
    pub data: D,
    pub weight: f64,
    /// Expected duration in minutes.
    #[serde(default)]
    pub duration: Option<f64>,
}

fn into_templates<D: Into<EventData>>(entries: Vec<TemplateEntry<D>>) -> Vec<EventTemplate> {
    entries
        .into_iter()
        .map(|entry| EventTemplate::new(entry.data, entry.weight, entry.duration))
        .collect()
}

fn afk(status: AfkStatus, weight: f64, minutes: f64) -> EventTemplate {
    EventTemplate::new(AfkData { status }, weight, Some(minutes))
}

fn window(app: &str, title: &str, weight: f64, minutes: Option<f64>) -> EventTemplate {
    EventTemplate::new(
        WindowData {
            app: app.to_string(),
            title: title.to_string(),
        },
        weight,
        minutes,
    )
}

fn browser(title: &str, url: &str, weight: f64, minutes: f64) -> EventTemplate {
    EventTemplate::new(
        BrowserData {
            title: title.to_string(),
            url: url.to_string(),
        },
        weight,
        Some(minutes),
    )
}

fn builtin_afk() -> Vec<EventTemplate> {
    vec![
        afk(AfkStatus::NotAfk, 1.0, 120.0),
        afk(AfkStatus::Afk, 1.0, 10.0),
    ]
}

fn builtin_window() -> Vec<EventTemplate> {
    vec![
        // Meetings, roughly 30 min every other day
        window("zoom", "Zoom Meeting", 3.0, Some(20.0)),
        // Games, roughly an hour a week
        window("Minecraft", "Minecraft", 2.0, Some(200.0)),
        // Project work, the bulk of the day
        window(
            "Firefox",
            "ActivityWatch/activitywatch: Track how you spend your time - github.com/",
            20.0,
            Some(5.0),
        ),
        window(
            "Terminal",
            "vim ~/code/activitywatch/other/aw-fakedata",
            10.0,
            None,
        ),
        window(
            "Terminal",
            "vim ~/code/activitywatch/README.md",
            3.0,
            Some(5.0),
        ),
        window("Terminal", "vim ~/code/activitywatch/aw-server", 5.0, None),
        window("Terminal", "bash ~/code/activitywatch", 5.0, None),
        // Misc work
        window("Firefox", "Gmail - mail.google.com/", 5.0, Some(10.0)),
        window(
            "Firefox",
            "Stack Overflow - stackoverflow.com/",
            10.0,
            Some(5.0),
        ),
        window(
            "Firefox",
            "Google Calendar - calendar.google.com/",
            5.0,
            Some(2.0),
        ),
        // Social media, roughly 30 min a day
        window(
            "Firefox",
            "reddit: the front page of the internet - reddit.com/",
            10.0,
            Some(10.0),
        ),
        window("Firefox", "Home / Twitter - twitter.com/", 10.0, Some(8.0)),
        window("Firefox", "Facebook - facebook.com/", 10.0, Some(3.0)),
        window("Chrome", "Unknown site", 2.0, None),
        // Media
        window("Spotify", "Spotify", 8.0, Some(3.0)),
        window("Chrome", "YouTube - youtube.com/", 4.0, Some(25.0)),
    ]
}

fn builtin_browser() -> Vec<EventTemplate> {
    vec![
        browser("GitHub", "https://github.com", 10.0, 10.0),
        browser("Twitter", "https://twitter.com", 3.0, 5.0),
        browser("YouTube", "https://youtube.com", 5.0, 20.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn status(status: AfkStatus, weight: f64) -> EventTemplate {
        EventTemplate::new(AfkData { status }, weight, None)
    }

    #[test]
    fn builtin_catalogs_are_valid() {
        let catalogs = Catalogs::builtin().unwrap();
        assert_eq!(catalogs.afk.templates().len(), 2);
        assert_eq!(catalogs.window.templates().len(), 16);
        assert_eq!(catalogs.browser.templates().len(), 3);
    }

    #[test]
    fn zero_weight_template_is_never_sampled() {
        let catalog = Catalog::new(
            "test",
            vec![status(AfkStatus::NotAfk, 1.0), status(AfkStatus::Afk, 0.0)],
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..1000 {
            let picked = catalog.sample(&mut rng);
            assert_eq!(picked.data, status(AfkStatus::NotAfk, 1.0).data);
        }
    }

    #[test]
    fn sampling_follows_weights() {
        let catalog = Catalog::new(
            "test",
            vec![status(AfkStatus::NotAfk, 3.0), status(AfkStatus::Afk, 1.0)],
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let draws = 10_000;
        let not_afk = (0..draws)
            .filter(|_| {
                matches!(
                    catalog.sample(&mut rng).data,
                    EventData::Afk(AfkData {
                        status: AfkStatus::NotAfk
                    })
                )
            })
            .count();

        assert!(
            (7_000..8_000).contains(&not_afk),
            "expected ~75% not-afk, got {not_afk}/{draws}"
        );
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let err = Catalog::new("afk", Vec::new()).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidCatalog { .. }));
        assert_eq!(err.to_string(), "invalid afk catalog: catalog has no templates");
    }

    #[test]
    fn all_zero_weights_are_rejected() {
        let err = Catalog::new(
            "afk",
            vec![status(AfkStatus::NotAfk, 0.0), status(AfkStatus::Afk, 0.0)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("all template weights are zero"));
    }

    #[test]
    fn negative_and_nan_weights_are_rejected() {
        assert!(Catalog::new("afk", vec![status(AfkStatus::Afk, -1.0)]).is_err());
        assert!(Catalog::new("afk", vec![status(AfkStatus::Afk, f64::NAN)]).is_err());
    }

    #[test]
    fn negative_duration_hint_is_rejected() {
        let template = EventTemplate::new(
            AfkData {
                status: AfkStatus::Afk,
            },
            1.0,
            Some(-5.0),
        );
        assert!(Catalog::new("afk", vec![template]).is_err());
    }

    #[test]
    fn duration_hint_longer_than_a_day_is_rejected() {
        let file: CatalogFile = serde_json::from_str(
            r#"{"afk": [{"status": "afk", "weight": 1, "duration": 1e12}]}"#,
        )
        .unwrap();
        let err = Catalogs::with_overrides(file).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidCatalog { ref name, .. } if name == "afk"));
        assert!(err.to_string().contains("invalid duration"));

        let day = EventTemplate::new(
            AfkData {
                status: AfkStatus::Afk,
            },
            1.0,
            Some(MAX_DURATION_MINUTES),
        );
        assert!(Catalog::new("afk", vec![day]).is_ok());
    }

    #[test]
    fn overrides_replace_only_provided_sections() {
        let file: CatalogFile = serde_json::from_str(
            r#"{"browser": [{"title": "Docs", "url": "https://docs.rs", "weight": 1, "duration": 4}]}"#,
        )
        .unwrap();
        let catalogs = Catalogs::with_overrides(file).unwrap();

        assert_eq!(catalogs.browser.name(), "browser");
        assert_eq!(catalogs.browser.templates().len(), 1);
        assert_eq!(catalogs.browser.templates()[0].duration_minutes, Some(4.0));
        assert_eq!(catalogs.window.templates().len(), 16);
    }

    #[test]
    fn override_with_invalid_weights_fails() {
        let file: CatalogFile =
            serde_json::from_str(r#"{"afk": [{"status": "afk", "weight": 0}]}"#).unwrap();
        let err = Catalogs::with_overrides(file).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidCatalog { ref name, .. } if name == "afk"));
    }
}
