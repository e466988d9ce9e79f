//! Bucket kinds as the single source of truth for watcher names and event types.

/// Canonical buckets written by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketKind {
    Window,
    Afk,
    BrowserChrome,
    BrowserFirefox,
}

impl BucketKind {
    /// All buckets, in setup order.
    pub const ALL: [Self; 4] = [
        Self::Afk,
        Self::Window,
        Self::BrowserChrome,
        Self::BrowserFirefox,
    ];

    /// Watcher name, the bucket id prefix.
    pub const fn watcher(self) -> &'static str {
        match self {
            Self::Window => "aw-watcher-window",
            Self::Afk => "aw-watcher-afk",
            Self::BrowserChrome => "aw-watcher-web-chrome",
            Self::BrowserFirefox => "aw-watcher-web-firefox",
        }
    }

    /// Event type registered when the bucket is created.
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::Window => "currentwindow",
            Self::Afk => "afkstatus",
            Self::BrowserChrome | Self::BrowserFirefox => "web.tab.current",
        }
    }

    /// Bucket id for the given host, e.g. `aw-watcher-afk_fakedata`.
    pub fn bucket_id(self, hostname: &str) -> String {
        format!("{}_{hostname}", self.watcher())
    }
}

/// Browsers that get a nested tab stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Browser {
    Chrome,
    Firefox,
}

impl Browser {
    /// Matches a window's application name, ignoring case.
    pub fn from_app(app: &str) -> Option<Self> {
        if app.eq_ignore_ascii_case("chrome") {
            Some(Self::Chrome)
        } else if app.eq_ignore_ascii_case("firefox") {
            Some(Self::Firefox)
        } else {
            None
        }
    }

    /// The bucket this browser's tab events go to.
    pub const fn bucket(self) -> BucketKind {
        match self {
            Self::Chrome => BucketKind::BrowserChrome,
            Self::Firefox => BucketKind::BrowserFirefox,
        }
    }
}
