//! The seven-screen page surface and its (mostly trivial) router.

/// One of the seven app screens.
///
/// Only welcome → quiz → summary → leaderboard forms a real flow; the other
/// pages are static placeholders that return to the welcome screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Welcome,
    Quiz,
    Leaderboard,
    Summary,
    DirectorSpotlight,
    SocialSharing,
    ThemeCustomization,
}

impl Page {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Page::Welcome => "Black Cinema Trivia",
            Page::Quiz => "Quiz",
            Page::Leaderboard => "Leaderboard",
            Page::Summary => "Quiz Summary",
            Page::DirectorSpotlight => "Director Spotlight",
            Page::SocialSharing => "Share Your Score",
            Page::ThemeCustomization => "Customize Theme",
        }
    }

    /// True for pages with no behavior beyond a back-to-welcome action.
    #[must_use]
    pub fn is_placeholder(self) -> bool {
        matches!(
            self,
            Page::DirectorSpotlight | Page::SocialSharing | Page::ThemeCustomization
        )
    }
}

/// Holds the single current-page value the renderer dispatches on.
#[derive(Debug, Clone, Copy, Default)]
pub struct Router {
    current: Page,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Page {
        self.current
    }

    pub fn goto(&mut self, page: Page) {
        self.current = page;
    }
}

/// Static film recommendations shown on the summary page.
#[must_use]
pub fn film_recommendations() -> &'static [&'static str] {
    &[
        "Moonlight",
        "Black Panther",
        "Do the Right Thing",
        "12 Years a Slave",
    ]
}
