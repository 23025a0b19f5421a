use crate::consent::model::{ConsentTree, CookieCategory, CookieOption};

/// The tree shipped with the widget: marketing, socials and performance.
///
/// Everything starts off except the protected `google` option, which is always on.
pub fn default_tree() -> ConsentTree {
    // Static data; uniqueness is checked by `default_categories_validate`.
    ConsentTree::from_validated(default_categories())
}

fn default_categories() -> Vec<CookieCategory> {
    vec![
        CookieCategory::new(
            1,
            "marketing",
            "Marketing",
            "Marketing cookies are used to track user behavior on the website and to improve the user experience.",
        )
        .with_class("m")
        .option(CookieOption::new(1, "ip", "IP address"))
        .option(CookieOption::new(2, "country", "Country"))
        .option(CookieOption::new(3, "timezone", "Timezone"))
        .option(CookieOption::new(4, "time", "Local time"))
        .option(CookieOption::new(5, "spenttime", "Time spent"))
        .option(CookieOption::new(6, "chatbot", "Chatbot")),
        CookieCategory::new(
            2,
            "socials",
            "Social media",
            "Social media cookies are used to track user behavior on the website and to improve the user experience.",
        )
        .with_class("s")
        .option(CookieOption::new(1, "google", "Google").protected(true))
        .option(CookieOption::new(2, "facebook", "Facebook"))
        .option(CookieOption::new(3, "youtube", "YouTube"))
        .option(CookieOption::new(4, "instagram", "Instagram"))
        .option(CookieOption::new(5, "tiktok", "TikTok"))
        .option(CookieOption::new(6, "linkedin", "LinkedIn")),
        CookieCategory::new(
            3,
            "performance",
            "Performance",
            "Performance cookies are used to track user behavior on the website and to improve the user experience.",
        )
        .with_class("p")
        .option(CookieOption::new(1, "themes", "Themes"))
        .option(CookieOption::new(2, "prefers", "Device preferred theme"))
        .option(CookieOption::new(3, "langs", "Languages"))
        .option(CookieOption::new(4, "localstorage", "Local storage"))
        .option(CookieOption::new(5, "scroll-listeners", "Scroll listeners"))
        .option(CookieOption::new(6, "section-pagination", "Section pagination"))
        .option(CookieOption::new(7, "slider", "Slider"))
        .option(CookieOption::new(8, "modals", "Modals"))
        .option(CookieOption::new(9, "menus", "Menus"))
        .option(CookieOption::new(10, "animations", "Animations").with_class("a"))
        .option(CookieOption::new(11, "transitions", "Transitions").with_class("t"))
        .option(CookieOption::new(12, "blur", "Blur").with_class("b"))
        .option(CookieOption::new(13, "auth-user", "Remember signed-in user")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_categories_validate() {
        assert!(ConsentTree::new(default_categories()).is_ok());
        let tree = default_tree();
        assert_eq!(tree.categories().len(), 3);
        assert_eq!(tree.identifiers().count(), 3 + 6 + 6 + 13);
    }

    #[test]
    fn only_google_starts_on() {
        let tree = default_tree();
        let active: Vec<&str> = tree.identifiers().filter(|id| tree.is_active(id)).collect();
        assert_eq!(active, vec!["google"]);
        assert!(tree.option("google").unwrap().protected);
    }

    #[test]
    fn classes_are_attached() {
        let tree = default_tree();
        assert_eq!(tree.category("performance").unwrap().class.as_deref(), Some("p"));
        assert_eq!(tree.option("transitions").unwrap().class.as_deref(), Some("t"));
        assert!(tree.option("langs").unwrap().class.is_none());
    }
}
